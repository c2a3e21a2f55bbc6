//! Text extraction from various file formats

use crate::error::{JobMatcherError, Result};
use pdf_extract::{ConvertToFmt, MediaBox, OutputDev, OutputError, PlainTextOutput, Transform};
use pulldown_cmark::{Event, Parser, Tag};
use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use tokio::fs;

/// Form feed, written after each extracted PDF page.
const PAGE_BREAK: char = '\u{000C}';

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        let text = extract_pdf_pages(&bytes).map_err(|e| JobMatcherError::UnreadableDocument {
            path: path.to_path_buf(),
            reason: format!("PDF extraction failed: {}", e),
        })?;

        Ok(join_pages(&text))
    }
}

/// Raw PDF text with a form feed after every page.
fn extract_pdf_pages(bytes: &[u8]) -> std::result::Result<String, OutputError> {
    let document = lopdf::Document::load_mem(bytes)?;
    let text = SharedText::default();
    let mut output = PagedTextOutput {
        text: text.clone(),
        inner: PlainTextOutput::new(text.clone()),
    };
    pdf_extract::output_doc(&document, &mut output)?;

    let raw = text.0.borrow().clone();
    Ok(raw)
}

#[derive(Clone, Default)]
struct SharedText(Rc<RefCell<String>>);

impl fmt::Write for SharedText {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.borrow_mut().push_str(s);
        Ok(())
    }
}

impl ConvertToFmt for SharedText {
    type Writer = SharedText;

    fn convert(self) -> Self::Writer {
        self
    }
}

/// Plain-text device that marks page ends, which `PlainTextOutput` does not.
struct PagedTextOutput {
    text: SharedText,
    inner: PlainTextOutput<SharedText>,
}

impl OutputDev for PagedTextOutput {
    fn begin_page(
        &mut self,
        page_num: u32,
        media_box: &MediaBox,
        art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.inner.begin_page(page_num, media_box, art_box)
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.inner.end_page()?;
        self.text.0.borrow_mut().push(PAGE_BREAK);
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        self.inner.output_character(trm, width, spacing, font_size, char)
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        self.inner.begin_word()
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        self.inner.end_word()
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        self.inner.end_line()
    }
}

/// Trim each page, drop blank ones and separate the rest with a blank line.
pub fn join_pages(raw: &str) -> String {
    raw.split(PAGE_BREAK)
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        String::from_utf8(bytes).map_err(|e| JobMatcherError::UnreadableDocument {
            path: path.to_path_buf(),
            reason: format!("not valid UTF-8: {}", e),
        })
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = PlainTextExtractor.extract(path).await?;
        Ok(markdown_to_text(&markdown_content))
    }
}

/// Flatten markdown into plain lines, keeping text and code but no markup.
pub fn markdown_to_text(markdown: &str) -> String {
    let mut output = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => output.push_str(&text),
            Event::SoftBreak | Event::HardBreak => output.push('\n'),
            Event::End(Tag::Paragraph)
            | Event::End(Tag::Heading(..))
            | Event::End(Tag::Item)
            | Event::End(Tag::CodeBlock(_)) => output.push('\n'),
            _ => {}
        }
    }

    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
