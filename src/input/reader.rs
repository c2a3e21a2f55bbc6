//! Document reader that turns a posting or resume file into one text blob

use crate::error::{JobMatcherError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{
    MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use log::{debug, info};
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentReader;

impl DocumentReader {
    pub fn new() -> Self {
        Self
    }

    pub async fn read(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(JobMatcherError::FileNotFound(path.to_path_buf()));
        }

        let text = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Unknown(ext) => {
                return Err(JobMatcherError::UnsupportedFormat(format!(
                    ".{} ({}). Supported types: .txt, .md, .pdf",
                    ext,
                    path.display()
                )));
            }
        };

        if text.trim().is_empty() {
            return Err(JobMatcherError::UnreadableDocument {
                path: path.to_path_buf(),
                reason: "no text content extracted".to_string(),
            });
        }

        debug!("Read {} characters from {}", text.len(), path.display());
        Ok(text)
    }
}
