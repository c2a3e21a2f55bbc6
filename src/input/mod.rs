//! Input processing module
//! Handles file detection, text extraction, and document reading

pub mod file_detector;
pub mod reader;
pub mod text_extractor;

pub use reader::DocumentReader;
