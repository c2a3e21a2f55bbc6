//! Report generation and output formatting

pub mod formatter;
pub mod report;

pub use formatter::{write_reports, ConsoleFormatter, OutputFormatter};
pub use report::{MatchReport, OutputPaths};
