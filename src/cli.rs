//! CLI interface for the job matcher

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "job-matcher")]
#[command(about = "Job posting analyzer and resume matcher")]
#[command(long_about = "Structure a job posting, extract its requirements and score a resume against them using an LLM service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the posting → requirements → match workflow
    Run {
        /// Path to job posting file (TXT, MD, PDF); defaults to input.job_posting
        #[arg(short, long)]
        job: Option<PathBuf>,

        /// Path to resume file (TXT, MD, PDF); defaults to input.resume
        #[arg(short, long)]
        resume: Option<PathBuf>,

        /// Directory for the result documents; defaults to output.results_dir
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Base name of the result files; defaults to output.file_stem
        #[arg(short, long)]
        name: Option<String>,

        /// Model identifier; defaults to llm.model
        #[arg(short, long)]
        model: Option<String>,

        /// Disable colored console output
        #[arg(long)]
        no_color: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,
}

/// Validate file extension; files without one are accepted as plain text
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[&str] = &["pdf", "txt", "md"];

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("resume.PDF"), ALLOWED).is_ok());
        assert!(validate_file_extension(Path::new("docs/jobposting"), ALLOWED).is_ok());

        let err = validate_file_extension(Path::new("resume.docx"), ALLOWED).unwrap_err();
        assert!(err.contains(".docx"));
    }

    #[test]
    fn test_run_arguments_parse() {
        let cli = Cli::try_parse_from([
            "job-matcher",
            "--verbose",
            "run",
            "--job",
            "posting.txt",
            "--resume",
            "resume.pdf",
            "--name",
            "acme",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Run { job, resume, name, model, .. } => {
                assert_eq!(job, Some(PathBuf::from("posting.txt")));
                assert_eq!(resume, Some(PathBuf::from("resume.pdf")));
                assert_eq!(name.as_deref(), Some("acme"));
                assert!(model.is_none());
            }
            _ => panic!("expected run command"),
        }
    }
}
