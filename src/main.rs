//! job-matcher: LLM-driven job posting analyzer and resume matcher

use anyhow::Context;
use clap::Parser;
use job_matcher::cli::{self, Cli, Commands, ConfigAction};
use job_matcher::llm::OpenAiCompatibleClient;
use job_matcher::output::{ConsoleFormatter, OutputFormatter, OutputPaths};
use job_matcher::pipeline::RunContext;
use job_matcher::{Config, JobMatcherError, Orchestrator};
use log::{error, info};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "txt", "md", "markdown"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, config_path).await {
        match e.downcast_ref::<JobMatcherError>().and_then(JobMatcherError::stage) {
            Some(stage) => error!("Run aborted at stage '{}': {:#}", stage, e),
            None => error!("Command failed: {:#}", e),
        }
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: PathBuf) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            job,
            resume,
            output_dir,
            name,
            model,
            no_color,
        } => {
            if let Some(job) = job {
                config.input.job_posting = job;
            }
            if let Some(resume) = resume {
                config.input.resume = resume;
            }
            if let Some(dir) = output_dir {
                config.output.results_dir = dir;
            }
            if let Some(name) = name {
                config.output.file_stem = name;
            }
            if let Some(model) = model {
                config.llm.model = model;
            }

            cli::validate_file_extension(&config.input.job_posting, ALLOWED_EXTENSIONS)
                .map_err(|e| JobMatcherError::InvalidInput(format!("Job posting file: {}", e)))?;
            cli::validate_file_extension(&config.input.resume, ALLOWED_EXTENSIONS)
                .map_err(|e| JobMatcherError::InvalidInput(format!("Resume file: {}", e)))?;

            let api_key = config.api_key()?;
            let client = OpenAiCompatibleClient::new(&config.llm, api_key)?;
            info!("Using model {} at {}", config.llm.model, config.llm.base_url);

            let ctx = RunContext::from_config(&config, Arc::new(client));
            let mut orchestrator = Orchestrator::new(ctx);

            let report = orchestrator
                .run(&config.input.job_posting, &config.input.resume)
                .await?;

            let paths = OutputPaths::from_config(&config);
            orchestrator
                .save_results(&report, &paths)
                .context("failed to write result documents")?;

            let console = ConsoleFormatter::new(config.output.color_output && !no_color)
                .with_paths(paths)
                .format_report(&report)?;
            println!("\n{}", console);
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                println!("{}", toml::to_string_pretty(&config)?);
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save_to(&config_path)?;
                println!("✅ Configuration reset: {}", config_path.display());
            }
        },
    }

    Ok(())
}
