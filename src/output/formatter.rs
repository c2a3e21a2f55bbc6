//! Output formatters: JSON document, Markdown summary, console summary

use crate::error::Result;
use crate::output::report::{MatchReport, OutputPaths};
use crate::pipeline::TraceEntry;
use colored::{Color, Colorize};
use log::info;
use std::path::Path;

/// Trait for formatting match reports
pub trait OutputFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String>;
}

/// JSON formatter for the machine-readable result document
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for the human-readable summary
pub struct MarkdownFormatter;

/// Terminal summary printed after a run
pub struct ConsoleFormatter {
    use_colors: bool,
    paths: Option<OutputPaths>,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let job = &report.job_posting;
        let reqs = &report.requirements;
        let analysis = &report.match_analysis;
        let mut output = String::new();

        output.push_str("# Job Match Analysis Report\n\n");
        output.push_str(&format!(
            "**Generated:** {} | **Model:** {}\n\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.model
        ));

        output.push_str("## Job Details\n");
        output.push_str(&format!("- **Title:** {}\n", or_na(&job.title)));
        output.push_str(&format!("- **Company:** {}\n", or_na(&job.company)));
        output.push_str(&format!("- **Location:** {}\n\n", or_na(&job.location)));

        output.push_str(&format!(
            "## Match Score: {}/100 ({})\n\n",
            analysis.score,
            Self::markdown_score_badge(analysis.score)
        ));
        output.push_str(&format!("**Verdict:** {}\n\n", report.verdict()));

        output.push_str(&format!("### Matched Skills ({})\n", analysis.matched_skills.len()));
        output.push_str(&bullet_list(&analysis.matched_skills));

        output.push_str(&format!("### Missing Skills ({})\n", analysis.missing_skills.len()));
        output.push_str(&bullet_list(&analysis.missing_skills));

        output.push_str("### Key Strengths\n");
        output.push_str(&bullet_list(&analysis.strengths));

        output.push_str("### Recommended Resume Customizations\n");
        output.push_str(&bullet_list(&analysis.recommendations));

        output.push_str("## Requirements Analysis\n");
        output.push_str(&format!(
            "- **Experience Required:** {} years\n",
            reqs.years_experience
        ));
        output.push_str(&format!("- **Education:** {}\n", or_na(&reqs.education)));
        output.push_str(&format!(
            "- **Technical Skills:** {} identified\n",
            reqs.technical_skills.len()
        ));
        output.push_str(&format!(
            "- **Soft Skills:** {} identified\n",
            reqs.soft_skills.len()
        ));
        if !reqs.nice_to_have.is_empty() {
            let nice: Vec<&str> = reqs.nice_to_have.iter().map(String::as_str).collect();
            output.push_str(&format!("- **Nice to Have:** {}\n", nice.join(", ")));
        }
        output.push('\n');

        output.push_str("## Workflow Execution Trace\n");
        output.push_str(&format_traces(&report.workflow_traces));

        Ok(output)
    }
}

impl MarkdownFormatter {
    fn markdown_score_badge(score: u8) -> &'static str {
        match score {
            90..=100 => "🟢 Excellent",
            80..=89 => "🟡 Very Good",
            70..=79 => "🟠 Good",
            60..=69 => "🔴 Fair",
            50..=59 => "🔴 Below Average",
            _ => "🔴 Poor",
        }
    }
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- None\n\n".to_string();
    }

    let mut output: String = items.iter().map(|item| format!("- {}\n", item)).collect();
    output.push('\n');
    output
}

fn format_traces(traces: &[TraceEntry]) -> String {
    traces
        .iter()
        .map(|trace| {
            format!(
                "**{}** - [{}] {}\n",
                trace.timestamp.to_rfc3339(),
                trace.agent,
                trace.action
            )
        })
        .collect()
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            paths: None,
        }
    }

    /// Also list where the result documents were written.
    pub fn with_paths(mut self, paths: OutputPaths) -> Self {
        self.paths = Some(paths);
        self
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        let rule = "=".repeat(60);
        if self.use_colors {
            format!("{}\n{}\n{}\n", rule, title.color(Color::Blue).bold(), rule)
        } else {
            format!("{}\n{}\n{}\n", rule, title, rule)
        }
    }

    fn format_score_badge(&self, score: u8) -> String {
        let (badge, color) = match score {
            90..=100 => ("EXCELLENT", Color::Green),
            80..=89 => ("VERY GOOD", Color::BrightGreen),
            70..=79 => ("GOOD", Color::Yellow),
            60..=69 => ("FAIR", Color::BrightYellow),
            50..=59 => ("BELOW AVG", Color::Red),
            _ => ("POOR", Color::BrightRed),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let analysis = &report.match_analysis;
        let mut output = String::new();

        output.push_str(&self.format_header("MATCH SUMMARY"));
        output.push_str(&format!(
            "Job: {} at {}\n",
            report.job_posting.title, report.job_posting.company
        ));
        output.push_str(&format!(
            "Overall Match Score: {}/100 {}\n",
            analysis.score,
            self.format_score_badge(analysis.score)
        ));
        output.push_str(&format!(
            "Matched Skills: {}\n",
            self.colorize(&analysis.matched_skills.len().to_string(), Color::Green)
        ));
        output.push_str(&format!(
            "Missing Skills: {}\n",
            self.colorize(&analysis.missing_skills.len().to_string(), Color::Red)
        ));

        if !analysis.missing_skills.is_empty() {
            output.push_str(&format!("  Gaps: {}\n", analysis.missing_skills.join(", ")));
        }

        if let Some(top) = analysis.recommendations.first() {
            output.push_str(&format!(
                "Top recommendation: {}\n",
                self.colorize(top, Color::Cyan)
            ));
        }

        if let Some(paths) = &self.paths {
            output.push_str(&format!("\nFull results saved to: {}\n", paths.json.display()));
            output.push_str(&format!("Readable summary: {}\n", paths.markdown.display()));
        }
        output.push_str(&"=".repeat(60));
        output.push('\n');

        Ok(output)
    }
}

/// Write the JSON and Markdown documents for a finished run.
pub fn write_reports(report: &MatchReport, paths: &OutputPaths) -> Result<()> {
    let json = JsonFormatter::new(true).format_report(report)?;
    save_report_to_file(&json, &paths.json)?;
    info!("Results saved to {}", paths.json.display());

    let markdown = MarkdownFormatter.format_report(report)?;
    save_report_to_file(&markdown, &paths.markdown)?;
    info!("Summary saved to {}", paths.markdown.display());

    Ok(())
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}
