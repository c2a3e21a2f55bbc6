//! Runs the three stages in order and assembles the report

use crate::error::{JobMatcherError, Result};
use crate::output::{write_reports, MatchReport, OutputPaths};
use crate::pipeline::context::RunContext;
use crate::pipeline::state::{PipelineStage, PipelineState};
use crate::pipeline::trace::TraceEntry;
use crate::processing::{
    JobPosting, MatchResult, PostingStructurer, RequirementExtractor, Requirements, ResumeMatcher,
};
use chrono::Utc;
use log::{debug, error, info};
use serde_json::json;
use std::path::Path;

pub struct Orchestrator {
    ctx: RunContext,
    state: PipelineState,
}

impl Orchestrator {
    pub fn new(ctx: RunContext) -> Self {
        Self {
            ctx,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn traces(&self) -> &[TraceEntry] {
        self.ctx.trace.entries()
    }

    /// Execute the workflow once. Any stage failure aborts the run and is
    /// returned wrapped in `StageFailed`.
    pub async fn run(&mut self, job_posting_path: &Path, resume_path: &Path) -> Result<MatchReport> {
        if self.state != PipelineState::Idle {
            return Err(JobMatcherError::InvalidInput(format!(
                "orchestrator already used (state: {:?})",
                self.state
            )));
        }

        info!("{}", "=".repeat(60));
        info!("Starting Job Matcher Workflow");
        info!("{}", "=".repeat(60));

        self.enter(PipelineStage::ParsingPosting);
        let outcome = self.parse_posting(job_posting_path).await;
        let posting = self.settle(PipelineStage::ParsingPosting, outcome)?;

        self.enter(PipelineStage::AnalyzingRequirements);
        let outcome = self.analyze_requirements(&posting).await;
        let requirements = self.settle(PipelineStage::AnalyzingRequirements, outcome)?;

        self.enter(PipelineStage::MatchingResume);
        let outcome = self.match_resume(resume_path, &requirements).await;
        let match_analysis = self.settle(PipelineStage::MatchingResume, outcome)?;

        self.advance(PipelineState::Done);
        info!("{}", "=".repeat(60));
        info!("Workflow completed successfully");
        info!("{}", "=".repeat(60));

        Ok(MatchReport {
            job_posting: posting,
            requirements,
            match_analysis,
            workflow_traces: self.ctx.trace.entries().to_vec(),
            model: self.ctx.generator.model_name().to_string(),
            generated_at: Utc::now(),
        })
    }

    /// Serialize a finished run to its JSON and Markdown documents.
    pub fn save_results(&self, report: &MatchReport, paths: &OutputPaths) -> Result<()> {
        if self.state != PipelineState::Done {
            return Err(JobMatcherError::InvalidInput(
                "results can only be saved after a completed run".to_string(),
            ));
        }
        write_reports(report, paths)
    }

    async fn parse_posting(&mut self, path: &Path) -> Result<JobPosting> {
        let agent = PipelineStage::ParsingPosting.agent();
        self.ctx.trace.record(
            agent,
            "Reading job posting",
            json!({"path": path.display().to_string()}),
        )?;

        let text = self.ctx.reader.read(path).await?;
        let structurer = PostingStructurer::new(self.ctx.settings.parser_temperature);
        let posting = structurer.structure(self.ctx.generator.as_ref(), &text).await?;

        self.ctx.trace.record(
            agent,
            "Completed parsing",
            json!({"title": posting.title, "company": posting.company}),
        )?;
        Ok(posting)
    }

    async fn analyze_requirements(&mut self, posting: &JobPosting) -> Result<Requirements> {
        let agent = PipelineStage::AnalyzingRequirements.agent();
        self.ctx.trace.record(agent, "Analyzing requirements", json!({}))?;

        let extractor = RequirementExtractor::new(self.ctx.settings.analyzer_temperature);
        let requirements = extractor.extract(self.ctx.generator.as_ref(), posting).await?;

        self.ctx.trace.record(
            agent,
            "Extracted requirements",
            json!({
                "technical_skills_count": requirements.technical_skills.len(),
                "soft_skills_count": requirements.soft_skills.len(),
                "years_experience": requirements.years_experience,
            }),
        )?;
        Ok(requirements)
    }

    async fn match_resume(&mut self, path: &Path, requirements: &Requirements) -> Result<MatchResult> {
        let agent = PipelineStage::MatchingResume.agent();
        self.ctx.trace.record(
            agent,
            "Reading resume",
            json!({"path": path.display().to_string()}),
        )?;

        let resume_text = self.ctx.reader.read(path).await?;
        let matcher = ResumeMatcher::new(self.ctx.settings.matcher_temperature);
        let result = matcher
            .match_resume(self.ctx.generator.as_ref(), &resume_text, requirements)
            .await?;

        self.ctx.trace.record(
            agent,
            "Completed matching",
            json!({
                "overall_score": result.score,
                "matched_skills": result.matched_skills.len(),
            }),
        )?;
        Ok(result)
    }

    fn enter(&mut self, stage: PipelineStage) {
        self.advance(PipelineState::from(stage));
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_advance_to(&next),
            "invalid transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!("Pipeline state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Pass a stage's value through, or move to `Failed` and record why.
    fn settle<T>(&mut self, stage: PipelineStage, outcome: Result<T>) -> Result<T> {
        let source = match outcome {
            Ok(value) => return Ok(value),
            Err(source) => source,
        };

        let reason = source.to_string();
        error!("Workflow failed during {}: {}", stage, reason);

        if let Err(trace_err) = self.ctx.trace.record(
            "Orchestrator",
            "Workflow failed",
            json!({"stage": stage, "reason": reason}),
        ) {
            error!("Could not record failure in trace log: {}", trace_err);
        }

        self.advance(PipelineState::Failed { stage, reason });
        Err(JobMatcherError::StageFailed {
            stage,
            source: Box::new(source),
        })
    }
}
