//! End-to-end workflow tests against a scripted text-generation service

use job_matcher::llm::ScriptedGenerator;
use job_matcher::output::{MatchReport, OutputPaths};
use job_matcher::pipeline::{
    GenerationSettings, PipelineStage, PipelineState, RunContext, TraceEntry, TraceLog,
};
use job_matcher::{JobMatcherError, Orchestrator};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const POSTING: &str = "tests/fixtures/jobposting.txt";
const RESUME: &str = "tests/fixtures/sample_resume.txt";

fn posting_reply() -> Value {
    json!({
        "title": "Backend Engineer",
        "company": "Acme",
        "location": "Remote",
        "description": ""
    })
}

fn requirements_reply() -> Value {
    json!({
        "technical_skills": ["Python", "Go", "Kubernetes"],
        "soft_skills": [],
        "years_experience": 0,
        "education": null,
        "nice_to_have": null
    })
}

fn match_reply(score: Value) -> Value {
    json!({
        "score": score,
        "matched_skills": ["Python", "Go"],
        "missing_skills": ["Kubernetes"],
        "recommendations": ["Describe any container orchestration work"],
        "strengths": ["Production Go services"]
    })
}

fn scripted(match_score: Value) -> ScriptedGenerator {
    ScriptedGenerator::new()
        .with_reply(posting_reply())
        .with_reply(requirements_reply())
        .with_reply(match_reply(match_score))
}

struct Harness {
    orchestrator: Orchestrator,
    generator: Arc<ScriptedGenerator>,
    trace_path: PathBuf,
    paths: OutputPaths,
    _dir: tempfile::TempDir,
}

fn harness(generator: ScriptedGenerator) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let trace_path = dir.path().join("match_results.trace.log");
    let paths = OutputPaths {
        json: dir.path().join("match_results.json"),
        markdown: dir.path().join("match_results.md"),
    };

    let generator = Arc::new(generator);
    let ctx = RunContext::new(
        generator.clone(),
        GenerationSettings::default(),
        TraceLog::with_file(&trace_path),
    );

    Harness {
        orchestrator: Orchestrator::new(ctx),
        generator,
        trace_path,
        paths,
        _dir: dir,
    }
}

async fn run(harness: &mut Harness) -> job_matcher::Result<MatchReport> {
    harness
        .orchestrator
        .run(Path::new(POSTING), Path::new(RESUME))
        .await
}

#[tokio::test]
async fn test_end_to_end_backend_engineer() {
    let mut h = harness(scripted(json!(67)));
    let report = run(&mut h).await.unwrap();

    assert_eq!(h.orchestrator.state(), &PipelineState::Done);
    assert_eq!(report.job_posting.title, "Backend Engineer");
    assert_eq!(report.job_posting.company, "Acme");
    assert_eq!(report.match_analysis.score, 67);
    assert_eq!(report.match_analysis.matched_skills, vec!["Python", "Go"]);
    assert_eq!(report.match_analysis.missing_skills, vec!["Kubernetes"]);
    assert_eq!(report.model, "scripted");

    let requests = h.generator.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].prompt.contains("Company: Acme"));
    assert!(requests[1].prompt.contains("Title: Backend Engineer"));
    assert!(requests[2].prompt.contains("Python, Go, Docker"));
    assert!(requests[2].prompt.contains("Technical Skills: Go, Kubernetes, Python"));
    assert_eq!(requests[2].temperature, 0.3);

    let actions: Vec<_> = report.workflow_traces.iter().map(|t| t.action.as_str()).collect();
    assert_eq!(
        actions,
        vec![
            "Reading job posting",
            "Completed parsing",
            "Analyzing requirements",
            "Extracted requirements",
            "Reading resume",
            "Completed matching",
        ]
    );
    assert_eq!(report.workflow_traces[5].data["overall_score"], 67);
}

#[tokio::test]
async fn test_score_derived_when_reply_omits_it() {
    let mut h = harness(scripted(Value::Null));
    let report = run(&mut h).await.unwrap();

    // 2 matched out of 3 required
    assert_eq!(report.match_analysis.score, 67);
}

#[tokio::test]
async fn test_out_of_range_score_is_clamped() {
    let mut h = harness(scripted(json!(180)));
    let report = run(&mut h).await.unwrap();
    assert_eq!(report.match_analysis.score, 100);

    let mut h = harness(scripted(json!(-40)));
    let report = run(&mut h).await.unwrap();
    assert_eq!(report.match_analysis.score, 0);
}

#[tokio::test]
async fn test_empty_description_still_completes() {
    let mut h = harness(scripted(json!(67)));
    let report = run(&mut h).await.unwrap();

    assert_eq!(report.job_posting.description, "");
    assert!(report.requirements.nice_to_have.is_empty());
    assert!(report.requirements.education.is_empty());
    assert!(h.generator.requests()[1].prompt.contains("Description: Not provided"));
}

#[tokio::test]
async fn test_free_text_reply_with_embedded_json() {
    let generator = ScriptedGenerator::new()
        .with_text_reply(format!("Sure! Here it is:\n```json\n{}\n```", posting_reply()))
        .with_reply(requirements_reply())
        .with_reply(match_reply(json!(70)));

    let mut h = harness(generator);
    let report = run(&mut h).await.unwrap();
    assert_eq!(report.job_posting.location, "Remote");
}

#[tokio::test]
async fn test_saved_documents_and_trace_log() {
    let mut h = harness(scripted(json!(67)));
    let report = run(&mut h).await.unwrap();
    h.orchestrator.save_results(&report, &h.paths).unwrap();

    let json_text = std::fs::read_to_string(&h.paths.json).unwrap();
    let saved: Value = serde_json::from_str(&json_text).unwrap();
    assert_eq!(saved["job_posting"]["company"], "Acme");
    assert_eq!(saved["match_analysis"]["missing_skills"], json!(["Kubernetes"]));
    assert_eq!(saved["workflow_traces"].as_array().unwrap().len(), 6);

    let markdown = std::fs::read_to_string(&h.paths.markdown).unwrap();
    assert!(markdown.contains("## Match Score: 67/100"));
    assert!(markdown.contains("### Missing Skills (1)\n- Kubernetes"));

    let trace_lines: Vec<TraceEntry> = std::fs::read_to_string(&h.trace_path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(trace_lines, report.workflow_traces);
}

#[tokio::test]
async fn test_identical_inputs_give_identical_output() {
    let mut first = harness(scripted(json!(67)));
    let mut second = harness(scripted(json!(67)));

    let a = run(&mut first).await.unwrap();
    let b = run(&mut second).await.unwrap();

    assert_eq!(without_timestamps(&a), without_timestamps(&b));
}

fn without_timestamps(report: &MatchReport) -> String {
    let mut value = serde_json::to_value(report).unwrap();
    value["generated_at"] = Value::Null;
    for trace in value["workflow_traces"].as_array_mut().unwrap() {
        trace["timestamp"] = Value::Null;
    }
    serde_json::to_string_pretty(&value).unwrap()
}

#[tokio::test]
async fn test_schema_failure_aborts_before_matching() {
    let generator = ScriptedGenerator::new()
        .with_reply(posting_reply())
        .with_reply(json!({"technical_skills": "Python, Go"}))
        .with_reply(match_reply(json!(67)));

    let mut h = harness(generator);
    let err = run(&mut h).await.unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::AnalyzingRequirements));
    assert!(matches!(
        err.root(),
        JobMatcherError::SchemaValidation { schema: "Requirements", .. }
    ));
    assert!(matches!(
        h.orchestrator.state(),
        PipelineState::Failed { stage: PipelineStage::AnalyzingRequirements, .. }
    ));
    // The matcher reply was never requested
    assert_eq!(h.generator.requests().len(), 2);
    assert_eq!(h.generator.remaining(), 1);

    assert!(!h.paths.json.exists());
    assert!(!h.paths.markdown.exists());

    let log = std::fs::read_to_string(&h.trace_path).unwrap();
    let last: TraceEntry = serde_json::from_str(log.lines().last().unwrap()).unwrap();
    assert_eq!(last.agent, "Orchestrator");
    assert_eq!(last.action, "Workflow failed");
    assert_eq!(last.data["stage"], "AnalyzingRequirements");
    assert!(last.data["reason"].as_str().unwrap().contains("technical_skills"));
}

#[tokio::test]
async fn test_upstream_failure_in_matching_stage() {
    let generator = ScriptedGenerator::new()
        .with_reply(posting_reply())
        .with_reply(requirements_reply())
        .with_failure("request timed out");

    let mut h = harness(generator);
    let err = run(&mut h).await.unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::MatchingResume));
    assert!(matches!(err.root(), JobMatcherError::UpstreamService(_)));
    assert!(!h.paths.json.exists());
    assert!(!h.paths.markdown.exists());
}

#[tokio::test]
async fn test_missing_resume_fails_matching_stage() {
    let mut h = harness(scripted(json!(67)));
    let err = h
        .orchestrator
        .run(Path::new(POSTING), Path::new("tests/fixtures/no_such_resume.pdf"))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::MatchingResume));
    assert!(matches!(err.root(), JobMatcherError::FileNotFound(_)));
    assert_eq!(h.generator.requests().len(), 2);
}

#[tokio::test]
async fn test_markdown_posting_reaches_service_as_plain_text() {
    let mut h = harness(scripted(json!(67)));
    let report = h
        .orchestrator
        .run(Path::new("tests/fixtures/jobposting_full.md"), Path::new(RESUME))
        .await
        .unwrap();
    assert_eq!(report.job_posting.company, "Acme");

    let posting_prompt = &h.generator.requests()[0].prompt;
    assert!(posting_prompt.contains("Company: Acme"));
    assert!(posting_prompt.contains("Kubernetes in production"));
    assert!(!posting_prompt.contains("**"));
    assert!(!posting_prompt.contains("## "));
}
