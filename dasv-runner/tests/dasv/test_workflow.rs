//! Workflow halting, continuation and chaining

use super::common::{fundamental_registry, params, success_line, TestProject};
use async_trait::async_trait;
use dasv_runner::execution::{
    ExecutionMode, ExecutionResult, ExecutionStatus, Parameters, PhaseExecutor,
};
use dasv_runner::workflow::{
    DasvWorkflowOrchestrator, QualityGatePolicy, QualityGateResult, WorkflowStatus,
};
use dasv_runner::ExecutionError;
use dasv_sdk::Phase;
use std::path::PathBuf;
use std::sync::Mutex;

/// Succeeds with one output and 0.95 confidence unless the phase is in `failing`
struct StubService {
    failing: Vec<Phase>,
    invoked: Mutex<Vec<Phase>>,
}

impl StubService {
    fn failing_on(phases: &[Phase]) -> Self {
        Self {
            failing: phases.to_vec(),
            invoked: Mutex::new(Vec::new()),
        }
    }

    fn invoked(&self) -> Vec<Phase> {
        self.invoked.lock().unwrap().clone()
    }
}

#[async_trait]
impl PhaseExecutor for StubService {
    async fn execute_command(
        &self,
        domain: &str,
        phase: Phase,
        _parameters: &Parameters,
        mode: ExecutionMode,
    ) -> Result<ExecutionResult, ExecutionError> {
        self.invoked.lock().unwrap().push(phase);
        if self.failing.contains(&phase) {
            return Ok(ExecutionResult::failed(domain, phase, mode, "stubbed failure"));
        }
        let mut result = ExecutionResult::new(domain, phase, mode, ExecutionStatus::Success);
        result.output_files = vec![PathBuf::from(format!("{}.json", phase))];
        result.confidence_score = Some(0.95);
        Ok(result)
    }
}

fn orchestrator(failing: &[Phase]) -> DasvWorkflowOrchestrator<StubService> {
    DasvWorkflowOrchestrator::new(StubService::failing_on(failing), QualityGatePolicy::default())
}

#[tokio::test]
async fn test_discover_failure_halts() {
    let orchestrator = orchestrator(&[Phase::Discover]);
    let result = orchestrator
        .execute_workflow("fundamental_analysis", params(&[("ticker", "AAPL")]), ExecutionMode::Direct)
        .await;

    assert_eq!(result.status, WorkflowStatus::QualityGateFailed);
    assert_eq!(result.phase_results.len(), 1);
    assert_eq!(result.phase_results[0].phase, Phase::Discover);
    assert_eq!(result.phase_results[0].gate, QualityGateResult::Fail);
    assert_eq!(orchestrator.executor().invoked(), vec![Phase::Discover]);
    assert!(!result.is_success());
}

#[tokio::test]
async fn test_analyze_failure_halts() {
    let orchestrator = orchestrator(&[Phase::Analyze]);
    let result = orchestrator
        .execute_workflow("sector_analysis", params(&[("sector", "technology")]), ExecutionMode::Direct)
        .await;

    assert_eq!(result.status, WorkflowStatus::QualityGateFailed);
    assert_eq!(result.phase_results.len(), 2);
    assert_eq!(orchestrator.executor().invoked(), vec![Phase::Discover, Phase::Analyze]);
}

#[tokio::test]
async fn test_validate_failure_continues() {
    let orchestrator = orchestrator(&[Phase::Validate]);
    let result = orchestrator
        .execute_workflow("fundamental_analysis", params(&[("ticker", "AAPL")]), ExecutionMode::Direct)
        .await;

    assert_eq!(result.status, WorkflowStatus::PartialSuccess);
    assert_eq!(result.phase_results.len(), 4);
    assert_eq!(result.phase(Phase::Validate).unwrap().gate, QualityGateResult::Fail);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.errors.is_empty());
    assert!(result.is_success());
}

#[tokio::test]
async fn test_synthesize_failure_continues() {
    let orchestrator = orchestrator(&[Phase::Synthesize]);
    let result = orchestrator
        .execute_workflow("fundamental_analysis", params(&[("ticker", "AAPL")]), ExecutionMode::Direct)
        .await;

    assert_eq!(result.status, WorkflowStatus::PartialSuccess);
    assert_eq!(orchestrator.executor().invoked().len(), 4);
}

#[tokio::test]
async fn test_all_phases_pass() {
    let orchestrator = orchestrator(&[]);
    let result = orchestrator
        .execute_workflow("macro_analysis", params(&[("region", "US")]), ExecutionMode::Direct)
        .await;

    assert_eq!(result.status, WorkflowStatus::Success);
    assert_eq!(result.final_outputs.len(), 4);
    assert!(result.completed_at.is_some());
}

#[tokio::test]
async fn test_low_confidence_threshold_is_configurable() {
    let policy = QualityGatePolicy {
        confidence_threshold: 0.97,
        ..QualityGatePolicy::default()
    };
    let orchestrator = DasvWorkflowOrchestrator::new(StubService::failing_on(&[]), policy);
    let result = orchestrator
        .execute_workflow("fundamental_analysis", params(&[("ticker", "AAPL")]), ExecutionMode::Direct)
        .await;

    assert_eq!(result.status, WorkflowStatus::QualityGateFailed);
    assert!(result.errors[0].contains("below threshold 0.97"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_end_to_end_chaining_with_scripts() {
    let project = TestProject::new();
    project.write_script("scripts/discover.sh", &success_line("out/discovery.json", 0.95));
    for (phase, input, output) in [
        ("analyze", "discovery_file", "out/analysis.json"),
        ("synthesize", "analysis_file", "out/synthesis.md"),
        ("validate", "synthesis_file", "out/validation.json"),
    ] {
        // record the chained input flag, then report the next output
        project.write_script(
            &format!("scripts/{}.sh", phase),
            &format!(
                "echo \"$@\" > {phase}.args\n[ \"$PARAM_{upper}\" != \"\" ] || exit 1\n{line}",
                phase = phase,
                upper = input.to_ascii_uppercase(),
                line = success_line(output, 0.93),
            ),
        );
    }
    let service = project.service(&fundamental_registry());
    let orchestrator = DasvWorkflowOrchestrator::new(service, QualityGatePolicy::default());

    let result = orchestrator
        .execute_workflow("fundamental_analysis", params(&[("ticker", "AAPL")]), ExecutionMode::Direct)
        .await;

    assert_eq!(result.status, WorkflowStatus::Success, "{:?}", result.errors);
    let analyze_args = std::fs::read_to_string(project.path("analyze.args")).unwrap();
    assert!(analyze_args.contains(&format!(
        "--discovery_file {}",
        project.path("out/discovery.json").display()
    )));
    assert_eq!(result.final_outputs.len(), 4);
    let mean = result.overall_confidence.unwrap();
    assert!((mean - (0.95 + 0.93 * 3.0) / 4.0).abs() < 1e-9);
}

#[cfg(unix)]
#[tokio::test]
async fn test_sub_agent_mode_fails_workflow() {
    let project = TestProject::new();
    let orchestrator =
        DasvWorkflowOrchestrator::new(project.service(&fundamental_registry()), QualityGatePolicy::default());

    let result = orchestrator
        .execute_workflow("fundamental_analysis", params(&[("ticker", "AAPL")]), ExecutionMode::SubAgent)
        .await;

    assert_eq!(result.status, WorkflowStatus::Failed);
    assert!(result.phase_results.is_empty());
    assert!(result.errors[0].contains("not supported"));
}

#[tokio::test]
async fn test_export_json_and_yaml() {
    let project = TestProject::new();
    let result = orchestrator(&[])
        .execute_workflow("fundamental_analysis", params(&[("ticker", "AAPL")]), ExecutionMode::Direct)
        .await;

    let json_path = project.path("reports/workflow.json");
    result.export(&json_path).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["phase_results"].as_array().unwrap().len(), 4);

    let yaml_path = project.path("reports/workflow.yaml");
    result.export(&yaml_path).unwrap();
    let yaml = std::fs::read_to_string(&yaml_path).unwrap();
    assert!(yaml.contains("status: success"));
}
