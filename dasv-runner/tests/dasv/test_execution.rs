//! Direct-mode execution against shell stand-in scripts

#![cfg(unix)]

use super::common::{params, success_line, TestProject};
use dasv_runner::execution::{ExecutionMode, ExecutionStatus, PhaseExecutor};
use dasv_sdk::Phase;

fn registry() -> &'static str {
    r#"{
        "path_variables": {"SCRIPTS_BASE": "scripts"},
        "command_mappings": {
            "fundamental_analysis": {
                "discover": {"sub_agent": "fa_discover", "primary_script": "{SCRIPTS_BASE}/discover.sh"},
                "analyze": {"sub_agent": "fa_analyze", "primary_script": "{SCRIPTS_BASE}/analyze.sh"}
            }
        }
    }"#
}

#[tokio::test]
async fn test_success_envelope_is_parsed() {
    let project = TestProject::new();
    project.write_script(
        "scripts/discover.sh",
        &format!(
            "echo 'collecting data'\n{}",
            success_line("out/AAPL_discovery.json", 0.95)
        ),
    );
    let service = project.service(registry());

    let result = service
        .execute_command(
            "fundamental_analysis",
            Phase::Discover,
            &params(&[("ticker", "AAPL")]),
            ExecutionMode::Direct,
        )
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Success);
    assert_eq!(result.output_files, vec![project.path("out/AAPL_discovery.json")]);
    assert_eq!(result.confidence_score, Some(0.95));
    assert_eq!(result.metadata.return_code, Some(0));
    assert_eq!(result.metadata.command[0], "sh");
    assert!(result.metadata.stdout.contains("collecting data"));
}

#[tokio::test]
async fn test_script_receives_flags_and_environment() {
    let project = TestProject::new();
    project.write_script(
        "scripts/discover.sh",
        r#"echo "$1 $2 $PARAM_TICKER $EXECUTION_DOMAIN $EXECUTION_PHASE" > args.txt
echo '__DASV_RESULT__:{"status":"success","output_files":["args.txt"]}'"#,
    );
    let service = project.service(registry());

    service
        .execute_command(
            "fundamental_analysis",
            Phase::Discover,
            &params(&[("ticker", "MSFT")]),
            ExecutionMode::Direct,
        )
        .await
        .unwrap();

    let written = std::fs::read_to_string(project.path("args.txt")).unwrap();
    assert_eq!(written.trim(), "--ticker MSFT MSFT fundamental_analysis discover");
}

#[tokio::test]
async fn test_missing_required_parameter_never_spawns() {
    let project = TestProject::new();
    project.write_script("scripts/analyze.sh", "touch ran.marker");
    let service = project.service(registry());

    let result = service
        .execute_command(
            "fundamental_analysis",
            Phase::Analyze,
            &params(&[("ticker", "AAPL")]),
            ExecutionMode::Direct,
        )
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::ValidationFailed);
    assert!(result.validation_errors()[0].contains("discovery_file"));
    assert!(!project.path("ran.marker").exists());
}

#[tokio::test]
async fn test_repeated_execution_has_same_status() {
    let project = TestProject::new();
    project.write_script("scripts/discover.sh", &success_line("out/a.json", 0.91));
    let service = project.service(registry());
    let parameters = params(&[("ticker", "AAPL")]);

    let first = service
        .execute_command("fundamental_analysis", Phase::Discover, &parameters, ExecutionMode::Direct)
        .await
        .unwrap();
    let second = service
        .execute_command("fundamental_analysis", Phase::Discover, &parameters, ExecutionMode::Direct)
        .await
        .unwrap();

    assert_eq!(first.status, second.status);
    assert_ne!(first.execution_id, second.execution_id);
}

#[tokio::test]
async fn test_non_zero_exit_carries_stderr() {
    let project = TestProject::new();
    project.write_script("scripts/discover.sh", "echo 'API key missing' >&2\nexit 2");
    let service = project.service(registry());

    let result = service
        .execute_command(
            "fundamental_analysis",
            Phase::Discover,
            &params(&[("ticker", "AAPL")]),
            ExecutionMode::Direct,
        )
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(result.error_message.as_deref(), Some("API key missing"));
    assert_eq!(result.metadata.return_code, Some(2));
}

#[tokio::test]
async fn test_failed_envelope_with_zero_exit() {
    let project = TestProject::new();
    project.write_script(
        "scripts/discover.sh",
        r#"echo '__DASV_RESULT__:{"status":"failed","message":"No filings found for AAPL"}'"#,
    );
    let service = project.service(registry());

    let result = service
        .execute_command(
            "fundamental_analysis",
            Phase::Discover,
            &params(&[("ticker", "AAPL")]),
            ExecutionMode::Direct,
        )
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(result.error_message.as_deref(), Some("No filings found for AAPL"));
    assert_eq!(result.metadata.return_code, Some(0));
}

#[tokio::test]
async fn test_non_zero_exit_without_stderr_uses_envelope_message() {
    let project = TestProject::new();
    project.write_script(
        "scripts/discover.sh",
        "echo '__DASV_RESULT__:{\"status\":\"failed\",\"message\":\"Rate limited\"}'\nexit 4",
    );
    let service = project.service(registry());

    let result = service
        .execute_command(
            "fundamental_analysis",
            Phase::Discover,
            &params(&[("ticker", "AAPL")]),
            ExecutionMode::Direct,
        )
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(result.error_message.as_deref(), Some("Rate limited"));
    assert_eq!(result.metadata.return_code, Some(4));
}

#[tokio::test]
async fn test_missing_envelope_warns() {
    let project = TestProject::new();
    project.write_script("scripts/discover.sh", "echo 'done'");
    let service = project.service(registry());

    let result = service
        .execute_command(
            "fundamental_analysis",
            Phase::Discover,
            &params(&[("ticker", "AAPL")]),
            ExecutionMode::Direct,
        )
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Success);
    assert!(result.output_files.is_empty());
    assert_eq!(result.warnings.len(), 1);
}

#[tokio::test]
async fn test_timeout_fails() {
    let project = TestProject::new();
    project.write_script("scripts/discover.sh", "sleep 5");
    let resolver = dasv_runner::registry::CommandScriptResolver::from_json_str(registry()).unwrap();
    let config = dasv_runner::RunnerConfig {
        timeout: std::time::Duration::from_secs(1),
        ..project.config()
    };
    let service = dasv_runner::execution::CommandExecutionService::new(resolver, &config);

    let result = service
        .execute_command(
            "fundamental_analysis",
            Phase::Discover,
            &params(&[("ticker", "AAPL")]),
            ExecutionMode::Direct,
        )
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(
        result.error_message.as_deref(),
        Some("Command timed out after 1 seconds")
    );
}
