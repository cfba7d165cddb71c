//! Unified command interface against a scratch project

use super::common::{fundamental_registry, TestProject};
use dasv_runner::execution::{ExecutionMode, ExecutionStatus};
use dasv_runner::interface::{parse_command, CommandTarget, InterfaceOutcome, UnifiedCommandInterface};
use dasv_runner::InterfaceError;
use dasv_sdk::Phase;

fn interface(project: &TestProject) -> UnifiedCommandInterface {
    project.write("scripts/command_script_registry.json", &fundamental_registry());
    UnifiedCommandInterface::from_config(&project.config()).unwrap()
}

#[test]
fn test_alias_expansion() {
    let parsed = parse_command("fa:d AAPL").unwrap();
    assert_eq!(parsed.domain, "fundamental_analysis");
    assert_eq!(parsed.target, CommandTarget::Phase(Phase::Discover));
    assert_eq!(parsed.parameters["ticker"], "AAPL");

    let parsed = parse_command("th:workflow main_portfolio").unwrap();
    assert_eq!(parsed.domain, "trade_history");
    assert_eq!(parsed.target, CommandTarget::Workflow);
    assert_eq!(parsed.parameters["portfolio"], "main_portfolio");
}

#[test]
fn test_list_commands_uses_short_aliases() {
    let project = TestProject::new();
    let commands = interface(&project).list_commands();
    assert_eq!(commands.len(), 4);
    assert!(commands.iter().any(|c| c.starts_with("fa:discover")));
}

#[cfg(unix)]
#[tokio::test]
async fn test_execute_phase_command() {
    let project = TestProject::new();
    project.write_script(
        "scripts/discover.sh",
        r#"echo '__DASV_RESULT__:{"status":"partial","output_files":["out/d.json"],"message":"quotes only"}'"#,
    );

    let outcome = interface(&project)
        .execute("fa:d AAPL", ExecutionMode::Direct)
        .await
        .unwrap();

    assert!(outcome.is_success());
    match outcome {
        InterfaceOutcome::Phase(result) => {
            assert_eq!(result.status, ExecutionStatus::Partial);
            assert_eq!(result.warnings, vec!["quotes only".to_string()]);
        }
        other => panic!("expected a phase outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_domain_is_reported() {
    let project = TestProject::new();
    let err = interface(&project)
        .execute("xx:d AAPL", ExecutionMode::Direct)
        .await
        .unwrap_err();
    assert!(matches!(err, InterfaceError::UnknownDomain { .. }));
}

#[tokio::test]
async fn test_missing_script_is_not_found() {
    let project = TestProject::new();
    let outcome = interface(&project)
        .execute("fa:d AAPL", ExecutionMode::Direct)
        .await
        .unwrap();
    assert!(!outcome.is_success());
}
