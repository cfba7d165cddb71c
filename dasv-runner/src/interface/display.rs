//! Console summaries for the binaries

use dasv_sdk::{log_error, log_warning};

use crate::consistency::ConsistencyReport;
use crate::execution::ExecutionResult;
use crate::workflow::WorkflowResult;

pub fn print_execution_result(result: &ExecutionResult) {
    println!(
        "{} {}:{} {} ({} ms)",
        result.status.emoji(),
        result.domain,
        result.phase,
        result.status,
        result.execution_time_ms
    );
    for file in &result.output_files {
        println!("   📄 {}", file.display());
    }
    if let Some(confidence) = result.confidence_score {
        println!("   Confidence: {:.2}", confidence);
    }
    if let Some(error) = &result.error_message {
        log_error!(error);
    }
    for warning in &result.warnings {
        log_warning!(warning);
    }
}

pub fn print_workflow_result(result: &WorkflowResult) {
    println!();
    println!("========================================");
    println!(
        "{} Workflow {} for {}: {}",
        result.status.emoji(),
        result.workflow_id,
        result.domain,
        result.status
    );
    println!("========================================");
    for phase in &result.phase_results {
        match &phase.execution {
            Some(execution) => println!(
                "  {:<11} {:<8} {} {}",
                phase.phase.as_str(),
                phase.gate,
                execution.status.emoji(),
                execution.status
            ),
            None => println!("  {:<11} {:<8}", phase.phase.as_str(), phase.gate),
        }
        for issue in &phase.gate_issues {
            println!("      - {}", issue);
        }
    }
    if let Some(confidence) = result.overall_confidence {
        println!("Overall confidence: {:.2}", confidence);
    }
    for file in &result.final_outputs {
        println!("   📄 {}", file.display());
    }
    for error in &result.errors {
        log_error!(error);
    }
    for warning in &result.warnings {
        log_warning!(warning);
    }
    println!("Duration: {} ms", result.total_duration_ms);
}

pub fn print_consistency_report(report: &ConsistencyReport) {
    let emoji = if report.is_clean() { "✅" } else { "⚠️" };
    println!(
        "{} {}: {} checked, {} issue(s), score {:.2}",
        emoji,
        report.kind,
        report.checked,
        report.issues.len(),
        report.score
    );
    for issue in &report.issues {
        println!("   - {}", issue);
    }
}
