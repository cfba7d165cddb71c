//! Sequential DASV workflow orchestration
//!
//! Runs discover → analyze → synthesize → validate for one domain,
//! feeding each phase's first output file into the next phase and
//! applying the quality gate after every phase.

use dasv_sdk::{log_phase_complete_console, log_phase_failed_console, log_phase_start_console, log_warning, Phase};

use super::gates::QualityGatePolicy;
use super::templates::workflow_template;
use super::types::{QualityGateResult, WorkflowPhaseResult, WorkflowResult, WorkflowStatus};
use crate::execution::{ExecutionMode, Parameters, PhaseExecutor};

/// Per-run options
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowOptions {
    /// Resume at this phase; earlier phases are recorded as skipped and the
    /// caller must supply the phase's input file parameter
    pub start_from: Option<Phase>,
}

pub struct DasvWorkflowOrchestrator<E: PhaseExecutor> {
    executor: E,
    policy: QualityGatePolicy,
}

impl<E: PhaseExecutor> DasvWorkflowOrchestrator<E> {
    pub fn new(executor: E, policy: QualityGatePolicy) -> Self {
        Self { executor, policy }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn policy(&self) -> &QualityGatePolicy {
        &self.policy
    }

    pub async fn execute_workflow(&self, domain: &str, parameters: Parameters, mode: ExecutionMode) -> WorkflowResult {
        self.execute_workflow_with(domain, parameters, mode, WorkflowOptions::default())
            .await
    }

    pub async fn execute_workflow_with(
        &self,
        domain: &str,
        parameters: Parameters,
        mode: ExecutionMode,
        options: WorkflowOptions,
    ) -> WorkflowResult {
        let mut result = WorkflowResult::new(domain, parameters.clone(), mode);

        let Some(template) = workflow_template(domain) else {
            result.status = WorkflowStatus::Failed;
            result.errors.push(format!("Unknown workflow domain '{}'", domain));
            result.finish();
            return result;
        };

        tracing::info!(domain, workflow_id = %result.workflow_id, %mode, "Starting DASV workflow");

        let mut params = parameters;
        let mut halted = false;
        let mut degraded = false;

        for (index, phase) in template.phases.iter().copied().enumerate() {
            if options.start_from.is_some_and(|start| phase < start) {
                result.phase_results.push(WorkflowPhaseResult::skipped(phase));
                continue;
            }

            log_phase_start_console!(index + 1, phase, describe(domain, &params));

            let execution = match self.executor.execute_command(domain, phase, &params, mode).await {
                Ok(execution) => execution,
                Err(e) => {
                    tracing::error!(domain, %phase, error = %e, "Phase could not be executed");
                    log_phase_failed_console!(phase, e);
                    result.errors.push(format!("{}: {}", phase, e));
                    result.status = WorkflowStatus::Failed;
                    result.finish();
                    return result;
                }
            };

            let (gate, issues) = self.policy.evaluate(&execution);
            tracing::info!(domain, %phase, status = %execution.status, %gate, "Phase finished");

            if execution.status.is_ok() {
                if let (Some(param), Some(first)) = (phase.output_parameter(), execution.output_files.first()) {
                    params.insert(param.to_string(), first.display().to_string());
                }
            }

            match gate {
                QualityGateResult::Pass | QualityGateResult::Skip => log_phase_complete_console!(phase),
                QualityGateResult::Warning => {
                    degraded = true;
                    for issue in &issues {
                        log_warning!("{}: {}", phase, issue);
                        result.warnings.push(format!("{}: {}", phase, issue));
                    }
                }
                QualityGateResult::Fail => {
                    degraded = true;
                    log_phase_failed_console!(phase, issues.join("; "));
                    let message = format!("{} quality gate failed: {}", phase, issues.join("; "));
                    if template.is_critical(phase) && self.policy.halt_on_critical_failure {
                        halted = true;
                        result.errors.push(message);
                    } else {
                        result.warnings.push(message);
                    }
                }
            }

            result.phase_results.push(WorkflowPhaseResult {
                phase,
                execution: Some(execution),
                gate,
                gate_issues: issues,
            });

            if halted {
                tracing::warn!(domain, %phase, "Critical phase failed its quality gate, halting workflow");
                break;
            }
        }

        result.status = if halted {
            WorkflowStatus::QualityGateFailed
        } else if degraded {
            WorkflowStatus::PartialSuccess
        } else {
            WorkflowStatus::Success
        };
        result.finish();

        tracing::info!(domain, workflow_id = %result.workflow_id, status = %result.status, "Workflow finished");
        result
    }
}

fn describe(domain: &str, params: &Parameters) -> String {
    let args: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{} {}", domain, args.join(" "))
}
