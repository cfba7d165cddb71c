//! Per-phase quality gates

use serde::{Deserialize, Serialize};

use super::types::QualityGateResult;
use crate::execution::{ExecutionResult, ExecutionStatus};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.9;

/// Gate thresholds and the halting rule for critical phases
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityGatePolicy {
    /// Reported confidence below this fails the gate
    pub confidence_threshold: f64,
    /// A phase that produced no output files fails the gate
    pub require_output_files: bool,
    /// Stop the workflow when a critical phase fails its gate
    pub halt_on_critical_failure: bool,
}

impl Default for QualityGatePolicy {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            require_output_files: true,
            halt_on_critical_failure: true,
        }
    }
}

impl QualityGatePolicy {
    /// Judge one execution. Returns the verdict and the reasons it did not pass.
    pub fn evaluate(&self, result: &ExecutionResult) -> (QualityGateResult, Vec<String>) {
        let mut issues = Vec::new();

        if !result.status.is_ok() {
            issues.push(match &result.error_message {
                Some(message) => format!("Execution {}: {}", result.status, message),
                None => format!("Execution {}", result.status),
            });
            return (QualityGateResult::Fail, issues);
        }

        if let Some(confidence) = result.confidence_score {
            if confidence < self.confidence_threshold {
                issues.push(format!(
                    "Confidence {:.2} below threshold {:.2}",
                    confidence, self.confidence_threshold
                ));
            }
        }

        if self.require_output_files && result.output_files.is_empty() {
            issues.push("No output files produced".to_string());
        }

        if !issues.is_empty() {
            return (QualityGateResult::Fail, issues);
        }

        if result.status == ExecutionStatus::Partial {
            issues.push("Execution completed partially".to_string());
            return (QualityGateResult::Warning, issues);
        }

        (QualityGateResult::Pass, issues)
    }
}
