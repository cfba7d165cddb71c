//! Workflow result types

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dasv_sdk::Phase;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::execution::{ExecutionMode, ExecutionResult, Parameters};

/// Verdict of a phase's quality gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityGateResult {
    Pass,
    Fail,
    Warning,
    Skip,
}

impl fmt::Display for QualityGateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityGateResult::Pass => "pass",
            QualityGateResult::Fail => "fail",
            QualityGateResult::Warning => "warning",
            QualityGateResult::Skip => "skip",
        };
        f.write_str(s)
    }
}

/// Overall outcome of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Every executed phase passed its gate
    Success,
    /// All phases ran but at least one gate warned or failed
    PartialSuccess,
    /// A critical phase failed its gate and the chain halted
    QualityGateFailed,
    /// The workflow could not run (unknown domain, executor error)
    Failed,
}

impl WorkflowStatus {
    pub fn emoji(&self) -> &'static str {
        match self {
            WorkflowStatus::Success => "✅",
            WorkflowStatus::PartialSuccess => "⚠️",
            WorkflowStatus::QualityGateFailed => "🛑",
            WorkflowStatus::Failed => "❌",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowStatus::Success => "success",
            WorkflowStatus::PartialSuccess => "partial_success",
            WorkflowStatus::QualityGateFailed => "quality_gate_failed",
            WorkflowStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One phase of a workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowPhaseResult {
    pub phase: Phase,
    /// `None` when the phase was skipped
    pub execution: Option<ExecutionResult>,
    pub gate: QualityGateResult,
    /// Reasons the gate did not pass
    #[serde(default)]
    pub gate_issues: Vec<String>,
}

impl WorkflowPhaseResult {
    pub fn skipped(phase: Phase) -> Self {
        Self {
            phase,
            execution: None,
            gate: QualityGateResult::Skip,
            gate_issues: Vec::new(),
        }
    }

    pub fn output_files(&self) -> &[PathBuf] {
        self.execution
            .as_ref()
            .map(|e| e.output_files.as_slice())
            .unwrap_or(&[])
    }
}

/// Aggregate result of one domain workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub workflow_id: Uuid,
    pub domain: String,
    pub parameters: Parameters,
    pub mode: ExecutionMode,
    pub status: WorkflowStatus,
    pub phase_results: Vec<WorkflowPhaseResult>,
    /// Mean of the confidence scores phases reported
    pub overall_confidence: Option<f64>,
    pub final_outputs: Vec<PathBuf>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_duration_ms: u64,
}

impl WorkflowResult {
    pub fn new(domain: &str, parameters: Parameters, mode: ExecutionMode) -> Self {
        Self {
            workflow_id: Uuid::new_v4(),
            domain: domain.to_string(),
            parameters,
            mode,
            status: WorkflowStatus::Success,
            phase_results: Vec::new(),
            overall_confidence: None,
            final_outputs: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
            total_duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            WorkflowStatus::Success | WorkflowStatus::PartialSuccess
        )
    }

    pub fn phase(&self, phase: Phase) -> Option<&WorkflowPhaseResult> {
        self.phase_results.iter().find(|r| r.phase == phase)
    }

    /// Phases that actually invoked the executor
    pub fn executed_phases(&self) -> Vec<Phase> {
        self.phase_results
            .iter()
            .filter(|r| r.execution.is_some())
            .map(|r| r.phase)
            .collect()
    }

    /// Stamp completion time and derived fields
    pub(crate) fn finish(&mut self) {
        let confidences: Vec<f64> = self
            .phase_results
            .iter()
            .filter_map(|r| r.execution.as_ref().and_then(|e| e.confidence_score))
            .collect();
        self.overall_confidence = if confidences.is_empty() {
            None
        } else {
            Some(confidences.iter().sum::<f64>() / confidences.len() as f64)
        };
        self.final_outputs = self
            .phase_results
            .iter()
            .flat_map(|r| r.output_files().iter().cloned())
            .collect();
        let now = Utc::now();
        self.total_duration_ms = (now - self.started_at).num_milliseconds().max(0) as u64;
        self.completed_at = Some(now);
    }

    /// Write the result as JSON, or YAML when the path ends in `.yaml`/`.yml`
    pub fn export(&self, path: &Path) -> Result<()> {
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let content = if is_yaml {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write workflow report: {}", path.display()))?;
        Ok(())
    }
}
