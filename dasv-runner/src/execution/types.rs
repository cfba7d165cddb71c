//! Execution result types

use chrono::{DateTime, Utc};
use dasv_sdk::Phase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Caller-supplied command parameters (ordered so command lines are stable)
pub type Parameters = BTreeMap<String, String>;

/// How a phase is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Run the phase script as a subprocess
    #[default]
    Direct,
    /// Hand the phase to an LLM sub-agent (not supported yet)
    #[value(alias = "sub_agent")]
    SubAgent,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Direct => write!(f, "direct"),
            ExecutionMode::SubAgent => write!(f, "sub_agent"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Failed,
    Partial,
    ValidationFailed,
    NotFound,
}

impl ExecutionStatus {
    /// Whether the script ran and produced usable output
    pub fn is_ok(&self) -> bool {
        matches!(self, ExecutionStatus::Success | ExecutionStatus::Partial)
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ExecutionStatus::Success => "✅",
            ExecutionStatus::Partial => "⚠️",
            ExecutionStatus::Failed => "❌",
            ExecutionStatus::ValidationFailed => "🚫",
            ExecutionStatus::NotFound => "❓",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Partial => "partial",
            ExecutionStatus::ValidationFailed => "validation_failed",
            ExecutionStatus::NotFound => "not_found",
        };
        f.write_str(s)
    }
}

/// Process-level details captured for one invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Full argv, interpreter first
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_code: Option<i32>,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Outcome of one `(domain, phase)` execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub execution_id: Uuid,
    pub domain: String,
    pub phase: Phase,
    pub mode: ExecutionMode,
    pub status: ExecutionStatus,
    pub output_files: Vec<PathBuf>,
    pub metadata: ExecutionMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub execution_time_ms: u64,
}

impl ExecutionResult {
    pub fn new(domain: &str, phase: Phase, mode: ExecutionMode, status: ExecutionStatus) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            domain: domain.to_string(),
            phase,
            mode,
            status,
            output_files: Vec::new(),
            metadata: ExecutionMetadata::default(),
            confidence_score: None,
            error_message: None,
            warnings: Vec::new(),
            timestamp: Utc::now(),
            execution_time_ms: 0,
        }
    }

    pub fn not_found(domain: &str, phase: Phase, mode: ExecutionMode, message: impl Into<String>) -> Self {
        Self::new(domain, phase, mode, ExecutionStatus::NotFound).with_error(message)
    }

    /// Validation failure; every error is also kept in `metadata.extra`
    pub fn validation_failed(domain: &str, phase: Phase, mode: ExecutionMode, errors: Vec<String>) -> Self {
        let mut result = Self::new(domain, phase, mode, ExecutionStatus::ValidationFailed)
            .with_error(format!("Parameter validation failed: {}", errors.join("; ")));
        result.metadata.extra.insert(
            "validation_errors".to_string(),
            serde_json::Value::from(errors),
        );
        result
    }

    pub fn failed(domain: &str, phase: Phase, mode: ExecutionMode, message: impl Into<String>) -> Self {
        Self::new(domain, phase, mode, ExecutionStatus::Failed).with_error(message)
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// Validation errors recorded by [`ExecutionResult::validation_failed`]
    pub fn validation_errors(&self) -> Vec<String> {
        self.metadata
            .extra
            .get("validation_errors")
            .and_then(|v| v.as_array())
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
