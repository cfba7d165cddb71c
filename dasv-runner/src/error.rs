//! Error types for the DASV runner
//!
//! Only conditions that stop an operation outright are errors. Missing
//! registry mappings, parameter validation failures and failing
//! subprocesses are reported as structured results instead.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load the command registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read registry file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid registry JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised past the execution service boundary
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecutionError {
    /// Sub-agent execution is not implemented; the prepared prompt is
    /// carried so callers can show or forward it
    #[error("Sub-agent execution is not supported yet (sub-agent '{sub_agent}')")]
    SubAgentUnsupported { sub_agent: String, prompt: String },
}

/// Failure to parse or dispatch a unified command string
#[derive(Debug, Error, PartialEq)]
pub enum InterfaceError {
    #[error("Empty command")]
    Empty,

    #[error("Invalid command '{0}': expected <domain>:<phase> [args...]")]
    MissingSeparator(String),

    #[error("Unknown domain '{}'{}", .given, suggestion_suffix(.suggestion))]
    UnknownDomain {
        given: String,
        suggestion: Option<String>,
    },

    #[error("Unknown phase '{}'{}", .given, suggestion_suffix(.suggestion))]
    UnknownPhase {
        given: String,
        suggestion: Option<String>,
    },

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

/// Invalid runner configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Failures while scanning or fixing files
#[derive(Debug, Error)]
pub enum ConsistencyError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConsistencyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
