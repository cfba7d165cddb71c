//! Single-phase command execution
//!
//! Resolves a `(domain, phase)` mapping, validates parameters and runs
//! the phase script. Results come back through the structured
//! `__DASV_RESULT__:` envelope defined in `dasv_sdk`.

pub mod params;
pub mod process;
pub mod prompt;
pub mod service;
pub mod types;

pub use params::{domain_identifier, required_parameter, validate_parameters};
pub use service::{CommandExecutionService, PhaseExecutor};
pub use types::{ExecutionMetadata, ExecutionMode, ExecutionResult, ExecutionStatus, Parameters};
