//! DASV workflow orchestration
//!
//! - `templates` - built-in phase lists per domain
//! - `gates` - quality gate policy applied after every phase
//! - `orchestrator` - the phase sequencer
//! - `types` - phase and workflow results

pub mod gates;
pub mod orchestrator;
pub mod templates;
pub mod types;

pub use gates::QualityGatePolicy;
pub use orchestrator::{DasvWorkflowOrchestrator, WorkflowOptions};
pub use templates::{workflow_template, WorkflowTemplate, DOMAINS};
pub use types::{QualityGateResult, WorkflowPhaseResult, WorkflowResult, WorkflowStatus};
