//! Built-in workflow templates, one per analysis domain

use dasv_sdk::Phase;

use crate::execution::domain_identifier;

pub const DOMAINS: [&str; 6] = [
    "fundamental_analysis",
    "sector_analysis",
    "industry_analysis",
    "comparative_analysis",
    "macro_analysis",
    "trade_history",
];

/// Phases whose gate failure halts a workflow
const CRITICAL_PHASES: [Phase; 2] = [Phase::Discover, Phase::Analyze];

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowTemplate {
    pub domain: &'static str,
    pub phases: Vec<Phase>,
    pub critical_phases: Vec<Phase>,
    /// Parameter naming the analysis subject (`ticker`, `sector`, ...)
    pub identifier: &'static str,
}

impl WorkflowTemplate {
    pub fn is_critical(&self, phase: Phase) -> bool {
        self.critical_phases.contains(&phase)
    }
}

/// Template for a built-in domain
pub fn workflow_template(domain: &str) -> Option<WorkflowTemplate> {
    let domain = DOMAINS.iter().copied().find(|d| *d == domain)?;
    Some(WorkflowTemplate {
        domain,
        phases: Phase::ALL.to_vec(),
        critical_phases: CRITICAL_PHASES.to_vec(),
        identifier: domain_identifier(domain)?,
    })
}
