use std::path::Path;

use anyhow::{Context, Result};

use super::aliases::{short_alias, CommandTarget};
use super::parser::{parse_command_in, ParsedCommand};
use crate::config::RunnerConfig;
use crate::error::InterfaceError;
use crate::execution::{CommandExecutionService, ExecutionMode, ExecutionResult, PhaseExecutor};
use crate::registry::CommandScriptResolver;
use crate::workflow::{DasvWorkflowOrchestrator, QualityGatePolicy, WorkflowResult};

/// Result of one unified command
#[derive(Debug, Clone)]
pub enum InterfaceOutcome {
    Phase(ExecutionResult),
    Workflow(WorkflowResult),
}

impl InterfaceOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            InterfaceOutcome::Phase(result) => result.status.is_ok(),
            InterfaceOutcome::Workflow(result) => result.is_success(),
        }
    }

    /// Output files of the phase, or every output of the workflow
    pub fn output_files(&self) -> &[std::path::PathBuf] {
        match self {
            InterfaceOutcome::Phase(result) => &result.output_files,
            InterfaceOutcome::Workflow(result) => &result.final_outputs,
        }
    }

    /// Write the outcome as pretty JSON
    pub fn export(&self, path: &Path) -> Result<()> {
        match self {
            InterfaceOutcome::Workflow(result) => result.export(path),
            InterfaceOutcome::Phase(result) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                let json = serde_json::to_string_pretty(result)?;
                std::fs::write(path, json)
                    .with_context(|| format!("Failed to write execution report: {}", path.display()))?;
                Ok(())
            }
        }
    }
}

/// Single entry point for `<domain>:<phase>` commands
pub struct UnifiedCommandInterface<E: PhaseExecutor = CommandExecutionService> {
    orchestrator: DasvWorkflowOrchestrator<E>,
    known_domains: Vec<String>,
}

impl UnifiedCommandInterface<CommandExecutionService> {
    /// Load the registry named by `config` and wire up the real service
    pub fn from_config(config: &RunnerConfig) -> Result<Self> {
        let registry_path = config.resolved_registry_path();
        let resolver = CommandScriptResolver::from_file(&registry_path)
            .with_context(|| format!("Failed to load command registry {}", registry_path.display()))?;
        let known_domains = resolver.domains();
        let service = CommandExecutionService::new(resolver, config);
        Ok(Self {
            orchestrator: DasvWorkflowOrchestrator::new(service, config.gate_policy),
            known_domains,
        })
    }

    /// One line per registered command, e.g. `fa:discover  fundamental_analysis discover`
    pub fn list_commands(&self) -> Vec<String> {
        self.orchestrator
            .executor()
            .resolver()
            .available_commands()
            .into_iter()
            .map(|(domain, phase)| {
                let short = short_alias(&domain).unwrap_or(domain.as_str());
                format!("{}:{}  {} {}", short, phase, domain, phase)
            })
            .collect()
    }
}

impl<E: PhaseExecutor> UnifiedCommandInterface<E> {
    pub fn new(executor: E, policy: QualityGatePolicy, known_domains: Vec<String>) -> Self {
        Self {
            orchestrator: DasvWorkflowOrchestrator::new(executor, policy),
            known_domains,
        }
    }

    pub fn orchestrator(&self) -> &DasvWorkflowOrchestrator<E> {
        &self.orchestrator
    }

    pub fn parse(&self, command: &str) -> Result<ParsedCommand, InterfaceError> {
        parse_command_in(command, &self.known_domains)
    }

    pub async fn execute(&self, command: &str, mode: ExecutionMode) -> Result<InterfaceOutcome, InterfaceError> {
        let parsed = self.parse(command)?;
        self.execute_parsed(parsed, mode).await
    }

    pub async fn execute_parsed(
        &self,
        parsed: ParsedCommand,
        mode: ExecutionMode,
    ) -> Result<InterfaceOutcome, InterfaceError> {
        tracing::debug!(domain = %parsed.domain, target = ?parsed.target, parameters = ?parsed.parameters, "Dispatching command");
        match parsed.target {
            CommandTarget::Phase(phase) => {
                let result = self
                    .orchestrator
                    .executor()
                    .execute_command(&parsed.domain, phase, &parsed.parameters, mode)
                    .await?;
                Ok(InterfaceOutcome::Phase(result))
            }
            CommandTarget::Workflow => {
                let result = self
                    .orchestrator
                    .execute_workflow(&parsed.domain, parsed.parameters, mode)
                    .await;
                Ok(InterfaceOutcome::Workflow(result))
            }
        }
    }
}
