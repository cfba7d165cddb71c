use async_trait::async_trait;
use chrono::Utc;
use dasv_sdk::{EnvelopeStatus, Phase, ResultEnvelope};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::params::validate_parameters;
use super::process::{run_with_timeout, ProcessOutcome, ProcessOutput};
use super::prompt::build_sub_agent_prompt;
use super::types::{ExecutionMode, ExecutionResult, ExecutionStatus, Parameters};
use crate::config::RunnerConfig;
use crate::error::ExecutionError;
use crate::registry::{CommandScriptMapping, CommandScriptResolver};

/// Executes one DASV phase for a domain.
///
/// Implemented by [`CommandExecutionService`]; the orchestrator only
/// depends on this trait so workflows can run against stubs.
#[async_trait]
pub trait PhaseExecutor: Send + Sync {
    /// Run a phase. Only conditions that cannot be expressed as an
    /// [`ExecutionResult`] (unsupported modes) are returned as errors.
    async fn execute_command(
        &self,
        domain: &str,
        phase: Phase,
        parameters: &Parameters,
        mode: ExecutionMode,
    ) -> Result<ExecutionResult, ExecutionError>;
}

/// Registry-driven phase executor that runs scripts as subprocesses
pub struct CommandExecutionService {
    resolver: CommandScriptResolver,
    project_root: PathBuf,
    interpreter: String,
    timeout: Duration,
}

impl CommandExecutionService {
    pub fn new(resolver: CommandScriptResolver, config: &RunnerConfig) -> Self {
        Self {
            resolver,
            project_root: config.project_root.clone(),
            interpreter: config.interpreter.clone(),
            timeout: config.timeout,
        }
    }

    pub fn resolver(&self) -> &CommandScriptResolver {
        &self.resolver
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Environment added on top of the parent's for a phase script
    pub fn build_environment(&self, domain: &str, phase: Phase, parameters: &Parameters) -> BTreeMap<String, String> {
        let mut env: BTreeMap<String, String> = self.resolver.path_variables().clone();
        env.insert("EXECUTION_DOMAIN".to_string(), domain.to_string());
        env.insert("EXECUTION_PHASE".to_string(), phase.to_string());
        env.insert("EXECUTION_TIMESTAMP".to_string(), Utc::now().to_rfc3339());
        for (key, value) in parameters {
            env.insert(
                format!("PARAM_{}", key.to_ascii_uppercase().replace('-', "_")),
                value.clone(),
            );
        }
        env
    }

    /// Full argv for a direct-mode run: interpreter, script, then `--key value` pairs
    pub fn build_command_line(&self, script: &Path, parameters: &Parameters) -> Vec<String> {
        let mut argv = vec![self.interpreter.clone(), script.display().to_string()];
        for (key, value) in parameters {
            argv.push(format!("--{}", key));
            argv.push(value.clone());
        }
        argv
    }

    fn anchor(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    async fn execute_direct(
        &self,
        mapping: &CommandScriptMapping,
        phase: Phase,
        parameters: &Parameters,
    ) -> ExecutionResult {
        let domain = mapping.domain.as_str();
        let script = self.anchor(&mapping.primary_script);
        if !script.is_file() {
            return ExecutionResult::not_found(
                domain,
                phase,
                ExecutionMode::Direct,
                format!("Script not found: {}", script.display()),
            );
        }

        let argv = self.build_command_line(&script, parameters);
        let env = self.build_environment(domain, phase, parameters);

        let outcome = run_with_timeout(&argv, &env, &self.project_root, self.timeout).await;

        let mut result = match outcome {
            ProcessOutcome::Finished(output) => self.result_from_output(domain, phase, output),
            ProcessOutcome::TimedOut { elapsed } => {
                tracing::warn!(domain, %phase, "Phase script timed out");
                let mut result = ExecutionResult::failed(
                    domain,
                    phase,
                    ExecutionMode::Direct,
                    format!("Command timed out after {} seconds", self.timeout.as_secs()),
                );
                result.execution_time_ms = elapsed.as_millis() as u64;
                result
            }
            ProcessOutcome::Io(e) => ExecutionResult::failed(
                domain,
                phase,
                ExecutionMode::Direct,
                format!("Failed to run {}: {}", script.display(), e),
            ),
        };

        result.metadata.command = argv;
        result.metadata.script = Some(script);
        result
    }

    fn result_from_output(&self, domain: &str, phase: Phase, output: ProcessOutput) -> ExecutionResult {
        let envelope = ResultEnvelope::find_last(&output.stdout);

        let mut result = ExecutionResult::new(domain, phase, ExecutionMode::Direct, ExecutionStatus::Success);
        result.execution_time_ms = output.elapsed.as_millis() as u64;
        result.metadata.return_code = output.return_code;

        if !output.success {
            result.status = ExecutionStatus::Failed;
            let stderr = output.stderr.trim();
            result.error_message = Some(if !stderr.is_empty() {
                stderr.to_string()
            } else if let Some(message) = envelope.as_ref().and_then(|e| e.message.clone()) {
                message
            } else {
                match output.return_code {
                    Some(code) => format!("Process exited with code {}", code),
                    None => "Process terminated by signal".to_string(),
                }
            });
        } else {
            match envelope {
                Some(envelope) => self.apply_envelope(&mut result, envelope),
                None => result
                    .warnings
                    .push("Script did not report a result envelope".to_string()),
            }
        }

        result.metadata.stdout = output.stdout;
        result.metadata.stderr = output.stderr;
        result
    }

    fn apply_envelope(&self, result: &mut ExecutionResult, envelope: ResultEnvelope) {
        result.status = match envelope.status {
            EnvelopeStatus::Success => ExecutionStatus::Success,
            EnvelopeStatus::Partial => ExecutionStatus::Partial,
            EnvelopeStatus::Failed => ExecutionStatus::Failed,
        };
        result.output_files = envelope
            .output_files
            .iter()
            .map(|f| self.anchor(Path::new(f)))
            .collect();
        result.confidence_score = envelope.confidence;
        result.warnings.extend(envelope.warnings);
        match (result.status, envelope.message) {
            (ExecutionStatus::Failed, message) => {
                result.error_message =
                    Some(message.unwrap_or_else(|| "Script reported failure".to_string()))
            }
            (_, Some(message)) => result.warnings.push(message),
            (_, None) => {}
        }
    }
}

#[async_trait]
impl PhaseExecutor for CommandExecutionService {
    async fn execute_command(
        &self,
        domain: &str,
        phase: Phase,
        parameters: &Parameters,
        mode: ExecutionMode,
    ) -> Result<ExecutionResult, ExecutionError> {
        let Some(mapping) = self.resolver.get_scripts_for_command(domain, phase.as_str()) else {
            tracing::debug!(domain, %phase, "No registry mapping");
            return Ok(ExecutionResult::not_found(
                domain,
                phase,
                mode,
                format!("No command mapping for {}:{}", domain, phase),
            ));
        };

        let errors = validate_parameters(domain, phase, parameters);
        if !errors.is_empty() {
            tracing::debug!(domain, %phase, ?errors, "Parameter validation failed");
            return Ok(ExecutionResult::validation_failed(domain, phase, mode, errors));
        }

        match mode {
            ExecutionMode::Direct => Ok(self.execute_direct(&mapping, phase, parameters).await),
            ExecutionMode::SubAgent => Err(ExecutionError::SubAgentUnsupported {
                sub_agent: mapping.sub_agent.clone(),
                prompt: build_sub_agent_prompt(&mapping, phase, parameters),
            }),
        }
    }
}
