use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::types::{
    CliService, CommandScriptMapping, MappingEntry, RegistryFile, TwitterCommand,
};
use crate::error::RegistryError;

/// `{NAME}` placeholder in registry paths
pub(crate) static VARIABLE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Bound on nested variable expansion (`A -> {B}/x -> {C}/y/x ...`)
const MAX_EXPANSION_PASSES: usize = 8;

/// Looks up script mappings for `(domain, phase)` pairs.
///
/// Construction loads and validates the registry JSON; lookups afterwards
/// are pure and never fail.
#[derive(Debug, Clone)]
pub struct CommandScriptResolver {
    registry: RegistryFile,
    variables: BTreeMap<String, String>,
}

impl CommandScriptResolver {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let resolver = Self::from_json_str(&content)?;
        tracing::debug!(
            registry = %path.display(),
            mappings = resolver.available_commands().len(),
            "Loaded command registry"
        );
        Ok(resolver)
    }

    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let registry: RegistryFile = serde_json::from_str(json)?;
        Ok(Self::from_registry(registry))
    }

    pub fn from_registry(registry: RegistryFile) -> Self {
        let variables = expand_variables(&registry.path_variables);
        Self {
            registry,
            variables,
        }
    }

    /// Resolved mapping for a command, `None` if either key is absent
    pub fn get_scripts_for_command(&self, domain: &str, phase: &str) -> Option<CommandScriptMapping> {
        let entry = self.registry.command_mappings.get(domain)?.get(phase)?;
        Some(self.resolve_entry(domain, phase, entry))
    }

    /// Replace `{VARIABLE}` tokens with their path values.
    ///
    /// Tokens naming unknown variables are left as-is.
    pub fn resolve_path(&self, raw: &str) -> String {
        substitute(raw, &self.variables)
    }

    /// Variable names still present in a path after resolution
    pub fn unresolved_tokens(&self, raw: &str) -> Vec<String> {
        let resolved = self.resolve_path(raw);
        VARIABLE_TOKEN
            .captures_iter(&resolved)
            .map(|c| c[1].to_string())
            .collect()
    }

    /// Every `(domain, phase)` pair in the registry, sorted
    pub fn available_commands(&self) -> Vec<(String, String)> {
        self.registry
            .command_mappings
            .iter()
            .flat_map(|(domain, phases)| {
                phases
                    .keys()
                    .map(move |phase| (domain.clone(), phase.clone()))
            })
            .collect()
    }

    pub fn domains(&self) -> Vec<String> {
        self.registry.command_mappings.keys().cloned().collect()
    }

    /// Phase keys registered for a domain
    pub fn phases_for(&self, domain: &str) -> Vec<String> {
        self.registry
            .command_mappings
            .get(domain)
            .map(|phases| phases.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Fully expanded path variables
    pub fn path_variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    pub fn get_twitter_command(&self, name: &str) -> Option<TwitterCommand> {
        let entry = self.registry.twitter_commands.get(name)?;
        Some(TwitterCommand {
            name: name.to_string(),
            primary_script: self.path(&entry.primary_script),
            template: entry.template.as_deref().map(|t| self.path(t)),
            output_dir: entry.output_dir.as_deref().map(|d| self.path(d)),
            description: entry.description.clone(),
        })
    }

    pub fn twitter_commands(&self) -> Vec<String> {
        self.registry.twitter_commands.keys().cloned().collect()
    }

    pub fn get_cli_service(&self, name: &str) -> Option<CliService> {
        let entry = self.registry.cli_services.get(name)?;
        Some(CliService {
            name: name.to_string(),
            script: self.path(&entry.script),
            description: entry.description.clone(),
            capabilities: entry.capabilities.clone(),
        })
    }

    pub fn cli_services(&self) -> Vec<String> {
        self.registry.cli_services.keys().cloned().collect()
    }

    /// Raw (unresolved) registry contents
    pub fn registry(&self) -> &RegistryFile {
        &self.registry
    }

    fn path(&self, raw: &str) -> PathBuf {
        PathBuf::from(self.resolve_path(raw))
    }

    fn resolve_entry(&self, domain: &str, phase: &str, entry: &MappingEntry) -> CommandScriptMapping {
        CommandScriptMapping {
            domain: domain.to_string(),
            phase: phase.to_string(),
            sub_agent: entry.sub_agent.clone(),
            primary_script: self.path(&entry.primary_script),
            cli_services: entry.cli_services.iter().map(|s| self.path(s)).collect(),
            schema: self.path(&entry.schema),
            template: entry.template.as_deref().map(|t| self.path(t)),
            output_dir: self.path(&entry.output_dir),
            file_pattern: entry.file_pattern.clone(),
            supporting_scripts: entry
                .supporting_scripts
                .iter()
                .map(|s| self.path(s))
                .collect(),
        }
    }
}

fn substitute(raw: &str, variables: &BTreeMap<String, String>) -> String {
    VARIABLE_TOKEN
        .replace_all(raw, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Expand variables that reference other variables until a fixed point
fn expand_variables(raw: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut variables = raw.clone();
    for _ in 0..MAX_EXPANSION_PASSES {
        let next: BTreeMap<String, String> = variables
            .iter()
            .map(|(name, value)| (name.clone(), substitute(value, &variables)))
            .collect();
        if next == variables {
            break;
        }
        variables = next;
    }
    variables
}
