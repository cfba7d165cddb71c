//! Registry file layout and resolved mapping types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Raw contents of `command_script_registry.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    /// Variable name -> path (may reference other variables)
    #[serde(default)]
    pub path_variables: BTreeMap<String, String>,

    /// domain -> phase -> mapping
    #[serde(default)]
    pub command_mappings: BTreeMap<String, BTreeMap<String, MappingEntry>>,

    #[serde(default)]
    pub twitter_commands: BTreeMap<String, TwitterCommandEntry>,

    #[serde(default)]
    pub cli_services: BTreeMap<String, CliServiceEntry>,
}

/// One `(domain, phase)` entry as written in the registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Sub-agent responsible for this phase
    #[serde(default)]
    pub sub_agent: String,

    pub primary_script: String,

    /// CLI service scripts the primary script calls
    #[serde(default)]
    pub cli_services: Vec<String>,

    #[serde(default)]
    pub schema: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default)]
    pub output_dir: String,

    /// Output file name pattern (e.g. `{ticker}_{date}.json`)
    #[serde(default)]
    pub file_pattern: String,

    #[serde(default)]
    pub supporting_scripts: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwitterCommandEntry {
    pub primary_script: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,

    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliServiceEntry {
    pub script: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// A registry entry with every path-valued field resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandScriptMapping {
    pub domain: String,
    pub phase: String,
    pub sub_agent: String,
    pub primary_script: PathBuf,
    pub cli_services: Vec<PathBuf>,
    pub schema: PathBuf,
    pub template: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub file_pattern: String,
    pub supporting_scripts: Vec<PathBuf>,
}

impl CommandScriptMapping {
    /// All script paths this mapping depends on, primary first
    pub fn all_scripts(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.primary_script)
            .chain(self.cli_services.iter())
            .chain(self.supporting_scripts.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwitterCommand {
    pub name: String,
    pub primary_script: PathBuf,
    pub template: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CliService {
    pub name: String,
    pub script: PathBuf,
    pub description: String,
    pub capabilities: Vec<String>,
}
