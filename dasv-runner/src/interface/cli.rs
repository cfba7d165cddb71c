//! CLI argument definitions for the `dasv` and `dasv-workflow` binaries

use clap::{Args, Parser, Subcommand};
use dasv_sdk::Phase;
use std::path::PathBuf;

use crate::config::RunnerConfig;
use crate::execution::{ExecutionMode, Parameters};

/// Unified DASV command interface
#[derive(Parser, Debug, Clone)]
#[command(name = "dasv")]
#[command(about = "Run DASV phases and workflows with short <domain>:<phase> commands")]
#[command(long_about = None)]
pub struct DasvCli {
    #[command(flatten)]
    pub runner: RunnerArgs,

    #[command(subcommand)]
    pub command: DasvCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DasvCommand {
    /// Run a command such as `fa:d AAPL` or `sa:workflow technology`
    Run {
        /// Command string; quote it or pass the tokens separately
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,

        /// Execution mode
        #[arg(long, value_enum, default_value_t = ExecutionMode::Direct)]
        mode: ExecutionMode,

        /// Write the result as JSON (or YAML for workflows ending in .yaml/.yml)
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// List registered commands
    List,

    /// Check the registry against the files on disk
    CheckRegistry,

    /// Find hardcoded paths that should use registry path variables
    SyncPaths {
        /// Directory to scan
        dir: PathBuf,

        /// Rewrite hardcoded paths in place
        #[arg(long)]
        fix: bool,

        /// Skip copying originals to .dasv_backups before fixing
        #[arg(long)]
        no_backup: bool,
    },
}

/// Options shared by both binaries; unset flags fall back to DASV_* env vars
#[derive(Args, Debug, Clone, Default)]
pub struct RunnerArgs {
    /// Registry file (relative paths resolve against the project root)
    #[arg(long, global = true)]
    pub registry: Option<PathBuf>,

    /// Project root scripts run in
    #[arg(long, global = true)]
    pub project_root: Option<PathBuf>,

    /// Interpreter used for phase scripts
    #[arg(long, global = true)]
    pub interpreter: Option<String>,

    /// Per-script timeout in seconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Directory consistency reports are written to
    #[arg(long, global = true)]
    pub reports_dir: Option<PathBuf>,
}

impl RunnerArgs {
    pub fn apply(&self, config: &mut RunnerConfig) {
        if let Some(path) = &self.registry {
            config.registry_path = path.clone();
        }
        if let Some(root) = &self.project_root {
            config.project_root = root.clone();
        }
        if let Some(interpreter) = &self.interpreter {
            config.interpreter = interpreter.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = std::time::Duration::from_secs(secs);
        }
        if let Some(dir) = &self.reports_dir {
            config.reports_dir = dir.clone();
        }
    }
}

/// Run the full DASV chain for one domain
#[derive(Parser, Debug, Clone)]
#[command(name = "dasv-workflow")]
#[command(about = "Run discover → analyze → synthesize → validate for one domain")]
pub struct WorkflowArgs {
    /// Domain name or alias (fundamental_analysis, fa, sector, ...)
    pub domain: String,

    #[arg(long)]
    pub ticker: Option<String>,

    #[arg(long)]
    pub sector: Option<String>,

    #[arg(long)]
    pub industry: Option<String>,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub portfolio: Option<String>,

    /// Extra parameters as key=value (repeatable)
    #[arg(long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    #[arg(long, value_enum, default_value_t = ExecutionMode::Direct)]
    pub mode: ExecutionMode,

    /// Resume at this phase (d, a, s, v or full name)
    #[arg(long)]
    pub start_from: Option<Phase>,

    /// Write the workflow result as JSON, or YAML for .yaml/.yml
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Confidence a phase must report to pass its quality gate
    #[arg(long)]
    pub confidence_threshold: Option<f64>,

    #[command(flatten)]
    pub runner: RunnerArgs,
}

impl WorkflowArgs {
    /// Identifier flags plus `--param` pairs, later values winning
    pub fn parameters(&self) -> Parameters {
        let mut parameters = Parameters::new();
        let identifiers = [
            ("ticker", &self.ticker),
            ("sector", &self.sector),
            ("industry", &self.industry),
            ("region", &self.region),
            ("portfolio", &self.portfolio),
        ];
        for (key, value) in identifiers {
            if let Some(value) = value {
                parameters.insert(key.to_string(), value.clone());
            }
        }
        for (key, value) in &self.params {
            parameters.insert(key.clone(), value.clone());
        }
        parameters
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}
