//! Runner configuration
//!
//! Settings are passed into the resolver, execution service and
//! orchestrator through their constructors; nothing is read from globals.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::workflow::QualityGatePolicy;

pub const DEFAULT_REGISTRY_PATH: &str = "scripts/command_script_registry.json";
pub const DEFAULT_REPORTS_DIR: &str = "data/outputs/reports";
pub const DEFAULT_INTERPRETER: &str = "python";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration shared by the DASV binaries
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Registry JSON (relative paths are resolved against `project_root`)
    pub registry_path: PathBuf,
    /// Working directory for phase scripts and base for relative paths
    pub project_root: PathBuf,
    /// Program used to launch phase scripts
    pub interpreter: String,
    /// Deadline for a single phase script
    pub timeout: Duration,
    /// Where consistency reports are written
    pub reports_dir: PathBuf,
    pub gate_policy: QualityGatePolicy,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from(DEFAULT_REGISTRY_PATH),
            project_root: PathBuf::from("."),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            gate_policy: QualityGatePolicy::default(),
        }
    }
}

impl RunnerConfig {
    /// Build a configuration from process environment variables.
    ///
    /// Call `dotenv::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(root) = lookup("DASV_PROJECT_ROOT") {
            config.project_root = PathBuf::from(root);
        }
        if let Some(registry) = lookup("DASV_REGISTRY") {
            config.registry_path = PathBuf::from(registry);
        }
        if let Some(reports) = lookup("DASV_REPORTS_DIR") {
            config.reports_dir = PathBuf::from(reports);
        }
        if let Some(interpreter) = lookup("DASV_PYTHON") {
            if interpreter.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    var: "DASV_PYTHON",
                    value: interpreter,
                    reason: "must not be empty".to_string(),
                });
            }
            config.interpreter = interpreter;
        }
        if let Some(raw) = lookup("DASV_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    var: "DASV_TIMEOUT_SECS",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    var: "DASV_TIMEOUT_SECS",
                    value: raw,
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup("DASV_CONFIDENCE_THRESHOLD") {
            config.gate_policy.confidence_threshold = parse_threshold(&raw)?;
        }
        if let Some(raw) = lookup("DASV_HALT_ON_CRITICAL") {
            config.gate_policy.halt_on_critical_failure = parse_bool("DASV_HALT_ON_CRITICAL", &raw)?;
        }

        Ok(config)
    }

    /// Registry path with a relative value anchored at the project root
    pub fn resolved_registry_path(&self) -> PathBuf {
        anchor(&self.project_root, &self.registry_path)
    }

    /// Reports directory with a relative value anchored at the project root
    pub fn resolved_reports_dir(&self) -> PathBuf {
        anchor(&self.project_root, &self.reports_dir)
    }
}

/// Parse a confidence threshold in `[0, 1]`
pub fn parse_threshold(raw: &str) -> Result<f64, ConfigError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| ConfigError::InvalidValue {
            var: "DASV_CONFIDENCE_THRESHOLD",
            value: raw.to_string(),
            reason: e.to_string(),
        })?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidValue {
            var: "DASV_CONFIDENCE_THRESHOLD",
            value: raw.to_string(),
            reason: "must be between 0 and 1".to_string(),
        });
    }
    Ok(value)
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

fn anchor(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
