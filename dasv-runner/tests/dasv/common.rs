//! Common utilities for DASV runner tests

#![allow(dead_code)]

use dasv_runner::execution::CommandExecutionService;
use dasv_runner::registry::CommandScriptResolver;
use dasv_runner::RunnerConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Registry from the end-to-end example
pub const DEMO_REGISTRY: &str = r#"{
    "command_mappings": {
        "demo": {
            "discover": {
                "sub_agent": "x",
                "primary_script": "{SCRIPTS_BASE}/d.py",
                "cli_services": [],
                "schema": "s.json",
                "output_dir": "{DATA_OUTPUTS}/demo",
                "file_pattern": "demo.json"
            }
        }
    },
    "path_variables": {"SCRIPTS_BASE": "scripts", "DATA_OUTPUTS": "data/outputs"}
}"#;

/// Scratch project directory with a registry and shell phase scripts
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Shell script run as `sh <script> --key value ...`
    pub fn write_script(&self, rel: &str, body: &str) -> PathBuf {
        self.write(rel, &format!("#!/bin/sh\n{}\n", body))
    }

    pub fn config(&self) -> RunnerConfig {
        RunnerConfig {
            project_root: self.root().to_path_buf(),
            interpreter: "sh".to_string(),
            timeout: Duration::from_secs(10),
            ..RunnerConfig::default()
        }
    }

    pub fn service(&self, registry: &str) -> CommandExecutionService {
        let resolver = CommandScriptResolver::from_json_str(registry).unwrap();
        CommandExecutionService::new(resolver, &self.config())
    }
}

/// Envelope line a stand-in script prints on success
pub fn success_line(output: &str, confidence: f64) -> String {
    format!(
        r#"echo '__DASV_RESULT__:{{"status":"success","output_files":["{}"],"confidence":{}}}'"#,
        output, confidence
    )
}

/// Registry mapping all four phases of `fundamental_analysis` to `scripts/<phase>.sh`
pub fn fundamental_registry() -> String {
    let phases = ["discover", "analyze", "synthesize", "validate"]
        .iter()
        .map(|phase| {
            format!(
                r#""{phase}": {{"sub_agent": "fa_{phase}", "primary_script": "{{SCRIPTS_BASE}}/{phase}.sh"}}"#
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r#"{{"path_variables": {{"SCRIPTS_BASE": "scripts"}},
            "command_mappings": {{"fundamental_analysis": {{ {} }} }} }}"#,
        phases
    )
}

pub fn params(pairs: &[(&str, &str)]) -> dasv_runner::execution::Parameters {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
