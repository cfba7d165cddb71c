use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConsistencyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingScript,
    MissingCliService,
    MissingSchema,
    MissingTemplate,
    UnresolvedVariable,
    UnknownPhase,
    MissingPhase,
    /// A literal path that should use a path variable
    Hardcoded,
    /// `{NAME}` token with no matching path variable
    UndefinedVariable,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueKind::MissingScript => "missing_script",
            IssueKind::MissingCliService => "missing_cli_service",
            IssueKind::MissingSchema => "missing_schema",
            IssueKind::MissingTemplate => "missing_template",
            IssueKind::UnresolvedVariable => "unresolved_variable",
            IssueKind::UnknownPhase => "unknown_phase",
            IssueKind::MissingPhase => "missing_phase",
            IssueKind::Hardcoded => "hardcoded",
            IssueKind::UndefinedVariable => "undefined_variable",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyIssue {
    pub kind: IssueKind,
    pub message: String,
    /// File the issue was found in, relative to the scanned root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// 1-based
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ConsistencyIssue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: None,
            line: None,
            found: None,
            suggestion: None,
        }
    }

    pub fn at(mut self, file: impl Into<PathBuf>, line: usize) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_suggestion(mut self, found: impl Into<String>, suggestion: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.kind)?;
        if let Some(file) = &self.file {
            match self.line {
                Some(line) => write!(f, "{}:{}: ", file.display(), line)?,
                None => write!(f, "{}: ", file.display())?,
            }
        }
        f.write_str(&self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " -> {}", suggestion)?;
        }
        Ok(())
    }
}

/// Findings of one consistency check run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// `registry_consistency` or `path_sync`
    pub kind: String,
    pub generated_at: DateTime<Utc>,
    pub checked: usize,
    pub issues: Vec<ConsistencyIssue>,
    pub score: f64,
}

impl ConsistencyReport {
    /// Score is `1 - issues * penalty`, floored at zero
    pub fn new(kind: &str, checked: usize, issues: Vec<ConsistencyIssue>, penalty: f64) -> Self {
        let score = (1.0 - issues.len() as f64 * penalty).max(0.0);
        Self {
            kind: kind.to_string(),
            generated_at: Utc::now(),
            checked,
            issues,
            score,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &ConsistencyIssue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    /// Save as `<kind>_report_<YYYYMMDD_HHMMSS>.json` under `dir`
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ConsistencyError> {
        std::fs::create_dir_all(dir).map_err(|e| ConsistencyError::io(dir, e))?;
        let path = dir.join(format!("{}_report_{}.json", self.kind, dasv_sdk::file_timestamp()));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|e| ConsistencyError::io(&path, e))?;
        Ok(path)
    }
}
