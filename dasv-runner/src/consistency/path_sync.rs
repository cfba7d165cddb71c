//! Hardcoded path detection and rewriting
//!
//! A literal path that starts with a path-variable value
//! (`scripts/foo.py` with `SCRIPTS_BASE = scripts`) is reported with a
//! `{SCRIPTS_BASE}/foo.py` suggestion; `apply_fixes` performs the rewrite.

use regex::{Captures, Regex};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::report::{ConsistencyIssue, ConsistencyReport, IssueKind};
use crate::error::ConsistencyError;
use crate::registry::CommandScriptResolver;

pub const PATH_SYNC_REPORT_KIND: &str = "path_sync";
pub const BACKUP_DIR: &str = ".dasv_backups";
const ISSUE_PENALTY: f64 = 0.05;
const SCANNED_EXTENSIONS: [&str; 7] = ["md", "json", "j2", "jinja", "py", "yaml", "yml"];

/// Upper-case `{NAME}`; matches opening with `{{` are Jinja and skipped
static PATH_VARIABLE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{+([A-Z][A-Z0-9_]*)\}+").unwrap());

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixSummary {
    pub files_fixed: usize,
    pub replacements: usize,
    pub backup_dir: Option<PathBuf>,
}

pub struct PathSynchronizer {
    /// Literal path value -> variable name
    by_value: BTreeMap<String, String>,
    defined: BTreeSet<String>,
    hardcoded: Option<Regex>,
}

impl PathSynchronizer {
    pub fn new(variables: &BTreeMap<String, String>) -> Result<Self, ConsistencyError> {
        let mut by_value = BTreeMap::new();
        for (name, value) in variables {
            let value = value.trim_end_matches('/');
            // bare "." or unexpanded values would match everywhere
            if value.is_empty() || value == "." || value.contains('{') {
                continue;
            }
            by_value.entry(value.to_string()).or_insert_with(|| name.clone());
        }

        // longest first so `data/outputs` wins over `data`
        let mut values: Vec<&String> = by_value.keys().collect();
        values.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let hardcoded = if values.is_empty() {
            None
        } else {
            let alternation = values
                .iter()
                .map(|v| regex::escape(v))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(
                r#"(^|[\s"'`(\[=:,<>])({})/([A-Za-z0-9_.\-/]+)"#,
                alternation
            ))?)
        };

        Ok(Self {
            by_value,
            defined: variables.keys().cloned().collect(),
            hardcoded,
        })
    }

    pub fn from_resolver(resolver: &CommandScriptResolver) -> Result<Self, ConsistencyError> {
        Self::new(resolver.path_variables())
    }

    /// Scan every supported file under `root`
    pub fn scan(&self, root: &Path) -> Result<ConsistencyReport, ConsistencyError> {
        let files = collect_files(root)?;
        let mut issues = Vec::new();
        let mut checked = 0;
        for file in &files {
            let content = match std::fs::read_to_string(file) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    tracing::warn!(file = %file.display(), "Skipping file that is not valid UTF-8");
                    continue;
                }
                Err(e) => return Err(ConsistencyError::io(file, e)),
            };
            let rel = file.strip_prefix(root).unwrap_or(file.as_path());
            issues.extend(self.scan_content(rel, &content));
            checked += 1;
        }
        tracing::debug!(root = %root.display(), files = checked, issues = issues.len(), "Path scan finished");
        Ok(ConsistencyReport::new(PATH_SYNC_REPORT_KIND, checked, issues, ISSUE_PENALTY))
    }

    pub fn scan_content(&self, file: &Path, content: &str) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line_no = index + 1;
            if let Some(re) = &self.hardcoded {
                for caps in re.captures_iter(line) {
                    let found = format!("{}/{}", &caps[2], &caps[3]);
                    let suggestion = self.replacement(&caps[2], &caps[3]);
                    issues.push(
                        ConsistencyIssue::new(IssueKind::Hardcoded, format!("Hardcoded path '{}'", found))
                            .at(file, line_no)
                            .with_suggestion(found, suggestion),
                    );
                }
            }
            for caps in PATH_VARIABLE_REF.captures_iter(line) {
                if caps[0].starts_with("{{") {
                    continue;
                }
                let name = &caps[1];
                if !self.defined.contains(name) {
                    issues.push(
                        ConsistencyIssue::new(
                            IssueKind::UndefinedVariable,
                            format!("Undefined path variable {{{}}}", name),
                        )
                        .at(file, line_no),
                    );
                }
            }
        }
        issues
    }

    /// Rewrite every hardcoded path; returns the new content and the count
    pub fn fix_content(&self, content: &str) -> (String, usize) {
        let Some(re) = &self.hardcoded else {
            return (content.to_string(), 0);
        };
        let mut count = 0;
        let fixed = re
            .replace_all(content, |caps: &Captures| {
                count += 1;
                format!("{}{}", &caps[1], self.replacement(&caps[2], &caps[3]))
            })
            .into_owned();
        (fixed, count)
    }

    /// Rewrite the files that have `hardcoded` issues in `report`.
    ///
    /// With `backup`, originals are copied to
    /// `<root>/.dasv_backups/<timestamp>/` first.
    pub fn apply_fixes(
        &self,
        root: &Path,
        report: &ConsistencyReport,
        backup: bool,
    ) -> Result<FixSummary, ConsistencyError> {
        let files: BTreeSet<&PathBuf> = report
            .issues_of(IssueKind::Hardcoded)
            .filter_map(|i| i.file.as_ref())
            .collect();

        let mut summary = FixSummary::default();
        if files.is_empty() {
            return Ok(summary);
        }

        let backup_dir = backup.then(|| root.join(BACKUP_DIR).join(dasv_sdk::file_timestamp()));

        for rel in files {
            let path = root.join(rel);
            let content = std::fs::read_to_string(&path).map_err(|e| ConsistencyError::io(&path, e))?;
            let (fixed, count) = self.fix_content(&content);
            if count == 0 {
                continue;
            }

            if let Some(dir) = &backup_dir {
                let target = dir.join(rel);
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| ConsistencyError::io(parent, e))?;
                }
                std::fs::copy(&path, &target).map_err(|e| ConsistencyError::io(&target, e))?;
            }

            std::fs::write(&path, fixed).map_err(|e| ConsistencyError::io(&path, e))?;
            tracing::info!(file = %rel.display(), replacements = count, "Fixed hardcoded paths");
            summary.files_fixed += 1;
            summary.replacements += count;
        }

        if summary.files_fixed > 0 {
            summary.backup_dir = backup_dir;
        }
        Ok(summary)
    }

    fn replacement(&self, value: &str, rest: &str) -> String {
        match self.by_value.get(value) {
            Some(name) => format!("{{{}}}/{}", name, rest),
            None => format!("{}/{}", value, rest),
        }
    }
}

/// Supported files under `root`, sorted. Hidden directories and symlinks
/// are not followed.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>, ConsistencyError> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|e| ConsistencyError::io(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| ConsistencyError::io(&dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| ConsistencyError::io(&path, e))?;
            if file_type.is_symlink() {
                tracing::debug!(path = %path.display(), "Not following symlink");
                continue;
            }
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if file_type.is_dir() {
                if !hidden {
                    pending.push(path);
                }
            } else if is_scanned(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn is_scanned(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SCANNED_EXTENSIONS.contains(&ext))
}
