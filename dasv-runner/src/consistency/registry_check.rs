//! Registry consistency: do the files the registry names exist, and is
//! every domain complete?

use dasv_sdk::Phase;
use std::path::{Path, PathBuf};

use super::report::{ConsistencyIssue, ConsistencyReport, IssueKind};
use crate::registry::{CommandScriptResolver, MappingEntry};

pub const REGISTRY_REPORT_KIND: &str = "registry_consistency";
const ISSUE_PENALTY: f64 = 0.1;

pub struct RegistryConsistencyValidator<'a> {
    resolver: &'a CommandScriptResolver,
    project_root: PathBuf,
}

impl<'a> RegistryConsistencyValidator<'a> {
    pub fn new(resolver: &'a CommandScriptResolver, project_root: impl Into<PathBuf>) -> Self {
        Self {
            resolver,
            project_root: project_root.into(),
        }
    }

    pub fn validate(&self) -> ConsistencyReport {
        let mut issues = Vec::new();
        let registry = self.resolver.registry();
        let mut checked = 0;

        for (domain, phases) in &registry.command_mappings {
            for (phase, entry) in phases {
                checked += 1;
                let label = format!("{}:{}", domain, phase);
                if !Phase::ALL.iter().any(|p| p.as_str() == phase) {
                    issues.push(ConsistencyIssue::new(
                        IssueKind::UnknownPhase,
                        format!("{}: '{}' is not one of discover, analyze, synthesize, validate", label, phase),
                    ));
                }
                self.check_entry(&label, entry, &mut issues);
            }

            for phase in Phase::ALL {
                if !phases.contains_key(phase.as_str()) {
                    issues.push(ConsistencyIssue::new(
                        IssueKind::MissingPhase,
                        format!("{} has no mapping for the {} phase", domain, phase),
                    ));
                }
            }
        }

        for (name, service) in &registry.cli_services {
            checked += 1;
            self.check_file(
                &format!("cli service {}", name),
                &service.script,
                IssueKind::MissingCliService,
                &mut issues,
            );
        }

        tracing::debug!(checked, issues = issues.len(), "Registry consistency check finished");
        ConsistencyReport::new(REGISTRY_REPORT_KIND, checked, issues, ISSUE_PENALTY)
    }

    fn check_entry(&self, label: &str, entry: &MappingEntry, issues: &mut Vec<ConsistencyIssue>) {
        self.check_file(label, &entry.primary_script, IssueKind::MissingScript, issues);
        for script in &entry.supporting_scripts {
            self.check_file(label, script, IssueKind::MissingScript, issues);
        }
        for service in &entry.cli_services {
            self.check_file(label, service, IssueKind::MissingCliService, issues);
        }
        if !entry.schema.is_empty() {
            self.check_file(label, &entry.schema, IssueKind::MissingSchema, issues);
        }
        if let Some(template) = &entry.template {
            self.check_file(label, template, IssueKind::MissingTemplate, issues);
        }
        // output_dir is created by the script; only its variables must resolve
        if !entry.output_dir.is_empty() {
            self.check_tokens(label, &entry.output_dir, issues);
        }
    }

    /// Flag unresolved tokens, otherwise check the file exists
    fn check_file(&self, label: &str, raw: &str, missing: IssueKind, issues: &mut Vec<ConsistencyIssue>) {
        if self.check_tokens(label, raw, issues) {
            return;
        }
        let resolved = self.resolver.resolve_path(raw);
        if !self.anchor(Path::new(&resolved)).exists() {
            issues.push(ConsistencyIssue::new(
                missing,
                format!("{}: {} does not exist", label, resolved),
            ));
        }
    }

    /// Returns true when `raw` still has unresolved tokens
    fn check_tokens(&self, label: &str, raw: &str, issues: &mut Vec<ConsistencyIssue>) -> bool {
        let unresolved = self.resolver.unresolved_tokens(raw);
        for token in &unresolved {
            issues.push(ConsistencyIssue::new(
                IssueKind::UnresolvedVariable,
                format!("{}: undefined path variable {{{}}} in '{}'", label, token, raw),
            ));
        }
        !unresolved.is_empty()
    }

    fn anchor(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}
