//! Path synchronizer scan, fix and backup

use super::common::{TestProject, DEMO_REGISTRY};
use dasv_runner::consistency::{IssueKind, PathSynchronizer, BACKUP_DIR};
use dasv_runner::registry::CommandScriptResolver;

fn synchronizer() -> PathSynchronizer {
    let resolver = CommandScriptResolver::from_json_str(DEMO_REGISTRY).unwrap();
    PathSynchronizer::from_resolver(&resolver).unwrap()
}

#[test]
fn test_fix_round_trip() {
    let project = TestProject::new();
    project.write("docs/usage.md", "Run `scripts/foo.py` to start.\n");
    let sync = synchronizer();

    let report = sync.scan(project.root()).unwrap();
    let hardcoded: Vec<_> = report.issues_of(IssueKind::Hardcoded).collect();
    assert_eq!(hardcoded.len(), 1);
    assert_eq!(hardcoded[0].suggestion.as_deref(), Some("{SCRIPTS_BASE}/foo.py"));
    assert!((report.score - 0.95).abs() < 1e-9);

    let summary = sync.apply_fixes(project.root(), &report, false).unwrap();
    assert_eq!(summary.replacements, 1);
    assert!(summary.backup_dir.is_none());

    let fixed = std::fs::read_to_string(project.path("docs/usage.md")).unwrap();
    assert_eq!(fixed, "Run `{SCRIPTS_BASE}/foo.py` to start.\n");

    let rescanned = sync.scan(project.root()).unwrap();
    assert_eq!(rescanned.issues_of(IssueKind::Hardcoded).count(), 0);
}

#[test]
fn test_fix_backs_up_originals() {
    let project = TestProject::new();
    let original = "output: data/outputs/demo/report.json\n";
    project.write("config/pipeline.yaml", original);
    let sync = synchronizer();

    let report = sync.scan(project.root()).unwrap();
    let summary = sync.apply_fixes(project.root(), &report, true).unwrap();

    let backup_dir = summary.backup_dir.unwrap();
    assert!(backup_dir.starts_with(project.path(BACKUP_DIR)));
    let backup = std::fs::read_to_string(backup_dir.join("config/pipeline.yaml")).unwrap();
    assert_eq!(backup, original);

    let fixed = std::fs::read_to_string(project.path("config/pipeline.yaml")).unwrap();
    assert_eq!(fixed, "output: {DATA_OUTPUTS}/demo/report.json\n");

    // backups live in a hidden directory and are not rescanned
    let rescanned = sync.scan(project.root()).unwrap();
    assert!(rescanned.is_clean(), "{:?}", rescanned.issues);
}

#[test]
fn test_unsupported_files_are_skipped() {
    let project = TestProject::new();
    project.write("notes.txt", "scripts/foo.py\n");
    project.write("template.j2", "{{ ticker }} {UNKNOWN_BASE}/x\n");

    let report = synchronizer().scan(project.root()).unwrap();
    assert_eq!(report.checked, 1);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, IssueKind::UndefinedVariable);
}

#[test]
fn test_non_utf8_file_does_not_abort_scan() {
    let project = TestProject::new();
    project.write("a.md", "Run scripts/foo.py\n");
    std::fs::write(project.path("blob.json"), [0xff, 0xfe, 0x00, 0x41]).unwrap();

    let report = synchronizer().scan(project.root()).unwrap();
    assert_eq!(report.checked, 1);
    assert_eq!(report.issues_of(IssueKind::Hardcoded).count(), 1);
}

#[cfg(unix)]
#[test]
fn test_symlinked_directories_are_not_followed() {
    let project = TestProject::new();
    project.write("docs/a.md", "Run scripts/foo.py\n");
    std::os::unix::fs::symlink(project.root(), project.path("docs/loop")).unwrap();

    let report = synchronizer().scan(project.root()).unwrap();
    assert_eq!(report.checked, 1);
    assert_eq!(report.issues_of(IssueKind::Hardcoded).count(), 1);
}
