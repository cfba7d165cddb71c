//! Registry loading and resolution

use super::common::{TestProject, DEMO_REGISTRY};
use dasv_runner::registry::CommandScriptResolver;
use dasv_runner::RegistryError;
use std::path::PathBuf;

#[test]
fn test_demo_registry_resolves_primary_script() {
    let resolver = CommandScriptResolver::from_json_str(DEMO_REGISTRY).unwrap();
    let mapping = resolver.get_scripts_for_command("demo", "discover").unwrap();

    assert_eq!(mapping.primary_script, PathBuf::from("scripts/d.py"));
    assert_eq!(mapping.output_dir, PathBuf::from("data/outputs/demo"));
    assert_eq!(mapping.schema, PathBuf::from("s.json"));
    assert_eq!(mapping.sub_agent, "x");
}

#[test]
fn test_present_pairs_have_no_unresolved_tokens() {
    let resolver = CommandScriptResolver::from_json_str(DEMO_REGISTRY).unwrap();
    for (domain, phase) in resolver.available_commands() {
        let mapping = resolver.get_scripts_for_command(&domain, &phase).unwrap();
        let script = mapping.primary_script.display().to_string();
        assert!(!script.contains('{'), "unresolved token in {}", script);
    }
}

#[test]
fn test_absent_pairs_return_none() {
    let resolver = CommandScriptResolver::from_json_str(DEMO_REGISTRY).unwrap();
    assert!(resolver.get_scripts_for_command("demo", "analyze").is_none());
    assert!(resolver.get_scripts_for_command("fundamental_analysis", "discover").is_none());
    assert!(resolver.get_scripts_for_command("", "").is_none());
}

#[test]
fn test_from_file() {
    let project = TestProject::new();
    let path = project.write("scripts/command_script_registry.json", DEMO_REGISTRY);
    let resolver = CommandScriptResolver::from_file(&path).unwrap();
    assert_eq!(resolver.domains(), vec!["demo".to_string()]);
}

#[test]
fn test_missing_file_is_io_error() {
    let project = TestProject::new();
    let err = CommandScriptResolver::from_file(project.path("nope.json")).unwrap_err();
    assert!(matches!(err, RegistryError::Io { .. }));
}

#[test]
fn test_invalid_json_is_parse_error() {
    let err = CommandScriptResolver::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, RegistryError::Parse(_)));
}
