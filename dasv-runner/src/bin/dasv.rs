use anyhow::{Context, Result};
use clap::Parser;
use dasv_runner::consistency::{PathSynchronizer, RegistryConsistencyValidator};
use dasv_runner::execution::ExecutionMode;
use dasv_runner::interface::display::{
    print_consistency_report, print_execution_result, print_workflow_result,
};
use dasv_runner::interface::{DasvCli, DasvCommand, InterfaceOutcome, UnifiedCommandInterface};
use dasv_runner::registry::CommandScriptResolver;
use dasv_runner::{ExecutionError, InterfaceError, RunnerConfig};
use dasv_sdk::{log_error, log_file_saved, log_found, log_info, log_success, log_warning};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    dasv_runner::logging::init_tracing();

    let cli = DasvCli::parse();
    let mut config = RunnerConfig::from_env().context("Invalid DASV_* environment")?;
    cli.runner.apply(&mut config);

    let ok = match cli.command {
        DasvCommand::Run {
            command,
            mode,
            export,
        } => run(&config, &command.join(" "), mode, export.as_deref()).await?,
        DasvCommand::List => list(&config)?,
        DasvCommand::CheckRegistry => check_registry(&config)?,
        DasvCommand::SyncPaths {
            dir,
            fix,
            no_backup,
        } => sync_paths(&config, &dir, fix, !no_backup)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(config: &RunnerConfig, command: &str, mode: ExecutionMode, export: Option<&Path>) -> Result<bool> {
    let interface = UnifiedCommandInterface::from_config(config)?;

    println!("🚀 {} ({} mode)", command, mode);
    let outcome = match interface.execute(command, mode).await {
        Ok(outcome) => outcome,
        Err(InterfaceError::Execution(ExecutionError::SubAgentUnsupported { sub_agent, prompt })) => {
            log_warning!("Sub-agent execution is not supported; prompt for '{}' follows", sub_agent);
            println!("{}", prompt);
            return Ok(false);
        }
        Err(e) => {
            log_error!(e);
            return Ok(false);
        }
    };

    match &outcome {
        InterfaceOutcome::Phase(result) => print_execution_result(result),
        InterfaceOutcome::Workflow(result) => print_workflow_result(result),
    }

    if let Some(path) = export {
        outcome.export(path)?;
        log_file_saved!(path.display());
    }

    Ok(outcome.is_success())
}

fn load_resolver(config: &RunnerConfig) -> Result<CommandScriptResolver> {
    let path = config.resolved_registry_path();
    CommandScriptResolver::from_file(&path)
        .with_context(|| format!("Failed to load command registry {}", path.display()))
}

fn list(config: &RunnerConfig) -> Result<bool> {
    let interface = UnifiedCommandInterface::from_config(config)?;
    let commands = interface.list_commands();
    log_found!(commands.len(), "commands");
    for line in commands {
        println!("  {}", line);
    }
    Ok(true)
}

fn check_registry(config: &RunnerConfig) -> Result<bool> {
    let resolver = load_resolver(config)?;
    let report = RegistryConsistencyValidator::new(&resolver, &config.project_root).validate();
    print_consistency_report(&report);

    let saved = report.save(&config.resolved_reports_dir())?;
    log_file_saved!(saved.display());
    Ok(report.is_clean())
}

fn sync_paths(config: &RunnerConfig, dir: &Path, fix: bool, backup: bool) -> Result<bool> {
    let resolver = load_resolver(config)?;
    let synchronizer = PathSynchronizer::from_resolver(&resolver)?;

    log_info!("Scanning {}", dir.display());
    let mut report = synchronizer.scan(dir)?;
    print_consistency_report(&report);

    if fix && !report.is_clean() {
        let summary = synchronizer.apply_fixes(dir, &report, backup)?;
        log_success!(
            "Rewrote {} path(s) in {} file(s)",
            summary.replacements,
            summary.files_fixed
        );
        if let Some(backup_dir) = &summary.backup_dir {
            log_info!("Originals backed up to {}", backup_dir.display());
        }
        report = synchronizer.scan(dir)?;
        print_consistency_report(&report);
    }

    let saved = report.save(&config.resolved_reports_dir())?;
    log_file_saved!(saved.display());
    Ok(report.is_clean())
}
