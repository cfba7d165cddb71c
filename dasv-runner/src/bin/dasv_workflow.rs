use anyhow::{bail, Context, Result};
use clap::Parser;
use dasv_runner::execution::CommandExecutionService;
use dasv_runner::interface::display::print_workflow_result;
use dasv_runner::interface::{resolve_domain, WorkflowArgs};
use dasv_runner::registry::CommandScriptResolver;
use dasv_runner::workflow::{DasvWorkflowOrchestrator, WorkflowOptions};
use dasv_runner::RunnerConfig;
use dasv_sdk::log_file_saved;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    dasv_runner::logging::init_tracing();

    let args = WorkflowArgs::parse();
    let mut config = RunnerConfig::from_env().context("Invalid DASV_* environment")?;
    args.runner.apply(&mut config);
    if let Some(threshold) = args.confidence_threshold {
        if !(0.0..=1.0).contains(&threshold) {
            bail!("--confidence-threshold must be between 0 and 1, got {}", threshold);
        }
        config.gate_policy.confidence_threshold = threshold;
    }

    let registry_path = config.resolved_registry_path();
    let resolver = CommandScriptResolver::from_file(&registry_path)
        .with_context(|| format!("Failed to load command registry {}", registry_path.display()))?;
    let domain = resolve_domain(&args.domain, &resolver.domains())?;

    let service = CommandExecutionService::new(resolver, &config);
    let orchestrator = DasvWorkflowOrchestrator::new(service, config.gate_policy);

    println!("🚀 DASV workflow: {} ({} mode)", domain, args.mode);
    let result = orchestrator
        .execute_workflow_with(
            &domain,
            args.parameters(),
            args.mode,
            WorkflowOptions {
                start_from: args.start_from,
            },
        )
        .await;

    print_workflow_result(&result);

    if let Some(path) = &args.export {
        result.export(path)?;
        log_file_saved!(path.display());
    }

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
