//! Prompt text for handing a phase to a sub-agent

use dasv_sdk::Phase;

use super::types::Parameters;
use crate::registry::CommandScriptMapping;

fn phase_goal(phase: Phase) -> &'static str {
    match phase {
        Phase::Discover => "Collect the raw data this analysis needs and save it as structured JSON.",
        Phase::Analyze => "Analyze the discovery output and produce scored findings.",
        Phase::Synthesize => "Synthesize the analysis into the final report using the template.",
        Phase::Validate => "Validate the synthesized report against its sources and schema.",
    }
}

/// Build the instructions a sub-agent would receive for one phase
pub fn build_sub_agent_prompt(mapping: &CommandScriptMapping, phase: Phase, parameters: &Parameters) -> String {
    let params = if parameters.is_empty() {
        "- (none)".to_string()
    } else {
        parameters
            .iter()
            .map(|(k, v)| format!("- {}: {}", k, v))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let template = mapping
        .template
        .as_ref()
        .map(|t| t.display().to_string())
        .unwrap_or_else(|| "(none)".to_string());

    format!(
        r#"You are the {sub_agent} sub-agent running the {phase} phase of a {domain} DASV workflow.

# Goal
{goal}

# Parameters
{params}

# Resources
- Primary script: {script}
- Output schema: {schema}
- Template: {template}
- Output directory: {output_dir}
- Output file pattern: {pattern}

When finished, print a single line `__DASV_RESULT__:` followed by a JSON object with
`status`, `output_files`, `confidence` and `warnings`."#,
        sub_agent = mapping.sub_agent,
        phase = phase,
        domain = mapping.domain,
        goal = phase_goal(phase),
        params = params,
        script = mapping.primary_script.display(),
        schema = mapping.schema.display(),
        template = template,
        output_dir = mapping.output_dir.display(),
        pattern = mapping.file_pattern,
    )
}
