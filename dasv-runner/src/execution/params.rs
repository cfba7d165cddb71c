//! Required parameters per phase

use dasv_sdk::Phase;

use super::types::Parameters;

/// Identifier parameter the discover phase needs, per domain
const DOMAIN_IDENTIFIERS: &[(&str, &str)] = &[
    ("fundamental_analysis", "ticker"),
    ("sector_analysis", "sector"),
    ("industry_analysis", "industry"),
    ("comparative_analysis", "ticker"),
    ("macro_analysis", "region"),
    ("trade_history", "portfolio"),
];

/// Identifier parameter for a built-in domain
pub fn domain_identifier(domain: &str) -> Option<&'static str> {
    DOMAIN_IDENTIFIERS
        .iter()
        .find(|(name, _)| *name == domain)
        .map(|(_, id)| *id)
}

/// Parameter a phase cannot run without, if any
pub fn required_parameter(domain: &str, phase: Phase) -> Option<&'static str> {
    match phase {
        Phase::Discover => domain_identifier(domain),
        other => other.input_parameter(),
    }
}

/// Check phase-required parameters; an empty list means valid
pub fn validate_parameters(domain: &str, phase: Phase, parameters: &Parameters) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(required) = required_parameter(domain, phase) {
        let present = parameters
            .get(required)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);
        if !present {
            errors.push(format!(
                "Missing required parameter '{}' for {} {}",
                required, domain, phase
            ));
        }
    }

    for (key, _) in parameters.iter().filter(|(k, _)| !is_valid_key(k)) {
        errors.push(format!("Invalid parameter name '{}'", key));
    }

    errors
}

/// Parameter names become CLI flags and environment variable suffixes
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
