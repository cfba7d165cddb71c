//! Domain and phase aliases for the unified command syntax

use dasv_sdk::Phase;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::error::InterfaceError;

/// `(alias, domain)`; every canonical name maps to itself
pub const DOMAIN_ALIASES: &[(&str, &str)] = &[
    ("fa", "fundamental_analysis"),
    ("fundamental", "fundamental_analysis"),
    ("fundamental_analysis", "fundamental_analysis"),
    ("sa", "sector_analysis"),
    ("sector", "sector_analysis"),
    ("sector_analysis", "sector_analysis"),
    ("ia", "industry_analysis"),
    ("industry", "industry_analysis"),
    ("industry_analysis", "industry_analysis"),
    ("ca", "comparative_analysis"),
    ("comparative", "comparative_analysis"),
    ("comparative_analysis", "comparative_analysis"),
    ("ma", "macro_analysis"),
    ("macro", "macro_analysis"),
    ("macro_analysis", "macro_analysis"),
    ("th", "trade_history"),
    ("trade", "trade_history"),
    ("trade_history", "trade_history"),
];

const PHASE_NAMES: [&str; 5] = ["discover", "analyze", "synthesize", "validate", "workflow"];

/// What a command runs: one phase, or the whole chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTarget {
    Phase(Phase),
    Workflow,
}

/// Two-letter alias of a built-in domain
pub fn short_alias(domain: &str) -> Option<&'static str> {
    DOMAIN_ALIASES
        .iter()
        .find(|(alias, name)| *name == domain && alias.len() == 2)
        .map(|(alias, _)| *alias)
}

/// Resolve a domain token. Registry domains outside the built-in six are
/// accepted by name, ignoring case, through `extra_domains`; the registry's
/// spelling is returned.
pub fn resolve_domain(token: &str, extra_domains: &[String]) -> Result<String, InterfaceError> {
    let token = token.trim().to_ascii_lowercase();
    if let Some((_, domain)) = DOMAIN_ALIASES.iter().find(|(alias, _)| *alias == token) {
        return Ok(domain.to_string());
    }
    if let Some(domain) = extra_domains.iter().find(|d| d.eq_ignore_ascii_case(&token)) {
        return Ok(domain.clone());
    }

    let mut candidates: Vec<&str> = DOMAIN_ALIASES.iter().map(|(_, domain)| *domain).collect();
    candidates.extend(extra_domains.iter().map(String::as_str));
    Err(InterfaceError::UnknownDomain {
        suggestion: suggest(&token, candidates.into_iter()),
        given: token,
    })
}

pub fn resolve_target(token: &str) -> Result<CommandTarget, InterfaceError> {
    let token = token.trim().to_ascii_lowercase();
    if token == "w" || token == "workflow" {
        return Ok(CommandTarget::Workflow);
    }
    token
        .parse::<Phase>()
        .map(CommandTarget::Phase)
        .map_err(|_| InterfaceError::UnknownPhase {
            suggestion: suggest(&token, PHASE_NAMES.iter().copied()),
            given: token,
        })
}

/// Best fuzzy match among `candidates`
fn suggest<'a>(given: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    if given.is_empty() {
        return None;
    }
    let matcher = SkimMatcherV2::default();
    candidates
        .filter_map(|candidate| {
            matcher
                .fuzzy_match(candidate, given)
                .map(|score| (score, candidate))
        })
        .max_by_key(|(score, _)| *score)
        .map(|(_, candidate)| candidate.to_string())
}
