//! `<domain>:<phase> [positional] [key=value]...` command strings
//!
//! Splitting is on whitespace only, with no quoting or escaping. Tokens
//! that are neither a bare value nor a `key=value` pair are dropped.

use dasv_sdk::Phase;

use super::aliases::{resolve_domain, resolve_target, CommandTarget};
use crate::error::InterfaceError;
use crate::execution::{domain_identifier, Parameters};

/// Used when a registry-only domain has no known identifier parameter
const FALLBACK_IDENTIFIER: &str = "identifier";

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub domain: String,
    pub target: CommandTarget,
    pub parameters: Parameters,
}

impl ParsedCommand {
    /// Parameter a bare positional token is assigned to
    pub fn primary_parameter(&self) -> &'static str {
        primary_parameter(&self.domain, self.target)
    }
}

fn primary_parameter(domain: &str, target: CommandTarget) -> &'static str {
    match target {
        CommandTarget::Phase(phase) if phase != Phase::Discover => phase
            .input_parameter()
            .unwrap_or(FALLBACK_IDENTIFIER),
        _ => domain_identifier(domain).unwrap_or(FALLBACK_IDENTIFIER),
    }
}

pub fn parse_command(input: &str) -> Result<ParsedCommand, InterfaceError> {
    parse_command_in(input, &[])
}

/// Parse, also accepting the registry's own domain names
pub fn parse_command_in(input: &str, extra_domains: &[String]) -> Result<ParsedCommand, InterfaceError> {
    let mut tokens = input.split_whitespace();
    let head = tokens.next().ok_or(InterfaceError::Empty)?;
    let (domain_token, target_token) = head
        .split_once(':')
        .ok_or_else(|| InterfaceError::MissingSeparator(head.to_string()))?;

    let domain = resolve_domain(domain_token, extra_domains)?;
    let target = resolve_target(target_token)?;
    let primary = primary_parameter(&domain, target);

    let mut parameters = Parameters::new();
    for token in tokens {
        match token.split_once('=') {
            Some((key, value)) => {
                let key = key.trim_start_matches('-');
                if key.is_empty() || value.is_empty() {
                    continue;
                }
                parameters.insert(key.to_string(), value.to_string());
            }
            None if token.starts_with('-') => {}
            None => {
                parameters
                    .entry(primary.to_string())
                    .or_insert_with(|| token.to_string());
            }
        }
    }

    Ok(ParsedCommand {
        domain,
        target,
        parameters,
    })
}
