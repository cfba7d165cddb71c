//! Unified command interface
//!
//! Parses short commands like `fa:d AAPL` and dispatches them to the
//! execution service or the workflow orchestrator.

pub mod aliases;
pub mod cli;
pub mod display;
pub mod parser;
pub mod unified;

pub use aliases::{resolve_domain, resolve_target, short_alias, CommandTarget, DOMAIN_ALIASES};
pub use cli::{DasvCli, DasvCommand, RunnerArgs, WorkflowArgs};
pub use parser::{parse_command, parse_command_in, ParsedCommand};
pub use unified::{InterfaceOutcome, UnifiedCommandInterface};
