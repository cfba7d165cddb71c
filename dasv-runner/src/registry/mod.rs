//! Command script registry
//!
//! Loads `command_script_registry.json` and resolves `(domain, phase)`
//! pairs to script, schema, template and output locations.

pub mod resolver;
pub mod types;

pub use resolver::CommandScriptResolver;
pub use types::{
    CliService, CliServiceEntry, CommandScriptMapping, MappingEntry, RegistryFile,
    TwitterCommand, TwitterCommandEntry,
};
