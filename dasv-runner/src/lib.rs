// Runner configuration
pub mod config;

// Error types shared across modules
pub mod error;

// tracing subscriber setup for the binaries
pub mod logging;

// Command registry loading and path resolution
pub mod registry;

// Single-phase command execution
pub mod execution;

// DASV workflow orchestration
pub mod workflow;

// Unified command interface (aliases and command parsing)
pub mod interface;

// Registry and path consistency checks
pub mod consistency;

pub use config::RunnerConfig;
pub use error::{ConfigError, ConsistencyError, ExecutionError, InterfaceError, RegistryError};
