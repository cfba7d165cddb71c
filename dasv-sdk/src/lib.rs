//! SDK for DASV phase scripts.
//!
//! A phase script is any executable the runner launches for one
//! `(domain, phase)` pair. It reports its outcome by printing a single
//! [`ResultEnvelope`] line on stdout and may stream [`PhaseEvent`]s on
//! stderr while it works.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Line prefix of the result envelope printed on stdout
pub const RESULT_PREFIX: &str = "__DASV_RESULT__:";

/// Line prefix of progress events printed on stderr
pub const EVENT_PREFIX: &str = "__DASV_EVENT__:";

/// One of the four DASV phases, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Discover,
    Analyze,
    Synthesize,
    Validate,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Discover,
        Phase::Analyze,
        Phase::Synthesize,
        Phase::Validate,
    ];

    /// Registry key for this phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Discover => "discover",
            Phase::Analyze => "analyze",
            Phase::Synthesize => "synthesize",
            Phase::Validate => "validate",
        }
    }

    /// Parameter carrying the previous phase's output into this phase.
    ///
    /// Discover has none: it starts from a domain identifier instead.
    pub fn input_parameter(&self) -> Option<&'static str> {
        match self {
            Phase::Discover => None,
            Phase::Analyze => Some("discovery_file"),
            Phase::Synthesize => Some("analysis_file"),
            Phase::Validate => Some("synthesis_file"),
        }
    }

    /// Parameter this phase's first output file is passed as to the next phase
    pub fn output_parameter(&self) -> Option<&'static str> {
        self.next().and_then(|next| next.input_parameter())
    }

    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::Discover => Some(Phase::Analyze),
            Phase::Analyze => Some(Phase::Synthesize),
            Phase::Synthesize => Some(Phase::Validate),
            Phase::Validate => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePhaseError(pub String);

impl fmt::Display for ParsePhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown phase '{}'", self.0)
    }
}

impl std::error::Error for ParsePhaseError {}

impl FromStr for Phase {
    type Err = ParsePhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "discover" | "discovery" => Ok(Phase::Discover),
            "a" | "analyze" | "analysis" => Ok(Phase::Analyze),
            "s" | "synthesize" | "synthesis" => Ok(Phase::Synthesize),
            "v" | "validate" | "validation" => Ok(Phase::Validate),
            _ => Err(ParsePhaseError(s.to_string())),
        }
    }
}

/// Outcome a phase script reports about itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeStatus {
    Success,
    Partial,
    Failed,
}

/// Structured result a phase script prints as its last stdout line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub status: EnvelopeStatus,
    #[serde(default)]
    pub output_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResultEnvelope {
    pub fn success(output_files: Vec<String>) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            output_files,
            confidence: None,
            warnings: Vec::new(),
            message: None,
        }
    }

    pub fn partial(output_files: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Partial,
            output_files,
            confidence: None,
            warnings: Vec::new(),
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Failed,
            output_files: Vec::new(),
            confidence: None,
            warnings: Vec::new(),
            message: Some(message.into()),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Render the envelope as a protocol line
    pub fn to_line(&self) -> String {
        // Serializing a struct of plain fields cannot fail
        let json = serde_json::to_string(self).unwrap_or_default();
        format!("{}{}", RESULT_PREFIX, json)
    }

    /// Print the envelope on stdout for the runner to pick up
    pub fn emit(&self) {
        use std::io::Write;
        println!("{}", self.to_line());
        let _ = std::io::stdout().flush();
    }

    /// Parse a stdout line; `None` for lines that are not envelopes or
    /// carry malformed JSON
    pub fn parse_line(line: &str) -> Option<Self> {
        let json = line.trim_end().strip_prefix(RESULT_PREFIX)?;
        serde_json::from_str(json).ok()
    }

    /// Find the last envelope in a block of stdout
    pub fn find_last(stdout: &str) -> Option<Self> {
        stdout.lines().rev().find_map(Self::parse_line)
    }
}

/// Progress events emitted by phase scripts while they run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseEvent {
    Started {
        phase: Phase,
        message: String,
    },
    Progress {
        message: String,
    },
    FileWritten {
        path: String,
        description: String,
    },
    Completed {
        message: String,
    },
    Failed {
        error: String,
    },
}

impl PhaseEvent {
    /// Emit this event to stderr for the runner to forward
    pub fn emit(&self) {
        use std::io::Write;
        eprintln!("{}", self.to_line());
        let _ = std::io::stderr().flush();
    }

    /// The prefixed stderr line for this event
    pub fn to_line(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        format!("{}{}", EVENT_PREFIX, json)
    }

    pub fn parse_line(line: &str) -> Option<Self> {
        let json = line.trim_end().strip_prefix(EVENT_PREFIX)?;
        serde_json::from_str(json).ok()
    }
}

/// Timestamp format used for report and output file names
pub fn file_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

// ============================================================================
// Structured event macros (for phase scripts)
// ============================================================================

#[macro_export]
macro_rules! log_phase_started {
    ($phase:expr, $msg:expr) => {
        $crate::PhaseEvent::Started {
            phase: $phase,
            message: $msg.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_progress {
    ($msg:expr) => {
        $crate::PhaseEvent::Progress {
            message: $msg.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_file_written {
    ($path:expr, $desc:expr) => {
        $crate::PhaseEvent::FileWritten {
            path: $path.to_string(),
            description: $desc.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_completed {
    ($msg:expr) => {
        $crate::PhaseEvent::Completed {
            message: $msg.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_failed {
    ($error:expr) => {
        $crate::PhaseEvent::Failed {
            error: $error.to_string(),
        }
        .emit();
    };
}

// ============================================================================
// Console Logging Macros (for the runner CLIs)
// ============================================================================
// Colored, human-readable output. Diagnostics go through `tracing` instead.

/// Logs the start of a phase with a header and description.
///
/// # Example
/// ```
/// use dasv_sdk::log_phase_start_console;
/// log_phase_start_console!(1, "discover", "fundamental_analysis ticker=AAPL");
/// ```
///
/// Outputs:
/// ```text
/// ═══ PHASE 1: discover ═══
/// fundamental_analysis ticker=AAPL
/// ```
#[macro_export]
macro_rules! log_phase_start_console {
    ($index:expr, $title:expr, $description:expr) => {
        println!("\x1b[1;36m═══ PHASE {}: {} ═══\x1b[0m", $index, $title);
        println!("\x1b[36m{}\x1b[0m", $description);
    };
}

/// Logs the completion of a phase.
///
/// # Example
/// ```
/// use dasv_sdk::log_phase_complete_console;
/// log_phase_complete_console!("discover");
/// ```
#[macro_export]
macro_rules! log_phase_complete_console {
    ($phase:expr) => {
        println!("\x1b[32m✓ Phase {} complete\x1b[0m", $phase);
    };
}

/// Logs a failed phase.
#[macro_export]
macro_rules! log_phase_failed_console {
    ($phase:expr, $error:expr) => {
        println!("\x1b[31m✗ Phase {} failed: {}\x1b[0m", $phase, $error);
    };
}

/// Logs an informational message.
///
/// # Example
/// ```
/// use dasv_sdk::log_info;
/// log_info!("Loading registry...");
/// let count = 6;
/// log_info!("Found {} domains", count);
/// ```
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        println!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs an error message.
#[macro_export]
macro_rules! log_error {
    ($message:expr) => {
        println!("\x1b[31m❌ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[31m❌ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a success message.
#[macro_export]
macro_rules! log_success {
    ($message:expr) => {
        println!("\x1b[32m✅ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[32m✅ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs that a file has been saved.
///
/// # Example
/// ```
/// use dasv_sdk::log_file_saved;
/// log_file_saved!("./data/outputs/report.json");
/// ```
#[macro_export]
macro_rules! log_file_saved {
    ($path:expr) => {
        println!("\x1b[32m✓ Saved: {}\x1b[0m", $path);
    };
}

/// Logs the number of items found.
#[macro_export]
macro_rules! log_found {
    ($count:expr, $item_type:expr) => {
        println!("\x1b[36mFound {} {}\x1b[0m", $count, $item_type);
    };
}
