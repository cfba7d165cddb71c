//! Blocking subprocess invocation with a deadline

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use dasv_sdk::PhaseEvent;
use tokio::process::Command;

/// Captured output of a finished process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub return_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// How a subprocess invocation ended
#[derive(Debug)]
pub enum ProcessOutcome {
    Finished(ProcessOutput),
    /// Deadline passed; the child was killed
    TimedOut { elapsed: Duration },
    /// The process could not be started or its output could not be read
    Io(std::io::Error),
}

/// Run `argv` in `cwd` with extra environment variables and wait for it.
///
/// The child inherits the parent's environment. If `timeout` elapses the
/// wait is abandoned and the child is killed when its handle drops.
pub async fn run_with_timeout(
    argv: &[String],
    env: &BTreeMap<String, String>,
    cwd: &Path,
    timeout: Duration,
) -> ProcessOutcome {
    let Some((program, args)) = argv.split_first() else {
        return ProcessOutcome::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "empty command line",
        ));
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        .envs(env)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(command = ?argv, cwd = %cwd.display(), "Spawning phase script");

    let started = Instant::now();
    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return ProcessOutcome::Io(e),
    };

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            forward_phase_events(&stderr);
            ProcessOutcome::Finished(ProcessOutput {
                return_code: output.status.code(),
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr,
                elapsed: started.elapsed(),
            })
        }
        Ok(Err(e)) => ProcessOutcome::Io(e),
        Err(_) => ProcessOutcome::TimedOut {
            elapsed: started.elapsed(),
        },
    }
}

/// Forward structured progress events from stderr into tracing; returns
/// how many were forwarded
fn forward_phase_events(stderr: &str) -> usize {
    let mut forwarded = 0;
    for event in stderr.lines().filter_map(PhaseEvent::parse_line) {
        forwarded += 1;
        match event {
            PhaseEvent::Started { phase, message } => {
                tracing::info!(%phase, "Script started: {}", message)
            }
            PhaseEvent::Progress { message } => tracing::info!("Script progress: {}", message),
            PhaseEvent::FileWritten { path, description } => {
                tracing::info!(%path, "Script wrote {}", description)
            }
            PhaseEvent::Completed { message } => tracing::info!("Script completed: {}", message),
            PhaseEvent::Failed { error } => tracing::warn!("Script reported failure: {}", error),
        }
    }
    forwarded
}
