//! Bounded-time subprocess execution.
//!
//! Every call spawns `<shell> -c <command>` once, captures stdout and stderr
//! as one stream, and always produces an `ExecutionRecord`: launch failures,
//! deadlines and cancellation are reported through the exit code and output
//! rather than as errors.

use std::process::{ExitStatus, Stdio};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::output::{self, CapturedOutput};
use super::process_group::ProcessGroupGuard;
use super::{
    DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT, EXIT_CANCELLED, EXIT_FAILURE, EXIT_TIMEOUT, Shell,
};
use crate::context::ExecutionRecord;

/// Runs allowed commands under a deadline with a cap on captured output.
#[derive(Debug, Clone)]
pub struct ExecutionEngine {
    timeout: Duration,
    max_output_bytes: usize,
}

impl Default for ExecutionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_MAX_OUTPUT_BYTES)
    }
}

/// How the wait on a spawned shell ended.
enum Outcome {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

impl ExecutionEngine {
    pub fn new(timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            timeout,
            max_output_bytes,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_output_bytes(&self) -> usize {
        self.max_output_bytes
    }

    /// Run `command` under `shell`.
    ///
    /// `shell` must name a supported shell; anything else is reported as a
    /// failed record without spawning. The subprocess is killed, and reaped,
    /// when the deadline passes or `cancel` fires.
    pub async fn run(
        &self,
        command: &str,
        shell: &str,
        cancel: &CancellationToken,
    ) -> ExecutionRecord {
        let started_at = Utc::now();
        let start = Instant::now();

        let (output, exit_code) = match shell.parse::<Shell>() {
            Ok(shell) => self.spawn_and_wait(command, shell, cancel).await,
            Err(unsupported) => {
                warn!("Refusing to run with unsupported shell '{}'", shell);
                (format!("Error: {}", unsupported), EXIT_FAILURE)
            }
        };

        let record =
            ExecutionRecord::new(command, shell, output, exit_code, started_at, start.elapsed());
        info!(
            command = %record.command,
            shell = %record.shell_used,
            exit_code = record.exit_code,
            duration_ms = record.duration_ms,
            "Command finished"
        );
        record
    }

    async fn spawn_and_wait(
        &self,
        command: &str,
        shell: Shell,
        cancel: &CancellationToken,
    ) -> (String, i32) {
        let mut cmd = Command::new(shell.program());
        cmd.arg("-c").arg(command);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to spawn {}: {}", shell, e);
                return (format!("Error: failed to start {}: {}", shell, e), EXIT_FAILURE);
            }
        };
        debug!("Spawned {} (pid {:?}) for: {}", shell, child.id(), command);

        let group = ProcessGroupGuard::new(child.id());
        let capture = Mutex::new(CapturedOutput::new(self.max_output_bytes));
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let outcome = {
            let finished = async {
                let status = child.wait().await;
                // Background jobs left in the group would hold the pipes open.
                group.kill();
                status
            };
            let drained = async {
                tokio::join!(
                    output::pump(stdout, &capture),
                    output::pump(stderr, &capture)
                );
            };

            tokio::select! {
                (status, ()) = async { tokio::join!(finished, drained) } => Outcome::Exited(status),
                _ = tokio::time::sleep(self.timeout) => Outcome::TimedOut,
                _ = cancel.cancelled() => Outcome::Cancelled,
            }
        };

        if matches!(outcome, Outcome::TimedOut | Outcome::Cancelled) {
            group.kill();
            // Reaps the leader; it may already have been reaped before the pipes closed.
            if let Err(e) = child.kill().await {
                debug!("kill after deadline: {}", e);
            }
        }

        let mut text = output::take(capture).into_text();
        let exit_code = match outcome {
            Outcome::Exited(Ok(status)) => exit_code_of(status),
            Outcome::Exited(Err(e)) => {
                output::append_notice(&mut text, &format!("Error: {}", e));
                EXIT_FAILURE
            }
            Outcome::TimedOut => {
                warn!("Command timed out after {:?}: {}", self.timeout, command);
                output::append_notice(
                    &mut text,
                    &format!(
                        "Error: Command execution timed out after {} seconds.",
                        format_secs(self.timeout)
                    ),
                );
                EXIT_TIMEOUT
            }
            Outcome::Cancelled => {
                warn!("Command cancelled: {}", command);
                output::append_notice(&mut text, "Error: Command execution was cancelled.");
                EXIT_CANCELLED
            }
        };

        (text, exit_code)
    }
}

/// Real exit code, or 128 + signal for a signal death.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    EXIT_FAILURE
}

fn format_secs(d: Duration) -> String {
    if d.subsec_millis() == 0 {
        d.as_secs().to_string()
    } else {
        format!("{:.1}", d.as_secs_f64())
    }
}
