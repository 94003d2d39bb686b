//! Command gateway: admission, execution and audit in one pipeline.
//!
//! Each request flows one way: allowlist check, subprocess run, history
//! append, formatted reply. Rejected requests never reach the engine and
//! leave no history entry. Execution failures are ordinary results carrying
//! a non-zero exit code.

mod report;

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::ServerConfig;
use crate::context::{ExecutionRecord, HistoryLog};
use crate::security::{AllowlistPolicy, base_command};
use crate::shell::{ExecutionEngine, Shell};

pub use report::{format_allowed, format_recent};

/// Default number of entries returned by `list_recent`.
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Why a request was turned away before execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Error: {0}")]
    MalformedInput(String),
    #[error(
        "Error: Command '{command}' is not in the allowed list. Run 'list_allowed_commands' to see what commands are permitted."
    )]
    NotAllowed { command: String },
}

/// Outcome of an admitted command, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub record: ExecutionRecord,
}

impl ExecutionSummary {
    pub fn status(&self) -> String {
        if self.record.succeeded() {
            "completed successfully".to_string()
        } else {
            format!("failed with exit code {}", self.record.exit_code)
        }
    }

    /// Human-readable reply: command, output, status and elapsed time.
    pub fn render(&self) -> String {
        format!(
            "$ {}\n\n{}\n\nCommand {} in {} ms",
            self.record.command,
            self.record.captured_output,
            self.status(),
            self.record.duration_ms
        )
    }
}

pub type GatewayResult = Result<ExecutionSummary, GatewayError>;

pub struct CommandGateway {
    policy: AllowlistPolicy,
    engine: ExecutionEngine,
    history: Arc<HistoryLog>,
    default_shell: Shell,
}

impl CommandGateway {
    pub fn new(
        policy: AllowlistPolicy,
        engine: ExecutionEngine,
        history: Arc<HistoryLog>,
        default_shell: Shell,
    ) -> Self {
        Self {
            policy,
            engine,
            history,
            default_shell,
        }
    }

    pub fn from_config(config: ServerConfig) -> Self {
        Self::new(
            config.policy,
            ExecutionEngine::new(config.timeout, config.max_output_bytes),
            Arc::new(HistoryLog::new(config.history_size)),
            config.default_shell,
        )
    }

    pub fn policy(&self) -> &AllowlistPolicy {
        &self.policy
    }

    pub fn history(&self) -> &Arc<HistoryLog> {
        &self.history
    }

    /// Admit, run and record `command`.
    ///
    /// `shell` falls back to the configured default when absent or empty.
    pub async fn execute(
        &self,
        command: &str,
        shell: Option<&str>,
        cancel: &CancellationToken,
    ) -> GatewayResult {
        let Some(base) = base_command(command) else {
            return Err(GatewayError::MalformedInput(
                "'command' must be a non-empty string".to_string(),
            ));
        };

        if !self.policy.check(command) {
            warn!("Rejected command '{}': not in allowlist", base);
            return Err(GatewayError::NotAllowed {
                command: base.to_string(),
            });
        }

        let shell = match shell {
            Some(s) if !s.is_empty() => s,
            _ => self.default_shell.program(),
        };

        let record = self.engine.run(command, shell, cancel).await;
        self.history.append(record.clone());
        Ok(ExecutionSummary { record })
    }

    /// Formatted listing of up to `limit` recent executions; `0` lists all.
    pub fn list_recent(&self, limit: usize) -> String {
        let (entries, total) = self.history.page(limit);
        format_recent(&entries, total)
    }

    /// Formatted description of the allowlist.
    pub fn list_allowed(&self) -> String {
        format_allowed(&self.policy)
    }
}
