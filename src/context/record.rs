//! Execution records kept for audit.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// One subprocess attempt: inputs, merged output and outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub command: String,
    #[serde(rename = "shell")]
    pub shell_used: String,
    /// Merged stdout and stderr, possibly truncated.
    #[serde(rename = "output")]
    pub captured_output: String,
    pub exit_code: i32,
    #[serde(rename = "startTime")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub finished_at: DateTime<Utc>,
    #[serde(rename = "executionMs")]
    pub duration_ms: u64,
}

impl ExecutionRecord {
    /// Build a record from the start timestamp and the measured elapsed time.
    ///
    /// `finished_at` is derived from the whole-millisecond duration so that
    /// `finished_at - started_at == duration_ms` holds exactly.
    pub fn new(
        command: impl Into<String>,
        shell_used: impl Into<String>,
        captured_output: String,
        exit_code: i32,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let delta = i64::try_from(duration_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or_default();
        let finished_at = started_at.checked_add_signed(delta).unwrap_or(started_at);
        Self {
            command: command.into(),
            shell_used: shell_used.into(),
            captured_output,
            exit_code,
            started_at,
            finished_at,
            duration_ms,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}
