//! Text listings returned to callers.

use chrono::SecondsFormat;

use crate::context::ExecutionRecord;
use crate::security::AllowlistPolicy;

pub fn format_recent(entries: &[ExecutionRecord], total: usize) -> String {
    if entries.is_empty() {
        return "No commands have been executed yet.".to_string();
    }

    let mut out = format!(
        "Recent commands (showing {} of {} total):\n\n",
        entries.len(),
        total
    );
    for (i, entry) in entries.iter().enumerate() {
        let status = if entry.succeeded() {
            "Success".to_string()
        } else {
            format!("Failed (exit code {})", entry.exit_code)
        };
        out.push_str(&format!(
            "{}. [{}] $ {}\n   Shell: {}, Duration: {} ms, Status: {}\n\n",
            i + 1,
            entry.started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            entry.command,
            entry.shell_used,
            entry.duration_ms,
            status
        ));
    }
    out
}

pub fn format_allowed(policy: &AllowlistPolicy) -> String {
    if policy.allows_all() {
        return "All commands are allowed ('*' mode).\n\n\
                Warning: This server is configured to execute any shell command. This poses a security risk."
            .to_string();
    }

    let permitted = policy.permitted();
    if permitted.is_empty() {
        return "No commands are currently allowed. Configure the server with the '--allowed-commands' flag."
            .to_string();
    }

    let mut out = format!("Allowed commands ({}):\n\n", permitted.len());
    for (i, name) in permitted.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, name));
    }
    out
}
