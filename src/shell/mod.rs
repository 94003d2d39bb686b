//! Shell execution and process management module.
//!
//! This module runs allowlisted command strings through a supported shell
//! with a deadline, cancellation and bounded output capture.

mod output;
mod process_group;
mod subprocess;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub use subprocess::ExecutionEngine;

/// Default per-command deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default cap on captured output (stdout + stderr combined).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Conventional exit code reported when the deadline fires.
pub const EXIT_TIMEOUT: i32 = 124;
/// Exit code reported when the caller cancels a running command.
pub const EXIT_CANCELLED: i32 = 130;
/// Exit code for failures that never produced a process status.
pub const EXIT_FAILURE: i32 = 1;

/// Shells a command may be run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shell {
    #[default]
    Bash,
    Zsh,
}

impl Shell {
    pub fn program(self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unsupported shell '{0}'. Only bash and zsh are supported.")]
pub struct UnsupportedShell(pub String);

impl FromStr for Shell {
    type Err = UnsupportedShell;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            other => Err(UnsupportedShell(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported() {
        assert_eq!("bash".parse::<Shell>(), Ok(Shell::Bash));
        assert_eq!("zsh".parse::<Shell>(), Ok(Shell::Zsh));
        assert_eq!(Shell::default().to_string(), "bash");
    }

    #[test]
    fn test_parse_unsupported() {
        let err = "fish".parse::<Shell>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported shell 'fish'. Only bash and zsh are supported."
        );
        // Names are matched exactly
        assert!("Bash".parse::<Shell>().is_err());
        assert!("/bin/bash".parse::<Shell>().is_err());
    }
}
