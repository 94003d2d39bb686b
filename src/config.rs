//! Startup configuration.
//!
//! Flags can also be supplied through `RUSTY_SHELL_*` environment variables.
//! The allowlist is the only required setting.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::context::DEFAULT_HISTORY_CAPACITY;
use crate::security::AllowlistPolicy;
use crate::shell::{DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT, Shell, UnsupportedShell};

const USAGE: &str = "Usage: rusty-shell --allowed-commands=ls,cat,echo,find\n\
Or to allow all commands (use with caution): rusty-shell --allowed-commands=*";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("The '--allowed-commands' flag is required.\n{}", USAGE)]
    MissingAllowlist,
    #[error("Invalid '--shell': {0}")]
    Shell(#[from] UnsupportedShell),
    #[error("'--{0}' must be greater than zero")]
    Zero(&'static str),
}

/// Command-line surface of the server binary.
#[derive(Debug, Parser)]
#[command(name = "rusty-shell", version, about = "Allowlisted shell command execution over MCP stdio")]
pub struct Cli {
    /// Comma-separated list of allowed commands or '*' to allow all commands
    #[arg(long, env = "RUSTY_SHELL_ALLOWED_COMMANDS")]
    pub allowed_commands: Option<String>,

    /// Shell used when a request does not name one
    #[arg(long, env = "RUSTY_SHELL_SHELL", default_value = "bash")]
    pub shell: String,

    /// Per-command timeout in seconds
    #[arg(long, env = "RUSTY_SHELL_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Maximum captured output per command, in bytes
    #[arg(long, env = "RUSTY_SHELL_MAX_OUTPUT_BYTES", default_value_t = DEFAULT_MAX_OUTPUT_BYTES)]
    pub max_output_bytes: usize,

    /// Number of executions kept in the in-memory history
    #[arg(long, env = "RUSTY_SHELL_HISTORY_SIZE", default_value_t = DEFAULT_HISTORY_CAPACITY)]
    pub history_size: usize,

    /// Write logs to a timestamped file in this directory instead of stderr
    #[arg(long, env = "RUSTY_SHELL_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

/// Validated server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub policy: AllowlistPolicy,
    pub default_shell: Shell,
    pub timeout: Duration,
    pub max_output_bytes: usize,
    pub history_size: usize,
}

impl ServerConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let spec = cli.allowed_commands.as_deref().unwrap_or_default();
        let policy = AllowlistPolicy::from_spec(spec)?;

        let default_shell = cli.shell.parse::<Shell>()?;

        if cli.timeout_secs == 0 {
            return Err(ConfigError::Zero("timeout-secs"));
        }
        if cli.max_output_bytes == 0 {
            return Err(ConfigError::Zero("max-output-bytes"));
        }
        if cli.history_size == 0 {
            return Err(ConfigError::Zero("history-size"));
        }

        Ok(Self {
            policy,
            default_shell,
            timeout: Duration::from_secs(cli.timeout_secs),
            max_output_bytes: cli.max_output_bytes,
            history_size: cli.history_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["rusty-shell"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--allowed-commands", "ls,cat"]);
        let config = ServerConfig::from_cli(&cli).unwrap();
        assert_eq!(config.policy.permitted(), ["ls", "cat"]);
        assert_eq!(config.default_shell, Shell::Bash);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_output_bytes, 1024 * 1024);
        assert_eq!(config.history_size, 100);
    }

    #[test]
    fn test_allow_all_flag() {
        let cli = parse(&["--allowed-commands=*", "--shell", "zsh", "--timeout-secs", "5"]);
        let config = ServerConfig::from_cli(&cli).unwrap();
        assert!(config.policy.allows_all());
        assert_eq!(config.default_shell, Shell::Zsh);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_allowlist_is_fatal() {
        let cli = Cli {
            allowed_commands: None,
            shell: "bash".to_string(),
            timeout_secs: 30,
            max_output_bytes: 1024,
            history_size: 10,
            log_dir: None,
        };
        let err = ServerConfig::from_cli(&cli).unwrap_err();
        assert!(matches!(err, ConfigError::MissingAllowlist));
        assert!(err.to_string().contains("--allowed-commands=*"));
    }

    #[test]
    fn test_rejects_bad_values() {
        let cli = parse(&["--allowed-commands", "ls", "--shell", "fish"]);
        assert!(matches!(
            ServerConfig::from_cli(&cli),
            Err(ConfigError::Shell(UnsupportedShell(s))) if s == "fish"
        ));

        let cli = parse(&["--allowed-commands", "ls", "--history-size", "0"]);
        assert!(matches!(
            ServerConfig::from_cli(&cli),
            Err(ConfigError::Zero("history-size"))
        ));
    }
}
