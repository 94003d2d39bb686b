//! rusty-shell - allowlisted shell command execution for tool-calling clients
//!
//! This library provides the core functionality for rusty-shell, including:
//! - Allowlist policy over base command names
//! - Bounded-time subprocess execution with output capping and cancellation
//! - A bounded, newest-first execution history shared across requests
//! - A gateway tying the three together, served as MCP tools over stdio
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use rusty_shell::context::HistoryLog;
//! use rusty_shell::gateway::CommandGateway;
//! use rusty_shell::security::AllowlistPolicy;
//! use rusty_shell::shell::{ExecutionEngine, Shell};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let policy = AllowlistPolicy::from_spec("ls,echo,cat")?;
//!     let engine = ExecutionEngine::new(Duration::from_secs(30), 1024 * 1024);
//!     let history = Arc::new(HistoryLog::new(100));
//!     let gateway = CommandGateway::new(policy, engine, history, Shell::Bash);
//!
//!     match gateway.execute("echo hi", None, &CancellationToken::new()).await {
//!         Ok(summary) => println!("{}", summary.render()),
//!         Err(rejection) => eprintln!("{}", rejection),
//!     }
//!     println!("{}", gateway.list_recent(10));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod gateway;
pub mod security;
pub mod server;
pub mod shell;
pub mod utils;

// Re-export commonly used types
pub use config::{Cli, ConfigError, ServerConfig};
pub use context::{ExecutionRecord, HistoryLog};
pub use gateway::{CommandGateway, ExecutionSummary, GatewayError, GatewayResult};
pub use security::AllowlistPolicy;
pub use server::ToolServer;
pub use shell::{ExecutionEngine, Shell};
