//! Main entry point for rusty-shell.
//!
//! Parses the configuration, initializes logging, and serves the command
//! gateway on stdin/stdout until stdin closes or Ctrl-C is received.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use rusty_shell::utils;
use rusty_shell::{Cli, CommandGateway, ServerConfig, ToolServer};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ServerConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging before anything else; stdout carries the protocol
    let log_guard = utils::logger::init_logging(cli.log_dir.as_deref());

    if config.policy.allows_all() {
        warn!("Starting shell server with all commands allowed ('*' mode)");
    } else {
        info!(
            "Starting shell server with {} allowed commands",
            config.policy.permitted().len()
        );
        if config.policy.permitted().is_empty() {
            warn!("Allowlist is empty; every command will be rejected");
        }
    }

    let server = ToolServer::new(Arc::new(CommandGateway::from_config(config)));

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => shutdown.cancel(),
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    let code = match server.serve_stdio().await {
        Ok(()) => {
            info!("Shell server stopped");
            0
        }
        Err(e) => {
            error!("Shell server failed: {:#}", e);
            1
        }
    };

    // The blocking stdin read cannot be cancelled; do not wait on it.
    drop(log_guard);
    std::process::exit(code);
}
