//! MCP tool server.
//!
//! Exposes the gateway as three tools over stdin/stdout through `rmcp`.
//! Every tool call runs on its own task, so a long command does not hold up
//! other calls.
//!
//! Cancelling the shutdown token (Ctrl-C) kills running commands, waits for
//! their calls to complete, then closes the transport. When the client closes
//! stdin nobody is left to read replies, so running commands are killed too.

pub mod tools;

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::gateway::{CommandGateway, GatewayError};
use tools::{ExecuteCommandArgs, ListRecentArgs};

pub const SERVER_NAME: &str = "rusty-shell";

const INSTRUCTIONS: &str = "Runs allowlisted shell commands. Call list_allowed_commands to see \
what may run, execute_command to run one, and list_recent_commands to review past runs.";

#[derive(Clone)]
pub struct ToolServer {
    gateway: Arc<CommandGateway>,
    shutdown: CancellationToken,
    calls: TaskTracker,
}

impl ToolServer {
    pub fn new(gateway: Arc<CommandGateway>) -> Self {
        Self {
            gateway,
            shutdown: CancellationToken::new(),
            calls: TaskTracker::new(),
        }
    }

    /// Token that stops the server and kills running commands when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Serve on the process's stdin/stdout.
    pub async fn serve_stdio(self) -> Result<()> {
        let (stdin, stdout) = rmcp::transport::stdio();
        self.serve_io(stdin, stdout).await
    }

    /// Serve one MCP session over a byte stream pair until the client
    /// disconnects or shutdown is requested.
    pub async fn serve_io<R, W>(self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let transport = CancellationToken::new();
        let starting = self
            .clone()
            .serve_with_ct((reader, writer), transport.clone());

        let running = tokio::select! {
            running = starting => running.context("MCP initialization failed")?,
            _ = self.shutdown.cancelled() => {
                info!("Shutdown requested before the client initialized");
                return Ok(());
            }
        };
        info!("Client initialized; serving tools");

        let stopper = tokio::spawn({
            let shutdown = self.shutdown.clone();
            let calls = self.calls.clone();
            async move {
                shutdown.cancelled().await;
                info!("Shutdown requested; cancelling running commands");
                calls.close();
                calls.wait().await;
                transport.cancel();
            }
        });

        let reason = running.waiting().await.context("MCP service task failed")?;
        debug!("MCP session ended: {:?}", reason);
        stopper.abort();

        self.shutdown.cancel();
        self.calls.close();
        self.calls.wait().await;
        Ok(())
    }

    /// Run one tool by name. Tool-level failures come back as `isError`
    /// results, never as protocol errors.
    pub async fn dispatch(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        debug!("tools/call {}", name);
        let arguments = Value::Object(arguments.unwrap_or_default());
        match name {
            tools::EXECUTE_COMMAND => self.execute_command(arguments).await,
            tools::LIST_RECENT_COMMANDS => {
                let args: ListRecentArgs = serde_json::from_value(arguments).unwrap_or_default();
                text_result(self.gateway.list_recent(args.limit()))
            }
            tools::LIST_ALLOWED_COMMANDS => text_result(self.gateway.list_allowed()),
            other => error_result(format!("Error: Unknown tool '{}'", other)),
        }
    }

    async fn execute_command(&self, arguments: Value) -> CallToolResult {
        let args: ExecuteCommandArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(e) => {
                debug!("Malformed execute_command arguments: {}", e);
                return error_result(
                    GatewayError::MalformedInput("'command' must be a string".to_string())
                        .to_string(),
                );
            }
        };

        match self
            .gateway
            .execute(&args.command, args.shell.as_deref(), &self.shutdown)
            .await
        {
            Ok(summary) => text_result(summary.render()),
            Err(rejection) => error_result(rejection.to_string()),
        }
    }
}

impl ServerHandler for ToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(tools::definitions()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let call = self.dispatch(&request.name, request.arguments);
        Ok(self.calls.track_future(call).await)
    }
}

fn text_result(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

fn error_result(text: String) -> CallToolResult {
    CallToolResult::error(vec![Content::text(text)])
}
