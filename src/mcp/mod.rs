//! Model Context Protocol server.
//!
//! Exposes [`crate::ops::DocumentService`] as MCP tools over JSON-RPC 2.0.
//!
//! ```text
//!   Transport  ──▶  McpServer  ──▶  tools  ──▶  DocumentService
//!  (stdio/tcp)     (lifecycle)    (catalogue,
//!                                  arguments)
//! ```
//!
//! Targets MCP protocol version 2024-11-05. Messages are processed strictly
//! one after another.

pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use tools::{ToolDefinition, ToolResult};
pub use transport::{serve, StdioTransport, TcpTransport};

use crate::config::{ServerConfig, Transport};

/// Run a server with `config` until its input ends (stdio) or forever (tcp).
pub fn run(config: &ServerConfig) -> std::io::Result<()> {
    let mut server = McpServer::new(config.service());
    tracing::info!(
        root = %config.root.display(),
        transport = %config.transport,
        "starting {} {}",
        server::SERVER_NAME,
        env!("CARGO_PKG_VERSION")
    );
    match config.transport {
        Transport::Stdio => StdioTransport::run(&mut server),
        Transport::Tcp => TcpTransport::bind(config.listen.as_str())?.run(&mut server),
    }
}
