//! wordmcp - MCP server for Word documents
//!
//! Serves read/write tools for `.docx` files over JSON-RPC 2.0, on stdio by
//! default or on a TCP socket.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use wordmcp::config::{ServerConfig, Transport, DEFAULT_LISTEN};
use wordmcp::convert::DEFAULT_CONVERTER;

/// Word document tools for MCP clients
#[derive(Parser)]
#[command(
    name = "wordmcp",
    version,
    about = "Serve Word (.docx) document tools over the Model Context Protocol",
    long_about = "wordmcp - read, create and edit Word documents from an MCP client.\n\n\
                  Messages are line-delimited JSON-RPC 2.0 on stdin/stdout, or on a TCP socket.\n\
                  Logs are written to stderr."
)]
struct Cli {
    /// Message transport: stdio or tcp
    #[arg(long, env = "WORDMCP_TRANSPORT", default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Listen address for the tcp transport
    #[arg(long, env = "WORDMCP_LISTEN", default_value = DEFAULT_LISTEN)]
    listen: String,

    /// Base directory for relative document paths (default: current directory)
    #[arg(long, env = "WORDMCP_ROOT")]
    root: Option<PathBuf>,

    /// LibreOffice binary used for PDF export
    #[arg(long, env = "WORDMCP_SOFFICE", default_value = DEFAULT_CONVERTER)]
    soffice: PathBuf,

    /// Log filter, e.g. "debug" or "wordmcp=trace" (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_level.as_deref())?;

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    if !root.is_dir() {
        anyhow::bail!("root {} is not a directory", root.display());
    }

    let config = ServerConfig::new(root)
        .with_transport(cli.transport)
        .with_listen(cli.listen)
        .with_soffice(cli.soffice);

    wordmcp::mcp::run(&config).with_context(|| format!("{} transport failed", config.transport))
}

/// Log to stderr; stdout carries protocol messages.
fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).with_context(|| format!("invalid log level '{}'", level))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("failed to install tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_transport_flag() {
        let cli = Cli::try_parse_from(["wordmcp", "--transport", "tcp", "--listen", "0.0.0.0:9000"])
            .unwrap();
        assert_eq!(cli.transport, Transport::Tcp);
        assert_eq!(cli.listen, "0.0.0.0:9000");
        assert!(cli.root.is_none());
    }

    #[test]
    fn test_rejects_unknown_transport() {
        let err = Cli::try_parse_from(["wordmcp", "--transport", "pipe"])
            .err()
            .unwrap();
        assert!(err.to_string().contains("expected stdio or tcp"));
    }

    #[test]
    fn test_transport_default_and_case() {
        let cli = Cli::try_parse_from(["wordmcp"]).unwrap();
        assert_eq!(cli.transport, Transport::Stdio);

        let cli = Cli::try_parse_from(["wordmcp", "--transport", "TCP"]).unwrap();
        assert_eq!(cli.transport, Transport::Tcp);
    }
}
