//! Line-delimited transports: one JSON-RPC message per line.

use super::server::McpServer;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};

/// Serve messages from `reader` until end of input.
///
/// Blank lines are skipped. Invalid UTF-8 is replaced rather than ending the
/// session, so the peer still gets a parse error back.
pub fn serve<R: BufRead, W: Write>(
    server: &mut McpServer,
    mut reader: R,
    mut writer: W,
) -> io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(response) = server.handle_line(line) {
            writer.write_all(response.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
    }
}

/// Standard input/output transport. Logs must go to stderr.
pub struct StdioTransport;

impl StdioTransport {
    pub fn run(server: &mut McpServer) -> io::Result<()> {
        tracing::info!("serving on stdio");
        let stdin = io::stdin();
        let stdout = io::stdout();
        serve(server, stdin.lock(), stdout.lock())?;
        tracing::info!("stdin closed");
        Ok(())
    }
}

/// TCP transport. Connections are served one at a time, in accept order.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    pub fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        Ok(Self {
            listener: TcpListener::bind(addr)?,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever. A failing connection is logged and dropped.
    pub fn run(&self, server: &mut McpServer) -> io::Result<()> {
        tracing::info!(addr = %self.local_addr()?, "serving on tcp");
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                    continue;
                }
            };
            let peer = stream
                .peer_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            tracing::info!(%peer, "connection opened");

            let result = match stream.try_clone() {
                Ok(read_half) => serve(server, BufReader::new(read_half), stream),
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => tracing::info!(%peer, "connection closed"),
                Err(e) => tracing::warn!(%peer, error = %e, "connection failed"),
            }
        }
        Ok(())
    }
}
