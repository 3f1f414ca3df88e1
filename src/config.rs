//! Server configuration.

use crate::convert::{PdfConverter, DEFAULT_CONVERTER};
use crate::ops::DocumentService;
use crate::path::PathResolver;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default TCP listen address.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8765";

/// How messages reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Stdio,
    Tcp,
}

impl FromStr for Transport {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "tcp" => Ok(Transport::Tcp),
            other => Err(crate::Error::invalid(format!(
                "unknown transport '{}', expected stdio or tcp",
                other
            ))),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transport::Stdio => "stdio",
            Transport::Tcp => "tcp",
        })
    }
}

/// Everything needed to start a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub transport: Transport,
    /// Address for the TCP transport.
    pub listen: String,
    /// Base directory for relative document paths.
    pub root: PathBuf,
    /// PDF converter program.
    pub soffice: OsString,
}

impl ServerConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            transport: Transport::default(),
            listen: DEFAULT_LISTEN.to_string(),
            root: root.into(),
            soffice: OsString::from(DEFAULT_CONVERTER),
        }
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_listen(mut self, listen: impl Into<String>) -> Self {
        self.listen = listen.into();
        self
    }

    pub fn with_soffice(mut self, soffice: impl Into<OsString>) -> Self {
        self.soffice = soffice.into();
        self
    }

    /// Build the document service this configuration describes.
    pub fn service(&self) -> DocumentService {
        DocumentService::new(PathResolver::new(&self.root))
            .with_converter(PdfConverter::new(&self.soffice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_parse() {
        assert_eq!("stdio".parse::<Transport>().unwrap(), Transport::Stdio);
        assert_eq!("TCP".parse::<Transport>().unwrap(), Transport::Tcp);
        assert!("pipe".parse::<Transport>().is_err());
        assert_eq!(Transport::Tcp.to_string(), "tcp");
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::new("/srv/docs");
        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.listen, DEFAULT_LISTEN);
        assert_eq!(config.service().resolver().working_dir(), std::path::Path::new("/srv/docs"));
    }
}
