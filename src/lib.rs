//! # wordmcp
//!
//! Read and edit Microsoft Word (`.docx`) documents, and serve those
//! operations as Model Context Protocol tools over JSON-RPC 2.0.
//!
//! ## Quick Start
//!
//! ```no_run
//! use wordmcp::{CreateOptions, DocumentService, PathResolver};
//!
//! let service = DocumentService::new(PathResolver::new("/srv/docs"));
//!
//! service.create_document("notes", &CreateOptions::default().with_title("Notes"))?;
//! service.add_heading("notes", "Agenda", 1)?;
//! service.write_text("notes", "Budget review", true)?;
//!
//! let replaced = service.replace_text("notes", "Budget", "Roadmap")?;
//! assert_eq!(replaced, 1);
//!
//! println!("{}", service.read_document("notes")?);
//! # Ok::<(), wordmcp::Error>(())
//! ```
//!
//! ## Serving
//!
//! ```no_run
//! use wordmcp::config::ServerConfig;
//!
//! let config = ServerConfig::new(std::env::current_dir()?);
//! wordmcp::mcp::run(&config)?;
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! Every operation opens the file, does one read or mutation and commits or
//! discards the result before returning. Writes go to a temporary file in the
//! same directory which is then renamed over the target, so a failed call
//! never leaves a half-written document behind.

pub mod config;
pub mod container;
pub mod convert;
pub mod docx;
pub mod error;
pub mod mcp;
pub mod model;
pub mod ops;
pub mod path;

// Re-exports
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use convert::PdfConverter;
pub use docx::{DocxPackage, StyleMap};
pub use error::{Error, ErrorKind, Result};
pub use model::{Block, Body, Cell, CoreProperties, HeadingLevel, Paragraph, Row, Table};
pub use ops::{CreateOptions, DocumentInfo, DocumentService};
pub use path::PathResolver;

use std::path::Path;

/// Extract plain text from a document.
///
/// # Example
///
/// ```no_run
/// let text = wordmcp::extract_text("report.docx")?;
/// println!("{}", text);
/// # Ok::<(), wordmcp::Error>(())
/// ```
pub fn extract_text(path: impl AsRef<Path>) -> Result<String> {
    let doc = DocxPackage::open(path)?;
    Ok(doc.body()?.plain_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_text(dir.path().join("absent.docx")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_extract_text_new_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.docx");
        DocxPackage::create(&path, &CoreProperties::default()).unwrap();
        assert_eq!(extract_text(&path).unwrap(), "");
    }
}
