//! Error types for the wordmcp library.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for wordmcp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, reading or mutating a document.
#[derive(Error, Debug)]
pub enum Error {
    /// The document or directory does not exist.
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The target of a create or copy already exists.
    #[error("Already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// An argument was rejected before any file was touched.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The file exists but is not a valid Word document.
    #[error("Invalid document format: {0}")]
    Format(String),

    /// The filesystem refused access.
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// The external PDF converter failed or could not be started.
    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    /// Any other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Stable, serializable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidArgument,
    FormatError,
    PermissionDenied,
    ConversionFailed,
    Io,
}

impl ErrorKind {
    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::FormatError => "format_error",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::ConversionFailed => "conversion_failed",
            ErrorKind::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Format(_) => ErrorKind::FormatError,
            Error::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Error::ConversionFailed(_) => ErrorKind::ConversionFailed,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Translate an I/O error raised while touching `path`.
    ///
    /// Missing files, permission failures and clobber attempts become their own
    /// variants so callers can tell them apart; everything else stays `Io`.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Error::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::AlreadyExists => Error::AlreadyExists(path.to_path_buf()),
            _ => Error::Io(err),
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io_err) => Error::Io(io_err),
            other => Error::Format(format!("ZIP archive error: {}", other)),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Format(format!("XML parse error: {}", err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Format(format!("XML attribute error: {}", err))
    }
}
