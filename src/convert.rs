//! PDF export through an external office converter.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default converter binary (LibreOffice).
pub const DEFAULT_CONVERTER: &str = "soffice";

/// Runs `soffice --headless --convert-to pdf`.
#[derive(Debug, Clone)]
pub struct PdfConverter {
    program: OsString,
}

impl Default for PdfConverter {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERTER)
    }
}

impl PdfConverter {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        Path::new(&self.program)
    }

    /// Convert `source` and move the result to `target`.
    ///
    /// The converter writes into a scratch directory next to `target`, so an
    /// unrelated PDF that happens to share the source's stem is never touched.
    pub fn convert(&self, source: &Path, target: &Path) -> Result<()> {
        let out_dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let scratch = tempfile::Builder::new()
            .prefix(".wordmcp-pdf-")
            .tempdir_in(out_dir)
            .map_err(|e| Error::from_io(e, out_dir))?;

        tracing::debug!(program = ?self.program, source = %source.display(), "running converter");

        let output = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(scratch.path())
            .arg(source)
            .output()
            .map_err(|e| {
                Error::ConversionFailed(format!(
                    "could not run '{}': {}",
                    self.program().display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(Error::ConversionFailed(format!(
                "converter exited with {}: {}",
                output.status, detail
            )));
        }

        let produced = produced_path(scratch.path(), source);
        if !produced.is_file() {
            return Err(Error::ConversionFailed(format!(
                "converter did not produce {}",
                produced.display()
            )));
        }

        if target.exists() {
            return Err(Error::AlreadyExists(target.to_path_buf()));
        }
        fs::rename(&produced, target).map_err(|e| Error::from_io(e, target))?;
        Ok(())
    }
}

/// Where the converter puts its output for `source` in `out_dir`.
fn produced_path(out_dir: &Path, source: &Path) -> PathBuf {
    let mut name = source.file_stem().unwrap_or_default().to_os_string();
    name.push(".pdf");
    out_dir.join(name)
}

/// Default PDF location for a document: same directory and stem.
pub fn default_pdf_target(source: &Path) -> PathBuf {
    source.with_extension("pdf")
}
