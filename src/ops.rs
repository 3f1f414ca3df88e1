//! Document operations.
//!
//! [`DocumentService`] is the dispatcher behind every RPC tool: it resolves
//! the caller's path, opens the document for exactly one read or mutation and
//! commits or discards it before returning. Each call is independent; there is
//! no locking between calls, so two writers racing on the same file end with
//! the last one's content.

use crate::convert::{default_pdf_target, PdfConverter};
use crate::docx::editor::ensure_xml_text;
use crate::docx::DocxPackage;
use crate::error::{Error, Result};
use crate::model::{CoreProperties, HeadingLevel, Paragraph};
use crate::path::PathResolver;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata for a new document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOptions {
    /// Stored as `dc:title`. Left unset when `None` or empty.
    #[serde(default)]
    pub title: Option<String>,

    /// Stored as `dc:creator`. Left unset when `None` or empty.
    #[serde(default)]
    pub author: Option<String>,
}

impl CreateOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// Summary returned by [`DocumentService::get_document_info`].
///
/// Missing properties are empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub filename: String,
    pub title: String,
    pub author: String,
    pub created: String,
    pub modified: String,
    pub paragraph_count: usize,
    pub word_count: usize,
    pub table_count: usize,
    pub heading_count: usize,
    pub file_size_kb: f64,
}

/// Executes document operations against paths relative to one working directory.
#[derive(Debug, Clone)]
pub struct DocumentService {
    resolver: PathResolver,
    converter: PdfConverter,
}

impl DocumentService {
    pub fn new(resolver: PathResolver) -> Self {
        Self {
            resolver,
            converter: PdfConverter::default(),
        }
    }

    /// Use a different PDF converter binary.
    pub fn with_converter(mut self, converter: PdfConverter) -> Self {
        self.converter = converter;
        self
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    fn open(&self, raw: &str) -> Result<DocxPackage> {
        let path = self.resolver.resolve(raw)?;
        DocxPackage::open(path)
    }

    /// Full text of the document in order: non-blank paragraphs, then table
    /// rows as tab-separated cells, joined by newlines.
    pub fn read_document(&self, path: &str) -> Result<String> {
        let doc = self.open(path)?;
        tracing::debug!(path = %doc.path().display(), "reading document");
        Ok(doc.body()?.plain_text())
    }

    pub fn get_document_info(&self, path: &str) -> Result<DocumentInfo> {
        let doc = self.open(path)?;
        let body = doc.body()?;
        let core = doc.core_properties()?;
        let size = fs::metadata(doc.path())
            .map_err(|e| Error::from_io(e, doc.path()))?
            .len();

        Ok(DocumentInfo {
            filename: doc.path().display().to_string(),
            title: core.title.unwrap_or_default(),
            author: core.author.unwrap_or_default(),
            created: core.created.unwrap_or_default(),
            modified: core.modified.unwrap_or_default(),
            paragraph_count: body.paragraphs().count(),
            word_count: body.word_count(),
            table_count: body.tables().count(),
            heading_count: body.heading_count(),
            file_size_kb: (size as f64 / 1024.0 * 100.0).round() / 100.0,
        })
    }

    /// Names of `.docx` files (extension matched case-insensitively) directly
    /// inside `directory`, sorted.
    pub fn list_documents(&self, directory: &str) -> Result<Vec<String>> {
        let dir = self.resolver.resolve_dir(directory);
        if dir.exists() && !dir.is_dir() {
            return Err(Error::invalid(format!("{} is not a directory", dir.display())));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| Error::from_io(e, &dir))? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && has_docx_extension(&path) {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Create a blank document. Never overwrites.
    pub fn create_document(&self, path: &str, options: &CreateOptions) -> Result<PathBuf> {
        for value in [&options.title, &options.author].into_iter().flatten() {
            ensure_xml_text(value)?;
        }
        let path = self.resolver.resolve(path)?;
        let now = crate::docx::props::w3cdtf(Utc::now());
        let core = CoreProperties {
            title: options.title.clone().filter(|t| !t.is_empty()),
            author: options.author.clone().filter(|a| !a.is_empty()),
            last_modified_by: options.author.clone().filter(|a| !a.is_empty()),
            revision: Some("1".to_string()),
            created: Some(now.clone()),
            modified: Some(now),
            ..Default::default()
        };

        DocxPackage::create(&path, &core)?;
        tracing::info!(path = %path.display(), "created document");
        Ok(path)
    }

    /// Copy a document to a new file. The target must not exist.
    pub fn copy_document(&self, source: &str, target: &str) -> Result<PathBuf> {
        let doc = self.open(source)?;
        let target = self.resolver.resolve(target)?;
        if target.exists() {
            return Err(Error::AlreadyExists(target));
        }

        let source_path = doc.path().to_path_buf();
        doc.save_as(&target)?;
        tracing::info!(
            source = %source_path.display(),
            target = %target.display(),
            "copied document"
        );
        Ok(target)
    }

    /// Append `text` as a new paragraph, or replace the whole body with it.
    pub fn write_text(&self, path: &str, text: &str, append: bool) -> Result<PathBuf> {
        ensure_xml_text(text)?;
        let mut doc = self.open(path)?;
        let para = Paragraph::with_text(text);
        if append {
            doc.append_paragraph(&para)?;
        } else {
            doc.replace_body(&para)?;
        }

        let path = doc.path().to_path_buf();
        doc.save()?;
        tracing::info!(path = %path.display(), append, "wrote text");
        Ok(path)
    }

    /// Append a heading paragraph at `level` (1-6).
    pub fn add_heading(&self, path: &str, text: &str, level: u8) -> Result<PathBuf> {
        let heading = HeadingLevel::from_number(level);
        if !heading.is_heading() {
            return Err(Error::invalid(format!(
                "heading level must be between 1 and 6, got {}",
                level
            )));
        }
        ensure_xml_text(text)?;

        let mut doc = self.open(path)?;
        doc.ensure_heading_style(heading)?;
        doc.append_paragraph(&Paragraph::heading(heading, text))?;

        let path = doc.path().to_path_buf();
        doc.save()?;
        tracing::info!(path = %path.display(), level, "added heading");
        Ok(path)
    }

    /// Replace every occurrence of `find` in run text and return the count.
    ///
    /// The file is written only when at least one occurrence was replaced.
    pub fn replace_text(&self, path: &str, find: &str, replace: &str) -> Result<usize> {
        if find.is_empty() {
            return Err(Error::invalid("find text must not be empty"));
        }
        ensure_xml_text(replace)?;

        let mut doc = self.open(path)?;
        let count = doc.replace_text(find, replace)?;
        let path = doc.path().to_path_buf();
        let written = doc.save()?;
        tracing::info!(path = %path.display(), count, written, "replaced text");
        Ok(count)
    }

    /// Convert a document to PDF with the configured converter.
    ///
    /// Without a target the PDF lands next to the source with the same stem.
    pub fn export_to_pdf(&self, source: &str, target: Option<&str>) -> Result<PathBuf> {
        let source = self.resolver.resolve(source)?;
        if !source.is_file() {
            return Err(Error::NotFound(source));
        }

        let target = match target {
            Some(raw) if !raw.is_empty() => {
                let raw = if raw.to_ascii_lowercase().ends_with(".pdf") {
                    raw.to_string()
                } else {
                    format!("{}.pdf", raw)
                };
                self.resolver.resolve_with_extension(&raw, "pdf")?
            }
            _ => default_pdf_target(&source),
        };
        if target.exists() {
            return Err(Error::AlreadyExists(target));
        }

        self.converter.convert(&source, &target)?;
        tracing::info!(source = %source.display(), target = %target.display(), "exported pdf");
        Ok(target)
    }
}

fn has_docx_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(crate::path::DOCX_EXTENSION))
}
