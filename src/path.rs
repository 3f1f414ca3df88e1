//! Resolution of user-supplied document paths.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Default extension appended to document paths that have none.
pub const DOCX_EXTENSION: &str = "docx";

/// Turns raw path strings into absolute filesystem locations.
///
/// The working directory is fixed at construction, so relative paths never
/// depend on the process-wide current directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    working_dir: PathBuf,
}

impl PathResolver {
    /// Create a resolver rooted at `working_dir`.
    ///
    /// A relative `working_dir` is made absolute against the current
    /// directory once, here.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        let working_dir = std::path::absolute(&working_dir).unwrap_or(working_dir);
        Self { working_dir }
    }

    /// Create a resolver rooted at the process' current directory.
    pub fn from_current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    /// The directory relative paths are joined to.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Resolve a document path, appending `.docx` when the name has no extension.
    ///
    /// Existence is not checked. Resolving an already resolved path returns it
    /// unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use wordmcp::PathResolver;
    ///
    /// let resolver = PathResolver::new("/srv/docs");
    /// let path = resolver.resolve("reports/q3").unwrap();
    /// assert_eq!(path, std::path::Path::new("/srv/docs/reports/q3.docx"));
    /// ```
    pub fn resolve(&self, raw: &str) -> Result<PathBuf> {
        self.resolve_with_extension(raw, DOCX_EXTENSION)
    }

    /// Resolve a path, appending `.{ext}` when the name has no extension.
    pub fn resolve_with_extension(&self, raw: &str, ext: &str) -> Result<PathBuf> {
        if raw.is_empty() {
            return Err(Error::invalid("path must not be empty"));
        }

        let mut path = PathBuf::from(raw);
        if path.file_name().is_none() {
            return Err(Error::invalid(format!("'{}' does not name a file", raw)));
        }
        if path.extension().is_none() {
            path.set_extension(ext);
        }

        Ok(self.absolutize(path))
    }

    /// Resolve a directory path. An empty string means the working directory.
    pub fn resolve_dir(&self, raw: &str) -> PathBuf {
        if raw.is_empty() {
            return self.working_dir.clone();
        }
        self.absolutize(PathBuf::from(raw))
    }

    fn absolutize(&self, path: PathBuf) -> PathBuf {
        if path.is_absolute() {
            path
        } else {
            self.working_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new("/work")
    }

    #[test]
    fn test_appends_extension() {
        let path = resolver().resolve("notes").unwrap();
        assert_eq!(path, PathBuf::from("/work/notes.docx"));
    }

    #[test]
    fn test_keeps_existing_extension() {
        let path = resolver().resolve("notes.docx").unwrap();
        assert_eq!(path, PathBuf::from("/work/notes.docx"));

        let path = resolver().resolve("legacy.doc").unwrap();
        assert_eq!(path, PathBuf::from("/work/legacy.doc"));
    }

    #[test]
    fn test_absolute_path_used_as_is() {
        let path = resolver().resolve("/elsewhere/plan").unwrap();
        assert_eq!(path, PathBuf::from("/elsewhere/plan.docx"));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let r = resolver();
        let once = r.resolve("drafts/letter").unwrap();
        let twice = r.resolve(once.to_str().unwrap()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.to_str().unwrap().matches(".docx").count(), 1);
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(resolver().resolve(""), Err(Error::InvalidArgument(_))));
        assert!(matches!(resolver().resolve(".."), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_resolve_dir() {
        let r = resolver();
        assert_eq!(r.resolve_dir(""), PathBuf::from("/work"));
        assert_eq!(r.resolve_dir("."), PathBuf::from("/work/."));
        assert_eq!(r.resolve_dir("/tmp"), PathBuf::from("/tmp"));
    }

    #[test]
    fn test_relative_root_made_absolute() {
        let r = PathResolver::new("docs");
        assert!(r.working_dir().is_absolute());

        let path = r.resolve("notes").unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("docs/notes.docx"));
        assert!(r.resolve_dir("").is_absolute());
    }

    #[test]
    fn test_pdf_extension() {
        let path = resolver().resolve_with_extension("out", "pdf").unwrap();
        assert_eq!(path, PathBuf::from("/work/out.pdf"));
    }
}
