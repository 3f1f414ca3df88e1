//! An open Word document.

use super::template::{self, CORE_PROPS_PART, DOCUMENT_PART, STYLES_PART};
use super::{editor, props, reader, styles};
use crate::container::{
    commit_file, write_new_package, Commit, OoxmlContainer, REL_CORE_PROPERTIES,
    REL_OFFICE_DOCUMENT, REL_STYLES,
};
use crate::error::{Error, Result};
use crate::model::{Body, CoreProperties, HeadingLevel, Paragraph};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A `.docx` package opened for one operation.
///
/// Mutations are staged in memory. [`DocxPackage::save`] consumes the package
/// and commits the staged parts; dropping it without saving discards them and
/// leaves the file on disk untouched.
#[derive(Debug)]
pub struct DocxPackage {
    path: PathBuf,
    container: OoxmlContainer,
    main_part: String,
    changes: BTreeMap<String, String>,
}

impl DocxPackage {
    /// Open an existing document.
    ///
    /// Fails with `NotFound`/`PermissionDenied` from the filesystem, or
    /// `Format` when the file is not a Word package.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(Error::invalid(format!("{} is a directory", path.display())));
        }

        let container = OoxmlContainer::open(path)?;
        let main_part = container.locate_part("", REL_OFFICE_DOCUMENT, DOCUMENT_PART);

        if !container.exists(&main_part) {
            let hint = if container.exists("xl/workbook.xml") {
                "it appears to be an Excel workbook"
            } else if container.exists("ppt/presentation.xml") {
                "it appears to be a PowerPoint presentation"
            } else {
                "missing word/document.xml"
            };
            return Err(Error::Format(format!(
                "{} is not a Word document: {}",
                path.display(),
                hint
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            container,
            main_part,
            changes: BTreeMap::new(),
        })
    }

    /// Write a new blank document at `path`. Fails with `AlreadyExists` rather
    /// than overwriting.
    pub fn create(path: impl AsRef<Path>, core: &CoreProperties) -> Result<()> {
        let parts = template::blank_document(core);
        commit_file(path.as_ref(), Commit::CreateNew, |file| {
            write_new_package(file, &parts)
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether any part has been staged for writing.
    pub fn is_modified(&self) -> bool {
        !self.changes.is_empty()
    }

    fn part(&self, name: &str) -> Result<Option<String>> {
        match self.changes.get(name) {
            Some(xml) => Ok(Some(xml.clone())),
            None => self.container.read_xml_opt(name),
        }
    }

    fn document_xml(&self) -> Result<String> {
        self.part(&self.main_part)?
            .ok_or_else(|| Error::Format(format!("missing package part '{}'", self.main_part)))
    }

    fn styles_part(&self) -> String {
        self.container
            .locate_part(&self.main_part, REL_STYLES, STYLES_PART)
    }

    /// Parsed style definitions, empty when the package has none.
    pub fn styles(&self) -> Result<styles::StyleMap> {
        match self.part(&self.styles_part())? {
            Some(xml) => styles::StyleMap::parse(&xml),
            None => Ok(styles::StyleMap::default()),
        }
    }

    /// Core properties; a package without docProps/core.xml yields defaults.
    pub fn core_properties(&self) -> Result<CoreProperties> {
        let part = self
            .container
            .locate_part("", REL_CORE_PROPERTIES, CORE_PROPS_PART);
        match self.part(&part)? {
            Some(xml) => props::parse_core_xml(&xml),
            None => Ok(CoreProperties::default()),
        }
    }

    /// Read the document body.
    pub fn body(&self) -> Result<Body> {
        let styles = self.styles()?;
        reader::read_body(&self.document_xml()?, &styles)
    }

    pub fn append_paragraph(&mut self, para: &Paragraph) -> Result<()> {
        let xml = editor::append_paragraph(&self.document_xml()?, para)?;
        self.changes.insert(self.main_part.clone(), xml);
        Ok(())
    }

    pub fn replace_body(&mut self, para: &Paragraph) -> Result<()> {
        let xml = editor::replace_body(&self.document_xml()?, para)?;
        self.changes.insert(self.main_part.clone(), xml);
        Ok(())
    }

    /// Replace `find` in all run text. Nothing is staged when there is no match.
    pub fn replace_text(&mut self, find: &str, replace: &str) -> Result<usize> {
        let (xml, count) = editor::replace_text(&self.document_xml()?, find, replace)?;
        if count > 0 {
            self.changes.insert(self.main_part.clone(), xml);
        }
        Ok(count)
    }

    /// Make sure the `HeadingN` style for `level` exists in the styles part.
    pub fn ensure_heading_style(&mut self, level: HeadingLevel) -> Result<()> {
        let part = self.styles_part();
        if let Some(xml) = self.part(&part)? {
            if let Some(updated) = styles::ensure_heading_style(&xml, level)? {
                self.changes.insert(part, updated);
            }
        }
        Ok(())
    }

    /// Commit staged changes in place. Returns whether the file was written.
    pub fn save(self) -> Result<bool> {
        if !self.is_modified() {
            return Ok(false);
        }
        commit_file(&self.path, Commit::Replace, |file| {
            self.container.write_with_changes(file, &self.changes)
        })?;
        Ok(true)
    }

    /// Write the package, with any staged changes, to a new file.
    pub fn save_as(self, target: impl AsRef<Path>) -> Result<()> {
        commit_file(target.as_ref(), Commit::CreateNew, |file| {
            self.container.write_with_changes(file, &self.changes)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn new_doc(dir: &Path) -> PathBuf {
        let path = dir.join("doc.docx");
        DocxPackage::create(
            &path,
            &CoreProperties {
                title: Some("Plan".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        path
    }

    #[test]
    fn test_create_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = new_doc(dir.path());

        let pkg = DocxPackage::open(&path).unwrap();
        assert_eq!(pkg.body().unwrap().plain_text(), "");
        assert_eq!(pkg.core_properties().unwrap().title.as_deref(), Some("Plan"));
        assert!(!pkg.is_modified());
    }

    #[test]
    fn test_drop_discards_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = new_doc(dir.path());
        let before = fs::read(&path).unwrap();

        {
            let mut pkg = DocxPackage::open(&path).unwrap();
            pkg.append_paragraph(&Paragraph::with_text("never saved"))
                .unwrap();
            assert!(pkg.is_modified());
        }

        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_save_without_changes_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = new_doc(dir.path());
        let before = fs::read(&path).unwrap();

        let pkg = DocxPackage::open(&path).unwrap();
        assert!(!pkg.save().unwrap());
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_staged_changes_are_visible_before_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = new_doc(dir.path());

        let mut pkg = DocxPackage::open(&path).unwrap();
        pkg.append_paragraph(&Paragraph::with_text("one")).unwrap();
        pkg.append_paragraph(&Paragraph::with_text("two")).unwrap();
        assert_eq!(pkg.body().unwrap().plain_text(), "one\ntwo");
        assert!(pkg.save().unwrap());

        let reopened = DocxPackage::open(&path).unwrap();
        assert_eq!(reopened.body().unwrap().plain_text(), "one\ntwo");
    }

    #[test]
    fn test_open_rejects_non_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.docx");
        fs::write(&path, "just text").unwrap();
        assert!(matches!(DocxPackage::open(&path), Err(Error::Format(_))));

        let missing = dir.path().join("missing.docx");
        assert!(matches!(DocxPackage::open(&missing), Err(Error::NotFound(_))));
    }
}
