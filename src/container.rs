//! ZIP container abstraction for OOXML packages.
//!
//! Reading goes through [`OoxmlContainer`]; writing either copies an existing
//! archive with some parts replaced ([`OoxmlContainer::write_with_changes`]) or
//! builds a fresh one ([`write_new_package`]). Both paths are committed to disk
//! through [`commit_file`], which only replaces the target once the new archive
//! is completely written.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

/// Relationship type of the main document part in `_rels/.rels`.
pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Relationship type of the core properties part in `_rels/.rels`.
pub const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";

/// Relationship type of the styles part in the main document's rels.
pub const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

/// A relationship entry from a .rels file.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Whether the target is external
    pub external: bool,
}

/// Collection of relationships parsed from a .rels file.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    by_id: HashMap<String, Relationship>,
    by_type: HashMap<String, Vec<Relationship>>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    /// First internal relationship of the given type.
    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.by_type
            .get(rel_type)
            .and_then(|rels| rels.iter().find(|r| !r.external))
    }

    pub fn add(&mut self, rel: Relationship) {
        self.by_type
            .entry(rel.rel_type.clone())
            .or_default()
            .push(rel.clone());
        self.by_id.insert(rel.id.clone(), rel);
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Fix XML encoding declaration from UTF-16 to UTF-8.
///
/// Once UTF-16 content has been decoded into a Rust string the declaration
/// must stop claiming UTF-16, or quick-xml will try to decode it again.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content.to_string()
}

/// Decode XML bytes handling UTF-8 (with or without BOM) and UTF-16 LE/BE.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(bytes[3..].to_vec())
            .map_err(|e| Error::Format(format!("invalid UTF-8 in XML part: {}", e)));
    }

    if bytes.starts_with(&[0xFF, 0xFE]) {
        let content = decode_utf16(&bytes[2..], u16::from_le_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    if bytes.starts_with(&[0xFE, 0xFF]) {
        let content = decode_utf16(&bytes[2..], u16::from_be_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => {
            // BOM-less UTF-16: ASCII markup leaves a zero in every other byte
            if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 {
                decode_utf16(bytes, u16::from_le_bytes)
            } else if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 {
                decode_utf16(bytes, u16::from_be_bytes)
            } else {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]));

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Format(format!("invalid UTF-16 in XML part: {}", e)))
}

/// OOXML container over an in-memory ZIP archive.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlContainer {
    /// Open a container from a file path.
    ///
    /// Missing files and permission failures are reported against `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| Error::from_io(e, path))?;
        Self::from_bytes(data)
    }

    /// Create a container from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read an XML part as a string, decoding UTF-16 where necessary.
    pub fn read_xml(&self, part: &str) -> Result<String> {
        let bytes = self.read_binary(part)?;
        decode_xml_bytes(&bytes)
    }

    /// Read an XML part if it exists.
    pub fn read_xml_opt(&self, part: &str) -> Result<Option<String>> {
        if self.exists(part) {
            self.read_xml(part).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read a part's raw bytes.
    pub fn read_binary(&self, part: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(part)
            .map_err(|_| Error::Format(format!("missing package part '{}'", part)))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, part: &str) -> bool {
        let archive = self.archive.borrow();
        let found = archive.file_names().any(|n| n == part);
        found
    }

    /// List all parts in the archive.
    pub fn list_files(&self) -> Vec<String> {
        let archive = self.archive.borrow();
        archive.file_names().map(String::from).collect()
    }

    /// Read and parse the relationships of `part_path` (`""` for the package).
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        let rels_path = if part_path.is_empty() || part_path == "/" {
            "_rels/.rels".to_string()
        } else {
            let path = Path::new(part_path);
            let parent = path.parent().unwrap_or(Path::new(""));
            let filename = path.file_name().unwrap_or_default().to_string_lossy();
            if parent.as_os_str().is_empty() {
                format!("_rels/{}.rels", filename)
            } else {
                format!("{}/_rels/{}.rels", parent.display(), filename)
            }
        };

        match self.read_xml_opt(&rels_path)? {
            Some(xml) => parse_relationships(&xml),
            None => Ok(Relationships::new()),
        }
    }

    /// Locate a part through a relationship of `owner`, falling back to `default`.
    pub fn locate_part(&self, owner: &str, rel_type: &str, default: &str) -> String {
        self.read_relationships(owner)
            .ok()
            .and_then(|rels| {
                rels.first_of_type(rel_type)
                    .map(|rel| Self::resolve_path(owner, &rel.target))
            })
            .filter(|part| self.exists(part))
            .unwrap_or_else(|| default.to_string())
    }

    /// Write this archive to `writer`, substituting or adding the parts in `changes`.
    ///
    /// Untouched parts are copied without recompression.
    pub fn write_with_changes<W: Write + Seek>(
        &self,
        writer: W,
        changes: &BTreeMap<String, String>,
    ) -> Result<()> {
        let mut archive = self.archive.borrow_mut();
        let mut zip = zip::ZipWriter::new(writer);
        let options = part_options();

        for i in 0..archive.len() {
            let file = archive.by_index_raw(i)?;
            let name = file.name().to_string();
            match changes.get(&name) {
                Some(content) => {
                    drop(file);
                    zip.start_file(name, options)?;
                    zip.write_all(content.as_bytes())?;
                }
                None => zip.raw_copy_file(file)?,
            }
        }

        for (name, content) in changes {
            if !archive.file_names().any(|n| n == name) {
                zip.start_file(name.as_str(), options)?;
                zip.write_all(content.as_bytes())?;
            }
        }

        zip.finish()?;
        Ok(())
    }

    /// Resolve a relationship target relative to the part that owns it.
    pub fn resolve_path(base: &str, relative: &str) -> String {
        if let Some(stripped) = relative.strip_prefix('/') {
            return stripped.to_string();
        }

        let base_path = Path::new(base);
        let base_dir = base_path.parent().unwrap_or(Path::new(""));

        let mut result = base_dir.to_path_buf();
        for component in Path::new(relative).components() {
            match component {
                std::path::Component::ParentDir => {
                    result.pop();
                }
                std::path::Component::Normal(c) => {
                    result.push(c);
                }
                _ => {}
            }
        }

        result.to_string_lossy().replace('\\', "/")
    }
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.list_files().len())
            .finish()
    }
}

/// Write a brand-new package made of `parts` (name, XML) in order.
pub fn write_new_package<W: Write + Seek>(writer: W, parts: &[(&str, String)]) -> Result<()> {
    let mut zip = zip::ZipWriter::new(writer);
    let options = part_options();
    for (name, content) in parts {
        zip.start_file(*name, options)?;
        zip.write_all(content.as_bytes())?;
    }
    zip.finish()?;
    Ok(())
}

fn part_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated)
}

/// How [`commit_file`] treats an existing target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Replace the target, keeping its permissions.
    Replace,
    /// Fail with `AlreadyExists` if the target is present.
    CreateNew,
}

/// Write a file through a sibling temporary file and rename it into place.
///
/// `write` receives the temporary file. If it fails, or the rename fails, the
/// temporary file is removed and `target` is left as it was.
pub fn commit_file<F>(target: &Path, mode: Commit, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if mode == Commit::CreateNew && target.exists() {
        return Err(Error::AlreadyExists(target.to_path_buf()));
    }

    let mut tmp = tempfile::Builder::new()
        .prefix(".wordmcp-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| Error::from_io(e, dir))?;

    write(tmp.as_file_mut())?;
    tmp.as_file_mut().sync_all()?;

    match mode {
        Commit::Replace => {
            if let Ok(meta) = fs::metadata(target) {
                fs::set_permissions(tmp.path(), meta.permissions())?;
            }
            tmp.persist(target)
                .map_err(|e| Error::from_io(e.error, target))?;
        }
        Commit::CreateNew => {
            set_new_file_permissions(tmp.path())?;
            tmp.persist_noclobber(target)
                .map_err(|e| Error::from_io(e.error, target))?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn set_new_file_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o644))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_new_file_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

fn parse_relationships(content: &str) -> Result<Relationships> {
    let mut rels = Relationships::new();
    if content.trim().is_empty() {
        return Ok(rels);
    }

    let mut reader = quick_xml::Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = String::new();
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut external = false;

                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"Id" => id = value,
                        b"Type" => rel_type = value,
                        b"Target" => target = value,
                        b"TargetMode" => external = value.eq_ignore_ascii_case("external"),
                        _ => {}
                    }
                }

                if !id.is_empty() {
                    rels.add(Relationship {
                        id,
                        rel_type,
                        target,
                        external,
                    });
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    Ok(rels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_package() -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        write_new_package(
            &mut buffer,
            &[
                (
                    "_rels/.rels",
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="{}" Target="word/document.xml"/>
</Relationships>"#,
                        REL_OFFICE_DOCUMENT
                    ),
                ),
                ("word/document.xml", "<w:document/>".to_string()),
                ("word/media/logo.bin", "binary-ish".to_string()),
            ],
        )
        .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            OoxmlContainer::resolve_path("word/document.xml", "../media/image1.png"),
            "media/image1.png"
        );
        assert_eq!(
            OoxmlContainer::resolve_path("word/document.xml", "styles.xml"),
            "word/styles.xml"
        );
        assert_eq!(
            OoxmlContainer::resolve_path("", "word/document.xml"),
            "word/document.xml"
        );
        assert_eq!(
            OoxmlContainer::resolve_path("word/document.xml", "/word/styles.xml"),
            "word/styles.xml"
        );
    }

    #[test]
    fn test_locate_main_part() {
        let container = OoxmlContainer::from_bytes(sample_package()).unwrap();
        assert_eq!(
            container.locate_part("", REL_OFFICE_DOCUMENT, "fallback.xml"),
            "word/document.xml"
        );
        assert_eq!(
            container.locate_part("", REL_CORE_PROPERTIES, "docProps/core.xml"),
            "docProps/core.xml"
        );
    }

    #[test]
    fn test_write_with_changes_replaces_and_adds() {
        let container = OoxmlContainer::from_bytes(sample_package()).unwrap();

        let mut changes = BTreeMap::new();
        changes.insert("word/document.xml".to_string(), "<w:document>new</w:document>".to_string());
        changes.insert("docProps/app.xml".to_string(), "<Properties/>".to_string());

        let mut out = Cursor::new(Vec::new());
        container.write_with_changes(&mut out, &changes).unwrap();

        let rewritten = OoxmlContainer::from_bytes(out.into_inner()).unwrap();
        assert_eq!(
            rewritten.read_xml("word/document.xml").unwrap(),
            "<w:document>new</w:document>"
        );
        assert_eq!(rewritten.read_xml("docProps/app.xml").unwrap(), "<Properties/>");
        assert_eq!(rewritten.read_xml("word/media/logo.bin").unwrap(), "binary-ish");
    }

    #[test]
    fn test_missing_part_is_format_error() {
        let container = OoxmlContainer::from_bytes(sample_package()).unwrap();
        let err = container.read_xml("word/styles.xml").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert!(container.read_xml_opt("word/styles.xml").unwrap().is_none());
    }

    #[test]
    fn test_not_a_zip() {
        let err = OoxmlContainer::from_bytes(b"plain text, not a package".to_vec()).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_utf16_decoding_function() {
        let utf16_le = b"\xFF\xFE<\0?\0x\0m\0l\0>\0";
        assert_eq!(decode_xml_bytes(utf16_le).unwrap(), "<?xml>");

        let utf16_be = b"\xFE\xFF\0<\0?\0x\0m\0l\0>";
        assert_eq!(decode_xml_bytes(utf16_be).unwrap(), "<?xml>");

        let utf8_bom = b"\xEF\xBB\xBF<?xml>";
        assert_eq!(decode_xml_bytes(utf8_bom).unwrap(), "<?xml>");

        assert_eq!(decode_xml_bytes(b"<?xml>").unwrap(), "<?xml>");
    }

    #[test]
    fn test_commit_create_new_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("keep.docx");
        fs::write(&target, b"original").unwrap();

        let err = commit_file(&target, Commit::CreateNew, |f| {
            f.write_all(b"replacement")?;
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(err, Error::AlreadyExists(_)));
        assert_eq!(fs::read(&target).unwrap(), b"original");
    }

    #[test]
    fn test_commit_failure_leaves_target_intact() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("keep.docx");
        fs::write(&target, b"original").unwrap();

        let err = commit_file(&target, Commit::Replace, |f| {
            f.write_all(b"half written")?;
            Err(Error::Format("simulated failure".to_string()))
        })
        .unwrap_err();

        assert!(matches!(err, Error::Format(_)));
        assert_eq!(fs::read(&target).unwrap(), b"original");
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_commit_replace() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("doc.docx");
        fs::write(&target, b"v1").unwrap();

        commit_file(&target, Commit::Replace, |f| {
            f.write_all(b"v2")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"v2");
    }
}
