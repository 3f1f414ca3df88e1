//! DOCX styles parsing and heading style injection.

use crate::error::{Error, Result};
use crate::model::HeadingLevel;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

/// Style type (paragraph, character, table, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
    Numbering,
}

/// A parsed style definition.
#[derive(Debug, Clone, Default)]
pub struct Style {
    /// Style ID (e.g., "Heading1")
    pub id: String,
    /// Style name (e.g., "heading 1")
    pub name: String,
    pub style_type: Option<StyleType>,
    /// Based on another style
    pub based_on: Option<String>,
    /// Outline level (0-based, headings only)
    pub outline_level: Option<u8>,
}

/// Collection of styles from styles.xml.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    pub styles: HashMap<String, Style>,
}

impl StyleMap {
    /// Parse styles from XML content.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut map = StyleMap::default();
        if xml.trim().is_empty() {
            return Ok(map);
        }

        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut current: Option<Style> = None;
        let mut in_ppr = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"w:style" => current = Some(style_from_start(&e)),
                    b"w:pPr" => in_ppr = current.is_some(),
                    _ => {}
                },
                Event::Empty(e) => {
                    if let Some(ref mut style) = current {
                        match e.name().as_ref() {
                            b"w:name" => {
                                if let Some(val) = attr_value(&e, b"w:val") {
                                    style.name = val;
                                }
                            }
                            b"w:basedOn" => style.based_on = attr_value(&e, b"w:val"),
                            b"w:outlineLvl" if in_ppr => {
                                style.outline_level =
                                    attr_value(&e, b"w:val").and_then(|v| v.parse().ok());
                            }
                            _ => {}
                        }
                    } else if e.name().as_ref() == b"w:style" {
                        let style = style_from_start(&e);
                        map.styles.insert(style.id.clone(), style);
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"w:style" => {
                        if let Some(style) = current.take() {
                            map.styles.insert(style.id.clone(), style);
                        }
                        in_ppr = false;
                    }
                    b"w:pPr" => in_ppr = false,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(map)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.styles.contains_key(id)
    }

    /// Outline level of a style, following `basedOn` (max 10 levels).
    fn resolved_outline_level(&self, id: &str) -> Option<u8> {
        let mut current = self.styles.get(id)?;
        for _ in 0..10 {
            if current.outline_level.is_some() {
                return current.outline_level;
            }
            current = self.styles.get(current.based_on.as_deref()?)?;
        }
        None
    }

    /// Get the heading level for a paragraph style ID.
    ///
    /// Styles that are not defined still count when their id follows the
    /// built-in `HeadingN` naming.
    pub fn get_heading_level(&self, style_id: &str) -> HeadingLevel {
        if let Some(level) = self.resolved_outline_level(style_id) {
            // outline levels 6-8 have no heading equivalent
            return HeadingLevel::from_number(level.saturating_add(1));
        }
        if let Some(style) = self.styles.get(style_id) {
            if let Some(n) = heading_number(&style.name) {
                return HeadingLevel::from_number(n);
            }
        }
        heading_number(style_id)
            .map(HeadingLevel::from_number)
            .unwrap_or_default()
    }
}

/// Parse "Heading3" / "heading 3" into 3.
fn heading_number(name: &str) -> Option<u8> {
    let lower = name.to_ascii_lowercase();
    let rest = lower.strip_prefix("heading")?.trim_start();
    let n: u8 = rest.parse().ok()?;
    (1..=6).contains(&n).then_some(n)
}

fn style_from_start(e: &BytesStart) -> Style {
    let mut style = Style::default();
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"w:styleId" => style.id = String::from_utf8_lossy(&attr.value).to_string(),
            b"w:type" => {
                style.style_type = match attr.value.as_ref() {
                    b"paragraph" => Some(StyleType::Paragraph),
                    b"character" => Some(StyleType::Character),
                    b"table" => Some(StyleType::Table),
                    b"numbering" => Some(StyleType::Numbering),
                    _ => None,
                };
            }
            _ => {}
        }
    }
    style
}

/// Helper to read an attribute as a string.
pub(crate) fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Point size (half-points) used for each heading level in generated styles.
const HEADING_SIZES: [u32; 6] = [32, 26, 24, 22, 22, 22];

/// `w:style` definition for a built-in heading level.
pub fn heading_style_xml(level: HeadingLevel) -> String {
    let n = level.level().clamp(1, 6);
    let size = HEADING_SIZES[usize::from(n - 1)];
    format!(
        concat!(
            r#"<w:style w:type="paragraph" w:styleId="Heading{n}">"#,
            r#"<w:name w:val="heading {n}"/>"#,
            r#"<w:basedOn w:val="Normal"/><w:next w:val="Normal"/>"#,
            r#"<w:uiPriority w:val="9"/><w:qFormat/>"#,
            r#"<w:pPr><w:keepNext/><w:keepLines/><w:spacing w:before="240" w:after="60"/>"#,
            r#"<w:outlineLvl w:val="{lvl}"/></w:pPr>"#,
            r#"<w:rPr><w:b/><w:bCs/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr>"#,
            r#"</w:style>"#
        ),
        n = n,
        lvl = n - 1,
        size = size
    )
}

/// Add the `HeadingN` style to styles.xml if it is not defined yet.
///
/// Returns the updated XML, or `None` when nothing had to change.
pub fn ensure_heading_style(styles_xml: &str, level: HeadingLevel) -> Result<Option<String>> {
    let Some(style_id) = level.style_id() else {
        return Ok(None);
    };
    if StyleMap::parse(styles_xml)?.contains(&style_id) {
        return Ok(None);
    }

    let mut updated = String::with_capacity(styles_xml.len() + 512);
    if let Some(pos) = styles_xml.rfind("</w:styles>") {
        updated.push_str(&styles_xml[..pos]);
        updated.push_str(&heading_style_xml(level));
        updated.push_str(&styles_xml[pos..]);
        return Ok(Some(updated));
    }

    // An empty style sheet written as `<w:styles .../>`.
    let start = styles_xml
        .find("<w:styles")
        .ok_or_else(|| Error::Format("styles part has no w:styles element".to_string()))?;
    let close = styles_xml[start..]
        .find("/>")
        .map(|offset| start + offset)
        .ok_or_else(|| Error::Format("unterminated w:styles element".to_string()))?;
    updated.push_str(&styles_xml[..close]);
    updated.push('>');
    updated.push_str(&heading_style_xml(level));
    updated.push_str("</w:styles>");
    updated.push_str(&styles_xml[close + 2..]);
    Ok(Some(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
        <w:name w:val="Normal"/>
    </w:style>
    <w:style w:type="paragraph" w:styleId="Heading1">
        <w:name w:val="heading 1"/>
        <w:basedOn w:val="Normal"/>
        <w:pPr>
            <w:outlineLvl w:val="0"/>
        </w:pPr>
    </w:style>
    <w:style w:type="paragraph" w:styleId="Berschrift2">
        <w:name w:val="heading 2"/>
    </w:style>
    <w:style w:type="paragraph" w:styleId="Chapter">
        <w:name w:val="Chapter"/>
        <w:basedOn w:val="Heading1"/>
    </w:style>
</w:styles>"#;

    #[test]
    fn test_parse_styles() {
        let map = StyleMap::parse(STYLES).unwrap();
        assert!(map.contains("Heading1"));

        let style = map.styles.get("Heading1").unwrap();
        assert_eq!(style.name, "heading 1");
        assert_eq!(style.outline_level, Some(0));
        assert_eq!(style.style_type, Some(StyleType::Paragraph));
    }

    #[test]
    fn test_heading_level() {
        let map = StyleMap::parse(STYLES).unwrap();
        assert_eq!(map.get_heading_level("Heading1"), HeadingLevel::H1);
        assert_eq!(map.get_heading_level("Berschrift2"), HeadingLevel::H2);
        assert_eq!(map.get_heading_level("Chapter"), HeadingLevel::H1);
        assert_eq!(map.get_heading_level("Heading4"), HeadingLevel::H4);
        assert_eq!(map.get_heading_level("Normal"), HeadingLevel::None);
        assert_eq!(map.get_heading_level("Unknown"), HeadingLevel::None);
    }

    #[test]
    fn test_ensure_heading_style_injects_once() {
        let updated = ensure_heading_style(STYLES, HeadingLevel::H3)
            .unwrap()
            .expect("Heading3 should be added");
        let map = StyleMap::parse(&updated).unwrap();
        assert_eq!(map.get_heading_level("Heading3"), HeadingLevel::H3);

        assert!(ensure_heading_style(&updated, HeadingLevel::H3).unwrap().is_none());
        assert!(ensure_heading_style(STYLES, HeadingLevel::H1).unwrap().is_none());
    }

    #[test]
    fn test_ensure_heading_style_expands_empty_sheet() {
        let empty = concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            "\n",
            r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#
        );
        let updated = ensure_heading_style(empty, HeadingLevel::H2)
            .unwrap()
            .expect("Heading2 should be added");
        assert!(updated.trim_end().ends_with("</w:styles>"));

        let map = StyleMap::parse(&updated).unwrap();
        assert_eq!(map.get_heading_level("Heading2"), HeadingLevel::H2);
    }
}
