//! Core properties (docProps/core.xml).

use crate::error::Result;
use crate::model::CoreProperties;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use quick_xml::events::Event;

/// Format a timestamp the way Office writes `dcterms:created`/`modified`.
pub fn w3cdtf(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse core properties. Unknown elements are ignored; missing ones stay `None`.
pub fn parse_core_xml(xml: &str) -> Result<CoreProperties> {
    let mut props = CoreProperties::default();
    if xml.trim().is_empty() {
        return Ok(props);
    }

    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut current_element: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                current_element =
                    Some(String::from_utf8_lossy(e.local_name().as_ref()).to_string());
            }
            Event::Text(e) => {
                if let Some(ref elem) = current_element {
                    let text = e.unescape()?.to_string();
                    match elem.as_str() {
                        "title" => props.title = Some(text),
                        "subject" => props.subject = Some(text),
                        "creator" => props.author = Some(text),
                        "description" => props.description = Some(text),
                        "lastModifiedBy" => props.last_modified_by = Some(text),
                        "revision" => props.revision = Some(text),
                        "created" => props.created = Some(text),
                        "modified" => props.modified = Some(text),
                        "keywords" => {
                            props.keywords = text
                                .split([',', ';'])
                                .map(|s| s.trim().to_string())
                                .filter(|s| !s.is_empty())
                                .collect();
                        }
                        _ => {}
                    }
                }
            }
            Event::End(_) => current_element = None,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(props)
}

/// Serialize core properties. `None` fields are omitted.
pub fn render_core_xml(props: &CoreProperties) -> String {
    let mut xml = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
    ));

    let mut element = |tag: &str, value: Option<&str>| {
        if let Some(value) = value {
            xml.push_str(&format!("<{tag}>{}</{tag}>", escape(value)));
        }
    };

    element("dc:title", props.title.as_deref());
    element("dc:subject", props.subject.as_deref());
    element("dc:creator", props.author.as_deref());
    let keywords = props.keywords.join(", ");
    element("cp:keywords", (!keywords.is_empty()).then_some(keywords.as_str()));
    element("dc:description", props.description.as_deref());
    element("cp:lastModifiedBy", props.last_modified_by.as_deref());
    element("cp:revision", props.revision.as_deref());

    for (tag, value) in [
        ("dcterms:created", props.created.as_deref()),
        ("dcterms:modified", props.modified.as_deref()),
    ] {
        if let Some(value) = value {
            xml.push_str(&format!(
                r#"<{tag} xsi:type="dcterms:W3CDTF">{}</{tag}>"#,
                escape(value)
            ));
        }
    }

    xml.push_str("</cp:coreProperties>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_then_parse() {
        let props = CoreProperties {
            title: Some("Budget <draft> & notes".to_string()),
            author: Some("Ana".to_string()),
            keywords: vec!["finance".to_string(), "2026".to_string()],
            revision: Some("1".to_string()),
            created: Some("2026-01-02T03:04:05Z".to_string()),
            modified: Some("2026-01-02T03:04:05Z".to_string()),
            ..Default::default()
        };

        let xml = render_core_xml(&props);
        assert!(xml.contains("Budget &lt;draft&gt; &amp; notes"));
        assert_eq!(parse_core_xml(&xml).unwrap(), props);
    }

    #[test]
    fn test_unset_fields_omitted() {
        let xml = render_core_xml(&CoreProperties::default());
        assert!(!xml.contains("dc:title"));
        assert!(!xml.contains("dc:creator"));
        assert_eq!(parse_core_xml(&xml).unwrap(), CoreProperties::default());
    }

    #[test]
    fn test_parse_office_core_xml() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:title>Annual Report</dc:title>
  <dc:creator>Finance Team</dc:creator>
  <cp:keywords>report; annual</cp:keywords>
  <dcterms:created xsi:type="dcterms:W3CDTF">2024-03-01T09:00:00Z</dcterms:created>
</cp:coreProperties>"#;

        let props = parse_core_xml(xml).unwrap();
        assert_eq!(props.title.as_deref(), Some("Annual Report"));
        assert_eq!(props.author.as_deref(), Some("Finance Team"));
        assert_eq!(props.keywords, vec!["report", "annual"]);
        assert_eq!(props.created.as_deref(), Some("2024-03-01T09:00:00Z"));
        assert_eq!(props.modified, None);
    }

    #[test]
    fn test_w3cdtf() {
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 8, 30, 0).unwrap();
        assert_eq!(w3cdtf(at), "2026-10-17T08:30:00Z");
    }
}
