//! Streaming rewrites of the main document part.
//!
//! Every function here copies the XML event by event and changes only the
//! elements it is responsible for, so formatting, bookmarks and other markup
//! the model does not know about survive untouched.

use crate::error::{Error, Result};
use crate::model::Paragraph;
use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Reject text containing characters XML 1.0 cannot represent.
///
/// Escaping only covers markup characters; control characters other than
/// tab, line feed and carriage return (and the noncharacters U+FFFE and
/// U+FFFF) would leave a part no conforming reader accepts.
pub fn ensure_xml_text(text: &str) -> Result<()> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(Error::InvalidArgument(format!(
            "text contains U+{:04X}, which is not allowed in XML documents",
            c as u32
        ))),
        None => Ok(()),
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Serialize a paragraph as WordprocessingML.
///
/// `\n` becomes `w:br` and `\t` becomes `w:tab`, all within a single run.
pub fn paragraph_xml(para: &Paragraph) -> String {
    let mut xml = String::from("<w:p>");
    if let Some(ref style) = para.style_id {
        xml.push_str(&format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, escape(style)));
    }

    let text = para.text.replace("\r\n", "\n").replace('\r', "\n");
    if !text.is_empty() {
        xml.push_str("<w:r>");
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                xml.push_str("<w:br/>");
            }
            for (j, segment) in line.split('\t').enumerate() {
                if j > 0 {
                    xml.push_str("<w:tab/>");
                }
                if !segment.is_empty() {
                    xml.push_str(r#"<w:t xml:space="preserve">"#);
                    xml.push_str(&escape(segment));
                    xml.push_str("</w:t>");
                }
            }
        }
        xml.push_str("</w:r>");
    }

    xml.push_str("</w:p>");
    xml
}

fn reader(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    reader
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::Format(format!("rewritten document is not UTF-8: {}", e)))
}

fn write_raw(writer: &mut Writer<Vec<u8>>, fragment: &str) {
    writer.get_mut().extend_from_slice(fragment.as_bytes());
}

fn no_body() -> Error {
    Error::Format("main document part has no w:body".to_string())
}

/// Append a paragraph at the end of the body, before the trailing `w:sectPr`.
pub fn append_paragraph(xml: &str, para: &Paragraph) -> Result<String> {
    let fragment = paragraph_xml(para);
    let mut reader = reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + fragment.len()));

    let mut in_body = false;
    let mut depth = 0usize;
    let mut inserted = false;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) if !in_body && e.name().as_ref() == b"w:body" => {
                in_body = true;
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) if !in_body && e.name().as_ref() == b"w:body" => {
                let end = BytesEnd::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                writer.write_event(Event::Start(e))?;
                write_raw(&mut writer, &fragment);
                writer.write_event(Event::End(end))?;
                inserted = true;
            }
            Event::Start(e) if in_body => {
                if depth == 0 && !inserted && e.name().as_ref() == b"w:sectPr" {
                    write_raw(&mut writer, &fragment);
                    inserted = true;
                }
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) if in_body => {
                if depth == 0 && !inserted && e.name().as_ref() == b"w:sectPr" {
                    write_raw(&mut writer, &fragment);
                    inserted = true;
                }
                writer.write_event(Event::Empty(e))?;
            }
            Event::End(e) if in_body => {
                if depth == 0 {
                    if !inserted {
                        write_raw(&mut writer, &fragment);
                        inserted = true;
                    }
                    in_body = false;
                } else {
                    depth -= 1;
                }
                writer.write_event(Event::End(e))?;
            }
            event => writer.write_event(event)?,
        }
    }

    if !inserted {
        return Err(no_body());
    }
    into_string(writer)
}

/// Replace everything in the body with one paragraph, keeping the body's
/// own section properties.
pub fn replace_body(xml: &str, para: &Paragraph) -> Result<String> {
    let fragment = paragraph_xml(para);
    let mut reader = reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));

    let mut in_body = false;
    let mut replaced = false;
    // depth of child elements below w:body
    let mut depth = 0usize;
    // while > 0 we are inside the body's w:sectPr and copy everything
    let mut keep_depth = 0usize;

    loop {
        let event = reader.read_event()?;
        if let Event::Eof = event {
            break;
        }

        if !in_body {
            match event {
                Event::Start(e) if e.name().as_ref() == b"w:body" => {
                    writer.write_event(Event::Start(e))?;
                    write_raw(&mut writer, &fragment);
                    in_body = true;
                    replaced = true;
                }
                Event::Empty(e) if e.name().as_ref() == b"w:body" => {
                    let end =
                        BytesEnd::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                    writer.write_event(Event::Start(e))?;
                    write_raw(&mut writer, &fragment);
                    writer.write_event(Event::End(end))?;
                    replaced = true;
                }
                event => writer.write_event(event)?,
            }
            continue;
        }

        match event {
            Event::Start(e) => {
                if keep_depth > 0 {
                    keep_depth += 1;
                    writer.write_event(Event::Start(e))?;
                } else if depth == 0 && e.name().as_ref() == b"w:sectPr" {
                    keep_depth = 1;
                    writer.write_event(Event::Start(e))?;
                }
                depth += 1;
            }
            Event::End(e) => {
                if depth == 0 {
                    in_body = false;
                    writer.write_event(Event::End(e))?;
                    continue;
                }
                depth -= 1;
                if keep_depth > 0 {
                    keep_depth -= 1;
                    writer.write_event(Event::End(e))?;
                }
            }
            Event::Empty(e) => {
                if keep_depth > 0 || (depth == 0 && e.name().as_ref() == b"w:sectPr") {
                    writer.write_event(Event::Empty(e))?;
                }
            }
            event => {
                if keep_depth > 0 {
                    writer.write_event(event)?;
                }
            }
        }
    }

    if !replaced {
        return Err(no_body());
    }
    into_string(writer)
}

/// Replace every occurrence of `find` inside run text (`w:t`).
///
/// Each `w:t` is searched on its own, so a match split across runs is not
/// found. Occurrences inside `mc:Fallback` are rewritten too, keeping the
/// fallback in step with its choice, but are not counted.
///
/// Returns the rewritten XML and the number of occurrences replaced.
pub fn replace_text(xml: &str, find: &str, replace: &str) -> Result<(String, usize)> {
    if find.is_empty() {
        return Err(Error::invalid("search text must not be empty"));
    }

    let mut reader = reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));

    let mut count = 0usize;
    let mut fallback_depth = 0usize;
    // w:t start tag held back until we know whether its text needs xml:space
    let mut pending: Option<BytesStart<'static>> = None;

    loop {
        let event = reader.read_event()?;

        if let Some(mut start) = pending.take() {
            if let Event::Text(ref text) = event {
                let original = text.unescape()?;
                let hits = original.matches(find).count();
                if hits > 0 {
                    let updated = original.replace(find, replace);
                    if needs_preserve(&updated) && start.try_get_attribute("xml:space")?.is_none()
                    {
                        start.push_attribute(("xml:space", "preserve"));
                    }
                    if fallback_depth == 0 {
                        count += hits;
                    }
                    writer.write_event(Event::Start(start))?;
                    writer.write_event(Event::Text(BytesText::new(&updated)))?;
                    continue;
                }
            }
            writer.write_event(Event::Start(start))?;
        }

        match event {
            Event::Eof => break,
            Event::Start(e) if e.name().as_ref() == b"w:t" => pending = Some(e.into_owned()),
            Event::Start(e) => {
                if e.name().as_ref() == b"mc:Fallback" {
                    fallback_depth += 1;
                }
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) => {
                if e.name().as_ref() == b"mc:Fallback" {
                    fallback_depth = fallback_depth.saturating_sub(1);
                }
                writer.write_event(Event::End(e))?;
            }
            event => writer.write_event(event)?,
        }
    }

    Ok((into_string(writer)?, count))
}

fn needs_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
}
