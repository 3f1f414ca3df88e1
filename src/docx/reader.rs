//! Body reader: `word/document.xml` to [`Body`].

use super::styles::{attr_value, StyleMap};
use crate::error::{Error, Result};
use crate::model::{Block, Body, Cell, Paragraph, Row, Table};
use quick_xml::events::Event;

/// Table under construction. Nested tables each get their own entry.
#[derive(Default)]
struct TableFrame {
    table: Table,
    row: Option<Row>,
    cell: Option<Cell>,
}

/// Accumulates blocks while walking the body.
struct BodyBuilder<'a> {
    styles: &'a StyleMap,
    body: Body,
    tables: Vec<TableFrame>,
    paragraph: Option<Paragraph>,
    nested_paragraphs: usize,
}

impl<'a> BodyBuilder<'a> {
    fn new(styles: &'a StyleMap) -> Self {
        Self {
            styles,
            body: Body::new(),
            tables: Vec::new(),
            paragraph: None,
            nested_paragraphs: 0,
        }
    }

    fn start_paragraph(&mut self) {
        if let Some(ref mut para) = self.paragraph {
            // text box content inside a run
            self.nested_paragraphs += 1;
            if para.text.chars().last().is_some_and(|c| !c.is_whitespace()) {
                para.text.push(' ');
            }
        } else {
            self.paragraph = Some(Paragraph::new());
        }
    }

    fn end_paragraph(&mut self) {
        if self.nested_paragraphs > 0 {
            self.nested_paragraphs -= 1;
            return;
        }
        let Some(mut para) = self.paragraph.take() else {
            return;
        };
        if let Some(ref id) = para.style_id {
            para.heading = self.styles.get_heading_level(id);
        }
        self.place_paragraph(para);
    }

    fn place_paragraph(&mut self, para: Paragraph) {
        match self.tables.last_mut() {
            Some(frame) => {
                if let Some(ref mut cell) = frame.cell {
                    cell.content.push(para);
                }
            }
            None => self.body.add_block(Block::Paragraph(para)),
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(ref mut para) = self.paragraph {
            para.text.push_str(text);
        }
    }

    fn set_style(&mut self, style_id: String) {
        if self.nested_paragraphs == 0 {
            if let Some(ref mut para) = self.paragraph {
                para.style_id = Some(style_id);
            }
        }
    }

    fn start_row(&mut self) {
        if let Some(frame) = self.tables.last_mut() {
            frame.row = Some(Row::new());
        }
    }

    fn end_row(&mut self) {
        if let Some(frame) = self.tables.last_mut() {
            if let Some(row) = frame.row.take() {
                frame.table.rows.push(row);
            }
        }
    }

    fn start_cell(&mut self) {
        if let Some(frame) = self.tables.last_mut() {
            frame.cell = Some(Cell::new());
        }
    }

    fn end_cell(&mut self) {
        if let Some(frame) = self.tables.last_mut() {
            if let (Some(cell), Some(row)) = (frame.cell.take(), frame.row.as_mut()) {
                row.cells.push(cell);
            }
        }
    }

    fn end_table(&mut self) {
        let Some(frame) = self.tables.pop() else {
            return;
        };
        if self.tables.is_empty() {
            self.body.add_block(Block::Table(frame.table));
        } else {
            // nested table: flatten each row into a paragraph of the outer cell
            for row in &frame.table.rows {
                self.place_paragraph(Paragraph::with_text(row.plain_text()));
            }
        }
    }
}

/// Read the body of a main document part.
///
/// Only `w:t` content counts as text; `w:tab` becomes `\t` and `w:br`/`w:cr`
/// become `\n`. Fallback branches of `mc:AlternateContent` are skipped so text
/// boxes are not read twice.
pub fn read_body(xml: &str, styles: &StyleMap) -> Result<Body> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut builder = BodyBuilder::new(styles);
    let mut seen_body = false;
    let mut in_body = false;
    let mut in_text = false;
    let mut in_ppr = false;
    let mut fallback_depth = 0usize;

    loop {
        let event = reader.read_event()?;

        if fallback_depth > 0 {
            match event {
                Event::Start(ref e) if e.name().as_ref() == b"mc:Fallback" => fallback_depth += 1,
                Event::End(ref e) if e.name().as_ref() == b"mc:Fallback" => fallback_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:body" => {
                    seen_body = true;
                    in_body = true;
                }
                _ if !in_body => {}
                b"mc:Fallback" => fallback_depth = 1,
                b"w:tbl" => builder.tables.push(TableFrame::default()),
                b"w:tr" => builder.start_row(),
                b"w:tc" => builder.start_cell(),
                b"w:p" => builder.start_paragraph(),
                b"w:pPr" => in_ppr = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:body" => seen_body = true,
                _ if !in_body => {}
                b"w:p" => {
                    builder.start_paragraph();
                    builder.end_paragraph();
                }
                b"w:pStyle" if in_ppr => {
                    if let Some(id) = attr_value(&e, b"w:val") {
                        builder.set_style(id);
                    }
                }
                b"w:tab" if !in_ppr => builder.push_text("\t"),
                b"w:br" | b"w:cr" if !in_ppr => builder.push_text("\n"),
                _ => {}
            },
            Event::Text(e) if in_text => {
                let text = e.unescape()?;
                builder.push_text(&text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:body" => in_body = false,
                _ if !in_body => {}
                b"w:t" => in_text = false,
                b"w:pPr" => in_ppr = false,
                b"w:p" => builder.end_paragraph(),
                b"w:tc" => builder.end_cell(),
                b"w:tr" => builder.end_row(),
                b"w:tbl" => builder.end_table(),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_body {
        return Err(Error::Format("main document part has no w:body".to_string()));
    }

    Ok(builder.body)
}
