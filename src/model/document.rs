//! Document body and property models.

use super::{Paragraph, Table};
use serde::{Deserialize, Serialize};

/// Core document properties stored in docProps/core.xml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreProperties {
    /// Document title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Document subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Document author (`dc:creator`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Keywords/tags
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub keywords: Vec<String>,

    /// Document description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Last modified by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,

    /// Revision number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    /// Creation date (W3CDTF / ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Last modification date (W3CDTF / ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

/// A top-level element of the document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// The ordered content of `w:body`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Top-level paragraphs, headings included, in order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    pub fn heading_count(&self) -> usize {
        self.paragraphs().filter(|p| p.is_heading()).count()
    }

    /// Words across body paragraphs and table cells.
    pub fn word_count(&self) -> usize {
        let in_paragraphs: usize = self.paragraphs().map(Paragraph::word_count).sum();
        let in_tables: usize = self
            .tables()
            .flat_map(Table::paragraphs)
            .map(Paragraph::word_count)
            .sum();
        in_paragraphs + in_tables
    }

    /// Plain text in document order.
    ///
    /// Blank paragraphs are skipped; each table row becomes one line of
    /// tab-separated cells.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(p) if !p.is_blank() => lines.push(p.text.clone()),
                Block::Paragraph(_) => {}
                Block::Table(t) => {
                    let text = t.plain_text();
                    if !text.is_empty() {
                        lines.push(text);
                    }
                }
            }
        }
        lines.join("\n")
    }
}
