//! Table model structures.

use super::Paragraph;
use serde::{Deserialize, Serialize};

/// A cell in a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Cell content (paragraphs). Nested tables are flattened into these.
    #[serde(default)]
    pub content: Vec<Paragraph>,
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of all non-blank paragraphs, joined by spaces.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .filter(|p| !p.is_blank())
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A row in a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell texts joined by tabs.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(Cell::plain_text)
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table in the document body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate over every paragraph in every cell.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .flat_map(|cell| cell.content.iter())
    }

    /// One line per row that has any text.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(Row::plain_text)
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
