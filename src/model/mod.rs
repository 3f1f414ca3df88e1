//! In-memory view of a Word document body and its properties.
//!
//! The reader in [`crate::docx`] turns `word/document.xml` into these
//! structures; operations render them back to plain text or count them.

mod document;
mod paragraph;
mod table;

pub use document::*;
pub use paragraph::*;
pub use table::*;
