//! Word (.docx) document layer.
//!
//! [`DocxPackage`] is the handle operations work with. The submodules read
//! the body into the [`crate::model`] types, rewrite the main document part,
//! and read or generate styles and core properties.

pub mod editor;
mod package;
pub mod props;
pub mod reader;
pub mod styles;
pub mod template;

pub use package::DocxPackage;
pub use styles::StyleMap;
