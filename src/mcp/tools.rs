//! Tool catalogue and argument decoding.
//!
//! Every tool maps onto one [`DocumentService`] method. Argument decoding
//! failures are protocol errors; failures inside the operation are reported as
//! tool results with `isError` set so the caller can read the kind.

use crate::error::Error;
use crate::ops::{CreateOptions, DocumentService};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error as ThisError;

/// An entry of the `tools/list` result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// A text content item of a tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// The `tools/call` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<TextContent>,
    pub structured_content: Value,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(value: Value) -> Self {
        Self {
            content: vec![TextContent::new(value.to_string())],
            structured_content: value,
            is_error: false,
        }
    }

    pub fn failure(err: &Error) -> Self {
        let message = err.to_string();
        Self {
            content: vec![TextContent::new(message.clone())],
            structured_content: json!({ "kind": err.kind(), "message": message }),
            is_error: true,
        }
    }
}

impl TextContent {
    fn new(text: String) -> Self {
        Self {
            kind: "text".to_string(),
            text,
        }
    }
}

/// Why a call never reached the document layer.
#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

#[derive(Debug, Deserialize)]
struct FilenameArgs {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct ListArgs {
    #[serde(default)]
    directory: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CopyArgs {
    source_filename: String,
    target_filename: String,
}

#[derive(Debug, Deserialize)]
struct CreateArgs {
    filename: String,
    #[serde(flatten)]
    options: CreateOptions,
}

#[derive(Debug, Deserialize)]
struct WriteArgs {
    filename: String,
    text: String,
    #[serde(default = "default_append")]
    append: bool,
}

#[derive(Debug, Deserialize)]
struct HeadingArgs {
    filename: String,
    text: String,
    #[serde(default = "default_level")]
    level: i64,
}

#[derive(Debug, Deserialize)]
struct ReplaceArgs {
    filename: String,
    find_text: String,
    replace_text: String,
}

#[derive(Debug, Deserialize)]
struct ExportArgs {
    source_filename: String,
    #[serde(default)]
    target_filename: Option<String>,
}

fn default_append() -> bool {
    true
}

fn default_level() -> i64 {
    1
}

fn string_prop(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// All tools, in the order `tools/list` reports them.
pub fn catalogue() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "read_document",
            description: "Extract the text of a Word document, paragraphs and table rows in order.",
            input_schema: schema(
                json!({ "filename": string_prop("Path to the .docx file") }),
                &["filename"],
            ),
        },
        ToolDefinition {
            name: "get_document_info",
            description: "Read title, author, timestamps and content statistics of a Word document.",
            input_schema: schema(
                json!({ "filename": string_prop("Path to the .docx file") }),
                &["filename"],
            ),
        },
        ToolDefinition {
            name: "list_documents",
            description: "List the .docx files in a directory.",
            input_schema: schema(
                json!({ "directory": string_prop("Directory to list (default: working directory)") }),
                &[],
            ),
        },
        ToolDefinition {
            name: "copy_document",
            description: "Copy a Word document to a new file.",
            input_schema: schema(
                json!({
                    "source_filename": string_prop("Document to copy"),
                    "target_filename": string_prop("New file; must not exist"),
                }),
                &["source_filename", "target_filename"],
            ),
        },
        ToolDefinition {
            name: "create_document",
            description: "Create a new blank Word document. Never overwrites.",
            input_schema: schema(
                json!({
                    "filename": string_prop("Path of the new .docx file"),
                    "title": string_prop("Document title"),
                    "author": string_prop("Document author"),
                }),
                &["filename"],
            ),
        },
        ToolDefinition {
            name: "write_text",
            description: "Append a paragraph to a document, or replace its whole body.",
            input_schema: schema(
                json!({
                    "filename": string_prop("Path to the .docx file"),
                    "text": string_prop("Paragraph text"),
                    "append": {
                        "type": "boolean",
                        "description": "Append (true) or replace the body (false)",
                        "default": true,
                    },
                }),
                &["filename", "text"],
            ),
        },
        ToolDefinition {
            name: "add_heading",
            description: "Append a heading paragraph to a document.",
            input_schema: schema(
                json!({
                    "filename": string_prop("Path to the .docx file"),
                    "text": string_prop("Heading text"),
                    "level": {
                        "type": "integer",
                        "description": "Heading level",
                        "minimum": 1,
                        "maximum": 6,
                        "default": 1,
                    },
                }),
                &["filename", "text"],
            ),
        },
        ToolDefinition {
            name: "replace_text",
            description: "Replace every occurrence of a string in the document's runs.",
            input_schema: schema(
                json!({
                    "filename": string_prop("Path to the .docx file"),
                    "find_text": string_prop("Exact text to find"),
                    "replace_text": string_prop("Replacement text"),
                }),
                &["filename", "find_text", "replace_text"],
            ),
        },
        ToolDefinition {
            name: "export_to_pdf",
            description: "Convert a Word document to PDF with LibreOffice.",
            input_schema: schema(
                json!({
                    "source_filename": string_prop("Document to convert"),
                    "target_filename": string_prop("PDF path (default: next to the source)"),
                }),
                &["source_filename"],
            ),
        },
    ]
}

fn decode<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, DispatchError> {
    let arguments = match arguments {
        Value::Null => json!({}),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| DispatchError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

fn path_value(path: &std::path::Path) -> Value {
    Value::String(path.display().to_string())
}

/// Run tool `name` with `arguments`.
///
/// The outer error is a protocol failure; the inner result is the
/// operation's own outcome.
pub fn call_tool(
    service: &DocumentService,
    name: &str,
    arguments: Value,
) -> Result<crate::Result<Value>, DispatchError> {
    let outcome = match name {
        "read_document" => {
            let args: FilenameArgs = decode(name, arguments)?;
            service
                .read_document(&args.filename)
                .map(|text| json!({ "text": text }))
        }
        "get_document_info" => {
            let args: FilenameArgs = decode(name, arguments)?;
            service
                .get_document_info(&args.filename)
                .map(|info| json!(info))
        }
        "list_documents" => {
            let args: ListArgs = decode(name, arguments)?;
            let directory = args.directory.unwrap_or_default();
            let resolved = service.resolver().resolve_dir(&directory);
            service
                .list_documents(&directory)
                .map(|docs| json!({ "directory": path_value(&resolved), "documents": docs }))
        }
        "copy_document" => {
            let args: CopyArgs = decode(name, arguments)?;
            service
                .copy_document(&args.source_filename, &args.target_filename)
                .and_then(|target| {
                    let source = service.resolver().resolve(&args.source_filename)?;
                    Ok(json!({ "source": path_value(&source), "target": path_value(&target) }))
                })
        }
        "create_document" => {
            let args: CreateArgs = decode(name, arguments)?;
            service
                .create_document(&args.filename, &args.options)
                .map(|path| json!({ "path": path_value(&path) }))
        }
        "write_text" => {
            let args: WriteArgs = decode(name, arguments)?;
            service
                .write_text(&args.filename, &args.text, args.append)
                .map(|path| json!({ "path": path_value(&path), "appended": args.append }))
        }
        "add_heading" => {
            let args: HeadingArgs = decode(name, arguments)?;
            // out-of-range values fall through to the level check
            let level = u8::try_from(args.level).unwrap_or(0);
            service
                .add_heading(&args.filename, &args.text, level)
                .map(|path| json!({ "path": path_value(&path), "level": level }))
        }
        "replace_text" => {
            let args: ReplaceArgs = decode(name, arguments)?;
            service
                .replace_text(&args.filename, &args.find_text, &args.replace_text)
                .map(|count| json!({ "replacements": count }))
        }
        "export_to_pdf" => {
            let args: ExportArgs = decode(name, arguments)?;
            service
                .export_to_pdf(&args.source_filename, args.target_filename.as_deref())
                .map(|path| json!({ "path": path_value(&path) }))
        }
        _ => return Err(DispatchError::UnknownTool(name.to_string())),
    };
    Ok(outcome)
}
