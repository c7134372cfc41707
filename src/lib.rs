//! # docxtext
//!
//! Plain text and Markdown rendering of Word documents, with tables laid out
//! on a monospace grid that stays aligned for Chinese, Japanese and Korean
//! text.
//!
//! The input is the document model of an already-parsed `.docx` file
//! (paragraphs, runs and tables with merged cells), usually read from its
//! JSON form.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docxtext::{convert_file, render::RenderOptions};
//!
//! let text = convert_file("document.json", &RenderOptions::default())?;
//! println!("{}", text);
//! # Ok::<(), docxtext::Error>(())
//! ```
//!
//! ## Building documents in code
//!
//! ```
//! use docxtext::{Cell, Document, Paragraph, Row, Table};
//! use docxtext::render::{to_text, RenderOptions};
//!
//! let mut doc = Document::new();
//! doc.add_paragraph(Paragraph::with_text("Totals"));
//! doc.add_table(Table::from_rows(vec![
//!     Row::new(vec![Cell::with_text("区域").spanning_columns(2)]),
//!     Row::new(vec![Cell::with_text("北"), Cell::with_text("南")]),
//! ]));
//!
//! let text = to_text(&doc, &RenderOptions::default())?;
//! assert_eq!(text.matches("区域").count(), 1);
//! # Ok::<(), docxtext::Error>(())
//! ```
//!
//! ## Features
//!
//! - `async`: Async file loading with Tokio

pub mod batch;
pub mod detect;
pub mod error;
pub mod model;
pub mod render;

// Re-exports
pub use detect::{detect_from_bytes, InputKind};
pub use error::{Error, Result};
pub use model::{
    Block, Cell, Document, HeadingLevel, Paragraph, Row, Table, TextRun, TextStyle, VerticalMerge,
};
pub use render::{OutputFormat, RenderOptions, TableFallback};

use std::path::Path;

/// Load a document model from a file.
///
/// # Example
///
/// ```no_run
/// use docxtext::load_document;
///
/// let doc = load_document("document.json")?;
/// println!("Tables: {}", doc.table_count());
/// # Ok::<(), docxtext::Error>(())
/// ```
pub fn load_document(path: impl AsRef<Path>) -> Result<Document> {
    let data = std::fs::read(path.as_ref())?;
    parse_document(&data)
}

/// Decode a document model from bytes.
pub fn parse_document(data: &[u8]) -> Result<Document> {
    match detect_from_bytes(data) {
        InputKind::DocumentModel => Document::from_json_bytes(data),
        InputKind::OfficeArchive => Err(Error::UnsupportedFormat(
            "raw .docx archives are not read directly; supply the JSON document model".to_string(),
        )),
        InputKind::Unknown => Err(Error::InvalidData(
            "input is not a JSON document model".to_string(),
        )),
    }
}

/// Load a document and render it with the given options.
///
/// # Example
///
/// ```no_run
/// use docxtext::{convert_file, OutputFormat, RenderOptions};
///
/// let options = RenderOptions::default().with_format(OutputFormat::Markdown);
/// let markdown = convert_file("document.json", &options)?;
/// std::fs::write("output.md", markdown)?;
/// # Ok::<(), docxtext::Error>(())
/// ```
pub fn convert_file(path: impl AsRef<Path>, options: &RenderOptions) -> Result<String> {
    let path = path.as_ref();
    let doc = load_document(path)?;
    let output = render::render(&doc, options)?;
    log::info!(
        "converted {} ({} blocks, {} tables)",
        path.display(),
        doc.blocks.len(),
        doc.table_count()
    );
    Ok(output)
}

/// Async variant of [`convert_file`]; reads the file with Tokio.
#[cfg(feature = "async")]
pub async fn convert_file_async(path: impl AsRef<Path>, options: &RenderOptions) -> Result<String> {
    let path = path.as_ref();
    let data = tokio::fs::read(path).await?;
    let doc = parse_document(&data)?;
    let output = render::render(&doc, options)?;
    log::info!("converted {} ({} blocks)", path.display(), doc.blocks.len());
    Ok(output)
}
