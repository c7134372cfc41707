//! Output rendering for documents.
//!
//! Rendering walks the document once, turning each block into a list of
//! lines, and joins the blocks with blank lines. Tables go through the
//! fixed-width layout engine in text mode and become pipe tables (or one of
//! the [`TableFallback`] forms) in Markdown mode.
//!
//! # Example
//!
//! ```no_run
//! use docxtext::{load_document, render::*};
//!
//! let doc = load_document("document.json")?;
//!
//! let text = to_text(&doc, &RenderOptions::default())?;
//! let md = to_markdown(&doc, &RenderOptions::default())?;
//! # Ok::<(), docxtext::Error>(())
//! ```

mod assemble;
mod cleanup;
mod layout;
mod markdown;
mod options;
mod text;
mod walker;
pub mod width;
pub mod wrap;

pub use assemble::{assemble, reflow};
pub use cleanup::{clean_text, normalize_text};
pub use layout::{layout_table, ColumnPlan, MIN_COLUMN_WIDTH};
pub use options::{OutputFormat, RenderOptions, TableFallback};
pub use walker::{walk, BlockKind, RenderedBlock};
pub use width::{display_width, Measure};
pub use wrap::wrap;

use crate::error::Result;
use crate::model::Document;

/// Render a document in the format selected by `options.output_format`.
pub fn render(doc: &Document, options: &RenderOptions) -> Result<String> {
    options.validate()?;
    let blocks = walk(doc, options);
    log::debug!(
        "rendered {} blocks as {:?}",
        blocks.len(),
        options.output_format
    );
    Ok(assemble(&blocks))
}

/// Render a document as plain text with boxed tables.
pub fn to_text(doc: &Document, options: &RenderOptions) -> Result<String> {
    render(doc, &options.clone().with_format(OutputFormat::Text))
}

/// Render a document as Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    render(doc, &options.clone().with_format(OutputFormat::Markdown))
}
