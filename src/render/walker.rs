//! Block-by-block document traversal.

use crate::error::Result;
use crate::model::{Block, Document, Paragraph, Table};

use super::layout::{layout_table, placeholder};
use super::options::{OutputFormat, RenderOptions};
use super::{markdown, text};

/// What a rendered block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Body paragraph
    Paragraph,
    /// Heading paragraph
    Heading,
    /// Laid-out table
    Table,
    /// Stand-in for a table that could not be laid out
    Placeholder,
}

/// Output lines of a single document block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    pub kind: BlockKind,
    pub lines: Vec<String>,
}

impl RenderedBlock {
    /// Create a rendered block.
    pub fn new(kind: BlockKind, lines: Vec<String>) -> Self {
        Self { kind, lines }
    }
}

/// Render every block of `doc` in document order.
///
/// A table that fails to lay out is replaced by a placeholder block and the
/// walk carries on with the next block. Empty paragraphs are skipped unless
/// `include_empty_paragraphs` is set.
pub fn walk(doc: &Document, options: &RenderOptions) -> Vec<RenderedBlock> {
    doc.blocks
        .iter()
        .enumerate()
        .filter_map(|(index, block)| match block {
            Block::Paragraph(para) => render_paragraph(para, options),
            Block::Table(table) => Some(render_table(index, table, options)),
        })
        .collect()
}

fn render_paragraph(para: &Paragraph, options: &RenderOptions) -> Option<RenderedBlock> {
    if para.is_empty() {
        return options
            .include_empty_paragraphs
            .then(|| RenderedBlock::new(BlockKind::Paragraph, vec![String::new()]));
    }

    let lines = match options.output_format {
        OutputFormat::Text => text::render_paragraph(para, options),
        OutputFormat::Markdown => markdown::render_paragraph(para, options),
    };
    let kind = if para.is_heading() {
        BlockKind::Heading
    } else {
        BlockKind::Paragraph
    };
    Some(RenderedBlock::new(kind, lines))
}

fn render_table(index: usize, table: &Table, options: &RenderOptions) -> RenderedBlock {
    match table_lines(table, options) {
        Ok(lines) => RenderedBlock::new(BlockKind::Table, lines),
        Err(err) => {
            if err.is_table_local() {
                log::warn!("table at block {} omitted: {}", index, err);
            } else {
                log::error!("table at block {} failed: {}", index, err);
            }
            RenderedBlock::new(BlockKind::Placeholder, vec![placeholder(&err)])
        }
    }
}

fn table_lines(table: &Table, options: &RenderOptions) -> Result<Vec<String>> {
    match options.output_format {
        OutputFormat::Text => layout_table(table, options.text_width, 1, options),
        OutputFormat::Markdown => markdown::render_table(table, 1, options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, HeadingLevel, Row};

    fn sample_doc() -> Document {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::heading(HeadingLevel::H1, "Title"));
        doc.add_paragraph(Paragraph::new());
        doc.add_table(Table::from_rows(vec![Row::new(vec![Cell::with_text("x")])]));
        doc.add_paragraph(Paragraph::with_text("after"));
        doc
    }

    #[test]
    fn test_walk_kinds_in_order() {
        let blocks = walk(&sample_doc(), &RenderOptions::default());
        let kinds: Vec<_> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![BlockKind::Heading, BlockKind::Table, BlockKind::Paragraph]);
    }

    #[test]
    fn test_empty_paragraph_included_on_request() {
        let mut options = RenderOptions::default();
        options.include_empty_paragraphs = true;
        assert_eq!(walk(&sample_doc(), &options).len(), 4);
    }

    #[test]
    fn test_bad_table_becomes_placeholder() {
        let mut doc = Document::new();
        doc.add_table(Table::from_rows(vec![Row::new(vec![
            Cell::with_text("x").spanning_rows(3),
        ])]));
        doc.add_paragraph(Paragraph::with_text("still here"));

        let blocks = walk(&doc, &RenderOptions::default());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Placeholder);
        assert!(blocks[0].lines[0].starts_with("[table omitted: "));
        assert_eq!(blocks[1].lines, vec!["    still here"]);
    }

    #[test]
    fn test_depth_error_becomes_placeholder() {
        let mut table = Table::from_rows(vec![Row::new(vec![Cell::with_text("core")])]);
        for _ in 0..3 {
            table = Table::from_rows(vec![Row::new(vec![Cell::with_table(table)])]);
        }
        let mut doc = Document::new();
        doc.add_table(table);

        let options = RenderOptions::default().with_max_nesting_depth(2);
        for format in [OutputFormat::Text, OutputFormat::Markdown] {
            let blocks = walk(&doc, &options.clone().with_format(format));
            assert_eq!(blocks[0].kind, BlockKind::Placeholder);
            assert!(blocks[0].lines[0].contains("nesting"), "{:?}", blocks[0].lines);
        }
    }
}
