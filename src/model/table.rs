//! Table model structures.

use super::{Block, Paragraph};
use serde::{Deserialize, Serialize};

/// Word's vertical merge marker (`w:vMerge`).
///
/// A `Restart` cell opens a vertical merge, `Continue` cells below it at the
/// same grid column are folded into it when the grid is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalMerge {
    Restart,
    Continue,
}

/// A cell in a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Cell content: paragraphs and nested tables in document order
    #[serde(default)]
    pub content: Vec<Block>,

    /// Horizontal span (colspan)
    #[serde(default = "default_span", skip_serializing_if = "is_default_span")]
    pub col_span: u32,

    /// Vertical span (rowspan)
    #[serde(default = "default_span", skip_serializing_if = "is_default_span")]
    pub row_span: u32,

    /// Vertical merge marker as found in the source document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_merge: Option<VerticalMerge>,

    /// Whether this is a header cell
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_header: bool,
}

fn default_span() -> u32 {
    1
}

fn is_default_span(n: &u32) -> bool {
    *n == 1
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

impl Cell {
    /// Create a new empty cell.
    pub fn new() -> Self {
        Self {
            content: Vec::new(),
            col_span: 1,
            row_span: 1,
            v_merge: None,
            is_header: false,
        }
    }

    /// Create a cell with text content.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Block::Paragraph(Paragraph::with_text(text))],
            ..Self::new()
        }
    }

    /// Create a header cell with text.
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            is_header: true,
            ..Self::with_text(text)
        }
    }

    /// Create a cell holding a nested table.
    pub fn with_table(table: Table) -> Self {
        Self {
            content: vec![Block::Table(table)],
            ..Self::new()
        }
    }

    /// Set the column span.
    pub fn spanning_columns(mut self, span: u32) -> Self {
        self.col_span = span;
        self
    }

    /// Set the row span.
    pub fn spanning_rows(mut self, span: u32) -> Self {
        self.row_span = span;
        self
    }

    /// Set the vertical merge marker.
    pub fn with_v_merge(mut self, merge: VerticalMerge) -> Self {
        self.v_merge = Some(merge);
        self
    }

    /// Get the plain text content of all paragraphs, one per line.
    ///
    /// Nested tables contribute their own plain text.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|block| match block {
                Block::Paragraph(p) => p.plain_text(),
                Block::Table(t) => t.plain_text(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Iterate over nested tables inside this cell.
    pub fn nested_tables(&self) -> impl Iterator<Item = &Table> {
        self.content.iter().filter_map(|block| match block {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    /// Check if this cell is empty.
    pub fn is_empty(&self) -> bool {
        self.content.iter().all(|block| match block {
            Block::Paragraph(p) => p.is_empty(),
            Block::Table(t) => t.is_empty(),
        })
    }

    /// Check if this cell has any spans.
    pub fn has_spans(&self) -> bool {
        self.col_span > 1 || self.row_span > 1 || self.v_merge.is_some()
    }
}

/// A row in a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Cells in this row
    #[serde(default)]
    pub cells: Vec<Cell>,

    /// Whether this is a header row
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_header: bool,
}

impl Row {
    /// Create a row from cells.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            is_header: false,
        }
    }

    /// Create a header row.
    pub fn header(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            is_header: true,
        }
    }

    /// Add a cell to this row.
    pub fn add_cell(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Get the effective column count (accounting for spans).
    pub fn effective_columns(&self) -> usize {
        self.cells.iter().map(|c| c.col_span.max(1) as usize).sum()
    }
}

/// A table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in this table
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Add a row to this table.
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if the table has merged cells.
    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .any(|r| r.cells.iter().any(|c| c.has_spans()))
    }

    /// Depth of table nesting, counting this table as level 1.
    pub fn nesting_depth(&self) -> usize {
        1 + self
            .rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .flat_map(|c| c.nested_tables())
            .map(|t| t.nesting_depth())
            .max()
            .unwrap_or(0)
    }

    /// Get plain text representation, cells separated by tabs.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|c| c.plain_text())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
