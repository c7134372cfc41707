//! Arena view of a table's merged-cell structure.
//!
//! A [`TableGrid`] places every cell of a [`Table`] on a rectangular grid.
//! Each real cell becomes one [`Anchor`] in an arena; every grid position
//! holds a [`Slot`] that is either the anchor itself or a back-reference to
//! the anchor whose span covers it. Text lives only in the anchor, so a
//! renderer walking the slots can never print merged content twice.
//!
//! Placement follows HTML rules: a cell lands in the first column of its row
//! not already covered by a row span from above. Word's vertical merge
//! markers are folded in while placing: a `continue` cell directly below a
//! mergeable anchor with the same column and column span extends that
//! anchor, as long as the two texts do not disagree.

use super::{Cell, Row, Table, VerticalMerge};
use crate::error::{Error, Result};

/// Widest grid a table may occupy, Word's own column limit.
pub const MAX_COLUMNS: usize = 63;

/// One real (or padding) cell placed on the grid.
#[derive(Debug, Clone, Copy)]
pub struct Anchor<'a> {
    /// Top row of the span
    pub row: usize,
    /// Leftmost column of the span
    pub col: usize,
    /// Number of rows covered (≥ 1)
    pub row_span: usize,
    /// Number of columns covered (≥ 1)
    pub col_span: usize,
    /// Source cell; `None` for the empty filler added to short rows
    pub cell: Option<&'a Cell>,
    /// Whether a `continue` cell below may extend this anchor
    mergeable: bool,
}

impl<'a> Anchor<'a> {
    /// One past the bottom row of the span.
    pub fn end_row(&self) -> usize {
        self.row + self.row_span
    }

    /// One past the rightmost column of the span.
    pub fn end_col(&self) -> usize {
        self.col + self.col_span
    }

    /// Whether this anchor was synthesized to fill a short row.
    pub fn is_padding(&self) -> bool {
        self.cell.is_none()
    }

    /// Whether the anchor spans more than one grid position.
    pub fn is_merged(&self) -> bool {
        self.row_span > 1 || self.col_span > 1
    }

    /// Whether the anchor covers the given position.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.row..self.end_row()).contains(&row) && (self.col..self.end_col()).contains(&col)
    }
}

/// What occupies a grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The top-left position of the anchor with this arena index
    Anchor(usize),
    /// A position covered by the span of the anchor with this arena index
    Covered(usize),
}

impl Slot {
    /// Arena index of the anchor that owns this position.
    pub fn anchor_index(&self) -> usize {
        match *self {
            Slot::Anchor(idx) | Slot::Covered(idx) => idx,
        }
    }
}

/// A table placed on a rectangular grid.
#[derive(Debug, Clone)]
pub struct TableGrid<'a> {
    rows: usize,
    cols: usize,
    anchors: Vec<Anchor<'a>>,
    slots: Vec<Slot>,
    header_rows: Vec<bool>,
}

impl<'a> TableGrid<'a> {
    /// Place the cells of `table` on a grid.
    ///
    /// Fails with [`Error::MalformedTableStructure`] when a span is zero,
    /// runs past the last row or past [`MAX_COLUMNS`], or overlaps another
    /// cell.
    pub fn build(table: &'a Table) -> Result<Self> {
        let rows = table.rows.len();
        let mut occupancy: Vec<Vec<Option<usize>>> = vec![Vec::new(); rows];
        let mut anchors: Vec<Anchor<'a>> = Vec::new();

        for (r, row) in table.rows.iter().enumerate() {
            place_row(r, row, rows, &mut occupancy, &mut anchors)?;
        }

        let cols = occupancy.iter().map(Vec::len).max().unwrap_or(0);

        // Short rows get empty filler anchors so the grid stays rectangular.
        for (r, line) in occupancy.iter_mut().enumerate() {
            line.resize(cols, None);
            for (c, slot) in line.iter_mut().enumerate() {
                if slot.is_none() {
                    *slot = Some(anchors.len());
                    anchors.push(Anchor {
                        row: r,
                        col: c,
                        row_span: 1,
                        col_span: 1,
                        cell: None,
                        mergeable: false,
                    });
                }
            }
        }

        let mut slots = Vec::with_capacity(rows * cols);
        for (r, line) in occupancy.iter().enumerate() {
            for (c, owner) in line.iter().enumerate() {
                let idx = owner.ok_or_else(|| Error::malformed(r, c, "unfilled grid position"))?;
                let anchor = &anchors[idx];
                slots.push(if anchor.row == r && anchor.col == c {
                    Slot::Anchor(idx)
                } else {
                    Slot::Covered(idx)
                });
            }
        }

        let header_rows = table.rows.iter().map(|r| r.is_header).collect();

        log::debug!(
            "table grid: {} rows x {} columns, {} anchors",
            rows,
            cols,
            anchors.len()
        );

        Ok(Self {
            rows,
            cols,
            anchors,
            slots,
            header_rows,
        })
    }

    /// Number of logical rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of logical columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the grid has no positions.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// All anchors, in placement order (row-major, fillers last).
    pub fn anchors(&self) -> &[Anchor<'a>] {
        &self.anchors
    }

    /// Anchor by arena index.
    pub fn anchor(&self, idx: usize) -> &Anchor<'a> {
        &self.anchors[idx]
    }

    /// Slot at a grid position.
    pub fn slot(&self, row: usize, col: usize) -> Slot {
        self.slots[row * self.cols + col]
    }

    /// Arena index of the anchor owning a grid position.
    pub fn owner(&self, row: usize, col: usize) -> usize {
        self.slot(row, col).anchor_index()
    }

    /// Whether a logical row is a header row.
    ///
    /// A row counts as header when the source row is flagged, or when every
    /// real cell anchored in it is a header cell.
    pub fn is_header_row(&self, row: usize) -> bool {
        if self.header_rows.get(row).copied().unwrap_or(false) {
            return true;
        }
        let mut cells = self
            .anchors
            .iter()
            .filter(|a| a.row == row)
            .filter_map(|a| a.cell)
            .peekable();
        cells.peek().is_some() && cells.all(|c| c.is_header)
    }

    /// Whether the grid contains any multi-position anchors.
    pub fn has_merges(&self) -> bool {
        self.anchors.iter().any(Anchor::is_merged)
    }
}

fn place_row<'a>(
    r: usize,
    row: &'a Row,
    rows: usize,
    occupancy: &mut [Vec<Option<usize>>],
    anchors: &mut Vec<Anchor<'a>>,
) -> Result<()> {
    let mut col = 0;

    for cell in &row.cells {
        if cell.col_span == 0 || cell.row_span == 0 {
            return Err(Error::malformed(r, col, "zero-sized span"));
        }
        while is_occupied(occupancy, r, col) {
            col += 1;
        }
        let col_span = cell.col_span as usize;
        if col.checked_add(col_span).map_or(true, |end| end > MAX_COLUMNS) {
            return Err(Error::malformed(
                r,
                col,
                format!("column span of {} runs past column {}", col_span, MAX_COLUMNS),
            ));
        }

        if cell.v_merge == Some(VerticalMerge::Continue) {
            if let Some(idx) = mergeable_anchor_above(occupancy, anchors, r, col, col_span, cell) {
                claim(occupancy, r, col, 1, col_span, idx)?;
                anchors[idx].row_span += 1;
                col += col_span;
                continue;
            }
        }

        let row_span = if cell.v_merge.is_some() {
            1
        } else {
            cell.row_span as usize
        };
        if r.checked_add(row_span).map_or(true, |end| end > rows) {
            return Err(Error::malformed(
                r,
                col,
                format!("row span of {} runs past the last row", row_span),
            ));
        }

        let idx = anchors.len();
        claim(occupancy, r, col, row_span, col_span, idx)?;
        anchors.push(Anchor {
            row: r,
            col,
            row_span,
            col_span,
            cell: Some(cell),
            mergeable: cell.v_merge == Some(VerticalMerge::Restart),
        });
        col += col_span;
    }

    Ok(())
}

fn is_occupied(occupancy: &[Vec<Option<usize>>], row: usize, col: usize) -> bool {
    occupancy[row].get(col).copied().flatten().is_some()
}

/// Mark a rectangle as owned by `idx`, failing on overlap.
fn claim(
    occupancy: &mut [Vec<Option<usize>>],
    row: usize,
    col: usize,
    row_span: usize,
    col_span: usize,
    idx: usize,
) -> Result<()> {
    for r in row..row + row_span {
        let line = &mut occupancy[r];
        if line.len() < col + col_span {
            line.resize(col + col_span, None);
        }
        for (c, slot) in line.iter_mut().enumerate().skip(col).take(col_span) {
            if slot.is_some() {
                return Err(Error::malformed(r, c, "cell spans overlap"));
            }
            *slot = Some(idx);
        }
    }
    Ok(())
}

fn mergeable_anchor_above(
    occupancy: &[Vec<Option<usize>>],
    anchors: &[Anchor<'_>],
    r: usize,
    col: usize,
    col_span: usize,
    cell: &Cell,
) -> Option<usize> {
    let idx = occupancy.get(r.checked_sub(1)?)?.get(col).copied().flatten()?;
    let anchor = &anchors[idx];
    let aligned = anchor.col == col && anchor.col_span == col_span && anchor.end_row() == r;
    if !aligned || !anchor.mergeable {
        return None;
    }
    let above = anchor.cell.map(|c| c.plain_text()).unwrap_or_default();
    let below = cell.plain_text();
    let (above, below) = (above.trim(), below.trim());
    let compatible = above.is_empty() || below.is_empty() || above == below;
    compatible.then_some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Row, Table, VerticalMerge};

    fn coverage(grid: &TableGrid<'_>) -> Vec<usize> {
        let mut counts = vec![0; grid.rows() * grid.cols()];
        for anchor in grid.anchors() {
            for r in anchor.row..anchor.end_row() {
                for c in anchor.col..anchor.end_col() {
                    counts[r * grid.cols() + c] += 1;
                }
            }
        }
        counts
    }

    #[test]
    fn test_simple_grid() {
        let table = Table::from_rows(vec![
            Row::new(vec![Cell::with_text("a"), Cell::with_text("b")]),
            Row::new(vec![Cell::with_text("c"), Cell::with_text("d")]),
        ]);
        let grid = TableGrid::build(&table).unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 2);
        assert_eq!(grid.anchors().len(), 4);
        assert!(!grid.has_merges());
        assert!(coverage(&grid).iter().all(|&n| n == 1));
    }

    #[test]
    fn test_col_span_covered_reference() {
        let table = Table::from_rows(vec![
            Row::new(vec![Cell::with_text("中文测试").spanning_columns(2)]),
            Row::new(vec![Cell::with_text("c"), Cell::with_text("d")]),
        ]);
        let grid = TableGrid::build(&table).unwrap();
        assert_eq!(grid.cols(), 2);
        assert_eq!(grid.slot(0, 0), Slot::Anchor(0));
        assert_eq!(grid.slot(0, 1), Slot::Covered(0));
        assert!(coverage(&grid).iter().all(|&n| n == 1));
    }

    #[test]
    fn test_row_span_html_placement() {
        let table = Table::from_rows(vec![
            Row::new(vec![Cell::with_text("tall").spanning_rows(2), Cell::with_text("b")]),
            Row::new(vec![Cell::with_text("d")]),
        ]);
        let grid = TableGrid::build(&table).unwrap();
        assert_eq!(grid.slot(1, 0), Slot::Covered(0));
        let d = grid.owner(1, 1);
        assert_eq!(grid.anchor(d).cell.unwrap().plain_text(), "d");
        assert!(coverage(&grid).iter().all(|&n| n == 1));
    }

    #[test]
    fn test_vertical_merge_markers() {
        let table = Table::from_rows(vec![
            Row::new(vec![
                Cell::with_text("group").with_v_merge(VerticalMerge::Restart),
                Cell::with_text("1"),
            ]),
            Row::new(vec![
                Cell::new().with_v_merge(VerticalMerge::Continue),
                Cell::with_text("2"),
            ]),
            Row::new(vec![
                Cell::with_text("group").with_v_merge(VerticalMerge::Continue),
                Cell::with_text("3"),
            ]),
        ]);
        let grid = TableGrid::build(&table).unwrap();
        let group = grid.anchor(0);
        assert_eq!(group.row_span, 3);
        assert_eq!(grid.slot(2, 0), Slot::Covered(0));
        assert!(coverage(&grid).iter().all(|&n| n == 1));
    }

    #[test]
    fn test_vertical_merge_conflicting_text_stands_alone() {
        let table = Table::from_rows(vec![
            Row::new(vec![Cell::with_text("alpha").with_v_merge(VerticalMerge::Restart)]),
            Row::new(vec![Cell::with_text("beta").with_v_merge(VerticalMerge::Continue)]),
        ]);
        let grid = TableGrid::build(&table).unwrap();
        assert_eq!(grid.anchor(0).row_span, 1);
        assert_eq!(grid.slot(1, 0), Slot::Anchor(1));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = Table::from_rows(vec![
            Row::new(vec![Cell::with_text("a"), Cell::with_text("b"), Cell::with_text("c")]),
            Row::new(vec![Cell::with_text("d")]),
        ]);
        let grid = TableGrid::build(&table).unwrap();
        assert_eq!(grid.cols(), 3);
        let filler = grid.anchor(grid.owner(1, 2));
        assert!(filler.is_padding());
        assert!(coverage(&grid).iter().all(|&n| n == 1));
    }

    #[test]
    fn test_row_span_past_end_is_malformed() {
        let table = Table::from_rows(vec![Row::new(vec![Cell::with_text("x").spanning_rows(3)])]);
        let err = TableGrid::build(&table).unwrap_err();
        assert!(matches!(err, Error::MalformedTableStructure { row: 0, col: 0, .. }));
    }

    #[test]
    fn test_overlap_is_malformed() {
        // Row 1 has a tall cell in column 1; row 2's wide cell collides with it.
        let table = Table::from_rows(vec![
            Row::new(vec![Cell::with_text("a"), Cell::with_text("b")]),
            Row::new(vec![Cell::with_text("c"), Cell::with_text("tall").spanning_rows(2)]),
            Row::new(vec![Cell::with_text("wide").spanning_columns(2)]),
        ]);
        let err = TableGrid::build(&table).unwrap_err();
        assert!(matches!(err, Error::MalformedTableStructure { row: 2, .. }));
    }

    #[test]
    fn test_zero_span_is_malformed() {
        let table = Table::from_rows(vec![Row::new(vec![Cell::with_text("x").spanning_columns(0)])]);
        assert!(TableGrid::build(&table).is_err());
    }

    #[test]
    fn test_huge_col_span_is_malformed() {
        let table = Table::from_rows(vec![Row::new(vec![
            Cell::with_text("a"),
            Cell::with_text("wide").spanning_columns(u32::MAX),
        ])]);
        let err = TableGrid::build(&table).unwrap_err();
        assert!(matches!(err, Error::MalformedTableStructure { row: 0, col: 1, .. }));

        let table = Table::from_rows(vec![Row::new(vec![
            Cell::with_text("x").spanning_rows(u32::MAX),
        ])]);
        assert!(TableGrid::build(&table).is_err());
    }

    #[test]
    fn test_column_limit() {
        let cells = |n: usize| -> Vec<Cell> {
            (0..n).map(|i| Cell::with_text(i.to_string())).collect()
        };
        let table = Table::from_rows(vec![Row::new(cells(MAX_COLUMNS))]);
        assert_eq!(TableGrid::build(&table).unwrap().cols(), MAX_COLUMNS);

        let table = Table::from_rows(vec![Row::new(cells(MAX_COLUMNS + 1))]);
        let err = TableGrid::build(&table).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedTableStructure { col, .. } if col == MAX_COLUMNS
        ));
    }

    #[test]
    fn test_header_rows() {
        let table = Table::from_rows(vec![
            Row::new(vec![Cell::header("H1"), Cell::header("H2")]),
            Row::new(vec![Cell::with_text("a"), Cell::with_text("b")]),
        ]);
        let grid = TableGrid::build(&table).unwrap();
        assert!(grid.is_header_row(0));
        assert!(!grid.is_header_row(1));
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new();
        let grid = TableGrid::build(&table).unwrap();
        assert!(grid.is_empty());
    }
}
