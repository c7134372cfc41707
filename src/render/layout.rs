//! Fixed-width table layout.
//!
//! A table is laid out in three passes: the [`ColumnPlan`] fixes every
//! column's width from the width budget, each anchor cell is wrapped at its
//! effective width, and the grid is drawn row by row. Merged cells are drawn
//! from a single per-anchor canvas, so their text appears exactly once no
//! matter how many grid positions they cover.
//!
//! ```text
//! +-------------+------+
//! | merged      | b    |
//! |             +------+
//! |             | d    |
//! +------+------+------+
//! | e    | f    | g    |
//! +------+------+------+
//! ```

use crate::error::{Error, Result};
use crate::model::{Anchor, Block, Cell, Table, TableGrid};

use super::cleanup::clean_text;
use super::options::RenderOptions;
use super::width::{pad_right, Measure};
use super::wrap::wrap_with;

/// Narrowest a column may become, however tight the budget.
pub const MIN_COLUMN_WIDTH: usize = 3;

/// Per-column widths of one table.
///
/// Widths count the characters between two `|` borders, cell padding
/// included. A table drawn from a plan is `total_width()` columns wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    base: Vec<usize>,
    widths: Vec<usize>,
}

impl ColumnPlan {
    /// Plan one column per entry of `content`, the widest single-column
    /// content of that column, then scale so that the drawn table (borders
    /// included) is exactly `budget` wide.
    ///
    /// Before scaling, a column is `unit`, `2 * unit` or `3 * unit` wide,
    /// the smallest of the three that holds its content. No column goes
    /// below [`MIN_COLUMN_WIDTH`]; when the budget cannot hold every column
    /// at that floor the table is allowed to overflow.
    pub fn compute(content: &[usize], budget: usize, unit: usize) -> Self {
        let unit = unit.clamp(MIN_COLUMN_WIDTH, budget.max(MIN_COLUMN_WIDTH));
        let base: Vec<usize> = content
            .iter()
            .map(|&needed| {
                let tier = (1..3)
                    .find(|&tier| needed <= unit.saturating_mul(tier))
                    .unwrap_or(3);
                unit.saturating_mul(tier)
            })
            .collect();
        let widths = fit_to_budget(&base, budget.saturating_sub(content.len() + 1));
        Self { base, widths }
    }

    /// Column widths before fitting to the budget.
    pub fn base_widths(&self) -> &[usize] {
        &self.base
    }

    /// Final column widths.
    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    /// Whether the plan has no columns.
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Width available to a cell spanning `span` columns from `col`: the
    /// spanned column widths plus the borders between them.
    pub fn span_width(&self, col: usize, span: usize) -> usize {
        let end = (col + span).min(self.widths.len());
        let inner: usize = self.widths[col.min(end)..end].iter().sum();
        inner + end.saturating_sub(col).saturating_sub(1)
    }

    /// Width of a drawn line, outer borders included.
    pub fn total_width(&self) -> usize {
        self.widths.iter().sum::<usize>() + self.widths.len() + 1
    }
}

/// Scale `base` proportionally so the widths sum to `target`.
fn fit_to_budget(base: &[usize], target: usize) -> Vec<usize> {
    let columns = base.len();
    if columns == 0 {
        return Vec::new();
    }
    if target <= MIN_COLUMN_WIDTH * columns {
        return vec![MIN_COLUMN_WIDTH; columns];
    }

    let total = base.iter().map(|&w| w as u128).sum::<u128>().max(1);
    let mut widths: Vec<usize> = base
        .iter()
        .map(|&w| {
            let scaled = w as u128 * target as u128 / total;
            usize::try_from(scaled).unwrap_or(target).max(MIN_COLUMN_WIDTH)
        })
        .collect();

    let mut sum = widths.iter().fold(0usize, |sum, &w| sum.saturating_add(w));
    // Rounding leftovers go to the leftmost columns.
    let mut i = 0;
    while sum < target {
        widths[i % columns] += 1;
        sum += 1;
        i += 1;
    }
    // Floors can push the sum over; take it back from the right.
    while sum > target {
        if let Some(w) = widths.iter_mut().rev().find(|w| **w > MIN_COLUMN_WIDTH) {
            *w -= 1;
            sum -= 1;
        } else {
            break;
        }
    }

    widths
}

/// Text used in place of a table that could not be laid out.
pub(crate) fn placeholder(err: &Error) -> String {
    format!("[table omitted: {}]", err)
}

/// Fail if `level` is deeper than the configured maximum.
pub(crate) fn check_depth(level: usize, options: &RenderOptions) -> Result<()> {
    if level > options.max_nesting_depth {
        return Err(Error::LayoutDepthExceeded {
            depth: level,
            max: options.max_nesting_depth,
        });
    }
    Ok(())
}

/// Lay out `table` as a bordered text grid at most `budget` columns wide.
///
/// `level` is the nesting level of the table, 1 for a top-level table.
pub fn layout_table(
    table: &Table,
    budget: usize,
    level: usize,
    options: &RenderOptions,
) -> Result<Vec<String>> {
    check_depth(level, options)?;

    let grid = TableGrid::build(table)?;
    if grid.is_empty() {
        return Ok(Vec::new());
    }

    let plan = ColumnPlan::compute(
        &content_widths(&grid, options),
        budget,
        options.column_unit(level),
    );
    log::debug!(
        "level {} table: budget {}, column widths {:?}",
        level,
        budget,
        plan.widths()
    );

    let measure = options.measure();
    let contents = grid
        .anchors()
        .iter()
        .map(|anchor| {
            let content_width = plan
                .span_width(anchor.col, anchor.col_span)
                .saturating_sub(options.cell_padding);
            match anchor.cell {
                Some(cell) => cell_lines(cell, content_width, level, options),
                None => Ok(vec![String::new()]),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let heights = row_heights(&grid, &contents);
    let drawer = GridDrawer::new(&grid, &plan, &heights, &contents, options, measure);
    Ok(drawer.draw())
}

/// Widest unwrapped line in each column, over cells spanning one column.
fn content_widths(grid: &TableGrid<'_>, options: &RenderOptions) -> Vec<usize> {
    let measure = options.measure();
    let mut widest = vec![0; grid.cols()];
    for anchor in grid.anchors().iter().filter(|a| a.col_span == 1) {
        if let Some(cell) = anchor.cell {
            let text = clean_text(&cell.plain_text(), options.merge_consecutive_empty_lines);
            let width = text.lines().map(|l| measure.width(l)).max().unwrap_or(0);
            widest[anchor.col] = widest[anchor.col].max(width);
        }
    }
    widest
}

/// Wrap a cell's content at `width`, recursing into nested tables.
fn cell_lines(
    cell: &Cell,
    width: usize,
    level: usize,
    options: &RenderOptions,
) -> Result<Vec<String>> {
    let measure = options.measure();
    let mut lines = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    let flush = |pending: &mut Vec<String>, lines: &mut Vec<String>| {
        let text = clean_text(&pending.join("\n"), options.merge_consecutive_empty_lines);
        pending.clear();
        if !text.is_empty() {
            lines.extend(wrap_with(&text, width, measure));
        }
    };

    for block in &cell.content {
        match block {
            Block::Paragraph(para) => pending.push(para.plain_text()),
            Block::Table(nested) => {
                flush(&mut pending, &mut lines);
                match layout_table(nested, width, level + 1, options) {
                    Ok(nested_lines) => lines.extend(nested_lines),
                    Err(err @ Error::MalformedTableStructure { .. }) => {
                        log::warn!("nested table at level {} omitted: {}", level + 1, err);
                        lines.extend(wrap_with(&placeholder(&err), width, measure));
                    }
                    Err(err) => return Err(err),
                }
            }
        }
    }
    flush(&mut pending, &mut lines);

    if lines.is_empty() {
        lines.push(String::new());
    }
    Ok(lines)
}

/// Height in lines of every logical row.
///
/// Single-row anchors set the base height; a row-spanning anchor that does
/// not fit into the rows it covers (plus the borders between them) stretches
/// its last row.
fn row_heights(grid: &TableGrid<'_>, contents: &[Vec<String>]) -> Vec<usize> {
    let mut heights = vec![1; grid.rows()];

    for (anchor, lines) in grid.anchors().iter().zip(contents) {
        if anchor.row_span == 1 {
            heights[anchor.row] = heights[anchor.row].max(lines.len());
        }
    }

    let mut spanning: Vec<(&Anchor<'_>, usize)> = grid
        .anchors()
        .iter()
        .zip(contents)
        .filter(|(a, _)| a.row_span > 1)
        .map(|(a, lines)| (a, lines.len()))
        .collect();
    spanning.sort_by_key(|(a, _)| (a.row_span, a.row, a.col));

    for (anchor, needed) in spanning {
        let rows = anchor.row..anchor.end_row();
        let available: usize = heights[rows].iter().sum::<usize>() + anchor.row_span - 1;
        if needed > available {
            heights[anchor.end_row() - 1] += needed - available;
        }
    }

    heights
}

/// Draws a laid-out grid line by line.
struct GridDrawer<'g, 'a> {
    grid: &'g TableGrid<'a>,
    plan: &'g ColumnPlan,
    row_top: Vec<usize>,
    heights: &'g [usize],
    canvases: Vec<Vec<String>>,
}

/// One horizontal stretch of a border line.
enum Segment {
    /// Plain border over one column
    Rule { col: usize, fill: char },
    /// Interior of a row-spanning anchor crossing this border
    Interior { anchor: usize },
}

impl<'g, 'a> GridDrawer<'g, 'a> {
    fn new(
        grid: &'g TableGrid<'a>,
        plan: &'g ColumnPlan,
        heights: &'g [usize],
        contents: &[Vec<String>],
        options: &RenderOptions,
        measure: Measure,
    ) -> Self {
        // Line 0 is the top border; every row is followed by one border line.
        let mut row_top = Vec::with_capacity(heights.len());
        let mut y = 1;
        for &h in heights {
            row_top.push(y);
            y += h + 1;
        }

        let left_pad = " ".repeat(options.cell_left_padding);
        let canvases = grid
            .anchors()
            .iter()
            .zip(contents)
            .map(|(anchor, lines)| {
                let last = anchor.end_row() - 1;
                let height = row_top[last] + heights[last] - row_top[anchor.row];
                let width = plan.span_width(anchor.col, anchor.col_span);
                let top = if anchor.row_span > 1 {
                    height.saturating_sub(lines.len()) / 2
                } else {
                    0
                };

                (0..height)
                    .map(|i| {
                        let text = i
                            .checked_sub(top)
                            .and_then(|j| lines.get(j))
                            .filter(|l| !l.is_empty())
                            .map(|l| format!("{}{}", left_pad, l))
                            .unwrap_or_default();
                        pad_right(&text, width, measure)
                    })
                    .collect()
            })
            .collect();

        Self {
            grid,
            plan,
            row_top,
            heights,
            canvases,
        }
    }

    fn draw(&self) -> Vec<String> {
        let rows = self.grid.rows();
        let mut out = vec![self.border(None, Some(0), 0)];

        for r in 0..rows {
            for i in 0..self.heights[r] {
                out.push(self.content_line(r, self.row_top[r] + i));
            }
            let below = (r + 1 < rows).then_some(r + 1);
            out.push(self.border(Some(r), below, self.row_top[r] + self.heights[r]));
        }

        out
    }

    /// Canvas line of an anchor at absolute line `y`.
    fn canvas_line(&self, idx: usize, y: usize) -> &str {
        let anchor = self.grid.anchor(idx);
        &self.canvases[idx][y - self.row_top[anchor.row]]
    }

    fn content_line(&self, row: usize, y: usize) -> String {
        let mut line = String::from("|");
        let mut col = 0;
        while col < self.grid.cols() {
            let idx = self.grid.owner(row, col);
            line.push_str(self.canvas_line(idx, y));
            line.push('|');
            col = self.grid.anchor(idx).end_col();
        }
        line
    }

    fn border(&self, above: Option<usize>, below: Option<usize>, y: usize) -> String {
        let fill = match (above, below) {
            (Some(a), Some(b)) if self.grid.is_header_row(a) && !self.grid.is_header_row(b) => '=',
            _ => '-',
        };

        let mut segments = Vec::new();
        let mut col = 0;
        while col < self.grid.cols() {
            let continuing = match (above, below) {
                (Some(a), Some(b)) => {
                    let idx = self.grid.owner(a, col);
                    (idx == self.grid.owner(b, col)).then_some(idx)
                }
                _ => None,
            };
            match continuing {
                Some(anchor) => {
                    segments.push(Segment::Interior { anchor });
                    col = self.grid.anchor(anchor).end_col();
                }
                None => {
                    segments.push(Segment::Rule { col, fill });
                    col += 1;
                }
            }
        }

        let is_rule = |s: Option<&Segment>| matches!(s, Some(Segment::Rule { .. }));
        let joint = |left: Option<&Segment>, right: Option<&Segment>| {
            if is_rule(left) || is_rule(right) {
                '+'
            } else {
                '|'
            }
        };

        let mut line = String::new();
        let mut prev: Option<&Segment> = None;
        for segment in &segments {
            line.push(joint(prev, Some(segment)));
            match *segment {
                Segment::Rule { col, fill } => {
                    line.extend(std::iter::repeat_n(fill, self.plan.widths()[col]));
                }
                Segment::Interior { anchor } => line.push_str(self.canvas_line(anchor, y)),
            }
            prev = Some(segment);
        }
        line.push(joint(prev, None));
        line
    }
}
