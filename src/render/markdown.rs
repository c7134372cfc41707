//! Markdown rendering of paragraphs and tables.

use crate::error::{Error, Result};
use crate::model::{Anchor, Block, Cell, Paragraph, Slot, Table, TableGrid, TextRun};

use super::cleanup::normalize_text;
use super::layout::{check_depth, layout_table, placeholder};
use super::options::{RenderOptions, TableFallback};

/// Render a paragraph as Markdown lines.
///
/// Headings get the heading prefix repeated once per level. Hard line breaks
/// become Markdown hard breaks (two trailing spaces).
pub fn render_paragraph(para: &Paragraph, options: &RenderOptions) -> Vec<String> {
    let text = render_inline(para, options);

    if para.is_heading() {
        let title = text.split('\n').map(str::trim).collect::<Vec<_>>().join(" ");
        return vec![format!(
            "{} {}",
            options.heading_prefix.repeat(para.heading.level() as usize),
            title.trim()
        )];
    }

    let lines: Vec<&str> = text.split('\n').map(str::trim).collect();
    let last = lines.len() - 1;
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i < last {
                format!("{}  ", line)
            } else {
                line.to_string()
            }
        })
        .collect()
}

/// Inline Markdown for a paragraph's runs; line breaks stay as `\n`.
fn render_inline(para: &Paragraph, options: &RenderOptions) -> String {
    // **a** **b** reads worse than **ab**
    let merged = para.with_merged_runs();
    merged.runs.iter().map(|run| render_run(run, options)).collect()
}

/// Render a text run to Markdown.
fn render_run(run: &TextRun, options: &RenderOptions) -> String {
    let raw = normalize_text(&run.text);
    let mut text = if raw.trim().is_empty() {
        raw
    } else {
        // Markers must hug the text, so surrounding spaces stay outside.
        let leading = &raw[..raw.len() - raw.trim_start().len()];
        let trailing = &raw[raw.trim_end().len()..];
        let core = raw.trim();

        // Code spans are literal; escapes inside them would show.
        let mut core = if run.style.code {
            code_span(core)
        } else if options.escape_special_chars {
            escape_markdown(core)
        } else {
            core.to_string()
        };
        if run.style.strikethrough {
            core = format!("~~{}~~", core);
        }
        if run.style.bold && run.style.italic {
            core = format!("***{}***", core);
        } else if run.style.bold {
            core = format!("**{}**", core);
        } else if run.style.italic {
            core = format!("*{}*", core);
        }
        format!("{}{}{}", leading, core, trailing)
    };

    if run.line_break {
        text.push('\n');
    }
    text
}

/// Wrap `code` in a backtick fence longer than any backtick run inside it.
fn code_span(code: &str) -> String {
    let longest = code.split(|c| c != '`').map(str::len).max().unwrap_or(0);
    let fence = "`".repeat(longest + 1);
    if code.starts_with('`') || code.ends_with('`') {
        format!("{} {} {}", fence, code, fence)
    } else {
        format!("{}{}{}", fence, code, fence)
    }
}

/// Escape every `|` not already escaped, so it cannot end a table cell.
fn escape_pipes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut backslashes = 0;
    for c in s.chars() {
        if c == '|' && backslashes % 2 == 0 {
            result.push('\\');
        }
        backslashes = if c == '\\' { backslashes + 1 } else { 0 };
        result.push(c);
    }
    result
}

/// Escape Markdown special characters.
///
/// `\`, `` ` `` and `|` are always escaped. `*` and `_` are escaped only
/// where they could open or close emphasis: not after an opener or
/// whitespace, and not before a closer or whitespace.
fn escape_markdown(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '\\' | '`' | '|' => {
                result.push('\\');
                result.push(c);
            }
            '*' | '_' => {
                let prev = if i > 0 { Some(chars[i - 1]) } else { None };
                let next = chars.get(i + 1).copied();

                let after_opener = prev.is_none_or(|p| {
                    matches!(p, '(' | '[' | '{' | ':' | '-' | '/' | '\\') || p.is_whitespace()
                });
                let before_closer = next.is_none_or(|n| {
                    matches!(n, ')' | ']' | '}' | ':' | '-' | '/' | '\\') || n.is_whitespace()
                });

                if !(after_opener || before_closer) {
                    result.push('\\');
                }
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

/// Render a table as Markdown lines.
///
/// Tables without merged cells are always pipe tables. Tables with merged
/// cells follow [`TableFallback`]. Nested tables are rendered after the
/// table that contains them, one level deeper.
pub fn render_table(table: &Table, level: usize, options: &RenderOptions) -> Result<Vec<String>> {
    check_depth(level, options)?;

    let grid = TableGrid::build(table)?;
    if grid.is_empty() {
        return Ok(Vec::new());
    }

    let mut lines = if grid.has_merges() {
        match options.table_fallback {
            TableFallback::Markdown => pipe_table(&grid, options),
            TableFallback::Html => html_table(&grid),
            TableFallback::Ascii => {
                let mut fenced = vec!["```text".to_string()];
                fenced.extend(layout_table(table, options.text_width, level, options)?);
                fenced.push("```".to_string());
                // The text grid already draws nested tables in place.
                return Ok(fenced);
            }
        }
    } else {
        pipe_table(&grid, options)
    };

    for anchor in grid.anchors() {
        for nested in anchor.cell.into_iter().flat_map(Cell::nested_tables) {
            lines.push(String::new());
            match render_table(nested, level + 1, options) {
                Ok(nested_lines) => lines.extend(nested_lines),
                Err(err @ Error::MalformedTableStructure { .. }) => {
                    log::warn!("nested table at level {} omitted: {}", level + 1, err);
                    lines.push(placeholder(&err));
                }
                Err(err) => return Err(err),
            }
        }
    }

    Ok(lines)
}

/// Pipe table; the first row is always the header row.
fn pipe_table(grid: &TableGrid<'_>, options: &RenderOptions) -> Vec<String> {
    let mut lines = Vec::with_capacity(grid.rows() + 1);

    for r in 0..grid.rows() {
        let mut line = String::from("|");
        for c in 0..grid.cols() {
            match grid.slot(r, c) {
                Slot::Anchor(idx) => {
                    let anchor = grid.anchor(idx);
                    let mut text = anchor
                        .cell
                        .map(|cell| cell_inline(cell, options))
                        .unwrap_or_default();
                    if anchor.is_merged() {
                        if !text.is_empty() {
                            text.push(' ');
                        }
                        text.push_str(&span_note(anchor));
                    }
                    push_cell(&mut line, &text);
                }
                Slot::Covered(_) => push_cell(&mut line, ""),
            }
        }
        lines.push(line);

        if r == 0 {
            lines.push(format!("|{}", " --- |".repeat(grid.cols())));
        }
    }

    lines
}

fn push_cell(line: &mut String, text: &str) {
    if text.is_empty() {
        line.push_str(" |");
    } else {
        line.push(' ');
        line.push_str(text);
        line.push_str(" |");
    }
}

/// `<!-- colspan=N rowspan=M -->`, naming only the spans above one.
fn span_note(anchor: &Anchor<'_>) -> String {
    let mut parts = Vec::new();
    if anchor.col_span > 1 {
        parts.push(format!("colspan={}", anchor.col_span));
    }
    if anchor.row_span > 1 {
        parts.push(format!("rowspan={}", anchor.row_span));
    }
    format!("<!-- {} -->", parts.join(" "))
}

/// A cell's paragraphs as one line of inline Markdown joined with `<br>`.
fn cell_inline(cell: &Cell, options: &RenderOptions) -> String {
    let parts: Vec<String> = cell
        .content
        .iter()
        .filter_map(|block| match block {
            Block::Paragraph(para) => Some(render_inline(para, options)),
            Block::Table(_) => None,
        })
        .flat_map(|text| {
            text.split('\n')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();

    // A bare pipe would end the cell.
    escape_pipes(&parts.join("<br>"))
}

/// HTML table with exact spans.
fn html_table(grid: &TableGrid<'_>) -> Vec<String> {
    let mut lines = vec!["<table>".to_string()];

    for r in 0..grid.rows() {
        lines.push("  <tr>".to_string());
        let header_row = grid.is_header_row(r);
        for anchor in grid.anchors().iter().filter(|a| a.row == r) {
            let tag = if header_row || anchor.cell.is_some_and(|c| c.is_header) {
                "th"
            } else {
                "td"
            };
            let mut attrs = String::new();
            if anchor.col_span > 1 {
                attrs.push_str(&format!(" colspan=\"{}\"", anchor.col_span));
            }
            if anchor.row_span > 1 {
                attrs.push_str(&format!(" rowspan=\"{}\"", anchor.row_span));
            }
            let text = anchor.cell.map(cell_html).unwrap_or_default();
            lines.push(format!("    <{}{}>{}</{}>", tag, attrs, text, tag));
        }
        lines.push("  </tr>".to_string());
    }

    lines.push("</table>".to_string());
    lines
}

fn cell_html(cell: &Cell) -> String {
    cell.content
        .iter()
        .filter_map(|block| match block {
            Block::Paragraph(para) => Some(normalize_text(&para.plain_text())),
            Block::Table(_) => None,
        })
        .flat_map(|text| {
            text.split('\n')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(escape_html)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .join("<br>")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
