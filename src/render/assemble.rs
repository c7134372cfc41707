//! Final output assembly.

use super::walker::RenderedBlock;
use super::width::Measure;
use super::wrap::wrap_with;

/// Reflow paragraph text so that every line, `prefix` included, fits into
/// `width` columns. Each output line starts with `prefix`.
pub fn reflow(text: &str, prefix: &str, width: usize, measure: Measure) -> Vec<String> {
    let available = width.saturating_sub(measure.width(prefix)).max(1);
    wrap_with(text, available, measure)
        .into_iter()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect()
}

/// Join rendered blocks with one blank line between them.
///
/// The result ends with exactly one newline, or is empty when there is
/// nothing to show.
pub fn assemble(blocks: &[RenderedBlock]) -> String {
    let mut output = String::new();

    for block in blocks.iter().filter(|b| !b.lines.is_empty()) {
        if !output.is_empty() {
            output.push('\n');
        }
        for line in &block.lines {
            output.push_str(line);
            output.push('\n');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::walker::BlockKind;

    fn block(lines: &[&str]) -> RenderedBlock {
        RenderedBlock::new(BlockKind::Paragraph, lines.iter().map(|l| l.to_string()).collect())
    }

    #[test]
    fn test_reflow_with_prefix() {
        let lines = reflow("The quick brown fox", "  ", 12, Measure::Standard);
        assert_eq!(lines, vec!["  The quick", "  brown fox"]);
    }

    #[test]
    fn test_reflow_keeps_blank_lines_bare() {
        let lines = reflow("a\n\nb", "    ", 80, Measure::Standard);
        assert_eq!(lines, vec!["    a", "", "    b"]);
    }

    #[test]
    fn test_assemble_joins_with_blank_line() {
        let out = assemble(&[block(&["one"]), block(&["two", "three"])]);
        assert_eq!(out, "one\n\ntwo\nthree\n");
    }

    #[test]
    fn test_assemble_skips_empty_blocks() {
        let out = assemble(&[block(&[]), block(&["only"]), block(&[])]);
        assert_eq!(out, "only\n");
        assert_eq!(assemble(&[]), "");
    }
}
