//! Greedy width-aware line wrapping.
//!
//! Used for table cells and for paragraph reflow alike, so CJK text breaks
//! the same way everywhere. Words made of narrow characters are kept whole
//! whenever they fit on a line; every wide character is a break opportunity
//! of its own and is never split.

use super::width::Measure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Space,
    Word,
    Wide,
}

/// Wrap `text` so that every line is at most `width` columns wide.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    wrap_with(text, width, Measure::Standard)
}

/// Wrap `text` using the given measure.
///
/// Hard line breaks are preserved. Lines are right-trimmed and continuation
/// lines do not start with the space they were broken at. The result always
/// has at least one (possibly empty) line. A width below one is treated as
/// one; a wide character that cannot fit even on an empty line is emitted on
/// a line of its own.
pub fn wrap_with(text: &str, width: usize, measure: Measure) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for line in text.split('\n') {
        wrap_line(line, width, measure, &mut lines);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn wrap_line(line: &str, width: usize, measure: Measure, out: &mut Vec<String>) {
    let line = line.trim_end();
    if measure.width(line) <= width {
        out.push(line.to_string());
        return;
    }

    let mut current = String::new();
    let mut used = 0;
    let emitted_before = out.len();

    for (kind, token) in tokenize(line, measure) {
        let token_width = measure.width(token);

        if used + token_width <= width {
            // A continuation line never starts with the space it broke at.
            if kind == TokenKind::Space && current.is_empty() && out.len() > emitted_before {
                continue;
            }
            current.push_str(token);
            used += token_width;
            continue;
        }

        flush(&mut current, &mut used, out);
        match kind {
            TokenKind::Space => {}
            TokenKind::Wide => {
                current.push_str(token);
                used = token_width;
            }
            TokenKind::Word if token_width <= width => {
                current.push_str(token);
                used = token_width;
            }
            TokenKind::Word => {
                for c in token.chars() {
                    let char_width = measure.char_width(c);
                    if used + char_width > width && !current.is_empty() {
                        flush(&mut current, &mut used, out);
                    }
                    current.push(c);
                    used += char_width;
                }
            }
        }
    }

    flush(&mut current, &mut used, out);
}

fn flush(current: &mut String, used: &mut usize, out: &mut Vec<String>) {
    if !current.trim().is_empty() {
        out.push(current.trim_end().to_string());
    }
    current.clear();
    *used = 0;
}

fn tokenize(line: &str, measure: Measure) -> Vec<(TokenKind, &str)> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;

    for (i, c) in line.char_indices() {
        let kind = if c.is_whitespace() {
            TokenKind::Space
        } else if measure.is_wide(c) {
            TokenKind::Wide
        } else {
            TokenKind::Word
        };

        if kind == TokenKind::Word {
            word_start.get_or_insert(i);
            continue;
        }
        if let Some(start) = word_start.take() {
            tokens.push((TokenKind::Word, &line[start..i]));
        }
        tokens.push((kind, &line[i..i + c.len_utf8()]));
    }
    if let Some(start) = word_start {
        tokens.push((TokenKind::Word, &line[start..]));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::width::display_width;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(wrap("hello", 10), vec!["hello"]);
    }

    #[test]
    fn test_empty_input_gives_one_line() {
        assert_eq!(wrap("", 10), vec![""]);
        assert_eq!(wrap("   ", 2), vec![""]);
    }

    #[test]
    fn test_word_boundaries() {
        let lines = wrap("The quick brown fox", 10);
        assert_eq!(lines, vec!["The quick", "brown fox"]);
        assert!(lines.iter().all(|l| display_width(l) <= 10));
    }

    #[test]
    fn test_long_word_is_split() {
        let lines = wrap("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_cjk_never_split() {
        let lines = wrap("中文测试内容", 5);
        assert_eq!(lines, vec!["中文", "测试", "内容"]);
        assert!(lines.iter().all(|l| display_width(l) <= 5));
    }

    #[test]
    fn test_mixed_script() {
        let lines = wrap("Rust语言很好 fast", 8);
        assert!(lines.iter().all(|l| display_width(l) <= 8), "{:?}", lines);
        assert_eq!(lines.concat().replace(' ', ""), "Rust语言很好fast");
    }

    #[test]
    fn test_hard_breaks_preserved() {
        assert_eq!(wrap("one\ntwo", 10), vec!["one", "two"]);
        assert_eq!(wrap("one\n\ntwo", 10), vec!["one", "", "two"]);
    }

    #[test]
    fn test_leading_indent_kept_when_fits() {
        assert_eq!(wrap("  indented", 20), vec!["  indented"]);
    }

    #[test]
    fn test_idempotent() {
        let text = "Lorem ipsum dolor sit amet, 中文混合排版 consectetur adipiscing elit";
        for width in [4, 7, 12, 20] {
            let once = wrap(text, width);
            let twice = wrap(&once.join("\n"), width);
            assert_eq!(once, twice, "width {}", width);
        }
    }

    #[test]
    fn test_all_lines_fit() {
        let text = "supercalifragilistic 表格布局 engine wraps every 行 correctly";
        for width in 2..30 {
            for line in wrap(text, width) {
                assert!(display_width(&line) <= width, "{:?} at {}", line, width);
            }
        }
    }

    #[test]
    fn test_wide_char_in_narrow_slot() {
        assert_eq!(wrap("中", 1), vec!["中"]);
    }
}
