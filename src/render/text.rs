//! Plain text rendering of paragraphs.

use crate::model::Paragraph;

use super::assemble::reflow;
use super::cleanup::clean_text;
use super::options::RenderOptions;

/// Render a paragraph as plain text lines.
///
/// Headings are prefixed with the heading marker and kept on one line.
/// Body paragraphs are indented by `text_indent` once plus once per indent
/// level and reflowed to `text_width`.
pub fn render_paragraph(para: &Paragraph, options: &RenderOptions) -> Vec<String> {
    let text = clean_text(&para.plain_text(), options.merge_consecutive_empty_lines);

    if para.is_heading() {
        let title = text.split('\n').filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ");
        return vec![format!(
            "{} {}",
            options.heading_prefix.repeat(para.heading.level() as usize),
            title
        )];
    }

    let prefix = options.text_indent.repeat(1 + para.indent_level as usize);
    reflow(&text, &prefix, options.text_width, options.measure())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, TextRun};
    use crate::render::width::display_width;

    #[test]
    fn test_paragraph_indented() {
        let para = Paragraph::with_text("Hello");
        assert_eq!(render_paragraph(&para, &RenderOptions::default()), vec!["    Hello"]);
    }

    #[test]
    fn test_indent_level() {
        let para = Paragraph::with_text("Nested").indented(2);
        let options = RenderOptions::default().with_indent("  ");
        assert_eq!(render_paragraph(&para, &options), vec!["      Nested"]);
    }

    #[test]
    fn test_heading_not_indented() {
        let para = Paragraph::heading(HeadingLevel::H2, "Section");
        assert_eq!(render_paragraph(&para, &RenderOptions::default()), vec!["## Section"]);
    }

    #[test]
    fn test_heading_not_wrapped() {
        let title = "a heading that is much longer than the configured width";
        let para = Paragraph::heading(HeadingLevel::H1, title);
        let options = RenderOptions::default().with_text_width(20);
        assert_eq!(render_paragraph(&para, &options), vec![format!("# {}", title)]);
    }

    #[test]
    fn test_reflow_to_width() {
        let para = Paragraph::with_text(
            "中文段落会按照显示宽度换行，而不是按照字符数量换行。Mixed English words stay whole.",
        );
        let options = RenderOptions::default().with_text_width(30);
        let lines = render_paragraph(&para, &options);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.starts_with("    "));
            assert!(display_width(line) <= 30, "{:?}", line);
        }
    }

    #[test]
    fn test_line_breaks_kept() {
        let mut para = Paragraph::new();
        let mut run = TextRun::plain("first");
        run.line_break = true;
        para.add_run(run);
        para.add_run(TextRun::plain("second"));
        assert_eq!(
            render_paragraph(&para, &RenderOptions::default()),
            vec!["    first", "    second"]
        );
    }
}
