//! Display width measurement for monospace output.
//!
//! Wide characters (East Asian Wide and Fullwidth: CJK ideographs, kana,
//! hangul, fullwidth forms and punctuation) occupy two columns, control
//! characters none, everything else one. The same string always measures
//! the same, whatever context it is measured in.

use unicode_width::UnicodeWidthChar;

/// How East Asian Ambiguous characters (`○`, `§`, Greek, Cyrillic, ...) are
/// counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Measure {
    /// Ambiguous characters are narrow (Western terminals)
    #[default]
    Standard,
    /// Ambiguous characters are wide (CJK terminals and fonts)
    AmbiguousWide,
}

impl Measure {
    /// Display width of a single character.
    pub fn char_width(self, c: char) -> usize {
        if c.is_control() {
            return 0;
        }
        let width = match self {
            Measure::Standard => c.width(),
            Measure::AmbiguousWide => c.width_cjk(),
        };
        // Anything the width table cannot place is counted as one column.
        match width {
            Some(2) => 2,
            _ => 1,
        }
    }

    /// Display width of a string.
    pub fn width(self, s: &str) -> usize {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Whether a character takes two columns.
    pub fn is_wide(self, c: char) -> bool {
        self.char_width(c) == 2
    }
}

/// Display width of a string with the standard measure.
pub fn display_width(s: &str) -> usize {
    Measure::Standard.width(s)
}

/// Pad `s` with spaces on the right up to `width` columns.
pub fn pad_right(s: &str, width: usize, measure: Measure) -> String {
    let used = measure.width(s);
    let mut out = String::with_capacity(s.len() + width.saturating_sub(used));
    out.push_str(s);
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    out
}
