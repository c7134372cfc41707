//! Text normalization applied before measurement.
//!
//! Everything that reaches the width measurer passes through here first, so
//! invisible characters cannot skew column alignment.

use unicode_normalization::UnicodeNormalization;

/// Normalize raw run text for layout.
///
/// NFC-composes the text, turns line-ending variants into `\n`, tabs and
/// exotic spaces into plain spaces, and drops zero-width and other control
/// characters.
pub fn normalize_text(text: &str) -> String {
    let normalized: String = text.nfc().collect();

    normalized
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', " ")
        // Various spaces (non-breaking, en, em, thin, hair, narrow no-break, ideographic stays)
        .replace(
            [
                '\u{00A0}', '\u{2002}', '\u{2003}', '\u{2009}', '\u{200A}', '\u{202F}',
            ],
            " ",
        )
        // Zero-width characters (zero-width space, non-joiner, joiner, BOM)
        .replace(['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'], "")
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect()
}

/// Clean cell or paragraph text: normalize, trim every line and merge runs of
/// blank lines into a single blank line.
pub fn clean_text(text: &str, merge_blank_lines: bool) -> String {
    let normalized = normalize_text(text);
    let mut result: Vec<&str> = Vec::new();
    let mut prev_empty = false;

    for line in normalized.split('\n').map(str::trim) {
        let is_empty = line.is_empty();
        if !(is_empty && prev_empty && merge_blank_lines) {
            result.push(line);
        }
        prev_empty = is_empty;
    }

    // Leading and trailing blank lines carry no content.
    while result.first().is_some_and(|l| l.is_empty()) {
        result.remove(0);
    }
    while result.last().is_some_and(|l| l.is_empty()) {
        result.pop();
    }

    result.join("\n")
}
