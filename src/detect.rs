//! Input detection.

use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// UTF-8 byte order mark.
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// What an input file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// JSON document model
    DocumentModel,
    /// ZIP-based Office file (a raw `.docx`)
    OfficeArchive,
    /// Anything else
    Unknown,
}

impl InputKind {
    /// Returns a human-readable name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            InputKind::DocumentModel => "JSON document model",
            InputKind::OfficeArchive => "Office Open XML archive",
            InputKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the input kind from the leading bytes of a file.
pub fn detect_from_bytes(data: &[u8]) -> InputKind {
    if data.starts_with(&ZIP_MAGIC) {
        return InputKind::OfficeArchive;
    }

    let data = data.strip_prefix(&UTF8_BOM).unwrap_or(data);
    match data.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => InputKind::DocumentModel,
        _ => InputKind::Unknown,
    }
}

/// Whether a path names a lock file Word leaves next to an open document
/// (`~$report.docx`).
pub fn is_office_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("~$"))
}

/// Whether a path looks like a convertible input by its extension.
pub fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_json() {
        assert_eq!(detect_from_bytes(b"{\"blocks\": []}"), InputKind::DocumentModel);
        assert_eq!(detect_from_bytes(b"\n  {}"), InputKind::DocumentModel);
        assert_eq!(detect_from_bytes(b"\xEF\xBB\xBF{}"), InputKind::DocumentModel);
    }

    #[test]
    fn test_detect_zip() {
        assert_eq!(
            detect_from_bytes(&[0x50, 0x4B, 0x03, 0x04, 0x00]),
            InputKind::OfficeArchive
        );
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(detect_from_bytes(b""), InputKind::Unknown);
        assert_eq!(detect_from_bytes(b"plain text"), InputKind::Unknown);
    }

    #[test]
    fn test_temp_file() {
        assert!(is_office_temp_file(Path::new("dir/~$report.json")));
        assert!(!is_office_temp_file(Path::new("dir/report.json")));
    }

    #[test]
    fn test_input_extension() {
        assert!(has_input_extension(Path::new("a.json")));
        assert!(has_input_extension(Path::new("a.JSON")));
        assert!(!has_input_extension(Path::new("a.docx")));
        assert!(!has_input_extension(Path::new("json")));
    }
}
