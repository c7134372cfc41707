//! Rendering options configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::width::Measure;
use crate::error::{Error, Result};

/// Widest accepted `text_width`.
pub const MAX_TEXT_WIDTH: usize = 10_000;

/// Largest accepted `base_column_width`.
pub const MAX_BASE_COLUMN_WIDTH: usize = 1_000;

/// Largest accepted `level_2_multiplier`.
pub const MAX_LEVEL_2_MULTIPLIER: f64 = 100.0;

/// Output flavor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Monospace plain text with boxed tables
    #[default]
    #[serde(alias = "txt")]
    Text,
    /// Markdown with pipe tables
    #[serde(alias = "md")]
    Markdown,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Markdown => "md",
        }
    }
}

/// How to render tables in Markdown output.
///
/// Markdown has no cell spanning; every mode except `Html` loses the span
/// geometry in some way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFallback {
    /// Pipe tables; covered positions are left empty and the anchor cell
    /// carries an `<!-- colspan=N rowspan=M -->` note
    #[default]
    Markdown,
    /// HTML tables with exact `colspan`/`rowspan`, used for tables with merges
    Html,
    /// The plain-text grid inside a fenced code block
    Ascii,
}

/// Options for rendering documents.
///
/// Every field has a default, so configuration files only need to name the
/// keys they change. Renderers only ever read the options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Output flavor used by [`render`](super::render)
    pub output_format: OutputFormat,

    /// Maximum line width for paragraphs and tables
    pub text_width: usize,

    /// Indentation put in front of every line of a plain-text paragraph
    pub text_indent: String,

    /// Character repeated to mark heading levels
    pub heading_prefix: String,

    /// Base width of a table column before fitting to the width budget
    pub base_column_width: usize,

    /// Factor applied to the base column width for nested tables
    pub level_2_multiplier: f64,

    /// Total horizontal padding inside a cell
    pub cell_padding: usize,

    /// Padding on the left side of a cell (part of `cell_padding`)
    pub cell_left_padding: usize,

    /// Deepest table nesting level that will be laid out
    pub max_nesting_depth: usize,

    /// How to render tables in Markdown output
    pub table_fallback: TableFallback,

    /// Count East Asian Ambiguous characters as double width
    pub ambiguous_wide: bool,

    /// Escape special Markdown characters
    pub escape_special_chars: bool,

    /// Merge consecutive blank lines inside cells and paragraphs
    pub merge_consecutive_empty_lines: bool,

    /// Include empty paragraphs in output
    pub include_empty_paragraphs: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Text,
            text_width: 80,
            text_indent: "    ".to_string(),
            heading_prefix: "#".to_string(),
            base_column_width: 15,
            level_2_multiplier: 2.0,
            cell_padding: 2,
            cell_left_padding: 1,
            max_nesting_depth: 32,
            table_fallback: TableFallback::Markdown,
            ambiguous_wide: false,
            escape_special_chars: true,
            merge_consecutive_empty_lines: true,
            include_empty_paragraphs: false,
        }
    }
}

impl RenderOptions {
    /// Create new render options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the line width budget.
    pub fn with_text_width(mut self, width: usize) -> Self {
        self.text_width = width;
        self
    }

    /// Set the paragraph indentation string.
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.text_indent = indent.into();
        self
    }

    /// Set the base column width.
    pub fn with_base_column_width(mut self, width: usize) -> Self {
        self.base_column_width = width;
        self
    }

    /// Set the nested-table column multiplier.
    pub fn with_level_2_multiplier(mut self, multiplier: f64) -> Self {
        self.level_2_multiplier = multiplier;
        self
    }

    /// Set the maximum table nesting depth.
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Set table fallback mode.
    pub fn with_table_fallback(mut self, fallback: TableFallback) -> Self {
        self.table_fallback = fallback;
        self
    }

    /// Count ambiguous-width characters as wide.
    pub fn with_ambiguous_wide(mut self, wide: bool) -> Self {
        self.ambiguous_wide = wide;
        self
    }

    /// The width measure these options select.
    pub fn measure(&self) -> Measure {
        if self.ambiguous_wide {
            Measure::AmbiguousWide
        } else {
            Measure::Standard
        }
    }

    /// Pre-fit column width for a table at the given nesting level.
    ///
    /// Top-level tables use `base_column_width`; nested tables multiply it by
    /// `level_2_multiplier`. Multipliers below one are treated as one so that
    /// deeper tables never get narrower base columns.
    pub fn column_unit(&self, nesting_level: usize) -> usize {
        let base = self.base_column_width.max(1);
        if nesting_level >= 2 {
            let factor = self.level_2_multiplier.max(1.0);
            (base as f64 * factor).round() as usize
        } else {
            base
        }
    }

    /// Check the options for values no layout can honor.
    pub fn validate(&self) -> Result<()> {
        if self.text_width == 0 || self.text_width > MAX_TEXT_WIDTH {
            return Err(Error::Config(format!(
                "text_width must be between 1 and {}",
                MAX_TEXT_WIDTH
            )));
        }
        if self.base_column_width > MAX_BASE_COLUMN_WIDTH {
            return Err(Error::Config(format!(
                "base_column_width must be at most {}",
                MAX_BASE_COLUMN_WIDTH
            )));
        }
        let multiplier = self.level_2_multiplier;
        if !(multiplier > 0.0 && multiplier <= MAX_LEVEL_2_MULTIPLIER) {
            return Err(Error::Config(format!(
                "level_2_multiplier must be a positive number up to {}",
                MAX_LEVEL_2_MULTIPLIER
            )));
        }
        if self.cell_left_padding > self.cell_padding {
            return Err(Error::Config(
                "cell_left_padding cannot exceed cell_padding".to_string(),
            ));
        }
        if self.max_nesting_depth == 0 {
            return Err(Error::Config("max_nesting_depth must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Load options from a `.json`, `.toml` or `.yaml`/`.yml` file.
    ///
    /// Files with any other extension are read as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let options: RenderOptions = match extension(path).as_str() {
            "json" => serde_json::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        options.validate()?;
        log::debug!("loaded render options from {}", path.display());
        Ok(options)
    }

    /// Write options to a file, choosing the format by extension.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = match extension(path).as_str() {
            "json" => serde_json::to_string_pretty(self)?,
            "toml" => toml::to_string_pretty(self)?,
            _ => serde_yaml::to_string(self)?,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase()
}
