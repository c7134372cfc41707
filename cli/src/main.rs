//! docxtext CLI - aligned plain text and Markdown from Word document models
//!
//! Renders the JSON document model of a `.docx` file as plain text with
//! boxed tables or as Markdown, one file at a time or a whole directory.

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use docxtext::batch::{convert_batch, find_inputs};
use docxtext::render::{OutputFormat, RenderOptions, TableFallback};
use docxtext::{Block, Document};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Word documents to aligned plain text and Markdown
#[derive(Parser)]
#[command(
    name = "docxtext",
    author = "iyulab",
    version,
    about = "Render Word documents as aligned plain text or Markdown",
    long_about = "docxtext - plain text and Markdown rendering of Word documents.\n\n\
                  Tables are laid out on a monospace grid that stays aligned for CJK text.\n\
                  Input is the JSON document model of a .docx file."
)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (.yaml, .json or .toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document to plain text
    Text {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Convert a document to Markdown
    #[command(visible_alias = "md")]
    Markdown {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rendering of tables with merged cells
        #[arg(long)]
        table_mode: Option<TableMode>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Convert every document in a directory
    Batch {
        /// Input directory
        input: PathBuf,

        /// Output directory (default: next to each input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: FormatArg,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Rendering of tables with merged cells (Markdown only)
        #[arg(long)]
        table_mode: Option<TableMode>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Write a configuration file with the default settings
    InitConfig {
        /// Where to write the file; the extension selects the format
        #[arg(default_value = "docxtext.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show document structure and statistics
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Show version information
    Version,
}

/// Layout settings that override the configuration file.
#[derive(Args)]
struct RenderArgs {
    /// Maximum line width
    #[arg(short, long)]
    width: Option<usize>,

    /// Base column width for top-level tables
    #[arg(long)]
    column_width: Option<usize>,

    /// Deepest nested table that is laid out
    #[arg(long)]
    max_depth: Option<usize>,

    /// Paragraph indentation in plain text output
    #[arg(long, allow_hyphen_values = true)]
    indent: Option<String>,

    /// Count East Asian ambiguous characters as double width
    #[arg(long)]
    ambiguous_wide: bool,
}

impl RenderArgs {
    fn apply(&self, mut options: RenderOptions) -> RenderOptions {
        if let Some(width) = self.width {
            options = options.with_text_width(width);
        }
        if let Some(width) = self.column_width {
            options = options.with_base_column_width(width);
        }
        if let Some(depth) = self.max_depth {
            options = options.with_max_nesting_depth(depth);
        }
        if let Some(indent) = &self.indent {
            options = options.with_indent(indent.as_str());
        }
        if self.ambiguous_wide {
            options = options.with_ambiguous_wide(true);
        }
        options
    }
}

/// Output format
#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Plain text with boxed tables
    Text,
    /// Markdown
    #[value(alias = "md")]
    Markdown,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Markdown => OutputFormat::Markdown,
        }
    }
}

/// Table rendering mode
#[derive(Clone, Copy, ValueEnum)]
enum TableMode {
    /// Pipe tables with span notes
    Markdown,
    /// HTML tables with exact spans
    Html,
    /// The plain text grid in a code block
    Ascii,
}

impl From<TableMode> for TableFallback {
    fn from(mode: TableMode) -> Self {
        match mode {
            TableMode::Markdown => TableFallback::Markdown,
            TableMode::Html => TableFallback::Html,
            TableMode::Ascii => TableFallback::Ascii,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logger(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let base = match &cli.config {
        Some(path) => {
            let options = RenderOptions::from_file(path)?;
            log::info!("using configuration {}", path.display());
            options
        }
        None => RenderOptions::default(),
    };

    match cli.command {
        Commands::Text {
            input,
            output,
            render,
        } => {
            let options = render.apply(base).with_format(OutputFormat::Text);
            convert_single(&input, output.as_deref(), &options, "text")?;
        }

        Commands::Markdown {
            input,
            output,
            table_mode,
            render,
        } => {
            let mut options = render.apply(base).with_format(OutputFormat::Markdown);
            if let Some(mode) = table_mode {
                options = options.with_table_fallback(mode.into());
            }
            convert_single(&input, output.as_deref(), &options, "Markdown")?;
        }

        Commands::Batch {
            input,
            output,
            format,
            recursive,
            table_mode,
            render,
        } => {
            let mut options = render.apply(base).with_format(format.into());
            if let Some(mode) = table_mode {
                options = options.with_table_fallback(mode.into());
            }
            run_batch(&input, output.as_deref(), recursive, &options)?;
        }

        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                return Err(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )
                .into());
            }
            RenderOptions::default().save_to_file(&path)?;
            println!(
                "{} Wrote default configuration: {}",
                "✓".green().bold(),
                path.display()
            );
        }

        Commands::Info { input } => {
            let pb = create_spinner("Reading document...");
            let doc = docxtext::load_document(&input)?;
            pb.finish_and_clear();
            print_info(&input, &doc);
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn convert_single(
    input: &Path,
    output: Option<&Path>,
    options: &RenderOptions,
    label: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_spinner("Reading document...");

    let doc = docxtext::load_document(input)?;
    pb.set_message(format!("Rendering to {}...", label));
    let rendered = docxtext::render::render(&doc, options)?;
    log::debug!("rendered {} blocks to {} bytes", doc.blocks.len(), rendered.len());

    pb.finish_and_clear();
    write_output(output, &rendered)?;

    if let Some(path) = output {
        println!(
            "{} Converted to {}: {}",
            "✓".green().bold(),
            label,
            path.display()
        );
    }
    Ok(())
}

fn run_batch(
    input: &Path,
    output: Option<&Path>,
    recursive: bool,
    options: &RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let inputs = find_inputs(input, recursive)?;
    if inputs.is_empty() {
        println!(
            "{} No documents found in {}",
            "!".yellow().bold(),
            input.display()
        );
        return Ok(());
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    log::info!("converting {} documents from {}", inputs.len(), input.display());

    let report = convert_batch(&inputs, input, output, options, |result| {
        if let Ok(path) = &result.output {
            log::debug!("{} -> {}", result.input.display(), path.display());
        }
        if let Some(name) = result.input.file_name() {
            pb.set_message(name.to_string_lossy().into_owned());
        }
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    for (path, error) in report.failures() {
        eprintln!("{} {}: {}", "✗".red().bold(), path.display(), error);
    }
    println!(
        "{} Converted {} of {} documents",
        if report.failed() == 0 {
            "✓".green().bold()
        } else {
            "!".yellow().bold()
        },
        report.succeeded(),
        report.results.len()
    );

    if report.failed() > 0 {
        return Err(format!("{} documents failed", report.failed()).into());
    }
    Ok(())
}

fn print_info(input: &Path, doc: &Document) {
    let tables: Vec<_> = doc
        .blocks
        .iter()
        .filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
        .collect();
    let headings = doc
        .blocks
        .iter()
        .filter(|b| matches!(b, Block::Paragraph(p) if p.is_heading()))
        .count();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "File".bold(),
        input.file_name().unwrap_or_default().to_string_lossy()
    );
    println!("{}: {}", "Blocks".bold(), doc.blocks.len());
    println!("{}: {}", "Paragraphs".bold(), doc.paragraph_count());
    println!("{}: {}", "Headings".bold(), headings);
    println!("{}: {}", "Tables".bold(), tables.len());
    println!(
        "{}: {}",
        "Table rows".bold(),
        tables.iter().map(|t| t.row_count()).sum::<usize>()
    );
    println!(
        "{}: {}",
        "Tables with merged cells".bold(),
        tables.iter().filter(|t| t.has_merged_cells()).count()
    );
    println!(
        "{}: {}",
        "Deepest table nesting".bold(),
        tables.iter().map(|t| t.nesting_depth()).max().unwrap_or(0)
    );

    let text = doc.plain_text();
    println!("\n{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());
}

fn print_version() {
    println!("{} {}", "docxtext".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Aligned plain text and Markdown from Word documents");
    println!();
    println!("Input: JSON document model of a .docx file");
    println!("Output: plain text, Markdown");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_markdown_alias_and_overrides() {
        let cli = Cli::try_parse_from([
            "docxtext",
            "md",
            "doc.json",
            "--width",
            "60",
            "--table-mode",
            "html",
        ])
        .unwrap();
        match cli.command {
            Commands::Markdown {
                render, table_mode, ..
            } => {
                let options = render.apply(RenderOptions::default());
                assert_eq!(options.text_width, 60);
                assert!(matches!(table_mode, Some(TableMode::Html)));
            }
            _ => panic!("expected markdown command"),
        }
    }

    #[test]
    fn test_text_indent_override() {
        let cli = Cli::try_parse_from(["docxtext", "text", "doc.json", "--indent", "> "]).unwrap();
        match cli.command {
            Commands::Text { render, .. } => {
                let options = render.apply(RenderOptions::default());
                assert_eq!(options.text_indent, "> ");
            }
            _ => panic!("expected text command"),
        }

        let cli = Cli::try_parse_from(["docxtext", "text", "doc.json", "--indent", "-> "]).unwrap();
        match cli.command {
            Commands::Text { render, .. } => {
                assert_eq!(render.indent.as_deref(), Some("-> "));
            }
            _ => panic!("expected text command"),
        }
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["docxtext", "-v", "-q", "version"]).is_err());
    }

    #[test]
    fn test_write_output_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.txt");
        write_output(Some(&path), "hello\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "hello\n");
    }
}
