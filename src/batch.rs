//! Directory conversion.
//!
//! Documents are independent, so a batch is converted on the rayon thread
//! pool with one task per file. Failures are collected per file and never
//! stop the batch.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::detect::{has_input_extension, is_office_temp_file};
use crate::error::Result;
use crate::render::RenderOptions;

/// Outcome of converting one file.
#[derive(Debug)]
pub struct FileResult {
    /// Input document
    pub input: PathBuf,
    /// Written output file, or the error that prevented it
    pub output: std::result::Result<PathBuf, String>,
}

impl FileResult {
    /// Whether the file was converted.
    pub fn is_ok(&self) -> bool {
        self.output.is_ok()
    }
}

/// Results of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<FileResult>,
}

impl BatchReport {
    /// Number of converted files.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    /// Number of failed files.
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// Failed files with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.results.iter().filter_map(|r| match &r.output {
            Ok(_) => None,
            Err(e) => Some((r.input.as_path(), e.as_str())),
        })
    }
}

/// Collect convertible documents under `dir`, sorted by path.
///
/// Word lock files (`~$name`) are skipped.
pub fn find_inputs(dir: impl AsRef<Path>, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    collect_inputs(dir.as_ref(), recursive, &mut found)?;
    found.sort();
    log::debug!("found {} input files in {}", found.len(), dir.as_ref().display());
    Ok(found)
}

fn collect_inputs(dir: &Path, recursive: bool, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect_inputs(&path, recursive, found)?;
            }
        } else if has_input_extension(&path) && !is_office_temp_file(&path) {
            found.push(path);
        }
    }
    Ok(())
}

/// Where the output for `input` goes: `<stem>.txt` or `<stem>.md`, next to
/// the input, or inside `output_dir` at the input's path relative to `root`.
pub fn output_path(
    input: &Path,
    root: &Path,
    output_dir: Option<&Path>,
    options: &RenderOptions,
) -> PathBuf {
    let extension = options.output_format.extension();
    match output_dir {
        Some(dir) => {
            let relative = input
                .strip_prefix(root)
                .ok()
                .filter(|p| p.file_name().is_some())
                .or_else(|| input.file_name().map(Path::new))
                .unwrap_or(input);
            dir.join(relative).with_extension(extension)
        }
        None => input.with_extension(extension),
    }
}

/// Convert every input found under `root` in parallel and write the results.
///
/// Inputs that would write the same output file all fail instead of
/// overwriting each other. `on_done` is called once per file as soon as it
/// finishes, from whichever worker thread converted it.
pub fn convert_batch<F>(
    inputs: &[PathBuf],
    root: &Path,
    output_dir: Option<&Path>,
    options: &RenderOptions,
    on_done: F,
) -> Result<BatchReport>
where
    F: Fn(&FileResult) + Sync,
{
    options.validate()?;
    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)?;
    }

    let targets: Vec<PathBuf> = inputs
        .iter()
        .map(|input| output_path(input, root, output_dir, options))
        .collect();
    let mut claims: HashMap<&Path, usize> = HashMap::new();
    for target in &targets {
        *claims.entry(target.as_path()).or_default() += 1;
    }

    let failed = AtomicUsize::new(0);
    let results: Vec<FileResult> = inputs
        .par_iter()
        .zip(&targets)
        .map(|(input, target)| {
            let output = if claims[target.as_path()] > 1 {
                Err(format!(
                    "output {} is shared with another input",
                    target.display()
                ))
            } else {
                convert_one(input, target, options).map_err(|e| e.to_string())
            };
            if let Err(e) = &output {
                failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("{}: {}", input.display(), e);
            }
            let result = FileResult {
                input: input.clone(),
                output,
            };
            on_done(&result);
            result
        })
        .collect();

    log::info!(
        "batch finished: {} converted, {} failed",
        results.len() - failed.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed)
    );
    Ok(BatchReport { results })
}

fn convert_one(input: &Path, output: &Path, options: &RenderOptions) -> Result<PathBuf> {
    let text = crate::convert_file(input, options)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, text)?;
    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, Paragraph};
    use crate::render::OutputFormat;

    fn write_doc(path: &Path, text: &str) {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text(text));
        fs::write(path, doc.to_json().unwrap()).unwrap();
    }

    #[test]
    fn test_find_inputs_skips_temp_and_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(&dir.path().join("b.json"), "b");
        write_doc(&dir.path().join("a.json"), "a");
        write_doc(&dir.path().join("~$a.json"), "lock");
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        write_doc(&dir.path().join("sub").join("c.json"), "c");

        let flat = find_inputs(dir.path(), false).unwrap();
        let names: Vec<String> = flat
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);

        let deep = find_inputs(dir.path(), true).unwrap();
        assert_eq!(deep.len(), 3);
    }

    #[test]
    fn test_output_path() {
        let options = RenderOptions::default().with_format(OutputFormat::Markdown);
        let root = Path::new("in");
        assert_eq!(
            output_path(Path::new("in/report.json"), root, None, &options),
            PathBuf::from("in/report.md")
        );
        assert_eq!(
            output_path(
                Path::new("in/2024/report.json"),
                root,
                Some(Path::new("out")),
                &RenderOptions::default()
            ),
            PathBuf::from("out/2024/report.txt")
        );
        assert_eq!(
            output_path(
                Path::new("elsewhere/report.json"),
                root,
                Some(Path::new("out")),
                &RenderOptions::default()
            ),
            PathBuf::from("out/report.txt")
        );
    }

    #[test]
    fn test_convert_batch_collects_failures() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(&dir.path().join("good.json"), "fine");
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        let out = dir.path().join("out");

        let inputs = find_inputs(dir.path(), false).unwrap();
        let done = AtomicUsize::new(0);
        let options = RenderOptions::default();
        let report = convert_batch(&inputs, dir.path(), Some(&out), &options, |_| {
            done.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        assert_eq!(done.load(Ordering::Relaxed), 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures().next().unwrap().0, dir.path().join("bad.json"));
        assert_eq!(fs::read_to_string(out.join("good.txt")).unwrap(), "    fine\n");
    }

    #[test]
    fn test_recursive_batch_keeps_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "b"] {
            fs::create_dir(dir.path().join(sub)).unwrap();
            write_doc(&dir.path().join(sub).join("x.json"), sub);
        }
        let out = dir.path().join("out");

        let inputs = find_inputs(dir.path(), true).unwrap();
        let options = RenderOptions::default();
        let report = convert_batch(&inputs, dir.path(), Some(&out), &options, |_| {}).unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(fs::read_to_string(out.join("a").join("x.txt")).unwrap(), "    a\n");
        assert_eq!(fs::read_to_string(out.join("b").join("x.txt")).unwrap(), "    b\n");
    }

    #[test]
    fn test_shared_output_fails_both_inputs() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "b"] {
            fs::create_dir(dir.path().join(sub)).unwrap();
            write_doc(&dir.path().join(sub).join("x.json"), sub);
        }
        let out = dir.path().join("out");

        // Relative to a root that contains neither input, both flatten to x.txt.
        let inputs = find_inputs(dir.path(), true).unwrap();
        let elsewhere = dir.path().join("elsewhere");
        let options = RenderOptions::default();
        let report = convert_batch(&inputs, &elsewhere, Some(&out), &options, |_| {}).unwrap();

        assert_eq!(report.succeeded(), 0);
        assert_eq!(report.failed(), 2);
        assert!(!out.join("x.txt").exists());
    }
}
