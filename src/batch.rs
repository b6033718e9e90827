//! Directory-to-directory batch conversion.
//!
//! Finds every `.epub` below an input directory, converts each book on its
//! own, and writes the text (plus an optional `.metadata` sidecar) under the
//! output directory. Books are independent: a failing book is counted and
//! the batch moves on.

use crate::error::{Error, Result};
use crate::model::{Metadata, Outcome};
use crate::options::ConvertOptions;
use crate::render;
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Folder used when a book has no author.
const UNKNOWN_AUTHOR: &str = "Unknown";
/// Folder used when a book has no subject.
const UNCATEGORIZED: &str = "Uncategorized";

/// How converted books are grouped under the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Subset {
    /// All books directly in the output directory.
    #[default]
    Book,
    /// One folder per author.
    Author,
    /// One folder per first category.
    Category,
    /// Category folders with author folders inside.
    CategoryAuthor,
}

impl FromStr for Subset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "book" => Ok(Subset::Book),
            "author" => Ok(Subset::Author),
            "category" => Ok(Subset::Category),
            "categoryauthor" => Ok(Subset::CategoryAuthor),
            other => Err(Error::InvalidData(format!(
                "unknown subset '{other}' (expected book, author, category or categoryauthor)"
            ))),
        }
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Subset::Book => "book",
            Subset::Author => "author",
            Subset::Category => "category",
            Subset::CategoryAuthor => "categoryauthor",
        };
        f.write_str(name)
    }
}

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory searched recursively for `.epub` files.
    pub input_dir: PathBuf,

    /// Root of the written text files.
    pub output_dir: PathBuf,

    /// Per-book conversion settings.
    pub convert: ConvertOptions,

    /// Write a `.metadata` sidecar next to each text file.
    pub write_metadata: bool,

    /// Put each book in its own folder named after the source file.
    pub separate_folders: bool,

    /// Convert at most this many books (0 = all).
    pub stop_early: usize,

    /// Output grouping.
    pub subset: Subset,

    /// Convert books on the rayon thread pool.
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./input"),
            output_dir: PathBuf::from("./output"),
            convert: ConvertOptions::default(),
            write_metadata: false,
            separate_folders: false,
            stop_early: 0,
            subset: Subset::Book,
            parallel: false,
        }
    }
}

impl BatchOptions {
    /// Creates options for the given input and output directories.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Replaces the per-book conversion settings.
    pub fn with_convert(mut self, convert: ConvertOptions) -> Self {
        self.convert = convert;
        self
    }

    /// Enables `.metadata` sidecars.
    pub fn with_metadata_sidecar(mut self) -> Self {
        self.write_metadata = true;
        self
    }

    /// Gives each book its own folder.
    pub fn with_separate_folders(mut self) -> Self {
        self.separate_folders = true;
        self
    }

    /// Limits the number of books converted.
    pub fn with_stop_early(mut self, count: usize) -> Self {
        self.stop_early = count;
        self
    }

    /// Sets the output grouping.
    pub fn with_subset(mut self, subset: Subset) -> Self {
        self.subset = subset;
        self
    }

    /// Enables parallel conversion.
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }
}

/// What happened to one book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookStatus {
    /// Text written to `output`
    Written {
        output: PathBuf,
        chapters: usize,
        original_chars: usize,
        removed_chars: i64,
    },
    /// Cleaned text below the minimum output length
    TooShort { length: usize, removed_chars: i64 },
    /// Skipped because of its rights statement
    Restricted,
    /// Could not be read or written
    Failed(String),
}

/// Per-book result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookReport {
    pub source: PathBuf,
    pub title: Option<String>,
    pub status: BookStatus,
}

/// Counters for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchStats {
    /// Directory entries visited during discovery
    pub files_scanned: usize,
    /// Books selected for conversion
    pub books: usize,
    pub converted: usize,
    pub too_short: usize,
    pub restricted: usize,
    pub failed: usize,
    /// Characters in the marked streams before cleaning
    pub original_chars: u64,
    /// Characters removed by cleaning
    pub removed_chars: i64,
    pub elapsed: Duration,
}

impl BatchStats {
    /// Adds one book's result to the counters.
    pub fn record(&mut self, status: &BookStatus) {
        match status {
            BookStatus::Written {
                original_chars,
                removed_chars,
                ..
            } => {
                self.converted += 1;
                self.original_chars += *original_chars as u64;
                self.removed_chars += removed_chars;
            }
            BookStatus::TooShort {
                length,
                removed_chars,
            } => {
                self.too_short += 1;
                self.original_chars += (*length as i64 + removed_chars).max(0) as u64;
                self.removed_chars += removed_chars;
            }
            BookStatus::Restricted => self.restricted += 1,
            BookStatus::Failed(_) => self.failed += 1,
        }
    }

    /// Percentage of characters removed by cleaning.
    pub fn removed_percent(&self) -> f64 {
        if self.original_chars == 0 {
            return 0.0;
        }
        self.removed_chars as f64 / self.original_chars as f64 * 100.0
    }

    /// Throughput over the whole run.
    pub fn chars_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.original_chars as f64 / secs
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub stats: BatchStats,
    pub books: Vec<BookReport>,
}

/// Recursively finds `.epub` files below `dir`, sorted by path.
///
/// Returns the files and the number of directory entries visited.
pub fn discover_epubs(dir: impl AsRef<Path>) -> Result<(Vec<PathBuf>, usize)> {
    let dir = dir.as_ref();
    // A missing input directory is a usage error, not a bad entry
    std::fs::metadata(dir)?;

    let mut files = Vec::new();
    let mut scanned = 0;

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = ?e.path(), "Skipping unreadable entry: {e}");
                continue;
            }
        };
        scanned += 1;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "epub") {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok((files, scanned))
}

/// Replaces characters that cannot appear in a folder name.
fn folder_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Computes where the text for `source` goes.
pub fn output_path(options: &BatchOptions, source: &Path, metadata: &Metadata) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "book".to_string());

    let author = || folder_name(metadata.author.as_deref().unwrap_or(UNKNOWN_AUTHOR));
    let category = || {
        metadata
            .categories()
            .first()
            .map(|c| folder_name(c))
            .unwrap_or_else(|| UNCATEGORIZED.to_string())
    };

    let mut path = options.output_dir.clone();
    match options.subset {
        Subset::Book => {}
        Subset::Author => path.push(author()),
        Subset::Category => path.push(category()),
        Subset::CategoryAuthor => {
            path.push(category());
            path.push(author());
        }
    }
    if options.separate_folders {
        path.push(&stem);
    }
    path.push(format!("{stem}.txt"));
    path
}

/// Converts one book and writes its output.
pub fn convert_one(source: &Path, options: &BatchOptions) -> BookReport {
    let book = match crate::read_book(source, &options.convert) {
        Ok(book) => book,
        Err(e) => {
            warn!(path = %source.display(), "Failed to read book: {e}");
            return BookReport {
                source: source.to_path_buf(),
                title: None,
                status: BookStatus::Failed(e.to_string()),
            };
        }
    };

    let title = book.metadata.title.clone();
    info!(path = %source.display(), title = title.as_deref().unwrap_or_default(), "Parsing book");

    let status = match crate::convert_book(&book, &options.convert) {
        Outcome::Converted(conversion) => {
            let output = output_path(options, source, &conversion.metadata);
            match write_conversion(&conversion, &output, options) {
                Ok(()) => BookStatus::Written {
                    chapters: conversion.chapter_count(),
                    original_chars: conversion.original_chars,
                    removed_chars: conversion.chars_removed(),
                    output,
                },
                Err(e) => {
                    warn!(path = %output.display(), "Failed to write output: {e}");
                    BookStatus::Failed(e.to_string())
                }
            }
        }
        Outcome::TooShort { length, removed } => BookStatus::TooShort {
            length,
            removed_chars: removed,
        },
        Outcome::Restricted => BookStatus::Restricted,
    };

    BookReport {
        source: source.to_path_buf(),
        title,
        status,
    }
}

fn write_conversion(
    conversion: &crate::model::Conversion,
    output: &Path,
    options: &BatchOptions,
) -> Result<()> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    render::render_to_file(conversion, output, &options.convert.render)?;
    if options.write_metadata {
        render::write_metadata_sidecar(&conversion.metadata, output.with_extension("metadata"))?;
    }
    debug!(path = %output.display(), "Wrote book");
    Ok(())
}

/// Runs a batch conversion.
pub fn run_batch(options: &BatchOptions) -> Result<BatchReport> {
    run_batch_with(options, |_| {})
}

/// Runs a batch conversion, calling `on_book` after each book finishes.
///
/// With `parallel` set, `on_book` is called from rayon worker threads.
pub fn run_batch_with<F>(options: &BatchOptions, on_book: F) -> Result<BatchReport>
where
    F: Fn(&BookReport) + Sync,
{
    let start = Instant::now();
    let (mut files, scanned) = discover_epubs(&options.input_dir)?;
    if options.stop_early != 0 && options.stop_early < files.len() {
        files.truncate(options.stop_early);
    }
    info!(
        input = %options.input_dir.display(),
        books = files.len(),
        parallel = options.parallel,
        "Converting books"
    );

    let convert = |path: &PathBuf| {
        let report = convert_one(path, options);
        on_book(&report);
        report
    };
    let books: Vec<BookReport> = if options.parallel {
        files.par_iter().map(convert).collect()
    } else {
        files.iter().map(convert).collect()
    };

    let mut stats = BatchStats {
        files_scanned: scanned,
        books: files.len(),
        ..Default::default()
    };
    for report in &books {
        stats.record(&report.status);
    }
    stats.elapsed = start.elapsed();

    info!(
        converted = stats.converted,
        too_short = stats.too_short,
        restricted = stats.restricted,
        failed = stats.failed,
        "Batch finished"
    );

    Ok(BatchReport { stats, books })
}
