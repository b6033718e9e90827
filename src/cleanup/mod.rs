//! # Cleanup Pipeline
//!
//! Turns a rendered marked stream into chapter-segmented plain text.
//!
//! ## Pipeline Passes
//!
//! 1. **normalize** - whitespace, quotes and control characters
//! 2. **split** - one line per source line, blank lines dropped
//! 3. **boilerplate** - front/back matter and page artifacts (optional)
//! 4. **reflow** - one line per paragraph
//! 5. **segment** - chapter split, numbered-listing removal, titles
//!
//! Every pass records a [`PassStat`]; the deltas add up to the difference
//! between the input and the final text.

pub mod boilerplate;
pub mod line;
pub mod normalize;
pub mod segment;

pub use line::{Line, Mark};
pub use segment::{OrdinalFold, Segmentation, Verdict};

use crate::markup::sentinel;
use crate::model::{Chapter, PassStat};
use line::joined_len;
use tracing::debug;

/// Cleanup configuration options
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupOptions {
    /// Run normalization and the heuristics; when false the sentinels only
    /// become line breaks
    pub clean_output: bool,
    /// Strip front/back matter of public-domain dumps
    pub gutenberg_cleaning: bool,
    /// Segments this close to either end skip the listing and length tests
    pub trusted_segments: usize,
    /// More integer words than this marks a numbered listing
    pub numeric_word_limit: usize,
    /// Segments at least this long are never numbered listings
    pub listing_max_len: usize,
    /// Middle segments shorter than this (in characters) are dropped
    pub min_segment_len: usize,
    /// A chapter break is synthesized if none occurs in this many lines
    pub lead_break_window: usize,
    /// Footnotes only count past this fraction of the document
    pub footnotes_fraction: f64,
    /// The end-of-text banner only counts past this fraction of the document
    pub end_banner_fraction: f64,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            clean_output: true,
            gutenberg_cleaning: false,
            trusted_segments: 20,
            numeric_word_limit: 15,
            listing_max_len: 10_000,
            min_segment_len: 10,
            lead_break_window: 10,
            footnotes_fraction: 0.8,
            end_banner_fraction: 0.3,
        }
    }
}

impl CleanupOptions {
    /// Creates options that only replace sentinels with line breaks.
    pub fn minimal() -> Self {
        Self {
            clean_output: false,
            gutenberg_cleaning: false,
            ..Default::default()
        }
    }

    /// Creates options for public-domain dumps (boilerplate removal on).
    pub fn gutenberg() -> Self {
        Self {
            gutenberg_cleaning: true,
            ..Default::default()
        }
    }

    /// Enables or disables normalization and heuristics.
    pub fn with_clean_output(mut self, enabled: bool) -> Self {
        self.clean_output = enabled;
        self
    }

    /// Enables or disables boilerplate removal.
    pub fn with_gutenberg_cleaning(mut self, enabled: bool) -> Self {
        self.gutenberg_cleaning = enabled;
        self
    }

    /// Sets the trusted zone size at both ends of the document.
    pub fn with_trusted_segments(mut self, count: usize) -> Self {
        self.trusted_segments = count;
        self
    }

    /// Sets the integer-word limit for numbered listings.
    pub fn with_numeric_word_limit(mut self, limit: usize) -> Self {
        self.numeric_word_limit = limit;
        self
    }

    /// Sets the end-of-text banner gate.
    pub fn with_end_banner_fraction(mut self, fraction: f64) -> Self {
        self.end_banner_fraction = fraction;
        self
    }
}

/// Output of the cleanup pipeline.
#[derive(Debug, Clone, Default)]
pub struct Cleaned {
    /// Final text (chapters with banners, or the plain text when cleaning is off)
    pub text: String,
    pub chapters: Vec<Chapter>,
    pub passes: Vec<PassStat>,
}

impl Cleaned {
    /// Characters removed across all passes.
    pub fn chars_removed(&self) -> i64 {
        self.passes.iter().map(PassStat::removed).sum()
    }
}

/// Runs the cleanup pipeline over a rendered marked stream.
///
/// # Example
///
/// ```
/// use unepub::cleanup::{cleanup, CleanupOptions};
/// use unepub::markup::sentinel::{CHAPTER, PARAGRAPH};
///
/// let stream = format!("{CHAPTER}{PARAGRAPH}Call me Ishmael.\n");
/// let cleaned = cleanup(&stream, &CleanupOptions::default());
/// assert_eq!(cleaned.chapters.len(), 1);
/// ```
pub fn cleanup(input: &str, options: &CleanupOptions) -> Cleaned {
    let mut passes = Vec::new();

    if !options.clean_output {
        let text = sentinel::to_line_breaks(input);
        passes.push(PassStat::new("sentinels", input.len(), text.len()));
        return Cleaned {
            text,
            chapters: Vec::new(),
            passes,
        };
    }

    let normalized = normalize::basic_normalize(input);
    passes.push(PassStat::new("normalize", input.len(), normalized.len()));

    let mut lines = normalize::split_lines(&normalized);
    let mut current = joined_len(&lines, 1);
    passes.push(PassStat::new("split", normalized.len(), current));

    if options.gutenberg_cleaning {
        lines = boilerplate::strip_boilerplate(&lines, options);
        let after = joined_len(&lines, 1);
        passes.push(PassStat::new("boilerplate", current, after));
        current = after;
    }

    lines = normalize::reflow(&lines);
    let after = joined_len(&lines, 1);
    passes.push(PassStat::new("reflow", current, after));
    current = after;

    let segmentation = segment::segment_chapters(&lines, options);
    let text: String = segmentation.chapters.iter().map(Chapter::rendered).collect();
    passes.push(PassStat::new("segment", current, text.len()));

    for pass in &passes {
        debug!(
            pass = pass.pass,
            before = pass.chars_before,
            after = pass.chars_after,
            "Cleanup pass"
        );
    }

    Cleaned {
        text,
        chapters: segmentation.chapters,
        passes,
    }
}

/// Run cleanup with default options
pub fn cleanup_default(input: &str) -> Cleaned {
    cleanup(input, &CleanupOptions::default())
}
