//! Conversion results: chapters, per-pass statistics and outcomes.

use super::Metadata;
use serde::Serialize;

/// A chapter that survived segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    /// Display number, contiguous from 1 across surviving chapters
    pub ordinal: usize,
    /// Recovered title, possibly empty
    pub title: String,
    /// Normalized body text
    pub body: String,
}

impl Chapter {
    /// Creates a new chapter.
    pub fn new(ordinal: usize, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            ordinal,
            title: title.into(),
            body: body.into(),
        }
    }

    /// Returns the chapter banner line block.
    pub fn banner(&self) -> String {
        format!("\n***\n[ Chapter {}: {} ; ]\n", self.ordinal, self.title)
    }

    /// Returns the banner followed by the body.
    pub fn rendered(&self) -> String {
        let mut out = self.banner();
        out.push_str(&self.body);
        out
    }
}

/// Character counts before and after one pipeline pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PassStat {
    /// Pass name
    pub pass: &'static str,
    /// Length entering the pass, in bytes
    pub chars_before: usize,
    /// Length leaving the pass, in bytes
    pub chars_after: usize,
}

impl PassStat {
    /// Creates a new pass record.
    pub fn new(pass: &'static str, chars_before: usize, chars_after: usize) -> Self {
        Self {
            pass,
            chars_before,
            chars_after,
        }
    }

    /// Characters removed by this pass (negative when the pass added text).
    pub fn removed(&self) -> i64 {
        self.chars_before as i64 - self.chars_after as i64
    }
}

/// A converted document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversion {
    /// Book metadata
    pub metadata: Metadata,
    /// Surviving chapters in order (empty when cleaning is disabled)
    pub chapters: Vec<Chapter>,
    /// Rendered body text, without the metadata banner
    pub text: String,
    /// Length of the marked stream before cleaning
    pub original_chars: usize,
    /// Per-pass statistics in pipeline order
    pub passes: Vec<PassStat>,
}

impl Conversion {
    /// Length of the cleaned body text.
    pub fn cleaned_chars(&self) -> usize {
        self.text.len()
    }

    /// Characters removed overall; equals the sum of per-pass removals.
    pub fn chars_removed(&self) -> i64 {
        self.original_chars as i64 - self.cleaned_chars() as i64
    }

    /// Number of surviving chapters.
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }
}

/// Result of converting one document.
#[derive(Debug, Clone, Serialize)]
pub enum Outcome {
    /// The document was converted and should be written.
    Converted(Box<Conversion>),
    /// The cleaned text fell below the minimum output length.
    TooShort {
        /// Cleaned length in bytes
        length: usize,
        /// Characters removed by cleaning
        removed: i64,
    },
    /// The rights statement marks the book as copyrighted.
    Restricted,
}

impl Outcome {
    /// Returns the conversion if the document was emitted.
    pub fn converted(&self) -> Option<&Conversion> {
        match self {
            Outcome::Converted(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_banner() {
        let chapter = Chapter::new(3, "Loomings", "Call me Ishmael.");
        assert_eq!(chapter.banner(), "\n***\n[ Chapter 3: Loomings ; ]\n");
        assert_eq!(
            chapter.rendered(),
            "\n***\n[ Chapter 3: Loomings ; ]\nCall me Ishmael."
        );
    }

    #[test]
    fn test_chapter_banner_empty_title() {
        let chapter = Chapter::new(1, "", "");
        assert_eq!(chapter.banner(), "\n***\n[ Chapter 1:  ; ]\n");
    }

    #[test]
    fn test_pass_removed_sign() {
        assert_eq!(PassStat::new("normalize", 100, 60).removed(), 40);
        assert_eq!(PassStat::new("segment", 60, 75).removed(), -15);
    }
}
