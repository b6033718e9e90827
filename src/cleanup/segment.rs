//! Chapter segmentation, numbered-listing removal and title recovery.

use super::line::{join_lines, Line};
use super::CleanupOptions;
use crate::markup::sentinel;
use crate::model::Chapter;
use tracing::debug;

/// Why a segment was kept or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Emitted as a chapter
    Keep,
    /// Nothing left once header breaks and whitespace are removed
    Blank,
    /// Table of contents or other numbered listing
    NumericListing,
    /// Below the minimum segment length
    TooShort,
}

/// Running ordinal state: every segment advances `raw`, every dropped
/// segment advances `dropped`, and a kept segment gets `raw - dropped`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrdinalFold {
    pub raw: usize,
    pub dropped: usize,
}

impl OrdinalFold {
    /// Advances the fold by one segment and returns the ordinal for a kept one.
    pub fn step(self, kept: bool) -> (Self, Option<usize>) {
        let raw = self.raw + 1;
        if kept {
            (
                Self {
                    raw,
                    dropped: self.dropped,
                },
                Some(raw - self.dropped),
            )
        } else {
            (
                Self {
                    raw,
                    dropped: self.dropped + 1,
                },
                None,
            )
        }
    }
}

/// Result of segmenting one document.
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    pub chapters: Vec<Chapter>,
    /// Raw segment count after splitting
    pub segments: usize,
    /// True if a leading chapter break had to be inserted
    pub synthetic_lead: bool,
    pub numeric_listings: usize,
    pub too_short: usize,
    pub blank: usize,
    /// Trailing blank segments removed before classification
    pub trailing_stripped: usize,
}

/// Returns true if no chapter break occurs in the first `window` lines.
pub fn needs_lead_break(lines: &[Line], window: usize) -> bool {
    !lines
        .iter()
        .take(window)
        .any(|line| line.text.contains(sentinel::CHAPTER))
}

/// Counts whitespace-separated words that parse as integers once periods,
/// commas and hyphens are removed.
pub fn count_integer_words(segment: &str) -> usize {
    let stripped: String = segment
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | '-'))
        .collect();
    stripped
        .split_whitespace()
        .filter(|word| word.parse::<i64>().is_ok())
        .count()
}

/// A segment dense with integers and not too long is a numbered listing.
pub fn is_numeric_listing(segment: &str, options: &CleanupOptions) -> bool {
    count_integer_words(segment) > options.numeric_word_limit
        && segment.len() < options.listing_max_len
}

/// Recovers a chapter title from a segment with more than two header breaks.
///
/// The first header fragment's first line is used, falling back to the
/// second fragment when the first is empty.
pub fn recover_title(segment: &str) -> String {
    if segment.matches(sentinel::HEADER).count() <= 2 {
        return String::new();
    }
    segment
        .split(sentinel::HEADER)
        .skip(1)
        .take(2)
        .map(|fragment| fragment.split('\n').next().unwrap_or("").trim())
        .find(|title| !title.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Turns header breaks into line breaks, trims lines and drops empty ones.
pub fn chapter_body(segment: &str) -> String {
    segment
        .replace(sentinel::HEADER, "\n")
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_blank(segment: &str) -> bool {
    segment.replace(sentinel::HEADER, "").trim().is_empty()
}

/// Classifies one segment at `position` out of `total`.
pub fn judge(segment: &str, position: usize, total: usize, options: &CleanupOptions) -> Verdict {
    let zone = options.trusted_segments;
    let trusted = position < zone || position + zone >= total;

    if is_blank(segment) {
        Verdict::Blank
    } else if trusted {
        Verdict::Keep
    } else if is_numeric_listing(segment, options) {
        Verdict::NumericListing
    } else if segment.chars().count() < options.min_segment_len {
        Verdict::TooShort
    } else {
        Verdict::Keep
    }
}

/// Splits reflowed lines into chapters.
pub fn segment_chapters(lines: &[Line], options: &CleanupOptions) -> Segmentation {
    let synthetic_lead = needs_lead_break(lines, options.lead_break_window);
    let mut text = join_lines(lines, "\n");
    if synthetic_lead {
        text.insert_str(0, &format!("{}\n", sentinel::CHAPTER));
    }

    let mut segments: Vec<&str> = text.split(sentinel::CHAPTER).collect();
    let total = segments.len();
    let trailing_stripped = segments
        .iter()
        .rev()
        .take(2)
        .take_while(|s| is_blank(s))
        .count();
    segments.truncate(total - trailing_stripped);

    let mut result = Segmentation {
        segments: total,
        synthetic_lead,
        trailing_stripped,
        ..Default::default()
    };

    let mut fold = OrdinalFold::default();
    for (position, segment) in segments.iter().enumerate() {
        let verdict = judge(segment, position, total, options);
        let (next, ordinal) = fold.step(verdict == Verdict::Keep);
        fold = next;

        match (verdict, ordinal) {
            (Verdict::Keep, Some(ordinal)) => {
                result
                    .chapters
                    .push(Chapter::new(ordinal, recover_title(segment), chapter_body(segment)));
            }
            (Verdict::NumericListing, _) => {
                debug!(position, "Dropped numbered listing segment");
                result.numeric_listings += 1;
            }
            (Verdict::TooShort, _) => result.too_short += 1,
            _ => result.blank += 1,
        }
    }

    debug!(
        segments = total,
        chapters = result.chapters.len(),
        synthetic_lead,
        "Segmented chapters"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter_lines(bodies: &[String]) -> Vec<Line> {
        bodies
            .iter()
            .enumerate()
            .map(|(i, body)| Line::new(i, format!("{}{}", sentinel::CHAPTER, body)))
            .collect()
    }

    fn prose(i: usize) -> String {
        format!("It was the opening of part {} and the night was long.", "x".repeat(i % 5 + 1))
    }

    fn integers(count: usize, total_words: usize) -> String {
        let mut words: Vec<String> = (1..=count).map(|n| n.to_string()).collect();
        words.extend((count..total_words).map(|_| "chapter".to_string()));
        words.join(" ")
    }

    fn ordinals(seg: &Segmentation) -> Vec<usize> {
        seg.chapters.iter().map(|c| c.ordinal).collect()
    }

    #[test]
    fn test_count_integer_words_strips_punctuation() {
        assert_eq!(count_integer_words("1. Loomings 2, The-Carpet 3- 4x"), 3);
        assert_eq!(count_integer_words("no numbers here"), 0);
    }

    #[test]
    fn test_numeric_density_threshold() {
        // 44 chapter lines plus the empty leading segment: 45 segments,
        // positions 20..=24 are outside both trusted zones.
        let mut bodies: Vec<String> = (0..44).map(prose).collect();
        let mut dense = integers(16, 20);
        dense.push_str(&" ".repeat(500 - dense.len()));
        let mut sparse = integers(10, 20);
        sparse.push_str(&" ".repeat(500 - sparse.len()));
        bodies[21] = dense;
        bodies[22] = sparse.clone();

        let seg = segment_chapters(&chapter_lines(&bodies), &CleanupOptions::default());

        assert_eq!(seg.segments, 45);
        assert_eq!(seg.numeric_listings, 1);
        assert_eq!(seg.chapters.len(), 43);
        assert!(seg.chapters.iter().any(|c| c.body == sparse.trim()));
    }

    #[test]
    fn test_ordinals_are_contiguous() {
        let mut bodies: Vec<String> = (0..60).map(prose).collect();
        bodies[25] = integers(30, 30);
        bodies[30] = "tiny".into();
        bodies[35] = format!("{} {}", sentinel::HEADER, sentinel::HEADER);

        let seg = segment_chapters(&chapter_lines(&bodies), &CleanupOptions::default());

        assert_eq!(seg.numeric_listings, 1);
        assert_eq!(seg.too_short, 1);
        let expected: Vec<usize> = (1..=seg.chapters.len()).collect();
        assert_eq!(ordinals(&seg), expected);
        assert_eq!(seg.chapters.len(), 57);
    }

    #[test]
    fn test_trusted_zone_exemption() {
        // The first segment has no chapter break in front of it and is dense
        // with integers, but sits in the trusted head zone.
        let mut lines = vec![Line::new(0, integers(18, 18))];
        for i in 1..45 {
            lines.push(Line::new(i, format!("{}{}", sentinel::CHAPTER, prose(i))));
        }

        let seg = segment_chapters(&lines, &CleanupOptions::default());

        assert!(!seg.synthetic_lead);
        assert_eq!(seg.numeric_listings, 0);
        assert_eq!(seg.chapters[0].ordinal, 1);
        assert!(seg.chapters[0].body.starts_with("1 2 3"));
    }

    #[test]
    fn test_synthetic_lead_break() {
        let lines: Vec<Line> = (0..3).map(|i| Line::new(i, prose(i))).collect();
        let seg = segment_chapters(&lines, &CleanupOptions::default());

        assert!(seg.synthetic_lead);
        assert_eq!(seg.chapters.len(), 1);
        assert_eq!(seg.chapters[0].ordinal, 1);
        assert_eq!(seg.chapters[0].body.lines().count(), 3);
    }

    #[test]
    fn test_title_recovery() {
        let h = sentinel::HEADER;
        let segment = format!("{h}Moby Dick {h}{h}CHAPTER 1. Loomings.\nCall me Ishmael.\n");
        assert_eq!(recover_title(&segment), "Moby Dick");

        let fallback = format!("{h}\n{h}Loomings{h}\nbody");
        assert_eq!(recover_title(&fallback), "Loomings");

        let two = format!("{h}Loomings{h}body");
        assert_eq!(recover_title(&two), "");
    }

    #[test]
    fn test_chapter_body_replaces_headers() {
        let h = sentinel::HEADER;
        let body = chapter_body(&format!("{h}Title {h} Subtitle\n Call me Ishmael. \n\n"));
        assert_eq!(body, "Title\nSubtitle\nCall me Ishmael.");
    }

    #[test]
    fn test_trailing_blank_segments_are_stripped() {
        let c = sentinel::CHAPTER;
        let lines = vec![
            Line::new(0, format!("{c}{}", prose(0))),
            Line::new(1, c.to_string()),
            Line::new(2, c.to_string()),
        ];
        let seg = segment_chapters(&lines, &CleanupOptions::default());
        assert_eq!(seg.trailing_stripped, 2);
        assert_eq!(seg.chapters.len(), 1);
    }

    #[test]
    fn test_trailing_prose_segments_are_kept() {
        let bodies: Vec<String> = (0..5).map(prose).collect();
        let seg = segment_chapters(&chapter_lines(&bodies), &CleanupOptions::default());

        assert_eq!(seg.trailing_stripped, 0);
        assert_eq!(ordinals(&seg), vec![1, 2, 3, 4, 5]);
        assert_eq!(seg.chapters[3].body, bodies[3]);
        assert_eq!(seg.chapters[4].body, bodies[4]);
    }

    #[test]
    fn test_fold_step() {
        let (fold, first) = OrdinalFold::default().step(false);
        let (fold, second) = fold.step(true);
        let (_, third) = fold.step(true);
        assert_eq!((first, second, third), (None, Some(1), Some(2)));
    }
}
