//! Front- and back-matter removal for public-domain book dumps.
//!
//! Every heuristic here looks at an immutable line slice and returns the
//! indices it wants gone. Marks from all heuristics are applied together by
//! [`classify`] and resolved once by [`resolve`], so a line deleted by one
//! anchor is still visible to the others.

use super::line::{Line, Mark};
use super::CleanupOptions;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::debug;

/// A front-matter anchor: a match within `window` lines deletes everything
/// before `match + offset`.
#[derive(Debug, Clone, Copy)]
pub struct FrontAnchor {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
    pub window: usize,
    pub offset: usize,
}

/// Front-matter anchors in evaluation order.
pub const FRONT_ANCHORS: &[FrontAnchor] = &[
    FrontAnchor {
        name: "cover",
        patterns: &["\"Cover\""],
        window: 10,
        offset: 1,
    },
    FrontAnchor {
        name: "introduction",
        patterns: &["Introduction", "INTRODUCTION"],
        window: 100,
        offset: 1,
    },
    FrontAnchor {
        name: "bibliography",
        patterns: &["Bibliography", "BIBLIOGRAPHY"],
        window: 100,
        offset: 1,
    },
    FrontAnchor {
        name: "part-one",
        patterns: &["Part One", "PART ONE"],
        window: 50,
        offset: 2,
    },
    FrontAnchor {
        name: "contents",
        patterns: &["Contents", "CONTENTS"],
        window: 50,
        offset: 3,
    },
    FrontAnchor {
        name: "preface",
        patterns: &["PREFACE"],
        window: 200,
        offset: 0,
    },
    FrontAnchor {
        name: "start-banner",
        patterns: &[
            "START OF THE PROJECT GUTENBERG EBOOK",
            "The Project Gutenberg EBook",
        ],
        window: 150,
        offset: 1,
    },
];

/// Position gate of a back-matter anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Matches anywhere
    Anywhere,
    /// Matches only past this fraction of the document
    After(f64),
}

impl Gate {
    fn admits(self, line: &Line, total: usize) -> bool {
        match self {
            Gate::Anywhere => true,
            Gate::After(min) => line.fraction(total) > min,
        }
    }
}

/// A back-matter anchor: a gated match deletes from the match to the end.
#[derive(Debug, Clone, Copy)]
pub struct BackAnchor {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
    pub gate: Gate,
}

/// Back-matter anchors for the given options, in evaluation order.
pub fn back_anchors(options: &CleanupOptions) -> [BackAnchor; 3] {
    [
        BackAnchor {
            name: "footnotes",
            patterns: &["Footnotes"],
            gate: Gate::After(options.footnotes_fraction),
        },
        BackAnchor {
            name: "end-banner",
            patterns: &["END OF THE PROJECT GUTENBERG EBOOK"],
            gate: Gate::After(options.end_banner_fraction),
        },
        BackAnchor {
            name: "appendix",
            patterns: &["APPENDIX"],
            gate: Gate::Anywhere,
        },
    ]
}

static RE_PAGE_ARTIFACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(?:Pages?|pg)").unwrap());

fn matches_any(line: &Line, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| line.text.contains(p))
}

/// Deletion range for a front anchor, if it matches within its window.
pub fn front_matter_range(lines: &[Line], anchor: &FrontAnchor) -> Option<Range<usize>> {
    let hit = lines
        .iter()
        .take(anchor.window)
        .position(|line| matches_any(line, anchor.patterns))?;
    let end = (hit + anchor.offset).min(lines.len());
    debug!(anchor = anchor.name, line = hit, "Front-matter anchor matched");
    Some(0..end)
}

/// Deletion range for a back anchor, if an admitted line matches.
///
/// `total` is the line count fixed before classification started.
pub fn back_matter_range(lines: &[Line], anchor: &BackAnchor, total: usize) -> Option<Range<usize>> {
    let hit = lines
        .iter()
        .position(|line| matches_any(line, anchor.patterns) && anchor.gate.admits(line, total))?;
    debug!(
        anchor = anchor.name,
        line = hit,
        fraction = lines[hit].fraction(total),
        "Back-matter anchor matched"
    );
    Some(hit..lines.len())
}

/// Indices of lines carrying page artifacts or distributor mentions.
pub fn artifact_lines(lines: &[Line]) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| RE_PAGE_ARTIFACT.is_match(&line.text) || line.text.contains("Gutenberg"))
        .map(|(i, _)| i)
        .collect()
}

/// Runs every heuristic and returns the lines with their marks applied.
pub fn classify(lines: &[Line], options: &CleanupOptions) -> Vec<Line> {
    let total = lines.len();
    let mut marks = vec![Mark::Keep; total];

    for anchor in FRONT_ANCHORS {
        if let Some(range) = front_matter_range(lines, anchor) {
            marks[range].fill(Mark::Delete);
        }
    }
    for anchor in &back_anchors(options) {
        if let Some(range) = back_matter_range(lines, anchor, total) {
            marks[range].fill(Mark::Delete);
        }
    }
    for i in artifact_lines(lines) {
        marks[i] = Mark::Delete;
    }

    lines
        .iter()
        .zip(marks)
        .map(|(line, mark)| Line {
            mark: if line.is_deleted() { Mark::Delete } else { mark },
            ..line.clone()
        })
        .collect()
}

/// Drops deleted lines and renumbers the survivors.
pub fn resolve(lines: Vec<Line>) -> Vec<Line> {
    lines
        .into_iter()
        .filter(|line| !line.is_deleted())
        .enumerate()
        .map(|(index, line)| Line { index, ..line })
        .collect()
}

/// Classifies and resolves in one step.
pub fn strip_boilerplate(lines: &[Line], options: &CleanupOptions) -> Vec<Line> {
    let marked = classify(lines, options);
    let deleted = marked.iter().filter(|l| l.is_deleted()).count();
    debug!(total = lines.len(), deleted, "Boilerplate lines resolved");
    resolve(marked)
}
