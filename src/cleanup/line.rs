//! Lines with an explicit keep/delete mark.

/// Deletion state of a line during boilerplate classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mark {
    /// The line survives resolution
    #[default]
    Keep,
    /// The line is dropped at resolution
    Delete,
}

/// A line of the normalized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Line text without the trailing newline
    pub text: String,
    /// Position in the sequence it was split from (0-based)
    pub index: usize,
    /// Deletion mark
    pub mark: Mark,
}

impl Line {
    /// Creates a kept line.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            index,
            mark: Mark::Keep,
        }
    }

    /// Position of this line relative to a document of `total` lines.
    pub fn fraction(&self, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        self.index as f64 / total as f64
    }

    /// Returns true if the line is marked for deletion.
    pub fn is_deleted(&self) -> bool {
        self.mark == Mark::Delete
    }
}

/// Joins line texts with `separator`.
pub fn join_lines(lines: &[Line], separator: &str) -> String {
    let mut out = String::with_capacity(joined_len(lines, separator.len()));
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(&line.text);
    }
    out
}

/// Length of the lines once joined with a separator of `separator_len` bytes.
pub fn joined_len(lines: &[Line], separator_len: usize) -> usize {
    let text: usize = lines.iter().map(|l| l.text.len()).sum();
    text + lines.len().saturating_sub(1) * separator_len
}
