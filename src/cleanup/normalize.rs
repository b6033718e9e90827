//! Line splitting and basic normalization.

use super::line::{join_lines, Line};
use crate::markup::sentinel;

/// Curly quote mapping table
const QUOTE_MAPPINGS: &[(char, char)] = &[
    ('\u{201C}', '"'),  // “
    ('\u{201D}', '"'),  // ”
    ('\u{2018}', '\''), // ‘
    ('\u{2019}', '\''), // ’
];

/// Normalizes the whole stream text before it is split into lines.
///
/// Applied in order:
/// 1. drop tabs, non-breaking spaces become spaces
/// 2. collapse double spaces (single pass, runs of three may survive)
/// 3. carriage returns become line feeds
/// 4. collapse blank-line runs
/// 5. trim non-printable characters at both ends, drop interior control characters
/// 6. curly quotes become straight quotes
pub fn basic_normalize(input: &str) -> String {
    let mut text = input.replace('\t', "").replace('\u{00A0}', " ");
    text = text.replace("  ", " ");
    text = text.replace('\r', "\n");
    text = text.replace("\n\n\n", "\n");
    text = text.replace("\n\n", "\n");
    text = text.replace("\n\n", "\n");

    let trimmed = text.trim_matches(|c: char| !is_printable(c));
    let mut result = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        if is_control_char(c) {
            continue;
        }
        result.push(map_quote(c));
    }
    result
}

/// Splits normalized text into lines.
///
/// Leading spaces are removed from every line and blank lines are dropped
/// for good; indices are assigned to the surviving lines.
pub fn split_lines(text: &str) -> Vec<Line> {
    text.split('\n')
        .map(|line| line.trim_start_matches(' '))
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| Line::new(index, line))
        .collect()
}

/// Normalizes and splits in one step.
pub fn normalize_lines(input: &str) -> Vec<Line> {
    split_lines(&basic_normalize(input))
}

/// Rejoins lines into one line per paragraph.
///
/// Lines are joined with single spaces, paragraph breaks become line
/// breaks, and the result is split again.
pub fn reflow(lines: &[Line]) -> Vec<Line> {
    let joined = join_lines(lines, " ").replace(sentinel::PARAGRAPH, "\n");
    split_lines(&joined)
}

/// Printable characters survive end trimming; spaces count as printable.
fn is_printable(c: char) -> bool {
    c == ' ' || !(c.is_control() || c.is_whitespace() || is_control_char(c))
}

/// Check if character is a control character that should be removed
fn is_control_char(c: char) -> bool {
    matches!(
        c,
        '\0'        // Null
        | '\x0B'    // Vertical Tab
        | '\x0C'    // Form Feed
        | '\u{FEFF}' // BOM
        | '\u{00AD}' // Soft hyphen
    )
}

fn map_quote(c: char) -> char {
    QUOTE_MAPPINGS
        .iter()
        .find(|(curly, _)| *curly == c)
        .map(|(_, straight)| *straight)
        .unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::line::join_lines;

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_tabs_and_double_spaces() {
        assert_eq!(basic_normalize("a\tb  c"), "ab c");
    }

    #[test]
    fn test_triple_space_survives_single_pass() {
        assert_eq!(basic_normalize("a   b"), "a  b");
    }

    #[test]
    fn test_newline_collapse() {
        assert_eq!(basic_normalize("one\r\ntwo\n\n\nthree"), "one\ntwo\nthree");
    }

    #[test]
    fn test_trim_non_printable_ends() {
        assert_eq!(basic_normalize("\u{FEFF}\n\nbody\n\x0C"), "body");
    }

    #[test]
    fn test_interior_control_chars_removed() {
        assert_eq!(basic_normalize("soft\u{00AD}hyphen\x0Bend"), "softhyphenend");
    }

    #[test]
    fn test_curly_quotes() {
        assert_eq!(
            basic_normalize("\u{201C}It\u{2019}s,\u{201D} she said."),
            "\"It's,\" she said."
        );
    }

    #[test]
    fn test_split_drops_blank_lines_and_left_trims() {
        let lines = split_lines("  first\n   \n\nsecond  \n");
        assert_eq!(texts(&lines), vec!["first", "second  "]);
        assert_eq!(lines[1].index, 1);
    }

    #[test]
    fn test_reflow_one_line_per_paragraph() {
        let p = sentinel::PARAGRAPH;
        let lines = split_lines(&format!("{p}Call me\nIshmael.\n{p}Some years\nago."));
        let reflowed = reflow(&lines);
        assert_eq!(texts(&reflowed), vec!["Call me Ishmael. ", "Some years ago."]);
    }

    /// Holds for text without runs of three or more spaces; each pass of the
    /// single-pass collapse shortens such a run by one.
    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            "\u{FEFF}  Title\r\n\r\n\t\u{201C}Hello,\u{201D} he said.  Then\u{00A0}left.\n\n\n  Next\n",
            "CHAPTER I\n\nIt was the best of times,\nit was the worst of times.",
            "\n\n \n",
        ];
        for input in inputs {
            let once = normalize_lines(input);
            let twice = normalize_lines(&join_lines(&once, "\n"));
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_space_runs_shrink_per_pass() {
        let once = join_lines(&normalize_lines("a   b"), "\n");
        let twice = join_lines(&normalize_lines(&once), "\n");
        assert_eq!(once, "a  b");
        assert_eq!(twice, "a b");
    }
}
