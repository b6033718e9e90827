//! Marked text stream built from section markup.
//!
//! A section's XHTML is walked into [`MarkupEvent`]s, which the
//! [`StreamBuilder`] turns into a flat sequence of [`Token`]s: literal text
//! runs interleaved with paragraph, header and chapter breaks. The cleanup
//! pipeline works on the rendered form of that stream, where each break is a
//! reserved sentinel literal.

mod builder;
mod walker;

pub use builder::{MarkupEvent, StreamBuilder, DEFAULT_RULE_WIDTH};
pub use walker::{walk_markup, WalkSummary};

/// Sentinel literals embedded in the rendered stream.
///
/// They are printable (end trimming never strips them) and use bracket
/// characters that do not occur in book prose.
pub mod sentinel {
    /// Paragraph start.
    pub const PARAGRAPH: &str = "\u{27E6}P\u{27E7}";
    /// Heading or block start.
    pub const HEADER: &str = "\u{27E6}H\u{27E7}";
    /// Top-level section boundary.
    pub const CHAPTER: &str = "\u{27E6}C\u{27E7}";

    /// Replaces every sentinel with a line break.
    pub fn to_line_breaks(text: &str) -> String {
        text.replace(PARAGRAPH, "\n")
            .replace(HEADER, "\n")
            .replace(CHAPTER, "\n")
    }
}

/// One item of the marked stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text
    Run(String),
    /// Paragraph start
    ParagraphBreak,
    /// Heading or block start
    HeaderBreak,
    /// Section boundary
    ChapterBreak,
}

impl Token {
    /// Returns the text form of this token.
    pub fn as_text(&self) -> &str {
        match self {
            Token::Run(text) => text,
            Token::ParagraphBreak => sentinel::PARAGRAPH,
            Token::HeaderBreak => sentinel::HEADER,
            Token::ChapterBreak => sentinel::CHAPTER,
        }
    }
}

/// An ordered token stream for one book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkedStream {
    tokens: Vec<Token>,
}

impl MarkedStream {
    /// Creates an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a token, merging adjacent text runs.
    pub fn push(&mut self, token: Token) {
        if let Token::Run(text) = &token {
            if text.is_empty() {
                return;
            }
            if let Some(Token::Run(last)) = self.tokens.last_mut() {
                last.push_str(text);
                return;
            }
        }
        self.tokens.push(token);
    }

    /// Returns the tokens in order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns true if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Renders the stream with sentinel literals.
    pub fn render(&self) -> String {
        let len = self.tokens.iter().map(|t| t.as_text().len()).sum();
        let mut out = String::with_capacity(len);
        for token in &self.tokens {
            out.push_str(token.as_text());
        }
        out
    }
}
