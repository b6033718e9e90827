//! Translation of markup events into stream tokens.

use super::{MarkedStream, Token};

/// Default width of the divider emitted for `<hr>`.
pub const DEFAULT_RULE_WIDTH: usize = 80;

/// A markup event produced by walking one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    /// Element start (or a self-closing element)
    Start {
        /// Lowercase local name
        name: String,
        /// Attribute key/value pairs
        attributes: Vec<(String, String)>,
        /// True for `<x/>`
        self_closing: bool,
    },
    /// Character data
    Text(String),
    /// Element end
    End {
        /// Lowercase local name
        name: String,
    },
}

impl MarkupEvent {
    /// Convenience constructor for a start event without attributes.
    pub fn start(name: &str) -> Self {
        MarkupEvent::Start {
            name: name.to_string(),
            attributes: Vec::new(),
            self_closing: false,
        }
    }

    /// Convenience constructor for a text event.
    pub fn text(text: &str) -> Self {
        MarkupEvent::Text(text.to_string())
    }

    /// Convenience constructor for an end event.
    pub fn end(name: &str) -> Self {
        MarkupEvent::End {
            name: name.to_string(),
        }
    }
}

/// How an element start is reflected in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementRole {
    Header,
    Paragraph,
    Rule,
    Other,
}

fn element_role(name: &str) -> ElementRole {
    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "title" | "div" | "tr" => ElementRole::Header,
        "p" => ElementRole::Paragraph,
        "hr" => ElementRole::Rule,
        _ => ElementRole::Other,
    }
}

/// Elements whose text is never shown.
fn is_invisible(name: &str) -> bool {
    matches!(name, "style" | "script")
}

/// HTML void elements; they never get an end tag in HTML-ish markup.
fn is_void(name: &str) -> bool {
    matches!(
        name,
        "br" | "hr" | "img" | "meta" | "link" | "input" | "col" | "area" | "base" | "wbr"
    )
}

#[derive(Debug)]
struct OpenElement {
    name: String,
    visible: bool,
}

/// Builds a [`MarkedStream`] from markup events.
///
/// One builder is used per book; call [`begin_section`](Self::begin_section)
/// before feeding each spine section.
#[derive(Debug)]
pub struct StreamBuilder {
    stack: Vec<OpenElement>,
    stream: MarkedStream,
    rule_width: usize,
}

impl Default for StreamBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_RULE_WIDTH)
    }
}

impl StreamBuilder {
    /// Creates a builder with the given divider width.
    pub fn new(rule_width: usize) -> Self {
        Self {
            stack: Vec::new(),
            stream: MarkedStream::new(),
            rule_width,
        }
    }

    /// Starts a new top-level section: emits a chapter break and forgets
    /// any elements left open by the previous section.
    pub fn begin_section(&mut self) {
        self.stack.clear();
        self.stream.push(Token::ChapterBreak);
    }

    /// Feeds one markup event.
    pub fn handle(&mut self, event: MarkupEvent) {
        match event {
            MarkupEvent::Start {
                name,
                attributes,
                self_closing,
            } => {
                self.emit_start(&name);
                if !self_closing && !is_void(&name) {
                    let hidden = attributes.iter().any(|(k, _)| k == "hidden");
                    self.stack.push(OpenElement {
                        visible: !is_invisible(&name) && !hidden,
                        name,
                    });
                }
            }
            MarkupEvent::Text(text) => {
                if self.stack.last().is_some_and(|e| !e.visible) {
                    return;
                }
                self.stream.push(Token::Run(text));
            }
            MarkupEvent::End { name } => {
                if let Some(pos) = self.stack.iter().rposition(|e| e.name == name) {
                    self.stack.truncate(pos);
                }
            }
        }
    }

    fn emit_start(&mut self, name: &str) {
        match element_role(name) {
            ElementRole::Header => self.stream.push(Token::HeaderBreak),
            ElementRole::Paragraph => self.stream.push(Token::ParagraphBreak),
            ElementRole::Rule => self.stream.push(Token::Run("-".repeat(self.rule_width))),
            ElementRole::Other => {}
        }
    }

    /// Returns the stream built so far.
    pub fn stream(&self) -> &MarkedStream {
        &self.stream
    }

    /// Consumes the builder and returns the stream.
    pub fn finish(self) -> MarkedStream {
        self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(events: Vec<MarkupEvent>) -> Vec<Token> {
        let mut builder = StreamBuilder::default();
        builder.begin_section();
        for event in events {
            builder.handle(event);
        }
        builder.finish().tokens().to_vec()
    }

    #[test]
    fn test_heading_and_paragraph_breaks() {
        let tokens = build(vec![
            MarkupEvent::start("h2"),
            MarkupEvent::text("CHAPTER I"),
            MarkupEvent::end("h2"),
            MarkupEvent::start("p"),
            MarkupEvent::text("It was a dark night."),
            MarkupEvent::end("p"),
        ]);

        assert_eq!(
            tokens,
            vec![
                Token::ChapterBreak,
                Token::HeaderBreak,
                Token::Run("CHAPTER I".into()),
                Token::ParagraphBreak,
                Token::Run("It was a dark night.".into()),
            ]
        );
    }

    #[test]
    fn test_style_text_is_skipped() {
        let tokens = build(vec![
            MarkupEvent::start("style"),
            MarkupEvent::text("p { margin: 0 }"),
            MarkupEvent::end("style"),
            MarkupEvent::start("p"),
            MarkupEvent::text("Visible"),
        ]);

        assert!(!tokens.iter().any(|t| t.as_text().contains("margin")));
        assert!(tokens.contains(&Token::Run("Visible".into())));
    }

    #[test]
    fn test_hidden_attribute_hides_text() {
        let tokens = build(vec![
            MarkupEvent::Start {
                name: "span".into(),
                attributes: vec![("hidden".into(), "hidden".into())],
                self_closing: false,
            },
            MarkupEvent::text("secret"),
            MarkupEvent::end("span"),
            MarkupEvent::text("shown"),
        ]);

        assert_eq!(tokens, vec![Token::ChapterBreak, Token::Run("shown".into())]);
    }

    #[test]
    fn test_horizontal_rule_divider() {
        let mut builder = StreamBuilder::new(10);
        builder.handle(MarkupEvent::Start {
            name: "hr".into(),
            attributes: Vec::new(),
            self_closing: true,
        });
        assert_eq!(builder.finish().render(), "----------");
    }

    #[test]
    fn test_unknown_elements_are_ignored() {
        let tokens = build(vec![
            MarkupEvent::start("blink"),
            MarkupEvent::text("text"),
            MarkupEvent::end("blink"),
        ]);
        assert_eq!(tokens, vec![Token::ChapterBreak, Token::Run("text".into())]);
    }

    #[test]
    fn test_void_start_does_not_capture_text() {
        // <br> without an end tag must not become the "nearest" element.
        let tokens = build(vec![
            MarkupEvent::start("style"),
            MarkupEvent::end("style"),
            MarkupEvent::start("br"),
            MarkupEvent::text("after break"),
        ]);
        assert!(tokens.contains(&Token::Run("after break".into())));
    }

    #[test]
    fn test_mismatched_end_tag_is_tolerated() {
        let tokens = build(vec![
            MarkupEvent::start("div"),
            MarkupEvent::start("style"),
            MarkupEvent::end("div"),
            MarkupEvent::text("outside"),
        ]);
        assert!(tokens.contains(&Token::Run("outside".into())));
    }

    #[test]
    fn test_one_chapter_break_per_section() {
        let mut builder = StreamBuilder::default();
        for text in ["one", "two"] {
            builder.begin_section();
            builder.handle(MarkupEvent::start("p"));
            builder.handle(MarkupEvent::text(text));
        }
        let breaks = builder
            .finish()
            .tokens()
            .iter()
            .filter(|t| **t == Token::ChapterBreak)
            .count();
        assert_eq!(breaks, 2);
    }
}
