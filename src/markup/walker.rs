//! XHTML walking with quick-xml.

use super::{MarkupEvent, StreamBuilder};
use quick_xml::escape::{resolve_html5_entity, resolve_predefined_entity};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use tracing::warn;

/// What happened while walking one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Number of events forwarded to the builder
    pub events: usize,
    /// Tokenizer error that stopped the walk early, if any
    pub truncated: Option<String>,
}

/// Walks a section's markup and feeds the events to `builder`.
///
/// Malformed markup never fails the caller: the walk stops at the first
/// tokenizer error and everything accumulated so far is kept.
pub fn walk_markup(markup: &str, builder: &mut StreamBuilder) -> WalkSummary {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;

    let mut summary = WalkSummary::default();

    loop {
        let event = match reader.read_event() {
            Ok(Event::Start(e)) => start_event(&e, false),
            Ok(Event::Empty(e)) => start_event(&e, true),
            Ok(Event::End(e)) => MarkupEvent::End {
                name: local_name(e.local_name().as_ref()),
            },
            Ok(Event::Text(t)) => MarkupEvent::Text(unescape_text(&t)),
            Ok(Event::CData(c)) => MarkupEvent::Text(String::from_utf8_lossy(&c).into_owned()),
            Ok(Event::Eof) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!(
                    position = reader.buffer_position(),
                    events = summary.events,
                    "Markup walk stopped early: {e}"
                );
                summary.truncated = Some(e.to_string());
                break;
            }
        };
        builder.handle(event);
        summary.events += 1;
    }

    summary
}

fn start_event(e: &BytesStart, self_closing: bool) -> MarkupEvent {
    let attributes = e
        .attributes()
        .flatten()
        .map(|attr| {
            let key = local_name(attr.key.local_name().as_ref());
            let value = attr
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            (key, value)
        })
        .collect();

    MarkupEvent::Start {
        name: local_name(e.local_name().as_ref()),
        attributes,
        self_closing,
    }
}

/// Resolves XML and HTML5 named entities; keeps the raw text on failure.
fn unescape_text(t: &BytesText) -> String {
    match t.unescape_with(|entity| {
        resolve_predefined_entity(entity).or_else(|| resolve_html5_entity(entity))
    }) {
        Ok(text) => text.into_owned(),
        Err(_) => String::from_utf8_lossy(t).into_owned(),
    }
}

/// Gets the lowercase local name of an element (without namespace prefix).
fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{sentinel, Token};

    fn walk(markup: &str) -> (String, WalkSummary) {
        let mut builder = StreamBuilder::default();
        builder.begin_section();
        let summary = walk_markup(markup, &mut builder);
        (builder.finish().render(), summary)
    }

    #[test]
    fn test_walk_xhtml_chapter() {
        let xhtml = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Moby Dick</title><style>p { text-indent: 1em }</style></head>
<body><h2>CHAPTER 1. Loomings.</h2><p>Call me Ishmael.</p></body>
</html>"#;

        let (text, summary) = walk(xhtml);

        assert!(summary.truncated.is_none());
        assert!(text.starts_with(sentinel::CHAPTER));
        assert!(text.contains(&format!("{}Moby Dick", sentinel::HEADER)));
        assert!(text.contains(&format!("{}CHAPTER 1. Loomings.", sentinel::HEADER)));
        assert!(text.contains(&format!("{}Call me Ishmael.", sentinel::PARAGRAPH)));
        assert!(!text.contains("text-indent"));
    }

    #[test]
    fn test_walk_resolves_entities() {
        let (text, _) = walk("<p>Tom&nbsp;&amp;&#8217;s &mdash; done</p>");
        assert!(text.contains("Tom\u{a0}&\u{2019}s \u{2014} done"));
    }

    #[test]
    fn test_walk_keeps_partial_output_on_error() {
        let (text, summary) = walk("<p>First paragraph.</p><p>Second <!-- never closed");
        assert!(summary.truncated.is_some());
        assert!(text.contains("First paragraph."));
    }

    #[test]
    fn test_walk_namespaced_and_uppercase_tags() {
        let mut builder = StreamBuilder::default();
        walk_markup("<xhtml:P>Hello</xhtml:P><HR/>", &mut builder);
        let tokens = builder.finish().tokens().to_vec();
        assert_eq!(tokens[0], Token::ParagraphBreak);
        assert_eq!(tokens[1], Token::Run(format!("Hello{}", "-".repeat(80))));
    }
}
