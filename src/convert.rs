//! Book-level conversion: markup walk, cleanup and acceptance checks.

use crate::cleanup::cleanup;
use crate::markup::{walk_markup, MarkedStream, StreamBuilder};
use crate::model::{Book, Conversion, Outcome};
use crate::options::ConvertOptions;
use tracing::{debug, info, warn};

/// Walks every section of `book` into one marked stream.
///
/// Each section starts with a chapter break. Sections with malformed markup
/// contribute whatever was read before the error.
pub fn build_stream(book: &Book, rule_width: usize) -> MarkedStream {
    let mut builder = StreamBuilder::new(rule_width);
    for section in &book.sections {
        builder.begin_section();
        let summary = walk_markup(&section.markup, &mut builder);
        if summary.truncated.is_some() {
            warn!(section = %section.href, "Section truncated at malformed markup");
        }
        debug!(section = %section.href, events = summary.events, "Walked section");
    }
    builder.finish()
}

/// Converts a book into an [`Outcome`].
///
/// The cleaned text is checked against the minimum output length first,
/// then the rights statement when restricted books are skipped.
pub fn convert_book(book: &Book, options: &ConvertOptions) -> Outcome {
    let stream = build_stream(book, options.rule_width).render();
    let cleaned = cleanup(&stream, &options.cleanup);
    let length = cleaned.text.len();
    let title = book.metadata.title.as_deref().unwrap_or_default();

    if !options.accepts_length(length) {
        info!(
            title,
            length,
            minimum = options.minimum_output_length,
            "Output too short, skipping"
        );
        return Outcome::TooShort {
            length,
            removed: cleaned.chars_removed(),
        };
    }

    if options.skip_restricted && book.metadata.is_restricted() {
        info!(title, "Rights statement claims copyright, skipping");
        return Outcome::Restricted;
    }

    info!(
        title,
        chapters = cleaned.chapters.len(),
        original = stream.len(),
        cleaned = length,
        "Converted book"
    );

    Outcome::Converted(Box::new(Conversion {
        metadata: book.metadata.clone(),
        chapters: cleaned.chapters,
        text: cleaned.text,
        original_chars: stream.len(),
        passes: cleaned.passes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::CleanupOptions;
    use crate::model::{Chapter, Metadata, Section};

    fn chapter_markup(n: usize, paragraphs: usize) -> String {
        let mut body = format!(
            "<html><head><title>Moby Dick</title></head><body><div><h2>CHAPTER {n}</h2>"
        );
        for p in 0..paragraphs {
            body.push_str(&format!(
                "<p>Paragraph {p} of chapter {n}: whaling voyage prose goes here.</p>"
            ));
        }
        body.push_str("</div></body></html>");
        body
    }

    fn book(chapters: usize, paragraphs: usize) -> Book {
        Book {
            metadata: Metadata {
                title: Some("Moby Dick".into()),
                ..Default::default()
            },
            sections: (0..chapters)
                .map(|i| Section::new(i, format!("ch{i}"), format!("ch{i}.xhtml"), chapter_markup(i + 1, paragraphs)))
                .collect(),
        }
    }

    #[test]
    fn test_build_stream_one_break_per_section() {
        let stream = build_stream(&book(3, 1), 80).render();
        assert_eq!(stream.matches(crate::markup::sentinel::CHAPTER).count(), 3);
    }

    #[test]
    fn test_convert_book_emits_chapters() {
        let outcome = convert_book(&book(4, 10), &ConvertOptions::default());
        let conversion = outcome.converted().expect("long enough to convert");

        assert_eq!(conversion.chapter_count(), 4);
        assert_eq!(conversion.chapters[0].title, "Moby Dick");
        assert!(conversion.chapters[2].body.starts_with("Moby Dick\nCHAPTER 3\n"));
        let ordinals: Vec<usize> = conversion.chapters.iter().map(|c| c.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4]);

        let removed: i64 = conversion.passes.iter().map(|p| p.removed()).sum();
        assert_eq!(removed, conversion.chars_removed());
    }

    #[test]
    fn test_short_book_is_rejected() {
        let outcome = convert_book(&book(1, 2), &ConvertOptions::default());
        assert!(matches!(outcome, Outcome::TooShort { length, .. } if length < 2000));
    }

    /// A one-paragraph book whose cleaned text is exactly `length` bytes.
    fn book_of_length(length: usize) -> Book {
        let banner = Chapter::new(1, "", "").banner().len();
        let markup = format!("<p>{}</p>", "x".repeat(length - banner));
        Book {
            metadata: Metadata::default(),
            sections: vec![Section::new(0, "only", "only.xhtml", markup)],
        }
    }

    #[test]
    fn test_minimum_output_length_boundary() {
        let options = ConvertOptions::default();

        let short = convert_book(&book_of_length(1500), &options);
        assert!(matches!(short, Outcome::TooShort { length: 1500, .. }));

        for length in [2000, 2001] {
            let outcome = convert_book(&book_of_length(length), &options);
            let conversion = outcome.converted().expect("at or above the minimum");
            assert_eq!(conversion.cleaned_chars(), length);
            assert_eq!(conversion.chapter_count(), 1);
        }
    }

    #[test]
    fn test_restricted_book_is_skipped() {
        let mut restricted = book(4, 10);
        restricted.metadata.rights = Some("Copyrighted. Read the copyright notice.".into());

        let skipping = ConvertOptions::default().skip_restricted();
        assert!(matches!(convert_book(&restricted, &skipping), Outcome::Restricted));
        assert!(convert_book(&restricted, &ConvertOptions::default())
            .converted()
            .is_some());
    }

    #[test]
    fn test_cleaning_disabled_passes_text_through() {
        let options = ConvertOptions::default()
            .with_cleanup(CleanupOptions::minimal())
            .with_minimum_output_length(0);
        let outcome = convert_book(&book(2, 1), &options);
        let conversion = outcome.converted().unwrap();

        assert!(conversion.chapters.is_empty());
        assert!(conversion.text.contains("CHAPTER 2"));
        assert!(!conversion.text.contains("***"));
    }
}
