//! # unepub
//!
//! A Rust library for turning EPUB books (and loose XHTML files) into clean,
//! chapter-segmented plain text.
//!
//! Each spine section is walked into a marked text stream, normalized,
//! stripped of front/back matter and numbered listings, and re-assembled into
//! renumbered chapters with recovered titles.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unepub::{convert_file, ConvertOptions, Outcome, RenderOptions};
//!
//! fn main() -> unepub::Result<()> {
//!     match convert_file("moby-dick.epub", &ConvertOptions::default())? {
//!         Outcome::Converted(conversion) => {
//!             let text = unepub::render::render_text(&conversion, &RenderOptions::default());
//!             println!("{}", text);
//!         }
//!         Outcome::TooShort { length, .. } => eprintln!("only {length} characters"),
//!         Outcome::Restricted => eprintln!("copyrighted"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `async`: Async I/O support with Tokio

pub mod batch;
pub mod cleanup;
pub mod convert;
pub mod detect;
pub mod epub;
pub mod error;
pub mod markup;
pub mod model;
pub mod options;
pub mod render;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use batch::{BatchOptions, BatchStats, Subset};
pub use cleanup::{cleanup, CleanupOptions};
pub use convert::{build_stream, convert_book};
pub use detect::{detect_format, detect_format_from_bytes, detect_format_from_path, FormatType};
pub use error::{Error, Result};
pub use model::{Book, Chapter, Conversion, Metadata, Outcome, PassStat, Section};
pub use options::{ConvertOptions, ErrorMode};
pub use render::RenderOptions;

use std::io::{Read, Seek};
use std::path::Path;

/// Reads a book from a file path.
///
/// Automatically detects the format (EPUB or loose XHTML).
pub fn read_book(path: impl AsRef<Path>, options: &ConvertOptions) -> Result<Book> {
    let path = path.as_ref();
    let format = detect_format_from_path(path)?;

    match format {
        FormatType::Epub => epub::EpubParser::open(path)?.parse(options),
        FormatType::Html => {
            let markup = std::fs::read_to_string(path)?;
            Ok(book_from_html(markup, &path.to_string_lossy()))
        }
    }
}

/// Reads a book from a reader.
pub fn read_book_from_reader<R: Read + Seek>(reader: R, options: &ConvertOptions) -> Result<Book> {
    let mut buf_reader = std::io::BufReader::new(reader);
    let format = detect::detect_format(&mut buf_reader)?;

    match format {
        FormatType::Epub => epub::EpubParser::from_reader(buf_reader)?.parse(options),
        FormatType::Html => {
            let mut markup = String::new();
            buf_reader.read_to_string(&mut markup)?;
            Ok(book_from_html(markup, "input.html"))
        }
    }
}

/// Wraps one XHTML document as a single-section book.
pub fn book_from_html(markup: String, href: &str) -> Book {
    let mut book = Book::new();
    book.metadata.format = Some("HTML".to_string());
    book.sections.push(Section::new(0, "html", href, markup));
    book
}

/// Converts a document file.
///
/// # Example
///
/// ```no_run
/// use unepub::{convert_file, ConvertOptions};
///
/// let outcome = convert_file("book.epub", &ConvertOptions::default())?;
/// if let Some(conversion) = outcome.converted() {
///     println!("Chapters: {}", conversion.chapter_count());
/// }
/// # Ok::<(), unepub::Error>(())
/// ```
pub fn convert_file(path: impl AsRef<Path>, options: &ConvertOptions) -> Result<Outcome> {
    let book = read_book(path, options)?;
    Ok(convert_book(&book, options))
}

/// Converts a document from a reader.
pub fn convert_reader<R: Read + Seek>(reader: R, options: &ConvertOptions) -> Result<Outcome> {
    let book = read_book_from_reader(reader, options)?;
    Ok(convert_book(&book, options))
}

/// Converts a document from bytes.
pub fn convert_bytes(data: &[u8], options: &ConvertOptions) -> Result<Outcome> {
    convert_reader(std::io::Cursor::new(data), options)
}

/// Converts a document to plain text with default options.
///
/// Returns `None` when the document is rejected (too short or restricted).
///
/// # Example
///
/// ```no_run
/// if let Some(text) = unepub::to_text("book.epub")? {
///     std::fs::write("book.txt", text)?;
/// }
/// # Ok::<(), unepub::Error>(())
/// ```
pub fn to_text(path: impl AsRef<Path>) -> Result<Option<String>> {
    Unepub::new().convert(path).map(|doc| doc.to_text())
}

/// Builder for converting documents.
///
/// # Example
///
/// ```no_run
/// use unepub::Unepub;
///
/// let text = Unepub::new()
///     .with_header(false)
///     .gutenberg_cleaning()
///     .convert("book.epub")?
///     .to_text();
/// # Ok::<(), unepub::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unepub {
    options: ConvertOptions,
}

impl Unepub {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the metadata banner.
    pub fn with_header(mut self, enabled: bool) -> Self {
        self.options.render = self.options.render.with_header(enabled);
        self
    }

    /// Enables boilerplate removal for public-domain dumps.
    pub fn gutenberg_cleaning(mut self) -> Self {
        self.options.cleanup.gutenberg_cleaning = true;
        self
    }

    /// Disables normalization and heuristics.
    pub fn raw(mut self) -> Self {
        self.options.cleanup.clean_output = false;
        self
    }

    /// Sets the minimum accepted output length.
    pub fn with_minimum_output_length(mut self, length: usize) -> Self {
        self.options.minimum_output_length = length;
        self
    }

    /// Skips unreadable sections instead of failing.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Returns the assembled options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Converts a document from a file path.
    pub fn convert(self, path: impl AsRef<Path>) -> Result<ConvertedDocument> {
        let outcome = convert_file(path, &self.options)?;
        Ok(ConvertedDocument {
            outcome,
            render_options: self.options.render,
        })
    }

    /// Converts a document from bytes.
    pub fn convert_bytes(self, data: &[u8]) -> Result<ConvertedDocument> {
        let outcome = convert_bytes(data, &self.options)?;
        Ok(ConvertedDocument {
            outcome,
            render_options: self.options.render,
        })
    }
}

/// A converted document ready for rendering.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    outcome: Outcome,
    render_options: RenderOptions,
}

impl ConvertedDocument {
    /// Returns the conversion outcome.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Renders the text, or `None` if the document was rejected.
    pub fn to_text(&self) -> Option<String> {
        self.outcome
            .converted()
            .map(|c| render::render_text(c, &self.render_options))
    }

    /// Renders the conversion as JSON, or `None` if the document was rejected.
    pub fn to_json(&self) -> Result<Option<String>> {
        self.outcome
            .converted()
            .map(|c| render::render_json(c, &self.render_options))
            .transpose()
    }

    /// Returns the number of chapters (zero for rejected documents).
    pub fn chapter_count(&self) -> usize {
        self.outcome.converted().map_or(0, Conversion::chapter_count)
    }

    /// Consumes self and returns the outcome.
    pub fn into_outcome(self) -> Outcome {
        self.outcome
    }
}
