//! Book structure and metadata as read from the container.

use serde::Serialize;

/// A book read from an EPUB container or a loose XHTML file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Book {
    /// Book metadata
    pub metadata: Metadata,
    /// Spine sections in reading order
    pub sections: Vec<Section>,
}

impl Book {
    /// Creates a new empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total markup size of all sections in bytes.
    pub fn markup_len(&self) -> usize {
        self.sections.iter().map(|s| s.markup.len()).sum()
    }
}

/// Dublin Core metadata from the OPF package.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    /// Book title
    pub title: Option<String>,
    /// Primary creator
    pub author: Option<String>,
    /// Publisher
    pub publisher: Option<String>,
    /// Language code
    pub language: Option<String>,
    /// Description or blurb
    pub description: Option<String>,
    /// Identifier (ISBN, URN, URL...)
    pub identifier: Option<String>,
    /// Raw `dc:subject` entries
    pub subjects: Vec<String>,
    /// Rights statement
    pub rights: Option<String>,
    /// Format
    pub format: Option<String>,
    /// Source
    pub source: Option<String>,
    /// Relation
    pub relation: Option<String>,
    /// Coverage
    pub coverage: Option<String>,
}

impl Metadata {
    /// Returns the subject categories.
    ///
    /// Catalogue subjects such as `Fiction -- Sea stories` are split on the
    /// ` -- ` separator into individual categories.
    pub fn categories(&self) -> Vec<String> {
        self.subjects
            .iter()
            .flat_map(|s| s.split(" -- "))
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Returns true when the rights statement marks the book as copyrighted.
    pub fn is_restricted(&self) -> bool {
        self.rights
            .as_deref()
            .is_some_and(|r| r.contains("copy") || r.contains("Copyrighted"))
    }

    /// Builds the one-line metadata banner written at the top of the output.
    pub fn header_line(&self) -> String {
        format!(
            "[ Author: {}; Title: {}; Categories: {}; Language: {}; ]\n",
            self.author.as_deref().unwrap_or_default(),
            self.title.as_deref().unwrap_or_default(),
            self.categories().join(", "),
            self.language.as_deref().unwrap_or_default(),
        )
    }
}

/// One spine item with its raw markup.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Section {
    /// Position in the spine (0-based)
    pub index: usize,
    /// Manifest id
    pub id: String,
    /// Path inside the container
    pub href: String,
    /// Raw XHTML markup
    #[serde(skip)]
    pub markup: String,
}

impl Section {
    /// Creates a new section.
    pub fn new(index: usize, id: impl Into<String>, href: impl Into<String>, markup: String) -> Self {
        Self {
            index,
            id: id.into(),
            href: href.into(),
            markup,
        }
    }
}
