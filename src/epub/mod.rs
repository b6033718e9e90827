//! EPUB container format reader.
//!
//! EPUB files are ZIP archives; `META-INF/container.xml` names an OPF
//! package whose manifest and spine give the content documents in reading
//! order.

mod container;
mod package;

pub use container::EpubContainer;
pub use package::{parse_package, resolve_href, ManifestItem, Package};

use crate::error::{Error, Result};
use crate::model::{Book, Section};
use crate::options::ConvertOptions;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, warn};

/// EPUB document parser.
pub struct EpubParser {
    container: EpubContainer,
}

impl EpubParser {
    /// Opens an EPUB document from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let container = EpubContainer::open(path)?;
        Ok(Self { container })
    }

    /// Opens an EPUB document from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let container = EpubContainer::from_reader(reader)?;
        Ok(Self { container })
    }

    /// Opens an EPUB document from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let container = EpubContainer::from_bytes(data)?;
        Ok(Self { container })
    }

    /// Reads metadata and spine sections into a [`Book`].
    pub fn parse(&mut self, options: &ConvertOptions) -> Result<Book> {
        if !self.container.verify_mimetype() {
            warn!("Unexpected EPUB mimetype entry");
        }

        let opf_path = self.container.rootfile_path()?;
        let opf = self.container.read_file(&opf_path)?;
        let package = parse_package(&opf, &opf_path)?;
        debug!(
            package = %opf_path,
            manifest = package.manifest.len(),
            spine = package.spine.len(),
            "Read OPF package"
        );

        let mut book = Book::new();
        book.metadata = package.metadata.clone();
        book.metadata.format.get_or_insert_with(|| "EPUB".to_string());

        let items: Vec<(String, String)> = {
            let spine = package.spine_items();
            if spine.is_empty() {
                warn!("Empty spine, falling back to markup files in name order");
                self.container
                    .list_markup_files()
                    .into_iter()
                    .map(|href| (href.clone(), href))
                    .collect()
            } else {
                spine
                    .into_iter()
                    .map(|item| (item.id.clone(), item.href.clone()))
                    .collect()
            }
        };

        if items.is_empty() {
            return Err(Error::MissingComponent("content documents".into()));
        }

        for (id, href) in items {
            match self.container.read_file(&href) {
                Ok(markup) => {
                    let index = book.sections.len();
                    book.sections.push(Section::new(index, id, href, markup));
                }
                Err(e) if options.is_lenient() => {
                    warn!(id = %id, href = %href, "Skipping unreadable section: {e}");
                }
                Err(e) => {
                    return Err(Error::Section {
                        id,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(book)
    }
}
