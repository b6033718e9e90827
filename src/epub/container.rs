//! ZIP container wrapper for EPUB documents.

use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// EPUB container paths.
mod paths {
    pub const MIMETYPE: &str = "mimetype";
    pub const CONTAINER_XML: &str = "META-INF/container.xml";
}

/// ZIP container wrapper for EPUB files.
pub struct EpubContainer {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl EpubContainer {
    /// Opens an EPUB container from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Opens an EPUB container from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Opens an EPUB container from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let cursor = Cursor::new(data);
        let archive = ZipArchive::new(cursor)?;
        Ok(Self { archive })
    }

    /// Verifies the mimetype entry; a missing entry is accepted.
    pub fn verify_mimetype(&mut self) -> bool {
        match self.read_file(paths::MIMETYPE) {
            Ok(content) => content.trim() == "application/epub+zip",
            Err(_) => true,
        }
    }

    /// Reads a file from the archive as UTF-8 string.
    pub fn read_file(&mut self, path: &str) -> Result<String> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        let content = String::from_utf8(data)?;
        Ok(content)
    }

    /// Returns the path of the OPF package named by `META-INF/container.xml`.
    ///
    /// Falls back to the first `.opf` entry when the container document is
    /// missing or names no rootfile.
    pub fn rootfile_path(&mut self) -> Result<String> {
        if let Ok(xml) = self.read_file(paths::CONTAINER_XML) {
            if let Some(path) = parse_rootfile(&xml)? {
                return Ok(path);
            }
        }

        self.file_names()
            .into_iter()
            .find(|name| name.ends_with(".opf"))
            .ok_or_else(|| Error::MissingComponent("OPF package document".into()))
    }

    /// Lists every entry name in archive order.
    pub fn file_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Lists XHTML/HTML entries in name order.
    pub fn list_markup_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self
            .file_names()
            .into_iter()
            .filter(|name| {
                let lower = name.to_ascii_lowercase();
                lower.ends_with(".xhtml") || lower.ends_with(".html") || lower.ends_with(".htm")
            })
            .collect();
        files.sort();
        files
    }
}

/// Extracts the first rootfile `full-path` from container.xml.
fn parse_rootfile(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"rootfile" => {
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() == b"full-path" {
                        let value = attr.unescape_value()?;
                        return Ok(Some(value.into_owned()));
                    }
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_parse_rootfile() {
        let xml = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;
        assert_eq!(
            parse_rootfile(xml).unwrap(),
            Some("OEBPS/content.opf".to_string())
        );
        assert_eq!(parse_rootfile("<container/>").unwrap(), None);
    }

    #[test]
    fn test_rootfile_falls_back_to_opf_entry() {
        let data = archive(&[("mimetype", "application/epub+zip"), ("book.opf", "<package/>")]);
        let mut container = EpubContainer::from_bytes(data).unwrap();
        assert!(container.verify_mimetype());
        assert_eq!(container.rootfile_path().unwrap(), "book.opf");
    }

    #[test]
    fn test_missing_package_is_reported() {
        let data = archive(&[("mimetype", "application/epub+zip")]);
        let mut container = EpubContainer::from_bytes(data).unwrap();
        assert!(matches!(
            container.rootfile_path(),
            Err(Error::MissingComponent(_))
        ));
        assert!(matches!(
            container.read_file("OEBPS/ch1.xhtml"),
            Err(Error::MissingComponent(_))
        ));
    }

    #[test]
    fn test_list_markup_files() {
        let data = archive(&[
            ("OEBPS/ch2.xhtml", "<p/>"),
            ("OEBPS/ch1.xhtml", "<p/>"),
            ("OEBPS/style.css", "p {}"),
        ]);
        let container = EpubContainer::from_bytes(data).unwrap();
        assert_eq!(
            container.list_markup_files(),
            vec!["OEBPS/ch1.xhtml", "OEBPS/ch2.xhtml"]
        );
    }
}
