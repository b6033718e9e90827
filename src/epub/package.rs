//! OPF package document parsing: metadata, manifest and spine.

use crate::error::Result;
use crate::model::Metadata;
use percent_encoding::percent_decode_str;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::warn;

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    /// Archive path, already resolved against the package directory
    pub href: String,
    pub media_type: String,
}

impl ManifestItem {
    /// Returns true for XHTML/HTML content documents.
    pub fn is_markup(&self) -> bool {
        matches!(self.media_type.as_str(), "application/xhtml+xml" | "text/html")
    }
}

/// A parsed OPF package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub metadata: Metadata,
    pub manifest: Vec<ManifestItem>,
    /// Spine idrefs in reading order
    pub spine: Vec<String>,
}

impl Package {
    /// Looks up a manifest item by id.
    pub fn item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }

    /// Returns the manifest items named by the spine, in reading order.
    ///
    /// Idrefs without a manifest entry are skipped with a warning.
    pub fn spine_items(&self) -> Vec<&ManifestItem> {
        self.spine
            .iter()
            .filter_map(|idref| {
                let item = self.item(idref);
                if item.is_none() {
                    warn!(idref = %idref, "Spine item has no manifest entry");
                }
                item
            })
            .collect()
    }
}

/// Dublin Core elements read into [`Metadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DcField {
    Title,
    Creator,
    Publisher,
    Language,
    Description,
    Identifier,
    Subject,
    Rights,
    Format,
    Source,
    Relation,
    Coverage,
}

impl DcField {
    fn from_name(name: &[u8]) -> Option<Self> {
        Some(match name {
            b"title" => DcField::Title,
            b"creator" => DcField::Creator,
            b"publisher" => DcField::Publisher,
            b"language" => DcField::Language,
            b"description" => DcField::Description,
            b"identifier" => DcField::Identifier,
            b"subject" => DcField::Subject,
            b"rights" => DcField::Rights,
            b"format" => DcField::Format,
            b"source" => DcField::Source,
            b"relation" => DcField::Relation,
            b"coverage" => DcField::Coverage,
            _ => return None,
        })
    }

    /// Stores a value; single-valued fields keep their first occurrence.
    fn store(self, metadata: &mut Metadata, value: String) {
        let slot = match self {
            DcField::Subject => {
                metadata.subjects.push(value);
                return;
            }
            DcField::Title => &mut metadata.title,
            DcField::Creator => &mut metadata.author,
            DcField::Publisher => &mut metadata.publisher,
            DcField::Language => &mut metadata.language,
            DcField::Description => &mut metadata.description,
            DcField::Identifier => &mut metadata.identifier,
            DcField::Rights => &mut metadata.rights,
            DcField::Format => &mut metadata.format,
            DcField::Source => &mut metadata.source,
            DcField::Relation => &mut metadata.relation,
            DcField::Coverage => &mut metadata.coverage,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }
}

/// Parses an OPF package document located at `opf_path` inside the archive.
pub fn parse_package(xml: &str, opf_path: &str) -> Result<Package> {
    let base_dir = opf_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut package = Package::default();
    let mut in_metadata = false;
    let mut field: Option<(DcField, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"metadata" => in_metadata = true,
                name if in_metadata => {
                    field = DcField::from_name(name).map(|f| (f, String::new()));
                }
                _ => handle_item(&e, base_dir, &mut package)?,
            },
            Event::Empty(e) => handle_item(&e, base_dir, &mut package)?,
            Event::Text(t) => {
                if let Some((_, value)) = field.as_mut() {
                    value.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some((_, value)) = field.as_mut() {
                    value.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"metadata" {
                    in_metadata = false;
                }
                if let Some((dc, value)) = field.take() {
                    let value = value.trim();
                    if !value.is_empty() {
                        dc.store(&mut package.metadata, value.to_string());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(package)
}

fn handle_item(e: &BytesStart, base_dir: &str, package: &mut Package) -> Result<()> {
    match e.local_name().as_ref() {
        b"item" => {
            let id = attr(e, b"id")?.unwrap_or_default();
            let href = attr(e, b"href")?.unwrap_or_default();
            let media_type = attr(e, b"media-type")?.unwrap_or_default();
            if !id.is_empty() && !href.is_empty() {
                package.manifest.push(ManifestItem {
                    id,
                    href: resolve_href(base_dir, &href),
                    media_type,
                });
            }
        }
        b"itemref" => {
            if let Some(idref) = attr(e, b"idref")? {
                package.spine.push(idref);
            }
        }
        _ => {}
    }
    Ok(())
}

fn attr(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Resolves a manifest href against the package directory.
///
/// Fragments are dropped, percent escapes decoded, and `.`/`..` segments
/// collapsed.
pub fn resolve_href(base_dir: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or("");
    let href = percent_decode_str(href).decode_utf8_lossy();
    let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Moby Dick; Or, The Whale</dc:title>
    <dc:creator opf:role="aut">Melville, Herman</dc:creator>
    <dc:creator>Someone Else</dc:creator>
    <dc:language>en</dc:language>
    <dc:subject>Whales -- Fiction</dc:subject>
    <dc:subject>Sea stories</dc:subject>
    <dc:rights>Public domain in the USA.</dc:rights>
    <dc:identifier id="id">http://www.gutenberg.org/2701</dc:identifier>
    <meta name="cover" content="cover-image"/>
  </metadata>
  <manifest>
    <item id="ch1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch2" href="text/ch2.xhtml#start" media-type="application/xhtml+xml"/>
    <item id="css" href="../styles/book.css" media-type="text/css"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="ch2"/>
    <itemref idref="ch1"/>
    <itemref idref="missing"/>
  </spine>
</package>"#;

    #[test]
    fn test_parse_metadata() {
        let package = parse_package(OPF, "OEBPS/content.opf").unwrap();
        let meta = &package.metadata;
        assert_eq!(meta.title.as_deref(), Some("Moby Dick; Or, The Whale"));
        assert_eq!(meta.author.as_deref(), Some("Melville, Herman"));
        assert_eq!(meta.language.as_deref(), Some("en"));
        assert_eq!(meta.subjects, vec!["Whales -- Fiction", "Sea stories"]);
        assert_eq!(meta.identifier.as_deref(), Some("http://www.gutenberg.org/2701"));
        assert!(!meta.is_restricted());
    }

    #[test]
    fn test_manifest_and_spine_order() {
        let package = parse_package(OPF, "OEBPS/content.opf").unwrap();
        let hrefs: Vec<&str> = package
            .spine_items()
            .iter()
            .map(|item| item.href.as_str())
            .collect();
        assert_eq!(hrefs, vec!["OEBPS/text/ch2.xhtml", "OEBPS/text/ch1.xhtml"]);
        assert_eq!(package.item("css").unwrap().href, "styles/book.css");
        assert!(!package.item("css").unwrap().is_markup());
    }

    #[test]
    fn test_resolve_href() {
        assert_eq!(resolve_href("", "ch1.xhtml"), "ch1.xhtml");
        assert_eq!(resolve_href("OPS", "./a/../b%20c.html#x"), "OPS/b c.html");
        assert_eq!(resolve_href("OEBPS", "L%27homme.xhtml"), "OEBPS/L'homme.xhtml");
        assert_eq!(
            resolve_href("OEBPS", "text/caf%C3%A9.xhtml"),
            "OEBPS/text/caf\u{e9}.xhtml"
        );
    }
}
