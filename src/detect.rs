//! Format detection for EPUB and loose XHTML documents.

use crate::error::{Error, Result};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Magic bytes for ZIP archive (EPUB)
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// UTF-8 byte order mark
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Supported document format types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// EPUB 2/3 book (ZIP container with OPF package)
    Epub,
    /// A single XHTML/HTML file, treated as a one-section book
    Html,
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Epub => write!(f, "EPUB"),
            FormatType::Html => write!(f, "XHTML"),
        }
    }
}

/// Detect document format from a file path.
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<FormatType> {
    let mut file = std::fs::File::open(path)?;
    detect_format(&mut file)
}

/// Detect document format from a reader.
pub fn detect_format<R: Read + Seek>(reader: &mut R) -> Result<FormatType> {
    let mut buffer = [0u8; 64];

    reader.seek(SeekFrom::Start(0))?;
    let bytes_read = reader.read(&mut buffer)?;
    reader.seek(SeekFrom::Start(0))?;

    detect_format_from_bytes(&buffer[..bytes_read])
}

/// Detect document format from bytes.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    if data.len() < 4 {
        return Err(Error::InvalidData("Data too small".into()));
    }

    if data[..4] == ZIP_MAGIC {
        return Ok(FormatType::Epub);
    }

    let body = data.strip_prefix(&UTF8_BOM[..]).unwrap_or(data);
    let first = body.iter().find(|b| !b.is_ascii_whitespace());
    if first == Some(&b'<') {
        return Ok(FormatType::Html);
    }

    Err(Error::UnknownFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_zip_magic() {
        let data = [0x50, 0x4B, 0x03, 0x04, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(detect_format_from_bytes(&data).unwrap(), FormatType::Epub);
    }

    #[test]
    fn test_detect_xhtml_with_bom_and_whitespace() {
        let data = b"\xEF\xBB\xBF\n  <?xml version=\"1.0\"?><html/>";
        assert_eq!(detect_format_from_bytes(data).unwrap(), FormatType::Html);
    }

    #[test]
    fn test_detect_too_short() {
        assert!(matches!(
            detect_format_from_bytes(b"PK"),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_detect_unknown() {
        let data = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert!(matches!(
            detect_format_from_bytes(&data),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_from_reader_rewinds() {
        let mut cursor = std::io::Cursor::new(b"<html><body/></html>".to_vec());
        assert_eq!(detect_format(&mut cursor).unwrap(), FormatType::Html);
        assert_eq!(cursor.position(), 0);
    }
}
