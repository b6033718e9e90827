//! Error types for unepub library.

use std::io;
use thiserror::Error;

/// Result type alias for unepub operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for unepub library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized.
    #[error("Unknown file format")]
    UnknownFormat,

    /// ZIP archive parsing error.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// XML parsing error in container or package documents.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Required archive entry or package part is missing.
    #[error("Missing required component: {0}")]
    MissingComponent(String),

    /// A spine item could not be read from the container.
    #[error("Cannot open section {id}: {message}")]
    Section { id: String, message: String },

    /// Archive entry is not valid UTF-8.
    #[error("Text encoding error: {0}")]
    Encoding(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}
