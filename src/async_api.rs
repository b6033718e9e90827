//! Async API for non-blocking document conversion.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! unepub = { version = "0.1", features = ["async"] }
//! ```

use crate::batch::{BatchOptions, BatchReport};
use crate::error::{Error, Result};
use crate::model::Outcome;
use crate::options::ConvertOptions;
use crate::FormatType;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};

fn join_error(e: tokio::task::JoinError) -> Error {
    Error::Io(std::io::Error::other(e.to_string()))
}

/// Asynchronously converts a document from a file path.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> unepub::Result<()> {
/// let options = unepub::ConvertOptions::default();
/// let outcome = unepub::async_api::convert_file("book.epub", &options).await?;
/// if let Some(conversion) = outcome.converted() {
///     println!("Chapters: {}", conversion.chapter_count());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn convert_file(path: impl AsRef<Path>, options: &ConvertOptions) -> Result<Outcome> {
    let data = fs::read(path).await?;
    convert_bytes(data, options).await
}

/// Asynchronously converts a document from bytes.
pub async fn convert_bytes(data: Vec<u8>, options: &ConvertOptions) -> Result<Outcome> {
    // Conversion is CPU-bound, so it runs on the blocking pool
    let options = options.clone();
    tokio::task::spawn_blocking(move || crate::convert_bytes(&data, &options))
        .await
        .map_err(join_error)?
}

/// Asynchronously converts a document from an async reader.
pub async fn convert_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    options: &ConvertOptions,
) -> Result<Outcome> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).await?;
    convert_bytes(data, options).await
}

/// Asynchronously converts a document to plain text with default options.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> unepub::Result<()> {
/// if let Some(text) = unepub::async_api::to_text("book.epub").await? {
///     tokio::fs::write("book.txt", text).await?;
/// }
/// # Ok(())
/// # }
/// ```
pub async fn to_text(path: impl AsRef<Path>) -> Result<Option<String>> {
    let options = ConvertOptions::default();
    let outcome = convert_file(path, &options).await?;
    Ok(outcome
        .converted()
        .map(|c| crate::render::render_text(c, &options.render)))
}

/// Asynchronously runs a batch conversion on the blocking pool.
pub async fn run_batch(options: BatchOptions) -> Result<BatchReport> {
    tokio::task::spawn_blocking(move || crate::batch::run_batch(&options))
        .await
        .map_err(join_error)?
}

/// Asynchronously detects the format of a file.
pub async fn detect_format(path: impl AsRef<Path>) -> Result<FormatType> {
    let data = fs::read(path).await?;
    crate::detect_format_from_bytes(&data)
}
