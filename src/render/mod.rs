//! Plain-text and JSON rendering for conversions.

mod options;
mod text;

pub use options::RenderOptions;
pub use text::TextRenderer;

use crate::error::Result;
use crate::model::{Conversion, Metadata};
use std::io::Write;
use std::path::Path;

/// Renders a conversion to plain text.
pub fn render_text(conversion: &Conversion, options: &RenderOptions) -> String {
    TextRenderer::new(options.clone()).render(conversion)
}

/// Renders a conversion to plain text and writes to a file.
pub fn render_to_file(
    conversion: &Conversion,
    path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<()> {
    std::fs::write(path, render_text(conversion, options))?;
    Ok(())
}

/// Renders a conversion to plain text and writes to a writer.
pub fn render_to_writer<W: Write>(
    conversion: &Conversion,
    writer: &mut W,
    options: &RenderOptions,
) -> Result<()> {
    writer.write_all(render_text(conversion, options).as_bytes())?;
    Ok(())
}

/// Renders a conversion (metadata, chapters, statistics) as JSON.
pub fn render_json(conversion: &Conversion, options: &RenderOptions) -> Result<String> {
    let json = if options.pretty_json {
        serde_json::to_string_pretty(conversion)?
    } else {
        serde_json::to_string(conversion)?
    };
    Ok(json)
}

/// Writes the metadata banner to a sidecar file.
pub fn write_metadata_sidecar(metadata: &Metadata, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path, metadata.header_line())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Chapter;

    #[test]
    fn test_render_json_contains_chapters() {
        let conversion = Conversion {
            chapters: vec![Chapter::new(1, "Loomings", "Call me Ishmael.")],
            ..Default::default()
        };
        let compact = render_json(&conversion, &RenderOptions::new().compact_json()).unwrap();
        assert!(compact.contains("\"title\":\"Loomings\""));
        assert!(!compact.contains('\n'));

        let pretty = render_json(&conversion, &RenderOptions::default()).unwrap();
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_render_to_writer() {
        let conversion = Conversion {
            text: "\n***\n[ Chapter 1:  ; ]\nbody".into(),
            ..Default::default()
        };
        let mut out = Vec::new();
        render_to_writer(&conversion, &mut out, &RenderOptions::new().with_header(false)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), conversion.text);
    }
}
