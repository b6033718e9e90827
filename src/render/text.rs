//! Plain-text renderer.

use super::RenderOptions;
use crate::model::Conversion;

/// Renders a [`Conversion`] as chapter-banner plain text.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    options: RenderOptions,
}

impl TextRenderer {
    /// Creates a renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Renders the conversion, with the metadata banner when enabled.
    pub fn render(&self, conversion: &Conversion) -> String {
        let header = if self.options.write_header {
            conversion.metadata.header_line()
        } else {
            String::new()
        };

        let mut out = String::with_capacity(header.len() + conversion.text.len());
        out.push_str(&header);
        out.push_str(&conversion.text);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chapter, Metadata};

    fn conversion() -> Conversion {
        let chapter = Chapter::new(1, "Loomings", "Call me Ishmael.");
        Conversion {
            metadata: Metadata {
                title: Some("Moby Dick".into()),
                author: Some("Herman Melville".into()),
                language: Some("en".into()),
                subjects: vec!["Whaling -- Fiction".into()],
                ..Default::default()
            },
            text: chapter.rendered(),
            chapters: vec![chapter],
            ..Default::default()
        }
    }

    #[test]
    fn test_render_with_header() {
        let text = TextRenderer::default().render(&conversion());
        assert_eq!(
            text,
            "[ Author: Herman Melville; Title: Moby Dick; Categories: Whaling, Fiction; Language: en; ]\n\
             \n***\n[ Chapter 1: Loomings ; ]\nCall me Ishmael."
        );
    }

    #[test]
    fn test_render_without_header() {
        let renderer = TextRenderer::new(RenderOptions::new().with_header(false));
        let text = renderer.render(&conversion());
        assert!(text.starts_with("\n***\n[ Chapter 1: Loomings ; ]\n"));
    }
}
