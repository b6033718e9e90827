//! Rendering options for plain-text output.

/// Options for plain-text rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Prefix the text with the metadata banner line.
    pub write_header: bool,

    /// Pretty-print JSON output.
    pub pretty_json: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            write_header: true,
            pretty_json: true,
        }
    }
}

impl RenderOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the metadata banner.
    pub fn with_header(mut self, enabled: bool) -> Self {
        self.write_header = enabled;
        self
    }

    /// Emits compact JSON.
    pub fn compact_json(mut self) -> Self {
        self.pretty_json = false;
        self
    }
}
