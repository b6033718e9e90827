//! Conversion options for document extraction.

use crate::cleanup::CleanupOptions;
use crate::markup::DEFAULT_RULE_WIDTH;
use crate::render::RenderOptions;

/// Documents whose cleaned text is shorter than this are rejected.
pub const DEFAULT_MINIMUM_OUTPUT_LENGTH: usize = 2000;

/// Options for controlling conversion behavior.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// How to handle unreadable sections.
    pub error_mode: ErrorMode,

    /// Cleanup pipeline settings.
    pub cleanup: CleanupOptions,

    /// Output rendering settings.
    pub render: RenderOptions,

    /// Cleaned texts shorter than this become [`Outcome::TooShort`](crate::Outcome::TooShort).
    pub minimum_output_length: usize,

    /// Reject books whose rights statement claims copyright.
    pub skip_restricted: bool,

    /// Width of the divider emitted for horizontal rules.
    pub rule_width: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            cleanup: CleanupOptions::default(),
            render: RenderOptions::default(),
            minimum_output_length: DEFAULT_MINIMUM_OUTPUT_LENGTH,
            skip_restricted: false,
            rule_width: DEFAULT_RULE_WIDTH,
        }
    }
}

impl ConvertOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets lenient error handling (skip unreadable sections).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Sets strict error handling (fail on any error).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Replaces the cleanup settings.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Replaces the render settings.
    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Sets the minimum accepted output length.
    pub fn with_minimum_output_length(mut self, length: usize) -> Self {
        self.minimum_output_length = length;
        self
    }

    /// Rejects books whose rights statement claims copyright.
    pub fn skip_restricted(mut self) -> Self {
        self.skip_restricted = true;
        self
    }

    /// Sets the horizontal rule divider width.
    pub fn with_rule_width(mut self, width: usize) -> Self {
        self.rule_width = width;
        self
    }

    /// Returns true if errors should be ignored where possible.
    pub fn is_lenient(&self) -> bool {
        matches!(self.error_mode, ErrorMode::Lenient)
    }

    /// Returns true if a cleaned text of `length` bytes is long enough.
    pub fn accepts_length(&self, length: usize) -> bool {
        length >= self.minimum_output_length
    }
}

/// How to handle parsing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail immediately on any error.
    #[default]
    Strict,
    /// Skip problematic sections and continue converting.
    Lenient,
}
