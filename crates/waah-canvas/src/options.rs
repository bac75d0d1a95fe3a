//! Canvas Configuration

/// Canvas construction options
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasOptions {
    /// Anti-alias path edges
    pub anti_alias: bool,

    /// Initial stroke width in user units
    pub line_width: f64,

    /// Initial font size in user units
    pub font_size: f64,
}

impl CanvasOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anti_alias(mut self, enabled: bool) -> Self {
        self.anti_alias = enabled;
        self
    }

    pub fn line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            anti_alias: true,
            line_width: 2.0,
            font_size: 10.0,
        }
    }
}
