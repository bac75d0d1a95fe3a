//! Rendering context state
//!
//! Everything `push` saves and `pop` restores. The current path is not
//! part of it.

use std::rc::Rc;

use tiny_skia::{FilterQuality, Mask, Paint, Pixmap, SpreadMode};
use waah_core::Rgba;
use waah_text::FontFace;

use crate::options::CanvasOptions;
use crate::pattern::SharedGradient;
use crate::transform::Matrix;

/// Current paint source
///
/// Gradient and image sources lock in the transform that was active when
/// they were installed. Gradients stay live: the shader is built from the
/// pattern's current stops at paint time.
#[derive(Clone)]
pub enum Source {
    Solid(Rgba),
    Gradient { gradient: SharedGradient, matrix: Matrix },
    Surface { pixmap: Rc<Pixmap>, matrix: Matrix },
}

impl Source {
    /// Rasterizer paint; `None` when the source paints nothing
    pub fn paint(&self, anti_alias: bool) -> Option<Paint<'_>> {
        let mut paint = Paint {
            anti_alias,
            ..Paint::default()
        };
        match self {
            Source::Solid(color) => paint.set_color(color.to_skia()),
            Source::Gradient { gradient, matrix } => {
                paint.shader = gradient.borrow().shader(matrix.to_skia())?;
            }
            Source::Surface { pixmap, matrix } => {
                paint.shader = tiny_skia::Pattern::new(
                    Pixmap::as_ref(pixmap),
                    SpreadMode::Pad,
                    FilterQuality::Bilinear,
                    1.0,
                    matrix.to_skia(),
                );
            }
        }
        Some(paint)
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Solid(Rgba::BLACK)
    }
}

/// Saved graphics state
#[derive(Clone)]
pub struct GState {
    pub ctm: Matrix,
    pub source: Source,
    pub line_width: f64,
    pub font: Option<FontFace>,
    pub font_size: f64,
    pub clip: Option<Rc<Mask>>,
    pub anti_alias: bool,
}

impl GState {
    pub fn new(options: &CanvasOptions) -> Self {
        Self {
            ctm: Matrix::identity(),
            source: Source::default(),
            line_width: options.line_width,
            font: None,
            font_size: options.font_size,
            clip: None,
            anti_alias: options.anti_alias,
        }
    }
}
