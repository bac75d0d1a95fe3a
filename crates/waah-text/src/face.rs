//! Font faces
//!
//! [`FaceHandle`] is an opened font file or buffer. [`FontFace`] is the
//! face the canvas draws with; it is derived from either a handle or a
//! catalog descriptor and is cheap to clone.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use ttf_parser::{Face, GlyphId, OutlineBuilder};
use waah_core::{Result, WaahError};

/// Shared font bytes
pub type FontData = Arc<dyn AsRef<[u8]> + Send + Sync>;

/// An opened face from a file or memory buffer
#[derive(Clone)]
pub struct FaceHandle {
    data: FontData,
    index: u32,
    post_script_name: Option<String>,
}

impl FaceHandle {
    /// Open the first face of a font file
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| WaahError::FontLoadFailed(format!("{}: {}", path.display(), e)))?;
        Self::from_data(Arc::new(bytes), 0)
    }

    /// Open face `index` of an in-memory font
    pub fn from_data(data: FontData, index: u32) -> Result<Self> {
        let face = Face::parse((*data).as_ref(), index)
            .map_err(|e| WaahError::FontLoadFailed(e.to_string()))?;
        let post_script_name = post_script_name(&face);
        Ok(Self { data, index, post_script_name })
    }

    pub fn post_script_name(&self) -> Option<&str> {
        self.post_script_name.as_deref()
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn data(&self) -> &FontData {
        &self.data
    }
}

impl fmt::Debug for FaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaceHandle")
            .field("index", &self.index)
            .field("post_script_name", &self.post_script_name)
            .finish_non_exhaustive()
    }
}

/// Receives glyph outlines in user-space coordinates (y down)
pub trait GlyphSink {
    fn move_to(&mut self, x: f64, y: f64);

    fn line_to(&mut self, x: f64, y: f64);

    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64);

    fn close(&mut self);
}

/// Ink and advance metrics of a string, in user space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextExtents {
    pub width: f64,
    pub height: f64,
    pub x_bearing: f64,
    pub y_bearing: f64,
    pub x_advance: f64,
    pub y_advance: f64,
}

impl TextExtents {
    /// `[width, height, x_bearing, y_bearing, x_advance, y_advance]`
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.width,
            self.height,
            self.x_bearing,
            self.y_bearing,
            self.x_advance,
            self.y_advance,
        ]
    }
}

/// A drawable face
#[derive(Clone)]
pub struct FontFace {
    data: FontData,
    index: u32,
    units_per_em: u16,
}

impl FontFace {
    /// Parse face `index` of `data`
    pub fn new(data: FontData, index: u32) -> Option<Self> {
        let units_per_em = Face::parse((*data).as_ref(), index).ok()?.units_per_em();
        Some(Self { data, index, units_per_em: units_per_em.max(1) })
    }

    pub fn from_handle(handle: &FaceHandle) -> Option<Self> {
        Self::new(handle.data.clone(), handle.index)
    }

    fn with_face<R>(&self, f: impl FnOnce(&Face<'_>) -> R) -> Option<R> {
        Face::parse((*self.data).as_ref(), self.index).ok().map(|face| f(&face))
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Append the outlines of `text` at `size`, with the baseline origin
    /// at (`x`, `y`). Returns the horizontal advance.
    pub fn outline_text(&self, text: &str, size: f64, x: f64, y: f64, sink: &mut dyn GlyphSink) -> f64 {
        let scale = size / self.units_per_em as f64;
        self.with_face(|face| {
            let mut pen = 0.0;
            for c in text.chars() {
                let glyph = face.glyph_index(c).unwrap_or(GlyphId(0));
                let mut outline = Outline {
                    sink: &mut *sink,
                    scale,
                    origin: (x + pen, y),
                    last: (x + pen, y),
                };
                face.outline_glyph(glyph, &mut outline);
                pen += face.glyph_hor_advance(glyph).unwrap_or(0) as f64 * scale;
            }
            pen
        })
        .unwrap_or(0.0)
    }

    /// Extents of `text` at `size`; no kerning or shaping is applied
    pub fn extents(&self, text: &str, size: f64) -> TextExtents {
        let scale = size / self.units_per_em as f64;
        self.with_face(|face| {
            let mut pen = 0.0;
            let mut ink: Option<(f64, f64, f64, f64)> = None;
            for c in text.chars() {
                let glyph = face.glyph_index(c).unwrap_or(GlyphId(0));
                if let Some(bbox) = face.glyph_bounding_box(glyph) {
                    let x0 = pen + bbox.x_min as f64 * scale;
                    let x1 = pen + bbox.x_max as f64 * scale;
                    let y0 = -(bbox.y_max as f64) * scale;
                    let y1 = -(bbox.y_min as f64) * scale;
                    ink = Some(match ink {
                        Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
                        None => (x0, y0, x1, y1),
                    });
                }
                pen += face.glyph_hor_advance(glyph).unwrap_or(0) as f64 * scale;
            }

            let (x0, y0, x1, y1) = ink.unwrap_or_default();
            TextExtents {
                width: x1 - x0,
                height: y1 - y0,
                x_bearing: x0,
                y_bearing: y0,
                x_advance: pen,
                y_advance: 0.0,
            }
        })
        .unwrap_or_default()
    }
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("index", &self.index)
            .field("units_per_em", &self.units_per_em)
            .finish_non_exhaustive()
    }
}

fn post_script_name(face: &Face<'_>) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
        .find_map(|name| name.to_string())
}

/// Scales font units into user space and flips y
struct Outline<'a> {
    sink: &'a mut dyn GlyphSink,
    scale: f64,
    origin: (f64, f64),
    last: (f64, f64),
}

impl Outline<'_> {
    fn map(&self, x: f32, y: f32) -> (f64, f64) {
        (
            self.origin.0 + x as f64 * self.scale,
            self.origin.1 - y as f64 * self.scale,
        )
    }
}

impl OutlineBuilder for Outline<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.sink.move_to(p.0, p.1);
        self.last = p;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.sink.line_to(p.0, p.1);
        self.last = p;
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        // degree elevation to a cubic
        let (p0, q, p) = (self.last, self.map(x1, y1), self.map(x, y));
        let c1 = (p0.0 + 2.0 / 3.0 * (q.0 - p0.0), p0.1 + 2.0 / 3.0 * (q.1 - p0.1));
        let c2 = (p.0 + 2.0 / 3.0 * (q.0 - p.0), p.1 + 2.0 / 3.0 * (q.1 - p.1));
        self.sink.curve_to(c1.0, c1.1, c2.0, c2.1, p.0, p.1);
        self.last = p;
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let c1 = self.map(x1, y1);
        let c2 = self.map(x2, y2);
        let p = self.map(x, y);
        self.sink.curve_to(c1.0, c1.1, c2.0, c2.1, p.0, p.1);
        self.last = p;
    }

    fn close(&mut self) {
        self.sink.close();
    }
}
