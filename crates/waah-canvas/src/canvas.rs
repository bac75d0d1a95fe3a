//! Canvas
//!
//! The stateful drawing context: an ARGB32 pixel surface, the current path,
//! and the graphics state with its save stack.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::rc::Rc;

use tiny_skia::{FillRule, Mask, PathStroker, Pixmap, PixmapPaint, Rect, Stroke, Transform};
use waah_core::{Alpha, Finalizer, ResourceKind, Result, Rgba, Surface, Value, WaahError};
use waah_image::Image;
use waah_text::{Font, FontLibrary, FontSlant, FontWeight, GlyphSink, TextExtents};

use crate::command::PathCommand;
use crate::options::CanvasOptions;
use crate::path::{Arc, Path, PathData, Point};
use crate::pattern::Pattern;
use crate::state::{GState, Source};
use crate::transform::Matrix;

type ReleaseHook = Box<dyn FnOnce()>;

/// Off-screen drawing context
///
/// Field order is drop order: the rendering context goes before the
/// surface it draws into.
pub struct Canvas {
    release_hook: Option<ReleaseHook>,
    state: GState,
    stack: Vec<GState>,
    path: PathData,
    pixmap: Pixmap,
    finalizer: Finalizer,
}

impl Canvas {
    /// Create a transparent canvas with default options
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_options(width, height, &CanvasOptions::default())
    }

    pub fn with_options(width: u32, height: u32, options: &CanvasOptions) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(WaahError::invalid(format!(
                "canvas dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let pixmap = Pixmap::new(width, height).ok_or(WaahError::NoMemory)?;
        tracing::debug!("Created canvas {}x{}", width, height);

        Ok(Self {
            release_hook: None,
            state: GState::new(options),
            stack: Vec::new(),
            path: PathData::new(),
            pixmap,
            finalizer: Finalizer::new(ResourceKind::Canvas),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Install a hook run once when the canvas is released
    pub fn on_release(&mut self, hook: impl FnOnce() + 'static) -> &mut Self {
        self.release_hook = Some(Box::new(hook));
        self
    }

    /// Current transform
    pub fn matrix(&self) -> Matrix {
        self.state.ctm
    }

    /// Number of open `push` levels
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn resource_kind(&self) -> ResourceKind {
        self.finalizer.kind()
    }

    /// Rendered pixels (premultiplied RGBA)
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    // ========================================================================
    // Paint sources
    // ========================================================================

    /// Solid color from 0-255 channels; alpha defaults to opaque
    pub fn color(&mut self, r: i64, g: i64, b: i64, alpha: Option<Alpha>) -> &mut Self {
        self.state.source = Source::Solid(Rgba::from_channels(r, g, b, alpha));
        self
    }

    /// Solid color with a script-typed alpha argument
    pub fn color_value(&mut self, r: i64, g: i64, b: i64, alpha: &Value) -> Result<&mut Self> {
        let alpha = Alpha::try_from(alpha)?;
        Ok(self.color(r, g, b, Some(alpha)))
    }

    /// Paint with an image whose top-left corner sits at (x, y)
    pub fn image(&mut self, image: &Image, x: f64, y: f64) -> &mut Self {
        let Some(pixmap) = image.surface().and_then(padded_pixmap) else {
            tracing::warn!("Image has no surface; paint source unchanged");
            return self;
        };
        // The one pixel transparent border keeps the pad spread from
        // smearing edge pixels outside the image
        let matrix = self.state.ctm.multiply(&Matrix::translate(x - 1.0, y - 1.0));
        self.state.source = Source::Surface { pixmap: Rc::new(pixmap), matrix };
        self
    }

    /// Paint with a gradient pattern
    ///
    /// The source references the pattern's gradient; stops added later
    /// apply to later fills. The transform is locked in now.
    pub fn pattern(&mut self, pattern: &Pattern) -> &mut Self {
        self.state.source = Source::Gradient {
            gradient: pattern.shared(),
            matrix: self.state.ctm,
        };
        self
    }

    // ========================================================================
    // Path construction
    // ========================================================================

    fn device(&self, x: f64, y: f64) -> Point {
        self.state.ctm.transform_point(x, y)
    }

    /// Current point in device space, the user origin without one
    fn device_current(&self) -> Point {
        self.path.current().unwrap_or_else(|| self.device(0.0, 0.0))
    }

    fn device_offset(&self, dx: f64, dy: f64) -> Point {
        let (cx, cy) = self.device_current();
        let (ox, oy) = self.state.ctm.transform_distance(dx, dy);
        (cx + ox, cy + oy)
    }

    /// Current point in user space; (0, 0) when there is none
    pub fn current_point(&self) -> (f64, f64) {
        match (self.path.current(), self.state.ctm.invert()) {
            (Some((x, y)), Some(inverse)) => inverse.transform_point(x, y),
            _ => (0.0, 0.0),
        }
    }

    /// Discard the current path
    pub fn new_path(&mut self) -> &mut Self {
        self.path.clear();
        self
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        let p = self.device(x, y);
        self.path.move_to(p);
        self
    }

    pub fn rel_move_to(&mut self, dx: f64, dy: f64) -> &mut Self {
        let (cx, cy) = self.current_point();
        self.move_to(cx + dx, cy + dy)
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        let p = self.device(x, y);
        self.path.line_to(p);
        self
    }

    pub fn rel_line_to(&mut self, dx: f64, dy: f64) -> &mut Self {
        let p = self.device_offset(dx, dy);
        if self.path.current().is_none() {
            self.path.move_to(self.device_current());
        }
        self.path.line_to(p);
        self
    }

    pub fn horizontal_to(&mut self, x: f64) -> &mut Self {
        let (_, cy) = self.current_point();
        self.line_to(x, cy)
    }

    pub fn rel_horizontal(&mut self, dx: f64) -> &mut Self {
        self.rel_line_to(dx, 0.0)
    }

    pub fn vertical_to(&mut self, y: f64) -> &mut Self {
        let (cx, _) = self.current_point();
        self.line_to(cx, y)
    }

    pub fn rel_vertical(&mut self, dy: f64) -> &mut Self {
        self.rel_line_to(0.0, dy)
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) -> &mut Self {
        let (c1, c2, p) = (self.device(x1, y1), self.device(x2, y2), self.device(x, y));
        self.path.curve_to(c1, c2, p);
        self
    }

    pub fn rel_curve_to(&mut self, dx1: f64, dy1: f64, dx2: f64, dy2: f64, dx: f64, dy: f64) -> &mut Self {
        let (c1, c2, p) = (
            self.device_offset(dx1, dy1),
            self.device_offset(dx2, dy2),
            self.device_offset(dx, dy),
        );
        if self.path.current().is_none() {
            self.path.move_to(self.device_current());
        }
        self.path.curve_to(c1, c2, p);
        self
    }

    /// Circular arc around an absolute center
    ///
    /// Joins the current point to the arc start with a line; `negative`
    /// sweeps clockwise in user space.
    pub fn arc_to(&mut self, cx: f64, cy: f64, radius: f64, angle1: f64, angle2: f64, negative: bool) -> &mut Self {
        if !(radius > 0.0) {
            return self.line_to(cx, cy);
        }

        let arc = Arc::new(cx, cy, radius, angle1, angle2, negative);
        self.line_to(arc.start.0, arc.start.1);
        for (c1, c2, p) in arc.curves {
            self.curve_to(c1.0, c1.1, c2.0, c2.1, p.0, p.1);
        }
        self
    }

    /// Circular arc centered at an offset from the current point
    pub fn rel_arc(&mut self, dx: f64, dy: f64, radius: f64, angle1: f64, angle2: f64, negative: bool) -> &mut Self {
        let (cx, cy) = self.current_point();
        self.arc_to(cx + dx, cy + dy, radius, angle1, angle2, negative)
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.path.close();
        self
    }

    /// Apply path commands in order
    pub fn commands(&mut self, commands: &[PathCommand]) -> &mut Self {
        for command in commands {
            command.apply(self);
        }
        self
    }

    /// Apply textual path data such as `"M 3 3 l 20 20 z"`
    ///
    /// Nothing is applied when the text is malformed.
    pub fn path_data(&mut self, data: &str) -> Result<&mut Self> {
        let commands = PathCommand::parse(data)?;
        Ok(self.commands(&commands))
    }

    /// Accepts an optional path object and does nothing with it
    pub fn path(&mut self, _path: Option<&Path>) -> &mut Self {
        self
    }

    /// Axis-aligned rectangle subpath
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.move_to(x, y)
            .rel_line_to(width, 0.0)
            .rel_line_to(0.0, height)
            .rel_line_to(-width, 0.0)
            .close_path()
    }

    pub fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.rect(x, y, width, height)
    }

    /// Ellipse fitted into a `rw` x `rh` box centered on (cx, cy)
    pub fn ellipse(&mut self, cx: f64, cy: f64, rw: f64, rh: f64) -> &mut Self {
        self.push_with(|c| {
            c.translate(cx, cy).scale(rw / 2.0, rh / 2.0).arc_to(0.0, 0.0, 1.0, 0.0, TAU, false);
        })
    }

    /// Full circle drawn as a native arc
    pub fn circle(&mut self, cx: f64, cy: f64, radius: f64) -> &mut Self {
        self.arc_to(cx, cy, radius, 0.0, TAU, false)
    }

    /// Closed rectangle with quarter-circle corners of radius `r`
    ///
    /// Replaces the current path.
    pub fn rounded_rect(&mut self, x: f64, y: f64, width: f64, height: f64, r: f64) -> &mut Self {
        self.new_path()
            .arc_to(x + width - r, y + r, r, -FRAC_PI_2, 0.0, false)
            .arc_to(x + width - r, y + height - r, r, 0.0, FRAC_PI_2, false)
            .arc_to(x + r, y + height - r, r, FRAC_PI_2, PI, false)
            .arc_to(x + r, y + r, r, PI, 3.0 * FRAC_PI_2, false)
            .close_path()
    }

    /// User-space bounding box `[x1, y1, x2, y2]` of the current path
    pub fn path_extends(&self) -> [f64; 4] {
        self.state
            .ctm
            .invert()
            .and_then(|inverse| self.path.extents(&inverse))
            .unwrap_or([0.0; 4])
    }

    // ========================================================================
    // Text
    // ========================================================================

    /// Select a font object's face, opening it on first use
    ///
    /// Keeps the previous face when the font cannot be opened.
    pub fn font(&mut self, font: &Font) -> &mut Self {
        match font.face() {
            Some(face) => self.state.font = Some(face),
            None => tracing::warn!("Font {:?} has no usable face; selection unchanged", font.name()),
        }
        self
    }

    /// Select a face by family name and modifier symbols
    ///
    /// `bold` is the only weight; slants are `normal`, `italic` and
    /// `oblique`. A lone `italic` in the weight position selects italic.
    pub fn select_font(
        &mut self,
        library: &FontLibrary,
        family: &str,
        weight: Option<&str>,
        slant: Option<&str>,
    ) -> &mut Self {
        let mut slant = slant.map_or(FontSlant::Normal, FontSlant::from_symbol);
        if weight == Some("italic") && slant == FontSlant::Normal {
            slant = FontSlant::Italic;
        }
        let weight = weight.map_or(FontWeight::NORMAL, FontWeight::from_symbol);

        match library.select(family, weight, slant) {
            Some(face) => self.state.font = Some(face),
            None => tracing::warn!("No face for {:?}; selection unchanged", family),
        }
        self
    }

    /// Font selection from script-typed arguments
    ///
    /// Only a string selector is accepted here; font objects go through
    /// [`Canvas::font`].
    pub fn font_value(
        &mut self,
        library: &FontLibrary,
        selector: &Value,
        weight: Option<&Value>,
        slant: Option<&Value>,
    ) -> Result<&mut Self> {
        let Some(family) = selector.as_str() else {
            return Err(WaahError::invalid("font must either be String or Font"));
        };
        let weight = modifier(weight)?;
        let slant = modifier(slant)?;
        Ok(self.select_font(library, family, weight, slant))
    }

    pub fn font_size(&mut self, size: f64) -> &mut Self {
        self.state.font_size = size;
        self
    }

    /// Move to (x, y) and append the text's glyph outlines to the path
    pub fn text(&mut self, x: f64, y: f64, text: &str) -> &mut Self {
        self.move_to(x, y);
        let Some(face) = &self.state.font else {
            return self;
        };

        let mut sink = DeviceSink {
            path: &mut self.path,
            ctm: self.state.ctm,
        };
        let advance = face.outline_text(text, self.state.font_size, x, y, &mut sink);
        self.move_to(x + advance, y)
    }

    /// Metrics for `text` at the current font and size
    pub fn text_extends(&self, text: &str) -> TextExtents {
        self.state
            .font
            .as_ref()
            .map(|face| face.extents(text, self.state.font_size))
            .unwrap_or_default()
    }

    // ========================================================================
    // Stroke parameters
    // ========================================================================

    pub fn line_width(&mut self, width: f64) -> &mut Self {
        self.state.line_width = width;
        self
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Fill the current path and clear it
    pub fn fill(&mut self) -> &mut Self {
        self.fill_preserve().new_path()
    }

    pub fn fill_preserve(&mut self) -> &mut Self {
        let Some(path) = self.path.to_skia() else {
            return self;
        };
        let Some(paint) = self.state.source.paint(self.state.anti_alias) else {
            return self;
        };
        self.pixmap.fill_path(
            &path,
            &paint,
            FillRule::Winding,
            Transform::identity(),
            self.state.clip.as_deref(),
        );
        self
    }

    /// Stroke the current path and clear it
    pub fn stroke(&mut self) -> &mut Self {
        self.stroke_preserve().new_path()
    }

    pub fn stroke_preserve(&mut self) -> &mut Self {
        if !(self.state.line_width > 0.0) {
            return self;
        }
        let Some(path) = self.path.to_skia() else {
            return self;
        };
        let Some(inverse) = self.state.ctm.invert() else {
            tracing::warn!("Singular transform; stroke skipped");
            return self;
        };

        // The pen lives in user space: stroke there, then map back
        let ctm = self.state.ctm.to_skia();
        let stroke = Stroke {
            width: self.state.line_width as f32,
            miter_limit: 10.0,
            ..Stroke::default()
        };
        let outline = path
            .transform(inverse.to_skia())
            .and_then(|user| user.stroke(&stroke, PathStroker::compute_resolution_scale(&ctm)))
            .and_then(|outline| outline.transform(ctm));
        let Some(outline) = outline else {
            return self;
        };
        let Some(paint) = self.state.source.paint(self.state.anti_alias) else {
            return self;
        };
        self.pixmap.fill_path(
            &outline,
            &paint,
            FillRule::Winding,
            Transform::identity(),
            self.state.clip.as_deref(),
        );
        self
    }

    /// Intersect the clip with the current path and clear it
    pub fn clip(&mut self) -> &mut Self {
        self.clip_preserve().new_path()
    }

    pub fn clip_preserve(&mut self) -> &mut Self {
        let (width, height) = (self.width(), self.height());
        let anti_alias = self.state.anti_alias;

        let Some(path) = self.path.to_skia() else {
            // Nothing inside an empty path
            self.state.clip = Mask::new(width, height).map(Rc::new);
            return self;
        };

        if let Some(mask) = self.state.clip.as_mut() {
            Rc::make_mut(mask).intersect_path(&path, FillRule::Winding, anti_alias, Transform::identity());
        } else if let Some(mut mask) = Mask::new(width, height) {
            mask.fill_path(&path, FillRule::Winding, anti_alias, Transform::identity());
            self.state.clip = Some(Rc::new(mask));
        }
        self
    }

    /// Paint the current source over the whole surface, inside the clip
    pub fn clear(&mut self) -> &mut Self {
        let Some(rect) = Rect::from_xywh(0.0, 0.0, self.width() as f32, self.height() as f32) else {
            return self;
        };
        let Some(paint) = self.state.source.paint(self.state.anti_alias) else {
            return self;
        };
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), self.state.clip.as_deref());
        self
    }

    /// Independent copy of the rendered pixels
    pub fn snapshot(&self) -> Result<Image> {
        let surface = Surface::from_pixmap(&self.pixmap)?;
        Ok(Image::from_surface(surface))
    }

    // ========================================================================
    // State stack and transforms
    // ========================================================================

    /// Save the graphics state
    pub fn push(&mut self) -> &mut Self {
        self.stack.push(self.state.clone());
        self
    }

    /// Save, run `f`, restore
    pub fn push_with(&mut self, f: impl FnOnce(&mut Canvas)) -> &mut Self {
        self.push();
        f(self);
        self.pop()
    }

    /// Restore the last saved state; a no-op on an empty stack
    pub fn pop(&mut self) -> &mut Self {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => tracing::warn!("pop without a matching push ignored"),
        }
        self
    }

    pub fn translate(&mut self, x: f64, y: f64) -> &mut Self {
        self.state.ctm = self.state.ctm.multiply(&Matrix::translate(x, y));
        self
    }

    /// Translate for the duration of `f`, then translate back
    pub fn translate_with(&mut self, x: f64, y: f64, f: impl FnOnce(&mut Canvas)) -> &mut Self {
        self.translate(x, y);
        f(self);
        self.translate(-x, -y)
    }

    pub fn scale(&mut self, x: f64, y: f64) -> &mut Self {
        self.state.ctm = self.state.ctm.multiply(&Matrix::scale(x, y));
        self
    }

    /// Scale inside a saved state for the duration of `f`
    pub fn scale_with(&mut self, x: f64, y: f64, f: impl FnOnce(&mut Canvas)) -> &mut Self {
        self.push();
        self.scale(x, y);
        f(self);
        self.pop()
    }

    /// Rotate by `angle` radians
    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        self.state.ctm = self.state.ctm.multiply(&Matrix::rotate(angle));
        self
    }

    /// Rotate for the duration of `f`, then rotate back
    pub fn rotate_with(&mut self, angle: f64, f: impl FnOnce(&mut Canvas)) -> &mut Self {
        self.rotate(angle);
        f(self);
        self.rotate(-angle)
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        if let Some(hook) = self.release_hook.take() {
            hook();
        }
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("matrix", &self.state.ctm)
            .field("depth", &self.stack.len())
            .field("segments", &self.path.segments().len())
            .finish()
    }
}

fn modifier(value: Option<&Value>) -> Result<Option<&str>> {
    match value {
        None | Some(Value::Nil) => Ok(None),
        Some(Value::Symbol(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(WaahError::invalid("font modifier must be a symbol")),
    }
}

/// Image pixels with a one pixel transparent border
fn padded_pixmap(surface: &Surface) -> Option<Pixmap> {
    let src = surface.to_pixmap()?;
    let mut padded = Pixmap::new(src.width() + 2, src.height() + 2)?;
    padded.draw_pixmap(1, 1, src.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
    Some(padded)
}

/// Appends glyph outlines to the path, mapping user space to device space
struct DeviceSink<'a> {
    path: &'a mut PathData,
    ctm: Matrix,
}

impl GlyphSink for DeviceSink<'_> {
    fn move_to(&mut self, x: f64, y: f64) {
        self.path.move_to(self.ctm.transform_point(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.line_to(self.ctm.transform_point(x, y));
    }

    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        self.path.curve_to(
            self.ctm.transform_point(x1, y1),
            self.ctm.transform_point(x2, y2),
            self.ctm.transform_point(x, y),
        );
    }

    fn close(&mut self) {
        self.path.close();
    }
}
