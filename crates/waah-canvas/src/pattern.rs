//! Gradient patterns
//!
//! Linear and radial gradients used as a canvas paint source.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use tiny_skia::{GradientStop, LinearGradient, Point, RadialGradient, Shader, SpreadMode, Transform};
use waah_core::{Alpha, Finalizer, ResourceKind, Rgba};

/// A color stop in a gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Position in gradient (0.0 - 1.0)
    pub offset: f64,
    pub color: Rgba,
}

/// Gradient geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    Linear { x0: f64, y0: f64, x1: f64, y1: f64 },
    Radial { cx0: f64, cy0: f64, r0: f64, cx1: f64, cy1: f64, r1: f64 },
}

/// Gradient geometry plus its stops, in user space
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    kind: GradientKind,
    stops: Vec<ColorStop>,
}

impl Gradient {
    pub fn new(kind: GradientKind) -> Self {
        Self { kind, stops: Vec::new() }
    }

    pub fn kind(&self) -> GradientKind {
        self.kind
    }

    /// Stops ordered by offset; equal offsets keep insertion order
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    pub fn add_stop(&mut self, offset: f64, color: Rgba) {
        let offset = if offset.is_nan() { 0.0 } else { offset.clamp(0.0, 1.0) };
        let at = self.stops.partition_point(|s| s.offset <= offset);
        self.stops.insert(at, ColorStop { offset, color });
    }

    /// Build a shader mapping user space through `transform`
    ///
    /// `None` when there is nothing to paint (no stops, degenerate radius).
    pub fn shader(&self, transform: Transform) -> Option<Shader<'static>> {
        if self.stops.is_empty() {
            return None;
        }

        match self.kind {
            GradientKind::Linear { x0, y0, x1, y1 } => LinearGradient::new(
                point(x0, y0),
                point(x1, y1),
                self.skia_stops(|t| t),
                SpreadMode::Pad,
                transform,
            ),
            GradientKind::Radial { cx0, cy0, r0, cx1, cy1, r1 } => {
                if !(r1 > 0.0) {
                    return None;
                }
                // Inner radius is folded into the stop offsets
                let remap = |t: f64| (r0 + t * (r1 - r0)) / r1;
                RadialGradient::new(
                    point(cx0, cy0),
                    point(cx1, cy1),
                    r1 as f32,
                    self.skia_stops(remap),
                    SpreadMode::Pad,
                    transform,
                )
            }
        }
    }

    fn skia_stops(&self, remap: impl Fn(f64) -> f64) -> Vec<GradientStop> {
        self.stops
            .iter()
            .map(|s| GradientStop::new(remap(s.offset) as f32, s.color.to_skia()))
            .collect()
    }
}

fn point(x: f64, y: f64) -> Point {
    Point::from_xy(x as f32, y as f32)
}

/// Gradient shared between a pattern and the canvases painting with it
pub type SharedGradient = Rc<RefCell<Gradient>>;

/// Script-visible gradient pattern
///
/// A canvas that installs the pattern references its gradient, so stops
/// appended afterwards show up in later fills.
#[derive(Debug)]
pub struct Pattern {
    gradient: SharedGradient,
    finalizer: Finalizer,
}

impl Pattern {
    /// Linear gradient along (x0, y0) -> (x1, y1)
    pub fn linear(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(GradientKind::Linear { x0, y0, x1, y1 })
    }

    /// Radial gradient between two circles
    ///
    /// The rasterizer only knows a focal point and one radius, so a
    /// non-zero `r0` is folded into the stop offsets. That is exact when the
    /// circles share a center and approximate otherwise: colors between
    /// non-concentric circles can drift a few units per channel.
    pub fn radial(cx0: f64, cy0: f64, r0: f64, cx1: f64, cy1: f64, r1: f64) -> Self {
        Self::new(GradientKind::Radial { cx0, cy0, r0, cx1, cy1, r1 })
    }

    fn new(kind: GradientKind) -> Self {
        Self {
            gradient: Rc::new(RefCell::new(Gradient::new(kind))),
            finalizer: Finalizer::new(ResourceKind::Pattern),
        }
    }

    /// Append a color stop; channels are 0-255, alpha defaults to opaque
    pub fn color_stop(&mut self, offset: f64, r: i64, g: i64, b: i64, alpha: Option<Alpha>) -> &mut Self {
        self.gradient
            .borrow_mut()
            .add_stop(offset, Rgba::from_channels(r, g, b, alpha));
        self
    }

    pub fn gradient(&self) -> Ref<'_, Gradient> {
        self.gradient.borrow()
    }

    /// Handle to the live gradient, for installing as a paint source
    pub fn shared(&self) -> SharedGradient {
        Rc::clone(&self.gradient)
    }

    pub fn resource_kind(&self) -> ResourceKind {
        self.finalizer.kind()
    }
}
