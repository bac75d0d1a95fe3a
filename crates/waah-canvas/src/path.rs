//! Path recording
//!
//! The current path lives inside the canvas's rendering context. Points are
//! recorded in device space as they are appended, so later transform
//! changes do not move geometry that is already on the path.

use std::f64::consts::{FRAC_PI_2, TAU};

use waah_core::{Finalizer, ResourceKind};

use crate::transform::Matrix;

/// A device-space point
pub type Point = (f64, f64);

/// Path segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
    Close,
}

/// The rendering context's current path
#[derive(Debug, Clone, Default)]
pub struct PathData {
    segments: Vec<Segment>,
    current: Option<Point>,
    start: Option<Point>,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new subpath
    pub fn move_to(&mut self, p: Point) {
        // Consecutive moves collapse into one
        if let Some(Segment::MoveTo(last)) = self.segments.last_mut() {
            *last = p;
        } else {
            self.segments.push(Segment::MoveTo(p));
        }
        self.current = Some(p);
        self.start = Some(p);
    }

    /// Line to point; starts a subpath when there is no current point
    pub fn line_to(&mut self, p: Point) {
        if self.current.is_none() {
            self.move_to(p);
            return;
        }
        self.reopen();
        self.segments.push(Segment::LineTo(p));
        self.current = Some(p);
    }

    /// Cubic Bezier; starts at the first control point when there is no
    /// current point
    pub fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        if self.current.is_none() {
            self.move_to(c1);
        }
        self.reopen();
        self.segments.push(Segment::CurveTo(c1, c2, p));
        self.current = Some(p);
    }

    /// Close the current subpath
    pub fn close(&mut self) {
        let Some(start) = self.start else { return };
        if !matches!(self.segments.last(), Some(Segment::Close)) {
            self.segments.push(Segment::Close);
        }
        self.current = Some(start);
    }

    /// Drop every segment and the current point
    pub fn clear(&mut self) {
        self.segments.clear();
        self.current = None;
        self.start = None;
    }

    pub fn current(&self) -> Option<Point> {
        self.current
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Drawing after a close continues from the subpath start
    fn reopen(&mut self) {
        if let (Some(Segment::Close), Some(start)) = (self.segments.last(), self.start) {
            self.segments.push(Segment::MoveTo(start));
        }
    }

    /// Bounding box of the path mapped through `to_user`
    ///
    /// A trailing move contributes nothing; curves are bounded tightly.
    pub fn extents(&self, to_user: &Matrix) -> Option<[f64; 4]> {
        let mut bounds = None;
        let user = |q: Point| to_user.transform_point(q.0, q.1);

        let mut last = (0.0, 0.0);
        let mut pending: Option<Point> = None;
        for segment in &self.segments {
            if let Segment::MoveTo(p) = *segment {
                pending = Some(p);
                last = p;
                continue;
            }
            if let Some(m) = pending.take() {
                grow(&mut bounds, user(m));
            }
            match *segment {
                Segment::LineTo(p) => {
                    grow(&mut bounds, user(p));
                    last = p;
                }
                Segment::CurveTo(c1, c2, p) => {
                    // Bound in user space so extrema stay tight under rotation
                    let (p0, u1, u2, p3) = (user(last), user(c1), user(c2), user(p));
                    for t in cubic_extrema(p0.0, u1.0, u2.0, p3.0)
                        .into_iter()
                        .chain(cubic_extrema(p0.1, u1.1, u2.1, p3.1))
                        .flatten()
                    {
                        grow(
                            &mut bounds,
                            (cubic_at(p0.0, u1.0, u2.0, p3.0, t), cubic_at(p0.1, u1.1, u2.1, p3.1, t)),
                        );
                    }
                    grow(&mut bounds, p3);
                    last = p;
                }
                Segment::MoveTo(_) | Segment::Close => {}
            }
        }
        bounds
    }

    /// Build a tiny-skia path; `None` when nothing drawable was recorded
    pub fn to_skia(&self) -> Option<tiny_skia::Path> {
        let mut pb = tiny_skia::PathBuilder::new();
        for segment in &self.segments {
            match *segment {
                Segment::MoveTo((x, y)) => pb.move_to(x as f32, y as f32),
                Segment::LineTo((x, y)) => pb.line_to(x as f32, y as f32),
                Segment::CurveTo(c1, c2, p) => pb.cubic_to(
                    c1.0 as f32,
                    c1.1 as f32,
                    c2.0 as f32,
                    c2.1 as f32,
                    p.0 as f32,
                    p.1 as f32,
                ),
                Segment::Close => pb.close(),
            }
        }
        pb.finish()
    }
}

fn grow(bounds: &mut Option<[f64; 4]>, (x, y): Point) {
    let b = bounds.get_or_insert([x, y, x, y]);
    b[0] = b[0].min(x);
    b[1] = b[1].min(y);
    b[2] = b[2].max(x);
    b[3] = b[3].max(y);
}

fn cubic_at(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    mt * mt * mt * p0 + 3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t * p3
}

/// Parameters in (0, 1) where the derivative of a cubic vanishes
fn cubic_extrema(p0: f64, p1: f64, p2: f64, p3: f64) -> [Option<f64>; 2] {
    // B'(t)/3 = a t^2 + b t + c
    let a = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
    let b = 2.0 * (p0 - 2.0 * p1 + p2);
    let c = p1 - p0;
    let inside = |t: f64| (t > 0.0 && t < 1.0).then_some(t);

    if a.abs() < 1e-12 {
        if b.abs() < 1e-12 {
            return [None, None];
        }
        return [inside(-c / b), None];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return [None, None];
    }
    let sq = disc.sqrt();
    [inside((-b + sq) / (2.0 * a)), inside((-b - sq) / (2.0 * a))]
}

const MAX_FULL_TURNS: f64 = 64.0;

/// Arc in user space, split into Bezier pieces of at most 90 degrees
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub start: Point,
    pub curves: Vec<(Point, Point, Point)>,
}

impl Arc {
    /// Circular arc around (cx, cy)
    ///
    /// Angles sweep in the positive direction unless `negative` is set.
    /// The end angle is normalized so the sweep covers at most one turn
    /// past the start.
    pub fn new(cx: f64, cy: f64, radius: f64, a1: f64, a2: f64, negative: bool) -> Self {
        let mut a2 = a2;
        if !negative && a2 < a1 {
            a2 = (a2 - a1) % TAU;
            if a2 < 0.0 {
                a2 += TAU;
            }
            a2 += a1;
        } else if negative && a2 > a1 {
            a2 = (a2 - a1) % TAU;
            if a2 > 0.0 {
                a2 -= TAU;
            }
            a2 += a1;
        }

        if (a2 - a1).abs() > TAU * MAX_FULL_TURNS {
            a2 = a1 + (a2 - a1) % TAU + (a2 - a1).signum() * TAU * MAX_FULL_TURNS;
        }

        let point = |a: f64| (cx + radius * a.cos(), cy + radius * a.sin());
        let sweep = a2 - a1;
        let mut curves = Vec::new();
        if sweep != 0.0 && sweep.is_finite() {
            let pieces = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
            let step = sweep / pieces as f64;
            let k = 4.0 / 3.0 * (step / 4.0).tan() * radius;
            for i in 0..pieces {
                let t0 = a1 + step * i as f64;
                let t1 = t0 + step;
                let (s0, c0) = t0.sin_cos();
                let (s1, c1) = t1.sin_cos();
                let p0 = point(t0);
                let p3 = point(t1);
                curves.push((
                    (p0.0 - k * s0, p0.1 + k * c0),
                    (p3.0 + k * s1, p3.1 - k * c1),
                    p3,
                ));
            }
        }

        Self { start: point(a1), curves }
    }
}

/// Script-visible path handle
///
/// Paths are transient canvas state; this handle carries no geometry and
/// exists so scripts can hold path objects once they gain retained data.
#[derive(Debug)]
pub struct Path {
    finalizer: Finalizer,
}

impl Path {
    pub fn new() -> Self {
        Self {
            finalizer: Finalizer::new(ResourceKind::Path),
        }
    }

    pub fn resource_kind(&self) -> ResourceKind {
        self.finalizer.kind()
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}
