//! Waah Canvas
//!
//! Imperative 2D drawing for embedded scripts:
//! - Canvas with a save/restore graphics state stack
//! - SVG-inspired path language with arcs and convenience shapes
//! - Solid, gradient and image paint sources
//! - Glyph outlines as paths
//! - Snapshots into PNG-exportable images

pub mod canvas;
pub mod command;
pub mod options;
pub mod path;
pub mod pattern;
pub mod state;
pub mod transform;

pub use canvas::Canvas;
pub use command::PathCommand;
pub use options::CanvasOptions;
pub use path::Path;
pub use pattern::{ColorStop, Gradient, GradientKind, Pattern, SharedGradient};
pub use transform::Matrix;

pub use waah_core::{live_count, Alpha, ResourceKind, Result, Value, WaahError};
pub use waah_image::{Image, PngOutput};
pub use waah_text::{Font, FontLibrary, TextExtents};
