//! Waah Text
//!
//! Font resolution for the Waah canvas:
//! - Font loading from files and memory (ttf-parser)
//! - System catalog lookup and enumeration (fontdb)
//! - Lazy face materialization for catalog fonts
//! - Glyph outlines and text extents

pub mod descriptor;
pub mod face;
pub mod font;
pub mod library;
pub mod query;

pub use descriptor::Descriptor;
pub use face::{FaceHandle, FontData, FontFace, GlyphSink, TextExtents};
pub use font::{Font, FontOrigin};
pub use library::FontLibrary;
pub use query::{resolve_generic_family, FontQuery, FontSlant, FontWeight};
