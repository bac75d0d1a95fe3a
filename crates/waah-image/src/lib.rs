//! Waah Image
//!
//! Image codec pipeline for the Waah canvas:
//! - Filename-suffix dispatch (`.png`, `.jpg`, `.jpeg`)
//! - PNG decode from files, readers and memory buffers
//! - JPEG decode with scanline repacking into BGRA
//! - PNG encode to files or memory

pub mod format;
pub mod handle;
pub mod jpeg_codec;
pub mod png_codec;

pub use format::ImageFormat;
pub use handle::{DefaultLoader, Image, ImageLoader, PngOutput};
pub use jpeg_codec::{repack_scanlines, JpegScanlines, MemoryScanlines, Scanlines};
pub use png_codec::BufferSource;
