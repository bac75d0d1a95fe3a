//! Image objects
//!
//! An [`Image`] owns at most one decoded surface. Decoding failures with a
//! mapped status raise; unmapped ones leave an image without a surface,
//! which reports a zero size and encodes to nothing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use waah_core::{Finalizer, ResourceKind, Result, Surface};

use crate::format::ImageFormat;
use crate::jpeg_codec;
use crate::png_codec::{self, Decoded};

/// Decoders used by [`Image::load_with`]
///
/// Embedders can substitute their own (for example, reading from an
/// archive) while keeping the suffix dispatch.
pub trait ImageLoader {
    fn load_png(&self, path: &Path) -> Decoded;

    fn load_jpeg(&self, path: &Path) -> Decoded;
}

/// The built-in file decoders
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLoader;

impl ImageLoader for DefaultLoader {
    fn load_png(&self, path: &Path) -> Decoded {
        png_codec::decode_file(path)
    }

    fn load_jpeg(&self, path: &Path) -> Decoded {
        jpeg_codec::decode_file(path)
    }
}

/// What `to_png` produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PngOutput {
    /// Encoded into the named file
    Written,
    /// Encoded into memory
    Bytes(Vec<u8>),
}

impl PngOutput {
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            PngOutput::Bytes(bytes) => Some(bytes),
            PngOutput::Written => None,
        }
    }
}

/// A decoded image
#[derive(Debug)]
pub struct Image {
    surface: Option<Surface>,
    finalizer: Finalizer,
}

impl Image {
    /// Load a PNG or JPEG, chosen by filename suffix
    pub fn load(path: impl AsRef<Path>) -> Result<Image> {
        Self::load_with(path, &DefaultLoader)
    }

    /// Load with caller-supplied decoders
    pub fn load_with(path: impl AsRef<Path>, loader: &dyn ImageLoader) -> Result<Image> {
        let path = path.as_ref();
        let decoded = match ImageFormat::from_path(path)? {
            ImageFormat::Png => loader.load_png(path),
            ImageFormat::Jpeg => loader.load_jpeg(path),
        };
        tracing::debug!("Loading image {}", path.display());
        Self::from_decoded(decoded)
    }

    /// Decode a PNG held in memory
    pub fn from_png_buffer(data: &[u8]) -> Result<Image> {
        Self::from_decoded(png_codec::decode_buffer(data))
    }

    /// Decode a PNG from any byte stream
    pub fn from_png_reader<R: Read>(reader: R) -> Result<Image> {
        Self::from_decoded(png_codec::decode_stream(reader))
    }

    /// Decode a JPEG from an already opened file
    pub fn from_jpeg_file(file: File) -> Result<Image> {
        Self::from_decoded(jpeg_codec::decode_open_file(file))
    }

    /// Take ownership of an existing surface
    pub fn from_surface(surface: Surface) -> Image {
        Self::new(Some(surface))
    }

    fn new(surface: Option<Surface>) -> Image {
        Image {
            surface,
            finalizer: Finalizer::new(ResourceKind::Image),
        }
    }

    fn from_decoded(decoded: Decoded) -> Result<Image> {
        match decoded {
            Ok(surface) => Ok(Self::new(Some(surface))),
            Err(status) => {
                status.raise()?;
                tracing::warn!("Image decode ended with {:?}; image has no surface", status);
                Ok(Self::new(None))
            }
        }
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Width in pixels, 0 without a surface
    pub fn width(&self) -> u32 {
        self.surface.as_ref().map_or(0, Surface::width)
    }

    /// Height in pixels, 0 without a surface
    pub fn height(&self) -> u32 {
        self.surface.as_ref().map_or(0, Surface::height)
    }

    /// Encode as PNG, to `path` when given or into memory otherwise
    ///
    /// Returns `Ok(None)` for an image that has no surface.
    pub fn to_png(&self, path: Option<&Path>) -> Result<Option<PngOutput>> {
        let Some(surface) = &self.surface else {
            return Ok(None);
        };

        let (status, output) = match path {
            Some(path) => {
                let status = png_codec::encode_file(surface, path).err();
                (status, PngOutput::Written)
            }
            None => {
                let mut bytes = Vec::with_capacity(64);
                let status = png_codec::encode_stream(surface, &mut bytes).err();
                (status, PngOutput::Bytes(bytes))
            }
        };

        if let Some(status) = status {
            status.raise()?;
        }
        Ok(Some(output))
    }

    pub fn resource_kind(&self) -> ResourceKind {
        self.finalizer.kind()
    }
}
