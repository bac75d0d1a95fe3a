//! Filename-suffix dispatch

use std::path::Path;

use waah_core::{Result, WaahError};

/// Formats accepted by `Image::load`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Pick a decoder from the filename suffix alone
    ///
    /// Matching is case-sensitive and the suffix must be preceded by at
    /// least one character, so `".png"` on its own is not a PNG name.
    pub fn from_filename(name: &str) -> Result<Self> {
        let name = name.as_bytes();
        let has_suffix = |suffix: &[u8]| name.len() > suffix.len() && name.ends_with(suffix);

        if has_suffix(b".png") {
            Ok(ImageFormat::Png)
        } else if has_suffix(b".jpg") || has_suffix(b".jpeg") {
            Ok(ImageFormat::Jpeg)
        } else {
            Err(WaahError::UnknownFormat(
                String::from_utf8_lossy(name).into_owned(),
            ))
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_filename(&path.to_string_lossy())
    }
}
