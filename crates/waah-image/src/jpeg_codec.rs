//! JPEG scanline decode and repack
//!
//! Scanlines are pulled one at a time into a single reusable row buffer
//! and repacked into a 4-bytes-per-pixel RGB24 surface. Per pixel, byte 2
//! takes source channel 0, byte 1 channel `min(n - 1, 1)`, byte 0 channel
//! `min(n - 1, 2)`, and byte 3 is always 255. A single-channel source
//! therefore fills all three color bytes with the same value.
//!
//! The `image` JPEG decoder has no incremental scanline API, so
//! `JpegScanlines` decompresses the whole image up front and hands out
//! rows from that buffer. Peak memory is the decoded image plus the
//! surface, about twice the decoded size.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::codecs::jpeg::JpegDecoder;
use image::{ImageDecoder, ImageError};
use waah_core::{Format, Status, Surface, WaahError};

use crate::png_codec::Decoded;

/// A source of decoded scanlines
pub trait Scanlines {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Samples per pixel
    fn channels(&self) -> usize;

    /// Fill `row` (`width * channels` bytes) with the next scanline
    fn read_scanline(&mut self, row: &mut [u8]) -> std::result::Result<(), Status>;
}

/// Baseline JPEG decoded through the `image` crate's JPEG decoder
///
/// Holds the fully decompressed pixels; scanlines are slices of them.
pub struct JpegScanlines {
    width: u32,
    height: u32,
    channels: usize,
    pixels: Vec<u8>,
    next: u32,
}

impl JpegScanlines {
    /// Open and decompress a JPEG file
    pub fn open(path: &Path) -> std::result::Result<Self, Status> {
        let file = File::open(path).map_err(|e| Status::from_open_error(&e))?;
        Self::from_file(file)
    }

    /// Decompress an already opened JPEG file; the file is closed on return
    pub fn from_file(file: File) -> std::result::Result<Self, Status> {
        let decoder = JpegDecoder::new(BufReader::new(file)).map_err(image_status)?;
        let (width, height) = decoder.dimensions();
        let channels = decoder.color_type().channel_count() as usize;

        let total = usize::try_from(decoder.total_bytes()).map_err(|_| Status::NoMemory)?;
        let mut pixels = Surface::zeroed_buffer(total).map_err(|_| Status::NoMemory)?;
        decoder.read_image(&mut pixels).map_err(image_status)?;

        tracing::debug!("Decoded JPEG: {}x{}, {} channels", width, height, channels);
        Ok(Self { width, height, channels, pixels, next: 0 })
    }
}

impl Scanlines for JpegScanlines {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn read_scanline(&mut self, row: &mut [u8]) -> std::result::Result<(), Status> {
        let len = self.width as usize * self.channels;
        let start = self.next as usize * len;
        let line = self
            .pixels
            .get(start..start + len)
            .ok_or(Status::ReadError)?;
        row[..len].copy_from_slice(line);
        self.next += 1;
        Ok(())
    }
}

/// Scanlines already in memory, one tightly packed row after another
#[derive(Debug, Clone)]
pub struct MemoryScanlines {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<u8>,
    next: u32,
}

impl MemoryScanlines {
    pub fn new(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Self {
        Self { width, height, channels, data, next: 0 }
    }
}

impl Scanlines for MemoryScanlines {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn read_scanline(&mut self, row: &mut [u8]) -> std::result::Result<(), Status> {
        let len = self.width as usize * self.channels;
        let start = self.next as usize * len;
        let line = self.data.get(start..start + len).ok_or(Status::ReadError)?;
        row[..len].copy_from_slice(line);
        self.next += 1;
        Ok(())
    }
}

/// Drain `source` into an RGB24 surface
pub fn repack_scanlines<S: Scanlines + ?Sized>(source: &mut S) -> Decoded {
    let width = source.width();
    let height = source.height();
    let channels = source.channels();
    if channels == 0 {
        return Err(Status::InvalidFormat);
    }

    let stride = Surface::stride_for_width(Format::Rgb24, width);
    let len = stride
        .checked_mul(height as usize)
        .ok_or(Status::NoMemory)?;
    let mut data = Surface::zeroed_buffer(len).map_err(|_| Status::NoMemory)?;
    let mut row = Surface::zeroed_buffer(width as usize * channels).map_err(|_| Status::NoMemory)?;

    if stride > 0 {
        for out in data.chunks_exact_mut(stride) {
            source.read_scanline(&mut row)?;
            repack_row(&row, channels, out);
        }
    }

    Surface::for_data(data, Format::Rgb24, width, height, stride).map_err(|e| match e {
        WaahError::NoMemory => Status::NoMemory,
        _ => Status::InvalidSize,
    })
}

/// Decode a JPEG file into an RGB24 surface
pub fn decode_file(path: &Path) -> Decoded {
    let mut lines = JpegScanlines::open(path)?;
    repack_scanlines(&mut lines)
}

/// Decode an already opened JPEG file
pub fn decode_open_file(file: File) -> Decoded {
    let mut lines = JpegScanlines::from_file(file)?;
    repack_scanlines(&mut lines)
}

fn repack_row(row: &[u8], channels: usize, out: &mut [u8]) {
    let green = (channels - 1).min(1);
    let red = (channels - 1).min(2);
    for (src, dst) in row.chunks_exact(channels).zip(out.chunks_exact_mut(4)) {
        dst[2] = src[0];
        dst[1] = src[green];
        dst[0] = src[red];
        dst[3] = 255;
    }
}

fn image_status(err: ImageError) -> Status {
    match err {
        ImageError::IoError(e) => Status::from_read_error(&e),
        ImageError::Limits(_) => Status::NoMemory,
        other => {
            tracing::debug!("JPEG decode failed: {}", other);
            Status::ReadError
        }
    }
}
