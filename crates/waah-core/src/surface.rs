//! Pixel surfaces
//!
//! Pixels are premultiplied, one 32-bit word per pixel in native
//! little-endian ARGB order, so the bytes in memory read B, G, R, A.
//! Rows are `stride` bytes apart; the stride may exceed `width * 4`.

use std::fmt;

use tiny_skia::{IntSize, Pixmap};

use crate::{Result, WaahError};

/// Pixel format of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Premultiplied alpha in the high byte
    Argb32,
    /// Opaque; the high byte is unused
    Rgb24,
}

impl Format {
    /// Bits occupied by one pixel
    pub fn bits_per_pixel(self) -> usize {
        match self {
            Format::Argb32 | Format::Rgb24 => 32,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, Format::Argb32)
    }
}

/// A pixel buffer plus its geometry
#[derive(Clone)]
pub struct Surface {
    format: Format,
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl Surface {
    /// Row alignment the rasterizer expects for `width` pixels
    pub fn stride_for_width(format: Format, width: u32) -> usize {
        let bytes = (format.bits_per_pixel() * width as usize).div_ceil(8);
        (bytes + 3) & !3
    }

    /// Allocate a zeroed buffer, reporting allocation failure as `NoMemory`
    pub fn zeroed_buffer(len: usize) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| WaahError::NoMemory)?;
        data.resize(len, 0);
        Ok(data)
    }

    /// Create a transparent (or black, for RGB24) surface
    pub fn new(format: Format, width: u32, height: u32) -> Result<Self> {
        let stride = Self::stride_for_width(format, width);
        let len = stride
            .checked_mul(height as usize)
            .ok_or(WaahError::NoMemory)?;
        let data = Self::zeroed_buffer(len)?;
        Ok(Self { format, width, height, stride, data })
    }

    /// Wrap an existing buffer without copying it
    pub fn for_data(
        data: Vec<u8>,
        format: Format,
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Self> {
        if stride < Self::stride_for_width(format, width) || stride % 4 != 0 {
            return Err(WaahError::invalid(format!(
                "stride {} is invalid for width {}",
                stride, width
            )));
        }
        let needed = stride
            .checked_mul(height as usize)
            .ok_or(WaahError::NoMemory)?;
        if data.len() < needed {
            return Err(WaahError::invalid(format!(
                "buffer of {} bytes is smaller than {}",
                data.len(),
                needed
            )));
        }
        Ok(Self { format, width, height, stride, data })
    }

    /// Build from tightly packed, non-premultiplied RGBA
    pub fn from_rgba(format: Format, width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
        let mut surface = Self::new(format, width, height)?;
        let row_bytes = width as usize * 4;
        if rgba.len() < row_bytes * height as usize {
            return Err(WaahError::invalid("pixel data shorter than width * height"));
        }
        if row_bytes == 0 {
            return Ok(surface);
        }

        let stride = surface.stride;
        for (src_row, dst_row) in rgba
            .chunks_exact(row_bytes)
            .zip(surface.data.chunks_exact_mut(stride))
        {
            for (src, dst) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
                let a = if format.has_alpha() { src[3] } else { 255 };
                dst[0] = premultiply(src[2], a);
                dst[1] = premultiply(src[1], a);
                dst[2] = premultiply(src[0], a);
                dst[3] = a;
            }
        }
        Ok(surface)
    }

    /// Copy a rasterizer pixmap into a new ARGB32 surface
    pub fn from_pixmap(pixmap: &Pixmap) -> Result<Self> {
        let mut surface = Self::new(Format::Argb32, pixmap.width(), pixmap.height())?;
        let row_bytes = pixmap.width() as usize * 4;
        if row_bytes == 0 {
            return Ok(surface);
        }

        let stride = surface.stride;
        for (src_row, dst_row) in pixmap
            .data()
            .chunks_exact(row_bytes)
            .zip(surface.data.chunks_exact_mut(stride))
        {
            for (src, dst) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
                dst[0] = src[2];
                dst[1] = src[1];
                dst[2] = src[0];
                dst[3] = src[3];
            }
        }
        Ok(surface)
    }

    /// Copy into a rasterizer pixmap (premultiplied RGBA)
    ///
    /// Returns `None` for zero-sized surfaces.
    pub fn to_pixmap(&self) -> Option<Pixmap> {
        let size = IntSize::from_wh(self.width, self.height)?;
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            let row = self.row(y)?;
            for px in row.chunks_exact(4).take(self.width as usize) {
                let a = if self.format.has_alpha() { px[3] } else { 255 };
                out.extend_from_slice(&[px[2], px[1], px[0], a]);
            }
        }
        Pixmap::from_vec(out, size)
    }

    /// Tightly packed, non-premultiplied RGBA copy of the pixels
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            let Some(row) = self.row(y) else { break };
            for px in row.chunks_exact(4).take(self.width as usize) {
                out.extend_from_slice(&straight(px, self.format));
            }
        }
        out
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes of row `y`, including stride padding
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride;
        self.data.get(start..start + self.stride)
    }

    /// Raw premultiplied bytes at (x, y), in B, G, R, A order
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width {
            return None;
        }
        let row = self.row(y)?;
        let i = x as usize * 4;
        Some([row[i], row[i + 1], row[i + 2], row[i + 3]])
    }

    /// Non-premultiplied R, G, B, A at (x, y)
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let px = self.pixel(x, y)?;
        Some(straight(&px, self.format))
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish_non_exhaustive()
    }
}

fn premultiply(c: u8, a: u8) -> u8 {
    ((c as u32 * a as u32 + 127) / 255) as u8
}

fn unpremultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8
}

fn straight(px: &[u8], format: Format) -> [u8; 4] {
    if !format.has_alpha() {
        return [px[2], px[1], px[0], 255];
    }
    let a = px[3];
    [
        unpremultiply(px[2], a),
        unpremultiply(px[1], a),
        unpremultiply(px[0], a),
        a,
    ]
}
