//! PNG stream adapter
//!
//! Decoding and encoding run over `std::io` streams; the codec itself is
//! the `png` crate. In-memory input goes through [`BufferSource`], which
//! hands out whatever is left of the buffer and reports exhaustion as a
//! zero-length read.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use waah_core::{Format, Status, Surface, WaahError};

/// Result of a decode: a surface, or the status that stopped it
pub type Decoded = std::result::Result<Surface, Status>;

/// Pull-based reader over a byte buffer
#[derive(Debug, Clone)]
pub struct BufferSource<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> BufferSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }
}

impl Read for BufferSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.offset >= self.data.len() {
            return Ok(0);
        }
        let len = buf.len().min(self.data.len() - self.offset);
        buf[..len].copy_from_slice(&self.data[self.offset..self.offset + len]);
        self.offset += len;
        Ok(len)
    }
}

/// Decode a PNG file
pub fn decode_file(path: &Path) -> Decoded {
    let file = File::open(path).map_err(|e| Status::from_open_error(&e))?;
    decode_stream(BufReader::new(file))
}

/// Decode a PNG held in memory
pub fn decode_buffer(data: &[u8]) -> Decoded {
    decode_stream(BufferSource::new(data))
}

/// Decode a PNG from any byte stream
///
/// PNGs with an alpha channel become ARGB32 surfaces, the rest RGB24.
pub fn decode_stream<R: Read>(reader: R) -> Decoded {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::normalize_to_color8());

    let mut reader = decoder.read_info().map_err(decoding_status)?;
    let mut buf = Surface::zeroed_buffer(reader.output_buffer_size()).map_err(surface_status)?;
    let info = reader.next_frame(&mut buf).map_err(decoding_status)?;
    let pixels = &buf[..info.buffer_size()];

    let (format, rgba) = match info.color_type {
        ColorType::Rgba => (Format::Argb32, pixels.to_vec()),
        ColorType::Rgb => (Format::Rgb24, expand(pixels, 3, |p| [p[0], p[1], p[2], 255])),
        ColorType::GrayscaleAlpha => (Format::Argb32, expand(pixels, 2, |p| [p[0], p[0], p[0], p[1]])),
        ColorType::Grayscale => (Format::Rgb24, expand(pixels, 1, |p| [p[0], p[0], p[0], 255])),
        // normalize_to_color8 expands palettes
        ColorType::Indexed => return Err(Status::InvalidFormat),
    };

    tracing::debug!("Decoded PNG: {}x{} as {:?}", info.width, info.height, format);
    Surface::from_rgba(format, info.width, info.height, &rgba).map_err(surface_status)
}

/// Encode a surface as PNG into a file
pub fn encode_file(surface: &Surface, path: &Path) -> std::result::Result<(), Status> {
    let file = File::create(path).map_err(|e| Status::from_write_error(&e))?;
    let mut out = BufWriter::new(file);
    encode_stream(surface, &mut out)?;
    out.flush().map_err(|e| Status::from_write_error(&e))
}

/// Encode a surface as PNG into any byte sink
pub fn encode_stream<W: Write>(surface: &Surface, sink: W) -> std::result::Result<(), Status> {
    let rgba = surface.to_rgba();
    let (color, data) = if surface.format().has_alpha() {
        (ColorType::Rgba, rgba)
    } else {
        let rgb: Vec<u8> = rgba.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect();
        (ColorType::Rgb, rgb)
    };

    let mut encoder = Encoder::new(sink, surface.width(), surface.height());
    encoder.set_color(color);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder.write_header().map_err(encoding_status)?;
    writer.write_image_data(&data).map_err(encoding_status)?;
    writer.finish().map_err(encoding_status)?;

    tracing::debug!(
        "Encoded PNG: {}x{} ({} bytes of pixels)",
        surface.width(),
        surface.height(),
        data.len()
    );
    Ok(())
}

fn expand(pixels: &[u8], channels: usize, f: impl Fn(&[u8]) -> [u8; 4]) -> Vec<u8> {
    pixels.chunks_exact(channels).flat_map(f).collect()
}

fn decoding_status(err: png::DecodingError) -> Status {
    match err {
        png::DecodingError::IoError(e) => Status::from_read_error(&e),
        png::DecodingError::LimitsExceeded => Status::NoMemory,
        other => {
            tracing::debug!("PNG decode failed: {}", other);
            Status::PngError
        }
    }
}

fn encoding_status(err: png::EncodingError) -> Status {
    match err {
        png::EncodingError::IoError(e) => Status::from_write_error(&e),
        other => {
            tracing::debug!("PNG encode failed: {}", other);
            Status::PngError
        }
    }
}

fn surface_status(err: WaahError) -> Status {
    match err {
        WaahError::NoMemory => Status::NoMemory,
        _ => Status::InvalidSize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_raw(width: u32, height: u32, color: ColorType, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut encoder = Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
        writer.finish().unwrap();
        out
    }

    /// Reader that never returns more than one byte per call
    struct Trickle<'a>(BufferSource<'a>);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(1);
            self.0.read(&mut buf[..n])
        }
    }

    #[test]
    fn test_buffer_source_short_reads() {
        let data = [1u8, 2, 3, 4, 5];
        let mut source = BufferSource::new(&data);
        let mut buf = [0u8; 3];

        assert_eq!(source.read(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(source.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[4, 5]);
        assert_eq!(source.remaining(), 0);
        assert_eq!(source.read(&mut buf).unwrap(), 0);
        assert_eq!(source.read(&mut buf).unwrap(), 0);
        assert_eq!(source.offset(), 5);
    }

    #[test]
    fn test_decode_rgba() {
        let png = encode_raw(2, 1, ColorType::Rgba, &[255, 0, 0, 255, 0, 0, 255, 128]);
        let surface = decode_buffer(&png).unwrap();

        assert_eq!(surface.format(), Format::Argb32);
        assert_eq!(surface.rgba_at(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(surface.rgba_at(1, 0), Some([0, 0, 255, 128]));
    }

    #[test]
    fn test_decode_rgb_is_opaque_format() {
        let png = encode_raw(1, 2, ColorType::Rgb, &[1, 2, 3, 4, 5, 6]);
        let surface = decode_buffer(&png).unwrap();

        assert_eq!(surface.format(), Format::Rgb24);
        assert_eq!((surface.width(), surface.height()), (1, 2));
        assert_eq!(surface.rgba_at(0, 1), Some([4, 5, 6, 255]));
    }

    #[test]
    fn test_decode_grayscale() {
        let png = encode_raw(2, 1, ColorType::Grayscale, &[10, 200]);
        let surface = decode_buffer(&png).unwrap();

        assert_eq!(surface.format(), Format::Rgb24);
        assert_eq!(surface.rgba_at(1, 0), Some([200, 200, 200, 255]));
    }

    #[test]
    fn test_decode_tolerates_trickling_reader() {
        let png = encode_raw(3, 3, ColorType::Rgba, &[77, 78, 79, 255].repeat(9));
        let surface = decode_stream(Trickle(BufferSource::new(&png))).unwrap();
        assert_eq!(surface.rgba_at(2, 2), Some([77, 78, 79, 255]));
    }

    #[test]
    fn test_garbage_is_unmapped_png_error() {
        let status = decode_buffer(b"definitely not a png").unwrap_err();
        assert_eq!(status, Status::PngError);
        assert!(status.raise().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("waah-missing-input.png");
        assert_eq!(decode_file(&path).unwrap_err(), Status::FileNotFound);
    }

    #[test]
    fn test_encode_preserves_format() {
        let surface = Surface::from_rgba(Format::Rgb24, 2, 2, &[9; 16]).unwrap();
        let mut bytes = Vec::new();
        encode_stream(&surface, &mut bytes).unwrap();

        let decoded = decode_buffer(&bytes).unwrap();
        assert_eq!(decoded.format(), Format::Rgb24);
        assert_eq!(decoded.rgba_at(1, 1), Some([9, 9, 9, 255]));
    }

    #[test]
    fn test_encode_to_missing_directory() {
        let surface = Surface::new(Format::Argb32, 1, 1).unwrap();
        let path = std::env::temp_dir()
            .join("waah-no-such-dir")
            .join("out.png");
        assert_eq!(encode_file(&surface, &path).unwrap_err(), Status::WriteError);
    }
}
