//! Pure Rust codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Probe | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader::decode` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality 1–100) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//!
//! Input format is sniffed from the magic bytes, never from the file name.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{OutputFormat, Quality};
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};
use image::{RgbImage, RgbaImage};
use std::io::Cursor;

/// Input formats whose decoders are compiled in.
const INPUT_FORMATS: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

/// File extensions the CLI picks up when walking a directory.
pub fn supported_input_extensions() -> impl Iterator<Item = &'static str> {
    INPUT_FORMATS
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| BackendError::Decode(format!("cannot read header: {e}")))?;
    if reader.format().is_none() {
        return Err(BackendError::Decode("unrecognized image format".into()));
    }
    Ok(reader)
}

impl ImageBackend for RustBackend {
    fn probe(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(bytes)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        reader(bytes)?
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn encode(
        &self,
        surface: &RgbaImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let (width, height) = surface.dimensions();
        if width == 0 || height == 0 {
            return Err(BackendError::Encode(format!(
                "cannot encode {width}x{height} surface"
            )));
        }

        // Surfaces are composited onto opaque white, so alpha carries nothing.
        let rgb: RgbImage = surface.convert();
        let mut buf = Vec::new();
        let result = match format {
            OutputFormat::Jpeg => JpegEncoder::new_with_quality(&mut buf, quality.percent())
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8),
            OutputFormat::Png => {
                PngEncoder::new(&mut buf).write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
            }
            OutputFormat::WebP => WebPEncoder::new_lossless(&mut buf).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            ),
        };
        result.map_err(|e| BackendError::Encode(format!("{format}: {e}")))?;
        Ok(buf)
    }
}
