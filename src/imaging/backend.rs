//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the codec operations the pipeline
//! needs: probe, decode and encode. Geometry and drawing are pure and live in
//! [`calculations`](super::calculations) and [`render`](super::render), so a
//! backend only deals with bytes ↔ pixels.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::{OutputFormat, Quality};
use image::{DynamicImage, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("surface unavailable: {0}")]
    Surface(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Result of a probe operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for codec backends.
///
/// `Sync` so a single backend can be shared across a rayon pool.
pub trait ImageBackend: Sync {
    /// Read pixel dimensions from the header without a full decode.
    fn probe(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode encoded bytes into a raster.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Encode a rendered surface. `quality` is ignored by lossless formats.
    fn encode(
        &self,
        surface: &RgbaImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}
