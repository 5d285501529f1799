//! Image processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Probe** | `image::ImageReader::into_dimensions` |
//! | **Unit conversion** | [`to_pixel_dimensions`] (pure math) |
//! | **Fit placement** | [`plan_placement`] (pure math) |
//! | **Render** | white surface + Lanczos3 resize + `imageops::overlay` |
//! | **Encode** | JPEG / PNG / lossless WebP via the `image` crate |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and placement math (unit testable)
//! - **Parameters**: Settings types describing a transform
//! - **Render**: Surface allocation and drawing
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Encoding with optional byte-budget search

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod render;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{Placement, plan_placement, to_pixel_dimensions};
pub use operations::{Encoded, encode_surface, get_dimensions};
pub use params::{
    DEFAULT_DPI, FitMode, OutputFormat, ParseError, Quality, TargetSize, TransformSettings, Unit,
};
pub use render::{SurfaceLimits, allocate_surface, render};
pub use rust_backend::RustBackend;
