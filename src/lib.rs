//! # Resizer
//!
//! Batch image resizing: hand in images, pick a target size, unit, fit mode
//! and output format, and get resized files back individually or bundled in
//! one ZIP archive.
//!
//! # Architecture: Transform Pipeline
//!
//! Every image goes through the same stages, one image at a time:
//!
//! ```text
//! 1. Decode      bytes     →  raster           (image crate)
//! 2. Convert     width/height/unit/dpi  →  pixels
//! 3. Render      raster    →  white surface    (stretch / fill / fit / none)
//! 4. Encode      surface   →  jpg / png / webp (optional byte budget)
//! 5. Bundle      outputs   →  resized_images.zip
//! ```
//!
//! The math (unit conversion, placement) is pure and lives apart from the
//! codecs, so most of the pipeline is testable without encoding anything.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Unit conversion, fit-mode placement, surface rendering, codec backend |
//! | [`process`] | Single-image pipeline and the sequential / parallel batch drivers |
//! | [`archive`] | ZIP bundling of encoded outputs |
//! | [`scan`] | Expands command-line paths into the list of input images |
//! | [`types`] | `SourceImage` in, `OutputImage` out |
//! | [`naming`] | Output file names and archive entry de-duplication |
//! | [`presets`] | Named target sizes per unit |
//! | [`config`] | `resizer.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Failures Are Per Image
//!
//! One corrupt file should not throw away a batch of good results. A batch
//! returns a [`process::BatchReport`] listing outputs and failures side by
//! side; `fail_fast` is available for callers who prefer all-or-nothing.
//!
//! ## White Background
//!
//! Surfaces start opaque white in every fit mode, so the JPEG encoder never
//! sees transparency and `fit`/`none` borders look the same in every format.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling and encoding all use the `image` crate. No
//! system libraries are needed; the binary is self-contained.

pub mod archive;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod presets;
pub mod process;
pub mod scan;
pub mod types;
