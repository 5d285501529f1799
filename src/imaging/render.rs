//! Destination surface allocation and fit-mode drawing.
//!
//! Every surface starts opaque white so formats without alpha (JPEG) never
//! see a transparent border. The part of the source that lands inside the
//! surface under its [`Placement`] is cut out, resampled to the visible
//! rectangle and alpha-composited on top.

use super::backend::BackendError;
use super::calculations::{Placement, plan_placement};
use super::params::FitMode;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

/// Surface background color.
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Upper bounds on surfaces the renderer will allocate.
///
/// Defaults match the canvas limits of mainstream browsers: 32767px per
/// side and 268,435,456 pixels of area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceLimits {
    pub max_dimension: u32,
    pub max_pixels: u64,
}

impl Default for SurfaceLimits {
    fn default() -> Self {
        Self {
            max_dimension: 32_767,
            max_pixels: 268_435_456,
        }
    }
}

impl SurfaceLimits {
    fn check(&self, width: u32, height: u32, what: &str) -> Result<(), BackendError> {
        if width > self.max_dimension || height > self.max_dimension {
            return Err(BackendError::Surface(format!(
                "{what} {width}x{height} exceeds the {}px side limit",
                self.max_dimension
            )));
        }
        let area = width as u64 * height as u64;
        if area > self.max_pixels {
            return Err(BackendError::Surface(format!(
                "{what} {width}x{height} ({area} px) exceeds the {} px area limit",
                self.max_pixels
            )));
        }
        Ok(())
    }
}

/// Allocate a `width`x`height` surface filled with [`BACKGROUND`].
///
/// Fails instead of aborting when the size is over `limits` or the
/// allocator cannot provide the buffer.
pub fn allocate_surface(
    width: u32,
    height: u32,
    limits: &SurfaceLimits,
) -> Result<RgbaImage, BackendError> {
    if width == 0 || height == 0 {
        return Err(BackendError::Surface(format!(
            "surface {width}x{height} has zero area"
        )));
    }
    limits.check(width, height, "surface")?;

    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| BackendError::Surface(format!("surface {width}x{height} overflows")))?;
    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(len).map_err(|e| {
        BackendError::Surface(format!("cannot allocate {width}x{height} surface: {e}"))
    })?;
    // Opaque white in RGBA is all 0xFF bytes.
    buf.resize(len, 0xFF);

    RgbaImage::from_raw(width, height, buf)
        .ok_or_else(|| BackendError::Surface("surface buffer size mismatch".into()))
}

/// Draw `source` onto `surface` according to `mode`.
///
/// Returns the placement that was used.
pub fn render(surface: &mut RgbaImage, source: &DynamicImage, mode: FitMode) -> Placement {
    let placement = plan_placement(source.dimensions(), surface.dimensions(), mode);
    draw(surface, source, placement);
    placement
}

/// The part of a placement that lands on the surface, in both coordinate
/// spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Clip {
    /// Top-left corner on the surface.
    dest_x: u32,
    dest_y: u32,
    dest_width: u32,
    dest_height: u32,
    /// Matching rectangle in the source.
    src_x: u32,
    src_y: u32,
    src_width: u32,
    src_height: u32,
}

/// Map one axis of the visible destination span back onto the source.
///
/// Returns `(dest_start, dest_len, src_start, src_len)`, or `None` when the
/// placement misses the surface on this axis.
fn clip_axis(offset: i64, placed: u32, dest: u32, src: u32) -> Option<(u32, u32, u32, u32)> {
    let start = offset.max(0);
    let end = (offset + placed as i64).min(dest as i64);
    if end <= start || placed == 0 || src == 0 {
        return None;
    }
    let scale = src as f64 / placed as f64;
    let src_start = (((start - offset) as f64 * scale).round() as u32).min(src - 1);
    let src_end = (((end - offset) as f64 * scale).round() as u32).clamp(src_start + 1, src);
    Some((
        start as u32,
        (end - start) as u32,
        src_start,
        src_end - src_start,
    ))
}

fn clip(placement: Placement, dest: (u32, u32), src: (u32, u32)) -> Option<Clip> {
    let (dest_x, dest_width, src_x, src_width) =
        clip_axis(placement.x, placement.width, dest.0, src.0)?;
    let (dest_y, dest_height, src_y, src_height) =
        clip_axis(placement.y, placement.height, dest.1, src.1)?;
    Some(Clip {
        dest_x,
        dest_y,
        dest_width,
        dest_height,
        src_x,
        src_y,
        src_width,
        src_height,
    })
}

/// Composite `source` onto `surface` at `placement`.
///
/// Only the part of the source that lands on the surface is cut out and
/// resampled, so the working copy is never larger than the surface.
pub fn draw(surface: &mut RgbaImage, source: &DynamicImage, placement: Placement) {
    let Some(clip) = clip(placement, surface.dimensions(), source.dimensions()) else {
        return;
    };
    let visible = source.crop_imm(clip.src_x, clip.src_y, clip.src_width, clip.src_height);
    let scaled = if (clip.src_width, clip.src_height) == (clip.dest_width, clip.dest_height) {
        visible.to_rgba8()
    } else {
        imageops::resize(
            &visible,
            clip.dest_width,
            clip.dest_height,
            FilterType::Lanczos3,
        )
    };
    imageops::overlay(surface, &scaled, clip.dest_x as i64, clip.dest_y as i64);
}
