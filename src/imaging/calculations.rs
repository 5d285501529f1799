//! Pure calculation functions for image dimensions and placement.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{FitMode, Unit};

const CM_PER_INCH: f64 = 2.54;
const MM_PER_INCH: f64 = 25.4;

/// Round a float to a pixel count, clamped to at least 1.
///
/// NaN and negative values clamp to 1; values beyond `u32::MAX` saturate.
fn to_pixels(value: f64) -> u32 {
    let rounded = value.round();
    if rounded.is_nan() || rounded < 1.0 {
        1
    } else if rounded >= u32::MAX as f64 {
        u32::MAX
    } else {
        rounded as u32
    }
}

/// Convert a target width/height in `unit` to absolute pixel dimensions.
///
/// # Arguments
/// * `width`, `height` - Target size expressed in `unit`
/// * `unit` - Unit of the target size
/// * `dpi` - Pixels per inch, only used for physical units
/// * `original` - Native pixel size of the source, only used for percent
///
/// # Returns
/// * `(width, height)` - Destination size in pixels, each at least 1
///
/// # Examples
/// ```
/// # use resizer::imaging::{to_pixel_dimensions, Unit};
/// // 10cm at 72 DPI → 283px
/// assert_eq!(to_pixel_dimensions(10.0, 10.0, Unit::Centimeter, 72.0, (1, 1)), (283, 283));
///
/// // 50% of 1000x500 → 500x250
/// assert_eq!(to_pixel_dimensions(50.0, 50.0, Unit::Percent, 72.0, (1000, 500)), (500, 250));
/// ```
pub fn to_pixel_dimensions(
    width: f64,
    height: f64,
    unit: Unit,
    dpi: f64,
    original: (u32, u32),
) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    let (w, h) = match unit {
        Unit::Pixel => (width, height),
        Unit::Percent => (
            orig_w as f64 * width / 100.0,
            orig_h as f64 * height / 100.0,
        ),
        Unit::Centimeter => (width * dpi / CM_PER_INCH, height * dpi / CM_PER_INCH),
        Unit::Millimeter => (width * dpi / MM_PER_INCH, height * dpi / MM_PER_INCH),
        Unit::Inch => (width * dpi, height * dpi),
    };
    (to_pixels(w), to_pixels(h))
}

/// Where the (scaled) source lands on the destination surface.
///
/// `x`/`y` may be negative when the source overflows the surface; the
/// overflow is cropped by the surface bounds when drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    /// Whether the placed source covers every pixel of a `dest` surface.
    pub fn covers(&self, dest: (u32, u32)) -> bool {
        self.x <= 0
            && self.y <= 0
            && self.x + self.width as i64 >= dest.0 as i64
            && self.y + self.height as i64 >= dest.1 as i64
    }
}

/// Offset that centers `inner` within `outer`, rounding toward negative infinity.
fn center_offset(outer: u32, inner: u32) -> i64 {
    (outer as i64 - inner as i64).div_euclid(2)
}

/// Compute where and how large the source is drawn for a given fit mode.
///
/// # Arguments
/// * `source` - Source dimensions (width, height)
/// * `dest` - Destination surface dimensions (width, height)
/// * `mode` - Fit policy
///
/// # Examples
/// ```
/// # use resizer::imaging::{plan_placement, FitMode, Placement};
/// // 400x200 fitted into 200x200 → 200x100 with 50px bands top and bottom
/// assert_eq!(
///     plan_placement((400, 200), (200, 200), FitMode::Fit),
///     Placement { x: 0, y: 50, width: 200, height: 100 }
/// );
/// ```
pub fn plan_placement(source: (u32, u32), dest: (u32, u32), mode: FitMode) -> Placement {
    let (src_w, src_h) = (source.0.max(1), source.1.max(1));
    let (dst_w, dst_h) = dest;

    let scaled = |scale: f64| {
        (
            to_pixels(src_w as f64 * scale),
            to_pixels(src_h as f64 * scale),
        )
    };

    let (width, height) = match mode {
        FitMode::Stretch => (dst_w, dst_h),
        FitMode::Fill => {
            let scale = (dst_w as f64 / src_w as f64).max(dst_h as f64 / src_h as f64);
            scaled(scale)
        }
        FitMode::Fit => {
            let scale = (dst_w as f64 / src_w as f64).min(dst_h as f64 / src_h as f64);
            scaled(scale)
        }
        FitMode::None => (src_w, src_h),
    };

    Placement {
        x: center_offset(dst_w, width),
        y: center_offset(dst_h, height),
        width,
        height,
    }
}
