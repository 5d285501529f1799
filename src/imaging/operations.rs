//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take settings, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::params::{OutputFormat, Quality, TargetSize};
use image::RgbaImage;
use log::{debug, warn};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, bytes: &[u8]) -> Result<(u32, u32)> {
    let dims = backend.probe(bytes)?;
    Ok((dims.width, dims.height))
}

/// Encoded surface plus the quality that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub quality: Quality,
    /// `Some(false)` when a byte budget was requested but could not be met.
    pub within_target: Option<bool>,
}

/// Encode a surface, honoring an optional byte budget.
///
/// Without a budget, or for lossless formats, this is a single encode at
/// `quality`. With a budget and a lossy format, the highest integer quality
/// in `1..=quality` whose output fits is found by binary search. If even
/// quality 1 is over budget, the quality-1 encoding is returned.
pub fn encode_surface(
    backend: &impl ImageBackend,
    surface: &RgbaImage,
    format: OutputFormat,
    quality: Quality,
    target: Option<TargetSize>,
) -> Result<Encoded> {
    let Some(target) = target else {
        let bytes = backend.encode(surface, format, quality)?;
        return Ok(Encoded {
            bytes,
            quality,
            within_target: None,
        });
    };

    let budget = target.bytes();
    if !format.is_lossy() {
        let bytes = backend.encode(surface, format, quality)?;
        let fits = bytes.len() as u64 <= budget;
        debug!("{format} is lossless; target size {target} not searched");
        return Ok(Encoded {
            bytes,
            quality,
            within_target: Some(fits),
        });
    }

    let requested = quality.percent();
    let first = backend.encode(surface, format, quality)?;
    if first.len() as u64 <= budget {
        return Ok(Encoded {
            bytes: first,
            quality,
            within_target: Some(true),
        });
    }

    let mut best: Option<(u8, Vec<u8>)> = None;
    let mut lowest: Option<(u8, Vec<u8>)> = None;
    let (mut lo, mut hi) = (1u8, requested.saturating_sub(1));
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        let bytes = backend.encode(surface, format, Quality::from_percent(mid))?;
        debug!("quality {mid}: {} bytes (budget {budget})", bytes.len());
        if bytes.len() as u64 <= budget {
            best = Some((mid, bytes));
            lo = mid + 1;
        } else {
            if lowest.as_ref().is_none_or(|(q, _)| mid < *q) {
                lowest = Some((mid, bytes));
            }
            hi = mid - 1;
        }
    }

    if let Some((q, bytes)) = best {
        return Ok(Encoded {
            bytes,
            quality: Quality::from_percent(q),
            within_target: Some(true),
        });
    }

    let bytes = match lowest {
        Some((1, bytes)) => bytes,
        _ if requested == 1 => first,
        _ => backend.encode(surface, format, Quality::from_percent(1))?,
    };
    warn!(
        "target size {target} unreachable; smallest {format} encoding is {} bytes",
        bytes.len()
    );
    Ok(Encoded {
        bytes,
        quality: Quality::from_percent(1),
        within_target: Some(false),
    })
}
