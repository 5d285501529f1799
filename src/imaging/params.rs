//! Parameter types for the transform pipeline.
//!
//! These types describe *what* to produce, not *how*. They are the interface
//! between the caller (CLI, config, or library user) and the pipeline in
//! [`process`](crate::process), which does the pixel work through a
//! [`backend`](super::backend).
//!
//! ## Types
//!
//! - [`Unit`] — unit the target width/height are expressed in.
//! - [`FitMode`] — how the source is placed on the destination surface.
//! - [`OutputFormat`] — encoder to use (JPEG, PNG, WebP).
//! - [`Quality`] — lossy encoding quality (0–1, default 0.9). Clamped on construction.
//! - [`TargetSize`] — optional byte budget for the encoded output.
//! - [`TransformSettings`] — everything above plus target dimensions and DPI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// DPI used for physical units when none is given.
pub const DEFAULT_DPI: f64 = 72.0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown unit '{0}' (expected px, cm, mm, in or %)")]
    Unit(String),
    #[error("unknown fit mode '{0}' (expected stretch, fill, fit or none)")]
    FitMode(String),
    #[error("unsupported output format '{0}' (expected jpg, jpeg, png or webp)")]
    Format(String),
    #[error("invalid target size '{0}' (examples: 1200, 500kb, 2mb)")]
    TargetSize(String),
}

/// Unit for target dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "px", alias = "pixel")]
    Pixel,
    #[serde(rename = "cm", alias = "centimeter")]
    Centimeter,
    #[serde(rename = "mm", alias = "millimeter")]
    Millimeter,
    #[serde(rename = "in", alias = "inch")]
    Inch,
    #[serde(rename = "%", alias = "percent")]
    Percent,
}

impl Unit {
    pub const ALL: [Unit; 5] = [
        Unit::Pixel,
        Unit::Centimeter,
        Unit::Millimeter,
        Unit::Inch,
        Unit::Percent,
    ];

    /// Short label used in config files and CLI flags.
    pub fn label(self) -> &'static str {
        match self {
            Unit::Pixel => "px",
            Unit::Centimeter => "cm",
            Unit::Millimeter => "mm",
            Unit::Inch => "in",
            Unit::Percent => "%",
        }
    }

    /// Physical units need a DPI to become pixels.
    pub fn is_physical(self) -> bool {
        matches!(self, Unit::Centimeter | Unit::Millimeter | Unit::Inch)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "px" | "pixel" | "pixels" => Ok(Unit::Pixel),
            "cm" | "centimeter" | "centimeters" => Ok(Unit::Centimeter),
            "mm" | "millimeter" | "millimeters" => Ok(Unit::Millimeter),
            "in" | "inch" | "inches" => Ok(Unit::Inch),
            "%" | "percent" | "pct" => Ok(Unit::Percent),
            _ => Err(ParseError::Unit(s.to_string())),
        }
    }
}

/// Placement policy for drawing the source onto a differently-sized surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Scale each axis independently to cover the surface exactly.
    Stretch,
    /// Preserve aspect ratio, cover the surface, crop the overflow.
    Fill,
    /// Preserve aspect ratio, fit inside the surface, leave a border.
    #[default]
    Fit,
    /// Native size, centered.
    None,
}

impl FitMode {
    pub fn label(self) -> &'static str {
        match self {
            FitMode::Stretch => "stretch",
            FitMode::Fill => "fill",
            FitMode::Fit => "fit",
            FitMode::None => "none",
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FitMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stretch" => Ok(FitMode::Stretch),
            "fill" | "cover" => Ok(FitMode::Fill),
            "fit" | "contain" => Ok(FitMode::Fit),
            "none" | "original" => Ok(FitMode::None),
            _ => Err(ParseError::FitMode(s.to_string())),
        }
    }
}

/// Encoded output format.
///
/// `jpeg` is accepted as an alias of `jpg`; either way files are written
/// with the `.jpg` extension (see [`OutputFormat::extension`]).
///
/// HEIC is intentionally absent: there is no pure-Rust HEIC encoder, and
/// accepting it only to emit JPEG bytes would mislabel the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "jpg", alias = "jpeg")]
    Jpeg,
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "webp")]
    WebP,
}

impl OutputFormat {
    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }

    /// Whether `quality` changes the encoded bytes.
    ///
    /// The `image` crate's WebP encoder is lossless-only.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(ParseError::Format(s.to_string())),
        }
    }
}

/// Quality setting for lossy encoding, in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Build from the 1–100 scale.
    pub fn from_percent(percent: u8) -> Self {
        Self::new(percent as f32 / 100.0)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 1–100 scale the JPEG encoder expects.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.9)
    }
}

/// Byte budget for an encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetSize(pub u64);

impl TargetSize {
    pub fn bytes(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        if b >= 1024 * 1024 && b % (1024 * 1024) == 0 {
            write!(f, "{}mb", b / (1024 * 1024))
        } else if b >= 1024 && b % 1024 == 0 {
            write!(f, "{}kb", b / 1024)
        } else {
            write!(f, "{}b", b)
        }
    }
}

impl FromStr for TargetSize {
    type Err = ParseError;

    /// Accepts a plain byte count or a number with `b`, `kb` or `mb` suffix.
    /// Fractions are allowed with a suffix (`1.5mb`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (number, multiplier) = if let Some(n) = lower.strip_suffix("mb") {
            (n, 1024.0 * 1024.0)
        } else if let Some(n) = lower.strip_suffix("kb") {
            (n, 1024.0)
        } else if let Some(n) = lower.strip_suffix('b') {
            (n, 1.0)
        } else {
            (lower.as_str(), 1.0)
        };
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| ParseError::TargetSize(s.to_string()))?;
        let bytes = (value * multiplier).round();
        if !bytes.is_finite() || bytes < 1.0 {
            return Err(ParseError::TargetSize(s.to_string()));
        }
        Ok(TargetSize(bytes as u64))
    }
}

/// Full description of one batch run's transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSettings {
    pub width: f64,
    pub height: f64,
    pub unit: Unit,
    pub fit_mode: FitMode,
    pub format: OutputFormat,
    pub quality: Quality,
    /// Only consulted for physical units. `None` means [`DEFAULT_DPI`].
    pub dpi: Option<f64>,
    pub target_size: Option<TargetSize>,
}

impl TransformSettings {
    /// DPI to use for conversion, falling back to [`DEFAULT_DPI`] for
    /// missing, zero, negative or non-finite values.
    pub fn effective_dpi(&self) -> f64 {
        match self.dpi {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => DEFAULT_DPI,
        }
    }
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            width: 1080.0,
            height: 1080.0,
            unit: Unit::Pixel,
            fit_mode: FitMode::Fit,
            format: OutputFormat::Jpeg,
            quality: Quality::default(),
            dpi: None,
            target_size: None,
        }
    }
}
