//! Resizer configuration module.
//!
//! Handles loading, validating, and merging `resizer.toml`. Stock defaults
//! are overridden by the user's file, and command-line flags override both.
//!
//! ## Config File Location
//!
//! Passed with `--config <FILE>`; otherwise `resizer.toml` in the working
//! directory is used when present.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [defaults]
//! width = 1080.0            # Target width, in `unit`
//! height = 1080.0           # Target height, in `unit`
//! unit = "px"               # px | cm | mm | in | %
//! fit = "fit"               # stretch | fill | fit | none
//! format = "jpg"            # jpg | png | webp
//! quality = 0.9             # Lossy quality, 0.0 - 1.0
//! dpi = 72.0                # Pixels per inch for cm / mm / in
//! # target_size = "500kb"  # Byte budget for JPEG output
//!
//! [output]
//! directory = "resized"     # Where individual files are written
//! brand = "resizer"         # Output names: <stem>_resized_by_<brand>.<ext>
//! archive_name = "resized_images.zip"
//!
//! [limits]
//! max_dimension = 32767     # Largest surface side, in pixels
//! max_surface_pixels = 268435456
//!
//! [processing]
//! max_processes = 4         # Max parallel workers for --parallel (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [defaults]
//! format = "webp"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{
    FitMode, OutputFormat, Quality, SurfaceLimits, TargetSize, TransformSettings, Unit,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "resizer.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Resizer configuration loaded from `resizer.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizerConfig {
    /// Transform settings used when a flag is not given.
    pub defaults: DefaultsConfig,
    /// Output naming and locations.
    pub output: OutputConfig,
    /// Surface size limits.
    pub limits: LimitsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ResizerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.defaults;
        if !(d.width.is_finite() && d.width > 0.0 && d.height.is_finite() && d.height > 0.0) {
            return Err(ConfigError::Validation(
                "defaults.width and defaults.height must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&d.quality) {
            return Err(ConfigError::Validation(
                "defaults.quality must be 0.0-1.0".into(),
            ));
        }
        if !(d.dpi.is_finite() && d.dpi > 0.0) {
            return Err(ConfigError::Validation(
                "defaults.dpi must be positive".into(),
            ));
        }
        if let Some(size) = &d.target_size {
            size.parse::<TargetSize>()
                .map_err(|e| ConfigError::Validation(format!("defaults.target_size: {e}")))?;
        }
        if self.output.archive_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.archive_name must not be empty".into(),
            ));
        }
        if self.limits.max_dimension == 0 || self.limits.max_surface_pixels == 0 {
            return Err(ConfigError::Validation(
                "limits values must be non-zero".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Transform settings described by `[defaults]`.
    pub fn settings(&self) -> Result<TransformSettings, ConfigError> {
        let d = &self.defaults;
        let target_size = d
            .target_size
            .as_deref()
            .map(str::parse::<TargetSize>)
            .transpose()
            .map_err(|e| ConfigError::Validation(format!("defaults.target_size: {e}")))?;
        Ok(TransformSettings {
            width: d.width,
            height: d.height,
            unit: d.unit,
            fit_mode: d.fit,
            format: d.format,
            quality: Quality::new(d.quality),
            dpi: Some(d.dpi),
            target_size,
        })
    }

    pub fn surface_limits(&self) -> SurfaceLimits {
        SurfaceLimits {
            max_dimension: self.limits.max_dimension,
            max_pixels: self.limits.max_surface_pixels,
        }
    }
}

/// Default transform settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub width: f64,
    pub height: f64,
    pub unit: Unit,
    pub fit: FitMode,
    pub format: OutputFormat,
    /// Lossy quality, 0.0 (worst) to 1.0 (best).
    pub quality: f32,
    /// Pixels per inch for physical units.
    pub dpi: f64,
    /// Byte budget such as `"500kb"`. JPEG only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_size: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let settings = TransformSettings::default();
        Self {
            width: settings.width,
            height: settings.height,
            unit: settings.unit,
            fit: settings.fit_mode,
            format: settings.format,
            quality: settings.quality.value(),
            dpi: settings.effective_dpi(),
            target_size: None,
        }
    }
}

/// Output naming and locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory individual files are written to.
    pub directory: String,
    /// Marker in output names: `<stem>_resized_by_<brand>.<ext>`.
    /// Empty gives `<stem>_resized.<ext>`.
    pub brand: String,
    /// File name of the ZIP written by `--zip` without a path.
    pub archive_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "resized".to_string(),
            brand: "resizer".to_string(),
            archive_name: "resized_images.zip".to_string(),
        }
    }
}

/// Surface size limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Largest width or height of any surface.
    pub max_dimension: u32,
    /// Largest area of any surface.
    pub max_surface_pixels: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let limits = SurfaceLimits::default();
        Self {
            max_dimension: limits.max_dimension,
            max_surface_pixels: limits.max_pixels,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ResizerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ResizerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ResizerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path` merged over stock defaults.
///
/// `None` yields the validated stock defaults. A given path must exist.
pub fn load_config(path: Option<&Path>) -> Result<ResizerConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(base, overlay)
}

/// Find the config file to use: an explicit path, or `resizer.toml` in `dir`
/// when it exists.
pub fn discover_config(explicit: Option<&Path>, dir: &Path) -> Option<std::path::PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let candidate = dir.join(DEFAULT_CONFIG_FILE);
            candidate.exists().then_some(candidate)
        }
    }
}

/// Returns a fully-commented stock `resizer.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Resizer Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Transform defaults
# ---------------------------------------------------------------------------
[defaults]
# Target size, expressed in `unit`.
width = 1080.0
height = 1080.0

# Unit of width/height: "px", "cm", "mm", "in" or "%".
# Percent is relative to each source image's own size.
unit = "px"

# How the source is placed on the target canvas:
#   stretch - fill exactly, aspect ratio not preserved
#   fill    - cover the canvas, crop overflow
#   fit     - fit inside the canvas, white border
#   none    - original size, centered
fit = "fit"

# Output format: "jpg", "png" or "webp" (webp is lossless).
format = "jpg"

# JPEG quality, 0.0 (worst) to 1.0 (best).
quality = 0.9

# Pixels per inch, used only for cm / mm / in.
dpi = 72.0

# Byte budget for JPEG output ("1200", "500kb", "2mb"). Quality is lowered
# until the file fits.
# target_size = "500kb"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Directory individual files are written to.
directory = "resized"

# Output names are <stem>_resized_by_<brand>.<ext>; empty gives <stem>_resized.<ext>.
brand = "resizer"

# Archive file name for --zip without an explicit path.
archive_name = "resized_images.zip"

# ---------------------------------------------------------------------------
# Limits
# ---------------------------------------------------------------------------
[limits]
# Largest canvas side, in pixels.
max_dimension = 32767

# Largest canvas area, in pixels.
max_surface_pixels = 268435456

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers when running with --parallel.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
