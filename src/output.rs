//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Resize
//!
//! Each image leads with its positional index and source name; the result is
//! shown as an indented context line:
//!
//! ```text
//! 001 holiday.jpg
//!     Output: holiday_resized_by_resizer.jpg (1080x720, 245.3 KB)
//! 002 scan.txt
//!     Failed: scan.txt: cannot decode image: ...
//!
//! Resized 1 of 2 images
//! Failed
//!     002 scan.txt: cannot decode image: ...
//! ```
//!
//! ## Presets
//!
//! ```text
//! Pixels (px)
//!     A4 Size                      2480 x 3508    Document
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::Unit;
use crate::presets::Preset;
use crate::process::{BatchReport, ProcessEvent};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Human-readable byte size, 1024-based.
fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn unit_heading(unit: Unit) -> &'static str {
    match unit {
        Unit::Pixel => "Pixels (px)",
        Unit::Centimeter => "Centimeters (cm)",
        Unit::Millimeter => "Millimeters (mm)",
        Unit::Inch => "Inches (in)",
        Unit::Percent => "Percent (%)",
    }
}

/// Trim trailing zeros from a preset dimension: `1080`, `29.7`, `53.98`.
fn format_dimension(value: f64) -> String {
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

// ============================================================================
// Resize output
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::ImageProcessed {
            index,
            source_name,
            output_name,
            width,
            height,
            byte_size,
            within_target,
            ..
        } => {
            let mut lines = vec![
                format!("{} {}", format_index(*index), source_name),
                format!(
                    "    Output: {} ({}x{}, {})",
                    output_name,
                    width,
                    height,
                    format_bytes(*byte_size)
                ),
            ];
            if *within_target == Some(false) {
                lines.push("    Target size not reached".to_string());
            }
            lines
        }
        ProcessEvent::ImageFailed {
            index,
            source_name,
            error,
            ..
        } => vec![
            format!("{} {}", format_index(*index), source_name),
            format!("    Failed: {}", error),
        ],
        ProcessEvent::Cancelled { processed, total } => {
            vec![format!("Cancelled after {} of {} images", processed, total)]
        }
    }
}

/// Format the end-of-batch summary.
pub fn format_batch_summary(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!(
            "Resized {} of {}",
            report.outputs.len(),
            plural(report.total(), "image")
        ),
    ];

    if !report.failures.is_empty() {
        lines.push("Failed".to_string());
        for failure in &report.failures {
            lines.push(format!(
                "    {} {}",
                format_index(failure.index),
                failure.error
            ));
        }
    }

    if report.skipped > 0 {
        let reason = if report.cancelled {
            "cancelled"
        } else {
            "batch stopped"
        };
        lines.push(format!(
            "Skipped {} ({})",
            plural(report.skipped, "image"),
            reason
        ));
    }

    let total_bytes: usize = report.outputs.iter().map(|o| o.byte_size).sum();
    if !report.outputs.is_empty() {
        lines.push(format!("Total output: {}", format_bytes(total_bytes)));
    }
    lines
}

/// Format the "where did it go" lines after outputs are written.
pub fn format_saved(dir: Option<&Path>, archive: Option<(&Path, usize, u64)>) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(dir) = dir {
        lines.push(format!("Saved to {}/", dir.display()));
    }
    if let Some((path, entries, size)) = archive {
        lines.push(format!(
            "Archive: {} ({}, {})",
            path.display(),
            if entries == 1 {
                "1 entry".to_string()
            } else {
                format!("{entries} entries")
            },
            format_bytes(size as usize)
        ));
    }
    lines
}

/// Print a single progress event to stdout.
pub fn print_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        println!("{}", line);
    }
}

/// Print the batch summary to stdout.
pub fn print_batch_summary(report: &BatchReport) {
    for line in format_batch_summary(report) {
        println!("{}", line);
    }
}

pub fn print_saved(dir: Option<&Path>, archive: Option<(&Path, usize, u64)>) {
    for line in format_saved(dir, archive) {
        println!("{}", line);
    }
}

// ============================================================================
// Presets output
// ============================================================================

/// Format presets as a table, with a heading each time the unit changes.
pub fn format_presets<'a>(presets: impl IntoIterator<Item = &'a Preset>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<Unit> = None;

    for preset in presets {
        if current != Some(preset.unit) {
            if current.is_some() {
                lines.push(String::new());
            }
            lines.push(unit_heading(preset.unit).to_string());
            current = Some(preset.unit);
        }
        let size = format!(
            "{} x {}",
            format_dimension(preset.width),
            format_dimension(preset.height)
        );
        lines.push(format!(
            "    {:<28} {:<14} {}",
            preset.name, size, preset.category
        ));
    }
    lines
}

pub fn print_presets<'a>(presets: impl IntoIterator<Item = &'a Preset>) {
    for line in format_presets(presets) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
