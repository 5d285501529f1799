//! Input discovery.
//!
//! Turns the paths given on the command line into the ordered list of image
//! files to process:
//!
//! - a file is taken as-is, whatever its extension (the decoder decides)
//! - a directory is walked recursively; files with a supported image
//!   extension are picked up, hidden entries are skipped
//!
//! Files found inside one directory are sorted by path, so the batch order is
//! stable across runs. Command-line order is otherwise preserved.

use crate::imaging::rust_backend::supported_input_extensions;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Input not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Whether `path` has an extension the decoder supports (case-insensitive).
pub fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    supported_input_extensions().any(|s| s == ext)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn walk_images(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = entry?;
        if entry.file_type().is_file() && is_image(entry.path()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

/// Expand `inputs` into image files, in processing order.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(walk_images(input)?);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(ScanError::NotFound(input.clone()));
        }
    }
    Ok(files)
}
