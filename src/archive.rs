//! ZIP bundling of encoded outputs.
//!
//! One Deflate entry per [`OutputImage`], named after the output. Entry
//! names must be unique inside an archive, so repeated names get a numeric
//! suffix (`a.jpg`, `a-2.jpg`, ...) via [`dedupe_names`].
//!
//! Archive failures never affect the outputs themselves; callers still hold
//! every [`OutputImage`] and can save them individually.

use crate::naming::dedupe_names;
use crate::types::OutputImage;
use log::debug;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use thiserror::Error;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Entry names the archive will use for `outputs`, in order.
pub fn entry_names(outputs: &[OutputImage]) -> Vec<String> {
    dedupe_names(outputs.iter().map(|o| o.name.as_str()))
}

fn write_entries<W: Write + Seek>(
    writer: W,
    outputs: &[OutputImage],
) -> Result<W, ArchiveError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (output, name) in outputs.iter().zip(entry_names(outputs)) {
        debug!("archiving {name} ({} bytes)", output.bytes.len());
        zip.start_file(name, options)?;
        zip.write_all(&output.bytes)?;
    }
    Ok(zip.finish()?)
}

/// Build an in-memory ZIP of `outputs`.
pub fn create_archive(outputs: &[OutputImage]) -> Result<Vec<u8>, ArchiveError> {
    let cursor = write_entries(Cursor::new(Vec::new()), outputs)?;
    Ok(cursor.into_inner())
}

/// Write a ZIP of `outputs` to `path`, creating parent directories.
pub fn write_archive(outputs: &[OutputImage], path: &Path) -> Result<(), ArchiveError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_entries(file, outputs)?;
    Ok(())
}
