//! Images flowing into and out of the pipeline.
//!
//! A [`SourceImage`] is what the caller hands in; an [`OutputImage`] is what
//! comes back. Both carry the same `id` so callers can correlate results
//! with inputs regardless of ordering or failures.

use crate::imaging::{BackendError, ImageBackend, OutputFormat, Quality, RustBackend};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} is not a supported image: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: BackendError,
    },
}

/// An encoded input image with its probed pixel size.
///
/// Immutable once built; the pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub id: String,
    /// Original file name, used to derive the output name.
    pub name: String,
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl SourceImage {
    /// Build from parts without probing. `dimensions` is trusted as given.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        bytes: Vec<u8>,
        dimensions: (u32, u32),
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bytes,
            width: dimensions.0,
            height: dimensions.1,
        }
    }

    /// Build from encoded bytes, reading the pixel size from the header.
    pub fn from_bytes(
        id: impl Into<String>,
        name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, BackendError> {
        Self::probe_with(&RustBackend::new(), id, name, bytes)
    }

    /// Like [`from_bytes`](Self::from_bytes) with an explicit backend.
    pub fn probe_with(
        backend: &impl ImageBackend,
        id: impl Into<String>,
        name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, BackendError> {
        let dims = backend.probe(&bytes)?;
        Ok(Self::new(id, name, bytes, (dims.width, dims.height)))
    }

    /// Read and probe a file. The name is the file name component of `path`.
    pub fn open(id: impl Into<String>, path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self::from_bytes(id, name, bytes).map_err(|source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// An encoded result, one per successfully processed [`SourceImage`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputImage {
    /// Same as the originating `SourceImage::id`.
    pub id: String,
    /// Output file name (also the archive entry name).
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    /// Quality actually used; lower than requested after a target-size search.
    pub quality: Quality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub within_target: Option<bool>,
    pub byte_size: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl OutputImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Write the payload to `dir/name`, creating `dir` if needed.
    pub fn save(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Save every output into `dir`, carrying on past failed writes.
///
/// Returns the path and error of each output that could not be written.
pub fn save_outputs(outputs: &[OutputImage], dir: &Path) -> Vec<(PathBuf, std::io::Error)> {
    outputs
        .iter()
        .filter_map(|output| output.save(dir).err().map(|e| (dir.join(&output.name), e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use crate::imaging::backend::tests::MockBackend;
    use image::RgbaImage;
    use tempfile::TempDir;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        RustBackend::new()
            .encode(
                &RgbaImage::new(width, height),
                OutputFormat::Png,
                Quality::default(),
            )
            .unwrap()
    }

    #[test]
    fn from_bytes_probes_dimensions() {
        let bytes = png_bytes(30, 20);
        let len = bytes.len();
        let source = SourceImage::from_bytes("a", "photo.png", bytes).unwrap();
        assert_eq!(source.dimensions(), (30, 20));
        assert_eq!(source.byte_size(), len);
        assert_eq!(source.name, "photo.png");
    }

    #[test]
    fn from_bytes_rejects_non_images() {
        let result = SourceImage::from_bytes("a", "notes.txt", b"hello".to_vec());
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn probe_with_uses_given_backend() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 7,
            height: 9,
        }]);
        let source = SourceImage::probe_with(&backend, "x", "x.jpg", Vec::new()).unwrap();
        assert_eq!(source.dimensions(), (7, 9));
    }

    #[test]
    fn open_reads_file_name() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("holiday.png");
        std::fs::write(&path, png_bytes(5, 4)).unwrap();

        let source = SourceImage::open("1", &path).unwrap();
        assert_eq!(source.name, "holiday.png");
        assert_eq!(source.id, "1");
        assert_eq!(source.dimensions(), (5, 4));
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let result = SourceImage::open("1", Path::new("/nonexistent/image.png"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn output_save_writes_payload() {
        let tmp = TempDir::new().unwrap();
        let output = OutputImage {
            id: "1".into(),
            name: "a_resized.png".into(),
            width: 1,
            height: 1,
            format: OutputFormat::Png,
            quality: Quality::default(),
            within_target: None,
            byte_size: 3,
            bytes: vec![1, 2, 3],
        };
        let path = output.save(&tmp.path().join("out")).unwrap();
        assert_eq!(path, tmp.path().join("out/a_resized.png"));
        assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn output_serializes_without_payload() {
        let output = OutputImage {
            id: "1".into(),
            name: "a.jpg".into(),
            width: 2,
            height: 3,
            format: OutputFormat::Jpeg,
            quality: Quality::new(0.5),
            within_target: None,
            byte_size: 3,
            bytes: vec![1, 2, 3],
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["format"], "jpg");
        assert_eq!(json["byte_size"], 3);
        assert!(json.get("bytes").is_none());
        assert!(json.get("within_target").is_none());
    }

    #[test]
    fn save_outputs_continues_past_failed_write() {
        let tmp = TempDir::new().unwrap();
        let output = |name: &str| OutputImage {
            id: name.into(),
            name: name.into(),
            width: 1,
            height: 1,
            format: OutputFormat::Png,
            quality: Quality::default(),
            within_target: None,
            byte_size: 1,
            bytes: vec![7],
        };
        // A directory squatting on the first name makes its write fail.
        std::fs::create_dir(tmp.path().join("a.png")).unwrap();

        let failures = save_outputs(&[output("a.png"), output("b.png")], tmp.path());

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, tmp.path().join("a.png"));
        assert_eq!(std::fs::read(tmp.path().join("b.png")).unwrap(), vec![7]);
    }
}
