//! The image transform pipeline and batch driver.
//!
//! ## Single image
//!
//! [`process_image`] runs one [`SourceImage`] through:
//!
//! ```text
//! decode → to_pixel_dimensions → allocate_surface → render → encode → name
//! ```
//!
//! and returns an [`OutputImage`] carrying the source's id.
//!
//! ## Batches
//!
//! [`process_batch`] drives the pipeline strictly one image at a time, so at
//! most one decoded raster and one surface are resident. After each image a
//! [`ProcessEvent`] is sent on the optional progress channel.
//!
//! A failed image does not abort the batch: the [`BatchReport`] lists the
//! successful outputs (in input order) next to the failures. Two things do
//! stop a batch early:
//!
//! - a surface acquisition failure, which means the limits or the machine
//!   cannot hold the requested canvas, so later images would fail the same way
//! - any failure when [`BatchOptions::fail_fast`] is set
//!
//! A [`CancelToken`] is checked before each image starts.
//!
//! ## Parallel Processing
//!
//! [`process_batch_parallel`] is the opt-in variant that spreads images over
//! the global [rayon](https://docs.rs/rayon) pool. The report has the same
//! shape and order; progress events arrive in completion order.

use crate::config::ResizerConfig;
use crate::imaging::{
    BackendError, ImageBackend, RustBackend, SurfaceLimits, TransformSettings, allocate_surface,
    encode_surface, render, to_pixel_dimensions,
};
use crate::naming::{UniqueNames, output_file_name};
use crate::types::{LoadError, OutputImage, SourceImage};
use image::GenericImageView;
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("{name}: cannot decode image: {reason}")]
    Decode { name: String, reason: String },
    #[error("{name}: cannot acquire drawing surface: {reason}")]
    SurfaceAcquisition { name: String, reason: String },
    #[error("{name}: cannot encode image: {reason}")]
    Encode { name: String, reason: String },
    #[error("{0}")]
    Load(#[from] LoadError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessError {
    fn from_backend(name: &str, err: BackendError) -> Self {
        let name = name.to_string();
        match err {
            BackendError::Decode(reason) => Self::Decode { name, reason },
            BackendError::Surface(reason) => Self::SurfaceAcquisition { name, reason },
            BackendError::Encode(reason) => Self::Encode { name, reason },
        }
    }

    /// Whether this failure should stop the rest of a batch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SurfaceAcquisition { .. })
    }
}

/// Pipeline settings that do not vary per run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessConfig {
    pub limits: SurfaceLimits,
    /// Output name marker, see [`output_file_name`].
    pub brand: String,
}

impl ProcessConfig {
    pub fn from_resizer_config(config: &ResizerConfig) -> Self {
        Self {
            limits: config.surface_limits(),
            brand: config.output.brand.clone(),
        }
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self::from_resizer_config(&ResizerConfig::default())
    }
}

/// Run one image through the pipeline.
pub fn process_image(
    backend: &impl ImageBackend,
    source: &SourceImage,
    settings: &TransformSettings,
    config: &ProcessConfig,
) -> Result<OutputImage, ProcessError> {
    let name = source.name.as_str();
    let fail = |e| ProcessError::from_backend(name, e);

    let decoded = backend.decode(source.bytes()).map_err(fail)?;
    let (width, height) = to_pixel_dimensions(
        settings.width,
        settings.height,
        settings.unit,
        settings.effective_dpi(),
        decoded.dimensions(),
    );
    debug!(
        "{name}: {}x{} → {width}x{height} ({})",
        decoded.width(),
        decoded.height(),
        settings.fit_mode
    );

    let mut surface = allocate_surface(width, height, &config.limits).map_err(fail)?;
    render(&mut surface, &decoded, settings.fit_mode);
    drop(decoded);

    let encoded = encode_surface(
        backend,
        &surface,
        settings.format,
        settings.quality,
        settings.target_size,
    )
    .map_err(fail)?;

    Ok(OutputImage {
        id: source.id.clone(),
        name: output_file_name(name, settings.format, &config.brand),
        width,
        height,
        format: settings.format,
        quality: encoded.quality,
        within_target: encoded.within_target,
        byte_size: encoded.bytes.len(),
        bytes: encoded.bytes,
    })
}

/// [`process_image`] with the `image`-crate backend and default config.
pub fn process_image_default(
    source: &SourceImage,
    settings: &TransformSettings,
) -> Result<OutputImage, ProcessError> {
    process_image(
        &RustBackend::new(),
        source,
        settings,
        &ProcessConfig::default(),
    )
}

// ============================================================================
// Batches
// ============================================================================

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress events sent while a batch runs. Indices are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    ImageProcessed {
        index: usize,
        total: usize,
        id: String,
        source_name: String,
        output_name: String,
        width: u32,
        height: u32,
        byte_size: usize,
        within_target: Option<bool>,
    },
    ImageFailed {
        index: usize,
        total: usize,
        id: String,
        source_name: String,
        error: String,
    },
    Cancelled {
        processed: usize,
        total: usize,
    },
}

#[derive(Debug, Default)]
pub struct BatchOptions {
    /// Stop at the first failed image.
    pub fail_fast: bool,
    pub cancel: Option<CancelToken>,
    pub progress: Option<Sender<ProcessEvent>>,
}

impl BatchOptions {
    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn send(&self, event: ProcessEvent) {
        if let Some(tx) = &self.progress {
            // Receiver gone means nobody is listening; keep processing.
            let _ = tx.send(event);
        }
    }
}

/// One image that did not produce an output.
#[derive(Debug, Serialize)]
pub struct ImageFailure {
    /// 1-based position in the input.
    pub index: usize,
    pub id: String,
    pub name: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: ProcessError,
}

impl ImageFailure {
    /// An input that could not be read and never reached the pipeline.
    pub fn unreadable(index: usize, id: impl Into<String>, path: &Path, error: LoadError) -> Self {
        Self {
            index,
            id: id.into(),
            name: path.display().to_string(),
            error: ProcessError::Load(error),
        }
    }
}

fn serialize_display<S: Serializer>(err: &ProcessError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

/// Outcome of a batch: what succeeded, what failed, what never ran.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    /// Successful outputs, in input order.
    pub outputs: Vec<OutputImage>,
    pub failures: Vec<ImageFailure>,
    /// Images never started because the batch stopped early.
    pub skipped: usize,
    pub cancelled: bool,
}

impl BatchReport {
    /// True when every input produced an output.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0 && !self.cancelled
    }

    pub fn total(&self) -> usize {
        self.outputs.len() + self.failures.len() + self.skipped
    }

    /// Fold inputs that failed to load into a report built from the
    /// readable ones.
    ///
    /// `positions[i]` is the 1-based input position of the `i`-th source the
    /// batch ran on. Failure indices are rewritten to input positions and
    /// kept sorted.
    pub fn merge_unreadable(&mut self, positions: &[usize], unreadable: Vec<ImageFailure>) {
        for failure in &mut self.failures {
            if let Some(&position) = failure
                .index
                .checked_sub(1)
                .and_then(|i| positions.get(i))
            {
                failure.index = position;
            }
        }
        self.failures.extend(unreadable);
        self.failures.sort_by_key(|f| f.index);
    }
}

fn outcome_event(
    index: usize,
    total: usize,
    source: &SourceImage,
    result: &Result<OutputImage, ProcessError>,
) -> ProcessEvent {
    match result {
        Ok(output) => ProcessEvent::ImageProcessed {
            index,
            total,
            id: source.id.clone(),
            source_name: source.name.clone(),
            output_name: output.name.clone(),
            width: output.width,
            height: output.height,
            byte_size: output.byte_size,
            within_target: output.within_target,
        },
        Err(e) => ProcessEvent::ImageFailed {
            index,
            total,
            id: source.id.clone(),
            source_name: source.name.clone(),
            error: e.to_string(),
        },
    }
}

/// Add one result to the report. Returns true when the batch must stop.
fn record(
    report: &mut BatchReport,
    fail_fast: bool,
    index: usize,
    source: &SourceImage,
    result: Result<OutputImage, ProcessError>,
) -> bool {
    match result {
        Ok(output) => {
            report.outputs.push(output);
            false
        }
        Err(error) => {
            warn!("{error}");
            let stop = fail_fast || error.is_fatal();
            report.failures.push(ImageFailure {
                index,
                id: source.id.clone(),
                name: source.name.clone(),
                error,
            });
            stop
        }
    }
}

/// Rename `output` to a name no earlier output of the batch holds.
fn claim_name(
    result: Result<OutputImage, ProcessError>,
    names: &Mutex<UniqueNames>,
) -> Result<OutputImage, ProcessError> {
    result.map(|mut output| {
        let mut names = names.lock().unwrap_or_else(PoisonError::into_inner);
        output.name = names.reserve(&output.name);
        output
    })
}

/// Process `sources` one at a time.
pub fn process_batch(
    backend: &impl ImageBackend,
    sources: &[SourceImage],
    settings: &TransformSettings,
    config: &ProcessConfig,
    options: BatchOptions,
) -> BatchReport {
    let total = sources.len();
    let names = Mutex::new(UniqueNames::new());
    let mut report = BatchReport::default();

    for (i, source) in sources.iter().enumerate() {
        if options.is_cancelled() {
            report.cancelled = true;
            report.skipped = total - i;
            options.send(ProcessEvent::Cancelled {
                processed: i,
                total,
            });
            break;
        }

        let result = claim_name(process_image(backend, source, settings, config), &names);
        options.send(outcome_event(i + 1, total, source, &result));
        if record(&mut report, options.fail_fast, i + 1, source, result) {
            report.skipped = total - i - 1;
            break;
        }
    }
    report
}

/// Process `sources` on the global rayon pool.
///
/// Images already running when the batch is stopped still finish and are
/// reported; images not yet started are counted as skipped. Duplicate output
/// names get their suffixes in completion order.
pub fn process_batch_parallel(
    backend: &impl ImageBackend,
    sources: &[SourceImage],
    settings: &TransformSettings,
    config: &ProcessConfig,
    options: BatchOptions,
) -> BatchReport {
    let total = sources.len();
    let halted = AtomicBool::new(false);
    let names = Mutex::new(UniqueNames::new());

    let results: Vec<Option<Result<OutputImage, ProcessError>>> = sources
        .par_iter()
        .enumerate()
        .map(|(i, source)| {
            if halted.load(Ordering::SeqCst) || options.is_cancelled() {
                return None;
            }
            let result = claim_name(process_image(backend, source, settings, config), &names);
            let stop = match &result {
                Ok(_) => false,
                Err(e) => options.fail_fast || e.is_fatal(),
            };
            if stop {
                halted.store(true, Ordering::SeqCst);
            }
            options.send(outcome_event(i + 1, total, source, &result));
            Some(result)
        })
        .collect();

    let mut report = BatchReport::default();
    for (i, (source, result)) in sources.iter().zip(results).enumerate() {
        match result {
            Some(result) => {
                record(&mut report, options.fail_fast, i + 1, source, result);
            }
            None => report.skipped += 1,
        }
    }

    if report.skipped > 0 && options.is_cancelled() {
        report.cancelled = true;
        options.send(ProcessEvent::Cancelled {
            processed: total - report.skipped,
            total,
        });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::{Dimensions, FitMode, OutputFormat, Quality, TargetSize, Unit};
    use std::sync::mpsc;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    /// Mock sources carry no bytes; the mock backend supplies the raster.
    fn mock_sources(n: usize) -> Vec<SourceImage> {
        (1..=n)
            .map(|i| SourceImage::new(format!("id-{i}"), format!("photo{i}.png"), Vec::new(), (1, 1)))
            .collect()
    }

    fn px_settings(width: f64, height: f64, fit_mode: FitMode) -> TransformSettings {
        TransformSettings {
            width,
            height,
            unit: Unit::Pixel,
            fit_mode,
            ..TransformSettings::default()
        }
    }

    // =========================================================================
    // process_image with mock backend
    // =========================================================================

    #[test]
    fn process_image_records_decode_then_encode() {
        let backend = MockBackend::with_dimensions(vec![dims(400, 200)]);
        let source = &mock_sources(1)[0];
        let settings = px_settings(100.0, 50.0, FitMode::Stretch);

        let output = process_image(&backend, source, &settings, &ProcessConfig::default()).unwrap();

        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Decode,
                RecordedOp::Encode {
                    width: 100,
                    height: 50,
                    format: OutputFormat::Jpeg,
                    quality: 90,
                },
            ]
        );
        assert_eq!(output.id, "id-1");
        assert_eq!(output.name, "photo1_resized_by_resizer.jpg");
        assert_eq!(output.dimensions(), (100, 50));
        assert_eq!(output.byte_size, 900);
    }

    #[test]
    fn process_image_percent_uses_decoded_size() {
        let backend = MockBackend::with_dimensions(vec![dims(1000, 500)]);
        let settings = TransformSettings {
            width: 50.0,
            height: 50.0,
            unit: Unit::Percent,
            ..TransformSettings::default()
        };
        let output =
            process_image(&backend, &mock_sources(1)[0], &settings, &ProcessConfig::default())
                .unwrap();
        assert_eq!(output.dimensions(), (500, 250));
    }

    #[test]
    fn process_image_physical_units_use_dpi() {
        let backend = MockBackend::with_dimensions(vec![dims(10, 10)]);
        let settings = TransformSettings {
            width: 10.0,
            height: 5.0,
            unit: Unit::Centimeter,
            dpi: Some(72.0),
            ..TransformSettings::default()
        };
        let output =
            process_image(&backend, &mock_sources(1)[0], &settings, &ProcessConfig::default())
                .unwrap();
        assert_eq!(output.dimensions(), (283, 142));
    }

    #[test]
    fn process_image_uses_brand_and_format() {
        let backend = MockBackend::with_dimensions(vec![dims(10, 10)]);
        let settings = TransformSettings {
            format: OutputFormat::WebP,
            ..px_settings(5.0, 5.0, FitMode::Fit)
        };
        let config = ProcessConfig {
            brand: String::new(),
            ..ProcessConfig::default()
        };
        let output = process_image(&backend, &mock_sources(1)[0], &settings, &config).unwrap();
        assert_eq!(output.name, "photo1_resized.webp");
        assert_eq!(output.format, OutputFormat::WebP);
    }

    #[test]
    fn process_image_target_size_lowers_quality() {
        let backend = MockBackend::with_dimensions(vec![dims(10, 10)]);
        let settings = TransformSettings {
            target_size: Some(TargetSize(305)),
            ..px_settings(5.0, 5.0, FitMode::Fit)
        };
        let output =
            process_image(&backend, &mock_sources(1)[0], &settings, &ProcessConfig::default())
                .unwrap();
        assert_eq!(output.quality, Quality::from_percent(30));
        assert_eq!(output.within_target, Some(true));
    }

    #[test]
    fn decode_failure_maps_to_decode_error() {
        let backend =
            MockBackend::with_results(vec![Err(BackendError::Decode("bad header".into()))]);
        let result = process_image(
            &backend,
            &mock_sources(1)[0],
            &TransformSettings::default(),
            &ProcessConfig::default(),
        );
        match result {
            Err(ProcessError::Decode { name, reason }) => {
                assert_eq!(name, "photo1.png");
                assert_eq!(reason, "bad header");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn oversized_surface_maps_to_surface_error() {
        let backend = MockBackend::with_dimensions(vec![dims(10, 10)]);
        let config = ProcessConfig {
            limits: SurfaceLimits {
                max_dimension: 100,
                max_pixels: 10_000,
            },
            ..ProcessConfig::default()
        };
        let result = process_image(
            &backend,
            &mock_sources(1)[0],
            &px_settings(500.0, 10.0, FitMode::Fit),
            &config,
        );
        let err = result.unwrap_err();
        assert!(matches!(err, ProcessError::SurfaceAcquisition { .. }));
        assert!(err.is_fatal());
        assert_eq!(backend.encode_count(), 0);
    }

    #[test]
    fn encode_failure_maps_to_encode_error() {
        let backend = MockBackend {
            fail_encode: true,
            ..MockBackend::with_dimensions(vec![dims(10, 10)])
        };
        let result = process_image(
            &backend,
            &mock_sources(1)[0],
            &px_settings(5.0, 5.0, FitMode::Fit),
            &ProcessConfig::default(),
        );
        let err = result.unwrap_err();
        assert!(matches!(err, ProcessError::Encode { .. }));
        assert!(!err.is_fatal());
    }

    // =========================================================================
    // process_batch
    // =========================================================================

    #[test]
    fn batch_preserves_order_and_ids() {
        let backend = MockBackend::with_dimensions(vec![dims(10, 20), dims(30, 40), dims(50, 60)]);
        let sources = mock_sources(3);
        let settings = px_settings(100.0, 100.0, FitMode::Stretch);

        let report = process_batch(
            &backend,
            &sources,
            &settings,
            &ProcessConfig::default(),
            BatchOptions::default(),
        );

        assert!(report.is_complete());
        let ids: Vec<&str> = report.outputs.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["id-1", "id-2", "id-3"]);
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn batch_output_names_are_unique() {
        let backend = MockBackend::with_dimensions(vec![dims(10, 10), dims(10, 10)]);
        let sources = vec![
            SourceImage::new("1", "a/photo.png", Vec::new(), (1, 1)),
            SourceImage::new("2", "b/photo.jpg", Vec::new(), (1, 1)),
        ];
        let (tx, rx) = mpsc::channel();
        let options = BatchOptions {
            progress: Some(tx),
            ..BatchOptions::default()
        };
        let report = process_batch(
            &backend,
            &sources,
            &px_settings(4.0, 4.0, FitMode::Fit),
            &ProcessConfig::default(),
            options,
        );
        let names: Vec<&str> = report.outputs.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["photo_resized_by_resizer.jpg", "photo_resized_by_resizer-2.jpg"]
        );

        let announced: Vec<String> = rx
            .iter()
            .filter_map(|event| match event {
                ProcessEvent::ImageProcessed { output_name, .. } => Some(output_name),
                _ => None,
            })
            .collect();
        assert_eq!(announced, names);
    }

    #[test]
    fn batch_reports_progress_per_image() {
        let backend = MockBackend::with_dimensions(vec![dims(10, 10), dims(10, 10)]);
        let (tx, rx) = mpsc::channel();
        let options = BatchOptions {
            progress: Some(tx),
            ..BatchOptions::default()
        };

        process_batch(
            &backend,
            &mock_sources(2),
            &px_settings(4.0, 4.0, FitMode::Fit),
            &ProcessConfig::default(),
            options,
        );

        let events: Vec<ProcessEvent> = rx.iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            ProcessEvent::ImageProcessed { index: 1, total: 2, .. }
        ));
        assert!(matches!(
            &events[1],
            ProcessEvent::ImageProcessed { index: 2, total: 2, width: 4, height: 4, .. }
        ));
    }

    #[test]
    fn batch_continues_past_failures() {
        let backend = MockBackend::with_results(vec![
            Ok(dims(10, 10)),
            Err(BackendError::Decode("corrupt".into())),
            Ok(dims(10, 10)),
        ]);
        let (tx, rx) = mpsc::channel();
        let options = BatchOptions {
            progress: Some(tx),
            ..BatchOptions::default()
        };

        let report = process_batch(
            &backend,
            &mock_sources(3),
            &px_settings(4.0, 4.0, FitMode::Fit),
            &ProcessConfig::default(),
            options,
        );

        assert_eq!(report.outputs.len(), 2);
        assert_eq!(report.outputs[1].id, "id-3");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 2);
        assert_eq!(report.failures[0].id, "id-2");
        assert!(!report.is_complete());

        let events: Vec<ProcessEvent> = rx.iter().collect();
        assert!(matches!(&events[1], ProcessEvent::ImageFailed { index: 2, .. }));
    }

    #[test]
    fn fail_fast_stops_at_first_failure() {
        let backend = MockBackend::with_results(vec![
            Err(BackendError::Decode("corrupt".into())),
            Ok(dims(10, 10)),
        ]);
        let options = BatchOptions {
            fail_fast: true,
            ..BatchOptions::default()
        };

        let report = process_batch(
            &backend,
            &mock_sources(2),
            &px_settings(4.0, 4.0, FitMode::Fit),
            &ProcessConfig::default(),
            options,
        );

        assert!(report.outputs.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.skipped, 1);
        assert!(!report.cancelled);
    }

    #[test]
    fn surface_failure_stops_batch() {
        let backend = MockBackend::with_dimensions(vec![dims(10, 10), dims(10, 10)]);
        let config = ProcessConfig {
            limits: SurfaceLimits {
                max_dimension: 50,
                max_pixels: 2_500,
            },
            ..ProcessConfig::default()
        };

        let report = process_batch(
            &backend,
            &mock_sources(2),
            &px_settings(60.0, 60.0, FitMode::Fit),
            &config,
            BatchOptions::default(),
        );

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].error.is_fatal());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn fill_of_panorama_does_not_stop_batch() {
        let backend = MockBackend::with_dimensions(vec![dims(10_000, 500), dims(10, 10)]);
        let sources = vec![
            SourceImage::new("1", "pano.png", Vec::new(), (1, 1)),
            SourceImage::new("2", "small.png", Vec::new(), (1, 1)),
        ];

        let report = process_batch(
            &backend,
            &sources,
            &px_settings(2_000.0, 2_000.0, FitMode::Fill),
            &ProcessConfig::default(),
            BatchOptions::default(),
        );

        assert!(report.is_complete(), "failures: {:?}", report.failures);
        assert_eq!(report.outputs.len(), 2);
        assert_eq!(report.outputs[0].dimensions(), (2_000, 2_000));
    }

    #[test]
    fn merge_unreadable_uses_input_positions() {
        let backend = MockBackend::with_results(vec![
            Ok(dims(10, 10)),
            Err(BackendError::Decode("corrupt".into())),
        ]);
        // Inputs 1 and 3 were unreadable; the batch ran on inputs 2 and 4.
        let mut report = process_batch(
            &backend,
            &mock_sources(2),
            &px_settings(4.0, 4.0, FitMode::Fit),
            &ProcessConfig::default(),
            BatchOptions::default(),
        );
        let missing = |index: usize, path: &str| {
            let path = Path::new(path);
            let error = LoadError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            };
            ImageFailure::unreadable(index, index.to_string(), path, error)
        };

        report.merge_unreadable(&[2, 4], vec![missing(1, "gone.png"), missing(3, "also.png")]);

        let indices: Vec<usize> = report.failures.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![1, 3, 4]);
        assert_eq!(report.failures[0].name, "gone.png");
        assert!(matches!(report.failures[0].error, ProcessError::Load(_)));
        assert!(!report.failures[0].error.is_fatal());
        assert_eq!(report.total(), 4);

        let json = serde_json::to_value(&report).unwrap();
        assert!(
            json["failures"][0]["error"]
                .as_str()
                .unwrap()
                .starts_with("cannot read gone.png")
        );
    }

    #[test]
    fn cancelled_batch_skips_remaining() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let (tx, rx) = mpsc::channel();
        let options = BatchOptions {
            cancel: Some(cancel.clone()),
            progress: Some(tx),
            ..BatchOptions::default()
        };
        let backend = MockBackend::with_dimensions(vec![dims(10, 10)]);

        let report = process_batch(
            &backend,
            &mock_sources(3),
            &px_settings(4.0, 4.0, FitMode::Fit),
            &ProcessConfig::default(),
            options,
        );

        assert!(report.cancelled);
        assert_eq!(report.skipped, 3);
        assert!(backend.get_operations().is_empty());
        let events: Vec<ProcessEvent> = rx.iter().collect();
        assert_eq!(
            events,
            vec![ProcessEvent::Cancelled {
                processed: 0,
                total: 3
            }]
        );
    }

    #[test]
    fn cancel_token_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn empty_batch_is_complete() {
        let report = process_batch(
            &MockBackend::new(),
            &[],
            &TransformSettings::default(),
            &ProcessConfig::default(),
            BatchOptions::default(),
        );
        assert!(report.is_complete());
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn report_serializes_errors_as_text() {
        let backend = MockBackend::with_results(vec![Err(BackendError::Decode("x".into()))]);
        let report = process_batch(
            &backend,
            &mock_sources(1),
            &TransformSettings::default(),
            &ProcessConfig::default(),
            BatchOptions::default(),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json["failures"][0]["error"],
            "photo1.png: cannot decode image: x"
        );
        assert_eq!(json["cancelled"], false);
    }

    // =========================================================================
    // process_batch_parallel
    // =========================================================================

    #[test]
    fn parallel_batch_keeps_input_order() {
        let backend = MockBackend::with_dimensions(vec![dims(20, 20); 8]);
        let sources = mock_sources(8);

        let report = process_batch_parallel(
            &backend,
            &sources,
            &px_settings(10.0, 10.0, FitMode::Fill),
            &ProcessConfig::default(),
            BatchOptions::default(),
        );

        assert!(report.is_complete());
        let ids: Vec<String> = report.outputs.iter().map(|o| o.id.clone()).collect();
        let expected: Vec<String> = sources.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn parallel_batch_names_are_unique() {
        let backend = MockBackend::with_dimensions(vec![dims(10, 10); 3]);
        let sources: Vec<SourceImage> = (1..=3)
            .map(|i| SourceImage::new(i.to_string(), format!("d{i}/same.png"), Vec::new(), (1, 1)))
            .collect();
        let (tx, rx) = mpsc::channel();
        let options = BatchOptions {
            progress: Some(tx),
            ..BatchOptions::default()
        };

        let report = process_batch_parallel(
            &backend,
            &sources,
            &px_settings(4.0, 4.0, FitMode::Fit),
            &ProcessConfig::default(),
            options,
        );

        let mut names: Vec<String> = report.outputs.iter().map(|o| o.name.clone()).collect();
        let mut announced: Vec<String> = rx
            .iter()
            .filter_map(|event| match event {
                ProcessEvent::ImageProcessed { output_name, .. } => Some(output_name),
                _ => None,
            })
            .collect();
        names.sort();
        announced.sort();
        assert_eq!(announced, names);
        assert_eq!(
            names,
            vec![
                "same_resized_by_resizer-2.jpg",
                "same_resized_by_resizer-3.jpg",
                "same_resized_by_resizer.jpg",
            ]
        );
    }

    #[test]
    fn parallel_batch_cancelled_before_start() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let options = BatchOptions {
            cancel: Some(cancel),
            ..BatchOptions::default()
        };
        let report = process_batch_parallel(
            &MockBackend::new(),
            &mock_sources(4),
            &TransformSettings::default(),
            &ProcessConfig::default(),
            options,
        );
        assert!(report.cancelled);
        assert_eq!(report.skipped, 4);
        assert!(report.outputs.is_empty());
    }

    // =========================================================================
    // Real backend round trip
    // =========================================================================

    fn png_source(id: &str, width: u32, height: u32) -> SourceImage {
        let raster = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 90, 200, 255]));
        let bytes = RustBackend::new()
            .encode(&raster, OutputFormat::Png, Quality::default())
            .unwrap();
        SourceImage::from_bytes(id, format!("{id}.png"), bytes).unwrap()
    }

    #[test]
    fn default_pipeline_output_decodes_to_recorded_size() {
        let source = png_source("wide", 120, 60);
        let settings = px_settings(40.0, 40.0, FitMode::Fit);

        let output = process_image_default(&source, &settings).unwrap();

        let (w, h) = crate::imaging::get_dimensions(&RustBackend::new(), &output.bytes).unwrap();
        assert_eq!((w, h), output.dimensions());
        assert_eq!((w, h), (40, 40));
        assert_eq!(output.name, "wide_resized_by_resizer.jpg");
    }

    #[test]
    fn default_pipeline_rejects_garbage() {
        let source = SourceImage::new("junk", "junk.jpg", b"not an image".to_vec(), (1, 1));
        let result = process_image_default(&source, &TransformSettings::default());
        assert!(matches!(result, Err(ProcessError::Decode { .. })));
    }
}
