use clap::{Parser, Subcommand};
use resizer::imaging::{FitMode, OutputFormat, Quality, RustBackend, TargetSize, Unit};
use resizer::process::{
    BatchOptions, ImageFailure, ProcessConfig, process_batch, process_batch_parallel,
};
use resizer::types::{SourceImage, save_outputs};
use resizer::{archive, config, output, presets, scan};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resizer")]
#[command(about = "Batch image resizer")]
#[command(long_about = "\
Batch image resizer

Resize images to a target size given in pixels, centimeters, millimeters,
inches or percent of the original, place them with one of four fit modes,
and save them as JPEG, PNG or WebP, individually or bundled in a ZIP.

Fit modes:
  stretch   fill the canvas exactly, aspect ratio not preserved
  fill      cover the canvas, crop the overflow
  fit       fit inside the canvas, white border
  none      keep the original size, centered

Settings not given as flags come from resizer.toml (see 'resizer gen-config').")]
#[command(version)]
struct Cli {
    /// Config file (default: ./resizer.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize images and save them to a directory and/or a ZIP archive
    Resize(ResizeArgs),
    /// List named target sizes
    Presets {
        /// Only presets in this unit (px, cm, mm, in, %)
        #[arg(long)]
        unit: Option<Unit>,
        /// Only the short list of common sizes
        #[arg(long)]
        basic: bool,
    },
    /// Print a stock resizer.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ResizeArgs {
    /// Image files or directories to resize
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Target width, in --unit
    #[arg(long)]
    width: Option<f64>,

    /// Target height, in --unit
    #[arg(long)]
    height: Option<f64>,

    /// Unit of width and height: px, cm, mm, in, %
    #[arg(long)]
    unit: Option<Unit>,

    /// Fit mode: stretch, fill, fit, none
    #[arg(long)]
    fit: Option<FitMode>,

    /// Output format: jpg, png, webp
    #[arg(long)]
    format: Option<OutputFormat>,

    /// JPEG quality, 0.0 to 1.0
    #[arg(long, value_parser = parse_quality)]
    quality: Option<Quality>,

    /// Pixels per inch for cm, mm and in
    #[arg(long)]
    dpi: Option<f64>,

    /// Byte budget for JPEG output, e.g. 500kb or 2mb
    #[arg(long)]
    target_size: Option<TargetSize>,

    /// Named preset for width, height and unit (see 'resizer presets')
    #[arg(long)]
    preset: Option<String>,

    /// Directory for resized files
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Also bundle outputs into a ZIP (default name from config)
    #[arg(long, num_args = 0..=1)]
    zip: Option<Option<PathBuf>>,

    /// Only write the ZIP, not the individual files
    #[arg(long, requires = "zip")]
    zip_only: bool,

    /// Process images in parallel
    #[arg(long)]
    parallel: bool,

    /// Stop at the first failed image
    #[arg(long)]
    fail_fast: bool,

    /// Print the batch report as JSON instead of progress lines
    #[arg(long)]
    json: bool,
}

fn parse_quality(s: &str) -> Result<Quality, String> {
    let value: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("quality must be between 0.0 and 1.0, got {value}"));
    }
    Ok(Quality::new(value))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let config_path = config::discover_config(cli.config.as_deref(), &cwd);
    let config = config::load_config(config_path.as_deref())?;

    match cli.command {
        Command::Resize(args) => resize(args, &config)?,
        Command::Presets { unit, basic } => {
            let list: Vec<&presets::Preset> = match (basic, unit) {
                (true, _) => presets::basic_presets().iter().collect(),
                (false, Some(unit)) => presets::presets_for_unit(unit).collect(),
                (false, None) => presets::all_presets().iter().collect(),
            };
            output::print_presets(list);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn resize(
    args: ResizeArgs,
    config: &config::ResizerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = config.settings()?;
    if let Some(name) = &args.preset {
        let preset = presets::find_preset(name, args.unit)
            .ok_or_else(|| format!("unknown preset '{name}' (see 'resizer presets')"))?;
        preset.apply(&mut settings);
    }
    if let Some(width) = args.width {
        settings.width = width;
    }
    if let Some(height) = args.height {
        settings.height = height;
    }
    if let Some(unit) = args.unit {
        settings.unit = unit;
    }
    if let Some(fit) = args.fit {
        settings.fit_mode = fit;
    }
    if let Some(format) = args.format {
        settings.format = format;
    }
    if let Some(quality) = args.quality {
        settings.quality = quality;
    }
    if let Some(dpi) = args.dpi {
        settings.dpi = Some(dpi);
    }
    if let Some(target) = args.target_size {
        settings.target_size = Some(target);
    }

    let files = scan::collect_inputs(&args.files)?;
    let mut sources = Vec::with_capacity(files.len());
    let mut positions = Vec::with_capacity(files.len());
    let mut unreadable = Vec::new();
    for (i, path) in files.iter().enumerate() {
        let position = i + 1;
        match SourceImage::open(position.to_string(), path) {
            Ok(source) => {
                sources.push(source);
                positions.push(position);
            }
            Err(e) => {
                log::warn!("{e}");
                unreadable.push(ImageFailure::unreadable(
                    position,
                    position.to_string(),
                    path,
                    e,
                ));
            }
        }
    }

    let process_config = ProcessConfig::from_resizer_config(config);
    let backend = RustBackend::new();

    let (tx, rx) = std::sync::mpsc::channel();
    let quiet = args.json;
    let printer = std::thread::spawn(move || {
        for event in rx {
            if !quiet {
                output::print_process_event(&event);
            }
        }
    });
    let options = BatchOptions {
        fail_fast: args.fail_fast,
        cancel: None,
        progress: Some(tx),
    };
    let mut report = if args.parallel {
        init_thread_pool(&config.processing);
        process_batch_parallel(&backend, &sources, &settings, &process_config, options)
    } else {
        process_batch(&backend, &sources, &settings, &process_config, options)
    };
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    report.merge_unreadable(&positions, unreadable);

    let out_dir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));

    let mut save_failures = 0;
    let saved_dir = if args.zip_only {
        None
    } else {
        for (path, e) in save_outputs(&report.outputs, &out_dir) {
            eprintln!("Save failed: {}: {e}", path.display());
            save_failures += 1;
        }
        Some(out_dir.as_path())
    };

    let mut archive_failed = None;
    let archive_info = match &args.zip {
        Some(path) if !report.outputs.is_empty() => {
            let path = path
                .clone()
                .unwrap_or_else(|| out_dir.join(&config.output.archive_name));
            match archive::write_archive(&report.outputs, &path) {
                Ok(()) => {
                    let size = std::fs::metadata(&path)?.len();
                    Some((path, report.outputs.len(), size))
                }
                Err(e) => {
                    eprintln!("Archive failed: {e}");
                    archive_failed = Some(e);
                    None
                }
            }
        }
        _ => None,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_batch_summary(&report);
        output::print_saved(
            saved_dir.filter(|_| report.outputs.len() > save_failures),
            archive_info
                .as_ref()
                .map(|(p, n, s)| (p.as_path(), *n, *s)),
        );
    }

    if let Some(e) = archive_failed {
        return Err(e.into());
    }
    if save_failures > 0 {
        return Err(format!("{save_failures} resized images could not be saved").into());
    }
    let failed = report.failures.len() + report.skipped;
    if failed > 0 {
        return Err(format!("{failed} of {} images were not resized", report.total()).into());
    }
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
