//! Lumen - command line path tracer.
//!
//! Renders the showcase scene to a PPM or PNG file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lumen_renderer::{
    render, render_buckets, render_parallel, stream_seed, CameraSettings, ParallelConfig, RenderProgress,
    DEFAULT_BUCKET_SIZE,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod output;
mod progress;
mod scene;

use output::save_image;
use progress::BarProgress;
use scene::{build_scene, demo_camera};

/// How pixels are scheduled across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// One thread, row by row
    Single,
    /// Channel worker pool, one task per pixel
    Parallel,
    /// Rayon tiles, center-out
    Buckets,
}

#[derive(Debug, Parser)]
#[command(name = "lumen", version, about = "Render the showcase scene with a CPU path tracer")]
struct Args {
    /// JSON file with camera settings; flags below override it
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Image width in pixels
    #[arg(short, long)]
    width: Option<u32>,

    /// Samples per pixel
    #[arg(short, long)]
    samples: Option<u32>,

    /// Maximum bounces per path
    #[arg(short, long)]
    depth: Option<u32>,

    /// Trace one ray through each pixel center
    #[arg(long)]
    no_antialiasing: bool,

    #[arg(short, long, value_enum, default_value_t = Mode::Parallel)]
    mode: Mode,

    /// Worker threads for parallel mode (defaults to available cores)
    #[arg(long)]
    workers: Option<usize>,

    /// Results buffered between workers and the collector
    #[arg(long, default_value_t = 1024)]
    capacity: usize,

    /// Tile size for buckets mode
    #[arg(long, default_value_t = DEFAULT_BUCKET_SIZE)]
    bucket_size: u32,

    /// Accelerate intersections with a BVH
    #[arg(long)]
    bvh: bool,

    /// Seed for the scene layout and sampling
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,

    /// Output path; `.png` writes PNG, anything else PPM
    #[arg(short, long, default_value = "output.ppm")]
    output: PathBuf,
}

impl Args {
    /// Settings file (or the demo framing) with command line overrides applied.
    fn camera_settings(&self) -> Result<CameraSettings> {
        let mut settings = match &self.settings {
            Some(path) => load_settings(path)?,
            None => demo_camera(),
        };

        if let Some(width) = self.width {
            settings.image_width = width;
        }
        if let Some(samples) = self.samples {
            settings.samples_per_pixel = samples;
        }
        if let Some(depth) = self.depth {
            settings.max_depth = depth;
        }
        if self.no_antialiasing {
            settings.antialiasing = false;
        }

        Ok(settings)
    }

    fn parallel_config(&self) -> ParallelConfig {
        let defaults = ParallelConfig::default();
        ParallelConfig {
            workers: self.workers.unwrap_or(defaults.workers),
            result_capacity: self.capacity,
            seed: self.seed,
        }
    }
}

fn load_settings(path: &Path) -> Result<CameraSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid settings file {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    log::info!("Starting Lumen");

    let camera = args
        .camera_settings()?
        .build()
        .context("Invalid camera settings")?;

    let mut scene = build_scene(&mut StdRng::seed_from_u64(args.seed));
    scene.enable_bvh(args.bvh);

    let progress = if args.quiet {
        BarProgress::hidden()
    } else {
        BarProgress::new(camera.pixel_count() as u64)
    };
    let progress: &dyn RenderProgress = &progress;

    let image = match args.mode {
        Mode::Single => {
            let mut rng = StdRng::seed_from_u64(stream_seed(args.seed, 0));
            render(&camera, &scene, &mut rng, progress)?
        }
        Mode::Parallel => render_parallel(&camera, &scene, &args.parallel_config(), progress)?,
        Mode::Buckets => render_buckets(&camera, &scene, args.bucket_size, args.seed, progress)?,
    };

    save_image(&image, &args.output).with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}
