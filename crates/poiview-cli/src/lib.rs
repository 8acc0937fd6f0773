//! # Poiview CLI
//!
//! Command-line interface for the poiview model viewer.
//!
//! ## Commands
//! - `inspect` - Fetch and parse a model, printing what it contains
//! - `preview` - Render a model headlessly and save the frame as PNG

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec2;
use poiview_assets::{FetchError, ModelFetcher, ModelFormat, SourceFetcher};
use poiview_core::ViewerConfig;
use poiview_platform::{FrameQueue, PointerButton, PointerEvent, Viewport};
use poiview_viewer::Viewer;

/// Refresh rate simulated by `preview`
pub const PREVIEW_FPS: f64 = 60.0;

/// Poiview model viewer CLI
#[derive(Parser)]
#[command(name = "poiview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Viewer configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and parse a model, printing its statistics
    Inspect {
        /// Model URL (http/https) or local path
        source: String,
    },

    /// Render a model headlessly and save the last frame
    Preview {
        /// Model URL (http/https) or local path
        source: String,

        /// Viewport width in pixels
        #[arg(long, default_value = "512")]
        width: u32,

        /// Viewport height in pixels
        #[arg(long, default_value = "512")]
        height: u32,

        /// Frames to render
        #[arg(short, long, default_value = "1")]
        frames: u32,

        /// Output PNG file
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,

        /// Horizontal drag distance in pixels
        #[arg(long, allow_hyphen_values = true)]
        drag: Option<f32>,

        /// Wheel steps; positive zooms out, negative zooms in
        #[arg(long, allow_hyphen_values = true)]
        zoom: Option<i32>,
    },
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ViewerConfig::default(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(run(cli.command, config))
}

/// Run a command with the given configuration
pub async fn run(command: Commands, config: ViewerConfig) -> Result<()> {
    match command {
        Commands::Inspect { source } => {
            let summary = inspect(&source, &config).await?;
            println!("{}", summary);
        }

        Commands::Preview {
            source,
            width,
            height,
            frames,
            output,
            drag,
            zoom,
        } => {
            let options = PreviewOptions {
                width,
                height,
                frames,
                drag,
                zoom,
            };
            preview(&source, &output, &options, config).await?;
            log::info!("Preview written to {}", output.display());
        }
    }

    Ok(())
}

/// Load a viewer configuration from a JSON file
///
/// Missing fields take their default values.
pub fn load_config(path: &Path) -> Result<ViewerConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
    let config =
        serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Fetch and parse a model, returning a printable summary
pub async fn inspect(source: &str, config: &ViewerConfig) -> Result<String> {
    ModelFormat::from_url(source)?;

    let fetcher = SourceFetcher::new();
    let text = match config.fetch_timeout() {
        Some(limit) => tokio::time::timeout(limit, fetcher.fetch(source))
            .await
            .unwrap_or(Err(FetchError::Timeout(limit)))?,
        None => fetcher.fetch(source).await?,
    };

    let (geometry, report) = poiview_assets::parse_with_report(&text)?;
    let bounds = geometry.bounds();

    let mut summary = String::new();
    summary.push_str(&format!("Model: {}\n", source));
    summary.push_str(&format!("  Vertices:          {}\n", report.vertices));
    summary.push_str(&format!("  Vertices with NaN: {}\n", report.nan_vertices));
    summary.push_str(&format!("  Faces:             {}\n", report.faces));
    summary.push_str(&format!("  Unsupported faces: {}\n", report.unsupported_faces));
    summary.push_str(&format!("  Dropped faces:     {}\n", report.dropped_faces));
    summary.push_str(&format!("  Triangles:         {}\n", report.triangles));
    if bounds.is_empty() {
        summary.push_str("  Bounds:            (none)");
    } else {
        summary.push_str(&format!("  Bounds min:        {}\n", bounds.min));
        summary.push_str(&format!("  Bounds max:        {}\n", bounds.max));
        summary.push_str(&format!("  Size:              {}", bounds.size()));
    }
    Ok(summary)
}

/// Headless preview settings
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewOptions {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    /// Frames to render
    pub frames: u32,
    /// Horizontal drag distance in pixels
    pub drag: Option<f32>,
    /// Wheel steps
    pub zoom: Option<i32>,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            frames: 1,
            drag: None,
            zoom: None,
        }
    }
}

/// Render a model in a headless viewport and save the final frame as PNG
pub async fn preview(source: &str, output: &Path, options: &PreviewOptions, config: ViewerConfig) -> Result<()> {
    let viewport = Viewport::new(options.width, options.height)?;
    let queue = Arc::new(FrameQueue::new());
    let viewer = Viewer::new(config, SourceFetcher::new(), queue.clone(), viewport.clone());

    viewer.open(source).await?;
    simulate_input(&viewport, options.drag, options.zoom);

    for frame in 0..options.frames.max(1) {
        queue.refresh(f64::from(frame) / PREVIEW_FPS);
    }

    let target = viewport.frame_buffer().context("no surface attached to the viewport")?;
    let bytes = target.read().to_rgba_bytes();
    viewer.close();

    let image = image::RgbaImage::from_raw(options.width, options.height, bytes)
        .context("frame buffer does not match the viewport size")?;
    image
        .save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}

/// Drag horizontally from the viewport center, then scroll the wheel
pub fn simulate_input(viewport: &Viewport, drag: Option<f32>, zoom: Option<i32>) {
    let size = viewport.size();
    let center = Vec2::new(size.x as f32 / 2.0, size.y as f32 / 2.0);

    if let Some(dx) = drag {
        viewport.dispatch(PointerEvent::Down {
            position: center,
            button: PointerButton::Primary,
        });
        viewport.dispatch(PointerEvent::Move {
            position: center + Vec2::new(dx, 0.0),
        });
        viewport.dispatch(PointerEvent::Up {
            position: center + Vec2::new(dx, 0.0),
            button: PointerButton::Primary,
        });
    }

    if let Some(steps) = zoom {
        let delta_y = if steps > 0 { 100.0 } else { -100.0 };
        for _ in 0..steps.unsigned_abs() {
            viewport.dispatch(PointerEvent::Wheel {
                position: center,
                delta_x: 0.0,
                delta_y,
            });
        }
    }
}
