//
// cli.rs
// Dicom-Viewer-rs
//
// Defines the CLI surface with Clap and dispatches user-selected commands to the corresponding modules.
//
// Thales Matheus Mendonça Santos - February 2026

use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::{Parser, Subcommand};

use crate::windowing::WindowParams;
use crate::{metadata, render, stats};

/// Command-line interface glue code: defines the available verbs and dispatches to modules.
#[derive(Parser)]
#[command(name = "dicom-viewer")]
#[command(about = "Visualizador DICOM em Rust", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show patient, study and technical metadata
    Info {
        file: PathBuf,
        #[arg(short, long)]
        verbose: bool,
        #[arg(long)]
        json: bool,
    },
    /// Render the image through the windowing pipeline
    Render {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "png")]
        format: String,
        #[arg(long)]
        center: Option<f32>,
        #[arg(long)]
        width: Option<f32>,
        #[arg(long)]
        invert: bool,
        #[arg(long)]
        equalize: bool,
    },
    /// Calculate pixel statistics
    Stats {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Generate an intensity histogram of the rendered image
    Histogram {
        file: PathBuf,
        #[arg(long, default_value_t = 256)]
        bins: usize,
    },
    /// Show the default window and the slider bounds
    Window { file: PathBuf },
}

pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    // Parse the raw CLI arguments once and dispatch to a subcommand handler.
    let cli = Cli::parse();

    match cli.command {
        Commands::Info {
            file,
            verbose,
            json,
        } => {
            if json {
                let (study, technical) = metadata::read_summaries(&file)?;
                let payload = serde_json::json!({
                    "study": study,
                    "technical": technical,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                metadata::print_info(&file, verbose)?;
            }
        }
        Commands::Render {
            input,
            output,
            format,
            center,
            width,
            invert,
            equalize,
        } => {
            let window = parse_window(center, width)?;
            let options = render::RenderOptions {
                window,
                invert,
                equalize,
            };
            render::render_file(&input, output, &format, &options)?;
        }
        Commands::Stats { file, json } => {
            let stats = stats::statistics_for_file(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Statistics for {:?}", file);
                println!("  Shape: {:?}", stats.shape);
                println!("  Pixels: {}", stats.total_pixels);
                println!("  Min:   {:.2}", stats.min);
                println!("  Max:   {:.2}", stats.max);
                println!("  Mean:  {:.2}", stats.mean);
                println!("  StdDv: {:.2}", stats.std_dev);
                println!("  P10:   {:.2}", stats.p10);
                println!("  P50:   {:.2}", stats.p50);
                println!("  P90:   {:.2}", stats.p90);
            }
        }
        Commands::Histogram { file, bins } => {
            if bins == 0 {
                bail!("Number of bins must be greater than zero");
            }
            let histogram = render::histogram_for_file(&file, bins)?;
            let total: u64 = histogram.bins.iter().sum();
            println!(
                "Histogram for {:?} | bins: {} | total pixels: {}",
                file,
                histogram.bins.len(),
                total
            );
            println!("  Min: {}", histogram.min);
            println!("  Max: {}", histogram.max);
            let range = if histogram.bins.len() > 1 {
                (histogram.max as f32 - histogram.min as f32) / histogram.bins.len() as f32
            } else {
                0.0
            };
            let preview = histogram.bins.iter().take(16);
            for (idx, count) in preview.enumerate() {
                let start = histogram.min as f32 + (idx as f32) * range;
                let end = start + range;
                println!("  Bin {:03}: [{:.2}, {:.2}] -> {}", idx, start, end, count);
            }
            if histogram.bins.len() > 16 {
                println!("  ... {} more bins omitted", histogram.bins.len() - 16);
            }
        }
        Commands::Window { file } => {
            let (params, bounds) = render::window_for_file(&file)?;
            println!("Window for {:?}", file);
            println!(
                "  Center: {:.2} (range {:.2} to {:.2})",
                params.center(),
                bounds.center_min,
                bounds.center_max
            );
            println!(
                "  Width:  {:.2} (range {:.2} to {:.2})",
                params.width(),
                bounds.width_min,
                bounds.width_max
            );
        }
    }

    Ok(())
}

fn parse_window(center: Option<f32>, width: Option<f32>) -> anyhow::Result<Option<WindowParams>> {
    // A window override requires both values to make sense; reject mismatched input early.
    match (center, width) {
        (Some(center), Some(width)) => Ok(Some(WindowParams::new(center, width))),
        (None, None) => Ok(None),
        _ => Err(anyhow!("Provide both --center and --width, or neither")),
    }
}
