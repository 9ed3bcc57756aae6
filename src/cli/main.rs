//! Infiltrate CLI
//!
//! Command-line front-end for the conversion service. Every invocation
//! reduces to building one `ConversionRequest` per input file and running
//! it through the converter, which is exactly the contract the GUI uses.

use super::config::CliConfigBuilder;
use crate::{
    config::ImageFormat,
    converter::ImageConverter,
    services::{
        ConsoleProgressReporter, ConversionStage, JsonProgressReporter, ProgressReporter,
        ProgressUpdate,
    },
    single_instance::{InstanceLock, DEFAULT_INSTANCE_PORT},
    types::{default_destination, ConversionRequest, ConversionResult, ConversionStatus},
    worker::CancellationToken,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Image conversion CLI tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "infiltrate")]
pub struct Cli {
    /// Input image files or directories
    #[arg(value_name = "INPUT", required = true)]
    pub input: Vec<PathBuf>,

    /// Target format
    #[arg(short, long, value_enum)]
    pub format: CliImageFormat,

    /// Output file (single input) or directory (batch processing)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// JPEG quality (0-100)
    #[arg(long, default_value_t = 90)]
    pub jpeg_quality: u8,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Process directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Show a milestone progress bar per file
    #[arg(long)]
    pub progress: bool,

    /// Emit machine-readable JSON progress lines instead of log output
    #[arg(long)]
    pub json: bool,

    /// Run even when another instance already holds the instance port
    #[arg(long)]
    pub allow_multiple: bool,

    /// Port used for the single-instance lock
    #[arg(long, default_value_t = DEFAULT_INSTANCE_PORT, value_name = "PORT")]
    pub instance_port: u16,
}

/// Target format tokens accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliImageFormat {
    Png,
    /// JPEG output ("jpg" is accepted as an alias)
    #[value(alias = "jpg")]
    Jpeg,
    Bmp,
    #[value(alias = "tif")]
    Tiff,
    Gif,
    Webp,
    Ico,
    Ppm,
}

/// File extensions the directory scan treats as images
const IMAGE_EXTENSIONS: [&str; 10] = [
    "jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif", "gif", "ico", "ppm",
];

/// CLI entry point
pub fn main() -> Result<()> {
    let cli = Cli::parse();

    crate::tracing_config::init_cli_tracing(cli.verbose)
        .context("Failed to initialize tracing")?;

    // The lock lives until the process exits; a second invocation refuses
    // to start, mirroring the desktop launcher.
    let _instance_lock = if cli.allow_multiple {
        None
    } else {
        match InstanceLock::acquire_on_port(cli.instance_port)
            .context("Failed to probe the instance port")?
        {
            Some(lock) => Some(lock),
            None => anyhow::bail!("Infiltrate is already running."),
        }
    };

    CliConfigBuilder::validate_cli(&cli).context("Invalid CLI arguments")?;
    let config = CliConfigBuilder::from_cli(&cli);
    let target_format = CliConfigBuilder::target_format(&cli);

    let all_files = collect_input_files(&cli)?;
    debug!(
        format = %target_format,
        jpeg_quality = config.jpeg_quality,
        files = all_files.len(),
        "configuration resolved"
    );
    info!(
        "Converting {} file(s) to {}",
        all_files.len(),
        target_format
    );

    let converter = ImageConverter::new(config);
    let start_time = Instant::now();
    let mut failed = 0usize;

    for input_file in &all_files {
        let destination =
            resolve_destination(&cli, input_file, target_format, all_files.len())?;
        let request = ConversionRequest::new(input_file.clone(), target_format, destination);
        let reporter = create_progress_reporter(&cli);

        match converter.convert_with(&request, reporter.as_ref(), &CancellationToken::new()) {
            ConversionStatus::Finished(result) if result.success => {
                info!("{}: {}", input_file.display(), result.message);
            },
            ConversionStatus::Finished(result) => {
                error!("{}: {}", input_file.display(), result.message);
                failed += 1;
            },
            ConversionStatus::Cancelled => {
                warn!("{}: conversion cancelled", input_file.display());
                failed += 1;
            },
        }
    }

    let total_time = start_time.elapsed();
    info!(
        "Converted {}/{} image(s) in {:.2}s",
        all_files.len() - failed,
        all_files.len(),
        total_time.as_secs_f64()
    );

    if failed > 0 {
        anyhow::bail!("{} of {} conversions failed", failed, all_files.len());
    }
    Ok(())
}

/// Choose the progress reporter for one conversion
fn create_progress_reporter(cli: &Cli) -> Box<dyn ProgressReporter> {
    if cli.json {
        Box::new(JsonProgressReporter)
    } else if cli.progress {
        Box::new(MilestoneBarReporter::new())
    } else {
        Box::new(ConsoleProgressReporter::new(cli.verbose >= 1))
    }
}

/// Progress reporter rendering milestones on an indicatif bar
struct MilestoneBarReporter {
    bar: ProgressBar,
}

impl MilestoneBarReporter {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template("{bar:30} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }
}

impl ProgressReporter for MilestoneBarReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        self.bar.set_position(u64::from(update.progress));
        self.bar.set_message(update.description);
    }

    fn report_completion(&self, result: &ConversionResult) {
        if result.success {
            self.bar.finish_with_message(result.message.clone());
        } else {
            self.bar.abandon_with_message(result.message.clone());
        }
    }

    fn report_error(&self, _stage: ConversionStage, _error: &str) {
        // The failure message arrives through report_completion
    }
}

/// Expand the CLI inputs into a sorted, deduplicated file list
fn collect_input_files(cli: &Cli) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in &cli.input {
        if input.is_dir() {
            files.extend(find_image_files(input, cli.recursive)?);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            anyhow::bail!("Input not found: {}", input.display());
        }
    }
    files.sort();
    files.dedup();
    if files.is_empty() {
        anyhow::bail!("No image files found in the given inputs");
    }
    Ok(files)
}

/// Find image files in a directory
fn find_image_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if recursive {
        for entry in walkdir::WalkDir::new(dir) {
            let entry = entry?;
            if entry.file_type().is_file() && is_image_file(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
    } else {
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_file() && is_image_file(&entry.path()) {
                files.push(entry.path());
            }
        }
    }

    Ok(files)
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Work out where one input file's conversion should land
fn resolve_destination(
    cli: &Cli,
    source: &Path,
    format: ImageFormat,
    total_inputs: usize,
) -> Result<PathBuf> {
    match &cli.output {
        Some(output) => {
            if total_inputs == 1 && !output.is_dir() {
                Ok(output.clone())
            } else {
                std::fs::create_dir_all(output).with_context(|| {
                    format!("Failed to create output directory {}", output.display())
                })?;
                Ok(default_destination(source, format, output))
            }
        },
        None => {
            let dir = source
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            Ok(default_destination(source, format, &dir))
        },
    }
}
