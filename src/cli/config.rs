//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliImageFormat};
use crate::config::{ConversionConfig, ImageFormat};
use anyhow::Result;

/// Convert CLI arguments to the library configuration
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Validate CLI arguments before building a configuration
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        if cli.jpeg_quality > 100 {
            anyhow::bail!(
                "Invalid JPEG quality: {} (valid range: 0-100)",
                cli.jpeg_quality
            );
        }
        if cli.json && cli.progress {
            anyhow::bail!("--json and --progress are mutually exclusive");
        }
        Ok(())
    }

    /// Build a ConversionConfig from CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> ConversionConfig {
        ConversionConfig {
            jpeg_quality: cli.jpeg_quality,
        }
    }

    /// Resolve the target format from the CLI token
    pub(crate) fn target_format(cli: &Cli) -> ImageFormat {
        match cli.format {
            CliImageFormat::Png => ImageFormat::Png,
            // "jpg" parses as an alias of this variant; both resolve here
            CliImageFormat::Jpeg => ImageFormat::Jpeg,
            CliImageFormat::Bmp => ImageFormat::Bmp,
            CliImageFormat::Tiff => ImageFormat::Tiff,
            CliImageFormat::Gif => ImageFormat::Gif,
            CliImageFormat::Webp => ImageFormat::WebP,
            CliImageFormat::Ico => ImageFormat::Ico,
            CliImageFormat::Ppm => ImageFormat::Ppm,
        }
    }
}
