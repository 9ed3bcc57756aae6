#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Infiltrate Image Conversion Library
//!
//! A minimalistic, modern, and fast library for converting raster images
//! between formats, with milestone progress reporting and cooperative
//! cancellation. It is the conversion core of the Infiltrate desktop
//! application, exposed so any front-end (GUI, CLI, tests) can drive it.
//!
//! ## Features
//!
//! - **Format Support**: PNG, JPEG (alias JPG), BMP, TIFF, GIF, WebP, ICO, PPM
//! - **Alpha Handling**: sources with transparency are flattened onto an
//!   opaque white background for targets that cannot represent alpha
//! - **Milestone Progress**: discrete 0 / 30 / 90 / 100 updates through a
//!   pluggable reporter interface, never a continuous stream
//! - **Worker Threads**: conversions run off the caller's thread with FIFO
//!   event delivery and cooperative cancellation
//! - **Same-Format Copies**: converting to the source's own format becomes
//!   a plain byte copy instead of a lossy re-encode
//! - **CLI Integration**: optional batch command-line front-end (enable
//!   with the `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use infiltrate::{ConversionRequest, ImageConverter, ImageFormat};
//!
//! let converter = ImageConverter::default();
//! let request = ConversionRequest::new("photo.png", ImageFormat::Jpeg, "photo.jpg");
//! let result = converter.convert(&request);
//! assert!(result.success, "{}", result.message);
//! ```
//!
//! ## Progress and cancellation
//!
//! ```rust,no_run
//! use infiltrate::{ConversionEvent, ConversionRequest, ImageConverter, ImageFormat};
//!
//! let converter = ImageConverter::default();
//! let handle = converter.spawn(ConversionRequest::new(
//!     "scan.tiff",
//!     ImageFormat::WebP,
//!     "scan.webp",
//! ));
//! while let Some(event) = handle.recv_event() {
//!     match event {
//!         ConversionEvent::Progress(update) => println!("[{}%]", update.progress),
//!         ConversionEvent::Finished(result) => {
//!             println!("{}", result.message);
//!             break;
//!         },
//!         ConversionEvent::Cancelled => break,
//!     }
//! }
//! ```
//!
//! ## Library vs CLI Usage
//!
//! To use only as a library without CLI dependencies:
//!
//! ```toml
//! [dependencies]
//! infiltrate = { version = "1.0", default-features = false }
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod converter;
pub mod error;
pub mod services;
pub mod single_instance;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod worker;

// Internal imports for lib functions
use tokio::io::AsyncRead;

// Public API exports
pub use config::{ConversionConfig, ImageFormat};
pub use converter::ImageConverter;
pub use error::{ConvertError, Result};
pub use services::{
    ConsoleProgressReporter, ConversionStage, FormatHandler, ImageIoService,
    JsonProgressReporter, NoOpProgressReporter, ProgressReporter, ProgressTracker, ProgressUpdate,
};
pub use single_instance::{InstanceLock, DEFAULT_INSTANCE_PORT};
pub use types::{default_destination, ConversionRequest, ConversionResult, ConversionStatus};
pub use worker::{CancellationToken, ConversionEvent, ConversionHandle};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig};

/// Convert an image file asynchronously
///
/// Runs the blocking conversion on a worker so an async caller (a UI event
/// loop, a web handler) never stalls on the decode/encode work. Errors are
/// already folded into the returned [`ConversionResult`].
///
/// # Examples
///
/// ```rust,no_run
/// use infiltrate::{convert_image_file, ConversionConfig, ConversionRequest, ImageFormat};
///
/// # async fn example() {
/// let request = ConversionRequest::new("input.png", ImageFormat::WebP, "output.webp");
/// let result = convert_image_file(request, ConversionConfig::default()).await;
/// println!("{}", result.message);
/// # }
/// ```
pub async fn convert_image_file(
    request: ConversionRequest,
    config: ConversionConfig,
) -> ConversionResult {
    let converter = ImageConverter::new(config);
    match tokio::task::spawn_blocking(move || converter.convert(&request)).await {
        Ok(result) => result,
        Err(e) => ConversionResult::failure(format!("Conversion task failed: {}", e)),
    }
}

/// Convert in-memory image data to the target format
///
/// Decodes from the byte buffer, applies the same alpha-flattening rule as
/// the file path, and returns the encoded bytes without touching the
/// filesystem. Suitable for clipboard data and web uploads.
///
/// # Examples
///
/// ```rust,no_run
/// use infiltrate::{convert_image_bytes, ConversionConfig, ImageFormat};
///
/// # fn example(clipboard: &[u8]) -> infiltrate::Result<()> {
/// let jpeg = convert_image_bytes(clipboard, ImageFormat::Jpeg, &ConversionConfig::default())?;
/// # let _ = jpeg;
/// # Ok(())
/// # }
/// ```
pub fn convert_image_bytes(
    bytes: &[u8],
    target_format: ImageFormat,
    config: &ConversionConfig,
) -> Result<Vec<u8>> {
    let image = ImageIoService::load_image_from_bytes(bytes)?;
    let prepared = FormatHandler::prepare_for_encoding(image, target_format);
    ImageIoService::encode_image(&prepared, target_format, config.jpeg_quality)
}

/// Convert image data from an async reader stream
///
/// Reads the stream to its end, then behaves like [`convert_image_bytes`].
///
/// # Examples
///
/// ```rust,no_run
/// use infiltrate::{convert_image_from_reader, ConversionConfig, ImageFormat};
/// use tokio::fs::File;
///
/// # async fn example() -> anyhow::Result<()> {
/// let file = File::open("upload.png").await?;
/// let bytes =
///     convert_image_from_reader(file, ImageFormat::Png, &ConversionConfig::default()).await?;
/// # let _ = bytes;
/// # Ok(())
/// # }
/// ```
pub async fn convert_image_from_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    target_format: ImageFormat,
    config: &ConversionConfig,
) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buffer)
        .await
        .map_err(|e| ConvertError::decode(format!("failed to read from stream: {}", e)))?;
    convert_image_bytes(&buffer, target_format, config)
}
