//! The image conversion service
//!
//! [`ImageConverter`] drives a single request through the conversion state
//! machine: decode, optional alpha flatten, encode or byte copy, with fixed
//! milestone progress (0, 30, 90, 100) and cooperative cancellation checked
//! only between milestones. Every error is recovered here into a failure
//! [`ConversionResult`]; nothing escapes to take down the host.

use crate::{
    config::ConversionConfig,
    error::Result,
    services::{
        ConversionStage, FormatHandler, ImageIoService, NoOpProgressReporter, ProgressReporter,
        ProgressTracker,
    },
    types::{ConversionRequest, ConversionResult, ConversionStatus},
    worker::CancellationToken,
};

/// Converts images between raster formats
///
/// Stateless between requests: each call owns its decoded buffer
/// exclusively and releases it when the call returns.
#[derive(Debug, Clone, Default)]
pub struct ImageConverter {
    config: ConversionConfig,
}

impl ImageConverter {
    /// Create a converter with the given configuration
    #[must_use]
    pub fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// The converter's configuration
    #[must_use]
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert without progress reporting or cancellation
    pub fn convert(&self, request: &ConversionRequest) -> ConversionResult {
        match self.convert_with(request, &NoOpProgressReporter, &CancellationToken::new()) {
            ConversionStatus::Finished(result) => result,
            // A token nobody else holds is never cancelled
            ConversionStatus::Cancelled => ConversionResult::failure("Conversion cancelled"),
        }
    }

    /// Convert with milestone progress reporting and a cancellation flag
    ///
    /// The flag is inspected after the decode milestone and after the
    /// encode completes; it never interrupts an in-flight decode, encode,
    /// or write. A conversion cancelled after the encode has already
    /// written the destination file, but suppresses the 90/100 milestones
    /// and the completion report.
    pub fn convert_with(
        &self,
        request: &ConversionRequest,
        reporter: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> ConversionStatus {
        let mut tracker = ProgressTracker::new(reporter);
        match self.run(request, &mut tracker, cancel) {
            Ok(status) => {
                if let ConversionStatus::Finished(ref result) = status {
                    tracker.report_completion(result);
                }
                status
            },
            Err(err) => {
                let result = ConversionResult::failure(err.to_string());
                tracker.report_error(&result.message);
                tracker.report_completion(&result);
                ConversionStatus::Finished(result)
            },
        }
    }

    fn run(
        &self,
        request: &ConversionRequest,
        tracker: &mut ProgressTracker<'_>,
        cancel: &CancellationToken,
    ) -> Result<ConversionStatus> {
        tracker.report_stage(ConversionStage::Started);

        let image = ImageIoService::load_image(&request.source_path)?;
        tracker.report_stage(ConversionStage::Decoded);

        if cancel.is_cancelled() {
            log::debug!(
                "Conversion of {} cancelled before encoding",
                request.source_path.display()
            );
            return Ok(ConversionStatus::Cancelled);
        }

        let destination = request.resolved_destination();
        if request.is_plain_copy() {
            log::debug!(
                "Source already {} - copying {} to {}",
                request.target_format,
                request.source_path.display(),
                destination.display()
            );
            ImageIoService::copy_file(&request.source_path, &destination)?;
        } else {
            let prepared = FormatHandler::prepare_for_encoding(image, request.target_format);
            ImageIoService::save_image(
                &prepared,
                &destination,
                request.target_format,
                self.config.jpeg_quality,
            )?;
        }

        if cancel.is_cancelled() {
            log::debug!(
                "Conversion of {} cancelled after encoding; output reported as unreliable",
                request.source_path.display()
            );
            return Ok(ConversionStatus::Cancelled);
        }

        tracker.report_stage(ConversionStage::Encoded);
        tracker.report_stage(ConversionStage::Completed);
        Ok(ConversionStatus::Finished(ConversionResult::success(
            format!("Successfully converted to {}", request.target_format),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageFormat;
    use image::{DynamicImage, RgbaImage};
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        DynamicImage::ImageRgba8(RgbaImage::new(4, 4))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_convert_success_message_names_target_format() {
        let dir = TempDir::new().unwrap();
        let source = write_png(&dir, "in.png");
        let request =
            ConversionRequest::new(source, ImageFormat::Bmp, dir.path().join("out.bmp"));

        let result = ImageConverter::default().convert(&request);
        assert!(result.success, "{}", result.message);
        assert_eq!(result.message, "Successfully converted to BMP");
    }

    #[test]
    fn test_convert_missing_source_is_failure_not_panic() {
        let dir = TempDir::new().unwrap();
        let request = ConversionRequest::new(
            dir.path().join("absent.png"),
            ImageFormat::Png,
            dir.path().join("out.png"),
        );

        let result = ImageConverter::default().convert(&request);
        assert!(!result.success);
        assert!(result.message.contains("absent.png"));
    }

    #[test]
    fn test_failed_conversion_leaves_no_destination() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("corrupt.png");
        std::fs::write(&source, b"not a png at all").unwrap();
        let destination = dir.path().join("out.jpg");
        let request = ConversionRequest::new(source, ImageFormat::Jpeg, destination.clone());

        let result = ImageConverter::default().convert(&request);
        assert!(!result.success);
        assert!(!destination.exists());
    }

    #[test]
    fn test_pre_cancelled_token_stops_before_encode() {
        let dir = TempDir::new().unwrap();
        let source = write_png(&dir, "in.png");
        let destination = dir.path().join("out.jpg");
        let request = ConversionRequest::new(source, ImageFormat::Jpeg, destination.clone());

        let cancel = CancellationToken::new();
        cancel.cancel();
        let status = ImageConverter::default().convert_with(
            &request,
            &NoOpProgressReporter,
            &cancel,
        );
        assert!(status.is_cancelled());
        assert!(!destination.exists());
    }
}
