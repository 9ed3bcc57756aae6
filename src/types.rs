//! Core data types shared across conversion operations

use crate::config::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A single image conversion job
///
/// Constructed once per caller action, consumed exactly once by the
/// converter, and discarded after the result is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    /// Path of the image to convert
    pub source_path: PathBuf,
    /// Format to convert into
    pub target_format: ImageFormat,
    /// Path the converted image is written to
    pub destination_path: PathBuf,
}

impl ConversionRequest {
    /// Create a new conversion request
    pub fn new<S: Into<PathBuf>, D: Into<PathBuf>>(
        source_path: S,
        target_format: ImageFormat,
        destination_path: D,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_format,
            destination_path: destination_path.into(),
        }
    }

    /// Destination path with the extension normalized to the target format
    ///
    /// A destination whose extension already names the target format (any
    /// accepted alias, case-insensitive) is kept verbatim. Anything else,
    /// including a missing extension, is rewritten to the canonical
    /// extension so the written file never carries a misleading suffix.
    #[must_use]
    pub fn resolved_destination(&self) -> PathBuf {
        let matches = self
            .destination_path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.target_format.matches_extension(ext));
        if matches {
            self.destination_path.clone()
        } else {
            self.destination_path.with_extension(self.target_format.extension())
        }
    }

    /// Whether this request degenerates to a plain byte copy
    ///
    /// True when the source extension already names the target format and
    /// the source and (resolved) destination are different paths. Copying
    /// avoids a needless decode/re-encode round trip.
    #[must_use]
    pub fn is_plain_copy(&self) -> bool {
        let same_format = self
            .source_path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.target_format.matches_extension(ext));
        same_format && self.source_path != self.resolved_destination()
    }
}

/// Outcome of a finished conversion
///
/// Exactly one of success-with-informational-message or
/// failure-with-error-message is produced per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Whether the conversion completed
    pub success: bool,
    /// Informational message on success, error description on failure
    pub message: String,
}

impl ConversionResult {
    /// Create a successful result
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Create a failed result
    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Terminal state of a conversion attempt
///
/// Cancellation is cooperative: a cancelled conversion produced no result
/// and the destination file must be treated as unreliable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionStatus {
    /// The conversion ran to a terminal result (success or failure)
    Finished(ConversionResult),
    /// The cancellation flag was observed between milestones
    Cancelled,
}

impl ConversionStatus {
    /// The result, if the conversion was not cancelled
    #[must_use]
    pub fn finished(self) -> Option<ConversionResult> {
        match self {
            Self::Finished(result) => Some(result),
            Self::Cancelled => None,
        }
    }

    /// Whether the conversion was cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Helper for callers deriving a destination from a source path
///
/// Produces `<source stem>.<canonical extension>` in `output_dir`, the same
/// default naming the original save dialog offered.
#[must_use]
pub fn default_destination(source: &Path, format: ImageFormat, output_dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("converted");
    output_dir.join(format!("{}.{}", stem, format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_destination_keeps_matching_extension() {
        let request = ConversionRequest::new("in.png", ImageFormat::Jpeg, "out.jpg");
        assert_eq!(request.resolved_destination(), PathBuf::from("out.jpg"));

        // Alias extensions are kept verbatim too
        let request = ConversionRequest::new("in.png", ImageFormat::Jpeg, "out.jpeg");
        assert_eq!(request.resolved_destination(), PathBuf::from("out.jpeg"));

        let request = ConversionRequest::new("in.png", ImageFormat::Tiff, "out.TIF");
        assert_eq!(request.resolved_destination(), PathBuf::from("out.TIF"));
    }

    #[test]
    fn test_resolved_destination_normalizes_mismatch() {
        let request = ConversionRequest::new("in.jpg", ImageFormat::Png, "out.jpg");
        assert_eq!(request.resolved_destination(), PathBuf::from("out.png"));

        let request = ConversionRequest::new("in.jpg", ImageFormat::WebP, "out");
        assert_eq!(request.resolved_destination(), PathBuf::from("out.webp"));
    }

    #[test]
    fn test_is_plain_copy_for_same_format_distinct_paths() {
        let request = ConversionRequest::new("photo.png", ImageFormat::Png, "copy.png");
        assert!(request.is_plain_copy());

        // jpeg/jpg alias still counts as the same format
        let request = ConversionRequest::new("photo.jpeg", ImageFormat::Jpeg, "copy.jpg");
        assert!(request.is_plain_copy());
    }

    #[test]
    fn test_is_plain_copy_rejects_identical_paths() {
        let request = ConversionRequest::new("photo.png", ImageFormat::Png, "photo.png");
        assert!(!request.is_plain_copy());
    }

    #[test]
    fn test_is_plain_copy_rejects_format_change() {
        let request = ConversionRequest::new("photo.png", ImageFormat::Jpeg, "photo.jpg");
        assert!(!request.is_plain_copy());
    }

    #[test]
    fn test_result_constructors() {
        let ok = ConversionResult::success("Successfully converted to PNG");
        assert!(ok.success);
        assert_eq!(ok.message, "Successfully converted to PNG");

        let failed = ConversionResult::failure("decode failed");
        assert!(!failed.success);
        assert_eq!(failed.message, "decode failed");
    }

    #[test]
    fn test_status_accessors() {
        let status = ConversionStatus::Finished(ConversionResult::success("ok"));
        assert!(!status.is_cancelled());
        assert!(status.finished().is_some());

        let status = ConversionStatus::Cancelled;
        assert!(status.is_cancelled());
        assert!(status.finished().is_none());
    }

    #[test]
    fn test_default_destination_naming() {
        let dest = default_destination(
            Path::new("/photos/holiday.png"),
            ImageFormat::Jpeg,
            Path::new("/out"),
        );
        assert_eq!(dest, PathBuf::from("/out/holiday.jpg"));
    }

    #[test]
    fn test_result_serialization_round_trip() {
        let result = ConversionResult::success("Successfully converted to WEBP");
        let json = serde_json::to_string(&result).unwrap();
        let back: ConversionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }
}
