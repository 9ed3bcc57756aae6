//! Error types for image conversion operations

use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Error types for image conversion operations
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors surfaced directly by the image codec library
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Source image could not be decoded
    #[error("Failed to open image: {0}")]
    Decode(String),

    /// Decoded image could not be encoded to the target format
    #[error("Failed to convert image: {0}")]
    Encode(String),

    /// Requested target format is not supported by this build
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl ConvertError {
    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new encode error
    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Create a file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create a decode error carrying the failing path and the codec error
    pub fn decode_error<P: AsRef<std::path::Path>>(path: P, error: &image::ImageError) -> Self {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");
        Self::Decode(format!(
            "'{}' (format: {}): {}",
            path.as_ref().display(),
            extension,
            error
        ))
    }

    /// Create an encode error carrying the target format and the codec error
    pub fn encode_error(format_name: &str, error: &image::ImageError) -> Self {
        Self::Encode(format!("encoding as {} failed: {}", format_name, error))
    }
}
