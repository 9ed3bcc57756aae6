//! Configuration types for image conversion operations

use serde::{Deserialize, Serialize};

/// Supported target image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    /// PNG with alpha channel transparency
    Png,
    /// JPEG (no transparency; alpha sources are flattened onto white)
    Jpeg,
    /// BMP (no transparency)
    Bmp,
    /// TIFF with alpha channel transparency and lossless compression
    Tiff,
    /// GIF (palette transparency)
    Gif,
    /// WebP with alpha channel transparency
    WebP,
    /// Windows icon (dimensions capped at 256x256 by the encoder)
    Ico,
    /// Portable pixmap (no transparency)
    Ppm,
}

impl ImageFormat {
    /// All supported target formats, in display order
    #[must_use]
    pub fn all() -> &'static [ImageFormat] {
        &[
            ImageFormat::Png,
            ImageFormat::Jpeg,
            ImageFormat::Bmp,
            ImageFormat::Tiff,
            ImageFormat::Gif,
            ImageFormat::WebP,
            ImageFormat::Ico,
            ImageFormat::Ppm,
        ]
    }

    /// Parse a user-facing format token, case-insensitive
    ///
    /// "JPG" is an encoder-side alias and resolves to [`ImageFormat::Jpeg`],
    /// "TIF" to [`ImageFormat::Tiff`]. Returns `None` for unknown tokens.
    #[must_use]
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            "tiff" | "tif" => Some(Self::Tiff),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::WebP),
            "ico" => Some(Self::Ico),
            "ppm" => Some(Self::Ppm),
            _ => None,
        }
    }

    /// Canonical file extension for this format (without the dot)
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Gif => "gif",
            Self::WebP => "webp",
            Self::Ico => "ico",
            Self::Ppm => "ppm",
        }
    }

    /// Check whether a file extension names this format, case-insensitive
    ///
    /// Accepts the canonical extension plus common aliases (`jpeg` for JPEG,
    /// `tif` for TIFF).
    #[must_use]
    pub fn matches_extension(self, extension: &str) -> bool {
        let ext = extension.to_ascii_lowercase();
        match self {
            Self::Jpeg => ext == "jpg" || ext == "jpeg",
            Self::Tiff => ext == "tiff" || ext == "tif",
            other => ext == other.extension(),
        }
    }

    /// Whether this format can represent an alpha channel
    ///
    /// Targets without alpha support get their sources flattened onto an
    /// opaque white background before encoding.
    #[must_use]
    pub fn supports_alpha(self) -> bool {
        match self {
            Self::Png | Self::Tiff | Self::Gif | Self::WebP | Self::Ico => true,
            Self::Jpeg | Self::Bmp | Self::Ppm => false,
        }
    }

    /// The `image` crate encoder identifier for this format
    #[must_use]
    pub fn encoder_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Tiff => image::ImageFormat::Tiff,
            Self::Gif => image::ImageFormat::Gif,
            Self::WebP => image::ImageFormat::WebP,
            Self::Ico => image::ImageFormat::Ico,
            Self::Ppm => image::ImageFormat::Pnm,
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Bmp => "BMP",
            Self::Tiff => "TIFF",
            Self::Gif => "GIF",
            Self::WebP => "WEBP",
            Self::Ico => "ICO",
            Self::Ppm => "PPM",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = crate::error::ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_token(s).ok_or_else(|| crate::error::ConvertError::unsupported_format(s))
    }
}

/// Configuration for conversion operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// JPEG quality (0-100)
    pub jpeg_quality: u8,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}
