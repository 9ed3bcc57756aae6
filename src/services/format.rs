//! Output format handling service
//!
//! Pixel-level preparation of a decoded image for a target format. The one
//! non-trivial rule lives here: targets that cannot represent an alpha
//! channel receive the source flattened onto an opaque white background,
//! composited with the source's own alpha as the mask.

use crate::config::ImageFormat;
use image::{DynamicImage, ImageBuffer, Rgb};

/// Service for preparing decoded images for a target format
pub struct FormatHandler;

impl FormatHandler {
    /// Prepare a decoded image for encoding in the given format
    ///
    /// Images with an alpha channel headed for an alpha-less target are
    /// flattened; everything else passes through unchanged.
    #[must_use]
    pub fn prepare_for_encoding(image: DynamicImage, format: ImageFormat) -> DynamicImage {
        if !format.supports_alpha() && image.color().has_alpha() {
            Self::flatten_onto_white(&image)
        } else {
            image
        }
    }

    /// Composite an image onto an opaque white background
    ///
    /// Synthesizes a white RGB canvas the same size as the source and blends
    /// each pixel with its alpha value as the mask. Fully opaque pixels come
    /// through untouched, fully transparent pixels become white.
    #[must_use]
    pub fn flatten_onto_white(image: &DynamicImage) -> DynamicImage {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut rgb = ImageBuffer::new(width, height);

        for (x, y, pixel) in rgba.enumerate_pixels() {
            let alpha = u32::from(pixel[3]);
            let blend =
                |channel: u8| -> u8 { ((u32::from(channel) * alpha + 255 * (255 - alpha)) / 255) as u8 };
            rgb.put_pixel(
                x,
                y,
                Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]),
            );
        }

        DynamicImage::ImageRgb8(rgb)
    }

    /// Check if a format supports transparency (alpha channel)
    #[must_use]
    pub fn supports_transparency(format: ImageFormat) -> bool {
        format.supports_alpha()
    }
}
