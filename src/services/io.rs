//! Image I/O operations service
//!
//! File-level input and output for conversions. Encoding happens fully in
//! memory and the destination file is written in a single step afterwards,
//! so a failed encode never leaves a truncated file behind.

use crate::{
    config::ImageFormat,
    error::{ConvertError, Result},
};
use image::{codecs::jpeg::JpegEncoder, DynamicImage};
use std::io::Cursor;
use std::path::Path;

/// Service for handling image file input/output operations
pub struct ImageIoService;

impl ImageIoService {
    /// Load an image from a file path
    ///
    /// Tries extension-based format detection first, then falls back to
    /// content-based detection so a mislabeled file still decodes.
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(ConvertError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(extension_err) => {
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    extension_err
                );

                let data = std::fs::read(path_ref).map_err(|io_err| {
                    ConvertError::file_io_error("read image data", path_ref, &io_err)
                })?;

                image::load_from_memory(&data)
                    .map_err(|content_err| ConvertError::decode_error(path_ref, &content_err))
            },
        }
    }

    /// Decode an image from an in-memory byte buffer
    pub fn load_image_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes)
            .map_err(|e| ConvertError::decode(format!("decoding from memory failed: {}", e)))
    }

    /// Encode an image into an in-memory buffer for the given format
    pub fn encode_image(
        image: &DynamicImage,
        format: ImageFormat,
        jpeg_quality: u8,
    ) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        match format {
            ImageFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality);
                image
                    .write_with_encoder(encoder)
                    .map_err(|e| ConvertError::encode_error("JPEG", &e))?;
            },
            other => {
                let mut cursor = Cursor::new(&mut buffer);
                image
                    .write_to(&mut cursor, other.encoder_format())
                    .map_err(|e| ConvertError::encode_error(&other.to_string(), &e))?;
            },
        }
        Ok(buffer)
    }

    /// Save an image to a file in the specified format
    ///
    /// Creates the parent directory if it does not exist. The file is
    /// written only after the encode has completed in memory.
    pub fn save_image<P: AsRef<Path>>(
        image: &DynamicImage,
        path: P,
        format: ImageFormat,
        jpeg_quality: u8,
    ) -> Result<()> {
        let path_ref = path.as_ref();
        Self::ensure_parent_dir(path_ref)?;

        let encoded = Self::encode_image(image, format, jpeg_quality)?;
        std::fs::write(path_ref, &encoded)
            .map_err(|e| ConvertError::file_io_error("write converted image", path_ref, &e))
    }

    /// Copy a file byte-for-byte
    ///
    /// Used when the target format equals the source format and no
    /// re-encode is needed.
    pub fn copy_file<S: AsRef<Path>, D: AsRef<Path>>(source: S, destination: D) -> Result<()> {
        let src = source.as_ref();
        let dst = destination.as_ref();
        Self::ensure_parent_dir(dst)?;

        std::fs::copy(src, dst)
            .map_err(|e| ConvertError::file_io_error("copy image file", dst, &e))?;
        Ok(())
    }

    fn ensure_parent_dir(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ConvertError::file_io_error("create output directory", parent, &e)
                })?;
            }
        }
        Ok(())
    }
}
