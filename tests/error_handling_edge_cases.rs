//! Error handling and edge case tests
//!
//! Every failure mode must surface as a failure `ConversionResult` with a
//! readable message; nothing here may panic or kill the process.

use image::DynamicImage;
use infiltrate::{
    ConversionRequest, ImageConverter, ImageFormat, InstanceLock,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn save_rgb_source(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.path().join(name);
    DynamicImage::new_rgb8(width, height)
        .save(&path)
        .expect("failed to save test source");
    path
}

#[test]
fn test_missing_source_reports_failure_with_path() {
    let dir = TempDir::new().unwrap();
    let request = ConversionRequest::new(
        dir.path().join("nowhere.png"),
        ImageFormat::Jpeg,
        dir.path().join("out.jpg"),
    );

    let result = ImageConverter::default().convert(&request);
    assert!(!result.success);
    assert!(result.message.contains("nowhere.png"));
}

#[test]
fn test_corrupt_file_reports_decode_failure() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("garbage.png");
    std::fs::write(&source, b"\x00\x01\x02 nothing raster about this").unwrap();

    let request =
        ConversionRequest::new(&source, ImageFormat::Bmp, dir.path().join("out.bmp"));
    let result = ImageConverter::default().convert(&request);

    assert!(!result.success);
    assert!(
        result.message.contains("Failed to open image"),
        "message should describe the decode failure: {}",
        result.message
    );
}

#[test]
fn test_truncated_image_is_a_failure_not_a_panic() {
    let dir = TempDir::new().unwrap();
    let intact = save_rgb_source(&dir, "intact.png", 32, 32);
    let bytes = std::fs::read(&intact).unwrap();

    // Keep the PNG signature but drop most of the stream
    let truncated_path = dir.path().join("truncated.png");
    std::fs::write(&truncated_path, &bytes[..bytes.len() / 4]).unwrap();

    let request = ConversionRequest::new(
        &truncated_path,
        ImageFormat::Jpeg,
        dir.path().join("out.jpg"),
    );
    let result = ImageConverter::default().convert(&request);
    assert!(!result.success);
}

#[test]
fn test_unwritable_destination_reports_io_failure() {
    let dir = TempDir::new().unwrap();
    let source = save_rgb_source(&dir, "input.png", 4, 4);

    // A plain file where the destination's parent directory should be
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"in the way").unwrap();
    let destination = blocker.join("out.png");

    let request = ConversionRequest::new(&source, ImageFormat::Png, destination);
    let result = ImageConverter::default().convert(&request);
    assert!(!result.success);
}

#[test]
fn test_oversized_ico_is_recovered_as_failure() {
    let dir = TempDir::new().unwrap();
    // The ICO container tops out at 256x256; the encoder must refuse this
    let source = save_rgb_source(&dir, "huge.png", 300, 300);

    let request =
        ConversionRequest::new(&source, ImageFormat::Ico, dir.path().join("huge.ico"));
    let result = ImageConverter::default().convert(&request);
    assert!(!result.success);
    assert!(
        result.message.contains("Failed to convert image"),
        "unexpected message: {}",
        result.message
    );
}

#[test]
fn test_unknown_format_token_is_an_error() {
    let err = "heic".parse::<ImageFormat>().unwrap_err();
    assert!(err.to_string().contains("Unsupported format"));
}

#[test]
fn test_instance_lock_contention() {
    // Away from the library default so a running instance cannot interfere
    let port = 49321;

    let first = InstanceLock::acquire_on_port(port)
        .unwrap()
        .expect("test port should be free");
    assert!(InstanceLock::acquire_on_port(port).unwrap().is_none());

    drop(first);
    assert!(InstanceLock::acquire_on_port(port).unwrap().is_some());
}

#[test]
fn test_failure_leaves_no_partial_output() {
    let dir = TempDir::new().unwrap();
    let source = save_rgb_source(&dir, "huge.png", 300, 300);
    let destination = dir.path().join("huge.ico");

    let request = ConversionRequest::new(&source, ImageFormat::Ico, &destination);
    let result = ImageConverter::default().convert(&request);
    assert!(!result.success);
    // Encode happens in memory, so a failed encode writes nothing
    assert!(!destination.exists());
}

#[test]
fn test_zero_byte_file_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("empty.png");
    std::fs::write(&source, b"").unwrap();

    let request =
        ConversionRequest::new(&source, ImageFormat::Png, dir.path().join("out.png"));
    let result = ImageConverter::default().convert(&request);
    assert!(!result.success);
}
