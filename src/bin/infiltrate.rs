//! Infiltrate CLI Tool
//!
//! Command-line interface for converting images between raster formats
//! using the infiltrate library.

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    infiltrate::cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
