//! # img2b64
//!
//! Convert JPEG/PNG image files to Base64 text, entirely in-process.
//!
//! ## Why this crate?
//!
//! Trusting a file's declared media type is how corrupted or mislabelled
//! uploads end up embedded in documents and data pipelines. This crate
//! verifies what a file *is* — byte signature, and for PNG a shallow chunk
//! sanity check — before encoding it, and serializes the result through an
//! atomic, progress-reporting download path that never silently drops the
//! payload, even on hosts where the clipboard or the destination directory
//! is unavailable.
//!
//! ## Pipeline Overview
//!
//! ```text
//! image file
//!  │
//!  ├─ 1. Input      capture name, size, declared media type (no read)
//!  ├─ 2. Validate   size limit → byte signature → PNG chunk structure
//!  ├─ 3. Encode     bytes → standard Base64 artifact
//!  └─ 4. Deliver    clipboard copy, or timestamped .txt download
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use img2b64::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let artifact = convert("photo.png", &config).await?;
//!     println!("{}", artifact.base64_text);
//!     eprintln!("{} bytes from '{}'",
//!         artifact.source_byte_len,
//!         artifact.source_file_name);
//!     Ok(())
//! }
//! ```
//!
//! For repeated copy/download on one result, hold a [`ConverterSession`]:
//!
//! ```rust,no_run
//! use img2b64::{ConverterSession, ConversionConfig};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = ConverterSession::new(ConversionConfig::default());
//! session.select_file(Some(std::path::Path::new("photo.png"))).await?;
//! session.convert().await?;
//! session.copy_result().await?;
//! session.download_result().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `img2b64` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only
//! deps:
//! ```toml
//! img2b64 = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod clipboard;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use clipboard::CopyOutcome;
pub use config::{ConversionConfig, ConversionConfigBuilder, MAX_FILE_SIZE_BYTES, STAGING_GRACE};
pub use convert::{convert, convert_sync, convert_to_file, inspect};
pub use error::Img2B64Error;
pub use output::{ConversionState, DownloadOutcome, EncodedArtifact, FileReport};
pub use pipeline::input::{MediaType, RawFile};
pub use pipeline::signature::{check_png_structure, identify_format, SniffedFormat};
pub use progress::{
    DownloadCallback, DownloadProgressCallback, DownloadStage, NoopDownloadCallback,
};
pub use session::ConverterSession;
