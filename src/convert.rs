//! One-shot conversion entry points.
//!
//! These drive a private [`ConverterSession`] through a full attempt and
//! hand back the result, for callers that don't need to hold a session open
//! (the CLI, scripts, tests). Use [`ConverterSession`] directly when you
//! want to keep the artifact around for repeated copy/download operations.

use crate::config::ConversionConfig;
use crate::error::Img2B64Error;
use crate::output::{DownloadOutcome, EncodedArtifact, FileReport};
use crate::pipeline::input::RawFile;
use crate::pipeline::signature::{self, SniffedFormat};
use crate::pipeline::serialize;
use crate::session::ConverterSession;
use std::path::Path;
use tracing::info;

/// Convert an image file to its Base64 artifact.
///
/// This is the primary library entry point for one-off conversions.
///
/// # Errors
/// Any validation or read failure: file not found, unsupported extension,
/// size limit, signature mismatch, PNG structural defect, read error.
pub async fn convert(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<EncodedArtifact, Img2B64Error> {
    let mut session = ConverterSession::new(config.clone());
    session.select_file(Some(input.as_ref())).await?;
    session.convert().await?;
    session
        .into_artifact()
        .ok_or_else(|| Img2B64Error::Internal("artifact missing after completed conversion".into()))
}

/// Convert an image and serialize the artifact to its `.txt` download in
/// one call.
///
/// Conversion failures return `Err`; serialization failures are reported
/// inside the returned [`DownloadOutcome`] (including degraded delivery via
/// `fallback_path`).
pub async fn convert_to_file(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<DownloadOutcome, Img2B64Error> {
    let artifact = convert(input, config).await?;
    Ok(serialize::download_as_txt(&artifact.base64_text, config).await)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<EncodedArtifact, Img2B64Error> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Img2B64Error::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(convert(input, config))
}

/// Report what a file is without encoding it.
///
/// Reads the signature prefix always and the full content only for a
/// PNG-signature file (the structure check needs the tail). Useful for
/// debugging why a file gets rejected.
pub async fn inspect(input: impl AsRef<Path>) -> Result<FileReport, Img2B64Error> {
    let file = RawFile::from_path(input.as_ref()).await?;
    let prefix = file.read_prefix(signature::SNIFF_LEN).await?;
    let sniffed = signature::identify_format(&prefix);

    let png_structure_ok = match sniffed {
        SniffedFormat::Png => {
            let bytes = file.read_all().await?;
            Some(signature::check_png_structure(&bytes))
        }
        _ => None,
    };

    info!(
        "Inspected '{}': declared {}, sniffed {:?}",
        file.name(),
        file.media_type().as_str(),
        sniffed
    );

    Ok(FileReport {
        file_name: file.name().to_string(),
        byte_len: file.byte_len(),
        declared: file.media_type(),
        sniffed,
        png_structure_ok,
        within_size_limit: file.byte_len() <= crate::config::MAX_FILE_SIZE_BYTES,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::input::MediaType;
    use crate::pipeline::signature::{JPEG_MAGIC, PNG_MAGIC};
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    async fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, bytes).await.unwrap();
        path
    }

    #[tokio::test]
    async fn one_shot_convert_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = JPEG_MAGIC.to_vec();
        bytes.extend_from_slice(&[0xE0, 0x12, 0x34]);
        let path = write_file(&dir, "shot.jpg", &bytes).await;

        let artifact = convert(&path, &ConversionConfig::default()).await.unwrap();
        assert_eq!(STANDARD.decode(&artifact.base64_text).unwrap(), bytes);
        assert_eq!(artifact.media_type, MediaType::Jpeg);
    }

    #[tokio::test]
    async fn inspect_reports_declared_vs_sniffed() {
        let dir = tempfile::tempdir().unwrap();
        // JPEG bytes behind a .png extension
        let path = write_file(&dir, "odd.png", &JPEG_MAGIC).await;

        let report = inspect(&path).await.unwrap();
        assert_eq!(report.declared, MediaType::Png);
        assert_eq!(report.sniffed, SniffedFormat::Jpeg);
        assert!(report.png_structure_ok.is_none());
        assert!(report.within_size_limit);
    }

    #[tokio::test]
    async fn inspect_flags_bad_png_structure() {
        let dir = tempfile::tempdir().unwrap();
        // Valid signature, wrong first chunk
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"TEXT");
        bytes.extend_from_slice(&[0; 17]);
        let path = write_file(&dir, "bad.png", &bytes).await;

        let report = inspect(&path).await.unwrap();
        assert_eq!(report.sniffed, SniffedFormat::Png);
        assert_eq!(report.png_structure_ok, Some(false));
    }

    #[test]
    fn convert_sync_matches_async() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.jpg");
        let mut bytes = JPEG_MAGIC.to_vec();
        bytes.push(0xDB);
        std::fs::write(&path, &bytes).unwrap();

        let artifact = convert_sync(&path, &ConversionConfig::default()).unwrap();
        assert_eq!(STANDARD.decode(&artifact.base64_text).unwrap(), bytes);
    }
}
