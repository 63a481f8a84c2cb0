//! Artifact serialization: validated Base64 text → downloadable `.txt` file.
//!
//! Each invocation runs a small state machine,
//! `Pending → Validating → Generating → Downloading → Completed`, with
//! `Error` reachable from any stage. The configured progress callback is
//! fired once per transition and never waited on.
//!
//! ## Why re-validate here?
//!
//! The serializer accepts any Base64 text, not only artifacts this crate
//! produced — a host application may hand it content pasted by a user. The
//! four checks (emptiness, character class, padding, size) make the
//! serializer safe to call with arbitrary text, and they are cheap compared
//! to the write that follows.
//!
//! ## Delivery
//!
//! The payload is staged in a private temp directory and copied to its final
//! destination, so the destination file appears complete or not at all. The
//! staging directory is released by a detached task after a fixed grace
//! period — the same idea as revoking a blob URL 30 seconds after the
//! download manager has taken over: long enough for any holder of the staged
//! path to finish reading, short enough to bound temp-space retention.
//! If the destination is not writable at all, the serializer does not fail
//! silently: the payload lands in the OS temp directory and the outcome
//! reports the degraded delivery with its location.

use crate::config::ConversionConfig;
use crate::error::Img2B64Error;
use crate::output::DownloadOutcome;
use crate::progress::{DownloadCallback, DownloadStage};
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Base64 body: alphabet characters then at most two `=` padding chars.
static BASE64_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").expect("valid regex"));

/// Remove whitespace and newline characters some producers wrap Base64 with.
pub fn clean_base64(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}

/// Validate a Base64 payload and return its cleaned form.
///
/// Checks run in order: emptiness, character class, padding completeness,
/// then the size limit against the *cleaned* byte length.
pub fn validate_base64(text: &str, limit: u64) -> Result<String, Img2B64Error> {
    if text.trim().is_empty() {
        return Err(Img2B64Error::EmptyContent);
    }

    let cleaned = clean_base64(text);
    if !BASE64_BODY.is_match(&cleaned) {
        return Err(Img2B64Error::InvalidCharacters);
    }
    if cleaned.len() % 4 != 0 {
        return Err(Img2B64Error::IncompleteEncoding {
            len: cleaned.len(),
        });
    }
    let size = cleaned.len() as u64;
    if size > limit {
        return Err(Img2B64Error::SizeLimitExceeded { size, limit });
    }

    Ok(cleaned)
}

/// Derive the artifact file name from a timestamp:
/// `base64_conversion_YYYYMMDD_HHMMSS_mmm.txt`.
///
/// Millisecond precision is the collision bound — two downloads in the same
/// millisecond would collide, accepted as a practical uniqueness guarantee.
pub fn generate_file_name(now: DateTime<Local>) -> String {
    format!("base64_conversion_{}.txt", now.format("%Y%m%d_%H%M%S_%3f"))
}

/// Verdict of the environment probe.
enum Compatibility {
    Compatible,
    /// Automatic delivery is unavailable; the reason feeds the degraded
    /// outcome message.
    Incompatible(String),
}

/// Probe whether automatic delivery can work: the destination directory
/// must be creatable and writable.
///
/// The write probe is a real temp file, not a permission-bit inspection —
/// read-only mounts and quota errors only show up on an actual write.
fn probe_destination(dest_dir: &Path) -> Compatibility {
    if let Err(e) = std::fs::create_dir_all(dest_dir) {
        return Compatibility::Incompatible(format!(
            "destination '{}' cannot be created: {}",
            dest_dir.display(),
            e
        ));
    }
    match tempfile::Builder::new()
        .prefix(".img2b64-probe-")
        .tempfile_in(dest_dir)
    {
        Ok(probe) => {
            drop(probe);
            Compatibility::Compatible
        }
        Err(e) => Compatibility::Incompatible(format!(
            "destination '{}' is not writable: {}",
            dest_dir.display(),
            e
        )),
    }
}

/// Serialize a Base64 payload to a timestamped `.txt` file.
///
/// Never returns `Err` — every failure mode is captured in the
/// [`DownloadOutcome`] so callers get one shape to inspect, matching the
/// fire-and-forget progress contract. A `success: false` outcome with
/// `fallback_path` set is degraded delivery, not a processing failure.
pub async fn download_as_txt(base64_text: &str, config: &ConversionConfig) -> DownloadOutcome {
    let cb = config.progress_callback.clone();

    // ── Validating ───────────────────────────────────────────────────────
    notify(&cb, DownloadStage::Validating);
    let cleaned = match validate_base64(base64_text, config.max_file_size) {
        Ok(c) => c,
        Err(e) => {
            let message = e.to_string();
            warn!("Download rejected: {}", message);
            notify(&cb, DownloadStage::Error { message: message.clone() });
            return DownloadOutcome::failed(message);
        }
    };
    let byte_size = cleaned.len() as u64;

    // ── Generating ───────────────────────────────────────────────────────
    notify(&cb, DownloadStage::Generating);
    let file_name = generate_file_name(Local::now());
    let dest_dir = config.resolved_output_dir();

    if let Compatibility::Incompatible(reason) = probe_destination(&dest_dir) {
        let message = Img2B64Error::DownloadUnsupported {
            detail: format!("{reason}. The content was written to a fallback file for manual copy."),
        }
        .to_string();
        notify(&cb, DownloadStage::Error { message: message.clone() });

        return match write_fallback(&cleaned, &file_name).await {
            Ok(path) => {
                info!("Degraded delivery: payload at {}", path.display());
                DownloadOutcome::degraded(message, path, byte_size)
            }
            Err(e) => DownloadOutcome::failed(format!(
                "{message} The fallback write failed too: {e}"
            )),
        };
    }

    // ── Downloading ──────────────────────────────────────────────────────
    notify(&cb, DownloadStage::Downloading);
    match stage_and_deliver(&cleaned, &dest_dir, &file_name, config.staging_grace).await {
        Ok(final_path) => {
            info!(
                "Wrote {} ({} bytes)",
                final_path.display(),
                byte_size
            );
            notify(&cb, DownloadStage::Completed);
            DownloadOutcome::completed(file_name, final_path, byte_size)
        }
        Err(e) => {
            let message = e.to_string();
            notify(&cb, DownloadStage::Error { message: message.clone() });
            DownloadOutcome::failed(message)
        }
    }
}

fn notify(cb: &Option<DownloadCallback>, stage: DownloadStage) {
    if let Some(cb) = cb {
        cb.on_stage_change(&stage);
    }
}

/// Stage the payload in a temp directory, copy it to the destination, and
/// release the staging directory after `grace`.
async fn stage_and_deliver(
    payload: &str,
    dest_dir: &Path,
    file_name: &str,
    grace: Duration,
) -> Result<PathBuf, Img2B64Error> {
    let staging =
        TempDir::new().map_err(|e| Img2B64Error::Internal(format!("staging dir: {e}")))?;
    let staged = staging.path().join(file_name);
    tokio::fs::write(&staged, payload)
        .await
        .map_err(|e| Img2B64Error::OutputWriteFailed {
            path: staged.clone(),
            source: e,
        })?;

    let final_path = dest_dir.join(file_name);
    tokio::fs::copy(&staged, &final_path)
        .await
        .map_err(|e| Img2B64Error::OutputWriteFailed {
            path: final_path.clone(),
            source: e,
        })?;
    debug!("Staged {} → {}", staged.display(), final_path.display());

    // Holders of the staged path keep a readable copy until the grace
    // period elapses; then the whole staging directory goes away.
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        if let Err(e) = staging.close() {
            warn!("Failed to remove staging dir: {}", e);
        }
    });

    Ok(final_path)
}

/// Write the payload somewhere readable when automatic delivery is
/// unsupported. The file must outlive this call so a human can still copy
/// the content out by hand.
async fn write_fallback(payload: &str, file_name: &str) -> Result<PathBuf, Img2B64Error> {
    let path = std::env::temp_dir().join(file_name);
    tokio::fs::write(&path, payload)
        .await
        .map_err(|e| Img2B64Error::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::DownloadProgressCallback;
    use std::sync::{Arc, Mutex};

    const LIMIT: u64 = 10 * 1024 * 1024;

    #[test]
    fn clean_strips_wrapping() {
        assert_eq!(clean_base64("aGVs\nbG8g\r\nd29y bGQ=\t"), "aGVsbG8gd29ybGQ=");
        assert_eq!(clean_base64("abcd"), "abcd");
    }

    #[test]
    fn empty_and_whitespace_rejected() {
        assert!(matches!(
            validate_base64("", LIMIT),
            Err(Img2B64Error::EmptyContent)
        ));
        assert!(matches!(
            validate_base64("   \n\t ", LIMIT),
            Err(Img2B64Error::EmptyContent)
        ));
    }

    #[test]
    fn invalid_characters_rejected() {
        assert!(matches!(
            validate_base64("abc$", LIMIT),
            Err(Img2B64Error::InvalidCharacters)
        ));
        // A data-URI prefix is not valid serializer input.
        assert!(matches!(
            validate_base64("data:image/png;base64,aGVsbG8=", LIMIT),
            Err(Img2B64Error::InvalidCharacters)
        ));
        // Padding in the middle is not Base64.
        assert!(matches!(
            validate_base64("ab=c", LIMIT),
            Err(Img2B64Error::InvalidCharacters)
        ));
    }

    #[test]
    fn incomplete_length_rejected() {
        assert!(matches!(
            validate_base64("abcde", LIMIT),
            Err(Img2B64Error::IncompleteEncoding { len: 5 })
        ));
        // Whitespace does not count toward the length check.
        assert!(validate_base64("ab cd", LIMIT).is_ok());
    }

    #[test]
    fn size_limit_applies_to_cleaned_payload() {
        let payload = "A".repeat(16);
        assert!(matches!(
            validate_base64(&payload, 12),
            Err(Img2B64Error::SizeLimitExceeded { size: 16, limit: 12 })
        ));
        assert!(validate_base64(&payload, 16).is_ok());
    }

    #[test]
    fn valid_padded_payload_passes() {
        let cleaned = validate_base64("aGVsbG8g\nd29ybGQ=", LIMIT).unwrap();
        assert_eq!(cleaned, "aGVsbG8gd29ybGQ=");
    }

    #[test]
    fn file_name_format() {
        let name = generate_file_name(Local::now());
        let pattern = Regex::new(r"^base64_conversion_\d{8}_\d{6}_\d{3}\.txt$").unwrap();
        assert!(pattern.is_match(&name), "got: {name}");
    }

    #[test]
    fn file_name_millis_differ() {
        use chrono::TimeZone;
        let a = Local.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap();
        let name = generate_file_name(a);
        assert_eq!(name, "base64_conversion_20240309_143005_000.txt");
    }

    struct StageRecorder(Mutex<Vec<DownloadStage>>);

    impl DownloadProgressCallback for StageRecorder {
        fn on_stage_change(&self, stage: &DownloadStage) {
            self.0.lock().unwrap().push(stage.clone());
        }
    }

    #[tokio::test]
    async fn download_happy_path_writes_artifact() {
        let out = tempfile::tempdir().unwrap();
        let recorder = Arc::new(StageRecorder(Mutex::new(Vec::new())));
        let config = ConversionConfig::builder()
            .output_dir(out.path())
            .staging_grace(Duration::from_millis(0))
            .progress_callback(recorder.clone())
            .build()
            .unwrap();

        let outcome = download_as_txt("aGVsbG8=", &config).await;
        assert!(outcome.success, "outcome: {outcome:?}");
        assert_eq!(outcome.byte_size, Some(8));

        let written = tokio::fs::read_to_string(outcome.file_path.unwrap())
            .await
            .unwrap();
        assert_eq!(written, "aGVsbG8=");

        let stages = recorder.0.lock().unwrap();
        assert_eq!(
            *stages,
            vec![
                DownloadStage::Validating,
                DownloadStage::Generating,
                DownloadStage::Downloading,
                DownloadStage::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn download_validation_failure_reports_error_stage() {
        let recorder = Arc::new(StageRecorder(Mutex::new(Vec::new())));
        let config = ConversionConfig::builder()
            .progress_callback(recorder.clone())
            .build()
            .unwrap();

        let outcome = download_as_txt("not base64!!", &config).await;
        assert!(!outcome.success);
        assert!(outcome.fallback_path.is_none(), "true failure, not degraded");
        assert!(outcome.error.unwrap().contains("invalid characters"));

        let stages = recorder.0.lock().unwrap();
        assert!(matches!(stages.last(), Some(DownloadStage::Error { .. })));
    }

    #[tokio::test]
    async fn unwritable_destination_degrades_with_fallback() {
        // A destination that is an existing *file* can never become a
        // directory, so the probe fails deterministically.
        let out = tempfile::tempdir().unwrap();
        let blocker = out.path().join("occupied");
        tokio::fs::write(&blocker, b"x").await.unwrap();

        let config = ConversionConfig::builder()
            .output_dir(&blocker)
            .build()
            .unwrap();

        let outcome = download_as_txt("aGVsbG8=", &config).await;
        assert!(!outcome.success);
        let fallback = outcome.fallback_path.expect("payload must not be dropped");
        let saved = tokio::fs::read_to_string(&fallback).await.unwrap();
        assert_eq!(saved, "aGVsbG8=");
        assert!(outcome.error.unwrap().contains("not supported"));

        tokio::fs::remove_file(fallback).await.ok();
    }
}
