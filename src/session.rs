//! The conversion session: one file, one state machine, one artifact.
//!
//! [`ConverterSession`] is the explicit owner of everything a conversion
//! attempt touches — the candidate file, the [`ConversionState`] and the
//! resulting [`EncodedArtifact`]. No module-level mutable state exists
//! anywhere in the crate. Lifecycle: created by the caller, fed a file via
//! [`select_file`], driven by [`convert`], torn down by [`reset`].
//!
//! ## Non-reentrancy
//!
//! Every operation takes `&mut self` (or `&self` for the read-only delivery
//! calls), so the borrow checker statically rules out two operations
//! interleaving on one session. The remaining hole is a *cancelled* attempt:
//! a `convert()` future dropped mid-await leaves the state at
//! `Validating`/`Converting`, and the guard at the top of `convert()`
//! rejects the next call until `reset()` or a new file selection — a
//! superseded attempt can never resurrect stale state.
//!
//! [`select_file`]: ConverterSession::select_file
//! [`convert`]: ConverterSession::convert
//! [`reset`]: ConverterSession::reset

use crate::clipboard::{self, CopyOutcome};
use crate::config::ConversionConfig;
use crate::error::Img2B64Error;
use crate::output::{ConversionState, DownloadOutcome, EncodedArtifact};
use crate::pipeline::input::{MediaType, RawFile};
use crate::pipeline::signature::{self, SniffedFormat};
use crate::pipeline::{encode, serialize};
use std::path::Path;
use tracing::{info, warn};

/// A single conversion session.
///
/// Invariant: an artifact exists if and only if the state is `Completed`.
///
/// # Example
/// ```rust,no_run
/// use img2b64::{ConversionConfig, ConverterSession};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut session = ConverterSession::new(ConversionConfig::default());
/// session.select_file(Some(std::path::Path::new("photo.png"))).await?;
/// let artifact = session.convert().await?;
/// println!("{} base64 chars", artifact.base64_text.len());
/// let outcome = session.download_result().await?;
/// println!("wrote {:?}", outcome.file_path);
/// # Ok(())
/// # }
/// ```
pub struct ConverterSession {
    config: ConversionConfig,
    file: Option<RawFile>,
    artifact: Option<EncodedArtifact>,
    state: ConversionState,
}

impl ConverterSession {
    /// Create an idle session with the given configuration.
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            file: None,
            artifact: None,
            state: ConversionState::Idle,
        }
    }

    /// Current state of the session's state machine.
    pub fn state(&self) -> &ConversionState {
        &self.state
    }

    /// The artifact of the last completed conversion, if any.
    pub fn artifact(&self) -> Option<&EncodedArtifact> {
        self.artifact.as_ref()
    }

    /// The currently selected candidate file, if any.
    pub fn selected_file(&self) -> Option<&RawFile> {
        self.file.as_ref()
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Replace the candidate file. `None` clears the selection and resets
    /// the session to `Idle`, discarding any artifact.
    ///
    /// Selecting a path discards the previous artifact either way — the
    /// artifact-iff-Completed invariant would otherwise break the moment a
    /// new candidate arrives. A failed selection (missing file, unsupported
    /// extension) leaves the session in `Error` with no file selected.
    pub async fn select_file(&mut self, path: Option<&Path>) -> Result<(), Img2B64Error> {
        self.artifact = None;
        self.state = ConversionState::Idle;

        let Some(path) = path else {
            self.file = None;
            return Ok(());
        };

        match RawFile::from_path(path).await {
            Ok(raw) => {
                self.file = Some(raw);
                Ok(())
            }
            Err(e) => {
                self.file = None;
                self.state = ConversionState::Error {
                    message: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Like [`select_file`], for callers whose input carries its own media
    /// type label instead of relying on the file extension.
    ///
    /// [`select_file`]: ConverterSession::select_file
    pub async fn select_file_as(
        &mut self,
        path: &Path,
        media_type: MediaType,
    ) -> Result<(), Img2B64Error> {
        self.artifact = None;
        self.state = ConversionState::Idle;

        match RawFile::with_declared_type(path, media_type).await {
            Ok(raw) => {
                self.file = Some(raw);
                Ok(())
            }
            Err(e) => {
                self.file = None;
                self.state = ConversionState::Error {
                    message: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Run one conversion attempt: `Idle → Validating → Converting →
    /// Completed`, or `→ Error` with the specific message.
    ///
    /// Validation order: size limit (metadata only, before any read),
    /// declared type vs byte signature, then the PNG chunk check. A PNG is
    /// read exactly once — the structural check's full read is handed
    /// straight to the encoder.
    ///
    /// # Errors
    /// `ConversionInProgress` if a previous attempt was cancelled mid-flight
    /// and the session was not reset; `NoFileSelected` without a candidate;
    /// otherwise the validation or read error that moved the session to
    /// `Error`.
    pub async fn convert(&mut self) -> Result<&EncodedArtifact, Img2B64Error> {
        if self.state.is_busy() {
            warn!("convert() called while an attempt is in flight; rejecting");
            return Err(Img2B64Error::ConversionInProgress);
        }
        let Some(file) = self.file.clone() else {
            let e = Img2B64Error::NoFileSelected;
            self.state = ConversionState::Error {
                message: e.to_string(),
            };
            return Err(e);
        };

        self.artifact = None;
        self.state = ConversionState::Validating;
        info!(
            "Validating '{}' ({} bytes, declared {})",
            file.name(),
            file.byte_len(),
            file.media_type().as_str()
        );

        let pre_read = match validate_file(&file, self.config.max_file_size).await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail(e)),
        };

        self.state = ConversionState::Converting;
        let encoded = match pre_read {
            // PNG structural check already read the content.
            Some(bytes) => encode::encode_bytes(&bytes, &file),
            None => encode::encode_file(&file).await,
        };

        match encoded {
            Ok(artifact) => {
                info!(
                    "Conversion complete: '{}' → {} base64 chars",
                    artifact.source_file_name,
                    artifact.base64_text.len()
                );
                self.state = ConversionState::Completed;
                Ok(self.artifact.insert(artifact))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Copy the artifact's Base64 text to the system clipboard (with the
    /// manual-copy fallback). Requires `Completed`; never alters the state.
    pub async fn copy_result(&self) -> Result<CopyOutcome, Img2B64Error> {
        let artifact = self.artifact.as_ref().ok_or(Img2B64Error::NoResult {
            detail: "copy requires a completed conversion".into(),
        })?;
        clipboard::copy_text(&artifact.base64_text).await
    }

    /// Serialize the artifact to its `.txt` download. Requires `Completed`;
    /// never alters the state — a failed download is reported in the
    /// outcome and the artifact stays available for another attempt.
    pub async fn download_result(&self) -> Result<DownloadOutcome, Img2B64Error> {
        let artifact = self.artifact.as_ref().ok_or(Img2B64Error::NoResult {
            detail: "download requires a completed conversion".into(),
        })?;
        Ok(serialize::download_as_txt(&artifact.base64_text, &self.config).await)
    }

    /// Consume the session, yielding the artifact if one was completed.
    ///
    /// Used by the one-shot entry points; taking ownership this way keeps
    /// the artifact-iff-Completed invariant intact for live sessions.
    pub fn into_artifact(self) -> Option<EncodedArtifact> {
        self.artifact
    }

    /// Unconditionally return to `Idle`, discarding the candidate file and
    /// any artifact. Idempotent.
    pub fn reset(&mut self) {
        self.file = None;
        self.artifact = None;
        self.state = ConversionState::Idle;
    }

    fn fail(&mut self, e: Img2B64Error) -> Img2B64Error {
        warn!("Conversion failed: {}", e);
        self.state = ConversionState::Error {
            message: e.to_string(),
        };
        e
    }
}

/// Validate size, signature and (for PNG) chunk structure.
///
/// Returns the full file content when validation had to read it (PNG), so
/// the caller can hand it to the encoder without a second read.
async fn validate_file(
    file: &RawFile,
    limit: u64,
) -> Result<Option<Vec<u8>>, Img2B64Error> {
    file.ensure_within_limit(limit)?;

    let prefix = file.read_prefix(signature::SNIFF_LEN).await?;
    let sniffed = signature::identify_format(&prefix);
    let matches = matches!(
        (file.media_type(), sniffed),
        (MediaType::Jpeg, SniffedFormat::Jpeg) | (MediaType::Png, SniffedFormat::Png)
    );
    if !matches {
        let shown = match file.media_type() {
            MediaType::Jpeg => signature::JPEG_MAGIC.len(),
            MediaType::Png => signature::PNG_MAGIC.len(),
        };
        let mut magic = prefix;
        magic.truncate(shown);
        return Err(Img2B64Error::SignatureMismatch {
            declared: file.media_type().as_str().to_string(),
            magic,
        });
    }

    if file.media_type() == MediaType::Png {
        let bytes = file.read_all().await?;
        if !signature::check_png_structure(&bytes) {
            let detail = if bytes.get(12..16) != Some(b"IHDR".as_slice()) {
                "first chunk after the signature is not IHDR"
            } else {
                "no IEND chunk terminates the file"
            };
            return Err(Img2B64Error::StructuralDefect {
                detail: detail.to_string(),
            });
        }
        return Ok(Some(bytes));
    }

    Ok(None)
}
