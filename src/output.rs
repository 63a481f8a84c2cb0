//! Output types: the encoded artifact, session state, and download outcome.
//!
//! Everything here is a plain serde-serialisable value type so the CLI can
//! print it under `--json` and host applications can persist or forward it.
//! `ConversionState` and the serializer stages are tagged enums rather than
//! string-plus-optional-fields records: an error message can only exist on
//! the `Error` variant, so an inconsistent pair (state "completed" plus a
//! stale error string) is unrepresentable.

use crate::pipeline::input::MediaType;
use crate::pipeline::signature::SniffedFormat;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The Base64 artifact produced by one successful conversion.
///
/// Immutable once produced; owned by the session until `reset()`.
///
/// `base64_text` holds *raw* standard Base64 with no data-URI prefix — the
/// exact text the serializer validates and writes. Use [`data_uri`] when a
/// `data:` form is needed for embedding.
///
/// [`data_uri`]: EncodedArtifact::data_uri
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedArtifact {
    /// Standard Base64 rendering of the source bytes, unwrapped.
    pub base64_text: String,
    /// Source file name, sanitized against markup and path injection.
    pub source_file_name: String,
    /// Byte length of the source file.
    pub source_byte_len: u64,
    /// Declared (and signature-verified) media type of the source.
    pub media_type: MediaType,
    /// When the artifact was produced.
    pub created_at: DateTime<Local>,
}

impl EncodedArtifact {
    /// The artifact as a `data:` URI, e.g. `data:image/png;base64,iVBOR…`.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type.as_str(), self.base64_text)
    }
}

/// The session state machine.
///
/// Exactly one instance per session; transitions are the only mutator, and
/// they are strictly sequential: `Validating` always precedes `Converting`,
/// which always precedes `Completed`/`Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionState {
    /// No conversion running; no artifact held.
    Idle,
    /// Checking size, media type, signature and (for PNG) chunk structure.
    Validating,
    /// Reading and Base64-encoding the file content.
    Converting,
    /// An artifact exists and can be copied or downloaded.
    Completed,
    /// The attempt failed; `message` is the user-facing explanation.
    Error { message: String },
}

impl ConversionState {
    /// True while a conversion attempt is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, ConversionState::Validating | ConversionState::Converting)
    }
}

/// Result of one serializer invocation.
///
/// `success: false` with `fallback_path` set means degraded delivery: the
/// payload was written somewhere readable even though the automatic download
/// could not be performed. `success: false` with no `fallback_path` is a
/// true processing failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub success: bool,
    /// Generated `base64_conversion_…txt` name, when one was derived.
    pub file_name: Option<String>,
    /// Final path of the written artifact, on success.
    pub file_path: Option<PathBuf>,
    /// Byte size of the cleaned payload, when validation passed.
    pub byte_size: Option<u64>,
    /// Where the payload landed when automatic download was unsupported.
    pub fallback_path: Option<PathBuf>,
    /// Human-readable explanation, on failure or degraded delivery.
    pub error: Option<String>,
}

impl DownloadOutcome {
    pub(crate) fn completed(file_name: String, file_path: PathBuf, byte_size: u64) -> Self {
        Self {
            success: true,
            file_name: Some(file_name),
            file_path: Some(file_path),
            byte_size: Some(byte_size),
            fallback_path: None,
            error: None,
        }
    }

    pub(crate) fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            file_name: None,
            file_path: None,
            byte_size: None,
            fallback_path: None,
            error: Some(error.into()),
        }
    }

    pub(crate) fn degraded(
        error: impl Into<String>,
        fallback_path: PathBuf,
        byte_size: u64,
    ) -> Self {
        Self {
            success: false,
            file_name: None,
            file_path: None,
            byte_size: Some(byte_size),
            fallback_path: Some(fallback_path),
            error: Some(error.into()),
        }
    }
}

/// What `inspect` learned about a file without encoding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub file_name: String,
    pub byte_len: u64,
    /// Media type declared by the file handle (extension or caller).
    pub declared: MediaType,
    /// Format according to the leading byte signature.
    pub sniffed: SniffedFormat,
    /// PNG chunk verdict; `None` for non-PNG signatures.
    pub png_structure_ok: Option<bool>,
    /// Whether the file passes the size limit in force.
    pub within_size_limit: bool,
}
