//! Error types for the img2b64 library.
//!
//! One enum covers every failure the pipeline can produce, split into the
//! groups callers actually dispatch on:
//!
//! * **Validation errors** (size, media type, signature, structure) — terminal
//!   for the current attempt. The session moves to `Error` and stays there
//!   until `reset()` or a new file selection; the core never retries them.
//!
//! * **Delivery errors** (`ClipboardUnavailable`, `DownloadUnsupported`) —
//!   degraded-but-handled. The payload is still made available through a
//!   fallback path; these variants only surface when even the fallback fails
//!   or when a caller needs to distinguish degraded delivery from success.
//!
//! Every message is written for a human first; callers that need programmatic
//! dispatch match on the variant before rendering `Display`.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the img2b64 library.
#[derive(Debug, Error)]
pub enum Img2B64Error {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// File is larger than the configured limit; rejected before any read.
    #[error("File is {size} bytes but the limit is {limit} bytes (10 MiB by default)")]
    SizeLimitExceeded { size: u64, limit: u64 },

    /// Declared media type is not one of image/jpeg, image/jpg, image/png.
    #[error("Unsupported media type '{media_type}': only JPEG and PNG images are accepted")]
    UnsupportedMediaType { media_type: String },

    /// Declared type does not match the actual byte signature.
    #[error(
        "File does not have a valid {declared} signature\nFirst bytes: {magic:02X?}. \
         The file may be corrupted or mislabelled."
    )]
    SignatureMismatch { declared: String, magic: Vec<u8> },

    /// PNG chunk-level well-formedness check failed.
    #[error("PNG chunk structure is invalid: {detail}\nThe file may be truncated or corrupted.")]
    StructuralDefect { detail: String },

    /// I/O failure while reading file bytes (disk, permission, abort).
    #[error("Could not read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Byte sequence could not be rendered as Base64.
    ///
    /// Practically unreachable for in-memory buffers; declared so the
    /// encoder contract is total.
    #[error("Failed to encode file content: {detail}")]
    EncodeError { detail: String },

    // ── Serializer validation errors ──────────────────────────────────────
    /// Empty or whitespace-only Base64 payload.
    #[error("There is no Base64 content to download")]
    EmptyContent,

    /// Payload contains characters outside the Base64 alphabet.
    #[error("Base64 content contains invalid characters")]
    InvalidCharacters,

    /// Cleaned payload length is not a multiple of 4.
    #[error(
        "Base64 content is incomplete ({len} characters is not a multiple of 4) — \
         check that the conversion finished"
    )]
    IncompleteEncoding { len: usize },

    // ── Delivery errors ───────────────────────────────────────────────────
    /// Neither the system clipboard nor the fallback file could take the text.
    #[error("Clipboard is unavailable: {detail}")]
    ClipboardUnavailable { detail: String },

    /// Automatic download is not supported in this environment.
    ///
    /// The serializer still writes the payload to a fallback location; this
    /// variant carries the explanation shown alongside the degraded outcome.
    #[error("Automatic download is not supported here: {detail}")]
    DownloadUnsupported { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Session errors ────────────────────────────────────────────────────
    /// `convert()` was called while a previous attempt is still in flight.
    #[error(
        "A conversion is already in progress for this session — \
         call reset() or select a new file before retrying"
    )]
    ConversionInProgress,

    /// `convert()` was called with no file selected.
    #[error("No file selected — choose a JPEG or PNG image first")]
    NoFileSelected,

    /// An operation required a completed conversion but none exists.
    #[error("No conversion result available: {detail}")]
    NoResult { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_limit_display() {
        let e = Img2B64Error::SizeLimitExceeded {
            size: 11 * 1024 * 1024,
            limit: 10 * 1024 * 1024,
        };
        let msg = e.to_string();
        assert!(msg.contains("11534336"), "got: {msg}");
        assert!(msg.contains("10 MiB"), "got: {msg}");
    }

    #[test]
    fn signature_mismatch_shows_magic_bytes() {
        let e = Img2B64Error::SignatureMismatch {
            declared: "image/jpeg".into(),
            magic: vec![0x00, 0x00, 0x00],
        };
        let msg = e.to_string();
        assert!(msg.contains("image/jpeg"));
        assert!(msg.contains("00"), "got: {msg}");
    }

    #[test]
    fn incomplete_encoding_display() {
        let e = Img2B64Error::IncompleteEncoding { len: 7 };
        assert!(e.to_string().contains("7 characters"));
    }

    #[test]
    fn read_error_preserves_source() {
        use std::error::Error as _;
        let e = Img2B64Error::ReadError {
            path: PathBuf::from("/tmp/x.png"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/tmp/x.png"));
    }

    #[test]
    fn conversion_in_progress_mentions_reset() {
        assert!(Img2B64Error::ConversionInProgress
            .to_string()
            .contains("reset()"));
    }
}
