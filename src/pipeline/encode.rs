//! Encoding: validated file bytes → Base64 [`EncodedArtifact`].
//!
//! The artifact stores *raw* standard Base64, never a `data:` URI — the
//! serializer validates the same string against the Base64 character class,
//! and a `data:image/png;base64,` prefix can never pass that check. Storing
//! the bare encoding keeps encode → serialize self-consistent;
//! [`EncodedArtifact::data_uri`] composes the prefixed form on demand.
//!
//! The source file name rides along on the artifact and may later be
//! rendered or used to build another file name, so it is sanitized here,
//! once, at the trust boundary — markup, quotes, path separators and control
//! characters are stripped before the name is attached.

use crate::error::Img2B64Error;
use crate::output::EncodedArtifact;
use crate::pipeline::input::RawFile;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Characters never allowed in an attached file name: markup and script
/// delimiters, quotes, path separators and shell-ish metacharacters, plus
/// ASCII control characters.
static UNSAFE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"'&`|?*/\\\x00-\x1F\x7F]+"#).expect("valid regex"));

/// Strip injection-capable characters from a file name.
///
/// Returns `unnamed` when nothing safe survives, so downstream formatting
/// never sees an empty name.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned = UNSAFE_NAME_CHARS.replace_all(name, "");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Read the file fully and produce its Base64 artifact.
///
/// Single attempt, no internal retry — the session orchestrates retries by
/// re-running the whole attempt. Fails with `ReadError` if the underlying
/// read fails.
pub async fn encode_file(file: &RawFile) -> Result<EncodedArtifact, Img2B64Error> {
    let bytes = file.read_all().await?;
    encode_bytes(&bytes, file)
}

/// Encode already-read bytes.
///
/// Used by the session when validation had to read the full content anyway
/// (PNG structure check), so each attempt reads the file exactly once.
/// `EncodeError` is declared for contract completeness; rendering an
/// in-memory buffer as Base64 cannot fail in practice.
pub fn encode_bytes(bytes: &[u8], file: &RawFile) -> Result<EncodedArtifact, Img2B64Error> {
    let base64_text = STANDARD.encode(bytes);
    debug!(
        "Encoded '{}' → {} bytes base64",
        file.name(),
        base64_text.len()
    );

    Ok(EncodedArtifact {
        base64_text,
        source_file_name: sanitize_file_name(file.name()),
        source_byte_len: bytes.len() as u64,
        media_type: file.media_type(),
        created_at: chrono::Local::now(),
    })
}
