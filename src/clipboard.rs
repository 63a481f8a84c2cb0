//! Clipboard delivery with a manual-copy fallback.
//!
//! The primary path talks to the system clipboard through [`arboard`]. On a
//! headless host (no display server, no clipboard daemon) that fails at
//! runtime, not at compile time — so failure is an expected outcome here,
//! and the text is written to a persisted temp file instead, whose path the
//! caller can show for manual copying. The payload is never silently
//! dropped; [`Img2B64Error::ClipboardUnavailable`] only surfaces when both
//! paths fail.

use crate::error::Img2B64Error;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};

/// How the text was made available to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The text is on the system clipboard.
    Clipboard,
    /// The clipboard was unavailable; the text is in this file for manual
    /// copy.
    FallbackFile(PathBuf),
}

/// Copy `text` to the system clipboard, falling back to a temp file.
///
/// The clipboard call is blocking (platform IPC) and runs under
/// `spawn_blocking` so it cannot stall the async executor.
pub async fn copy_text(text: &str) -> Result<CopyOutcome, Img2B64Error> {
    let owned = text.to_owned();
    let primary = tokio::task::spawn_blocking(move || {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(owned)
    })
    .await;

    let failure = match primary {
        Ok(Ok(())) => {
            debug!("Copied {} chars to clipboard", text.len());
            return Ok(CopyOutcome::Clipboard);
        }
        Ok(Err(e)) => e.to_string(),
        Err(join) => format!("clipboard task panicked: {join}"),
    };
    warn!("Clipboard write failed ({}), using fallback file", failure);

    match write_fallback(text) {
        Ok(path) => Ok(CopyOutcome::FallbackFile(path)),
        Err(e) => Err(Img2B64Error::ClipboardUnavailable {
            detail: format!("{failure}; fallback file failed too: {e}"),
        }),
    }
}

/// Persist the text to a temp file the user can open and copy from.
fn write_fallback(text: &str) -> std::io::Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix("img2b64-clipboard-")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(text.as_bytes())?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    debug!("Clipboard fallback written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_file_holds_the_text() {
        let path = write_fallback("aGVsbG8=").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "aGVsbG8=");
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn copy_never_drops_the_payload() {
        // Headless CI has no clipboard; a desktop does. Either way the text
        // must end up somewhere retrievable.
        match copy_text("dGVzdA==").await.unwrap() {
            CopyOutcome::Clipboard => {}
            CopyOutcome::FallbackFile(path) => {
                let content = std::fs::read_to_string(&path).unwrap();
                assert_eq!(content, "dGVzdA==");
                std::fs::remove_file(path).ok();
            }
        }
    }
}
