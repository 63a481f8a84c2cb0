//! Input resolution: turn a user-supplied path into a validated [`RawFile`].
//!
//! ## Why a descriptor instead of bytes?
//!
//! The size limit must be enforced *before* any content read — an oversized
//! file costs one metadata call, never a full read. `RawFile` therefore
//! captures name, declared media type and byte length up front, and exposes
//! explicit read operations (`read_prefix`, `read_all`) that the validation
//! and encode stages call when — and only when — the earlier checks passed.
//! I/O failures surface as [`Img2B64Error::ReadError`], distinct from a
//! format mismatch.

use crate::error::Img2B64Error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Declared media type of an input file.
///
/// Exactly the accepted declarations: `image/jpeg`, `image/jpg`, `image/png`.
/// Everything else is rejected as [`Img2B64Error::UnsupportedMediaType`]
/// before any byte is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Jpeg,
    Png,
}

impl MediaType {
    /// Parse a declared media-type string. `image/jpg` is a common
    /// non-standard alias and is accepted as JPEG.
    pub fn from_declared(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(MediaType::Jpeg),
            "image/png" => Some(MediaType::Png),
            _ => None,
        }
    }

    /// Infer the declared type from a file extension, the way a picker would.
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path
            .extension()?
            .to_str()?
            .to_ascii_lowercase()
            .as_str()
        {
            "jpg" | "jpeg" => Some(MediaType::Jpeg),
            "png" => Some(MediaType::Png),
            _ => None,
        }
    }

    /// Canonical media-type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
        }
    }
}

/// One candidate input file: path, name, declared type, byte length.
///
/// Immutable once constructed; the session owns it for the duration of a
/// conversion attempt and discards it on reset or replacement.
#[derive(Debug, Clone)]
pub struct RawFile {
    path: PathBuf,
    name: String,
    media_type: MediaType,
    byte_len: u64,
}

impl RawFile {
    /// Build a descriptor from a path, inferring the declared type from the
    /// extension.
    ///
    /// Fails with `FileNotFound` for a missing path, `ReadError` for an
    /// unreadable one, and `UnsupportedMediaType` for an extension outside
    /// JPEG/PNG. No file content is read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, Img2B64Error> {
        let path = path.as_ref();
        let media_type = MediaType::from_extension(path).ok_or_else(|| {
            Img2B64Error::UnsupportedMediaType {
                media_type: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("(none)")
                    .to_string(),
            }
        })?;
        Self::with_declared_type(path, media_type).await
    }

    /// Build a descriptor with an explicitly declared media type, for
    /// callers whose input carries its own type label (upload metadata,
    /// HTTP headers of a proxied file, …).
    pub async fn with_declared_type(
        path: impl AsRef<Path>,
        media_type: MediaType,
    ) -> Result<Self, Img2B64Error> {
        let path = path.as_ref().to_path_buf();

        let meta = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Img2B64Error::FileNotFound { path });
            }
            Err(e) => return Err(Img2B64Error::ReadError { path, source: e }),
        };
        if !meta.is_file() {
            return Err(Img2B64Error::FileNotFound { path });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());

        debug!(
            "Selected input '{}': {} bytes, declared {}",
            name,
            meta.len(),
            media_type.as_str()
        );

        Ok(Self {
            path,
            name,
            media_type,
            byte_len: meta.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// Enforce the size limit against the recorded metadata — no read.
    pub fn ensure_within_limit(&self, limit: u64) -> Result<(), Img2B64Error> {
        if self.byte_len > limit {
            return Err(Img2B64Error::SizeLimitExceeded {
                size: self.byte_len,
                limit,
            });
        }
        Ok(())
    }

    /// Read at most `n` leading bytes (fewer if the file is shorter).
    pub async fn read_prefix(&self, n: usize) -> Result<Vec<u8>, Img2B64Error> {
        use tokio::io::AsyncReadExt;

        let mut f = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| Img2B64Error::ReadError {
                path: self.path.clone(),
                source: e,
            })?;
        let mut buf = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            let read = f
                .read(&mut buf[filled..])
                .await
                .map_err(|e| Img2B64Error::ReadError {
                    path: self.path.clone(),
                    source: e,
                })?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        buf.truncate(filled);
        Ok(buf)
    }

    /// Read the entire file content.
    pub async fn read_all(&self) -> Result<Vec<u8>, Img2B64Error> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| Img2B64Error::ReadError {
                path: self.path.clone(),
                source: e,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_type_accepts_the_three_labels() {
        assert_eq!(MediaType::from_declared("image/jpeg"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_declared("image/jpg"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_declared("image/png"), Some(MediaType::Png));
        assert_eq!(MediaType::from_declared("IMAGE/PNG"), Some(MediaType::Png));
        assert_eq!(MediaType::from_declared("image/gif"), None);
        assert_eq!(MediaType::from_declared(""), None);
    }

    #[test]
    fn extension_inference() {
        assert_eq!(
            MediaType::from_extension(Path::new("a/photo.JPG")),
            Some(MediaType::Jpeg)
        );
        assert_eq!(
            MediaType::from_extension(Path::new("shot.jpeg")),
            Some(MediaType::Jpeg)
        );
        assert_eq!(
            MediaType::from_extension(Path::new("icon.png")),
            Some(MediaType::Png)
        );
        assert_eq!(MediaType::from_extension(Path::new("doc.pdf")), None);
        assert_eq!(MediaType::from_extension(Path::new("noext")), None);
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let err = RawFile::from_path("/definitely/not/here.png")
            .await
            .unwrap_err();
        assert!(matches!(err, Img2B64Error::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn unsupported_extension_rejected_without_io() {
        let err = RawFile::from_path("/definitely/not/here.gif")
            .await
            .unwrap_err();
        // The gif extension loses before the missing path is ever touched.
        assert!(matches!(err, Img2B64Error::UnsupportedMediaType { .. }));
    }

    #[tokio::test]
    async fn descriptor_captures_metadata_and_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        tokio::fs::write(&path, b"\x89PNG\r\n\x1a\nrest").await.unwrap();

        let raw = RawFile::from_path(&path).await.unwrap();
        assert_eq!(raw.name(), "tiny.png");
        assert_eq!(raw.media_type(), MediaType::Png);
        assert_eq!(raw.byte_len(), 12);

        assert!(raw.ensure_within_limit(12).is_ok());
        let err = raw.ensure_within_limit(11).unwrap_err();
        assert!(matches!(err, Img2B64Error::SizeLimitExceeded { size: 12, limit: 11 }));

        let prefix = raw.read_prefix(8).await.unwrap();
        assert_eq!(prefix, b"\x89PNG\r\n\x1a\n");
        // Prefix longer than the file truncates instead of erroring.
        let long = raw.read_prefix(64).await.unwrap();
        assert_eq!(long.len(), 12);

        let all = raw.read_all().await.unwrap();
        assert_eq!(all.len(), 12);
    }
}
