//! Configuration types for image-to-Base64 conversion.
//!
//! All behaviour is controlled through [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config across a session and its one-shot helpers, and
//! to diff two runs to understand why their outcomes differ.
//!
//! # Design choice: builder over constructor
//! Callers set only what they care about and rely on documented defaults for
//! the rest; `build()` validates the combination once instead of every
//! operation re-checking it.

use crate::error::Img2B64Error;
use crate::progress::DownloadCallback;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Maximum accepted input file size: 10 MiB.
///
/// Applied twice, deliberately: to the input file before any content read,
/// and to the cleaned Base64 payload before serialization — an artifact
/// pasted in from elsewhere gets the same bound as one we produced.
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// How long the serializer keeps its staging directory alive after handing
/// the artifact to its destination.
///
/// Long enough for any consumer holding the staged path to finish reading,
/// short enough to avoid unbounded temp-space retention.
pub const STAGING_GRACE: Duration = Duration::from_secs(30);

/// Configuration for a conversion session.
///
/// Built via [`ConversionConfig::builder()`] or
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use img2b64::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .output_dir("out")
///     .max_file_size(2 * 1024 * 1024)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Maximum accepted file size in bytes. Default: 10 MiB.
    ///
    /// Checked against the file's metadata *before* any content read, so an
    /// oversized file costs one `stat`, not a 100 MB read. The same limit
    /// bounds the cleaned Base64 payload at serialization time.
    pub max_file_size: u64,

    /// Directory the `.txt` artifact is written to. Default: `None` (the
    /// process working directory).
    ///
    /// Created on demand. If it cannot be created or written, the serializer
    /// degrades to the fallback path instead of failing silently.
    pub output_dir: Option<PathBuf>,

    /// Grace period before the serializer's staging directory is removed.
    /// Default: [`STAGING_GRACE`] (30 s).
    ///
    /// Tests shorten this to avoid waiting on the cleanup task.
    pub staging_grace: Duration,

    /// Observer for serializer stage transitions. Default: `None`.
    pub progress_callback: Option<DownloadCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE_BYTES,
            output_dir: None,
            staging_grace: STAGING_GRACE,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("max_file_size", &self.max_file_size)
            .field("output_dir", &self.output_dir)
            .field("staging_grace", &self.staging_grace)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn DownloadProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The directory artifacts are written to, defaulting to the working dir.
    pub(crate) fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn staging_grace(mut self, grace: Duration) -> Self {
        self.config.staging_grace = grace;
        self
    }

    pub fn progress_callback(mut self, cb: DownloadCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Img2B64Error> {
        let c = &self.config;
        if c.max_file_size == 0 {
            return Err(Img2B64Error::InvalidConfig(
                "max_file_size must be ≥ 1 byte".into(),
            ));
        }
        if c.max_file_size > MAX_FILE_SIZE_BYTES {
            return Err(Img2B64Error::InvalidConfig(format!(
                "max_file_size may not exceed {} bytes, got {}",
                MAX_FILE_SIZE_BYTES, c.max_file_size
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let c = ConversionConfig::default();
        assert_eq!(c.max_file_size, 10 * 1024 * 1024);
        assert_eq!(c.staging_grace, Duration::from_secs(30));
        assert!(c.output_dir.is_none());
        assert!(c.progress_callback.is_none());
    }

    #[test]
    fn builder_rejects_zero_limit() {
        let err = ConversionConfig::builder().max_file_size(0).build();
        assert!(matches!(err, Err(Img2B64Error::InvalidConfig(_))));
    }

    #[test]
    fn builder_rejects_limit_above_cap() {
        let err = ConversionConfig::builder()
            .max_file_size(MAX_FILE_SIZE_BYTES + 1)
            .build();
        assert!(matches!(err, Err(Img2B64Error::InvalidConfig(_))));
    }

    #[test]
    fn builder_accepts_custom_output_dir() {
        let c = ConversionConfig::builder()
            .output_dir("/tmp/out")
            .build()
            .unwrap();
        assert_eq!(c.resolved_output_dir(), PathBuf::from("/tmp/out"));
        assert_eq!(
            ConversionConfig::default().resolved_output_dir(),
            PathBuf::from(".")
        );
    }

    #[test]
    fn debug_elides_callback() {
        use crate::progress::NoopDownloadCallback;
        use std::sync::Arc;
        let c = ConversionConfig::builder()
            .progress_callback(Arc::new(NoopDownloadCallback))
            .build()
            .unwrap();
        let s = format!("{c:?}");
        assert!(s.contains("<dyn DownloadProgressCallback>"), "got: {s}");
    }
}
