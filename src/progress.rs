//! Progress-callback trait for serializer stage events.
//!
//! Inject an [`Arc<dyn DownloadProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to observe
//! each stage the serializer moves through while producing the `.txt`
//! artifact.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a UI update, or a terminal spinner without
//! the library knowing anything about how the host application communicates.
//! Callbacks are fire-and-forget — the serializer never waits on them and
//! ignores anything they do, so a slow observer cannot stall the pipeline.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The serializer state machine, one instance per `download_as_txt` call.
///
/// `Pending → Validating → Generating → Downloading → Completed`, with
/// `Error` reachable from any stage. The error message lives on the variant,
/// so a stage can never carry a stale error string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum DownloadStage {
    /// Invocation accepted, nothing done yet.
    Pending,
    /// Checking the payload: emptiness, character class, padding, size.
    Validating,
    /// Deriving the timestamped file name and probing the environment.
    Generating,
    /// Writing the payload and handing it off to its destination.
    Downloading,
    /// Artifact delivered.
    Completed,
    /// The invocation failed or degraded; `message` explains why.
    Error { message: String },
}

/// Observes serializer stage transitions.
///
/// Implementations must be `Send + Sync` (the staging-cleanup task may
/// outlive the invocation). The single method has a default no-op body so
/// observers implement only what they care about.
pub trait DownloadProgressCallback: Send + Sync {
    /// Called once per stage transition with the stage just entered.
    fn on_stage_change(&self, stage: &DownloadStage) {
        let _ = stage;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopDownloadCallback;

impl DownloadProgressCallback for NoopDownloadCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type DownloadCallback = Arc<dyn DownloadProgressCallback>;
