//! Pipeline stages for image-to-Base64 conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets the
//! session re-sequence them (a PNG's structural check and the encoder share
//! one full read) without any stage knowing about the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ signature ──▶ encode ──▶ serialize
//! (path)    (magic bytes,  (base64    (.txt artifact,
//!            PNG chunks)    artifact)   staged hand-off)
//! ```
//!
//! 1. [`input`]     — capture the candidate file's name, size and declared
//!    media type; all reads are explicit and size-gated
//! 2. [`signature`] — verify the declared type against the leading byte
//!    signature; shallow PNG chunk sanity check
//! 3. [`encode`]    — full read → standard Base64 artifact with a sanitized
//!    source name
//! 4. [`serialize`] — validate any Base64 payload and write the timestamped
//!    `.txt` file, reporting per-stage progress
pub mod encode;
pub mod input;
pub mod serialize;
pub mod signature;
