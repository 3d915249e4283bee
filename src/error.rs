//! Error types for the pdfrelay library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`RelayError`] — **Fatal for one task**: the current ingest or delivery
//!   cannot proceed (unreadable source, full dispatch queue, artifact build
//!   failure). Returned as `Err(RelayError)` from the library entry points.
//!
//! * [`AssetError`] — **Non-fatal**: a single embedded image could not be
//!   decoded or re-encoded. The offending element is skipped with a warning
//!   and the surrounding conversion continues; one bad logo must never cost
//!   the caller the whole document.
//!
//! Nothing here is retried automatically. A failed task is reported (to the
//! log, and to the chat transport when a caller is known) and discarded;
//! retry decisions belong to the user re-uploading the document.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfrelay library.
///
/// Per-image failures use [`AssetError`] and are absorbed inside the
/// converters rather than propagated here.
#[derive(Debug, Error)]
pub enum RelayError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{}'", .path.display())]
    FileNotFound { path: PathBuf },

    /// The payload's declared media type is not the one this service accepts.
    #[error("Unsupported media type '{mime}': expected application/pdf")]
    UnsupportedMediaType { mime: String },

    /// A document reference URL could not be fetched.
    #[error("Failed to fetch document from '{url}': {reason}")]
    FetchFailed { url: String, reason: String },

    /// The source exists but cannot be opened or parsed as a PDF.
    ///
    /// Also produced when a stored source is replaced or deleted by a later
    /// upload while a conversion is reading it.
    #[error("File is not a readable PDF: '{}': {detail}", .path.display())]
    UnreadableSource { path: PathBuf, detail: String },

    // ── Extraction/conversion errors ──────────────────────────────────────
    /// Extraction succeeded but produced nothing of the requested kind.
    ///
    /// Mapped to a user-visible "nothing found" chat message, never to a
    /// failed HTTP response.
    #[error("No {kind} found in the document")]
    NoContent { kind: ContentKind },

    /// An artifact builder failed as a whole (not a single skipped image).
    #[error("Failed to build {format} artifact: {detail}")]
    ArtifactBuild { format: &'static str, detail: String },

    // ── Bridge errors ─────────────────────────────────────────────────────
    /// The task queue is saturated; the intake must answer without blocking.
    #[error("Task queue is full; try again shortly")]
    DispatchFailure,

    // ── I/O and delivery errors ───────────────────────────────────────────
    /// Blob store read/write failed.
    #[error("Storage error at '{}': {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An outbound transport send failed.
    #[error("Transport delivery failed: {detail}")]
    Transport { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// What kind of content a [`RelayError::NoContent`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// No text or image elements at all.
    Elements,
    /// No text blocks (plain-text or chat-text delivery).
    Text,
    /// No grid regions with at least two rows.
    Tables,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Elements => write!(f, "content"),
            ContentKind::Text => write!(f, "text"),
            ContentKind::Tables => write!(f, "tables"),
        }
    }
}

/// A non-fatal error for a single embedded image.
///
/// Recorded with `tracing::warn!` where it occurs; the element is skipped
/// and the conversion continues with the next one.
#[derive(Debug, Clone, Error)]
pub enum AssetError {
    /// The image bytes could not be decoded even for re-encoding.
    #[error("Page {page}: image not embeddable: {detail}")]
    UnsupportedImage { page: usize, detail: String },
}

impl RelayError {
    /// The short, user-visible message relayed through the chat transport
    /// when a background task fails after the HTTP intake already answered.
    pub fn user_message(&self) -> String {
        match self {
            RelayError::UnreadableSource { .. } | RelayError::FileNotFound { .. } => {
                "The file could not be read as a PDF. Please upload it again.".to_string()
            }
            RelayError::NoContent { kind } => format!("No {kind} found in the document."),
            RelayError::DispatchFailure => {
                "The service is busy right now; try again shortly.".to_string()
            }
            _ => "Something went wrong while processing the document.".to_string(),
        }
    }
}
