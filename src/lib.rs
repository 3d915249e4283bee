//! # pdfrelay
//!
//! Decompose a PDF into typed content elements and relay them as a Word
//! document, plain text, a spreadsheet, or a stream of size-bounded chat
//! messages.
//!
//! ## Why this crate?
//!
//! Chat platforms are a terrible place to read a PDF: messages are capped
//! at a few thousand characters, tables turn to mush, and attachments want
//! specific formats. This crate sits behind a webhook, takes one upload per
//! caller, extracts its structural content exactly once, and re-renders
//! that single parse into whichever output the caller asks for next.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Intake    validate type + magic, store blob, ack immediately
//!  ├─ 2. Bridge    bounded queue to the standing worker (fire-and-forget)
//!  ├─ 3. Extract   per-page text + embedded images via pdfium (spawn_blocking)
//!  ├─ 4. Cache     snapshot in the caller's session (one parse per upload)
//!  └─ 5. Deliver   docx / txt / xlsx artifact, or chunked chat replay
//! ```
//!
//! Table detection is a separate pass with its own heuristic, run lazily
//! when a spreadsheet is requested.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfrelay::{api, ServiceConfig, WebhookTransport};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::default();
//!     let transport = Arc::new(WebhookTransport::new("http://chat.example/outbound"));
//!     api::serve(config, transport).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfrelay` server binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when embedding only the library:
//! ```toml
//! pdfrelay = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod bridge;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod session;
pub mod storage;
pub mod transport;
pub mod worker;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use bridge::{Bridge, Job};
pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use convert::Target;
pub use error::{AssetError, ContentKind, RelayError};
pub use model::{Element, Page, Snapshot, Table};
pub use session::SessionStore;
pub use storage::BlobStore;
pub use transport::{ChatTransport, WebhookTransport, MAX_MESSAGE_CHARS};
pub use worker::Worker;
