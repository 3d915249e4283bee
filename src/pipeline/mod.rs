//! Pipeline stages for document decomposition.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the table heuristic) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ dedupe ──▶ chunk ──▶ convert / transport
//! (bytes/URL) (pdfium)  (per-pass)  (4096)
//!                └─▶ tables ─────────────▶ spreadsheet
//! ```
//!
//! 1. [`input`]   — validate the uploaded payload or fetch a URL reference
//! 2. [`extract`] — per-page text and embedded images; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`tables`]  — independent grid-detection pass over word positions
//! 4. [`dedupe`]  — drop repeated image payloads within one pass
//! 5. [`chunk`]   — size-bound text fragments and page batches for delivery

pub mod chunk;
pub mod dedupe;
pub mod extract;
pub mod input;
pub mod tables;
