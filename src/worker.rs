//! The standing worker: executes jobs the bridge accepted.
//!
//! One long-lived task owns the receiving end of the queue and processes
//! jobs to completion, one at a time. That single-consumer discipline is
//! what guarantees a document's page batches are delivered in page order.
//! A failed job is logged and, when possible, reported to the caller over
//! the chat transport; it is never retried and never surfaces through the
//! HTTP intake that accepted it.

use crate::bridge::Job;
use crate::config::ServiceConfig;
use crate::convert::{self, Target};
use crate::error::{ContentKind, RelayError};
use crate::model::{Element, Snapshot};
use crate::pipeline::{chunk, dedupe::Deduper, extract, tables};
use crate::session::SessionStore;
use crate::storage::BlobStore;
use crate::transport::ChatTransport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Executes background jobs against the shared stores and transport.
pub struct Worker {
    sessions: Arc<SessionStore>,
    blobs: BlobStore,
    transport: Arc<dyn ChatTransport>,
    config: ServiceConfig,
}

impl Worker {
    pub fn new(
        sessions: Arc<SessionStore>,
        blobs: BlobStore,
        transport: Arc<dyn ChatTransport>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            sessions,
            blobs,
            transport,
            config,
        }
    }

    /// Consume the queue until it closes.
    ///
    /// Per-job errors are absorbed here; only a closed queue ends the loop.
    pub async fn run(self, mut rx: mpsc::Receiver<Job>) {
        info!("worker started");
        while let Some(job) = rx.recv().await {
            let caller = job.caller().to_string();
            if let Err(e) = self.handle(job).await {
                warn!("task for '{caller}' failed: {e}");
                // Fire-and-forget at the HTTP boundary, but not silent to
                // the user: failures are relayed as a chat message.
                if let Err(send_err) = self.transport.send_text(&caller, &e.user_message()).await {
                    warn!("could not report failure to '{caller}': {send_err}");
                }
            }
        }
        info!("queue closed; worker exiting");
    }

    async fn handle(&self, job: Job) -> Result<(), RelayError> {
        match job {
            Job::Ingest { caller } => self.ingest(&caller).await,
            Job::Deliver { caller, target } => self.deliver(&caller, target).await,
            Job::Reset { caller } => self.reset(&caller).await,
        }
    }

    /// Extract the stored upload once and cache the snapshot; every later
    /// delivery for this upload reads the same parse.
    async fn ingest(&self, caller: &str) -> Result<(), RelayError> {
        let source = self.blobs.path_for(caller);
        let pages = extract::extract(&source).await?;
        let page_count = pages.len();

        self.sessions.put(caller, Snapshot { source, pages });
        info!("ingested {page_count} pages for '{caller}'");

        self.transport
            .send_text(
                caller,
                &format!("Document ready: {page_count} pages. Request an output format."),
            )
            .await
    }

    async fn deliver(&self, caller: &str, target: Target) -> Result<(), RelayError> {
        let Some(snapshot) = self.sessions.get(caller) else {
            return self
                .transport
                .send_text(caller, "No document found. Upload a PDF first.")
                .await;
        };

        match target {
            Target::Document => self.deliver_document(caller, &snapshot).await,
            Target::Text => self.deliver_text(caller, &snapshot).await,
            Target::Spreadsheet => self.deliver_spreadsheet(caller, &snapshot).await,
            Target::ChatText => self.replay_chat(caller, &snapshot, false).await,
            Target::ChatFull => self.replay_chat(caller, &snapshot, true).await,
        }
    }

    async fn deliver_document(&self, caller: &str, snapshot: &Snapshot) -> Result<(), RelayError> {
        if snapshot.is_empty() {
            return Err(RelayError::NoContent {
                kind: ContentKind::Elements,
            });
        }
        // Image decoding during the build is CPU-bound.
        let pages = snapshot.pages.clone();
        let artifact = tokio::task::spawn_blocking(move || convert::document::build_document(&pages))
            .await
            .map_err(|e| RelayError::Internal(format!("document build panicked: {e}")))??;

        self.transport
            .send_file(caller, convert::DOCUMENT_FILENAME, &artifact)
            .await
    }

    async fn deliver_text(&self, caller: &str, snapshot: &Snapshot) -> Result<(), RelayError> {
        let text = convert::text::build_text(&snapshot.pages);
        if text.is_empty() {
            return Err(RelayError::NoContent {
                kind: ContentKind::Text,
            });
        }
        self.transport
            .send_file(caller, convert::TEXT_FILENAME, text.as_bytes())
            .await
    }

    /// Tables come from an independent detection pass over the stored file.
    /// A source replaced by a newer upload mid-read surfaces as
    /// `UnreadableSource`, which the run loop reports to the caller.
    async fn deliver_spreadsheet(
        &self,
        caller: &str,
        snapshot: &Snapshot,
    ) -> Result<(), RelayError> {
        let tables = tables::extract_tables(
            &snapshot.source,
            self.config.table_row_tolerance,
            self.config.table_column_gap,
        )
        .await?;

        match convert::spreadsheet::build_spreadsheet(&tables)? {
            Some(artifact) => {
                self.transport
                    .send_file(caller, convert::SPREADSHEET_FILENAME, &artifact)
                    .await
            }
            None => Err(RelayError::NoContent {
                kind: ContentKind::Tables,
            }),
        }
    }

    /// Replay the snapshot into the chat as bounded messages, batch by
    /// batch in page order. With `include_images` the pass carries a fresh
    /// dedup set so a logo repeated on every page is sent once.
    async fn replay_chat(
        &self,
        caller: &str,
        snapshot: &Snapshot,
        include_images: bool,
    ) -> Result<(), RelayError> {
        let mut deduper = Deduper::new();
        let mut sent = 0usize;

        for batch in chunk::page_batches(&snapshot.pages, self.config.page_batch_size) {
            for page in batch {
                for element in &page.elements {
                    match element {
                        Element::Text(text) => {
                            for fragment in chunk::text_chunks(text, self.config.chunk_limit) {
                                self.transport.send_text(caller, fragment).await?;
                                sent += 1;
                                self.pace().await;
                            }
                        }
                        Element::Image { bytes, .. } if include_images => {
                            if deduper.admit(element) {
                                self.transport.send_image(caller, bytes).await?;
                                sent += 1;
                                self.pace().await;
                            }
                        }
                        Element::Image { .. } => {}
                    }
                }
            }
        }

        if sent == 0 {
            return Err(RelayError::NoContent {
                kind: if include_images {
                    ContentKind::Elements
                } else {
                    ContentKind::Text
                },
            });
        }
        Ok(())
    }

    async fn reset(&self, caller: &str) -> Result<(), RelayError> {
        self.sessions.clear(caller);
        if let Err(e) = self.blobs.remove(caller).await {
            warn!("could not remove stored upload for '{caller}': {e}");
        }
        self.transport
            .send_text(caller, "Session cleared. Send a new PDF.")
            .await
    }

    async fn pace(&self) {
        if self.config.send_pacing_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.send_pacing_ms)).await;
        }
    }
}
