//! Service configuration.
//!
//! All runtime behaviour is controlled through [`ServiceConfig`], built via
//! its [`ServiceConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share the config across the HTTP state and the worker task,
//! and to diff two deployments to understand why their behaviour differs.

use crate::error::RelayError;
use crate::transport::MAX_MESSAGE_CHARS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the pdfrelay service.
///
/// Built via [`ServiceConfig::builder()`] or using
/// [`ServiceConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfrelay::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .queue_capacity(128)
///     .page_batch_size(20)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP intake binds to. Default: `127.0.0.1`.
    pub bind_host: String,

    /// Port the HTTP intake binds to. Default: `8080`.
    pub bind_port: u16,

    /// Directory for uploaded sources and generated artifacts. Default:
    /// `$TMPDIR/pdfrelay`.
    ///
    /// Storage here is ephemeral: one file per caller, overwritten on each
    /// new upload, removed on reset. Nothing survives a restart by contract.
    pub storage_dir: PathBuf,

    /// Capacity of the bridge's task queue. Default: 64.
    ///
    /// When the queue is full the intake answers with a transient failure
    /// instead of blocking, so back-pressure is observable rather than an
    /// unbounded pile of spawned tasks.
    pub queue_capacity: usize,

    /// Maximum characters per outbound chat message. Default: 4096.
    ///
    /// Text blocks longer than this are split into successive fragments of
    /// exactly this size (last one shorter) before delivery.
    pub chunk_limit: usize,

    /// Pages per processing batch in chat replay. Default: 30.
    ///
    /// A multi-hundred-page document is delivered in bounded waves so peak
    /// memory and transport load stay flat regardless of document size.
    pub page_batch_size: usize,

    /// Delay between consecutive outbound chat messages, in milliseconds.
    /// Default: 50.
    ///
    /// Chat transports rate-limit aggressively; a short fixed pause between
    /// sends stays well under typical per-second message caps.
    pub send_pacing_ms: u64,

    /// Maximum accepted upload size in bytes. Default: 50 MB.
    pub max_upload_bytes: usize,

    /// Timeout for fetching a URL-referenced document, in seconds.
    /// Default: 120.
    pub fetch_timeout_secs: u64,

    /// Vertical tolerance when grouping words into table rows, in PDF
    /// points. Default: 5.0.
    ///
    /// Words whose vertical centers differ by less than this land in the
    /// same row. Raise it for documents with ragged baselines.
    pub table_row_tolerance: f32,

    /// Minimum horizontal gap that separates two table columns, in PDF
    /// points. Default: 12.0.
    pub table_column_gap: f32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".to_string(),
            bind_port: 8080,
            storage_dir: std::env::temp_dir().join("pdfrelay"),
            queue_capacity: 64,
            chunk_limit: MAX_MESSAGE_CHARS,
            page_batch_size: 30,
            send_pacing_ms: 50,
            max_upload_bytes: 50 * 1024 * 1024,
            fetch_timeout_secs: 120,
            table_row_tolerance: 5.0,
            table_column_gap: 12.0,
        }
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    /// Socket address string the intake binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn bind_host(mut self, host: impl Into<String>) -> Self {
        self.config.bind_host = host.into();
        self
    }

    pub fn bind_port(mut self, port: u16) -> Self {
        self.config.bind_port = port;
        self
    }

    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.storage_dir = dir.into();
        self
    }

    pub fn queue_capacity(mut self, n: usize) -> Self {
        self.config.queue_capacity = n.max(1);
        self
    }

    pub fn chunk_limit(mut self, n: usize) -> Self {
        self.config.chunk_limit = n;
        self
    }

    pub fn page_batch_size(mut self, n: usize) -> Self {
        self.config.page_batch_size = n.max(1);
        self
    }

    pub fn send_pacing_ms(mut self, ms: u64) -> Self {
        self.config.send_pacing_ms = ms;
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs;
        self
    }

    pub fn table_row_tolerance(mut self, pts: f32) -> Self {
        self.config.table_row_tolerance = pts;
        self
    }

    pub fn table_column_gap(mut self, pts: f32) -> Self {
        self.config.table_column_gap = pts;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, RelayError> {
        let c = &self.config;
        if c.chunk_limit == 0 {
            return Err(RelayError::InvalidConfig(
                "chunk_limit must be ≥ 1".into(),
            ));
        }
        if c.queue_capacity == 0 {
            return Err(RelayError::InvalidConfig(
                "queue_capacity must be ≥ 1".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(RelayError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        if !(c.table_row_tolerance > 0.0) {
            return Err(RelayError::InvalidConfig(format!(
                "table_row_tolerance must be positive, got {}",
                c.table_row_tolerance
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = ServiceConfig::builder().build().unwrap();
        assert_eq!(c.chunk_limit, 4096);
        assert_eq!(c.page_batch_size, 30);
        assert_eq!(c.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn zero_chunk_limit_rejected() {
        let err = ServiceConfig::builder().chunk_limit(0).build();
        assert!(matches!(err, Err(RelayError::InvalidConfig(_))));
    }

    #[test]
    fn batch_size_clamped_to_one() {
        let c = ServiceConfig::builder().page_batch_size(0).build().unwrap();
        assert_eq!(c.page_batch_size, 1);
    }

    #[test]
    fn negative_row_tolerance_rejected() {
        let err = ServiceConfig::builder().table_row_tolerance(-1.0).build();
        assert!(err.is_err());
    }
}
