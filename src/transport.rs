//! Outbound chat transport.
//!
//! The worker delivers everything — confirmations, chunk streams, file
//! artifacts, error notices — through the [`ChatTransport`] trait, so the
//! wire format of any particular chat platform stays outside this crate.
//! The shipped [`WebhookTransport`] POSTs JSON messages (binary payloads
//! base64-encoded) to a configured endpoint; tests substitute a recording
//! implementation.

use crate::error::RelayError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use tracing::debug;

/// Upper bound on characters per outbound text message.
///
/// Chunking guarantees every `send_text` call stays at or under this.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Delivery seam between the worker and the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one text message (at most [`MAX_MESSAGE_CHARS`] characters).
    async fn send_text(&self, caller: &str, text: &str) -> Result<(), RelayError>;

    /// Send one image message with a PNG payload.
    async fn send_image(&self, caller: &str, png: &[u8]) -> Result<(), RelayError>;

    /// Send a named file artifact.
    async fn send_file(
        &self,
        caller: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<(), RelayError>;
}

/// One outbound message as posted by [`WebhookTransport`].
#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    caller: &'a str,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime: Option<&'static str>,
}

/// Transport that forwards every message to an HTTP endpoint as JSON.
#[derive(Debug, Clone)]
pub struct WebhookTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    async fn post(&self, message: &OutboundMessage<'_>) -> Result<(), RelayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(message)
            .send()
            .await
            .map_err(|e| RelayError::Transport {
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RelayError::Transport {
                detail: format!("endpoint answered HTTP {}", response.status()),
            });
        }
        debug!("delivered {} message for {}", message.kind, message.caller);
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for WebhookTransport {
    async fn send_text(&self, caller: &str, text: &str) -> Result<(), RelayError> {
        self.post(&OutboundMessage {
            caller,
            kind: "text",
            text: Some(text),
            filename: None,
            payload: None,
            mime: None,
        })
        .await
    }

    async fn send_image(&self, caller: &str, png: &[u8]) -> Result<(), RelayError> {
        self.post(&OutboundMessage {
            caller,
            kind: "image",
            text: None,
            filename: None,
            payload: Some(STANDARD.encode(png)),
            mime: Some("image/png"),
        })
        .await
    }

    async fn send_file(
        &self,
        caller: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<(), RelayError> {
        self.post(&OutboundMessage {
            caller,
            kind: "file",
            text: None,
            filename: Some(filename),
            payload: Some(STANDARD.encode(bytes)),
            mime: Some("application/octet-stream"),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_message_serializes_compactly() {
        let msg = OutboundMessage {
            caller: "c1",
            kind: "text",
            text: Some("hi"),
            filename: None,
            payload: None,
            mime: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"caller":"c1","kind":"text","text":"hi"}"#);
    }

    #[test]
    fn image_payload_is_base64() {
        let msg = OutboundMessage {
            caller: "c1",
            kind: "image",
            text: None,
            filename: None,
            payload: Some(STANDARD.encode([1u8, 2, 3])),
            mime: Some("image/png"),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("AQID"));
        assert!(json.contains("image/png"));
    }
}
