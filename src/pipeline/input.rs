//! Inbound payload validation and URL-reference fetching.
//!
//! Uploads arrive either as raw bytes in the request or as a URL reference
//! to the chat platform's file storage. Either way the bytes are validated
//! against the PDF magic before a task is ever dispatched, so callers get a
//! meaningful rejection instead of a worker-side parse crash later.

use crate::error::RelayError;
use tracing::{debug, info};

/// The media type this service accepts.
pub const PDF_MIME: &str = "application/pdf";

/// Check a declared media type against the one expected.
pub fn is_pdf_mime(mime: &str) -> bool {
    // Parameters like "; charset=binary" are irrelevant to the check.
    mime.split(';').next().map(str::trim) == Some(PDF_MIME)
}

/// Check the payload's leading magic bytes.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && &bytes[..4] == b"%PDF"
}

/// Validate an inbound payload: declared type first, then magic bytes.
///
/// Returns the error the HTTP intake reports verbatim; no task is submitted
/// when this fails.
pub fn validate_upload(mime: &str, bytes: &[u8]) -> Result<(), RelayError> {
    if !is_pdf_mime(mime) {
        return Err(RelayError::UnsupportedMediaType {
            mime: mime.to_string(),
        });
    }
    if !looks_like_pdf(bytes) {
        return Err(RelayError::UnsupportedMediaType {
            mime: format!("{mime} (payload is not a PDF)"),
        });
    }
    debug!("validated inbound PDF payload, {} bytes", bytes.len());
    Ok(())
}

/// Fetch a URL-referenced document into memory.
///
/// The magic bytes are checked here as well; a chat platform file reference
/// can point at anything.
pub async fn fetch_document(url: &str, timeout_secs: u64) -> Result<Vec<u8>, RelayError> {
    info!("Fetching referenced document: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| RelayError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| RelayError::FetchFailed {
            url: url.to_string(),
            reason: if e.is_timeout() {
                format!("timed out after {timeout_secs}s")
            } else {
                e.to_string()
            },
        })?;

    if !response.status().is_success() {
        return Err(RelayError::FetchFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| RelayError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if !looks_like_pdf(&bytes) {
        return Err(RelayError::UnsupportedMediaType {
            mime: "unknown (fetched payload is not a PDF)".to_string(),
        });
    }

    info!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_check_accepts_parameters() {
        assert!(is_pdf_mime("application/pdf"));
        assert!(is_pdf_mime("application/pdf; charset=binary"));
        assert!(!is_pdf_mime("application/msword"));
        assert!(!is_pdf_mime("image/png"));
        assert!(!is_pdf_mime(""));
    }

    #[test]
    fn magic_check() {
        assert!(looks_like_pdf(b"%PDF-1.7 ..."));
        assert!(!looks_like_pdf(b"PK\x03\x04"));
        assert!(!looks_like_pdf(b"%PD"));
        assert!(!looks_like_pdf(b""));
    }

    #[test]
    fn validate_rejects_wrong_mime_before_reading_bytes() {
        let err = validate_upload("image/png", b"%PDF-1.4").unwrap_err();
        assert!(matches!(err, RelayError::UnsupportedMediaType { .. }));
    }

    #[test]
    fn validate_rejects_mislabelled_payload() {
        let err = validate_upload(PDF_MIME, b"GIF89a").unwrap_err();
        assert!(err.to_string().contains("not a PDF"));
    }

    #[test]
    fn validate_accepts_real_pdf_header() {
        assert!(validate_upload(PDF_MIME, b"%PDF-1.4\n%\xE2\xE3").is_ok());
    }
}
