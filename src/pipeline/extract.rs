//! Element extraction: per-page text and embedded images via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto the blocking
//! thread pool so Tokio worker threads never stall on parsing.
//!
//! ## Emission order
//!
//! For each page: the trimmed page text as one element (if non-empty), then
//! every embedded image in source object order. This is the order the source
//! API yields content, not a rendering-accurate reconstruction. Duplicate
//! image references within a page are each emitted; suppressing repeats is
//! the deduplication stage's job.

use crate::error::RelayError;
use crate::model::{Element, Page};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// Extract the ordered element sequence of every page.
///
/// The document handle is scoped to the blocking closure and released on
/// every exit path, success or error.
pub async fn extract(path: &Path) -> Result<Vec<Page>, RelayError> {
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || extract_blocking(&path))
        .await
        .map_err(|e| RelayError::Internal(format!("extraction task panicked: {e}")))?
}

/// Blocking implementation of element extraction.
fn extract_blocking(path: &Path) -> Result<Vec<Page>, RelayError> {
    // Existence is checked before touching the pdfium binding so a vanished
    // source reports cleanly instead of tripping library setup.
    if !path.exists() {
        return Err(RelayError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let pdfium = Pdfium::default();
    let document = open_document(&pdfium, path)?;

    let page_count = document.pages().len() as usize;
    info!("PDF loaded: {} pages", page_count);

    let mut pages = Vec::with_capacity(page_count);

    for (index, page) in document.pages().iter().enumerate() {
        let mut elements = Vec::new();

        // Page text, trimmed; an all-whitespace page emits nothing.
        match page.text() {
            Ok(text) => {
                let trimmed = text.all().trim().to_string();
                if !trimmed.is_empty() {
                    elements.push(Element::Text(trimmed));
                }
            }
            Err(e) => warn!("page {}: text unavailable: {:?}", index + 1, e),
        }

        // Embedded raster images, in object order.
        for object in page.objects().iter() {
            let Some(image_object) = object.as_image_object() else {
                continue;
            };
            match image_object.get_raw_image() {
                Ok(img) => match encode_png(&img) {
                    Ok(bytes) => elements.push(Element::png(bytes)),
                    Err(e) => {
                        warn!("page {}: image re-encode failed: {}", index + 1, e)
                    }
                },
                Err(e) => warn!("page {}: undecodable embedded image: {:?}", index + 1, e),
            }
        }

        debug!("page {}: {} elements", index + 1, elements.len());
        pages.push(Page { index, elements });
    }

    Ok(pages)
}

/// Open a document, mapping pdfium failures to the relay taxonomy.
///
/// A source deleted or replaced between the caller's existence check and
/// this load reports as `UnreadableSource`, which is the contract for
/// uploads swapped out mid-conversion.
pub(crate) fn open_document<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
) -> Result<PdfDocument<'a>, RelayError> {
    pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| RelayError::UnreadableSource {
            path: path.to_path_buf(),
            detail: format!("{e:?}"),
        })
}

/// Encode a decoded bitmap as PNG — the canonical image payload.
///
/// PNG is lossless, so repeated source images keep producing identical
/// bytes and the fingerprint-based dedup actually fires.
pub(crate) fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_png_roundtrip() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 128, 255, 255])));
        let bytes = encode_png(&img).expect("encode should succeed");
        assert!(!bytes.is_empty());
        let decoded = image::load_from_memory(&bytes).expect("valid PNG");
        assert_eq!(decoded.width(), 8);
    }

    #[test]
    fn encode_png_is_deterministic() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));
        assert_eq!(encode_png(&img).unwrap(), encode_png(&img).unwrap());
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let err = extract(Path::new("/nonexistent/never.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn garbage_file_is_unreadable_source() {
        // Needs a pdfium library on the machine, like the e2e suite.
        if std::env::var("PDFRELAY_PDFIUM_TESTS").is_err() {
            println!("SKIP — set PDFRELAY_PDFIUM_TESTS=1 to run pdfium-backed tests");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();
        let err = extract(&path).await.unwrap_err();
        assert!(matches!(err, RelayError::UnreadableSource { .. }));
    }
}
