//! Rich-text (docx) artifact builder.
//!
//! Text blocks become paragraphs in order; images become inline pictures.
//! Image payloads are validated by decoding before they reach the document
//! writer: already-PNG bytes are embedded as-is, anything else decodable is
//! re-encoded to PNG first, and bytes that survive neither step are skipped
//! with a warning. A single bad image never aborts the artifact.

use crate::error::{AssetError, RelayError};
use crate::model::{Element, Page};
use crate::pipeline::extract::encode_png;
use docx_rs::{Docx, Paragraph, Pic, Run};
use std::io::Cursor;
use tracing::warn;

/// Build a Word document from the extracted element sequence.
pub fn build_document(pages: &[Page]) -> Result<Vec<u8>, RelayError> {
    let mut docx = Docx::new();

    for page in pages {
        for element in &page.elements {
            match element {
                Element::Text(text) => {
                    docx = docx
                        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(text.as_str())));
                }
                Element::Image { bytes, .. } => match embeddable_png(page.index, bytes) {
                    Ok(png) => {
                        docx = docx.add_paragraph(
                            Paragraph::new().add_run(Run::new().add_image(Pic::new(&png))),
                        );
                    }
                    Err(e) => warn!("skipping image: {e}"),
                },
            }
        }
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| RelayError::ArtifactBuild {
            format: "docx",
            detail: e.to_string(),
        })?;

    Ok(cursor.into_inner())
}

/// Produce bytes safe to hand to the document writer.
///
/// The writer reads image dimensions itself and does not tolerate
/// undecodable input, so everything is decode-checked here first.
fn embeddable_png(page: usize, bytes: &[u8]) -> Result<Vec<u8>, AssetError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| AssetError::UnsupportedImage {
        page,
        detail: e.to_string(),
    })?;

    if image::guess_format(bytes).is_ok_and(|f| f == image::ImageFormat::Png) {
        return Ok(bytes.to_vec());
    }

    encode_png(&decoded).map_err(|e| AssetError::UnsupportedImage {
        page,
        detail: format!("re-encode failed: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 6, Rgba([10, 20, 30, 255])));
        encode_png(&img).unwrap()
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 6, Rgba([10, 20, 30, 255])));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img.to_rgb8())
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    #[test]
    fn text_and_image_build_succeeds() {
        let pages = vec![Page {
            index: 0,
            elements: vec![Element::Text("hello".into()), Element::png(png_bytes())],
        }];
        let artifact = build_document(&pages).unwrap();
        // docx is a zip container
        assert_eq!(&artifact[..2], b"PK");
    }

    #[test]
    fn bad_image_is_skipped_not_fatal() {
        let pages = vec![Page {
            index: 0,
            elements: vec![
                Element::Text("before".into()),
                Element::png(vec![0xde, 0xad, 0xbe, 0xef]),
                Element::Text("after".into()),
            ],
        }];
        let artifact = build_document(&pages).unwrap();
        assert!(!artifact.is_empty());
    }

    #[test]
    fn png_passes_through_untouched() {
        let png = png_bytes();
        assert_eq!(embeddable_png(0, &png).unwrap(), png);
    }

    #[test]
    fn non_png_is_reencoded() {
        let jpeg = jpeg_bytes();
        let out = embeddable_png(0, &jpeg).unwrap();
        assert_ne!(out, jpeg);
        assert!(image::guess_format(&out).is_ok_and(|f| f == image::ImageFormat::Png));
    }

    #[test]
    fn garbage_is_unsupported() {
        assert!(embeddable_png(2, b"not an image").is_err());
    }

    #[test]
    fn empty_pages_build_an_empty_document() {
        let artifact = build_document(&[]).unwrap();
        assert_eq!(&artifact[..2], b"PK");
    }
}
