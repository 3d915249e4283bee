//! Content model shared by the extraction pipeline and the converters.
//!
//! A parsed document is reduced to an ordered sequence of [`Page`]s, each an
//! ordered sequence of typed [`Element`]s, in source layout order: the page's
//! text (if any) first, then its embedded images in object order. Tables live
//! in their own [`Table`] type because table detection is a separate pass
//! with its own heuristic, not a view over the element sequence.

use serde::Serialize;
use std::path::PathBuf;

/// One unit of extracted content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Element {
    /// A non-empty, already-trimmed block of page text.
    Text(String),
    /// An embedded raster image, re-encoded to a canonical PNG payload at
    /// extraction time so dedup, chat replay and docx embedding all see the
    /// same bytes.
    Image {
        bytes: Vec<u8>,
        /// MIME of `bytes` as stored (always `image/png` for pdfium-sourced
        /// images; kept explicit for transports that label payloads).
        mime: &'static str,
    },
}

impl Element {
    /// Convenience constructor for canonical PNG image elements.
    pub fn png(bytes: Vec<u8>) -> Self {
        Element::Image {
            bytes,
            mime: "image/png",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Element::Text(_))
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Element::Image { .. })
    }
}

/// An ordered group of elements corresponding to one source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// 0-based source page index.
    pub index: usize,
    /// Elements in emission order: text first, then images.
    pub elements: Vec<Element>,
}

impl Page {
    /// Iterate this page's text blocks in order.
    pub fn text_blocks(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(t) => Some(t.as_str()),
            Element::Image { .. } => None,
        })
    }
}

/// A detected grid region: a matrix of string cells.
///
/// The first row is treated as the header. Detection discards anything with
/// fewer than two rows — a lone header is not a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// 0-based source page index.
    pub page: usize,
    /// 1-based table number within its page, reset per page.
    pub index: usize,
    /// Row-major cells; `rows[0]` is the header row.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Number of data rows (excluding the header).
    pub fn data_rows(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}

/// The cached result of one upload: where the source lives and what one
/// extraction pass produced from it.
///
/// All conversions for an upload are derived from this single snapshot, so
/// every output format reflects the same parse. Only the spreadsheet path
/// re-reads `source` (table detection is an independent pass).
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Stored location of the uploaded source.
    pub source: PathBuf,
    /// Pages in source order.
    pub pages: Vec<Page>,
}

impl Snapshot {
    /// Total number of elements across all pages.
    pub fn element_count(&self) -> usize {
        self.pages.iter().map(|p| p.elements.len()).sum()
    }

    /// True when no page yielded any element.
    pub fn is_empty(&self) -> bool {
        self.element_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_text_blocks_skip_images() {
        let page = Page {
            index: 0,
            elements: vec![
                Element::Text("hello".into()),
                Element::png(vec![1, 2, 3]),
                Element::Text("world".into()),
            ],
        };
        let blocks: Vec<&str> = page.text_blocks().collect();
        assert_eq!(blocks, vec!["hello", "world"]);
    }

    #[test]
    fn table_data_rows() {
        let t = Table {
            page: 0,
            index: 1,
            rows: vec![
                vec!["h1".into(), "h2".into()],
                vec!["a".into(), "b".into()],
                vec!["c".into(), "d".into()],
            ],
        };
        assert_eq!(t.data_rows(), 2);
    }

    #[test]
    fn empty_snapshot() {
        let snap = Snapshot {
            source: "/tmp/x.pdf".into(),
            pages: vec![Page {
                index: 0,
                elements: vec![],
            }],
        };
        assert!(snap.is_empty());
    }
}
