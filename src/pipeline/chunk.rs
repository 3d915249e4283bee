//! Size-bounded splitting of text and page ranges.
//!
//! Two independent responsibilities share this module because both exist to
//! satisfy the same transport constraint from opposite ends: a single text
//! block must fit in one outbound message, and a single processing wave must
//! not hold a whole multi-hundred-page document in flight at once.

use crate::model::Page;

/// Split `text` into successive non-overlapping fragments of at most `max`
/// characters, preserving order, without re-encoding content.
///
/// Counts `char`s, not bytes, so a fragment boundary never lands inside a
/// multi-byte sequence. Empty input yields zero fragments — an empty chat
/// message is not a thing any transport accepts.
pub fn text_chunks(text: &str, max: usize) -> Vec<&str> {
    let max = max.max(1);
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::with_capacity(text.chars().count().div_ceil(max));
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&text[start..]);

    chunks
}

/// Split a page sequence into successive batches of at most `size` pages.
///
/// Batches preserve page order; the worker processes and delivers one batch
/// to completion before starting the next, which is what keeps a single
/// document's output ordered end to end.
pub fn page_batches(pages: &[Page], size: usize) -> impl Iterator<Item = &[Page]> {
    pages.chunks(size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Element;

    #[test]
    fn empty_text_yields_no_fragments() {
        assert!(text_chunks("", 4096).is_empty());
    }

    #[test]
    fn short_text_is_one_fragment() {
        assert_eq!(text_chunks("hello", 4096), vec!["hello"]);
    }

    #[test]
    fn exact_multiple_yields_full_fragments() {
        let s = "ab".repeat(6); // len 12
        let chunks = text_chunks(&s, 4);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() == 4));
        assert_eq!(chunks.concat(), s);
    }

    #[test]
    fn remainder_becomes_short_tail() {
        let s = "x".repeat(10);
        let chunks = text_chunks(&s, 4);
        assert_eq!(
            chunks.iter().map(|c| c.len()).collect::<Vec<_>>(),
            vec![4, 4, 2]
        );
    }

    #[test]
    fn concatenation_reconstructs_input() {
        let s = "päragraph «text» with ümlauts — ".repeat(400);
        let chunks = text_chunks(&s, 100);
        assert_eq!(chunks.concat(), s);
        for c in &chunks[..chunks.len() - 1] {
            assert_eq!(c.chars().count(), 100);
        }
    }

    #[test]
    fn multibyte_boundaries_are_respected() {
        let s = "é".repeat(5);
        let chunks = text_chunks(&s, 2);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], "éé");
        assert_eq!(chunks[2], "é");
    }

    #[test]
    fn five_thousand_chars_split_as_4096_plus_904() {
        let s = "a".repeat(5000);
        let chunks = text_chunks(&s, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 4096);
        assert_eq!(chunks[1].len(), 904);
    }

    fn page(index: usize) -> Page {
        Page {
            index,
            elements: vec![Element::Text(format!("page {index}"))],
        }
    }

    #[test]
    fn page_batches_cover_all_pages_in_order() {
        let pages: Vec<Page> = (0..65).map(page).collect();
        let batches: Vec<&[Page]> = page_batches(&pages, 30).collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 30);
        assert_eq!(batches[2].len(), 5);
        assert_eq!(batches[2][0].index, 60);
    }

    #[test]
    fn page_batches_single_short_batch() {
        let pages: Vec<Page> = (0..3).map(page).collect();
        let batches: Vec<&[Page]> = page_batches(&pages, 30).collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 3);
    }
}
