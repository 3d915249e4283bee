//! Plain-text artifact: every text block in order, blank-line separated.

use crate::model::Page;

/// Concatenate all text blocks, separated by a blank line. Images are
/// ignored. An empty result is valid output — the caller decides whether
/// "no text" is user-visible as an error.
pub fn build_text(pages: &[Page]) -> String {
    let blocks: Vec<&str> = pages.iter().flat_map(|p| p.text_blocks()).collect();
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Element;

    #[test]
    fn blocks_joined_with_blank_line() {
        let pages = vec![
            Page {
                index: 0,
                elements: vec![Element::Text("first".into()), Element::png(vec![0])],
            },
            Page {
                index: 1,
                elements: vec![Element::Text("second".into())],
            },
        ];
        assert_eq!(build_text(&pages), "first\n\nsecond");
    }

    #[test]
    fn images_only_yields_empty_artifact() {
        let pages = vec![Page {
            index: 0,
            elements: vec![Element::png(vec![1, 2])],
        }];
        assert_eq!(build_text(&pages), "");
    }

    #[test]
    fn long_paragraph_survives_unmodified() {
        let para = "x".repeat(5000);
        let pages = vec![Page {
            index: 0,
            elements: vec![Element::Text(para.clone())],
        }];
        assert_eq!(build_text(&pages), para);
    }
}
