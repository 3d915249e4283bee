//! Format converters: element/table sequences to deliverable artifacts.
//!
//! Each builder is a total function over valid input — it always
//! terminates, and per-element image failures are absorbed locally (skip,
//! warn, continue), never aborting the whole artifact.

pub mod document;
pub mod spreadsheet;
pub mod text;

use serde::{Deserialize, Serialize};

/// Suggested filename for the rich-text artifact.
pub const DOCUMENT_FILENAME: &str = "converted.docx";
/// Suggested filename for the plain-text artifact.
pub const TEXT_FILENAME: &str = "converted.txt";
/// Suggested filename for the spreadsheet artifact.
pub const SPREADSHEET_FILENAME: &str = "tables.xlsx";

/// The output a caller can request for an ingested document.
///
/// A closed set: delivery dispatch is an exhaustive `match`, so adding a
/// target without wiring its handler fails at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Word document with paragraphs and inline pictures.
    Document,
    /// Plain-text file with text blocks only.
    Text,
    /// Spreadsheet with one sheet per detected table.
    Spreadsheet,
    /// Replay text blocks into the chat as bounded messages.
    ChatText,
    /// Replay text and images into the chat, duplicates suppressed.
    ChatFull,
}

impl Target {
    /// Filename for file-artifact targets; `None` for chat replay modes.
    pub fn filename(&self) -> Option<&'static str> {
        match self {
            Target::Document => Some(DOCUMENT_FILENAME),
            Target::Text => Some(TEXT_FILENAME),
            Target::Spreadsheet => Some(SPREADSHEET_FILENAME),
            Target::ChatText | Target::ChatFull => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&Target::ChatFull).unwrap(),
            "\"chat_full\""
        );
        let t: Target = serde_json::from_str("\"spreadsheet\"").unwrap();
        assert_eq!(t, Target::Spreadsheet);
    }

    #[test]
    fn filenames_only_for_file_targets() {
        assert_eq!(Target::Document.filename(), Some("converted.docx"));
        assert_eq!(Target::ChatText.filename(), None);
    }
}
