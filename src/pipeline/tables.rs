//! Table extraction: detect grid-structured regions from word positions.
//!
//! This pass is independent of element extraction and uses a different
//! heuristic: characters are grouped into positioned words, words into rows
//! by vertical proximity, and a run of consecutive rows that each split into
//! two or more gap-separated cell clusters is treated as one grid region.
//! Column boundaries come from projecting every cluster in the region onto
//! the x-axis and merging intervals closer than the configured column gap.
//!
//! Pages with no such region yield nothing — an empty result is a designed
//! "empty success", not an error.

use crate::error::RelayError;
use crate::model::Table;
use crate::pipeline::extract::open_document;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Spacing threshold for word boundary detection (in PDF points).
///
/// Characters separated by more than this distance are separate words.
const WORD_SPACING_THRESHOLD: f32 = 3.0;

/// A positioned word on a page. Coordinates use the PDF's bottom-left
/// origin; rows are ordered top of page first (descending `y_center`).
#[derive(Debug, Clone)]
pub(crate) struct Word {
    pub text: String,
    pub left: f32,
    pub right: f32,
    pub y_center: f32,
}

/// Extract every valid table in the document.
///
/// Tables are numbered 1-based within their page, resetting per page.
/// Regions with fewer than two rows are discarded — a lone header row is
/// not a table.
pub async fn extract_tables(
    path: &Path,
    row_tolerance: f32,
    column_gap: f32,
) -> Result<Vec<Table>, RelayError> {
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || extract_tables_blocking(&path, row_tolerance, column_gap))
        .await
        .map_err(|e| RelayError::Internal(format!("table task panicked: {e}")))?
}

fn extract_tables_blocking(
    path: &Path,
    row_tolerance: f32,
    column_gap: f32,
) -> Result<Vec<Table>, RelayError> {
    if !path.exists() {
        return Err(RelayError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let pdfium = Pdfium::default();
    let document = open_document(&pdfium, path)?;

    let mut tables = Vec::new();
    for (page_index, page) in document.pages().iter().enumerate() {
        let words = match page_words(&page) {
            Ok(words) => words,
            Err(e) => {
                warn!("page {}: word extraction failed: {}", page_index + 1, e);
                continue;
            }
        };
        let page_tables = tables_from_words(page_index, &words, row_tolerance, column_gap);
        debug!(
            "page {}: {} words, {} tables",
            page_index + 1,
            words.len(),
            page_tables.len()
        );
        tables.extend(page_tables);
    }

    info!("detected {} tables in {}", tables.len(), path.display());
    Ok(tables)
}

/// Group a page's characters into positioned words.
///
/// Whitespace ends the current word; so does a jump to a different line or
/// a horizontal gap beyond [`WORD_SPACING_THRESHOLD`].
fn page_words(page: &PdfPage) -> Result<Vec<Word>, RelayError> {
    let page_text = page.text().map_err(|e| RelayError::Internal(format!("page text: {e:?}")))?;

    let mut words: Vec<Word> = Vec::new();
    let mut current: Vec<CharInfo> = Vec::new();

    for pdf_char in page_text.chars().iter() {
        let Some(ch) = pdf_char.unicode_char() else {
            continue;
        };
        let Ok(bounds) = pdf_char.loose_bounds() else {
            continue;
        };
        let info = CharInfo {
            ch,
            x: bounds.left().value,
            y: bounds.bottom().value,
            width: bounds.width().value,
            height: bounds.height().value,
        };

        if info.ch.is_whitespace() {
            flush_word(&mut current, &mut words);
            continue;
        }
        if starts_new_word(&current, &info) {
            flush_word(&mut current, &mut words);
        }
        current.push(info);
    }
    flush_word(&mut current, &mut words);

    Ok(words)
}

#[derive(Debug, Clone)]
struct CharInfo {
    ch: char,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

fn starts_new_word(current: &[CharInfo], next: &CharInfo) -> bool {
    let Some(last) = current.last() else {
        return false;
    };
    if (next.y - last.y).abs() > last.height * 0.5 {
        return true;
    }
    next.x - (last.x + last.width) > WORD_SPACING_THRESHOLD
}

fn flush_word(current: &mut Vec<CharInfo>, words: &mut Vec<Word>) {
    if current.is_empty() {
        return;
    }
    let text: String = current.iter().map(|c| c.ch).collect();
    let left = current.iter().map(|c| c.x).fold(f32::INFINITY, f32::min);
    let right = current
        .iter()
        .map(|c| c.x + c.width)
        .fold(f32::NEG_INFINITY, f32::max);
    let bottom = current.iter().map(|c| c.y).fold(f32::INFINITY, f32::min);
    let top = current
        .iter()
        .map(|c| c.y + c.height)
        .fold(f32::NEG_INFINITY, f32::max);
    words.push(Word {
        text,
        left,
        right,
        y_center: (bottom + top) / 2.0,
    });
    current.clear();
}

/// Pure grid detection over positioned words. Split out so the heuristic is
/// testable without a PDF fixture.
pub(crate) fn tables_from_words(
    page_index: usize,
    words: &[Word],
    row_tolerance: f32,
    column_gap: f32,
) -> Vec<Table> {
    let rows = group_rows(words, row_tolerance);

    // Each row is split into cell clusters; a row with ≥2 clusters is
    // grid-like. Maximal runs of ≥2 consecutive grid-like rows form regions.
    let clustered: Vec<Vec<Cluster>> = rows
        .iter()
        .map(|row| clusters_in_row(row, column_gap))
        .collect();

    let mut tables = Vec::new();
    let mut table_index = 0;
    let mut run_start: Option<usize> = None;

    for i in 0..=clustered.len() {
        let grid_like = i < clustered.len() && clustered[i].len() >= 2;
        match (run_start, grid_like) {
            (None, true) => run_start = Some(i),
            (Some(start), false) => {
                run_start = None;
                if i - start >= 2 {
                    if let Some(rows) = build_grid(&clustered[start..i], column_gap) {
                        table_index += 1;
                        tables.push(Table {
                            page: page_index,
                            index: table_index,
                            rows,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    tables
}

/// A gap-delimited run of words within one row — one candidate cell.
#[derive(Debug, Clone)]
struct Cluster {
    text: String,
    left: f32,
    right: f32,
}

/// Group words into rows by vertical proximity, ordered top of page first.
fn group_rows(words: &[Word], row_tolerance: f32) -> Vec<Vec<Word>> {
    let mut sorted: Vec<Word> = words.to_vec();
    sorted.sort_by(|a, b| b.y_center.total_cmp(&a.y_center));

    let mut rows: Vec<Vec<Word>> = Vec::new();
    for word in sorted {
        match rows.last_mut() {
            Some(row) if (row[0].y_center - word.y_center).abs() <= row_tolerance => {
                row.push(word)
            }
            _ => rows.push(vec![word]),
        }
    }
    for row in &mut rows {
        row.sort_by(|a, b| a.left.total_cmp(&b.left));
    }
    rows
}

/// Split one row's words into clusters wherever the horizontal gap reaches
/// the configured column gap.
fn clusters_in_row(row: &[Word], column_gap: f32) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    for word in row {
        match clusters.last_mut() {
            Some(cluster) if word.left - cluster.right < column_gap => {
                cluster.text.push(' ');
                cluster.text.push_str(&word.text);
                cluster.right = cluster.right.max(word.right);
            }
            _ => clusters.push(Cluster {
                text: word.text.clone(),
                left: word.left,
                right: word.right,
            }),
        }
    }
    clusters
}

/// Assemble the cell matrix of one region.
///
/// Column boundaries are the union of every cluster interval in the region,
/// merged when closer than `column_gap`. Returns `None` when the region
/// collapses to fewer than two columns.
fn build_grid(region: &[Vec<Cluster>], column_gap: f32) -> Option<Vec<Vec<String>>> {
    let mut intervals: Vec<(f32, f32)> = region
        .iter()
        .flatten()
        .map(|c| (c.left, c.right))
        .collect();
    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut columns: Vec<(f32, f32)> = Vec::new();
    for (start, end) in intervals {
        match columns.last_mut() {
            Some(col) if start - col.1 < column_gap => col.1 = col.1.max(end),
            _ => columns.push((start, end)),
        }
    }
    if columns.len() < 2 {
        return None;
    }

    let rows = region
        .iter()
        .map(|row_clusters| {
            let mut cells = vec![String::new(); columns.len()];
            for cluster in row_clusters {
                let center = (cluster.left + cluster.right) / 2.0;
                let col = columns
                    .iter()
                    .position(|&(s, e)| center >= s && center <= e)
                    .unwrap_or_else(|| nearest_column(&columns, center));
                if cells[col].is_empty() {
                    cells[col] = cluster.text.clone();
                } else {
                    cells[col].push(' ');
                    cells[col].push_str(&cluster.text);
                }
            }
            cells
        })
        .collect();

    Some(rows)
}

fn nearest_column(columns: &[(f32, f32)], center: f32) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (i, &(s, e)) in columns.iter().enumerate() {
        let mid = (s + e) / 2.0;
        let dist = (mid - center).abs();
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, left: f32, right: f32, y: f32) -> Word {
        Word {
            text: text.into(),
            left,
            right,
            y_center: y,
        }
    }

    /// A 3-row, 2-column grid: header + 2 data rows.
    fn grid_words() -> Vec<Word> {
        vec![
            word("Name", 10.0, 40.0, 700.0),
            word("Amount", 110.0, 150.0, 700.0),
            word("Widget", 10.0, 45.0, 680.0),
            word("12", 110.0, 122.0, 680.0),
            word("Gadget", 10.0, 46.0, 660.0),
            word("7", 110.0, 116.0, 660.0),
        ]
    }

    #[test]
    fn detects_simple_grid() {
        let tables = tables_from_words(1, &grid_words(), 5.0, 12.0);
        assert_eq!(tables.len(), 1);
        let t = &tables[0];
        assert_eq!(t.page, 1);
        assert_eq!(t.index, 1);
        assert_eq!(t.rows.len(), 3);
        assert_eq!(t.data_rows(), 2);
        assert_eq!(t.rows[0], vec!["Name".to_string(), "Amount".to_string()]);
        assert_eq!(t.rows[2], vec!["Gadget".to_string(), "7".to_string()]);
    }

    #[test]
    fn lone_header_row_is_discarded() {
        let words = vec![
            word("Name", 10.0, 40.0, 700.0),
            word("Amount", 110.0, 150.0, 700.0),
        ];
        assert!(tables_from_words(0, &words, 5.0, 12.0).is_empty());
    }

    #[test]
    fn flowing_text_is_not_a_table() {
        // Typical paragraph spacing: small gaps, single cluster per row.
        let words = vec![
            word("the", 10.0, 28.0, 700.0),
            word("quick", 31.0, 60.0, 700.0),
            word("brown", 63.0, 95.0, 700.0),
            word("fox", 10.0, 28.0, 685.0),
            word("jumps", 31.0, 64.0, 685.0),
        ];
        assert!(tables_from_words(0, &words, 5.0, 12.0).is_empty());
    }

    #[test]
    fn empty_page_is_empty_success() {
        assert!(tables_from_words(0, &[], 5.0, 12.0).is_empty());
    }

    #[test]
    fn multiple_clusters_in_wide_cell_merge_into_one_column() {
        // "Unit price" spans two words in the header but one column.
        let words = vec![
            word("Item", 10.0, 35.0, 500.0),
            word("Unit", 110.0, 132.0, 500.0),
            word("price", 135.0, 160.0, 500.0),
            word("Bolt", 10.0, 32.0, 480.0),
            word("0.10", 110.0, 134.0, 480.0),
            word("Nut", 10.0, 30.0, 460.0),
            word("0.05", 110.0, 134.0, 460.0),
        ];
        let tables = tables_from_words(0, &words, 5.0, 12.0);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows[0], vec!["Item".to_string(), "Unit price".to_string()]);
    }

    #[test]
    fn table_numbering_resets_per_page_and_counts_within_page() {
        // Two separate grids on one page, split by a paragraph row.
        let mut words = grid_words();
        words.push(word("some interlude paragraph", 10.0, 200.0, 600.0));
        words.extend(vec![
            word("Code", 10.0, 40.0, 500.0),
            word("Qty", 110.0, 130.0, 500.0),
            word("A1", 10.0, 25.0, 480.0),
            word("3", 110.0, 116.0, 480.0),
        ]);
        let tables = tables_from_words(4, &words, 5.0, 12.0);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].index, 1);
        assert_eq!(tables[1].index, 2);
        assert!(tables.iter().all(|t| t.page == 4));
    }

    #[test]
    fn ragged_rows_still_fill_cells_by_position() {
        // Second data row is missing its first cell.
        let words = vec![
            word("K", 10.0, 20.0, 300.0),
            word("V", 110.0, 120.0, 300.0),
            word("a", 10.0, 18.0, 285.0),
            word("1", 110.0, 116.0, 285.0),
            word("2", 110.0, 116.0, 270.0),
        ];
        let tables = tables_from_words(0, &words, 5.0, 12.0);
        // The last row has a single cluster, so the region is rows 0..2 only.
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 2);
    }
}
