//! Spreadsheet artifact builder: one sheet per detected table.
//!
//! Sheet names follow `S<page>_T<table>` (1-based, matching what a reader
//! sees in a viewer), truncated to the 31-character ceiling shared by
//! spreadsheet consumers. Two distinct tables whose names collide after
//! truncation get a `~2`, `~3`, … suffix instead of silently overwriting
//! each other.

use crate::error::RelayError;
use crate::model::Table;
use rust_xlsxwriter::Workbook;
use std::collections::HashSet;

/// Maximum sheet name length accepted across spreadsheet consumers.
pub const MAX_SHEET_NAME: usize = 31;

const PAGE_TAG: &str = "S";
const TABLE_TAG: &str = "T";

/// Build a workbook with one sheet per table.
///
/// Returns `Ok(None)` — a distinct "no artifact" signal, not a failure —
/// when `tables` is empty; an empty workbook file would not open anywhere.
pub fn build_spreadsheet(tables: &[Table]) -> Result<Option<Vec<u8>>, RelayError> {
    if tables.is_empty() {
        return Ok(None);
    }

    let mut workbook = Workbook::new();
    let mut used_names: HashSet<String> = HashSet::new();

    for table in tables {
        let name = unique_sheet_name(table, &mut used_names);
        let sheet = workbook.add_worksheet();
        sheet.set_name(&name).map_err(xlsx_err)?;

        for (r, row) in table.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                sheet
                    .write_string(r as u32, c as u16, cell.as_str())
                    .map_err(xlsx_err)?;
            }
        }
    }

    let buf = workbook.save_to_buffer().map_err(xlsx_err)?;
    Ok(Some(buf))
}

/// Derive the sheet name for one table.
pub fn sheet_name(table: &Table) -> String {
    let mut name = format!(
        "{PAGE_TAG}{}_{TABLE_TAG}{}",
        table.page + 1,
        table.index
    );
    name.truncate(MAX_SHEET_NAME);
    name
}

/// Derived name with truncation-collision disambiguation.
fn unique_sheet_name(table: &Table, used: &mut HashSet<String>) -> String {
    let base = sheet_name(table);
    if used.insert(base.clone()) {
        return base;
    }
    for n in 2u32.. {
        let suffix = format!("~{n}");
        let mut candidate = base.clone();
        candidate.truncate(MAX_SHEET_NAME - suffix.len());
        candidate.push_str(&suffix);
        if used.insert(candidate.clone()) {
            return candidate;
        }
    }
    unreachable!("collision counter exhausted")
}

fn xlsx_err(e: rust_xlsxwriter::XlsxError) -> RelayError {
    RelayError::ArtifactBuild {
        format: "xlsx",
        detail: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(page: usize, index: usize, rows: usize) -> Table {
        Table {
            page,
            index,
            rows: (0..rows)
                .map(|r| vec![format!("r{r}c0"), format!("r{r}c1")])
                .collect(),
        }
    }

    #[test]
    fn empty_input_is_no_artifact_signal() {
        assert!(build_spreadsheet(&[]).unwrap().is_none());
    }

    #[test]
    fn one_sheet_per_table() {
        let tables = vec![table(0, 1, 3), table(1, 1, 2)];
        let buf = build_spreadsheet(&tables).unwrap().unwrap();
        // xlsx is a zip container
        assert_eq!(&buf[..2], b"PK");
    }

    #[test]
    fn names_follow_page_and_table_numbering() {
        assert_eq!(sheet_name(&table(0, 1, 2)), "S1_T1");
        assert_eq!(sheet_name(&table(4, 3, 2)), "S5_T3");
    }

    #[test]
    fn names_never_exceed_ceiling() {
        let t = Table {
            page: usize::MAX - 1,
            index: 987_654_321,
            rows: vec![vec!["a".into()], vec!["b".into()]],
        };
        assert!(sheet_name(&t).len() <= MAX_SHEET_NAME);
    }

    #[test]
    fn collisions_get_counter_suffix() {
        let mut used = HashSet::new();
        let a = unique_sheet_name(&table(0, 1, 2), &mut used);
        let b = unique_sheet_name(&table(0, 1, 2), &mut used);
        let c = unique_sheet_name(&table(0, 1, 2), &mut used);
        assert_eq!(a, "S1_T1");
        assert_eq!(b, "S1_T1~2");
        assert_eq!(c, "S1_T1~3");
        assert!(b.len() <= MAX_SHEET_NAME);
    }

    #[test]
    fn single_grid_gives_one_sheet_with_two_data_rows() {
        let t = Table {
            page: 1,
            index: 1,
            rows: vec![
                vec!["h0".into(), "h1".into()],
                vec!["a".into(), "b".into()],
                vec!["c".into(), "d".into()],
            ],
        };
        assert_eq!(t.data_rows(), 2);
        let buf = build_spreadsheet(std::slice::from_ref(&t)).unwrap();
        assert!(buf.is_some());
    }
}
