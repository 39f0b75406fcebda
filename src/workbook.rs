//! Read-only materialization of a resolved bid workbook.

use crate::error::ReportError;
use crate::model::{CellValue, ReportDescriptor, ReportId, SheetFacts, SheetSummary, Table};
use crate::resolve::filename_date;
use crate::utils::{
    column_number_to_name, hash_path_metadata, path_to_forward_slashes, system_time_to_datetime,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use umya_spreadsheet::reader::xlsx;
use umya_spreadsheet::{Cell, Spreadsheet, Worksheet};

/// Per-call view options. Each toggle is independent; the default is the
/// computed-value read mode with no annotations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Return formula text (with the `=` marker) instead of the cached
    /// calculated value.
    pub show_formulas: bool,
    /// Append a cell's comment text to its displayed value.
    pub annotate_comments: bool,
}

/// One workbook, loaded fresh for a single render cycle and dropped with
/// it. The file handle is released as soon as parsing completes.
#[derive(Debug)]
pub struct ReportWorkbook {
    pub id: ReportId,
    pub slug: String,
    pub path: PathBuf,
    pub bytes: u64,
    pub last_modified: Option<DateTime<Utc>>,
    spreadsheet: Spreadsheet,
}

impl ReportWorkbook {
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let metadata = fs::metadata(path).map_err(|err| ReportError::WorkbookUnreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let spreadsheet = xlsx::read(path).map_err(|err| ReportError::WorkbookUnreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        let slug = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "report".to_string());
        let id = ReportId(hash_path_metadata(path, &metadata));
        let last_modified = metadata.modified().ok().and_then(system_time_to_datetime);

        Ok(Self {
            id,
            slug,
            path: path.to_path_buf(),
            bytes: metadata.len(),
            last_modified,
            spreadsheet,
        })
    }

    pub fn describe(&self) -> ReportDescriptor {
        ReportDescriptor {
            report_id: self.id.clone(),
            slug: self.slug.clone(),
            path: path_to_forward_slashes(&self.path),
            bytes: self.bytes,
            report_date: filename_date(&self.path).map(|date| date.to_string()),
            last_modified: self
                .last_modified
                .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
        }
    }

    pub fn sheet_count(&self) -> usize {
        self.spreadsheet.get_sheet_collection().len()
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.spreadsheet
            .get_sheet_collection()
            .iter()
            .map(|sheet| sheet.get_name().to_string())
            .collect()
    }

    fn sheet(&self, sheet_name: &str) -> Result<(usize, &Worksheet), ReportError> {
        self.spreadsheet
            .get_sheet_collection()
            .iter()
            .enumerate()
            .find(|(_, sheet)| sheet.get_name() == sheet_name)
            .ok_or_else(|| ReportError::SheetNotFound {
                sheet: sheet_name.to_string(),
                path: self.path.clone(),
            })
    }

    pub fn list_summaries(&self) -> Vec<SheetSummary> {
        self.spreadsheet
            .get_sheet_collection()
            .iter()
            .enumerate()
            .map(|(idx, sheet)| {
                let (column_count, row_count) = sheet.get_highest_column_and_row();
                SheetSummary {
                    name: sheet.get_name().to_string(),
                    position: idx + 1,
                    row_count,
                    column_count,
                    formula_cells: count_formula_cells(sheet),
                    merged_ranges: sheet.get_merge_cells().len() as u32,
                    comments: sheet.get_comments().len() as u32,
                }
            })
            .collect()
    }

    pub fn sheet_facts(&self, sheet_name: &str) -> Result<SheetFacts, ReportError> {
        let (idx, sheet) = self.sheet(sheet_name)?;
        Ok(build_facts(idx, sheet))
    }

    /// Normalize one sheet into a Table: first row consumed as column
    /// labels when the sheet has at least two rows, everything else a
    /// positionally aligned record. Duplicate labels pass through
    /// unchanged.
    pub fn materialize(
        &self,
        sheet_name: &str,
        options: RenderOptions,
    ) -> Result<(Table, SheetFacts), ReportError> {
        let (idx, sheet) = self.sheet(sheet_name)?;
        let (max_col, max_row) = sheet.get_highest_column_and_row();

        let comments = if options.annotate_comments {
            comment_map(sheet)
        } else {
            HashMap::new()
        };

        let mut rows: Vec<Vec<Option<CellValue>>> = Vec::with_capacity(max_row as usize);
        for row in 1..=max_row {
            let mut cells = Vec::with_capacity(max_col as usize);
            for col in 1..=max_col {
                let base = sheet
                    .get_cell((col, row))
                    .and_then(|cell| render_cell(cell, options));
                cells.push(annotate(base, comments.get(&(col, row))));
            }
            rows.push(cells);
        }

        let table = if rows.len() >= 2 {
            let header = rows.remove(0);
            let columns = header
                .iter()
                .enumerate()
                .map(|(idx, value)| header_label(value.as_ref(), idx as u32 + 1))
                .collect();
            Table {
                columns,
                records: rows,
            }
        } else {
            Table {
                columns: Vec::new(),
                records: rows,
            }
        };

        Ok((table, build_facts(idx, sheet)))
    }
}

fn build_facts(idx: usize, sheet: &Worksheet) -> SheetFacts {
    let (column_count, row_count) = sheet.get_highest_column_and_row();
    SheetFacts {
        position: idx + 1,
        row_count,
        column_count,
        formula_cells: count_formula_cells(sheet),
        merged_ranges: sheet
            .get_merge_cells()
            .iter()
            .map(|range| range.get_range())
            .collect(),
        comments: sheet.get_comments().len() as u32,
    }
}

fn count_formula_cells(sheet: &Worksheet) -> u32 {
    sheet
        .get_cell_collection()
        .iter()
        .filter(|cell| cell.is_formula())
        .count() as u32
}

fn comment_map(sheet: &Worksheet) -> HashMap<(u32, u32), String> {
    sheet
        .get_comments()
        .iter()
        .map(|comment| {
            let coordinate = comment.get_coordinate();
            (
                (*coordinate.get_col_num(), *coordinate.get_row_num()),
                comment
                    .get_text()
                    .get_rich_text()
                    .map(|rich| rich.get_text().into_owned())
                    .unwrap_or_default(),
            )
        })
        .collect()
}

fn render_cell(cell: &Cell, options: RenderOptions) -> Option<CellValue> {
    if options.show_formulas && cell.is_formula() {
        return Some(CellValue::Text(format!("={}", cell.get_formula())));
    }
    cell_to_value(cell)
}

pub fn cell_to_value(cell: &Cell) -> Option<CellValue> {
    let raw = cell.get_value();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with('#') {
        return Some(CellValue::Error(raw.to_string()));
    }
    if let Ok(number) = raw.parse::<f64>() {
        if has_date_format(cell) {
            return Some(CellValue::Date(excel_serial_to_iso(number)));
        }
        return Some(CellValue::Number(number));
    }

    let lower = raw.to_ascii_lowercase();
    if lower == "true" {
        return Some(CellValue::Bool(true));
    }
    if lower == "false" {
        return Some(CellValue::Bool(false));
    }

    Some(CellValue::Text(raw.to_string()))
}

fn has_date_format(cell: &Cell) -> bool {
    cell.get_style()
        .get_number_format()
        .map(|format| {
            let code = format.get_format_code().to_ascii_lowercase();
            code != "general" && (code.contains('y') || (code.contains('d') && code.contains('m')))
        })
        .unwrap_or(false)
}

/// Serial-to-date via the 1899-12-30 epoch (Excel counts the phantom
/// 1900-02-29). Time-of-day fractions are discarded.
fn excel_serial_to_iso(serial: f64) -> String {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30).expect("excel epoch");
    let date = base + Duration::days(serial as i64);
    date.format("%Y-%m-%d").to_string()
}

fn annotate(value: Option<CellValue>, note: Option<&String>) -> Option<CellValue> {
    let Some(note) = note else {
        return value;
    };
    let rendered = match &value {
        Some(inner) => format!("{} [comment: {}]", cell_value_display(inner), note),
        None => format!("[comment: {}]", note),
    };
    Some(CellValue::Text(rendered))
}

pub fn cell_value_display(value: &CellValue) -> String {
    match value {
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => n.to_string(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Error(e) => e.clone(),
        CellValue::Date(d) => d.clone(),
    }
}

/// Header cells are coerced to labels rather than rejected: text is
/// trimmed, scalars are stringified, and an empty cell falls back to its
/// column letter.
fn header_label(value: Option<&CellValue>, column: u32) -> String {
    match value {
        Some(CellValue::Text(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(CellValue::Number(n)) => n.to_string(),
        Some(CellValue::Bool(b)) => b.to_string(),
        Some(CellValue::Date(d)) => d.clone(),
        Some(CellValue::Error(e)) => e.clone(),
        _ => column_number_to_name(column),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_conversion_uses_1900_epoch_bug_base() {
        assert_eq!(excel_serial_to_iso(45000.0), "2023-03-15");
        assert_eq!(excel_serial_to_iso(1.0), "1899-12-31");
    }

    #[test]
    fn empty_header_cells_fall_back_to_column_letters() {
        assert_eq!(header_label(None, 1), "A");
        assert_eq!(header_label(None, 28), "AB");
        assert_eq!(
            header_label(Some(&CellValue::Number(7.0)), 2),
            "7".to_string()
        );
    }
}
