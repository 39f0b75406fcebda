use crate::model::{
    ExportSheetResponse, LatestReportResponse, SheetListResponse, SheetTableResponse, Table,
};
use crate::state::AppState;
use crate::utils::path_to_forward_slashes;
use crate::workbook::{RenderOptions, cell_value_display};
use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::Deserialize;
use std::fs;
use std::sync::Arc;

#[derive(Debug, Deserialize, JsonSchema, Default)]
pub struct LatestReportParams {}

pub async fn latest_report(
    state: Arc<AppState>,
    _params: LatestReportParams,
) -> Result<LatestReportResponse> {
    let workbook = state.open_latest()?;
    Ok(LatestReportResponse {
        sheet_count: workbook.sheet_count(),
        report: workbook.describe(),
    })
}

#[derive(Debug, Deserialize, JsonSchema, Default)]
pub struct ListSheetsParams {}

pub async fn list_sheets(
    state: Arc<AppState>,
    _params: ListSheetsParams,
) -> Result<SheetListResponse> {
    let workbook = state.open_latest()?;
    Ok(SheetListResponse {
        report_id: workbook.id.clone(),
        path: path_to_forward_slashes(&workbook.path),
        sheets: workbook.list_summaries(),
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SheetTableParams {
    pub sheet_name: String,
    /// Return formula text (`=...`) instead of cached calculated values.
    #[serde(default)]
    pub show_formulas: bool,
    /// Append cell comments to displayed values.
    #[serde(default)]
    pub annotate_comments: bool,
}

impl SheetTableParams {
    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_formulas: self.show_formulas,
            annotate_comments: self.annotate_comments,
        }
    }
}

pub async fn sheet_table(
    state: Arc<AppState>,
    params: SheetTableParams,
) -> Result<SheetTableResponse> {
    let workbook = state.open_latest()?;
    let (table, facts) = workbook.materialize(&params.sheet_name, params.render_options())?;
    Ok(SheetTableResponse {
        report_id: workbook.id.clone(),
        sheet_name: params.sheet_name,
        table,
        facts,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExportSheetParams {
    pub sheet_name: String,
    #[serde(default)]
    pub show_formulas: bool,
    #[serde(default)]
    pub annotate_comments: bool,
}

/// Serialize one sheet's Table to `<sheet_name>.csv` under the export
/// directory: UTF-8, header row equal to the column labels, no index
/// column. Headerless (degenerate) tables are written records-only so a
/// re-parse with `has_headers(false)` reproduces the sheet.
pub async fn export_sheet_csv(
    state: Arc<AppState>,
    params: ExportSheetParams,
) -> Result<ExportSheetResponse> {
    let workbook = state.open_latest()?;
    let options = RenderOptions {
        show_formulas: params.show_formulas,
        annotate_comments: params.annotate_comments,
    };
    let (table, _facts) = workbook.materialize(&params.sheet_name, options)?;

    let export_dir = state.config().export_dir.clone();
    fs::create_dir_all(&export_dir)
        .with_context(|| format!("failed to create export directory {:?}", export_dir))?;
    let output_path = export_dir.join(format!("{}.csv", sanitize_file_stem(&params.sheet_name)));

    let rows_written = write_table_csv(&table, &output_path)?;
    tracing::info!(
        sheet = %params.sheet_name,
        output = %output_path.display(),
        rows = rows_written,
        "exported sheet"
    );

    Ok(ExportSheetResponse {
        report_id: workbook.id.clone(),
        sheet_name: params.sheet_name,
        output_path: path_to_forward_slashes(&output_path),
        rows_written,
    })
}

fn write_table_csv(table: &Table, path: &std::path::Path) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open export file {:?}", path))?;
    let mut rows_written = 0usize;

    if !table.columns.is_empty() {
        writer.write_record(&table.columns)?;
        rows_written += 1;
    }
    for record in &table.records {
        let fields: Vec<String> = record
            .iter()
            .map(|cell| {
                cell.as_ref()
                    .map(cell_value_display)
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&fields)?;
        rows_written += 1;
    }
    writer.flush()?;
    Ok(rows_written)
}

/// Sheet names may carry path separators; keep the export inside the
/// export directory.
fn sanitize_file_stem(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}
