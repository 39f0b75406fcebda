use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl ReportId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The workbook a render cycle resolved to. Recomputed on every call;
/// nothing here outlives the response it is embedded in.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReportDescriptor {
    pub report_id: ReportId,
    pub slug: String,
    pub path: String,
    pub bytes: u64,
    /// Date parsed from the filename, when one is present and valid.
    pub report_date: Option<String>,
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LatestReportResponse {
    pub report: ReportDescriptor,
    pub sheet_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SheetSummary {
    pub name: String,
    /// 1-based position within the workbook.
    pub position: usize,
    pub row_count: u32,
    pub column_count: u32,
    pub formula_cells: u32,
    pub merged_ranges: u32,
    pub comments: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SheetListResponse {
    pub report_id: ReportId,
    pub path: String,
    pub sheets: Vec<SheetSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Error(String),
    Date(String),
}

/// Header-labeled, row-oriented read model of one sheet.
///
/// `columns` is empty when the source sheet had fewer than two rows: in
/// that case no header row was consumed and `records` carries the sheet
/// verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    pub columns: Vec<String>,
    pub records: Vec<Vec<Option<CellValue>>>,
}

impl Table {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

/// Sheet-level metadata reported alongside a Table, never per cell.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SheetFacts {
    pub position: usize,
    pub row_count: u32,
    pub column_count: u32,
    pub formula_cells: u32,
    pub merged_ranges: Vec<String>,
    pub comments: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SheetTableResponse {
    pub report_id: ReportId,
    pub sheet_name: String,
    pub table: Table,
    pub facts: SheetFacts,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportSheetResponse {
    pub report_id: ReportId,
    pub sheet_name: String,
    pub output_path: String,
    /// Lines written including the header row, when one was present.
    pub rows_written: usize,
}
