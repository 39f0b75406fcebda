use crate::config::ServerConfig;
use crate::error::ReportError;
use crate::model::{
    ExportSheetResponse, LatestReportResponse, SheetListResponse, SheetTableResponse,
};
use crate::state::AppState;
use crate::tools;
use anyhow::Result;
use rmcp::{
    ErrorData as McpError, Json, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
};
use std::sync::Arc;
use thiserror::Error;

const INSTRUCTIONS: &str = "\
Bidbook MCP: review surface for the latest dated bid workbook.

WORKFLOW:
1) latest_report to see which workbook the render cycle resolves to
2) list_sheets for per-sheet dimensions, formula and merged-range counts
3) sheet_table for the header-labeled rows of one sheet
4) export_sheet_csv to drop <sheet_name>.csv in the export directory

VIEW OPTIONS: sheet_table and export_sheet_csv accept show_formulas
(formula text with the '=' marker instead of cached values) and
annotate_comments (cell comments appended to displayed values).

Every call re-resolves the newest workbook and re-reads it from disk;
there is no cache to refresh. A missing or unmatched report surfaces as a
no_matching_file error payload, not a crash.";

#[derive(Clone)]
pub struct BidbookServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<BidbookServer>,
}

impl BidbookServer {
    pub async fn new(config: Arc<ServerConfig>) -> Result<Self> {
        config.ensure_report_dir()?;
        let state = Arc::new(AppState::new(config));
        Ok(Self::from_state(state))
    }

    pub fn from_state(state: Arc<AppState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn run_stdio(self) -> Result<()> {
        let service = self
            .serve(stdio())
            .await
            .inspect_err(|error| tracing::error!("serving error: {:?}", error))?;
        service.waiting().await?;
        Ok(())
    }

    fn ensure_tool_enabled(&self, tool: &str) -> Result<()> {
        tracing::info!(tool = tool, "tool invocation requested");
        if self.state.config().is_tool_enabled(tool) {
            Ok(())
        } else {
            Err(ToolDisabledError::new(tool).into())
        }
    }
}

#[tool_router]
impl BidbookServer {
    #[tool(
        name = "latest_report",
        description = "Resolve the most recently dated bid workbook"
    )]
    pub async fn latest_report(
        &self,
        Parameters(params): Parameters<tools::LatestReportParams>,
    ) -> Result<Json<LatestReportResponse>, McpError> {
        self.ensure_tool_enabled("latest_report")
            .map_err(to_mcp_error)?;
        tools::latest_report(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(to_mcp_error)
    }

    #[tool(
        name = "list_sheets",
        description = "List sheets of the latest workbook with summaries"
    )]
    pub async fn list_sheets(
        &self,
        Parameters(params): Parameters<tools::ListSheetsParams>,
    ) -> Result<Json<SheetListResponse>, McpError> {
        self.ensure_tool_enabled("list_sheets")
            .map_err(to_mcp_error)?;
        tools::list_sheets(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(to_mcp_error)
    }

    #[tool(
        name = "sheet_table",
        description = "Materialize one sheet into a header-labeled table"
    )]
    pub async fn sheet_table(
        &self,
        Parameters(params): Parameters<tools::SheetTableParams>,
    ) -> Result<Json<SheetTableResponse>, McpError> {
        self.ensure_tool_enabled("sheet_table")
            .map_err(to_mcp_error)?;
        tools::sheet_table(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(to_mcp_error)
    }

    #[tool(
        name = "export_sheet_csv",
        description = "Write one sheet as <sheet_name>.csv in the export directory"
    )]
    pub async fn export_sheet_csv(
        &self,
        Parameters(params): Parameters<tools::ExportSheetParams>,
    ) -> Result<Json<ExportSheetResponse>, McpError> {
        self.ensure_tool_enabled("export_sheet_csv")
            .map_err(to_mcp_error)?;
        tools::export_sheet_csv(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(to_mcp_error)
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for BidbookServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }
}

/// Every recoverable report failure becomes an error payload the client
/// renders in place of data; only unexpected faults map to internal
/// errors.
fn to_mcp_error(error: anyhow::Error) -> McpError {
    if let Some(report_error) = error.downcast_ref::<ReportError>() {
        tracing::warn!(
            code = %report_error.code(),
            category = report_error.code().category(),
            "render cycle failed: {report_error}"
        );
        return McpError::invalid_request(error.to_string(), None);
    }
    if error.downcast_ref::<ToolDisabledError>().is_some() {
        return McpError::invalid_request(error.to_string(), None);
    }
    McpError::internal_error(error.to_string(), None)
}

#[derive(Debug, Error)]
#[error("tool '{tool_name}' is disabled by server configuration")]
struct ToolDisabledError {
    tool_name: String,
}

impl ToolDisabledError {
    fn new(tool_name: &str) -> Self {
        Self {
            tool_name: tool_name.to_ascii_lowercase(),
        }
    }
}
