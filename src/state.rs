use crate::config::ServerConfig;
use crate::error::ReportError;
use crate::resolve::resolve_latest;
use crate::workbook::ReportWorkbook;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared handle over the immutable configuration. There is deliberately
/// no workbook cache: every render cycle re-resolves and re-reads the
/// file from disk, so concurrent calls each hold their own independent
/// read handle.
pub struct AppState {
    config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    /// Run the resolver half of a render cycle.
    pub fn resolve_latest(&self) -> Result<Option<PathBuf>, ReportError> {
        resolve_latest(&self.config.report_dir, &self.config.report_pattern)
    }

    /// Resolve the latest report and load it fresh. An empty resolution
    /// becomes `NoMatchingFile` here so tools render it as the
    /// user-visible "no report available" state.
    pub fn open_latest(&self) -> Result<ReportWorkbook, ReportError> {
        let path = self
            .resolve_latest()?
            .ok_or_else(|| ReportError::NoMatchingFile {
                directory: self.config.report_dir.clone(),
                pattern: self.config.report_pattern.clone(),
            })?;
        tracing::debug!(report = %path.display(), "resolved latest report");
        ReportWorkbook::load(&path)
    }
}
