//! Error taxonomy for the bid report surface.
//!
//! Every variant here is recoverable at the tool boundary: the client sees
//! an error payload in place of data and the process keeps serving. No
//! retries are performed; a transient read failure surfaces immediately as
//! `WorkbookUnreadable` and the client re-triggers the render cycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// MCP error codes following JSON-RPC 2.0 plus custom application codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    // Standard JSON-RPC errors
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,

    // Custom application errors (-32000 to -32099)
    /// No workbook in the report directory matched the configured pattern
    NoMatchingFile = -32001,
    /// The configured glob pattern does not compile
    InvalidPattern = -32002,
    /// The resolved file is missing, corrupt, or not a workbook container
    WorkbookUnreadable = -32003,
    /// The requested sheet is not present in the workbook
    SheetNotFound = -32004,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Error category for log fields.
    pub fn category(self) -> &'static str {
        match self {
            ErrorCode::ParseError | ErrorCode::InvalidRequest | ErrorCode::InvalidParams => {
                "client_error"
            }
            ErrorCode::MethodNotFound => "not_found",
            ErrorCode::InternalError => "server_error",
            ErrorCode::NoMatchingFile | ErrorCode::SheetNotFound => "resource_not_found",
            ErrorCode::InvalidPattern => "validation_error",
            ErrorCode::WorkbookUnreadable => "io_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

/// Failures a render cycle can hit between resolution and materialization.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no workbook matching {pattern:?} under {directory:?}")]
    NoMatchingFile { directory: PathBuf, pattern: String },

    #[error("invalid report pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("unable to read workbook {path:?}: {reason}")]
    WorkbookUnreadable { path: PathBuf, reason: String },

    #[error("sheet {sheet:?} not found in {path:?}")]
    SheetNotFound { sheet: String, path: PathBuf },
}

impl ReportError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ReportError::NoMatchingFile { .. } => ErrorCode::NoMatchingFile,
            ReportError::InvalidPattern { .. } => ErrorCode::InvalidPattern,
            ReportError::WorkbookUnreadable { .. } => ErrorCode::WorkbookUnreadable,
            ReportError::SheetNotFound { .. } => ErrorCode::SheetNotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_custom_range() {
        let error = ReportError::NoMatchingFile {
            directory: PathBuf::from("reports"),
            pattern: "*.xlsx".to_string(),
        };
        assert_eq!(error.code().code(), -32001);
        assert_eq!(error.code().category(), "resource_not_found");
    }

    #[test]
    fn messages_name_the_offending_input() {
        let error = ReportError::SheetNotFound {
            sheet: "Totals".to_string(),
            path: PathBuf::from("bids.xlsx"),
        };
        let message = error.to_string();
        assert!(message.contains("Totals"));
        assert!(message.contains("bids.xlsx"));
    }
}
