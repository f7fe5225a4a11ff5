use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Unresolved View {0}.sql")]
    UnresolvedView(String),

    #[error("failed to open database: {path}: {message}")]
    DbOpenFailed { path: PathBuf, message: String },

    #[error("{0}")]
    Execution(String),

    #[error("query is not read-only")]
    NotReadonly,

    #[error("io error: {0}")]
    Io(String),

    #[error("json error: {0}")]
    Json(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Execution(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Json(e.to_string())
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::UnresolvedView(_) => "UNRESOLVED_VIEW",
            AppError::DbOpenFailed { .. } => "DB_OPEN_FAILED",
            AppError::Execution(_) => "EXECUTION_ERROR",
            AppError::NotReadonly => "NOT_READONLY",
            AppError::Io(_) => "IO_ERROR",
            AppError::Json(_) => "JSON_ERROR",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    /// Prefixes an execution failure with the operation that hit it.
    pub fn context(self, what: &str) -> Self {
        match self {
            AppError::Execution(msg) => AppError::Execution(format!("{what}: {msg}")),
            other => other,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
