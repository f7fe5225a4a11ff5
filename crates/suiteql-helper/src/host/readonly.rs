use rusqlite::Statement;

use crate::error::{AppError, AppResult};

/// The platform only runs queries; reject anything that would write.
pub fn ensure_readonly(stmt: &Statement<'_>) -> AppResult<()> {
    if stmt.readonly() {
        Ok(())
    } else {
        Err(AppError::NotReadonly)
    }
}
