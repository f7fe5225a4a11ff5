use crate::error::{AppError, AppResult};

/// Inclusive, 1-based range of ordinal rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    begin: u64,
    end: u64,
}

impl RowWindow {
    pub fn new(begin: u64, end: u64) -> AppResult<Self> {
        if begin < 1 {
            return Err(AppError::InvalidRequest(format!(
                "row window must start at 1 or later, got {begin}"
            )));
        }
        if begin > end {
            return Err(AppError::InvalidRequest(format!(
                "row window begins after it ends: {begin} > {end}"
            )));
        }
        Ok(Self { begin, end })
    }

    /// Window of `size` rows starting at `begin`, cut off at `limit` when given.
    pub fn sized(begin: u64, size: usize, limit: Option<u64>) -> AppResult<Self> {
        if size == 0 {
            return Err(AppError::InvalidRequest("window size must be positive".into()));
        }
        let mut end = begin.saturating_add(size as u64 - 1);
        if let Some(limit) = limit {
            end = end.min(limit);
        }
        Self::new(begin, end)
    }

    pub fn begin(&self) -> u64 {
        self.begin
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn row_count(&self) -> u64 {
        self.end - self.begin + 1
    }
}

/// Page size after clamping into `(0, max_page_size]`.
pub fn effective_page_size(requested: Option<i64>, max_page_size: usize) -> usize {
    match requested {
        Some(n) if n > 0 => (n as u64).min(max_page_size as u64) as usize,
        _ => max_page_size,
    }
}

/// Page number floored at 1; the pager wraps it once the page count is known.
pub fn effective_page_number(requested: Option<i64>) -> usize {
    match requested {
        Some(n) if n >= 1 => n as usize,
        _ => 1,
    }
}
