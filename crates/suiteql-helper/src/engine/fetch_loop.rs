use crate::engine::{
    executor::QueryExecutor,
    limits::RowWindow,
    query::{windowed_sql, ROW_NUMBER_COLUMN},
    types::Row,
};
use crate::error::AppResult;

/// Reads a query past the host's per-call row ceiling by walking it in
/// fixed-size ordinal windows.
///
/// A page shorter than the window ends the walk. When the last real page is
/// exactly full, one more (empty) window is fetched before stopping.
#[derive(Debug, Clone, Copy)]
pub struct PagedFetchLoop {
    window_size: usize,
    ordinal_column: &'static str,
}

impl PagedFetchLoop {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            ordinal_column: ROW_NUMBER_COLUMN,
        }
    }

    /// Names the synthetic ordinal column (lower-case); `rownumber` by default.
    pub fn with_ordinal_column(mut self, column: &'static str) -> Self {
        self.ordinal_column = column;
        self
    }

    /// Every row of `base_sql`, starting from the first.
    pub async fn fetch_all(&self, executor: &dyn QueryExecutor, base_sql: &str) -> AppResult<Vec<Row>> {
        self.fetch_range(executor, base_sql, 1, None).await
    }

    /// Rows `begin..=end` of `base_sql` (to exhaustion when `end` is `None`).
    ///
    /// Each returned row carries the synthetic ordinal column. A failing
    /// window aborts the walk and drops everything gathered so far.
    pub async fn fetch_range(
        &self,
        executor: &dyn QueryExecutor,
        base_sql: &str,
        begin: u64,
        end: Option<u64>,
    ) -> AppResult<Vec<Row>> {
        let dialect = executor.dialect();
        let mut records = Vec::new();
        let mut begin = begin;
        let mut windows = 0usize;

        loop {
            if matches!(end, Some(limit) if begin > limit) {
                break;
            }
            let window = RowWindow::sized(begin, self.window_size, end)?;
            let sql = windowed_sql(dialect, base_sql, window, self.ordinal_column);

            let page = executor.run_query(&sql, &[]).await?;
            windows += 1;
            tracing::debug!(
                begin = window.begin(),
                end = window.end(),
                requested = window.row_count(),
                rows = page.len(),
                "fetched row window"
            );

            let exhausted = page.len() < self.window_size;
            records.extend(page);
            if exhausted {
                break;
            }
            begin = begin.saturating_add(self.window_size as u64);
        }

        tracing::debug!(windows, rows = records.len(), "row windows exhausted");
        Ok(records)
    }
}
