use crate::engine::{
    executor::QueryExecutor,
    limits::{effective_page_number, effective_page_size},
    types::PagedResult,
};
use crate::error::{AppError, AppResult};

/// Serves one client page through the host's native cursor paging.
#[derive(Debug, Clone, Copy)]
pub struct CursorPager {
    max_page_size: usize,
}

impl CursorPager {
    pub fn new(max_page_size: usize) -> Self {
        Self {
            max_page_size: max_page_size.max(1),
        }
    }

    /// Fetches page `page_number` (1-based) of `sql`.
    ///
    /// Out-of-range page numbers wrap to page 1. A query with no rows yields an
    /// empty page that keeps the requested number.
    pub async fn fetch_page(
        &self,
        executor: &dyn QueryExecutor,
        sql: &str,
        page_size: Option<i64>,
        page_number: Option<i64>,
    ) -> AppResult<PagedResult> {
        let page_size = effective_page_size(page_size, self.max_page_size);
        let mut page_number = effective_page_number(page_number);

        let handle = executor
            .run_paged_query(sql, page_size)
            .await
            .map_err(|e| e.context("paged query failed"))?;

        let mut items = Vec::new();
        let mut has_more = false;
        let pages = handle.page_count();
        if pages > 0 {
            if page_number > pages {
                tracing::debug!(requested = page_number, pages, "page out of range, wrapping to 1");
                page_number = 1;
            }
            let page = handle
                .fetch(page_number - 1)
                .await
                .map_err(|e| e.context(&format!("fetching page {page_number} failed")))?;
            items = page.rows;
            has_more = !page.is_last;
        }

        let actual_page_size = handle.page_size();
        let offset = (page_number as u64 - 1)
            .checked_mul(actual_page_size as u64)
            .ok_or_else(|| AppError::InvalidRequest(format!("page number {page_number} is out of range")))?;
        Ok(PagedResult {
            total_results: handle.total_row_count(),
            count: items.len(),
            offset,
            has_more,
            page_size: actual_page_size,
            page_number,
            items,
        })
    }
}
