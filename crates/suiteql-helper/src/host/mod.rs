//! SQLite-backed stand-in for the platform's query service.

mod blobs;
mod connection;
mod readonly;

pub use blobs::FolderBlobStore;
pub use connection::DbTarget;

use async_trait::async_trait;

use crate::{
    engine::{
        executor::{PagedHandle, QueryExecutor},
        query::{count_sql, limit_offset_sql, SqlDialect, TOTAL_COUNT_COLUMN},
        types::{PageData, Row},
    },
    error::{AppError, AppResult},
};
use connection::WorkerHandle;

#[derive(Debug, Clone)]
pub struct HostOptions {
    /// Rows a single `run_query` call may return.
    pub row_ceiling: usize,
    pub busy_timeout_ms: u64,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            row_ceiling: 5000,
            busy_timeout_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteHost {
    worker: WorkerHandle,
    row_ceiling: usize,
}

impl SqliteHost {
    pub fn open(target: DbTarget, options: &HostOptions) -> AppResult<Self> {
        let worker = WorkerHandle::spawn(target, options.busy_timeout_ms)?;
        Ok(Self {
            worker,
            row_ceiling: options.row_ceiling.max(1),
        })
    }
}

#[async_trait]
impl QueryExecutor for SqliteHost {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }

    async fn run_query(&self, sql: &str, params: &[String]) -> AppResult<Vec<Row>> {
        self.worker
            .query(sql.to_string(), params.to_vec(), self.row_ceiling)
            .await
    }

    async fn run_paged_query(&self, sql: &str, page_size: usize) -> AppResult<Box<dyn PagedHandle>> {
        let page_size = page_size.max(1);
        let counted = self.worker.query(count_sql(sql), Vec::new(), 1).await?;
        let total = counted
            .first()
            .and_then(|r| r.get(TOTAL_COUNT_COLUMN))
            .and_then(|v| v.as_u64())
            .ok_or_else(|| AppError::Internal("count query returned no total".into()))?;

        Ok(Box::new(SqlitePages {
            worker: self.worker.clone(),
            sql: sql.to_string(),
            page_size,
            total,
        }))
    }
}

struct SqlitePages {
    worker: WorkerHandle,
    sql: String,
    page_size: usize,
    total: u64,
}

#[async_trait]
impl PagedHandle for SqlitePages {
    fn total_row_count(&self) -> u64 {
        self.total
    }

    fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size as u64) as usize
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    async fn fetch(&self, page_index: usize) -> AppResult<PageData> {
        if page_index >= self.page_count() {
            return Err(AppError::InvalidRequest(format!(
                "page index {page_index} out of range (0..{})",
                self.page_count()
            )));
        }
        let rows = self
            .worker
            .query(
                limit_offset_sql(&self.sql, self.page_size, page_index),
                Vec::new(),
                self.page_size,
            )
            .await?;
        Ok(PageData {
            rows,
            is_last: page_index + 1 == self.page_count(),
        })
    }
}

#[cfg(test)]
pub(crate) fn memory_host(setup: &str, row_ceiling: usize) -> SqliteHost {
    SqliteHost::open(
        DbTarget::Memory {
            setup: setup.to_string(),
        },
        &HostOptions {
            row_ceiling,
            busy_timeout_ms: 100,
        },
    )
    .unwrap()
}

#[cfg(test)]
pub(crate) fn numbers_setup(n: u32) -> String {
    let values: Vec<String> = (1..=n).map(|i| format!("({i}, 'item {i}')")).collect();
    let mut setup = String::from("CREATE TABLE item (id INTEGER, label TEXT);");
    if !values.is_empty() {
        setup.push_str(&format!("INSERT INTO item VALUES {};", values.join(",")));
    }
    setup
}
