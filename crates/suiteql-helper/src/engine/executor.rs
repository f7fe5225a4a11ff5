use async_trait::async_trait;

use crate::engine::{
    query::SqlDialect,
    types::{LibraryFile, PageData, Row},
};
use crate::error::AppResult;

/// The platform's query service.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    fn dialect(&self) -> SqlDialect;

    /// Runs `sql` once; the host caps the number of rows it hands back.
    async fn run_query(&self, sql: &str, params: &[String]) -> AppResult<Vec<Row>>;

    /// Opens a cursor over `sql` split into pages of `page_size` rows.
    async fn run_paged_query(&self, sql: &str, page_size: usize) -> AppResult<Box<dyn PagedHandle>>;
}

/// Host-side cursor returned by [`QueryExecutor::run_paged_query`].
#[async_trait]
pub trait PagedHandle: Send + Sync {
    fn total_row_count(&self) -> u64;

    fn page_count(&self) -> usize;

    /// Page size the host actually applied.
    fn page_size(&self) -> usize;

    async fn fetch(&self, page_index: usize) -> AppResult<PageData>;
}

/// Named text blobs (stored `.sql` files).
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// `Ok(None)` when no blob carries that name.
    async fn load(&self, name: &str) -> AppResult<Option<String>>;

    async fn exists(&self, name: &str) -> AppResult<bool>;

    async fn save(&self, name: &str, contents: &str) -> AppResult<()>;

    async fn list(&self) -> AppResult<Vec<LibraryFile>>;
}
