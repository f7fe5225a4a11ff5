use std::{sync::Arc, time::Instant};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    config::RouterConfig,
    engine::{
        executor::{BlobStore, QueryExecutor},
        fetch_loop::PagedFetchLoop,
        pager::CursorPager,
        query::{count_sql, INTERNAL_ROW_NUMBER_COLUMN, TOTAL_COUNT_COLUMN},
        rewrite::{expand_views, has_view_macros},
        shape::{shape, ShapeOptions},
        types::{PagedResult, QueryToolResult, Row, UnpagedResult},
    },
    error::{AppError, AppResult},
};

use super::protocol::*;

/// Dispatches a request's `function` to the paging engine or the query library.
pub struct RequestRouter {
    config: RouterConfig,
    executor: Arc<dyn QueryExecutor>,
    blobs: Option<Arc<dyn BlobStore>>,
}

impl RequestRouter {
    pub fn new(config: RouterConfig, executor: Arc<dyn QueryExecutor>, blobs: Option<Arc<dyn BlobStore>>) -> Self {
        Self {
            config,
            executor,
            blobs,
        }
    }

    pub async fn handle(&self, req: BridgeRequest) -> BridgeResponse {
        if req.v != PROTOCOL_VERSION {
            let e = AppError::InvalidRequest(format!("unsupported protocol version: {}", req.v));
            return BridgeResponse::new(req.v, req.id, Err(e));
        }

        let function = req.function.clone().unwrap_or_default();
        let res = self.dispatch(&function, req.payload).await;
        if let Err(e) = &res {
            tracing::error!(function = %function, id = %req.id, code = e.code(), error = %e, "request failed");
        }
        BridgeResponse::new(req.v, req.id, res)
    }

    pub async fn dispatch(&self, function: &str, payload: Map<String, Value>) -> AppResult<RouteOutput> {
        match function {
            "" => Err(AppError::InvalidRequest("No function was specified.".into())),
            "sqlRunUnpaged" => self.sql_run_unpaged(parse(payload)?).await.map(RouteOutput::Unpaged),
            "sqlRunPaged" => self.sql_run_paged(parse(payload)?).await.map(RouteOutput::Paged),
            "queryExecute" => self.query_execute(parse(payload)?).await.map(RouteOutput::QueryTool),
            "sqlFileExists" => self.sql_file_exists(parse(payload)?).await,
            "sqlFileLoad" => self.sql_file_load(parse(payload)?).await,
            "sqlFileSave" => self.sql_file_save(parse(payload)?).await,
            "localLibraryFilesGet" => self.library_files_get().await,
            other => Err(AppError::InvalidRequest(format!("Unsupported function: {other}"))),
        }
    }

    /// Whole result via the window loop, without the synthetic ordinal column.
    async fn sql_run_unpaged(&self, p: UnpagedPayload) -> AppResult<UnpagedResult> {
        let sql = required(p.sql, "No SQL specified.")?;
        let sql = self.prepare_sql(&sql, true).await?;

        let mut items = PagedFetchLoop::new(self.config.window_size)
            .with_ordinal_column(INTERNAL_ROW_NUMBER_COLUMN)
            .fetch_all(self.executor.as_ref(), &sql)
            .await?;
        for row in &mut items {
            row.shift_remove(INTERNAL_ROW_NUMBER_COLUMN);
        }
        Ok(UnpagedResult { items })
    }

    async fn sql_run_paged(&self, p: PagedPayload) -> AppResult<PagedResult> {
        let sql = required(p.sql, "No SQL specified.")?;
        let sql = self.prepare_sql(&sql, true).await?;

        CursorPager::new(self.config.max_page_size)
            .fetch_page(self.executor.as_ref(), &sql, p.page_size, p.page_number)
            .await
    }

    async fn query_execute(&self, p: QueryExecutePayload) -> AppResult<QueryToolResult> {
        let query = required(p.query, "No query specified.")?;
        let sql = self.prepare_sql(&query, p.views_enabled).await?;

        let started = Instant::now();
        let records = if p.pagination_enabled {
            let begin = p.row_begin.unwrap_or(1).max(1) as u64;
            let end = match p.row_end {
                Some(n) if n >= 1 => n as u64,
                Some(n) => {
                    return Err(AppError::InvalidRequest(format!("ending row must be positive, got {n}")));
                }
                None => self.config.rows_returned_default,
            };
            if end < begin {
                return Err(AppError::InvalidRequest(format!(
                    "ending row {end} is before beginning row {begin}"
                )));
            }
            PagedFetchLoop::new(self.config.window_size)
                .fetch_range(self.executor.as_ref(), &sql, begin, Some(end))
                .await?
        } else {
            self.executor.run_query(&sql, &[]).await?
        };
        let elapsed_time = started.elapsed().as_millis() as u64;

        let total_record_count = if p.return_totals && !records.is_empty() {
            Some(self.total_count(&sql).await?)
        } else {
            None
        };

        let rendered = match p.results_format {
            Some(format) => Some(shape(
                &records,
                format,
                ShapeOptions {
                    hide_row_number_column: p.pagination_enabled && p.hide_row_numbers,
                    null_display: p.null_format.unwrap_or_default(),
                },
            )?),
            None => None,
        };

        Ok(QueryToolResult {
            records,
            elapsed_time,
            total_record_count,
            rendered,
        })
    }

    async fn sql_file_exists(&self, p: FilePayload) -> AppResult<RouteOutput> {
        let store = self.library()?;
        let name = required(p.filename, "No file name specified.")?;
        let exists = store.exists(&name).await?;
        Ok(RouteOutput::FileExists { exists })
    }

    async fn sql_file_load(&self, p: FilePayload) -> AppResult<RouteOutput> {
        let store = self.library()?;
        let name = required(p.filename, "No file name specified.")?;
        match store.load(&name).await? {
            Some(sql) => Ok(RouteOutput::FileLoad { sql }),
            None => Err(AppError::InvalidRequest(format!("File not found: {name}"))),
        }
    }

    async fn sql_file_save(&self, p: FileSavePayload) -> AppResult<RouteOutput> {
        let store = self.library()?;
        let name = required(p.filename, "No file name specified.")?;
        let contents = required(p.contents, "No file contents specified.")?;
        store.save(&name, &contents).await?;
        Ok(RouteOutput::FileSaved { saved: name })
    }

    async fn library_files_get(&self) -> AppResult<RouteOutput> {
        let records = self.library()?.list().await?;
        if records.is_empty() {
            return Err(AppError::InvalidRequest("No SQL Files".into()));
        }
        Ok(RouteOutput::Library { records })
    }

    fn library(&self) -> AppResult<&dyn BlobStore> {
        self.blobs
            .as_deref()
            .ok_or_else(|| AppError::InvalidRequest("No query folder is configured.".into()))
    }

    /// Expands view macros when asked to and a query folder is available.
    async fn prepare_sql(&self, sql: &str, views_requested: bool) -> AppResult<String> {
        let sql = match (&self.blobs, views_requested && self.config.views_enabled) {
            (Some(store), true) if has_view_macros(sql) => expand_views(sql, store.as_ref()).await?,
            _ => sql.to_string(),
        };
        tracing::debug!(sql = %sql, "prepared query");
        Ok(sql)
    }

    async fn total_count(&self, sql: &str) -> AppResult<u64> {
        let rows: Vec<Row> = self.executor.run_query(&count_sql(sql), &[]).await?;
        rows.first()
            .and_then(|r| r.get(TOTAL_COUNT_COLUMN))
            .and_then(|v| v.as_u64())
            .ok_or_else(|| AppError::Execution("count query returned no total".into()))
    }
}

fn parse<T: DeserializeOwned>(payload: Map<String, Value>) -> AppResult<T> {
    serde_json::from_value(Value::Object(payload)).map_err(|e| AppError::InvalidRequest(e.to_string()))
}

fn required(v: Option<String>, msg: &str) -> AppResult<String> {
    match v {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(AppError::InvalidRequest(msg.to_string())),
    }
}
