//! In-memory stand-ins for the host services, shared by unit tests.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;

use crate::engine::{
    executor::{BlobStore, PagedHandle, QueryExecutor},
    query::SqlDialect,
    types::{LibraryFile, PageData, Row},
};
use crate::error::{AppError, AppResult};

pub fn row(pairs: &[(&str, serde_json::Value)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<String, String>>,
    loads: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn with<const N: usize>(entries: [(&str, &str); N]) -> Self {
        let store = Self::default();
        {
            let mut blobs = store.blobs.lock().unwrap();
            for (k, v) in entries {
                blobs.insert(k.to_string(), v.to_string());
            }
        }
        store
    }

    pub fn load_calls(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn load(&self, name: &str) -> AppResult<Option<String>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.blobs.lock().unwrap().get(name).cloned())
    }

    async fn exists(&self, name: &str) -> AppResult<bool> {
        Ok(self.blobs.lock().unwrap().contains_key(name))
    }

    async fn save(&self, name: &str, contents: &str) -> AppResult<()> {
        self.blobs
            .lock()
            .unwrap()
            .insert(name.to_string(), contents.to_string());
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<LibraryFile>> {
        Ok(self
            .blobs
            .lock()
            .unwrap()
            .iter()
            .map(|(name, body)| LibraryFile {
                name: name.clone(),
                size: body.len() as u64,
            })
            .collect())
    }
}

/// Synthetic table of rows `1..=total`, each `{ id, name }`.
pub struct SyntheticExecutor {
    total: u64,
    ceiling: usize,
    fail_on_call: Option<usize>,
    calls: Mutex<Vec<String>>,
}

impl SyntheticExecutor {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ceiling: 5000,
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Makes the `n`th call (1-based) fail.
    pub fn failing_on(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn data_row(ordinal: u64) -> Row {
        row(&[("id", json!(ordinal)), ("name", json!(format!("row {ordinal}")))])
    }

    fn record_call(&self, sql: &str) -> AppResult<()> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(sql.to_string());
        if self.fail_on_call == Some(calls.len()) {
            return Err(AppError::Execution("Search error occurred: Invalid or unsupported search".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl QueryExecutor for SyntheticExecutor {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::SuiteQl
    }

    async fn run_query(&self, sql: &str, _params: &[String]) -> AppResult<Vec<Row>> {
        self.record_call(sql)?;

        if sql.starts_with("SELECT COUNT(*)") {
            return Ok(vec![row(&[("totalrecordcount", json!(self.total))])]);
        }

        let window = Regex::new(r"(?s)AS (\w+), \*.*BETWEEN (\d+) AND (\d+)").unwrap();
        let rows = match window.captures(sql) {
            Some(c) => {
                let ordinal_column = c[1].to_lowercase();
                let begin: u64 = c[2].parse().unwrap();
                let end: u64 = c[3].parse().unwrap();
                (begin..=end.min(self.total))
                    .map(|n| {
                        let mut r = row(&[(ordinal_column.as_str(), json!(n))]);
                        r.extend(Self::data_row(n));
                        r
                    })
                    .take(self.ceiling)
                    .collect()
            }
            None => (1..=self.total).map(Self::data_row).take(self.ceiling).collect(),
        };
        Ok(rows)
    }

    async fn run_paged_query(&self, sql: &str, page_size: usize) -> AppResult<Box<dyn PagedHandle>> {
        self.record_call(sql)?;
        Ok(Box::new(SyntheticPages {
            total: self.total,
            page_size,
        }))
    }
}

pub struct SyntheticPages {
    pub total: u64,
    pub page_size: usize,
}

#[async_trait]
impl PagedHandle for SyntheticPages {
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
        let first = page_index as u64 * self.page_size as u64 + 1;
        let last = (first + self.page_size as u64 - 1).min(self.total);
        Ok(PageData {
            rows: (first..=last).map(SyntheticExecutor::data_row).collect(),
            is_last: page_index + 1 >= self.page_count(),
        })
    }
}
