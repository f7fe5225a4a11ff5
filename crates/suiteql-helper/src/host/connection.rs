use std::{
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use rusqlite::{params_from_iter, types::ValueRef, Connection, OpenFlags};
use tokio::sync::oneshot;

use crate::{
    engine::types::Row,
    error::{AppError, AppResult},
    host::readonly,
};

/// Where the worker's connection comes from.
#[derive(Debug, Clone)]
pub enum DbTarget {
    File(PathBuf),
    /// Private in-memory database seeded with `setup`.
    #[cfg(test)]
    Memory { setup: String },
}

/// Handle to the thread that owns the SQLite connection.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    tx: std::sync::mpsc::Sender<DbTask>,
}

impl WorkerHandle {
    pub fn spawn(target: DbTarget, busy_timeout_ms: u64) -> AppResult<Self> {
        let (tx, rx) = std::sync::mpsc::channel::<DbTask>();
        thread::Builder::new()
            .name("suiteql-db".into())
            .spawn(move || db_worker_main(target, busy_timeout_ms, rx))?;
        Ok(Self { tx })
    }

    /// Runs a read-only query, returning at most `limit` mapped rows.
    pub async fn query(&self, sql: String, params: Vec<String>, limit: usize) -> AppResult<Vec<Row>> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(DbTask::Query {
                sql,
                params,
                limit,
                respond_to: tx,
            })
            .map_err(|_| AppError::Internal("db worker unavailable".into()))?;
        rx.await
            .map_err(|_| AppError::Internal("db worker dropped response".into()))?
    }
}

enum DbTask {
    Query {
        sql: String,
        params: Vec<String>,
        limit: usize,
        respond_to: oneshot::Sender<AppResult<Vec<Row>>>,
    },
}

fn db_worker_main(target: DbTarget, busy_timeout_ms: u64, rx: std::sync::mpsc::Receiver<DbTask>) {
    let conn = match open_conn(&target, busy_timeout_ms) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "failed to open db in worker; failing queued tasks");
            while let Ok(task) = rx.recv() {
                respond_err(task, e.clone());
            }
            return;
        }
    };

    while let Ok(task) = rx.recv() {
        match task {
            DbTask::Query {
                sql,
                params,
                limit,
                respond_to,
            } => {
                let res = run_query(&conn, &sql, &params, limit);
                let _ = respond_to.send(res);
            }
        }
    }
}

fn respond_err(task: DbTask, err: AppError) {
    match task {
        DbTask::Query { respond_to, .. } => {
            let _ = respond_to.send(Err(err));
        }
    }
}

fn open_conn(target: &DbTarget, busy_timeout_ms: u64) -> AppResult<Connection> {
    let conn = match target {
        DbTarget::File(path) => open_file(path)?,
        #[cfg(test)]
        DbTarget::Memory { setup } => {
            let conn = Connection::open_in_memory()?;
            conn.execute_batch(setup)?;
            conn
        }
    };
    let _ = conn.busy_timeout(Duration::from_millis(busy_timeout_ms));
    Ok(conn)
}

fn open_file(path: &Path) -> AppResult<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Connection::open_with_flags(path, flags).map_err(|source| AppError::DbOpenFailed {
        path: path.to_path_buf(),
        message: source.to_string(),
    })
}

fn run_query(conn: &Connection, sql: &str, params: &[String], limit: usize) -> AppResult<Vec<Row>> {
    let mut stmt = conn.prepare(sql)?;
    readonly::ensure_readonly(&stmt)?;

    let col_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(|s| s.to_lowercase())
        .collect();

    let mut rows = Vec::new();
    let mut r = stmt.query(params_from_iter(params.iter()))?;
    while let Some(row) = r.next()? {
        if rows.len() >= limit {
            tracing::debug!(limit, "row ceiling reached; truncating result");
            break;
        }
        rows.push(row_to_json_object(row, &col_names)?);
    }
    Ok(rows)
}

fn row_to_json_object(row: &rusqlite::Row<'_>, col_names: &[String]) -> AppResult<Row> {
    let mut out = Row::new();
    for (i, name) in col_names.iter().enumerate() {
        let v = match row.get_ref(i)? {
            ValueRef::Null => serde_json::Value::Null,
            ValueRef::Integer(x) => serde_json::Value::from(x),
            ValueRef::Real(x) => serde_json::Value::from(x),
            ValueRef::Text(t) | ValueRef::Blob(t) => {
                serde_json::Value::from(String::from_utf8_lossy(t).into_owned())
            }
        };
        out.insert(name.clone(), v);
    }
    Ok(out)
}
