use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "suiteql-helper", version)]
pub struct Args {
    /// SQLite database standing in for the platform's query service.
    #[arg(long, env = "SUITEQL_HELPER_DB")]
    pub db: PathBuf,

    /// Logging level (stderr). Also supports RUST_LOG.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Largest page a paged query may request.
    #[arg(long, default_value_t = 5000)]
    pub max_page_size: usize,

    /// Rows fetched per window by the unpaged loop.
    #[arg(long, default_value_t = 5000)]
    pub window_size: usize,

    /// Maximum rows the host returns from a single query call.
    #[arg(long, default_value_t = 5000)]
    pub row_ceiling: usize,

    /// Ending row used by the query tool when the request omits one.
    #[arg(long, default_value_t = 25)]
    pub rows_returned_default: u64,

    /// Folder holding stored `.sql` files (view macros and the query library).
    #[arg(long, env = "SUITEQL_HELPER_QUERY_FOLDER")]
    pub query_folder: Option<PathBuf>,

    /// Turn off `#view` expansion even when a query folder is configured.
    #[arg(long)]
    pub disable_views: bool,

    /// SQLite busy timeout for the host connection.
    #[arg(long, default_value_t = 2_000)]
    pub busy_timeout_ms: u64,
}
