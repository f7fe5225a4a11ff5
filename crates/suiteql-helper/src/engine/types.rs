use serde::{Deserialize, Serialize};

use crate::engine::shape::RenderedResult;

/// A mapped result row: lower-cased column name to scalar, in select order.
pub type Row = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UnpagedResult {
    pub items: Vec<Row>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult {
    pub total_results: u64,
    pub count: usize,
    pub offset: u64,
    pub has_more: bool,
    pub page_size: usize,
    pub page_number: usize,
    pub items: Vec<Row>,
}

/// One page handed back by a native paged handle.
#[derive(Debug, Clone, Default)]
pub struct PageData {
    pub rows: Vec<Row>,
    pub is_last: bool,
}

/// Query tool response body.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryToolResult {
    pub records: Vec<Row>,
    pub elapsed_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_record_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<RenderedResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryFile {
    pub name: String,
    pub size: u64,
}
