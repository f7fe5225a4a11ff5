use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::engine::{
    shape::{NullDisplay, ResultsFormat},
    types::{LibraryFile, PagedResult, QueryToolResult, UnpagedResult},
};
use crate::error::AppError;

pub const PROTOCOL_VERSION: u32 = 1;

fn default_version() -> u32 {
    PROTOCOL_VERSION
}

/// One request line: `{ "id": .., "function": .., ...payload fields }`.
#[derive(Debug, Deserialize)]
pub struct BridgeRequest {
    #[serde(default = "default_version")]
    pub v: u32,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct BridgeResponse {
    pub v: u32,
    pub id: String,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Ok(RouteOutput),
    Err(ErrorBody),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl BridgeResponse {
    pub fn new(v: u32, id: String, result: Result<RouteOutput, AppError>) -> Self {
        let body = match result {
            Ok(out) => ResponseBody::Ok(out),
            Err(e) => ResponseBody::Err(ErrorBody {
                error: e.to_string(),
                code: e.code(),
            }),
        };
        Self { v, id, body }
    }
}

/// Success shape per routed function.
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum RouteOutput {
    Unpaged(UnpagedResult),
    Paged(PagedResult),
    QueryTool(QueryToolResult),
    FileExists { exists: bool },
    FileLoad { sql: String },
    FileSaved { saved: String },
    Library { records: Vec<LibraryFile> },
}

// Payloads

#[derive(Debug, Default, Deserialize)]
pub struct UnpagedPayload {
    #[serde(default)]
    pub sql: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedPayload {
    #[serde(default)]
    pub sql: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub page_size: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub page_number: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryExecutePayload {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub row_begin: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub row_end: Option<i64>,
    #[serde(default)]
    pub pagination_enabled: bool,
    #[serde(default)]
    pub views_enabled: bool,
    #[serde(default)]
    pub return_totals: bool,
    #[serde(default)]
    pub results_format: Option<ResultsFormat>,
    #[serde(default)]
    pub null_format: Option<NullDisplay>,
    #[serde(default)]
    pub hide_row_numbers: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilePayload {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FileSavePayload {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub contents: Option<String>,
}

/// Accepts `25`, `25.0` or `"25"`; anything unparsable reads as absent.
fn lenient_int<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(match v {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    })
}
