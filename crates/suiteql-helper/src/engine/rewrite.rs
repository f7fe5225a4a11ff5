//! `#view` macro expansion.
//!
//! A macro is `#` plus ASCII word characters, at the start of the query or
//! after whitespace. Each occurrence is replaced in place by
//! `( <contents of name.sql> ) AS name`. Every occurrence expands, including
//! repeats of the same name, and inserted view text is never rescanned.

use std::sync::OnceLock;

use regex::Regex;

use crate::engine::executor::BlobStore;
use crate::error::{AppError, AppResult};

fn macro_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?:^|\s)#([0-9A-Za-z_]+)").expect("view macro pattern compiles"))
}

/// File name a view macro resolves to.
pub fn view_file_name(identifier: &str) -> String {
    format!("{identifier}.sql")
}

pub fn has_view_macros(query: &str) -> bool {
    macro_pattern().is_match(query)
}

/// Expands every view macro in `query` from `store`.
///
/// Fails with [`AppError::UnresolvedView`] on the first name without a stored
/// file; nothing partially rewritten is returned.
pub async fn expand_views(query: &str, store: &dyn BlobStore) -> AppResult<String> {
    let mut out = String::with_capacity(query.len());
    let mut last = 0;

    for caps in macro_pattern().captures_iter(query) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let identifier = name.as_str();
        // The match may carry one leading whitespace char; keep it.
        let hash_at = name.start() - 1;

        let Some(body) = store.load(&view_file_name(identifier)).await? else {
            return Err(AppError::UnresolvedView(identifier.to_string()));
        };
        tracing::debug!(view = identifier, "expanding view macro");

        out.push_str(&query[last..hash_at]);
        out.push_str("( ");
        out.push_str(&body);
        out.push_str(" ) AS ");
        out.push_str(identifier);
        last = whole.end();
    }

    out.push_str(&query[last..]);
    Ok(out)
}
