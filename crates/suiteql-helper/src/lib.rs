//! Query helper for a hosted SQL service: `#view` macro expansion, windowed
//! exhaustive reads past the host's row ceiling, cursor paging and result
//! shaping, served over an NDJSON stdio bridge.
//!
//! The engine talks to its host through [`engine::executor::QueryExecutor`].
//! [`host::SqliteHost`] is the local implementation; a platform-backed
//! executor reports [`engine::query::SqlDialect::SuiteQl`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod logging;
#[cfg(test)]
mod testing;
