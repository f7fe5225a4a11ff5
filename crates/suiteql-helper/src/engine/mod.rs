pub mod executor;
pub mod fetch_loop;
pub mod limits;
pub mod pager;
pub mod query;
pub mod rewrite;
pub mod shape;
pub mod types;
