//! SQLite-backed storage implementation.

mod completions;
mod convert;
mod daily_logs;
mod log_fields;
pub mod schema;
mod store;
mod tasks;

pub use store::SqliteStore;
