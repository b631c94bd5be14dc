//! SQLite backend for the local day cache.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The whole date→record mapping lives in
//! a single JSON blob under a namespaced key.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{DEFAULT_NAMESPACE, SqliteCache};
