//! Core types and persistence logic for the coaching dashboard.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! concrete stores live in `coach-store-sqlite` (local cache) and
//! `coach-remote` (hosted table); both plug into [`persist::Persistence`]
//! through the traits in [`store`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod day;
pub mod error;
pub mod memory;
pub mod persist;
pub mod protocol;
pub mod store;

pub use day::{Checklist, ChecklistItem, DayMap, DayPatch, DayRecord, MealEntry};
pub use error::{Error, Result};
pub use persist::{Persistence, SaveOutcome, StoreKind, SyncReport};

#[cfg(test)]
mod tests;
