//! Remote day store: a hosted Postgres table reached through its PostgREST
//! endpoint.
//!
//! [`RestStore`] implements [`coach_core::store::RemoteStore`]. Rows are
//! translated to and from [`coach_core::DayRecord`] by [`row::DayRow`], which
//! fills defaults for absent nested columns and rejects malformed rows.

pub mod client;
pub mod config;
pub mod error;
pub mod row;

pub use client::RestStore;
pub use config::RemoteConfig;
pub use error::{Error, Result};
