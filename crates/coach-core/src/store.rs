//! The two store traits behind [`crate::persist::Persistence`].
//!
//! [`LocalCache`] is implemented by `coach-store-sqlite` and [`RemoteStore`]
//! by `coach-remote`; [`crate::memory`] has in-process fakes of both. The
//! facade depends on these abstractions, never on a concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::day::{DayMap, DayRecord};

// ─── Range result ────────────────────────────────────────────────────────────

/// A day returned by a range query, with the two aggregate columns the
/// remote table keeps alongside each row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangedDay {
  #[serde(flatten)]
  pub record:         DayRecord,
  pub total_calories: f64,
  pub total_protein:  f64,
}

impl RangedDay {
  /// Compute the aggregates from the record's meals.
  pub fn from_record(record: DayRecord) -> Self {
    let totals = record.totals();
    Self {
      record,
      total_calories: totals.calories,
      total_protein: totals.protein,
    }
  }
}

// ─── Local cache ─────────────────────────────────────────────────────────────

/// Durable on-device storage of every day, keyed by date.
///
/// Nothing here returns an error: an unreadable cache reads as empty and a
/// failed write is a no-op. Implementations log what they absorb.
///
/// The cache also remembers which dates still have to reach the remote store
/// (the outbox).
pub trait LocalCache: Send + Sync {
  /// The full persisted set, or an empty map if storage is unavailable or
  /// corrupted.
  fn load_all(&self) -> impl Future<Output = DayMap> + Send + '_;

  /// Merge `days` into the persisted set, last write wins per date. Dates not
  /// in `days` are left untouched.
  fn save_merge(&self, days: DayMap) -> impl Future<Output = ()> + Send + '_;

  /// Record that the latest local write for `date` has not reached the
  /// remote store.
  fn mark_pending(&self, date: NaiveDate) -> impl Future<Output = ()> + Send + '_;

  /// Forget the pending marker for `date`.
  fn clear_pending(&self, date: NaiveDate) -> impl Future<Output = ()> + Send + '_;

  /// All pending dates, ascending.
  fn pending(&self) -> impl Future<Output = Vec<NaiveDate>> + Send + '_;
}

// ─── Remote store ────────────────────────────────────────────────────────────

/// A hosted table of day rows keyed by a unique `date`.
pub trait RemoteStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Whether credentials are present. Consulted by the facade on every call.
  fn is_configured(&self) -> bool;

  /// Write or replace the row for `record.date`, including the derived
  /// `total_calories` and `total_protein` columns.
  fn upsert<'a>(
    &'a self,
    record: &'a DayRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// The row for `date`, or `None` if there is none.
  fn fetch_one(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<DayRecord>, Self::Error>> + Send + '_;

  /// Every row, ascending by date.
  fn fetch_all(
    &self,
  ) -> impl Future<Output = Result<Vec<DayRecord>, Self::Error>> + Send + '_;

  /// Rows with `start <= date <= end`, ascending by date.
  fn fetch_range(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<RangedDay>, Self::Error>> + Send + '_;
}
