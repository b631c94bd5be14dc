//! In-process fakes of [`LocalCache`] and [`RemoteStore`].
//!
//! Used by the facade tests and by the CLI tests; [`MemoryRemote`] can be
//! switched into a mode where every call fails.

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
  day::{DayMap, DayRecord},
  store::{LocalCache, RangedDay, RemoteStore},
};

// ─── Local ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryCache {
  days:    Mutex<DayMap>,
  pending: Mutex<BTreeSet<NaiveDate>>,
}

impl MemoryCache {
  pub fn new() -> Self { Self::default() }

  pub fn with_days(days: DayMap) -> Self {
    Self { days: Mutex::new(days), ..Self::default() }
  }

  /// A copy of the current contents.
  pub fn snapshot(&self) -> DayMap {
    self.days.lock().map(|d| d.clone()).unwrap_or_default()
  }
}

impl LocalCache for MemoryCache {
  async fn load_all(&self) -> DayMap { self.snapshot() }

  async fn save_merge(&self, days: DayMap) {
    if let Ok(mut stored) = self.days.lock() {
      stored.extend(days);
    }
  }

  async fn mark_pending(&self, date: NaiveDate) {
    if let Ok(mut pending) = self.pending.lock() {
      pending.insert(date);
    }
  }

  async fn clear_pending(&self, date: NaiveDate) {
    if let Ok(mut pending) = self.pending.lock() {
      pending.remove(&date);
    }
  }

  async fn pending(&self) -> Vec<NaiveDate> {
    self
      .pending
      .lock()
      .map(|p| p.iter().copied().collect())
      .unwrap_or_default()
  }
}

// ─── Remote ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("memory remote: {0}")]
pub struct MemoryRemoteError(pub String);

/// A fake hosted table. Rows keep their aggregates as computed at upsert
/// time.
#[derive(Debug, Default)]
pub struct MemoryRemote {
  configured: AtomicBool,
  failing:    AtomicBool,
  calls:      AtomicUsize,
  rows:       Mutex<BTreeMap<NaiveDate, RangedDay>>,
}

impl MemoryRemote {
  /// A configured, healthy remote.
  pub fn new() -> Self {
    let remote = Self::default();
    remote.set_configured(true);
    remote
  }

  /// A remote without credentials.
  pub fn unconfigured() -> Self { Self::default() }

  /// A configured remote that fails every call.
  pub fn failing() -> Self {
    let remote = Self::new();
    remote.set_failing(true);
    remote
  }

  pub fn set_configured(&self, configured: bool) {
    self.configured.store(configured, Ordering::SeqCst);
  }

  pub fn set_failing(&self, failing: bool) {
    self.failing.store(failing, Ordering::SeqCst);
  }

  /// How many store operations have been attempted.
  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

  /// The stored row for `date`, aggregates included.
  pub fn row(&self, date: NaiveDate) -> Option<RangedDay> {
    self.rows.lock().ok().and_then(|rows| rows.get(&date).cloned())
  }

  pub fn row_count(&self) -> usize {
    self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
  }

  fn enter(&self, op: &str) -> Result<(), MemoryRemoteError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.failing.load(Ordering::SeqCst) {
      return Err(MemoryRemoteError(format!("{op} failed")));
    }
    Ok(())
  }

  fn poisoned() -> MemoryRemoteError { MemoryRemoteError("lock poisoned".into()) }
}

impl RemoteStore for MemoryRemote {
  type Error = MemoryRemoteError;

  fn is_configured(&self) -> bool { self.configured.load(Ordering::SeqCst) }

  async fn upsert(&self, record: &DayRecord) -> Result<(), MemoryRemoteError> {
    self.enter("upsert")?;
    let mut rows = self.rows.lock().map_err(|_| Self::poisoned())?;
    rows.insert(record.date, RangedDay::from_record(record.clone()));
    Ok(())
  }

  async fn fetch_one(
    &self,
    date: NaiveDate,
  ) -> Result<Option<DayRecord>, MemoryRemoteError> {
    self.enter("fetch_one")?;
    let rows = self.rows.lock().map_err(|_| Self::poisoned())?;
    Ok(rows.get(&date).map(|d| d.record.clone()))
  }

  async fn fetch_all(&self) -> Result<Vec<DayRecord>, MemoryRemoteError> {
    self.enter("fetch_all")?;
    let rows = self.rows.lock().map_err(|_| Self::poisoned())?;
    Ok(rows.values().map(|d| d.record.clone()).collect())
  }

  async fn fetch_range(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<RangedDay>, MemoryRemoteError> {
    self.enter("fetch_range")?;
    let rows = self.rows.lock().map_err(|_| Self::poisoned())?;
    Ok(
      rows
        .values()
        .filter(|d| d.record.date >= start && d.record.date <= end)
        .cloned()
        .collect(),
    )
  }
}
