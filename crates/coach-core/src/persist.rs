//! [`Persistence`] — the single entry point for saving and loading days.
//!
//! Every save goes to the local cache first. The remote store is used only
//! while it reports itself configured, and any remote failure degrades to the
//! local cache instead of surfacing to the caller. There is no locking and no
//! retry inside a call: concurrent saves race, and the last one to complete
//! wins in each store.

use std::fmt;

use chrono::NaiveDate;
use tracing::{debug, error, warn};

use crate::{
  day::{DayMap, DayRecord},
  store::{LocalCache, RangedDay, RemoteStore},
};

// ─── Save outcome ────────────────────────────────────────────────────────────

/// Which store ultimately holds a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
  Local,
  Remote,
}

/// Result of [`Persistence::save_day`].
///
/// The local write always stands. `error` is set only when the remote store
/// was configured and rejected the write.
#[derive(Debug)]
pub struct SaveOutcome<E> {
  pub source: StoreKind,
  pub error:  Option<E>,
}

impl<E> SaveOutcome<E> {
  fn local() -> Self { Self { source: StoreKind::Local, error: None } }

  fn remote() -> Self { Self { source: StoreKind::Remote, error: None } }

  pub fn is_synced(&self) -> bool { self.source == StoreKind::Remote }

  /// Short status for display after a save.
  pub fn status(&self) -> &'static str {
    match self.source {
      StoreKind::Remote => "synced",
      StoreKind::Local => "saved locally",
    }
  }
}

impl<E: fmt::Display> fmt::Display for SaveOutcome<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.error {
      Some(e) => write!(f, "{} ({e})", self.status()),
      None => f.write_str(self.status()),
    }
  }
}

/// Result of [`Persistence::sync_pending`].
///
/// Dates in `failed` and `skipped` keep their pending marker.
#[derive(Debug)]
pub struct SyncReport<E> {
  pub synced:  Vec<NaiveDate>,
  pub failed:  Vec<(NaiveDate, E)>,
  /// Pending dates with no readable local record; nothing was sent.
  pub skipped: Vec<NaiveDate>,
}

impl<E> Default for SyncReport<E> {
  fn default() -> Self {
    Self { synced: Vec::new(), failed: Vec::new(), skipped: Vec::new() }
  }
}

impl<E> SyncReport<E> {
  pub fn is_clean(&self) -> bool { self.failed.is_empty() && self.skipped.is_empty() }
}

// ─── Facade ──────────────────────────────────────────────────────────────────

/// Cache-aside persistence over a [`LocalCache`] and a [`RemoteStore`].
pub struct Persistence<L, R> {
  local:  L,
  remote: R,
}

impl<L, R> Persistence<L, R>
where
  L: LocalCache,
  R: RemoteStore,
{
  pub fn new(local: L, remote: R) -> Self { Self { local, remote } }

  pub fn local(&self) -> &L { &self.local }

  pub fn remote(&self) -> &R { &self.remote }

  /// Write `record` through the local cache, then to the remote store if it
  /// is configured.
  ///
  /// A failed remote write is not retried here; the date is left pending for
  /// [`Self::sync_pending`].
  pub async fn save_day(&self, record: &DayRecord) -> SaveOutcome<R::Error> {
    self
      .local
      .save_merge(DayMap::from([(record.date, record.clone())]))
      .await;

    if !self.remote.is_configured() {
      debug!(date = %record.date, "remote not configured; saved locally");
      return SaveOutcome::local();
    }

    match self.remote.upsert(record).await {
      Ok(()) => {
        self.local.clear_pending(record.date).await;
        SaveOutcome::remote()
      }
      Err(e) => {
        error!(date = %record.date, error = %e, "remote save failed");
        self.local.mark_pending(record.date).await;
        SaveOutcome { source: StoreKind::Local, error: Some(e) }
      }
    }
  }

  /// Load one day. A remote error or a missing remote row falls back to the
  /// local cache.
  pub async fn load_day(&self, date: NaiveDate) -> Option<DayRecord> {
    if self.remote.is_configured() {
      match self.remote.fetch_one(date).await {
        Ok(Some(record)) => return Some(record),
        Ok(None) => debug!(%date, "no remote row; using local cache"),
        Err(e) => warn!(%date, error = %e, "remote load failed; using local cache"),
      }
    }
    self.local.load_all().await.remove(&date)
  }

  /// Load every day. Any remote error falls back to the full local cache.
  pub async fn load_all_days(&self) -> DayMap {
    if !self.remote.is_configured() {
      return self.local.load_all().await;
    }

    match self.remote.fetch_all().await {
      Ok(records) => records.into_iter().map(|r| (r.date, r)).collect(),
      Err(e) => {
        warn!(error = %e, "remote load failed; using local cache");
        self.local.load_all().await
      }
    }
  }

  /// Load the days in `[start, end]`, ascending.
  ///
  /// Unlike the other reads this does not fall back: a remote error yields an
  /// empty result.
  pub async fn load_day_range(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Vec<RangedDay> {
    if start > end {
      return Vec::new();
    }

    if !self.remote.is_configured() {
      return self
        .local
        .load_all()
        .await
        .into_values()
        .filter(|r| r.date >= start && r.date <= end)
        .map(RangedDay::from_record)
        .collect();
    }

    match self.remote.fetch_range(start, end).await {
      Ok(days) => days
        .into_iter()
        .filter(|d| d.record.date >= start && d.record.date <= end)
        .collect(),
      Err(e) => {
        warn!(%start, %end, error = %e, "remote range load failed");
        Vec::new()
      }
    }
  }

  /// Replay every pending date from the local cache to the remote store.
  pub async fn sync_pending(&self) -> SyncReport<R::Error> {
    let mut report = SyncReport::default();
    if !self.remote.is_configured() {
      return report;
    }

    let pending = self.local.pending().await;
    if pending.is_empty() {
      return report;
    }
    let mut days = self.local.load_all().await;

    for date in pending {
      // An unreadable cache also looks like a missing record, so the
      // marker stays until the day is actually upserted.
      let Some(record) = days.remove(&date) else {
        warn!(%date, "pending date has no local record; keeping marker");
        report.skipped.push(date);
        continue;
      };
      match self.remote.upsert(&record).await {
        Ok(()) => {
          self.local.clear_pending(date).await;
          report.synced.push(date);
        }
        Err(e) => {
          warn!(%date, error = %e, "replay of pending day failed");
          report.failed.push((date, e));
        }
      }
    }
    report
  }
}
