//! [`SqliteCache`] — the SQLite implementation of [`LocalCache`].

use std::{path::Path, time::Duration};

use chrono::NaiveDate;
use coach_core::{DayMap, store::LocalCache};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::{debug, warn};

use crate::{
  Result,
  encode::{decode_date, decode_days, encode_date, encode_days, now},
  schema::SCHEMA,
};

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "coaching_dashboard_v1";

/// How long a writer waits for another handle's lock on the same file.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// The local day cache backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteCache {
  conn:      tokio_rusqlite::Connection,
  namespace: String,
}

impl SqliteCache {
  /// Open (or create) a cache at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, namespace: impl Into<String>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let cache = Self { conn, namespace: namespace.into() };
    cache.init_schema().await?;
    Ok(cache)
  }

  /// Open an in-memory cache — useful for testing, and as a last resort when
  /// the cache file cannot be opened.
  pub async fn open_in_memory(namespace: impl Into<String>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let cache = Self { conn, namespace: namespace.into() };
    cache.init_schema().await?;
    Ok(cache)
  }

  pub fn namespace(&self) -> &str { &self.namespace }

  /// A handle on the same database under a different namespace.
  pub fn with_namespace(&self, namespace: impl Into<String>) -> Self {
    Self { conn: self.conn.clone(), namespace: namespace.into() }
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub(crate) async fn read_raw(&self) -> Result<Option<String>> {
    let namespace = self.namespace.clone();
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM cache_entries WHERE namespace = ?1",
              rusqlite::params![namespace],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }

  /// Overwrite the stored blob verbatim.
  #[cfg(test)]
  pub(crate) async fn write_raw(&self, value: String) -> Result<()> {
    let namespace = self.namespace.clone();
    let at = now();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO cache_entries (namespace, value, updated_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (namespace) DO UPDATE
             SET value = excluded.value, updated_at = excluded.updated_at",
          rusqlite::params![namespace, value, at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Every cached day. Fails if the stored blob is not a valid day map.
  pub async fn read_all(&self) -> Result<DayMap> {
    match self.read_raw().await? {
      Some(raw) => decode_days(&raw),
      None => Ok(DayMap::new()),
    }
  }

  /// Merge `days` into the cache, last write wins per date.
  ///
  /// The write lock is taken before the blob is read, so writers on other
  /// handles to the same file cannot interleave and drop each other's dates.
  /// A stored blob that cannot be decoded is discarded and replaced by
  /// `days`.
  pub async fn merge(&self, days: DayMap) -> Result<()> {
    let namespace = self.namespace.clone();
    let at = now();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<String> = tx
          .query_row(
            "SELECT value FROM cache_entries WHERE namespace = ?1",
            rusqlite::params![namespace],
            |row| row.get(0),
          )
          .optional()?;

        let mut merged = match existing.as_deref().map(decode_days).transpose() {
          Ok(map) => map.unwrap_or_default(),
          Err(e) => {
            warn!(%namespace, error = %e, "discarding unreadable cache blob");
            DayMap::new()
          }
        };
        merged.extend(days);

        let value = encode_days(&merged)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

        tx.execute(
          "INSERT INTO cache_entries (namespace, value, updated_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (namespace) DO UPDATE
             SET value = excluded.value, updated_at = excluded.updated_at",
          rusqlite::params![namespace, value, at],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Pending dates for this namespace, ascending.
  pub async fn pending_dates(&self) -> Result<Vec<NaiveDate>> {
    let namespace = self.namespace.clone();
    let raws: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT date FROM pending_sync WHERE namespace = ?1 ORDER BY date ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![namespace], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.iter().map(|s| decode_date(s)).collect()
  }

  /// Set or clear the pending marker for `date`.
  pub async fn set_pending(&self, date: NaiveDate, pending: bool) -> Result<()> {
    let namespace = self.namespace.clone();
    let date_str = encode_date(date);
    let at = now();

    self
      .conn
      .call(move |conn| {
        if pending {
          conn.execute(
            "INSERT OR IGNORE INTO pending_sync (namespace, date, marked_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![namespace, date_str, at],
          )?;
        } else {
          conn.execute(
            "DELETE FROM pending_sync WHERE namespace = ?1 AND date = ?2",
            rusqlite::params![namespace, date_str],
          )?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── LocalCache impl ─────────────────────────────────────────────────────────

// Failures are logged and absorbed: a broken cache reads as empty and
// ignores writes.
impl LocalCache for SqliteCache {
  async fn load_all(&self) -> DayMap {
    match self.read_all().await {
      Ok(days) => {
        debug!(namespace = %self.namespace, days = days.len(), "loaded local cache");
        days
      }
      Err(e) => {
        warn!(namespace = %self.namespace, error = %e, "local cache unreadable; treating as empty");
        DayMap::new()
      }
    }
  }

  async fn save_merge(&self, days: DayMap) {
    let count = days.len();
    if let Err(e) = self.merge(days).await {
      warn!(namespace = %self.namespace, error = %e, "local cache write dropped");
    } else {
      debug!(namespace = %self.namespace, days = count, "merged into local cache");
    }
  }

  async fn mark_pending(&self, date: NaiveDate) {
    if let Err(e) = self.set_pending(date, true).await {
      warn!(%date, error = %e, "could not mark day as pending");
    }
  }

  async fn clear_pending(&self, date: NaiveDate) {
    if let Err(e) = self.set_pending(date, false).await {
      warn!(%date, error = %e, "could not clear pending marker");
    }
  }

  async fn pending(&self) -> Vec<NaiveDate> {
    self.pending_dates().await.unwrap_or_else(|e| {
      warn!(error = %e, "pending markers unreadable");
      Vec::new()
    })
  }
}
