//! Async HTTP client for the remote day table.

use std::time::Duration;

use chrono::NaiveDate;
use coach_core::{DayRecord, store::{RangedDay, RemoteStore}};
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::{
  Error, Result,
  config::RemoteConfig,
  row::{DayRow, decode_rows},
};

/// The PostgREST implementation of [`RemoteStore`].
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RestStore {
  client: Client,
  config: RemoteConfig,
}

impl RestStore {
  pub fn new(config: RemoteConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &RemoteConfig { &self.config }

  fn table_url(&self) -> Result<String> {
    let base = self.config.url.as_deref().ok_or(Error::NotConfigured)?;
    Ok(format!(
      "{}/rest/v1/{}",
      base.trim().trim_end_matches('/'),
      self.config.table
    ))
  }

  /// Attach the API key headers. Fails when the store is not configured.
  fn request(&self, build: impl FnOnce(&Client, String) -> RequestBuilder) -> Result<RequestBuilder> {
    if !self.config.is_configured() {
      return Err(Error::NotConfigured);
    }
    let key = self.config.key.as_deref().unwrap_or_default().trim();
    Ok(
      build(&self.client, self.table_url()?)
        .header("apikey", key)
        .bearer_auth(key),
    )
  }

  async fn check(op: &'static str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Status { op, status, body })
  }

  /// `GET /rest/v1/<table>?select=*&<filters>`
  async fn select(
    &self,
    op: &'static str,
    filters: &[(&str, String)],
  ) -> Result<Vec<DayRow>> {
    let resp = self
      .request(|c, url| c.get(url))?
      .query(&[("select", "*")])
      .query(filters)
      .send()
      .await?;
    let body = Self::check(op, resp).await?.text().await?;
    let rows = decode_rows(&body)?;
    debug!(op, rows = rows.len(), "remote select");
    Ok(rows)
  }
}

// ─── RemoteStore impl ────────────────────────────────────────────────────────

impl RemoteStore for RestStore {
  type Error = Error;

  fn is_configured(&self) -> bool { self.config.is_configured() }

  /// `POST /rest/v1/<table>?on_conflict=date` with merge-duplicates.
  async fn upsert(&self, record: &DayRecord) -> Result<()> {
    let row = DayRow::from_record(record);
    let resp = self
      .request(|c, url| c.post(url))?
      .query(&[("on_conflict", "date")])
      .header("Prefer", "resolution=merge-duplicates,return=minimal")
      .json(&[row])
      .send()
      .await?;
    Self::check("upsert", resp).await?;
    debug!(date = %record.date, "remote upsert");
    Ok(())
  }

  async fn fetch_one(&self, date: NaiveDate) -> Result<Option<DayRecord>> {
    let rows = self
      .select("fetch_one", &[
        ("date", format!("eq.{date}")),
        ("limit", "1".to_owned()),
      ])
      .await?;
    Ok(rows.into_iter().next().map(DayRow::into_record))
  }

  async fn fetch_all(&self) -> Result<Vec<DayRecord>> {
    let rows = self
      .select("fetch_all", &[("order", "date.asc".to_owned())])
      .await?;
    Ok(rows.into_iter().map(DayRow::into_record).collect())
  }

  async fn fetch_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<RangedDay>> {
    let rows = self
      .select("fetch_range", &[
        ("date", format!("gte.{start}")),
        ("date", format!("lte.{end}")),
        ("order", "date.asc".to_owned()),
      ])
      .await?;
    Ok(rows.into_iter().map(DayRow::into_ranged).collect())
  }
}
