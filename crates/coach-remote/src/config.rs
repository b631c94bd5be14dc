//! Connection settings for the remote store.

use serde::Deserialize;

/// Table used when none is configured.
pub const DEFAULT_TABLE: &str = "daily_logs";

/// Endpoint and access key of the hosted table.
///
/// Both must be present for the remote store to be used at all; without
/// them every read and write stays local.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
  /// Project base URL, e.g. `https://abc.supabase.co`.
  #[serde(default)]
  pub url:   Option<String>,
  /// Anonymous (or service) API key.
  #[serde(default)]
  pub key:   Option<String>,
  #[serde(default = "default_table")]
  pub table: String,
}

fn default_table() -> String { DEFAULT_TABLE.to_owned() }

impl Default for RemoteConfig {
  fn default() -> Self { Self { url: None, key: None, table: default_table() } }
}

impl RemoteConfig {
  pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
    Self {
      url: Some(url.into()),
      key: Some(key.into()),
      ..Self::default()
    }
  }

  /// `true` when both the URL and the key are present and non-blank.
  pub fn is_configured(&self) -> bool {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    present(&self.url) && present(&self.key)
  }
}
