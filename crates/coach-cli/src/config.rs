//! Application configuration, layered from an optional TOML file and
//! `COACH_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use coach_core::protocol::Protocol;
use coach_remote::{RemoteConfig, config::DEFAULT_TABLE};
use coach_store_sqlite::DEFAULT_NAMESPACE;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// SQLite file holding the local cache. A leading `~/` is expanded.
  #[serde(default = "default_cache_path")]
  pub cache_path: PathBuf,
  #[serde(default = "default_namespace")]
  pub namespace:  String,
  #[serde(default)]
  pub remote_url: Option<String>,
  #[serde(default)]
  pub remote_key: Option<String>,
  #[serde(default = "default_table")]
  pub table:      String,
  #[serde(default)]
  pub protocol:   Protocol,
}

fn default_cache_path() -> PathBuf { PathBuf::from("~/.local/share/coach/cache.db") }

fn default_namespace() -> String { DEFAULT_NAMESPACE.to_owned() }

fn default_table() -> String { DEFAULT_TABLE.to_owned() }

impl AppConfig {
  /// Read `path` (if it exists) and overlay the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("COACH"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")
  }

  pub fn remote(&self) -> RemoteConfig {
    RemoteConfig {
      url:   self.remote_url.clone(),
      key:   self.remote_key.clone(),
      table: self.table.clone(),
    }
  }

  pub fn cache_path(&self) -> PathBuf { expand_tilde(&self.cache_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let cfg = AppConfig::load(Path::new("/nonexistent/coach.toml")).unwrap();
    assert_eq!(cfg.namespace, DEFAULT_NAMESPACE);
    assert_eq!(cfg.table, DEFAULT_TABLE);
    assert_eq!(cfg.protocol, Protocol::default());
  }

  #[test]
  fn remote_needs_both_values() {
    let mut cfg = AppConfig::load(Path::new("/nonexistent/coach.toml")).unwrap();
    cfg.remote_url = Some("https://x.supabase.co".into());
    cfg.remote_key = None;
    assert!(!cfg.remote().is_configured());
    cfg.remote_key = Some("anon".into());
    assert!(cfg.remote().is_configured());
  }

  #[test]
  fn tilde_is_expanded() {
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/x/cache.db")),
        PathBuf::from(home).join("x/cache.db")
      );
    }
    assert_eq!(expand_tilde(Path::new("/abs/cache.db")), PathBuf::from("/abs/cache.db"));
  }
}
