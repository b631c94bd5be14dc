//! `coach` — command-line front end for the coaching dashboard.
//!
//! Days are always written to the local SQLite cache; when a remote URL and
//! key are configured they are also upserted to the hosted table.
//!
//! # Usage
//!
//! ```
//! coach add-preset sardines --qty 2
//! coach set --weight 190.2 --hrv 61
//! COACH_REMOTE_URL=https://abc.supabase.co COACH_REMOTE_KEY=... coach show
//! ```

mod commands;
mod config;
mod render;

use std::{io, path::PathBuf};

use anyhow::Context as _;
use clap::Parser;
use coach_core::Persistence;
use coach_remote::RestStore;
use coach_store_sqlite::SqliteCache;
use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

use commands::{Command, Dashboard};
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "coach", author, version, about = "Nutrition and biometrics log")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "coach.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so command output stays clean.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&cli.config)?;

  let cache = open_cache(&cfg).await?;
  let remote = RestStore::new(cfg.remote()).context("failed to build HTTP client")?;
  if !cfg.remote().is_configured() {
    tracing::info!("remote store not configured; running local-only");
  }

  let dashboard = Dashboard::new(Persistence::new(cache, remote), cfg.protocol.clone());
  let mut stdout = io::stdout().lock();
  dashboard.run(cli.command, &mut stdout).await
}

/// Open the cache file, falling back to an in-memory cache so a broken
/// cache never blocks a command.
async fn open_cache(cfg: &AppConfig) -> anyhow::Result<SqliteCache> {
  let path = cfg.cache_path();
  if let Some(parent) = path.parent()
    && let Err(e) = std::fs::create_dir_all(parent)
  {
    warn!(path = %parent.display(), error = %e, "cannot create cache directory");
  }

  match SqliteCache::open(&path, cfg.namespace.clone()).await {
    Ok(cache) => Ok(cache),
    Err(e) => {
      warn!(path = %path.display(), error = %e, "cache unavailable; using in-memory cache");
      SqliteCache::open_in_memory(cfg.namespace.clone())
        .await
        .context("failed to open in-memory cache")
    }
  }
}
