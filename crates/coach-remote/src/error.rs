//! Error type for `coach-remote`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("remote store is not configured")]
  NotConfigured,

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{op} → {status}: {body}")]
  Status {
    op:     &'static str,
    status: StatusCode,
    body:   String,
  },

  /// The response body was not a list of well-formed day rows.
  #[error("malformed row: {0}")]
  Decode(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
