//! Error types for `coach-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid date {0:?}: expected YYYY-MM-DD")]
  InvalidDate(String),

  #[error("meal index {index} out of range (day has {len} meals)")]
  MealIndex { index: usize, len: usize },

  #[error("unknown checklist item: {0:?}")]
  UnknownChecklistItem(String),

  #[error("unknown preset food: {0:?}")]
  UnknownPreset(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
