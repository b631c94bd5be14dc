//! The row shape of the remote `daily_logs` table.
//!
//! Columns are the snake-case renames of the [`DayRecord`] fields, plus two
//! aggregates computed at write time. `meals` and `checklist` are JSON
//! columns stored verbatim.

use chrono::NaiveDate;
use coach_core::{Checklist, DayRecord, MealEntry, store::RangedDay};
use serde::{Deserialize, Serialize};

use crate::Result;

/// One row of the remote table.
///
/// Absent or null nested columns decode to their defaults (no meals, an
/// all-false checklist, zero extra burn, unlocked). A column of the wrong
/// type fails the decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRow {
  pub date:           NaiveDate,
  #[serde(default)]
  pub weight:         Option<f64>,
  #[serde(default)]
  pub hrv:            Option<f64>,
  #[serde(default)]
  pub rhr:            Option<f64>,
  #[serde(default)]
  pub sleep_score:    Option<f64>,
  #[serde(default)]
  pub sleep_duration: Option<String>,
  #[serde(default)]
  pub xert_burn:      Option<f64>,
  #[serde(default)]
  pub meals:          Option<Vec<MealEntry>>,
  #[serde(default)]
  pub checklist:      Option<Checklist>,
  #[serde(default)]
  pub locked:         Option<bool>,
  #[serde(default)]
  pub notes:          Option<String>,
  #[serde(default)]
  pub total_calories: Option<f64>,
  #[serde(default)]
  pub total_protein:  Option<f64>,
}

impl DayRow {
  /// Build the row for an upsert, computing both aggregates from `record`'s
  /// meals.
  pub fn from_record(record: &DayRecord) -> Self {
    let totals = record.totals();
    Self {
      date:           record.date,
      weight:         record.weight,
      hrv:            record.hrv,
      rhr:            record.rhr,
      sleep_score:    record.sleep_score,
      sleep_duration: record.sleep_duration.clone(),
      xert_burn:      Some(record.xert_burn),
      meals:          Some(record.meals.clone()),
      checklist:      Some(record.checklist),
      locked:         Some(record.locked),
      notes:          record.notes.clone(),
      total_calories: Some(totals.calories),
      total_protein:  Some(totals.protein),
    }
  }

  pub fn into_record(self) -> DayRecord {
    DayRecord {
      date:           self.date,
      weight:         self.weight,
      hrv:            self.hrv,
      rhr:            self.rhr,
      sleep_score:    self.sleep_score,
      sleep_duration: self.sleep_duration,
      xert_burn:      self.xert_burn.unwrap_or(0.0),
      meals:          self.meals.unwrap_or_default(),
      checklist:      self.checklist.unwrap_or_default(),
      locked:         self.locked.unwrap_or(false),
      notes:          self.notes,
    }
  }

  /// Like [`Self::into_record`], keeping the stored aggregates. Rows written
  /// before the aggregate columns existed get them recomputed.
  pub fn into_ranged(self) -> RangedDay {
    let (calories, protein) = (self.total_calories, self.total_protein);
    let mut ranged = RangedDay::from_record(self.into_record());
    if let Some(c) = calories {
      ranged.total_calories = c;
    }
    if let Some(p) = protein {
      ranged.total_protein = p;
    }
    ranged
  }
}

/// Decode a PostgREST response body (a JSON array of rows).
pub fn decode_rows(body: &str) -> Result<Vec<DayRow>> { Ok(serde_json::from_str(body)?) }
