//! Day records — the unit of persistence, one per calendar date.
//!
//! The in-memory (and local-cache) JSON shape uses camel-case field names,
//! e.g. `sleepScore`, `xertBurn`. The checklist keeps its snake-case flag
//! names (`resistant_starch`) in both stores.

use std::{
  collections::{BTreeMap, BTreeSet},
  fmt,
  str::FromStr,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// All persisted days, keyed by calendar date.
pub type DayMap = BTreeMap<NaiveDate, DayRecord>;

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
    .map_err(|_| Error::InvalidDate(s.to_owned()))
}

// ─── Meals ───────────────────────────────────────────────────────────────────

/// One logged food item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
  pub name:     String,
  #[serde(default)]
  pub calories: f64,
  #[serde(default)]
  pub protein:  f64,
  #[serde(default)]
  pub fat:      f64,
  #[serde(default)]
  pub carbs:    f64,
  /// Category tags, e.g. `"sardines"`, `"fiber"`, `"protein"`.
  #[serde(default)]
  pub tags:     BTreeSet<String>,
  /// Human-readable clock string, e.g. `"07:45"`.
  #[serde(default)]
  pub time:     String,
}

impl MealEntry {
  /// A custom (untagged) meal.
  pub fn custom(
    name: impl Into<String>,
    calories: f64,
    protein: f64,
    fat: f64,
    carbs: f64,
    time: impl Into<String>,
  ) -> Self {
    Self {
      name: name.into(),
      calories,
      protein,
      fat,
      carbs,
      tags: BTreeSet::new(),
      time: time.into(),
    }
  }

  pub fn with_tags<I, T>(mut self, tags: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    self.tags.extend(tags.into_iter().map(Into::into));
    self
  }
}

/// Macro sums over a day's meals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MealTotals {
  pub calories: f64,
  pub protein:  f64,
  pub fat:      f64,
  pub carbs:    f64,
}

// ─── Checklist ───────────────────────────────────────────────────────────────

/// The four daily dietary-category flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecklistItem {
  Sardines,
  Fermented,
  Fiber,
  ResistantStarch,
}

impl ChecklistItem {
  pub const ALL: [ChecklistItem; 4] = [
    Self::Sardines,
    Self::Fermented,
    Self::Fiber,
    Self::ResistantStarch,
  ];

  /// The meal tag (and checklist key) that satisfies this item.
  pub fn tag(self) -> &'static str {
    match self {
      Self::Sardines => "sardines",
      Self::Fermented => "fermented",
      Self::Fiber => "fiber",
      Self::ResistantStarch => "resistant_starch",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Sardines => "Sardines",
      Self::Fermented => "Fermented",
      Self::Fiber => "Fiber",
      Self::ResistantStarch => "Resistant Starch",
    }
  }
}

impl fmt::Display for ChecklistItem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.tag())
  }
}

impl FromStr for ChecklistItem {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    Self::ALL
      .into_iter()
      .find(|item| item.tag() == normalized)
      .ok_or_else(|| Error::UnknownChecklistItem(s.to_owned()))
  }
}

/// Whether each dietary category was satisfied on a given day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
  #[serde(default)]
  pub sardines:         bool,
  #[serde(default)]
  pub fermented:        bool,
  #[serde(default)]
  pub fiber:            bool,
  #[serde(default)]
  pub resistant_starch: bool,
}

impl Checklist {
  pub fn get(&self, item: ChecklistItem) -> bool {
    match item {
      ChecklistItem::Sardines => self.sardines,
      ChecklistItem::Fermented => self.fermented,
      ChecklistItem::Fiber => self.fiber,
      ChecklistItem::ResistantStarch => self.resistant_starch,
    }
  }

  fn slot(&mut self, item: ChecklistItem) -> &mut bool {
    match item {
      ChecklistItem::Sardines => &mut self.sardines,
      ChecklistItem::Fermented => &mut self.fermented,
      ChecklistItem::Fiber => &mut self.fiber,
      ChecklistItem::ResistantStarch => &mut self.resistant_starch,
    }
  }

  /// Flip one flag by hand.
  pub fn toggle(&mut self, item: ChecklistItem) {
    let slot = self.slot(item);
    *slot = !*slot;
  }

  /// Turn on every flag whose tag appears in `tags`. Flags are never turned
  /// off here. Returns `true` if anything changed.
  pub fn absorb_tags<'a, I>(&mut self, tags: I) -> bool
  where
    I: IntoIterator<Item = &'a str>,
  {
    let tags: BTreeSet<&str> = tags.into_iter().collect();
    let mut changed = false;
    for item in ChecklistItem::ALL {
      let slot = self.slot(item);
      if !*slot && tags.contains(item.tag()) {
        *slot = true;
        changed = true;
      }
    }
    changed
  }

  pub fn satisfied(&self) -> usize {
    ChecklistItem::ALL.into_iter().filter(|i| self.get(*i)).count()
  }
}

// ─── DayRecord ───────────────────────────────────────────────────────────────

/// One calendar day's observations and meal log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
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
  /// Extra calories burned on top of the baseline.
  #[serde(default)]
  pub xert_burn:      f64,
  #[serde(default)]
  pub meals:          Vec<MealEntry>,
  #[serde(default)]
  pub checklist:      Checklist,
  /// Advisory only: nothing prevents edits to a locked day.
  #[serde(default)]
  pub locked:         bool,
  #[serde(default)]
  pub notes:          Option<String>,
}

impl DayRecord {
  pub fn empty(date: NaiveDate) -> Self {
    Self {
      date,
      weight: None,
      hrv: None,
      rhr: None,
      sleep_score: None,
      sleep_duration: None,
      xert_burn: 0.0,
      meals: Vec::new(),
      checklist: Checklist::default(),
      locked: false,
      notes: None,
    }
  }

  /// Append a meal and fold its tags into the checklist.
  pub fn add_meal(&mut self, meal: MealEntry) {
    self.meals.push(meal);
    self.derive_checklist();
  }

  /// Remove the meal at `index`.
  ///
  /// The checklist is left as it is: a flag earned by a removed meal stays
  /// set.
  pub fn remove_meal(&mut self, index: usize) -> Result<MealEntry> {
    if index >= self.meals.len() {
      return Err(Error::MealIndex { index, len: self.meals.len() });
    }
    Ok(self.meals.remove(index))
  }

  /// Set checklist flags from the tags of every logged meal. Returns `true`
  /// if any flag changed.
  pub fn derive_checklist(&mut self) -> bool {
    let tags = self
      .meals
      .iter()
      .flat_map(|m| m.tags.iter().map(String::as_str));
    self.checklist.absorb_tags(tags)
  }

  pub fn totals(&self) -> MealTotals {
    self.meals.iter().fold(MealTotals::default(), |acc, m| MealTotals {
      calories: acc.calories + m.calories,
      protein:  acc.protein + m.protein,
      fat:      acc.fat + m.fat,
      carbs:    acc.carbs + m.carbs,
    })
  }

  /// `true` if any biometric is present and non-zero.
  pub fn has_biometrics(&self) -> bool {
    [self.weight, self.hrv, self.rhr, self.sleep_score]
      .into_iter()
      .flatten()
      .any(|v| v != 0.0)
  }

  pub fn apply(&mut self, patch: DayPatch) {
    let DayPatch {
      weight,
      hrv,
      rhr,
      sleep_score,
      sleep_duration,
      xert_burn,
      locked,
      notes,
    } = patch;

    if weight.is_some() {
      self.weight = weight;
    }
    if hrv.is_some() {
      self.hrv = hrv;
    }
    if rhr.is_some() {
      self.rhr = rhr;
    }
    if sleep_score.is_some() {
      self.sleep_score = sleep_score;
    }
    if sleep_duration.is_some() {
      self.sleep_duration = sleep_duration;
    }
    if let Some(burn) = xert_burn {
      self.xert_burn = burn;
    }
    if let Some(locked) = locked {
      self.locked = locked;
    }
    if notes.is_some() {
      self.notes = notes;
    }
  }
}

// ─── DayPatch ────────────────────────────────────────────────────────────────

/// A partial update: every `Some` field overwrites the record's value,
/// every `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayPatch {
  pub weight:         Option<f64>,
  pub hrv:            Option<f64>,
  pub rhr:            Option<f64>,
  pub sleep_score:    Option<f64>,
  pub sleep_duration: Option<String>,
  pub xert_burn:      Option<f64>,
  pub locked:         Option<bool>,
  pub notes:          Option<String>,
}

impl DayPatch {
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}
