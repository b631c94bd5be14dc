//! The fat-loss protocol: calorie and protein budgets, deficit alerts, trend
//! points, and the preset food catalogue.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  day::{DayMap, DayRecord, MealEntry, MealTotals},
};

/// Deficit above which the day is flagged as running hot.
pub const DEFICIT_HOT: f64 = 750.0;
/// Deficit below which the day is flagged as too shallow.
pub const DEFICIT_SHALLOW: f64 = 300.0;
/// The band a deficit should land in.
pub const DEFICIT_ON_TARGET: (f64, f64) = (400.0, 600.0);

// ─── Protocol ────────────────────────────────────────────────────────────────

/// Fixed targets of the protocol. Every field can be overridden from config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Protocol {
  /// Daily burn on a rest day, kcal.
  pub baseline_burn:  f64,
  pub target_deficit: f64,
  /// Grams of protein per day.
  pub protein_target: f64,
  pub goal_weight:    f64,
  pub goal_date:      NaiveDate,
}

impl Default for Protocol {
  fn default() -> Self {
    Self {
      baseline_burn:  2180.0,
      target_deficit: 500.0,
      protein_target: 160.0,
      goal_weight:    183.0,
      goal_date:      NaiveDate::from_ymd_opt(2026, 4, 1).unwrap_or_default(),
    }
  }
}

/// Why a day's deficit needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeficitAlert {
  RunningHot,
  TooShallow,
}

impl DeficitAlert {
  pub fn message(self) -> &'static str {
    match self {
      Self::RunningHot => "Deficit running hot, consider adding calories",
      Self::TooShallow => "Deficit too shallow, watch portions",
    }
  }
}

/// Everything derived from one day against the protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
  pub date:               NaiveDate,
  pub totals:             MealTotals,
  pub day_budget:         f64,
  pub calories_remaining: f64,
  pub protein_remaining:  f64,
  /// Percent of `day_budget` eaten.
  pub calories_pct:       f64,
  /// Percent of the protein target eaten.
  pub protein_pct:        f64,
  pub total_burn:         f64,
  pub actual_deficit:     f64,
  /// `weight - goal_weight`, when a weight was logged.
  pub to_goal:            Option<f64>,
  pub alert:              Option<DeficitAlert>,
  pub on_target:          bool,
}

/// One point on the trend charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
  pub date:    NaiveDate,
  pub weight:  Option<f64>,
  pub hrv:     Option<f64>,
  pub rhr:     Option<f64>,
  pub sleep:   Option<f64>,
  /// Only known once the day is locked.
  pub deficit: Option<f64>,
}

impl Protocol {
  pub fn rest_day_budget(&self) -> f64 { self.baseline_burn - self.target_deficit }

  /// Calories available on `day`, counting its extra burn.
  pub fn day_budget(&self, day: &DayRecord) -> f64 {
    self.rest_day_budget() + day.xert_burn
  }

  pub fn total_burn(&self, day: &DayRecord) -> f64 {
    self.baseline_burn + day.xert_burn
  }

  pub fn summarize(&self, day: &DayRecord) -> DaySummary {
    let totals = day.totals();
    let day_budget = self.day_budget(day);
    let total_burn = self.total_burn(day);
    let actual_deficit = total_burn - totals.calories;

    let alert = if totals.calories == 0.0 {
      None
    } else if actual_deficit > DEFICIT_HOT {
      Some(DeficitAlert::RunningHot)
    } else if actual_deficit < DEFICIT_SHALLOW {
      Some(DeficitAlert::TooShallow)
    } else {
      None
    };

    DaySummary {
      date: day.date,
      totals,
      day_budget,
      calories_remaining: day_budget - totals.calories,
      protein_remaining: self.protein_target - totals.protein,
      calories_pct: percent(totals.calories, day_budget),
      protein_pct: percent(totals.protein, self.protein_target),
      total_burn,
      actual_deficit,
      to_goal: day.weight.map(|w| w - self.goal_weight),
      alert,
      on_target: actual_deficit >= DEFICIT_ON_TARGET.0
        && actual_deficit <= DEFICIT_ON_TARGET.1,
    }
  }

  /// Days with any biometric logged, ascending by date.
  pub fn trend(&self, days: &DayMap) -> Vec<TrendPoint> {
    days
      .values()
      .filter(|d| d.has_biometrics())
      .map(|d| TrendPoint {
        date:    d.date,
        weight:  d.weight,
        hrv:     d.hrv,
        rhr:     d.rhr,
        sleep:   d.sleep_score,
        deficit: d
          .locked
          .then(|| self.total_burn(d) - d.totals().calories),
      })
      .collect()
  }

  /// Whole days from `today` to the goal date; zero once it has passed.
  pub fn days_until_goal(&self, today: NaiveDate) -> i64 {
    (self.goal_date - today).num_days().max(0)
  }
}

fn percent(part: f64, whole: f64) -> f64 {
  if whole == 0.0 { 0.0 } else { part / whole * 100.0 }
}

// ─── Preset foods ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetFood {
  pub name:     &'static str,
  pub calories: f64,
  pub protein:  f64,
  pub fat:      f64,
  pub carbs:    f64,
  pub tags:     &'static [&'static str],
}

macro_rules! preset {
  ($name:literal, $cal:expr, $pro:expr, $fat:expr, $carbs:expr, [$($tag:literal),*]) => {
    PresetFood {
      name:     $name,
      calories: $cal,
      protein:  $pro,
      fat:      $fat,
      carbs:    $carbs,
      tags:     &[$($tag),*],
    }
  };
}

pub const PRESET_FOODS: &[PresetFood] = &[
  preset!("Coffee w/ cream", 50.0, 0.5, 5.0, 0.0, []),
  preset!("Rice cake block", 135.0, 2.0, 1.75, 27.5, ["carb"]),
  preset!("Sardines (1 can)", 200.0, 23.0, 11.0, 0.0, ["sardines", "protein"]),
  preset!("Mackerel (1 can)", 200.0, 22.0, 12.0, 0.0, ["sardines", "protein"]),
  preset!("Greek yogurt (170g)", 100.0, 17.0, 0.7, 6.0, ["protein", "fermented"]),
  preset!("Kimchi (100g)", 15.0, 1.0, 0.5, 2.0, ["fermented", "fiber"]),
  preset!("Sauerkraut (100g)", 19.0, 1.0, 0.1, 4.0, ["fermented", "fiber"]),
  preset!("Oats (50g dry)", 190.0, 7.0, 3.5, 34.0, ["fiber", "resistant_starch"]),
  preset!(
    "Lentils (100g cooked)",
    116.0,
    9.0,
    0.4,
    20.0,
    ["fiber", "resistant_starch", "protein"]
  ),
  preset!("Banana", 105.0, 1.3, 0.4, 27.0, ["fiber"]),
  preset!("Chicken breast (150g)", 230.0, 43.0, 5.0, 0.0, ["protein"]),
  preset!("Eggs (2 large)", 140.0, 12.0, 10.0, 1.0, ["protein"]),
  preset!("Whey protein scoop", 120.0, 24.0, 1.0, 3.0, ["protein"]),
  preset!("Cold rice (150g)", 180.0, 3.0, 0.3, 40.0, ["resistant_starch", "carb"]),
  preset!("Sugar solution (100g)", 400.0, 0.0, 0.0, 100.0, ["carb"]),
];

/// Look up a preset by name: an exact (case-insensitive) match wins,
/// otherwise the query must be a substring of exactly one preset name.
pub fn find_preset(query: &str) -> Result<&'static PresetFood> {
  let needle = query.trim().to_lowercase();
  if let Some(p) = PRESET_FOODS.iter().find(|p| p.name.to_lowercase() == needle) {
    return Ok(p);
  }

  let mut hits = PRESET_FOODS
    .iter()
    .filter(|p| p.name.to_lowercase().contains(&needle));
  match (hits.next(), hits.next()) {
    (Some(p), None) if !needle.is_empty() => Ok(p),
    _ => Err(Error::UnknownPreset(query.to_owned())),
  }
}

impl MealEntry {
  /// `qty` servings of `preset`. Macros scale with `qty`; the name gains a
  /// `×qty` suffix when more than one serving is logged.
  pub fn from_preset(preset: &PresetFood, qty: u32, time: impl Into<String>) -> Self {
    let qty = qty.max(1);
    let scale = f64::from(qty);
    let name = if qty > 1 {
      format!("{} ×{qty}", preset.name)
    } else {
      preset.name.to_owned()
    };
    MealEntry::custom(
      name,
      preset.calories * scale,
      preset.protein * scale,
      preset.fat * scale,
      preset.carbs * scale,
      time,
    )
    .with_tags(preset.tags.iter().copied())
  }
}
