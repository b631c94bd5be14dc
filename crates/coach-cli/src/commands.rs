//! Subcommands and the [`Dashboard`] that executes them.

use std::io::Write;

use anyhow::{Context as _, Result, bail};
use chrono::{Local, NaiveDate};
use clap::Subcommand;
use coach_core::{
  ChecklistItem, DayPatch, DayRecord, MealEntry, Persistence, SaveOutcome,
  day::parse_date,
  protocol::{Protocol, find_preset},
  store::{LocalCache, RemoteStore},
};
use tracing::info;

use crate::render;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Show a day's summary, checklist, and meals.
  Show {
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
  },

  /// Log a custom meal.
  AddMeal {
    #[arg(long)]
    name:     String,
    #[arg(long)]
    calories: f64,
    #[arg(long, default_value_t = 0.0)]
    protein:  f64,
    #[arg(long, default_value_t = 0.0)]
    fat:      f64,
    #[arg(long, default_value_t = 0.0)]
    carbs:    f64,
    /// Category tag; repeatable (e.g. `--tag fiber --tag fermented`).
    #[arg(long = "tag")]
    tags:     Vec<String>,
    /// Clock time; defaults to now.
    #[arg(long)]
    time:     Option<String>,
    #[arg(long, value_parser = parse_date)]
    date:     Option<NaiveDate>,
  },

  /// Log one or more servings of a preset food.
  AddPreset {
    name: String,
    #[arg(long, default_value_t = 1)]
    qty:  u32,
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
  },

  /// List the preset foods.
  Presets,

  /// Remove a meal by its number in `show`.
  RemoveMeal {
    number: usize,
    #[arg(long, value_parser = parse_date)]
    date:   Option<NaiveDate>,
  },

  /// Record biometrics, extra burn, or notes.
  Set {
    #[arg(long)]
    weight:         Option<f64>,
    #[arg(long)]
    hrv:            Option<f64>,
    #[arg(long)]
    rhr:            Option<f64>,
    #[arg(long)]
    sleep_score:    Option<f64>,
    #[arg(long)]
    sleep_duration: Option<String>,
    #[arg(long)]
    xert_burn:      Option<f64>,
    #[arg(long)]
    notes:          Option<String>,
    #[arg(long, value_parser = parse_date)]
    date:           Option<NaiveDate>,
  },

  /// Toggle a checklist item by hand.
  Check {
    item: ChecklistItem,
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
  },

  /// Mark a day's summary as final.
  Lock {
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
  },

  /// List days in an inclusive date range.
  History {
    #[arg(long, value_parser = parse_date)]
    from: NaiveDate,
    #[arg(long, value_parser = parse_date)]
    to:   NaiveDate,
  },

  /// Biometric trends across every logged day.
  Trends,

  /// Push days whose remote save failed.
  Sync,
}

fn now_clock() -> String { Local::now().format("%H:%M").to_string() }

fn today() -> NaiveDate { Local::now().date_naive() }

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// The persistence facade plus the protocol it is measured against.
pub struct Dashboard<L, R> {
  store:    Persistence<L, R>,
  protocol: Protocol,
}

impl<L, R> Dashboard<L, R>
where
  L: LocalCache,
  R: RemoteStore,
{
  pub fn new(store: Persistence<L, R>, protocol: Protocol) -> Self {
    Self { store, protocol }
  }

  #[cfg(test)]
  pub fn store(&self) -> &Persistence<L, R> { &self.store }

  /// The stored day for `date`, or a fresh empty one.
  pub async fn open_day(&self, date: NaiveDate) -> DayRecord {
    self
      .store
      .load_day(date)
      .await
      .unwrap_or_else(|| DayRecord::empty(date))
  }

  /// Load, mutate, and save one day.
  pub async fn update<F>(
    &self,
    date: NaiveDate,
    mutate: F,
  ) -> Result<(DayRecord, SaveOutcome<R::Error>)>
  where
    F: FnOnce(&mut DayRecord) -> coach_core::Result<()>,
  {
    let mut day = self.open_day(date).await;
    mutate(&mut day)?;
    let outcome = self.store.save_day(&day).await;
    info!(%date, status = outcome.status(), "day saved");
    Ok((day, outcome))
  }

  async fn save_and_report(
    &self,
    out: &mut impl Write,
    date: NaiveDate,
    mutate: impl FnOnce(&mut DayRecord) -> coach_core::Result<()>,
  ) -> Result<()> {
    let (day, outcome) = self.update(date, mutate).await?;
    let summary = self.protocol.summarize(&day);
    render::day(out, &day, &summary, &self.protocol)?;
    writeln!(out, "{outcome}")?;
    Ok(())
  }

  pub async fn run(&self, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
      Command::Show { date } => {
        let day = self.open_day(date.unwrap_or_else(today)).await;
        let summary = self.protocol.summarize(&day);
        render::day(out, &day, &summary, &self.protocol)?;
        writeln!(
          out,
          "{} days to goal date {}",
          self.protocol.days_until_goal(today()),
          self.protocol.goal_date
        )?;
      }

      Command::AddMeal { name, calories, protein, fat, carbs, tags, time, date } => {
        if name.trim().is_empty() {
          bail!("meal name must not be empty");
        }
        let meal = MealEntry::custom(name, calories, protein, fat, carbs, time.unwrap_or_else(now_clock))
          .with_tags(tags);
        self
          .save_and_report(out, date.unwrap_or_else(today), |day| {
            day.add_meal(meal);
            Ok(())
          })
          .await?;
      }

      Command::AddPreset { name, qty, date } => {
        let preset = find_preset(&name)?;
        let meal = MealEntry::from_preset(preset, qty, now_clock());
        self
          .save_and_report(out, date.unwrap_or_else(today), |day| {
            day.add_meal(meal);
            Ok(())
          })
          .await?;
      }

      Command::Presets => render::presets(out)?,

      Command::RemoveMeal { number, date } => {
        let index = number.checked_sub(1).context("meal numbers start at 1")?;
        self
          .save_and_report(out, date.unwrap_or_else(today), |day| {
            day.remove_meal(index).map(drop)
          })
          .await?;
      }

      Command::Set {
        weight,
        hrv,
        rhr,
        sleep_score,
        sleep_duration,
        xert_burn,
        notes,
        date,
      } => {
        let patch = DayPatch {
          weight,
          hrv,
          rhr,
          sleep_score,
          sleep_duration,
          xert_burn,
          locked: None,
          notes,
        };
        if patch.is_empty() {
          bail!("nothing to set");
        }
        self
          .save_and_report(out, date.unwrap_or_else(today), |day| {
            day.apply(patch);
            Ok(())
          })
          .await?;
      }

      Command::Check { item, date } => {
        self
          .save_and_report(out, date.unwrap_or_else(today), |day| {
            day.checklist.toggle(item);
            Ok(())
          })
          .await?;
      }

      Command::Lock { date } => {
        self
          .save_and_report(out, date.unwrap_or_else(today), |day| {
            day.apply(DayPatch { locked: Some(true), ..DayPatch::default() });
            Ok(())
          })
          .await?;
      }

      Command::History { from, to } => {
        if from > to {
          bail!("--from {from} is after --to {to}");
        }
        let days = self.store.load_day_range(from, to).await;
        render::history(out, &days)?;
      }

      Command::Trends => {
        let days = self.store.load_all_days().await;
        render::trends(out, &self.protocol.trend(&days))?;
      }

      Command::Sync => {
        if !self.store.remote().is_configured() {
          writeln!(out, "remote store not configured; nothing to sync")?;
          return Ok(());
        }
        let report = self.store.sync_pending().await;
        for date in &report.synced {
          writeln!(out, "synced {date}")?;
        }
        for (date, err) in &report.failed {
          writeln!(out, "failed {date}: {err}")?;
        }
        for date in &report.skipped {
          writeln!(out, "skipped {date}: no local copy, still pending")?;
        }
        if report.synced.is_empty() && report.is_clean() {
          writeln!(out, "nothing pending")?;
        }
      }
    }
    Ok(())
  }
}
