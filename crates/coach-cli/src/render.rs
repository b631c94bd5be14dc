//! Plain-text rendering of days, summaries, and trends.

use std::io::{self, Write};

use coach_core::{
  ChecklistItem, DayRecord,
  protocol::{DaySummary, PRESET_FOODS, Protocol, TrendPoint},
  store::RangedDay,
};

fn num(v: f64) -> String { format!("{v:.0}") }

fn opt(v: Option<f64>, decimals: usize) -> String {
  v.map(|v| format!("{v:.decimals$}"))
    .unwrap_or_else(|| "—".to_owned())
}

pub fn day(
  out: &mut impl Write,
  day: &DayRecord,
  summary: &DaySummary,
  protocol: &Protocol,
) -> io::Result<()> {
  let lock = if day.locked { "  [locked]" } else { "" };
  writeln!(out, "── {}{lock}", day.date)?;
  writeln!(
    out,
    "weight {} lb   hrv {}   rhr {}   sleep {} ({})",
    opt(day.weight, 1),
    opt(day.hrv, 0),
    opt(day.rhr, 0),
    opt(day.sleep_score, 0),
    day.sleep_duration.as_deref().unwrap_or("—"),
  )?;
  if let Some(to_goal) = summary.to_goal {
    writeln!(out, "{to_goal:.1} lb to goal ({} lb)", num(protocol.goal_weight))?;
  }

  writeln!(
    out,
    "calories {} / {} ({:.0}%), {} remaining",
    num(summary.totals.calories),
    num(summary.day_budget),
    summary.calories_pct,
    num(summary.calories_remaining),
  )?;
  writeln!(
    out,
    "protein  {}g / {}g ({:.0}%), {}g remaining",
    num(summary.totals.protein),
    num(protocol.protein_target),
    summary.protein_pct,
    num(summary.protein_remaining),
  )?;
  writeln!(
    out,
    "fat {}g   carbs {}g   deficit {} kcal{}",
    num(summary.totals.fat),
    num(summary.totals.carbs),
    num(summary.actual_deficit),
    if summary.on_target { " ✓" } else { "" },
  )?;
  if let Some(alert) = summary.alert {
    writeln!(out, "⚠ {}", alert.message())?;
  }

  let checks: Vec<String> = ChecklistItem::ALL
    .into_iter()
    .map(|item| {
      let mark = if day.checklist.get(item) { "✓" } else { "○" };
      format!("{mark} {}", item.label())
    })
    .collect();
  writeln!(out, "{}", checks.join("   "))?;

  if day.meals.is_empty() {
    writeln!(out, "no meals logged")?;
  } else {
    writeln!(out, "meals ({}):", day.meals.len())?;
    for (i, meal) in day.meals.iter().enumerate() {
      writeln!(
        out,
        "  {:>2}. {:<5} {:<28} {:>5} kcal {:>5}g P",
        i + 1,
        meal.time,
        meal.name,
        num(meal.calories),
        num(meal.protein),
      )?;
    }
  }
  if let Some(notes) = day.notes.as_deref().filter(|n| !n.is_empty()) {
    writeln!(out, "notes: {notes}")?;
  }
  Ok(())
}

pub fn presets(out: &mut impl Write) -> io::Result<()> {
  for p in PRESET_FOODS {
    writeln!(
      out,
      "{:<24} {:>4} kcal {:>5}g P  {}",
      p.name,
      num(p.calories),
      p.protein,
      p.tags.join(", "),
    )?;
  }
  Ok(())
}

pub fn history(out: &mut impl Write, days: &[RangedDay]) -> io::Result<()> {
  if days.is_empty() {
    return writeln!(out, "no days in range");
  }
  for d in days {
    writeln!(
      out,
      "{}  {:>6} lb  {:>5} kcal  {:>4}g P{}",
      d.record.date,
      opt(d.record.weight, 1),
      num(d.total_calories),
      num(d.total_protein),
      if d.record.locked { "  locked" } else { "" },
    )?;
  }
  Ok(())
}

pub fn trends(out: &mut impl Write, points: &[TrendPoint]) -> io::Result<()> {
  if points.len() < 2 {
    return writeln!(out, "log at least 2 days of biometrics to see trends");
  }
  writeln!(out, "date        weight   hrv   rhr  sleep  deficit")?;
  for p in points {
    writeln!(
      out,
      "{}  {:>6}  {:>4}  {:>4}  {:>5}  {:>7}",
      p.date,
      opt(p.weight, 1),
      opt(p.hrv, 0),
      opt(p.rhr, 0),
      opt(p.sleep, 0),
      opt(p.deficit, 0),
    )?;
  }
  Ok(())
}
