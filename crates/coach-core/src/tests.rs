//! Tests for the day model, the protocol arithmetic, and the persistence
//! facade against the in-memory stores.

use chrono::NaiveDate;

use crate::{
  Checklist, ChecklistItem, DayMap, DayPatch, DayRecord, MealEntry, Persistence,
  StoreKind,
  day::parse_date,
  memory::{MemoryCache, MemoryRemote},
  protocol::{DeficitAlert, Protocol, find_preset},
  store::{LocalCache, RemoteStore},
};

fn date(s: &str) -> NaiveDate { parse_date(s).unwrap() }

fn sardines() -> MealEntry {
  MealEntry::custom("Sardines (1 can)", 200.0, 23.0, 11.0, 0.0, "08:00")
    .with_tags(["sardines", "protein"])
}

fn sample_day(d: &str) -> DayRecord {
  let mut day = DayRecord::empty(date(d));
  day.weight = Some(190.2);
  day.hrv = Some(61.0);
  day.sleep_duration = Some("7h 20m".into());
  day.notes = Some("felt fine".into());
  day.add_meal(sardines());
  day
}

fn local_only() -> Persistence<MemoryCache, MemoryRemote> {
  Persistence::new(MemoryCache::new(), MemoryRemote::unconfigured())
}

// ─── Day model ───────────────────────────────────────────────────────────────

#[test]
fn parse_date_rejects_garbage() {
  assert!(parse_date("2025-06-01").is_ok());
  assert!(parse_date("2025-13-01").is_err());
  assert!(parse_date("yesterday").is_err());
}

#[test]
fn local_json_shape_is_camel_case() {
  let day = sample_day("2025-06-01");
  let json = serde_json::to_value(&day).unwrap();
  assert_eq!(json["date"], "2025-06-01");
  assert_eq!(json["sleepDuration"], "7h 20m");
  assert_eq!(json["xertBurn"], 0.0);
  assert!(json["sleepScore"].is_null());
  assert_eq!(json["checklist"]["resistant_starch"], false);
  assert_eq!(json["checklist"]["sardines"], true);
}

#[test]
fn missing_nested_fields_fill_defaults() {
  let day: DayRecord =
    serde_json::from_str(r#"{"date":"2025-06-02","weight":188.0}"#).unwrap();
  assert_eq!(day.weight, Some(188.0));
  assert!(day.meals.is_empty());
  assert_eq!(day.checklist, Checklist::default());
  assert_eq!(day.xert_burn, 0.0);
  assert!(!day.locked);
}

#[test]
fn adding_tagged_meals_sets_checklist() {
  let mut day = DayRecord::empty(date("2025-06-01"));
  day.add_meal(MealEntry::custom("Kimchi", 15.0, 1.0, 0.5, 2.0, "12:00").with_tags([
    "fermented",
    "fiber",
  ]));
  assert!(day.checklist.fermented);
  assert!(day.checklist.fiber);
  assert!(!day.checklist.sardines);
  assert!(!day.checklist.resistant_starch);
}

#[test]
fn removing_a_meal_keeps_checklist_flags() {
  let mut day = DayRecord::empty(date("2025-06-01"));
  day.add_meal(sardines());
  let removed = day.remove_meal(0).unwrap();
  assert_eq!(removed.name, "Sardines (1 can)");
  assert!(day.meals.is_empty());
  assert!(day.checklist.sardines);
}

#[test]
fn remove_meal_out_of_range_is_an_error() {
  let mut day = sample_day("2025-06-01");
  assert!(day.remove_meal(5).is_err());
  assert_eq!(day.meals.len(), 1);
}

#[test]
fn derive_checklist_only_reports_new_flags() {
  let mut day = sample_day("2025-06-01");
  assert!(!day.derive_checklist());
  day.meals.push(MealEntry::custom("Oats", 190.0, 7.0, 3.5, 34.0, "").with_tags([
    "fiber",
    "resistant_starch",
  ]));
  assert!(day.derive_checklist());
  assert_eq!(day.checklist.satisfied(), 3);
}

#[test]
fn toggle_and_parse_checklist_items() {
  let mut cl = Checklist::default();
  let item: ChecklistItem = "resistant-starch".parse().unwrap();
  cl.toggle(item);
  assert!(cl.resistant_starch);
  cl.toggle(item);
  assert!(!cl.resistant_starch);
  assert!("caffeine".parse::<ChecklistItem>().is_err());
}

#[test]
fn patch_only_touches_given_fields() {
  let mut day = sample_day("2025-06-01");
  day.apply(DayPatch {
    rhr: Some(52.0),
    xert_burn: Some(350.0),
    ..DayPatch::default()
  });
  assert_eq!(day.rhr, Some(52.0));
  assert_eq!(day.xert_burn, 350.0);
  assert_eq!(day.weight, Some(190.2));
  assert_eq!(day.notes.as_deref(), Some("felt fine"));
  assert!(DayPatch::default().is_empty());
}

#[test]
fn totals_sum_every_macro() {
  let mut day = sample_day("2025-06-01");
  day.add_meal(MealEntry::custom("Banana", 105.0, 1.5, 0.5, 27.0, ""));
  let totals = day.totals();
  assert_eq!(totals.calories, 305.0);
  assert_eq!(totals.protein, 24.5);
  assert_eq!(totals.fat, 11.5);
  assert_eq!(totals.carbs, 27.0);
}

// ─── Protocol ────────────────────────────────────────────────────────────────

#[test]
fn summary_budget_counts_extra_burn() {
  let protocol = Protocol::default();
  let mut day = sample_day("2025-06-01");
  day.xert_burn = 300.0;

  let s = protocol.summarize(&day);
  assert_eq!(s.day_budget, 1680.0 + 300.0);
  assert_eq!(s.calories_remaining, 1980.0 - 200.0);
  assert_eq!(s.protein_remaining, 160.0 - 23.0);
  assert_eq!(s.total_burn, 2480.0);
  assert_eq!(s.actual_deficit, 2280.0);
  assert_eq!(s.alert, Some(DeficitAlert::RunningHot));
  assert!((s.to_goal.unwrap() - 7.2).abs() < 1e-9);
}

#[test]
fn summary_alerts_follow_deficit_band() {
  let protocol = Protocol::default();
  let mut day = DayRecord::empty(date("2025-06-01"));
  assert_eq!(protocol.summarize(&day).alert, None);

  day.add_meal(MealEntry::custom("big", 2000.0, 0.0, 0.0, 0.0, ""));
  assert_eq!(protocol.summarize(&day).alert, Some(DeficitAlert::TooShallow));

  day.meals[0].calories = 1700.0;
  let s = protocol.summarize(&day);
  assert_eq!(s.alert, None);
  assert!(s.on_target);
}

#[test]
fn trend_skips_empty_days_and_hides_unlocked_deficit() {
  let protocol = Protocol::default();
  let mut days = DayMap::new();
  let mut locked = sample_day("2025-06-02");
  locked.locked = true;
  days.insert(locked.date, locked);
  days.insert(date("2025-06-01"), sample_day("2025-06-01"));
  days.insert(date("2025-06-03"), DayRecord::empty(date("2025-06-03")));

  let points = protocol.trend(&days);
  assert_eq!(points.len(), 2);
  assert_eq!(points[0].date, date("2025-06-01"));
  assert_eq!(points[0].deficit, None);
  assert_eq!(points[1].deficit, Some(2180.0 - 200.0));
}

#[test]
fn days_until_goal_never_negative() {
  let protocol = Protocol::default();
  assert_eq!(protocol.days_until_goal(date("2026-03-30")), 2);
  assert_eq!(protocol.days_until_goal(date("2027-01-01")), 0);
}

#[test]
fn preset_scaling_and_lookup() {
  let preset = find_preset("kimchi").unwrap();
  let meal = MealEntry::from_preset(preset, 2, "09:15");
  assert_eq!(meal.name, "Kimchi (100g) ×2");
  assert_eq!(meal.calories, 30.0);
  assert!(meal.tags.contains("fermented"));

  let single = MealEntry::from_preset(preset, 1, "09:15");
  assert_eq!(single.name, "Kimchi (100g)");

  // "can" matches both sardines and mackerel.
  assert!(find_preset("can").is_err());
  assert!(find_preset("").is_err());
}

// ─── Facade: local only ──────────────────────────────────────────────────────

#[tokio::test]
async fn save_then_load_round_trips_locally() {
  let p = local_only();
  let day = sample_day("2025-06-01");

  let outcome = p.save_day(&day).await;
  assert_eq!(outcome.source, StoreKind::Local);
  assert!(outcome.error.is_none());
  assert_eq!(outcome.status(), "saved locally");

  let loaded = p.load_day(day.date).await.unwrap();
  assert_eq!(loaded, day);
  assert_eq!(loaded.weight, Some(190.2));
  assert_eq!(loaded.meals[0].calories, 200.0);
}

#[tokio::test]
async fn load_all_on_empty_cache_is_empty() {
  let p = local_only();
  assert!(p.load_all_days().await.is_empty());
  assert!(p.load_day(date("2025-06-01")).await.is_none());
}

#[tokio::test]
async fn unconfigured_remote_is_never_called() {
  let p = local_only();
  p.save_day(&sample_day("2025-06-01")).await;
  p.load_all_days().await;
  p.load_day_range(date("2025-06-01"), date("2025-06-30")).await;
  assert_eq!(p.remote().calls(), 0);
  assert!(p.local().pending().await.is_empty());
}

#[tokio::test]
async fn saving_twice_matches_saving_once() {
  let once = local_only();
  let twice = local_only();
  let day = sample_day("2025-06-01");

  once.save_day(&day).await;
  twice.save_day(&day).await;
  twice.save_day(&day).await;

  assert_eq!(once.local().snapshot(), twice.local().snapshot());
}

#[tokio::test]
async fn local_range_is_inclusive_and_bounded() {
  let p = local_only();
  for d in ["2025-05-31", "2025-06-01", "2025-06-02", "2025-06-03", "2025-06-04"] {
    p.save_day(&sample_day(d)).await;
  }

  let start = date("2025-06-01");
  let end = date("2025-06-03");
  let range = p.load_day_range(start, end).await;
  assert_eq!(range.len(), 3);
  assert!(range.iter().all(|d| d.record.date >= start && d.record.date <= end));
  assert_eq!(range[0].record.date, start);
  assert_eq!(range[2].record.date, end);
  assert_eq!(range[0].total_calories, 200.0);
  assert_eq!(range[0].total_protein, 23.0);

  assert!(p.load_day_range(end, start).await.is_empty());
}

// ─── Facade: remote configured ───────────────────────────────────────────────

#[tokio::test]
async fn healthy_remote_save_reports_synced_and_writes_both() {
  let p = Persistence::new(MemoryCache::new(), MemoryRemote::new());
  let day = sample_day("2025-06-01");

  let outcome = p.save_day(&day).await;
  assert_eq!(outcome.source, StoreKind::Remote);
  assert!(outcome.is_synced());
  assert_eq!(outcome.to_string(), "synced");

  assert_eq!(p.local().snapshot().get(&day.date), Some(&day));
  assert_eq!(p.remote().row(day.date).unwrap().record, day);
}

#[tokio::test]
async fn aggregates_match_meals_at_write_time() {
  let p = Persistence::new(MemoryCache::new(), MemoryRemote::new());

  let empty = DayRecord::empty(date("2025-06-01"));
  p.save_day(&empty).await;
  let row = p.remote().row(empty.date).unwrap();
  assert_eq!(row.total_calories, 0.0);
  assert_eq!(row.total_protein, 0.0);

  let mut day = sample_day("2025-06-02");
  day.add_meal(MealEntry::custom("Whey", 120.0, 24.0, 1.0, 3.0, ""));
  p.save_day(&day).await;
  let row = p.remote().row(day.date).unwrap();
  assert_eq!(row.total_calories, 320.0);
  assert_eq!(row.total_protein, 47.0);
}

#[tokio::test]
async fn failing_remote_still_writes_locally() {
  let p = Persistence::new(MemoryCache::new(), MemoryRemote::failing());
  let day = sample_day("2025-06-01");

  let outcome = p.save_day(&day).await;
  assert_eq!(outcome.source, StoreKind::Local);
  assert!(outcome.error.is_some());
  assert_eq!(outcome.status(), "saved locally");

  assert_eq!(p.local().snapshot().get(&day.date), Some(&day));
  assert_eq!(p.local().pending().await, vec![day.date]);
}

#[tokio::test]
async fn failing_remote_load_all_returns_local_cache() {
  let mut cached = DayMap::new();
  for d in ["2025-06-01", "2025-06-02"] {
    let day = sample_day(d);
    cached.insert(day.date, day);
  }
  let p = Persistence::new(MemoryCache::with_days(cached.clone()), MemoryRemote::failing());

  assert_eq!(p.load_all_days().await, cached);
}

#[tokio::test]
async fn load_day_falls_back_when_remote_row_missing() {
  let day = sample_day("2025-06-01");
  let local = MemoryCache::with_days(DayMap::from([(day.date, day.clone())]));
  let p = Persistence::new(local, MemoryRemote::new());

  assert_eq!(p.remote().row_count(), 0);
  assert_eq!(p.load_day(day.date).await, Some(day.clone()));

  p.remote().set_failing(true);
  assert_eq!(p.load_day(day.date).await, Some(day));
}

#[tokio::test]
async fn remote_rows_win_over_local_when_reachable() {
  let local_day = sample_day("2025-06-01");
  let p = Persistence::new(
    MemoryCache::with_days(DayMap::from([(local_day.date, local_day.clone())])),
    MemoryRemote::new(),
  );

  let mut remote_day = local_day.clone();
  remote_day.weight = Some(189.0);
  p.remote().upsert(&remote_day).await.unwrap();

  assert_eq!(p.load_day(local_day.date).await, Some(remote_day.clone()));
  let all = p.load_all_days().await;
  assert_eq!(all.len(), 1);
  assert_eq!(all[&local_day.date], remote_day);
}

#[tokio::test]
async fn failing_remote_range_is_empty_without_fallback() {
  let day = sample_day("2025-06-01");
  let p = Persistence::new(
    MemoryCache::with_days(DayMap::from([(day.date, day.clone())])),
    MemoryRemote::failing(),
  );
  assert!(p.load_day_range(day.date, day.date).await.is_empty());
}

#[tokio::test]
async fn configuration_is_checked_on_every_call() {
  let p = Persistence::new(MemoryCache::new(), MemoryRemote::unconfigured());
  let day = sample_day("2025-06-01");

  assert_eq!(p.save_day(&day).await.source, StoreKind::Local);
  p.remote().set_configured(true);
  assert_eq!(p.save_day(&day).await.source, StoreKind::Remote);
}

// ─── Outbox ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sync_pending_replays_failed_saves() {
  let p = Persistence::new(MemoryCache::new(), MemoryRemote::failing());
  let first = sample_day("2025-06-01");
  let mut second = sample_day("2025-06-02");
  p.save_day(&first).await;
  p.save_day(&second).await;

  let report = p.sync_pending().await;
  assert!(report.synced.is_empty());
  assert_eq!(report.failed.len(), 2);

  // The replay sends the latest local state, not the state at failure time.
  second.weight = Some(187.5);
  p.local().save_merge(DayMap::from([(second.date, second.clone())])).await;

  p.remote().set_failing(false);
  let report = p.sync_pending().await;
  assert!(report.is_clean());
  assert_eq!(report.synced, vec![first.date, second.date]);
  assert!(p.local().pending().await.is_empty());
  assert_eq!(p.remote().row(second.date).unwrap().record.weight, Some(187.5));
}

#[tokio::test]
async fn successful_save_clears_pending_marker() {
  let p = Persistence::new(MemoryCache::new(), MemoryRemote::failing());
  let day = sample_day("2025-06-01");
  p.save_day(&day).await;
  assert_eq!(p.local().pending().await.len(), 1);

  p.remote().set_failing(false);
  assert!(p.save_day(&day).await.is_synced());
  assert!(p.local().pending().await.is_empty());
}

#[tokio::test]
async fn sync_pending_without_remote_does_nothing() {
  let p = local_only();
  p.local().mark_pending(date("2025-06-01")).await;
  let report = p.sync_pending().await;
  assert!(report.synced.is_empty() && report.failed.is_empty());
  assert_eq!(p.local().pending().await.len(), 1);
}

#[tokio::test]
async fn sync_pending_keeps_markers_without_a_local_record() {
  let p = Persistence::new(MemoryCache::new(), MemoryRemote::new());
  let missing = date("2025-06-01");
  p.local().mark_pending(missing).await;

  let report = p.sync_pending().await;
  assert!(report.synced.is_empty());
  assert!(report.failed.is_empty());
  assert_eq!(report.skipped, vec![missing]);
  assert!(!report.is_clean());
  assert_eq!(p.local().pending().await, vec![missing]);
  assert_eq!(p.remote().row_count(), 0);
}
