//! Encoding and decoding between the day map and the text stored in SQLite.
//!
//! Dates are stored as `YYYY-MM-DD`; the day map is stored as compact JSON in
//! the same camel-case shape the rest of the system uses.

use chrono::{NaiveDate, Utc};
use coach_core::{DayMap, day::parse_date};

use crate::Result;

pub fn encode_date(date: NaiveDate) -> String { date.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> { Ok(parse_date(s)?) }

pub fn encode_days(days: &DayMap) -> Result<String> { Ok(serde_json::to_string(days)?) }

pub fn decode_days(s: &str) -> Result<DayMap> { Ok(serde_json::from_str(s)?) }

pub fn now() -> String { Utc::now().to_rfc3339() }
