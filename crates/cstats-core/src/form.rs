//! Coercion of operator form strings into a [`CharacterSheet`].
//!
//! Numeric widgets hand back strings such as `"170"` or `"170.0"`; both are
//! accepted. Anything else is rejected with the offending field named, and
//! the record is only touched once every field has parsed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::character::{CharacterRecord, CharacterSheet};
use crate::error::{Result, StatsError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideForm {
    pub name: String,
    pub start_weight: String,
    pub weight: String,
    pub height: String,
    pub calories: String,
    pub current_year: String,
    pub current_month: String,
    pub current_day: String,
    pub start_year: String,
    pub start_month: String,
    pub start_day: String,
    pub birth_year: String,
    pub birth_month: String,
    pub birth_day: String,
}

impl OverrideForm {
    /// Pre-filled from an existing record, the way the panel shows it.
    pub fn from_record(c: &CharacterRecord) -> Self {
        use chrono::Datelike;
        Self {
            name: c.name().to_string(),
            start_weight: c.start_weight().to_string(),
            weight: c.weight().to_string(),
            height: c.height().to_string(),
            calories: c.calories().to_string(),
            current_year: c.date().year().to_string(),
            current_month: c.date().month().to_string(),
            current_day: c.date().day().to_string(),
            start_year: c.start_date().year().to_string(),
            start_month: c.start_date().month().to_string(),
            start_day: c.start_date().day().to_string(),
            birth_year: c.birthday().year().to_string(),
            birth_month: c.birthday().month().to_string(),
            birth_day: c.birthday().day().to_string(),
        }
    }

    pub fn parse(&self) -> Result<CharacterSheet> {
        let height = parse_whole("height", &self.height)?;
        if height == 0 {
            return Err(StatsError::invalid("height", "must be greater than zero"));
        }
        Ok(CharacterSheet {
            name: self.name.trim().to_string(),
            height,
            start_weight: parse_whole("start_weight", &self.start_weight)?,
            weight: parse_whole("weight", &self.weight)?,
            calories: parse_whole("calories", &self.calories)?,
            date: parse_date(
                "current date",
                &self.current_year,
                &self.current_month,
                &self.current_day,
            )?,
            start_date: parse_date(
                "start date",
                &self.start_year,
                &self.start_month,
                &self.start_day,
            )?,
            birthday: parse_date(
                "birthday",
                &self.birth_year,
                &self.birth_month,
                &self.birth_day,
            )?,
        })
    }

    /// Parse and apply in one step; on error the record is unchanged.
    pub fn apply(&self, record: &mut CharacterRecord) -> Result<()> {
        let sheet = self.parse()?;
        record.override_with(&sheet)
    }
}

/// Non-negative whole number, truncating a fractional spelling.
fn parse_whole(field: &'static str, raw: &str) -> Result<u32> {
    let s = raw.trim();
    if let Ok(n) = s.parse::<u32>() {
        return Ok(n);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f < f64::from(u32::MAX) => Ok(f.trunc() as u32),
        Ok(_) => Err(StatsError::invalid(field, format!("{raw:?} is out of range"))),
        Err(_) => Err(StatsError::invalid(field, format!("{raw:?} is not a number"))),
    }
}

fn parse_signed(field: &'static str, raw: &str) -> Result<i32> {
    let s = raw.trim();
    if let Ok(n) = s.parse::<i32>() {
        return Ok(n);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.abs() < f64::from(i32::MAX) => Ok(f.trunc() as i32),
        _ => Err(StatsError::invalid(field, format!("{raw:?} is not a year"))),
    }
}

fn parse_date(field: &'static str, year: &str, month: &str, day: &str) -> Result<NaiveDate> {
    let y = parse_signed(field, year)?;
    let m = parse_whole(field, month)?;
    let d = parse_whole(field, day)?;
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| StatsError::invalid(field, format!("{y:04}-{m:02}-{d:02} is not a date")))
}
