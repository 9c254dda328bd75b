//! The character record and the state transitions that act on it.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::body::{Bmi, Fullness, age_on, bmr, is_anniversary};
use crate::clothing::ClothingSizing;
use crate::constants::CALORIES_PER_POUND;
use crate::error::{Result, StatsError};

/// Every field an operator can set directly. Derived values are not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CharacterSheet {
    pub name: String,
    /// Inches.
    pub height: u32,
    /// Pounds at `start_date`.
    pub start_weight: u32,
    /// Pounds today.
    pub weight: u32,
    /// Calories consumed so far today.
    pub calories: u32,
    pub date: NaiveDate,
    pub start_date: NaiveDate,
    pub birthday: NaiveDate,
}

impl Default for CharacterSheet {
    fn default() -> Self {
        let ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        Self {
            name: "Maddy".to_string(),
            height: 67,
            start_weight: 170,
            weight: 170,
            calories: 0,
            date: ymd(2016, 6, 15),
            start_date: ymd(2016, 6, 15),
            birthday: ymd(1997, 2, 23),
        }
    }
}

impl CharacterSheet {
    fn validate(&self) -> Result<()> {
        if self.height == 0 {
            return Err(StatsError::invalid("height", "must be greater than zero"));
        }
        Ok(())
    }
}

/// What one call to [`CharacterRecord::advance_day`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayAdvance {
    pub date: NaiveDate,
    /// Calories consumed minus maintenance for the day that just ended.
    pub surplus: f64,
    pub pounds_gained: u32,
    /// True when the new date is the character's birthday.
    pub birthday: bool,
}

/// The single mutable simulation state.
///
/// `weight_diff`, `sizing` and `max_calories` are caches; every mutator that
/// touches weight, start weight, height or age refreshes them before it
/// returns, so readers never see a half-updated record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterRecord {
    name: String,
    height: u32,
    birthday: NaiveDate,
    start_weight: u32,
    weight: u32,
    start_date: NaiveDate,
    date: NaiveDate,
    calories: u32,
    max_calories: u32,
    age: i32,
    weight_diff: i32,
    sizing: ClothingSizing,
    inject_stats: bool,
}

impl CharacterRecord {
    pub fn new(sheet: &CharacterSheet) -> Result<Self> {
        sheet.validate()?;
        let mut record = Self {
            name: sheet.name.clone(),
            height: sheet.height,
            birthday: sheet.birthday,
            start_weight: sheet.start_weight,
            weight: sheet.weight,
            start_date: sheet.start_date,
            date: sheet.date,
            calories: sheet.calories,
            max_calories: 0,
            age: age_on(sheet.date, sheet.birthday),
            weight_diff: 0,
            sizing: ClothingSizing::for_weight_diff(0),
            inject_stats: false,
        };
        record.recompute_clothing_sizing();
        record.refresh_max_calories();
        Ok(record)
    }

    // --- Accessors ---

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn birthday(&self) -> NaiveDate {
        self.birthday
    }

    pub fn start_weight(&self) -> u32 {
        self.start_weight
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn calories(&self) -> u32 {
        self.calories
    }

    pub fn max_calories(&self) -> u32 {
        self.max_calories
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn weight_diff(&self) -> i32 {
        self.weight_diff
    }

    pub fn sizing(&self) -> &ClothingSizing {
        &self.sizing
    }

    pub fn inject_stats(&self) -> bool {
        self.inject_stats
    }

    /// The operator-settable view of this record.
    pub fn sheet(&self) -> CharacterSheet {
        CharacterSheet {
            name: self.name.clone(),
            height: self.height,
            start_weight: self.start_weight,
            weight: self.weight,
            calories: self.calories,
            date: self.date,
            start_date: self.start_date,
            birthday: self.birthday,
        }
    }

    // --- Derived values ---

    pub fn bmi(&self) -> Bmi {
        Bmi::new(self.weight, self.height)
    }

    pub fn bmr(&self) -> f64 {
        bmr(self.weight, self.height, self.age)
    }

    pub fn fullness(&self) -> Fullness {
        Fullness::from_calories(self.calories, self.max_calories)
    }

    /// (feet, inches)
    pub fn height_feet_inches(&self) -> (u32, u32) {
        (self.height / 12, self.height % 12)
    }

    pub fn formatted_date(&self) -> String {
        format_date(self.date)
    }

    pub fn formatted_start_date(&self) -> String {
        format_date(self.start_date)
    }

    // --- Mutators ---

    pub fn add_calories(&mut self, amount: u32) {
        self.calories = self.calories.saturating_add(amount);
    }

    /// Close out the current day: settle the calorie balance against the
    /// pre-advance BMR, move to the next date, and refresh every cache.
    pub fn advance_day(&mut self) -> DayAdvance {
        self.date = self.date.succ_opt().unwrap_or(self.date);

        let surplus = f64::from(self.calories) - self.bmr();
        let mut pounds_gained = 0;
        if surplus > CALORIES_PER_POUND {
            pounds_gained = (surplus / CALORIES_PER_POUND).floor() as u32;
            self.weight = self.weight.saturating_add(pounds_gained);
        }

        let birthday = is_anniversary(self.date, self.birthday.month(), self.birthday.day());
        if birthday {
            self.age = age_on(self.date, self.birthday);
        }

        self.calories = 0;
        self.recompute_clothing_sizing();
        self.refresh_max_calories();

        DayAdvance {
            date: self.date,
            surplus,
            pounds_gained,
            birthday,
        }
    }

    pub fn recompute_clothing_sizing(&mut self) {
        let diff = i64::from(self.weight) - i64::from(self.start_weight);
        self.weight_diff = diff.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        self.sizing = ClothingSizing::for_weight_diff(self.weight_diff);
    }

    /// Replace every operator-settable field at once. On error nothing
    /// changes. The inject flag is kept.
    pub fn override_with(&mut self, sheet: &CharacterSheet) -> Result<()> {
        let mut next = Self::new(sheet)?;
        next.inject_stats = self.inject_stats;
        *self = next;
        Ok(())
    }

    pub fn set_inject_stats(&mut self, inject: bool) {
        self.inject_stats = inject;
    }

    pub fn set_weight(&mut self, weight: u32) {
        self.weight = weight;
        self.recompute_clothing_sizing();
        self.refresh_max_calories();
    }

    pub fn set_calories(&mut self, calories: u32) {
        self.calories = calories;
    }

    /// Parse `YYYY-MM-DD` and move the calendar there.
    pub fn set_date(&mut self, date: &str) -> Result<()> {
        let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|e| StatsError::invalid("date", format!("{date:?}: {e}")))?;
        self.date = parsed;
        Ok(())
    }

    fn refresh_max_calories(&mut self) {
        self.max_calories = self.bmr().round().max(0.0) as u32;
    }
}

/// "Month DD, YYYY"
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Owns the live record plus the record it started from, so a reset can
/// put everything back the way it was at construction.
#[derive(Debug, Clone)]
pub struct StatsEngine {
    record: CharacterRecord,
    baseline: CharacterRecord,
}

impl StatsEngine {
    pub fn new(sheet: &CharacterSheet) -> Result<Self> {
        let record = CharacterRecord::new(sheet)?;
        Ok(Self::from_record(record))
    }

    pub fn from_record(record: CharacterRecord) -> Self {
        Self {
            baseline: record.clone(),
            record,
        }
    }

    pub fn record(&self) -> &CharacterRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut CharacterRecord {
        &mut self.record
    }

    pub fn reset(&mut self) {
        self.record = self.baseline.clone();
    }
}

impl Default for StatsEngine {
    fn default() -> Self {
        // The default sheet has a non-zero height.
        let record = CharacterRecord::new(&CharacterSheet::default())
            .unwrap_or_else(|_| unreachable!("default sheet is valid"));
        Self::from_record(record)
    }
}
