//! Body metrics: BMI, BMR, fullness and age.
//!
//! Every function here is a pure calculation over plain numbers so the
//! engine and the tests can share them without constructing a character.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::{BMI_FACTOR, BMR_AGE, BMR_BASE, BMR_HEIGHT, BMR_WEIGHT};

/// BMI band, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BmiCategory {
    Healthy,
    Overweight,
    Chubby,
    Obese,
    SuperObese,
    HyperObese,
}

/// Upper bounds (exclusive) for every band except the last.
const BMI_BANDS: [(f64, BmiCategory); 6] = [
    (18.5, BmiCategory::Healthy),
    (25.0, BmiCategory::Overweight),
    (30.0, BmiCategory::Chubby),
    (35.0, BmiCategory::Obese),
    (40.0, BmiCategory::SuperObese),
    (50.0, BmiCategory::HyperObese),
];

impl BmiCategory {
    /// Band for an unrounded BMI. Values at or past the top threshold fall
    /// into the last band.
    pub fn from_value(bmi: f64) -> Self {
        BMI_BANDS
            .iter()
            .find(|(threshold, _)| bmi < *threshold)
            .map(|(_, category)| *category)
            .unwrap_or(BmiCategory::HyperObese)
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Healthy => "Healthy",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Chubby => "Chubby",
            BmiCategory::Obese => "Obese",
            BmiCategory::SuperObese => "Super Obese",
            BmiCategory::HyperObese => "Hyper Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A BMI reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bmi {
    /// Unrounded value; category and integer key derive from this.
    pub raw: f64,
    /// Value rounded to one decimal, as reported.
    pub value: f64,
    pub category: BmiCategory,
}

impl Bmi {
    pub fn new(weight_lbs: u32, height_inches: u32) -> Self {
        let raw = raw_bmi(weight_lbs, height_inches);
        Self {
            raw,
            value: (raw * 10.0).round() / 10.0,
            category: BmiCategory::from_value(raw),
        }
    }

    /// Whole-number BMI used as the lookup-table key.
    pub fn index(&self) -> u32 {
        if self.raw.is_finite() && self.raw > 0.0 {
            self.raw.floor() as u32
        } else {
            0
        }
    }
}

impl fmt::Display for Bmi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} ({})", self.value, self.category)
    }
}

pub fn raw_bmi(weight_lbs: u32, height_inches: u32) -> f64 {
    let h = f64::from(height_inches);
    (f64::from(weight_lbs) / (h * h)) * BMI_FACTOR
}

/// Basal metabolic rate in calories/day. Single formula, no sex term.
pub fn bmr(weight_lbs: u32, height_inches: u32, age_years: i32) -> f64 {
    BMR_BASE + BMR_WEIGHT * f64::from(weight_lbs) + BMR_HEIGHT * f64::from(height_inches)
        - BMR_AGE * f64::from(age_years)
}

/// How full the character feels, from consumed vs. maximum calories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Fullness {
    Starving,
    Hungry,
    Content,
    Satiated,
    Stuffed,
    Overfed,
}

impl Fullness {
    pub fn from_calories(current: u32, max: u32) -> Self {
        if max == 0 {
            return if current == 0 {
                Fullness::Starving
            } else {
                Fullness::Overfed
            };
        }
        let pct = f64::from(current) / f64::from(max) * 100.0;
        match pct {
            p if p <= 20.0 => Fullness::Starving,
            p if p <= 40.0 => Fullness::Hungry,
            p if p <= 60.0 => Fullness::Content,
            p if p <= 80.0 => Fullness::Satiated,
            p if p <= 100.0 => Fullness::Stuffed,
            _ => Fullness::Overfed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Fullness::Starving => "Starving",
            Fullness::Hungry => "Hungry",
            Fullness::Content => "Content",
            Fullness::Satiated => "Satiated",
            Fullness::Stuffed => "Stuffed",
            Fullness::Overfed => "Overfed",
        }
    }
}

impl fmt::Display for Fullness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Completed years between `birthday` and `on`.
pub fn age_on(on: NaiveDate, birthday: NaiveDate) -> i32 {
    let before_birthday = (on.month(), on.day()) < (birthday.month(), birthday.day());
    on.year() - birthday.year() - i32::from(before_birthday)
}

pub fn is_anniversary(date: NaiveDate, month: u32, day: u32) -> bool {
    date.month() == month && date.day() == day
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Weight (lbs) at which a 100-inch-tall body reaches `bmi` exactly.
    fn weight_for(bmi: f64) -> u32 {
        (bmi * 10_000.0 / BMI_FACTOR).round() as u32
    }

    #[test]
    fn test_bmi_reference_value() {
        let bmi = Bmi::new(170, 67);
        assert_relative_eq!(bmi.raw, 26.62, epsilon = 0.01);
        assert_relative_eq!(bmi.value, 26.6);
        assert_eq!(bmi.category, BmiCategory::Chubby);
        assert_eq!(bmi.index(), 26);
        assert_eq!(bmi.to_string(), "26.6 (Chubby)");
    }

    #[test]
    fn test_category_transitions_at_each_threshold() {
        let expected = [
            (18.5, BmiCategory::Healthy, BmiCategory::Overweight),
            (25.0, BmiCategory::Overweight, BmiCategory::Chubby),
            (30.0, BmiCategory::Chubby, BmiCategory::Obese),
            (35.0, BmiCategory::Obese, BmiCategory::SuperObese),
            (40.0, BmiCategory::SuperObese, BmiCategory::HyperObese),
        ];
        for (threshold, below, at) in expected {
            assert_eq!(BmiCategory::from_value(threshold - 1e-9), below, "{threshold}");
            assert_eq!(BmiCategory::from_value(threshold), at, "{threshold}");
        }
        assert_eq!(BmiCategory::from_value(50.0 - 1e-9), BmiCategory::HyperObese);
        assert_eq!(BmiCategory::from_value(50.0), BmiCategory::HyperObese);
        assert_eq!(BmiCategory::from_value(90.0), BmiCategory::HyperObese);
    }

    #[test]
    fn test_category_is_monotonic_in_weight() {
        let mut last = BmiCategory::Healthy;
        for w in weight_for(10.0)..weight_for(60.0) {
            let cat = Bmi::new(w, 100).category;
            assert!(cat >= last, "category went down at {w} lbs");
            last = cat;
        }
        assert_eq!(last, BmiCategory::HyperObese);
    }

    #[test]
    fn test_bmr_formula() {
        // 655 + 4.35*170 + 4.7*67 - 4.7*19
        assert_relative_eq!(bmr(170, 67, 19), 1620.1, epsilon = 1e-9);
        assert!(bmr(200, 67, 19) > bmr(170, 67, 19));
        assert!(bmr(170, 67, 40) < bmr(170, 67, 19));
    }

    #[test]
    fn test_fullness_bands() {
        assert_eq!(Fullness::from_calories(0, 2000), Fullness::Starving);
        assert_eq!(Fullness::from_calories(400, 2000), Fullness::Starving);
        assert_eq!(Fullness::from_calories(401, 2000), Fullness::Hungry);
        assert_eq!(Fullness::from_calories(1200, 2000), Fullness::Content);
        assert_eq!(Fullness::from_calories(1600, 2000), Fullness::Satiated);
        assert_eq!(Fullness::from_calories(2000, 2000), Fullness::Stuffed);
        assert_eq!(Fullness::from_calories(2001, 2000), Fullness::Overfed);
    }

    #[test]
    fn test_fullness_zero_max() {
        assert_eq!(Fullness::from_calories(0, 0), Fullness::Starving);
        assert_eq!(Fullness::from_calories(1, 0), Fullness::Overfed);
    }

    #[test]
    fn test_age_on() {
        let birthday = NaiveDate::from_ymd_opt(1997, 2, 23).unwrap();
        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(age_on(day(2016, 6, 15), birthday), 19);
        assert_eq!(age_on(day(2017, 2, 22), birthday), 19);
        assert_eq!(age_on(day(2017, 2, 23), birthday), 20);
    }
}
