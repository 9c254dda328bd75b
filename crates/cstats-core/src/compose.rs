//! Text fragments spliced around a conversation turn.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::body::Fullness;
use crate::character::CharacterRecord;
use crate::constants::APPEARANCE_MARKER;

static APPEARANCE_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"\[[^\[\]]*{}[^\[\]]*\]", regex::escape(APPEARANCE_MARKER));
    Regex::new(&pattern).unwrap()
});

/// The stats summary for the AI-facing copy of a turn.
pub fn stats_block(c: &CharacterRecord) -> String {
    let (feet, inches) = c.height_feet_inches();
    let name = c.name();
    let sizing = c.sizing();
    format!(
        "[Today's date is {date}.]\n\
         \n\
         [{name}'s Stats:\n\
         {name} is now {age} years old, {feet}'{inches}\" tall, and currently weighs {weight} lbs.\n\
         Her BMI is {bmi} and she {change} since {start}.\n\
         So far she has consumed {calories} out of {max} calories today, leaving her feeling {fullness}.\n\
         She currently wears a sized {shirt} shirt ({shirt_fit}), and has a pant size of {pant} US women's ({pant_fit}).]",
        date = c.formatted_date(),
        age = c.age(),
        weight = c.weight(),
        bmi = c.bmi(),
        change = weight_change(c.weight_diff()),
        start = c.formatted_start_date(),
        calories = c.calories(),
        max = c.max_calories(),
        fullness = c.fullness(),
        shirt = sizing.shirt_size(),
        shirt_fit = sizing.shirt_fit,
        pant = sizing.pant_size,
        pant_fit = sizing.pant_fit,
    )
}

fn weight_change(diff: i32) -> String {
    match diff.cmp(&0) {
        Ordering::Greater => format!("has gained {diff} lbs"),
        Ordering::Less => format!("has lost {} lbs", diff.unsigned_abs()),
        Ordering::Equal => "has neither gained nor lost weight".to_string(),
    }
}

pub fn new_day_notice(c: &CharacterRecord, celebration: bool) -> String {
    if celebration {
        format!(
            "*It's the start of a new day... And it's {name}'s birthday! {name} is now {age}!*",
            name = c.name(),
            age = c.age()
        )
    } else {
        "*It's the start of a new day!*".to_string()
    }
}

pub fn meal_notice(name: &str, food: &str, fullness: Fullness) -> String {
    format!("*{name} just ate {food}*\n*After eating this, {name} is feeling {fullness}.*")
}

pub fn appearance_annotation(name: &str, description: &str) -> String {
    format!("[\n{name} {APPEARANCE_MARKER} {description}]")
}

/// Remove physical-appearance annotations injected on earlier turns.
pub fn strip_annotations(text: &str) -> String {
    if !text.contains(APPEARANCE_MARKER) {
        return text.to_string();
    }
    APPEARANCE_ANNOTATION.replace_all(text, "").trim().to_string()
}
