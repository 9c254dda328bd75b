//! Per-turn text pipeline.
//!
//! A turn is scanned once for control tokens, the tokens are applied to the
//! engine in order, and the outbound text is rebuilt around a stats block
//! when something worth reporting happened.

use serde::{Deserialize, Serialize};

use crate::body::{Fullness, is_anniversary};
use crate::character::StatsEngine;
use crate::compose::{
    appearance_annotation, meal_notice, new_day_notice, stats_block, strip_annotations,
};
use crate::constants::CELEBRATION_DATE;
use crate::describe::DescriptionSource;
use crate::tokenizer::{TokenKind, scan, strip};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// (month, day) on which a day advance announces a birthday.
    pub celebration: (u32, u32),
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            celebration: CELEBRATION_DATE,
        }
    }
}

/// State the host keeps per conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Turns processed so far; zero means the next turn is the first.
    pub turns: u64,
    /// BMI as of the last physical description, or the conversation start.
    pub last_reported_bmi: Option<f64>,
}

impl ConversationContext {
    pub fn is_first_turn(&self) -> bool {
        self.turns == 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TurnInput<'a> {
    /// Text that will be sent to the language model.
    pub text: &'a str,
    /// Copy shown in the user's transcript.
    pub visible_text: &'a str,
}

impl<'a> TurnInput<'a> {
    /// Same text for both copies.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            visible_text: text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meal {
    pub label: String,
    pub calories: u32,
    pub fullness: Fullness,
}

/// What a turn did to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TurnReport {
    pub days_advanced: u32,
    pub pounds_gained: u32,
    pub celebration: bool,
    pub reset: bool,
    pub meals: Vec<Meal>,
    pub injected: bool,
    /// Rendered physical description, when the lookup fired.
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutput {
    pub text: String,
    pub visible_text: String,
    pub report: TurnReport,
}

/// Run one turn through the pipeline.
pub fn process_turn(
    engine: &mut StatsEngine,
    table: &dyn DescriptionSource,
    context: &mut ConversationContext,
    config: &PipelineConfig,
    input: TurnInput<'_>,
) -> TurnOutput {
    let first_turn = context.is_first_turn();
    context.turns = context.turns.saturating_add(1);
    // Seeded before any token runs, so a first-turn gain is measured.
    let start_bmi = engine.record().bmi().value;
    context.last_reported_bmi.get_or_insert(start_bmi);

    let tokens = scan(input.text);
    let mut report = TurnReport::default();
    let mut notices = Vec::new();

    for token in &tokens {
        match &token.kind {
            TokenKind::EndDay => {
                let day = engine.record_mut().advance_day();
                report.days_advanced += 1;
                report.pounds_gained += day.pounds_gained;
                let (month, dom) = config.celebration;
                let celebration = is_anniversary(day.date, month, dom);
                report.celebration |= celebration;
                tracing::debug!(
                    date = %day.date,
                    surplus = day.surplus,
                    gained = day.pounds_gained,
                    "day advanced"
                );
                notices.push(new_day_notice(engine.record(), celebration));
            }
            TokenKind::Reset => {
                engine.reset();
                context.last_reported_bmi = Some(engine.record().bmi().value);
                report.reset = true;
                tracing::debug!("character reset to construction defaults");
            }
            TokenKind::Food { label, calories } => {
                let record = engine.record_mut();
                record.add_calories(*calories);
                let fullness = record.fullness();
                tracing::debug!(food = %label, calories, %fullness, "meal recorded");
                notices.push(meal_notice(record.name(), label, fullness));
                report.meals.push(Meal {
                    label: label.clone(),
                    calories: *calories,
                    fullness,
                });
            }
        }
    }

    let record = engine.record();
    let cleaned = strip(input.text, &tokens);
    let visible_tokens = scan(input.visible_text);
    let cleaned_visible = strip(input.visible_text, &visible_tokens);

    report.injected = first_turn
        || report.days_advanced > 0
        || !report.meals.is_empty()
        || record.inject_stats();

    // Descriptions ride along with the stats block; a quiet turn leaves the
    // baseline alone so the next spliced turn still reports the gain.
    let text = if report.injected {
        let bmi = record.bmi();
        let baseline = context.last_reported_bmi.unwrap_or(bmi.value);
        let mut parts = vec![stats_block(record)];
        parts.extend(notices.iter().cloned());
        if bmi.value >= baseline + 1.0 {
            match table.description_for(bmi.index()) {
                Some(template) => {
                    let description = template.render(record);
                    parts.push(appearance_annotation(record.name(), &description));
                    report.description = Some(description);
                    context.last_reported_bmi = Some(bmi.value);
                    tracing::debug!(bmi = bmi.value, "physical description added");
                }
                None => tracing::debug!(bmi = bmi.index(), "no description row"),
            }
        }
        let body = strip_annotations(&cleaned);
        if !body.is_empty() {
            parts.push(body);
        }
        parts.join("\n")
    } else {
        cleaned
    };

    let visible_text = if notices.is_empty() {
        cleaned_visible
    } else {
        let mut parts = notices;
        if !cleaned_visible.is_empty() {
            parts.push(cleaned_visible);
        }
        parts.join("\n")
    };

    TurnOutput {
        text,
        visible_text,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterSheet;
    use crate::describe::DescriptionTable;
    use chrono::NaiveDate;

    fn engine() -> StatsEngine {
        StatsEngine::new(&CharacterSheet {
            start_weight: 145,
            ..CharacterSheet::default()
        })
        .unwrap()
    }

    fn run(engine: &mut StatsEngine, ctx: &mut ConversationContext, text: &str) -> TurnOutput {
        process_turn(
            engine,
            &DescriptionTable::new(),
            ctx,
            &PipelineConfig::default(),
            TurnInput::new(text),
        )
    }

    /// A context that has already seen a turn, so nothing forces injection.
    fn later_turn() -> ConversationContext {
        ConversationContext {
            turns: 3,
            last_reported_bmi: None,
        }
    }

    #[test]
    fn test_first_turn_injects_stats() {
        let mut e = engine();
        let mut ctx = ConversationContext::default();
        let out = run(&mut e, &mut ctx, "Hi Maddy!");
        assert!(out.report.injected);
        assert!(out.text.starts_with("[Today's date is June 15, 2016.]"));
        assert!(out.text.ends_with("\nHi Maddy!"));
        assert_eq!(out.visible_text, "Hi Maddy!");
        assert_eq!(ctx.turns, 1);
        assert!(ctx.last_reported_bmi.is_some());
    }

    #[test]
    fn test_plain_later_turn_passes_through() {
        let mut e = engine();
        let mut ctx = later_turn();
        let text = "  How was your day?  ";
        let out = run(&mut e, &mut ctx, text);
        assert!(!out.report.injected);
        assert_eq!(out.text, text);
        assert_eq!(out.visible_text, text);
    }

    #[test]
    fn test_inject_flag_forces_stats() {
        let mut e = engine();
        e.record_mut().set_inject_stats(true);
        let mut ctx = later_turn();
        let out = run(&mut e, &mut ctx, "Anything new?");
        assert!(out.report.injected);
        assert!(out.text.contains("Maddy's Stats:"));
    }

    #[test]
    fn test_food_tokens_add_calories_and_notices() {
        let mut e = engine();
        let mut ctx = later_turn();
        let out = run(&mut e, &mut ctx, "Lunch time {burger:800} and {fries:400}. Yum");
        assert_eq!(e.record().calories(), 1200);
        assert_eq!(out.report.meals.len(), 2);
        assert_eq!(out.report.meals[0].fullness, Fullness::Content);
        assert_eq!(out.report.meals[1].fullness, Fullness::Satiated);
        assert!(out.text.contains("*Maddy just ate burger*"));
        assert!(out.text.contains("consumed 1200 out of 1620"));
        assert!(out.text.ends_with("\nLunch time and . Yum"));
        assert!(out.visible_text.starts_with("*Maddy just ate burger*"));
        assert!(!out.visible_text.contains("{burger:800}"));
        assert!(!out.visible_text.contains("Maddy's Stats"));
    }

    #[test]
    fn test_end_day_advances_and_strips() {
        let mut e = engine();
        let mut ctx = later_turn();
        let out = run(&mut e, &mut ctx, "Goodnight! ==END_DAY==");
        assert_eq!(out.report.days_advanced, 1);
        assert_eq!(
            e.record().date(),
            NaiveDate::from_ymd_opt(2016, 6, 16).unwrap()
        );
        assert!(out.text.contains("*It's the start of a new day!*"));
        assert!(out.text.ends_with("\nGoodnight!"));
        assert!(!out.text.contains("==END_DAY=="));
    }

    #[test]
    fn test_food_before_end_day_counts_toward_closed_day() {
        let mut e = engine();
        let mut ctx = later_turn();
        let out = run(&mut e, &mut ctx, "{cake:3000} ==END_DAY== {toast:200}");
        assert_eq!(out.report.pounds_gained, 2);
        assert_eq!(e.record().weight(), 172);
        assert_eq!(e.record().calories(), 200);
    }

    #[test]
    fn test_celebration_notice() {
        let mut e = StatsEngine::new(&CharacterSheet {
            date: NaiveDate::from_ymd_opt(2016, 4, 15).unwrap(),
            ..CharacterSheet::default()
        })
        .unwrap();
        let mut ctx = later_turn();
        let out = run(&mut e, &mut ctx, "==END_DAY==");
        assert!(out.report.celebration);
        assert!(out.text.contains("And it's Maddy's birthday!"));
    }

    #[test]
    fn test_reset_restores_defaults_without_injecting() {
        let mut e = engine();
        e.record_mut().add_calories(900);
        let mut ctx = later_turn();
        ctx.last_reported_bmi = Some(40.0);
        let out = run(&mut e, &mut ctx, "start over ==RESET==");
        assert!(out.report.reset);
        assert!(!out.report.injected);
        assert_eq!(e.record().calories(), 0);
        assert_eq!(out.text, "start over");
        assert_eq!(ctx.last_reported_bmi, Some(e.record().bmi().value));
    }

    #[test]
    fn test_malformed_food_is_not_consumed() {
        let mut e = engine();
        let mut ctx = later_turn();
        let out = run(&mut e, &mut ctx, "she ate {pie:lots}");
        assert!(out.report.meals.is_empty());
        assert_eq!(e.record().calories(), 0);
        assert_eq!(out.text, "she ate {pie:lots}");
    }

    #[test]
    fn test_description_fires_after_one_point_gain() {
        let table = DescriptionTable::from_rows([(28, "{name} fills out her {shirt_size} shirt.")])
            .unwrap();
        let mut e = engine();
        let mut ctx = ConversationContext::default();
        let config = PipelineConfig::default();

        let first = process_turn(&mut e, &table, &mut ctx, &config, TurnInput::new("hi"));
        assert!(first.report.description.is_none());
        assert_eq!(ctx.last_reported_bmi, Some(26.6));

        e.record_mut().set_weight(180);
        let quiet = process_turn(&mut e, &table, &mut ctx, &config, TurnInput::new("hmm"));
        assert_eq!(quiet.text, "hmm");
        assert!(quiet.report.description.is_none());
        assert_eq!(ctx.last_reported_bmi, Some(26.6));

        let out = process_turn(&mut e, &table, &mut ctx, &config, TurnInput::new("{tea:5}"));
        assert_eq!(
            out.report.description.as_deref(),
            Some("Maddy fills out her Large shirt.")
        );
        assert!(out.text.contains("[\nMaddy physical appearance stats: Maddy fills out"));
        assert_eq!(ctx.last_reported_bmi, Some(28.2));

        // Same BMI again: no repeat.
        let again = process_turn(&mut e, &table, &mut ctx, &config, TurnInput::new("{tea:5}"));
        assert!(again.report.description.is_none());
    }

    #[test]
    fn test_first_turn_gain_measured_from_starting_bmi() {
        let table = DescriptionTable::from_rows([(28, "{name} is {weight} lbs now.")]).unwrap();
        let mut e = engine();
        let mut ctx = ConversationContext::default();
        let out = process_turn(
            &mut e,
            &table,
            &mut ctx,
            &PipelineConfig::default(),
            TurnInput::new("{feast:6800} ==END_DAY=="),
        );
        assert_eq!(e.record().weight(), 180);
        assert_eq!(out.report.description.as_deref(), Some("Maddy is 180 lbs now."));
        assert_eq!(ctx.last_reported_bmi, Some(28.2));
    }

    #[test]
    fn test_missing_row_keeps_baseline() {
        let mut e = engine();
        let mut ctx = later_turn();
        ctx.last_reported_bmi = Some(20.0);
        let out = run(&mut e, &mut ctx, "{tea:5}");
        assert!(out.report.description.is_none());
        assert_eq!(ctx.last_reported_bmi, Some(20.0));
    }

    #[test]
    fn test_old_annotations_removed_from_ai_copy() {
        let mut e = engine();
        let mut ctx = ConversationContext::default();
        let text =
            "Earlier.[\nMaddy physical appearance stats: something] Now {snack:100}";
        let out = run(&mut e, &mut ctx, text);
        assert!(!out.text.contains("something"));
        assert!(out.text.ends_with("\nEarlier. Now"));
    }
}
