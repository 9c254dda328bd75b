//! Character stats engine.
//!
//! Keeps one character's weight, age, calorie and calendar state, advances
//! it from control tokens found in chat text, and renders that state as a
//! stats block spliced into the conversation.
//!
//! Zero I/O. The lookup table and configuration are loaded elsewhere and
//! handed in.

pub mod body;
pub mod character;
pub mod clothing;
pub mod compose;
pub mod constants;
pub mod describe;
pub mod error;
pub mod form;
pub mod pipeline;
pub mod template;
pub mod tokenizer;

pub use body::{Bmi, BmiCategory, Fullness};
pub use character::{CharacterRecord, CharacterSheet, DayAdvance, StatsEngine, format_date};
pub use clothing::{ClothingSizing, Fit};
pub use compose::stats_block;
pub use constants::{CELEBRATION_DATE, SHIRT_SIZES};
pub use describe::{DescriptionSource, DescriptionTable};
pub use error::{Result, StatsError, TemplateError};
pub use form::OverrideForm;
pub use pipeline::{
    ConversationContext, Meal, PipelineConfig, TurnInput, TurnOutput, TurnReport, process_turn,
};
pub use template::{Field, Template};
pub use tokenizer::{Token, TokenKind, scan, strip_tokens};
