//! Placeholder templates for lookup-table descriptions.
//!
//! A template is parsed once into literal and field segments. Only the
//! names in [`Field`] are accepted, so rendering cannot fail.

use std::fmt::Write;

use crate::character::CharacterRecord;
use crate::error::TemplateError;

/// Character fields a template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Age,
    Height,
    Feet,
    Inches,
    Weight,
    StartWeight,
    WeightDiff,
    Bmi,
    BmiCategory,
    Calories,
    MaxCalories,
    Fullness,
    ShirtSize,
    ShirtFit,
    PantSize,
    PantFit,
    Date,
}

impl Field {
    pub const ALL: [Field; 18] = [
        Field::Name,
        Field::Age,
        Field::Height,
        Field::Feet,
        Field::Inches,
        Field::Weight,
        Field::StartWeight,
        Field::WeightDiff,
        Field::Bmi,
        Field::BmiCategory,
        Field::Calories,
        Field::MaxCalories,
        Field::Fullness,
        Field::ShirtSize,
        Field::ShirtFit,
        Field::PantSize,
        Field::PantFit,
        Field::Date,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Age => "age",
            Field::Height => "height",
            Field::Feet => "feet",
            Field::Inches => "inches",
            Field::Weight => "weight",
            Field::StartWeight => "start_weight",
            Field::WeightDiff => "weight_diff",
            Field::Bmi => "bmi",
            Field::BmiCategory => "bmi_category",
            Field::Calories => "calories",
            Field::MaxCalories => "max_calories",
            Field::Fullness => "fullness",
            Field::ShirtSize => "shirt_size",
            Field::ShirtFit => "shirt_fit",
            Field::PantSize => "pant_size",
            Field::PantFit => "pant_fit",
            Field::Date => "date",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    fn write_value(self, out: &mut String, c: &CharacterRecord) {
        let (feet, inches) = c.height_feet_inches();
        // Writing into a String cannot fail.
        let _ = match self {
            Field::Name => write!(out, "{}", c.name()),
            Field::Age => write!(out, "{}", c.age()),
            Field::Height => write!(out, "{}", c.height()),
            Field::Feet => write!(out, "{feet}"),
            Field::Inches => write!(out, "{inches}"),
            Field::Weight => write!(out, "{}", c.weight()),
            Field::StartWeight => write!(out, "{}", c.start_weight()),
            Field::WeightDiff => write!(out, "{}", c.weight_diff()),
            Field::Bmi => write!(out, "{:.1}", c.bmi().value),
            Field::BmiCategory => write!(out, "{}", c.bmi().category),
            Field::Calories => write!(out, "{}", c.calories()),
            Field::MaxCalories => write!(out, "{}", c.max_calories()),
            Field::Fullness => write!(out, "{}", c.fullness()),
            Field::ShirtSize => write!(out, "{}", c.sizing().shirt_size()),
            Field::ShirtFit => write!(out, "{}", c.sizing().shirt_fit),
            Field::PantSize => write!(out, "{}", c.sizing().pant_size),
            Field::PantFit => write!(out, "{}", c.sizing().pant_fit),
            Field::Date => write!(out, "{}", c.formatted_date()),
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `{field}` placeholders. `{{` and `}}` are literal braces.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((i, ch)) = chars.next() {
            match ch {
                '{' if chars.peek().is_some_and(|&(_, c)| c == '{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().is_some_and(|&(_, c)| c == '}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let rest = &source[i + 1..];
                    let end = rest.find('}').ok_or(TemplateError::Unclosed(i))?;
                    let name = rest[..end].trim();
                    if name.contains('{') {
                        return Err(TemplateError::Unclosed(i));
                    }
                    let field = Field::from_name(name)
                        .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                    // Skip past the closing brace.
                    while let Some(&(j, _)) = chars.peek() {
                        if j > i + end + 1 {
                            break;
                        }
                        chars.next();
                    }
                }
                '}' => return Err(TemplateError::Unmatched(i)),
                '[' | ']' => return Err(TemplateError::Bracket(i)),
                _ => literal.push(ch),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(f) => Some(*f),
            Segment::Literal(_) => None,
        })
    }

    pub fn render(&self, character: &CharacterRecord) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => field.write_value(&mut out, character),
            }
        }
        out
    }
}
