use std::collections::BTreeMap;

use crate::error::StatsError;
use crate::template::Template;

/// Provides prose physical descriptions keyed by whole-number BMI.
/// Loaded once at startup and read-only afterwards.
pub trait DescriptionSource {
    fn description_for(&self, bmi: u32) -> Option<&Template>;
}

/// In-memory lookup table.
#[derive(Debug, Clone, Default)]
pub struct DescriptionTable {
    rows: BTreeMap<u32, Template>,
}

impl DescriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw `(bmi, template)` rows. Fails on the first template
    /// that does not parse. A repeated BMI keeps the last row.
    pub fn from_rows<I, S>(rows: I) -> Result<Self, (u32, StatsError)>
    where
        I: IntoIterator<Item = (u32, S)>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (bmi, source) in rows {
            let template =
                Template::parse(source.as_ref()).map_err(|e| (bmi, StatsError::from(e)))?;
            table.insert(bmi, template);
        }
        Ok(table)
    }

    pub fn insert(&mut self, bmi: u32, template: Template) {
        self.rows.insert(bmi, template);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Template)> {
        self.rows.iter().map(|(bmi, t)| (*bmi, t))
    }
}

impl DescriptionSource for DescriptionTable {
    fn description_for(&self, bmi: u32) -> Option<&Template> {
        self.rows.get(&bmi)
    }
}
