use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{BASE_PANT_SIZE, PANT_STEP_LBS, SHIRT_SIZES, SHIRT_TIER_LBS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fit {
    Relaxed,
    Standard,
    Tight,
}

impl Fit {
    pub fn label(self) -> &'static str {
        match self {
            Fit::Relaxed => "Relaxed Fit",
            Fit::Standard => "Standard Fit",
            Fit::Tight => "Tight Fit",
        }
    }
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shirt and pant sizing derived from pounds gained since the start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingSizing {
    pub shirt_tier: usize,
    pub shirt_fit: Fit,
    pub pant_size: u32,
    pub pant_fit: Fit,
}

impl ClothingSizing {
    /// `weight_diff` may be negative. Tiers clamp at the smallest size; the
    /// fit cycles use the Euclidean remainder so a loss still lands in 0..20.
    pub fn for_weight_diff(weight_diff: i32) -> Self {
        let cycle = weight_diff.rem_euclid(PANT_STEP_LBS);

        let tier = weight_diff.div_euclid(SHIRT_TIER_LBS).max(0) as usize;
        let shirt_tier = tier.min(SHIRT_SIZES.len() - 1);
        let shirt_fit = match cycle {
            c if c <= 10 => Fit::Relaxed,
            c if c <= 15 => Fit::Standard,
            _ => Fit::Tight,
        };

        let steps = weight_diff.div_euclid(PANT_STEP_LBS).max(0) as u32;
        let pant_size = BASE_PANT_SIZE + 2 * steps;
        let pant_fit = match cycle {
            c if c <= 5 => Fit::Relaxed,
            c if c <= 10 => Fit::Standard,
            _ => Fit::Tight,
        };

        Self {
            shirt_tier,
            shirt_fit,
            pant_size,
            pant_fit,
        }
    }

    pub fn shirt_size(&self) -> &'static str {
        SHIRT_SIZES[self.shirt_tier]
    }
}
