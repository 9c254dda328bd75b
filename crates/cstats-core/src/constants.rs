/// Shirt labels in ascending order; one tier per 30 lbs gained.
pub const SHIRT_SIZES: [&str; 17] = [
    "Medium", "Large", "X-Large", "2XL", "3XL", "4XL", "5XL", "6XL", "7XL", "8XL", "9XL", "10XL",
    "11XL", "12XL", "13XL", "14XL", "15XL",
];

/// Pounds gained per shirt tier.
pub const SHIRT_TIER_LBS: i32 = 30;

/// Pounds gained per pant size step; also the period of both fit cycles.
pub const PANT_STEP_LBS: i32 = 20;

/// Smallest pant size (US women's).
pub const BASE_PANT_SIZE: u32 = 14;

/// Calories above maintenance that add one pound at day end.
pub const CALORIES_PER_POUND: f64 = 500.0;

/// BMI to pounds-per-square-inch conversion factor.
pub const BMI_FACTOR: f64 = 703.0;

/// BMR = BMR_BASE + BMR_WEIGHT * lbs + BMR_HEIGHT * inches - BMR_AGE * years
pub const BMR_BASE: f64 = 655.0;
pub const BMR_WEIGHT: f64 = 4.35;
pub const BMR_HEIGHT: f64 = 4.7;
pub const BMR_AGE: f64 = 4.7;

/// Default calendar date (month, day) that produces the birthday notice.
pub const CELEBRATION_DATE: (u32, u32) = (4, 16);

/// Marker that identifies a physical-description annotation in text.
pub const APPEARANCE_MARKER: &str = "physical appearance stats:";

pub const END_DAY_TOKEN: &str = "==END_DAY==";
pub const RESET_TOKEN: &str = "==RESET==";
