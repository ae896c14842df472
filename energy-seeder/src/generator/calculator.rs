use energy_client::domain::{Category, Month};

use super::jitter::JitterSource;
use crate::pipeline::SeedError;

/// Fraction of the base reading the jitter may move it by, in either direction.
pub const JITTER_FRACTION: f64 = 0.1;

/// Seasonally adjusted expected reading before jitter.
///
/// Each category is linear in the floor number, scaled by a seasonal factor:
/// - HVAC: `2000 + 150f`, x1.4 in June-August, x1.3 in December-February.
/// - Lighting: `800 + 80f`, x1.2 in November-February.
/// - Renewable: `300 + 30f`, x1.5 in May-September.
/// - Other: `500 + 50f`, flat all year.
pub fn base_reading(category: Category, month: Month, floor: u8) -> f64 {
    let m = month.index();
    let f = f64::from(floor);

    match category {
        Category::Hvac => {
            let base = 2000.0 + 150.0 * f;
            if (5..=7).contains(&m) {
                base * 1.4
            } else if m == 11 || m <= 1 {
                base * 1.3
            } else {
                base
            }
        }
        Category::Lighting => {
            let base = 800.0 + 80.0 * f;
            if m >= 10 || m <= 1 {
                base * 1.2
            } else {
                base
            }
        }
        Category::Renewable => {
            let base = 300.0 + 30.0 * f;
            if (4..=8).contains(&m) {
                base * 1.5
            } else {
                base
            }
        }
        Category::Other => 500.0 + 50.0 * f,
    }
}

/// Moves `base` by `unit * 10%` and rounds to the nearest kWh.
pub fn apply_jitter(base: f64, unit: f64) -> u32 {
    let variation = base * JITTER_FRACTION;
    (base + unit * variation).round() as u32
}

/// Final reading for one (category, month, floor) combination.
pub fn reading_value<J>(category: Category, month: Month, floor: u8, jitter: &mut J) -> u32
where
    J: JitterSource + ?Sized,
{
    apply_jitter(base_reading(category, month, floor), jitter.next_unit())
}

/// String-typed entry point for callers outside the closed enums.
///
/// Unknown categories are rejected rather than given a default base.
pub fn reading_value_named<J>(category: &str, month: &str, floor: u8, jitter: &mut J) -> Result<u32, SeedError>
where
    J: JitterSource + ?Sized,
{
    let category: Category = category.parse()?;
    let month: Month = month.parse()?;
    Ok(reading_value(category, month, floor, jitter))
}
