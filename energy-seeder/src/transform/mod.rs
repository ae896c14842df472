use std::collections::HashSet;

use energy_client::domain::{EnergyReading, EXCEEDED_THRESHOLD_KWH};

use crate::generator::{AsOf, FLOORS};
use crate::pipeline::SeedError;

/// Pure validation of a single `EnergyReading` against the as-of date.
///
/// Rules:
/// - floor must be within 1..=5.
/// - year must be the as-of year or the one before it.
/// - as-of year readings must not be later than the as-of month.
/// - `is_exceeded` must agree with the threshold.
pub fn validate_reading(r: &EnergyReading, as_of: AsOf) -> Result<(), SeedError> {
    if !FLOORS.contains(&r.floor) {
        return Err(SeedError::Validation(format!("floor {} out of range", r.floor)));
    }

    if r.year != as_of.year && r.year != as_of.year - 1 {
        return Err(SeedError::Validation(format!("year {} outside generation window", r.year)));
    }

    if r.year == as_of.year && r.month > as_of.month {
        return Err(SeedError::Validation(format!("{} {} is in the future", r.month, r.year)));
    }

    if r.is_exceeded != (r.reading > EXCEEDED_THRESHOLD_KWH) {
        return Err(SeedError::Validation(format!(
            "is_exceeded={} inconsistent with reading {}",
            r.is_exceeded, r.reading
        )));
    }

    Ok(())
}

/// Validates every record and rejects duplicate (year, month, floor, category) tuples.
pub fn validate_dataset(records: &[EnergyReading], as_of: AsOf) -> Result<(), SeedError> {
    let mut seen = HashSet::with_capacity(records.len());

    for r in records {
        if let Err(e) = validate_reading(r, as_of) {
            metrics::counter!("energy_seeder_validation_rejected_total").increment(1);
            return Err(e);
        }
        if !seen.insert((r.year, r.month, r.floor, r.category)) {
            metrics::counter!("energy_seeder_validation_rejected_total").increment(1);
            return Err(SeedError::Validation(format!(
                "duplicate reading for {} {} floor {} {}",
                r.month, r.year, r.floor, r.category
            )));
        }
    }

    Ok(())
}
