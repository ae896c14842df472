pub mod calculator;
pub mod clock;
pub mod jitter;

use std::ops::RangeInclusive;

use energy_client::domain::{Category, EnergyReading, Month};

pub use calculator::{apply_jitter, base_reading, reading_value, reading_value_named};
pub use clock::{AsOf, Clock, FixedClock, SystemClock};
pub use jitter::{FixedJitter, JitterSource, RngJitter};

pub const FLOORS: RangeInclusive<u8> = 1..=5;

static CALENDAR: [Month; 12] = Month::ALL;

/// Months generated for `year`: the full calendar for past years, and
/// January through the as-of month for the as-of year.
pub fn months_for(year: i32, as_of: AsOf) -> &'static [Month] {
    if year == as_of.year {
        &CALENDAR[..=as_of.month.index()]
    } else {
        &CALENDAR[..]
    }
}

/// Number of readings `generate_dataset` produces for `as_of`.
pub fn expected_len(as_of: AsOf) -> usize {
    let months = Month::ALL.len() + as_of.month.index() + 1;
    months * FLOORS.len() * Category::ALL.len()
}

/// Builds the full two-year dataset ending at `as_of`.
///
/// Records are ordered year, month, floor, category.
pub fn generate_dataset<J>(as_of: AsOf, jitter: &mut J) -> Vec<EnergyReading>
where
    J: JitterSource + ?Sized,
{
    let mut readings = Vec::with_capacity(expected_len(as_of));

    for year in [as_of.year - 1, as_of.year] {
        for &month in months_for(year, as_of) {
            for floor in FLOORS {
                for category in Category::ALL {
                    let reading = reading_value(category, month, floor, jitter);
                    readings.push(EnergyReading::new(year, month, floor, category, reading));
                }
            }
        }
    }

    readings
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use energy_client::domain::EXCEEDED_THRESHOLD_KWH;

    fn as_of(year: i32, month: Month) -> AsOf {
        FixedClock::new(year, month).as_of()
    }

    #[test]
    fn dataset_size_follows_current_month() {
        let mut jitter = RngJitter::seeded(1);
        for month in Month::ALL {
            let at = as_of(2026, month);
            let data = generate_dataset(at, &mut jitter);
            assert_eq!(data.len(), (12 + month.index() + 1) * 5 * 4);
            assert_eq!(data.len(), expected_len(at));
        }
    }

    #[test]
    fn current_year_has_no_future_months() {
        let mut jitter = RngJitter::seeded(2);
        let data = generate_dataset(as_of(2026, Month::October), &mut jitter);

        assert!(data
            .iter()
            .filter(|r| r.year == 2026)
            .all(|r| r.month.index() <= Month::October.index()));

        let previous: HashSet<Month> = data.iter().filter(|r| r.year == 2025).map(|r| r.month).collect();
        assert_eq!(previous.len(), 12);

        let years: HashSet<i32> = data.iter().map(|r| r.year).collect();
        assert_eq!(years, HashSet::from([2025, 2026]));
    }

    #[test]
    fn every_tuple_appears_exactly_once() {
        let mut jitter = RngJitter::seeded(3);
        let data = generate_dataset(as_of(2026, Month::December), &mut jitter);
        let tuples: HashSet<_> = data.iter().map(|r| (r.year, r.month, r.floor, r.category)).collect();
        assert_eq!(tuples.len(), data.len());
        assert_eq!(data.len(), 480);
    }

    #[test]
    fn exceeded_flag_matches_threshold_for_every_record() {
        let mut jitter = RngJitter::seeded(4);
        let data = generate_dataset(as_of(2026, Month::August), &mut jitter);
        for r in &data {
            assert_eq!(r.is_exceeded, r.reading > EXCEEDED_THRESHOLD_KWH, "{r:?}");
        }
    }

    #[test]
    fn records_are_ordered_year_month_floor_category() {
        let mut jitter = FixedJitter::none();
        let data = generate_dataset(as_of(2026, Month::January), &mut jitter);

        let first = &data[0];
        assert_eq!((first.year, first.month, first.floor, first.category), (2025, Month::January, 1, Category::Hvac));
        let second = &data[1];
        assert_eq!((second.floor, second.category), (1, Category::Lighting));
        let fifth = &data[4];
        assert_eq!((fifth.floor, fifth.category), (2, Category::Hvac));
        let last = data.last().unwrap();
        assert_eq!((last.year, last.month, last.floor, last.category), (2026, Month::January, 5, Category::Other));

        let mut sorted = data.clone();
        energy_client::db::energy_queries::sort_readings(&mut sorted);
        assert_eq!(sorted, data);
    }

    #[test]
    fn zero_jitter_yields_rounded_base() {
        let mut jitter = FixedJitter::none();
        let data = generate_dataset(as_of(2026, Month::March), &mut jitter);
        for r in &data {
            assert_eq!(r.reading, base_reading(r.category, r.month, r.floor).round() as u32);
        }
    }

    #[test]
    fn same_seed_gives_same_dataset() {
        let at = as_of(2026, Month::May);
        let a = generate_dataset(at, &mut RngJitter::seeded(99));
        let b = generate_dataset(at, &mut RngJitter::seeded(99));
        assert_eq!(a, b);
    }
}
