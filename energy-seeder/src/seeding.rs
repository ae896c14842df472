use std::fmt;

use energy_client::domain::{Category, EnergyReading};
use serde::Serialize;

use crate::generator::{generate_dataset, AsOf, Clock, JitterSource};
use crate::pipeline::{EnergySink, SeedError};
use crate::transform::validate_dataset;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub count: usize,
    /// Mean reading rounded to the nearest kWh; `None` when there are no readings.
    pub average: Option<u32>,
}

/// Outcome of one seeding run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub as_of: AsOf,
    pub total: usize,
    pub categories: Vec<CategorySummary>,
    pub exceeded: usize,
    /// blake3 over the canonical record encoding.
    pub digest: String,
}

impl SeedSummary {
    pub fn from_readings(as_of: AsOf, readings: &[EnergyReading]) -> Self {
        let categories = Category::ALL
            .into_iter()
            .map(|category| {
                let (count, sum) = readings
                    .iter()
                    .filter(|r| r.category == category)
                    .fold((0usize, 0u64), |(n, s), r| (n + 1, s + u64::from(r.reading)));
                let average = (count > 0).then(|| (sum as f64 / count as f64).round() as u32);
                CategorySummary {
                    category,
                    count,
                    average,
                }
            })
            .collect();

        Self {
            as_of,
            total: readings.len(),
            categories,
            exceeded: readings.iter().filter(|r| r.is_exceeded).count(),
            digest: dataset_digest(readings),
        }
    }

    pub fn category(&self, category: Category) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.category == category)
    }
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Seeded {} energy records (as of {} {})",
            self.total, self.as_of.month, self.as_of.year
        )?;
        writeln!(f)?;
        writeln!(f, "Summary:")?;
        for c in &self.categories {
            writeln!(f, "   {} records: {}", c.category, c.count)?;
        }
        writeln!(f, "   Exceeded threshold: {}", self.exceeded)?;
        writeln!(f)?;
        writeln!(f, "Average Readings (kWh):")?;
        for c in &self.categories {
            match c.average {
                Some(avg) => writeln!(f, "   {}: {} kWh", c.category, avg)?,
                None => writeln!(f, "   {}: n/a", c.category)?,
            }
        }
        writeln!(f)?;
        write!(f, "Digest: {}", self.digest)
    }
}

fn hash_str(hasher: &mut blake3::Hasher, s: &str) {
    let len = s.len() as u32;
    hasher.update(&len.to_le_bytes());
    hasher.update(s.as_bytes());
}

/// Order-sensitive fingerprint of a dataset.
pub fn dataset_digest(readings: &[EnergyReading]) -> String {
    let mut h = blake3::Hasher::new();
    for r in readings {
        h.update(&r.year.to_le_bytes());
        hash_str(&mut h, r.month.name());
        h.update(&[r.floor]);
        hash_str(&mut h, r.category.as_str());
        h.update(&r.reading.to_le_bytes());
        h.update(&[u8::from(r.is_exceeded)]);
    }
    h.finalize().to_hex().to_string()
}

/// Regenerates the dataset and swaps it into `sink`.
///
/// Nothing is written if validation fails. Any sink error aborts the run.
pub async fn seed<K, C, J>(sink: &K, clock: &C, jitter: &mut J) -> Result<SeedSummary, SeedError>
where
    K: EnergySink + ?Sized,
    C: Clock + ?Sized,
    J: JitterSource + ?Sized,
{
    let as_of = clock.as_of();
    tracing::info!(year = as_of.year, month = %as_of.month, "starting energy data seeding");

    let readings = generate_dataset(as_of, jitter);
    validate_dataset(&readings, as_of)?;

    if let Err(e) = sink.replace_all(&readings).await {
        tracing::error!(error = %e, "energy data seeding failed");
        return Err(e);
    }

    let summary = SeedSummary::from_readings(as_of, &readings);
    tracing::info!(
        records = summary.total,
        exceeded = summary.exceeded,
        digest = %summary.digest,
        "seeded energy records"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{FixedClock, FixedJitter, RngJitter};
    use crate::sinks::MemorySink;
    use energy_client::domain::Month;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Sink whose insert always fails after clearing.
    #[derive(Default)]
    struct FailingInsertSink {
        cleared: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl EnergySink for FailingInsertSink {
        async fn clear_all(&self) -> Result<(), SeedError> {
            self.cleared.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn bulk_insert(&self, _records: &[EnergyReading]) -> Result<(), SeedError> {
            Err(SeedError::Storage("disk full".to_string()))
        }
    }

    #[tokio::test]
    async fn seeding_twice_leaves_one_generation() {
        let sink = MemorySink::new();
        let clock = FixedClock::new(2026, Month::October);
        let mut jitter = RngJitter::seeded(5);

        let first = seed(&sink, &clock, &mut jitter).await.unwrap();
        let second = seed(&sink, &clock, &mut jitter).await.unwrap();

        let stored = sink.snapshot().unwrap();
        assert_eq!(stored.len(), (12 + 10) * 5 * 4);
        assert_eq!(first.total, stored.len());
        assert_eq!(second.digest, dataset_digest(&stored));
        assert_ne!(first.digest, second.digest);
    }

    #[tokio::test]
    async fn summary_counts_and_averages_per_category() {
        let sink = MemorySink::new();
        let clock = FixedClock::new(2026, Month::January);
        let mut jitter = FixedJitter::none();

        let summary = seed(&sink, &clock, &mut jitter).await.unwrap();

        assert_eq!(summary.total, 13 * 20);
        for c in &summary.categories {
            assert_eq!(c.count, 13 * 5);
        }
        // Other is flat: mean of 550..=750 over floors.
        assert_eq!(summary.category(Category::Other).unwrap().average, Some(650));
        let stored = sink.snapshot().unwrap();
        assert_eq!(summary.exceeded, stored.iter().filter(|r| r.reading > 3500).count());
    }

    #[tokio::test]
    async fn insert_failure_is_reported_as_storage_error() {
        let sink = FailingInsertSink::default();
        let clock = FixedClock::new(2026, Month::March);
        let mut jitter = FixedJitter::none();

        let err = seed(&sink, &clock, &mut jitter).await.unwrap_err();
        assert!(matches!(err, SeedError::Storage(_)));
        assert_eq!(sink.cleared.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn same_seed_and_clock_reproduce_digest() {
        let clock = FixedClock::new(2026, Month::June);
        let a = seed(&MemorySink::new(), &clock, &mut RngJitter::seeded(8)).await.unwrap();
        let b = seed(&MemorySink::new(), &clock, &mut RngJitter::seeded(8)).await.unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_category_has_no_average() {
        let as_of = AsOf {
            year: 2026,
            month: Month::May,
        };
        let readings = vec![EnergyReading::new(2026, Month::May, 1, Category::Hvac, 3600)];
        let summary = SeedSummary::from_readings(as_of, &readings);

        assert_eq!(summary.category(Category::Hvac).unwrap().average, Some(3600));
        assert_eq!(summary.category(Category::Lighting).unwrap().average, None);
        assert_eq!(summary.exceeded, 1);

        let text = summary.to_string();
        assert!(text.contains("HVAC records: 1"));
        assert!(text.contains("Lighting: n/a"));
        assert!(text.contains("Exceeded threshold: 1"));
    }
}
