use anyhow::{bail, Result};
use energy_client::domain::EnergyReading;
use energy_seeder::{
    config::{AppConfig, StoreKind},
    generator::{Clock, RngJitter, SystemClock},
    observability,
    pipeline::{EnergySink, SeedError},
    seed,
    sinks::{CsvFileSink, MemorySink, PgEnergySink},
};
use std::env;

enum Store {
    Pgwire(PgEnergySink),
    Csv(CsvFileSink),
    Memory(MemorySink),
}

#[async_trait::async_trait]
impl EnergySink for Store {
    async fn clear_all(&self) -> Result<(), SeedError> {
        match self {
            Self::Pgwire(s) => s.clear_all().await,
            Self::Csv(s) => s.clear_all().await,
            Self::Memory(s) => s.clear_all().await,
        }
    }

    async fn bulk_insert(&self, records: &[EnergyReading]) -> Result<(), SeedError> {
        match self {
            Self::Pgwire(s) => s.bulk_insert(records).await,
            Self::Csv(s) => s.bulk_insert(records).await,
            Self::Memory(s) => s.bulk_insert(records).await,
        }
    }

    async fn replace_all(&self, records: &[EnergyReading]) -> Result<(), SeedError> {
        match self {
            Self::Pgwire(s) => s.replace_all(records).await,
            Self::Csv(s) => s.replace_all(records).await,
            Self::Memory(s) => s.replace_all(records).await,
        }
    }
}

/// Regenerate the synthetic energy dataset.
///
/// Usage:
///   energy-seeder [--dry-run] [--json]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    observability::init_tracing();

    let mut dry_run = false;
    let mut json = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--dry-run" => dry_run = true,
            "--json" => json = true,
            other => bail!("unknown argument '{other}'\nusage: energy-seeder [--dry-run] [--json]"),
        }
    }

    // Load configuration (SEEDER_CONFIG can point to another file).
    // A dry run never touches the store, so it needs neither the file nor [store].
    let (cfg, store) = if dry_run {
        (AppConfig::load_or_default()?, Store::Memory(MemorySink::new()))
    } else {
        let cfg = AppConfig::load()?;
        let store_cfg = cfg.store()?;
        let store = match store_cfg.kind {
            StoreKind::Pgwire => Store::Pgwire(PgEnergySink::connect(store_cfg).await?),
            StoreKind::Csv => Store::Csv(CsvFileSink::new(&store_cfg.csv_path)),
        };
        (cfg, store)
    };

    let clock: Box<dyn Clock> = match cfg.generator.fixed_clock()? {
        Some(fixed) => Box::new(fixed),
        None => Box::new(SystemClock),
    };

    let mut jitter = match cfg.generator.seed {
        Some(s) => RngJitter::seeded(s),
        None => RngJitter::from_entropy(),
    };

    let summary = seed(&store, clock.as_ref(), &mut jitter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }

    Ok(())
}
