use anyhow::{bail, Result};
use energy_client::db::energy_queries;
use energy_seeder::{config::AppConfig, observability, sinks::PgEnergySink};
use std::env;

/// Print monthly category totals for one year of seeded readings.
///
/// Usage:
///   energy_report <year>
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: energy_report <year>");
    }
    let year: i32 = args[1]
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid year '{}': {e}", args[1]))?;

    let cfg = AppConfig::load()?;
    let sink = PgEnergySink::connect(cfg.store()?).await?;

    let totals = energy_queries::monthly_category_totals(sink.pool(), year).await?;
    if totals.is_empty() {
        tracing::warn!(year, "no energy readings stored for year");
        return Ok(());
    }

    for t in &totals {
        tracing::info!(
            month = %t.month,
            category = %t.category,
            total_kwh = t.total_kwh,
            exceeded = t.exceeded_count,
            "monthly category total"
        );
    }

    for f in energy_queries::floor_totals(sink.pool(), year).await? {
        tracing::info!(floor = f.floor, total_kwh = f.total_kwh, "floor total");
    }

    let readings = energy_queries::readings_for_year(sink.pool(), year).await?;
    let exceeded = readings.iter().filter(|r| r.is_exceeded).count();
    tracing::info!(year, readings = readings.len(), exceeded, "energy report complete");

    Ok(())
}
