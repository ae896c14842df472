use std::time::Duration;

use energy_client::domain::EnergyReading;
use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    PgConnection, Postgres, QueryBuilder,
};

use crate::config::StoreConfig;
use crate::pipeline::{EnergySink, SeedError};

const DELETE_ALL_SQL: &str = "DELETE FROM energy_readings";

const INSERT_PREFIX: &str = "INSERT INTO energy_readings (year, month, floor, category, reading, is_exceeded) ";

/// One multi-row INSERT per `batch_size` chunk of `records`.
fn insert_statements(records: &[EnergyReading], batch_size: usize) -> Vec<QueryBuilder<'static, Postgres>> {
    records
        .chunks(batch_size.max(1))
        .map(|chunk| {
            let mut builder = QueryBuilder::<Postgres>::new(INSERT_PREFIX);
            builder.push_values(chunk, |mut b, r| {
                b.push_bind(r.year)
                    .push_bind(r.month.name())
                    .push_bind(i32::from(r.floor))
                    .push_bind(r.category.as_str())
                    .push_bind(i64::from(r.reading))
                    .push_bind(r.is_exceeded);
            });
            builder
        })
        .collect()
}

/// `energy_readings` table over a Postgres-wire connection pool.
///
/// The table is expected to exist already; see `sql/schema/`.
pub struct PgEnergySink {
    pool: PgPool,
    batch_size: usize,
}

impl PgEnergySink {
    pub fn new(pool: PgPool, batch_size: usize) -> Self {
        Self {
            pool,
            batch_size: batch_size.max(1),
        }
    }

    /// Opens the pool and checks one connection out, so an unreachable
    /// store fails here rather than on the first write.
    pub async fn connect(cfg: &StoreConfig) -> Result<Self, SeedError> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_millis(cfg.connect_timeout_ms))
            .connect(&cfg.uri)
            .await
            .map_err(|e| SeedError::Connection(e.to_string()))?;

        Ok(Self::new(pool, cfg.batch_size))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn delete_all(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let res = sqlx::query(DELETE_ALL_SQL).execute(conn).await?;
        Ok(res.rows_affected())
    }

    async fn insert_batches(&self, conn: &mut PgConnection, records: &[EnergyReading]) -> Result<(), sqlx::Error> {
        for mut builder in insert_statements(records, self.batch_size) {
            builder.build().execute(&mut *conn).await?;
        }
        Ok(())
    }

    fn storage_error(op: &str, e: sqlx::Error) -> SeedError {
        tracing::error!(error = %e, op, "postgres sink operation failed");
        metrics::counter!("energy_seeder_sink_errors_total").increment(1);
        SeedError::Storage(format!("{op}: {e}"))
    }
}

#[async_trait::async_trait]
impl EnergySink for PgEnergySink {
    async fn clear_all(&self) -> Result<(), SeedError> {
        let mut conn = self.pool.acquire().await.map_err(|e| Self::storage_error("acquire", e))?;
        let deleted = Self::delete_all(&mut conn).await.map_err(|e| Self::storage_error("delete", e))?;
        tracing::info!(deleted, "cleared existing energy readings");
        Ok(())
    }

    async fn bulk_insert(&self, records: &[EnergyReading]) -> Result<(), SeedError> {
        if records.is_empty() {
            return Ok(());
        }

        // One transaction across all chunks, so a failure commits nothing.
        let mut tx = self.pool.begin().await.map_err(|e| Self::storage_error("begin", e))?;
        self.insert_batches(&mut tx, records)
            .await
            .map_err(|e| Self::storage_error("insert", e))?;
        tx.commit().await.map_err(|e| Self::storage_error("commit", e))?;

        metrics::counter!("energy_seeder_records_inserted_total").increment(records.len() as u64);
        Ok(())
    }

    async fn replace_all(&self, records: &[EnergyReading]) -> Result<(), SeedError> {
        let mut tx = self.pool.begin().await.map_err(|e| Self::storage_error("begin", e))?;

        let deleted = Self::delete_all(&mut tx).await.map_err(|e| Self::storage_error("delete", e))?;
        self.insert_batches(&mut tx, records)
            .await
            .map_err(|e| Self::storage_error("insert", e))?;
        tx.commit().await.map_err(|e| Self::storage_error("commit", e))?;

        tracing::info!(deleted, inserted = records.len(), "replaced energy readings");
        metrics::counter!("energy_seeder_records_inserted_total").increment(records.len() as u64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreKind;
    use crate::generator::{generate_dataset, FixedClock, FixedJitter, RngJitter};
    use energy_client::domain::{Category, Month};

    fn readings(n: u32) -> Vec<EnergyReading> {
        (0..n)
            .map(|i| EnergyReading::new(2025, Month::ALL[i as usize % 12], 1 + (i / 12) as u8, Category::Other, 500 + i))
            .collect()
    }

    #[test]
    fn insert_statements_chunk_by_batch_size() {
        let statements = insert_statements(&readings(5), 2);
        assert_eq!(statements.len(), 3);

        let first = statements[0].sql();
        assert!(first.starts_with(
            "INSERT INTO energy_readings (year, month, floor, category, reading, is_exceeded) VALUES "
        ));
        assert!(first.contains("$12"));
        assert!(!first.contains("$13"));

        let last = statements[2].sql();
        assert!(last.contains("$6"));
        assert!(!last.contains("$7"));
    }

    #[test]
    fn insert_statements_handle_empty_input_and_zero_batch() {
        assert!(insert_statements(&[], 500).is_empty());
        assert_eq!(insert_statements(&readings(3), 0).len(), 3);
    }

    #[test]
    fn delete_targets_readings_table() {
        assert_eq!(DELETE_ALL_SQL, "DELETE FROM energy_readings");
    }

    /// Connects only when ENERGY_SEEDER_TEST_DATABASE_URL points at a disposable database.
    async fn test_sink() -> Option<PgEnergySink> {
        let uri = std::env::var("ENERGY_SEEDER_TEST_DATABASE_URL").ok()?;
        let cfg = StoreConfig {
            kind: StoreKind::Pgwire,
            uri,
            max_connections: 1,
            connect_timeout_ms: 5_000,
            batch_size: 7,
            csv_path: String::new(),
        };
        let sink = PgEnergySink::connect(&cfg).await.unwrap();
        let schema = include_str!("../../sql/schema/01_energy_readings.sql");
        for stmt in schema.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(stmt).execute(sink.pool()).await.unwrap();
        }
        Some(sink)
    }

    async fn row_count(sink: &PgEnergySink) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM energy_readings")
            .fetch_one(sink.pool())
            .await
            .unwrap()
    }

    // Scenarios share one table, so they run in sequence within one test.
    #[tokio::test]
    async fn pg_sink_replaces_and_inserts_atomically() {
        let Some(sink) = test_sink().await else {
            return;
        };
        let as_of = FixedClock::new(2026, Month::March).0;

        // Seeding twice leaves one generation.
        sink.replace_all(&generate_dataset(as_of, &mut RngJitter::seeded(1))).await.unwrap();
        let good = generate_dataset(as_of, &mut RngJitter::seeded(2));
        sink.replace_all(&good).await.unwrap();
        assert_eq!(row_count(&sink).await, ((12 + 3) * 5 * 4) as i64);

        // Floor 9 violates the CHECK constraint in the last chunk; the old
        // generation must survive.
        let mut bad = good.clone();
        bad.push(EnergyReading::new(2026, Month::January, 9, Category::Other, 950));
        let err = sink.replace_all(&bad).await.unwrap_err();
        assert!(matches!(err, SeedError::Storage(_)));
        assert_eq!(row_count(&sink).await, good.len() as i64);

        // A failing bulk insert commits none of its chunks.
        sink.clear_all().await.unwrap();
        let mut batch = readings(10);
        batch.push(EnergyReading::new(2026, Month::January, 9, Category::Other, 950));
        assert!(sink.bulk_insert(&batch).await.is_err());
        assert_eq!(row_count(&sink).await, 0);

        sink.bulk_insert(&readings(10)).await.unwrap();
        assert_eq!(row_count(&sink).await, 10);
        sink.replace_all(&generate_dataset(as_of, &mut FixedJitter::none())).await.unwrap();
        assert_eq!(row_count(&sink).await, good.len() as i64);
    }
}
