use anyhow::Result;
use sqlx::PgPool;

use crate::domain::{Category, EnergyReading, EnergyReadingRow, Month};

#[derive(Debug, Clone, sqlx::FromRow)]
struct MonthlyCategoryTotalRow {
    month: String,
    category: String,
    total_kwh: i64,
    exceeded_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyCategoryTotal {
    pub month: Month,
    pub category: Category,
    pub total_kwh: i64,
    pub exceeded_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FloorTotal {
    pub floor: i32,
    pub total_kwh: i64,
}

/// Fetch every reading of a year, in generation order.
pub async fn readings_for_year(pool: &PgPool, year: i32) -> Result<Vec<EnergyReading>> {
    let rows = sqlx::query_as::<_, EnergyReadingRow>(
        r#"
        SELECT
            year,
            month,
            floor,
            category,
            reading,
            is_exceeded
        FROM energy_readings
        WHERE year = $1
        "#,
    )
    .bind(year)
    .fetch_all(pool)
    .await?;

    let mut readings = rows
        .into_iter()
        .map(EnergyReading::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    sort_readings(&mut readings);

    Ok(readings)
}

/// Total kWh and exceeded count per month and category for a year.
pub async fn monthly_category_totals(pool: &PgPool, year: i32) -> Result<Vec<MonthlyCategoryTotal>> {
    let rows = sqlx::query_as::<_, MonthlyCategoryTotalRow>(
        r#"
        SELECT
            month,
            category,
            SUM(reading)::BIGINT                              AS total_kwh,
            COUNT(*) FILTER (WHERE is_exceeded)               AS exceeded_count
        FROM energy_readings
        WHERE year = $1
        GROUP BY month, category
        "#,
    )
    .bind(year)
    .fetch_all(pool)
    .await?;

    // Month names do not sort in calendar order in SQL, so order here.
    let mut totals = rows
        .into_iter()
        .map(|r| -> Result<MonthlyCategoryTotal> {
            Ok(MonthlyCategoryTotal {
                month: r.month.parse()?,
                category: r.category.parse()?,
                total_kwh: r.total_kwh,
                exceeded_count: r.exceeded_count,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    totals.sort_by_key(|t| (t.month, t.category));

    Ok(totals)
}

/// Total kWh per floor for a year.
pub async fn floor_totals(pool: &PgPool, year: i32) -> Result<Vec<FloorTotal>> {
    let rows = sqlx::query_as::<_, FloorTotal>(
        r#"
        SELECT
            floor,
            SUM(reading)::BIGINT AS total_kwh
        FROM energy_readings
        WHERE year = $1
        GROUP BY floor
        ORDER BY floor
        "#,
    )
    .bind(year)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Orders readings year → month → floor → category.
pub fn sort_readings(readings: &mut [EnergyReading]) {
    readings.sort_by_key(|r| (r.year, r.month, r.floor, r.category));
}
