use super::{Category, DomainError, Month};

/// Readings strictly above this value are flagged as exceeded.
pub const EXCEEDED_THRESHOLD_KWH: u32 = 3500;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EnergyReading {
    pub year: i32,
    pub month: Month,
    pub floor: u8,
    pub category: Category,
    /// kWh
    pub reading: u32,
    pub is_exceeded: bool,
}

impl EnergyReading {
    pub fn new(year: i32, month: Month, floor: u8, category: Category, reading: u32) -> Self {
        Self {
            year,
            month,
            floor,
            category,
            reading,
            is_exceeded: reading > EXCEEDED_THRESHOLD_KWH,
        }
    }
}

/// Row shape of the `energy_readings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EnergyReadingRow {
    pub year: i32,
    pub month: String,
    pub floor: i32,
    pub category: String,
    pub reading: i64,
    pub is_exceeded: bool,
}

impl TryFrom<EnergyReadingRow> for EnergyReading {
    type Error = DomainError;

    fn try_from(row: EnergyReadingRow) -> Result<Self, Self::Error> {
        let floor = u8::try_from(row.floor)
            .ok()
            .filter(|f| (1..=5).contains(f))
            .ok_or(DomainError::FloorOutOfRange(row.floor))?;
        let reading = u32::try_from(row.reading).map_err(|_| DomainError::ReadingOutOfRange(row.reading))?;

        Ok(EnergyReading {
            year: row.year,
            month: row.month.parse()?,
            floor,
            category: row.category.parse()?,
            reading,
            is_exceeded: row.is_exceeded,
        })
    }
}
