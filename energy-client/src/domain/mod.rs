pub mod category;
pub mod energy_reading;
pub mod month;

pub use category::Category;
pub use energy_reading::{EnergyReading, EnergyReadingRow, EXCEEDED_THRESHOLD_KWH};
pub use month::Month;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid category '{0}'")]
    InvalidCategory(String),
    #[error("invalid month '{0}'")]
    InvalidMonth(String),
    #[error("floor {0} out of range 1..=5")]
    FloorOutOfRange(i32),
    #[error("reading {0} out of range")]
    ReadingOutOfRange(i64),
}
