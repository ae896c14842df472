use energy_client::domain::{DomainError, EnergyReading};

#[derive(thiserror::Error, Debug)]
pub enum SeedError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid category '{0}'")]
    InvalidCategory(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("config error: {0}")]
    Config(String),
}

impl From<DomainError> for SeedError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidCategory(name) => SeedError::InvalidCategory(name),
            other => SeedError::Validation(other.to_string()),
        }
    }
}

/// Destination for a generated dataset.
///
/// Connection setup happens in each sink's constructor, before either
/// operation can be called.
#[async_trait::async_trait]
pub trait EnergySink: Send + Sync {
    /// Remove every previously stored reading.
    async fn clear_all(&self) -> Result<(), SeedError>;

    /// Store `records` as one batch.
    async fn bulk_insert(&self, records: &[EnergyReading]) -> Result<(), SeedError>;

    /// Replace the stored dataset with `records`.
    ///
    /// The default clears then inserts in two steps; sinks that can swap the
    /// dataset atomically override this.
    async fn replace_all(&self, records: &[EnergyReading]) -> Result<(), SeedError> {
        self.clear_all().await?;
        self.bulk_insert(records).await
    }
}
