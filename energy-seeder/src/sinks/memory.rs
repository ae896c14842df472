use std::sync::{Mutex, MutexGuard};

use energy_client::domain::EnergyReading;

use crate::pipeline::{EnergySink, SeedError};

/// In-process store, used for dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<EnergyReading>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Result<Vec<EnergyReading>, SeedError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<EnergyReading>>, SeedError> {
        self.records
            .lock()
            .map_err(|_| SeedError::Storage("memory sink lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl EnergySink for MemorySink {
    async fn clear_all(&self) -> Result<(), SeedError> {
        self.lock()?.clear();
        Ok(())
    }

    async fn bulk_insert(&self, records: &[EnergyReading]) -> Result<(), SeedError> {
        self.lock()?.extend_from_slice(records);
        Ok(())
    }

    async fn replace_all(&self, records: &[EnergyReading]) -> Result<(), SeedError> {
        let mut guard = self.lock()?;
        guard.clear();
        guard.extend_from_slice(records);
        Ok(())
    }
}
