use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use energy_client::domain::EnergyReading;

use crate::pipeline::{EnergySink, SeedError};

/// CSV export of the dataset.
///
/// Header columns: year, month, floor, category, reading, isExceeded.
/// Every write goes to a `.tmp` sibling that is renamed over the target, so
/// readers see either the previous file or the complete new one.
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Reads back the stored dataset; a missing file is an empty dataset.
    pub fn read_all(&self) -> Result<Vec<EnergyReading>, SeedError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SeedError::Storage(format!("failed to open CSV file: {e}"))),
        };

        csv::Reader::from_reader(file)
            .deserialize()
            .collect::<Result<Vec<EnergyReading>, _>>()
            .map_err(|e| SeedError::Storage(format!("failed to read CSV record: {e}")))
    }

    fn write_atomically<'a, I>(&self, records: I) -> Result<(), SeedError>
    where
        I: IntoIterator<Item = &'a EnergyReading>,
    {
        let tmp = self.tmp_path();
        let res = write_csv(&tmp, records).and_then(|()| {
            fs::rename(&tmp, &self.path).map_err(|e| SeedError::Storage(format!("failed to replace CSV file: {e}")))
        });

        if res.is_err() {
            let _ = fs::remove_file(&tmp);
            metrics::counter!("energy_seeder_sink_errors_total").increment(1);
        }
        res
    }
}

fn write_csv<'a, I>(path: &Path, records: I) -> Result<(), SeedError>
where
    I: IntoIterator<Item = &'a EnergyReading>,
{
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| SeedError::Storage(format!("failed to create CSV file: {e}")))?;
    for r in records {
        wtr.serialize(r)
            .map_err(|e| SeedError::Storage(format!("failed to write CSV record: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| SeedError::Storage(format!("failed to flush CSV file: {e}")))
}

// File I/O here is blocking; datasets are a few hundred rows.
#[async_trait::async_trait]
impl EnergySink for CsvFileSink {
    async fn clear_all(&self) -> Result<(), SeedError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SeedError::Storage(format!("failed to remove CSV file: {e}"))),
        }
    }

    async fn bulk_insert(&self, records: &[EnergyReading]) -> Result<(), SeedError> {
        let existing = self.read_all()?;
        self.write_atomically(existing.iter().chain(records))?;
        metrics::counter!("energy_seeder_records_inserted_total").increment(records.len() as u64);
        Ok(())
    }

    async fn replace_all(&self, records: &[EnergyReading]) -> Result<(), SeedError> {
        self.write_atomically(records)?;
        tracing::info!(path = %self.path.display(), inserted = records.len(), "wrote energy readings CSV");
        metrics::counter!("energy_seeder_records_inserted_total").increment(records.len() as u64);
        Ok(())
    }
}
