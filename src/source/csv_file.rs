use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

use super::RecordSource;
use crate::record::RefuelRecord;

/// Reads refuel records from a CSV file with `fuel_logs` column headers.
///
/// The file is re-read on every call so edits between commands are picked up.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parses and validates CSV rows from any reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<RefuelRecord>> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut rows = Vec::new();

        for (line, result) in rdr.deserialize().enumerate() {
            let record: RefuelRecord =
                result.with_context(|| format!("malformed row {}", line + 1))?;
            record
                .validate()
                .with_context(|| format!("invalid row {}", line + 1))?;
            rows.push(record);
        }

        Ok(rows)
    }

    fn load(&self) -> Result<Vec<RefuelRecord>> {
        let file = File::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        let rows = Self::parse(file).with_context(|| format!("in {}", self.path.display()))?;
        debug!(path = %self.path.display(), rows = rows.len(), "Loaded refuel CSV");
        Ok(rows)
    }
}

#[async_trait]
impl RecordSource for CsvSource {
    async fn fetch_vehicle(&self, vehicle_id: &str) -> Result<Vec<RefuelRecord>> {
        let rows = self.load()?;
        Ok(rows
            .into_iter()
            .filter(|r| r.vehicle_id == vehicle_id)
            .collect())
    }

    async fn fetch_all(&self) -> Result<Vec<RefuelRecord>> {
        self.load()
    }
}
