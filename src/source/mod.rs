//! Where refuel records come from.
//!
//! [`RecordSource`] is the async seam between the reporting commands and the
//! persistence layer. [`CsvSource`] reads an exported file, [`RestSource`]
//! queries the hosted `fuel_logs` table. Both validate every record before
//! handing it out.

mod csv_file;
mod rest;

pub use csv_file::CsvSource;
pub use rest::RestSource;

use anyhow::Result;

use crate::record::RefuelRecord;

#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Returns every refuel record of `vehicle_id`, in no particular order.
    async fn fetch_vehicle(&self, vehicle_id: &str) -> Result<Vec<RefuelRecord>>;

    /// Returns every refuel record the source knows about.
    async fn fetch_all(&self) -> Result<Vec<RefuelRecord>>;
}
