//! Fuel efficiency and cost reporting.
//!
//! Pure computations over in-memory refuel records: per-pair km/L, vehicle
//! aggregates with outlier flags, monthly cost rollups and fleet summaries.
//! Nothing in here performs I/O or keeps state between calls.

pub mod band;
pub mod efficiency;
pub mod fleet;
pub mod rollup;
pub mod types;
pub mod utility;

pub use efficiency::{compute_efficiency, compute_efficiency_with};
pub use rollup::{average_monthly_cost, compute_monthly_rollup, compute_monthly_rollup_with};
