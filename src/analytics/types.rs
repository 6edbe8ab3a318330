//! Data types produced by the efficiency and rollup computations.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

/// Distance-per-volume figure for the later record of a consecutive pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyPoint {
    /// Index of the later record in the date-sorted sequence.
    pub position: usize,
    pub refuel_date: NaiveDateTime,
    pub volume_liters: f64,
    pub odometer_km: Option<u64>,
    pub distance_km: Option<i64>,
    pub km_per_liter: Option<f64>,
    /// Whether `km_per_liter` falls inside the plausible range and counts
    /// toward statistics.
    pub valid: bool,
}

impl EfficiencyPoint {
    /// The efficiency value if it is usable for statistics.
    pub fn valid_km_per_liter(&self) -> Option<f64> {
        if self.valid { self.km_per_liter } else { None }
    }
}

/// Vehicle-level figures over a record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateStats {
    pub refuel_count: usize,
    pub total_liters: f64,
    pub total_cost: f64,
    pub avg_cost_per_liter: f64,

    pub avg_km_per_liter: f64,
    pub best_km_per_liter: f64,
    pub worst_km_per_liter: f64,
    pub total_distance_km: u64,

    pub anomalies: Vec<EfficiencyPoint>,
    pub last_refuel_date: Option<NaiveDateTime>,
}

/// Result of [`compute_efficiency`](super::efficiency::compute_efficiency).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EfficiencyReport {
    pub points: Vec<EfficiencyPoint>,
    pub stats: AggregateStats,
}

/// Cost and volume totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRollup {
    pub year: i32,
    pub month: u32,
    pub total_cost: f64,
    pub total_liters: f64,
    pub refuel_count: usize,
}

impl MonthlyRollup {
    /// `YYYY-MM` key for the bucket.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Headline figures for one vehicle in a fleet summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSummary {
    pub vehicle_id: String,
    pub refuel_count: usize,
    pub total_liters: f64,
    pub total_cost: f64,
    pub avg_km_per_liter: f64,
    pub total_distance_km: u64,
    pub anomaly_count: usize,
}

/// Per-vehicle summaries for a whole record set.
#[derive(Debug, Clone, Serialize)]
pub struct FleetSummary {
    pub generated_at: DateTime<Utc>,
    pub vehicles: Vec<VehicleSummary>,
}
