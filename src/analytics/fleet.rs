use crate::analytics::efficiency::compute_efficiency_with;
use crate::analytics::types::{FleetSummary, VehicleSummary};
use crate::config::EfficiencyPolicy;
use crate::record::RefuelRecord;
use chrono::Utc;
use std::collections::BTreeMap;

/// Splits a mixed record set by vehicle id, ordered by id.
pub fn group_by_vehicle(records: &[RefuelRecord]) -> BTreeMap<&str, Vec<RefuelRecord>> {
    let mut groups: BTreeMap<&str, Vec<RefuelRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.vehicle_id.as_str())
            .or_default()
            .push(record.clone());
    }
    groups
}

/// Runs the efficiency computation per vehicle and collects the headline
/// figures of each.
pub fn summarize_fleet(records: &[RefuelRecord], policy: &EfficiencyPolicy) -> FleetSummary {
    let vehicles = group_by_vehicle(records)
        .into_iter()
        .map(|(vehicle_id, rows)| {
            let stats = compute_efficiency_with(&rows, policy).stats;
            VehicleSummary {
                vehicle_id: vehicle_id.to_string(),
                refuel_count: stats.refuel_count,
                total_liters: stats.total_liters,
                total_cost: stats.total_cost,
                avg_km_per_liter: stats.avg_km_per_liter,
                total_distance_km: stats.total_distance_km,
                anomaly_count: stats.anomalies.len(),
            }
        })
        .collect();

    FleetSummary {
        generated_at: Utc::now(),
        vehicles,
    }
}
