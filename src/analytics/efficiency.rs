use crate::analytics::types::{AggregateStats, EfficiencyPoint, EfficiencyReport};
use crate::analytics::utility::{deviates, extremes, mean, stddev};
use crate::config::EfficiencyPolicy;
use crate::record::RefuelRecord;

/// Computes per-pair efficiency and vehicle aggregates with the default policy.
///
/// See [`compute_efficiency_with`].
pub fn compute_efficiency(records: &[RefuelRecord]) -> EfficiencyReport {
    compute_efficiency_with(records, &EfficiencyPolicy::default())
}

/// Computes per-pair efficiency and vehicle aggregates for one vehicle.
///
/// Records are ordered by `refuel_date` with a stable sort, so same-timestamp
/// refuels keep their input order. Each consecutive pair yields one
/// [`EfficiencyPoint`]; only points inside the policy's plausible range feed
/// the average, best/worst and anomaly figures. Volume and cost totals always
/// cover every record.
pub fn compute_efficiency_with(
    records: &[RefuelRecord],
    policy: &EfficiencyPolicy,
) -> EfficiencyReport {
    let mut sorted: Vec<&RefuelRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.refuel_date);

    let points: Vec<EfficiencyPoint> = sorted
        .windows(2)
        .enumerate()
        .map(|(i, pair)| efficiency_point(i + 1, pair[0], pair[1], policy))
        .collect();

    let stats = aggregate(&sorted, &points, policy);

    EfficiencyReport { points, stats }
}

fn efficiency_point(
    position: usize,
    previous: &RefuelRecord,
    current: &RefuelRecord,
    policy: &EfficiencyPolicy,
) -> EfficiencyPoint {
    let distance_km = match (previous.odometer_km, current.odometer_km) {
        // Readings beyond i64 cannot form a signed distance.
        (Some(before), Some(after)) => i64::try_from(before)
            .ok()
            .zip(i64::try_from(after).ok())
            .and_then(|(before, after)| after.checked_sub(before)),
        _ => None,
    };

    let km_per_liter = distance_km
        .filter(|_| current.volume_liters > 0.0)
        .map(|d| d as f64 / current.volume_liters);

    let valid = km_per_liter.is_some_and(|v| policy.is_plausible(v));

    EfficiencyPoint {
        position,
        refuel_date: current.refuel_date,
        volume_liters: current.volume_liters,
        odometer_km: current.odometer_km,
        distance_km,
        km_per_liter,
        valid,
    }
}

fn aggregate(
    sorted: &[&RefuelRecord],
    points: &[EfficiencyPoint],
    policy: &EfficiencyPolicy,
) -> AggregateStats {
    let total_liters: f64 = sorted.iter().map(|r| r.volume_liters).sum();
    let total_cost: f64 = sorted.iter().map(|r| r.cost).sum();
    let avg_cost_per_liter = if total_liters > 0.0 {
        total_cost / total_liters
    } else {
        0.0
    };

    let efficiencies: Vec<f64> = points
        .iter()
        .filter_map(EfficiencyPoint::valid_km_per_liter)
        .collect();

    let avg_km_per_liter = mean(&efficiencies);
    let (worst_km_per_liter, best_km_per_liter) = extremes(&efficiencies);

    // A spread needs at least two values.
    let anomalies = if efficiencies.len() < 2 {
        Vec::new()
    } else {
        let sd = stddev(&efficiencies, avg_km_per_liter);
        points
            .iter()
            .filter(|p| {
                p.valid_km_per_liter()
                    .is_some_and(|v| deviates(v, avg_km_per_liter, sd, policy.anomaly_sigma))
            })
            .cloned()
            .collect()
    };

    AggregateStats {
        refuel_count: sorted.len(),
        total_liters,
        total_cost,
        avg_cost_per_liter,
        avg_km_per_liter,
        best_km_per_liter,
        worst_km_per_liter,
        total_distance_km: total_distance(sorted),
        anomalies,
        last_refuel_date: sorted.last().map(|r| r.refuel_date),
    }
}

/// Last present odometer minus the first one; 0 if that runs backwards.
fn total_distance(sorted: &[&RefuelRecord]) -> u64 {
    let mut odometers = sorted.iter().filter_map(|r| r.odometer_km);
    let Some(first) = odometers.next() else {
        return 0;
    };
    let last = odometers.last().unwrap_or(first);
    last.saturating_sub(first)
}
