use crate::analytics::types::MonthlyRollup;
use crate::analytics::utility::mean;
use crate::config::EfficiencyPolicy;
use crate::record::RefuelRecord;
use chrono::Datelike;
use std::collections::BTreeMap;

/// Buckets records by calendar month, keeping the 12 most recent months.
pub fn compute_monthly_rollup(records: &[RefuelRecord]) -> Vec<MonthlyRollup> {
    compute_monthly_rollup_with(records, &EfficiencyPolicy::default())
}

/// Buckets records by the `(year, month)` of their stored date and sums cost,
/// volume and count per bucket.
///
/// Buckets come back oldest first. When more than `policy.rollup_months`
/// months are present the oldest are dropped.
pub fn compute_monthly_rollup_with(
    records: &[RefuelRecord],
    policy: &EfficiencyPolicy,
) -> Vec<MonthlyRollup> {
    let buckets = bucket_by_month(records);
    let skip = buckets.len().saturating_sub(policy.rollup_months);

    buckets.into_values().skip(skip).collect()
}

/// Mean of the per-month cost over every month that has a record.
pub fn average_monthly_cost(records: &[RefuelRecord]) -> f64 {
    let monthly_costs: Vec<f64> = bucket_by_month(records)
        .into_values()
        .map(|b| b.total_cost)
        .collect();
    mean(&monthly_costs)
}

fn bucket_by_month(records: &[RefuelRecord]) -> BTreeMap<(i32, u32), MonthlyRollup> {
    let mut buckets: BTreeMap<(i32, u32), MonthlyRollup> = BTreeMap::new();

    for record in records {
        let (year, month) = (record.refuel_date.year(), record.refuel_date.month());
        let bucket = buckets.entry((year, month)).or_insert(MonthlyRollup {
            year,
            month,
            total_cost: 0.0,
            total_liters: 0.0,
            refuel_count: 0,
        });

        bucket.total_cost += record.cost;
        bucket.total_liters += record.volume_liters;
        bucket.refuel_count += 1;
    }

    buckets
}
