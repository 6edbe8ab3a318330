//! Output of computed reports: logging, JSON and CSV export.
//!
//! The CSV export quotes every field and lists records newest first, with the
//! km/L of each record taken from its vehicle's efficiency sequence.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use csv::{QuoteStyle, WriterBuilder};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{debug, info, warn};

use crate::analytics::band::band;
use crate::analytics::compute_efficiency_with;
use crate::analytics::fleet::group_by_vehicle;
use crate::analytics::types::{EfficiencyPoint, EfficiencyReport};
use crate::config::EfficiencyPolicy;
use crate::record::RefuelRecord;

/// Logs a vehicle report: a summary line, one warning per anomaly and the
/// full structure at debug level.
pub fn log_report(vehicle_id: &str, report: &EfficiencyReport) {
    let s = &report.stats;
    info!(
        vehicle_id,
        refuels = s.refuel_count,
        total_liters = s.total_liters,
        total_cost = s.total_cost,
        avg_km_per_liter = s.avg_km_per_liter,
        best_km_per_liter = s.best_km_per_liter,
        worst_km_per_liter = s.worst_km_per_liter,
        total_distance_km = s.total_distance_km,
        "Efficiency summary"
    );

    for anomaly in &s.anomalies {
        warn!(
            vehicle_id,
            date = %anomaly.refuel_date.date(),
            km_per_liter = anomaly.km_per_liter.unwrap_or_default(),
            band = band(anomaly, s.avg_km_per_liter).as_str(),
            "Consumption anomaly"
        );
    }

    debug!("{:#?}", report);
}

/// Writes a value as pretty-printed JSON to stdout.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Writes a value as pretty-printed JSON to `path`.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    info!(path, "JSON report written");
    Ok(())
}

#[derive(Debug, Serialize)]
struct ExportRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Vehicle")]
    vehicle: String,
    #[serde(rename = "Station")]
    station: String,
    #[serde(rename = "Litres")]
    litres: String,
    #[serde(rename = "Cost")]
    cost: String,
    #[serde(rename = "Cost/Litre")]
    cost_per_litre: String,
    #[serde(rename = "Odometer (km)")]
    odometer: String,
    #[serde(rename = "Driver")]
    driver: String,
    #[serde(rename = "Km/Litre")]
    km_per_litre: String,
    #[serde(rename = "Efficiency")]
    efficiency: String,
}

fn export_rows(
    records: &[RefuelRecord],
    policy: &EfficiencyPolicy,
) -> Vec<(NaiveDateTime, ExportRow)> {
    let mut rows = Vec::with_capacity(records.len());

    for (vehicle_id, mut vehicle_records) in group_by_vehicle(records) {
        let report = compute_efficiency_with(&vehicle_records, policy);
        let avg = report.stats.avg_km_per_liter;

        // Same stable order the engine used, so index i pairs with points[i - 1].
        vehicle_records.sort_by_key(|r| r.refuel_date);

        for (i, record) in vehicle_records.into_iter().enumerate() {
            let point: Option<&EfficiencyPoint> =
                i.checked_sub(1).and_then(|p| report.points.get(p));
            let row = ExportRow {
                date: record.refuel_date.format("%Y-%m-%d").to_string(),
                vehicle: vehicle_id.to_string(),
                station: record.station_name.clone().unwrap_or_else(|| "-".into()),
                litres: format!("{:.2}", record.volume_liters),
                cost: format!("{:.2}", record.cost),
                cost_per_litre: format!("{:.2}", record.cost_per_liter()),
                odometer: record
                    .odometer_km
                    .map_or_else(|| "-".into(), |km| km.to_string()),
                driver: record.driver_id.clone().unwrap_or_else(|| "-".into()),
                km_per_litre: point
                    .and_then(EfficiencyPoint::valid_km_per_liter)
                    .map_or_else(|| "N/A".into(), |v| format!("{v:.2}")),
                efficiency: point
                    .map_or("-", |p| band(p, avg).as_str())
                    .to_string(),
            };
            rows.push((record.refuel_date, row));
        }
    }

    // Newest first; the sort is stable so same-day rows keep vehicle order.
    rows.sort_by(|(a, _), (b, _)| b.cmp(a));
    rows
}

/// Writes records as quoted CSV to any writer. Returns the number of rows.
pub fn export_csv<W: Write>(
    writer: W,
    records: &[RefuelRecord],
    policy: &EfficiencyPolicy,
) -> Result<usize> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    let rows = export_rows(records, policy);
    for (_, row) in &rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    Ok(rows.len())
}

/// Exports records to `path`, gzip-compressed when `gzip` is set or the path
/// ends in `.gz`.
pub fn export_csv_file(
    path: &str,
    records: &[RefuelRecord],
    policy: &EfficiencyPolicy,
    gzip: bool,
) -> Result<usize> {
    if records.is_empty() {
        anyhow::bail!("no fuel logs to export");
    }

    let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
    let gzip = gzip || path.ends_with(".gz");

    let count = if gzip {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        let count = export_csv(&mut encoder, records, policy)?;
        encoder.finish()?.flush()?;
        count
    } else {
        let mut writer = BufWriter::new(file);
        let count = export_csv(&mut writer, records, policy)?;
        writer.flush()?;
        count
    };

    info!(path, rows = count, gzip, "CSV export written");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use flate2::read::GzDecoder;
    use std::env;
    use std::fs;
    use std::io::Read;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn record(vehicle: &str, m: u32, d: u32, liters: f64, odometer: Option<u64>) -> RefuelRecord {
        let date = NaiveDate::from_ymd_opt(2024, m, d)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let r = RefuelRecord::new(vehicle, liters, liters * 2.0, date);
        match odometer {
            Some(km) => r.with_odometer(km),
            None => r,
        }
    }

    fn sample() -> Vec<RefuelRecord> {
        vec![
            record("v1", 1, 1, 10.0, Some(1000)).with_station("North"),
            record("v1", 1, 15, 30.0, Some(1300)).with_driver("d7"),
            record("v1", 2, 1, 25.0, Some(1600)),
        ]
    }

    fn export_to_string(records: &[RefuelRecord]) -> String {
        let mut buf = Vec::new();
        export_csv(&mut buf, records, &EfficiencyPolicy::default()).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_log_report_does_not_panic() {
        let report = compute_efficiency_with(&sample(), &EfficiencyPolicy::default());
        log_report("v1", &report);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        let report = compute_efficiency_with(&sample(), &EfficiencyPolicy::default());
        print_json(&report).unwrap();
    }

    #[test]
    fn test_export_quotes_every_field() {
        let content = export_to_string(&sample());
        let lines: Vec<_> = content.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("\"Date\",\"Vehicle\",\"Station\""));
        assert!(lines.iter().all(|l| l.starts_with('"') && l.ends_with('"')));
    }

    #[test]
    fn test_export_newest_first_with_efficiency() {
        let content = export_to_string(&sample());
        let lines: Vec<_> = content.lines().collect();

        assert!(lines[1].starts_with("\"2024-02-01\""));
        assert!(lines[1].contains("\"12.00\""));
        assert!(lines[2].contains("\"10.00\""));
        assert!(lines[2].contains("\"d7\""));
        // Oldest record has no predecessor.
        assert!(lines[3].contains("\"N/A\""));
        assert!(lines[3].contains("\"North\""));
        assert!(lines[3].contains("\"1000\""));
    }

    #[test]
    fn test_export_missing_values_render_dash() {
        let content = export_to_string(&[record("v9", 3, 3, 5.0, None)]);
        let row = content.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "\"2024-03-03\",\"v9\",\"-\",\"5.00\",\"10.00\",\"2.00\",\"-\",\"-\",\"N/A\",\"-\""
        );
    }

    #[test]
    fn test_export_file_refuses_empty_input() {
        let path = temp_path("fleet_fuel_test_empty.csv");
        assert!(export_csv_file(&path, &[], &EfficiencyPolicy::default(), false).is_err());
    }

    #[test]
    fn test_export_gzip_round_trip() {
        let path = temp_path("fleet_fuel_test_export.csv.gz");
        let _ = fs::remove_file(&path);

        let count = export_csv_file(&path, &sample(), &EfficiencyPolicy::default(), false).unwrap();
        assert_eq!(count, 3);

        let mut content = String::new();
        GzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content.lines().count(), 4);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json_creates_file() {
        let path = temp_path("fleet_fuel_test_report.json");
        let _ = fs::remove_file(&path);

        let report = compute_efficiency_with(&sample(), &EfficiencyPolicy::default());
        write_json(&path, &report).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("avg_km_per_liter"));

        fs::remove_file(&path).unwrap();
    }
}
