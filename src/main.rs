//! CLI entry point for the fleet fuel reporting tool.
//!
//! Loads refuel records from a CSV export or the hosted `fuel_logs` table and
//! produces efficiency reports, monthly rollups, CSV exports and fleet
//! summaries.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use fleet_fuel::analytics::fleet::summarize_fleet;
use fleet_fuel::analytics::types::{EfficiencyReport, MonthlyRollup};
use fleet_fuel::analytics::{
    average_monthly_cost, compute_efficiency_with, compute_monthly_rollup_with,
};
use fleet_fuel::config::{EfficiencyPolicy, RestConfig};
use fleet_fuel::output::{export_csv_file, log_report, print_json, write_json};
use fleet_fuel::record::{RefuelRecord, filter_by_date, validate_single_vehicle};
use fleet_fuel::source::{CsvSource, RecordSource, RestSource};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fleet_fuel")]
#[command(about = "Fuel efficiency and cost reporting for a vehicle fleet", long_about = None)]
struct Cli {
    /// Read records from this CSV file instead of the hosted datastore
    #[arg(short, long, global = true, value_name = "CSV")]
    input: Option<String>,

    /// JSON file overriding the efficiency policy
    #[arg(short, long, global = true, value_name = "JSON")]
    policy: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Inclusive date window applied to the loaded records.
#[derive(Args)]
struct DateRange {
    /// Ignore refuels before this date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Ignore refuels after this date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Efficiency statistics, anomalies and monthly costs for one vehicle
    Report {
        /// Vehicle identifier
        #[arg(value_name = "VEHICLE_ID")]
        vehicle: String,

        #[command(flatten)]
        range: DateRange,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Monthly cost and volume rollup
    Monthly {
        /// Restrict to one vehicle (default: whole fleet)
        #[arg(short, long)]
        vehicle: Option<String>,

        #[command(flatten)]
        range: DateRange,

        /// Write the JSON rollup here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Export refuel records to a quoted CSV file
    Export {
        /// Restrict to one vehicle (default: whole fleet)
        #[arg(short, long)]
        vehicle: Option<String>,

        #[command(flatten)]
        range: DateRange,

        /// Output file (default: fuel-logs-<today>.csv)
        #[arg(short, long)]
        output: Option<String>,

        /// Gzip compress the CSV
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Per-vehicle summary across the fleet
    Fleet {
        #[command(flatten)]
        range: DateRange,

        /// Write the JSON summary here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Serialize)]
struct VehicleReport {
    vehicle_id: String,
    #[serde(flatten)]
    efficiency: EfficiencyReport,
    monthly: Vec<MonthlyRollup>,
    avg_monthly_cost: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/fleet_fuel.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("fleet_fuel.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let policy = match &cli.policy {
        Some(path) => EfficiencyPolicy::load(path)?,
        None => EfficiencyPolicy::default(),
    };
    let source = open_source(cli.input.as_deref())?;

    match cli.command {
        Commands::Report {
            vehicle,
            range,
            output,
        } => {
            let records = load(source.as_ref(), Some(vehicle.as_str()), &range).await?;
            validate_single_vehicle(&records)?;

            let efficiency = compute_efficiency_with(&records, &policy);
            log_report(&vehicle, &efficiency);

            let report = VehicleReport {
                vehicle_id: vehicle,
                efficiency,
                monthly: compute_monthly_rollup_with(&records, &policy),
                avg_monthly_cost: average_monthly_cost(&records),
            };
            emit(output.as_deref(), &report)?;
        }
        Commands::Monthly {
            vehicle,
            range,
            output,
        } => {
            let records = load(source.as_ref(), vehicle.as_deref(), &range).await?;
            let rollup = compute_monthly_rollup_with(&records, &policy);

            for bucket in &rollup {
                info!(
                    month = %bucket.label(),
                    total_cost = bucket.total_cost,
                    total_liters = bucket.total_liters,
                    refuels = bucket.refuel_count,
                    "Monthly rollup"
                );
            }
            emit(output.as_deref(), &rollup)?;
        }
        Commands::Export {
            vehicle,
            range,
            output,
            gzip,
        } => {
            let records = load(source.as_ref(), vehicle.as_deref(), &range).await?;
            let path = output.unwrap_or_else(|| {
                format!("fuel-logs-{}.csv", Utc::now().format("%Y-%m-%d"))
            });
            export_csv_file(&path, &records, &policy, gzip)?;
        }
        Commands::Fleet { range, output } => {
            let records = load(source.as_ref(), None, &range).await?;
            let summary = summarize_fleet(&records, &policy);

            for v in &summary.vehicles {
                info!(
                    vehicle_id = %v.vehicle_id,
                    refuels = v.refuel_count,
                    total_cost = v.total_cost,
                    avg_km_per_liter = v.avg_km_per_liter,
                    anomalies = v.anomaly_count,
                    "Vehicle"
                );
            }
            info!(vehicles = summary.vehicles.len(), "Fleet summary");
            emit(output.as_deref(), &summary)?;
        }
    }

    Ok(())
}

/// Picks the CSV source when a file is given, otherwise the hosted datastore.
fn open_source(input: Option<&str>) -> Result<Box<dyn RecordSource>> {
    match input {
        Some(path) => {
            info!(path, "Reading refuel records from CSV");
            Ok(Box::new(CsvSource::new(path)))
        }
        None => {
            let config = RestConfig::from_env()?;
            info!(base_url = %config.base_url, "Reading refuel records from datastore");
            Ok(Box::new(RestSource::connect(&config)?))
        }
    }
}

/// Fetches records for one vehicle or the whole fleet and applies the date window.
#[tracing::instrument(skip(source, range))]
async fn load(
    source: &dyn RecordSource,
    vehicle: Option<&str>,
    range: &DateRange,
) -> Result<Vec<RefuelRecord>> {
    let records = match vehicle {
        Some(id) => source.fetch_vehicle(id).await?,
        None => source.fetch_all().await?,
    };

    let filtered = filter_by_date(&records, range.from, range.to);
    if filtered.is_empty() {
        warn!(fetched = records.len(), "No refuel records in range");
    }
    Ok(filtered)
}

fn emit(output: Option<&str>, value: &impl Serialize) -> Result<()> {
    match output {
        Some(path) => write_json(path, value),
        None => print_json(value),
    }
}
