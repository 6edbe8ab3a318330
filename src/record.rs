//! Refuel records as they arrive from the datastore or a CSV file.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RecordError, Result};

/// One fueling event for a vehicle.
///
/// Column names follow the `fuel_logs` table, so the same struct reads REST
/// rows and exported CSV files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefuelRecord {
    pub vehicle_id: String,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(rename = "litres")]
    pub volume_liters: f64,
    pub cost: f64,
    #[serde(rename = "odometer", default)]
    pub odometer_km: Option<u64>,
    #[serde(default)]
    pub station_name: Option<String>,
    #[serde(deserialize_with = "deserialize_refuel_date")]
    pub refuel_date: NaiveDateTime,
}

impl RefuelRecord {
    pub fn new(
        vehicle_id: &str,
        volume_liters: f64,
        cost: f64,
        refuel_date: NaiveDateTime,
    ) -> Self {
        RefuelRecord {
            vehicle_id: vehicle_id.to_string(),
            driver_id: None,
            volume_liters,
            cost,
            odometer_km: None,
            station_name: None,
            refuel_date,
        }
    }

    pub fn with_odometer(mut self, odometer_km: u64) -> Self {
        self.odometer_km = Some(odometer_km);
        self
    }

    pub fn with_driver(mut self, driver_id: &str) -> Self {
        self.driver_id = Some(driver_id.to_string());
        self
    }

    pub fn with_station(mut self, station_name: &str) -> Self {
        self.station_name = Some(station_name.to_string());
        self
    }

    /// Price paid per litre, 0.0 when no volume was recorded.
    pub fn cost_per_liter(&self) -> f64 {
        if self.volume_liters > 0.0 {
            self.cost / self.volume_liters
        } else {
            0.0
        }
    }

    /// Rejects values that cannot describe a refuel.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] for an empty vehicle id or a negative,
    /// infinite or NaN volume/cost. A zero volume is accepted.
    pub fn validate(&self) -> Result<()> {
        if self.vehicle_id.trim().is_empty() {
            return Err(RecordError::MissingVehicleId);
        }
        if !self.volume_liters.is_finite() || self.volume_liters < 0.0 {
            return Err(RecordError::InvalidVolume {
                vehicle_id: self.vehicle_id.clone(),
                value: self.volume_liters,
            });
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(RecordError::InvalidCost {
                vehicle_id: self.vehicle_id.clone(),
                value: self.cost,
            });
        }
        Ok(())
    }
}

/// Validates every record and checks they all belong to the same vehicle.
pub fn validate_single_vehicle(records: &[RefuelRecord]) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };

    for record in records {
        record.validate()?;
        if record.vehicle_id != first.vehicle_id {
            return Err(RecordError::MixedVehicles {
                expected: first.vehicle_id.clone(),
                found: record.vehicle_id.clone(),
            });
        }
    }

    Ok(())
}

/// Keeps records whose calendar date lies within the inclusive bounds.
pub fn filter_by_date(
    records: &[RefuelRecord],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<RefuelRecord> {
    records
        .iter()
        .filter(|r| {
            let day = r.refuel_date.date();
            from.is_none_or(|f| day >= f) && to.is_none_or(|t| day <= t)
        })
        .cloned()
        .collect()
}

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a stored refuel date, keeping its wall-clock fields.
///
/// Offsets are dropped rather than converted: a row stamped
/// `2024-03-31T23:30:00+02:00` stays in March.
pub fn parse_refuel_date(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Ok(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(day.and_time(NaiveTime::MIN));
    }

    Err(RecordError::InvalidDate(raw.to_string()))
}

fn deserialize_refuel_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_refuel_date(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_parse_date_only() {
        assert_eq!(parse_refuel_date("2024-01-15").unwrap(), day(2024, 1, 15));
    }

    #[test]
    fn test_parse_naive_datetime_forms() {
        let t = parse_refuel_date("2024-01-15T08:30:00").unwrap();
        assert_eq!(t.hour(), 8);
        let t = parse_refuel_date("2024-01-15 08:30:00.250").unwrap();
        assert_eq!(t.minute(), 30);
    }

    #[test]
    fn test_parse_keeps_local_fields_of_offset_timestamps() {
        let t = parse_refuel_date("2024-03-31T23:30:00+02:00").unwrap();
        assert_eq!(t.month(), 3);
        assert_eq!(t.day(), 31);
        assert_eq!(t.hour(), 23);

        let t = parse_refuel_date("2024-03-31 23:30:00+00").unwrap();
        assert_eq!(t.day(), 31);
    }

    #[test]
    fn test_parse_garbage_date() {
        let err = parse_refuel_date("yesterday").unwrap_err();
        assert_eq!(err, RecordError::InvalidDate("yesterday".to_string()));
    }

    #[test]
    fn test_validate_accepts_zero_volume() {
        let r = RefuelRecord::new("v1", 0.0, 0.0, day(2024, 1, 1));
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let r = RefuelRecord::new("v1", -1.0, 10.0, day(2024, 1, 1));
        assert!(matches!(r.validate(), Err(RecordError::InvalidVolume { .. })));

        let r = RefuelRecord::new("v1", 10.0, f64::NAN, day(2024, 1, 1));
        assert!(matches!(r.validate(), Err(RecordError::InvalidCost { .. })));

        let r = RefuelRecord::new("  ", 10.0, 10.0, day(2024, 1, 1));
        assert_eq!(r.validate(), Err(RecordError::MissingVehicleId));
    }

    #[test]
    fn test_validate_single_vehicle() {
        let records = vec![
            RefuelRecord::new("v1", 10.0, 100.0, day(2024, 1, 1)),
            RefuelRecord::new("v2", 10.0, 100.0, day(2024, 1, 2)),
        ];
        assert!(matches!(
            validate_single_vehicle(&records),
            Err(RecordError::MixedVehicles { .. })
        ));
        assert!(validate_single_vehicle(&records[..1]).is_ok());
        assert!(validate_single_vehicle(&[]).is_ok());
    }

    #[test]
    fn test_cost_per_liter() {
        let r = RefuelRecord::new("v1", 20.0, 50.0, day(2024, 1, 1));
        assert_eq!(r.cost_per_liter(), 2.5);
        let r = RefuelRecord::new("v1", 0.0, 50.0, day(2024, 1, 1));
        assert_eq!(r.cost_per_liter(), 0.0);
    }

    #[test]
    fn test_filter_by_date_inclusive() {
        let records = vec![
            RefuelRecord::new("v1", 1.0, 1.0, day(2024, 1, 1)),
            RefuelRecord::new("v1", 1.0, 1.0, day(2024, 1, 15)),
            RefuelRecord::new("v1", 1.0, 1.0, day(2024, 2, 1)),
        ];
        let from = NaiveDate::from_ymd_opt(2024, 1, 15);
        let to = NaiveDate::from_ymd_opt(2024, 2, 1);

        assert_eq!(filter_by_date(&records, from, to).len(), 2);
        assert_eq!(filter_by_date(&records, None, from).len(), 2);
        assert_eq!(filter_by_date(&records, None, None).len(), 3);
    }

    #[test]
    fn test_deserialize_json_row() {
        let json = r#"{
            "vehicle_id": "v1",
            "driver_id": null,
            "litres": 42.5,
            "cost": 120.0,
            "odometer": 15000,
            "station_name": "North",
            "refuel_date": "2024-02-10"
        }"#;
        let r: RefuelRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.volume_liters, 42.5);
        assert_eq!(r.odometer_km, Some(15000));
        assert_eq!(r.driver_id, None);
        assert_eq!(r.refuel_date, day(2024, 2, 10));
    }
}
