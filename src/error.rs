use thiserror::Error;

/// Reasons a refuel record is rejected at the input boundary.
///
/// Missing optional fields (odometer, driver, station) are never errors; only
/// values that cannot be a refuel at all end up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("refuel record has an empty vehicle id")]
    MissingVehicleId,

    #[error("vehicle {vehicle_id}: volume must be a finite, non-negative number of litres (got {value})")]
    InvalidVolume { vehicle_id: String, value: f64 },

    #[error("vehicle {vehicle_id}: cost must be a finite, non-negative amount (got {value})")]
    InvalidCost { vehicle_id: String, value: f64 },

    #[error("unrecognized refuel date: {0:?}")]
    InvalidDate(String),

    #[error("expected records for a single vehicle, found {expected} and {found}")]
    MixedVehicles { expected: String, found: String },
}

pub type Result<T> = std::result::Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_volume_message_names_vehicle() {
        let err = RecordError::InvalidVolume {
            vehicle_id: "TRK-7".to_string(),
            value: -3.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("TRK-7"));
        assert!(msg.contains("-3"));
    }

    #[test]
    fn test_mixed_vehicles_message() {
        let err = RecordError::MixedVehicles {
            expected: "a".to_string(),
            found: "b".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "expected records for a single vehicle, found a and b"
        );
    }
}
