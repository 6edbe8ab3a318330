use serde::Serialize;

use crate::analytics::types::EfficiencyPoint;

/// Where a point sits relative to the vehicle's average efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EfficiencyBand {
    Above,
    Normal,
    Below,
    Unrated,
}

impl EfficiencyBand {
    pub fn as_str(self) -> &'static str {
        match self {
            EfficiencyBand::Above => "above",
            EfficiencyBand::Normal => "normal",
            EfficiencyBand::Below => "below",
            EfficiencyBand::Unrated => "-",
        }
    }
}

/// Rates a point against the vehicle average.
///
/// | Ratio to average | Band   |
/// |------------------|--------|
/// | > 1.2            | Above  |
/// | < 0.8            | Below  |
/// | otherwise        | Normal |
///
/// Invalid points and a zero average are [`EfficiencyBand::Unrated`].
pub fn band(point: &EfficiencyPoint, avg_km_per_liter: f64) -> EfficiencyBand {
    match point.valid_km_per_liter() {
        Some(_) if avg_km_per_liter <= 0.0 => EfficiencyBand::Unrated,
        Some(v) if v > avg_km_per_liter * 1.2 => EfficiencyBand::Above,
        Some(v) if v < avg_km_per_liter * 0.8 => EfficiencyBand::Below,
        Some(_) => EfficiencyBand::Normal,
        None => EfficiencyBand::Unrated,
    }
}
