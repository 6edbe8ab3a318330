//! Runtime settings: the efficiency policy and datastore connection details.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Thresholds applied by the efficiency and rollup computations.
///
/// Stored as a JSON object on disk; omitted keys keep their defaults:
/// ```json
/// { "max_km_per_liter": 100.0, "anomaly_sigma": 2.5 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EfficiencyPolicy {
    /// Exclusive lower bound for a plausible km/L value.
    pub min_km_per_liter: f64,
    /// Exclusive upper bound for a plausible km/L value.
    pub max_km_per_liter: f64,
    /// Deviations from the mean beyond which a point is an anomaly.
    pub anomaly_sigma: f64,
    /// Number of most recent months kept by the monthly rollup.
    pub rollup_months: usize,
}

impl Default for EfficiencyPolicy {
    fn default() -> Self {
        Self {
            min_km_per_liter: 0.0,
            max_km_per_liter: 50.0,
            anomaly_sigma: 2.0,
            rollup_months: 12,
        }
    }
}

impl EfficiencyPolicy {
    /// Loads the policy from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read policy file '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("invalid policy file '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let policy: Self = serde_json::from_str(content)?;
        if !(policy.min_km_per_liter >= 0.0) {
            anyhow::bail!(
                "min_km_per_liter must not be negative (got {})",
                policy.min_km_per_liter
            );
        }
        if !(policy.min_km_per_liter < policy.max_km_per_liter) {
            anyhow::bail!(
                "min_km_per_liter ({}) must be below max_km_per_liter ({})",
                policy.min_km_per_liter,
                policy.max_km_per_liter
            );
        }
        if !policy.anomaly_sigma.is_finite() || policy.anomaly_sigma <= 0.0 {
            anyhow::bail!("anomaly_sigma must be a positive number");
        }
        if policy.rollup_months == 0 {
            anyhow::bail!("rollup_months must be at least 1");
        }
        Ok(policy)
    }

    /// Whether a km/L value counts toward statistics. Zero and negative
    /// values never do, whatever the configured minimum.
    pub fn is_plausible(&self, km_per_liter: f64) -> bool {
        km_per_liter > self.min_km_per_liter.max(0.0) && km_per_liter < self.max_km_per_liter
    }
}

/// Connection settings for the hosted `fuel_logs` REST endpoint.
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub api_key: String,
}

impl RestConfig {
    /// Reads `SUPABASE_URL` and `SUPABASE_ANON_KEY` from the environment.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("SUPABASE_URL").context("SUPABASE_URL must be set")?;
        let api_key =
            std::env::var("SUPABASE_ANON_KEY").context("SUPABASE_ANON_KEY must be set")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let p = EfficiencyPolicy::default();
        assert_eq!(p.max_km_per_liter, 50.0);
        assert_eq!(p.rollup_months, 12);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let p = EfficiencyPolicy::from_json(r#"{ "max_km_per_liter": 100.0 }"#).unwrap();
        assert_eq!(p.max_km_per_liter, 100.0);
        assert_eq!(p.min_km_per_liter, 0.0);
        assert_eq!(p.anomaly_sigma, 2.0);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let result =
            EfficiencyPolicy::from_json(r#"{ "min_km_per_liter": 60.0, "max_km_per_liter": 50.0 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_minimum_rejected() {
        let result = EfficiencyPolicy::from_json(r#"{ "min_km_per_liter": -100.0 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_minimum_never_admits_negative_efficiency() {
        let p = EfficiencyPolicy {
            min_km_per_liter: -100.0,
            ..Default::default()
        };
        assert!(!p.is_plausible(-20.0));
        assert!(!p.is_plausible(0.0));
        assert!(p.is_plausible(10.0));
    }

    #[test]
    fn test_zero_rollup_months_rejected() {
        let result = EfficiencyPolicy::from_json(r#"{ "rollup_months": 0 }"#);
        assert!(result.is_err());
        assert!(EfficiencyPolicy::from_json(r#"{ "rollup_months": 1 }"#).is_ok());
    }

    #[test]
    fn test_is_plausible_bounds_are_exclusive() {
        let p = EfficiencyPolicy::default();
        assert!(!p.is_plausible(0.0));
        assert!(p.is_plausible(0.1));
        assert!(p.is_plausible(49.9));
        assert!(!p.is_plausible(50.0));
        assert!(!p.is_plausible(-3.0));
    }
}
