//! Calculation settings passed explicitly into roll-ups and estimators.

use serde::{Deserialize, Serialize};

/// Program-wide calculation settings.
///
/// Part models produce hazard rates in failures per `hazard_rate_multiplier`
/// hours (10^6 by default); the hardware roll-up divides by the multiplier
/// so that assembly rates are per hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationConfig {
    /// Hazard-rate time-unit multiplier.
    pub hazard_rate_multiplier: f64,
    /// Mission time in hours.
    pub mission_time: f64,
    /// Confidence level for statistical bounds, in (0, 1).
    pub confidence: f64,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            hazard_rate_multiplier: 1.0e6,
            mission_time: 10.0,
            confidence: 0.75,
        }
    }
}

impl CalculationConfig {
    /// Standard normal quantile at `confidence` (one-sided).
    pub fn z_one_sided(&self) -> f64 {
        u_numflow::special::inverse_normal_cdf(self.confidence)
    }

    /// Standard normal quantile for a two-sided interval at `confidence`.
    pub fn z_two_sided(&self) -> f64 {
        u_numflow::special::inverse_normal_cdf(1.0 - (1.0 - self.confidence) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_multiplier() {
        let cfg = CalculationConfig::default();
        assert_eq!(cfg.hazard_rate_multiplier, 1.0e6);
        assert!(cfg.confidence > 0.0 && cfg.confidence < 1.0);
    }

    #[test]
    fn test_round_trip_through_json() {
        let cfg = CalculationConfig {
            hazard_rate_multiplier: 1.0e9,
            mission_time: 250.0,
            confidence: 0.9,
        };
        let text = serde_json::to_string(&cfg).expect("serialize");
        let back: CalculationConfig = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(cfg, back);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let cfg: CalculationConfig =
            serde_json::from_str(r#"{"mission_time": 100.0}"#).expect("deserialize");
        assert_eq!(cfg.mission_time, 100.0);
        assert_eq!(cfg.hazard_rate_multiplier, 1.0e6);
    }

    #[test]
    fn test_z_two_sided_at_95_percent() {
        let cfg = CalculationConfig {
            confidence: 0.95,
            ..Default::default()
        };
        assert!((cfg.z_two_sided() - 1.959964).abs() < 1e-3);
    }
}
