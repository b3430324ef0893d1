//! Similar-item hazard-rate conversion.
//!
//! Moves a known hazard rate to a new quality level, environment and
//! operating temperature. Each table entry is the MTBF multiplier from the
//! row condition to the column condition, so the new hazard rate is the
//! base rate divided by the product of the three factors.

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::guard::divide_or_zero;

/// Quality levels of the conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimilarQuality {
    Space = 0,
    FullMilitary = 1,
    Ruggedized = 2,
    Commercial = 3,
}

impl SimilarQuality {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            1 => Some(Self::Space),
            2 => Some(Self::FullMilitary),
            3 => Some(Self::Ruggedized),
            4 => Some(Self::Commercial),
            _ => None,
        }
    }
}

/// Environments of the conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimilarEnvironment {
    GroundBenign = 0,
    GroundMobile = 1,
    NavalSheltered = 2,
    AirborneInhabitedCargo = 3,
    AirborneRotaryWing = 4,
    SpaceFlight = 5,
}

impl SimilarEnvironment {
    /// Tabulated counterpart of a handbook environment, if any.
    pub fn of(environment: Environment) -> Option<Self> {
        match environment {
            Environment::GroundBenign => Some(Self::GroundBenign),
            Environment::GroundMobile => Some(Self::GroundMobile),
            Environment::NavalSheltered => Some(Self::NavalSheltered),
            Environment::AirborneInhabitedCargo => Some(Self::AirborneInhabitedCargo),
            Environment::AirborneRotaryWing => Some(Self::AirborneRotaryWing),
            Environment::SpaceFlight => Some(Self::SpaceFlight),
            _ => None,
        }
    }
}

/// Conditions on one side of the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarTarget {
    /// `None` converts with a factor of 1.
    pub quality: Option<SimilarQuality>,
    pub environment: Environment,
    /// Operating temperature in °C.
    pub temperature: f64,
}

const QUALITY: [[f64; 4]; 4] = [
    [1.0, 0.8, 0.5, 0.2],
    [1.3, 1.0, 0.6, 0.3],
    [2.0, 1.7, 1.0, 0.4],
    [5.0, 3.3, 2.5, 1.0],
];

const ENVIRONMENT: [[f64; 6]; 6] = [
    [1.0, 0.2, 0.3, 0.3, 0.1, 1.1],
    [5.0, 1.0, 1.4, 1.4, 0.5, 5.0],
    [3.3, 0.7, 1.0, 1.0, 0.3, 3.3],
    [3.3, 0.7, 1.0, 1.0, 0.3, 3.3],
    [10.0, 2.0, 3.3, 3.3, 1.0, 10.0],
    [0.9, 0.2, 0.3, 0.3, 0.1, 1.0],
];

/// Rows and columns are 10, 20, ... 70 °C.
const TEMPERATURE: [[f64; 7]; 7] = [
    [1.0, 0.9, 0.8, 0.8, 0.7, 0.5, 0.4],
    [1.1, 1.0, 0.9, 0.8, 0.7, 0.6, 0.5],
    [1.2, 1.1, 1.0, 0.9, 0.8, 0.6, 0.5],
    [1.3, 1.2, 1.1, 1.0, 0.9, 0.7, 0.6],
    [1.5, 1.4, 1.2, 1.1, 1.0, 0.8, 0.7],
    [1.9, 1.7, 1.6, 1.5, 1.2, 1.0, 0.8],
    [2.4, 2.2, 1.9, 1.8, 1.5, 1.2, 1.0],
];

/// Nearest 10 °C step, clamped to the 10..70 °C table range.
fn temperature_bucket(celsius: f64) -> usize {
    if !celsius.is_finite() {
        return 0;
    }
    ((celsius / 10.0).round().clamp(1.0, 7.0) as usize) - 1
}

fn quality_factor(from: Option<SimilarQuality>, to: Option<SimilarQuality>) -> f64 {
    match (from, to) {
        (Some(a), Some(b)) => QUALITY[a as usize][b as usize],
        _ => 1.0,
    }
}

fn environment_factor(from: Environment, to: Environment) -> f64 {
    match (SimilarEnvironment::of(from), SimilarEnvironment::of(to)) {
        (Some(a), Some(b)) => ENVIRONMENT[a as usize][b as usize],
        _ => 1.0,
    }
}

/// Hazard rate of a similar item under `target` conditions.
///
/// `hazard_rate` is the known item's rate under `base` conditions. A zero
/// factor product returns 0.0 with a warning.
///
/// # Examples
///
/// ```
/// use u_reliability::derating::{similar_hazard_rate, SimilarQuality, SimilarTarget};
/// use u_reliability::environment::Environment;
///
/// let base = SimilarTarget {
///     quality: Some(SimilarQuality::Commercial),
///     environment: Environment::GroundBenign,
///     temperature: 30.0,
/// };
/// let target = SimilarTarget { quality: Some(SimilarQuality::FullMilitary), ..base };
/// let rate = similar_hazard_rate("U1", 3.3, &base, &target);
/// assert!((rate - 1.0).abs() < 1e-12);
/// ```
pub fn similar_hazard_rate(
    node: &str,
    hazard_rate: f64,
    base: &SimilarTarget,
    target: &SimilarTarget,
) -> f64 {
    let q = quality_factor(base.quality, target.quality);
    let e = environment_factor(base.environment, target.environment);
    let t = TEMPERATURE[temperature_bucket(base.temperature)][temperature_bucket(target.temperature)];
    divide_or_zero(hazard_rate, q * e * t, node, "similar_factor")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base() -> SimilarTarget {
        SimilarTarget {
            quality: Some(SimilarQuality::FullMilitary),
            environment: Environment::GroundMobile,
            temperature: 40.0,
        }
    }

    #[test]
    fn test_combined_conversion() {
        let target = SimilarTarget {
            quality: Some(SimilarQuality::Commercial),
            environment: Environment::AirborneRotaryWing,
            temperature: 60.0,
        };
        let rate = similar_hazard_rate("Q1", 2.0, &base(), &target);
        let expected = 2.0 / (0.3 * 0.5 * 0.7);
        assert!((rate - expected).abs() < 1e-9, "rate = {}, expected {}", rate, expected);
    }

    #[test]
    fn test_identity_conversion() {
        let b = base();
        assert!((similar_hazard_rate("Q2", 1.7, &b, &b) - 1.7).abs() < 1e-12);
    }

    #[test]
    fn test_untabulated_inputs_convert_with_unity() {
        let from = SimilarTarget {
            quality: None,
            environment: Environment::MissileLaunch,
            temperature: 30.0,
        };
        let to = SimilarTarget {
            quality: Some(SimilarQuality::Space),
            environment: Environment::GroundBenign,
            temperature: 30.0,
        };
        assert!((similar_hazard_rate("Q3", 0.25, &from, &to) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_temperature_buckets() {
        assert_eq!(temperature_bucket(-20.0), 0);
        assert_eq!(temperature_bucket(14.9), 0);
        assert_eq!(temperature_bucket(25.0), 2);
        assert_eq!(temperature_bucket(68.0), 6);
        assert_eq!(temperature_bucket(150.0), 6);
        assert_eq!(temperature_bucket(f64::NAN), 0);
    }

    #[test]
    fn test_quality_index_mapping() {
        assert_eq!(SimilarQuality::from_index(1), Some(SimilarQuality::Space));
        assert_eq!(SimilarQuality::from_index(4), Some(SimilarQuality::Commercial));
        assert_eq!(SimilarQuality::from_index(5), None);
    }

    proptest! {
        #[test]
        fn prop_result_is_finite_and_positive(
            rate in 0.001f64..100.0,
            q1 in 1usize..=5,
            q2 in 1usize..=5,
            e1 in 1usize..=14,
            e2 in 1usize..=14,
            t1 in -40.0f64..150.0,
            t2 in -40.0f64..150.0,
        ) {
            let from = SimilarTarget {
                quality: SimilarQuality::from_index(q1),
                environment: Environment::from_index(e1).unwrap(),
                temperature: t1,
            };
            let to = SimilarTarget {
                quality: SimilarQuality::from_index(q2),
                environment: Environment::from_index(e2).unwrap(),
                temperature: t2,
            };
            let r = similar_hazard_rate("X", rate, &from, &to);
            prop_assert!(r.is_finite() && r > 0.0);
        }
    }
}
