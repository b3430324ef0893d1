//! Goodness of fit of the Crow-AMSAA model.
//!
//! Critical values come from the caller (MIL-HDBK-189 tables or a chosen
//! significance level); each test reports the statistic and whether it
//! stays at or below the critical value.

use serde::{Deserialize, Serialize};

use super::crow_amsaa::CrowAmsaaFit;
use super::{GrowthEvent, Termination};
use crate::error::FitError;

/// Test statistic compared against a critical value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoodnessOfFit {
    pub statistic: f64,
    pub critical_value: f64,
    /// `statistic <= critical_value`: the model is not rejected.
    pub good_fit: bool,
}

impl GoodnessOfFit {
    fn new(statistic: f64, critical_value: f64) -> Self {
        Self {
            statistic,
            critical_value,
            good_fit: statistic <= critical_value,
        }
    }
}

/// Cramér-von Mises statistic for individual failure times.
///
/// With M failures used and the bias-corrected shape β̄:
///
/// ```text
/// C²_M = 1/(12M) + Σ_{i=1..M} ((X_i / T)^β̄ - (2i - 1)/(2M))²
/// ```
///
/// Time-terminated tests use all N failures, T = termination time and
/// β̄ = (N-1)·β/N. Failure-terminated tests drop the last failure
/// (M = N - 1, T = X_N) and use β̄ = (N-2)·β/N.
///
/// # Errors
/// - [`FitError::InsufficientData`] when fewer than 2 failures remain
///   after dropping the terminating one.
/// - [`FitError::InvalidInput`] for a non-positive shape or end time.
pub fn cramer_von_mises(
    events: &[GrowthEvent],
    fit: &CrowAmsaaFit,
    critical_value: f64,
) -> Result<GoodnessOfFit, FitError> {
    if !(fit.shape > 0.0 && fit.end_time > 0.0) {
        return Err(FitError::InvalidInput(format!(
            "shape {} and end time {} must be positive",
            fit.shape, fit.end_time
        )));
    }

    let times: Vec<f64> = events
        .iter()
        .flat_map(|e| std::iter::repeat(e.time).take(e.failures as usize))
        .collect();
    let n = times.len();

    let (m, end_time, beta_bar) = match fit.termination {
        Termination::TimeTerminated { end_time } => {
            (n, end_time, (n as f64 - 1.0) * fit.shape / n as f64)
        }
        Termination::FailureTerminated => (
            n.saturating_sub(1),
            times.last().copied().unwrap_or(fit.end_time),
            (n as f64 - 2.0) * fit.shape / n as f64,
        ),
    };
    if m < 2 {
        return Err(FitError::InsufficientData {
            required: 2,
            found: m,
        });
    }

    let mf = m as f64;
    let sum: f64 = times[..m]
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let expected = (2.0 * (i as f64 + 1.0) - 1.0) / (2.0 * mf);
            ((x / end_time).powf(beta_bar) - expected).powi(2)
        })
        .sum();

    Ok(GoodnessOfFit::new(1.0 / (12.0 * mf) + sum, critical_value))
}

/// Pearson chi-square for interval-grouped counts.
///
/// ```text
/// θ_i = λ·(X_i^β - X_{i-1}^β),   χ² = Σ (F_i - θ_i)² / θ_i
/// ```
///
/// Compare against χ²(1-α, k-2) for k intervals.
///
/// # Errors
/// [`FitError::InvalidInput`] when an interval has no expected failures
/// (zero length or non-increasing times).
pub fn chi_square_grouped(
    events: &[GrowthEvent],
    fit: &CrowAmsaaFit,
    critical_value: f64,
) -> Result<GoodnessOfFit, FitError> {
    let mut previous = 0.0_f64;
    let mut statistic = 0.0;
    for event in events {
        let theta = fit.scale * (event.time.powf(fit.shape) - previous.powf(fit.shape));
        if !(theta > 0.0) || !theta.is_finite() {
            return Err(FitError::InvalidInput(format!(
                "interval ending at {} has no expected failures",
                event.time
            )));
        }
        statistic += (f64::from(event.failures) - theta).powi(2) / theta;
        previous = event.time;
    }
    Ok(GoodnessOfFit::new(statistic, critical_value))
}

/// Trend statistic `2N/β` for individual failure times.
///
/// Under a homogeneous Poisson process it is chi-square with 2N degrees of
/// freedom; values far from 2N indicate growth (large) or decay (small).
pub fn chi_square_trend(fit: &CrowAmsaaFit, critical_value: f64) -> GoodnessOfFit {
    let statistic = 2.0 * f64::from(fit.failures) / fit.shape;
    GoodnessOfFit::new(statistic, critical_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::{crow_amsaa_exact, crow_amsaa_grouped};

    fn power_law_events(lambda: f64, beta: f64, n: u32) -> Vec<GrowthEvent> {
        (1..=n)
            .map(|i| GrowthEvent::new(((f64::from(i) - 0.5) / lambda).powf(1.0 / beta), 1))
            .collect()
    }

    #[test]
    fn test_cvm_accepts_power_law_data() {
        let events = power_law_events(0.8, 0.5, 30);
        let fit = crow_amsaa_exact(&events, Termination::FailureTerminated).unwrap();
        // MIL-HDBK-189 critical value for M = 29 at 10% significance.
        let gof = cramer_von_mises(&events, &fit, 0.172).unwrap();
        assert!(gof.good_fit, "C² = {}", gof.statistic);
        assert!(gof.statistic >= 1.0 / (12.0 * 29.0));
    }

    #[test]
    fn test_cvm_rejects_clustered_failures() {
        // Half the failures at the very start, half at the very end.
        let mut events: Vec<_> = (1..=10).map(|i| GrowthEvent::new(f64::from(i) * 0.01, 1)).collect();
        events.extend((1..=10).map(|i| GrowthEvent::new(1000.0 + f64::from(i), 1)));
        let fit = crow_amsaa_exact(&events, Termination::TimeTerminated { end_time: 1011.0 }).unwrap();
        let gof = cramer_von_mises(&events, &fit, 0.172).unwrap();
        assert!(!gof.good_fit, "C² = {}", gof.statistic);
    }

    #[test]
    fn test_cvm_needs_failures() {
        let events = [GrowthEvent::new(1.0, 1), GrowthEvent::new(3.0, 1), GrowthEvent::new(4.0, 1)];
        let mut fit = crow_amsaa_exact(&events, Termination::FailureTerminated).unwrap();
        assert!(cramer_von_mises(&events, &fit, 0.2).is_ok());
        assert!(matches!(
            cramer_von_mises(&events[..2], &fit, 0.2),
            Err(FitError::InsufficientData { .. })
        ));
        fit.shape = 0.0;
        assert!(matches!(cramer_von_mises(&events, &fit, 0.2), Err(FitError::InvalidInput(_))));
    }

    #[test]
    fn test_grouped_chi_square_matches_hand_computation() {
        let events = [GrowthEvent::new(100.0, 12), GrowthEvent::new(200.0, 6), GrowthEvent::new(400.0, 9)];
        let fit = crow_amsaa_grouped(&events).unwrap();
        let gof = chi_square_grouped(&events, &fit, 3.84).unwrap();

        let mut expected = 0.0;
        let mut prev: f64 = 0.0;
        for e in &events {
            let theta = fit.scale * (e.time.powf(fit.shape) - prev.powf(fit.shape));
            expected += (f64::from(e.failures) - theta).powi(2) / theta;
            prev = e.time;
        }
        assert!((gof.statistic - expected).abs() < 1e-12);
        assert_eq!(gof.good_fit, gof.statistic <= 3.84);
    }

    #[test]
    fn test_grouped_chi_square_rejects_empty_interval() {
        let events = [GrowthEvent::new(100.0, 3), GrowthEvent::new(100.0, 2)];
        let fit = CrowAmsaaFit {
            shape: 0.8,
            scale: 0.1,
            failures: 5,
            end_time: 100.0,
            termination: Termination::TimeTerminated { end_time: 100.0 },
            iterations: 0,
        };
        assert!(matches!(
            chi_square_grouped(&events, &fit, 3.84),
            Err(FitError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_trend_statistic() {
        let fit = CrowAmsaaFit {
            shape: 0.5,
            scale: 1.0,
            failures: 10,
            end_time: 100.0,
            termination: Termination::FailureTerminated,
            iterations: 0,
        };
        let gof = chi_square_trend(&fit, 31.41);
        assert_eq!(gof.statistic, 40.0);
        assert!(!gof.good_fit);
    }
}
