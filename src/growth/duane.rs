//! Duane reliability-growth model.
//!
//! Cumulative MTBF is a straight line on log-log axes:
//! `MTBF_c(T) = b·T^α`, so `ln MTBF_c = ln b + α·ln T`. The instantaneous
//! MTBF is `MTBF_c / (1 - α)`.

use serde::{Deserialize, Serialize};

use super::GrowthEvent;
use crate::error::FitError;
use crate::regression::fit_line;

/// Fitted Duane model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuaneFit {
    /// Growth rate (alpha), the slope on log-log axes.
    pub alpha: f64,
    /// Cumulative MTBF at unit time (b).
    pub b: f64,
    pub r_squared: f64,
    /// Standard error of alpha.
    pub alpha_se: f64,
    /// Standard error of ln b.
    pub ln_b_se: f64,
    /// Residual variance SSE / (n - 2) on the log scale.
    pub residual_variance: f64,
}

impl DuaneFit {
    pub fn cumulative_mtbf(&self, t: f64) -> f64 {
        self.b * t.powf(self.alpha)
    }

    /// Infinite when alpha is 1.
    pub fn instantaneous_mtbf(&self, t: f64) -> f64 {
        let c = self.cumulative_mtbf(t);
        if self.alpha == 1.0 {
            f64::INFINITY
        } else {
            c / (1.0 - self.alpha)
        }
    }

    pub fn cumulative_intensity(&self, t: f64) -> f64 {
        1.0 / self.cumulative_mtbf(t)
    }

    pub fn instantaneous_intensity(&self, t: f64) -> f64 {
        (1.0 - self.alpha) / self.cumulative_mtbf(t)
    }
}

/// Fits the Duane model by least squares of `ln(T_i / N_i)` on `ln T_i`,
/// where `N_i` is the cumulative failure count at `T_i`.
///
/// Events with no failures before them are skipped, since their cumulative
/// MTBF is undefined.
///
/// # Errors
/// - [`FitError::InsufficientData`] with fewer than 3 usable points.
/// - [`FitError::InvalidInput`] for non-positive times or when every point
///   lies at the same time.
///
/// # Examples
///
/// ```
/// use u_reliability::growth::{duane_fit, GrowthEvent};
///
/// let events: Vec<_> = [(100.0, 5), (250.0, 4), (500.0, 4), (1000.0, 5)]
///     .iter()
///     .map(|&(t, n)| GrowthEvent::new(t, n))
///     .collect();
/// let fit = duane_fit(&events).unwrap();
/// assert!(fit.alpha > 0.0 && fit.alpha < 1.0);
/// ```
pub fn duane_fit(events: &[GrowthEvent]) -> Result<DuaneFit, FitError> {
    if let Some(bad) = events.iter().find(|e| !(e.time > 0.0 && e.time.is_finite())) {
        return Err(FitError::InvalidInput(format!(
            "test times must be positive and finite, got {}",
            bad.time
        )));
    }

    let mut ln_t = Vec::with_capacity(events.len());
    let mut ln_mtbf = Vec::with_capacity(events.len());
    let mut cumulative = 0u32;
    for event in events {
        cumulative += event.failures;
        if cumulative == 0 {
            continue;
        }
        ln_t.push(event.time.ln());
        ln_mtbf.push((event.time / f64::from(cumulative)).ln());
    }

    if ln_t.len() < 3 {
        return Err(FitError::InsufficientData {
            required: 3,
            found: ln_t.len(),
        });
    }

    let line = fit_line(&ln_t, &ln_mtbf)
        .ok_or_else(|| FitError::InvalidInput("all test times are identical".into()))?;

    Ok(DuaneFit {
        alpha: line.slope,
        b: line.intercept.exp(),
        r_squared: line.r_squared,
        alpha_se: line.slope_se,
        ln_b_se: line.intercept_se,
        residual_variance: line.residual_se * line.residual_se,
    })
}
