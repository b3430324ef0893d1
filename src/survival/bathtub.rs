//! Bathtub search: where does the early-life region end?
//!
//! Refits a Weibull with the start of the data window moved forward one
//! step at a time. Once infant-mortality failures drop out, shape and
//! scale stop drifting; the percent-change series shows where.

use serde::{Deserialize, Serialize};

use super::failures_and_suspensions;
use super::weibull::weibull_mle;
use super::IncidentRecord;
use crate::error::FitError;

/// Weibull fit for one window start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BathtubPoint {
    pub start_time: f64,
    pub shape: f64,
    pub scale: f64,
    /// Percent change in shape from the previous start time.
    pub shape_change: f64,
    /// Percent change in scale from the previous start time.
    pub scale_change: f64,
}

/// Fits Weibull MLE to the records in `(t0, release_time]` for
/// `t0 = start_time, start_time + step, ...` while `t0 < release_time`.
///
/// A `release_time` of 0 means "up to the last record". The search stops
/// at the first window that can no longer be fitted. When the previous
/// value is zero the previous percent change is repeated.
///
/// # Errors
///
/// [`FitError::InvalidInput`] for a non-positive step, otherwise the error
/// of the first window when not even that one can be fitted.
pub fn bathtub_filter(
    records: &[IncidentRecord],
    start_time: f64,
    release_time: f64,
    step: f64,
) -> Result<Vec<BathtubPoint>, FitError> {
    if step <= 0.0 || !step.is_finite() {
        return Err(FitError::InvalidInput(format!("step must be positive, got {step}")));
    }
    if !start_time.is_finite() {
        return Err(FitError::InvalidInput(format!("start time {start_time} is not finite")));
    }
    let end = if release_time > 0.0 {
        release_time
    } else {
        records
            .iter()
            .map(IncidentRecord::event_time)
            .filter(|t| t.is_finite())
            .fold(start_time, f64::max)
    };

    let mut points: Vec<BathtubPoint> = Vec::new();
    let mut k = 0u32;
    loop {
        let t0 = start_time + f64::from(k) * step;
        if t0 >= end {
            break;
        }
        k += 1;

        let (failures, suspensions) = failures_and_suspensions(records, t0, end);
        let fit = match weibull_mle(&failures, &suspensions) {
            Ok(fit) => fit,
            Err(err) if points.is_empty() => return Err(err),
            Err(err) => {
                tracing::debug!(start_time = t0, %err, "bathtub search stopped");
                break;
            }
        };

        let (shape_change, scale_change) = match points.last() {
            None => (0.0, 0.0),
            Some(prev) => (
                percent_change(prev.shape, fit.shape, prev.shape_change),
                percent_change(prev.scale, fit.scale, prev.scale_change),
            ),
        };
        points.push(BathtubPoint {
            start_time: t0,
            shape: fit.shape,
            scale: fit.scale,
            shape_change,
            scale_change,
        });
    }
    Ok(points)
}

fn percent_change(previous: f64, current: f64, previous_change: f64) -> f64 {
    if previous == 0.0 {
        previous_change
    } else {
        100.0 * (current - previous) / previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weibull_times(beta: f64, eta: f64, n: usize, offset: f64) -> Vec<f64> {
        (1..=n)
            .map(|i| {
                let f = (i as f64 - 0.5) / n as f64;
                offset + eta * (-(1.0 - f).ln()).powf(1.0 / beta)
            })
            .collect()
    }

    #[test]
    fn test_windows_advance_by_step() {
        let records: Vec<_> = weibull_times(1.5, 200.0, 40, 0.0)
            .into_iter()
            .map(IncidentRecord::exact)
            .collect();
        let points = bathtub_filter(&records, 0.0, 400.0, 50.0).unwrap();
        assert!(!points.is_empty());
        assert_eq!(points[0].start_time, 0.0);
        assert_eq!(points[0].shape_change, 0.0);
        for pair in points.windows(2) {
            assert_eq!(pair[1].start_time - pair[0].start_time, 50.0);
            let expected = 100.0 * (pair[1].scale - pair[0].scale) / pair[0].scale;
            assert!((pair[1].scale_change - expected).abs() < 1e-9);
        }
        assert!(points.len() <= 8);
    }

    #[test]
    fn test_infant_mortality_shows_as_shape_drift() {
        // Early failures clustered near zero, then a wear-out population.
        let mut times = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        times.extend(weibull_times(3.0, 300.0, 30, 0.0).into_iter().filter(|&t| t > 50.0));
        let records: Vec<_> = times.into_iter().map(IncidentRecord::exact).collect();

        let points = bathtub_filter(&records, 0.0, 0.0, 10.0).unwrap();
        assert!(points.len() >= 2);
        assert!(
            points[1].shape > points[0].shape,
            "dropping infant failures should raise the shape: {} -> {}",
            points[0].shape,
            points[1].shape
        );
    }

    #[test]
    fn test_invalid_step_and_empty_data() {
        assert!(matches!(
            bathtub_filter(&[], 0.0, 10.0, 0.0),
            Err(FitError::InvalidInput(_))
        ));
        assert!(matches!(
            bathtub_filter(&[IncidentRecord::exact(5.0)], 0.0, 10.0, 1.0),
            Err(FitError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_repeats_change_on_zero_previous() {
        assert_eq!(percent_change(0.0, 5.0, 12.5), 12.5);
        assert_eq!(percent_change(2.0, 3.0, 0.0), 50.0);
    }
}
