//! Crow-AMSAA (power-law NHPP) estimation.
//!
//! The expected number of failures by time t is `N(t) = λ·t^β`. β < 1 means
//! the failure intensity is falling, i.e. reliability is growing.

use serde::{Deserialize, Serialize};

use super::{total_failures, GrowthEvent, Termination};
use crate::error::FitError;

/// Fitted Crow-AMSAA model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrowAmsaaFit {
    /// Shape parameter (beta).
    pub shape: f64,
    /// Scale parameter (lambda).
    pub scale: f64,
    /// Total failures in the data.
    pub failures: u32,
    /// End of observation (T*).
    pub end_time: f64,
    pub termination: Termination,
    /// Newton iterations used; 0 for the closed-form exact-data estimate.
    pub iterations: usize,
}

impl CrowAmsaaFit {
    /// Expected cumulative failures λ·t^β.
    pub fn expected_failures(&self, t: f64) -> f64 {
        self.scale * t.powf(self.shape)
    }

    /// Cumulative failure intensity λ·t^(β-1).
    pub fn cumulative_intensity(&self, t: f64) -> f64 {
        self.scale * t.powf(self.shape - 1.0)
    }

    /// Instantaneous failure intensity λ·β·t^(β-1).
    pub fn instantaneous_intensity(&self, t: f64) -> f64 {
        self.shape * self.cumulative_intensity(t)
    }

    /// Cumulative MTBF (1/λ)·t^(1-β). Infinite when λ is zero.
    pub fn cumulative_mtbf(&self, t: f64) -> f64 {
        reciprocal(self.cumulative_intensity(t))
    }

    /// Instantaneous MTBF 1/(λ·β·t^(β-1)). Infinite when the intensity is zero.
    pub fn instantaneous_mtbf(&self, t: f64) -> f64 {
        reciprocal(self.instantaneous_intensity(t))
    }
}

fn reciprocal(x: f64) -> f64 {
    if x == 0.0 {
        f64::INFINITY
    } else {
        1.0 / x
    }
}

/// Maximum Newton iterations for the grouped-data solve.
const MAX_ITER: usize = 100;

/// Convergence tolerance on beta.
const TOL: f64 = 1e-10;

/// Crow-AMSAA maximum likelihood from individual failure times.
///
/// ```text
/// beta   = N / (N·ln T* - Σ ln X_i)
/// lambda = N / T*^beta
/// ```
///
/// For a failure-terminated test T* is the last failure time. Events with
/// `failures > 1` count that many coincident failures.
///
/// # Errors
/// - [`FitError::InsufficientData`] with fewer than 2 failures.
/// - [`FitError::InvalidInput`] for non-positive or unordered times, or a
///   termination time before the last failure.
///
/// # Examples
///
/// ```
/// use u_reliability::growth::{crow_amsaa_exact, GrowthEvent, Termination};
///
/// let events: Vec<_> = [2.7, 10.3, 12.5, 30.6, 57.0, 61.3, 80.0, 109.5, 125.0, 128.6]
///     .iter()
///     .map(|&t| GrowthEvent::new(t, 1))
///     .collect();
/// let fit = crow_amsaa_exact(&events, Termination::FailureTerminated).unwrap();
/// assert!(fit.shape > 0.0 && fit.shape < 1.0);
/// ```
pub fn crow_amsaa_exact(
    events: &[GrowthEvent],
    termination: Termination,
) -> Result<CrowAmsaaFit, FitError> {
    validate(events, false)?;

    let n = total_failures(events);
    let last = events.last().map_or(0.0, |e| e.time);
    let end_time = match termination {
        Termination::FailureTerminated => last,
        Termination::TimeTerminated { end_time } => {
            if !end_time.is_finite() || end_time < last {
                return Err(FitError::InvalidInput(format!(
                    "termination time {end_time} precedes the last failure at {last}"
                )));
            }
            end_time
        }
    };

    let nf = f64::from(n);
    let sum_ln: f64 = events
        .iter()
        .map(|e| f64::from(e.failures) * e.time.ln())
        .sum();
    let denominator = nf * end_time.ln() - sum_ln;
    if denominator <= 0.0 {
        return Err(FitError::InvalidInput(
            "all failures coincide with the end of the test".into(),
        ));
    }

    let shape = nf / denominator;
    let scale = nf / end_time.powf(shape);
    Ok(CrowAmsaaFit {
        shape,
        scale,
        failures: n,
        end_time,
        termination,
        iterations: 0,
    })
}

/// Crow-AMSAA maximum likelihood from interval-grouped failure counts.
///
/// Interval i runs from the previous event's time (0 for the first) to
/// `events[i].time`. Beta solves
///
/// ```text
/// Σ F_i · [ (t_i^β ln t_i - t_{i-1}^β ln t_{i-1}) / (t_i^β - t_{i-1}^β) - ln T ] = 0
/// ```
///
/// with T the last interval end, and lambda = N / T^β. The equation is
/// solved in the scaled form `u = t/T`, where each term becomes
/// `d_i / (1 - e^(-β·d_i)) + ln u_{i-1}` with `d_i = ln(u_i / u_{i-1})`.
/// The left side is strictly decreasing in β, so a bracketed Newton
/// iteration started from the exact-data estimate finds the unique root.
///
/// # Errors
/// - [`FitError::InsufficientData`] when fewer than two intervals contain
///   failures (beta is then not identifiable).
/// - [`FitError::InvalidInput`] for non-positive or non-increasing times.
/// - [`FitError::NonConvergence`] when the root cannot be bracketed or the
///   iteration stalls.
pub fn crow_amsaa_grouped(events: &[GrowthEvent]) -> Result<CrowAmsaaFit, FitError> {
    validate(events, true)?;

    let with_failures = events.iter().filter(|e| e.failures > 0).count();
    if with_failures < 2 {
        return Err(FitError::InsufficientData {
            required: 2,
            found: with_failures,
        });
    }

    let end_time = events.last().map_or(0.0, |e| e.time);
    let n = total_failures(events);
    let nf = f64::from(n);

    // (F_i, ln u_{i-1}, d_i); the interval starting at 0 has no d.
    let intervals: Vec<(f64, Option<f64>, f64)> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.failures > 0)
        .map(|(i, e)| {
            let ln_u = (e.time / end_time).ln();
            if i == 0 {
                (f64::from(e.failures), None, ln_u)
            } else {
                let ln_prev = (events[i - 1].time / end_time).ln();
                (f64::from(e.failures), Some(ln_prev), ln_u - ln_prev)
            }
        })
        .collect();

    let score = |beta: f64| -> (f64, f64) {
        let mut g = 0.0;
        let mut dg = 0.0;
        for &(f, ln_prev, d) in &intervals {
            match ln_prev {
                None => g += f * d,
                Some(ln_prev) => {
                    let one_minus = -(-beta * d).exp_m1();
                    g += f * (d / one_minus + ln_prev);
                    dg -= f * d * d * (-beta * d).exp() / (one_minus * one_minus);
                }
            }
        }
        (g, dg)
    };

    let sum_ln_u: f64 = events
        .iter()
        .map(|e| f64::from(e.failures) * (e.time / end_time).ln())
        .sum();
    let start = if sum_ln_u < 0.0 { -nf / sum_ln_u } else { 1.0 };

    // Bracket the root: score > 0 at lo, < 0 at hi.
    let mut lo = start;
    let mut hi = start;
    let mut expansions = 0;
    while score(lo).0 <= 0.0 {
        lo *= 0.5;
        expansions += 1;
        if expansions > 60 {
            tracing::debug!(lo, "grouped Crow-AMSAA: no positive score");
            return Err(FitError::NonConvergence {
                iterations: expansions,
            });
        }
    }
    while score(hi).0 >= 0.0 {
        hi *= 2.0;
        expansions += 1;
        if expansions > 120 || !hi.is_finite() {
            tracing::debug!(hi, "grouped Crow-AMSAA: no negative score");
            return Err(FitError::NonConvergence {
                iterations: expansions,
            });
        }
    }

    let mut beta = start.clamp(lo, hi);
    let mut iterations = 0;
    let mut converged = false;
    for iter in 0..MAX_ITER {
        iterations = iter + 1;
        let (g, dg) = score(beta);
        if g > 0.0 {
            lo = beta;
        } else {
            hi = beta;
        }

        let newton = beta - g / dg;
        let next = if dg < 0.0 && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
        let delta = (next - beta).abs();
        beta = next;
        if delta < TOL * beta.max(1.0) {
            converged = true;
            break;
        }
    }

    if !converged {
        tracing::debug!(iterations, beta, "grouped Crow-AMSAA did not converge");
        return Err(FitError::NonConvergence { iterations });
    }

    Ok(CrowAmsaaFit {
        shape: beta,
        scale: nf / end_time.powf(beta),
        failures: n,
        end_time,
        termination: Termination::TimeTerminated { end_time },
        iterations,
    })
}

fn validate(events: &[GrowthEvent], strictly_increasing: bool) -> Result<(), FitError> {
    let n = total_failures(events) as usize;
    if n < 2 {
        return Err(FitError::InsufficientData {
            required: 2,
            found: n,
        });
    }
    if let Some(bad) = events.iter().find(|e| !(e.time > 0.0 && e.time.is_finite())) {
        return Err(FitError::InvalidInput(format!(
            "failure times must be positive and finite, got {}",
            bad.time
        )));
    }
    let ordered = events.windows(2).all(|w| {
        if strictly_increasing {
            w[1].time > w[0].time
        } else {
            w[1].time >= w[0].time
        }
    });
    if !ordered {
        return Err(FitError::InvalidInput("failure times must be in time order".into()));
    }
    Ok(())
}

/// Raw failure rate and MTBF of one interval between successive events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalRate {
    /// End of the interval.
    pub time: f64,
    pub failures: u32,
    /// Failures per unit time in the interval (rho).
    pub rate: f64,
    /// Interval length per failure (mu).
    pub mtbf: f64,
}

/// Per-interval failure rate `F_i / (X_i - X_{i-1})` and MTBF
/// `(X_i - X_{i-1}) / F_i`, with `X_0 = 0`.
///
/// A zero-length interval repeats the previous rate, and an interval with
/// no failures repeats the previous MTBF (0.0 for the first interval).
/// Negative values, from unordered input, are clamped to 0.
pub fn interval_rates(events: &[GrowthEvent]) -> Vec<IntervalRate> {
    let mut out: Vec<IntervalRate> = Vec::with_capacity(events.len());
    let mut previous_time = 0.0;
    for event in events {
        let length = event.time - previous_time;
        let failures = f64::from(event.failures);
        let last = out.last();

        let rate = if length == 0.0 {
            tracing::debug!(time = event.time, "zero-length interval; repeating previous rate");
            last.map_or(0.0, |r| r.rate)
        } else {
            (failures / length).max(0.0)
        };
        let mtbf = if event.failures == 0 {
            last.map_or(0.0, |r| r.mtbf)
        } else {
            (length / failures).max(0.0)
        };

        out.push(IntervalRate {
            time: event.time,
            failures: event.failures,
            rate,
            mtbf,
        });
        previous_time = event.time;
    }
    out
}
