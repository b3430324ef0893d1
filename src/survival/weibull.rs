//! Weibull estimation from failure and suspension times.
//!
//! Maximum likelihood uses Newton-Raphson on the censored profile
//! likelihood; rank regression uses median ranks with Johnson's adjustment
//! for suspensions.

use serde::{Deserialize, Serialize};

use crate::error::FitError;
use crate::regression::fit_line;

/// Fitted two-parameter Weibull.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeibullFit {
    /// Shape parameter (beta).
    pub shape: f64,
    /// Scale parameter (eta).
    pub scale: f64,
    /// Censored log-likelihood at the fitted parameters.
    pub log_likelihood: f64,
    /// R² of the probability-plot regression; `None` for MLE.
    pub r_squared: Option<f64>,
    /// Newton-Raphson iterations used; 0 for rank regression.
    pub iterations: usize,
}

/// Maximum Newton-Raphson iterations.
const MAX_ITER: usize = 100;

/// Convergence tolerance for Newton-Raphson.
const TOL: f64 = 1e-10;

/// Fit a Weibull distribution by maximum likelihood with right censoring.
///
/// With r failures tᵢ and all n observation times tⱼ (failures and
/// suspensions), the profile equation for beta is
///
/// ```text
/// f(beta) = r/beta + sum_F(ln t_i)
///         - r * sum(t_j^beta * ln t_j) / sum(t_j^beta) = 0
/// ```
///
/// and `eta = (sum(t_j^beta) / r)^(1/beta)`. Newton-Raphson starts from
/// beta_0 = 1.2.
///
/// # Errors
/// - [`FitError::InsufficientData`] with fewer than 2 failures.
/// - [`FitError::InvalidInput`] for non-positive or non-finite times.
/// - [`FitError::NonConvergence`] when Newton-Raphson stalls.
///
/// # Examples
///
/// ```
/// use u_reliability::survival::weibull_mle;
///
/// let failures = [12.0, 25.0, 31.0, 44.0, 58.0, 70.0];
/// let fit = weibull_mle(&failures, &[80.0, 80.0]).unwrap();
/// assert!(fit.shape > 0.0 && fit.scale > 58.0);
/// ```
///
/// # Reference
/// Lawless (2003), *Statistical Models and Methods for Lifetime Data*, 2nd ed.
pub fn weibull_mle(failures: &[f64], suspensions: &[f64]) -> Result<WeibullFit, FitError> {
    validate(failures, suspensions)?;

    let r = failures.len() as f64;
    let all: Vec<f64> = failures.iter().chain(suspensions).copied().collect();
    let ln_all: Vec<f64> = all.iter().map(|t| t.ln()).collect();
    let sum_ln_f: f64 = failures.iter().map(|t| t.ln()).sum();

    let mut beta = 1.2_f64;
    let mut iterations = 0;
    let mut converged = false;

    for iter in 0..MAX_ITER {
        iterations = iter + 1;

        let mut s0 = 0.0_f64;
        let mut s1 = 0.0_f64;
        let mut s2 = 0.0_f64;
        for (&t, &lt) in all.iter().zip(&ln_all) {
            let t_beta = t.powf(beta);
            s0 += t_beta;
            s1 += t_beta * lt;
            s2 += t_beta * lt * lt;
        }
        if s0 == 0.0 || !s0.is_finite() {
            break;
        }

        let f_val = r / beta + sum_ln_f - r * s1 / s0;
        let f_prime = -r / (beta * beta) - r * (s2 * s0 - s1 * s1) / (s0 * s0);
        if f_prime.abs() < 1e-30 {
            break;
        }

        let delta = f_val / f_prime;
        beta -= delta;
        if beta <= 0.0 {
            beta = 0.01;
        }
        if delta.abs() < TOL {
            converged = true;
            break;
        }
    }

    if !converged {
        tracing::debug!(iterations, beta, "Weibull MLE did not converge");
        return Err(FitError::NonConvergence { iterations });
    }

    let s0: f64 = all.iter().map(|t| t.powf(beta)).sum();
    let eta = (s0 / r).powf(1.0 / beta);
    if !eta.is_finite() || eta <= 0.0 {
        return Err(FitError::NonConvergence { iterations });
    }

    Ok(WeibullFit {
        shape: beta,
        scale: eta,
        log_likelihood: log_likelihood(beta, eta, failures, suspensions),
        r_squared: None,
        iterations,
    })
}

/// Fit a Weibull distribution by median rank regression.
///
/// Regresses `ln(-ln(1 - F))` on `ln t` over the failures, where `F` is
/// Bernard's approximation applied to Johnson-adjusted ranks:
///
/// ```text
/// rank_i = rank_{i-1} + (N + 1 - rank_{i-1}) / (1 + reverse_rank_i)
/// F_i    = (rank_i - 0.3) / (N + 0.4)
/// ```
///
/// With no suspensions the adjusted ranks are simply 1..n. At least three
/// failures are needed for the line to have residual degrees of freedom.
///
/// # Reference
/// Abernethy (2006), *The New Weibull Handbook*, 5th ed., ch. 2.
pub fn weibull_rank_regression(failures: &[f64], suspensions: &[f64]) -> Result<WeibullFit, FitError> {
    validate(failures, suspensions)?;
    if failures.len() < 3 {
        return Err(FitError::InsufficientData {
            required: 3,
            found: failures.len(),
        });
    }
    if failures.iter().all(|&t| t == failures[0]) {
        return Err(FitError::InvalidInput("all failure times are identical".into()));
    }

    let (x, y): (Vec<f64>, Vec<f64>) = median_ranks(failures, suspensions)
        .into_iter()
        .map(|(t, f)| (t.ln(), (-(1.0 - f).ln()).ln()))
        .unzip();

    let line = fit_line(&x, &y)
        .ok_or_else(|| FitError::InvalidInput("degenerate probability plot".into()))?;

    let beta = line.slope;
    if beta <= 0.0 || !beta.is_finite() {
        return Err(FitError::InvalidInput(format!("non-positive slope {beta}")));
    }
    let eta = (-line.intercept / beta).exp();
    if !eta.is_finite() || eta <= 0.0 {
        return Err(FitError::InvalidInput(format!("scale {eta} out of range")));
    }

    Ok(WeibullFit {
        shape: beta,
        scale: eta,
        log_likelihood: log_likelihood(beta, eta, failures, suspensions),
        r_squared: Some(line.r_squared),
        iterations: 0,
    })
}

fn validate(failures: &[f64], suspensions: &[f64]) -> Result<(), FitError> {
    if failures.len() < 2 {
        return Err(FitError::InsufficientData {
            required: 2,
            found: failures.len(),
        });
    }
    if !failures
        .iter()
        .chain(suspensions)
        .all(|&t| t.is_finite() && t > 0.0)
    {
        return Err(FitError::InvalidInput(
            "times must be positive and finite".into(),
        ));
    }
    Ok(())
}

fn log_likelihood(beta: f64, eta: f64, failures: &[f64], suspensions: &[f64]) -> f64 {
    let r = failures.len() as f64;
    let sum_ln_f: f64 = failures.iter().map(|t| t.ln()).sum();
    r * beta.ln() - r * beta * eta.ln() + (beta - 1.0) * sum_ln_f
        - failures
            .iter()
            .chain(suspensions)
            .map(|&t| (t / eta).powf(beta))
            .sum::<f64>()
}

/// `(time, F)` for each failure, in time order, using Johnson-adjusted
/// ranks and Bernard's approximation. Failures sort ahead of suspensions
/// at the same time.
pub(crate) fn median_ranks(failures: &[f64], suspensions: &[f64]) -> Vec<(f64, f64)> {
    let mut ordered: Vec<(f64, bool)> = failures
        .iter()
        .map(|&t| (t, true))
        .chain(suspensions.iter().map(|&t| (t, false)))
        .collect();
    ordered.sort_by(|a, b| a.0.total_cmp(&b.0).then(b.1.cmp(&a.1)));

    let n = ordered.len() as f64;
    let mut rank = 0.0;
    let mut out = Vec::with_capacity(failures.len());
    for (position, &(t, failed)) in ordered.iter().enumerate() {
        if !failed {
            continue;
        }
        let reverse_rank = n - position as f64;
        rank += (n + 1.0 - rank) / (1.0 + reverse_rank);
        out.push((t, (rank - 0.3) / (n + 0.4)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Quantiles of Weibull(beta, eta) at (i - 0.5)/n.
    fn quantiles(beta: f64, eta: f64, n: usize) -> Vec<f64> {
        (1..=n)
            .map(|i| {
                let f = (i as f64 - 0.5) / n as f64;
                eta * (-(1.0 - f).ln()).powf(1.0 / beta)
            })
            .collect()
    }

    #[test]
    fn test_mle_uncensored_recovers_parameters() {
        let data = quantiles(2.0, 50.0, 10);
        let fit = weibull_mle(&data, &[]).expect("MLE should converge");
        assert!(
            (fit.shape - 2.0).abs() < 0.5,
            "shape = {}, expected near 2.0",
            fit.shape
        );
        assert!(
            (fit.scale - 50.0).abs() < 15.0,
            "scale = {}, expected near 50.0",
            fit.scale
        );
        assert!(fit.r_squared.is_none());
        assert!(fit.log_likelihood.is_finite());
    }

    #[test]
    fn test_mle_with_type_one_censoring() {
        let all = quantiles(1.5, 100.0, 30);
        let cutoff = 120.0;
        let failures: Vec<f64> = all.iter().copied().filter(|&t| t <= cutoff).collect();
        let suspensions = vec![cutoff; all.len() - failures.len()];
        assert!(!suspensions.is_empty());

        let fit = weibull_mle(&failures, &suspensions).expect("MLE should converge");
        assert!(
            (fit.shape - 1.5).abs() < 0.5,
            "shape = {}, expected near 1.5",
            fit.shape
        );
        assert!(
            (fit.scale - 100.0).abs() < 30.0,
            "scale = {}, expected near 100",
            fit.scale
        );

        let naive = weibull_mle(&failures, &[]).expect("MLE should converge");
        assert!(
            fit.scale > naive.scale,
            "suspensions should push the scale out: {} vs {}",
            fit.scale,
            naive.scale
        );
    }

    #[test]
    fn test_mle_errors_are_distinct() {
        assert_eq!(
            weibull_mle(&[10.0], &[20.0]),
            Err(FitError::InsufficientData {
                required: 2,
                found: 1
            })
        );
        assert!(matches!(
            weibull_mle(&[0.0, 10.0], &[]),
            Err(FitError::InvalidInput(_))
        ));
        assert!(matches!(
            weibull_mle(&[10.0, 20.0], &[f64::NAN]),
            Err(FitError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_johnson_ranks_without_suspensions_are_plain() {
        let ranks = median_ranks(&[30.0, 10.0, 20.0], &[]);
        let expected: Vec<f64> = (1..=3).map(|i| (i as f64 - 0.3) / 3.4).collect();
        for ((t, f), e) in ranks.iter().zip(&expected) {
            assert!((f - e).abs() < 1e-12, "t={t}: F={f}, expected {e}");
        }
        assert_eq!(ranks[0].0, 10.0);
    }

    #[test]
    fn test_johnson_ranks_with_suspensions() {
        let ranks = median_ranks(&[10.0, 30.0, 40.0], &[20.0, 50.0]);
        let adjusted: [f64; 3] = [1.0, 2.25, 3.5];
        for ((_, f), r) in ranks.iter().zip(adjusted) {
            assert!((f - (r - 0.3) / 5.4).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rank_regression() {
        let data = quantiles(2.0, 50.0, 12);
        let fit = weibull_rank_regression(&data, &[]).expect("regression should fit");
        assert!((fit.shape - 2.0).abs() < 0.5, "shape = {}", fit.shape);
        assert!((fit.scale - 50.0).abs() < 10.0, "scale = {}", fit.scale);
        assert!(fit.r_squared.is_some_and(|r2| r2 > 0.95));
    }

    #[test]
    fn test_rank_regression_identical_times() {
        assert!(matches!(
            weibull_rank_regression(&[5.0, 5.0, 5.0], &[]),
            Err(FitError::InvalidInput(_))
        ));
    }
}
