//! Confidence bounds on Crow-AMSAA estimates.
//!
//! Fisher-matrix bounds come from the inverse of the observed information
//! matrix of (λ, β) and the delta method, and are log-transformed so they
//! stay positive. Crow bounds use chi-square quantiles and depend on how the
//! test was terminated.

use serde::{Deserialize, Serialize};
use u_numflow::special;

use super::crow_amsaa::CrowAmsaaFit;
use super::Termination;
use crate::config::CalculationConfig;

/// A point estimate with lower and upper confidence bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounded {
    pub lower: f64,
    pub estimate: f64,
    pub upper: f64,
}

impl Bounded {
    fn point(estimate: f64) -> Self {
        Self {
            lower: estimate,
            estimate,
            upper: estimate,
        }
    }

    /// `estimate · exp(∓z·√variance / estimate)`.
    ///
    /// Degenerates to the point estimate when the estimate is not positive
    /// or the variance is unusable.
    fn log_normal(estimate: f64, variance: f64, z: f64) -> Self {
        if !(estimate > 0.0) || !(variance >= 0.0) || !variance.is_finite() {
            return Self::point(estimate);
        }
        let w = (z * variance.sqrt() / estimate).exp();
        Self {
            lower: estimate / w,
            estimate,
            upper: estimate * w,
        }
    }
}

/// Fisher-matrix bounds on the model and its derived metrics at `time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FisherBounds {
    pub time: f64,
    pub shape: Bounded,
    pub scale: Bounded,
    pub cumulative_intensity: Bounded,
    pub instantaneous_intensity: Bounded,
    pub cumulative_mtbf: Bounded,
    pub instantaneous_mtbf: Bounded,
}

/// Variance-covariance matrix `[[Var λ, Cov], [Cov, Var β]]` of the
/// power-law parameters for `n` failures observed to time `t`.
///
/// Inverts the information matrix
///
/// ```text
/// | n/λ²          T^β·ln T            |
/// | T^β·ln T      n/β² + λ·T^β·ln²T   |
/// ```
///
/// Returns `None` when the matrix is singular or the inputs are not
/// positive.
pub fn variance_covariance(n: f64, t: f64, lambda: f64, beta: f64) -> Option<[[f64; 2]; 2]> {
    if !(n > 0.0 && t > 0.0 && lambda > 0.0 && beta > 0.0) {
        return None;
    }
    let t_beta = t.powf(beta);
    let ln_t = t.ln();
    let i_ll = n / (lambda * lambda);
    let i_bb = n / (beta * beta) + lambda * t_beta * ln_t * ln_t;
    let i_lb = t_beta * ln_t;

    let det = i_ll * i_bb - i_lb * i_lb;
    if !(det.abs() > 1e-300) || !det.is_finite() {
        return None;
    }
    Some([[i_bb / det, -i_lb / det], [-i_lb / det, i_ll / det]])
}

/// Fisher-matrix bounds on β, λ and the intensity/MTBF curves at `time`.
///
/// The standard normal quantile is taken at `config.confidence`.
/// Returns `None` for a non-positive time or a singular information matrix.
///
/// # Examples
///
/// ```
/// use u_reliability::config::CalculationConfig;
/// use u_reliability::growth::{crow_amsaa_exact, fisher_bounds, GrowthEvent, Termination};
///
/// let events: Vec<_> = [4.0, 15.0, 30.0, 62.0, 90.0, 141.0, 188.0, 260.0]
///     .iter()
///     .map(|&t| GrowthEvent::new(t, 1))
///     .collect();
/// let fit = crow_amsaa_exact(&events, Termination::FailureTerminated).unwrap();
/// let b = fisher_bounds(&fit, 260.0, &CalculationConfig::default()).unwrap();
/// assert!(b.shape.lower < fit.shape && fit.shape < b.shape.upper);
/// ```
pub fn fisher_bounds(fit: &CrowAmsaaFit, time: f64, config: &CalculationConfig) -> Option<FisherBounds> {
    if !(time > 0.0) || !time.is_finite() {
        return None;
    }
    let (lambda, beta) = (fit.scale, fit.shape);
    let v = variance_covariance(f64::from(fit.failures), fit.end_time, lambda, beta)?;
    let z = config.z_one_sided();

    // Delta method with gradient (∂/∂λ, ∂/∂β).
    let propagate = |d_lambda: f64, d_beta: f64| {
        d_lambda * d_lambda * v[0][0] + d_beta * d_beta * v[1][1] + 2.0 * d_lambda * d_beta * v[0][1]
    };

    let ln_t = time.ln();
    let t_pow = time.powf(beta - 1.0);

    let rho_c = fit.cumulative_intensity(time);
    let rho_i = fit.instantaneous_intensity(time);
    let mu_c = fit.cumulative_mtbf(time);
    let mu_i = fit.instantaneous_mtbf(time);

    Some(FisherBounds {
        time,
        shape: Bounded::log_normal(beta, v[1][1], z),
        scale: Bounded::log_normal(lambda, v[0][0], z),
        cumulative_intensity: Bounded::log_normal(rho_c, propagate(t_pow, rho_c * ln_t), z),
        instantaneous_intensity: Bounded::log_normal(
            rho_i,
            propagate(beta * t_pow, lambda * t_pow + rho_i * ln_t),
            z,
        ),
        cumulative_mtbf: Bounded::log_normal(mu_c, propagate(-mu_c / lambda, -mu_c * ln_t), z),
        instantaneous_mtbf: Bounded::log_normal(
            mu_i,
            propagate(-mu_i / lambda, -mu_i * (1.0 / beta + ln_t)),
            z,
        ),
    })
}

/// Crow's chi-square bounds on β, λ and the cumulative failure intensity
/// at the end of the test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrowBounds {
    pub shape: Bounded,
    pub scale: Bounded,
    pub cumulative_intensity: Bounded,
}

/// Crow bounds at two-sided `confidence` (e.g. 0.90).
///
/// With α_L = (1 - confidence)/2, α_U = 1 - α_L and N failures:
///
/// | metric | time terminated | failure terminated |
/// |--------|-----------------|--------------------|
/// | β      | β·χ²(α, 2N) / (2(N-1)) | β·N·χ²(α, 2(N-1)) / (2(N-1)(N-2)) |
/// | λ lower | χ²(α_L, 2N) / (2T^β) | same |
/// | λ upper | χ²(α_U, 2N+4) / (2T^β) | χ²(α_U, 2N) / (2T^β) |
/// | ρ_c    | as λ with T in place of T^β | |
///
/// Returns `None` when there are too few failures for the formula (2 for
/// time-terminated, 3 for failure-terminated) or `confidence` is outside
/// (0, 1).
///
/// # Reference
/// Crow, L.H. (1982), "Confidence interval procedures for the Weibull
/// process with applications to reliability growth", *Technometrics* 24(1).
pub fn crow_bounds(fit: &CrowAmsaaFit, confidence: f64) -> Option<CrowBounds> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return None;
    }
    let n = f64::from(fit.failures);
    let alpha_l = (1.0 - confidence) / 2.0;
    let alpha_u = 1.0 - alpha_l;
    let beta = fit.shape;
    let t = fit.end_time;
    let t_beta = t.powf(beta);

    let time_terminated = matches!(fit.termination, Termination::TimeTerminated { .. });
    let shape = if time_terminated {
        if fit.failures < 2 {
            return None;
        }
        let k = beta / (2.0 * (n - 1.0));
        Bounded {
            lower: k * chi_squared_quantile(alpha_l, 2.0 * n)?,
            estimate: beta,
            upper: k * chi_squared_quantile(alpha_u, 2.0 * n)?,
        }
    } else {
        if fit.failures < 3 {
            return None;
        }
        let k = beta * n / (2.0 * (n - 1.0) * (n - 2.0));
        Bounded {
            lower: k * chi_squared_quantile(alpha_l, 2.0 * (n - 1.0))?,
            estimate: beta,
            upper: k * chi_squared_quantile(alpha_u, 2.0 * (n - 1.0))?,
        }
    };

    let chi_lower = chi_squared_quantile(alpha_l, 2.0 * n)?;
    let chi_upper = if time_terminated {
        chi_squared_quantile(alpha_u, 2.0 * (n + 2.0))?
    } else {
        chi_squared_quantile(alpha_u, 2.0 * n)?
    };

    Some(CrowBounds {
        shape,
        scale: Bounded {
            lower: chi_lower / (2.0 * t_beta),
            estimate: fit.scale,
            upper: chi_upper / (2.0 * t_beta),
        },
        cumulative_intensity: Bounded {
            lower: chi_lower / (2.0 * t),
            estimate: fit.cumulative_intensity(t),
            upper: chi_upper / (2.0 * t),
        },
    })
}

/// Inverse of the chi-square CDF by bracketing and bisection.
pub(crate) fn chi_squared_quantile(p: f64, df: f64) -> Option<f64> {
    if !(p > 0.0 && p < 1.0) || !(df > 0.0) {
        return None;
    }
    let mut lo = 0.0_f64;
    let mut hi = df.max(1.0);
    while special::chi_squared_cdf(hi, df) < p {
        lo = hi;
        hi *= 2.0;
        if !hi.is_finite() {
            return None;
        }
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if special::chi_squared_cdf(mid, df) < p {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= 1e-12 * hi.max(1.0) {
            break;
        }
    }
    Some(0.5 * (lo + hi))
}
