//! Parametric life-distribution fitting.
//!
//! Two methods are offered for each of the exponential, normal, lognormal
//! and Weibull families:
//!
//! - maximum likelihood on right-censored data, routed through a
//!   [`StatisticalBackend`] so an external package can take over;
//! - rank regression on a probability plot with Johnson-adjusted median
//!   ranks, always computed in process.
//!
//! Left- and interval-censored records enter both methods as failures at
//! their [`IncidentRecord::event_time`].

use serde::{Deserialize, Serialize};
use u_numflow::special;

use super::backend::StatisticalBackend;
use super::weibull::{median_ranks, weibull_mle, weibull_rank_regression};
use super::{failures_and_suspensions, IncidentRecord};
use crate::error::FitError;
use crate::regression::{fit_line, fit_through_origin};

/// Life-distribution family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Distribution {
    Exponential,
    LogNormal,
    Normal,
    Weibull,
}

impl Distribution {
    /// Parses the family's noun name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "exponential" | "exp" => Some(Self::Exponential),
            "lognormal" | "lnorm" => Some(Self::LogNormal),
            "normal" | "norm" | "gaussian" => Some(Self::Normal),
            "weibull" => Some(Self::Weibull),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FitMethod {
    RankRegression,
    #[default]
    MaximumLikelihood,
}

/// Fitted parameters of one family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DistributionParameters {
    Exponential { rate: f64 },
    Normal { mean: f64, std_dev: f64 },
    /// Parameters of `ln t`.
    LogNormal { mu: f64, sigma: f64 },
    Weibull { shape: f64, scale: f64 },
}

impl DistributionParameters {
    pub fn distribution(&self) -> Distribution {
        match self {
            Self::Exponential { .. } => Distribution::Exponential,
            Self::Normal { .. } => Distribution::Normal,
            Self::LogNormal { .. } => Distribution::LogNormal,
            Self::Weibull { .. } => Distribution::Weibull,
        }
    }

    /// Reliability (survival) function R(t).
    ///
    /// # Examples
    ///
    /// ```
    /// use u_reliability::survival::DistributionParameters;
    ///
    /// let w = DistributionParameters::Weibull { shape: 2.0, scale: 100.0 };
    /// assert!((w.reliability(100.0) - (-1.0_f64).exp()).abs() < 1e-12);
    /// assert_eq!(w.reliability(0.0), 1.0);
    /// ```
    pub fn reliability(&self, t: f64) -> f64 {
        match *self {
            Self::Exponential { rate } => {
                if t <= 0.0 {
                    1.0
                } else {
                    (-rate * t).exp()
                }
            }
            Self::Normal { mean, std_dev } => 1.0 - special::standard_normal_cdf((t - mean) / std_dev),
            Self::LogNormal { mu, sigma } => {
                if t <= 0.0 {
                    1.0
                } else {
                    1.0 - special::standard_normal_cdf((t.ln() - mu) / sigma)
                }
            }
            Self::Weibull { shape, scale } => {
                if t <= 0.0 {
                    1.0
                } else {
                    (-(t / scale).powf(shape)).exp()
                }
            }
        }
    }

    /// Theoretical CDF F(t) = 1 - R(t).
    pub fn cdf(&self, t: f64) -> f64 {
        1.0 - self.reliability(t)
    }

    /// Instantaneous hazard rate h(t) = f(t)/R(t).
    pub fn hazard_rate(&self, t: f64) -> f64 {
        match *self {
            Self::Exponential { rate } => rate,
            Self::Normal { mean, std_dev } => inverse_mills((t - mean) / std_dev) / std_dev,
            Self::LogNormal { mu, sigma } => {
                if t <= 0.0 {
                    0.0
                } else {
                    inverse_mills((t.ln() - mu) / sigma) / (sigma * t)
                }
            }
            Self::Weibull { shape, scale } => {
                if t <= 0.0 {
                    0.0
                } else {
                    (shape / scale) * (t / scale).powf(shape - 1.0)
                }
            }
        }
    }

    /// Mean life (MTTF).
    pub fn mean_life(&self) -> f64 {
        match *self {
            Self::Exponential { rate } => 1.0 / rate,
            Self::Normal { mean, .. } => mean,
            Self::LogNormal { mu, sigma } => (mu + 0.5 * sigma * sigma).exp(),
            Self::Weibull { shape, scale } => scale * special::ln_gamma(1.0 + 1.0 / shape).exp(),
        }
    }
}

/// Outcome of a parametric fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParametricFit {
    pub parameters: DistributionParameters,
    pub method: FitMethod,
    /// Censored log-likelihood at the fitted parameters.
    pub log_likelihood: f64,
    /// R² of the probability plot; `None` for maximum likelihood.
    pub r_squared: Option<f64>,
    pub failures: usize,
    pub suspensions: usize,
    /// Solver iterations; 0 for closed forms and regression.
    pub iterations: usize,
}

/// Selection and time window for [`parametric_fit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    pub distribution: Distribution,
    pub method: FitMethod,
    /// Records at or before this time are excluded.
    pub start_time: f64,
    /// Records after this time are excluded; 0 disables the limit.
    pub release_time: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            distribution: Distribution::Exponential,
            method: FitMethod::MaximumLikelihood,
            start_time: 0.0,
            release_time: 0.0,
        }
    }
}

/// Fits `options.distribution` to the records inside the time window.
///
/// Maximum likelihood goes through `backend`; rank regression is always
/// computed in process.
///
/// # Errors
///
/// [`FitError::InsufficientData`] when the window holds too few records or
/// failures, [`FitError::NonConvergence`] when an iterative solver gives up,
/// and [`FitError::InvalidInput`] for data the family cannot describe
/// (for example non-positive lognormal times).
///
/// # Examples
///
/// ```
/// use u_reliability::survival::{
///     parametric_fit, DistributionParameters, FitOptions, IncidentRecord, InProcessBackend,
/// };
///
/// let records = vec![
///     IncidentRecord::exact(100.0),
///     IncidentRecord::exact(300.0),
///     IncidentRecord::right_censored(600.0),
/// ];
/// let fit = parametric_fit(&records, &FitOptions::default(), &InProcessBackend).unwrap();
/// assert_eq!(fit.parameters, DistributionParameters::Exponential { rate: 2.0 / 1000.0 });
/// ```
pub fn parametric_fit(
    records: &[IncidentRecord],
    options: &FitOptions,
    backend: &dyn StatisticalBackend,
) -> Result<ParametricFit, FitError> {
    let window: Vec<IncidentRecord> = records
        .iter()
        .copied()
        .filter(|r| {
            let t = r.event_time();
            t > options.start_time && (options.release_time <= 0.0 || t <= options.release_time)
        })
        .collect();

    match options.method {
        FitMethod::MaximumLikelihood => backend.fit_censored(options.distribution, &window),
        FitMethod::RankRegression => {
            let (failures, suspensions) = split(&window)?;
            rank_regression(options.distribution, &failures, &suspensions)
        }
    }
}

/// Failure and suspension times of `records`, requiring at least two
/// records.
pub(crate) fn split(records: &[IncidentRecord]) -> Result<(Vec<f64>, Vec<f64>), FitError> {
    let (failures, suspensions) = failures_and_suspensions(records, f64::NEG_INFINITY, 0.0);
    let total = failures.len() + suspensions.len();
    if total < 2 {
        return Err(FitError::InsufficientData {
            required: 2,
            found: total,
        });
    }
    Ok((failures, suspensions))
}

/// In-process censored maximum likelihood.
pub(crate) fn maximum_likelihood(
    distribution: Distribution,
    failures: &[f64],
    suspensions: &[f64],
) -> Result<ParametricFit, FitError> {
    let (parameters, iterations) = match distribution {
        Distribution::Exponential => (exponential_mle(failures, suspensions)?, 0),
        Distribution::Weibull => {
            let fit = weibull_mle(failures, suspensions)?;
            (
                DistributionParameters::Weibull {
                    shape: fit.shape,
                    scale: fit.scale,
                },
                fit.iterations,
            )
        }
        Distribution::Normal => {
            require_finite(failures, suspensions)?;
            let (mean, std_dev, iterations) = normal_mle(failures, suspensions)?;
            (DistributionParameters::Normal { mean, std_dev }, iterations)
        }
        Distribution::LogNormal => {
            require_positive(failures, suspensions)?;
            let ln_f: Vec<f64> = failures.iter().map(|t| t.ln()).collect();
            let ln_s: Vec<f64> = suspensions.iter().map(|t| t.ln()).collect();
            let (mu, sigma, iterations) = normal_mle(&ln_f, &ln_s)?;
            (DistributionParameters::LogNormal { mu, sigma }, iterations)
        }
    };

    Ok(ParametricFit {
        parameters,
        method: FitMethod::MaximumLikelihood,
        log_likelihood: log_likelihood(&parameters, failures, suspensions),
        r_squared: None,
        failures: failures.len(),
        suspensions: suspensions.len(),
        iterations,
    })
}

fn rank_regression(
    distribution: Distribution,
    failures: &[f64],
    suspensions: &[f64],
) -> Result<ParametricFit, FitError> {
    let (parameters, r_squared) = match distribution {
        Distribution::Weibull => {
            let fit = weibull_rank_regression(failures, suspensions)?;
            (
                DistributionParameters::Weibull {
                    shape: fit.shape,
                    scale: fit.scale,
                },
                fit.r_squared,
            )
        }
        Distribution::Exponential => {
            if failures.is_empty() {
                return Err(FitError::InsufficientData {
                    required: 1,
                    found: 0,
                });
            }
            require_non_negative(failures, suspensions)?;
            let (t, y): (Vec<f64>, Vec<f64>) = median_ranks(failures, suspensions)
                .into_iter()
                .map(|(t, f)| (t, -(1.0 - f).ln()))
                .unzip();
            let rate = fit_through_origin(&t, &y)
                .filter(|r| *r > 0.0)
                .ok_or_else(|| FitError::InvalidInput("all failures at time zero".into()))?;
            let mean_y = y.iter().sum::<f64>() / y.len() as f64;
            let ss_tot: f64 = y.iter().map(|v| (v - mean_y).powi(2)).sum();
            let ss_res: f64 = t.iter().zip(&y).map(|(t, v)| (v - rate * t).powi(2)).sum();
            let r_squared = if ss_tot > 1e-300 { 1.0 - ss_res / ss_tot } else { 1.0 };
            (DistributionParameters::Exponential { rate }, Some(r_squared))
        }
        Distribution::Normal | Distribution::LogNormal => {
            if failures.len() < 3 {
                return Err(FitError::InsufficientData {
                    required: 3,
                    found: failures.len(),
                });
            }
            let log_scale = distribution == Distribution::LogNormal;
            if log_scale {
                require_positive(failures, suspensions)?;
            } else {
                require_finite(failures, suspensions)?;
            }
            let (x, y): (Vec<f64>, Vec<f64>) = median_ranks(failures, suspensions)
                .into_iter()
                .map(|(t, f)| {
                    let x = if log_scale { t.ln() } else { t };
                    (x, special::inverse_normal_cdf(f))
                })
                .unzip();
            let line = fit_line(&x, &y)
                .ok_or_else(|| FitError::InvalidInput("degenerate probability plot".into()))?;
            if line.slope <= 0.0 {
                return Err(FitError::InvalidInput(format!(
                    "non-positive plot slope {}",
                    line.slope
                )));
            }
            let sigma = 1.0 / line.slope;
            let location = -line.intercept / line.slope;
            let parameters = if log_scale {
                DistributionParameters::LogNormal { mu: location, sigma }
            } else {
                DistributionParameters::Normal {
                    mean: location,
                    std_dev: sigma,
                }
            };
            (parameters, Some(line.r_squared))
        }
    };

    Ok(ParametricFit {
        parameters,
        method: FitMethod::RankRegression,
        log_likelihood: log_likelihood(&parameters, failures, suspensions),
        r_squared,
        failures: failures.len(),
        suspensions: suspensions.len(),
        iterations: 0,
    })
}

fn exponential_mle(failures: &[f64], suspensions: &[f64]) -> Result<DistributionParameters, FitError> {
    if failures.is_empty() {
        return Err(FitError::InsufficientData {
            required: 1,
            found: 0,
        });
    }
    require_non_negative(failures, suspensions)?;
    let exposure: f64 = failures.iter().chain(suspensions).sum();
    if exposure <= 0.0 {
        return Err(FitError::InvalidInput("zero total exposure".into()));
    }
    Ok(DistributionParameters::Exponential {
        rate: failures.len() as f64 / exposure,
    })
}

/// Maximum EM iterations for the censored normal.
const MAX_ITER: usize = 500;

/// Relative convergence tolerance.
const TOL: f64 = 1e-10;

/// Censored-normal MLE by expectation-maximisation, started from the
/// moments of all observations.
///
/// Each suspension `c` is replaced by its conditional moments given
/// `X > c`: mean `μ + σh` and variance `σ²(1 + zh - h²)`, where `h` is
/// the inverse Mills ratio at `z = (c - μ)/σ`.
fn normal_mle(failures: &[f64], suspensions: &[f64]) -> Result<(f64, f64, usize), FitError> {
    if failures.len() < 2 {
        return Err(FitError::InsufficientData {
            required: 2,
            found: failures.len(),
        });
    }
    let all: Vec<f64> = failures.iter().chain(suspensions).copied().collect();
    let n = all.len() as f64;

    let mut mu = all.iter().sum::<f64>() / n;
    let mut sigma = (all.iter().map(|x| (x - mu).powi(2)).sum::<f64>() / n).sqrt();
    if sigma <= 0.0 || !sigma.is_finite() {
        return Err(FitError::InvalidInput("observations have zero spread".into()));
    }
    if suspensions.is_empty() {
        return Ok((mu, sigma, 0));
    }

    for iter in 0..MAX_ITER {
        let mut sum = failures.iter().sum::<f64>();
        let mut conditional = Vec::with_capacity(suspensions.len());
        for &c in suspensions {
            let z = (c - mu) / sigma;
            let h = inverse_mills(z);
            let m = mu + sigma * h;
            let v = sigma * sigma * (1.0 + z * h - h * h).max(0.0);
            sum += m;
            conditional.push((m, v));
        }
        let mu_new = sum / n;
        let ss: f64 = failures.iter().map(|x| (x - mu_new).powi(2)).sum::<f64>()
            + conditional
                .iter()
                .map(|(m, v)| v + (m - mu_new).powi(2))
                .sum::<f64>();
        let sigma_new = (ss / n).sqrt();
        if sigma_new <= 0.0 || !sigma_new.is_finite() || !mu_new.is_finite() {
            break;
        }

        let done = (mu_new - mu).abs() < TOL * (1.0 + mu.abs())
            && (sigma_new - sigma).abs() < TOL * (1.0 + sigma);
        mu = mu_new;
        sigma = sigma_new;
        if done {
            return Ok((mu, sigma, iter + 1));
        }
    }

    tracing::debug!(mu, sigma, "censored normal EM did not converge");
    Err(FitError::NonConvergence {
        iterations: MAX_ITER,
    })
}

/// φ(z) / (1 - Φ(z)), switching to the asymptotic form deep in the tail.
fn inverse_mills(z: f64) -> f64 {
    let tail = 1.0 - special::standard_normal_cdf(z);
    if tail > 1e-12 {
        normal_pdf(z) / tail
    } else {
        z + 1.0 / z
    }
}

fn normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

fn ln_tail(z: f64) -> f64 {
    (1.0 - special::standard_normal_cdf(z)).max(1e-300).ln()
}

/// Right-censored log-likelihood of `parameters`.
fn log_likelihood(parameters: &DistributionParameters, failures: &[f64], suspensions: &[f64]) -> f64 {
    let ln_2pi_half = 0.5 * (2.0 * std::f64::consts::PI).ln();
    match *parameters {
        DistributionParameters::Exponential { rate } => {
            failures.len() as f64 * rate.ln() - rate * failures.iter().chain(suspensions).sum::<f64>()
        }
        DistributionParameters::Weibull { shape, scale } => {
            failures
                .iter()
                .map(|&t| shape.ln() - shape * scale.ln() + (shape - 1.0) * t.ln())
                .sum::<f64>()
                - failures
                    .iter()
                    .chain(suspensions)
                    .map(|&t| (t / scale).powf(shape))
                    .sum::<f64>()
        }
        DistributionParameters::Normal { mean, std_dev } => {
            failures
                .iter()
                .map(|&x| {
                    let z = (x - mean) / std_dev;
                    -std_dev.ln() - ln_2pi_half - 0.5 * z * z
                })
                .sum::<f64>()
                + suspensions
                    .iter()
                    .map(|&c| ln_tail((c - mean) / std_dev))
                    .sum::<f64>()
        }
        DistributionParameters::LogNormal { mu, sigma } => {
            failures
                .iter()
                .map(|&t| {
                    let z = (t.ln() - mu) / sigma;
                    -sigma.ln() - t.ln() - ln_2pi_half - 0.5 * z * z
                })
                .sum::<f64>()
                + suspensions
                    .iter()
                    .map(|&c| ln_tail((c.ln() - mu) / sigma))
                    .sum::<f64>()
        }
    }
}

fn require_finite(failures: &[f64], suspensions: &[f64]) -> Result<(), FitError> {
    if failures.iter().chain(suspensions).all(|t| t.is_finite()) {
        Ok(())
    } else {
        Err(FitError::InvalidInput("times must be finite".into()))
    }
}

fn require_non_negative(failures: &[f64], suspensions: &[f64]) -> Result<(), FitError> {
    if failures
        .iter()
        .chain(suspensions)
        .all(|&t| t.is_finite() && t >= 0.0)
    {
        Ok(())
    } else {
        Err(FitError::InvalidInput("times must be non-negative".into()))
    }
}

fn require_positive(failures: &[f64], suspensions: &[f64]) -> Result<(), FitError> {
    if failures
        .iter()
        .chain(suspensions)
        .all(|&t| t.is_finite() && t > 0.0)
    {
        Ok(())
    } else {
        Err(FitError::InvalidInput("times must be positive".into()))
    }
}
