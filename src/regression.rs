//! Least-squares lines for probability plots and growth curves.
//!
//! Rank-regression fits straighten a distribution's CDF on transformed axes
//! and read the parameters off a fitted line; the Duane growth model is a
//! line on log-log axes. Both need the same OLS fit with coefficient
//! standard errors.
//!
//! # Examples
//!
//! ```
//! use u_reliability::regression::fit_line;
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let y = [2.1, 3.9, 6.1, 7.9, 10.1];
//! let line = fit_line(&x, &y).unwrap();
//! assert!((line.slope - 2.0).abs() < 0.1);
//! assert!(line.r_squared > 0.99);
//! ```

use u_numflow::stats;

/// Fitted line `y = intercept + slope · x`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination (R²).
    pub r_squared: f64,
    /// Standard error of the slope.
    pub slope_se: f64,
    /// Standard error of the intercept.
    pub intercept_se: f64,
    /// Residual standard error (√(SSE/(n-2))).
    pub residual_se: f64,
    /// Sample size.
    pub n: usize,
}

impl LineFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares of `y` on `x`.
///
/// β₁ = cov(x,y) / var(x), β₀ = ȳ - β₁·x̄.
///
/// # Returns
///
/// `None` if fewer than 3 observations, slices differ in length, x has zero
/// variance, or inputs contain non-finite values.
///
/// # References
///
/// Draper & Smith (1998). "Applied Regression Analysis", 3rd edition.
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<LineFit> {
    let n = x.len();
    if n < 3 || n != y.len() {
        return None;
    }
    if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let x_mean = stats::mean(x)?;
    let y_mean = stats::mean(y)?;
    let x_var = stats::variance(x)?;
    let cov = stats::covariance(x, y)?;

    if x_var < 1e-300 {
        return None; // zero variance in x
    }

    let slope = cov / x_var;
    let intercept = y_mean - slope * x_mean;

    let ss_res: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| (yi - intercept - slope * xi).powi(2))
        .sum();
    let ss_tot: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();

    let nf = n as f64;
    let r_squared = if ss_tot > 1e-300 {
        1.0 - ss_res / ss_tot
    } else {
        1.0
    };

    let mse = ss_res / (nf - 2.0);
    let ss_x: f64 = x.iter().map(|&xi| (xi - x_mean).powi(2)).sum();

    Some(LineFit {
        slope,
        intercept,
        r_squared,
        slope_se: (mse / ss_x).sqrt(),
        intercept_se: (mse * (1.0 / nf + x_mean * x_mean / ss_x)).sqrt(),
        residual_se: mse.sqrt(),
        n,
    })
}

/// Least-squares slope of a line forced through the origin, `y = slope · x`.
///
/// Returns `None` when every `x` is zero or the inputs are empty, mismatched
/// or non-finite.
pub fn fit_through_origin(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.is_empty() || x.len() != y.len() {
        return None;
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return None;
    }
    let sxx: f64 = x.iter().map(|v| v * v).sum();
    if sxx < 1e-300 {
        return None;
    }
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    Some(sxy / sxx)
}
