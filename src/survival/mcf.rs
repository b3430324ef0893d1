//! Mean cumulative function for recurrent failures of repairable units.

use serde::{Deserialize, Serialize};

use crate::config::CalculationConfig;
use crate::guard::divide_or_zero;

/// Failure history of one repairable unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitHistory {
    pub unit: String,
    /// Failure times, in any order; repeats are separate failures.
    pub failures: Vec<f64>,
    /// End of observation. Defaults to the unit's last failure.
    pub end_time: Option<f64>,
}

impl UnitHistory {
    fn end(&self) -> f64 {
        self.end_time
            .unwrap_or_else(|| self.failures.iter().copied().fold(0.0, f64::max))
    }
}

/// MCF estimate at one distinct failure time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct McfPoint {
    pub time: f64,
    /// δ·, units still under observation.
    pub at_risk: u64,
    /// d·, failures among units at risk.
    pub events: f64,
    /// d̄ = d· / δ·.
    pub mean_events: f64,
    pub mcf: f64,
    pub variance: f64,
    pub lower: f64,
    pub upper: f64,
    pub mtbf_cumulative: f64,
    pub mtbf_cumulative_lower: f64,
    pub mtbf_cumulative_upper: f64,
    pub mtbf_instantaneous: f64,
    pub mtbf_instantaneous_lower: f64,
    pub mtbf_instantaneous_upper: f64,
}

/// Non-parametric MCF (Nelson) over the distinct failure times of `units`.
///
/// A unit is at risk at every failure time up to its end of observation.
/// The variance at tᵢ is `Σ_units (Σ_{k≤i} (δ/δ·)(d - d̄))²`; bounds are
/// `MCF ± z·√var` with the lower bound floored at zero. MTBF values whose
/// divisor is zero are reported as 0.0.
///
/// # Examples
///
/// ```
/// use u_reliability::config::CalculationConfig;
/// use u_reliability::survival::{mean_cumulative_function, UnitHistory};
///
/// let units = vec![
///     UnitHistory { unit: "SN1".into(), failures: vec![1.0, 3.0], end_time: Some(4.0) },
///     UnitHistory { unit: "SN2".into(), failures: vec![2.0], end_time: Some(4.0) },
/// ];
/// let mcf = mean_cumulative_function(&units, &CalculationConfig::default());
/// assert_eq!(mcf.len(), 3);
/// assert!((mcf[2].mcf - 1.5).abs() < 1e-12);
/// ```
pub fn mean_cumulative_function(units: &[UnitHistory], config: &CalculationConfig) -> Vec<McfPoint> {
    let mut times: Vec<f64> = units
        .iter()
        .flat_map(|u| u.failures.iter().copied())
        .filter(|t| t.is_finite())
        .collect();
    times.sort_by(f64::total_cmp);
    times.dedup();

    let ends: Vec<f64> = units.iter().map(UnitHistory::end).collect();
    let z = config.z_one_sided();

    // Per-unit running Σ (δ/δ·)(d - d̄).
    let mut deviations = vec![0.0_f64; units.len()];
    let mut mcf = 0.0;
    let mut previous = (0.0, 0.0, 0.0, 0.0); // time, mcf, lower, upper
    let mut out = Vec::with_capacity(times.len());

    for &time in &times {
        let node = format!("t={time}");
        let at_risk: Vec<bool> = ends.iter().map(|&end| time <= end).collect();
        let counts: Vec<f64> = units
            .iter()
            .map(|u| u.failures.iter().filter(|&&t| t == time).count() as f64)
            .collect();

        let delta_dot = at_risk.iter().filter(|&&r| r).count();
        let d_dot: f64 = counts
            .iter()
            .zip(&at_risk)
            .filter(|(_, r)| **r)
            .map(|(d, _)| d)
            .sum();
        let d_bar = divide_or_zero(d_dot, delta_dot as f64, &node, "at_risk");
        mcf += d_bar;

        for ((dev, &d), &risk) in deviations.iter_mut().zip(&counts).zip(&at_risk) {
            if risk {
                *dev += (d - d_bar) / delta_dot as f64;
            }
        }
        let variance: f64 = deviations.iter().map(|v| v * v).sum();
        let half_width = z * variance.sqrt();
        let lower = (mcf - half_width).max(0.0);
        let upper = mcf + half_width;

        let (t_prev, mcf_prev, lower_prev, upper_prev) = previous;
        let dt = time - t_prev;

        out.push(McfPoint {
            time,
            at_risk: delta_dot as u64,
            events: d_dot,
            mean_events: d_bar,
            mcf,
            variance,
            lower,
            upper,
            mtbf_cumulative: divide_or_zero(time, mcf, &node, "mcf"),
            mtbf_cumulative_lower: divide_or_zero(time, upper, &node, "mcf_upper"),
            mtbf_cumulative_upper: divide_or_zero(time, lower, &node, "mcf_lower"),
            mtbf_instantaneous: divide_or_zero(dt, mcf - mcf_prev, &node, "mcf_increment"),
            mtbf_instantaneous_lower: divide_or_zero(dt, upper - upper_prev, &node, "mcf_upper_increment"),
            mtbf_instantaneous_upper: divide_or_zero(dt, lower - lower_prev, &node, "mcf_lower_increment"),
        });
        previous = (time, mcf, lower, upper);
    }
    out
}
