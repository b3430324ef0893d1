//! Reliability growth: assessment of test data and planning of test programs.
//!
//! # Modules
//!
//! - [`crow_amsaa_exact`] / [`crow_amsaa_grouped`]: power-law (NHPP) fits to
//!   individual or interval-grouped failure data, and [`interval_rates`] for
//!   the raw per-interval failure rate and MTBF
//! - [`duane_fit`]: log-log regression of cumulative MTBF on test time
//! - [`fisher_bounds`] / [`crow_bounds`]: confidence bounds on the fitted
//!   model
//! - [`cramer_von_mises`], [`chi_square_grouped`], [`chi_square_trend`]:
//!   goodness of fit against caller-supplied critical values
//! - [`calculate_rg_phase`], [`planned_growth_curve`], [`idealized_curve`]:
//!   RG test-program planning (MIL-HDBK-189 planning model)
//!
//! # References
//!
//! - Crow, L.H. (1974), "Reliability analysis for complex, repairable
//!   systems", in *Reliability and Biometry*, SIAM, pp. 379-410.
//! - Duane, J.T. (1964), "Learning curve approach to reliability
//!   monitoring", *IEEE Trans. Aerospace* 2(2), pp. 563-566.
//! - MIL-HDBK-189C (2011), *Reliability Growth Management*.

mod bounds;
mod crow_amsaa;
mod duane;
mod gof;
mod planning;

pub use bounds::{crow_bounds, fisher_bounds, variance_covariance, Bounded, CrowBounds, FisherBounds};
pub use crow_amsaa::{crow_amsaa_exact, crow_amsaa_grouped, interval_rates, CrowAmsaaFit, IntervalRate};
pub use duane::{duane_fit, DuaneFit};
pub use gof::{chi_square_grouped, chi_square_trend, cramer_von_mises, GoodnessOfFit};
pub use planning::{
    average_mtbf, calculate_rg_phase, final_mtbf, growth_potential, growth_rate,
    idealized_curve, initial_mtbf, management_strategy, minimum_first_phase_time,
    planned_curve, planned_growth_curve, probability_of_observing_failure, total_time,
    CurveMetric, GrowthPhase, RgPhase, RgPhaseInputs,
};

use serde::{Deserialize, Serialize};

/// Failures observed up to `time`.
///
/// For individual failure data each event is one failure time (`failures`
/// is usually 1). For grouped data `time` is the end of an inspection
/// interval and `failures` the count observed inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthEvent {
    /// Cumulative test time.
    pub time: f64,
    pub failures: u32,
}

impl GrowthEvent {
    pub fn new(time: f64, failures: u32) -> Self {
        Self { time, failures }
    }
}

/// How a growth test was ended.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Termination {
    /// Type II: the test stopped at the last failure.
    #[default]
    FailureTerminated,
    /// Type I: the test stopped at a fixed time.
    TimeTerminated { end_time: f64 },
}

/// Total number of failures across `events`.
pub(crate) fn total_failures(events: &[GrowthEvent]) -> u32 {
    events.iter().map(|e| e.failures).sum()
}
