//! Survival statistics over field and test incident records.
//!
//! # Modules
//!
//! - [`kaplan_meier`]: product-limit survival curve with Greenwood bounds,
//!   plus MTBF and hazard series derived from it
//! - [`mean_cumulative_function`]: non-parametric recurrent-event MCF
//! - [`parametric_fit`]: exponential, normal, lognormal and Weibull fits by
//!   maximum likelihood or rank regression, through a [`StatisticalBackend`]
//! - [`bathtub_filter`]: Weibull shape/scale drift as the start time moves
//!
//! # References
//!
//! - Kaplan, E.L. & Meier, P. (1958), *JASA* 53(282), pp. 457-481.
//! - Nelson, W. (2003), *Recurrent Events Data Analysis for Product Repairs,
//!   Disease Recurrences, and Other Applications*, SIAM.
//! - Lawless (2003), *Statistical Models and Methods for Lifetime Data*, 2nd ed.

mod backend;
mod bathtub;
mod kaplan_meier;
mod mcf;
mod parametric;
mod weibull;

pub use backend::{InProcessBackend, OptionalBackend, StatisticalBackend};
pub use bathtub::{bathtub_filter, BathtubPoint};
pub use kaplan_meier::{
    kaplan_meier, kaplan_meier_hazard, kaplan_meier_mean, BoundType, KaplanMeierCurve,
    KaplanMeierHazard, KaplanMeierIter, KaplanMeierMean, KaplanMeierPoint,
};
pub use mcf::{mean_cumulative_function, McfPoint, UnitHistory};
pub use parametric::{
    parametric_fit, Distribution, DistributionParameters, FitMethod, FitOptions, ParametricFit,
};
pub use weibull::{weibull_mle, weibull_rank_regression, WeibullFit};

use serde::{Deserialize, Serialize};

/// How an incident record's failure time is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EventStatus {
    /// Still running at `left`; the failure lies beyond it.
    RightCensored,
    /// Failed at exactly `left`.
    #[default]
    Exact,
    /// Failed some time before `right`.
    LeftCensored,
    /// Failed somewhere in `[left, right]`.
    IntervalCensored,
}

impl EventStatus {
    /// Maps the stored status code (0 = right censored, 1 = event,
    /// 2 = left censored, 3 = interval censored).
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::RightCensored),
            1 => Some(Self::Exact),
            2 => Some(Self::LeftCensored),
            3 => Some(Self::IntervalCensored),
            _ => None,
        }
    }

    /// True for every status that records a failure.
    pub fn is_failure(self) -> bool {
        !matches!(self, Self::RightCensored)
    }
}

/// One test or field incident: an observation interval and its status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub left: f64,
    pub right: f64,
    pub status: EventStatus,
    /// Number of identical units this record stands for.
    pub quantity: u32,
}

impl IncidentRecord {
    pub fn exact(time: f64) -> Self {
        Self {
            left: time,
            right: time,
            status: EventStatus::Exact,
            quantity: 1,
        }
    }

    pub fn right_censored(time: f64) -> Self {
        Self {
            left: time,
            right: time,
            status: EventStatus::RightCensored,
            quantity: 1,
        }
    }

    pub fn interval(left: f64, right: f64) -> Self {
        Self {
            left,
            right,
            status: EventStatus::IntervalCensored,
            quantity: 1,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Status after collapsing degenerate intervals: a zero-width interval
    /// is an exact failure and one opening at zero is left censored.
    pub fn effective_status(&self) -> EventStatus {
        match self.status {
            EventStatus::IntervalCensored if self.left == self.right => EventStatus::Exact,
            EventStatus::IntervalCensored if self.left == 0.0 => EventStatus::LeftCensored,
            status => status,
        }
    }

    /// The single time used by estimators that need a point per record.
    ///
    /// Exact and right-censored records use `left`, left-censored records
    /// use `right`, and interval-censored records use the midpoint.
    pub fn event_time(&self) -> f64 {
        match self.effective_status() {
            EventStatus::Exact | EventStatus::RightCensored => self.left,
            EventStatus::LeftCensored => self.right,
            EventStatus::IntervalCensored => 0.5 * (self.left + self.right),
        }
    }
}

/// Splits records into weighted failure and suspension times, keeping those
/// with `start < time` and, when `limit > 0`, `time <= limit`.
pub(crate) fn failures_and_suspensions(
    records: &[IncidentRecord],
    start: f64,
    limit: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut failures = Vec::new();
    let mut suspensions = Vec::new();
    for record in records {
        let t = record.event_time();
        if !t.is_finite() || t <= start || (limit > 0.0 && t > limit) {
            continue;
        }
        let target = if record.effective_status().is_failure() {
            &mut failures
        } else {
            &mut suspensions
        };
        target.extend(std::iter::repeat(t).take(record.quantity as usize));
    }
    (failures, suspensions)
}
