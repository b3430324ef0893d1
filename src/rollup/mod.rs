//! Post-order roll-ups over hardware, function, revision and software trees.
//!
//! Every roll-up borrows an input tree and returns a new result tree; inputs
//! are never mutated, so recomputing an unchanged tree gives bit-identical
//! results.
//!
//! # Modules
//!
//! - [`calculate_hardware`]: part predictions summed through an assembly tree
//! - [`calculate_function`]: hardware results mapped onto functions
//! - [`calculate_revision`]: revision-wide totals over all parts
//! - [`calculate_software`]: RPFOM for CSCIs, summed through software systems

mod function;
mod hardware;
mod revision;
mod software;

pub use function::{calculate_function, FunctionNode, FunctionResult};
pub use hardware::{
    calculate_hardware, HardwareNode, HardwareResult, HazardRateType, PartAssessment, PartSpec,
    ReliabilityMetrics, RollupTotals, StressRatios,
};
pub use revision::{calculate_revision, RevisionResult};
pub use software::{
    calculate_software, AggregateFilter, AggregateQuery, CsciFactors, SoftwareLevel,
    SoftwareMetric, SoftwareNode, SoftwareResult, TestEffort, TestIncidentFigures,
};

use crate::guard::divide_or_zero;

/// MTBF and reliability figures derived from a predicted hazard rate.
///
/// Shared by the function and revision roll-ups.
pub(crate) fn mtbf_and_reliability(node: &str, hazard_rate: f64, mission_time: f64) -> (f64, f64) {
    let mtbf = divide_or_zero(1.0, hazard_rate, node, "hazard_rate_predicted");
    (mtbf, (-hazard_rate * mission_time).exp())
}
