//! Revision-wide totals over every part of a hardware tree.

use serde::{Deserialize, Serialize};

use super::hardware::HardwareResult;
use super::mtbf_and_reliability;
use crate::config::CalculationConfig;

/// Totals for one revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RevisionResult {
    pub cost: f64,
    pub hazard_rate_active: f64,
    pub hazard_rate_dormant: f64,
    pub hazard_rate_software: f64,
    pub hazard_rate_predicted: f64,
    /// Number of part records (not quantities).
    pub part_count: u64,
    pub mtbf: f64,
    pub reliability_mission: f64,
}

/// Sums all part leaves of `root`.
///
/// Only nodes carrying a part assessment count; assemblies and specified
/// items are skipped. Returns `None` when the tree holds no parts.
pub fn calculate_revision(root: &HardwareResult, config: &CalculationConfig) -> Option<RevisionResult> {
    let mut result = RevisionResult::default();
    for part in root.iter().filter(|n| n.part.is_some()) {
        result.cost += part.totals.cost;
        result.hazard_rate_active += part.totals.hazard_rate_active;
        result.hazard_rate_dormant += part.totals.hazard_rate_dormant;
        result.hazard_rate_software += part.totals.hazard_rate_software;
        result.part_count += 1;
    }
    if result.part_count == 0 {
        return None;
    }
    result.hazard_rate_predicted =
        result.hazard_rate_active + result.hazard_rate_dormant + result.hazard_rate_software;
    let (mtbf, reliability) =
        mtbf_and_reliability(&root.id, result.hazard_rate_predicted, config.mission_time);
    result.mtbf = mtbf;
    result.reliability_mission = reliability;
    Some(result)
}
