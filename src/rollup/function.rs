//! Function roll-up through the functional matrix.
//!
//! A leaf function collects the hardware items mapped to it; a parent
//! function sums its children.

use serde::{Deserialize, Serialize};

use super::hardware::HardwareResult;
use super::mtbf_and_reliability;
use crate::config::CalculationConfig;

/// One function in the function tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub id: String,
    /// Reference designators of the hardware items implementing this
    /// function (its row of the functional matrix).
    pub hardware: Vec<String>,
    pub children: Vec<FunctionNode>,
}

/// Roll-up output for one function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionResult {
    pub id: String,
    pub cost: f64,
    pub hazard_rate_predicted: f64,
    pub hazard_rate_software: f64,
    pub part_count: u64,
    pub mtbf: f64,
    pub reliability_mission: f64,
    /// Mapped reference designators that do not exist in the hardware tree.
    pub unresolved: Vec<String>,
    pub children: Vec<FunctionResult>,
}

/// Rolls `hardware` results up onto a function tree.
///
/// Rates are taken from the hardware roll-up, so they are already per hour.
pub fn calculate_function(
    function: &FunctionNode,
    hardware: &HardwareResult,
    config: &CalculationConfig,
) -> FunctionResult {
    let mut result = FunctionResult {
        id: function.id.clone(),
        ..FunctionResult::default()
    };

    if function.children.is_empty() {
        for id in &function.hardware {
            match hardware.find(id) {
                Some(item) => {
                    result.cost += item.totals.cost;
                    result.hazard_rate_predicted += item.totals.hazard_rate_predicted;
                    result.hazard_rate_software += item.totals.hazard_rate_software;
                    result.part_count += item.totals.part_count;
                }
                None => {
                    tracing::warn!(function = %function.id, hardware = %id, "unmapped hardware item");
                    result.unresolved.push(id.clone());
                }
            }
        }
    } else {
        for child in &function.children {
            let c = calculate_function(child, hardware, config);
            result.cost += c.cost;
            result.hazard_rate_predicted += c.hazard_rate_predicted;
            result.hazard_rate_software += c.hazard_rate_software;
            result.part_count += c.part_count;
            result.children.push(c);
        }
    }

    let (mtbf, reliability) =
        mtbf_and_reliability(&function.id, result.hazard_rate_predicted, config.mission_time);
    result.mtbf = mtbf;
    result.reliability_mission = reliability;
    result
}
