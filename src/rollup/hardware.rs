//! Hardware hazard-rate roll-up.
//!
//! Leaves run the part models, assemblies sum their children. Part models
//! work in failures per `hazard_rate_multiplier` hours; leaves divide by
//! the multiplier, so every rate in a [`HardwareResult`] is per hour.
//!
//! A leaf whose model fails is reported `incomplete` with its error and
//! contributes a zero assessed rate. The failure propagates the flag to
//! every ancestor but never stops siblings from being calculated.

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, warn};

use crate::attributes::{self, AttributeMap, AttributeProvider};
use crate::config::CalculationConfig;
use crate::derating::{dormant_hazard_rate, overstressed, Overstress};
use crate::environment::DormantEnvironment;
use crate::error::ModelError;
use crate::guard::divide_or_zero;
use crate::prediction::{predict, PartCategory, PartContext, PartPrediction, PredictionMethod};

/// How a node's hazard rate is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HazardRateType {
    /// Predicted from part models (leaves) or children (assemblies).
    #[default]
    Assessed,
    /// Given directly as a hazard rate.
    SpecifiedRate,
    /// Given as an MTBF; the hazard rate is its reciprocal.
    SpecifiedMtbf,
}

/// Part identity of a leaf evaluated with the handbook models.
///
/// `attributes` must carry `subcategory_id` and `environment_active_id`;
/// `environment_dormant_id` is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct PartSpec {
    pub category: PartCategory,
    pub method: PredictionMethod,
    pub attributes: AttributeMap,
}

/// One hardware item: a system, an assembly, or a part.
#[derive(Debug, Clone, PartialEq)]
pub struct HardwareNode {
    /// Reference designator.
    pub id: String,
    pub hazard_rate_type: HazardRateType,
    pub quantity: u32,
    /// Additive adjustment factor, added to the rate before scaling.
    pub additive_factor: f64,
    /// Multiplicative adjustment factor.
    pub multiplicative_factor: f64,
    /// Duty cycle in percent.
    pub duty_cycle: f64,
    pub cost: f64,
    pub specified_hazard_rate: f64,
    pub specified_mtbf: f64,
    pub software_hazard_rate: f64,
    /// Power dissipation used when the node is not assessed from a part.
    pub power_dissipation: f64,
    /// `Some` for parts.
    pub part: Option<PartSpec>,
    pub children: Vec<HardwareNode>,
}

impl HardwareNode {
    /// A node with unit quantity, neutral adjustments and full duty cycle.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            hazard_rate_type: HazardRateType::Assessed,
            quantity: 1,
            additive_factor: 0.0,
            multiplicative_factor: 1.0,
            duty_cycle: 100.0,
            cost: 0.0,
            specified_hazard_rate: 0.0,
            specified_mtbf: 0.0,
            software_hazard_rate: 0.0,
            power_dissipation: 0.0,
            part: None,
            children: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: PartSpec) -> Self {
        self.part = Some(part);
        self
    }

    pub fn with_child(mut self, child: HardwareNode) -> Self {
        self.children.push(child);
        self
    }

    fn scale(&self) -> f64 {
        f64::from(self.quantity) * self.multiplicative_factor * self.duty_cycle / 100.0
    }

    /// Directly given hazard rate, `None` for assessed nodes.
    fn specified_rate(&self) -> Option<f64> {
        match self.hazard_rate_type {
            HazardRateType::Assessed => None,
            HazardRateType::SpecifiedRate => Some(self.specified_hazard_rate),
            HazardRateType::SpecifiedMtbf => Some(divide_or_zero(
                1.0,
                self.specified_mtbf,
                &self.id,
                "specified_mtbf",
            )),
        }
    }
}

/// The seven quantities summed from children into parents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RollupTotals {
    pub cost: f64,
    pub hazard_rate_active: f64,
    pub hazard_rate_dormant: f64,
    pub hazard_rate_software: f64,
    pub hazard_rate_predicted: f64,
    pub part_count: u64,
    pub power_dissipation: f64,
}

impl RollupTotals {
    fn accumulate(&mut self, other: &RollupTotals) {
        self.cost += other.cost;
        self.hazard_rate_active += other.hazard_rate_active;
        self.hazard_rate_dormant += other.hazard_rate_dormant;
        self.hazard_rate_software += other.hazard_rate_software;
        self.hazard_rate_predicted += other.hazard_rate_predicted;
        self.part_count += other.part_count;
        self.power_dissipation += other.power_dissipation;
    }

    fn update_predicted(&mut self) {
        self.hazard_rate_predicted =
            self.hazard_rate_active + self.hazard_rate_dormant + self.hazard_rate_software;
    }
}

/// Figures derived from the totals of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityMetrics {
    /// 1 / (λa + λs).
    pub mtbf_mission: f64,
    /// 1 / λp.
    pub mtbf_limiting: f64,
    pub reliability_mission: f64,
    pub reliability_limiting: f64,
    pub cost_per_failure: f64,
    pub cost_per_hour: f64,
}

impl ReliabilityMetrics {
    fn derive(node: &str, totals: &RollupTotals, mission_time: f64) -> Self {
        let mission_rate = totals.hazard_rate_active + totals.hazard_rate_software;
        let predicted = totals.hazard_rate_predicted;
        Self {
            mtbf_mission: divide_or_zero(1.0, mission_rate, node, "hazard_rate_mission"),
            mtbf_limiting: divide_or_zero(1.0, predicted, node, "hazard_rate_predicted"),
            reliability_mission: (-mission_rate * mission_time).exp(),
            reliability_limiting: (-predicted * mission_time).exp(),
            cost_per_failure: divide_or_zero(
                totals.cost,
                predicted * mission_time,
                node,
                "hazard_rate_predicted",
            ),
            cost_per_hour: totals.cost * predicted,
        }
    }
}

/// Operating-to-rated stress ratios of a part; 0.0 when no rating is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StressRatios {
    pub voltage: f64,
    pub current: f64,
    pub power: f64,
}

/// Part-level outputs of an assessed leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct PartAssessment {
    pub ratios: StressRatios,
    /// Model output in failures per multiplier hours, before adjustment.
    pub prediction: Option<PartPrediction>,
    /// `None` when the category has no derating rules implemented.
    pub overstress: Option<Overstress>,
}

/// Roll-up output for one hardware node.
#[derive(Debug, Clone, PartialEq)]
pub struct HardwareResult {
    pub id: String,
    pub totals: RollupTotals,
    pub metrics: ReliabilityMetrics,
    /// Share of the root's active hazard rate, in percent.
    pub hazard_rate_percent: f64,
    pub part: Option<PartAssessment>,
    /// The node or one of its descendants failed to evaluate.
    pub incomplete: bool,
    /// Error recorded against this node itself.
    pub error: Option<ModelError>,
    pub children: Vec<HardwareResult>,
}

impl HardwareResult {
    /// Depth-first iterator over this node and all descendants.
    pub fn iter(&self) -> impl Iterator<Item = &HardwareResult> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Finds a node by reference designator.
    pub fn find(&self, id: &str) -> Option<&HardwareResult> {
        self.iter().find(|n| n.id == id)
    }

    fn apply_percent(&mut self, root_active: f64) {
        self.hazard_rate_percent = 100.0
            * divide_or_zero(
                self.totals.hazard_rate_active,
                root_active,
                &self.id,
                "system_hazard_rate_active",
            );
        for child in &mut self.children {
            child.apply_percent(root_active);
        }
    }
}

/// Rolls a hardware tree up into per-node results.
///
/// # Examples
///
/// ```
/// use u_reliability::config::CalculationConfig;
/// use u_reliability::rollup::{calculate_hardware, HardwareNode, HazardRateType};
///
/// let mut board = HardwareNode::new("A1");
/// board.hazard_rate_type = HazardRateType::SpecifiedRate;
/// board.specified_hazard_rate = 2.5;
/// let system = HardwareNode::new("S1").with_child(board);
///
/// let result = calculate_hardware(&system, &CalculationConfig::default());
/// assert!((result.totals.hazard_rate_predicted - 2.5e-6).abs() < 1e-18);
/// assert_eq!(result.totals.part_count, 1);
/// ```
pub fn calculate_hardware(root: &HardwareNode, config: &CalculationConfig) -> HardwareResult {
    let mut result = calculate_node(root, config);
    let root_active = result.totals.hazard_rate_active;
    result.apply_percent(root_active);
    result
}

fn calculate_node(node: &HardwareNode, config: &CalculationConfig) -> HardwareResult {
    let _span = debug_span!("hardware", node = %node.id).entered();
    let mut result = if node.children.is_empty() {
        calculate_leaf(node, config)
    } else {
        calculate_assembly(node, config)
    };
    result.metrics = ReliabilityMetrics::derive(&node.id, &result.totals, config.mission_time);
    debug!(
        predicted = result.totals.hazard_rate_predicted,
        incomplete = result.incomplete,
        "node calculated"
    );
    result
}

fn empty_result(node: &HardwareNode) -> HardwareResult {
    HardwareResult {
        id: node.id.clone(),
        totals: RollupTotals::default(),
        metrics: ReliabilityMetrics::default(),
        hazard_rate_percent: 0.0,
        part: None,
        incomplete: false,
        error: None,
        children: Vec::new(),
    }
}

fn calculate_assembly(node: &HardwareNode, config: &CalculationConfig) -> HardwareResult {
    let mut result = empty_result(node);
    let totals = &mut result.totals;

    match node.specified_rate() {
        None => {
            for child in &node.children {
                let child_result = calculate_node(child, config);
                totals.accumulate(&child_result.totals);
                result.incomplete |= child_result.incomplete;
                result.children.push(child_result);
            }
            let quantity = f64::from(node.quantity);
            totals.hazard_rate_active = totals.hazard_rate_active
                * quantity
                * node.multiplicative_factor
                + node.additive_factor / config.hazard_rate_multiplier;
            totals.power_dissipation *= quantity;
        }
        Some(rate) => {
            // Children are not visited when the assembly rate is given.
            totals.cost = node.cost;
            totals.part_count = u64::from(node.quantity);
            totals.power_dissipation = node.power_dissipation;
            totals.hazard_rate_active = (rate + node.additive_factor) * node.scale()
                / config.hazard_rate_multiplier;
            totals.hazard_rate_software = node.software_hazard_rate / config.hazard_rate_multiplier;
        }
    }
    totals.update_predicted();
    result
}

fn calculate_leaf(node: &HardwareNode, config: &CalculationConfig) -> HardwareResult {
    let mut result = empty_result(node);
    let quantity = f64::from(node.quantity);

    let (active, dormant) = match (node.specified_rate(), &node.part) {
        (Some(rate), _) => {
            result.totals.power_dissipation = node.power_dissipation;
            (rate, 0.0)
        }
        (None, Some(part)) => {
            let (assessment, dormant, error) = assess_part(&node.id, part);
            let active = assessment
                .prediction
                .as_ref()
                .map_or(0.0, |p| p.hazard_rate);
            result.totals.power_dissipation =
                quantity * attributes::get_or(&part.attributes, "power_operating", 0.0);
            if let Some(e) = error {
                warn!(node = %node.id, error = %e, "part model failed; leaf marked incomplete");
                result.incomplete = true;
                result.error = Some(e);
            }
            result.part = Some(assessment);
            (active, dormant)
        }
        // An assessed leaf with no part data is an empty assembly.
        (None, None) => (0.0, 0.0),
    };

    // A failed leaf contributes no rate at all, adjustment included.
    let additive = if result.error.is_some() { 0.0 } else { node.additive_factor };
    let multiplier = config.hazard_rate_multiplier;
    let totals = &mut result.totals;
    totals.cost = node.cost;
    totals.part_count = u64::from(node.quantity);
    totals.hazard_rate_active = (active + additive) * node.scale() / multiplier;
    totals.hazard_rate_dormant = dormant * quantity / multiplier;
    totals.hazard_rate_software = node.software_hazard_rate * quantity / multiplier;
    totals.update_predicted();
    result
}

/// Runs the part model, overstress check and dormant conversion.
///
/// Returns the assessment, the dormant rate (per multiplier hours) and the
/// model error, if any.
fn assess_part(node: &str, part: &PartSpec) -> (PartAssessment, f64, Option<ModelError>) {
    let attrs = &part.attributes;
    let get = |field: &str| attributes::get_or(attrs, field, 0.0);
    let ratios = StressRatios {
        voltage: divide_or_zero(
            get("voltage_dc_operating") + get("voltage_ac_operating"),
            get("voltage_rated"),
            node,
            "voltage_rated",
        ),
        current: divide_or_zero(get("current_operating"), get("current_rated"), node, "current_rated"),
        power: divide_or_zero(get("power_operating"), get("power_rated"), node, "power_rated"),
    };

    let ctx = match PartContext::from_attributes(node, attrs) {
        Ok(ctx) => ctx,
        Err(e) => {
            let assessment = PartAssessment {
                ratios,
                prediction: None,
                overstress: None,
            };
            return (assessment, 0.0, Some(e));
        }
    };

    let (prediction, error) = match predict(part.category, part.method, &ctx) {
        Ok(p) => (Some(p), None),
        Err(e) => (None, Some(e)),
    };
    let overstress = match overstressed(part.category, &ctx) {
        Ok(o) => Some(o),
        Err(e) => {
            debug!(node, error = %e, "overstress check skipped");
            None
        }
    };

    let active = prediction.as_ref().map_or(0.0, |p| p.hazard_rate);
    let dormant = optional_index(attrs, "environment_dormant_id")
        .and_then(DormantEnvironment::from_index)
        .map_or(0.0, |env| {
            dormant_hazard_rate(part.category, ctx.subcategory, ctx.environment, env, active)
        });

    let assessment = PartAssessment {
        ratios,
        prediction,
        overstress,
    };
    (assessment, dormant, error)
}

/// Optional 1-based index; absent or malformed values read as `None`.
fn optional_index(attrs: &AttributeMap, field: &str) -> Option<usize> {
    attrs
        .get(field)
        .filter(|v| v.is_finite() && *v >= 1.0 && v.fract() == 0.0)
        .map(|v| v as usize)
}
