//! MIL-HDBK-217F part hazard-rate models.
//!
//! Every component family implements [`HazardModel`], with a parts-count
//! entry point (table lookup times quality factor) and a parts-stress entry
//! point (closed-form π-factor model). Models are selected through a
//! strategy table keyed by `(category, subcategory)` in [`model_for`].
//!
//! All rates returned here are in failures per 10^6 hours. Each family
//! states its equation as text and evaluates it through
//! [`crate::expression`], so [`PartPrediction::factors`] always names
//! exactly the factors the equation consumed.
//!
//! # Example
//!
//! ```
//! use u_reliability::attributes::AttributeMap;
//! use u_reliability::prediction::{predict, PartCategory, PartContext, PredictionMethod};
//!
//! let attrs = AttributeMap::new()
//!     .with("subcategory_id", 1.0)
//!     .with("environment_active_id", 3.0)
//!     .with("quality_id", 4.0);
//! let part = PartContext::from_attributes("R1", &attrs).unwrap();
//! let result = predict(PartCategory::Resistor, PredictionMethod::PartsCount, &part).unwrap();
//! assert!((result.hazard_rate - 0.0071).abs() < 1e-12);
//! ```

pub mod capacitor;
pub mod connection;
pub mod inductor;
pub mod integrated_circuit;
pub mod meter;
pub mod miscellaneous;
pub mod relay;
pub mod resistor;
pub mod semiconductor;
pub(crate) mod table;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attributes::{self, AttributeProvider};
use crate::environment::{Environment, ENVIRONMENT_COUNT};
use crate::error::ModelError;
use crate::expression;
use crate::guard::divide_or_zero;

/// Component category, numbered as in the parts library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartCategory {
    Capacitor = 1,
    Connection = 2,
    Inductor = 3,
    IntegratedCircuit = 4,
    Meter = 5,
    Miscellaneous = 6,
    Relay = 7,
    Resistor = 8,
    Semiconductor = 9,
    Switch = 10,
}

impl PartCategory {
    pub fn from_index(index: usize) -> Option<Self> {
        Some(match index {
            1 => Self::Capacitor,
            2 => Self::Connection,
            3 => Self::Inductor,
            4 => Self::IntegratedCircuit,
            5 => Self::Meter,
            6 => Self::Miscellaneous,
            7 => Self::Relay,
            8 => Self::Resistor,
            9 => Self::Semiconductor,
            10 => Self::Switch,
            _ => return None,
        })
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Prediction method selected by a part's model index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionMethod {
    PartsStress = 1,
    PartsCount = 2,
    Notice1Stress = 3,
    Notice1Count = 4,
    Notice2Stress = 5,
    Notice2Count = 6,
    Nswc07 = 7,
}

impl PredictionMethod {
    pub fn from_index(index: usize) -> Option<Self> {
        Some(match index {
            1 => Self::PartsStress,
            2 => Self::PartsCount,
            3 => Self::Notice1Stress,
            4 => Self::Notice1Count,
            5 => Self::Notice2Stress,
            6 => Self::Notice2Count,
            7 => Self::Nswc07,
            _ => return None,
        })
    }

    /// Handbook name of the method.
    pub fn name(self) -> &'static str {
        match self {
            Self::PartsStress => "MIL-HDBK-217F parts stress",
            Self::PartsCount => "MIL-HDBK-217F parts count",
            Self::Notice1Stress => "MIL-HDBK-217FN1 parts stress",
            Self::Notice1Count => "MIL-HDBK-217FN1 parts count",
            Self::Notice2Stress => "MIL-HDBK-217FN2 parts stress",
            Self::Notice2Count => "MIL-HDBK-217FN2 parts count",
            Self::Nswc07 => "NSWC-07",
        }
    }
}

/// A part being evaluated: its identity, classification and attributes.
///
/// Ambient temperature, stress inputs, and all classification indices are
/// read by name through the attribute provider.
#[derive(Clone, Copy)]
pub struct PartContext<'a> {
    /// Reference designator or node id, used in errors and warnings.
    pub node: &'a str,
    /// 1-based subcategory within the part's category.
    pub subcategory: usize,
    /// Active environment.
    pub environment: Environment,
    pub attrs: &'a dyn AttributeProvider,
}

impl<'a> PartContext<'a> {
    pub fn new(
        node: &'a str,
        subcategory: usize,
        environment: Environment,
        attrs: &'a dyn AttributeProvider,
    ) -> Self {
        Self {
            node,
            subcategory,
            environment,
            attrs,
        }
    }

    /// Builds a context from `subcategory_id` and `environment_active_id`.
    pub fn from_attributes(
        node: &'a str,
        attrs: &'a dyn AttributeProvider,
    ) -> Result<Self, ModelError> {
        let subcategory = attributes::index(attrs, node, "subcategory_id")?;
        let env = attributes::index(attrs, node, "environment_active_id")?;
        let environment = Environment::from_index(env)
            .ok_or_else(|| ModelError::data_range(node, "environment_active_id", env as i64))?;
        Ok(Self::new(node, subcategory, environment, attrs))
    }

    pub(crate) fn get_or(&self, field: &str, default: f64) -> f64 {
        attributes::get_or(self.attrs, field, default)
    }

    /// Reads a field, treating zero or negative values as "not supplied".
    pub(crate) fn positive_or(&self, field: &str, default: f64) -> f64 {
        match self.attrs.get(field) {
            Some(v) if v > 0.0 => v,
            _ => default,
        }
    }

    pub(crate) fn index(&self, field: &str) -> Result<usize, ModelError> {
        attributes::index(self.attrs, self.node, field)
    }

    pub(crate) fn index_or(&self, field: &str, default: usize) -> Result<usize, ModelError> {
        attributes::index_or(self.attrs, self.node, field, default)
    }

    /// Selects `table[field - 1]`, failing with `DataRange` naming `field`.
    pub(crate) fn lookup<T: Copy>(&self, table: &[T], field: &str) -> Result<T, ModelError> {
        let index = self.index(field)?;
        table::lookup(table, index, self.node, field)
    }

    /// Selects the active environment's entry of a 14-wide table.
    pub(crate) fn env(&self, table: &[f64; ENVIRONMENT_COUNT]) -> f64 {
        self.environment.pick(table)
    }

    /// Operating-to-rated ratio, guarded against a zero rating.
    pub(crate) fn ratio(&self, operating: f64, rated_field: &str) -> f64 {
        divide_or_zero(operating, self.get_or(rated_field, 0.0), self.node, rated_field)
    }

    pub(crate) fn subcategory_error(&self) -> ModelError {
        ModelError::data_range(self.node, "subcategory_id", self.subcategory as i64)
    }
}

/// Hazard rate of one part plus the factors that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartPrediction {
    /// Failures per 10^6 hours.
    pub hazard_rate: f64,
    /// Equation evaluated, e.g. `lambdab * piQ * piE`.
    pub equation: String,
    /// Named factors supplied to the equation.
    pub factors: BTreeMap<String, f64>,
}

impl PartPrediction {
    /// Evaluates `equation` over `factors` for part `node`.
    pub fn evaluate(node: &str, equation: &str, factors: &[(&str, f64)]) -> Result<Self, ModelError> {
        let factors: BTreeMap<String, f64> = factors
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        let hazard_rate = expression::evaluate(equation, &factors)?;
        if !hazard_rate.is_finite() || hazard_rate < 0.0 {
            return Err(ModelError::NonPhysical {
                node: node.to_string(),
                value: hazard_rate,
            });
        }
        Ok(Self {
            hazard_rate,
            equation: equation.to_string(),
            factors,
        })
    }

    pub fn factor(&self, name: &str) -> Option<f64> {
        self.factors.get(name).copied()
    }
}

/// Parts-count and parts-stress entry points of one component family.
pub trait HazardModel: Send + Sync {
    /// Family name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Parts-count estimate: λb(environment) times a quality factor.
    fn count_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError>;

    /// Parts-stress estimate from operating stresses and temperature.
    fn stress_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError>;
}

/// Strategy table: the model that handles `(category, subcategory)`.
pub fn model_for(
    category: PartCategory,
    subcategory: usize,
) -> Result<&'static dyn HazardModel, ModelError> {
    use PartCategory::*;
    match (category, subcategory) {
        (Capacitor, 1..=19) => Ok(&capacitor::Capacitor),
        (Connection, 1) => Ok(&connection::Multipin),
        (Connection, 2) => Ok(&connection::PlatedThroughHole),
        (Connection, 3) => Ok(&connection::Termination),
        (Inductor, 1..=4) => Ok(&inductor::Transformer),
        (IntegratedCircuit, 1..=10) => Ok(&integrated_circuit::IntegratedCircuit),
        (Miscellaneous, 4) => Ok(&miscellaneous::Lamp),
        (Miscellaneous, 1) => Err(ModelError::unimplemented("crystal hazard-rate model")),
        (Miscellaneous, 2) => Err(ModelError::unimplemented("filter hazard-rate model")),
        (Miscellaneous, 3) => Err(ModelError::unimplemented("fuse hazard-rate model")),
        (Relay, 1) => Ok(&relay::Mechanical),
        (Relay, 2) => Ok(&relay::SolidState),
        (Resistor, 1..=15) => Ok(&resistor::Resistor),
        (Semiconductor, 1..=13) => Ok(&semiconductor::Semiconductor),
        (Meter, 1) => Ok(&meter::ElapsedTime),
        (Meter, 2) => Ok(&meter::Panel),
        (Switch, _) => Err(ModelError::unimplemented("switch hazard-rate model")),
        (_, sub) => Err(ModelError::DataRange {
            node: String::new(),
            field: "subcategory_id".into(),
            value: sub as i64,
        }),
    }
}

/// Predicts one part's hazard rate with the requested method.
pub fn predict(
    category: PartCategory,
    method: PredictionMethod,
    part: &PartContext<'_>,
) -> Result<PartPrediction, ModelError> {
    let model = model_for(category, part.subcategory).map_err(|e| match e {
        ModelError::DataRange { field, value, .. } => ModelError::DataRange {
            node: part.node.to_string(),
            field,
            value,
        },
        other => other,
    })?;
    match method {
        PredictionMethod::PartsStress => model.stress_model(part),
        PredictionMethod::PartsCount => model.count_model(part),
        other => Err(ModelError::unimplemented(format!(
            "{} ({})",
            other.name(),
            model.name()
        ))),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;

    #[test]
    fn test_category_round_trip() {
        for i in 1..=10 {
            assert_eq!(PartCategory::from_index(i).map(|c| c.index()), Some(i));
        }
        assert_eq!(PartCategory::from_index(0), None);
        assert_eq!(PartCategory::from_index(11), None);
    }

    #[test]
    fn test_switch_is_unimplemented() {
        let err = model_for(PartCategory::Switch, 1).err().expect("switch has no model");
        assert!(matches!(err, ModelError::UnimplementedModel { .. }));
    }

    #[test]
    fn test_unknown_subcategory_is_range_error() {
        let attrs = AttributeMap::new().with("quality_id", 1.0);
        let ctx = PartContext::new("C9", 20, Environment::GroundBenign, &attrs);
        let err = predict(PartCategory::Capacitor, PredictionMethod::PartsCount, &ctx).unwrap_err();
        assert_eq!(
            err,
            ModelError::DataRange {
                node: "C9".into(),
                field: "subcategory_id".into(),
                value: 20
            }
        );
    }

    #[test]
    fn test_notice_methods_are_unimplemented() {
        let attrs = AttributeMap::new().with("quality_id", 1.0);
        let ctx = PartContext::new("R1", 1, Environment::GroundBenign, &attrs);
        for idx in 3..=7 {
            let method = PredictionMethod::from_index(idx).unwrap();
            let err = predict(PartCategory::Resistor, method, &ctx).unwrap_err();
            match err {
                ModelError::UnimplementedModel { model } => {
                    assert!(model.contains(method.name()), "{model}")
                }
                other => panic!("expected unimplemented, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_environment_out_of_range() {
        let attrs = AttributeMap::new()
            .with("subcategory_id", 1.0)
            .with("environment_active_id", 15.0);
        let err = PartContext::from_attributes("U1", &attrs).err().unwrap();
        assert_eq!(
            err,
            ModelError::DataRange {
                node: "U1".into(),
                field: "environment_active_id".into(),
                value: 15
            }
        );
    }

    #[test]
    fn test_prediction_rejects_negative_rate() {
        let err = PartPrediction::evaluate("Q1", "lambdab * piR", &[("lambdab", 0.1), ("piR", -2.0)])
            .unwrap_err();
        assert!(matches!(err, ModelError::NonPhysical { .. }));
    }
}
