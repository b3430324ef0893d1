//! Error types shared across the prediction, roll-up, and statistics modules.
//!
//! Divide-by-zero is deliberately absent: guarded divisions recover locally
//! through [`crate::guard::divide_or_zero`] and never surface as errors.

use thiserror::Error;

/// Failure while evaluating a hazard-rate expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    /// The expression references a factor that was not supplied.
    #[error("expression references unknown factor `{0}`")]
    UnknownFactor(String),
    /// The expression text could not be parsed.
    #[error("malformed expression at byte {position}: {message}")]
    Malformed { position: usize, message: String },
    /// The expression contained no terms.
    #[error("empty expression")]
    EmptyExpression,
}

/// Failure while predicting a part hazard rate or rolling up a tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A classification index lies outside the table it selects from.
    #[error("{field} = {value} is outside the defined table range for node `{node}`")]
    DataRange {
        node: String,
        field: String,
        value: i64,
    },
    /// The requested model exists in the handbook but has no implementation.
    #[error("{model} is not implemented")]
    UnimplementedModel { model: String },
    /// A required attribute was not provided.
    #[error("node `{node}` is missing required attribute `{field}`")]
    MissingAttribute { node: String, field: String },
    /// The model produced a negative or non-finite hazard rate.
    #[error("node `{node}` produced a non-physical hazard rate {value}")]
    NonPhysical { node: String, value: f64 },
    /// The hazard-rate equation failed to evaluate.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

impl ModelError {
    pub(crate) fn data_range(node: &str, field: &str, value: i64) -> Self {
        Self::DataRange {
            node: node.to_string(),
            field: field.to_string(),
            value,
        }
    }

    pub(crate) fn unimplemented(model: impl Into<String>) -> Self {
        Self::UnimplementedModel {
            model: model.into(),
        }
    }
}

/// Failure of a statistical estimator.
///
/// Insufficient data and non-convergence are kept apart so callers can tell
/// "collect more failures" from "the solver gave up".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("insufficient data: need at least {required} points, found {found}")]
    InsufficientData { required: usize, found: usize },
    #[error("solver did not converge after {iterations} iterations")]
    NonConvergence { iterations: usize },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// A reliability-growth plan that cannot be completed as entered.
///
/// Individual formulas inside the planner never fail; they fall back to the
/// next formula and finally to 0.0. These errors cover plan-level problems
/// where continuing would only propagate nonsense.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    /// Too many of a phase's quantities are unset to solve for the rest.
    #[error("phase {phase} is underdetermined: {missing} of its quantities are unset")]
    Underdetermined { phase: usize, missing: usize },
    /// The first test phase ends before the first fix is implemented.
    #[error("first phase length {first_phase} is shorter than the growth start time {growth_start}")]
    FirstPhaseTooShort { first_phase: f64, growth_start: f64 },
    /// Cumulative test time decreased from one phase to the next.
    #[error("phase {phase} ends at {time}, before the previous phase ({previous})")]
    DecreasingTestTime {
        phase: usize,
        time: f64,
        previous: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_range_message_names_field_and_node() {
        let err = ModelError::data_range("C12", "environment_active", 15);
        let msg = err.to_string();
        assert!(msg.contains("environment_active"), "{msg}");
        assert!(msg.contains("C12"), "{msg}");
        assert!(msg.contains("15"), "{msg}");
    }

    #[test]
    fn test_evaluation_error_converts_into_model_error() {
        let err: ModelError = EvaluationError::UnknownFactor("piQ".into()).into();
        assert!(matches!(err, ModelError::Evaluation(_)));
        assert_eq!(err.to_string(), "expression references unknown factor `piQ`");
    }

    #[test]
    fn test_fit_errors_are_distinct() {
        let a = FitError::InsufficientData {
            required: 2,
            found: 1,
        };
        let b = FitError::NonConvergence { iterations: 100 };
        assert_ne!(a, b);
    }

    #[test]
    fn test_planning_error_names_phase() {
        let err = PlanningError::Underdetermined {
            phase: 3,
            missing: 4,
        };
        assert!(err.to_string().starts_with("phase 3"), "{err}");
    }
}
