//! Meters (MIL-HDBK-217F section 18): elapsed-time and panel meters.

use super::table::bucket;
use super::{HazardModel, PartContext, PartPrediction};
use crate::error::ModelError;
use crate::guard::divide_or;

type EnvRow = [f64; 14];

/// Elapsed-time λb by type: A.C., inverter driven, commutator D.C.
const ELAPSED_LAMBDA_B: [f64; 3] = [20.0, 30.0, 80.0];

const ELAPSED_PI_E: EnvRow = [1.0, 2.0, 12.0, 7.0, 18.0, 5.0, 8.0, 16.0, 25.0, 26.0, 0.5, 14.0, 38.0, 0.0];

/// Temperature-ratio breakpoints for πT; one more factor than breakpoints.
const ELAPSED_PI_T_BREAKS: [f64; 3] = [0.5, 0.6, 0.8];
const ELAPSED_PI_T: [f64; 4] = [0.5, 0.6, 0.8, 1.0];

const ELAPSED_COUNT_LAMBDA_B: [EnvRow; 3] = [
    [10.0, 20.0, 120.0, 70.0, 180.0, 50.0, 80.0, 160.0, 250.0, 260.0, 5.0, 140.0, 380.0, 0.0],
    [15.0, 30.0, 180.0, 105.0, 270.0, 75.0, 120.0, 240.0, 375.0, 390.0, 7.5, 210.0, 570.0, 0.0],
    [40.0, 80.0, 480.0, 280.0, 720.0, 200.0, 320.0, 640.0, 1000.0, 1040.0, 20.0, 560.0, 1520.0, 0.0],
];

/// Panel-meter application: direct current, alternating current.
const PANEL_PI_A: [f64; 2] = [1.0, 1.7];

/// Panel-meter function: ammeter, voltmeter, other.
const PANEL_PI_F: [f64; 3] = [1.0, 1.0, 2.8];

/// MIL-M-10304, lower.
const PANEL_PI_Q: [f64; 2] = [1.0, 3.4];

const PANEL_PI_E: EnvRow = [1.0, 4.0, 25.0, 12.0, 35.0, 28.0, 42.0, 58.0, 73.0, 60.0, 1.1, 60.0, 0.0, 0.0];

const PANEL_COUNT_LAMBDA_B: [EnvRow; 2] = [
    [0.09, 0.36, 2.3, 1.1, 3.2, 2.5, 3.8, 5.2, 6.6, 5.4, 0.099, 5.4, 0.0, 0.0],
    [0.15, 0.81, 2.8, 1.8, 5.4, 4.3, 6.4, 8.9, 11.0, 9.2, 0.17, 9.2, 0.0, 0.0],
];

/// Elapsed-time meter. The meter type is read from `application_id`.
pub struct ElapsedTime;

impl ElapsedTime {
    /// Operating-to-rated temperature ratio. An unknown rating counts as
    /// running at the rating.
    pub fn temperature_ratio(part: &PartContext<'_>) -> f64 {
        divide_or(
            part.get_or("temperature_active", 30.0),
            part.get_or("temperature_rated_max", 0.0),
            1.0,
            part.node,
            "temperature_rated_max",
        )
    }
}

impl HazardModel for ElapsedTime {
    fn name(&self) -> &'static str {
        "elapsed-time meter"
    }

    fn count_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let row = part.lookup(&ELAPSED_COUNT_LAMBDA_B, "application_id")?;
        PartPrediction::evaluate(part.node, "lambdab", &[("lambdab", part.env(&row))])
    }

    fn stress_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let lambda_b = part.lookup(&ELAPSED_LAMBDA_B, "application_id")?;
        let s = Self::temperature_ratio(part);
        let pi_t = ELAPSED_PI_T[bucket(&ELAPSED_PI_T_BREAKS, s)];
        PartPrediction::evaluate(
            part.node,
            "lambdab * piT * piE",
            &[("lambdab", lambda_b), ("piT", pi_t), ("piE", part.env(&ELAPSED_PI_E))],
        )
    }
}

/// Panel meter (MIL-M-10304). The function is read from `type_id`.
pub struct Panel;

impl HazardModel for Panel {
    fn name(&self) -> &'static str {
        "panel meter"
    }

    fn count_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let row = part.lookup(&PANEL_COUNT_LAMBDA_B, "application_id")?;
        let pi_q = part.lookup(&PANEL_PI_Q, "quality_id")?;
        PartPrediction::evaluate(
            part.node,
            "lambdab * piQ",
            &[("lambdab", part.env(&row)), ("piQ", pi_q)],
        )
    }

    fn stress_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let pi_a = part.lookup(&PANEL_PI_A, "application_id")?;
        let pi_f = part.lookup(&PANEL_PI_F, "type_id")?;
        let pi_q = part.lookup(&PANEL_PI_Q, "quality_id")?;
        PartPrediction::evaluate(
            part.node,
            "lambdab * piA * piF * piQ * piE",
            &[
                ("lambdab", 0.09),
                ("piA", pi_a),
                ("piF", pi_f),
                ("piQ", pi_q),
                ("piE", part.env(&PANEL_PI_E)),
            ],
        )
    }
}
