//! Incandescent lamps (MIL-HDBK-217F section 20).

use super::{HazardModel, PartContext, PartPrediction};
use crate::error::ModelError;

type EnvRow = [f64; 14];

/// Application: alternating current, direct current.
const PI_A: [f64; 2] = [1.0, 3.3];

/// Utilization (fraction of on time): below 0.10, 0.10 to 0.90, above 0.90.
const PI_U: [f64; 3] = [0.10, 0.72, 1.0];

const PI_E: EnvRow = [1.0, 2.0, 3.0, 3.0, 4.0, 4.0, 4.0, 5.0, 6.0, 5.0, 0.7, 4.0, 6.0, 27.0];

/// Parts-count λb by application.
const COUNT_LAMBDA_B: [EnvRow; 2] = [
    [3.9, 7.8, 12.0, 12.0, 16.0, 16.0, 16.0, 19.0, 23.0, 19.0, 2.7, 16.0, 23.0, 100.0],
    [13.0, 26.0, 38.0, 38.0, 51.0, 51.0, 51.0, 64.0, 77.0, 64.0, 9.0, 51.0, 77.0, 350.0],
];

/// Incandescent lamp model.
pub struct Lamp;

impl HazardModel for Lamp {
    fn name(&self) -> &'static str {
        "lamp"
    }

    fn count_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let row = part.lookup(&COUNT_LAMBDA_B, "application_id")?;
        PartPrediction::evaluate(part.node, "lambdab", &[("lambdab", part.env(&row))])
    }

    fn stress_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let rated = part.get_or("voltage_rated", 0.0).max(0.0);
        let lambda_b = 0.074 * rated.powf(1.29);
        let pi_u = part.lookup(&PI_U, "utilization_id")?;
        let pi_a = part.lookup(&PI_A, "application_id")?;
        PartPrediction::evaluate(
            part.node,
            "lambdab * piU * piA * piE",
            &[("lambdab", lambda_b), ("piU", pi_u), ("piA", pi_a), ("piE", part.env(&PI_E))],
        )
    }
}
