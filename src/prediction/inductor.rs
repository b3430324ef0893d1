//! Inductive devices (MIL-HDBK-217F section 11).
//!
//! Subcategories 1 to 4 are audio, power, low-power pulse and RF
//! transformers. They share one stress model driven by the winding
//! hot-spot temperature.

use super::table::lookup;
use super::{HazardModel, PartContext, PartPrediction};
use crate::error::ModelError;

type EnvRow = [f64; 14];

const COUNT_LAMBDA_B: [EnvRow; 4] = [
    [0.0071, 0.046, 0.097, 0.038, 0.13, 0.055, 0.073, 0.081, 0.10, 0.22, 0.035, 0.11, 0.31, 4.7],
    [0.023, 0.16, 0.35, 0.13, 0.45, 0.21, 0.27, 0.35, 0.45, 0.82, 0.011, 0.37, 1.2, 16.0],
    [0.0035, 0.023, 0.049, 0.019, 0.065, 0.027, 0.037, 0.041, 0.052, 0.11, 0.0018, 0.053, 0.16, 2.3],
    [0.028, 0.18, 0.39, 0.15, 0.52, 0.22, 0.29, 0.33, 0.42, 0.88, 0.015, 0.42, 1.2, 19.0],
];

/// MIL-SPEC, lower.
const PI_Q: [f64; 2] = [3.0, 7.5];

const PI_E: EnvRow = [1.0, 6.0, 12.0, 5.0, 16.0, 6.0, 8.0, 7.0, 9.0, 24.0, 0.5, 13.0, 34.0, 610.0];

/// Insulation class (85, 105, 130, 155, 170, >170 °C) as `(Tref, K1, K2)`.
const INSULATION: [(f64, f64, f64); 6] = [
    (329.0, 0.0018, 15.6),
    (352.0, 0.002, 14.0),
    (364.0, 0.0018, 8.7),
    (400.0, 0.002, 10.0),
    (398.0, 0.00125, 3.8),
    (477.0, 0.00159, 8.4),
];

/// Temperature rise used when neither dissipation nor geometry is known.
const DEFAULT_RISE: f64 = 35.0;

/// Winding temperature rise (°C).
///
/// Uses, in order of preference: dissipated power over case radiating
/// area (in²), dissipated power over weight (lb), input power over weight.
pub fn temperature_rise(part: &PartContext<'_>) -> f64 {
    let power = part.get_or("power_operating", 0.0);
    let power_in = part.get_or("power_input", 0.0);
    let area = part.get_or("area", 0.0);
    let weight = part.get_or("weight", 0.0);
    if power > 0.0 && area > 0.0 {
        125.0 * power / area
    } else if power > 0.0 && weight > 0.0 {
        11.5 * power / weight.powf(0.6766)
    } else if power_in > 0.0 && weight > 0.0 {
        2.1 * power_in / weight.powf(0.6766)
    } else {
        DEFAULT_RISE
    }
}

/// Hot-spot temperature `THS = Tambient + 1.1·ΔT` in °C.
pub fn hot_spot_temperature(part: &PartContext<'_>) -> f64 {
    part.get_or("temperature_active", 30.0) + 1.1 * temperature_rise(part)
}

/// Transformer family model.
pub struct Transformer;

impl HazardModel for Transformer {
    fn name(&self) -> &'static str {
        "transformer"
    }

    fn count_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let row = lookup(&COUNT_LAMBDA_B, part.subcategory, part.node, "subcategory_id")?;
        let pi_q = part.lookup(&PI_Q, "quality_id")?;
        PartPrediction::evaluate(
            part.node,
            "lambdab * piQ",
            &[("lambdab", part.env(&row)), ("piQ", pi_q)],
        )
    }

    fn stress_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        if !(1..=4).contains(&part.subcategory) {
            return Err(part.subcategory_error());
        }
        let (t_ref, k1, k2) = part.lookup(&INSULATION, "insulation_id")?;
        let t_hs = hot_spot_temperature(part);
        let lambda_b = k1 * ((t_hs + 273.0) / t_ref).powf(k2).exp();
        let pi_q = part.lookup(&PI_Q, "quality_id")?;

        PartPrediction::evaluate(
            part.node,
            "lambdab * piQ * piE",
            &[("lambdab", lambda_b), ("piQ", pi_q), ("piE", part.env(&PI_E))],
        )
    }
}
