//! Microcircuits (MIL-HDBK-217F section 5).
//!
//! | id | style | complexity measure |
//! |----|-------|--------------------|
//! | 1 | linear | transistors |
//! | 2 | logic | gates |
//! | 3 | PAL/PLA | gates (bipolar), bits (MOS) |
//! | 4 | microprocessor | bus width |
//! | 5 | ROM | bits |
//! | 6 | EEPROM | bits |
//! | 7 | DRAM | bits |
//! | 8 | SRAM | bits |
//! | 9 | GaAs MMIC / digital | elements |
//! | 10 | VHSIC/VLSI CMOS | die area |
//!
//! `technology_id` is 1 for bipolar and 2 for MOS in every table.
//! Complexity classes are "up to N": a device with more elements than the
//! largest class is rated in the largest class.

use super::table::{lookup, upper_bound, BOLTZMANN, CASE_TEMPERATURE};
use super::{HazardModel, PartContext, PartPrediction};
use crate::error::ModelError;
use crate::guard::divide_or_zero;

type EnvRow = [f64; 14];

const PI_E: EnvRow = [0.5, 2.0, 4.0, 4.0, 6.0, 4.0, 5.0, 5.0, 8.0, 8.0, 0.5, 5.0, 12.0, 220.0];

/// Class S, class B, class B-1.
const PI_Q: [f64; 3] = [0.25, 1.0, 2.0];

/// Activation energy (eV) for logic, by family.
const LOGIC_EA: [f64; 15] = [
    0.4, 0.4, 0.4, 0.4, 0.4, 0.4, 0.4, 0.4, 0.45, 0.45, 0.5, 0.5, 0.6, 0.6, 0.6,
];

const MEMORY_BITS: [f64; 4] = [16_000.0, 64_000.0, 256_000.0, 1_000_000.0];

/// Complexity breakpoints for `(subcategory, technology or GaAs type)`.
fn breakpoints(subcategory: usize, selector: usize) -> &'static [f64] {
    match (subcategory, selector) {
        (1, _) => &[100.0, 300.0, 1000.0, 10_000.0],
        (2, _) => &[100.0, 1000.0, 3000.0, 10_000.0, 30_000.0, 60_000.0],
        (3, 1) => &[200.0, 1000.0, 5000.0],
        (4, _) => &[8.0, 16.0, 32.0, 64.0],
        (9, 1) => &[100.0, 1000.0],
        (9, _) => &[1000.0, 10_000.0],
        _ => &MEMORY_BITS,
    }
}

/// Die complexity factor C1 by `(subcategory, selector)`. An empty table
/// means the combination does not exist.
fn c1_table(subcategory: usize, selector: usize) -> &'static [f64] {
    match (subcategory, selector) {
        (1, _) => &[0.01, 0.02, 0.04, 0.06],
        (2, 1) => &[0.0025, 0.005, 0.01, 0.02, 0.04, 0.08],
        (2, _) => &[0.01, 0.02, 0.04, 0.08, 0.16, 0.29],
        (3, 1) => &[0.01, 0.021, 0.042],
        (3, _) => &[0.00085, 0.0017, 0.0034, 0.0068],
        (4, 1) => &[0.06, 0.12, 0.24, 0.48],
        (4, _) => &[0.14, 0.28, 0.56, 1.12],
        (5, 1) => &[0.0094, 0.019, 0.038, 0.075],
        (5, _) => &[0.00065, 0.0013, 0.0026, 0.0052],
        (6, 2) => &[0.00085, 0.0017, 0.0034, 0.0068],
        (7, 2) => &[0.0013, 0.0025, 0.005, 0.01],
        (8, 1) => &[0.0052, 0.011, 0.021, 0.042],
        (8, _) => &[0.0078, 0.016, 0.031, 0.062],
        (9, 1) => &[4.5, 7.2],
        (9, _) => &[25.0, 51.0],
        _ => &[],
    }
}

/// Parts-count λb rows by `(subcategory, selector)`, one row per complexity class.
fn count_rows(subcategory: usize, selector: usize) -> &'static [EnvRow] {
    match (subcategory, selector) {
        (1, _) => &[
            [0.0095, 0.024, 0.039, 0.034, 0.049, 0.057, 0.062, 0.12, 0.13, 0.076, 0.0095, 0.044, 0.096, 1.1],
            [0.017, 0.041, 0.065, 0.054, 0.078, 0.1, 0.11, 0.22, 0.24, 0.13, 0.017, 0.072, 0.15, 1.4],
            [0.033, 0.074, 0.11, 0.092, 0.13, 0.19, 0.19, 0.41, 0.44, 0.22, 0.033, 0.12, 0.26, 2.0],
            [0.05, 0.12, 0.18, 0.15, 0.21, 0.3, 0.3, 0.63, 0.67, 0.35, 0.05, 0.19, 0.41, 3.4],
        ],
        (2, 1) => &[
            [0.0036, 0.012, 0.024, 0.024, 0.035, 0.025, 0.03, 0.032, 0.049, 0.047, 0.0036, 0.03, 0.069, 1.2],
            [0.006, 0.02, 0.038, 0.037, 0.055, 0.039, 0.048, 0.051, 0.077, 0.074, 0.006, 0.046, 0.11, 1.9],
            [0.011, 0.035, 0.066, 0.065, 0.097, 0.07, 0.085, 0.091, 0.14, 0.13, 0.011, 0.082, 0.19, 3.3],
            [0.033, 0.12, 0.22, 0.22, 0.33, 0.23, 0.28, 0.3, 0.46, 0.44, 0.033, 0.28, 0.65, 12.0],
            [0.052, 0.17, 0.33, 0.33, 0.48, 0.34, 0.42, 0.45, 0.68, 0.65, 0.052, 0.41, 0.95, 17.0],
            [0.075, 0.23, 0.44, 0.43, 0.63, 0.46, 0.56, 0.61, 0.9, 0.85, 0.075, 0.53, 1.2, 21.0],
        ],
        (2, _) => &[
            [0.0057, 0.015, 0.027, 0.027, 0.039, 0.029, 0.035, 0.039, 0.056, 0.052, 0.0057, 0.033, 0.074, 1.2],
            [0.01, 0.028, 0.045, 0.043, 0.062, 0.049, 0.057, 0.068, 0.092, 0.083, 0.01, 0.053, 0.12, 1.9],
            [0.019, 0.047, 0.08, 0.077, 0.11, 0.088, 0.1, 0.12, 0.17, 0.15, 0.019, 0.095, 0.21, 3.3],
            [0.049, 0.14, 0.25, 0.24, 0.36, 0.27, 0.32, 0.36, 0.51, 0.48, 0.049, 0.3, 0.69, 12.0],
            [0.084, 0.22, 0.39, 0.37, 0.54, 0.42, 0.49, 0.56, 0.79, 0.72, 0.084, 0.46, 1.0, 17.0],
            [0.13, 0.31, 0.53, 0.51, 0.73, 0.59, 0.69, 0.82, 1.1, 0.98, 0.13, 0.83, 1.4, 21.0],
        ],
        (3, 1) => &[
            [0.0061, 0.016, 0.029, 0.027, 0.04, 0.032, 0.037, 0.044, 0.061, 0.054, 0.0061, 0.034, 0.076, 1.2],
            [0.011, 0.028, 0.048, 0.046, 0.065, 0.054, 0.063, 0.077, 0.1, 0.089, 0.011, 0.057, 0.12, 1.9],
            [0.022, 0.052, 0.087, 0.082, 0.12, 0.099, 0.11, 0.14, 0.19, 0.16, 0.022, 0.1, 0.22, 3.3],
        ],
        (3, _) => &[
            [0.0046, 0.018, 0.035, 0.035, 0.052, 0.035, 0.044, 0.044, 0.07, 0.07, 0.0046, 0.044, 0.1, 1.9],
            [0.0056, 0.021, 0.042, 0.042, 0.062, 0.042, 0.052, 0.053, 0.084, 0.083, 0.0056, 0.052, 0.12, 2.3],
            [0.0061, 0.022, 0.043, 0.042, 0.063, 0.043, 0.054, 0.055, 0.086, 0.084, 0.0081, 0.053, 0.13, 2.3],
            [0.0095, 0.033, 0.064, 0.063, 0.094, 0.065, 0.08, 0.083, 0.13, 0.13, 0.0095, 0.079, 0.19, 3.3],
        ],
        (4, 1) => &[
            [0.028, 0.061, 0.098, 0.091, 0.13, 0.12, 0.13, 0.17, 0.22, 0.18, 0.028, 0.11, 0.24, 3.3],
            [0.052, 0.11, 0.18, 0.16, 0.23, 0.21, 0.24, 0.32, 0.39, 0.31, 0.052, 0.2, 0.41, 5.6],
            [0.11, 0.23, 0.36, 0.33, 0.47, 0.44, 0.49, 0.65, 0.81, 0.65, 0.11, 0.42, 0.86, 12.0],
        ],
        (4, _) => &[
            [0.048, 0.089, 0.13, 0.12, 0.16, 0.16, 0.17, 0.24, 0.28, 0.22, 0.048, 0.15, 0.28, 3.4],
            [0.093, 0.17, 0.24, 0.22, 0.29, 0.3, 0.32, 0.45, 0.52, 0.4, 0.093, 0.27, 0.5, 5.6],
            [0.19, 0.34, 0.49, 0.45, 0.6, 0.61, 0.66, 0.9, 1.1, 0.82, 0.19, 0.54, 1.0, 12.0],
        ],
        (5, 1) => &[
            [0.01, 0.028, 0.05, 0.046, 0.067, 0.062, 0.07, 0.1, 0.13, 0.096, 0.01, 0.058, 0.13, 1.9],
            [0.017, 0.043, 0.071, 0.063, 0.091, 0.095, 0.11, 0.18, 0.21, 0.14, 0.017, 0.081, 0.18, 2.3],
            [0.028, 0.065, 0.1, 0.085, 0.12, 0.15, 0.18, 0.3, 0.33, 0.19, 0.028, 0.11, 0.23, 2.3],
            [0.053, 0.12, 0.18, 0.15, 0.21, 0.27, 0.29, 0.56, 0.61, 0.33, 0.053, 0.19, 0.39, 3.4],
        ],
        (5, _) => &[
            [0.0047, 0.018, 0.036, 0.035, 0.053, 0.037, 0.045, 0.048, 0.074, 0.071, 0.0047, 0.044, 0.11, 1.9],
            [0.0059, 0.022, 0.043, 0.042, 0.063, 0.045, 0.055, 0.06, 0.09, 0.086, 0.0059, 0.053, 0.13, 2.3],
            [0.0067, 0.023, 0.045, 0.044, 0.066, 0.048, 0.059, 0.068, 0.099, 0.089, 0.0067, 0.055, 0.13, 2.3],
            [0.011, 0.036, 0.068, 0.066, 0.098, 0.075, 0.09, 0.11, 0.15, 0.14, 0.011, 0.083, 0.2, 3.3],
        ],
        (6, 2) => &[
            [0.0049, 0.018, 0.036, 0.036, 0.053, 0.037, 0.046, 0.049, 0.075, 0.072, 0.0048, 0.045, 0.11, 1.9],
            [0.0061, 0.022, 0.044, 0.043, 0.064, 0.046, 0.056, 0.062, 0.093, 0.087, 0.0062, 0.054, 0.13, 2.3],
            [0.0072, 0.024, 0.048, 0.045, 0.067, 0.051, 0.061, 0.073, 0.1, 0.092, 0.0072, 0.057, 0.13, 2.3],
            [0.012, 0.038, 0.071, 0.068, 0.1, 0.08, 0.095, 0.12, 0.18, 0.14, 0.012, 0.086, 0.2, 3.3],
        ],
        (7, 2) => &[
            [0.004, 0.014, 0.027, 0.027, 0.04, 0.029, 0.035, 0.04, 0.059, 0.055, 0.004, 0.034, 0.08, 1.4],
            [0.0055, 0.019, 0.039, 0.034, 0.051, 0.039, 0.047, 0.056, 0.079, 0.07, 0.0055, 0.043, 0.1, 1.7],
            [0.0074, 0.023, 0.043, 0.04, 0.06, 0.049, 0.058, 0.076, 0.1, 0.084, 0.0074, 0.051, 0.12, 1.9],
            [0.011, 0.032, 0.057, 0.053, 0.077, 0.07, 0.08, 0.12, 0.15, 0.11, 0.011, 0.067, 0.15, 2.3],
        ],
        (8, 1) => &[
            [0.0075, 0.023, 0.043, 0.041, 0.06, 0.05, 0.058, 0.077, 0.1, 0.084, 0.0075, 0.052, 0.12, 1.9],
            [0.012, 0.033, 0.058, 0.054, 0.079, 0.072, 0.083, 0.12, 0.15, 0.11, 0.012, 0.069, 0.15, 2.3],
            [0.018, 0.045, 0.074, 0.065, 0.095, 0.1, 0.11, 0.19, 0.22, 0.14, 0.018, 0.084, 0.18, 2.3],
            [0.033, 0.079, 0.13, 0.11, 0.16, 0.18, 0.2, 0.35, 0.39, 0.24, 0.033, 0.14, 0.3, 3.4],
        ],
        (8, _) => &[
            [0.0079, 0.022, 0.038, 0.034, 0.05, 0.048, 0.054, 0.083, 0.1, 0.073, 0.0079, 0.044, 0.098, 1.4],
            [0.014, 0.034, 0.057, 0.05, 0.073, 0.077, 0.085, 0.14, 0.17, 0.11, 0.014, 0.065, 0.14, 1.8],
            [0.023, 0.053, 0.084, 0.071, 0.1, 0.12, 0.13, 0.25, 0.27, 0.16, 0.023, 0.092, 0.19, 1.9],
            [0.043, 0.092, 0.14, 0.11, 0.16, 0.22, 0.23, 0.46, 0.49, 0.26, 0.043, 0.15, 0.3, 2.3],
        ],
        (9, 1) => &[
            [0.019, 0.034, 0.046, 0.039, 0.052, 0.065, 0.068, 0.11, 0.12, 0.076, 0.019, 0.049, 0.086, 0.61],
            [0.025, 0.047, 0.067, 0.058, 0.079, 0.091, 0.097, 0.15, 0.17, 0.11, 0.025, 0.073, 0.14, 1.3],
        ],
        (9, _) => &[
            [0.0085, 0.03, 0.057, 0.057, 0.084, 0.06, 0.073, 0.08, 0.12, 0.11, 0.0085, 0.071, 0.17, 3.0],
            [0.014, 0.053, 0.1, 0.1, 0.15, 0.11, 0.13, 0.14, 0.22, 0.21, 0.014, 0.13, 0.31, 5.5],
        ],
        _ => &[],
    }
}

/// Package coefficients `(a, b)` for `C2 = a·Np^b`.
fn package_coefficients(package_id: usize) -> (f64, f64) {
    match package_id {
        // Hermetic DIP with solder or weld seal, pin grid array, SMT.
        1..=3 => (2.8e-4, 1.08),
        // DIP with glass seal.
        4 => (9.0e-5, 1.51),
        // Flatpack.
        5 => (3.0e-5, 1.82),
        // Can.
        6 => (3.0e-5, 2.01),
        // Non-hermetic.
        _ => (3.6e-4, 1.08),
    }
}

/// VHSIC package type correction by package.
fn package_type_factor(part: &PartContext<'_>) -> Result<f64, ModelError> {
    Ok(match part.index("package_id")? {
        1 => 1.0,
        2 => 2.2,
        3 => 4.7,
        7 => 1.3,
        8 => 2.9,
        9 => 6.1,
        other => return Err(ModelError::data_range(part.node, "package_id", other as i64)),
    })
}

/// Microcircuit family model.
pub struct IntegratedCircuit;

impl IntegratedCircuit {
    /// Technology for silicon styles, device type for GaAs.
    fn selector(part: &PartContext<'_>) -> Result<usize, ModelError> {
        let (field, value) = match part.subcategory {
            9 => ("type_id", part.index("type_id")?),
            _ => ("technology_id", part.index_or("technology_id", 1)?),
        };
        match value {
            1 | 2 => Ok(value),
            other => Err(ModelError::data_range(part.node, field, other as i64)),
        }
    }

    fn complexity_class(part: &PartContext<'_>, selector: usize) -> usize {
        let bp = breakpoints(part.subcategory, selector);
        upper_bound(bp, part.get_or("n_elements", 0.0))
    }

    /// Junction temperature (°C): case temperature plus θJC·P.
    pub fn junction_temperature(part: &PartContext<'_>) -> f64 {
        let t_case = part.positive_or(
            "temperature_case",
            CASE_TEMPERATURE[part.environment.index() - 1],
        );
        t_case + part.get_or("theta_jc", 0.0) * part.get_or("power_operating", 0.0)
    }

    fn temperature_factor(part: &PartContext<'_>, t_j: f64) -> Result<f64, ModelError> {
        let (ea, t_ref) = match part.subcategory {
            1 | 3 | 4 => (0.65, 296.0),
            2 => (part.lookup(&LOGIC_EA, "family_id")?, 296.0),
            5..=8 => (0.6, 296.0),
            9 => (part.lookup(&[1.5, 1.4], "type_id")?, 423.0),
            10 => (0.35, 296.0),
            _ => return Err(part.subcategory_error()),
        };
        Ok(0.1 * (-ea / BOLTZMANN * (1.0 / (t_j + 273.0) - 1.0 / t_ref)).exp())
    }

    fn learning_factor(part: &PartContext<'_>) -> f64 {
        0.01 * (5.35 - 0.35 * part.get_or("years_in_production", 2.0)).exp()
    }

    fn package_factor(part: &PartContext<'_>) -> Result<f64, ModelError> {
        let (a, b) = package_coefficients(part.index("package_id")?);
        Ok(a * part.get_or("n_active_pins", 0.0).powf(b))
    }

    /// EEPROM write-cycling rate λcyc.
    fn cycling_rate(part: &PartContext<'_>, t_j: f64, pi_q: f64) -> Result<f64, ModelError> {
        const K: f64 = 8.63e-5;
        let cycles = part.get_or("n_cycles", 0.0);
        let bits = part.get_or("n_elements", 0.0);
        let inv_t = 1.0 / (t_j + 273.0);
        let a1 = 6.817e-6 * cycles;
        let (a2, b1, b2) = match part.index_or("construction_id", 1)? {
            // Flotox.
            1 => {
                let b1 = (bits / 16_000.0).sqrt() * (-0.15 / K * (inv_t - 1.0 / 333.0)).exp();
                (0.0, b1, 0.0)
            }
            // Textured polysilicon.
            2 => {
                let a2 = if cycles > 300_000.0 && cycles <= 400_000.0 { 1.1 } else { 2.3 };
                let scale = (bits / 64_000.0).powf(0.25);
                let b1 = scale * (0.1 / K * (inv_t - 1.0 / 303.0)).exp();
                let b2 = scale * (-0.12 / K * (inv_t - 1.0 / 303.0)).exp();
                (a2, b1, b2)
            }
            other => return Err(ModelError::data_range(part.node, "construction_id", other as i64)),
        };
        // No ECC, on-chip Hamming code, two-needs-one redundant cell.
        let pi_ecc = part.lookup(&[1.0, 0.72, 0.68], "type_id")?;
        Ok((a1 * b1 + divide_or_zero(a2 * b2, pi_q, part.node, "quality_id")) * pi_ecc)
    }

    fn vhsic(part: &PartContext<'_>, t_j: f64, pi_q: f64) -> Result<PartPrediction, ModelError> {
        let lambda_bd = if part.index_or("type_id", 1)? == 1 { 0.16 } else { 0.24 };
        let lambda_bp = 0.0022 + 1.72e-5 * part.get_or("n_active_pins", 0.0);
        let v_esd = part.get_or("voltage_esd", 0.0);
        let lambda_eos = -(1.0 - 0.00057 * (-0.0002 * v_esd).exp()).ln() / 0.00876;
        let area = part.get_or("area", 0.0);
        let feature = divide_or_zero(2.0, part.get_or("feature_size", 0.0), part.node, "feature_size");
        let pi_cd = (area / 0.21) * feature.powi(2) * 0.64 + 0.36;
        // QML or QPL manufacturer.
        let pi_mfg = if part.index_or("manufacturing_id", 1)? == 1 { 0.55 } else { 2.0 };
        PartPrediction::evaluate(
            part.node,
            "lambdaBD * piMFG * piT * piCD + lambdaBP * piE * piQ * piPT + lambdaEOS",
            &[
                ("lambdaBD", lambda_bd),
                ("piMFG", pi_mfg),
                ("piT", Self::temperature_factor(part, t_j)?),
                ("piCD", pi_cd),
                ("lambdaBP", lambda_bp),
                ("piE", part.env(&PI_E)),
                ("piQ", pi_q),
                ("piPT", package_type_factor(part)?),
                ("lambdaEOS", lambda_eos),
            ],
        )
    }
}

impl HazardModel for IntegratedCircuit {
    fn name(&self) -> &'static str {
        "integrated circuit"
    }

    fn count_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        if part.subcategory == 10 {
            return Err(ModelError::unimplemented("VHSIC/VLSI parts count"));
        }
        let selector = Self::selector(part)?;
        let rows = count_rows(part.subcategory, selector);
        if rows.is_empty() {
            return Err(ModelError::data_range(
                part.node,
                if part.subcategory == 9 { "type_id" } else { "technology_id" },
                selector as i64,
            ));
        }
        let row = rows[Self::complexity_class(part, selector).min(rows.len() - 1)];
        let pi_q = part.lookup(&PI_Q, "quality_id")?;
        PartPrediction::evaluate(part.node, "lambdab * piQ", &[("lambdab", part.env(&row)), ("piQ", pi_q)])
    }

    fn stress_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let sub = part.subcategory;
        let t_j = Self::junction_temperature(part);
        let pi_q = part.lookup(&PI_Q, "quality_id")?;
        if sub == 10 {
            return Self::vhsic(part, t_j, pi_q);
        }

        let selector = Self::selector(part)?;
        let c1_row = c1_table(sub, selector);
        let c1 = lookup(c1_row, Self::complexity_class(part, selector) + 1, part.node, "technology_id")
            .map_err(|_| ModelError::data_range(part.node, "technology_id", selector as i64))?;
        let pi_t = Self::temperature_factor(part, t_j)?;
        let c2 = Self::package_factor(part)?;
        let pi_e = part.env(&PI_E);
        let pi_l = Self::learning_factor(part);

        let mut factors = vec![
            ("C1", c1),
            ("piT", pi_t),
            ("C2", c2),
            ("piE", pi_e),
            ("piQ", pi_q),
            ("piL", pi_l),
        ];
        let equation = match sub {
            6 => {
                factors.push(("lambdaCYC", Self::cycling_rate(part, t_j, pi_q)?));
                "(C1 * piT + C2 * piE + lambdaCYC) * piQ * piL"
            }
            9 => {
                let pi_a = match selector {
                    // Low noise and low power, driver and high power, unknown.
                    1 => part.lookup(&[1.0, 3.0, 3.0], "application_id")?,
                    _ => 1.0,
                };
                factors.push(("piA", pi_a));
                "(C1 * piT * piA + C2 * piE) * piQ * piL"
            }
            _ => "(C1 * piT + C2 * piE) * piQ * piL",
        };
        PartPrediction::evaluate(part.node, equation, &factors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use crate::environment::Environment;
    use crate::prediction::test_support::{assert_physical, for_all_environments};
    use proptest::prelude::*;

    fn logic() -> AttributeMap {
        AttributeMap::new()
            .with("technology_id", 2.0)
            .with("family_id", 1.0)
            .with("type_id", 1.0)
            .with("quality_id", 2.0)
            .with("n_elements", 2500.0)
            .with("n_active_pins", 14.0)
            .with("package_id", 1.0)
            .with("temperature_case", 45.0)
            .with("theta_jc", 28.0)
            .with("power_operating", 0.25)
            .with("years_in_production", 3.0)
    }

    #[test]
    fn test_mos_logic_stress() {
        let attrs = logic();
        let part = PartContext::new("U1", 2, Environment::GroundFixed, &attrs);
        let r = IntegratedCircuit.stress_model(&part).unwrap();

        let t_j = 45.0 + 28.0 * 0.25;
        let pi_t = 0.1 * (-0.4 / 8.617e-5 * (1.0 / (t_j + 273.0) - 1.0 / 296.0_f64)).exp();
        // 2500 gates falls in the 1001..3000 class.
        let c1 = 0.04;
        let c2 = 2.8e-4 * 14.0_f64.powf(1.08);
        let pi_l = 0.01 * (5.35 - 0.35 * 3.0_f64).exp();
        let expected = (c1 * pi_t + c2 * 2.0) * 1.0 * pi_l;
        assert!(
            (r.hazard_rate - expected).abs() < 1e-12,
            "hazard = {}, expected {}",
            r.hazard_rate,
            expected
        );
    }

    #[test]
    fn test_complexity_above_last_class_uses_last() {
        let attrs = logic().with("n_elements", 1.0e6);
        let part = PartContext::new("U2", 2, Environment::GroundFixed, &attrs);
        let r = IntegratedCircuit.stress_model(&part).unwrap();
        assert_eq!(r.factor("C1"), Some(0.29));
    }

    #[test]
    fn test_count_linear() {
        let attrs = logic().with("n_elements", 250.0);
        let part = PartContext::new("U3", 1, Environment::GroundBenign, &attrs);
        let r = IntegratedCircuit.count_model(&part).unwrap();
        assert!((r.hazard_rate - 0.017).abs() < 1e-15);
    }

    #[test]
    fn test_bipolar_eeprom_does_not_exist() {
        let attrs = logic().with("technology_id", 1.0);
        let part = PartContext::new("U4", 6, Environment::GroundBenign, &attrs);
        assert_eq!(
            IntegratedCircuit.count_model(&part).unwrap_err(),
            ModelError::data_range("U4", "technology_id", 1)
        );
        assert_eq!(
            IntegratedCircuit.stress_model(&part).unwrap_err(),
            ModelError::data_range("U4", "technology_id", 1)
        );
    }

    #[test]
    fn test_eeprom_adds_cycling_rate() {
        let attrs = logic()
            .with("n_elements", 64_000.0)
            .with("n_cycles", 10_000.0)
            .with("construction_id", 1.0);
        let part = PartContext::new("U5", 6, Environment::GroundBenign, &attrs);
        let r = IntegratedCircuit.stress_model(&part).unwrap();
        assert!(r.factor("lambdaCYC").unwrap() > 0.0);
        assert_eq!(r.equation, "(C1 * piT + C2 * piE + lambdaCYC) * piQ * piL");
    }

    #[test]
    fn test_vhsic_count_is_unimplemented() {
        let attrs = logic();
        let part = PartContext::new("U6", 10, Environment::GroundBenign, &attrs);
        assert!(matches!(
            IntegratedCircuit.count_model(&part),
            Err(ModelError::UnimplementedModel { .. })
        ));
    }

    #[test]
    fn test_vhsic_stress() {
        let attrs = logic()
            .with("area", 0.21)
            .with("feature_size", 2.0)
            .with("voltage_esd", 2000.0)
            .with("manufacturing_id", 1.0);
        let part = PartContext::new("U7", 10, Environment::GroundBenign, &attrs);
        let r = IntegratedCircuit.stress_model(&part).unwrap();
        assert!((r.factor("piCD").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(r.factor("piPT"), Some(1.0));
        assert_physical(&r, "vhsic");
    }

    proptest! {
        #[test]
        fn prop_all_subcategories_physical(sub in 1usize..=9, elements in 1.0f64..2.0e6) {
            let attrs = logic().with("n_elements", elements).with("application_id", 1.0);
            for_all_environments("U", sub, &attrs, |part| {
                assert_physical(&IntegratedCircuit.count_model(part).unwrap(), "count");
                assert_physical(&IntegratedCircuit.stress_model(part).unwrap(), "stress");
            });
        }
    }
}
