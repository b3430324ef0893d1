//! Resistors (MIL-HDBK-217F section 9).
//!
//! Fixed styles are subcategories 1..=8 (composition, film, film power,
//! network, wirewound, wirewound power, chassis-mount wirewound, thermistor);
//! variable styles are 9..=15 (wirewound, precision wirewound, semi-precision,
//! power wirewound, non-wirewound, composition, film).

use super::table::{bucket, lookup};
use super::{HazardModel, PartContext, PartPrediction};
use crate::error::ModelError;

type EnvRow = [f64; 14];

const COUNT_LAMBDA_B: [EnvRow; 15] = [
    [0.0005, 0.0022, 0.0071, 0.0037, 0.012, 0.0052, 0.0065, 0.016, 0.025, 0.025, 0.00025, 0.0098, 0.035, 0.36],
    // Subcategory 2 is replaced by COUNT_LAMBDA_B_FILM.
    [0.0; 14],
    [0.012, 0.025, 0.13, 0.062, 0.21, 0.078, 0.10, 0.19, 0.24, 0.32, 0.0060, 0.18, 0.47, 8.2],
    [0.0023, 0.0066, 0.031, 0.013, 0.055, 0.022, 0.043, 0.077, 0.15, 0.10, 0.0011, 0.055, 0.15, 1.7],
    [0.0085, 0.018, 0.10, 0.045, 0.16, 0.15, 0.17, 0.30, 0.38, 0.26, 0.0068, 0.13, 0.37, 5.4],
    // Subcategory 6 is replaced by COUNT_LAMBDA_B_WIREWOUND_POWER.
    [0.0; 14],
    [0.008, 0.18, 0.096, 0.045, 0.15, 0.044, 0.088, 0.12, 0.24, 0.25, 0.004, 0.13, 0.37, 5.5],
    [0.065, 0.32, 1.4, 0.71, 1.6, 0.71, 1.9, 1.0, 2.7, 2.4, 0.032, 1.3, 3.4, 62.0],
    [0.025, 0.055, 0.35, 0.15, 0.58, 0.16, 0.26, 0.35, 0.58, 1.1, 0.013, 0.52, 1.6, 24.0],
    [0.33, 0.73, 7.0, 2.9, 12.0, 3.5, 5.3, 7.1, 9.8, 23.0, 0.16, 11.0, 33.0, 510.0],
    [0.15, 0.35, 3.1, 1.2, 5.4, 1.9, 2.8, 0.0, 0.0, 9.0, 0.075, 0.0, 0.0, 0.0],
    [0.15, 0.34, 2.9, 1.2, 5.0, 1.6, 2.4, 0.0, 0.0, 7.6, 0.076, 0.0, 0.0, 0.0],
    [0.043, 0.15, 0.75, 0.35, 1.3, 0.39, 0.78, 1.8, 2.8, 2.5, 0.21, 1.2, 3.7, 49.0],
    [0.05, 0.11, 1.1, 0.45, 1.7, 2.8, 4.6, 4.6, 7.5, 3.3, 0.025, 1.5, 4.7, 67.0],
    [0.048, 0.16, 0.76, 0.36, 1.3, 0.36, 0.72, 1.4, 2.2, 2.3, 0.024, 1.2, 3.4, 52.0],
];

/// Film resistors: RL/RLR (specifications 1, 2) and RN (3, 4).
const COUNT_LAMBDA_B_FILM: [EnvRow; 2] = [
    [0.0012, 0.0027, 0.011, 0.0054, 0.020, 0.0063, 0.013, 0.018, 0.033, 0.030, 0.00025, 0.014, 0.044, 0.69],
    [0.0014, 0.0031, 0.013, 0.0061, 0.023, 0.0072, 0.014, 0.021, 0.038, 0.034, 0.00028, 0.016, 0.050, 0.78],
];

/// Power wirewound: RW (specification 1) and RWR (2).
const COUNT_LAMBDA_B_WIREWOUND_POWER: [EnvRow; 2] = [
    [0.014, 0.031, 0.16, 0.077, 0.26, 0.073, 0.15, 0.19, 0.39, 0.42, 0.0042, 0.21, 0.62, 9.4],
    [0.013, 0.028, 0.15, 0.070, 0.24, 0.065, 0.13, 0.18, 0.35, 0.38, 0.0038, 0.19, 0.56, 8.6],
];

const COUNT_PI_Q: [f64; 6] = [0.030, 0.10, 0.30, 1.0, 3.0, 10.0];

const STRESS_PI_Q: [&[f64]; 15] = [
    &[0.03, 0.1, 0.3, 1.0, 5.0, 15.0],
    &[0.03, 0.1, 0.3, 1.0, 5.0, 5.0, 15.0],
    &[1.0, 3.0],
    &[1.0, 3.0],
    &[0.03, 0.1, 0.3, 1.0, 5.0, 15.0],
    &[0.03, 0.1, 0.3, 1.0, 5.0, 15.0],
    &[0.03, 0.1, 0.3, 1.0, 5.0, 15.0],
    &[1.0, 15.0],
    &[0.02, 0.06, 0.2, 0.6, 3.0, 10.0],
    &[2.5, 5.0],
    &[2.0, 4.0],
    &[2.0, 4.0],
    &[0.02, 0.06, 0.2, 0.6, 3.0, 10.0],
    &[2.5, 5.0],
    &[2.0, 4.0],
];

const PI_E: [EnvRow; 15] = [
    [1.0, 3.0, 8.0, 5.0, 13.0, 4.0, 5.0, 7.0, 11.0, 19.0, 0.5, 11.0, 27.0, 490.0],
    [1.0, 2.0, 8.0, 4.0, 14.0, 4.0, 8.0, 10.0, 18.0, 19.0, 0.2, 10.0, 28.0, 510.0],
    [1.0, 2.0, 10.0, 5.0, 17.0, 6.0, 8.0, 14.0, 18.0, 25.0, 0.5, 14.0, 36.0, 660.0],
    [1.0, 2.0, 10.0, 5.0, 17.0, 6.0, 8.0, 14.0, 18.0, 25.0, 0.5, 14.0, 36.0, 660.0],
    [1.0, 2.0, 11.0, 5.0, 18.0, 15.0, 18.0, 28.0, 35.0, 27.0, 0.8, 14.0, 38.0, 610.0],
    [1.0, 2.0, 10.0, 5.0, 16.0, 4.0, 8.0, 9.0, 18.0, 23.0, 0.3, 13.0, 34.0, 610.0],
    [1.0, 2.0, 10.0, 5.0, 16.0, 4.0, 8.0, 9.0, 18.0, 23.0, 0.5, 13.0, 34.0, 610.0],
    [1.0, 5.0, 21.0, 11.0, 24.0, 11.0, 30.0, 16.0, 42.0, 37.0, 0.5, 20.0, 53.0, 950.0],
    [1.0, 2.0, 12.0, 6.0, 20.0, 5.0, 8.0, 9.0, 15.0, 33.0, 0.5, 18.0, 48.0, 870.0],
    [1.0, 2.0, 18.0, 8.0, 30.0, 8.0, 12.0, 13.0, 18.0, 53.0, 0.5, 29.0, 76.0, 1400.0],
    [1.0, 2.0, 16.0, 7.0, 28.0, 8.0, 12.0, 0.0, 0.0, 38.0, 0.5, 0.0, 0.0, 0.0],
    [1.0, 3.0, 16.0, 7.0, 28.0, 8.0, 12.0, 0.0, 0.0, 38.0, 0.5, 0.0, 0.0, 0.0],
    [1.0, 3.0, 14.0, 6.0, 24.0, 5.0, 7.0, 12.0, 18.0, 39.0, 0.5, 22.0, 57.0, 1000.0],
    [1.0, 2.0, 19.0, 8.0, 29.0, 40.0, 65.0, 48.0, 78.0, 46.0, 0.5, 25.0, 66.0, 1200.0],
    [1.0, 3.0, 14.0, 7.0, 24.0, 6.0, 12.0, 20.0, 30.0, 39.0, 0.5, 22.0, 57.0, 1000.0],
];

/// Temperature and power-stress base rate.
///
/// Most styles share `λb = A·exp(B·(t/Tref)^G)·exp((S/Ns)·(t/273)^J)` with
/// `t` in kelvin; film power and wirewound styles carry their own forms.
fn base_rate(part: &PartContext<'_>, t_amb: f64, s: f64) -> Result<f64, ModelError> {
    let t = t_amb + 273.0;
    let common = |a: f64, b: f64, t_ref: f64, g: f64, ns: f64, j: f64| {
        a * (b * (t / t_ref).powf(g)).exp() * ((s / ns) * (t / 273.0).powf(j)).exp()
    };
    Ok(match part.subcategory {
        1 => common(4.5e-9, 12.0, 343.0, 1.0, 0.6, 1.0),
        2 => match part.index("specification_id")? {
            1 | 2 => common(3.25e-4, 3.0, 343.0, 1.0, 1.0, 1.0),
            3 | 4 => common(5.0e-5, 3.5, 398.0, 1.0, 1.0, 1.0),
            other => return Err(ModelError::data_range(part.node, "specification_id", other as i64)),
        },
        3 => 7.33e-3 * (0.202 * t / 298.0).exp().powf(2.6) * ((s / 1.45) * (t / 273.0).powf(0.89)).exp().powf(1.3),
        5 => 0.0031 * (t / 398.0).powi(10).exp() * (s * t / 273.0).powf(1.5).exp(),
        6 => common(0.00148, 1.0, 298.0, 2.0, 0.5, 1.0),
        7 => common(0.00015, 2.64, 298.0, 1.0, 0.466, 1.0),
        9 => common(0.0062, 1.0, 358.0, 5.0, 1.0, 1.0),
        10 => common(0.0735, 1.03, 358.0, 4.45, 2.74, 3.51),
        11 => common(0.0398, 0.514, 313.0, 5.28, 1.44, 4.46),
        12 => common(0.0481, 0.334, 298.0, 4.66, 1.47, 2.83),
        13 => common(0.019, 0.445, 358.0, 7.3, 2.69, 2.46),
        14 => common(0.0246, 0.459, 343.0, 9.3, 2.32, 5.3),
        15 => common(0.018, 1.0, 343.0, 7.4, 2.55, 3.6),
        _ => return Err(part.subcategory_error()),
    })
}

/// Network resistor base rate.
const NETWORK_LAMBDA_B: f64 = 0.00006;

/// Thermistor base rate: bead, disk, rod.
const THERMISTOR_LAMBDA_B: [f64; 3] = [0.021, 0.065, 0.105];

/// Resistance factor breakpoints (Ω) and values for the single-table styles.
fn resistance_table(subcategory: usize) -> Option<(&'static [f64], &'static [f64])> {
    let table: (&'static [f64], &'static [f64]) = match subcategory {
        1 | 2 => (&[1.0e5, 1.0e6, 1.0e7], &[1.0, 1.1, 1.6, 2.5]),
        3 => (&[100.0, 1.0e5, 1.0e6], &[1.0, 1.2, 1.3, 3.5]),
        5 => (&[1.0e4, 1.0e5, 1.0e6], &[1.0, 1.7, 3.0, 5.0]),
        9 | 11 | 12 => (&[2.0e3, 5.0e3], &[1.0, 1.4, 2.0]),
        10 => (
            &[1.0e4, 2.0e4, 5.0e4, 1.0e5, 2.0e5],
            &[1.0, 1.1, 1.4, 2.0, 2.5, 3.5],
        ),
        13 | 14 => (&[5.0e4, 1.0e5, 2.0e5, 5.0e5], &[1.0, 1.1, 1.2, 1.4, 1.8]),
        15 => (&[1.0e4, 5.0e4, 2.0e5, 1.0e6], &[1.0, 1.1, 1.2, 1.4, 1.8]),
        _ => return None,
    };
    Some(table)
}

/// Power wirewound (RW, RWR) resistance factor by specification and family.
/// A zero entry marks a resistance the family is not built in.
const WIREWOUND_POWER_BREAKPOINTS: [&[f64]; 2] = [
    &[500.0, 1.0e3, 5.0e3, 7.5e3, 1.0e4, 1.5e4, 2.0e4],
    &[100.0, 1.0e3, 1.0e4, 1.0e5, 1.5e5, 2.0e5],
];

const WIREWOUND_POWER_RW: [[f64; 8]; 8] = [
    [1.0, 1.0, 1.2, 1.2, 1.6, 1.6, 1.6, 0.0],
    [1.0, 1.0, 1.0, 1.2, 1.6, 1.6, 0.0, 0.0],
    [1.0, 1.0, 1.0, 1.0, 1.2, 1.2, 1.2, 1.6],
    [1.0, 1.2, 1.6, 1.6, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.6, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.6, 1.6, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.1, 1.2, 1.2, 1.6, 0.0, 0.0],
    [1.0, 1.0, 1.4, 0.0, 0.0, 0.0, 0.0, 0.0],
];

const WIREWOUND_POWER_RWR: [[f64; 7]; 35] = [
    [1.0, 1.0, 1.0, 1.0, 1.2, 1.6, 0.0],
    [1.0, 1.0, 1.0, 1.2, 1.6, 0.0, 0.0],
    [1.0, 1.0, 1.2, 1.6, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 2.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 2.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.2, 2.0, 0.0, 0.0, 0.0],
    [1.0, 1.2, 1.4, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.6, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.2, 2.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.2, 1.6, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 1.4, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 1.2, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.4, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.2, 1.6, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.4, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.2, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 1.4, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 1.4, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 1.4, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.2, 1.5, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.2, 1.6, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 1.4, 1.6, 0.0, 0.0],
    [1.0, 1.0, 1.0, 1.4, 1.6, 2.0, 0.0],
    [1.0, 1.0, 1.0, 1.4, 1.6, 2.0, 0.0],
    [1.0, 1.0, 1.4, 2.4, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.2, 2.6, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.2, 1.4, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.2, 1.6, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 1.6, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.4, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.2, 1.5, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.2, 0.0, 0.0, 0.0, 0.0, 0.0],
];

/// Chassis-mount wirewound (RE, RER) resistance factor by specification and family.
const CHASSIS_BREAKPOINTS: [f64; 5] = [500.0, 1.0e3, 5.0e3, 1.0e4, 2.0e4];

const CHASSIS_PI_R: [[[f64; 6]; 6]; 2] = [
    [
        [1.0, 1.2, 1.2, 1.6, 0.0, 0.0],
        [1.0, 1.0, 1.2, 1.6, 0.0, 0.0],
        [1.0, 1.0, 1.2, 1.2, 1.6, 0.0],
        [1.0, 1.0, 1.0, 1.1, 1.2, 1.6],
        [1.0, 1.0, 1.0, 1.0, 1.2, 1.6],
        [1.0, 1.0, 1.0, 1.0, 1.2, 1.6],
    ],
    [
        [1.0, 1.2, 1.6, 0.0, 0.0, 0.0],
        [1.0, 1.2, 1.6, 0.0, 0.0, 0.0],
        [1.0, 1.0, 1.2, 1.6, 0.0, 0.0],
        [1.0, 1.0, 1.1, 1.2, 1.4, 0.0],
        [1.0, 1.0, 1.0, 1.2, 1.6, 0.0],
        [1.0, 1.0, 1.0, 1.1, 1.4, 0.0],
    ],
];

/// Voltage factor for variable resistors, by applied-to-rated voltage.
const PI_V_WIREWOUND_BREAKPOINTS: [f64; 6] = [0.1, 0.2, 0.6, 0.7, 0.8, 0.9];
const PI_V_WIREWOUND: [f64; 7] = [1.1, 1.05, 1.0, 1.1, 1.22, 1.4, 2.0];
const PI_V_NON_WIREWOUND_BREAKPOINTS: [f64; 2] = [0.8, 0.9];
const PI_V_NON_WIREWOUND: [f64; 3] = [1.0, 1.05, 1.2];

/// Construction class factor for precision and power wirewound variables.
fn construction_table(subcategory: usize) -> &'static [f64] {
    match subcategory {
        10 => &[2.0, 1.0, 3.0, 1.5],
        _ => &[2.0, 1.0],
    }
}

/// Nominal resistance (Ω) substituted when none is recorded.
fn default_resistance(subcategory: usize) -> f64 {
    match subcategory {
        1 | 2 => 1.0e6,
        3 => 100.0,
        4 | 8 => 1000.0,
        5 => 1.0e5,
        6 | 7 | 9 | 11 | 12 => 5000.0,
        10 => 5.0e4,
        _ => 2.0e5,
    }
}

/// Resistor family model.
pub struct Resistor;

impl Resistor {
    fn resistance_factor(part: &PartContext<'_>, resistance: f64) -> Result<f64, ModelError> {
        let pi_r = match part.subcategory {
            6 => {
                let spec = part.index("specification_id")?;
                let family = part.index("family_id")?;
                let bp = lookup(&WIREWOUND_POWER_BREAKPOINTS, spec, part.node, "specification_id")?;
                let slot = bucket(bp, resistance);
                match spec {
                    1 => lookup(&WIREWOUND_POWER_RW, family, part.node, "family_id")?[slot],
                    _ => lookup(&WIREWOUND_POWER_RWR, family, part.node, "family_id")?[slot],
                }
            }
            7 => {
                let by_spec = part.lookup(&CHASSIS_PI_R, "specification_id")?;
                let row = part.lookup(&by_spec, "family_id")?;
                row[bucket(&CHASSIS_BREAKPOINTS, resistance)]
            }
            sub => match resistance_table(sub) {
                Some((bp, values)) => values[bucket(bp, resistance)],
                None => 1.0,
            },
        };
        if pi_r <= 0.0 {
            return Err(ModelError::data_range(part.node, "resistance", resistance as i64));
        }
        Ok(pi_r)
    }

    fn voltage_factor(part: &PartContext<'_>) -> f64 {
        let applied = part.get_or("voltage_dc_operating", 0.0) + part.get_or("voltage_ac_operating", 0.0);
        let ratio = part.ratio(applied, "voltage_rated");
        match part.subcategory {
            9..=12 => PI_V_WIREWOUND[bucket(&PI_V_WIREWOUND_BREAKPOINTS, ratio)],
            _ => PI_V_NON_WIREWOUND[bucket(&PI_V_NON_WIREWOUND_BREAKPOINTS, ratio)],
        }
    }

    /// Operating-to-rated power ratio; an unknown ratio is taken as 0.5.
    fn power_ratio(part: &PartContext<'_>) -> f64 {
        let s = part.ratio(part.get_or("power_operating", 0.0), "power_rated");
        if s > 0.0 {
            s
        } else {
            0.5
        }
    }
}

impl HazardModel for Resistor {
    fn name(&self) -> &'static str {
        "resistor"
    }

    fn count_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let row = match part.subcategory {
            2 => match part.index("specification_id")? {
                1 | 2 => COUNT_LAMBDA_B_FILM[0],
                3 | 4 => COUNT_LAMBDA_B_FILM[1],
                other => return Err(ModelError::data_range(part.node, "specification_id", other as i64)),
            },
            6 => part.lookup(&COUNT_LAMBDA_B_WIREWOUND_POWER, "specification_id")?,
            s => lookup(&COUNT_LAMBDA_B, s, part.node, "subcategory_id")?,
        };
        let pi_q = part.lookup(&COUNT_PI_Q, "quality_id")?;
        PartPrediction::evaluate(
            part.node,
            "lambdab * piQ",
            &[("lambdab", part.env(&row)), ("piQ", pi_q)],
        )
    }

    fn stress_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let sub = part.subcategory;
        let pi_q_table = lookup(&STRESS_PI_Q, sub, part.node, "subcategory_id")?;
        let pi_q = part.lookup(pi_q_table, "quality_id")?;
        let pi_e = part.env(&PI_E[sub - 1]);
        let t_amb = part.get_or("temperature_active", 30.0);
        let stress = Self::power_ratio(part);

        let lambda_b = match sub {
            4 => NETWORK_LAMBDA_B,
            8 => part.lookup(&THERMISTOR_LAMBDA_B, "type_id")?,
            _ => base_rate(part, t_amb, stress)?,
        };

        match sub {
            4 => {
                let t_case = t_amb + 55.0 * stress;
                let pi_t = (-4056.0 * (1.0 / (t_case + 273.0) - 1.0 / 298.0)).exp();
                let n = part.positive_or("n_elements", 10.0);
                PartPrediction::evaluate(
                    part.node,
                    "lambdab * piT * piNR * piQ * piE",
                    &[("lambdab", lambda_b), ("piT", pi_t), ("piNR", n), ("piQ", pi_q), ("piE", pi_e)],
                )
            }
            8 => PartPrediction::evaluate(
                part.node,
                "lambdab * piQ * piE",
                &[("lambdab", lambda_b), ("piQ", pi_q), ("piE", pi_e)],
            ),
            9..=15 => {
                let resistance = part.positive_or("resistance", default_resistance(sub));
                let pi_r = Self::resistance_factor(part, resistance)?;
                let n = part.positive_or("n_elements", 3.0);
                let pi_taps = n.powf(1.5) / 25.0 + 0.792;
                let pi_v = Self::voltage_factor(part);
                if matches!(sub, 10 | 12) {
                    let pi_c = part.lookup(construction_table(sub), "construction_id")?;
                    PartPrediction::evaluate(
                        part.node,
                        "lambdab * piTAPS * piC * piR * piV * piQ * piE",
                        &[
                            ("lambdab", lambda_b),
                            ("piTAPS", pi_taps),
                            ("piC", pi_c),
                            ("piR", pi_r),
                            ("piV", pi_v),
                            ("piQ", pi_q),
                            ("piE", pi_e),
                        ],
                    )
                } else {
                    PartPrediction::evaluate(
                        part.node,
                        "lambdab * piTAPS * piR * piV * piQ * piE",
                        &[
                            ("lambdab", lambda_b),
                            ("piTAPS", pi_taps),
                            ("piR", pi_r),
                            ("piV", pi_v),
                            ("piQ", pi_q),
                            ("piE", pi_e),
                        ],
                    )
                }
            }
            _ => {
                let resistance = part.positive_or("resistance", default_resistance(sub));
                let pi_r = Self::resistance_factor(part, resistance)?;
                PartPrediction::evaluate(
                    part.node,
                    "lambdab * piR * piQ * piE",
                    &[("lambdab", lambda_b), ("piR", pi_r), ("piQ", pi_q), ("piE", pi_e)],
                )
            }
        }
    }
}
