//! Discrete semiconductors (MIL-HDBK-217F section 6).
//!
//! | id | device |
//! |----|--------|
//! | 1 | diode, low frequency |
//! | 2 | diode, high frequency |
//! | 3 | transistor, low frequency bipolar |
//! | 4 | transistor, low frequency Si FET |
//! | 5 | transistor, unijunction |
//! | 6 | transistor, high frequency low noise bipolar |
//! | 7 | transistor, high frequency high power bipolar |
//! | 8 | transistor, high frequency GaAs FET |
//! | 9 | transistor, high frequency Si FET |
//! | 10 | thyristor and SCR |
//! | 11 | optoelectronic detector, isolator, emitter |
//! | 12 | optoelectronic alphanumeric display |
//! | 13 | optoelectronic laser diode |
//!
//! Junction temperature is `Tj = Tcase + θJC·P`. A non-positive case
//! temperature falls back to the environment default and a non-positive
//! `theta_jc` to the package table.

use super::table::CASE_TEMPERATURE;
use super::{HazardModel, PartContext, PartPrediction};
use crate::error::ModelError;
use crate::guard::divide_or_zero;

type EnvRow = [f64; 14];

/// Parts-count λb for the subcategories tabulated by device type.
fn count_rows_by_type(subcategory: usize) -> Option<&'static [EnvRow]> {
    const DIODE_LF: [EnvRow; 7] = [
        [0.0036, 0.028, 0.049, 0.043, 0.1, 0.092, 0.21, 0.2, 0.44, 0.17, 0.0018, 0.076, 0.23, 1.5],
        [0.00094, 0.0075, 0.013, 0.011, 0.027, 0.024, 0.054, 0.054, 0.12, 0.045, 0.00047, 0.02, 0.06, 0.4],
        [0.065, 0.52, 0.89, 0.78, 1.9, 1.7, 3.7, 3.7, 8.0, 3.1, 0.032, 1.4, 4.1, 28.0],
        [0.0028, 0.022, 0.039, 0.034, 0.062, 0.073, 0.16, 0.16, 0.35, 0.13, 0.0014, 0.06, 0.18, 1.2],
        [0.0029, 0.023, 0.04, 0.035, 0.084, 0.075, 0.17, 0.17, 0.36, 0.14, 0.0015, 0.062, 0.18, 1.2],
        [0.0033, 0.024, 0.039, 0.035, 0.082, 0.066, 0.15, 0.13, 0.27, 0.12, 0.0016, 0.06, 0.16, 1.3],
        [0.0058, 0.04, 0.066, 0.06, 0.14, 0.11, 0.25, 0.22, 0.46, 0.21, 0.0028, 0.1, 0.28, 2.1],
    ];
    const DIODE_HF: [EnvRow; 6] = [
        [0.86, 2.8, 8.9, 5.6, 20.0, 11.0, 14.0, 36.0, 62.0, 44.0, 0.43, 16.0, 67.0, 350.0],
        [0.31, 0.76, 2.1, 1.5, 4.6, 2.0, 2.5, 4.5, 7.6, 7.9, 0.16, 3.7, 12.0, 94.0],
        [0.004, 0.0096, 0.0026, 0.0019, 0.058, 0.025, 0.032, 0.057, 0.097, 0.1, 0.002, 0.048, 0.15, 1.2],
        [0.028, 0.068, 0.19, 0.14, 0.41, 0.18, 0.22, 0.4, 0.69, 0.71, 0.014, 0.34, 1.1, 8.5],
        [0.047, 0.11, 0.31, 0.23, 0.68, 0.3, 0.37, 0.67, 1.1, 1.2, 0.023, 0.56, 1.8, 14.0],
        [0.0043, 0.01, 0.029, 0.021, 0.063, 0.028, 0.034, 0.062, 0.11, 0.11, 0.0022, 0.052, 0.17, 1.3],
    ];
    const BIPOLAR_LF: [EnvRow; 2] = [
        [0.00015, 0.0011, 0.0017, 0.0017, 0.0037, 0.003, 0.0067, 0.006, 0.013, 0.0056, 0.000073, 0.0027, 0.0074, 0.056],
        [0.0057, 0.042, 0.069, 0.063, 0.15, 0.12, 0.26, 0.23, 0.5, 0.22, 0.0029, 0.11, 0.29, 1.1],
    ];
    const GAAS_FET: [EnvRow; 2] = [
        [0.17, 0.51, 1.5, 1.0, 3.4, 1.8, 2.3, 5.4, 9.2, 7.2, 0.083, 2.8, 11.0, 63.0],
        [0.42, 1.3, 3.8, 2.5, 8.5, 4.5, 5.6, 13.0, 23.0, 18.0, 0.21, 6.9, 27.0, 160.0],
    ];
    const OPTO: [EnvRow; 3] = [
        [0.011, 0.029, 0.083, 0.059, 0.18, 0.084, 0.11, 0.21, 0.35, 0.34, 0.0057, 0.15, 0.51, 3.7],
        [0.027, 0.07, 0.2, 0.14, 0.43, 0.2, 0.25, 0.49, 0.83, 0.8, 0.013, 0.35, 1.2, 8.7],
        [0.00047, 0.0012, 0.0035, 0.0025, 0.0077, 0.0035, 0.0044, 0.0086, 0.015, 0.014, 0.00024, 0.0053, 0.021, 0.15],
    ];
    const LASER: [EnvRow; 2] = [
        [5.1, 16.0, 49.0, 32.0, 110.0, 58.0, 72.0, 100.0, 170.0, 230.0, 2.6, 87.0, 350.0, 2000.0],
        [8.9, 28.0, 85.0, 55.0, 190.0, 100.0, 130.0, 180.0, 300.0, 400.0, 4.5, 150.0, 600.0, 3500.0],
    ];
    let rows: &'static [EnvRow] = match subcategory {
        1 => &DIODE_LF,
        2 => &DIODE_HF,
        3 => &BIPOLAR_LF,
        8 => &GAAS_FET,
        11 => &OPTO,
        13 => &LASER,
        _ => return None,
    };
    Some(rows)
}

/// Parts-count λb for the subcategories with a single row.
fn count_row(subcategory: usize) -> Option<EnvRow> {
    Some(match subcategory {
        4 | 9 => [0.014, 0.099, 0.16, 0.15, 0.34, 0.28, 0.62, 0.53, 1.1, 0.51, 0.0069, 0.25, 0.68, 5.3],
        5 => [0.016, 0.12, 0.2, 0.18, 0.42, 0.35, 0.8, 0.74, 1.6, 0.66, 0.0079, 0.31, 0.88, 6.4],
        6 => [0.094, 0.23, 0.63, 0.46, 1.4, 0.6, 0.75, 1.3, 2.3, 2.4, 0.047, 1.1, 3.6, 28.0],
        7 => [0.074, 0.15, 0.37, 0.29, 0.81, 0.29, 0.37, 0.52, 0.88, 0.037, 0.33, 0.66, 1.8, 18.0],
        10 => [0.0025, 0.02, 0.034, 0.03, 0.072, 0.064, 0.14, 0.14, 0.31, 0.12, 0.0012, 0.053, 0.16, 1.1],
        12 => [0.0062, 0.016, 0.045, 0.032, 0.1, 0.046, 0.058, 0.11, 0.19, 0.18, 0.0031, 0.082, 0.28, 2.0],
        _ => return None,
    })
}

const PI_Q_JAN: [f64; 5] = [0.7, 1.0, 2.4, 5.5, 8.0];
const PI_Q_HF: [f64; 4] = [0.5, 1.0, 2.0, 5.0];
const PI_Q_LASER: [f64; 3] = [1.0, 1.0, 3.3];
const PI_Q_HF_DIODE: [f64; 5] = [0.5, 1.0, 5.0, 25.0, 50.0];
const PI_Q_SCHOTTKY: [f64; 4] = [0.5, 1.0, 1.8, 2.5];

const PI_E_LF: EnvRow = [1.0, 6.0, 9.0, 9.0, 19.0, 13.0, 29.0, 20.0, 43.0, 24.0, 0.5, 14.0, 32.0, 320.0];
const PI_E_HF: EnvRow = [1.0, 2.0, 5.0, 4.0, 11.0, 4.0, 5.0, 7.0, 12.0, 16.0, 0.5, 9.0, 24.0, 250.0];
const PI_E_GAAS: EnvRow = [1.0, 2.0, 5.0, 4.0, 11.0, 4.0, 5.0, 7.0, 12.0, 16.0, 0.5, 7.5, 24.0, 250.0];
const PI_E_OPTO: EnvRow = [1.0, 2.0, 8.0, 5.0, 12.0, 4.0, 6.0, 6.0, 8.0, 17.0, 0.5, 9.0, 24.0, 450.0];

/// Junction-to-case thermal resistance (°C/W) by package.
const THETA_JC: [f64; 65] = [
    70.0, 10.0, 70.0, 70.0, 70.0, 70.0, 70.0, 5.0, 70.0, 70.0, 10.0, 70.0, 70.0, 70.0, 5.0, 5.0,
    5.0, 5.0, 5.0, 5.0, 10.0, 70.0, 70.0, 5.0, 22.0, 70.0, 5.0, 70.0, 5.0, 5.0, 1.0, 10.0, 70.0,
    70.0, 5.0, 5.0, 5.0, 10.0, 5.0, 5.0, 10.0, 5.0, 10.0, 10.0, 10.0, 5.0, 70.0, 5.0, 70.0, 70.0,
    70.0, 70.0, 70.0, 70.0, 70.0, 70.0, 70.0, 70.0, 70.0, 70.0, 70.0, 70.0, 70.0, 70.0, 70.0,
];

/// Metallurgically bonded, non-metallurgically bonded.
const PI_C: [f64; 2] = [1.0, 2.0];

/// Matching network: input and output, input only, none.
const PI_M: [f64; 3] = [1.0, 2.0, 4.0];

fn application_table(subcategory: usize) -> Option<&'static [f64]> {
    let table: &'static [f64] = match subcategory {
        2 => &[0.5, 2.5, 1.0],
        3 => &[1.5, 0.7],
        4 => &[1.5, 0.7, 2.0, 4.0, 8.0, 10.0],
        8 => &[1.0, 4.0],
        _ => return None,
    };
    Some(table)
}

/// Activation constant `Ea/k` (K) for `πT = exp(-K(1/(Tj+273) - 1/298))`.
fn activation(part: &PartContext<'_>) -> Result<f64, ModelError> {
    const DIODE_LF: [f64; 8] = [3091.0, 3091.0, 3091.0, 3091.0, 3091.0, 3091.0, 1925.0, 1925.0];
    const DIODE_HF: [f64; 6] = [5260.0, 2100.0, 2100.0, 2100.0, 2100.0, 2100.0];
    Ok(match part.subcategory {
        1 => part.lookup(&DIODE_LF, "type_id")?,
        2 => part.lookup(&DIODE_HF, "type_id")?,
        3 | 6 => 2114.0,
        4 | 9 => 1925.0,
        5 => 2483.0,
        8 => 4485.0,
        10 => 3082.0,
        11 | 12 => 2790.0,
        13 => 4635.0,
        _ => return Err(part.subcategory_error()),
    })
}

/// Semiconductor family model.
pub struct Semiconductor;

impl Semiconductor {
    fn count_quality(part: &PartContext<'_>) -> Result<f64, ModelError> {
        match part.subcategory {
            2 if part.index("type_id")? == 5 => part.lookup(&PI_Q_SCHOTTKY, "quality_id"),
            2 => part.lookup(&PI_Q_HF_DIODE, "quality_id"),
            13 => part.lookup(&PI_Q_LASER, "quality_id"),
            _ => part.lookup(&PI_Q_JAN, "quality_id"),
        }
    }

    fn stress_quality(part: &PartContext<'_>) -> Result<f64, ModelError> {
        match part.subcategory {
            6..=9 => part.lookup(&PI_Q_HF, "quality_id"),
            _ => Self::count_quality(part),
        }
    }

    fn environment_factor(part: &PartContext<'_>) -> f64 {
        let row = match part.subcategory {
            2 | 6 | 7 => &PI_E_HF,
            8 => &PI_E_GAAS,
            11..=13 => &PI_E_OPTO,
            _ => &PI_E_LF,
        };
        part.env(row)
    }

    /// Junction temperature (°C).
    pub fn junction_temperature(part: &PartContext<'_>) -> Result<f64, ModelError> {
        let t_case = part.positive_or(
            "temperature_case",
            CASE_TEMPERATURE[part.environment.index() - 1],
        );
        let theta_jc = match part.get_or("theta_jc", 0.0) {
            theta if theta > 0.0 => theta,
            _ => part.lookup(&THETA_JC, "package_id")?,
        };
        Ok(t_case + theta_jc * part.get_or("power_operating", 0.0))
    }

    fn base_rate(part: &PartContext<'_>) -> Result<f64, ModelError> {
        let freq = part.get_or("frequency_operating", 0.0);
        let power = part.get_or("power_operating", 0.0);
        Ok(match part.subcategory {
            1 => part.lookup(&[0.0038, 0.0010, 0.069, 0.003, 0.005, 0.0013, 0.0034, 0.002], "type_id")?,
            2 => part.lookup(&[0.22, 0.18, 0.0023, 0.0081, 0.027, 0.0025, 0.0025], "type_id")?,
            3 => 0.00074,
            4 => part.lookup(&[0.012, 0.0045], "type_id")?,
            5 => 0.0083,
            6 => 0.18,
            7 => 0.032 * (0.354 * freq + 0.00558 * power).exp(),
            8 if freq > 1.0 && freq <= 10.0 && power < 0.1 => 0.052,
            8 => 0.0093 * (0.429 * freq + 0.486 * power).exp(),
            9 => part.lookup(&[0.06, 0.023], "type_id")?,
            10 => 0.0022,
            11 => part.lookup(
                &[0.0055, 0.004, 0.0025, 0.013, 0.013, 0.0064, 0.0033, 0.017, 0.017, 0.0086, 0.0013, 0.00023],
                "type_id",
            )?,
            12 => {
                let characters = part.get_or("n_elements", 0.0);
                let logic_chip = matches!(part.index_or("application_id", 2)?, 1 | 3);
                0.00043 * characters + if logic_chip { 0.000043 } else { 0.0 }
            }
            13 => part.lookup(&[3.23, 5.65], "type_id")?,
            _ => return Err(part.subcategory_error()),
        })
    }

    fn temperature_factor(part: &PartContext<'_>, t_j: f64, v_ratio: f64) -> Result<f64, ModelError> {
        let arrhenius = |k: f64| (-k * (1.0 / (t_j + 273.0) - 1.0 / 298.0)).exp();
        if part.subcategory == 7 {
            // Gold and aluminum metallization.
            let (k, low, slope) = match part.index("type_id")? {
                1 => (2903.0, 0.1, 2.0),
                2 => (5794.0, 0.38, 7.55),
                other => return Err(ModelError::data_range(part.node, "type_id", other as i64)),
            };
            return Ok(if v_ratio <= 0.4 {
                low * arrhenius(k)
            } else {
                slope * (v_ratio - 0.35) * arrhenius(k)
            });
        }
        Ok(arrhenius(activation(part)?))
    }

    fn application_factor(part: &PartContext<'_>) -> Result<f64, ModelError> {
        let duty = part.get_or("duty_cycle", 100.0) / 100.0;
        match part.subcategory {
            7 if part.index("application_id")? == 1 => Ok(7.6),
            7 => Ok(0.06 * duty + 0.4),
            13 if part.index("application_id")? == 1 => Ok(4.4),
            13 => Ok(duty.max(0.0).sqrt()),
            sub => match application_table(sub) {
                Some(table) => part.lookup(table, "application_id"),
                None => Ok(1.0),
            },
        }
    }

    fn electrical_stress_factor(part: &PartContext<'_>, v_ratio: f64) -> Result<f64, ModelError> {
        Ok(match part.subcategory {
            1 if part.index("type_id")? > 5 => 1.0,
            1 if v_ratio <= 0.3 => 0.054,
            1 => v_ratio.powf(2.43),
            3 | 6 => 0.045 * (3.1 * v_ratio).exp(),
            10 if v_ratio <= 0.3 => 0.1,
            10 => v_ratio.powf(1.9),
            _ => 1.0,
        })
    }

    fn power_rating_factor(part: &PartContext<'_>) -> Result<f64, ModelError> {
        let p_rated = part.get_or("power_rated", 0.0);
        Ok(match part.subcategory {
            // PIN diodes only.
            2 if part.index("type_id")? == 4 => 0.326 * p_rated.ln() - 0.25,
            3 | 6 if p_rated < 0.1 => 0.43,
            3 | 6 => p_rated.powf(0.37),
            10 => part.get_or("current_rated", 0.0).powf(0.4),
            _ => 1.0,
        })
    }
}

impl HazardModel for Semiconductor {
    fn name(&self) -> &'static str {
        "semiconductor"
    }

    fn count_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let row = match (count_rows_by_type(part.subcategory), count_row(part.subcategory)) {
            (Some(rows), _) => part.lookup(rows, "type_id")?,
            (None, Some(row)) => row,
            (None, None) => return Err(part.subcategory_error()),
        };
        let pi_q = Self::count_quality(part)?;
        PartPrediction::evaluate(
            part.node,
            "lambdab * piQ",
            &[("lambdab", part.env(&row)), ("piQ", pi_q)],
        )
    }

    fn stress_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let sub = part.subcategory;
        let lambda_b = Self::base_rate(part)?;
        let applied = part.get_or("voltage_dc_operating", 0.0) + part.get_or("voltage_ac_operating", 0.0);
        let v_ratio = part.ratio(applied, "voltage_rated");
        let t_j = Self::junction_temperature(part)?;
        let pi_t = Self::temperature_factor(part, t_j, v_ratio)?;
        let pi_q = Self::stress_quality(part)?;
        let pi_e = Self::environment_factor(part);

        let mut factors = vec![("lambdab", lambda_b), ("piT", pi_t), ("piQ", pi_q), ("piE", pi_e)];
        let equation = match sub {
            1 => {
                factors.push(("piS", Self::electrical_stress_factor(part, v_ratio)?));
                factors.push(("piC", part.lookup(&PI_C, "construction_id")?));
                "lambdab * piT * piS * piC * piQ * piE"
            }
            2 => {
                factors.push(("piA", Self::application_factor(part)?));
                factors.push(("piR", Self::power_rating_factor(part)?));
                "lambdab * piT * piA * piR * piQ * piE"
            }
            3 => {
                factors.push(("piA", Self::application_factor(part)?));
                factors.push(("piR", Self::power_rating_factor(part)?));
                factors.push(("piS", Self::electrical_stress_factor(part, v_ratio)?));
                "lambdab * piT * piA * piR * piS * piQ * piE"
            }
            4 => {
                factors.push(("piA", Self::application_factor(part)?));
                "lambdab * piT * piA * piQ * piE"
            }
            6 | 10 => {
                factors.push(("piR", Self::power_rating_factor(part)?));
                factors.push(("piS", Self::electrical_stress_factor(part, v_ratio)?));
                "lambdab * piT * piR * piS * piQ * piE"
            }
            7 | 8 => {
                factors.push(("piA", Self::application_factor(part)?));
                factors.push(("piM", part.lookup(&PI_M, "matching_id")?));
                "lambdab * piT * piA * piM * piQ * piE"
            }
            13 => {
                let current = part.get_or("current_operating", 0.0);
                let p_ratio = part.ratio(part.get_or("power_operating", 0.0), "power_rated");
                let pi_p = divide_or_zero(1.0, 2.0 * (1.0 - p_ratio), part.node, "power_ratio");
                factors.push(("piI", current.max(0.0).powf(0.68)));
                factors.push(("piA", Self::application_factor(part)?));
                factors.push(("piP", pi_p));
                "lambdab * piT * piI * piA * piP * piQ * piE"
            }
            _ => "lambdab * piT * piQ * piE",
        };
        PartPrediction::evaluate(part.node, equation, &factors)
    }
}
