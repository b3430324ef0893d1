//! Capacitors (MIL-HDBK-217F section 10).
//!
//! Subcategories:
//!
//! | id | style |
//! |----|-------|
//! | 1 | fixed paper bypass (CA, CP) |
//! | 2 | fixed feed-through (CZ, CZR) |
//! | 3 | fixed paper and plastic film (CPV, CQ, CQR) |
//! | 4 | fixed metallized paper/plastic (CH, CHR) |
//! | 5 | fixed plastic and metallized plastic |
//! | 6 | fixed super-metallized plastic (CRH) |
//! | 7 | fixed mica (CM, CMR) |
//! | 8 | fixed mica button (CB) |
//! | 9 | fixed glass (CY, CYR) |
//! | 10 | fixed ceramic, general purpose (CK, CKR) |
//! | 11 | fixed ceramic, temperature compensating and chip (CC, CCR, CDR) |
//! | 12 | electrolytic tantalum, solid (CSR) |
//! | 13 | electrolytic tantalum, non-solid (CL, CLR) |
//! | 14 | electrolytic aluminum (CU, CUR) |
//! | 15 | electrolytic dry aluminum (CE) |
//! | 16 | variable ceramic (CV) |
//! | 17 | variable piston (PC) |
//! | 18 | variable air trimmer (CT) |
//! | 19 | variable and fixed, gas or vacuum (CG) |

use super::table::{bucket, lookup};
use super::{HazardModel, PartContext, PartPrediction};
use crate::error::ModelError;

type EnvRow = [f64; 14];

/// Parts-count λb for subcategory 1, by specification (MIL-C-25 / MIL-C-12889).
const COUNT_LAMBDA_B_PAPER: [EnvRow; 2] = [
    [0.0036, 0.0072, 0.330, 0.016, 0.055, 0.023, 0.030, 0.07, 0.13, 0.083, 0.0018, 0.044, 0.12, 2.1],
    [0.0039, 0.0087, 0.042, 0.022, 0.070, 0.035, 0.047, 0.19, 0.35, 0.130, 0.0020, 0.056, 0.19, 2.5],
];

/// Parts-count λb for subcategories 2..=19.
const COUNT_LAMBDA_B: [EnvRow; 18] = [
    [0.0047, 0.0096, 0.044, 0.034, 0.073, 0.030, 0.040, 0.094, 0.15, 0.11, 0.0024, 0.058, 0.18, 2.7],
    [0.0021, 0.0042, 0.017, 0.010, 0.030, 0.0068, 0.013, 0.026, 0.048, 0.044, 0.0010, 0.023, 0.063, 1.1],
    [0.0029, 0.0058, 0.023, 0.014, 0.041, 0.012, 0.018, 0.037, 0.066, 0.060, 0.0014, 0.032, 0.088, 1.5],
    [0.0041, 0.0083, 0.042, 0.021, 0.067, 0.026, 0.048, 0.086, 0.14, 0.10, 0.0020, 0.054, 0.15, 2.5],
    [0.0023, 0.0092, 0.019, 0.012, 0.033, 0.0096, 0.014, 0.034, 0.053, 0.048, 0.0011, 0.026, 0.07, 1.2],
    [0.0005, 0.0015, 0.0091, 0.0044, 0.014, 0.0068, 0.0095, 0.054, 0.069, 0.031, 0.00025, 0.012, 0.046, 0.45],
    [0.018, 0.037, 0.19, 0.094, 0.31, 0.10, 0.14, 0.47, 0.60, 0.48, 0.0091, 0.25, 0.68, 11.0],
    [0.00032, 0.00096, 0.0059, 0.0029, 0.0094, 0.0044, 0.0062, 0.035, 0.045, 0.020, 0.00016, 0.0076, 0.030, 0.29],
    [0.0036, 0.0074, 0.034, 0.019, 0.056, 0.015, 0.015, 0.032, 0.048, 0.077, 0.0014, 0.049, 0.13, 2.3],
    [0.00078, 0.0022, 0.013, 0.0056, 0.023, 0.0077, 0.015, 0.053, 0.12, 0.048, 0.00039, 0.017, 0.065, 0.68],
    [0.0018, 0.0039, 0.016, 0.0097, 0.028, 0.0091, 0.011, 0.034, 0.057, 0.055, 0.00072, 0.022, 0.066, 1.0],
    [0.0061, 0.013, 0.069, 0.039, 0.11, 0.031, 0.061, 0.13, 0.29, 0.18, 0.0030, 0.069, 0.26, 4.0],
    [0.024, 0.061, 0.42, 0.18, 0.59, 0.46, 0.55, 2.1, 2.6, 1.2, 0.012, 0.49, 1.7, 21.0],
    [0.029, 0.081, 0.58, 0.24, 0.83, 0.73, 0.88, 4.3, 5.4, 2.0, 0.015, 0.68, 2.8, 28.0],
    [0.08, 0.27, 1.2, 0.71, 2.3, 0.69, 1.1, 6.2, 12.0, 4.1, 0.032, 1.9, 5.9, 85.0],
    [0.033, 0.13, 0.62, 0.31, 0.93, 0.21, 0.28, 2.2, 3.3, 2.2, 0.16, 0.93, 3.2, 37.0],
    [0.80, 0.33, 1.6, 0.87, 3.0, 1.0, 1.7, 9.9, 19.0, 8.1, 0.032, 2.5, 8.9, 100.0],
    [0.4, 1.3, 6.8, 3.6, 13.0, 5.7, 10.0, 58.0, 90.0, 23.0, 20.0, 0.0, 0.0, 0.0],
];

/// Parts-count quality factor: S, R, P, M, L, MIL-SPEC, lower.
const COUNT_PI_Q: [f64; 7] = [0.030, 0.10, 0.30, 1.0, 3.0, 3.0, 10.0];

/// Rated maximum temperature (°C) to reference temperature (K).
const REF_TEMP: [(f64, f64); 9] = [
    (65.0, 338.0),
    (70.0, 343.0),
    (85.0, 358.0),
    (105.0, 378.0),
    (125.0, 398.0),
    (150.0, 423.0),
    (170.0, 443.0),
    (175.0, 448.0),
    (200.0, 473.0),
];

/// Stress-model constants per subcategory:
/// `[A, Ns, H, B, G, C1, C2]` where
/// `λb = A((S/Ns)^H + 1) exp(B((T+273)/Tref)^G)` and `πCV = C1·C^C2`.
const FACTORS: [[f64; 7]; 19] = [
    [0.00086, 0.4, 5.0, 2.5, 1.8, 1.2, 0.095],
    [0.00115, 0.4, 5.0, 2.5, 1.8, 1.4, 0.12],
    [0.0005, 0.4, 5.0, 2.5, 1.8, 1.6, 0.13],
    [0.00069, 0.4, 5.0, 2.5, 1.8, 1.2, 0.092],
    [0.00099, 0.4, 5.0, 2.5, 1.8, 1.1, 0.085],
    [0.00055, 0.4, 5.0, 2.5, 1.8, 1.2, 0.092],
    [8.6e-10, 0.4, 3.0, 16.0, 1.0, 0.45, 0.14],
    [0.0053, 0.4, 3.0, 1.2, 6.3, 0.31, 0.23],
    [8.25e-10, 0.5, 4.0, 16.0, 1.0, 0.62, 0.14],
    [0.0003, 0.3, 3.0, 1.0, 1.0, 0.41, 0.11],
    [2.6e-9, 0.3, 3.0, 14.3, 1.0, 0.59, 0.12],
    [0.00375, 0.4, 3.0, 2.6, 9.0, 1.0, 0.12],
    [0.00165, 0.4, 3.0, 2.6, 9.0, 0.82, 0.066],
    [0.00254, 0.5, 3.0, 5.09, 5.0, 0.34, 0.18],
    [0.0028, 0.55, 3.0, 4.09, 5.9, 0.321, 0.19],
    [0.00224, 0.17, 3.0, 1.59, 10.1, 1.0, 0.0],
    [7.3e-7, 0.33, 3.0, 12.1, 1.0, 1.0, 0.0],
    [1.92e-6, 0.33, 3.0, 10.8, 1.0, 1.0, 0.0],
    [0.0112, 0.17, 3.0, 1.59, 10.1, 1.0, 0.0],
];

const STRESS_PI_Q: [&[f64]; 19] = [
    &[3.0, 7.0],
    &[1.0, 3.0, 10.0],
    &[0.03, 0.1, 0.3, 1.0, 3.0, 10.0, 30.0],
    &[0.03, 0.1, 0.3, 1.0, 3.0, 7.0, 20.0],
    &[0.03, 0.1, 0.3, 1.0, 10.0],
    &[0.02, 0.1, 0.3, 1.0, 10.0],
    &[0.01, 0.03, 0.1, 0.3, 1.0, 1.5, 3.0, 6.0, 15.0],
    &[5.0, 15.0],
    &[0.03, 0.1, 0.3, 1.0, 3.0, 3.0, 10.0],
    &[0.03, 0.1, 0.3, 1.0, 3.0, 3.0, 10.0],
    &[0.03, 0.1, 0.3, 1.0, 3.0, 10.0],
    &[0.001, 0.01, 0.03, 0.03, 0.1, 0.3, 1.0, 1.5, 10.0],
    &[0.03, 0.1, 0.3, 1.0, 1.5, 3.0, 10.0],
    &[0.03, 0.1, 0.3, 1.0, 3.0, 10.0],
    &[3.0, 10.0],
    &[4.0, 20.0],
    &[3.0, 10.0],
    &[5.0, 20.0],
    &[3.0, 20.0],
];

const PI_E: [EnvRow; 19] = [
    [1.0, 2.0, 9.0, 5.0, 15.0, 6.0, 8.0, 17.0, 32.0, 22.0, 0.5, 12.0, 32.0, 570.0],
    [1.0, 2.0, 9.0, 7.0, 15.0, 6.0, 8.0, 17.0, 28.0, 22.0, 0.5, 12.0, 32.0, 570.0],
    [1.0, 2.0, 8.0, 5.0, 14.0, 4.0, 6.0, 11.0, 20.0, 20.0, 0.5, 11.0, 29.0, 530.0],
    [1.0, 2.0, 8.0, 5.0, 14.0, 4.0, 6.0, 11.0, 20.0, 20.0, 0.5, 11.0, 29.0, 530.0],
    [1.0, 2.0, 10.0, 5.0, 16.0, 6.0, 11.0, 18.0, 30.0, 23.0, 0.5, 13.0, 34.0, 610.0],
    [1.0, 4.0, 8.0, 5.0, 14.0, 4.0, 6.0, 13.0, 20.0, 20.0, 0.5, 11.0, 29.0, 530.0],
    [1.0, 2.0, 10.0, 6.0, 16.0, 5.0, 7.0, 22.0, 28.0, 23.0, 0.5, 13.0, 34.0, 610.0],
    [1.0, 2.0, 10.0, 5.0, 16.0, 5.0, 7.0, 22.0, 28.0, 23.0, 0.5, 13.0, 34.0, 610.0],
    [1.0, 2.0, 10.0, 6.0, 16.0, 5.0, 7.0, 22.0, 28.0, 23.0, 0.5, 13.0, 34.0, 610.0],
    [1.0, 2.0, 9.0, 5.0, 15.0, 4.0, 4.0, 8.0, 12.0, 20.0, 0.4, 13.0, 34.0, 610.0],
    [1.0, 2.0, 10.0, 5.0, 17.0, 4.0, 8.0, 16.0, 35.0, 24.0, 0.5, 13.0, 34.0, 610.0],
    [1.0, 2.0, 8.0, 5.0, 14.0, 4.0, 5.0, 12.0, 20.0, 24.0, 0.4, 11.0, 29.0, 530.0],
    [1.0, 2.0, 10.0, 6.0, 16.0, 4.0, 8.0, 14.0, 30.0, 23.0, 0.5, 13.0, 34.0, 610.0],
    [1.0, 2.0, 12.0, 6.0, 17.0, 10.0, 12.0, 28.0, 35.0, 27.0, 0.5, 14.0, 38.0, 690.0],
    [1.0, 2.0, 12.0, 6.0, 17.0, 10.0, 12.0, 28.0, 35.0, 27.0, 0.5, 18.0, 38.0, 690.0],
    [1.0, 3.0, 13.0, 8.0, 24.0, 6.0, 10.0, 37.0, 70.0, 36.0, 0.4, 20.0, 52.0, 950.0],
    [1.0, 3.0, 12.0, 7.0, 18.0, 3.0, 4.0, 20.0, 30.0, 32.0, 0.5, 18.0, 46.0, 830.0],
    [1.0, 3.0, 13.0, 8.0, 24.0, 6.0, 10.0, 37.0, 70.0, 36.0, 0.5, 20.0, 52.0, 950.0],
    // Not rated for missile flight, missile launch, or cannon launch.
    [1.0, 3.0, 14.0, 8.0, 27.0, 10.0, 18.0, 70.0, 108.0, 40.0, 0.5, 0.0, 0.0, 0.0],
];

/// Series-resistance factor for solid tantalum, by ohms per volt.
const SR_BREAKPOINTS: [f64; 5] = [0.1, 0.2, 0.4, 0.6, 0.8];
const PI_SR: [f64; 6] = [0.33, 0.27, 0.2, 0.13, 0.1, 0.066];

/// Construction factor for non-solid tantalum.
const PI_C: [f64; 5] = [0.3, 1.0, 2.0, 2.5, 3.0];

/// Configuration factor for gas or vacuum capacitors: fixed, variable.
const PI_CF: [f64; 2] = [0.1, 1.0];

/// Capacitor family model.
pub struct Capacitor;

impl Capacitor {
    fn reference_temperature(part: &PartContext<'_>) -> Result<f64, ModelError> {
        let rated = part.get_or("temperature_rated_max", 125.0);
        REF_TEMP
            .iter()
            .find(|(t, _)| (t - rated).abs() < 0.5)
            .map(|(_, kelvin)| *kelvin)
            .ok_or_else(|| ModelError::data_range(part.node, "temperature_rated_max", rated as i64))
    }
}

impl HazardModel for Capacitor {
    fn name(&self) -> &'static str {
        "capacitor"
    }

    fn count_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let row = match part.subcategory {
            1 => part.lookup(&COUNT_LAMBDA_B_PAPER, "specification_id")?,
            s @ 2..=19 => COUNT_LAMBDA_B[s - 2],
            _ => return Err(part.subcategory_error()),
        };
        let lambda_b = part.env(&row);
        let pi_q = part.lookup(&COUNT_PI_Q, "quality_id")?;
        PartPrediction::evaluate(part.node, "lambdab * piQ", &[("lambdab", lambda_b), ("piQ", pi_q)])
    }

    fn stress_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let sub = part.subcategory;
        let [a, ns, h, b, g, c1, c2] = lookup(&FACTORS, sub, part.node, "subcategory_id")?;

        let v_dc = part.get_or("voltage_dc_operating", 0.0);
        let v_ac = part.get_or("voltage_ac_operating", 0.0);
        let stress = part.ratio(v_dc + v_ac, "voltage_rated");
        let t_ref = Self::reference_temperature(part)?;
        let t_amb = part.get_or("temperature_active", 30.0);

        let lambda_b = a * ((stress / ns).powf(h) + 1.0) * (b * ((t_amb + 273.0) / t_ref).powf(g)).exp();
        let capacitance = crate::attributes::require(part.attrs, part.node, "capacitance")?;
        let pi_cv = c1 * capacitance.powf(c2);
        let pi_q = part.lookup(STRESS_PI_Q[sub - 1], "quality_id")?;
        let pi_e = part.env(&PI_E[sub - 1]);

        match sub {
            12 => {
                let ohms_per_volt = crate::guard::divide_or_zero(
                    part.get_or("resistance", 0.0),
                    v_dc + v_ac,
                    part.node,
                    "voltage_operating",
                );
                let pi_sr = PI_SR[bucket(&SR_BREAKPOINTS, ohms_per_volt)];
                PartPrediction::evaluate(
                    part.node,
                    "lambdab * piCV * piSR * piQ * piE",
                    &[("lambdab", lambda_b), ("piCV", pi_cv), ("piSR", pi_sr), ("piQ", pi_q), ("piE", pi_e)],
                )
            }
            13 => {
                let pi_c = part.lookup(&PI_C, "construction_id")?;
                PartPrediction::evaluate(
                    part.node,
                    "lambdab * piCV * piC * piQ * piE",
                    &[("lambdab", lambda_b), ("piCV", pi_cv), ("piC", pi_c), ("piQ", pi_q), ("piE", pi_e)],
                )
            }
            16..=18 => PartPrediction::evaluate(
                part.node,
                "lambdab * piQ * piE",
                &[("lambdab", lambda_b), ("piQ", pi_q), ("piE", pi_e)],
            ),
            19 => {
                let pi_cf = part.lookup(&PI_CF, "configuration_id")?;
                PartPrediction::evaluate(
                    part.node,
                    "lambdab * piCF * piQ * piE",
                    &[("lambdab", lambda_b), ("piCF", pi_cf), ("piQ", pi_q), ("piE", pi_e)],
                )
            }
            _ => PartPrediction::evaluate(
                part.node,
                "lambdab * piCV * piQ * piE",
                &[("lambdab", lambda_b), ("piCV", pi_cv), ("piQ", pi_q), ("piE", pi_e)],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use crate::environment::Environment;
    use crate::prediction::test_support::{assert_physical, for_all_environments};
    use proptest::prelude::*;

    fn tantalum() -> AttributeMap {
        AttributeMap::new()
            .with("quality_id", 7.0)
            .with("voltage_rated", 50.0)
            .with("voltage_dc_operating", 20.0)
            .with("voltage_ac_operating", 5.0)
            .with("temperature_rated_max", 125.0)
            .with("temperature_active", 40.0)
            .with("capacitance", 4.7)
            .with("resistance", 10.0)
    }

    #[test]
    fn test_solid_tantalum_stress_uses_handbook_base_rate() {
        let attrs = tantalum();
        let part = PartContext::new("C1", 12, Environment::GroundFixed, &attrs);
        let r = Capacitor.stress_model(&part).unwrap();

        // MIL-HDBK-217F 10.13: λb = 0.00375·[(S/0.4)³ + 1]·exp(2.6·((T+273)/398)⁹).
        let s: f64 = 25.0 / 50.0;
        let lambda_b = 0.00375 * ((s / 0.4).powf(3.0) + 1.0) * (2.6 * (313.0_f64 / 398.0).powf(9.0)).exp();
        let base = r.factor("lambdab").unwrap();
        assert!((base - 0.014936298).abs() < 1e-8, "lambdab = {base}");
        assert!((base - lambda_b).abs() < 1e-12);
        let pi_cv = 4.7_f64.powf(0.12);
        // 10 Ω / 25 V = 0.4 Ω/V falls in the (0.2, 0.4] bucket.
        let expected = lambda_b * pi_cv * 0.2 * 1.0 * 2.0;
        assert!(
            (r.hazard_rate - expected).abs() < 1e-12,
            "hazard = {}, expected {}",
            r.hazard_rate,
            expected
        );
        assert_eq!(r.factor("piSR"), Some(0.2));
        assert_eq!(r.equation, "lambdab * piCV * piSR * piQ * piE");
    }

    #[test]
    fn test_count_paper_by_specification() {
        let attrs = AttributeMap::new().with("quality_id", 4.0).with("specification_id", 2.0);
        let part = PartContext::new("C2", 1, Environment::GroundMobile, &attrs);
        let r = Capacitor.count_model(&part).unwrap();
        assert!((r.hazard_rate - 0.042).abs() < 1e-12);
    }

    #[test]
    fn test_quality_out_of_range() {
        let attrs = AttributeMap::new().with("quality_id", 8.0);
        let part = PartContext::new("C3", 10, Environment::GroundBenign, &attrs);
        let err = Capacitor.count_model(&part).unwrap_err();
        assert_eq!(err, ModelError::data_range("C3", "quality_id", 8));
    }

    #[test]
    fn test_unknown_rated_temperature() {
        let attrs = tantalum().with("temperature_rated_max", 99.0);
        let part = PartContext::new("C4", 12, Environment::GroundBenign, &attrs);
        assert!(matches!(
            Capacitor.stress_model(&part),
            Err(ModelError::DataRange { ref field, .. }) if field == "temperature_rated_max"
        ));
    }

    #[test]
    fn test_zero_rated_voltage_uses_zero_stress() {
        let attrs = tantalum().with("voltage_rated", 0.0);
        let part = PartContext::new("C5", 10, Environment::GroundBenign, &attrs);
        let r = Capacitor.stress_model(&part).unwrap();
        assert!(r.hazard_rate > 0.0);
    }

    #[test]
    fn test_variable_capacitor_omits_cv() {
        let attrs = tantalum().with("quality_id", 1.0);
        let part = PartContext::new("C6", 17, Environment::GroundBenign, &attrs);
        let r = Capacitor.stress_model(&part).unwrap();
        assert_eq!(r.factor("piCV"), None);
    }

    proptest! {
        #[test]
        fn prop_all_subcategories_physical(sub in 1usize..=19, quality in 1usize..=2) {
            let attrs = tantalum()
                .with("quality_id", quality as f64)
                .with("specification_id", 1.0)
                .with("construction_id", 2.0)
                .with("configuration_id", 1.0);
            for_all_environments("C", sub, &attrs, |part| {
                assert_physical(&Capacitor.count_model(part).unwrap(), "count");
                assert_physical(&Capacitor.stress_model(part).unwrap(), "stress");
            });
        }
    }
}
