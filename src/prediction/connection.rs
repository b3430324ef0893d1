//! Connections (MIL-HDBK-217F sections 15 to 17).
//!
//! Subcategory 1 is a multi-pin connector, 2 a plated-through-hole
//! assembly, and 3 a single connection termination (solder, crimp, weld
//! and the like).

use super::table::bucket;
use super::{HazardModel, PartContext, PartPrediction};
use crate::error::ModelError;

type EnvRow = [f64; 14];

/// Wire gauge (AWG) to contact temperature-rise coefficient.
const GAUGE_K: [(f64, f64); 4] = [(22.0, 0.989), (20.0, 0.640), (16.0, 0.274), (12.0, 0.100)];

/// Insert-material temperature groups, as `(A, B, Tref, G)` in
/// `λb = A·exp(-B/(To+273) + ((To+273)/Tref)^G)`.
const INSERT_GROUPS: [(f64, f64, f64, f64); 4] = [
    (0.020, 1592.0, 473.0, 5.36),
    (0.431, 2073.6, 423.0, 4.66),
    (0.190, 1298.0, 373.0, 4.25),
    (0.770, 1528.8, 358.0, 4.72),
];

/// Mate/unmate cycles per 1000 hours.
const CYCLE_BREAKPOINTS: [f64; 4] = [0.05, 0.5, 5.0, 50.0];
const PI_K: [f64; 5] = [1.0, 1.5, 2.0, 3.0, 4.0];

/// Multipin environment factor: MIL-SPEC, lower quality.
const MULTIPIN_PI_E: [EnvRow; 2] = [
    [1.0, 1.0, 8.0, 5.0, 13.0, 3.0, 5.0, 8.0, 12.0, 19.0, 0.5, 10.0, 27.0, 490.0],
    [2.0, 5.0, 21.0, 10.0, 27.0, 12.0, 18.0, 17.0, 25.0, 37.0, 0.8, 20.0, 54.0, 970.0],
];

/// Multipin parts-count λb by configuration: rack and panel, circular,
/// power, coaxial, triaxial.
const MULTIPIN_COUNT: [EnvRow; 5] = [
    [0.011, 0.14, 0.11, 0.069, 0.20, 0.058, 0.098, 0.23, 0.34, 0.37, 0.0054, 0.16, 0.42, 6.8],
    [0.011, 0.14, 0.11, 0.069, 0.20, 0.058, 0.098, 0.23, 0.34, 0.37, 0.0054, 0.16, 0.42, 6.8],
    [0.011, 0.14, 0.11, 0.069, 0.20, 0.058, 0.098, 0.23, 0.34, 0.37, 0.0054, 0.16, 0.42, 6.8],
    [0.012, 0.015, 0.13, 0.075, 0.21, 0.050, 0.10, 0.22, 0.32, 0.38, 0.0061, 0.16, 0.54, 7.3],
    [0.012, 0.015, 0.13, 0.075, 0.21, 0.050, 0.10, 0.22, 0.32, 0.38, 0.0061, 0.16, 0.54, 7.3],
];

/// MIL-SPEC, lower.
const PI_Q: [f64; 2] = [1.0, 2.0];

/// Printed wiring with PTHs, discrete wiring with electroless PTHs.
const PTH_LAMBDA_B: [f64; 2] = [0.00041, 0.00026];
const PTH_PI_E: EnvRow = [1.0, 2.0, 7.0, 5.0, 13.0, 5.0, 8.0, 16.0, 28.0, 19.0, 0.5, 10.0, 27.0, 500.0];
const PTH_COUNT: EnvRow = [0.053, 0.11, 0.37, 0.69, 0.27, 0.27, 0.43, 0.85, 1.5, 1.0, 0.027, 0.53, 1.4, 27.0];

/// Termination types: clip, crimp, hand solder, reflow solder, weld,
/// hand solder wrapped.
const TERMINATION_LAMBDA_B: [f64; 6] = [0.00012, 0.00026, 0.0026, 0.000069, 0.00005, 0.00014];
const TERMINATION_PI_E: EnvRow = [1.0, 2.0, 7.0, 4.0, 11.0, 4.0, 6.0, 6.0, 8.0, 16.0, 0.5, 9.0, 24.0, 420.0];
/// Crimp quality: automated tool, MIL-approved hand tool, unapproved tool,
/// unknown.
const CRIMP_PI_Q: [f64; 4] = [1.0, 1.0, 2.0, 20.0];
const TERMINATION_COUNT: [EnvRow; 6] = [
    [0.00012, 0.00024, 0.00084, 0.00048, 0.0013, 0.00048, 0.00072, 0.00072, 0.00096, 0.0019, 0.00005, 0.0011, 0.0029, 0.050],
    [0.00026, 0.00052, 0.0018, 0.001, 0.0029, 0.001, 0.0016, 0.0016, 0.0021, 0.0042, 0.00013, 0.0023, 0.0062, 0.11],
    [0.0026, 0.0052, 0.018, 0.01, 0.029, 0.01, 0.016, 0.016, 0.021, 0.042, 0.0013, 0.023, 0.062, 1.1],
    [0.000069, 0.000138, 0.000483, 0.000276, 0.000759, 0.000276, 0.000414, 0.000414, 0.000552, 0.001104, 0.000035, 0.000621, 0.001656, 0.02898],
    [0.00005, 0.0001, 0.00035, 0.0002, 0.00055, 0.0002, 0.0003, 0.0003, 0.0004, 0.0008, 0.000025, 0.00045, 0.0012, 0.021],
    [0.00014, 0.00028, 0.00096, 0.00056, 0.0015, 0.00056, 0.00084, 0.00084, 0.0011, 0.0022, 0.00007, 0.0013, 0.0034, 0.059],
];

/// Contact temperature rise (°C) at `amps` per contact of the given gauge.
pub fn insert_temperature_rise(gauge: f64, amps: f64) -> Option<f64> {
    GAUGE_K
        .iter()
        .find(|(awg, _)| (awg - gauge).abs() < 0.5)
        .map(|(_, k)| k * amps.max(0.0).powf(1.85))
}

/// Multi-pin connector.
pub struct Multipin;

impl Multipin {
    fn insert_group(part: &PartContext<'_>) -> Result<(f64, f64, f64, f64), ModelError> {
        let insert = part.index("insert_id")?;
        let group = match insert {
            1..=3 => 0,
            4..=9 => 1,
            10..=11 => 2,
            12..=14 => 3,
            other => return Err(ModelError::data_range(part.node, "insert_id", other as i64)),
        };
        Ok(INSERT_GROUPS[group])
    }
}

impl HazardModel for Multipin {
    fn name(&self) -> &'static str {
        "multi-pin connection"
    }

    fn count_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let row = part.lookup(&MULTIPIN_COUNT, "configuration_id")?;
        let pi_q = part.lookup(&PI_Q, "quality_id")?;
        PartPrediction::evaluate(
            part.node,
            "lambdab * piQ",
            &[("lambdab", part.env(&row)), ("piQ", pi_q)],
        )
    }

    fn stress_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let gauge = part.get_or("contact_gauge", 0.0);
        let amps = part.get_or("current_operating", 0.0);
        let rise = insert_temperature_rise(gauge, amps)
            .ok_or_else(|| ModelError::data_range(part.node, "contact_gauge", gauge as i64))?;
        let t_insert = part.get_or("temperature_active", 30.0) + rise + 273.0;

        let (a, b, t_ref, g) = Self::insert_group(part)?;
        let lambda_b = a * (-b / t_insert + (t_insert / t_ref).powf(g)).exp();

        let pi_k = PI_K[bucket(&CYCLE_BREAKPOINTS, part.get_or("n_cycles", 0.0))];
        let pins = part.get_or("n_active_pins", 1.0);
        let pi_p = if pins >= 2.0 {
            ((pins - 1.0) / 10.0).powf(0.51064).exp()
        } else {
            1.0
        };
        let pi_e = part.env(&part.lookup(&MULTIPIN_PI_E, "quality_id")?);

        PartPrediction::evaluate(
            part.node,
            "lambdab * piK * piP * piE",
            &[("lambdab", lambda_b), ("piK", pi_k), ("piP", pi_p), ("piE", pi_e)],
        )
    }
}

/// Plated-through-hole interconnection assembly.
pub struct PlatedThroughHole;

impl HazardModel for PlatedThroughHole {
    fn name(&self) -> &'static str {
        "plated-through-hole connection"
    }

    fn count_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let pi_q = part.lookup(&PI_Q, "quality_id")?;
        PartPrediction::evaluate(
            part.node,
            "lambdab * piQ",
            &[("lambdab", part.env(&PTH_COUNT)), ("piQ", pi_q)],
        )
    }

    fn stress_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let technology = part.index_or("technology_id", 1)?;
        let lambda_b = super::table::lookup(&PTH_LAMBDA_B, technology, part.node, "technology_id")?;
        let planes = part.get_or("n_circuit_planes", 1.0);
        let pi_c = if technology == 1 && planes > 2.0 {
            0.65 * planes.powf(0.63)
        } else {
            1.0
        };
        let pi_q = part.lookup(&PI_Q, "quality_id")?;

        PartPrediction::evaluate(
            part.node,
            "lambdab * (N1 * piC + N2 * (piC + 13.0)) * piQ * piE",
            &[
                ("lambdab", lambda_b),
                ("N1", part.get_or("n_wave_soldered", 0.0).max(0.0)),
                ("N2", part.get_or("n_hand_soldered", 0.0).max(0.0)),
                ("piC", pi_c),
                ("piQ", pi_q),
                ("piE", part.env(&PTH_PI_E)),
            ],
        )
    }
}

/// Single connection termination.
pub struct Termination;

impl HazardModel for Termination {
    fn name(&self) -> &'static str {
        "connection termination"
    }

    fn count_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let row = part.lookup(&TERMINATION_COUNT, "type_id")?;
        PartPrediction::evaluate(part.node, "lambdab", &[("lambdab", part.env(&row))])
    }

    fn stress_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let lambda_b = part.lookup(&TERMINATION_LAMBDA_B, "type_id")?;
        // Only crimped terminations carry a quality grade.
        let pi_q = match part.index("type_id")? {
            2 => part.lookup(&CRIMP_PI_Q, "quality_id")?,
            _ => 1.0,
        };
        PartPrediction::evaluate(
            part.node,
            "lambdab * piQ * piE",
            &[("lambdab", lambda_b), ("piQ", pi_q), ("piE", part.env(&TERMINATION_PI_E))],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use crate::environment::Environment;
    use crate::prediction::test_support::{assert_physical, for_all_environments};
    use proptest::prelude::*;

    fn multipin() -> AttributeMap {
        AttributeMap::new()
            .with("quality_id", 2.0)
            .with("configuration_id", 1.0)
            .with("insert_id", 1.0)
            .with("contact_gauge", 20.0)
            .with("current_operating", 2.0)
            .with("n_cycles", 2.0)
            .with("n_active_pins", 20.0)
            .with("temperature_active", 32.0)
    }

    #[test]
    fn test_insert_temperature_rise() {
        let rise = insert_temperature_rise(20.0, 2.65).unwrap();
        assert!((rise - 3.883156).abs() < 1e-5, "rise = {rise}");
        assert!(insert_temperature_rise(18.0, 1.0).is_none());
    }

    #[test]
    fn test_multipin_stress() {
        let attrs = multipin();
        let part = PartContext::new("J1", 1, Environment::GroundMobile, &attrs);
        let r = Multipin.stress_model(&part).unwrap();

        let t = 32.0 + 0.64 * 2.0_f64.powf(1.85) + 273.0;
        let lambda_b = 0.020 * (-1592.0 / t + (t / 473.0).powf(5.36)).exp();
        let pi_p = (1.9_f64).powf(0.51064).exp();
        assert!((pi_p - 4.0062301).abs() < 1e-6);
        assert_eq!(r.factor("piK"), Some(2.0));
        assert_eq!(r.factor("piE"), Some(21.0));
        let expected = lambda_b * 2.0 * pi_p * 21.0;
        assert!(
            (r.hazard_rate - expected).abs() < 1e-12,
            "hazard = {}, expected {}",
            r.hazard_rate,
            expected
        );
    }

    #[test]
    fn test_multipin_single_pin() {
        let attrs = multipin().with("n_active_pins", 1.0);
        let part = PartContext::new("J2", 1, Environment::GroundBenign, &attrs);
        assert_eq!(Multipin.stress_model(&part).unwrap().factor("piP"), Some(1.0));
    }

    #[test]
    fn test_multipin_unknown_insert() {
        let attrs = multipin().with("insert_id", 15.0);
        let part = PartContext::new("J3", 1, Environment::GroundBenign, &attrs);
        assert_eq!(
            Multipin.stress_model(&part).unwrap_err(),
            ModelError::data_range("J3", "insert_id", 15)
        );
    }

    #[test]
    fn test_pth_stress() {
        let attrs = AttributeMap::new()
            .with("quality_id", 1.0)
            .with("technology_id", 1.0)
            .with("n_circuit_planes", 4.0)
            .with("n_wave_soldered", 100.0)
            .with("n_hand_soldered", 2.0);
        let part = PartContext::new("PWA1", 2, Environment::GroundFixed, &attrs);
        let r = PlatedThroughHole.stress_model(&part).unwrap();
        let pi_c = 0.65 * 4.0_f64.powf(0.63);
        let expected = 0.00041 * (100.0 * pi_c + 2.0 * (pi_c + 13.0)) * 2.0;
        assert!((r.hazard_rate - expected).abs() < 1e-12);
    }

    #[test]
    fn test_pth_count_airborne_fighter() {
        let attrs = AttributeMap::new().with("quality_id", 2.0);
        let part = PartContext::new("PWA2", 2, Environment::AirborneInhabitedFighter, &attrs);
        let r = PlatedThroughHole.count_model(&part).unwrap();
        assert!((r.hazard_rate - 0.43 * 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_termination_crimp_quality() {
        let attrs = AttributeMap::new().with("type_id", 2.0).with("quality_id", 4.0);
        let part = PartContext::new("T1", 3, Environment::GroundBenign, &attrs);
        let r = Termination.stress_model(&part).unwrap();
        assert!((r.hazard_rate - 0.00026 * 20.0).abs() < 1e-12);

        let weld = AttributeMap::new().with("type_id", 5.0).with("quality_id", 4.0);
        let part = PartContext::new("T2", 3, Environment::GroundBenign, &weld);
        assert_eq!(Termination.stress_model(&part).unwrap().factor("piQ"), Some(1.0));
    }

    proptest! {
        #[test]
        fn prop_connections_physical(
            insert in 1usize..=14,
            config in 1usize..=5,
            kind in 1usize..=6,
            quality in 1usize..=2,
            amps in 0.0f64..10.0,
        ) {
            let attrs = multipin()
                .with("insert_id", insert as f64)
                .with("configuration_id", config as f64)
                .with("quality_id", quality as f64)
                .with("current_operating", amps)
                .with("type_id", kind as f64)
                .with("technology_id", quality as f64)
                .with("n_wave_soldered", 10.0);
            let models: [(usize, &dyn HazardModel); 3] =
                [(1, &Multipin), (2, &PlatedThroughHole), (3, &Termination)];
            for (sub, model) in models {
                for_all_environments("J", sub, &attrs, |part| {
                    assert_physical(&model.count_model(part).unwrap(), "count");
                    assert_physical(&model.stress_model(part).unwrap(), "stress");
                });
            }
        }
    }
}
