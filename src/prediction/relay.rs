//! Relays (MIL-HDBK-217F section 13).
//!
//! Subcategory 1 is an electromechanical relay, 2 a solid-state or hybrid
//! relay. Mechanical relays classify their contacts by rating, then
//! application, then construction; the three indices together select
//! both the parts-count row and the stress-model πF.

use super::table::lookup;
use super::{HazardModel, PartContext, PartPrediction};
use crate::error::ModelError;

type EnvRow = [f64; 14];

/// Mechanical relay quality levels: R, P, X, U, M, L, non-ER, lower.
const MECHANICAL_PI_Q: [f64; 8] = [0.10, 0.30, 0.45, 0.60, 1.0, 1.5, 3.0, 3.0];
/// Quality index of commercial (non MIL-SPEC) relays.
const NON_MIL: usize = 8;

/// Contact form: SPST, DPST, SPDT, 3PST, 4PST, DPDT, 3PDT, 4PDT, 6PDT.
const PI_C: [f64; 9] = [1.0, 1.5, 1.75, 2.0, 2.5, 3.0, 4.25, 5.5, 8.0];

/// Mechanical relay environment factor: MIL-SPEC, lower.
const MECHANICAL_PI_E: [EnvRow; 2] = [
    [1.0, 2.0, 15.0, 8.0, 27.0, 7.0, 9.0, 11.0, 12.0, 46.0, 0.5, 25.0, 66.0, 0.0],
    [2.0, 5.0, 44.0, 24.0, 78.0, 15.0, 20.0, 28.0, 38.0, 140.0, 1.0, 72.0, 200.0, 0.0],
];

const MECHANICAL_COUNT: [EnvRow; 6] = [
    [0.13, 0.28, 2.1, 1.1, 3.8, 1.1, 1.4, 1.9, 2.0, 7.0, 0.66, 3.5, 10.0, 0.0],
    [0.43, 0.89, 6.9, 3.6, 12.0, 3.4, 4.4, 6.2, 6.7, 22.0, 0.21, 11.0, 32.0, 0.0],
    [0.13, 0.26, 2.1, 1.1, 3.8, 1.1, 1.4, 1.9, 2.0, 7.0, 0.66, 3.5, 10.0, 0.0],
    [0.11, 0.23, 1.8, 0.92, 3.3, 0.96, 1.2, 2.1, 2.3, 6.5, 0.54, 3.0, 9.0, 0.0],
    [0.29, 0.6, 4.8, 2.4, 8.2, 2.3, 2.9, 4.1, 4.5, 15.0, 0.14, 7.6, 22.0, 0.0],
    [0.88, 1.8, 14.0, 7.4, 26.0, 7.1, 9.1, 13.0, 14.0, 46.0, 0.44, 24.0, 67.0, 0.0],
];

/// Application and construction factor as `(MIL-SPEC, lower)`, indexed by
/// contact rating, then application, then construction.
const PI_F: [&[&[(f64, f64)]]; 4] = [
    // Signal current.
    &[&[(4.0, 8.0), (6.0, 18.0), (1.0, 3.0), (4.0, 8.0), (7.0, 14.0), (7.0, 4.0)]],
    // 0 to 5 A.
    &[
        &[(3.0, 6.0), (5.0, 10.0), (6.0, 12.0)],
        &[(5.0, 10.0), (5.0, 10.0), (2.0, 6.0), (6.0, 12.0), (100.0, 100.0), (10.0, 20.0)],
        &[(10.0, 20.0), (100.0, 100.0)],
        &[(6.0, 12.0), (1.0, 3.0)],
        &[(25.0, 0.0), (25.0, 0.0), (6.0, 0.0)],
        &[(10.0, 20.0)],
        &[(9.0, 12.0)],
        &[(10.0, 20.0), (5.0, 10.0), (5.0, 10.0)],
    ],
    // 5 to 20 A.
    &[
        &[(20.0, 40.0), (5.0, 10.0)],
        &[(3.0, 6.0), (3.0, 6.0), (1.0, 3.0), (2.0, 6.0), (3.0, 6.0), (2.0, 6.0), (2.0, 6.0)],
    ],
    // Contactors, high current.
    &[&[(7.0, 14.0), (12.0, 24.0), (10.0, 20.0), (5.0, 10.0)]],
];

/// Solid-state, solid-state time delay, hybrid.
const SOLID_STATE_LAMBDA_B: [f64; 3] = [0.4, 0.5, 0.5];
const SOLID_STATE_PI_Q: [f64; 2] = [1.0, 4.0];
const SOLID_STATE_PI_E: EnvRow = [1.0, 3.0, 12.0, 6.0, 17.0, 12.0, 19.0, 21.0, 32.0, 23.0, 0.4, 12.0, 33.0, 590.0];
const SOLID_STATE_COUNT: [EnvRow; 2] = [
    [0.4, 1.2, 4.8, 2.4, 6.8, 4.8, 7.6, 8.4, 13.0, 9.2, 0.16, 4.8, 13.0, 240.0],
    [0.5, 1.5, 6.0, 3.0, 8.5, 5.0, 9.5, 11.0, 16.0, 12.0, 0.2, 5.0, 17.0, 300.0],
];

/// Electromechanical relay.
pub struct Mechanical;

impl Mechanical {
    /// A positive `quality_override` replaces the tabulated πQ.
    fn quality_factor(part: &PartContext<'_>) -> Result<f64, ModelError> {
        match part.attrs.get("quality_override") {
            Some(q) if q > 0.0 => Ok(q),
            _ => part.lookup(&MECHANICAL_PI_Q, "quality_id"),
        }
    }

    fn count_row(rating: usize, application: usize, construction: usize) -> usize {
        match (rating, application, construction) {
            (1, _, 2) => 3,
            (2, 2, 4) => 2,
            (2, 2, 5) => 5,
            (2, 3, 2) => 5,
            (2, 4, _) => 3,
            (2, 5, 3) => 3,
            (2, 6, _) => 4,
            (2, 8, 2 | 3) => 2,
            (4, _, 2) => 2,
            _ => 0,
        }
    }

    fn cycling_factor(cycles: f64, mil_spec: bool) -> f64 {
        if mil_spec {
            (cycles / 10.0).max(0.1)
        } else if cycles >= 1000.0 {
            (cycles / 100.0).powi(2)
        } else if cycles >= 10.0 {
            cycles / 10.0
        } else {
            1.0
        }
    }

    fn load_factor(stress: f64, load: usize) -> f64 {
        let k = match load {
            1 => 0.8,
            2 => 0.4,
            _ => 0.2,
        };
        (stress / k).powi(2).exp()
    }

    fn application_factor(rating: usize, application: usize, construction: usize, mil_spec: bool) -> f64 {
        rating
            .checked_sub(1)
            .and_then(|r| PI_F.get(r))
            .and_then(|apps| application.checked_sub(1).and_then(|a| apps.get(a)))
            .and_then(|cons| construction.checked_sub(1).and_then(|c| cons.get(c)))
            .map(|&(mil, lower)| if mil_spec { mil } else { lower })
            .unwrap_or(1.0)
    }
}

impl HazardModel for Mechanical {
    fn name(&self) -> &'static str {
        "mechanical relay"
    }

    fn count_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let row = Self::count_row(
            part.index_or("contact_rating_id", 0)?,
            part.index_or("application_id", 0)?,
            part.index_or("construction_id", 0)?,
        );
        let pi_q = Self::quality_factor(part)?;
        PartPrediction::evaluate(
            part.node,
            "lambdab * piQ",
            &[("lambdab", part.env(&MECHANICAL_COUNT[row])), ("piQ", pi_q)],
        )
    }

    fn stress_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let (t_ref, k1, k2) = match part.index_or("insulation_id", 1)? {
            2 => (377.0, 0.0054, 10.4),
            _ => (352.0, 0.00555, 15.7),
        };
        let t_amb = part.get_or("temperature_active", 30.0);
        let lambda_b = k1 * ((t_amb + 273.0) / t_ref).powf(k2).exp();

        let stress = part.ratio(part.get_or("current_operating", 0.0), "current_rated");
        let pi_l = Self::load_factor(stress, part.index_or("technology_id", 0)?);
        let pi_c = part.lookup(&PI_C, "contact_form_id")?;

        let mil_spec = part.index("quality_id")? != NON_MIL;
        let pi_cyc = Self::cycling_factor(part.get_or("n_cycles", 0.0), mil_spec);
        let pi_f = Self::application_factor(
            part.index_or("contact_rating_id", 0)?,
            part.index_or("application_id", 0)?,
            part.index_or("construction_id", 0)?,
            mil_spec,
        );
        let pi_q = Self::quality_factor(part)?;
        let pi_e = part.env(&MECHANICAL_PI_E[usize::from(!mil_spec)]);

        PartPrediction::evaluate(
            part.node,
            "lambdab * piL * piC * piCYC * piF * piQ * piE",
            &[
                ("lambdab", lambda_b),
                ("piL", pi_l),
                ("piC", pi_c),
                ("piCYC", pi_cyc),
                ("piF", pi_f),
                ("piQ", pi_q),
                ("piE", pi_e),
            ],
        )
    }
}

/// Solid-state and hybrid relay.
pub struct SolidState;

impl HazardModel for SolidState {
    fn name(&self) -> &'static str {
        "solid-state relay"
    }

    fn count_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let row = match part.index("type_id")? {
            1 | 2 => SOLID_STATE_COUNT[0],
            3 => SOLID_STATE_COUNT[1],
            other => return Err(ModelError::data_range(part.node, "type_id", other as i64)),
        };
        let pi_q = part.lookup(&SOLID_STATE_PI_Q, "quality_id")?;
        PartPrediction::evaluate(part.node, "lambdab * piQ", &[("lambdab", part.env(&row)), ("piQ", pi_q)])
    }

    fn stress_model(&self, part: &PartContext<'_>) -> Result<PartPrediction, ModelError> {
        let lambda_b = lookup(&SOLID_STATE_LAMBDA_B, part.index("type_id")?, part.node, "type_id")?;
        let pi_q = part.lookup(&SOLID_STATE_PI_Q, "quality_id")?;
        PartPrediction::evaluate(
            part.node,
            "lambdab * piQ * piE",
            &[("lambdab", lambda_b), ("piQ", pi_q), ("piE", part.env(&SOLID_STATE_PI_E))],
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

    fn general_purpose() -> AttributeMap {
        AttributeMap::new()
            .with("quality_id", 5.0)
            .with("insulation_id", 1.0)
            .with("temperature_active", 40.0)
            .with("technology_id", 1.0)
            .with("current_operating", 1.0)
            .with("current_rated", 5.0)
            .with("contact_form_id", 3.0)
            .with("contact_rating_id", 2.0)
            .with("application_id", 1.0)
            .with("construction_id", 2.0)
            .with("n_cycles", 20.0)
    }

    #[test]
    fn test_mechanical_stress() {
        let attrs = general_purpose();
        let part = PartContext::new("K1", 1, Environment::GroundFixed, &attrs);
        let r = Mechanical.stress_model(&part).unwrap();

        let lambda_b = 0.00555 * (313.0_f64 / 352.0).powf(15.7).exp();
        let pi_l = (0.2_f64 / 0.8).powi(2).exp();
        let expected = lambda_b * pi_l * 1.75 * 2.0 * 5.0 * 1.0 * 2.0;
        assert!(
            (r.hazard_rate - expected).abs() < 1e-12,
            "hazard = {}, expected {}",
            r.hazard_rate,
            expected
        );
    }

    #[test]
    fn test_commercial_relay_uses_lower_tables() {
        let attrs = general_purpose().with("quality_id", 8.0).with("n_cycles", 2000.0);
        let part = PartContext::new("K2", 1, Environment::GroundFixed, &attrs);
        let r = Mechanical.stress_model(&part).unwrap();
        assert_eq!(r.factor("piCYC"), Some(400.0));
        assert_eq!(r.factor("piF"), Some(10.0));
        assert_eq!(r.factor("piE"), Some(5.0));
    }

    #[test]
    fn test_mil_cycling_floor() {
        assert_eq!(Mechanical::cycling_factor(0.5, true), 0.1);
        assert_eq!(Mechanical::cycling_factor(5.0, false), 1.0);
        assert_eq!(Mechanical::cycling_factor(100.0, false), 10.0);
    }

    #[test]
    fn test_unlisted_construction_has_unit_pi_f() {
        assert_eq!(Mechanical::application_factor(2, 6, 3, true), 1.0);
        assert_eq!(Mechanical::application_factor(5, 1, 1, true), 1.0);
        assert_eq!(Mechanical::application_factor(3, 2, 7, false), 6.0);
    }

    #[test]
    fn test_count_row_selection() {
        let attrs = general_purpose()
            .with("application_id", 2.0)
            .with("construction_id", 5.0);
        let part = PartContext::new("K3", 1, Environment::GroundBenign, &attrs);
        let r = Mechanical.count_model(&part).unwrap();
        assert!((r.hazard_rate - 0.88).abs() < 1e-12);
    }

    #[test]
    fn test_quality_override() {
        let attrs = general_purpose().with("quality_override", 2.5);
        let part = PartContext::new("K4", 1, Environment::GroundBenign, &attrs);
        assert_eq!(Mechanical.count_model(&part).unwrap().factor("piQ"), Some(2.5));
    }

    #[test]
    fn test_solid_state() {
        let attrs = AttributeMap::new().with("type_id", 3.0).with("quality_id", 2.0);
        let part = PartContext::new("K5", 2, Environment::NavalSheltered, &attrs);
        let stress = SolidState.stress_model(&part).unwrap();
        assert!((stress.hazard_rate - 0.5 * 4.0 * 6.0).abs() < 1e-12);
        let count = SolidState.count_model(&part).unwrap();
        assert!((count.hazard_rate - 3.0 * 4.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_relays_physical(
            quality in 1usize..=8,
            rating in 1usize..=4,
            application in 1usize..=8,
            construction in 1usize..=7,
            form in 1usize..=9,
            cycles in 0.0f64..5000.0,
        ) {
            let attrs = general_purpose()
                .with("quality_id", quality as f64)
                .with("contact_rating_id", rating as f64)
                .with("application_id", application as f64)
                .with("construction_id", construction as f64)
                .with("contact_form_id", form as f64)
                .with("n_cycles", cycles)
                .with("type_id", 1.0);
            for_all_environments("K", 1, &attrs, |part| {
                assert_physical(&Mechanical.count_model(part).unwrap(), "count");
                assert_physical(&Mechanical.stress_model(part).unwrap(), "stress");
            });
            let solid = AttributeMap::new().with("type_id", 2.0).with("quality_id", 1.0);
            for_all_environments("K", 2, &solid, |part| {
                assert_physical(&SolidState.count_model(part).unwrap(), "count");
                assert_physical(&SolidState.stress_model(part).unwrap(), "stress");
            });
        }
    }
}
