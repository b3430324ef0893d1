//! Active-to-dormant hazard-rate conversion.
//!
//! The dormant rate is the active rate scaled by a factor chosen by part
//! class and by the (active, dormant) environment transition.

use crate::environment::{DormantEnvironment, Environment, EnvironmentFamily};
use crate::prediction::PartCategory;

/// Part class rows of the conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DormantClass {
    IntegratedCircuit = 0,
    Diode = 1,
    Transistor = 2,
    Capacitor = 3,
    Resistor = 4,
    Switch = 5,
    Relay = 6,
    Connector = 7,
    CircuitBoard = 8,
    Transformer = 9,
}

impl DormantClass {
    /// Class of a part, `None` when the table has no row for it.
    pub fn of(category: PartCategory, subcategory: usize) -> Option<Self> {
        match category {
            PartCategory::Capacitor => Some(Self::Capacitor),
            PartCategory::Connection => Some(Self::Connector),
            PartCategory::Inductor => Some(Self::Transformer),
            PartCategory::IntegratedCircuit => Some(Self::IntegratedCircuit),
            PartCategory::Relay => Some(Self::Relay),
            PartCategory::Resistor => Some(Self::Resistor),
            PartCategory::Switch => Some(Self::Switch),
            PartCategory::Semiconductor => match subcategory {
                1 | 2 | 10..=13 => Some(Self::Diode),
                3..=9 => Some(Self::Transistor),
                _ => None,
            },
            PartCategory::Meter | PartCategory::Miscellaneous => None,
        }
    }
}

/// Conversion factors by class. Columns are the (active → dormant)
/// transitions ground→ground, airborne→airborne, airborne→ground,
/// naval→naval, naval→ground, space→space, space→ground and anything else.
const FACTORS: [[f64; 8]; 10] = [
    [0.08, 0.06, 0.04, 0.06, 0.05, 0.10, 0.30, 0.0],
    [0.04, 0.05, 0.01, 0.04, 0.03, 0.20, 0.80, 0.0],
    [0.05, 0.06, 0.02, 0.05, 0.03, 0.20, 1.00, 0.0],
    [0.10, 0.10, 0.03, 0.10, 0.04, 0.20, 0.40, 0.0],
    [0.20, 0.06, 0.03, 0.10, 0.06, 0.50, 1.00, 0.0],
    [0.40, 0.20, 0.10, 0.40, 0.20, 0.80, 1.00, 0.0],
    [0.20, 0.20, 0.04, 0.30, 0.08, 0.40, 0.90, 0.0],
    [0.005, 0.005, 0.003, 0.008, 0.003, 0.02, 0.03, 0.0],
    [0.04, 0.02, 0.01, 0.03, 0.01, 0.08, 0.20, 0.0],
    [0.20, 0.20, 0.20, 0.30, 0.30, 0.50, 1.00, 0.0],
];

fn column(active: Environment, dormant: DormantEnvironment) -> usize {
    use DormantEnvironment as D;
    match (active.family(), dormant) {
        (EnvironmentFamily::Ground, D::Ground) => 0,
        (EnvironmentFamily::Airborne, D::Airborne) => 1,
        (EnvironmentFamily::Airborne, D::Ground) => 2,
        (EnvironmentFamily::Naval, D::Naval) => 3,
        (EnvironmentFamily::Naval, D::Ground) => 4,
        (EnvironmentFamily::Space, D::Space) => 5,
        (EnvironmentFamily::Space, D::Ground) => 6,
        _ => 7,
    }
}

/// Dormant-to-active ratio for a class and environment transition.
pub fn dormant_factor(class: DormantClass, active: Environment, dormant: DormantEnvironment) -> f64 {
    FACTORS[class as usize][column(active, dormant)]
}

/// Dormant hazard rate of a part with active rate `active_hazard`.
///
/// Returns 0.0 when the part has no dormant class or the transition is
/// not tabulated.
///
/// # Examples
///
/// ```
/// use u_reliability::derating::dormant_hazard_rate;
/// use u_reliability::environment::{DormantEnvironment, Environment};
/// use u_reliability::prediction::PartCategory;
///
/// let rate = dormant_hazard_rate(
///     PartCategory::Resistor,
///     1,
///     Environment::GroundFixed,
///     DormantEnvironment::Ground,
///     0.5,
/// );
/// assert!((rate - 0.1).abs() < 1e-12);
/// ```
pub fn dormant_hazard_rate(
    category: PartCategory,
    subcategory: usize,
    active: Environment,
    dormant: DormantEnvironment,
    active_hazard: f64,
) -> f64 {
    match DormantClass::of(category, subcategory) {
        Some(class) => dormant_factor(class, active, dormant) * active_hazard,
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DORMANT: [DormantEnvironment; 4] = [
        DormantEnvironment::Ground,
        DormantEnvironment::Naval,
        DormantEnvironment::Airborne,
        DormantEnvironment::Space,
    ];

    #[test]
    fn test_airborne_ic_stored_on_ground() {
        let rate = dormant_hazard_rate(
            PartCategory::IntegratedCircuit,
            2,
            Environment::AirborneInhabitedCargo,
            DormantEnvironment::Ground,
            1.0,
        );
        assert!((rate - 0.04).abs() < 1e-12, "rate = {}", rate);
    }

    #[test]
    fn test_transistor_and_diode_rows() {
        let transistor = dormant_hazard_rate(
            PartCategory::Semiconductor,
            3,
            Environment::SpaceFlight,
            DormantEnvironment::Space,
            2.0,
        );
        assert!((transistor - 0.4).abs() < 1e-12);
        let thyristor = dormant_hazard_rate(
            PartCategory::Semiconductor,
            10,
            Environment::NavalSheltered,
            DormantEnvironment::Naval,
            1.0,
        );
        assert!((thyristor - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_every_inductor_is_a_transformer() {
        for sub in 1..=4 {
            assert_eq!(
                DormantClass::of(PartCategory::Inductor, sub),
                Some(DormantClass::Transformer)
            );
        }
    }

    #[test]
    fn test_untabulated_cases_are_zero() {
        assert_eq!(
            dormant_hazard_rate(
                PartCategory::Meter,
                1,
                Environment::GroundBenign,
                DormantEnvironment::Ground,
                3.0
            ),
            0.0
        );
        assert_eq!(
            dormant_hazard_rate(
                PartCategory::Semiconductor,
                14,
                Environment::GroundBenign,
                DormantEnvironment::Ground,
                3.0
            ),
            0.0
        );
        assert_eq!(
            dormant_hazard_rate(
                PartCategory::Capacitor,
                1,
                Environment::MissileFlight,
                DormantEnvironment::Ground,
                3.0
            ),
            0.0
        );
        assert_eq!(
            dormant_hazard_rate(
                PartCategory::Capacitor,
                1,
                Environment::GroundMobile,
                DormantEnvironment::Airborne,
                3.0
            ),
            0.0
        );
    }

    proptest! {
        #[test]
        fn prop_factor_is_a_fraction(class in 0usize..10, env in 1usize..=14, dormant in 0usize..4) {
            let active = Environment::from_index(env).unwrap();
            let f = FACTORS[class][column(active, DORMANT[dormant])];
            prop_assert!((0.0..=1.0).contains(&f), "factor {}", f);
        }

        #[test]
        fn prop_dormant_never_exceeds_active(sub in 1usize..=19, env in 1usize..=14, rate in 0.0f64..100.0) {
            let active = Environment::from_index(env).unwrap();
            for cat in 1..=10 {
                let category = PartCategory::from_index(cat).unwrap();
                for dormant in DORMANT {
                    let d = dormant_hazard_rate(category, sub, active, dormant, rate);
                    prop_assert!(d >= 0.0 && d <= rate + 1e-12);
                }
            }
        }
    }
}
