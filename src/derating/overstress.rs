//! Derating-rule overstress check.
//!
//! Each category compares operating-to-rated ratios and temperature
//! margins against limits that depend on whether the active environment
//! is benign (GB, GF, NS, SF) or harsh. Every violated rule is reported;
//! the check never stops at the first one.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::guard::divide_or;
use crate::prediction::{inductor, integrated_circuit, semiconductor, PartCategory, PartContext};

/// Outcome of a derating check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overstress {
    pub overstressed: bool,
    /// Numbered reasons, e.g. `"1. Operating voltage > 60% rated voltage."`.
    pub reasons: Vec<String>,
}

impl Overstress {
    fn flag(&mut self, reason: impl AsRef<str>) {
        self.overstressed = true;
        self.reasons
            .push(format!("{}. {}", self.reasons.len() + 1, reason.as_ref()));
    }

    /// All reasons, one per line.
    pub fn reason_text(&self) -> String {
        self.reasons.iter().map(|r| format!("{r}\n")).collect()
    }
}

/// Operating-to-rated ratio, `None` when no rating is recorded.
fn ratio(part: &PartContext<'_>, operating: f64, rated_field: &str) -> Option<f64> {
    let rated = part.get_or(rated_field, 0.0);
    let s = divide_or(operating, rated, f64::NAN, part.node, rated_field);
    (rated > 0.0 && !s.is_nan()).then_some(s)
}

fn voltage(part: &PartContext<'_>) -> f64 {
    part.get_or("voltage_dc_operating", 0.0) + part.get_or("voltage_ac_operating", 0.0)
}

fn voltage_ratio(part: &PartContext<'_>) -> Option<f64> {
    ratio(part, voltage(part), "voltage_rated")
}

fn current_ratio(part: &PartContext<'_>) -> Option<f64> {
    ratio(part, part.get_or("current_operating", 0.0), "current_rated")
}

fn power_ratio(part: &PartContext<'_>) -> Option<f64> {
    ratio(part, part.get_or("power_operating", 0.0), "power_rated")
}

fn rated_max_temperature(part: &PartContext<'_>) -> Option<f64> {
    match part.get_or("temperature_rated_max", 0.0) {
        t if t > 0.0 => Some(t),
        _ => None,
    }
}

fn percent(limit: f64) -> String {
    format!("{}%", (limit * 100.0).round())
}

fn check_voltage(out: &mut Overstress, s: Option<f64>, limit: f64) {
    if s.is_some_and(|s| s > limit) {
        out.flag(format!("Operating voltage > {} rated voltage.", percent(limit)));
    }
}

fn check_current(out: &mut Overstress, s: Option<f64>, limit: f64) {
    if s.is_some_and(|s| s > limit) {
        out.flag(format!("Operating current > {} rated current.", percent(limit)));
    }
}

fn check_power(out: &mut Overstress, s: Option<f64>, limit: f64) {
    if s.is_some_and(|s| s > limit) {
        out.flag(format!("Operating power > {} rated power.", percent(limit)));
    }
}

fn check_junction(out: &mut Overstress, t_j: Option<f64>, limit: f64) {
    if t_j.is_some_and(|t| t > limit) {
        out.flag(format!("Junction temperature > {limit:.1}C."));
    }
}

fn check_margin(out: &mut Overstress, margin: Option<f64>, limit: f64, inclusive: bool) {
    let violated = margin.is_some_and(|m| if inclusive { m <= limit } else { m < limit });
    if violated {
        out.flag(format!(
            "Operating temperature within {limit:.1}C of maximum rated temperature."
        ));
    }
}

/// Junction temperature from `temperature_junction`, else from the
/// family's thermal model. `None` when neither is available.
fn junction_temperature(category: PartCategory, part: &PartContext<'_>) -> Option<f64> {
    if let Some(t) = part.attrs.get("temperature_junction").filter(|t| *t > 0.0) {
        return Some(t);
    }
    match category {
        PartCategory::Semiconductor => semiconductor::Semiconductor::junction_temperature(part).ok(),
        PartCategory::IntegratedCircuit => {
            Some(integrated_circuit::IntegratedCircuit::junction_temperature(part))
        }
        _ => None,
    }
}

/// Contact current limits `(harsh, benign)` by load type.
fn contact_limits(load_type: usize) -> (f64, f64) {
    match load_type {
        2 => (0.40, 0.50),
        _ => (0.75, 0.90),
    }
}

/// Checks `part` against the derating rules of its category.
///
/// Categories without rules (panel meters) pass with no reasons. Crystals,
/// filters and fuses have no rules defined and fail with
/// `UnimplementedModel`.
///
/// # Examples
///
/// ```
/// use u_reliability::attributes::AttributeMap;
/// use u_reliability::derating::overstressed;
/// use u_reliability::environment::Environment;
/// use u_reliability::prediction::{PartCategory, PartContext};
///
/// let attrs = AttributeMap::new()
///     .with("voltage_dc_operating", 61.0)
///     .with("voltage_rated", 100.0);
/// let part = PartContext::new("C1", 10, Environment::GroundMobile, &attrs);
/// let result = overstressed(PartCategory::Capacitor, &part).unwrap();
/// assert!(result.overstressed);
/// assert!(result.reasons[0].contains("60%"));
/// ```
pub fn overstressed(category: PartCategory, part: &PartContext<'_>) -> Result<Overstress, ModelError> {
    let harsh = part.environment.is_harsh();
    let mut out = Overstress::default();

    match category {
        PartCategory::Capacitor => {
            if harsh {
                check_voltage(&mut out, voltage_ratio(part), 0.60);
                let margin = rated_max_temperature(part)
                    .map(|t_max| t_max - part.get_or("temperature_active", 30.0));
                check_margin(&mut out, margin, 10.0, true);
            } else {
                check_voltage(&mut out, voltage_ratio(part), 0.90);
            }
        }
        PartCategory::Connection => {
            if harsh {
                check_voltage(&mut out, voltage_ratio(part), 0.70);
                check_current(&mut out, current_ratio(part), 0.70);
                let rise = crate::prediction::connection::insert_temperature_rise(
                    part.get_or("contact_gauge", 0.0),
                    part.get_or("current_operating", 0.0),
                )
                .unwrap_or(0.0);
                let margin = rated_max_temperature(part)
                    .map(|t_max| t_max - (part.get_or("temperature_active", 30.0) + rise));
                check_margin(&mut out, margin, 25.0, false);
            } else {
                check_voltage(&mut out, voltage_ratio(part), 0.90);
                check_current(&mut out, current_ratio(part), 0.90);
            }
        }
        PartCategory::Inductor => {
            if harsh {
                check_current(&mut out, current_ratio(part), 0.60);
                check_voltage(&mut out, voltage_ratio(part), 0.50);
                let margin = rated_max_temperature(part)
                    .map(|t_max| t_max - inductor::hot_spot_temperature(part));
                check_margin(&mut out, margin, 15.0, false);
            } else {
                check_current(&mut out, current_ratio(part), 0.90);
                check_voltage(&mut out, voltage_ratio(part), 0.90);
            }
        }
        PartCategory::IntegratedCircuit => {
            let t_j = junction_temperature(category, part);
            if part.subcategory == 9 {
                if harsh {
                    check_junction(&mut out, t_j, 135.0);
                }
            } else {
                let s = voltage_ratio(part);
                check_voltage(&mut out, s, 1.05);
                if s.is_some_and(|s| s < 0.95) {
                    out.flag("Operating voltage < 95% rated voltage.");
                }
                if harsh {
                    check_current(&mut out, current_ratio(part), 0.80);
                    check_junction(&mut out, t_j, 125.0);
                } else {
                    check_current(&mut out, current_ratio(part), 0.90);
                }
            }
        }
        PartCategory::Miscellaneous => match part.subcategory {
            4 => {
                if voltage_ratio(part).is_some_and(|s| s >= 0.94) {
                    out.flag("Operating voltage > 94% rated voltage.");
                }
            }
            1 => return Err(ModelError::unimplemented("crystal derating rules")),
            2 => return Err(ModelError::unimplemented("filter derating rules")),
            3 => return Err(ModelError::unimplemented("fuse derating rules")),
            _ => return Err(part.subcategory_error()),
        },
        PartCategory::Relay => {
            let (severe, benign) = contact_limits(part.index_or("technology_id", 1)?);
            check_current(&mut out, current_ratio(part), if harsh { severe } else { benign });
        }
        PartCategory::Resistor => {
            check_power(&mut out, power_ratio(part), if harsh { 0.50 } else { 0.80 });
        }
        PartCategory::Semiconductor => {
            let t_j = junction_temperature(category, part);
            match part.subcategory {
                1 | 2 => {
                    if harsh {
                        check_power(&mut out, power_ratio(part), 0.70);
                        check_junction(&mut out, t_j, 125.0);
                    } else {
                        check_power(&mut out, power_ratio(part), 0.90);
                    }
                }
                8 => {
                    if harsh {
                        check_power(&mut out, power_ratio(part), 0.70);
                        check_voltage(&mut out, voltage_ratio(part), 0.70);
                        check_junction(&mut out, t_j, 135.0);
                    } else {
                        check_power(&mut out, power_ratio(part), 0.90);
                        check_voltage(&mut out, voltage_ratio(part), 0.90);
                    }
                }
                10 => {
                    if harsh {
                        check_current(&mut out, current_ratio(part), 0.70);
                        check_voltage(&mut out, voltage_ratio(part), 0.70);
                        check_junction(&mut out, t_j, 125.0);
                    } else {
                        check_current(&mut out, current_ratio(part), 0.90);
                        check_voltage(&mut out, voltage_ratio(part), 0.90);
                    }
                }
                11..=13 => {
                    check_voltage(&mut out, voltage_ratio(part), 0.70);
                    check_junction(&mut out, t_j, 125.0);
                }
                3..=7 | 9 => {
                    if harsh {
                        check_power(&mut out, power_ratio(part), 0.70);
                        check_voltage(&mut out, voltage_ratio(part), 0.75);
                        check_junction(&mut out, t_j, 125.0);
                    } else {
                        check_power(&mut out, power_ratio(part), 0.90);
                        check_voltage(&mut out, voltage_ratio(part), 0.90);
                    }
                }
                _ => return Err(part.subcategory_error()),
            }
        }
        PartCategory::Switch => {
            // Subcategory 5 is the circuit breaker.
            if part.subcategory == 5 {
                check_current(&mut out, current_ratio(part), 0.80);
            } else {
                let (severe, benign) = contact_limits(part.index_or("application_id", 1)?);
                check_current(&mut out, current_ratio(part), if harsh { severe } else { benign });
            }
        }
        PartCategory::Meter => match part.subcategory {
            1 => {
                let limit = if harsh { 0.80 } else { 0.90 };
                let t_active = part.get_or("temperature_active", 30.0);
                let s = ratio(part, t_active, "temperature_rated_max");
                if s.is_some_and(|s| s > limit) {
                    out.flag(format!(
                        "Operating temperature > {} rated temperature.",
                        percent(limit)
                    ));
                }
            }
            2 => {}
            _ => return Err(part.subcategory_error()),
        },
    }

    if out.overstressed {
        tracing::debug!(node = part.node, reasons = out.reasons.len(), "part overstressed");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use crate::environment::Environment;

    fn capacitor(v_operating: f64) -> AttributeMap {
        AttributeMap::new()
            .with("voltage_dc_operating", v_operating)
            .with("voltage_rated", 100.0)
    }

    #[test]
    fn test_capacitor_harsh_voltage_threshold() {
        let over = capacitor(61.0);
        let part = PartContext::new("C1", 10, Environment::GroundMobile, &over);
        let r = overstressed(PartCategory::Capacitor, &part).unwrap();
        assert!(r.overstressed);
        assert_eq!(r.reasons, vec!["1. Operating voltage > 60% rated voltage.".to_string()]);

        let under = capacitor(59.0);
        let part = PartContext::new("C1", 10, Environment::GroundMobile, &under);
        let r = overstressed(PartCategory::Capacitor, &part).unwrap();
        assert!(!r.overstressed);
        assert!(r.reasons.is_empty());
    }

    #[test]
    fn test_capacitor_benign_uses_wider_limit() {
        let attrs = capacitor(85.0);
        let part = PartContext::new("C2", 10, Environment::GroundBenign, &attrs);
        assert!(!overstressed(PartCategory::Capacitor, &part).unwrap().overstressed);
    }

    #[test]
    fn test_violations_accumulate_in_order() {
        let attrs = capacitor(80.0)
            .with("temperature_rated_max", 85.0)
            .with("temperature_active", 80.0);
        let part = PartContext::new("C3", 10, Environment::AirborneRotaryWing, &attrs);
        let r = overstressed(PartCategory::Capacitor, &part).unwrap();
        assert_eq!(r.reasons.len(), 2);
        assert!(r.reasons[0].starts_with("1. Operating voltage"));
        assert!(r.reasons[1].starts_with("2. Operating temperature within 10.0C"));
        assert_eq!(r.reason_text().lines().count(), 2);
    }

    #[test]
    fn test_missing_rating_is_not_a_violation() {
        let attrs = AttributeMap::new().with("power_operating", 5.0);
        let part = PartContext::new("R1", 1, Environment::GroundMobile, &attrs);
        assert!(!overstressed(PartCategory::Resistor, &part).unwrap().overstressed);
    }

    #[test]
    fn test_ic_supply_window() {
        let attrs = AttributeMap::new()
            .with("voltage_dc_operating", 4.5)
            .with("voltage_rated", 5.0)
            .with("temperature_junction", 60.0);
        let part = PartContext::new("U1", 2, Environment::GroundBenign, &attrs);
        let r = overstressed(PartCategory::IntegratedCircuit, &part).unwrap();
        assert_eq!(r.reasons, vec!["1. Operating voltage < 95% rated voltage.".to_string()]);
    }

    #[test]
    fn test_gaas_mmic_junction_limit() {
        let attrs = AttributeMap::new().with("temperature_junction", 140.0);
        let harsh = PartContext::new("U2", 9, Environment::AirborneUninhabitedFighter, &attrs);
        let r = overstressed(PartCategory::IntegratedCircuit, &harsh).unwrap();
        assert_eq!(r.reasons, vec!["1. Junction temperature > 135.0C.".to_string()]);
        let benign = PartContext::new("U2", 9, Environment::SpaceFlight, &attrs);
        assert!(!overstressed(PartCategory::IntegratedCircuit, &benign).unwrap().overstressed);
    }

    #[test]
    fn test_inductive_relay_load() {
        let attrs = AttributeMap::new()
            .with("technology_id", 2.0)
            .with("current_operating", 4.5)
            .with("current_rated", 10.0);
        let part = PartContext::new("K1", 1, Environment::NavalUnsheltered, &attrs);
        let r = overstressed(PartCategory::Relay, &part).unwrap();
        assert_eq!(r.reasons, vec!["1. Operating current > 40% rated current.".to_string()]);
    }

    #[test]
    fn test_silicon_transistor_rules() {
        let attrs = AttributeMap::new()
            .with("power_operating", 0.8)
            .with("power_rated", 1.0)
            .with("voltage_dc_operating", 40.0)
            .with("voltage_rated", 50.0)
            .with("temperature_junction", 130.0);
        let part = PartContext::new("Q1", 3, Environment::GroundMobile, &attrs);
        let r = overstressed(PartCategory::Semiconductor, &part).unwrap();
        assert_eq!(r.reasons.len(), 3);
        assert!(r.reasons[1].contains("75%"));
    }

    #[test]
    fn test_lamp_threshold_is_inclusive() {
        let attrs = AttributeMap::new()
            .with("voltage_dc_operating", 4.7)
            .with("voltage_rated", 5.0);
        let part = PartContext::new("DS1", 4, Environment::GroundBenign, &attrs);
        assert!(overstressed(PartCategory::Miscellaneous, &part).unwrap().overstressed);
    }

    #[test]
    fn test_fuse_rules_are_unimplemented() {
        let attrs = AttributeMap::new();
        let part = PartContext::new("F1", 3, Environment::GroundBenign, &attrs);
        assert!(matches!(
            overstressed(PartCategory::Miscellaneous, &part),
            Err(ModelError::UnimplementedModel { .. })
        ));
    }

    #[test]
    fn test_panel_meter_has_no_rules() {
        let attrs = AttributeMap::new().with("current_operating", 100.0).with("current_rated", 1.0);
        let part = PartContext::new("M1", 2, Environment::GroundMobile, &attrs);
        assert_eq!(overstressed(PartCategory::Meter, &part).unwrap(), Overstress::default());
    }

    #[test]
    fn test_elapsed_time_meter_temperature() {
        let attrs = AttributeMap::new()
            .with("temperature_active", 85.0)
            .with("temperature_rated_max", 100.0);
        let harsh = PartContext::new("M2", 1, Environment::GroundMobile, &attrs);
        assert_eq!(
            overstressed(PartCategory::Meter, &harsh).unwrap().reasons,
            vec!["1. Operating temperature > 80% rated temperature.".to_string()]
        );
        let benign = PartContext::new("M2", 1, Environment::GroundBenign, &attrs);
        assert!(!overstressed(PartCategory::Meter, &benign).unwrap().overstressed);
    }

    #[test]
    fn test_zero_rating_is_logged_not_flagged() {
        let attrs = AttributeMap::new()
            .with("power_operating", 5.0)
            .with("power_rated", 0.0);
        let part = PartContext::new("R2", 1, Environment::GroundMobile, &attrs);
        let mut result = None;
        let fields = crate::guard::test_support::warned_fields(|| {
            result = Some(overstressed(PartCategory::Resistor, &part));
        });
        assert!(!result.unwrap().unwrap().overstressed);
        assert_eq!(fields, vec!["power_rated".to_string()]);
    }

    #[test]
    fn test_inductor_hot_spot_margin() {
        let attrs = AttributeMap::new()
            .with("temperature_active", 60.0)
            .with("temperature_rated_max", 105.0);
        // Default 35 C rise gives a 98.5 C hot spot.
        let part = PartContext::new("L1", 2, Environment::GroundMobile, &attrs);
        let r = overstressed(PartCategory::Inductor, &part).unwrap();
        assert_eq!(
            r.reasons,
            vec!["1. Operating temperature within 15.0C of maximum rated temperature.".to_string()]
        );
    }
}
