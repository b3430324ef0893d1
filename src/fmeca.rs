//! FMECA criticality (MIL-STD-1629A and automotive RPN).
//!
//! - Mode criticality `Cm = α·β·λ·t` and mode failure rate `β·λ`.
//! - Item criticality: the sum of mode criticalities per severity
//!   category, in category order.
//! - Risk priority number `RPN = S·O·D`, before and after corrective action.
//!
//! # Example
//!
//! ```
//! use u_reliability::fmeca::{criticality_analysis, FailureMode};
//!
//! let mode = FailureMode {
//!     id: "M1".into(),
//!     mode_ratio: 0.5,
//!     conditional_probability: 1.0,
//!     hazard_rate: 2.0,
//!     operating_time: 100.0,
//! };
//! let result = criticality_analysis(&[mode], &[], &[]);
//! assert_eq!(result.modes[0].criticality, 100.0);
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Significant digits in the item criticality text.
const PLACES: usize = 6;

/// Inputs of one failure mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureMode {
    pub id: String,
    /// α, the fraction of item failures in this mode.
    pub mode_ratio: f64,
    /// β, the probability the mode produces the stated effect.
    pub conditional_probability: f64,
    /// λ, the item hazard rate.
    pub hazard_rate: f64,
    /// t, operating time.
    pub operating_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeCriticality {
    pub id: String,
    pub criticality: f64,
    pub failure_rate: f64,
}

/// Modes of one item with their severity categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemModes {
    pub item: String,
    /// `(mode id, severity category)` pairs.
    pub modes: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCriticality {
    pub item: String,
    /// Summed criticality per severity category, sorted by category.
    pub by_category: Vec<(String, f64)>,
    /// One `"<category>: <value>\n"` line per non-empty category.
    pub text: String,
}

/// Severity, occurrence and detection before and after corrective action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RpnEntry {
    pub severity: u32,
    pub occurrence: u32,
    pub detection: u32,
    pub severity_new: u32,
    pub occurrence_new: u32,
    pub detection_new: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpnResult {
    pub rpn: u32,
    pub rpn_new: u32,
}

/// All three criticality analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalityResults {
    pub modes: Vec<ModeCriticality>,
    pub items: Vec<ItemCriticality>,
    pub rpn: Vec<RpnResult>,
}

impl RpnEntry {
    pub fn evaluate(&self) -> RpnResult {
        RpnResult {
            rpn: self.severity * self.occurrence * self.detection,
            rpn_new: self.severity_new * self.occurrence_new * self.detection_new,
        }
    }
}

impl FailureMode {
    pub fn evaluate(&self) -> ModeCriticality {
        ModeCriticality {
            id: self.id.clone(),
            criticality: self.mode_ratio
                * self.conditional_probability
                * self.hazard_rate
                * self.operating_time,
            failure_rate: self.conditional_probability * self.hazard_rate,
        }
    }
}

/// Runs mode, item and RPN criticality.
///
/// Item modes that name an unknown mode id contribute nothing and are
/// logged.
pub fn criticality_analysis(
    modes: &[FailureMode],
    items: &[ItemModes],
    rpn: &[RpnEntry],
) -> CriticalityResults {
    let modes: Vec<ModeCriticality> = modes.iter().map(FailureMode::evaluate).collect();
    let by_id: HashMap<&str, f64> = modes
        .iter()
        .map(|m| (m.id.as_str(), m.criticality))
        .collect();

    let items = items
        .iter()
        .map(|item| item_criticality(item, &by_id))
        .collect();

    CriticalityResults {
        modes,
        items,
        rpn: rpn.iter().map(RpnEntry::evaluate).collect(),
    }
}

fn item_criticality(item: &ItemModes, modes: &HashMap<&str, f64>) -> ItemCriticality {
    let mut categories: BTreeMap<&str, f64> = BTreeMap::new();
    for (mode, category) in &item.modes {
        let criticality = match modes.get(mode.as_str()) {
            Some(c) => *c,
            None => {
                tracing::warn!(item = %item.item, mode = %mode, "unknown failure mode");
                0.0
            }
        };
        *categories.entry(category.as_str()).or_insert(0.0) += criticality;
    }

    let text = categories
        .iter()
        .filter(|(category, _)| !category.is_empty())
        .map(|(category, value)| format!("{}: {}\n", category, format_general(*value, PLACES)))
        .collect();

    ItemCriticality {
        item: item.item.clone(),
        by_category: categories
            .into_iter()
            .map(|(category, value)| (category.to_string(), value))
            .collect(),
        text,
    }
}

/// Formats with `places` significant digits, dropping trailing zeros.
/// Switches to exponent notation for very large or small magnitudes.
fn format_general(value: f64, places: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let places = places.max(1);
    let exponent = value.abs().log10().floor() as i32;
    if exponent < -4 || exponent >= places as i32 {
        let s = format!("{:.*e}", places - 1, value);
        match s.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{}", trim_zeros(mantissa), exp),
            None => s,
        }
    } else {
        let decimals = (places as i32 - 1 - exponent).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
