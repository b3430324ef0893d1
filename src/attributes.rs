//! Named-field access to part and assembly attributes.
//!
//! Calculations never see a storage row. They read through
//! [`AttributeProvider`], so an SQL row, a JSON document, or the in-memory
//! [`AttributeMap`] can back the same model code.

use std::collections::{BTreeMap, HashMap};

use crate::error::ModelError;

/// Minimal capability a record must offer to be evaluated.
pub trait AttributeProvider {
    /// Returns the numeric value of `field`, or `None` when absent.
    fn get(&self, field: &str) -> Option<f64>;
}

impl AttributeProvider for HashMap<String, f64> {
    fn get(&self, field: &str) -> Option<f64> {
        HashMap::get(self, field).copied()
    }
}

impl AttributeProvider for BTreeMap<String, f64> {
    fn get(&self, field: &str) -> Option<f64> {
        BTreeMap::get(self, field).copied()
    }
}

impl<T: AttributeProvider + ?Sized> AttributeProvider for &T {
    fn get(&self, field: &str) -> Option<f64> {
        (**self).get(field)
    }
}

/// In-memory attribute record.
///
/// # Examples
///
/// ```
/// use u_reliability::attributes::{AttributeMap, AttributeProvider};
/// let part = AttributeMap::new()
///     .with("voltage_rated", 50.0)
///     .with("voltage_dc_operating", 20.0);
/// assert_eq!(part.get("voltage_rated"), Some(50.0));
/// assert_eq!(part.get("capacitance"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    values: BTreeMap<String, f64>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: &str, value: f64) -> Self {
        self.values.insert(field.to_string(), value);
        self
    }

    pub fn set(&mut self, field: &str, value: f64) {
        self.values.insert(field.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl AttributeProvider for AttributeMap {
    fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }
}

impl FromIterator<(String, f64)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Reads a field that the model cannot proceed without.
pub fn require(
    attrs: &dyn AttributeProvider,
    node: &str,
    field: &str,
) -> Result<f64, ModelError> {
    attrs.get(field).ok_or_else(|| ModelError::MissingAttribute {
        node: node.to_string(),
        field: field.to_string(),
    })
}

/// Reads an optional field, substituting `default` when absent.
pub fn get_or(attrs: &dyn AttributeProvider, field: &str, default: f64) -> f64 {
    attrs.get(field).unwrap_or(default)
}

/// Reads a 1-based classification index (quality, type, construction...).
///
/// Missing or non-integral values are reported as a range error naming the
/// field, since a fractional or negative index can never select a table row.
pub fn index(attrs: &dyn AttributeProvider, node: &str, field: &str) -> Result<usize, ModelError> {
    let raw = require(attrs, node, field)?;
    if !raw.is_finite() || raw < 0.0 || raw.fract() != 0.0 {
        return Err(ModelError::data_range(node, field, raw as i64));
    }
    Ok(raw as usize)
}

/// Like [`index`] but yields `default` when the field is absent.
pub fn index_or(
    attrs: &dyn AttributeProvider,
    node: &str,
    field: &str,
    default: usize,
) -> Result<usize, ModelError> {
    match attrs.get(field) {
        None => Ok(default),
        Some(_) => index(attrs, node, field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_provider() {
        let mut m = HashMap::new();
        m.insert("quality".to_string(), 2.0);
        assert_eq!(AttributeProvider::get(&m, "quality"), Some(2.0));
        assert_eq!(AttributeProvider::get(&m, "missing"), None);
    }

    #[test]
    fn test_require_reports_missing_field() {
        let a = AttributeMap::new();
        let err = require(&a, "R1", "resistance").unwrap_err();
        assert_eq!(
            err,
            ModelError::MissingAttribute {
                node: "R1".into(),
                field: "resistance".into()
            }
        );
    }

    #[test]
    fn test_index_rejects_fractional_and_negative() {
        let a = AttributeMap::new().with("quality", 1.5).with("type", -1.0);
        assert!(matches!(
            index(&a, "Q1", "quality"),
            Err(ModelError::DataRange { .. })
        ));
        assert!(matches!(
            index(&a, "Q1", "type"),
            Err(ModelError::DataRange { .. })
        ));
    }

    #[test]
    fn test_index_or_default() {
        let a = AttributeMap::new().with("quality", 3.0);
        assert_eq!(index_or(&a, "U1", "quality", 1).unwrap(), 3);
        assert_eq!(index_or(&a, "U1", "construction", 1).unwrap(), 1);
    }
}
