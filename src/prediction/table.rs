//! 1-based table access and breakpoint bucketing shared by the part models.
//!
//! Handbook tables are indexed from 1. The remap to 0-based slices happens
//! here and nowhere else.

use crate::error::ModelError;

/// Returns `table[index - 1]`, or a `DataRange` error naming `field`.
pub(crate) fn lookup<T: Copy>(
    table: &[T],
    index: usize,
    node: &str,
    field: &str,
) -> Result<T, ModelError> {
    index
        .checked_sub(1)
        .and_then(|i| table.get(i))
        .copied()
        .ok_or_else(|| ModelError::data_range(node, field, index as i64))
}

/// Number of breakpoints strictly below `value`.
///
/// With breakpoints `[b0, b1, ...]` a value `<= b0` maps to 0, a value in
/// `(b0, b1]` maps to 1, and a value above the last breakpoint maps to
/// `breakpoints.len()`. Tables indexed by this function therefore carry
/// one more entry than there are breakpoints.
pub(crate) fn bucket(breakpoints: &[f64], value: f64) -> usize {
    breakpoints.iter().take_while(|&&b| value > b).count()
}

/// Index of the first breakpoint `>= value`, clamped to the last one.
///
/// Used where each breakpoint is the upper bound of its own row (complexity
/// classes given as "up to N gates").
pub(crate) fn upper_bound(breakpoints: &[f64], value: f64) -> usize {
    bucket(breakpoints, value).min(breakpoints.len().saturating_sub(1))
}

/// Default case temperature (°C) by active environment.
pub(crate) const CASE_TEMPERATURE: [f64; 14] = [
    35.0, 45.0, 50.0, 45.0, 50.0, 60.0, 60.0, 75.0, 75.0, 60.0, 35.0, 50.0, 60.0, 45.0,
];

/// Boltzmann constant in eV/K.
pub(crate) const BOLTZMANN: f64 = 8.617e-5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_one_based() {
        let t = [10.0, 20.0, 30.0];
        assert_eq!(lookup(&t, 1, "n", "f").unwrap(), 10.0);
        assert_eq!(lookup(&t, 3, "n", "f").unwrap(), 30.0);
        assert_eq!(
            lookup(&t, 0, "C1", "quality_id").unwrap_err(),
            ModelError::data_range("C1", "quality_id", 0)
        );
        assert!(lookup(&t, 4, "C1", "quality_id").is_err());
    }

    #[test]
    fn test_bucket_edges() {
        let bp = [1.0e5, 1.0e6, 1.0e7];
        assert_eq!(bucket(&bp, 10.0), 0);
        assert_eq!(bucket(&bp, 1.0e5), 0);
        assert_eq!(bucket(&bp, 1.0e5 + 1.0), 1);
        assert_eq!(bucket(&bp, 5.0e6), 2);
        assert_eq!(bucket(&bp, 1.0e8), 3);
    }

    #[test]
    fn test_upper_bound_clamps() {
        let bp = [100.0, 300.0, 1000.0];
        assert_eq!(upper_bound(&bp, 50.0), 0);
        assert_eq!(upper_bound(&bp, 300.0), 1);
        assert_eq!(upper_bound(&bp, 5000.0), 2);
    }
}
