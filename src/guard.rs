//! Guarded arithmetic.
//!
//! A zero (or non-finite) denominator yields the 0.0 sentinel and a
//! structured warning naming the node and the denominator's source field.
//! Unknown MTBF and unknown stress ratios display as zero downstream.

use tracing::warn;

/// Divides `numerator` by `denominator`, returning 0.0 when the quotient is
/// undefined.
pub fn divide_or_zero(numerator: f64, denominator: f64, node: &str, field: &str) -> f64 {
    divide_or(numerator, denominator, 0.0, node, field)
}

/// Divides `numerator` by `denominator`, returning `fallback` when the
/// quotient is undefined.
pub fn divide_or(numerator: f64, denominator: f64, fallback: f64, node: &str, field: &str) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        warn!(
            node,
            field,
            numerator,
            denominator,
            fallback,
            "zero denominator; substituting sentinel"
        );
        return fallback;
    }
    let q = numerator / denominator;
    if q.is_finite() {
        q
    } else {
        warn!(node, field, numerator, denominator, fallback, "non-finite quotient");
        fallback
    }
}
