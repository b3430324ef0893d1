//! Kaplan-Meier product-limit estimator.
//!
//! The curve is built once from the incident records and then walked
//! lazily: [`KaplanMeierCurve::iter`] yields one [`KaplanMeierPoint`] per
//! distinct event time and can be called any number of times.

use serde::{Deserialize, Serialize};

use super::IncidentRecord;
use crate::config::CalculationConfig;
use crate::guard::divide_or_zero;

/// Confidence-bound transform selector.
///
/// All three selectors currently produce linear bounds `S ± z·se`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundType {
    #[default]
    Linear,
    Log,
    LogLog,
}

/// Estimates at one distinct event time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KaplanMeierPoint {
    pub time: f64,
    pub at_risk: u64,
    pub failures: u64,
    pub suspensions: u64,
    /// Probability of surviving this step given survival to it.
    pub conditional_survival: f64,
    /// S(t).
    pub survival: f64,
    pub standard_error: f64,
    pub lower: f64,
    pub upper: f64,
    /// -ln S(t); `f64::INFINITY` once S(t) reaches zero.
    pub cumulative_hazard: f64,
    /// Area under the step curve from 0 to `time`.
    pub restricted_mean: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Step {
    time: f64,
    failures: u64,
    suspensions: u64,
}

/// Grouped event times ready to be walked.
#[derive(Debug, Clone, PartialEq)]
pub struct KaplanMeierCurve {
    steps: Vec<Step>,
    total: u64,
    z: f64,
    bound_type: BoundType,
}

/// Builds the Kaplan-Meier curve for `records`.
///
/// Records with a negative event time are dropped, as are records after
/// `limit` when `limit > 0`. Each record counts `quantity` times. Bounds
/// use the one-sided normal quantile at `config.confidence`.
///
/// # Examples
///
/// ```
/// use u_reliability::config::CalculationConfig;
/// use u_reliability::survival::{kaplan_meier, BoundType, IncidentRecord};
///
/// let records: Vec<_> = [1.0, 1.0, 2.0, 3.0, 3.0, 3.0]
///     .iter()
///     .map(|&t| IncidentRecord::exact(t))
///     .collect();
/// let curve = kaplan_meier(&records, 0.0, BoundType::Linear, &CalculationConfig::default());
/// let s: Vec<f64> = curve.iter().map(|p| p.survival).collect();
/// assert!((s[0] - 4.0 / 6.0).abs() < 1e-12);
/// assert!((s[1] - 0.5).abs() < 1e-12);
/// assert_eq!(s[2], 0.0);
/// ```
pub fn kaplan_meier(
    records: &[IncidentRecord],
    limit: f64,
    bound_type: BoundType,
    config: &CalculationConfig,
) -> KaplanMeierCurve {
    let mut events: Vec<(f64, bool, u64)> = records
        .iter()
        .map(|r| (r.event_time(), r.effective_status().is_failure(), r.quantity as u64))
        .filter(|&(t, _, q)| t.is_finite() && t >= 0.0 && q > 0 && (limit <= 0.0 || t <= limit))
        .collect();
    events.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut steps: Vec<Step> = Vec::new();
    for (time, failed, quantity) in events {
        if steps.last().map_or(true, |s| s.time != time) {
            steps.push(Step {
                time,
                failures: 0,
                suspensions: 0,
            });
        }
        if let Some(step) = steps.last_mut() {
            if failed {
                step.failures += quantity;
            } else {
                step.suspensions += quantity;
            }
        }
    }

    let total = steps.iter().map(|s| s.failures + s.suspensions).sum();
    KaplanMeierCurve {
        steps,
        total,
        z: config.z_one_sided(),
        bound_type,
    }
}

impl KaplanMeierCurve {
    /// Walks the curve from the first event time.
    pub fn iter(&self) -> KaplanMeierIter<'_> {
        KaplanMeierIter {
            curve: self,
            index: 0,
            at_risk: self.total,
            survival: 1.0,
            greenwood: 0.0,
            previous_time: 0.0,
            restricted_mean: 0.0,
        }
    }

    /// Number of units entering the analysis.
    pub fn sample_size(&self) -> u64 {
        self.total
    }

    pub fn bound_type(&self) -> BoundType {
        self.bound_type
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<'a> IntoIterator for &'a KaplanMeierCurve {
    type Item = KaplanMeierPoint;
    type IntoIter = KaplanMeierIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy walk over a [`KaplanMeierCurve`].
#[derive(Debug, Clone)]
pub struct KaplanMeierIter<'a> {
    curve: &'a KaplanMeierCurve,
    index: usize,
    at_risk: u64,
    survival: f64,
    greenwood: f64,
    previous_time: f64,
    restricted_mean: f64,
}

impl Iterator for KaplanMeierIter<'_> {
    type Item = KaplanMeierPoint;

    fn next(&mut self) -> Option<KaplanMeierPoint> {
        let step = *self.curve.steps.get(self.index)?;
        self.index += 1;

        let n = self.at_risk as f64;
        let d = step.failures as f64;

        self.restricted_mean += self.survival * (step.time - self.previous_time);
        self.previous_time = step.time;

        let conditional_survival = if n > 0.0 { 1.0 - d / n } else { 1.0 };
        self.survival *= conditional_survival;
        if step.failures > 0 {
            self.greenwood += 1.0 / ((n - d + 1.0) * n);
        }

        let standard_error = self.survival * self.greenwood.sqrt();
        let half_width = self.curve.z * standard_error;
        let lower = (self.survival - half_width).clamp(0.0, 1.0);
        let upper = (self.survival + half_width).clamp(0.0, 1.0);

        let cumulative_hazard = if self.survival > 0.0 {
            -self.survival.ln()
        } else {
            f64::INFINITY
        };

        let point = KaplanMeierPoint {
            time: step.time,
            at_risk: self.at_risk,
            failures: step.failures,
            suspensions: step.suspensions,
            conditional_survival,
            survival: self.survival,
            standard_error,
            lower,
            upper,
            cumulative_hazard,
            restricted_mean: self.restricted_mean,
        };

        self.at_risk = self.at_risk.saturating_sub(step.failures + step.suspensions);
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.curve.steps.len() - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for KaplanMeierIter<'_> {}

/// Kaplan-Meier MTBF estimate at one failure time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KaplanMeierMean {
    pub time: f64,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
    pub variance: f64,
}

/// Running MTBF estimate over the failure times of `curve`.
///
/// Starts at the first failure time and adds `S(tᵢ)·(tᵢ - tᵢ₋₁)` per
/// failure time, with variance `Σ aᵢ² / ((n-i)(n-i+1))` over the `n`
/// failure times.
pub fn kaplan_meier_mean(curve: &KaplanMeierCurve) -> Vec<KaplanMeierMean> {
    let failures: Vec<KaplanMeierPoint> = curve.iter().filter(|p| p.failures > 0).collect();
    let Some(first) = failures.first() else {
        return Vec::new();
    };

    let n = failures.len() as f64;
    let mut mean = first.time;
    let mut variance = 0.0_f64;
    let mut out = Vec::with_capacity(failures.len().saturating_sub(1));

    for (i, pair) in failures.windows(2).enumerate() {
        let i = (i + 1) as f64;
        let area = pair[1].survival * (pair[1].time - pair[0].time);
        mean += area;
        variance += area * area / ((n - i) * (n - i + 1.0));
        let half_width = curve.z * variance.sqrt();
        out.push(KaplanMeierMean {
            time: pair[1].time,
            mean,
            lower: mean - half_width,
            upper: mean + half_width,
            variance,
        });
    }
    out
}

/// Hazard series derived from a Kaplan-Meier curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KaplanMeierHazard {
    pub time: f64,
    /// H(t)/t.
    pub hazard: f64,
    pub hazard_lower: f64,
    pub hazard_upper: f64,
    /// H(t) = -ln S(t).
    pub cumulative: f64,
    pub cumulative_lower: f64,
    pub cumulative_upper: f64,
    pub log_cumulative: f64,
    pub log_cumulative_lower: f64,
    pub log_cumulative_upper: f64,
}

/// Average hazard, cumulative hazard and log cumulative hazard at each
/// point of `curve`.
///
/// The lower cumulative hazard comes from the upper survival bound and
/// vice versa. A survival value of zero has no finite hazard and reports
/// 0.0 in every series.
pub fn kaplan_meier_hazard(curve: &KaplanMeierCurve) -> Vec<KaplanMeierHazard> {
    curve
        .iter()
        .map(|p| {
            let node = format!("t={}", p.time);
            let cumulative = neg_ln(p.survival, &node);
            let cumulative_lower = neg_ln(p.upper, &node);
            let cumulative_upper = neg_ln(p.lower, &node);
            KaplanMeierHazard {
                time: p.time,
                hazard: divide_or_zero(cumulative, p.time, &node, "time"),
                hazard_lower: divide_or_zero(cumulative_lower, p.time, &node, "time"),
                hazard_upper: divide_or_zero(cumulative_upper, p.time, &node, "time"),
                cumulative,
                cumulative_lower,
                cumulative_upper,
                log_cumulative: ln_or_zero(cumulative),
                log_cumulative_lower: ln_or_zero(cumulative_lower),
                log_cumulative_upper: ln_or_zero(cumulative_upper),
            }
        })
        .collect()
}

fn neg_ln(survival: f64, node: &str) -> f64 {
    if survival > 0.0 {
        -survival.ln()
    } else {
        tracing::debug!(node, "survival is zero; cumulative hazard reported as 0");
        0.0
    }
}

fn ln_or_zero(x: f64) -> f64 {
    if x > 0.0 {
        x.ln()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn exact(times: &[f64]) -> Vec<IncidentRecord> {
        times.iter().map(|&t| IncidentRecord::exact(t)).collect()
    }

    fn curve(records: &[IncidentRecord]) -> KaplanMeierCurve {
        kaplan_meier(records, 0.0, BoundType::Linear, &CalculationConfig::default())
    }

    #[test]
    fn test_uncensored_product() {
        let c = curve(&exact(&[1.0, 1.0, 2.0, 3.0, 3.0, 3.0]));
        let points: Vec<_> = c.iter().collect();
        assert_eq!(points.len(), 3);

        assert_eq!(points[0].at_risk, 6);
        assert_eq!(points[0].failures, 2);
        assert_eq!(points[1].at_risk, 4);
        assert_eq!(points[2].at_risk, 3);

        let expected = (1.0 - 2.0 / 6.0) * (1.0 - 1.0 / 4.0) * (1.0 - 3.0 / 3.0);
        assert_eq!(points[2].survival, expected);
        assert_eq!(points[2].cumulative_hazard, f64::INFINITY);
        assert!((points[1].cumulative_hazard - 2.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_greenwood_accumulation() {
        let c = curve(&exact(&[1.0, 1.0, 2.0, 3.0, 3.0, 3.0]));
        let p: Vec<_> = c.iter().collect();
        let g1: f64 = 1.0 / (5.0 * 6.0);
        let g2: f64 = g1 + 1.0 / (4.0 * 4.0);
        assert!((p[0].standard_error - (4.0 / 6.0) * g1.sqrt()).abs() < 1e-12);
        assert!((p[1].standard_error - 0.5 * g2.sqrt()).abs() < 1e-12);
        assert!(p[1].lower < p[1].survival && p[1].survival < p[1].upper);
    }

    #[test]
    fn test_suspensions_reduce_risk_set_only() {
        let records = vec![
            IncidentRecord::exact(10.0),
            IncidentRecord::right_censored(15.0),
            IncidentRecord::exact(20.0),
            IncidentRecord::exact(30.0),
        ];
        let p: Vec<_> = curve(&records).iter().collect();
        assert_eq!(p.len(), 4);
        assert_eq!(p[1].conditional_survival, 1.0);
        assert_eq!(p[1].suspensions, 1);
        assert_eq!(p[2].at_risk, 2);
        assert!((p[2].survival - 0.75 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_quantity_weights_and_limit() {
        let records = vec![
            IncidentRecord::exact(5.0).with_quantity(2),
            IncidentRecord::exact(8.0).with_quantity(2),
            IncidentRecord::exact(100.0),
        ];
        let c = kaplan_meier(&records, 50.0, BoundType::Log, &CalculationConfig::default());
        assert_eq!(c.sample_size(), 4);
        let p: Vec<_> = c.iter().collect();
        assert_eq!(p.len(), 2);
        assert!((p[0].survival - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_restricted_mean_is_area_under_steps() {
        let p: Vec<_> = curve(&exact(&[2.0, 4.0])).iter().collect();
        assert!((p[0].restricted_mean - 2.0).abs() < 1e-12);
        assert!((p[1].restricted_mean - 3.0).abs() < 1e-12, "2 + 0.5*2");
    }

    #[test]
    fn test_iteration_is_restartable() {
        let c = curve(&exact(&[3.0, 1.0, 2.0]));
        let first: Vec<_> = c.iter().collect();
        let second: Vec<_> = (&c).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(c.iter().len(), 3);
    }

    #[test]
    fn test_empty_curve() {
        let c = curve(&[]);
        assert!(c.is_empty());
        assert_eq!(c.iter().count(), 0);
        assert!(kaplan_meier_mean(&c).is_empty());
    }

    #[test]
    fn test_mean_series() {
        let c = curve(&exact(&[10.0, 20.0, 30.0, 40.0]));
        let m = kaplan_meier_mean(&c);
        assert_eq!(m.len(), 3);
        // 10 + 0.5*10
        assert!((m[0].mean - 15.0).abs() < 1e-12);
        assert!((m[0].variance - 25.0 / 12.0).abs() < 1e-12);
        assert!(m[2].lower <= m[2].mean && m[2].mean <= m[2].upper);
    }

    #[test]
    fn test_hazard_series() {
        let c = curve(&exact(&[1.0, 2.0]));
        let h = kaplan_meier_hazard(&c);
        assert_eq!(h.len(), 2);
        assert!((h[0].cumulative - 2.0_f64.ln()).abs() < 1e-12);
        assert!((h[0].hazard - 2.0_f64.ln()).abs() < 1e-12);
        assert!(h[0].cumulative_lower <= h[0].cumulative);
        assert!(h[0].cumulative <= h[0].cumulative_upper);
        // S(2) = 0
        assert_eq!(h[1].cumulative, 0.0);
        assert_eq!(h[1].log_cumulative, 0.0);
    }

    proptest! {
        #[test]
        fn prop_survival_non_increasing(
            data in proptest::collection::vec((0.0f64..1000.0, any::<bool>(), 1u32..4), 1..60)
        ) {
            let records: Vec<_> = data
                .iter()
                .map(|&(t, failed, q)| {
                    let r = if failed { IncidentRecord::exact(t) } else { IncidentRecord::right_censored(t) };
                    r.with_quantity(q)
                })
                .collect();
            let c = curve(&records);
            let mut previous = 1.0_f64;
            for p in c.iter() {
                prop_assert!(p.survival <= previous + 1e-15);
                prop_assert!((0.0..=1.0).contains(&p.lower));
                prop_assert!((0.0..=1.0).contains(&p.upper));
                previous = p.survival;
            }
        }
    }
}
