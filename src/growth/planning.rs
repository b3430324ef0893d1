//! Reliability-growth test planning.
//!
//! Two models are used, as in MIL-HDBK-189:
//!
//! - the phase planning model, where a phase of length T that starts fixing
//!   failures at t_i grows MTBF by `MF = MI·exp(GR·(GR/2 + ln(T/t_i) + 1))`;
//! - the idealized curve `M(t) = MI·(t/t_1)^α / (1 - α)` for t > t_1, used for
//!   the multi-phase planned growth curve.
//!
//! Every formula that cannot be evaluated with the values given falls back
//! to the next formula in its chain and finally to 0.0, with a warning. An
//! unset input is written as 0.0.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PlanningError;
use crate::guard::divide_or_zero;

fn positive(x: f64) -> Option<f64> {
    (x > 0.0 && x.is_finite()).then_some(x)
}

fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

fn unresolved(quantity: &'static str) -> f64 {
    warn!(quantity, "not computable from the given inputs; using 0");
    0.0
}

/// `GR·(GR/2 + ln(T/t_i) + 1)`, the log of the MTBF growth factor.
fn growth_exponent(growth_rate: f64, test_time: f64, growth_start: f64) -> Option<f64> {
    let ratio = positive(test_time / growth_start)?;
    finite(growth_rate * (0.5 * growth_rate + ratio.ln() + 1.0))
}

fn growth_rate_formula(test_time: f64, growth_start: f64, mi: f64, mf: f64) -> Option<f64> {
    let ln_ratio = positive(test_time / growth_start)?.ln();
    let ln_growth = positive(mf / mi)?.ln();
    let discriminant = (1.0 + ln_ratio).powi(2) + 2.0 * ln_growth;
    if discriminant < 0.0 {
        return None;
    }
    finite(-ln_ratio - 1.0 + discriminant.sqrt())
}

fn initial_from_probability(growth_start: f64, ms: f64, probability: f64) -> Option<f64> {
    if !(probability > 0.0 && probability < 1.0) {
        return None;
    }
    positive(-growth_start * ms / (1.0 - probability).ln())
}

fn initial_from_final(test_time: f64, growth_start: f64, mf: f64, gr: f64) -> Option<f64> {
    positive(mf / growth_exponent(gr, test_time, growth_start)?.exp())
}

fn final_from_initial(test_time: f64, growth_start: f64, mi: f64, gr: f64) -> Option<f64> {
    positive(mi * growth_exponent(gr, test_time, growth_start)?.exp())
}

fn test_time_formula(growth_start: f64, mi: f64, mf: f64, gr: f64) -> Option<f64> {
    if gr == 0.0 {
        return None;
    }
    let ln_growth = positive(mf / mi)?.ln();
    positive(growth_start * (ln_growth / gr - 0.5 * gr - 1.0).exp())
}

/// Inputs to [`calculate_rg_phase`]. Leave a quantity at 0.0 to solve for it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RgPhaseInputs {
    /// Total test time of the phase (T).
    pub test_time: f64,
    /// MTBF at the start of the phase (MI).
    pub initial_mtbf: f64,
    /// MTBF at the end of the phase (MF).
    pub final_mtbf: f64,
    /// Average growth rate over the phase (GR).
    pub growth_rate: f64,
    /// Fraction of the failure intensity addressed by corrective action (MS).
    pub management_strategy: f64,
    /// Average fix effectiveness factor (FEF).
    pub fix_effectiveness: f64,
    /// Probability of observing at least one failure before the first fix.
    pub probability: f64,
    /// Time the first fix is implemented (t_i).
    pub growth_start: f64,
}

/// Solved phase quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgPhase {
    pub growth_rate: f64,
    pub test_time: f64,
    pub initial_mtbf: f64,
    pub final_mtbf: f64,
    /// MTBF reachable if every addressed failure mode were fixed.
    pub growth_potential: f64,
}

/// Solves a growth phase for whichever of GR, MI, MF and T is unset.
///
/// Quantities are resolved in that order, each using the ones before it:
///
/// - GR = -ln(T/t_i) - 1 + √((1 + ln(T/t_i))² + 2·ln(MF/MI))
/// - MI = -t_i·MS / ln(1 - P), else MF / exp(GR·(GR/2 + ln(T/t_i) + 1))
/// - MF = MI·exp(GR·(GR/2 + ln(T/t_i) + 1))
/// - T  = t_i·exp(ln(MF/MI)/GR - GR/2 - 1)
///
/// A quantity whose whole chain fails is 0.0 and a warning is logged.
///
/// # Examples
///
/// ```
/// use u_reliability::growth::{calculate_rg_phase, RgPhaseInputs};
///
/// let phase = calculate_rg_phase(&RgPhaseInputs {
///     test_time: 1000.0,
///     initial_mtbf: 50.0,
///     growth_rate: 0.3,
///     growth_start: 100.0,
///     ..Default::default()
/// });
/// assert!(phase.final_mtbf > 50.0);
/// ```
pub fn calculate_rg_phase(inputs: &RgPhaseInputs) -> RgPhase {
    let ti = inputs.growth_start;
    let mut t = inputs.test_time;
    let mut mi = inputs.initial_mtbf;
    let mut mf = inputs.final_mtbf;

    let gr = if inputs.growth_rate != 0.0 {
        inputs.growth_rate
    } else {
        growth_rate_formula(t, ti, mi, mf).unwrap_or_else(|| unresolved("growth_rate"))
    };

    if mi <= 0.0 {
        mi = initial_from_probability(ti, inputs.management_strategy, inputs.probability)
            .or_else(|| initial_from_final(t, ti, mf, gr))
            .unwrap_or_else(|| unresolved("initial_mtbf"));
    }

    if mf <= 0.0 {
        mf = final_from_initial(t, ti, mi, gr).unwrap_or_else(|| unresolved("final_mtbf"));
    }

    if t <= 0.0 {
        t = test_time_formula(ti, mi, mf, gr).unwrap_or_else(|| unresolved("test_time"));
    }

    RgPhase {
        growth_rate: gr,
        test_time: t,
        initial_mtbf: mi,
        final_mtbf: mf,
        growth_potential: growth_potential(mi, inputs.management_strategy, inputs.fix_effectiveness),
    }
}

/// Minimum program initial MTBF.
///
/// `-t1·MS / ln(1 - P)`, else `MF / exp(GR·(GR/2 + ln(TTT/t1) + 1))`, else 0.
pub fn initial_mtbf(
    total_time: f64,
    first_phase: f64,
    mf: f64,
    growth_rate: f64,
    management_strategy: f64,
    probability: f64,
) -> f64 {
    initial_from_probability(first_phase, management_strategy, probability)
        .or_else(|| initial_from_final(total_time, first_phase, mf, growth_rate))
        .unwrap_or_else(|| unresolved("initial_mtbf"))
}

/// `MI·exp(GR·(GR/2 + ln(TTT/t1) + 1))`.
pub fn final_mtbf(total_time: f64, first_phase: f64, mi: f64, growth_rate: f64) -> f64 {
    final_from_initial(total_time, first_phase, mi, growth_rate)
        .unwrap_or_else(|| unresolved("final_mtbf"))
}

/// Minimum average growth rate to take MI to MF in `total_time`.
pub fn growth_rate(total_time: f64, first_phase: f64, mi: f64, mf: f64) -> f64 {
    growth_rate_formula(total_time, first_phase, mi, mf).unwrap_or_else(|| unresolved("growth_rate"))
}

/// Test time needed on the idealized curve, `t1·((1 - α)·MF/MI)^(1/α)`.
///
/// When MF = MI the answer is `t1`. If the curve cannot be evaluated the
/// time is estimated as `MTBF_avg · N + previous cumulative time`.
pub fn total_time(
    first_phase: f64,
    mi: f64,
    mf: f64,
    growth_rate: f64,
    average_mtbf: f64,
    failures: f64,
    cumulative_time: f64,
) -> f64 {
    if mi > 0.0 && mf / mi == 1.0 {
        return first_phase;
    }
    let idealized = if growth_rate == 0.0 {
        None
    } else {
        positive((1.0 - growth_rate) * mf / mi)
            .and_then(|base| positive(first_phase * base.powf(1.0 / growth_rate)))
    };
    idealized.unwrap_or(average_mtbf * failures + cumulative_time)
}

/// Shortest first phase that still reaches MF, `exp(ln TTT - ln((1-α)·MF/MA)/α)`.
pub fn minimum_first_phase_time(total_time: f64, mf: f64, average_mtbf: f64, growth_rate: f64) -> f64 {
    let t1 = if growth_rate == 0.0 || total_time <= 0.0 {
        None
    } else {
        positive((1.0 - growth_rate) * mf / average_mtbf)
            .and_then(|base| positive((total_time.ln() - base.ln() / growth_rate).exp()))
    };
    t1.unwrap_or_else(|| unresolved("minimum_first_phase_time"))
}

/// Management strategy needed to reach the growth potential,
/// `(1 - MI/MGP) / FEF`.
pub fn management_strategy(mi: f64, growth_potential: f64, fix_effectiveness: f64) -> f64 {
    if growth_potential == 0.0 || fix_effectiveness == 0.0 {
        return unresolved("management_strategy");
    }
    finite((1.0 - mi / growth_potential) / fix_effectiveness)
        .unwrap_or_else(|| unresolved("management_strategy"))
}

/// `1 - exp(-t1·MS / MI)`.
pub fn probability_of_observing_failure(first_phase: f64, mi: f64, management_strategy: f64) -> f64 {
    if mi <= 0.0 {
        return unresolved("probability");
    }
    1.0 - (-first_phase * management_strategy / mi).exp()
}

/// Growth potential MTBF, `MI / (1 - MS·FEF)`.
///
/// With no management strategy or no fix effectiveness nothing is fixed and
/// the potential is MI itself.
pub fn growth_potential(mi: f64, management_strategy: f64, fix_effectiveness: f64) -> f64 {
    let fixed = management_strategy * fix_effectiveness;
    if fixed == 0.0 {
        warn!(mi, "no management strategy or fix effectiveness; growth potential equals initial MTBF");
        return mi;
    }
    positive(mi / (1.0 - fixed)).unwrap_or_else(|| unresolved("growth_potential"))
}

/// Expected failures in a phase and the phase's average MTBF.
///
/// ```text
/// N_i    = t1·(T/t1)^(1-α) / MI - N_prev
/// MTBF_a = (T - T_prev) / N_i
/// ```
///
/// `mi` is the program's initial MTBF; `previous_time` and
/// `previous_failures` accumulate over the earlier phases.
pub fn average_mtbf(
    total_time: f64,
    first_phase: f64,
    mi: f64,
    growth_rate: f64,
    previous_time: f64,
    previous_failures: f64,
) -> (f64, f64) {
    let cumulative = divide_or_zero(
        first_phase * (total_time / first_phase).powf(1.0 - growth_rate),
        mi,
        "growth plan",
        "initial_mtbf",
    );
    let failures = cumulative - previous_failures;
    let mtbf = divide_or_zero(total_time - previous_time, failures, "growth plan", "expected_failures");
    (failures, mtbf)
}

/// Growth rate α that puts the idealized curve at `mf` after `total_time`:
/// the root of `(T/t1)^α + (MF/MI)·(α - 1) = 0`, by Newton's method from
/// α = 0.01.
fn idealized_growth_rate(mi: f64, mf: f64, total_time: f64, first_phase: f64) -> Option<f64> {
    let ratio = positive(total_time / first_phase)?;
    let growth = positive(mf / mi)?;
    let ln_ratio = ratio.ln();

    let mut alpha = 0.01_f64;
    for _ in 0..100 {
        let p = ratio.powf(alpha);
        let f = p + growth * (alpha - 1.0);
        let df = ln_ratio * p + growth;
        if df == 0.0 || !df.is_finite() {
            return None;
        }
        let step = f / df;
        alpha -= step;
        if step.abs() < 1e-12 {
            return finite(alpha);
        }
    }
    tracing::debug!(alpha, "idealized growth rate did not converge");
    None
}

/// One phase of a multi-phase growth plan.
///
/// As input, 0.0 marks a quantity to be planned. At most three of the
/// phase's end time, first-phase length, program MI, final MTBF, growth
/// rate, expected failures and average MTBF may be unset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GrowthPhase {
    pub test_units: u32,
    /// Cumulative test time when the phase starts.
    pub start_time: f64,
    /// Cumulative test time when the phase ends.
    pub end_time: f64,
    pub growth_rate: f64,
    /// Planned failures in the phase (whole failures).
    pub expected_failures: f64,
    pub average_mtbf: f64,
    pub initial_mtbf: f64,
    pub final_mtbf: f64,
}

/// Plans each phase along the idealized growth curve.
///
/// The first phase length is the first phase's end time if given, otherwise
/// `growth_start`. Phase i starts where phase i-1 ended and its initial
/// MTBF is phase i-1's final MTBF (the first phase starts at
/// `program_initial_mtbf`).
///
/// # Errors
/// - [`PlanningError::FirstPhaseTooShort`] when the first phase ends before
///   `growth_start`.
/// - [`PlanningError::Underdetermined`] for a phase with more than three
///   unset quantities.
/// - [`PlanningError::DecreasingTestTime`] when a phase ends before the one
///   preceding it.
pub fn planned_growth_curve(
    phases: &[GrowthPhase],
    growth_start: f64,
    program_initial_mtbf: f64,
) -> Result<Vec<GrowthPhase>, PlanningError> {
    let first_end = phases.first().map_or(0.0, |p| p.end_time);
    let t1 = if first_end <= 0.0 {
        growth_start
    } else if first_end < growth_start {
        return Err(PlanningError::FirstPhaseTooShort {
            first_phase: first_end,
            growth_start,
        });
    } else {
        first_end
    };

    let mut planned = Vec::with_capacity(phases.len());
    let mut phase_mi = program_initial_mtbf;
    let mut previous_time = 0.0;
    let mut cumulative_failures = 0.0;

    for (index, phase) in phases.iter().enumerate() {
        let number = index + 1;
        let missing = [
            phase.end_time,
            t1,
            program_initial_mtbf,
            phase.final_mtbf,
            phase.growth_rate,
            phase.expected_failures,
            phase.average_mtbf,
        ]
        .iter()
        .filter(|&&v| v == 0.0)
        .count();
        if missing > 3 {
            return Err(PlanningError::Underdetermined {
                phase: number,
                missing,
            });
        }

        let end_time = if phase.end_time > 0.0 {
            phase.end_time
        } else {
            total_time(
                t1,
                phase_mi,
                phase.final_mtbf,
                phase.growth_rate,
                phase.average_mtbf,
                phase.expected_failures,
                previous_time,
            )
        };
        if end_time < previous_time {
            return Err(PlanningError::DecreasingTestTime {
                phase: number,
                time: end_time,
                previous: previous_time,
            });
        }

        let growth_rate = if phase.growth_rate > 0.0 {
            phase.growth_rate
        } else {
            idealized_growth_rate(phase_mi, phase.final_mtbf, end_time, t1)
                .unwrap_or_else(|| unresolved("growth_rate"))
        };

        let final_mtbf = if phase.final_mtbf > 0.0 {
            phase.final_mtbf
        } else {
            final_mtbf(end_time, t1, phase_mi, growth_rate)
        };

        let (failures, average) = average_mtbf(
            end_time,
            t1,
            program_initial_mtbf,
            growth_rate,
            previous_time,
            cumulative_failures,
        );

        planned.push(GrowthPhase {
            test_units: phase.test_units,
            start_time: previous_time,
            end_time,
            growth_rate,
            expected_failures: failures.ceil(),
            average_mtbf: if phase.average_mtbf > 0.0 {
                phase.average_mtbf
            } else {
                average
            },
            initial_mtbf: phase_mi,
            final_mtbf,
        });

        tracing::debug!(phase = number, end_time, growth_rate, final_mtbf, "planned growth phase");
        previous_time = end_time;
        cumulative_failures += failures;
        phase_mi = final_mtbf;
    }

    Ok(planned)
}

/// Whether a curve is expressed as MTBF or as failure intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurveMetric {
    #[default]
    Mtbf,
    FailureIntensity,
}

impl CurveMetric {
    fn express(self, mtbf: f64) -> f64 {
        match self {
            Self::Mtbf => mtbf,
            Self::FailureIntensity => divide_or_zero(1.0, mtbf, "growth curve", "mtbf"),
        }
    }
}

/// Longest curve the sampling functions produce; later test time is cut.
pub const MAX_CURVE_POINTS: usize = 100_000;

fn curve_points(total_time: f64) -> usize {
    let steps = total_time.max(0.0) as usize;
    if steps > MAX_CURVE_POINTS {
        warn!(total_time, max = MAX_CURVE_POINTS, "growth curve truncated");
    }
    steps.min(MAX_CURVE_POINTS)
}

/// Idealized growth curve sampled at each whole unit of test time
/// `0, 1, ..., ⌊total_time⌋ - 1`, at most [`MAX_CURVE_POINTS`] values.
///
/// Before the growth start the value is MI; at the growth start the curve
/// jumps, marked by `None`; afterwards it is `MI·(t/t_i)^α/(1-α)` with α
/// chosen so the curve reaches MF at `total_time`. Returns an empty curve
/// (and logs) when α cannot be solved.
pub fn idealized_curve(
    total_time: f64,
    growth_start: f64,
    mi: f64,
    mf: f64,
    metric: CurveMetric,
) -> Vec<Option<f64>> {
    let Some(alpha) = idealized_growth_rate(mi, mf, total_time, growth_start) else {
        unresolved("idealized_growth_rate");
        return Vec::new();
    };

    let jump = growth_start.trunc();
    (0..curve_points(total_time))
        .map(|i| {
            let t = i as f64;
            if t < jump {
                Some(metric.express(mi))
            } else if t == jump {
                None
            } else {
                Some(metric.express(mi * (t / growth_start).powf(alpha) / (1.0 - alpha)))
            }
        })
        .collect()
}

/// Flat planned curve at the phase's average MTBF, one value per whole unit
/// of test time, terminated by `None` to break the line between phases.
pub fn planned_curve(total_time: f64, average_mtbf: f64, metric: CurveMetric) -> Vec<Option<f64>> {
    let value = metric.express(average_mtbf);
    let steps = curve_points(total_time.ceil() - 1.0);
    let mut values = vec![Some(value); steps];
    values.push(None);
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward() -> RgPhaseInputs {
        RgPhaseInputs {
            test_time: 1000.0,
            initial_mtbf: 50.0,
            growth_rate: 0.3,
            growth_start: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_final_mtbf_forward() {
        let phase = calculate_rg_phase(&forward());
        let expected = 50.0 * (0.3 * (0.15 + 10f64.ln() + 1.0)).exp();
        assert!((phase.final_mtbf - expected).abs() < 1e-9, "MF = {}", phase.final_mtbf);
        assert_eq!(phase.test_time, 1000.0);
    }

    #[test]
    fn test_each_quantity_round_trips() {
        let full = calculate_rg_phase(&forward());
        let base = RgPhaseInputs {
            test_time: full.test_time,
            initial_mtbf: full.initial_mtbf,
            final_mtbf: full.final_mtbf,
            growth_rate: full.growth_rate,
            growth_start: 100.0,
            ..Default::default()
        };

        let gr = calculate_rg_phase(&RgPhaseInputs { growth_rate: 0.0, ..base });
        assert!((gr.growth_rate - 0.3).abs() < 1e-9, "GR = {}", gr.growth_rate);

        let mi = calculate_rg_phase(&RgPhaseInputs { initial_mtbf: 0.0, ..base });
        assert!((mi.initial_mtbf - 50.0).abs() < 1e-9, "MI = {}", mi.initial_mtbf);

        let mf = calculate_rg_phase(&RgPhaseInputs { final_mtbf: 0.0, ..base });
        assert!((mf.final_mtbf - full.final_mtbf).abs() < 1e-9);

        let t = calculate_rg_phase(&RgPhaseInputs { test_time: 0.0, ..base });
        assert!((t.test_time - 1000.0).abs() < 1e-6, "T = {}", t.test_time);
    }

    #[test]
    fn test_initial_mtbf_prefers_probability_formula() {
        let phase = calculate_rg_phase(&RgPhaseInputs {
            test_time: 1000.0,
            final_mtbf: 200.0,
            growth_rate: 0.3,
            management_strategy: 0.95,
            probability: 0.5,
            growth_start: 100.0,
            ..Default::default()
        });
        let expected = -100.0 * 0.95 / 0.5f64.ln();
        assert!((phase.initial_mtbf - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unresolvable_quantities_are_zero() {
        let phase = calculate_rg_phase(&RgPhaseInputs::default());
        assert_eq!(phase.growth_rate, 0.0);
        assert_eq!(phase.initial_mtbf, 0.0);
        assert_eq!(phase.final_mtbf, 0.0);
        assert_eq!(phase.test_time, 0.0);
    }

    #[test]
    fn test_growth_potential_and_management_strategy_invert() {
        let mgp = growth_potential(50.0, 0.95, 0.7);
        assert!((mgp - 50.0 / (1.0 - 0.665)).abs() < 1e-9);
        assert!((management_strategy(50.0, mgp, 0.7) - 0.95).abs() < 1e-12);
        assert_eq!(growth_potential(50.0, 0.0, 0.7), 50.0);
        assert_eq!(growth_potential(50.0, 1.0, 1.0), 0.0);
        assert_eq!(management_strategy(50.0, mgp, 0.0), 0.0);
    }

    #[test]
    fn test_probability_and_initial_mtbf_invert() {
        let p = probability_of_observing_failure(100.0, 50.0, 0.95);
        assert!((p - (1.0 - (-1.9f64).exp())).abs() < 1e-12);
        let mi = initial_mtbf(2000.0, 100.0, 300.0, 0.3, 0.95, p);
        assert!((mi - 50.0).abs() < 1e-9, "MI = {mi}");
        assert_eq!(probability_of_observing_failure(100.0, 0.0, 0.95), 0.0);
    }

    #[test]
    fn test_program_growth_rate_and_final_mtbf_invert() {
        let mf = final_mtbf(5000.0, 500.0, 40.0, 0.25);
        let gr = growth_rate(5000.0, 500.0, 40.0, mf);
        assert!((gr - 0.25).abs() < 1e-9, "GR = {gr}");
        assert_eq!(growth_rate(5000.0, 0.0, 40.0, mf), 0.0);
    }

    #[test]
    fn test_total_time_and_minimum_first_phase_invert() {
        let t = total_time(500.0, 40.0, 120.0, 0.3, 0.0, 0.0, 0.0);
        let expected = 500.0 * (0.7 * 3.0f64).powf(1.0 / 0.3);
        assert!((t - expected).abs() / expected < 1e-12);
        let t1 = minimum_first_phase_time(t, 120.0, 40.0, 0.3);
        assert!((t1 - 500.0).abs() < 1e-6, "t1 = {t1}");

        assert_eq!(total_time(500.0, 40.0, 40.0, 0.3, 0.0, 0.0, 0.0), 500.0);
        // Falls back to MTBF_avg · N + previous time.
        assert_eq!(total_time(500.0, 40.0, 120.0, 0.0, 60.0, 10.0, 300.0), 900.0);
    }

    #[test]
    fn test_average_mtbf_first_phase() {
        let (n, mtbfa) = average_mtbf(500.0, 500.0, 50.0, 0.375, 0.0, 0.0);
        assert!((n - 10.0).abs() < 1e-12);
        assert!((mtbfa - 50.0).abs() < 1e-12);
    }

    fn plan_input() -> Vec<GrowthPhase> {
        vec![
            GrowthPhase {
                end_time: 500.0,
                final_mtbf: 80.0,
                ..Default::default()
            },
            GrowthPhase {
                end_time: 1200.0,
                final_mtbf: 120.0,
                ..Default::default()
            },
            GrowthPhase {
                end_time: 2000.0,
                final_mtbf: 150.0,
                test_units: 4,
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_planned_growth_curve_chains_phases() {
        let plan = planned_growth_curve(&plan_input(), 100.0, 50.0).unwrap();
        assert_eq!(plan.len(), 3);

        assert!((plan[0].growth_rate - 0.375).abs() < 1e-9, "GR1 = {}", plan[0].growth_rate);
        assert_eq!(plan[0].expected_failures, 10.0);
        assert!((plan[0].average_mtbf - 50.0).abs() < 1e-9);
        assert_eq!(plan[0].initial_mtbf, 50.0);

        for pair in plan.windows(2) {
            assert_eq!(pair[1].initial_mtbf, pair[0].final_mtbf);
            assert_eq!(pair[1].start_time, pair[0].end_time);
        }
        for phase in &plan {
            // Growth rate solves (T/t1)^α + (MF/MI)(α - 1) = 0.
            let residual = (phase.end_time / 500.0).powf(phase.growth_rate)
                + phase.final_mtbf / phase.initial_mtbf * (phase.growth_rate - 1.0);
            assert!(residual.abs() < 1e-9, "residual {residual}");
            assert_eq!(phase.expected_failures, phase.expected_failures.round());
        }
        assert_eq!(plan[2].test_units, 4);
    }

    #[test]
    fn test_planned_growth_curve_errors() {
        let mut phases = plan_input();
        phases[0].end_time = 50.0;
        assert_eq!(
            planned_growth_curve(&phases, 100.0, 50.0),
            Err(PlanningError::FirstPhaseTooShort {
                first_phase: 50.0,
                growth_start: 100.0
            })
        );

        let mut phases = plan_input();
        phases[1].final_mtbf = 0.0;
        assert_eq!(
            planned_growth_curve(&phases, 100.0, 50.0),
            Err(PlanningError::Underdetermined {
                phase: 2,
                missing: 4
            })
        );

        let mut phases = plan_input();
        phases[1].end_time = 400.0;
        assert!(matches!(
            planned_growth_curve(&phases, 100.0, 50.0),
            Err(PlanningError::DecreasingTestTime { phase: 2, .. })
        ));
    }

    #[test]
    fn test_idealized_curve_shape() {
        let curve = idealized_curve(1000.0, 100.0, 50.0, 150.0, CurveMetric::Mtbf);
        assert_eq!(curve.len(), 1000);
        assert_eq!(curve[0], Some(50.0));
        assert_eq!(curve[99], Some(50.0));
        assert_eq!(curve[100], None);
        let last = curve[999].unwrap();
        assert!(last < 150.0 && last > 149.0, "last = {last}");
        assert!(curve[200].unwrap() < curve[500].unwrap());

        let intensity = idealized_curve(1000.0, 100.0, 50.0, 150.0, CurveMetric::FailureIntensity);
        assert!((intensity[500].unwrap() * curve[500].unwrap() - 1.0).abs() < 1e-12);

        assert!(idealized_curve(1000.0, 0.0, 50.0, 150.0, CurveMetric::Mtbf).is_empty());
    }

    #[test]
    fn test_planned_curve_is_flat_then_breaks() {
        let curve = planned_curve(5.0, 40.0, CurveMetric::FailureIntensity);
        assert_eq!(curve.len(), 5);
        assert!(curve[..4].iter().all(|v| *v == Some(0.025)));
        assert_eq!(curve[4], None);
    }

    #[test]
    fn test_zero_mtbf_intensity_is_zero() {
        let curve = planned_curve(3.0, 0.0, CurveMetric::FailureIntensity);
        assert_eq!(curve, vec![Some(0.0), Some(0.0), None]);
    }

    #[test]
    fn test_long_test_time_is_capped() {
        let curve = idealized_curve(1.0e12, 100.0, 50.0, 150.0, CurveMetric::Mtbf);
        assert_eq!(curve.len(), MAX_CURVE_POINTS);
        assert_eq!(curve[100], None);

        let planned = planned_curve(f64::INFINITY, 40.0, CurveMetric::Mtbf);
        assert_eq!(planned.len(), MAX_CURVE_POINTS + 1);
        assert_eq!(planned.last(), Some(&None));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn solved_phase_reproduces_forward_inputs(
            gr in 0.05_f64..0.6,
            ratio in 1.5_f64..100.0,
            mi in 1.0_f64..1000.0,
        ) {
            let growth_start = 100.0;
            let test_time = growth_start * ratio;
            let full = calculate_rg_phase(&RgPhaseInputs {
                test_time,
                initial_mtbf: mi,
                growth_rate: gr,
                growth_start,
                ..Default::default()
            });
            prop_assert!(full.final_mtbf > mi);

            let base = RgPhaseInputs {
                test_time,
                initial_mtbf: mi,
                final_mtbf: full.final_mtbf,
                growth_rate: gr,
                growth_start,
                ..Default::default()
            };
            let solved_gr = calculate_rg_phase(&RgPhaseInputs { growth_rate: 0.0, ..base });
            prop_assert!((solved_gr.growth_rate - gr).abs() < 1e-8 * gr.max(1.0));

            let solved_t = calculate_rg_phase(&RgPhaseInputs { test_time: 0.0, ..base });
            prop_assert!(((solved_t.test_time - test_time) / test_time).abs() < 1e-8);

            let solved_mi = calculate_rg_phase(&RgPhaseInputs { initial_mtbf: 0.0, ..base });
            prop_assert!(((solved_mi.initial_mtbf - mi) / mi).abs() < 1e-8);
        }
    }
}
