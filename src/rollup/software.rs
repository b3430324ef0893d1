//! Software reliability prediction figure of merit (RPFOM).
//!
//! A CSCI's RPFOM is its application fault density Ao times the
//! development environment factor Do, refined by the S1 = SA·ST·SQ
//! (anomaly management, traceability, quality) and S2 = SL·SX·SM·SR
//! (language, complexity, modularity, standards review) groups as the
//! development phase advances:
//!
//! | Phase | RPFOM |
//! |---|---|
//! | 1 (requirements) | Ao·Do |
//! | 2 to 4 (design) | Ao·Do·S1 |
//! | 5 (coding and test) | Ao·Do·S1·S2 |
//!
//! The checklist answers and unit statistics behind the sub-factors live
//! in the caller's store and are read through [`AggregateQuery`].
//!
//! # Reference
//! Rome Laboratory (1992). *Software Reliability, Measurement, and Testing
//! Guidebook*, RL-TR-92-52.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ModelError;
use crate::guard::divide_or;
use crate::prediction::table::lookup;

/// Application fault density (faults per line of code) by application type.
const FAULT_DENSITY: [f64; 6] = [0.0128, 0.0092, 0.0078, 0.0018, 0.0085, 0.0123];

/// Basic development factor: embedded, semi-detached, organic.
const BASIC_DO: [f64; 3] = [0.76, 1.0, 1.3];

/// Number of development-environment checklist questions.
const DEVELOPMENT_QUESTIONS: f64 = 43.0;

/// Quantity read from the caller's store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoftwareMetric {
    /// Development environment checklist answered yes.
    DevelopmentYes,
    AnomalyManagementYes,
    AnomalyManagementNo,
    /// Traceability item TC11 (all requirements traced to design).
    TraceabilityTc11,
    /// Traceability item TC12 (all design traced to code).
    TraceabilityTc12,
    QualityYes,
    QualityNo,
    StandardsYes,
    StandardsNo,
    AssemblyLines,
    HigherOrderLines,
    SourceLines,
    /// Units making up the module.
    Units,
    /// Units with complexity above 20.
    UnitsHighComplexity,
    /// Units with complexity below 7.
    UnitsLowComplexity,
    /// Units with fewer than 200 executable lines.
    UnitsSmall,
    /// Units with more than 3000 executable lines.
    UnitsLarge,
    TestMethodsRecommended,
    TestMethodsUsed,
}

/// Row filter for an aggregate query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateFilter {
    pub software_id: i64,
    /// `None` selects every phase.
    pub phase_id: Option<usize>,
}

/// SUM/COUNT access to the rows behind the software sub-factors.
///
/// Returning `None` means no matching rows; the sub-factor then falls back
/// to its documented default.
pub trait AggregateQuery {
    fn sum(&self, metric: SoftwareMetric, filter: AggregateFilter) -> Option<f64>;
    fn count(&self, metric: SoftwareMetric, filter: AggregateFilter) -> Option<u64>;
}

/// Position of a node in the software hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SoftwareLevel {
    #[default]
    System,
    /// Computer software configuration item.
    Csci,
    Unit,
}

/// Test effort versus development effort, in hours, budget or schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestEffort {
    pub test: f64,
    pub development: f64,
}

/// One software module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftwareNode {
    pub id: i64,
    pub level: SoftwareLevel,
    /// Development phase, 1 (requirements) to 5 (coding and test).
    pub phase_id: usize,
    /// Application type, 1-based index into the fault-density table.
    pub application_id: usize,
    /// Development environment: 1 embedded, 2 semi-detached, 3 organic.
    pub development_id: usize,
    /// Use the development checklist instead of the basic Do table.
    pub detailed_development: bool,
    pub test_effort: Option<TestEffort>,
    pub modules_tested: f64,
    pub interfaces_tested: f64,
    pub interfaces_total: f64,
    /// Total execution time.
    pub execution_time: f64,
    /// Operating-system overhead time.
    pub overhead_time: f64,
    /// Workload (execution) coefficient.
    pub workload: f64,
    /// Execution times of the failures recorded during test.
    pub incident_times: Vec<f64>,
    pub children: Vec<SoftwareNode>,
}

/// Failure-rate figures from the test incidents of a phase-5 CSCI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TestIncidentFigures {
    /// Average failure rate during test.
    pub ft1: f64,
    /// Failure rate at end of test.
    pub ft2: f64,
    pub ren_avg: f64,
    pub ren_eot: f64,
    /// Workload transformation.
    pub ew: f64,
    /// Variability transformation.
    pub ev: f64,
    pub e: f64,
    /// Predicted operational failure rate.
    pub f: f64,
}

/// Every sub-factor of one CSCI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CsciFactors {
    pub ao: f64,
    pub de: f64,
    pub dc: f64,
    pub d0: f64,
    pub am: f64,
    pub sa: f64,
    pub st: f64,
    pub dr: f64,
    pub sq: f64,
    pub s1: f64,
    pub aloc: f64,
    pub hloc: f64,
    pub sloc: f64,
    pub sl: f64,
    pub nm: u64,
    pub ax: u64,
    pub bx: u64,
    pub cx: u64,
    pub sx: f64,
    pub um: u64,
    pub wm: u64,
    pub xm: u64,
    pub sm: f64,
    pub df: f64,
    pub sr: f64,
    pub s2: f64,
    pub te: f64,
    pub tt: f64,
    pub tu: f64,
    pub tm: f64,
    pub tc: f64,
    pub t0: f64,
    pub t1: f64,
    pub t2: f64,
    pub incidents: Option<TestIncidentFigures>,
}

/// RPFOM of a node, with the factors when the node is a CSCI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftwareResult {
    pub id: i64,
    pub rpfom: f64,
    pub factors: Option<CsciFactors>,
    pub children: Vec<SoftwareResult>,
}

/// Calculates the RPFOM of a software tree.
///
/// A CSCI's RPFOM comes from its own factors even when it has units below
/// it; any other parent sums its children. Leaves that are not CSCIs have
/// an RPFOM of zero.
pub fn calculate_software(
    node: &SoftwareNode,
    query: &dyn AggregateQuery,
) -> Result<SoftwareResult, ModelError> {
    let children = node
        .children
        .iter()
        .map(|c| calculate_software(c, query))
        .collect::<Result<Vec<_>, _>>()?;

    let (rpfom, factors) = if node.level == SoftwareLevel::Csci {
        let factors = csci_factors(node, query)?;
        (rpfom(node.phase_id, &factors), Some(factors))
    } else {
        (children.iter().map(|c| c.rpfom).sum(), None)
    };

    Ok(SoftwareResult {
        id: node.id,
        rpfom,
        factors,
        children,
    })
}

fn rpfom(phase: usize, f: &CsciFactors) -> f64 {
    match phase {
        1 => f.ao * f.d0,
        2..=4 => f.ao * f.d0 * f.s1,
        5 => f.ao * f.d0 * f.s1 * f.s2,
        _ => 0.0,
    }
}

fn node_name(node: &SoftwareNode) -> String {
    format!("software {}", node.id)
}

/// Ratio of "no" answers to all answers.
fn no_fraction(
    query: &dyn AggregateQuery,
    yes: SoftwareMetric,
    no: SoftwareMetric,
    filter: AggregateFilter,
    fallback: f64,
    name: &str,
    field: &str,
) -> f64 {
    match (query.sum(yes, filter), query.sum(no, filter)) {
        (Some(y), Some(n)) => divide_or(n, y + n, fallback, name, field),
        _ => fallback,
    }
}

fn csci_factors(node: &SoftwareNode, query: &dyn AggregateQuery) -> Result<CsciFactors, ModelError> {
    let name = node_name(node);
    let by_phase = AggregateFilter {
        software_id: node.id,
        phase_id: Some(node.phase_id),
    };
    let all_phases = AggregateFilter {
        software_id: node.id,
        phase_id: None,
    };
    let mut f = CsciFactors {
        ao: lookup(&FAULT_DENSITY, node.application_id, &name, "application_id")?,
        ..CsciFactors::default()
    };

    // Development environment.
    if node.detailed_development {
        f.de = query
            .sum(SoftwareMetric::DevelopmentYes, all_phases)
            .unwrap_or(0.0);
        f.dc = 1.0 - f.de / DEVELOPMENT_QUESTIONS;
        f.d0 = match node.development_id {
            1 => (0.109 * f.dc - 0.04) / 0.014,
            2 => (0.008 * f.dc + 0.009) / 0.013,
            3 => (0.018 * f.dc - 0.003) / 0.008,
            other => return Err(ModelError::data_range(&name, "development_id", other as i64)),
        };
    } else {
        f.d0 = lookup(&BASIC_DO, node.development_id, &name, "development_id")?;
    }

    // S1.
    f.am = no_fraction(
        query,
        SoftwareMetric::AnomalyManagementYes,
        SoftwareMetric::AnomalyManagementNo,
        by_phase,
        1.0,
        &name,
        "anomaly_management",
    );
    f.sa = if f.am < 0.4 {
        0.9
    } else if f.am <= 0.6 {
        1.0
    } else {
        1.1
    };
    let tc11 = query.sum(SoftwareMetric::TraceabilityTc11, by_phase) == Some(1.0);
    let tc12 = query.sum(SoftwareMetric::TraceabilityTc12, by_phase) == Some(1.0);
    f.st = match node.phase_id {
        2 | 3 if tc11 => 1.0,
        4 if tc11 && tc12 => 1.0,
        _ => 1.1,
    };
    f.dr = no_fraction(
        query,
        SoftwareMetric::QualityYes,
        SoftwareMetric::QualityNo,
        by_phase,
        0.0,
        &name,
        "software_quality",
    );
    f.sq = if f.dr > 0.5 { 1.0 } else { 1.1 };
    f.s1 = f.sa * f.st * f.sq;

    // S2.
    let sum = |m| query.sum(m, all_phases).unwrap_or(0.0);
    let count = |m| query.count(m, all_phases).unwrap_or(0);
    f.aloc = sum(SoftwareMetric::AssemblyLines);
    f.hloc = sum(SoftwareMetric::HigherOrderLines);
    f.sloc = sum(SoftwareMetric::SourceLines);
    f.sl = if f.sloc == 0.0 {
        warn!(node = %name, "no source lines; SL defaults to 1");
        1.0
    } else {
        f.hloc / f.sloc + 1.4 * f.aloc / f.sloc
    };

    f.nm = count(SoftwareMetric::Units);
    f.ax = count(SoftwareMetric::UnitsHighComplexity);
    f.cx = count(SoftwareMetric::UnitsLowComplexity);
    f.bx = f.nm.saturating_sub(f.ax + f.cx);
    f.sx = divide_or(
        1.5 * f.ax as f64 + f.bx as f64 + 0.8 * f.cx as f64,
        f.nm as f64,
        1.0,
        &name,
        "units",
    );
    f.um = count(SoftwareMetric::UnitsSmall);
    f.xm = count(SoftwareMetric::UnitsLarge);
    f.wm = f.nm.saturating_sub(f.um + f.xm);
    f.sm = divide_or(
        0.9 * f.um as f64 + f.wm as f64 + 2.0 * f.xm as f64,
        f.nm as f64,
        1.0,
        &name,
        "units",
    );
    f.df = no_fraction(
        query,
        SoftwareMetric::StandardsYes,
        SoftwareMetric::StandardsNo,
        by_phase,
        0.0,
        &name,
        "standards_review",
    );
    f.sr = if f.df >= 0.5 {
        1.5
    } else if f.df >= 0.25 {
        1.0
    } else {
        0.75
    };
    f.s2 = f.sl * f.sx * f.sm * f.sr;

    // Test program.
    let at = match node.test_effort {
        Some(effort) => 0.4 * divide_or(effort.development, effort.test, 1.0 / 0.4, &name, "test_effort"),
        None => 0.4,
    };
    f.te = if at < 1.0 { 0.9 } else { 1.0 };

    f.tt = match query.sum(SoftwareMetric::TestMethodsRecommended, all_phases) {
        Some(tt) if tt > 0.0 => tt,
        _ => 1.0,
    };
    f.tu = query
        .sum(SoftwareMetric::TestMethodsUsed, all_phases)
        .unwrap_or(0.0);
    let used = f.tu / f.tt;
    f.tm = if used > 0.75 {
        0.9
    } else if used > 0.5 {
        1.0
    } else {
        1.1
    };

    let coverage = divide_or(node.modules_tested, f.nm as f64, f64::NAN, &name, "units")
        + divide_or(node.interfaces_tested, node.interfaces_total, f64::NAN, &name, "interfaces_total");
    f.tc = if coverage.is_finite() && coverage != 0.0 {
        2.0 / coverage
    } else {
        1.0
    };
    f.t0 = f.te * f.tm * f.tc;
    f.t1 = 0.02 * f.t0;
    f.t2 = 0.14 * f.t0;

    if node.phase_id == 5 {
        f.incidents = Some(incident_figures(node, &f, &name));
    }
    Ok(f)
}

fn incident_figures(node: &SoftwareNode, f: &CsciFactors, name: &str) -> TestIncidentFigures {
    let times = &node.incident_times;
    let max_time = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let ft1 = if times.is_empty() {
        1.0
    } else {
        divide_or(times.len() as f64, max_time, 1.0, name, "execution_time")
    };

    // End-of-test rate over the span of the four latest distinct times.
    let mut distinct: Vec<f64> = times.clone();
    distinct.sort_by(|a, b| b.total_cmp(a));
    distinct.dedup();
    let ft2 = match (distinct.first(), distinct.get(3)) {
        (Some(&latest), Some(&fourth)) => {
            let n = times.iter().filter(|&&t| t >= fourth && t <= latest).count();
            divide_or(n as f64, latest - fourth, 1.0, name, "execution_time")
        }
        _ => 1.0,
    };

    let ew = divide_or(
        node.execution_time,
        node.execution_time - node.overhead_time,
        0.0,
        name,
        "execution_time",
    );
    let ev = 0.1 + 4.5 * node.workload;
    let e = ew * ev;
    TestIncidentFigures {
        ft1,
        ft2,
        ren_avg: ft1 * f.t1,
        ren_eot: ft2 * f.t2,
        ew,
        ev,
        e,
        f: ft2 * 0.14 * e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Store {
        sums: HashMap<(SoftwareMetric, Option<usize>), f64>,
        counts: HashMap<SoftwareMetric, u64>,
    }

    impl AggregateQuery for Store {
        fn sum(&self, metric: SoftwareMetric, filter: AggregateFilter) -> Option<f64> {
            self.sums.get(&(metric, filter.phase_id)).copied()
        }

        fn count(&self, metric: SoftwareMetric, _filter: AggregateFilter) -> Option<u64> {
            self.counts.get(&metric).copied()
        }
    }

    fn csci(phase: usize) -> SoftwareNode {
        SoftwareNode {
            id: 7,
            level: SoftwareLevel::Csci,
            phase_id: phase,
            application_id: 1,
            development_id: 2,
            ..SoftwareNode::default()
        }
    }

    #[test]
    fn test_requirements_phase_is_ao_do() {
        let r = calculate_software(&csci(1), &Store::default()).unwrap();
        assert!((r.rpfom - 0.0128).abs() < 1e-15, "rpfom = {}", r.rpfom);
    }

    #[test]
    fn test_design_phase_defaults() {
        // No answers: AM = 1 (SA 1.1), ST 1.1, DR = 0 (SQ 1.1).
        let r = calculate_software(&csci(3), &Store::default()).unwrap();
        let f = r.factors.unwrap();
        assert_eq!(f.am, 1.0);
        assert_eq!(f.dr, 0.0);
        assert!((r.rpfom - 0.0128 * 1.1 * 1.1 * 1.1).abs() < 1e-15);
    }

    #[test]
    fn test_design_phase_with_answers() {
        let mut store = Store::default();
        store.sums.insert((SoftwareMetric::AnomalyManagementYes, Some(2)), 5.0);
        store.sums.insert((SoftwareMetric::AnomalyManagementNo, Some(2)), 5.0);
        store.sums.insert((SoftwareMetric::TraceabilityTc11, Some(2)), 1.0);
        store.sums.insert((SoftwareMetric::QualityYes, Some(2)), 2.0);
        store.sums.insert((SoftwareMetric::QualityNo, Some(2)), 8.0);
        let r = calculate_software(&csci(2), &store).unwrap();
        let f = r.factors.unwrap();
        assert_eq!((f.sa, f.st, f.sq), (1.0, 1.0, 1.0));
        assert!((r.rpfom - 0.0128).abs() < 1e-15);
    }

    #[test]
    fn test_coding_phase_s2() {
        let mut store = Store::default();
        store.sums.insert((SoftwareMetric::HigherOrderLines, None), 800.0);
        store.sums.insert((SoftwareMetric::AssemblyLines, None), 200.0);
        store.sums.insert((SoftwareMetric::SourceLines, None), 1000.0);
        store.counts.insert(SoftwareMetric::Units, 10);
        store.counts.insert(SoftwareMetric::UnitsHighComplexity, 2);
        store.counts.insert(SoftwareMetric::UnitsLowComplexity, 4);
        store.counts.insert(SoftwareMetric::UnitsSmall, 5);
        store.counts.insert(SoftwareMetric::UnitsLarge, 1);
        let r = calculate_software(&csci(5), &store).unwrap();
        let f = r.factors.unwrap();

        assert!((f.sl - (0.8 + 1.4 * 0.2)).abs() < 1e-12);
        assert_eq!(f.bx, 4);
        assert!((f.sx - (3.0 + 4.0 + 3.2) / 10.0).abs() < 1e-12);
        assert_eq!(f.wm, 4);
        assert!((f.sm - (4.5 + 4.0 + 2.0) / 10.0).abs() < 1e-12);
        assert_eq!(f.sr, 0.75);
        let expected = 0.0128 * 1.1 * 1.1 * 1.1 * f.sl * f.sx * f.sm * 0.75;
        assert!((r.rpfom - expected).abs() < 1e-15);
        assert!(f.incidents.is_some());
    }

    #[test]
    fn test_detailed_development_factor() {
        let mut node = csci(1);
        node.detailed_development = true;
        node.development_id = 1;
        let mut store = Store::default();
        store.sums.insert((SoftwareMetric::DevelopmentYes, None), 21.5);
        let f = calculate_software(&node, &store).unwrap().factors.unwrap();
        assert!((f.dc - 0.5).abs() < 1e-12);
        assert!((f.d0 - (0.109 * 0.5 - 0.04) / 0.014).abs() < 1e-12);
    }

    #[test]
    fn test_test_factors() {
        let mut node = csci(4);
        node.test_effort = Some(TestEffort {
            test: 100.0,
            development: 200.0,
        });
        node.modules_tested = 5.0;
        node.interfaces_tested = 2.0;
        node.interfaces_total = 4.0;
        let mut store = Store::default();
        store.counts.insert(SoftwareMetric::Units, 10);
        store.sums.insert((SoftwareMetric::TestMethodsRecommended, None), 4.0);
        store.sums.insert((SoftwareMetric::TestMethodsUsed, None), 4.0);
        let f = calculate_software(&node, &store).unwrap().factors.unwrap();
        assert_eq!(f.te, 0.9);
        assert_eq!(f.tm, 0.9);
        assert!((f.tc - 2.0).abs() < 1e-12);
        assert!((f.t0 - 0.9 * 0.9 * 2.0).abs() < 1e-12);
        assert!((f.t2 - 0.14 * f.t0).abs() < 1e-15);
    }

    #[test]
    fn test_incident_figures() {
        let mut node = csci(5);
        node.incident_times = vec![10.0, 20.0, 30.0, 40.0, 50.0, 50.0];
        node.execution_time = 100.0;
        node.overhead_time = 20.0;
        node.workload = 0.2;
        let f = calculate_software(&node, &Store::default())
            .unwrap()
            .factors
            .unwrap();
        let inc = f.incidents.unwrap();
        assert!((inc.ft1 - 6.0 / 50.0).abs() < 1e-12);
        // Times 20..=50 hold five incidents over 30 time units.
        assert!((inc.ft2 - 5.0 / 30.0).abs() < 1e-12);
        assert!((inc.ew - 1.25).abs() < 1e-12);
        assert!((inc.ev - 1.0).abs() < 1e-12);
        assert!((inc.f - inc.ft2 * 0.14 * 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_system_sums_cscis() {
        let system = SoftwareNode {
            id: 1,
            children: vec![csci(1), csci(1)],
            ..SoftwareNode::default()
        };
        let r = calculate_software(&system, &Store::default()).unwrap();
        assert!((r.rpfom - 2.0 * 0.0128).abs() < 1e-15);
        assert!(r.factors.is_none());
    }

    #[test]
    fn test_unknown_application_is_range_error() {
        let mut node = csci(1);
        node.application_id = 7;
        assert!(matches!(
            calculate_software(&node, &Store::default()),
            Err(ModelError::DataRange { .. })
        ));
    }
}
