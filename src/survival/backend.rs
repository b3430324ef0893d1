//! Pluggable statistics backend for censored fits and survival curves.
//!
//! [`InProcessBackend`] is always available. An external package can be
//! wired in through [`StatisticalBackend`] and wrapped in
//! [`OptionalBackend`], which falls back to the in-process implementation
//! whenever the external one reports itself unavailable.

use super::kaplan_meier::{kaplan_meier, BoundType, KaplanMeierPoint};
use super::parametric::{maximum_likelihood, split, Distribution, ParametricFit};
use super::IncidentRecord;
use crate::config::CalculationConfig;
use crate::error::FitError;

/// Censored-data fitting and survival-curve capability.
pub trait StatisticalBackend {
    /// Maximum-likelihood fit of `distribution` to censored `data`.
    fn fit_censored(
        &self,
        distribution: Distribution,
        data: &[IncidentRecord],
    ) -> Result<ParametricFit, FitError>;

    /// Kaplan-Meier curve of `data` at `config.confidence`.
    fn survfit(
        &self,
        data: &[IncidentRecord],
        config: &CalculationConfig,
    ) -> Result<Vec<KaplanMeierPoint>, FitError>;
}

/// Pure-Rust implementation of every backend operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct InProcessBackend;

impl StatisticalBackend for InProcessBackend {
    fn fit_censored(
        &self,
        distribution: Distribution,
        data: &[IncidentRecord],
    ) -> Result<ParametricFit, FitError> {
        let (failures, suspensions) = split(data)?;
        maximum_likelihood(distribution, &failures, &suspensions)
    }

    fn survfit(
        &self,
        data: &[IncidentRecord],
        config: &CalculationConfig,
    ) -> Result<Vec<KaplanMeierPoint>, FitError> {
        Ok(kaplan_meier(data, 0.0, BoundType::Linear, config).iter().collect())
    }
}

/// An external backend that may be missing, with in-process fallback.
///
/// Only [`FitError::BackendUnavailable`] triggers the fallback; any other
/// error from the external backend is a real answer and is returned.
#[derive(Debug, Clone, Default)]
pub struct OptionalBackend<B> {
    external: Option<B>,
    fallback: InProcessBackend,
}

impl<B: StatisticalBackend> OptionalBackend<B> {
    pub fn new(external: Option<B>) -> Self {
        Self {
            external,
            fallback: InProcessBackend,
        }
    }

    pub fn is_external_configured(&self) -> bool {
        self.external.is_some()
    }

    fn with_fallback<T>(
        &self,
        operation: &str,
        external: impl FnOnce(&B) -> Result<T, FitError>,
        fallback: impl FnOnce(&InProcessBackend) -> Result<T, FitError>,
    ) -> Result<T, FitError> {
        match self.external.as_ref().map(external) {
            Some(Err(FitError::BackendUnavailable(reason))) => {
                tracing::warn!(operation, %reason, "statistics backend unavailable; using in-process fallback");
                fallback(&self.fallback)
            }
            Some(result) => result,
            None => fallback(&self.fallback),
        }
    }
}

impl<B: StatisticalBackend> StatisticalBackend for OptionalBackend<B> {
    fn fit_censored(
        &self,
        distribution: Distribution,
        data: &[IncidentRecord],
    ) -> Result<ParametricFit, FitError> {
        self.with_fallback(
            "fit_censored",
            |b| b.fit_censored(distribution, data),
            |f| f.fit_censored(distribution, data),
        )
    }

    fn survfit(
        &self,
        data: &[IncidentRecord],
        config: &CalculationConfig,
    ) -> Result<Vec<KaplanMeierPoint>, FitError> {
        self.with_fallback(
            "survfit",
            |b| b.survfit(data, config),
            |f| f.survfit(data, config),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survival::{parametric_fit, DistributionParameters, FitOptions};

    /// Stands in for an external package that is not installed.
    struct Missing;

    impl StatisticalBackend for Missing {
        fn fit_censored(&self, _: Distribution, _: &[IncidentRecord]) -> Result<ParametricFit, FitError> {
            Err(FitError::BackendUnavailable("R not found".into()))
        }

        fn survfit(&self, _: &[IncidentRecord], _: &CalculationConfig) -> Result<Vec<KaplanMeierPoint>, FitError> {
            Err(FitError::BackendUnavailable("R not found".into()))
        }
    }

    /// An external package that answers with its own failure.
    struct Diverges;

    impl StatisticalBackend for Diverges {
        fn fit_censored(&self, _: Distribution, _: &[IncidentRecord]) -> Result<ParametricFit, FitError> {
            Err(FitError::NonConvergence { iterations: 7 })
        }

        fn survfit(&self, _: &[IncidentRecord], _: &CalculationConfig) -> Result<Vec<KaplanMeierPoint>, FitError> {
            Ok(Vec::new())
        }
    }

    fn data() -> Vec<IncidentRecord> {
        vec![
            IncidentRecord::exact(50.0),
            IncidentRecord::exact(150.0),
            IncidentRecord::right_censored(200.0),
        ]
    }

    #[test]
    fn test_missing_backend_falls_back() {
        let backend = OptionalBackend::new(Some(Missing));
        assert!(backend.is_external_configured());
        let fit = parametric_fit(&data(), &FitOptions::default(), &backend).unwrap();
        assert_eq!(fit.parameters, DistributionParameters::Exponential { rate: 2.0 / 400.0 });

        let curve = backend.survfit(&data(), &CalculationConfig::default()).unwrap();
        assert_eq!(curve.len(), 3);
    }

    #[test]
    fn test_unconfigured_backend_uses_in_process() {
        let backend: OptionalBackend<Missing> = OptionalBackend::new(None);
        let all = data();
        let one = &all[..1];
        let direct = InProcessBackend
            .fit_censored(Distribution::Weibull, one)
            .unwrap_err();
        let wrapped = backend.fit_censored(Distribution::Weibull, one).unwrap_err();
        assert_eq!(direct, wrapped);
        assert!(matches!(direct, FitError::InsufficientData { .. }));
    }

    #[test]
    fn test_external_errors_are_not_masked() {
        let backend = OptionalBackend::new(Some(Diverges));
        assert_eq!(
            backend.fit_censored(Distribution::Normal, &data()),
            Err(FitError::NonConvergence { iterations: 7 })
        );
    }
}
