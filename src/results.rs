//! The frontier bundle handed to downstream consumers.

use std::collections::BTreeMap;

use crate::error::{ParetoError, Result};
use crate::experiment::Parameterization;
use crate::extract::{extract_pareto_2d, Orientation};

/// Means and standard errors of one metric, one entry per frontier point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricSeries {
    pub name: String,
    pub means: Vec<f64>,
    pub sems: Vec<f64>,
}

impl MetricSeries {
    pub fn new(name: impl Into<String>, means: Vec<f64>, sems: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            means,
            sems,
        }
    }
}

/// Frontier points for a primary/secondary metric pair.
///
/// Every per-point list (parameterizations, each metric's means and sems, arm names)
/// has the same length. Metrics not listed in [`absolute_metrics`](Self::absolute_metrics)
/// are percent changes relative to the status quo, and the objective thresholds use the
/// same scale as their metric's means.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParetoFrontierResults {
    param_dicts: Vec<Parameterization>,
    metrics: Vec<MetricSeries>,
    primary_metric: String,
    secondary_metric: String,
    absolute_metrics: Vec<String>,
    objective_thresholds: Option<BTreeMap<String, f64>>,
    arm_names: Option<Vec<Option<String>>>,
}

impl ParetoFrontierResults {
    pub fn builder(
        param_dicts: Vec<Parameterization>,
        metrics: Vec<MetricSeries>,
        primary_metric: impl Into<String>,
        secondary_metric: impl Into<String>,
    ) -> ResultsBuilder {
        ResultsBuilder {
            inner: ParetoFrontierResults {
                param_dicts,
                metrics,
                primary_metric: primary_metric.into(),
                secondary_metric: secondary_metric.into(),
                absolute_metrics: Vec::new(),
                objective_thresholds: None,
                arm_names: None,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.param_dicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.param_dicts.is_empty()
    }

    pub fn param_dicts(&self) -> &[Parameterization] {
        &self.param_dicts
    }

    /// All metric series, in reporting order.
    pub fn metrics(&self) -> &[MetricSeries] {
        &self.metrics
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|m| m.name.as_str())
    }

    pub fn series(&self, metric: &str) -> Option<&MetricSeries> {
        self.metrics.iter().find(|m| m.name == metric)
    }

    pub fn means(&self, metric: &str) -> Option<&[f64]> {
        self.series(metric).map(|m| m.means.as_slice())
    }

    pub fn sems(&self, metric: &str) -> Option<&[f64]> {
        self.series(metric).map(|m| m.sems.as_slice())
    }

    pub fn primary_metric(&self) -> &str {
        &self.primary_metric
    }

    pub fn secondary_metric(&self) -> &str {
        &self.secondary_metric
    }

    pub fn absolute_metrics(&self) -> &[String] {
        &self.absolute_metrics
    }

    /// Whether `metric` is reported as a percent change from the status quo.
    pub fn is_relative(&self, metric: &str) -> bool {
        !self.absolute_metrics.iter().any(|m| m == metric)
    }

    pub fn objective_thresholds(&self) -> Option<&BTreeMap<String, f64>> {
        self.objective_thresholds.as_ref()
    }

    pub fn arm_names(&self) -> Option<&[Option<String>]> {
        self.arm_names.as_deref()
    }

    /// Primary/secondary thresholds as a reference point, when both exist.
    pub fn reference_point(&self) -> Option<[f64; 2]> {
        let th = self.objective_thresholds.as_ref()?;
        Some([
            *th.get(&self.primary_metric)?,
            *th.get(&self.secondary_metric)?,
        ])
    }

    /// Non-dominated (primary, secondary) mean pairs, sorted by primary descending.
    pub fn pareto_2d(
        &self,
        reference_point: Option<[f64; 2]>,
        minimize: impl Into<Orientation>,
    ) -> Result<Vec<[f64; 2]>> {
        let primary = self.means(&self.primary_metric).unwrap_or_default();
        let secondary = self.means(&self.secondary_metric).unwrap_or_default();
        let y: Vec<Vec<f64>> = primary
            .iter()
            .zip(secondary)
            .map(|(&a, &b)| vec![a, b])
            .collect();
        extract_pareto_2d(&y, reference_point, minimize)
    }
}

/// Assembles a [`ParetoFrontierResults`] and checks its invariants on `build`.
#[derive(Debug, Clone)]
pub struct ResultsBuilder {
    inner: ParetoFrontierResults,
}

impl ResultsBuilder {
    pub fn with_absolute_metrics(mut self, absolute_metrics: Vec<String>) -> Self {
        self.inner.absolute_metrics = absolute_metrics;
        self
    }

    pub fn with_objective_thresholds(mut self, thresholds: BTreeMap<String, f64>) -> Self {
        self.inner.objective_thresholds = Some(thresholds);
        self
    }

    pub fn with_arm_names(mut self, arm_names: Vec<Option<String>>) -> Self {
        self.inner.arm_names = Some(arm_names);
        self
    }

    pub fn build(self) -> Result<ParetoFrontierResults> {
        let r = self.inner;
        let n = r.param_dicts.len();
        let check = |field: String, actual: usize| {
            if actual == n {
                Ok(())
            } else {
                Err(ParetoError::ParallelLengthMismatch {
                    field,
                    expected: n,
                    actual,
                })
            }
        };
        for m in &r.metrics {
            check(format!("means[{}]", m.name), m.means.len())?;
            check(format!("sems[{}]", m.name), m.sems.len())?;
        }
        if let Some(names) = &r.arm_names {
            check("arm_names".to_string(), names.len())?;
        }
        for name in [&r.primary_metric, &r.secondary_metric] {
            if r.series(name).is_none() {
                return Err(ParetoError::UnknownMetric {
                    metric: name.clone(),
                    context: "frontier results carry no series for it".to_string(),
                });
            }
        }
        Ok(r)
    }
}
