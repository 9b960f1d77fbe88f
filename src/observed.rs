//! Frontiers built from observed data only, with no model involved.

use std::collections::{BTreeMap, BTreeSet};

use crate::adapter::ObservedAdapter;
use crate::error::{ParetoError, Result};
use crate::experiment::{Data, Experiment, OptimizationConfig};
use crate::relativize::{derelativize, relativize_point, relativize_with, Baseline, RelativizeOptions};
use crate::results::{MetricSeries, ParetoFrontierResults};

/// Inputs of [`observed_pareto_frontiers`].
#[derive(Debug, Clone, Default)]
pub struct ObservedFrontierRequest {
    data: Option<Data>,
    relative: Option<bool>,
    arm_names: Option<Vec<String>>,
    absolute_metrics: Option<Vec<String>>,
    relativize: RelativizeOptions,
}

impl ObservedFrontierRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this data instead of the data attached to the experiment.
    pub fn with_data(mut self, data: Data) -> Self {
        self.data = Some(data);
        self
    }

    /// Report every objective relative (`true`) or absolute (`false`).
    ///
    /// Left unset, each objective follows its own threshold's relativity.
    pub fn with_relative(mut self, relative: bool) -> Self {
        self.relative = Some(relative);
        self
    }

    /// Restrict the frontier to these arms. The status quo is always kept.
    pub fn with_arm_names(mut self, arm_names: Vec<String>) -> Self {
        self.arm_names = Some(arm_names);
        self
    }

    /// Objectives always reported in absolute units, whatever else is configured.
    pub fn with_absolute_metrics(mut self, metrics: Vec<String>) -> Self {
        self.absolute_metrics = Some(metrics);
        self
    }

    pub fn with_relativize_options(mut self, options: RelativizeOptions) -> Self {
        self.relativize = options;
        self
    }
}

/// Decide, per objective, whether it is reported relative to the status quo.
fn resolve_relativity(
    config: &OptimizationConfig,
    objectives: &[String],
    request: &ObservedFrontierRequest,
) -> Result<BTreeMap<String, bool>> {
    let mut is_relative = BTreeMap::new();
    for name in objectives {
        let rel = match request.relative {
            Some(rel) => rel,
            None => config
                .threshold(name)
                .map(|t| t.relative)
                .ok_or_else(|| ParetoError::MissingObjectiveThresholds {
                    metric: name.clone(),
                })?,
        };
        is_relative.insert(name.clone(), rel);
    }
    for name in request.absolute_metrics.iter().flatten() {
        match is_relative.get_mut(name) {
            Some(rel) => *rel = false,
            None => {
                return Err(ParetoError::UnknownMetric {
                    metric: name.clone(),
                    context: "absolute metrics must be objectives of the experiment".to_string(),
                })
            }
        }
    }
    Ok(is_relative)
}

fn baseline_for<'a>(
    status_quo: &'a BTreeMap<String, Baseline>,
    metric: &str,
) -> Result<&'a Baseline> {
    status_quo
        .get(metric)
        .ok_or_else(|| ParetoError::MissingBaseline {
            metric: metric.to_string(),
        })
}

/// Observed Pareto frontiers for every pair of objectives.
///
/// The joint frontier is computed once over all objectives (respecting thresholds and
/// outcome constraints), relativized per objective, and then emitted once per unordered
/// pair of objectives in name order. All emitted results share the same points, means,
/// sems and thresholds and differ only in their primary/secondary designation.
pub fn observed_pareto_frontiers<E: Experiment + ?Sized>(
    experiment: &E,
    request: &ObservedFrontierRequest,
) -> Result<Vec<ParetoFrontierResults>> {
    let config = experiment
        .optimization_config()
        .ok_or_else(|| ParetoError::MissingOptimizationConfig {
            experiment: experiment.name().to_string(),
        })?;

    let mut data = request
        .data
        .clone()
        .unwrap_or_else(|| experiment.lookup_data());
    if let Some(arm_names) = &request.arm_names {
        let mut arm_names = arm_names.clone();
        if let Some(sq) = experiment.status_quo() {
            if !arm_names.contains(&sq.name) {
                arm_names.push(sq.name.clone());
            }
        }
        data = data.filter_arms(&arm_names);
    }

    let adapter = ObservedAdapter::new(experiment, &data)?;
    let frontier = adapter.observed_pareto_frontier()?;

    let objectives: Vec<String> = config
        .objectives
        .iter()
        .map(|m| m.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut series: Vec<MetricSeries> = objectives
        .iter()
        .map(|name| MetricSeries::new(name.clone(), Vec::new(), Vec::new()))
        .collect();
    for obs in &frontier {
        for s in series.iter_mut() {
            if let (Some(mean), Some(sem)) = (obs.data.mean(&s.name), obs.data.sem(&s.name)) {
                s.means.push(mean);
                s.sems.push(sem);
            }
        }
    }

    let is_relative = resolve_relativity(config, &objectives, request)?;
    let status_quo = experiment
        .status_quo()
        .map(|arm| data.baseline_stats(&arm.name))
        .unwrap_or_default();

    let mut thresholds: BTreeMap<String, f64> = BTreeMap::new();
    for s in series.iter_mut() {
        let rel = is_relative.get(&s.name).copied().unwrap_or(false);
        let threshold = config.threshold(&s.name);
        if rel {
            let baseline = baseline_for(&status_quo, &s.name)?;
            (s.means, s.sems) = relativize_with(&s.means, &s.sems, *baseline, &request.relativize)?;
            if let Some(t) = threshold {
                let bound = if t.relative {
                    t.bound
                } else {
                    relativize_point(t.bound, baseline.mean)?
                };
                thresholds.insert(s.name.clone(), bound);
            }
        } else if let Some(t) = threshold {
            let bound = if t.relative {
                derelativize(t.bound, baseline_for(&status_quo, &s.name)?.mean)
            } else {
                t.bound
            };
            thresholds.insert(s.name.clone(), bound);
        }
    }

    let absolute_metrics: Vec<String> = objectives
        .iter()
        .filter(|name| !is_relative.get(*name).copied().unwrap_or(false))
        .cloned()
        .collect();
    let param_dicts: Vec<_> = frontier
        .iter()
        .map(|o| o.features.parameters.clone())
        .collect();
    let arm_names: Vec<Option<String>> = frontier.iter().map(|o| o.arm_name.clone()).collect();

    let mut results = Vec::new();
    for (i, primary) in objectives.iter().enumerate() {
        for secondary in &objectives[i + 1..] {
            results.push(
                ParetoFrontierResults::builder(
                    param_dicts.clone(),
                    series.clone(),
                    primary,
                    secondary,
                )
                .with_absolute_metrics(absolute_metrics.clone())
                .with_objective_thresholds(thresholds.clone())
                .with_arm_names(arm_names.clone())
                .build()?,
            );
        }
    }
    Ok(results)
}
