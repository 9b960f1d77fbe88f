//! Minimal outcome adapter: turns experiment data into per-arm observations and
//! answers joint frontier queries over them.
//!
//! No model is involved. Every value is the raw observed mean, and each observation's
//! covariance is diagonal (`sem^2`).

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{ParetoError, Result};
use crate::experiment::{Data, Experiment, ObjectiveThreshold, OptimizationConfig, Parameterization};
use crate::relativize::{derelativize, Baseline};
use crate::{nondominated_indices, Direction};

/// Where an observation (or a prediction request) sits in parameter space.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObservationFeatures {
    pub parameters: Parameterization,
    pub trial_index: Option<u64>,
}

impl ObservationFeatures {
    pub fn new(parameters: Parameterization) -> Self {
        Self {
            parameters,
            trial_index: None,
        }
    }

    pub fn with_trial_index(mut self, trial_index: Option<u64>) -> Self {
        self.trial_index = trial_index;
        self
    }
}

/// Means and covariance of several metrics at one point.
///
/// `means[i]` and `covariance[i][i]` belong to `metric_names[i]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObservationData {
    pub metric_names: Vec<String>,
    pub means: Vec<f64>,
    pub covariance: Vec<Vec<f64>>,
}

impl ObservationData {
    /// Build from per-metric (mean, sem) pairs with a diagonal covariance.
    pub fn from_sems(entries: Vec<(String, f64, f64)>) -> Self {
        let k = entries.len();
        let mut metric_names = Vec::with_capacity(k);
        let mut means = Vec::with_capacity(k);
        let mut covariance = vec![vec![0.0; k]; k];
        for (i, (name, mean, sem)) in entries.into_iter().enumerate() {
            metric_names.push(name);
            means.push(mean);
            covariance[i][i] = sem * sem;
        }
        Self {
            metric_names,
            means,
            covariance,
        }
    }

    fn index(&self, metric: &str) -> Option<usize> {
        self.metric_names.iter().position(|m| m == metric)
    }

    pub fn mean(&self, metric: &str) -> Option<f64> {
        self.index(metric).map(|i| self.means[i])
    }

    pub fn variance(&self, metric: &str) -> Option<f64> {
        self.index(metric)
            .and_then(|i| self.covariance.get(i).and_then(|row| row.get(i)).copied())
    }

    /// Standard error, i.e. the square root of the diagonal covariance entry.
    pub fn sem(&self, metric: &str) -> Option<f64> {
        self.variance(metric).map(f64::sqrt)
    }
}

/// One observed arm in one trial.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    pub features: ObservationFeatures,
    pub data: ObservationData,
    pub arm_name: Option<String>,
}

/// A joint frontier together with the matrix it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierConfigs {
    /// Frontier observations, in observation order.
    pub observations: Vec<Observation>,
    /// `outcomes[p][j]` is the value of `metric_names[j]` at frontier point `p`.
    pub outcomes: Vec<Vec<f64>>,
    /// `+1` maximized objective, `-1` minimized objective, `0` constraint-only metric.
    pub objective_weights: Vec<f64>,
    pub metric_names: Vec<String>,
}

/// Observations of an experiment plus a private copy of its optimization config.
#[derive(Debug, Clone)]
pub struct ObservedAdapter {
    experiment: String,
    config: OptimizationConfig,
    status_quo: BTreeMap<String, Baseline>,
    observations: Vec<Observation>,
}

impl ObservedAdapter {
    /// Group `data` into one observation per (trial, arm), in order of first appearance.
    pub fn new<E: Experiment + ?Sized>(experiment: &E, data: &Data) -> Result<Self> {
        let config = experiment
            .optimization_config()
            .cloned()
            .ok_or_else(|| ParetoError::MissingOptimizationConfig {
                experiment: experiment.name().to_string(),
            })?;
        let status_quo = experiment
            .status_quo()
            .map(|arm| data.baseline_stats(&arm.name))
            .unwrap_or_default();

        let mut order: Vec<(u64, String)> = Vec::new();
        let mut groups: BTreeMap<(u64, String), Vec<(String, f64, f64)>> = BTreeMap::new();
        for row in data.rows() {
            let key = (row.trial_index, row.arm_name.clone());
            let entries = groups.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                Vec::new()
            });
            if entries.iter().any(|(m, _, _)| *m == row.metric_name) {
                continue;
            }
            entries.push((row.metric_name.clone(), row.mean, row.sem));
        }

        let mut observations = Vec::with_capacity(order.len());
        for key in order {
            let Some(entries) = groups.remove(&key) else {
                continue;
            };
            let (trial_index, arm_name) = key;
            let arm = experiment
                .arm(&arm_name)
                .ok_or_else(|| ParetoError::UnknownArm {
                    arm: arm_name.clone(),
                })?;
            observations.push(Observation {
                features: ObservationFeatures::new(arm.parameters.clone())
                    .with_trial_index(Some(trial_index)),
                data: ObservationData::from_sems(entries),
                arm_name: Some(arm_name),
            });
        }

        Ok(Self {
            experiment: experiment.name().to_string(),
            config,
            status_quo,
            observations,
        })
    }

    pub fn experiment_name(&self) -> &str {
        &self.experiment
    }

    pub fn optimization_config(&self) -> &OptimizationConfig {
        &self.config
    }

    /// Mutable access to the adapter's copy of the config; the experiment is untouched.
    pub fn optimization_config_mut(&mut self) -> &mut OptimizationConfig {
        &mut self.config
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Parallel (features, outcomes) training pairs.
    pub fn training_data(&self) -> (Vec<ObservationFeatures>, Vec<ObservationData>) {
        self.observations
            .iter()
            .map(|o| (o.features.clone(), o.data.clone()))
            .unzip()
    }

    /// Joint observed frontier over all objectives under the config's own thresholds
    /// and outcome constraints.
    pub fn observed_pareto_frontier(&self) -> Result<Vec<Observation>> {
        let thresholds = self.config.objective_thresholds.clone();
        Ok(self.pareto_frontier_and_configs(&thresholds)?.observations)
    }

    /// Joint observed frontier under explicit `thresholds`.
    ///
    /// Observations missing any objective or constrained metric are skipped. Infeasible
    /// observations, and those not at least as good as every threshold, never reach the
    /// frontier.
    pub fn pareto_frontier_and_configs(
        &self,
        thresholds: &[ObjectiveThreshold],
    ) -> Result<FrontierConfigs> {
        let metric_names = self.config.metric_names();
        let objective_weights: Vec<f64> = metric_names
            .iter()
            .map(|name| self.config.objective(name).map_or(0.0, |m| m.sign()))
            .collect();

        let mut bounds = Vec::with_capacity(thresholds.len());
        for t in thresholds {
            if self.config.objective(&t.metric.name).is_none() {
                return Err(ParetoError::UnknownMetric {
                    metric: t.metric.name.clone(),
                    context: "objective thresholds must refer to objectives".to_string(),
                });
            }
            let bound = self.absolute_bound(&t.metric.name, t.bound, t.relative)?;
            bounds.push((t.metric.name.as_str(), t.op, bound));
        }
        let mut constraints = Vec::with_capacity(self.config.outcome_constraints.len());
        for c in &self.config.outcome_constraints {
            let bound = self.absolute_bound(&c.metric.name, c.bound, c.relative)?;
            constraints.push((c.metric.name.as_str(), c.op, bound));
        }

        let mut candidates: Vec<(&Observation, Vec<f64>)> = Vec::new();
        'obs: for obs in &self.observations {
            let mut row = Vec::with_capacity(metric_names.len());
            for name in &metric_names {
                match obs.data.mean(name) {
                    Some(v) => row.push(v),
                    None => {
                        debug!(
                            arm = obs.arm_name.as_deref().unwrap_or_default(),
                            metric = %name,
                            "skipping observation without a required metric"
                        );
                        continue 'obs;
                    }
                }
            }
            let value = |metric: &str| {
                metric_names
                    .iter()
                    .position(|m| m == metric)
                    .map_or(f64::NAN, |j| row[j])
            };
            let feasible = constraints
                .iter()
                .chain(bounds.iter())
                .all(|(metric, op, bound)| op.admits(value(metric), *bound));
            if feasible {
                candidates.push((obs, row));
            }
        }

        let (objective_cols, directions): (Vec<usize>, Vec<Direction>) = metric_names
            .iter()
            .enumerate()
            .filter_map(|(j, name)| Some((j, self.config.objective(name)?.direction())))
            .unzip();
        let projected: Vec<Vec<f64>> = candidates
            .iter()
            .map(|(_, row)| objective_cols.iter().map(|&j| row[j]).collect())
            .collect();
        let keep = nondominated_indices(&projected, &directions, 0.0);

        let mut observations = Vec::with_capacity(keep.len());
        let mut outcomes = Vec::with_capacity(keep.len());
        for i in keep {
            let (obs, row) = &candidates[i];
            observations.push((*obs).clone());
            outcomes.push(row.clone());
        }
        Ok(FrontierConfigs {
            observations,
            outcomes,
            objective_weights,
            metric_names,
        })
    }

    fn absolute_bound(&self, metric: &str, bound: f64, relative: bool) -> Result<f64> {
        if !relative || bound.is_infinite() {
            return Ok(bound);
        }
        let baseline = self
            .status_quo
            .get(metric)
            .ok_or_else(|| ParetoError::MissingBaseline {
                metric: metric.to_string(),
            })?;
        Ok(derelativize(bound, baseline.mean))
    }
}
