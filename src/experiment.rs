//! Experiment-side data model: metrics, thresholds, constraints, arms and outcome rows.
//!
//! Storage and retrieval live behind the [`Experiment`] trait. [`InMemoryExperiment`]
//! is a plain snapshot implementation for callers that already hold their data.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::relativize::Baseline;
use crate::Direction;

/// A single parameter value of an arm.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Float(v)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        ParameterValue::Int(v)
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        ParameterValue::Bool(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        ParameterValue::Str(v.to_string())
    }
}

/// Parameter name to value, ordered by name.
pub type Parameterization = BTreeMap<String, ParameterValue>;

/// A named configuration that was (or could be) evaluated.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arm {
    pub name: String,
    pub parameters: Parameterization,
}

impl Arm {
    pub fn new(name: impl Into<String>, parameters: Parameterization) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }
}

/// A named outcome and whether lower values are better.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metric {
    pub name: String,
    pub lower_is_better: bool,
}

impl Metric {
    /// A metric where higher is better.
    pub fn maximize(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower_is_better: false,
        }
    }

    /// A metric where lower is better.
    pub fn minimize(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower_is_better: true,
        }
    }

    pub fn direction(&self) -> Direction {
        if self.lower_is_better {
            Direction::Minimize
        } else {
            Direction::Maximize
        }
    }

    /// `+1` when higher is better, `-1` otherwise.
    pub fn sign(&self) -> f64 {
        if self.lower_is_better {
            -1.0
        } else {
            1.0
        }
    }
}

/// Comparison used by thresholds and constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComparisonOp {
    /// Value must be greater than or equal to the bound.
    Geq,
    /// Value must be less than or equal to the bound.
    Leq,
}

impl ComparisonOp {
    pub fn admits(self, value: f64, bound: f64) -> bool {
        match self {
            ComparisonOp::Geq => value >= bound,
            ComparisonOp::Leq => value <= bound,
        }
    }
}

/// Worst acceptable value of an objective.
///
/// `relative` bounds are percent changes relative to the status quo arm.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectiveThreshold {
    pub metric: Metric,
    pub op: ComparisonOp,
    pub bound: f64,
    pub relative: bool,
}

impl ObjectiveThreshold {
    /// Threshold whose comparison follows the metric's direction.
    pub fn new(metric: Metric, bound: f64, relative: bool) -> Self {
        let op = if metric.lower_is_better {
            ComparisonOp::Leq
        } else {
            ComparisonOp::Geq
        };
        Self {
            metric,
            op,
            bound,
            relative,
        }
    }
}

/// Feasibility requirement on a (usually non-objective) metric.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutcomeConstraint {
    pub metric: Metric,
    pub op: ComparisonOp,
    pub bound: f64,
    pub relative: bool,
}

impl OutcomeConstraint {
    pub fn new(metric: Metric, op: ComparisonOp, bound: f64, relative: bool) -> Self {
        Self {
            metric,
            op,
            bound,
            relative,
        }
    }
}

/// Objectives, their thresholds and the outcome constraints of an experiment.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationConfig {
    pub objectives: Vec<Metric>,
    pub objective_thresholds: Vec<ObjectiveThreshold>,
    pub outcome_constraints: Vec<OutcomeConstraint>,
}

impl OptimizationConfig {
    pub fn new(objectives: Vec<Metric>) -> Self {
        Self {
            objectives,
            ..Self::default()
        }
    }

    pub fn with_thresholds(mut self, thresholds: Vec<ObjectiveThreshold>) -> Self {
        self.objective_thresholds = thresholds;
        self
    }

    pub fn with_constraints(mut self, constraints: Vec<OutcomeConstraint>) -> Self {
        self.outcome_constraints = constraints;
        self
    }

    pub fn is_multi_objective(&self) -> bool {
        self.objectives.len() > 1
    }

    pub fn objective(&self, name: &str) -> Option<&Metric> {
        self.objectives.iter().find(|m| m.name == name)
    }

    pub fn threshold(&self, name: &str) -> Option<&ObjectiveThreshold> {
        self.objective_thresholds
            .iter()
            .find(|t| t.metric.name == name)
    }

    /// Objectives first, then constrained metrics, without repeats.
    pub fn metric_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let all = self
            .objectives
            .iter()
            .chain(self.outcome_constraints.iter().map(|c| &c.metric));
        for metric in all {
            if !names.contains(&metric.name) {
                names.push(metric.name.clone());
            }
        }
        names
    }
}

/// One observed (mean, sem) for an arm and metric in a trial.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataRow {
    pub arm_name: String,
    pub metric_name: String,
    pub mean: f64,
    pub sem: f64,
    pub trial_index: u64,
}

impl DataRow {
    pub fn new(
        arm_name: impl Into<String>,
        metric_name: impl Into<String>,
        mean: f64,
        sem: f64,
    ) -> Self {
        Self {
            arm_name: arm_name.into(),
            metric_name: metric_name.into(),
            mean,
            sem,
            trial_index: 0,
        }
    }

    pub fn in_trial(mut self, trial_index: u64) -> Self {
        self.trial_index = trial_index;
        self
    }
}

/// Outcome rows as returned by the experiment store.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Data {
    rows: Vec<DataRow>,
}

impl Data {
    pub fn new(rows: Vec<DataRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only rows whose arm is in `arm_names`.
    pub fn filter_arms(&self, arm_names: &[String]) -> Data {
        let keep: BTreeSet<&str> = arm_names.iter().map(String::as_str).collect();
        Data {
            rows: self
                .rows
                .iter()
                .filter(|r| keep.contains(r.arm_name.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Keep only rows from one trial.
    pub fn filter_trial(&self, trial_index: u64) -> Data {
        Data {
            rows: self
                .rows
                .iter()
                .filter(|r| r.trial_index == trial_index)
                .cloned()
                .collect(),
        }
    }

    /// Per-metric (mean, sem) of `arm_name`, taking the first row seen for each metric.
    pub fn baseline_stats(&self, arm_name: &str) -> BTreeMap<String, Baseline> {
        let mut stats = BTreeMap::new();
        for row in self.rows.iter().filter(|r| r.arm_name == arm_name) {
            stats
                .entry(row.metric_name.clone())
                .or_insert(Baseline::new(row.mean, row.sem));
        }
        stats
    }
}

/// Failures of the experiment store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("data unavailable: {0}")]
    Unavailable(String),
    #[error("trial {0} does not exist")]
    UnknownTrial(u64),
}

/// Whether a trial evaluates one arm or a batch of arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrialKind {
    Single,
    Batch,
}

/// Read-only view of an experiment consumed by the frontier builders.
pub trait Experiment {
    fn name(&self) -> &str;

    fn optimization_config(&self) -> Option<&OptimizationConfig>;

    /// The baseline ("status quo") arm, if the experiment has one.
    fn status_quo(&self) -> Option<&Arm>;

    fn arm(&self, name: &str) -> Option<&Arm>;

    /// Whether a surrogate model can be fit on `name`.
    fn has_metric(&self, name: &str) -> bool;

    fn has_batch_trials(&self) -> bool;

    /// Data already attached to the experiment.
    fn lookup_data(&self) -> Data;

    /// Fetch fresh data for the whole experiment.
    fn fetch_data(&self) -> Result<Data, DataError>;

    /// Fetch fresh data for a single trial.
    fn fetch_trial_data(&self, trial_index: u64) -> Result<Data, DataError>;

    fn is_multi_objective(&self) -> bool {
        self.optimization_config()
            .is_some_and(OptimizationConfig::is_multi_objective)
    }
}

/// An experiment snapshot held entirely in memory.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InMemoryExperiment {
    name: String,
    optimization_config: Option<OptimizationConfig>,
    arms: Vec<Arm>,
    status_quo: Option<String>,
    metrics: BTreeSet<String>,
    trials: BTreeMap<u64, TrialKind>,
    data: Data,
}

impl InMemoryExperiment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the optimization config; its metrics become known to the experiment.
    pub fn with_optimization_config(mut self, config: OptimizationConfig) -> Self {
        self.metrics.extend(config.metric_names());
        self.optimization_config = Some(config);
        self
    }

    pub fn with_arm(mut self, arm: Arm) -> Self {
        self.arms.retain(|a| a.name != arm.name);
        self.arms.push(arm);
        self
    }

    /// Add `arm` and mark it as the status quo.
    pub fn with_status_quo(mut self, arm: Arm) -> Self {
        self.status_quo = Some(arm.name.clone());
        self.with_arm(arm)
    }

    /// Register a tracking metric that is neither objective nor constraint.
    pub fn with_metric(mut self, name: impl Into<String>) -> Self {
        self.metrics.insert(name.into());
        self
    }

    pub fn with_trial(mut self, index: u64, kind: TrialKind) -> Self {
        self.trials.insert(index, kind);
        self
    }

    /// Attach data; trials referenced by the rows are registered as single-arm
    /// trials unless already known.
    pub fn with_data(mut self, data: Data) -> Self {
        for row in data.rows() {
            self.trials.entry(row.trial_index).or_insert(TrialKind::Single);
            self.metrics.insert(row.metric_name.clone());
        }
        self.data = data;
        self
    }
}

impl Experiment for InMemoryExperiment {
    fn name(&self) -> &str {
        &self.name
    }

    fn optimization_config(&self) -> Option<&OptimizationConfig> {
        self.optimization_config.as_ref()
    }

    fn status_quo(&self) -> Option<&Arm> {
        let name = self.status_quo.as_deref()?;
        self.arm(name)
    }

    fn arm(&self, name: &str) -> Option<&Arm> {
        self.arms.iter().find(|a| a.name == name)
    }

    fn has_metric(&self, name: &str) -> bool {
        self.metrics.contains(name)
    }

    fn has_batch_trials(&self) -> bool {
        self.trials.values().any(|k| *k == TrialKind::Batch)
    }

    fn lookup_data(&self) -> Data {
        self.data.clone()
    }

    fn fetch_data(&self) -> Result<Data, DataError> {
        Ok(self.data.clone())
    }

    fn fetch_trial_data(&self, trial_index: u64) -> Result<Data, DataError> {
        if !self.trials.contains_key(&trial_index) {
            return Err(DataError::UnknownTrial(trial_index));
        }
        Ok(self.data.filter_trial(trial_index))
    }
}
