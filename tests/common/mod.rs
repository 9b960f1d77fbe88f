//! Shared fixtures: experiment builders and a deterministic surrogate model.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use pareto_frontiers::adapter::{ObservationData, ObservationFeatures};
use pareto_frontiers::experiment::{
    Arm, Data, DataError, DataRow, Experiment, InMemoryExperiment, Metric, ObjectiveThreshold,
    OptimizationConfig, ParameterValue, Parameterization,
};
use pareto_frontiers::model::{
    Acquisition, GenOptions, ModelError, ScalarizedConfig, SurrogateFitter, SurrogateModel,
};

pub fn params(x: f64) -> Parameterization {
    Parameterization::from([("x".to_string(), ParameterValue::Float(x))])
}

pub fn arm(name: &str, x: f64) -> Arm {
    Arm::new(name, params(x))
}

/// Experiment with arms `sq` (status quo) plus the given named arms, and rows built
/// from `(arm, metric, mean, sem)` tuples.
pub fn experiment(
    config: OptimizationConfig,
    arms: &[&str],
    rows: &[(&str, &str, f64, f64)],
) -> InMemoryExperiment {
    let mut exp = InMemoryExperiment::new("test")
        .with_optimization_config(config)
        .with_status_quo(arm("sq", 0.0));
    for (i, name) in arms.iter().enumerate() {
        exp = exp.with_arm(arm(name, (i + 1) as f64));
    }
    let rows = rows
        .iter()
        .map(|&(a, m, mean, sem)| DataRow::new(a, m, mean, sem))
        .collect();
    exp.with_data(Data::new(rows))
}

pub fn threshold(metric: Metric, bound: f64, relative: bool) -> ObjectiveThreshold {
    ObjectiveThreshold::new(metric, bound, relative)
}

/// Wraps an experiment and makes every data fetch fail.
pub struct FailingFetch(pub InMemoryExperiment);

impl Experiment for FailingFetch {
    fn name(&self) -> &str {
        self.0.name()
    }
    fn optimization_config(&self) -> Option<&OptimizationConfig> {
        self.0.optimization_config()
    }
    fn status_quo(&self) -> Option<&Arm> {
        self.0.status_quo()
    }
    fn arm(&self, name: &str) -> Option<&Arm> {
        self.0.arm(name)
    }
    fn has_metric(&self, name: &str) -> bool {
        self.0.has_metric(name)
    }
    fn has_batch_trials(&self) -> bool {
        self.0.has_batch_trials()
    }
    fn lookup_data(&self) -> Data {
        self.0.lookup_data()
    }
    fn fetch_data(&self) -> Result<Data, DataError> {
        Err(DataError::Unavailable("store offline".to_string()))
    }
    fn fetch_trial_data(&self, _trial_index: u64) -> Result<Data, DataError> {
        Err(DataError::Unavailable("store offline".to_string()))
    }
}

/// Everything the fake model was asked to do.
#[derive(Debug, Default)]
pub struct Calls {
    pub fit_data: Vec<Option<Data>>,
    pub fit_configs: Vec<ScalarizedConfig>,
    pub generations: Vec<(usize, GenOptions, ScalarizedConfig)>,
    pub predictions: Vec<Vec<ObservationFeatures>>,
}

/// Model over a single parameter `x` in `[0, 1]` with outcomes
/// `a = 100 + 20 x` and `b = 100 + 20 sqrt(1 - x^2)`, both with sem 1.
///
/// Generation returns the grid point maximizing the scalarized objective. Points
/// without an `x` parameter, or with `x` outside `[0, 1]`, are out of design.
pub struct FakeModel {
    pub calls: Rc<RefCell<Calls>>,
    grid: Vec<f64>,
}

pub fn outcomes(x: f64) -> [f64; 2] {
    [100.0 + 20.0 * x, 100.0 + 20.0 * (1.0 - x * x).max(0.0).sqrt()]
}

fn x_of(features: &ObservationFeatures) -> Option<f64> {
    match features.parameters.get("x") {
        Some(ParameterValue::Float(x)) if (0.0..=1.0).contains(x) => Some(*x),
        _ => None,
    }
}

impl SurrogateModel for FakeModel {
    fn predict(&self, points: &[ObservationFeatures]) -> Result<Vec<ObservationData>, ModelError> {
        self.calls.borrow_mut().predictions.push(points.to_vec());
        points
            .iter()
            .map(|p| {
                let x = x_of(p).ok_or_else(|| ModelError::OutOfDesign(format!("{:?}", p.parameters)))?;
                let [a, b] = outcomes(x);
                Ok(ObservationData::from_sems(vec![
                    ("a".to_string(), a, 1.0),
                    ("b".to_string(), b, 1.0),
                ]))
            })
            .collect()
    }

    fn generate(
        &self,
        n: usize,
        options: &GenOptions,
        config: &ScalarizedConfig,
    ) -> Result<Vec<Parameterization>, ModelError> {
        self.calls
            .borrow_mut()
            .generations
            .push((n, *options, config.clone()));
        let best = self
            .grid
            .iter()
            .copied()
            .max_by(|&u, &v| {
                config
                    .objective
                    .value(outcomes(u))
                    .total_cmp(&config.objective.value(outcomes(v)))
            })
            .ok_or_else(|| ModelError::Generation("empty grid".to_string()))?;
        Ok(vec![params(best); n])
    }
}

/// Fits a [`FakeModel`] and shares its call log.
#[derive(Default)]
pub struct FakeFitter {
    pub calls: Rc<RefCell<Calls>>,
}

impl<E: Experiment + ?Sized> SurrogateFitter<E> for FakeFitter {
    type Model = FakeModel;

    fn fit(
        &self,
        _experiment: &E,
        data: Option<&Data>,
        acquisition: Acquisition,
        config: &ScalarizedConfig,
    ) -> Result<FakeModel, ModelError> {
        assert_eq!(acquisition, Acquisition::PosteriorMean);
        {
            let mut calls = self.calls.borrow_mut();
            calls.fit_data.push(data.cloned());
            calls.fit_configs.push(config.clone());
        }
        Ok(FakeModel {
            calls: Rc::clone(&self.calls),
            grid: (0..=100).map(|i| i as f64 / 100.0).collect(),
        })
    }
}
