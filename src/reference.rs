//! Objective thresholds inferred from the observed Pareto front of an experiment.

use std::ops::Deref;

use tracing::warn;

use crate::adapter::ObservedAdapter;
use crate::error::{ParetoError, Result};
use crate::experiment::{ComparisonOp, Experiment, ObjectiveThreshold, OutcomeConstraint};
use crate::nadir::{ReferencePointRule, ScaledNadir};

/// Clears the adapter's outcome constraints for as long as it lives and puts them
/// back when dropped, whichever way the scope is left.
pub(crate) struct ConstraintsCleared<'a> {
    adapter: &'a mut ObservedAdapter,
    saved: Vec<OutcomeConstraint>,
}

impl<'a> ConstraintsCleared<'a> {
    pub(crate) fn new(adapter: &'a mut ObservedAdapter) -> Self {
        let saved = std::mem::take(&mut adapter.optimization_config_mut().outcome_constraints);
        Self { adapter, saved }
    }
}

impl Deref for ConstraintsCleared<'_> {
    type Target = ObservedAdapter;

    fn deref(&self) -> &ObservedAdapter {
        &*self.adapter
    }
}

impl Drop for ConstraintsCleared<'_> {
    fn drop(&mut self) {
        self.adapter.optimization_config_mut().outcome_constraints = std::mem::take(&mut self.saved);
    }
}

/// [`infer_reference_point_with`] using [`ScaledNadir::default`].
pub fn infer_reference_point<E: Experiment + ?Sized>(
    experiment: &E,
) -> Result<Vec<ObjectiveThreshold>> {
    infer_reference_point_with(experiment, &ScaledNadir::default())
}

/// Replace every objective threshold's bound with a reference point inferred from
/// the experiment's observed Pareto front.
///
/// Thresholds come back in the experiment's own threshold order, as absolute bounds.
///
/// All observed points are admitted regardless of the current thresholds. If outcome
/// constraints leave no feasible point, a warning is logged and the front is computed
/// without them; the returned thresholds then ignore those constraints.
pub fn infer_reference_point_with<E, R>(experiment: &E, rule: &R) -> Result<Vec<ObjectiveThreshold>>
where
    E: Experiment + ?Sized,
    R: ReferencePointRule + ?Sized,
{
    let config = match experiment.optimization_config() {
        Some(config) if config.is_multi_objective() => config,
        _ => {
            return Err(ParetoError::NotMultiObjective {
                experiment: experiment.name().to_string(),
            })
        }
    };

    let data = experiment.fetch_data()?;
    let mut adapter = ObservedAdapter::new(experiment, &data)?;
    let (_, observed) = adapter.training_data();
    let metric_order: Vec<String> = observed
        .first()
        .map(|o| o.metric_names.clone())
        .ok_or_else(|| ParetoError::NoData {
            experiment: experiment.name().to_string(),
        })?;

    // Thresholds that admit every point, and a sign turning each objective into
    // "larger is better" (0 for metrics without a threshold).
    let mut permissive = config.objective_thresholds.clone();
    let mut multiplier = vec![0.0; metric_order.len()];
    for t in permissive.iter_mut() {
        let idx = metric_order
            .iter()
            .position(|m| *m == t.metric.name)
            .ok_or_else(|| ParetoError::UnknownMetric {
                metric: t.metric.name.clone(),
                context: "it does not exist in the observed data".to_string(),
            })?;
        match t.op {
            ComparisonOp::Leq => {
                t.bound = f64::INFINITY;
                multiplier[idx] = -1.0;
            }
            ComparisonOp::Geq => {
                t.bound = f64::NEG_INFINITY;
                multiplier[idx] = 1.0;
            }
        }
    }

    let mut frontier = adapter.pareto_frontier_and_configs(&permissive)?;
    if frontier.observations.is_empty() {
        if adapter.optimization_config().outcome_constraints.is_empty() {
            return Err(ParetoError::EmptyFrontier {
                experiment: adapter.experiment_name().to_string(),
            });
        }
        warn!(
            experiment = adapter.experiment_name(),
            "no feasible frontier observations; inferring the reference point from \
             unconstrained objective values"
        );
        let unconstrained = ConstraintsCleared::new(&mut adapter);
        frontier = unconstrained.pareto_frontier_and_configs(&permissive)?;
    }
    if frontier.observations.is_empty() {
        return Err(ParetoError::EmptyFrontier {
            experiment: adapter.experiment_name().to_string(),
        });
    }

    // Objective columns of the frontier, in `metric_order`.
    let mut columns = Vec::new();
    let mut signs = Vec::new();
    let mut names = Vec::new();
    for (i, name) in metric_order.iter().enumerate() {
        if multiplier[i] == 0.0 {
            continue;
        }
        let Some(j) = frontier.metric_names.iter().position(|m| m == name) else {
            continue;
        };
        if frontier.objective_weights[j] == 0.0 {
            continue;
        }
        columns.push(j);
        signs.push(multiplier[i]);
        names.push(name.as_str());
    }

    let maximized: Vec<Vec<f64>> = frontier
        .outcomes
        .iter()
        .map(|row| columns.iter().zip(&signs).map(|(&j, s)| s * row[j]).collect())
        .collect();
    let raw = rule.infer(&maximized)?;
    let reference: Vec<f64> = raw.iter().zip(&signs).map(|(r, s)| r * s).collect();

    let mut thresholds = config.objective_thresholds.clone();
    for t in thresholds.iter_mut() {
        if let Some(k) = names.iter().position(|n| *n == t.metric.name) {
            t.bound = reference[k];
            t.relative = false;
        }
    }
    Ok(thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{
        Arm, Data, DataRow, InMemoryExperiment, Metric, OptimizationConfig, Parameterization,
    };

    fn adapter_with_constraint() -> ObservedAdapter {
        let config = OptimizationConfig::new(vec![Metric::maximize("a"), Metric::maximize("b")])
            .with_constraints(vec![OutcomeConstraint::new(
                Metric::maximize("c"),
                ComparisonOp::Geq,
                1.0,
                false,
            )]);
        let exp = InMemoryExperiment::new("guard")
            .with_optimization_config(config)
            .with_arm(Arm::new("x", Parameterization::new()));
        let data = Data::new(vec![
            DataRow::new("x", "a", 1.0, 0.0),
            DataRow::new("x", "b", 1.0, 0.0),
            DataRow::new("x", "c", 0.0, 0.0),
        ]);
        ObservedAdapter::new(&exp, &data).unwrap()
    }

    #[test]
    fn guard_clears_and_restores_constraints() {
        let mut adapter = adapter_with_constraint();
        assert!(adapter.pareto_frontier_and_configs(&[]).unwrap().observations.is_empty());
        {
            let cleared = ConstraintsCleared::new(&mut adapter);
            assert!(cleared.optimization_config().outcome_constraints.is_empty());
            assert_eq!(cleared.pareto_frontier_and_configs(&[]).unwrap().observations.len(), 1);
        }
        assert_eq!(adapter.optimization_config().outcome_constraints.len(), 1);
    }

    #[test]
    fn guard_restores_on_error_path() {
        fn fails(adapter: &mut ObservedAdapter) -> Result<()> {
            let cleared = ConstraintsCleared::new(adapter);
            let bogus = ObjectiveThreshold::new(Metric::maximize("not-an-objective"), 0.0, false);
            cleared.pareto_frontier_and_configs(&[bogus])?;
            Ok(())
        }
        let mut adapter = adapter_with_constraint();
        assert!(fails(&mut adapter).is_err());
        assert_eq!(adapter.optimization_config().outcome_constraints.len(), 1);
    }
}
