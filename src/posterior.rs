//! Frontier between two objectives from a surrogate model's posterior mean.
//!
//! The two objectives are scalarized with weight vectors swept over the angle range
//! `(0, pi/2)`. Each weighting yields one generated point, and all points are then
//! predicted in a single batch and relativized against the predicted status quo.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use tracing::{debug, info, warn};

use crate::adapter::{ObservationData, ObservationFeatures};
use crate::error::{ParetoError, Result};
use crate::experiment::{Data, Experiment, Metric, OutcomeConstraint, Parameterization};
use crate::model::{
    Acquisition, GenOptions, ModelError, ScalarizedConfig, SurrogateFitter, SurrogateModel,
};
use crate::relativize::{relativize_with, Baseline, RelativizeOptions};
use crate::results::{MetricSeries, ParetoFrontierResults};

/// Number of frontier points generated when not configured.
pub const DEFAULT_NUM_POINTS: usize = 10;

/// Distance kept from `0` and `pi/2` so neither weight is ever exactly zero.
pub const DEFAULT_ANGLE_MARGIN: f64 = 0.01;

/// Inputs of [`compute_posterior_pareto_frontier`].
#[derive(Debug, Clone)]
pub struct PosteriorFrontierRequest {
    primary: Metric,
    secondary: Metric,
    data: Option<Data>,
    outcome_constraints: Vec<OutcomeConstraint>,
    absolute_metrics: Vec<String>,
    num_points: usize,
    trial_index: Option<u64>,
    chebyshev: bool,
    angle_margin: f64,
    relativize: RelativizeOptions,
}

impl PosteriorFrontierRequest {
    pub fn new(primary: Metric, secondary: Metric) -> Self {
        Self {
            primary,
            secondary,
            data: None,
            outcome_constraints: Vec::new(),
            absolute_metrics: Vec::new(),
            num_points: DEFAULT_NUM_POINTS,
            trial_index: None,
            chebyshev: true,
            angle_margin: DEFAULT_ANGLE_MARGIN,
            relativize: RelativizeOptions::default(),
        }
    }

    /// Model this data instead of fetching from the experiment.
    pub fn with_data(mut self, data: Data) -> Self {
        self.data = Some(data);
        self
    }

    /// Constraints on metrics other than the two objectives.
    pub fn with_outcome_constraints(mut self, constraints: Vec<OutcomeConstraint>) -> Self {
        self.outcome_constraints = constraints;
        self
    }

    /// Metrics reported in absolute units; all others are relative to the status quo.
    pub fn with_absolute_metrics(mut self, metrics: Vec<String>) -> Self {
        self.absolute_metrics = metrics;
        self
    }

    pub fn with_num_points(mut self, num_points: usize) -> Self {
        self.num_points = num_points;
        self
    }

    pub fn with_trial_index(mut self, trial_index: u64) -> Self {
        self.trial_index = Some(trial_index);
        self
    }

    pub fn with_chebyshev(mut self, chebyshev: bool) -> Self {
        self.chebyshev = chebyshev;
        self
    }

    pub fn with_angle_margin(mut self, margin: f64) -> Self {
        self.angle_margin = margin;
        self
    }

    pub fn with_relativize_options(mut self, options: RelativizeOptions) -> Self {
        self.relativize = options;
        self
    }
}

/// Unit weight vectors `(s_p * cos(a), s_s * sin(a))` for `num_points` angles spaced
/// evenly over `[margin, pi/2 - margin]`, where `s_*` is `-1` for minimized metrics.
///
/// ```rust
/// use pareto_frontiers::experiment::Metric;
/// use pareto_frontiers::posterior::weight_sweep;
///
/// let w = weight_sweep(&Metric::maximize("a"), &Metric::minimize("b"), 3, 0.01);
/// assert_eq!(w.len(), 3);
/// assert!(w.iter().all(|[p, s]| *p > 0.0 && *s < 0.0));
/// ```
pub fn weight_sweep(
    primary: &Metric,
    secondary: &Metric,
    num_points: usize,
    margin: f64,
) -> Vec<[f64; 2]> {
    let start = margin;
    let end = FRAC_PI_2 - margin;
    let step = if num_points > 1 {
        (end - start) / (num_points - 1) as f64
    } else {
        0.0
    };
    (0..num_points)
        .map(|i| {
            let alpha = start + step * i as f64;
            [primary.sign() * alpha.cos(), secondary.sign() * alpha.sin()]
        })
        .collect()
}

fn validate_request<E: Experiment + ?Sized>(
    experiment: &E,
    request: &PosteriorFrontierRequest,
) -> Result<()> {
    if request.num_points == 0 {
        return Err(ParetoError::invalid("num_points", "must be at least 1"));
    }
    // A zero margin would give one objective a zero weight at the ends of the sweep.
    let margin = request.angle_margin;
    if !(margin > 0.0 && margin < FRAC_PI_4) {
        return Err(ParetoError::invalid(
            "angle_margin",
            format!("must lie in (0, pi/4), got {margin}"),
        ));
    }
    // Empty data is fetched from the experiment, so it counts as absent here.
    let has_data = request.data.as_ref().is_some_and(|d| !d.is_empty());
    if request.trial_index.is_none() && !has_data && experiment.has_batch_trials() {
        return Err(ParetoError::BatchTrialsNeedData);
    }
    for metric in &request.absolute_metrics {
        if !experiment.has_metric(metric) {
            return Err(ParetoError::UnknownMetric {
                metric: metric.clone(),
                context: "the model was not fit on it".to_string(),
            });
        }
    }
    for constraint in &request.outcome_constraints {
        let name = &constraint.metric.name;
        if *name == request.primary.name || *name == request.secondary.name {
            return Err(ParetoError::ObjectiveConstrained {
                metric: name.clone(),
            });
        }
    }
    Ok(())
}

fn resolve_data<E: Experiment + ?Sized>(
    experiment: &E,
    request: &PosteriorFrontierRequest,
) -> Option<Data> {
    if let Some(data) = request.data.as_ref().filter(|d| !d.is_empty()) {
        return Some(data.clone());
    }
    let fetched = match request.trial_index {
        Some(index) => experiment.fetch_trial_data(index),
        None => experiment.fetch_data(),
    };
    match fetched {
        Ok(data) => Some(data),
        Err(e) => {
            info!(error = %e, "could not fetch data from experiment or trial");
            None
        }
    }
}

fn predict_status_quo<M: SurrogateModel>(
    model: &M,
    parameters: &Parameterization,
    trial_index: Option<u64>,
) -> Option<ObservationData> {
    let features = ObservationFeatures::new(parameters.clone()).with_trial_index(trial_index);
    match model.predict(std::slice::from_ref(&features)) {
        Ok(mut predictions) if !predictions.is_empty() => Some(predictions.swap_remove(0)),
        Ok(_) => {
            warn!("status quo prediction came back empty");
            None
        }
        Err(e) => {
            warn!(error = %e, "could not predict status quo outcomes");
            None
        }
    }
}

/// Compute the posterior-mean frontier between `request`'s primary and secondary
/// objectives.
///
/// Exactly `num_points` single-point generations are requested from the model.
/// Every metric the model predicts and that is not listed as absolute is reported
/// as a percent change relative to the predicted status quo.
pub fn compute_posterior_pareto_frontier<E, F>(
    experiment: &E,
    fitter: &F,
    request: &PosteriorFrontierRequest,
) -> Result<ParetoFrontierResults>
where
    E: Experiment + ?Sized,
    F: SurrogateFitter<E>,
{
    validate_request(experiment, request)?;
    let data = resolve_data(experiment, request);

    let primary = &request.primary;
    let secondary = &request.secondary;
    let constraints = &request.outcome_constraints;

    let fit_config = ScalarizedConfig::new(
        primary,
        secondary,
        [primary.sign(), secondary.sign()],
        constraints,
    );
    let model = fitter.fit(
        experiment,
        data.as_ref(),
        Acquisition::PosteriorMean,
        &fit_config,
    )?;

    let status_quo = experiment
        .status_quo()
        .and_then(|arm| predict_status_quo(&model, &arm.parameters, request.trial_index));

    let options = GenOptions {
        chebyshev_scalarization: request.chebyshev,
    };
    let mut param_dicts = Vec::with_capacity(request.num_points);
    for weights in weight_sweep(primary, secondary, request.num_points, request.angle_margin) {
        debug!(?weights, "generating frontier point");
        let config = ScalarizedConfig::new(primary, secondary, weights, constraints);
        let generated = model.generate(1, &options, &config)?;
        let point = generated.into_iter().next().ok_or_else(|| {
            ModelError::Generation("model returned no candidate".to_string())
        })?;
        param_dicts.push(point);
    }

    let features: Vec<ObservationFeatures> = param_dicts
        .iter()
        .cloned()
        .map(ObservationFeatures::new)
        .collect();
    let predictions = model.predict(&features)?;
    if predictions.len() != param_dicts.len() {
        return Err(ModelError::Prediction(format!(
            "expected {} predictions, got {}",
            param_dicts.len(),
            predictions.len()
        ))
        .into());
    }

    let metrics = extract_metric_series(
        &predictions,
        &request.absolute_metrics,
        status_quo.as_ref(),
        &request.relativize,
    )?;

    ParetoFrontierResults::builder(param_dicts, metrics, &primary.name, &secondary.name)
        .with_absolute_metrics(request.absolute_metrics.clone())
        .build()
}

fn extract_metric_series(
    predictions: &[ObservationData],
    absolute_metrics: &[String],
    status_quo: Option<&ObservationData>,
    options: &RelativizeOptions,
) -> Result<Vec<MetricSeries>> {
    let metric_names = predictions
        .first()
        .map(|p| p.metric_names.clone())
        .unwrap_or_default();

    let mut series = Vec::with_capacity(metric_names.len());
    for name in metric_names {
        let mut means = Vec::with_capacity(predictions.len());
        let mut sems = Vec::with_capacity(predictions.len());
        for p in predictions {
            let (Some(mean), Some(sem)) = (p.mean(&name), p.sem(&name)) else {
                return Err(ModelError::Prediction(format!(
                    "metric `{name}` missing from a prediction"
                ))
                .into());
            };
            means.push(mean);
            sems.push(sem);
        }

        if !absolute_metrics.contains(&name) {
            let baseline = status_quo
                .and_then(|sq| Some(Baseline::new(sq.mean(&name)?, sq.sem(&name)?)))
                .ok_or_else(|| ParetoError::MissingBaseline {
                    metric: name.clone(),
                })?;
            (means, sems) = relativize_with(&means, &sems, baseline, options)?;
        }
        series.push(MetricSeries::new(name, means, sems));
    }
    Ok(series)
}
