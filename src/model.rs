//! Surrogate-model seam used by the posterior frontier.
//!
//! Fitting, generation and prediction are implemented elsewhere; this module only fixes
//! the shapes that cross the boundary.

use thiserror::Error;

use crate::adapter::{ObservationData, ObservationFeatures};
use crate::experiment::{Data, Metric, OutcomeConstraint, Parameterization};

/// Failures reported by a surrogate model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("model fit failed: {0}")]
    Fit(String),
    #[error("candidate generation failed: {0}")]
    Generation(String),
    #[error("prediction failed: {0}")]
    Prediction(String),
    /// The requested point lies outside the region the model was fit on.
    #[error("point is out of design: {0}")]
    OutOfDesign(String),
}

/// Acquisition strategy requested at fit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Acquisition {
    /// Optimize the posterior mean of the scalarized objective.
    #[default]
    PosteriorMean,
}

/// Weighted sum of two metrics, always maximized.
///
/// Minimized metrics carry negative weights.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalarizedObjective {
    pub metrics: [Metric; 2],
    pub weights: [f64; 2],
}

impl ScalarizedObjective {
    pub fn value(&self, outcomes: [f64; 2]) -> f64 {
        self.weights[0] * outcomes[0] + self.weights[1] * outcomes[1]
    }
}

/// Optimization target handed to the model for fitting and generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalarizedConfig {
    pub objective: ScalarizedObjective,
    pub outcome_constraints: Vec<OutcomeConstraint>,
}

impl ScalarizedConfig {
    pub fn new(
        primary: &Metric,
        secondary: &Metric,
        weights: [f64; 2],
        outcome_constraints: &[OutcomeConstraint],
    ) -> Self {
        Self {
            objective: ScalarizedObjective {
                metrics: [primary.clone(), secondary.clone()],
                weights,
            },
            outcome_constraints: outcome_constraints.to_vec(),
        }
    }
}

/// Per-call generation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenOptions {
    /// Use augmented Chebyshev scalarization instead of a plain weighted sum.
    pub chebyshev_scalarization: bool,
}

/// A fitted model.
pub trait SurrogateModel {
    /// Posterior mean and covariance at each of `points`, in order.
    fn predict(&self, points: &[ObservationFeatures]) -> Result<Vec<ObservationData>, ModelError>;

    /// Generate `n` new parameterizations optimizing `config`.
    fn generate(
        &self,
        n: usize,
        options: &GenOptions,
        config: &ScalarizedConfig,
    ) -> Result<Vec<Parameterization>, ModelError>;
}

/// Fits a [`SurrogateModel`] for an experiment.
pub trait SurrogateFitter<E: ?Sized> {
    type Model: SurrogateModel;

    fn fit(
        &self,
        experiment: &E,
        data: Option<&Data>,
        acquisition: Acquisition,
        config: &ScalarizedConfig,
    ) -> Result<Self::Model, ModelError>;
}
