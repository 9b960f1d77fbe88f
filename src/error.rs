//! Error types for frontier computation.

use thiserror::Error;

use crate::experiment::DataError;
use crate::model::ModelError;

/// Convenience alias used throughout the crate.
pub type Result<T, E = ParetoError> = std::result::Result<T, E>;

/// Errors returned by frontier extraction, relativization and the builders.
#[derive(Debug, Error)]
pub enum ParetoError {
    /// The experiment has no optimization config at all.
    #[error("experiment `{experiment}` must have an optimization config")]
    MissingOptimizationConfig { experiment: String },

    /// A multi-objective config was required but the experiment is single objective.
    #[error("this operation works for multi-objective experiments only; experiment `{experiment}` is single objective")]
    NotMultiObjective { experiment: String },

    /// Relativity was left to the thresholds but some objective has none.
    #[error(
        "objective `{metric}` is missing an objective threshold; relativity must be \
         specified explicitly when objective thresholds are missing"
    )]
    MissingObjectiveThresholds { metric: String },

    /// A metric name that the experiment (or the training data) does not know about.
    #[error("unknown metric `{metric}`: {context}")]
    UnknownMetric { metric: String, context: String },

    /// A data row refers to an arm the experiment does not define.
    #[error("arm `{arm}` is not defined on the experiment")]
    UnknownArm { arm: String },

    /// A plain argument validation failure.
    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument { argument: &'static str, reason: String },

    /// An outcome constraint names one of the objectives being traded off.
    #[error("metric `{metric}` occurs in both outcome constraints and objectives")]
    ObjectiveConstrained { metric: String },

    /// Relative reporting was requested but there is no baseline to relativize against.
    #[error("relativized metric `{metric}` requires a valid status quo baseline")]
    MissingBaseline { metric: String },

    /// The baseline mean is too close to zero for a ratio to be meaningful.
    #[error("baseline mean {mean} is too close to 0 to relativize against")]
    BaselineNearZero { mean: f64 },

    /// Frontier extraction only handles two outcomes.
    #[error("only the 2-dimensional case is handled, got {dims} dimensions")]
    UnsupportedDimension { dims: usize },

    /// A value was NaN or infinite.
    #[error("outcome value at [{point_idx}][{dim_idx}] is not finite")]
    NonFinite { point_idx: usize, dim_idx: usize },

    /// Batch trials make it ambiguous which trial's data to model.
    #[error("must specify a trial index or data for an experiment with batch trials")]
    BatchTrialsNeedData,

    /// No frontier point survived and there were no constraints to relax.
    #[error(
        "no frontier observations found in experiment `{experiment}` and no constraints \
         are present; check the experiment data"
    )]
    EmptyFrontier { experiment: String },

    /// The experiment has no usable observations.
    #[error("experiment `{experiment}` has no observations")]
    NoData { experiment: String },

    /// Fields meant to be parallel to the parameterizations disagree in length.
    #[error("`{field}` has length {actual}, expected {expected} (one per parameterization)")]
    ParallelLengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// Fitting, generation or prediction failed in the surrogate model.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Reading data from the experiment store failed.
    #[error(transparent)]
    Data(#[from] DataError),
}

impl ParetoError {
    pub(crate) fn invalid(argument: &'static str, reason: impl Into<String>) -> Self {
        ParetoError::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }
}
