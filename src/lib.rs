//! Pareto frontiers of multi-objective experiments.
//!
//! Three ways to get at a frontier:
//!
//! - [`observed_pareto_frontiers`]: the non-dominated arms among observed data, one
//!   result per pair of objectives, reported relative to the status quo arm or in
//!   absolute units.
//! - [`compute_posterior_pareto_frontier`]: a model-predicted frontier for two
//!   objectives, traced by sweeping scalarization weights over a quarter circle.
//! - [`extract_pareto_2d`]: the non-dominated subset of raw outcome pairs.
//!
//! [`infer_reference_point`] derives objective thresholds from the observed front when
//! the user has not supplied any.
//!
//! Experiments and models are reached through the [`Experiment`] and
//! [`SurrogateFitter`] traits; [`experiment::InMemoryExperiment`] is a ready-made
//! experiment backed by plain data.

pub mod adapter;
pub mod error;
pub mod experiment;
pub mod extract;
pub mod model;
pub mod nadir;
pub mod observed;
pub mod posterior;
pub mod reference;
pub mod relativize;
pub mod results;

pub use error::{ParetoError, Result};
pub use experiment::{Experiment, Metric, ObjectiveThreshold, OptimizationConfig, OutcomeConstraint};
pub use extract::{extract_pareto_2d, Orientation};
pub use model::{SurrogateFitter, SurrogateModel};
pub use observed::{observed_pareto_frontiers, ObservedFrontierRequest};
pub use posterior::{compute_posterior_pareto_frontier, PosteriorFrontierRequest};
pub use reference::{infer_reference_point, infer_reference_point_with};
pub use relativize::{relativize, Baseline, RelativizeOptions};
pub use results::ParetoFrontierResults;

/// Direction of optimization for a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Higher values are better.
    Maximize,
    /// Lower values are better.
    Minimize,
}

/// Keep-mask of the non-dominated rows in maximize space.
///
/// Equal rows never dominate each other, so duplicates are all kept.
pub(crate) fn nondominated_mask_max(points: &[Vec<f64>], eps: f64) -> Vec<bool> {
    (0..points.len())
        .map(|i| {
            !points
                .iter()
                .enumerate()
                .any(|(j, q)| j != i && dominates_max(q, &points[i], eps))
        })
        .collect()
}

/// Indices of the non-dominated rows of `points` under `directions`, in input order.
///
/// ```rust
/// use pareto_frontiers::{nondominated_indices, Direction};
///
/// // Maximize accuracy, minimize latency.
/// let points = vec![vec![0.92, 80.0], vec![0.90, 80.0], vec![0.95, 120.0]];
/// let dirs = [Direction::Maximize, Direction::Minimize];
/// assert_eq!(nondominated_indices(&points, &dirs, 0.0), vec![0, 2]);
/// ```
pub fn nondominated_indices(points: &[Vec<f64>], directions: &[Direction], eps: f64) -> Vec<usize> {
    (0..points.len())
        .filter(|&i| {
            !points
                .iter()
                .enumerate()
                .any(|(j, q)| j != i && dominates(directions, eps, q, &points[i]))
        })
        .collect()
}

fn dominates_max(a: &[f64], b: &[f64], eps: f64) -> bool {
    let mut strictly_better = false;
    for (&av, &bv) in a.iter().zip(b.iter()) {
        if av + eps < bv {
            return false;
        }
        if av > bv + eps {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Standalone dominance check: `a` is at least as good as `b` everywhere (within
/// `eps`) and strictly better somewhere.
pub fn dominates(directions: &[Direction], eps: f64, a: &[f64], b: &[f64]) -> bool {
    let mut strictly_better = false;
    for (i, (&av, &bv)) in a.iter().zip(b.iter()).enumerate() {
        let dir = directions[i];
        match dir {
            Direction::Maximize => {
                if av + eps < bv {
                    return false;
                }
                if av > bv + eps {
                    strictly_better = true;
                }
            }
            Direction::Minimize => {
                if av > bv + eps {
                    return false;
                }
                if av + eps < bv {
                    strictly_better = true;
                }
            }
        }
    }
    strictly_better
}
