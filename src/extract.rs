//! Two-objective frontier extraction over raw outcome pairs.

use std::cmp::Ordering;

use crate::error::{ParetoError, Result};
use crate::{nondominated_mask_max, Direction};

/// Per-dimension directions for a pair of outcomes.
///
/// Converts from a single `bool` (`true` = minimize, broadcast to both dimensions),
/// a `(bool, bool)` pair, a single [`Direction`] or a `[Direction; 2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation(pub [Direction; 2]);

impl Orientation {
    fn minimizes(&self, dim: usize) -> bool {
        self.0[dim] == Direction::Minimize
    }

    fn sign(&self, dim: usize) -> f64 {
        if self.minimizes(dim) {
            -1.0
        } else {
            1.0
        }
    }
}

fn from_minimize(minimize: bool) -> Direction {
    if minimize {
        Direction::Minimize
    } else {
        Direction::Maximize
    }
}

impl From<bool> for Orientation {
    fn from(minimize: bool) -> Self {
        Orientation([from_minimize(minimize); 2])
    }
}

impl From<(bool, bool)> for Orientation {
    fn from((a, b): (bool, bool)) -> Self {
        Orientation([from_minimize(a), from_minimize(b)])
    }
}

impl From<Direction> for Orientation {
    fn from(d: Direction) -> Self {
        Orientation([d; 2])
    }
}

impl From<[Direction; 2]> for Orientation {
    fn from(d: [Direction; 2]) -> Self {
        Orientation(d)
    }
}

/// Return the non-dominated rows of `y`, sorted by the first outcome descending.
///
/// If `reference_point` is given, only rows strictly better than it in both dimensions
/// are considered. Duplicated points are all kept. Ties in the first outcome keep
/// their input order.
///
/// ```rust
/// use pareto_frontiers::extract::extract_pareto_2d;
///
/// let y = vec![vec![1.0, 4.0], vec![2.0, 3.0], vec![1.5, 2.0], vec![3.0, 1.0]];
/// // Both maximized: (1.5, 2.0) is dominated by (2.0, 3.0).
/// let front = extract_pareto_2d(&y, None, false).unwrap();
/// assert_eq!(front, vec![[3.0, 1.0], [2.0, 3.0], [1.0, 4.0]]);
/// ```
pub fn extract_pareto_2d(
    y: &[Vec<f64>],
    reference_point: Option<[f64; 2]>,
    minimize: impl Into<Orientation>,
) -> Result<Vec<[f64; 2]>> {
    let orientation = minimize.into();
    let mut rows: Vec<[f64; 2]> = Vec::with_capacity(y.len());
    for (pi, row) in y.iter().enumerate() {
        if row.len() != 2 {
            return Err(ParetoError::UnsupportedDimension { dims: row.len() });
        }
        for (di, &v) in row.iter().enumerate() {
            if !v.is_finite() {
                return Err(ParetoError::NonFinite {
                    point_idx: pi,
                    dim_idx: di,
                });
            }
        }
        rows.push([row[0], row[1]]);
    }

    if let Some(rp) = reference_point {
        rows.retain(|r| {
            (0..2).all(|i| {
                if orientation.minimizes(i) {
                    r[i] < rp[i]
                } else {
                    r[i] > rp[i]
                }
            })
        });
    }

    // Higher is better in every dimension from here on.
    let oriented: Vec<Vec<f64>> = rows
        .iter()
        .map(|r| vec![r[0] * orientation.sign(0), r[1] * orientation.sign(1)])
        .collect();
    let keep = nondominated_mask_max(&oriented, 0.0);

    let mut front: Vec<[f64; 2]> = oriented
        .iter()
        .zip(keep)
        .filter_map(|(p, ok)| ok.then(|| [p[0] * orientation.sign(0), p[1] * orientation.sign(1)]))
        .collect();
    front.sort_by(|a, b| b[0].partial_cmp(&a[0]).unwrap_or(Ordering::Equal));
    Ok(front)
}
