//! Reference points from a maximize-oriented Pareto front.

use crate::error::{ParetoError, Result};

/// Floor on the per-objective range used to offset the nadir.
pub const MIN_Y_RANGE: f64 = 1e-7;

/// Picks one worst-case-but-attainable reference value per objective.
///
/// Every objective of `pareto_y` is "higher is better".
pub trait ReferencePointRule {
    fn infer(&self, pareto_y: &[Vec<f64>]) -> Result<Vec<f64>>;
}

/// Nadir point pushed down by a fraction of the front's range:
/// `nadir - scale * (ideal - nadir)`.
///
/// For a single point the range is `|nadir|`. Every range is floored at
/// [`MIN_Y_RANGE`]. `scale` must be finite and non-negative, so the reference point
/// never lies above the nadir.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaledNadir {
    pub scale: f64,
}

impl Default for ScaledNadir {
    fn default() -> Self {
        Self { scale: 0.1 }
    }
}

impl ScaledNadir {
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

impl ReferencePointRule for ScaledNadir {
    fn infer(&self, pareto_y: &[Vec<f64>]) -> Result<Vec<f64>> {
        if !(self.scale.is_finite() && self.scale >= 0.0) {
            return Err(ParetoError::invalid(
                "scale",
                format!("must be finite and non-negative, got {}", self.scale),
            ));
        }
        let Some(first) = pareto_y.first() else {
            return Err(ParetoError::invalid(
                "pareto_y",
                "cannot infer a reference point from an empty front",
            ));
        };
        let d = first.len();
        if d == 0 || pareto_y.iter().any(|p| p.len() != d) {
            return Err(ParetoError::invalid(
                "pareto_y",
                "points must be non-empty and have consistent dimensionality",
            ));
        }

        let mut nadir = vec![f64::INFINITY; d];
        let mut ideal = vec![f64::NEG_INFINITY; d];
        for (pi, p) in pareto_y.iter().enumerate() {
            for (di, &v) in p.iter().enumerate() {
                if !v.is_finite() {
                    return Err(ParetoError::NonFinite {
                        point_idx: pi,
                        dim_idx: di,
                    });
                }
                nadir[di] = nadir[di].min(v);
                ideal[di] = ideal[di].max(v);
            }
        }

        let single = pareto_y.len() == 1;
        Ok(nadir
            .iter()
            .zip(&ideal)
            .map(|(&lo, &hi)| {
                let range = if single { lo.abs() } else { hi - lo };
                lo - self.scale * range.max(MIN_Y_RANGE)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nadir_is_offset_by_range() {
        let y = vec![vec![1.0, 4.0], vec![2.0, 3.0], vec![3.0, 1.0]];
        let rp = ScaledNadir::default().infer(&y).unwrap();
        assert!((rp[0] - 0.8).abs() < 1e-12);
        assert!((rp[1] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn single_point_uses_magnitude() {
        let rp = ScaledNadir::default().infer(&[vec![-2.0, 0.0]]).unwrap();
        assert!((rp[0] + 2.2).abs() < 1e-12);
        assert!(rp[1] < 0.0);
    }

    #[test]
    fn empty_front_is_rejected() {
        assert!(ScaledNadir::default().infer(&[]).is_err());
    }

    #[test]
    fn zero_scale_returns_the_nadir() {
        let y = vec![vec![1.0, 4.0], vec![3.0, 1.0]];
        let rp = ScaledNadir::default().with_scale(0.0).infer(&y).unwrap();
        assert_eq!(rp, vec![1.0, 1.0]);
    }

    #[test]
    fn negative_or_non_finite_scale_is_rejected() {
        let y = vec![vec![1.0, 4.0], vec![3.0, 1.0]];
        for scale in [-0.1, f64::NAN, f64::INFINITY] {
            let err = ScaledNadir::default().with_scale(scale).infer(&y).unwrap_err();
            assert!(
                matches!(err, ParetoError::InvalidArgument { argument: "scale", .. }),
                "scale {scale}"
            );
        }
    }
}
