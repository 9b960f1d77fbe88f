//! Percent change relative to a baseline ("status quo") arm.
//!
//! With uncertainties on both sides the ratio is estimated with the delta method:
//!
//! ```text
//!   r      = (m_t - m_c) / |m_c|
//!   var(r) = (s_t^2 + (m_t / m_c)^2 * s_c^2) / m_c^2
//! ```
//!
//! and both are reported as percents. The second-order bias term `m_t * s_c^2 / |m_c|^3`
//! is subtracted from `r` only when [`RelativizeOptions::bias_correction`] is set.
//! When any uncertainty is missing (NaN) only the means are converted, as
//! `(m_t / m_c - 1) * 100`, and the uncertainties come back NaN.
//!
//! A baseline mean with magnitude below [`MIN_BASELINE_MAGNITUDE`] is rejected on every
//! path instead of producing infinities.

use crate::error::{ParetoError, Result};

/// Smallest baseline mean magnitude accepted as a ratio denominator.
pub const MIN_BASELINE_MAGNITUDE: f64 = 1e-10;

/// Mean and standard error of the baseline arm for one metric.
///
/// `sem` is NaN when the baseline uncertainty is unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Baseline {
    pub mean: f64,
    pub sem: f64,
}

impl Baseline {
    pub fn new(mean: f64, sem: f64) -> Self {
        Self { mean, sem }
    }

    /// A baseline with unknown uncertainty.
    pub fn mean_only(mean: f64) -> Self {
        Self {
            mean,
            sem: f64::NAN,
        }
    }

    fn check(&self) -> Result<()> {
        if self.mean.is_nan() || self.mean.abs() < MIN_BASELINE_MAGNITUDE {
            return Err(ParetoError::BaselineNearZero { mean: self.mean });
        }
        Ok(())
    }
}

/// Knobs for the delta-method branch. The default is the plain first-order estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelativizeOptions {
    /// Subtract the second-order bias term of the ratio estimator.
    pub bias_correction: bool,
}

impl RelativizeOptions {
    pub fn with_bias_correction(mut self, bias_correction: bool) -> Self {
        self.bias_correction = bias_correction;
        self
    }
}

/// Relativize `means`/`sems` against `baseline` with default options.
///
/// `sems` is either parallel to `means` or empty (all missing).
///
/// ```rust
/// use pareto_frontiers::relativize::{relativize, Baseline};
///
/// let (rel, _) = relativize(&[110.0], &[f64::NAN], Baseline::mean_only(100.0)).unwrap();
/// assert!((rel[0] - 10.0).abs() < 1e-9);
/// ```
pub fn relativize(means: &[f64], sems: &[f64], baseline: Baseline) -> Result<(Vec<f64>, Vec<f64>)> {
    relativize_with(means, sems, baseline, &RelativizeOptions::default())
}

/// Relativize `means`/`sems` against `baseline` as percents.
pub fn relativize_with(
    means: &[f64],
    sems: &[f64],
    baseline: Baseline,
    options: &RelativizeOptions,
) -> Result<(Vec<f64>, Vec<f64>)> {
    if !sems.is_empty() && sems.len() != means.len() {
        return Err(ParetoError::invalid(
            "sems",
            format!("expected {} entries or none, got {}", means.len(), sems.len()),
        ));
    }
    baseline.check()?;

    let sems_missing = sems.is_empty() || sems.iter().any(|s| s.is_nan());
    if baseline.sem.is_nan() || sems_missing {
        let rel = means
            .iter()
            .map(|&m| (m / baseline.mean - 1.0) * 100.0)
            .collect();
        return Ok((rel, vec![f64::NAN; means.len()]));
    }

    let m_c = baseline.mean;
    let s_c = baseline.sem;
    let abs_c = m_c.abs();
    let mut rel = Vec::with_capacity(means.len());
    let mut rel_sems = Vec::with_capacity(means.len());
    for (&m_t, &s_t) in means.iter().zip(sems) {
        let mut r = (m_t - m_c) / abs_c;
        if options.bias_correction {
            r -= m_t * s_c * s_c / (abs_c * abs_c * abs_c);
        }
        if m_t == m_c && s_t == s_c {
            r = 0.0;
        }
        let ratio = m_t / m_c;
        let var = (s_t * s_t + ratio * ratio * s_c * s_c) / (m_c * m_c);
        rel.push(r * 100.0);
        rel_sems.push(var.sqrt() * 100.0);
    }
    Ok((rel, rel_sems))
}

/// Percent change of a single point value (e.g. a threshold), without uncertainty.
pub fn relativize_point(value: f64, baseline_mean: f64) -> Result<f64> {
    Baseline::mean_only(baseline_mean).check()?;
    Ok((value / baseline_mean - 1.0) * 100.0)
}

/// Absolute value of a percent change: `(1 + relative / 100) * baseline_mean`.
pub fn derelativize(relative: f64, baseline_mean: f64) -> f64 {
    (1.0 + relative / 100.0) * baseline_mean
}
