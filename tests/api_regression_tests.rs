use pareto_frontiers::posterior::weight_sweep;
use pareto_frontiers::relativize::{
    relativize, relativize_point, relativize_with, Baseline, RelativizeOptions,
};
use pareto_frontiers::{
    dominates, extract_pareto_2d, nondominated_indices, Direction, Metric, Orientation,
    ParetoError,
};

#[test]
fn extract_rejects_non_finite_values() {
    let points = vec![vec![1.0, 2.0], vec![3.0, f64::INFINITY]];
    let err = extract_pareto_2d(&points, None, false).unwrap_err();
    assert!(matches!(
        err,
        ParetoError::NonFinite {
            point_idx: 1,
            dim_idx: 1
        }
    ));
}

#[test]
fn extract_rejects_one_dimensional_rows() {
    let points = vec![vec![1.0]];
    let err = extract_pareto_2d(&points, None, false).unwrap_err();
    assert!(matches!(err, ParetoError::UnsupportedDimension { dims: 1 }));
}

#[test]
fn dominates_is_irreflexive() {
    let eps = 1e-12;
    let a = [1.0, 2.0, 3.0];
    let dirs = [
        Direction::Maximize,
        Direction::Maximize,
        Direction::Minimize,
    ];
    assert!(!dominates(&dirs, eps, &a, &a));
}

#[test]
fn mixed_directions_dominance_example() {
    // Maximize accuracy, minimize latency.
    let dirs = [Direction::Maximize, Direction::Minimize];
    let eps = 1e-12;

    let a = [0.92, 80.0];
    let b = [0.90, 80.0];
    let c = [0.92, 120.0];

    assert!(dominates(&dirs, eps, &a, &b)); // better accuracy, equal latency
    assert!(dominates(&dirs, eps, &a, &c)); // equal accuracy, better latency
    assert!(!dominates(&dirs, eps, &c, &a));
}

#[test]
fn orientation_conversions_agree() {
    assert_eq!(Orientation::from(true), Orientation([Direction::Minimize; 2]));
    assert_eq!(Orientation::from(Direction::Maximize), Orientation::from(false));
    assert_eq!(
        Orientation::from((false, true)),
        Orientation::from([Direction::Maximize, Direction::Minimize])
    );
}

#[test]
fn extract_matches_the_worked_example() {
    // Maximize both; (1.5, 2) is dominated by (2, 3).
    let y = vec![vec![1.0, 4.0], vec![2.0, 3.0], vec![1.5, 2.0], vec![3.0, 1.0]];
    let front = extract_pareto_2d(&y, None, [Direction::Maximize; 2]).unwrap();
    assert_eq!(front, vec![[3.0, 1.0], [2.0, 3.0], [1.0, 4.0]]);

    let idx = nondominated_indices(&y, &[Direction::Maximize; 2], 0.0);
    assert_eq!(idx, vec![0, 1, 3]);
}

#[test]
fn extract_ties_keep_input_order() {
    let y = vec![vec![1.0, 2.0], vec![2.0, 1.0], vec![1.0, 2.0]];
    let front = extract_pareto_2d(&y, None, false).unwrap();
    assert_eq!(front, vec![[2.0, 1.0], [1.0, 2.0], [1.0, 2.0]]);
}

#[test]
fn nondominated_indices_empty() {
    let idx = nondominated_indices(&[], &[Direction::Maximize], 0.0);
    assert!(idx.is_empty());
}

// ---- relativization ----

#[test]
fn relativize_worked_example() {
    let (rel, sems) = relativize(&[110.0], &[3.0], Baseline::new(100.0, 2.0)).unwrap();
    assert!((rel[0] - 10.0).abs() < 1e-9);
    assert!(sems[0].is_finite());

    let biased = RelativizeOptions::default().with_bias_correction(true);
    let (rel, _) = relativize_with(&[110.0], &[3.0], Baseline::new(100.0, 2.0), &biased).unwrap();
    assert!((rel[0] - 9.956).abs() < 1e-9);
}

#[test]
fn negative_baseline_uses_its_magnitude() {
    // With uncertainties, going from -100 to -90 is +10%.
    let (rel, _) = relativize(&[-90.0], &[0.0], Baseline::new(-100.0, 0.0)).unwrap();
    assert!((rel[0] - 10.0).abs() < 1e-9);
    // The plain ratio keeps the sign of the baseline.
    assert!((relativize_point(-90.0, -100.0).unwrap() + 10.0).abs() < 1e-9);
}

#[test]
fn zero_baseline_is_an_error() {
    let err = relativize(&[1.0], &[], Baseline::mean_only(0.0)).unwrap_err();
    assert!(matches!(err, ParetoError::BaselineNearZero { .. }));
}

// ---- weight sweep ----

#[test]
fn weight_sweep_stays_inside_the_quadrant() {
    let w = weight_sweep(&Metric::maximize("a"), &Metric::minimize("b"), 5, 0.01);
    assert_eq!(w.len(), 5);
    assert!((w[0][0] - 0.01f64.cos()).abs() < 1e-12);
    assert!((w[0][1] + 0.01f64.sin()).abs() < 1e-12);
    let last = std::f64::consts::FRAC_PI_2 - 0.01;
    assert!((w[4][0] - last.cos()).abs() < 1e-12);
    assert!((w[4][1] + last.sin()).abs() < 1e-12);
}

#[test]
fn weight_sweep_single_point_uses_lower_angle() {
    let w = weight_sweep(&Metric::maximize("a"), &Metric::maximize("b"), 1, 0.01);
    assert_eq!(w.len(), 1);
    assert!((w[0][0] - 0.01f64.cos()).abs() < 1e-12);
}
