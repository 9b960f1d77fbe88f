use pareto_frontiers::extract::extract_pareto_2d;
use pareto_frontiers::relativize::{derelativize, relativize_with, Baseline, RelativizeOptions};
use pareto_frontiers::{dominates, nondominated_indices, Direction};
use proptest::prelude::*;

fn dirs(minimize: (bool, bool)) -> [Direction; 2] {
    let d = |m: bool| if m { Direction::Minimize } else { Direction::Maximize };
    [d(minimize.0), d(minimize.1)]
}

proptest! {
    #[test]
    fn test_extracted_frontier_invariant(
        values in prop::collection::vec(prop::collection::vec(-10.0..10.0f64, 2), 1..60),
        minimize in (any::<bool>(), any::<bool>()),
    ) {
        let front = extract_pareto_2d(&values, None, minimize).unwrap();
        let directions = dirs(minimize);

        // Every frontier point is an input point.
        for p in &front {
            assert!(values.iter().any(|v| v[0] == p[0] && v[1] == p[1]));
        }
        // No point on the frontier dominates another.
        for i in 0..front.len() {
            for j in 0..front.len() {
                if i == j { continue; }
                assert!(!dominates(&directions, 0.0, &front[i], &front[j]),
                    "Point {:?} dominates {:?}", front[i], front[j]);
            }
        }
        // Every input point not on the frontier is dominated by one that is.
        for v in &values {
            let on_front = front.iter().any(|p| p[0] == v[0] && p[1] == v[1]);
            if !on_front {
                assert!(front.iter().any(|p| dominates(&directions, 0.0, p, v)));
            }
        }
        // Sorted by the first outcome descending.
        for w in front.windows(2) {
            assert!(w[0][0] >= w[1][0]);
        }
    }

    #[test]
    fn test_reference_point_is_strict(
        values in prop::collection::vec(prop::collection::vec(0.0..1.0f64, 2), 1..60),
        rp in (0.0..1.0f64, 0.0..1.0f64),
    ) {
        let front = extract_pareto_2d(&values, Some([rp.0, rp.1]), false).unwrap();
        for p in &front {
            assert!(p[0] > rp.0 && p[1] > rp.1);
        }
        // Nothing above the reference point is lost entirely.
        let above = values.iter().any(|v| v[0] > rp.0 && v[1] > rp.1);
        assert_eq!(above, !front.is_empty());
    }

    #[test]
    fn test_minimizing_matches_maximizing_negated(
        values in prop::collection::vec(prop::collection::vec(-5.0..5.0f64, 2), 1..40),
    ) {
        let negated: Vec<Vec<f64>> = values.iter().map(|v| vec![-v[0], -v[1]]).collect();
        let min_front = extract_pareto_2d(&values, None, true).unwrap();
        let max_front: Vec<[f64; 2]> = extract_pareto_2d(&negated, None, false)
            .unwrap()
            .into_iter()
            .map(|p| [-p[0], -p[1]])
            .collect();

        let mut a = min_front;
        let mut b = max_front;
        a.sort_by(|x, y| x.partial_cmp(y).unwrap());
        b.sort_by(|x, y| x.partial_cmp(y).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_nondominated_indices_mixed_directions(
        values in prop::collection::vec(prop::collection::vec(0.0..1.0f64, 3), 1..40),
    ) {
        let directions = [Direction::Maximize, Direction::Minimize, Direction::Maximize];
        let idx = nondominated_indices(&values, &directions, 0.0);
        assert!(!idx.is_empty());
        for w in idx.windows(2) {
            assert!(w[0] < w[1], "indices come back in input order");
        }
        for (i, v) in values.iter().enumerate() {
            let dominated = values.iter().any(|u| dominates(&directions, 0.0, u, v));
            assert_eq!(idx.contains(&i), !dominated);
        }
    }

    #[test]
    fn test_relativize_round_trip(
        means in prop::collection::vec(1.0..1000.0f64, 1..20),
        baseline in 1.0..1000.0f64,
        s_c in 0.0..10.0f64,
    ) {
        let sems = vec![1.0; means.len()];
        let (rel, rel_sems) = relativize_with(
            &means,
            &sems,
            Baseline::new(baseline, s_c),
            &RelativizeOptions::default(),
        )
        .unwrap();
        for ((m, r), s) in means.iter().zip(&rel).zip(&rel_sems) {
            let back = derelativize(*r, baseline);
            assert!((back - m).abs() <= 1e-9 * m.abs().max(1.0), "{m} -> {r} -> {back}");
            assert!(s.is_finite() && *s > 0.0);
        }
    }
}
