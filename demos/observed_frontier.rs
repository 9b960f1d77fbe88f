//! Observed frontier of a small A/B-style experiment, plus inferred thresholds.
//!
//! Run with `cargo run --example observed_frontier`.

use pareto_frontiers::experiment::{
    Arm, Data, DataRow, InMemoryExperiment, Metric, OptimizationConfig, Parameterization,
};
use pareto_frontiers::{
    infer_reference_point, observed_pareto_frontiers, ObjectiveThreshold, ObservedFrontierRequest,
};

fn arm(name: &str, batch_size: i64) -> Arm {
    Arm::new(name, Parameterization::from([("batch_size".to_string(), batch_size.into())]))
}

fn main() -> pareto_frontiers::Result<()> {
    // Maximize throughput, minimize p99 latency.
    let config = OptimizationConfig::new(vec![Metric::maximize("throughput"), Metric::minimize("latency")])
        .with_thresholds(vec![
            ObjectiveThreshold::new(Metric::maximize("throughput"), -5.0, true),
            ObjectiveThreshold::new(Metric::minimize("latency"), 20.0, true),
        ]);

    let rows = [
        ("control", 1000.0, 12.0, 50.0, 1.5),
        ("b16", 1150.0, 15.0, 54.0, 1.8),
        ("b32", 1320.0, 18.0, 59.0, 2.0),
        ("b64", 1290.0, 20.0, 71.0, 2.4),
        ("b128", 1400.0, 22.0, 88.0, 3.1),
    ];
    let data = Data::new(
        rows.iter()
            .flat_map(|&(arm, tp, tp_sem, lat, lat_sem)| {
                [
                    DataRow::new(arm, "throughput", tp, tp_sem),
                    DataRow::new(arm, "latency", lat, lat_sem),
                ]
            })
            .collect(),
    );

    let experiment = InMemoryExperiment::new("batching")
        .with_optimization_config(config)
        .with_status_quo(arm("control", 8))
        .with_arm(arm("b16", 16))
        .with_arm(arm("b32", 32))
        .with_arm(arm("b64", 64))
        .with_arm(arm("b128", 128))
        .with_data(data);

    for results in observed_pareto_frontiers(&experiment, &ObservedFrontierRequest::new())? {
        println!(
            "{} vs {} ({} points)",
            results.primary_metric(),
            results.secondary_metric(),
            results.len()
        );
        let names = results.arm_names().unwrap_or_default();
        let primary = results.means(results.primary_metric()).unwrap_or_default();
        let secondary = results.means(results.secondary_metric()).unwrap_or_default();
        for ((name, p), s) in names.iter().zip(primary).zip(secondary) {
            println!(
                "  {:<8} {:>+7.2}%  {:>+7.2}%",
                name.as_deref().unwrap_or("?"),
                p,
                s
            );
        }
    }

    println!("inferred thresholds:");
    for t in infer_reference_point(&experiment)? {
        println!("  {} {:?} {:.2}", t.metric.name, t.op, t.bound);
    }
    Ok(())
}
