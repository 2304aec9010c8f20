use crate::graph::tests::graph_from;
use crate::graph::Pair;
use crate::shelling::*;
use crate::LassoError;
use color_eyre::eyre::{Report, Result};
use lasso_phylo::TaxonId;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

const A: TaxonId = TaxonId(1);
const B: TaxonId = TaxonId(2);
const C: TaxonId = TaxonId(3);
const D: TaxonId = TaxonId(4);
const E: TaxonId = TaxonId(5);

fn diamond() -> Result<DistanceGraph, Report> {
    graph_from(4, &[(1, 2, 3.0), (1, 3, 8.0), (2, 3, 9.0), (2, 4, 10.0), (3, 4, 9.0)])
}

/// Five taxa of a tree, with three distances missing.
fn pentagon() -> Result<DistanceGraph, Report> {
    graph_from(
        5,
        &[(1, 2, 5.0), (1, 3, 9.0), (2, 3, 10.0), (2, 4, 16.0), (3, 4, 12.0), (3, 5, 13.0), (4, 5, 9.0)],
    )
}

/// Only A-B is unknown: the diamond on chord C-D is ambiguous, chords C-E and D-E disagree.
fn conflicting() -> Result<DistanceGraph, Report> {
    graph_from(
        5,
        &[
            (1, 3, 4.0), (1, 4, 5.0), (1, 5, 7.0), (2, 3, 5.0), (2, 4, 6.0),
            (2, 5, 9.0), (3, 4, 3.0), (3, 5, 5.0), (4, 5, 4.0),
        ],
    )
}

#[test]
fn infer_single_diamond() -> Result<(), Report> {
    let graph = diamond()?;
    let inference = infer_distance(&graph, &Diamond::new(Pair(A, D), Pair(B, C)));
    assert_eq!(inference, Inference::Resolved(9.0));
    Ok(())
}

#[test]
fn infer_incomplete_diamond() -> Result<(), Report> {
    let mut graph = diamond()?;
    graph.remove_distance(B, D);
    let inference = infer_distance(&graph, &Diamond::new(Pair(A, D), Pair(B, C)));
    assert_eq!(inference, Inference::Incomplete);
    Ok(())
}

#[test]
fn infer_ambiguous_star() -> Result<(), Report> {
    // a star: every parallel sum is equal
    let graph = graph_from(4, &[(1, 2, 2.0), (1, 3, 2.0), (2, 3, 2.0), (2, 4, 2.0), (3, 4, 2.0)])?;
    let inference = infer_distance(&graph, &Diamond::new(Pair(A, D), Pair(B, C)));
    assert_eq!(inference, Inference::Ambiguous);
    Ok(())
}

#[test]
fn shell_diamond_both_strategies() -> Result<(), Report> {
    for strategy in [ShellingStrategy::Naive, ShellingStrategy::Incremental] {
        let mut graph = diamond()?;
        let report = strategy.shell(&mut graph, &StepBudget::unlimited())?;
        assert_eq!(graph.distance(A, D), 9.0, "{strategy}");
        assert_eq!(report.inferred, 1);
        assert!(graph.is_complete());
    }
    Ok(())
}

#[test]
fn shell_pentagon_naive() -> Result<(), Report> {
    let mut graph = pentagon()?;
    let report = naive(&mut graph, &StepBudget::unlimited())?;
    assert_eq!(graph.distance(A, D), 15.0);
    assert_eq!(graph.distance(A, E), 16.0);
    assert_eq!(graph.distance(B, E), 17.0);
    assert_eq!(report, ShellingReport { rounds: 2, inferred: 3, ambiguous: 0 });
    Ok(())
}

#[test]
fn shell_pentagon_incremental() -> Result<(), Report> {
    let mut graph = pentagon()?;
    let report = incremental(&mut graph, &StepBudget::unlimited())?;
    assert_eq!(graph.distance(A, D), 15.0);
    assert_eq!(graph.distance(A, E), 16.0);
    assert_eq!(graph.distance(B, E), 17.0);
    assert_eq!(report.rounds, 3);
    assert_eq!(report.inferred, 3);
    assert!(graph.is_complete());
    Ok(())
}

#[test]
fn shell_round_budget() -> Result<(), Report> {
    let mut graph = pentagon()?;
    let result = incremental(&mut graph, &StepBudget::rounds(1));
    assert_eq!(result, Err(LassoError::Interrupted { operation: "incremental shelling", rounds: 1 }));
    // the first round still ran
    assert!(graph.edge_count() > 7);
    Ok(())
}

#[test]
fn shell_cancelled() -> Result<(), Report> {
    let mut graph = pentagon()?;
    let cancel = Arc::new(AtomicBool::new(true));
    let result = naive(&mut graph, &StepBudget::unlimited().with_cancel(cancel));
    assert_eq!(result, Err(LassoError::Interrupted { operation: "naive shelling", rounds: 0 }));
    assert_eq!(graph.edge_count(), 7);
    Ok(())
}

#[test]
fn shell_conflicting_diamonds() -> Result<(), Report> {
    let graph = conflicting()?;
    assert_eq!(infer_distance(&graph, &Diamond::new(Pair(A, B), Pair(C, D))), Inference::Ambiguous);
    assert_eq!(infer_distance(&graph, &Diamond::new(Pair(A, B), Pair(C, E))), Inference::Resolved(8.0));
    assert_eq!(infer_distance(&graph, &Diamond::new(Pair(A, B), Pair(D, E))), Inference::Resolved(10.0));

    // the first diamond that resolves, in sorted order, sets the distance for good
    for strategy in [ShellingStrategy::Naive, ShellingStrategy::Incremental] {
        let mut graph = conflicting()?;
        let report = strategy.shell(&mut graph, &StepBudget::unlimited())?;
        assert_eq!(graph.distance(A, B), 8.0, "{strategy}");
        assert_eq!(report, ShellingReport { rounds: 2, inferred: 1, ambiguous: 1 }, "{strategy}");
    }
    Ok(())
}
