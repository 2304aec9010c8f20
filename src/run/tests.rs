use crate::agglomerate::{Agglomeration, Agglomerator, ModalUpdater};
use crate::chordal::tests::{random_tree, seven_taxa};
use crate::clique::{CliqueStrategy, ExactCliqueFinder};
use crate::graph::tests::graph_from;
use crate::graph::Traversal;
use crate::run::{agglomerate_best, complete, reconstruct, select_best, LassoArgs};
use crate::shelling::ShellingStrategy;
use crate::LassoError;
use color_eyre::eyre::{eyre, Report, Result};
use lasso_phylo::FromNewick;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn agglomerate(edges: &[(i32, i32, f64)], n: i32) -> Result<Agglomeration, Report> {
    let graph = graph_from(n, edges)?;
    Agglomerator::new(ExactCliqueFinder, ModalUpdater).run(&graph, &mut StdRng::seed_from_u64(0))
}

#[test]
fn reconstruct_round_trip() -> Result<(), Report> {
    let metric = seven_taxa()?;
    for seed_tree in [Traversal::Breadth, Traversal::Depth] {
        for shelling in [ShellingStrategy::Naive, ShellingStrategy::Incremental] {
            let args = LassoArgs { seed_tree, shelling, ..Default::default() };
            let reconstruction = reconstruct(&metric, &args)?;
            assert_eq!(reconstruction.covers.len(), 1);

            let cover = &reconstruction.covers[0];
            assert_eq!(cover.lasso.edge_count(), 11);
            assert!(cover.metric.is_complete());
            for (pair, distance) in metric.edges() {
                let inferred = cover.metric.distance(pair.0, pair.1);
                assert!((inferred - distance).abs() < 1e-3, "{pair}: {inferred} != {distance}");
            }
            assert_eq!(cover.quartets.len(), 35);
            assert_eq!(reconstruction.lasso().len(), 11);
            assert_eq!(reconstruction.largest().map(|c| c.metric.len()), Some(7));
        }
    }
    Ok(())
}

#[test]
fn reconstruct_random_trees() -> Result<(), Report> {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let taxa = rng.gen_range(5..=12);
        let metric = random_tree(taxa, &mut rng)?;
        for seed_tree in [Traversal::Breadth, Traversal::Depth] {
            for shelling in [ShellingStrategy::Naive, ShellingStrategy::Incremental] {
                let args = LassoArgs { seed_tree, shelling, ..Default::default() };
                let reconstruction = reconstruct(&metric, &args)?;
                assert!(!reconstruction.covers.is_empty());
                for cover in &reconstruction.covers {
                    assert!(cover.metric.is_complete());
                    for (pair, inferred) in cover.metric.edges() {
                        let distance = metric.distance(pair.0, pair.1);
                        assert!((inferred - distance).abs() < 1e-3, "{seed_tree} {shelling} {pair}");
                    }
                }
                // a depth-first path may split into several covers
                if seed_tree == Traversal::Breadth {
                    assert_eq!(reconstruction.covers.len(), 1, "{shelling}");
                    assert_eq!(reconstruction.covers[0].metric.len(), taxa);
                }
            }
        }
    }
    Ok(())
}

#[test]
fn complete_rejects_ambiguous_cover() -> Result<(), Report> {
    // a star: the only diamond is ambiguous
    let star = graph_from(4, &[(1, 2, 2.0), (1, 3, 2.0), (2, 3, 2.0), (2, 4, 2.0), (3, 4, 2.0)])?;
    let args = LassoArgs::default();
    let error = complete(star, &args, &args.budget(None)).unwrap_err();
    assert_eq!(error.downcast_ref::<LassoError>(), Some(&LassoError::IncompleteCover { missing: 1, taxa: 4 }));
    Ok(())
}

#[test]
fn reconstruct_round_budget() -> Result<(), Report> {
    let args = LassoArgs { max_rounds: Some(1), ..Default::default() };
    let error = reconstruct(&seven_taxa()?, &args).unwrap_err();
    assert!(matches!(error.downcast_ref::<LassoError>(), Some(LassoError::Interrupted { rounds: 1, .. })));
    Ok(())
}

#[test]
fn agglomerate_best_of_runs() -> Result<(), Report> {
    let tree = lasso_phylo::Phylogeny::from_newick("((A:1,B:1):2,(C:2,D:2):1,E:3);")?;
    let graph = crate::DistanceGraph::try_from(&tree)?;
    let args = LassoArgs { lasso_runs: 4, clique_finder: CliqueStrategy::Heuristic, ..Default::default() };
    let best = agglomerate_best(&graph, &args)?;
    assert_eq!(best.run, 0);
    assert_eq!(best.failed, 0);
    assert_eq!(best.agglomeration.trees[0].leaves()?, 5);
    Ok(())
}

#[test]
fn agglomerate_best_all_fail() -> Result<(), Report> {
    let graph = graph_from(3, &[(1, 2, 1.0), (2, 3, 1.0)])?;
    let args = LassoArgs { lasso_runs: 3, ..Default::default() };
    let error = agglomerate_best(&graph, &args).unwrap_err();
    assert!(error.to_string().contains("run 0"));
    assert_eq!(error.root_cause().to_string(), LassoError::NoTriangle { taxa: 3 }.to_string());
    Ok(())
}

#[test]
fn select_best_skips_failures() -> Result<(), Report> {
    let small = agglomerate(&[(1, 2, 2.0), (1, 3, 2.0), (2, 3, 2.0)], 4)?;
    let large = agglomerate(&[(1, 2, 2.0), (1, 3, 2.0), (2, 3, 2.0), (1, 4, 4.0), (2, 4, 4.0), (3, 4, 4.0)], 4)?;
    let results = vec![Err(eyre!("first")), Ok(small.clone()), Ok(large.clone()), Ok(large), Err(eyre!("last"))];
    let best = select_best(results)?;
    assert_eq!(best.run, 2);
    assert_eq!(best.failed, 2);
    assert_eq!(best.agglomeration.largest()?.map(|t| t.leaves()).transpose()?, Some(4));

    let error = select_best(vec![Err(eyre!("first")), Err(eyre!("second"))]).unwrap_err();
    assert_eq!(error.to_string(), "first");
    Ok(())
}

#[test]
fn lasso_args_json() -> Result<(), Report> {
    let args = LassoArgs { lasso_runs: 3, seed: 42, max_rounds: Some(5), ..Default::default() };
    let file = tempfile::NamedTempFile::new()?;
    args.write(&file.path())?;
    assert_eq!(LassoArgs::read(&file.path())?, args);
    Ok(())
}
