use crate::agglomerate::*;
use crate::clique::{ExactCliqueFinder, HeuristicCliqueFinder};
use crate::graph::tests::graph_from;
use crate::LassoError;
use color_eyre::eyre::{Report, Result};
use lasso_phylo::{FromNewick, ToNewick};
use rand::{rngs::StdRng, SeedableRng};

fn pair(a: i32, b: i32) -> Pair {
    Pair::new(TaxonId(a), TaxonId(b))
}

#[test]
fn merge_triangle_with_isolated() -> Result<(), Report> {
    // {A,B,C} pairwise at 2, D unconnected
    let graph = graph_from(4, &[(1, 2, 2.0), (1, 3, 2.0), (2, 3, 2.0)])?;
    let agglomerator = Agglomerator::new(ExactCliqueFinder, ModalUpdater);
    let result = agglomerator.run(&graph, &mut StdRng::seed_from_u64(0))?;

    assert_eq!(result.merges, 1);
    assert_eq!(result.unresolved, 1);
    assert_eq!(result.used, BTreeSet::from([pair(1, 2), pair(1, 3), pair(2, 3)]));

    // the cluster, then D on its own
    assert_eq!(result.trees.len(), 2);
    let cluster = &result.trees[0].tree;
    let root = cluster.get_root()?;
    assert_eq!(root.id, TaxonId(-1));
    for child in cluster.get_children(root)? {
        assert_eq!(cluster.get_branch(root, child)?.length, 1.0);
    }
    assert_eq!(result.trees[0].lasso.len(), 3);
    assert_eq!(result.trees[1].leaves()?, 1);
    assert!(result.trees[1].lasso.is_empty());
    assert_eq!(result.largest()?.map(|t| t.leaves()).transpose()?, Some(3));
    Ok(())
}

#[test]
fn no_triangle() -> Result<(), Report> {
    let graph = graph_from(4, &[(1, 2, 2.0), (2, 3, 2.0), (3, 4, 2.0)])?;
    let agglomerator = Agglomerator::new(ExactCliqueFinder, ModalUpdater);
    let error = agglomerator.run(&graph, &mut StdRng::seed_from_u64(0)).unwrap_err();
    assert_eq!(error.downcast_ref::<LassoError>(), Some(&LassoError::NoTriangle { taxa: 4 }));
    Ok(())
}

#[test]
fn ultrametric_tree() -> Result<(), Report> {
    let tree = Phylogeny::from_newick("((A:1,B:1):2,(C:2,D:2):1,E:3);")?;
    let graph = DistanceGraph::try_from(&tree)?;

    for seed in 0..4 {
        let agglomerator = Agglomerator::new(HeuristicCliqueFinder { attempts: 10 }, ModalUpdater);
        let result = agglomerator.run(&graph, &mut StdRng::seed_from_u64(seed))?;
        assert_eq!(result.trees.len(), 1);
        assert_eq!(result.merges, 3);
        assert_eq!(result.unresolved, 0);

        let mut tree = result.trees[0].tree.clone();
        tree.remove_internal_identifiers();
        assert_eq!(tree.to_newick()?, "((C:2,D:2):1,(A:1,B:1):2,E:3);");
        // every input distance was needed
        assert_eq!(result.used.len(), 10);
        assert_eq!(result.trees[0].lasso, result.used);
    }
    Ok(())
}

#[test]
fn modal_excludes_minimum() -> Result<(), Report> {
    let graph = graph_from(4, &[(1, 4, 2.0), (2, 4, 2.0), (3, 4, 5.0)])?;
    let members = [TaxonId(1), TaxonId(2), TaxonId(3)];
    let vote = ModalUpdater.update(&graph, &members, TaxonId(4), 2.0, &mut StdRng::seed_from_u64(0));
    assert_eq!(vote, Some(Vote { distance: 5.0, contributors: vec![TaxonId(3)] }));

    // nothing left to vote on
    let vote = ModalUpdater.update(&graph, &members[..2], TaxonId(4), 2.0, &mut StdRng::seed_from_u64(0));
    assert_eq!(vote, None);
    Ok(())
}

#[test]
fn modal_tie_is_one_of_the_modes() -> Result<(), Report> {
    let graph = graph_from(5, &[(1, 5, 3.0), (2, 5, 3.0), (3, 5, 4.0), (4, 5, 4.0)])?;
    let members = [TaxonId(1), TaxonId(2), TaxonId(3), TaxonId(4)];
    for seed in 0..8 {
        let vote = ModalUpdater.update(&graph, &members, TaxonId(5), 1.0, &mut StdRng::seed_from_u64(seed));
        let distance = vote.map(|v| v.distance);
        assert!(distance == Some(3.0) || distance == Some(4.0));
    }
    Ok(())
}

#[test]
fn provenance_propagates_supports() -> Result<(), Report> {
    let mut provenance = Provenance::new();
    let votes = [(TaxonId(3), Vote { distance: 6.0, contributors: vec![TaxonId(1), TaxonId(2)] })];
    provenance.apply(provenance.merge_delta(&[TaxonId(1), TaxonId(2)], TaxonId(-1), &votes));
    assert_eq!(provenance.support(pair(-1, 3)), BTreeSet::from([pair(1, 3), pair(2, 3)]));

    // merging the cluster again carries its support
    provenance.apply(provenance.merge_delta(&[TaxonId(-1), TaxonId(3)], TaxonId(-2), &[]));
    assert_eq!(provenance.used().len(), 3);
    assert!(provenance.support(pair(-1, 3)).is_empty());
    Ok(())
}
