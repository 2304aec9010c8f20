use crate::chordal::{self, tests::seven_taxa};
use crate::cover::triplet_covers;
use crate::graph::{tests::graph_from, Traversal};
use color_eyre::eyre::{Report, Result};
use lasso_phylo::TaxonId;

#[test]
fn single_cover_seven_taxa() -> Result<(), Report> {
    for traversal in [Traversal::Breadth, Traversal::Depth] {
        let subgraph = chordal::build(&seven_taxa()?, traversal)?;
        let covers = triplet_covers(&subgraph);
        assert_eq!(covers.len(), 1, "{traversal}");
        assert_eq!(covers[0].len(), 7);
        assert_eq!(covers[0].edge_count(), 11);
    }
    Ok(())
}

#[test]
fn small_covers_discarded() -> Result<(), Report> {
    // two triangles joined by the loose edge 3-4, plus the loose tail 6-7
    let graph = graph_from(
        7,
        &[(1, 2, 1.0), (1, 3, 1.0), (2, 3, 1.5), (3, 4, 2.0), (4, 5, 1.0), (4, 6, 1.0), (5, 6, 1.2), (6, 7, 3.0)],
    )?;
    assert!(triplet_covers(&graph).is_empty());
    Ok(())
}

#[test]
fn diamond_cover_keeps_weights() -> Result<(), Report> {
    // a diamond on 1..=4, and a triangle on 4..=6 sharing taxon 4
    let graph = graph_from(
        6,
        &[(1, 2, 3.0), (1, 3, 8.0), (2, 3, 9.0), (2, 4, 10.0), (3, 4, 9.0), (4, 5, 1.0), (5, 6, 2.0), (4, 6, 2.5)],
    )?;
    let covers = triplet_covers(&graph);
    assert_eq!(covers.len(), 1);
    let cover = &covers[0];
    assert_eq!(cover.ids().collect::<Vec<_>>(), [TaxonId(1), TaxonId(2), TaxonId(3), TaxonId(4)]);
    assert_eq!(cover.edge_count(), 5);
    assert_eq!(cover.distance(TaxonId(2), TaxonId(4)), 10.0);
    Ok(())
}
