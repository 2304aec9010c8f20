use crate::chordal::tests::seven_taxa;
use crate::graph::{tests::graph_from, Pair};
use crate::quartet::{extract, resolve_quartet, Quartet};
use color_eyre::eyre::{Report, Result};
use lasso_phylo::TaxonId;

#[test]
fn quartets_of_seven_taxa() -> Result<(), Report> {
    let quartets = extract(&seven_taxa()?, true);
    // every internal edge is positive, so every combination is resolved
    assert_eq!(quartets.len(), 35);
    let cherries = quartets
        .iter()
        .find(|q| q.left == Pair(TaxonId(1), TaxonId(2)) && q.right == Pair(TaxonId(6), TaxonId(7)));
    // path between the two cherries: 3 + 0.75 + 2.25
    assert_eq!(cherries.map(|q| q.weight), Some(6.0));
    Ok(())
}

#[test]
fn unweighted_quartets() -> Result<(), Report> {
    let quartets = extract(&seven_taxa()?, false);
    assert!(quartets.iter().all(|q| q.weight == 0.0));
    Ok(())
}

#[test]
fn star_has_no_quartet() -> Result<(), Report> {
    let graph = graph_from(
        4,
        &[(1, 2, 2.0), (1, 3, 2.0), (1, 4, 2.0), (2, 3, 2.0), (2, 4, 2.0), (3, 4, 2.0)],
    )?;
    assert!(extract(&graph, true).is_empty());
    Ok(())
}

#[test]
fn incomplete_has_no_quartet() -> Result<(), Report> {
    let graph = graph_from(4, &[(1, 2, 3.0), (1, 3, 8.0), (2, 3, 9.0), (2, 4, 10.0), (3, 4, 9.0)])?;
    let taxa = [TaxonId(1), TaxonId(2), TaxonId(3), TaxonId(4)];
    assert_eq!(resolve_quartet(&graph, taxa, true), None);
    Ok(())
}

#[test]
fn quartet_canonical() -> Result<(), Report> {
    let quartet = Quartet::new(Pair::new(TaxonId(4), TaxonId(3)), Pair::new(TaxonId(2), TaxonId(1)), 1.0);
    assert_eq!(quartet.taxa(), [TaxonId(1), TaxonId(2), TaxonId(3), TaxonId(4)]);
    Ok(())
}
