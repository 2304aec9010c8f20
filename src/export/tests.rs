use crate::chordal::tests::seven_taxa;
use crate::export::*;
use crate::graph::tests::graph_from;
use crate::quartet;
use crate::run::{agglomerate_best, reconstruct};
use crate::{dataset, utils};
use color_eyre::eyre::{Report, Result};
use indoc::indoc;
use lasso_phylo::FromNewick;

#[test]
fn matrix_round_trip() -> Result<(), Report> {
    let graph = graph_from(3, &[(1, 2, 3.0), (2, 3, 0.5)])?;
    let table = matrix_table(&graph)?;
    let expected = vec![vec!["A", "0", "3", "?"], vec!["B", "3", "0", "0.5"], vec!["C", "?", "0.5", "0"]];
    assert_eq!(table.headers, ["taxon", "A", "B", "C"]);
    assert_eq!(table.rows, expected);
    assert_eq!(dataset::from_table(&table)?, graph);
    Ok(())
}

#[test]
fn quartet_rows() -> Result<(), Report> {
    let graph = DistanceGraph::try_from(&Phylogeny::from_newick("((A:1,B:2):3,(C:1.5,D:2.5):1);")?)?;
    let table = quartet_table(&graph, &quartet::extract(&graph, true))?;
    assert_eq!(table.headers, QUARTET_HEADERS);
    assert_eq!(table.rows, [["A", "B", "C", "D", "4"]]);
    Ok(())
}

#[test]
fn write_unrooted() -> Result<(), Report> {
    let graph = seven_taxa()?;
    let args = LassoArgs::default();
    let output_dir = tempfile::tempdir()?;
    let summary = write_reconstruction(&graph, &reconstruct(&graph, &args)?, &args, output_dir.path())?;

    assert_eq!(summary.taxa, 7);
    assert_eq!(summary.distances, 21);
    assert_eq!(summary.lasso, 11);
    assert_eq!(summary.covers.len(), 1);
    assert_eq!(summary.covers[0].quartets, 35);

    let matrix = dataset::read_matrix(&output_dir.path().join("matrix_0.tsv"), None)?;
    for (pair, distance) in graph.edges() {
        assert!(utils::approx_eq(matrix.distance(pair.0, pair.1), distance));
    }
    let lasso = Table::read(&output_dir.path().join("lasso_0.tsv"), None)?;
    assert_eq!(lasso.headers, LASSO_HEADERS);
    assert_eq!(lasso.rows.len(), 11);
    assert!(output_dir.path().join("chordal.tsv").exists());
    assert!(output_dir.path().join("quartets_0.tsv").exists());

    let json = std::fs::read_to_string(output_dir.path().join("summary.json"))?;
    assert_eq!(serde_json::from_str::<Summary>(&json)?, summary);
    Ok(())
}

#[test]
fn write_rooted() -> Result<(), Report> {
    let tree = Phylogeny::from_newick("((A:1,B:1):2,(C:2,D:2):1,E:3);")?;
    let graph = DistanceGraph::try_from(&tree)?;
    let args = LassoArgs { lasso_runs: 2, ..Default::default() };
    let output_dir = tempfile::tempdir()?;
    let output = output_dir.path().join("nested");
    let summary = write_agglomeration(&graph, &agglomerate_best(&graph, &args)?, &args, &output)?;

    let trees = std::fs::read_to_string(output.join("trees.nwk"))?;
    assert_eq!(trees, indoc! {"
        ((C:2,D:2):1,(A:1,B:1):2,E:3);
    "});
    let agglomeration = summary.agglomeration.unwrap_or_else(|| panic!("missing agglomeration summary"));
    assert_eq!(agglomeration.trees, [5]);
    assert_eq!(agglomeration.merges, 3);
    assert_eq!(summary.lasso, 10);
    assert_eq!(Table::read(&output.join("lasso_0.tsv"), None)?.rows.len(), 10);
    Ok(())
}
