//! Write reconstruction results: Newick trees, lasso pair lists, completed matrices, quartet
//! systems and a JSON summary.

#[cfg(test)]
mod tests;

use crate::graph::Pair;
use crate::quartet::Quartet;
use crate::run::{BestRun, LassoArgs, Reconstruction};
use crate::shelling::ShellingReport;
use crate::{DistanceGraph, Table};
use color_eyre::eyre::{Report, Result, WrapErr};
use lasso_phylo::{Branch, Phylogeny, Taxon, ToNewick};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;

pub const LASSO_HEADERS: [&str; 3] = ["taxon_1", "taxon_2", "distance"];
pub const QUARTET_HEADERS: [&str; 5] = ["cherry_1a", "cherry_1b", "cherry_2a", "cherry_2b", "weight"];
/// Matrix cell of an unknown distance.
pub const UNKNOWN: &str = "?";

// ----------------------------------------------------------------------------
// Tables

/// Returns the pairs with their distance in `graph`, one row per pair, named by taxon.
///
/// ```rust
/// use lasso::{export, DistanceGraph};
/// use lasso::graph::Pair;
/// use lasso_phylo::{FromNewick, Phylogeny, TaxonId};
///
/// let tree = Phylogeny::from_newick("(A:1,B:2,C:3);")?;
/// let graph = DistanceGraph::try_from(&tree)?;
/// let table = export::lasso_table(&graph, [Pair::new(TaxonId(3), TaxonId(1))])?;
/// assert_eq!(table.rows, [["A", "C", "4"]]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn lasso_table<I>(graph: &DistanceGraph, pairs: I) -> Result<Table<String>, Report>
where
    I: IntoIterator<Item = Pair>,
{
    let mut table = Table::new();
    table.headers = LASSO_HEADERS.map(String::from).to_vec();
    for pair in pairs {
        let (a, b) = (graph.taxon(pair.0)?, graph.taxon(pair.1)?);
        let distance = graph.distance(pair.0, pair.1);
        table.add_row(vec![a.name.clone(), b.name.clone(), distance.to_string()])?;
    }
    Ok(table)
}

/// Returns the square matrix of `graph`, in the layout read by
/// [`dataset::read_matrix`](crate::dataset::read_matrix).
pub fn matrix_table(graph: &DistanceGraph) -> Result<Table<String>, Report> {
    let mut table = Table::new();
    table.headers = std::iter::once(crate::dataset::MATRIX_INDEX.to_string())
        .chain(graph.taxa().map(|taxon| taxon.name.clone()))
        .collect();
    for row in graph.taxa() {
        let cells = graph.taxa().map(|col| match (row.id == col.id, graph.distance(row.id, col.id)) {
            (true, _) => "0".to_string(),
            (false, d) if d > 0.0 => d.to_string(),
            _ => UNKNOWN.to_string(),
        });
        table.add_row(std::iter::once(row.name.clone()).chain(cells).collect())?;
    }
    Ok(table)
}

/// Returns one row per quartet, cherries named by taxon.
pub fn quartet_table(graph: &DistanceGraph, quartets: &[Quartet]) -> Result<Table<String>, Report> {
    let mut table = Table::new();
    table.headers = QUARTET_HEADERS.map(String::from).to_vec();
    for quartet in quartets {
        let mut row = Vec::new();
        for id in quartet.taxa() {
            row.push(graph.taxon(id)?.name.clone());
        }
        row.push(quartet.weight.to_string());
        table.add_row(row)?;
    }
    Ok(table)
}

/// Returns a tree as Newick, without internal node names.
pub fn newick(tree: &Phylogeny<Taxon, Branch>) -> Result<String, Report> {
    let mut tree = tree.clone();
    tree.remove_internal_identifiers();
    tree.to_newick()
}

// ----------------------------------------------------------------------------
// Summary

/// Counters of one completed triplet cover.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CoverSummary {
    pub taxa: usize,
    pub lasso: usize,
    pub shelling: ShellingReport,
    pub quartets: usize,
}

/// Counters of the winning agglomeration run.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AgglomerationSummary {
    pub run: usize,
    pub failed: usize,
    pub merges: usize,
    pub unresolved: usize,
    /// Leaves of each tree.
    pub trees: Vec<usize>,
}

/// JSON summary of a reconstruction.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Summary {
    pub version: String,
    pub args: LassoArgs,
    pub taxa: usize,
    pub distances: usize,
    /// Input distances the results rely on.
    pub lasso: usize,
    pub covers: Vec<CoverSummary>,
    pub agglomeration: Option<AgglomerationSummary>,
}

impl Summary {
    pub fn new(graph: &DistanceGraph, args: &LassoArgs) -> Self {
        Summary {
            version: env!("CARGO_PKG_VERSION").to_string(),
            args: args.clone(),
            taxa: graph.len(),
            distances: graph.edge_count(),
            lasso: 0,
            covers: Vec::new(),
            agglomeration: None,
        }
    }

    /// Writes the summary to a JSON file.
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        let output = serde_json::to_string_pretty(self).wrap_err("Failed to serialize summary.")?;
        std::fs::write(path, output).wrap_err_with(|| format!("Failed to write summary: {path:?}"))?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Output directories

fn create_dir(output_dir: &Path) -> Result<(), Report> {
    if !output_dir.exists() {
        log::info!("Creating output directory: {output_dir:?}");
        std::fs::create_dir_all(output_dir)
            .wrap_err_with(|| format!("Failed to create directory: {output_dir:?}"))?;
    }
    Ok(())
}

/// Writes an unrooted [`Reconstruction`] of `graph`.
///
/// - `chordal.tsv`: the chordal subgraph as a lasso pair list.
/// - `lasso_{i}.tsv`, `matrix_{i}.tsv`, `quartets_{i}.tsv`: per triplet cover.
/// - `summary.json`
pub fn write_reconstruction(
    graph: &DistanceGraph,
    reconstruction: &Reconstruction,
    args: &LassoArgs,
    output_dir: &Path,
) -> Result<Summary, Report> {
    create_dir(output_dir)?;
    let chordal = reconstruction.chordal.edges().into_iter().map(|(pair, _)| pair);
    lasso_table(graph, chordal)?.write(&output_dir.join("chordal.tsv"), None)?;

    let mut summary = Summary::new(graph, args);
    summary.lasso = reconstruction.lasso().len();
    for (i, cover) in reconstruction.covers.iter().enumerate() {
        let pairs = cover.lasso.edges().into_iter().map(|(pair, _)| pair);
        lasso_table(graph, pairs)?.write(&output_dir.join(format!("lasso_{i}.tsv")), None)?;
        matrix_table(&cover.metric)?.write(&output_dir.join(format!("matrix_{i}.tsv")), None)?;
        let quartets = quartet_table(&cover.metric, &cover.quartets)?;
        quartets.write(&output_dir.join(format!("quartets_{i}.tsv")), None)?;
        summary.covers.push(CoverSummary {
            taxa: cover.metric.len(),
            lasso: cover.lasso.edge_count(),
            shelling: cover.report,
            quartets: cover.quartets.len(),
        });
    }

    summary.write(&output_dir.join("summary.json"))?;
    log::info!("Wrote {} triplet covers to: {output_dir:?}", reconstruction.covers.len());
    Ok(summary)
}

/// Writes the best agglomeration run of `graph`.
///
/// - `trees.nwk`: one Newick tree per line, in the order of
///   [`Agglomeration::trees`](crate::agglomerate::Agglomeration::trees).
/// - `lasso_{i}.tsv`: the distances each tree relies on.
/// - `summary.json`
pub fn write_agglomeration(
    graph: &DistanceGraph,
    best: &BestRun,
    args: &LassoArgs,
    output_dir: &Path,
) -> Result<Summary, Report> {
    create_dir(output_dir)?;
    let agglomeration = &best.agglomeration;

    let mut newicks = Vec::new();
    let mut leaves = Vec::new();
    for (i, tree) in agglomeration.trees.iter().enumerate() {
        newicks.push(newick(&tree.tree)?);
        leaves.push(tree.leaves()?);
        let lasso = lasso_table(graph, tree.lasso.iter().copied())?;
        lasso.write(&output_dir.join(format!("lasso_{i}.tsv")), None)?;
    }
    let path = output_dir.join("trees.nwk");
    std::fs::write(&path, newicks.iter().map(|n| format!("{n}\n")).collect::<String>())
        .wrap_err_with(|| format!("Failed to write trees: {path:?}"))?;

    let mut summary = Summary::new(graph, args);
    summary.lasso = agglomeration.used.len();
    summary.agglomeration = Some(AgglomerationSummary {
        run: best.run,
        failed: best.failed,
        merges: agglomeration.merges,
        unresolved: agglomeration.unresolved,
        trees: leaves,
    });
    summary.write(&output_dir.join("summary.json"))?;
    log::info!("Wrote {} trees to: {output_dir:?}", agglomeration.trees.len());
    Ok(summary)
}
