//! Read partial distance matrices into a [`DistanceGraph`].
//!
//! A matrix is a delimited square table. The first row holds `taxon` and then the taxon names,
//! every following row a taxon name and its distances, in the same order as the header.
//!
//! ```text
//! taxon  A  B  C
//! A      0  3  ?
//! B      3  0  9
//! C      ?  9  0
//! ```
//!
//! Taxa are assigned ids `1..=n` in row order. Distances of `0`, empty cells, `?` and `NA` are
//! unknown. The two cells of a pair may both be filled, in which case they must agree, or only
//! one of them.

#[cfg(test)]
mod tests;

use crate::utils::approx_eq;
use crate::{DistanceGraph, Table};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use lasso_phylo::{Taxon, TaxonId};
use std::collections::BTreeSet;
use std::path::Path;

/// Header of the first column of a matrix.
pub const MATRIX_INDEX: &str = "taxon";
/// Cell values that mean "unknown distance", besides `0`.
pub const MISSING: [&str; 3] = ["", "?", "NA"];

/// Reads a distance matrix from a file, see the [module docs](self) for the format.
///
/// If `delim` is not provided, it is identified from the path suffix (`.tsv` or `.csv`).
///
/// ```rust
/// use lasso::dataset;
/// use lasso_phylo::TaxonId;
/// use std::io::Write;
///
/// let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
/// write!(file, "taxon,A,B,C\nA,0,3,?\nB,3,0,9\nC,?,9,0\n")?;
/// let graph = dataset::read_matrix(file.path(), None)?;
/// assert_eq!(graph.len(), 3);
/// assert_eq!(graph.distance(TaxonId(2), TaxonId(3)), 9.0);
/// assert!(!graph.has_distance(TaxonId(1), TaxonId(3)));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn read_matrix(path: &Path, delim: Option<char>) -> Result<DistanceGraph, Report> {
    let table = Table::read(path, delim)?;
    let graph = from_table(&table).wrap_err_with(|| format!("Failed to parse distance matrix: {path:?}"))?;
    log::info!("Read {} taxa and {} distances from: {path:?}", graph.len(), graph.edge_count());
    Ok(graph)
}

/// Parses a single matrix cell, returning `None` for unknown distances.
pub fn parse_distance(cell: &str) -> Result<Option<f64>, Report> {
    if MISSING.contains(&cell) {
        return Ok(None);
    }
    let distance: f64 = cell.parse().wrap_err_with(|| format!("Failed to parse distance: {cell:?}"))?;
    if !distance.is_finite() || distance < 0.0 {
        Err(eyre!("Distances must be finite and nonnegative: {cell:?}"))?
    }
    Ok((distance > 0.0).then_some(distance))
}

/// Builds a [`DistanceGraph`] from a matrix [`Table`].
pub fn from_table(table: &Table<String>) -> Result<DistanceGraph, Report> {
    let (index, names) = match table.headers.split_first() {
        Some((index, names)) if index == MATRIX_INDEX => (index, names),
        _ => Err(eyre!("The first column of a distance matrix must be named {MATRIX_INDEX:?}."))
            .suggestion(format!("Found headers: {:?}", table.headers))?,
    };
    let unique: BTreeSet<&String> = names.iter().collect();
    if unique.len() != names.len() {
        Err(eyre!("Taxon names of a distance matrix must be unique: {names:?}"))?
    }
    if table.rows.len() != names.len() {
        Err(eyre!("Expected {} rows for {} taxa, found {}.", names.len(), names.len(), table.rows.len()))?
    }

    let taxa: Vec<Taxon> = names.iter().enumerate().map(|(i, name)| Taxon::new(i as i32 + 1, name)).collect();
    let mut graph = DistanceGraph::from_taxa(taxa.iter().cloned());

    for (i, row) in table.rows.iter().enumerate() {
        if row.len() != table.headers.len() {
            Err(eyre!("Row {} has {} cells, expected {}.", i + 1, row.len(), table.headers.len()))?
        }
        if row[0] != names[i] {
            Err(eyre!("Row {} is named {:?}, expected {:?} to match the {index:?} header.", i + 1, row[0], names[i]))?
        }
        for (j, cell) in row.iter().enumerate().skip(1).filter(|(j, _)| *j - 1 != i) {
            let Some(distance) = parse_distance(cell).wrap_err_with(|| format!("Invalid cell ({}, {})", row[0], names[j - 1]))?
            else {
                continue;
            };
            let (a, b) = (TaxonId(i as i32 + 1), TaxonId(j as i32));
            let existing = graph.distance(a, b);
            if existing > 0.0 && !approx_eq(existing, distance) {
                Err(eyre!("Asymmetric distance between {} and {}: {existing} and {distance}.", taxa[i], names[j - 1]))?
            }
            graph.set_distance(a, b, distance)?;
        }
    }
    Ok(graph)
}
