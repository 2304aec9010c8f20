use crate::dataset::{from_table, parse_distance, read_matrix};
use crate::Table;
use color_eyre::eyre::{Report, Result};
use indoc::indoc;
use lasso_phylo::TaxonId;
use std::io::Write;

fn matrix(rows: &[&str]) -> Table<String> {
    let mut table = Table::new();
    let mut lines = rows.iter().map(|line| line.split('\t').map(String::from).collect::<Vec<_>>());
    table.headers = lines.next().unwrap_or_default();
    table.rows = lines.collect();
    table
}

#[test]
fn missing_cells() -> Result<(), Report> {
    assert_eq!(parse_distance("2.5")?, Some(2.5));
    for cell in ["0", "0.0", "", "?", "NA"] {
        assert_eq!(parse_distance(cell)?, None);
    }
    assert!(parse_distance("-1").is_err());
    assert!(parse_distance("inf").is_err());
    assert!(parse_distance("three").is_err());
    Ok(())
}

#[test]
fn read_tsv() -> Result<(), Report> {
    let mut file = tempfile::Builder::new().suffix(".tsv").tempfile()?;
    write!(file, "{}", indoc! {"
        taxon\tA\tB\tC\tD
        A\t0\t3\t8\t
        B\t3\t0\t9\t10
        C\t8\t9\t0\t9
        D\tNA\t?\t9\t0
    "})?;
    let graph = read_matrix(file.path(), None)?;

    let names: Vec<String> = graph.taxa().map(|taxon| taxon.name.clone()).collect();
    assert_eq!(names, ["A", "B", "C", "D"]);
    assert_eq!(graph.edge_count(), 5);
    assert_eq!(graph.distance(TaxonId(2), TaxonId(4)), 10.0);
    assert!(!graph.has_distance(TaxonId(1), TaxonId(4)));
    Ok(())
}

#[test]
fn one_sided_cells() -> Result<(), Report> {
    let table = matrix(&["taxon\tA\tB\tC", "A\t0\t3\t", "B\t\t0\t4", "C\t\t\t0"]);
    let graph = from_table(&table)?;
    assert_eq!(graph.distance(TaxonId(1), TaxonId(2)), 3.0);
    assert_eq!(graph.distance(TaxonId(3), TaxonId(2)), 4.0);
    assert_eq!(graph.edge_count(), 2);
    Ok(())
}

#[test]
fn malformed_matrices() -> Result<(), Report> {
    // asymmetric
    assert!(from_table(&matrix(&["taxon\tA\tB", "A\t0\t3", "B\t4\t0"])).is_err());
    // wrong index column
    assert!(from_table(&matrix(&["name\tA\tB", "A\t0\t3", "B\t3\t0"])).is_err());
    // rows out of order
    assert!(from_table(&matrix(&["taxon\tA\tB", "B\t3\t0", "A\t0\t3"])).is_err());
    // duplicate taxa
    assert!(from_table(&matrix(&["taxon\tA\tA", "A\t0\t3", "A\t3\t0"])).is_err());
    // missing row
    assert!(from_table(&matrix(&["taxon\tA\tB", "A\t0\t3"])).is_err());
    Ok(())
}

#[test]
fn unknown_extension() -> Result<(), Report> {
    let file = tempfile::Builder::new().suffix(".txt").tempfile()?;
    assert!(read_matrix(file.path(), None).is_err());
    Ok(())
}
