use crate::Table;
use color_eyre::eyre::{Report, Result};
use indoc::indoc;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn add_row_wrong_size() -> Result<(), Report> {
    let mut table = Table::new();
    table.headers = vec!["1", "2", "3"];
    table.add_row(vec!["A", "B", "C"])?;
    assert!(table.add_row(vec!["D", "E"]).is_err());
    assert_eq!(table.rows.len(), 1);
    Ok(())
}

#[test]
fn get_values() -> Result<(), Report> {
    let mut table = Table::new();
    table.headers = vec!["1", "2", "3"];
    table.add_row(vec!["A", "B", "C"])?;
    table.add_row(vec!["D", "E", "F"])?;

    assert_eq!(table.get_header_index("3")?, 2);
    assert_eq!(table.get_column("3")?, vec![&"C", &"F"]);
    assert_eq!(table.get_row(1)?, &["D", "E", "F"]);
    assert!(table.get_row(2).is_err());
    assert!(table.get("4", 0).is_err());
    Ok(())
}

#[test]
fn read_write() -> Result<(), Report> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{}", indoc! {"
        taxon, A, B
        A, 0, 3

        B, 3, 0\r
    "})?;
    let table = Table::read(file.path(), Some(','))?;
    assert_eq!(table.headers, vec!["taxon", "A", "B"]);
    assert_eq!(table.rows, vec![vec!["A", "0", "3"], vec!["B", "3", "0"]]);
    assert_eq!(table.path.as_deref(), Some(file.path()));

    let output = NamedTempFile::new()?;
    table.write(output.path(), Some('\t'))?;
    let expected = indoc! {"
        taxon\tA\tB
        A\t0\t3
        B\t3\t0
    "};
    assert_eq!(std::fs::read_to_string(output.path())?, expected);
    Ok(())
}

#[test]
fn read_ragged() -> Result<(), Report> {
    let mut file = NamedTempFile::new()?;
    write!(file, "taxon\tA\tB\nA\t0\n")?;
    assert!(Table::read(file.path(), Some('\t')).is_err());
    Ok(())
}
