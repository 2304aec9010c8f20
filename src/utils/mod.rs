pub mod verbosity;

use color_eyre::eyre::{eyre, Report, Result};
use std::path::Path;

/// Relative tolerance of floating point comparisons between distance sums.
pub const TOLERANCE: f64 = 1e-9;

/// Returns `true` if two sums are equal within [`TOLERANCE`], relative to their magnitude.
///
/// ```rust
/// use lasso::utils::approx_eq;
/// assert!(approx_eq(0.1 + 0.2, 0.3));
/// assert!(!approx_eq(10.0, 10.001));
/// ```
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Returns the table delimiter matching a file extension.
///
/// ```rust
/// use lasso::utils::path_to_delim;
/// use std::path::Path;
/// assert_eq!(path_to_delim(Path::new("matrix.tsv"))?, '\t');
/// assert_eq!(path_to_delim(Path::new("matrix.csv"))?, ',');
/// assert!(path_to_delim(Path::new("matrix.txt")).is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn path_to_delim(path: &Path) -> Result<char, Report> {
    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    match ext {
        "tsv" => Ok('\t'),
        "csv" => Ok(','),
        _ => Err(eyre!("Unknown file extension {ext:?}, cannot guess the delimiter of: {path:?}")),
    }
}
