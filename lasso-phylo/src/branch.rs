use crate::FromNewick;

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fmt::{Display, Formatter};

/// A [`Branch`] in the [`Phylogeny`](crate::Phylogeny).
#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Branch {
    /// [`Branch`] length (ex. 1.0).
    pub length: f64,
}

#[rustfmt::skip]
impl AsPrimitive<f64> for Branch { fn as_(self) -> f64 { self.length } }
#[rustfmt::skip]
impl Default for Branch { fn default() -> Self { Self::new(0.0) } }
#[rustfmt::skip]
impl Display for Branch { fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.length) } }
#[rustfmt::skip]
impl From<f64> for Branch { fn from(length: f64) -> Self { Self::new(length) } }
#[rustfmt::skip]
impl Branch { pub fn new(length: f64) -> Self { Branch { length } } }

impl FromNewick for Branch {
    /// Returns a [`Branch`] created from the attributes of a [Newick](https://en.wikipedia.org/wiki/Newick_format) node.
    ///
    /// # Examples
    ///
    /// Just a node name.
    ///
    /// ```rust
    /// use lasso_phylo::{Branch, FromNewick};
    ///
    /// let branch = Branch::from_newick(&"A")?;
    /// assert_eq!(branch, Branch { length: 0.0 });
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    ///
    /// A node name and a branch length.
    ///
    /// ```rust
    /// # use lasso_phylo::{Branch, FromNewick};
    /// let branch = Branch::from_newick(&"A:2.5")?;
    /// assert_eq!(branch, Branch { length: 2.5 });
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    fn from_newick(newick: &str) -> Result<Branch, Report> {
        let attributes: Vec<_> = newick.replace(';', "").split(':').map(String::from).collect();
        let length = match attributes.len() >= 2 {
            true => attributes[1]
                .trim()
                .parse()
                .wrap_err_with(|| eyre!("Failed to parse branch length from newick: {newick}"))?,
            false => 0.0,
        };
        if length < 0.0 {
            Err(eyre!("Branch length must be nonnegative: {newick}"))?
        }
        Ok(Branch { length })
    }
}
