#![doc = include_str!("../README.md")]

use color_eyre::eyre::{Report, Result};

mod branch;
pub mod newick;
mod phylogeny;
mod taxon;

#[doc(inline)]
pub use branch::Branch;
#[doc(inline)]
pub use phylogeny::Phylogeny;
#[doc(inline)]
pub use taxon::{Taxon, TaxonId};

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Returns an object created from a [Newick](https://en.wikipedia.org/wiki/Newick_format) [`str`].
pub trait FromNewick {
    fn from_newick(newick: &str) -> Result<Self, Report>
    where
        Self: Sized;
}

/// Returns a [Newick](https://en.wikipedia.org/wiki/Newick_format) [`str`] created from an object.
pub trait ToNewick {
    fn to_newick(&self) -> Result<String, Report>;
}
