//! `lasso` reconstructs additive tree metrics from **partial** distance matrices.
//!
//! Given distances between some pairs of taxa, `lasso` finds a _strong lasso_: a set of
//! distances that determines the rest of the tree metric. From there, it either
//!
//! 1. **completes the matrix** ([`run::reconstruct`]). A spanning tree is grown into a chordal
//!    subgraph ([`chordal`]) and split into triplet covers ([`cover`]). Missing distances are
//!    then inferred with the four-point condition ([`shelling`]), and quartets are read off
//!    the completed metric ([`quartet`]).
//! 1. **builds rooted trees** ([`run::agglomerate_best`]). The clique at the minimum distance is
//!    merged repeatedly ([`agglomerate`]), recording which input distances justified each merge.
//!
//! ```rust
//! use lasso::{run, DistanceGraph, LassoArgs};
//! use lasso_phylo::{FromNewick, Phylogeny, TaxonId};
//!
//! // every distance of a five-taxon tree, then forget two of them
//! let tree = Phylogeny::from_newick("((A:1,B:2):3,(C:1.5,D:2.5):1,E:4);")?;
//! let mut graph = DistanceGraph::try_from(&tree)?;
//! let truth = graph.clone();
//! graph.remove_distance(TaxonId(1), TaxonId(4));
//! graph.remove_distance(TaxonId(2), TaxonId(5));
//!
//! let reconstruction = run::reconstruct(&graph, &LassoArgs::default())?;
//! let metric = &reconstruction.covers[0].metric;
//! assert!(metric.is_complete());
//! assert_eq!(metric.distance(TaxonId(1), TaxonId(4)), truth.distance(TaxonId(1), TaxonId(4)));
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```

pub mod agglomerate;
pub mod chordal;
pub mod clique;
#[cfg(feature = "cli")]
pub mod cli;
pub mod cover;
pub mod dataset;
mod error;
pub mod export;
pub mod graph;
pub mod quartet;
pub mod run;
pub mod shelling;
pub mod table;
pub mod utils;

#[doc(inline)]
pub use crate::error::LassoError;
#[doc(inline)]
pub use crate::graph::DistanceGraph;
#[doc(inline)]
pub use crate::run::LassoArgs;
#[doc(inline)]
pub use crate::table::Table;
#[doc(inline)]
pub use crate::utils::verbosity::Verbosity;
