//! Find a maximum clique among the minimum-weight edges of a [`DistanceGraph`].
//!
//! Agglomeration merges the taxa of one such clique per step, so the finders only ever look
//! at edges whose distance equals [`DistanceGraph::min_edge_weight`].

pub mod exact;
pub mod heuristic;

pub use exact::ExactCliqueFinder;
pub use heuristic::HeuristicCliqueFinder;

use crate::{DistanceGraph, LassoError};
#[cfg(feature = "cli")]
use clap::ValueEnum;
use lasso_phylo::TaxonId;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Returns one clique of the subgraph formed by the minimum-weight edges.
pub trait CliqueFinder {
    /// The returned ids are sorted, and there are at least two of them.
    fn find_clique<R: Rng + ?Sized>(
        &self,
        graph: &DistanceGraph,
        rng: &mut R,
    ) -> Result<Vec<TaxonId>, LassoError>;
}

/// Which [`CliqueFinder`] to use.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[strum(serialize_all = "lowercase")]
pub enum CliqueStrategy {
    #[default]
    Exact,
    Heuristic,
}

impl CliqueStrategy {
    /// Returns the finder for this strategy, `attempts` only applies to the heuristic.
    pub fn finder(self, attempts: usize) -> Finder {
        match self {
            CliqueStrategy::Exact => Finder::Exact(ExactCliqueFinder),
            CliqueStrategy::Heuristic => Finder::Heuristic(HeuristicCliqueFinder { attempts }),
        }
    }
}

/// A clique finder chosen at runtime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Finder {
    Exact(ExactCliqueFinder),
    Heuristic(HeuristicCliqueFinder),
}

impl CliqueFinder for Finder {
    fn find_clique<R: Rng + ?Sized>(
        &self,
        graph: &DistanceGraph,
        rng: &mut R,
    ) -> Result<Vec<TaxonId>, LassoError> {
        match self {
            Finder::Exact(finder) => finder.find_clique(graph, rng),
            Finder::Heuristic(finder) => finder.find_clique(graph, rng),
        }
    }
}
