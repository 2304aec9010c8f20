//! Errors raised by the reconstruction algorithms.

use lasso_phylo::TaxonId;
use thiserror::Error;

/// Structural failures of a reconstruction step.
///
/// Numeric ambiguity (a diamond whose parallel sums are equal) is not an error, see
/// [`Inference::Ambiguous`](crate::shelling::Inference::Ambiguous).
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LassoError {
    /// A minimum-weight or clique query was made on a graph without any positive edge.
    #[error("{operation}: no edges with a positive distance among {taxa} taxa")]
    NoEdges { operation: &'static str, taxa: usize },
    /// A randomized clique search was started on a graph without edges.
    #[error("{operation}: cannot search an empty graph")]
    EmptyGraph { operation: &'static str },
    /// A lookup referenced a taxon that is not part of the current graph.
    #[error("{operation}: unknown taxon id {id} in a graph of {taxa} taxa")]
    UnknownIdentifier { id: TaxonId, operation: &'static str, taxa: usize },
    /// Agglomeration could not find a single triangle to start clustering from.
    #[error("agglomeration: no triangle (3-clique) found among {taxa} taxa")]
    NoTriangle { taxa: usize },
    /// Shelling stopped with distances of a triplet cover still unknown.
    #[error("shelling: {missing} distances could not be inferred among {taxa} taxa")]
    IncompleteCover { missing: usize, taxa: usize },
    /// A fixpoint loop ran out of its step budget or was cancelled.
    #[error("{operation}: interrupted after {rounds} rounds")]
    Interrupted { operation: &'static str, rounds: usize },
}
