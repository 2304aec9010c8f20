//! Grow a spanning forest into a maximal chordal subgraph whose diamonds can all be resolved.
//!
//! A candidate edge `(a, b)` is only accepted if, for every vertex `v` adjacent to both:
//!
//! 1. `a` and `b` are not already connected through other neighbours of `v` (which would
//!    close a chordless cycle), and
//! 2. every diamond formed around the new triangles `(v, a)` and `(v, b)` satisfies the skew
//!    inequality, so that its missing chord can later be inferred.
//!
//! The first two tests are local. An edge that passes them is then added tentatively, and
//! kept only if shelling still completes the triangles it joins. Every triplet cover of the
//! result is therefore a strong lasso of its taxa.
//!
//! On a complete metric, a breadth-first seed is a star and every pair of taxa becomes a
//! candidate, so a tree metric grows into a single cover. A depth-first seed is a path, and
//! the candidates joining two of its parts may all be ambiguous. The covers are then still
//! complete, but there can be more than one.


use crate::graph::{Pair, Traversal};
use crate::shelling::{self, resolve, Inference, StepBudget};
use crate::{cover, DistanceGraph, LassoError};
use itertools::Itertools;
use lasso_phylo::TaxonId;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// An edge of the source graph waiting to be tested, lightest first.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    weight: f64,
    pair: Pair,
}

#[rustfmt::skip]
impl PartialEq for Candidate { fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal } }
impl Eq for Candidate {}
#[rustfmt::skip]
impl PartialOrd for Candidate { fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) } }
#[rustfmt::skip]
impl Ord for Candidate { fn cmp(&self, other: &Self) -> Ordering { self.weight.total_cmp(&other.weight).then(self.pair.cmp(&other.pair)) } }

/// Returns a chordal subgraph of `source`, seeded with a spanning forest built by `traversal`.
///
/// Every edge of the result carries its weight in `source`.
///
/// ```rust
/// use lasso::{chordal, graph::Traversal, DistanceGraph};
/// use lasso_phylo::{FromNewick, Phylogeny};
///
/// let tree = Phylogeny::from_newick("((A:1,B:2):3,(C:1.5,D:2.5):1);")?;
/// let metric = DistanceGraph::try_from(&tree)?;
/// let subgraph = chordal::build(&metric, Traversal::Breadth)?;
/// assert_eq!(subgraph.len(), 4);
/// assert!(subgraph.edge_count() < metric.edge_count());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn build(source: &DistanceGraph, traversal: Traversal) -> Result<DistanceGraph, LassoError> {
    let mut chordal = source.spanning_forest(traversal);
    let mut candidates = BTreeSet::new();
    for v in chordal.ids().collect_vec() {
        expose(source, &chordal, v, &mut candidates);
    }

    let (mut accepted, mut rejected) = (0, 0);
    while let Some(Candidate { weight, pair: Pair(a, b) }) = candidates.pop_first() {
        if chordal.has_distance(a, b) {
            continue;
        }
        if !is_inferable(source, &chordal, a, b) {
            rejected += 1;
            continue;
        }
        chordal.set_distance(a, b, weight)?;
        match completes(&chordal, a, b)? {
            true => {
                expose(source, &chordal, a, &mut candidates);
                expose(source, &chordal, b, &mut candidates);
                accepted += 1;
            }
            false => {
                chordal.remove_distance(a, b);
                rejected += 1;
            }
        }
    }

    log::debug!(
        "Chordal subgraph ({traversal}): {} edges, {accepted} accepted and {rejected} rejected beyond the spanning forest.",
        chordal.edge_count()
    );
    Ok(chordal)
}

/// Queues every pair of neighbours of `v` that is an edge of the source but not of the subgraph.
fn expose(source: &DistanceGraph, chordal: &DistanceGraph, v: TaxonId, candidates: &mut BTreeSet<Candidate>) {
    let neighbours = chordal.neighbours(v);
    for (x, y) in neighbours.iter().copied().tuple_combinations() {
        if source.has_distance(x, y) && !chordal.has_distance(x, y) {
            candidates.insert(Candidate { weight: source.distance(x, y), pair: Pair::new(x, y) });
        }
    }
}

/// Returns `true` if the edge `(a, b)` can be added without breaking chordality or inferability.
fn is_inferable(source: &DistanceGraph, chordal: &DistanceGraph, a: TaxonId, b: TaxonId) -> bool {
    let common = chordal.common_neighbours(a, b);
    if common.is_empty() {
        return false;
    }

    for v in common {
        let around = chordal.neighbours(v);
        if chordal.has_path(a, b, Some(&around)) {
            return false;
        }
        for (x, y) in [(a, b), (b, a)] {
            // diamond {u, v, x, y}: missing (u, y) with chord (v, x)
            for u in around.iter().copied().filter(|u| *u != a && *u != b) {
                if !chordal.has_distance(u, x) {
                    continue;
                }
                let parallel_1 = chordal.distance(u, v) + source.distance(x, y);
                let parallel_2 = chordal.distance(u, x) + chordal.distance(v, y);
                if !matches!(resolve(parallel_1, parallel_2, chordal.distance(v, x)), Inference::Resolved(_)) {
                    return false;
                }
            }
        }
    }
    true
}

/// Returns `true` if shelling completes the triangles joined by the edge `(a, b)`.
fn completes(chordal: &DistanceGraph, a: TaxonId, b: TaxonId) -> Result<bool, LassoError> {
    let Some(v) = chordal.common_neighbours(a, b).first().copied() else { return Ok(false) };
    let mut component = cover::triangle_component(chordal, a, b, v);
    shelling::incremental(&mut component, &StepBudget::unlimited())?;
    Ok(component.is_complete())
}
