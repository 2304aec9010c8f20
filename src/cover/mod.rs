//! Partition a chordal subgraph into triplet covers.
//!
//! A triplet cover is a connected set of triangles, grown from a triangle around a vertex of
//! degree 2. Every quartet of taxa inside one cover can be resolved by shelling.

#[cfg(test)]
mod tests;

use crate::graph::Pair;
use crate::DistanceGraph;
use lasso_phylo::TaxonId;
use std::collections::{BTreeSet, VecDeque};

/// Returns the triplet covers of a chordal graph that span more than three taxa.
///
/// ```rust
/// use lasso::{chordal, cover, graph::Traversal, DistanceGraph};
/// use lasso_phylo::{FromNewick, Phylogeny};
///
/// let tree = Phylogeny::from_newick("((A:1,B:2):3,(C:1.5,D:2.5):1,E:2);")?;
/// let subgraph = chordal::build(&DistanceGraph::try_from(&tree)?, Traversal::Breadth)?;
/// let covers = cover::triplet_covers(&subgraph);
/// assert_eq!(covers.len(), 1);
/// assert_eq!(covers[0].len(), 5);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn triplet_covers(chordal: &DistanceGraph) -> Vec<DistanceGraph> {
    let mut working = chordal.clone();
    strip_loose_edges(&mut working);

    let mut covers = Vec::new();
    let mut discarded = 0;
    loop {
        let Some(seed) = working.ids().find(|v| working.degree(*v) == 2) else { break };
        let (p, q) = {
            let mut neighbours = working.neighbours(seed).into_iter();
            match (neighbours.next(), neighbours.next()) {
                (Some(p), Some(q)) => (p, q),
                _ => break,
            }
        };

        // the seed is not part of a triangle
        if !working.has_distance(p, q) {
            working.remove_distance(seed, p);
            working.remove_distance(seed, q);
            continue;
        }

        let cover = triangle_component(&working, seed, p, q);
        for (pair, _) in cover.edges() {
            working.remove_distance(pair.0, pair.1);
        }

        match cover.len() > 3 {
            true => {
                log::debug!("Triplet cover from seed {seed}: {} taxa, {} edges.", cover.len(), cover.edge_count());
                covers.push(cover);
            }
            false => discarded += 1,
        }
    }

    if discarded > 0 {
        log::debug!("Discarded {discarded} triplet covers with 3 taxa or less.");
    }
    covers
}

/// Removes the edges that are not part of any triangle.
fn strip_loose_edges(graph: &mut DistanceGraph) {
    let loose: Vec<Pair> = graph
        .edges()
        .into_iter()
        .map(|(pair, _)| pair)
        .filter(|pair| graph.common_neighbours(pair.0, pair.1).is_empty())
        .collect();
    loose.iter().for_each(|pair| _ = graph.remove_distance(pair.0, pair.1));
}

/// Returns the triangles reachable from the triangle `(x, y, z)` by moving across shared
/// edges, with the weights of `graph`.
pub(crate) fn triangle_component(graph: &DistanceGraph, x: TaxonId, y: TaxonId, z: TaxonId) -> DistanceGraph {
    let edges = walk_triangles(graph, [Pair::new(x, y), Pair::new(x, z), Pair::new(y, z)]);
    let taxa: BTreeSet<TaxonId> = edges.iter().flat_map(|pair| [pair.0, pair.1]).collect();
    let mut component = graph.subgraph(&taxa);
    // only the walked edges, the induced subgraph may hold more
    for (pair, _) in component.edges() {
        if !edges.contains(&pair) {
            component.remove_distance(pair.0, pair.1);
        }
    }
    component
}

/// Returns every edge reachable from the starting triangle by moving across shared edges.
fn walk_triangles(graph: &DistanceGraph, triangle: [Pair; 3]) -> BTreeSet<Pair> {
    let mut visited: BTreeSet<Pair> = triangle.into_iter().collect();
    let mut queue: VecDeque<Pair> = triangle.into_iter().collect();
    while let Some(Pair(x, y)) = queue.pop_front() {
        for z in graph.common_neighbours(x, y) {
            for edge in [Pair::new(x, z), Pair::new(y, z)] {
                if visited.insert(edge) {
                    queue.push_back(edge);
                }
            }
        }
    }
    visited
}
