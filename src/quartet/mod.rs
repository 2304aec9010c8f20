//! Extract the quartet topologies of a metric with the four-point condition.

#[cfg(test)]
mod tests;

use crate::graph::Pair;
use crate::utils::approx_eq;
use crate::DistanceGraph;
use itertools::Itertools;
use lasso_phylo::TaxonId;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A resolved quartet: two cherries, and the length of the internal edge between them.
///
/// Each cherry is stored lower id first, and the cherry with the lower first id is `left`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Quartet {
    pub left: Pair,
    pub right: Pair,
    pub weight: f64,
}

#[rustfmt::skip]
impl Display for Quartet { fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{},{}|{},{}", self.left.0, self.left.1, self.right.0, self.right.1) } }

impl Quartet {
    pub fn new(left: Pair, right: Pair, weight: f64) -> Self {
        match left <= right {
            true => Quartet { left, right, weight },
            false => Quartet { left: right, right: left, weight },
        }
    }

    pub fn taxa(&self) -> [TaxonId; 4] {
        [self.left.0, self.left.1, self.right.0, self.right.1]
    }
}

/// Returns the quartet of four taxa, if all six distances are known and one pairing is
/// strictly shorter than the two others, which must be equal.
///
/// With `weighted`, the quartet weight is the length of its internal edge, otherwise `0`.
///
/// ```rust
/// use lasso::{quartet, DistanceGraph};
/// use lasso_phylo::{FromNewick, Phylogeny, TaxonId};
///
/// let tree = Phylogeny::from_newick("((A:1,B:2):3,(C:1.5,D:2.5):1);")?;
/// let graph = DistanceGraph::try_from(&tree)?;
/// let taxa = [TaxonId(3), TaxonId(1), TaxonId(4), TaxonId(2)];
/// let quartet = quartet::resolve_quartet(&graph, taxa, true).unwrap();
/// assert_eq!(quartet.to_string(), "1,2|3,4");
/// assert_eq!(quartet.weight, 4.0);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn resolve_quartet(graph: &DistanceGraph, taxa: [TaxonId; 4], weighted: bool) -> Option<Quartet> {
    let [a, b, c, d] = taxa;
    if taxa.iter().tuple_combinations().any(|(x, y)| !graph.has_distance(*x, *y)) {
        return None;
    }
    let dist = |x, y| graph.distance(x, y);

    let mut pairings = [
        (dist(a, b) + dist(c, d), Pair::new(a, b), Pair::new(c, d)),
        (dist(a, c) + dist(b, d), Pair::new(a, c), Pair::new(b, d)),
        (dist(a, d) + dist(b, c), Pair::new(a, d), Pair::new(b, c)),
    ];
    pairings.sort_by(|x, y| x.0.total_cmp(&y.0));
    let [(s1, left, right), (s2, ..), (s3, ..)] = pairings;

    if approx_eq(s1, s2) || !approx_eq(s2, s3) {
        return None;
    }
    let weight = match weighted {
        true => ((s2 + s3) / 2.0 - s1) / 2.0,
        false => 0.0,
    };
    Some(Quartet::new(left, right, weight))
}

/// Returns every resolved quartet of the graph, sorted by cherries.
pub fn extract(graph: &DistanceGraph, weighted: bool) -> Vec<Quartet> {
    let combinations: Vec<Vec<TaxonId>> = graph.ids().combinations(4).collect();
    let mut quartets: Vec<Quartet> = combinations
        .par_iter()
        .filter_map(|taxa| resolve_quartet(graph, [taxa[0], taxa[1], taxa[2], taxa[3]], weighted))
        .collect();
    quartets.sort_by(|x, y| (x.left, x.right).cmp(&(y.left, y.right)));
    log::debug!("Extracted {} quartets from {} combinations.", quartets.len(), combinations.len());
    quartets
}
