use crate::clique::CliqueFinder;
use crate::{DistanceGraph, LassoError};
use lasso_phylo::TaxonId;
use rand::Rng;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

type Neighbours = BTreeMap<TaxonId, BTreeSet<TaxonId>>;

/// Bron–Kerbosch with Tomita pivoting, returns the first largest clique found.
///
/// ```rust
/// use lasso::clique::{CliqueFinder, ExactCliqueFinder};
/// use lasso::DistanceGraph;
/// use lasso_phylo::{Taxon, TaxonId};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut graph = DistanceGraph::from_taxa((1..=4).map(|i| Taxon::new(i, format!("T{i}"))));
/// for (a, b) in [(1, 2), (1, 3), (2, 3), (3, 4)] {
///     graph.set_distance(TaxonId(a), TaxonId(b), 1.0)?;
/// }
/// let clique = ExactCliqueFinder.find_clique(&graph, &mut StdRng::seed_from_u64(0))?;
/// assert_eq!(clique, [TaxonId(1), TaxonId(2), TaxonId(3)]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExactCliqueFinder;

impl CliqueFinder for ExactCliqueFinder {
    fn find_clique<R: Rng + ?Sized>(
        &self,
        graph: &DistanceGraph,
        _rng: &mut R,
    ) -> Result<Vec<TaxonId>, LassoError> {
        let min = graph
            .min_edge_weight()
            .map_err(|_| LassoError::NoEdges { operation: "exact clique", taxa: graph.len() })?;

        // neighbour sets at the minimum weight, computed once
        let neighbours: Neighbours = graph
            .ids()
            .map(|v| (v, graph.neighbours_at(v, min)))
            .filter(|(_, n)| !n.is_empty())
            .collect();
        let candidates = neighbours.keys().copied().collect();

        let mut best = Vec::new();
        bron_kerbosch(&neighbours, BTreeSet::new(), candidates, BTreeSet::new(), &mut best);
        log::debug!("Exact clique at distance {min}: {best:?}");
        Ok(best)
    }
}

fn bron_kerbosch(
    neighbours: &Neighbours,
    clique: BTreeSet<TaxonId>,
    mut candidates: BTreeSet<TaxonId>,
    mut excluded: BTreeSet<TaxonId>,
    best: &mut Vec<TaxonId>,
) {
    if candidates.is_empty() && excluded.is_empty() {
        if clique.len() > best.len() {
            *best = clique.into_iter().collect();
        }
        return;
    }
    // cannot beat the current best from here
    if clique.len() + candidates.len() <= best.len() {
        return;
    }

    let empty = BTreeSet::new();
    let of = |v: &TaxonId| neighbours.get(v).unwrap_or(&empty);

    let pivot = candidates
        .union(&excluded)
        .max_by_key(|u| (of(u).intersection(&candidates).count(), Reverse(**u)))
        .copied();
    let branches: Vec<TaxonId> = match pivot {
        Some(pivot) => candidates.difference(of(&pivot)).copied().collect(),
        None => candidates.iter().copied().collect(),
    };

    for v in branches {
        let mut next = clique.clone();
        next.insert(v);
        bron_kerbosch(
            neighbours,
            next,
            candidates.intersection(of(&v)).copied().collect(),
            excluded.intersection(of(&v)).copied().collect(),
            best,
        );
        candidates.remove(&v);
        excluded.insert(v);
    }
}
