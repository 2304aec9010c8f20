use crate::clique::CliqueFinder;
use crate::graph::Pair;
use crate::{DistanceGraph, LassoError};
use lasso_phylo::TaxonId;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Randomized greedy clique growth, restarted `attempts` times.
///
/// Each attempt seeds a clique with a random minimum-weight edge, then keeps adding a random
/// vertex adjacent to every member until none is left. The largest cliques are kept and
/// one of them is returned at random.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeuristicCliqueFinder {
    pub attempts: usize,
}

impl Default for HeuristicCliqueFinder {
    fn default() -> Self {
        HeuristicCliqueFinder { attempts: 100 }
    }
}

impl CliqueFinder for HeuristicCliqueFinder {
    fn find_clique<R: Rng + ?Sized>(
        &self,
        graph: &DistanceGraph,
        rng: &mut R,
    ) -> Result<Vec<TaxonId>, LassoError> {
        let operation = "heuristic clique";
        let min = graph.min_edge_weight().map_err(|_| LassoError::EmptyGraph { operation })?;
        let edges: Vec<Pair> =
            graph.edges().into_iter().filter(|(_, d)| *d == min).map(|(p, _)| p).collect();

        let mut best: Vec<Vec<TaxonId>> = Vec::new();
        for _ in 0..self.attempts.max(1) {
            let Some(seed) = edges.choose(rng) else { return Err(LassoError::EmptyGraph { operation }) };
            let mut clique = vec![seed.0, seed.1];
            let mut candidates: BTreeSet<TaxonId> = graph
                .neighbours_at(seed.0, min)
                .intersection(&graph.neighbours_at(seed.1, min))
                .copied()
                .collect();

            while !candidates.is_empty() {
                let i = rng.gen_range(0..candidates.len());
                let Some(v) = candidates.iter().nth(i).copied() else { break };
                clique.push(v);
                let adjacent = graph.neighbours_at(v, min);
                candidates.retain(|u| adjacent.contains(u));
            }
            clique.sort();

            match clique.len().cmp(&best.first().map_or(0, |c| c.len())) {
                Ordering::Greater => best = vec![clique],
                Ordering::Equal if !best.contains(&clique) => best.push(clique),
                _ => (),
            }
        }

        let i = rng.gen_range(0..best.len());
        log::debug!("Heuristic clique at distance {min} ({} candidates): {:?}", best.len(), best[i]);
        Ok(best.swap_remove(i))
    }
}
