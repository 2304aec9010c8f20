//! Cluster taxa into trees by repeatedly merging the clique at the minimum distance.
//!
//! Every merge creates an internal node (ids `-1, -2, ...`) at half the clique distance,
//! replaces the clique members by that node, and asks a [`DistanceUpdater`] for the distances
//! from the node to the remaining vertices. Along the way, [`Provenance`] records which input
//! distances were needed: the lasso of the resulting tree.

pub mod provenance;
pub mod updater;
#[cfg(test)]
mod tests;

pub use provenance::{MergeDelta, Provenance};
pub use updater::{DistanceUpdater, ModalUpdater, UpdaterStrategy, Vote};

use crate::clique::CliqueFinder;
use crate::graph::Pair;
use crate::{DistanceGraph, LassoError};
use color_eyre::eyre::{Report, Result};
use itertools::Itertools;
use lasso_phylo::{Branch, Phylogeny, Taxon, TaxonId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ----------------------------------------------------------------------------
// Results

/// A tree built by agglomeration, and the input distances that determine it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LassoTree {
    pub tree: Phylogeny<Taxon, Branch>,
    /// Used pairs whose taxa are both leaves of this tree.
    pub lasso: BTreeSet<Pair>,
}

impl LassoTree {
    /// Returns the number of input taxa in the tree.
    pub fn leaves(&self) -> Result<usize, Report> {
        let root = self.tree.get_root()?;
        Ok(self.tree.get_leaves(root)?.len())
    }
}

/// The outcome of one agglomeration run.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Agglomeration {
    /// One tree per vertex left when no distance remains.
    pub trees: Vec<LassoTree>,
    /// Every input distance used by a merge.
    pub used: BTreeSet<Pair>,
    /// Number of cliques merged.
    pub merges: usize,
    /// Cluster distances that could not be voted on, and were left unknown.
    pub unresolved: usize,
}

impl Agglomeration {
    /// Returns the tree with the most leaves, the first one on ties.
    pub fn largest(&self) -> Result<Option<&LassoTree>, Report> {
        let mut best: Option<(&LassoTree, usize)> = None;
        for tree in &self.trees {
            let leaves = tree.leaves()?;
            if best.map_or(true, |(_, n)| leaves > n) {
                best = Some((tree, leaves));
            }
        }
        Ok(best.map(|(tree, _)| tree))
    }
}

// ----------------------------------------------------------------------------
// Agglomerator

/// Clique-and-merge clustering, with a pluggable clique finder and distance updater.
///
/// ```rust
/// use lasso::agglomerate::{Agglomerator, ModalUpdater};
/// use lasso::clique::ExactCliqueFinder;
/// use lasso::DistanceGraph;
/// use lasso_phylo::{FromNewick, Phylogeny, ToNewick};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let tree = Phylogeny::from_newick("((A:1,B:1):2,C:3);")?;
/// let graph = DistanceGraph::try_from(&tree)?;
/// let agglomerator = Agglomerator::new(ExactCliqueFinder, ModalUpdater);
/// let result = agglomerator.run(&graph, &mut StdRng::seed_from_u64(0))?;
/// assert_eq!(result.trees.len(), 1);
/// let mut tree = result.trees[0].tree.clone();
/// tree.remove_internal_identifiers();
/// assert_eq!(tree.to_newick()?, "((A:1,B:1):2,C:3);");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug)]
pub struct Agglomerator<F, U> {
    pub finder: F,
    pub updater: U,
}

impl<F, U> Agglomerator<F, U>
where
    F: CliqueFinder,
    U: DistanceUpdater,
{
    pub fn new(finder: F, updater: U) -> Self {
        Agglomerator { finder, updater }
    }

    /// Agglomerates a copy of the graph until no distance remains.
    ///
    /// Fails with [`LassoError::NoTriangle`] if the graph has no three taxa that are pairwise
    /// connected, as no merge could then be justified.
    pub fn run<R: Rng + ?Sized>(&self, graph: &DistanceGraph, rng: &mut R) -> Result<Agglomeration, Report> {
        if !graph.has_triangle() {
            Err(LassoError::NoTriangle { taxa: graph.len() })?
        }

        let mut working = graph.clone();
        let mut forest: Phylogeny<Taxon, Branch> = Phylogeny::new();
        working.taxa().for_each(|taxon| _ = forest.add_node(taxon.clone()));

        let mut heights: BTreeMap<TaxonId, f64> = BTreeMap::new();
        let mut provenance = Provenance::new();
        let (mut next_id, mut merges, mut unresolved) = (-1_i32, 0, 0);

        loop {
            // ----------------------------------------------------------------
            // Clique at the minimum distance

            let min = match working.min_edge_weight() {
                Ok(min) => min,
                Err(LassoError::NoEdges { .. }) => break,
                Err(e) => return Err(e.into()),
            };
            let mut restricted = working.clone();
            restricted.retain_min_edges()?;
            let clique = match self.finder.find_clique(&restricted, rng) {
                Ok(clique) if clique.len() >= 2 => clique,
                Ok(_) | Err(LassoError::NoEdges { .. }) => break,
                Err(e) => return Err(e.into()),
            };

            // ----------------------------------------------------------------
            // New internal node

            let node = Taxon::internal(next_id);
            next_id -= 1;
            let height = min / 2.0;
            for member in &clique {
                let child = working.taxon(*member)?.clone();
                let length = height - heights.get(member).copied().unwrap_or_default();
                forest.add_branch(node.clone(), child, Branch::new(length))?;
            }
            heights.insert(node.id, height);

            // ----------------------------------------------------------------
            // Distances to the remaining vertices

            let mut votes = Vec::new();
            for external in working.ids().filter(|v| !clique.contains(v)).collect_vec() {
                match self.updater.update(&working, &clique, external, min, rng) {
                    Some(vote) => votes.push((external, vote)),
                    None => {
                        log::debug!("No distance from {node} to {external}, it is left unknown.");
                        unresolved += 1;
                    }
                }
            }

            let delta = provenance.merge_delta(&clique, node.id, &votes);
            for member in &clique {
                working.remove_taxon(*member)?;
            }
            working.add_taxon(node.clone());
            for (external, vote) in &votes {
                working.set_distance(node.id, *external, vote.distance)?;
            }
            provenance.apply(delta);
            merges += 1;
            log::debug!("Merged {clique:?} into {node} at height {height}.");
        }

        // ----------------------------------------------------------------
        // One tree per remaining vertex

        let used = provenance.into_used();
        let mut trees = Vec::new();
        for root in working.taxa() {
            let tree = forest.subtree(root)?;
            let leaves: BTreeSet<TaxonId> = tree.get_leaves(root)?.iter().map(|taxon| taxon.id).collect();
            let lasso = used.iter().filter(|p| leaves.contains(&p.0) && leaves.contains(&p.1)).copied().collect();
            trees.push(LassoTree { tree, lasso });
        }

        log::info!(
            "Agglomerated {} taxa into {} trees with {merges} merges, using {} distances.",
            graph.len(),
            trees.len(),
            used.len()
        );
        Ok(Agglomeration { trees, used, merges, unresolved })
    }
}
