//! The [`DistanceGraph`]: taxa and a sparse, symmetric relation of known pairwise distances.
//!
//! A distance of `0` (or no entry at all) means the distance is unknown, which also means
//! there is no edge between the two taxa. Every other algorithm of the crate reads and writes
//! distances through this type.


use crate::LassoError;
use color_eyre::eyre::{Report, Result};
#[cfg(feature = "cli")]
use clap::ValueEnum;
use lasso_phylo::{Branch, Phylogeny, Taxon, TaxonId};
use petgraph::graphmap::UnGraphMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::{Display, Formatter};

// ----------------------------------------------------------------------------
// Pair

/// An unordered pair of taxa, always stored lower id first.
///
/// ```rust
/// use lasso::graph::Pair;
/// use lasso_phylo::TaxonId;
/// assert_eq!(Pair::new(TaxonId(4), TaxonId(2)), Pair(TaxonId(2), TaxonId(4)));
/// ```
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Pair(pub TaxonId, pub TaxonId);

#[rustfmt::skip]
impl Display for Pair { fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}-{}", self.0, self.1) } }

impl Pair {
    /// Returns the canonical pair of two taxa.
    pub fn new(a: TaxonId, b: TaxonId) -> Self {
        match a <= b {
            true => Pair(a, b),
            false => Pair(b, a),
        }
    }

    /// Returns `true` if the taxon is one of the two ends.
    pub fn contains(&self, id: TaxonId) -> bool {
        self.0 == id || self.1 == id
    }

    /// Returns `true` if both ends are input taxa, rather than synthesized internal nodes.
    pub fn is_original(&self) -> bool {
        !self.0.is_internal() && !self.1.is_internal()
    }
}

// ----------------------------------------------------------------------------
// Traversal

/// The order used to walk a [`DistanceGraph`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[strum(serialize_all = "lowercase")]
pub enum Traversal {
    #[default]
    Breadth,
    Depth,
}

/// Callbacks of a graph traversal, both default to doing nothing.
pub trait Visitor {
    /// Called once for every vertex, when it is discovered.
    fn visit_vertex(&mut self, _vertex: TaxonId) {}
    /// Called for every tree edge, from the discovered vertex back to the vertex it was reached from.
    fn visit_edge(&mut self, _source: TaxonId, _target: TaxonId, _distance: f64) {}
}

impl Visitor for () {}

/// Collects the tree edges of a traversal.
#[derive(Debug, Default)]
struct TreeEdges(Vec<(TaxonId, TaxonId, f64)>);

impl Visitor for TreeEdges {
    fn visit_edge(&mut self, source: TaxonId, target: TaxonId, distance: f64) {
        self.0.push((source, target, distance));
    }
}

// ----------------------------------------------------------------------------
// DistanceGraph

/// Taxa plus the known pairwise distances between them.
///
/// Cloning a graph deep-copies the taxa and the distances, which is how independent runs
/// get a graph of their own.
///
/// ```rust
/// use lasso::DistanceGraph;
/// use lasso_phylo::{Taxon, TaxonId};
///
/// let mut graph = DistanceGraph::from_taxa([Taxon::new(1, "A"), Taxon::new(2, "B"), Taxon::new(3, "C")]);
/// graph.set_distance(TaxonId(1), TaxonId(2), 2.5)?;
/// assert_eq!(graph.distance(TaxonId(2), TaxonId(1)), 2.5);
/// assert_eq!(graph.distance(TaxonId(1), TaxonId(3)), 0.0);
/// assert!(graph.set_distance(TaxonId(1), TaxonId(9), 1.0).is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct DistanceGraph {
    taxa: BTreeMap<TaxonId, Taxon>,
    graph: UnGraphMap<TaxonId, f64>,
}

impl PartialEq for DistanceGraph {
    fn eq(&self, other: &Self) -> bool {
        self.taxa.keys().eq(other.taxa.keys()) && self.edges() == other.edges()
    }
}

impl DistanceGraph {
    /// Returns a new graph without taxa.
    pub fn new() -> Self {
        DistanceGraph { taxa: BTreeMap::new(), graph: UnGraphMap::new() }
    }

    /// Returns a new graph with the taxa and no distances.
    pub fn from_taxa<I>(taxa: I) -> Self
    where
        I: IntoIterator<Item = Taxon>,
    {
        let mut graph = DistanceGraph::new();
        taxa.into_iter().for_each(|taxon| graph.add_taxon(taxon));
        graph
    }

    /// Adds a taxon, replacing the display name if the id already exists.
    pub fn add_taxon(&mut self, taxon: Taxon) {
        self.graph.add_node(taxon.id);
        self.taxa.insert(taxon.id, taxon);
    }

    /// Removes a taxon and every distance to it.
    pub fn remove_taxon(&mut self, id: TaxonId) -> Result<Taxon, LassoError> {
        let taxon = self.taxa.remove(&id).ok_or_else(|| self.unknown(id, "remove taxon"))?;
        self.graph.remove_node(id);
        Ok(taxon)
    }

    /// Returns the taxon with this id.
    pub fn taxon(&self, id: TaxonId) -> Result<&Taxon, LassoError> {
        self.taxa.get(&id).ok_or_else(|| self.unknown(id, "taxon lookup"))
    }

    pub fn contains(&self, id: TaxonId) -> bool {
        self.taxa.contains_key(&id)
    }

    /// Returns the taxa in ascending id order.
    pub fn taxa(&self) -> impl Iterator<Item = &Taxon> {
        self.taxa.values()
    }

    /// Returns the taxon ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = TaxonId> + '_ {
        self.taxa.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }

    /// Returns the distance between two taxa, `0` if it is unknown.
    pub fn distance(&self, a: TaxonId, b: TaxonId) -> f64 {
        self.graph.edge_weight(a, b).copied().unwrap_or(0.0)
    }

    /// Returns `true` if the distance between two taxa is known.
    pub fn has_distance(&self, a: TaxonId, b: TaxonId) -> bool {
        self.graph.contains_edge(a, b)
    }

    /// Sets the distance between two taxa.
    ///
    /// A distance that is not strictly positive removes the edge, as `0` stands for unknown.
    pub fn set_distance(&mut self, a: TaxonId, b: TaxonId, distance: f64) -> Result<(), LassoError> {
        for id in [a, b] {
            if !self.contains(id) {
                Err(self.unknown(id, "set distance"))?
            }
        }
        if a == b {
            return Ok(());
        }
        match distance > 0.0 {
            true => _ = self.graph.add_edge(a, b, distance),
            false => _ = self.graph.remove_edge(a, b),
        }
        Ok(())
    }

    /// Removes the distance between two taxa, returning it if it was known.
    pub fn remove_distance(&mut self, a: TaxonId, b: TaxonId) -> Option<f64> {
        self.graph.remove_edge(a, b)
    }

    /// Returns the taxa with a known distance to `v`.
    pub fn neighbours(&self, v: TaxonId) -> BTreeSet<TaxonId> {
        self.graph.neighbors(v).collect()
    }

    /// Returns the taxa at exactly `weight` from `v`.
    pub fn neighbours_at(&self, v: TaxonId, weight: f64) -> BTreeSet<TaxonId> {
        self.graph.neighbors(v).filter(|u| self.distance(v, *u) == weight).collect()
    }

    /// Returns the taxa with a known distance to both `a` and `b`.
    pub fn common_neighbours(&self, a: TaxonId, b: TaxonId) -> BTreeSet<TaxonId> {
        self.graph.neighbors(a).filter(|u| *u != b && self.graph.contains_edge(*u, b)).collect()
    }

    pub fn degree(&self, v: TaxonId) -> usize {
        self.graph.neighbors(v).count()
    }

    /// Returns every known distance, sorted by pair.
    pub fn edges(&self) -> Vec<(Pair, f64)> {
        let mut edges: Vec<_> = self.graph.all_edges().map(|(a, b, d)| (Pair::new(a, b), *d)).collect();
        edges.sort_by(|x, y| x.0.cmp(&y.0));
        edges
    }

    /// Returns the number of known distances.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns `true` if every pair of taxa has a known distance.
    pub fn is_complete(&self) -> bool {
        let n = self.len();
        self.edge_count() == n * n.saturating_sub(1) / 2
    }

    /// Returns the smallest positive distance of the graph.
    ///
    /// ```rust
    /// use lasso::{DistanceGraph, LassoError};
    /// use lasso_phylo::Taxon;
    /// let graph = DistanceGraph::from_taxa([Taxon::new(1, "A"), Taxon::new(2, "B")]);
    /// assert!(matches!(graph.min_edge_weight(), Err(LassoError::NoEdges { .. })));
    /// ```
    pub fn min_edge_weight(&self) -> Result<f64, LassoError> {
        let weights: Vec<f64> = self.graph.all_edges().map(|(_, _, d)| *d).collect();
        weights
            .into_par_iter()
            .filter(|d| *d > 0.0)
            .reduce_with(f64::min)
            .ok_or(LassoError::NoEdges { operation: "minimum edge weight", taxa: self.len() })
    }

    /// Deletes every edge above the minimum weight, and returns the minimum weight.
    pub fn retain_min_edges(&mut self) -> Result<f64, LassoError> {
        let min = self.min_edge_weight()?;
        let heavier: Vec<(TaxonId, TaxonId)> =
            self.graph.all_edges().filter(|(_, _, d)| **d > min).map(|(a, b, _)| (a, b)).collect();
        heavier.into_iter().for_each(|(a, b)| _ = self.graph.remove_edge(a, b));
        Ok(min)
    }

    /// Returns the induced subgraph on a set of taxa, unknown ids are skipped.
    pub fn subgraph(&self, ids: &BTreeSet<TaxonId>) -> DistanceGraph {
        let mut subgraph =
            DistanceGraph::from_taxa(ids.iter().filter_map(|id| self.taxa.get(id)).cloned());
        self.graph
            .all_edges()
            .filter(|(a, b, _)| ids.contains(a) && ids.contains(b))
            .for_each(|(a, b, d)| _ = subgraph.graph.add_edge(a, b, *d));
        subgraph
    }

    /// Returns one induced subgraph per connected component, in order of their lowest id.
    pub fn connected_components(&self) -> Vec<DistanceGraph> {
        let mut seen = BTreeSet::new();
        let mut components = Vec::new();
        for id in self.ids() {
            if seen.contains(&id) {
                continue;
            }
            let component = self.walk(id, None, &mut (), Traversal::Breadth);
            seen.extend(component.iter().copied());
            components.push(self.subgraph(&component));
        }
        components
    }

    /// Walks the graph depth-first from `start`, returning the visited taxa.
    ///
    /// With `restrict`, only taxa in the set are entered (`start` is always visited).
    pub fn depth_first_search<V: Visitor>(
        &self,
        start: TaxonId,
        restrict: Option<&BTreeSet<TaxonId>>,
        visitor: &mut V,
    ) -> Result<BTreeSet<TaxonId>, LassoError> {
        self.taxon(start)?;
        Ok(self.walk(start, restrict, visitor, Traversal::Depth))
    }

    /// Walks the graph breadth-first from `start`, returning the visited taxa.
    ///
    /// With `restrict`, only taxa in the set are entered (`start` is always visited).
    pub fn breadth_first_search<V: Visitor>(
        &self,
        start: TaxonId,
        restrict: Option<&BTreeSet<TaxonId>>,
        visitor: &mut V,
    ) -> Result<BTreeSet<TaxonId>, LassoError> {
        self.taxon(start)?;
        Ok(self.walk(start, restrict, visitor, Traversal::Breadth))
    }

    /// Returns `true` if `b` can be reached from `a` through taxa of `restrict`.
    pub fn has_path(&self, a: TaxonId, b: TaxonId, restrict: Option<&BTreeSet<TaxonId>>) -> bool {
        self.contains(a) && self.walk(a, restrict, &mut (), Traversal::Depth).contains(&b)
    }

    /// Returns a spanning forest: every taxon, and the tree edges of a traversal per component.
    pub fn spanning_forest(&self, traversal: Traversal) -> DistanceGraph {
        let mut forest = DistanceGraph::from_taxa(self.taxa().cloned());
        let mut seen = BTreeSet::new();
        for id in self.ids() {
            if seen.contains(&id) {
                continue;
            }
            let mut edges = TreeEdges::default();
            seen.extend(self.walk(id, None, &mut edges, traversal));
            edges.0.into_iter().for_each(|(a, b, d)| _ = forest.graph.add_edge(a, b, d));
        }
        forest
    }

    /// Returns `true` if any three taxa are pairwise connected.
    pub fn has_triangle(&self) -> bool {
        self.graph.all_edges().any(|(a, b, _)| !self.common_neighbours(a, b).is_empty())
    }

    /// Neighbours of `v`, nearest first and by id on equal distances.
    fn sorted_neighbours(&self, v: TaxonId) -> Vec<TaxonId> {
        let mut neighbours: Vec<_> = self.graph.neighbors(v).collect();
        neighbours.sort_by(|a, b| self.distance(v, *a).total_cmp(&self.distance(v, *b)).then(a.cmp(b)));
        neighbours
    }

    fn walk<V: Visitor>(
        &self,
        start: TaxonId,
        restrict: Option<&BTreeSet<TaxonId>>,
        visitor: &mut V,
        traversal: Traversal,
    ) -> BTreeSet<TaxonId> {
        let allowed = |v: &TaxonId| restrict.map_or(true, |set| set.contains(v));
        let mut visited = BTreeSet::from([start]);
        visitor.visit_vertex(start);

        match traversal {
            Traversal::Breadth => {
                let mut queue = VecDeque::from([start]);
                while let Some(v) = queue.pop_front() {
                    for u in self.sorted_neighbours(v) {
                        if allowed(&u) && visited.insert(u) {
                            visitor.visit_vertex(u);
                            visitor.visit_edge(u, v, self.distance(u, v));
                            queue.push_back(u);
                        }
                    }
                }
            }
            Traversal::Depth => {
                // explicit stack of (vertex, remaining neighbours), in place of recursion
                let mut stack = vec![(start, self.sorted_neighbours(start).into_iter())];
                while let Some((v, neighbours)) = stack.last_mut() {
                    let v = *v;
                    let next = neighbours.find(|u| allowed(u) && !visited.contains(u));
                    match next {
                        Some(u) => {
                            visited.insert(u);
                            visitor.visit_vertex(u);
                            visitor.visit_edge(u, v, self.distance(u, v));
                            stack.push((u, self.sorted_neighbours(u).into_iter()));
                        }
                        None => _ = stack.pop(),
                    }
                }
            }
        }
        visited
    }

    fn unknown(&self, id: TaxonId, operation: &'static str) -> LassoError {
        LassoError::UnknownIdentifier { id, operation, taxa: self.len() }
    }
}

impl TryFrom<&Phylogeny<Taxon, Branch>> for DistanceGraph {
    type Error = Report;

    /// Returns the complete additive metric of a tree, over its leaves.
    ///
    /// ```rust
    /// use lasso::DistanceGraph;
    /// use lasso_phylo::{FromNewick, Phylogeny, TaxonId};
    /// let tree = Phylogeny::from_newick("((A:1,B:2):3,C:4);")?;
    /// let graph = DistanceGraph::try_from(&tree)?;
    /// assert_eq!(graph.distance(TaxonId(2), TaxonId(3)), 9.0);
    /// assert!(graph.is_complete());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    fn try_from(phylo: &Phylogeny<Taxon, Branch>) -> Result<Self, Report> {
        let mut graph = DistanceGraph::new();
        for (a, b, d) in phylo.leaf_distances()? {
            graph.add_taxon(a.clone());
            graph.add_taxon(b.clone());
            graph.set_distance(a.id, b.id, d)?;
        }
        Ok(graph)
    }
}
