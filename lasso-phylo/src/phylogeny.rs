use crate::{newick, Branch, FromNewick, Taxon, ToNewick};

use color_eyre::eyre::{eyre, Report, Result};
use num_traits::AsPrimitive;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef, IntoNodeReferences};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A rooted [`Phylogeny`], or a forest of them, as a directed graph from parents to children.
///
/// ## Introduction
///
/// - The nodes (`N`) can be a wide variety of types (ex. [`str`], [`usize`], [`Taxon`](crate::Taxon), etc.).
/// - The branches (`B`) must be a type that can be cast into an [`f64`] for the length.
/// - Every node has at most one parent, and the graph never contains a cycle.
///
/// ```rust
/// use lasso_phylo::Phylogeny;
/// let mut phylo = Phylogeny::new();
/// phylo.add_branch("R", "A", 1.0)?;
/// phylo.add_branch("R", "B", 2.0)?;
/// assert_eq!(phylo.get_root()?, &"R");
/// assert_eq!(phylo.get_children(&"R")?, [&"A", &"B"]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Phylogeny<N, B> {
    /// Directed graph of parents and children.
    ///
    /// `N` are nodes and `B` are branches.
    pub graph: Graph<N, B>,
}

impl<N, B> Default for Phylogeny<N, B>
where
    N: Clone + Debug + Display + Eq + Hash + PartialEq,
    B: AsPrimitive<f64> + Debug + Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, B> Phylogeny<N, B>
where
    N: Clone + Debug + Display + Eq + Hash + PartialEq,
    B: AsPrimitive<f64> + Debug + Display,
{
    /// Returns a new empty [`Phylogeny`] with nodes (`N`) and branches (`B`).
    ///
    /// ## Examples
    ///
    /// Manually specify the types at creation, with [`str`] nodes (`N`) and [`f64`] branches (`B`).
    ///
    /// ```rust
    /// use lasso_phylo::Phylogeny;
    /// let mut phylo: Phylogeny<&str, f64> = Phylogeny::new();
    /// phylo.add_branch("N1", "N2", 12.5)?;
    /// # assert_eq!(phylo.get_nodes(), [&"N1", &"N2"]);
    /// # assert_eq!(phylo.get_branches(), [&12.5]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    ///
    /// Use the [`Taxon`](crate::Taxon) and [`Branch`](crate::Branch) types of the clustering.
    ///
    /// ```rust
    /// use lasso_phylo::{Branch, Phylogeny, Taxon};
    /// let mut phylo = Phylogeny::new();
    /// phylo.add_branch(Taxon::internal(-1), Taxon::new(1, "A"), Branch::new(1.0))?;
    /// # assert_eq!(phylo.get_nodes(), [&Taxon::internal(-1), &Taxon::new(1, "A")]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn new() -> Self {
        Phylogeny { graph: Graph::new() }
    }

    /// Creates a branch (`B`) between the parent and child nodes (`N`) and returns the [`EdgeIndex`].
    ///
    /// - If the parent and child nodes don't exist yet in the phylogeny, these nodes are created.
    /// - If a branch already exists between parent and child, updates the branch.
    /// - If the child already has a different parent, or the branch introduces a cycle, returns an Error.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// let mut phylo = lasso_phylo::Phylogeny::new();
    /// phylo.add_branch("A", "B", 2.0)?;
    /// phylo.add_branch("A", "B", 5.0)?;
    /// assert_eq!(phylo.get_branches(), [&5.0]);
    ///
    /// assert!(phylo.add_branch("B", "A", 1.0).is_err());
    /// assert!(phylo.add_branch("C", "B", 1.0).is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn add_branch(&mut self, source: N, target: N, branch: B) -> Result<EdgeIndex, Report> {
        // a child in a tree has a single parent
        if let Ok(Some(parent)) = self.get_parent(&target) {
            if *parent != source {
                Err(eyre!("Node {target} already has a parent: {parent}."))?
            }
        }

        let parent_index = self.add_node(source.clone());
        let child_index = self.add_node(target.clone());
        let edge_index = self.graph.update_edge(parent_index, child_index, branch);

        if is_cyclic_directed(&self.graph) {
            self.graph.remove_edge(edge_index);
            Err(eyre!("New branch between {source} and {target} introduced a cycle."))?
        }

        Ok(edge_index)
    }

    /// Adds a new node (`N`) to the [`Phylogeny`] and returns the [`NodeIndex`].
    ///
    /// If the node already exists in the phylogeny, returns the existing [`NodeIndex`].
    pub fn add_node(&mut self, node: N) -> NodeIndex {
        match self.get_node_index(&node) {
            Ok(node_index) => node_index,
            Err(_) => self.graph.add_node(node),
        }
    }

    /// Returns the branch (`B`) between a parent and a child node (`N`).
    pub fn get_branch(&self, parent: &N, child: &N) -> Result<&B, Report> {
        let parent_index = self.get_node_index(parent)?;
        let child_index = self.get_node_index(child)?;
        self.graph
            .find_edge(parent_index, child_index)
            .and_then(|edge_index| self.graph.edge_weight(edge_index))
            .ok_or_else(|| eyre!("No branch between {parent} and {child}."))
    }

    /// Returns all branches (`B`) in the [`Phylogeny`], in insertion order.
    pub fn get_branches(&self) -> Vec<&B> {
        self.graph.edge_references().map(|e| e.weight()).collect()
    }

    /// Returns the immediate children of a node (`N`), in the order they were added.
    pub fn get_children(&self, node: &N) -> Result<Vec<&N>, Report> {
        let node_index = self.get_node_index(node)?;
        let mut children = self
            .graph
            .neighbors_directed(node_index, Direction::Outgoing)
            .map(|node_index| self.get_node(&node_index))
            .collect::<Result<Vec<&N>, Report>>()?;
        // children order is last added to first added, reverse this
        children.reverse();
        Ok(children)
    }

    /// Returns the leaves at or below a node (`N`), in depth-first order.
    ///
    /// ```rust
    /// use lasso_phylo::{Branch, FromNewick, Phylogeny, Taxon};
    /// let phylo: Phylogeny<Taxon, Branch> = Phylogeny::from_newick("((A,B),C);")?;
    /// let leaves: Vec<_> = phylo.get_leaves(phylo.get_root()?)?.iter().map(|t| t.name.as_str()).collect();
    /// assert_eq!(leaves, ["A", "B", "C"]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_leaves<'a>(&'a self, node: &'a N) -> Result<Vec<&'a N>, Report> {
        let mut leaves = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            let children = self.get_children(n)?;
            if children.is_empty() {
                leaves.push(n);
            }
            // push in reverse so the first child is visited first
            stack.extend(children.into_iter().rev());
        }
        Ok(leaves)
    }

    /// Returns the node (`N`) that corresponds to the [`NodeIndex`].
    pub fn get_node(&self, node_index: &NodeIndex) -> Result<&N, Report> {
        self.graph
            .node_weight(*node_index)
            .ok_or_else(|| eyre!("Failed to get node data for node index {node_index:?}"))
    }

    /// Returns all nodes (`N`) in the [`Phylogeny`], in insertion order.
    pub fn get_nodes(&self) -> Vec<&N> {
        self.graph.node_references().map(|(_, n)| n).collect()
    }

    /// Returns the [`NodeIndex`] of a node (`N`).
    pub fn get_node_index(&self, node: &N) -> Result<NodeIndex, Report> {
        self.graph
            .node_references()
            .filter_map(|(i, n)| (*n == *node).then_some(i))
            .next()
            .ok_or_else(|| eyre!("Failed to get node index of node {node}"))
    }

    /// Returns the parent of a node (`N`), or [`None`] for a root.
    pub fn get_parent(&self, node: &N) -> Result<Option<&N>, Report> {
        let node_index = self.get_node_index(node)?;
        self.graph
            .neighbors_directed(node_index, Direction::Incoming)
            .next()
            .map(|parent_index| self.get_node(&parent_index))
            .transpose()
    }

    /// Returns the root node (`N`), which must be unique.
    pub fn get_root(&self) -> Result<&N, Report> {
        match self.get_roots().as_slice() {
            [] => Err(eyre!("Failed to locate root node in phylogeny, graph is empty.")),
            [root] => Ok(*root),
            roots => Err(eyre!("Failed to locate root node in phylogeny, multiple roots found: {roots:?}")),
        }
    }

    /// Returns every node (`N`) without a parent, one per tree of the forest.
    pub fn get_roots(&self) -> Vec<&N> {
        self.graph
            .node_references()
            .filter(|(i, _)| self.graph.neighbors_directed(*i, Direction::Incoming).next().is_none())
            .map(|(_, n)| n)
            .collect()
    }

    /// Returns `true` if the [`Phylogeny`] has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns a new [`Phylogeny`] holding the node (`N`) and all of its descendants.
    ///
    /// ```rust
    /// let mut forest = lasso_phylo::Phylogeny::new();
    /// forest.add_branch("R1", "A", 1.0)?;
    /// forest.add_branch("R2", "B", 1.0)?;
    /// let tree = forest.subtree(&"R2")?;
    /// assert_eq!(tree.get_nodes(), [&"R2", &"B"]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn subtree(&self, root: &N) -> Result<Phylogeny<N, B>, Report> {
        let mut tree = Phylogeny::new();
        tree.add_node(root.clone());
        let root_index = self.get_node_index(root)?;
        let mut dfs = Dfs::new(&self.graph, root_index);
        while let Some(node_index) = dfs.next(&self.graph) {
            let parent = self.get_node(&node_index)?;
            for child in self.get_children(parent)? {
                let branch = *self.get_branch(parent, child)?;
                tree.add_branch(parent.clone(), child.clone(), branch)?;
            }
        }
        Ok(tree)
    }

    /// Returns the path length between every pair of leaves, the additive metric of the tree.
    ///
    /// Pairs are listed once, in the order the leaves were added.
    ///
    /// ```rust
    /// use lasso_phylo::{Branch, FromNewick, Phylogeny, Taxon};
    /// let phylo: Phylogeny<Taxon, Branch> = Phylogeny::from_newick("((A:1,B:2):3,C:4);")?;
    /// let distances: Vec<_> = phylo.leaf_distances()?.into_iter().map(|(_, _, d)| d).collect();
    /// assert_eq!(distances, [3.0, 8.0, 9.0]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn leaf_distances(&self) -> Result<Vec<(&N, &N, f64)>, Report> {
        let leaves: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|i| self.graph.neighbors_directed(*i, Direction::Outgoing).next().is_none())
            .collect();

        let mut distances = Vec::new();
        for (i, source) in leaves.iter().enumerate() {
            // walk the tree ignoring branch direction
            let mut lengths: HashMap<NodeIndex, f64> = HashMap::from([(*source, 0.0)]);
            let mut stack = vec![*source];
            while let Some(node_index) = stack.pop() {
                let depth = lengths[&node_index];
                for edge in self
                    .graph
                    .edges_directed(node_index, Direction::Outgoing)
                    .chain(self.graph.edges_directed(node_index, Direction::Incoming))
                {
                    let next = match edge.source() == node_index {
                        true => edge.target(),
                        false => edge.source(),
                    };
                    if !lengths.contains_key(&next) {
                        let length: f64 = edge.weight().as_();
                        lengths.insert(next, depth + length);
                        stack.push(next);
                    }
                }
            }
            for target in &leaves[i + 1..] {
                if let Some(length) = lengths.get(target) {
                    distances.push((self.get_node(source)?, self.get_node(target)?, *length));
                }
            }
        }
        Ok(distances)
    }
}

impl Phylogeny<Taxon, Branch> {
    /// Strips the labels of synthesized internal nodes, only leaf labels are kept for output.
    ///
    /// ```rust
    /// use lasso_phylo::{Branch, FromNewick, Phylogeny, Taxon, ToNewick};
    /// let mut phylo: Phylogeny<Taxon, Branch> = Phylogeny::from_newick("((A:1,B:1):1,C:2);")?;
    /// phylo.remove_internal_identifiers();
    /// assert_eq!(phylo.to_newick()?, "((A:1,B:1):1,C:2);");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn remove_internal_identifiers(&mut self) {
        self.graph.node_weights_mut().filter(|taxon| taxon.is_internal()).for_each(|taxon| {
            taxon.name.clear();
        });
    }
}

/// Returns a [`Phylogeny`] created from an iterable of (parent, child, branch) tuples.
impl<I, N, B> From<I> for Phylogeny<N, B>
where
    I: IntoIterator<Item = (N, N, B)>,
    N: Clone + Debug + Display + Eq + Hash + PartialEq,
    B: AsPrimitive<f64> + Debug + Display,
{
    /// Errors encountered will cause a [panic].
    ///
    /// ```rust
    /// use lasso_phylo::Phylogeny;
    /// let phylo = Phylogeny::from([("A", "B", 1.0), ("A", "C", 3.0)]);
    /// assert_eq!(phylo.get_nodes(), [&"A", &"B", &"C"]);
    /// ```
    fn from(it: I) -> Self {
        let mut phylogeny = Phylogeny::new();
        let msg = "Failed to convert branches into phylogeny";
        it.into_iter().for_each(|(p, c, b)| {
            phylogeny.add_branch(p, c, b).expect(msg);
        });
        phylogeny
    }
}

impl FromNewick for Phylogeny<Taxon, Branch> {
    /// Returns a [`Phylogeny`] created from a [Newick](https://en.wikipedia.org/wiki/Newick_format) string.
    ///
    /// Leaves are numbered `1, 2, ...` and internal nodes `-1, -2, ...` in order of appearance.
    fn from_newick(newick: &str) -> Result<Self, Report> {
        newick::parse(newick)
    }
}

impl<N, B> ToNewick for Phylogeny<N, B>
where
    N: Clone + Debug + Display + Eq + Hash + PartialEq,
    B: AsPrimitive<f64> + Debug + Display,
{
    /// Returns a [Newick](https://en.wikipedia.org/wiki/Newick_format) [`str`] of a single-rooted [`Phylogeny`].
    fn to_newick(&self) -> Result<String, Report> {
        let root = self.get_root()?;
        newick::write(self, root)
    }
}
