use crate::agglomerate::Vote;
use crate::graph::Pair;
use itertools::Itertools;
use lasso_phylo::TaxonId;
use std::collections::{BTreeMap, BTreeSet};

/// Which original distances justify each current distance, and which were used so far.
///
/// A pair of two original taxa supports itself, a distance to a synthesized cluster is
/// supported by the distances it was computed from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Provenance {
    supports: BTreeMap<Pair, BTreeSet<Pair>>,
    used: BTreeSet<Pair>,
}

/// The changes to [`Provenance`] caused by merging one clique.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeDelta {
    /// Original distances that justified this merge.
    pub used: BTreeSet<Pair>,
    /// Supports of the new distances, from the merged node to external vertices.
    pub supports: BTreeMap<Pair, BTreeSet<Pair>>,
    /// Members that no longer exist as vertices.
    pub retired: BTreeSet<TaxonId>,
}

impl Provenance {
    pub fn new() -> Self {
        Provenance::default()
    }

    /// Returns the original pairs supporting the distance between two vertices.
    pub fn support(&self, pair: Pair) -> BTreeSet<Pair> {
        match self.supports.get(&pair) {
            Some(support) => support.clone(),
            None if pair.is_original() => BTreeSet::from([pair]),
            None => BTreeSet::new(),
        }
    }

    /// Returns every original pair used so far.
    pub fn used(&self) -> &BTreeSet<Pair> {
        &self.used
    }

    pub fn into_used(self) -> BTreeSet<Pair> {
        self.used
    }

    /// Returns the changes of merging `members` into `node`, with the votes for its distances.
    ///
    /// ```rust
    /// use lasso::agglomerate::{Provenance, Vote};
    /// use lasso::graph::Pair;
    /// use lasso_phylo::TaxonId;
    /// use std::collections::BTreeSet;
    ///
    /// let (a, b, c) = (TaxonId(1), TaxonId(2), TaxonId(3));
    /// let provenance = Provenance::new();
    /// let votes = [(c, Vote { distance: 4.0, contributors: vec![a, b] })];
    /// let delta = provenance.merge_delta(&[a, b], TaxonId(-1), &votes);
    /// assert_eq!(delta.used.len(), 3);
    /// assert_eq!(delta.supports[&Pair(TaxonId(-1), c)], BTreeSet::from([Pair(a, c), Pair(b, c)]));
    /// ```
    pub fn merge_delta(&self, members: &[TaxonId], node: TaxonId, votes: &[(TaxonId, Vote)]) -> MergeDelta {
        let mut delta = MergeDelta { retired: members.iter().copied().collect(), ..Default::default() };

        for (a, b) in members.iter().tuple_combinations() {
            delta.used.extend(self.support(Pair::new(*a, *b)));
        }
        for (external, vote) in votes {
            let support: BTreeSet<Pair> = vote
                .contributors
                .iter()
                .flat_map(|member| self.support(Pair::new(*member, *external)))
                .collect();
            delta.used.extend(support.iter().copied());
            delta.supports.insert(Pair::new(node, *external), support);
        }
        delta
    }

    /// Applies a merge, forgetting the supports of retired vertices.
    pub fn apply(&mut self, delta: MergeDelta) {
        self.supports
            .retain(|pair, _| !delta.retired.contains(&pair.0) && !delta.retired.contains(&pair.1));
        self.supports.extend(delta.supports);
        self.used.extend(delta.used);
    }
}
