use crate::DistanceGraph;
#[cfg(feature = "cli")]
use clap::ValueEnum;
use lasso_phylo::TaxonId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The distance chosen between a new cluster and an external vertex, and the cluster members
/// whose own distance to the external vertex produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Vote {
    pub distance: f64,
    pub contributors: Vec<TaxonId>,
}

/// Computes the distance from a freshly merged cluster to a vertex outside of it.
pub trait DistanceUpdater {
    /// Returns `None` when no member distance can be used.
    fn update<R: Rng + ?Sized>(
        &self,
        graph: &DistanceGraph,
        members: &[TaxonId],
        external: TaxonId,
        min: f64,
        rng: &mut R,
    ) -> Option<Vote>;
}

/// Which [`DistanceUpdater`] to use.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[strum(serialize_all = "lowercase")]
pub enum UpdaterStrategy {
    #[default]
    Modal,
}

impl UpdaterStrategy {
    pub fn updater(self) -> ModalUpdater {
        match self {
            UpdaterStrategy::Modal => ModalUpdater,
        }
    }
}

/// Takes the most frequent member distance to the external vertex.
///
/// Distances equal to the current minimum edge weight are not counted, and ties between
/// equally frequent distances are broken at random.
///
/// ```rust
/// use lasso::agglomerate::{DistanceUpdater, ModalUpdater};
/// use lasso::DistanceGraph;
/// use lasso_phylo::{Taxon, TaxonId};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut graph = DistanceGraph::from_taxa((1..=4).map(|i| Taxon::new(i, format!("T{i}"))));
/// for (a, b, d) in [(1, 4, 6.0), (2, 4, 6.0), (3, 4, 5.0)] {
///     graph.set_distance(TaxonId(a), TaxonId(b), d)?;
/// }
/// let members = [TaxonId(1), TaxonId(2), TaxonId(3)];
/// let vote = ModalUpdater.update(&graph, &members, TaxonId(4), 2.0, &mut StdRng::seed_from_u64(0)).unwrap();
/// assert_eq!(vote.distance, 6.0);
/// assert_eq!(vote.contributors, [TaxonId(1), TaxonId(2)]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModalUpdater;

impl DistanceUpdater for ModalUpdater {
    fn update<R: Rng + ?Sized>(
        &self,
        graph: &DistanceGraph,
        members: &[TaxonId],
        external: TaxonId,
        min: f64,
        rng: &mut R,
    ) -> Option<Vote> {
        // distances are grouped by their exact bits
        let mut counts: BTreeMap<u64, Vec<TaxonId>> = BTreeMap::new();
        for member in members {
            let distance = graph.distance(*member, external);
            if distance > 0.0 && distance != min {
                counts.entry(distance.to_bits()).or_default().push(*member);
            }
        }

        let max = counts.values().map(Vec::len).max()?;
        let mut tied: Vec<(u64, Vec<TaxonId>)> = counts.into_iter().filter(|(_, c)| c.len() == max).collect();
        let i = match tied.len() {
            1 => 0,
            n => rng.gen_range(0..n),
        };
        let (bits, contributors) = tied.swap_remove(i);
        Some(Vote { distance: f64::from_bits(bits), contributors })
    }
}
