//! Infer missing distances from diamonds, until no more can be inferred.
//!
//! A diamond is four taxa whose six pairwise distances are all known but one. Under the
//! four-point condition, the missing distance `d(u,w)` with cross chord `(x,y)` is
//!
//! ```text
//! d(u,w) = max( d(u,x) + d(w,y), d(u,y) + d(w,x) ) - d(x,y)
//! ```
//!
//! as long as the two parallel sums differ. Repeating this is called shelling.

#[cfg(test)]
mod tests;

use crate::graph::Pair;
use crate::utils::approx_eq;
use crate::{DistanceGraph, LassoError};
#[cfg(feature = "cli")]
use clap::ValueEnum;
use itertools::Itertools;
use lasso_phylo::TaxonId;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ----------------------------------------------------------------------------
// Inference

/// The outcome of inferring the missing chord of a diamond.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Inference {
    /// The missing distance is determined.
    Resolved(f64),
    /// The parallel sums are equal, or the result is not a positive distance.
    Ambiguous,
    /// More than one distance of the diamond is unknown.
    Incomplete,
}

/// Four taxa: the `missing` pair whose distance is unknown, and the cross `chord`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Diamond {
    pub missing: Pair,
    pub chord: Pair,
}

impl Diamond {
    pub fn new(missing: Pair, chord: Pair) -> Self {
        Diamond { missing, chord }
    }

    /// The five pairs whose distances must be known.
    pub fn known(&self) -> [Pair; 5] {
        let (Pair(u, w), Pair(x, y)) = (self.missing, self.chord);
        [self.chord, Pair::new(u, x), Pair::new(u, y), Pair::new(w, x), Pair::new(w, y)]
    }
}

/// Returns the missing distance of a diamond from its two parallel sums and the cross chord.
///
/// ```rust
/// use lasso::shelling::{resolve, Inference};
/// assert_eq!(resolve(17.0, 18.0, 9.0), Inference::Resolved(9.0));
/// assert_eq!(resolve(17.0, 17.0, 9.0), Inference::Ambiguous);
/// assert_eq!(resolve(2.0, 3.0, 3.0), Inference::Ambiguous);
/// ```
pub fn resolve(parallel_1: f64, parallel_2: f64, chord: f64) -> Inference {
    if approx_eq(parallel_1, parallel_2) {
        return Inference::Ambiguous;
    }
    let distance = parallel_1.max(parallel_2) - chord;
    match distance > 0.0 {
        true => Inference::Resolved(distance),
        false => Inference::Ambiguous,
    }
}

/// Infers the missing distance of a diamond in the graph.
///
/// ```rust
/// use lasso::graph::Pair;
/// use lasso::shelling::{infer_distance, Diamond, Inference};
/// use lasso::DistanceGraph;
/// use lasso_phylo::{Taxon, TaxonId};
///
/// let mut graph = DistanceGraph::from_taxa(["A", "B", "C", "D"].iter().enumerate().map(|(i, n)| Taxon::new(i as i32 + 1, *n)));
/// for (a, b, d) in [(1, 2, 3.0), (1, 3, 8.0), (2, 3, 9.0), (2, 4, 10.0), (3, 4, 9.0)] {
///     graph.set_distance(TaxonId(a), TaxonId(b), d)?;
/// }
/// let diamond = Diamond::new(Pair(TaxonId(1), TaxonId(4)), Pair(TaxonId(2), TaxonId(3)));
/// assert_eq!(infer_distance(&graph, &diamond), Inference::Resolved(9.0));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn infer_distance(graph: &DistanceGraph, diamond: &Diamond) -> Inference {
    if diamond.known().iter().any(|p| !graph.has_distance(p.0, p.1)) {
        return Inference::Incomplete;
    }
    let (Pair(u, w), Pair(x, y)) = (diamond.missing, diamond.chord);
    let d = |a, b| graph.distance(a, b);
    resolve(d(u, x) + d(w, y), d(u, y) + d(w, x), d(x, y))
}

// ----------------------------------------------------------------------------
// Budget and report

/// A cooperative limit on fixpoint loops, checked once per round.
#[derive(Clone, Debug, Default)]
pub struct StepBudget {
    /// Maximum number of rounds, unlimited if `None`.
    pub max_rounds: Option<usize>,
    /// Stop at the next round once this is set.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl StepBudget {
    pub fn unlimited() -> Self {
        StepBudget::default()
    }

    pub fn rounds(max_rounds: usize) -> Self {
        StepBudget { max_rounds: Some(max_rounds), cancel: None }
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Returns [`LassoError::Interrupted`] if another round may not start.
    pub fn check(&self, operation: &'static str, rounds: usize) -> Result<(), LassoError> {
        let cancelled = self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed));
        let exhausted = self.max_rounds.is_some_and(|max| rounds >= max);
        match cancelled || exhausted {
            true => Err(LassoError::Interrupted { operation, rounds }),
            false => Ok(()),
        }
    }
}

/// Counters of a shelling run.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ShellingReport {
    /// Rounds run, including the last one that inferred nothing.
    pub rounds: usize,
    /// Distances added to the graph.
    pub inferred: usize,
    /// Diamonds that could not be resolved.
    pub ambiguous: usize,
}

// ----------------------------------------------------------------------------
// Strategies

/// How diamonds are searched for.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[strum(serialize_all = "lowercase")]
pub enum ShellingStrategy {
    /// Scan every combination of four taxa each round.
    Naive,
    /// Only scan edges touching the taxa that changed in the previous round.
    #[default]
    Incremental,
}

impl ShellingStrategy {
    /// Infers distances in place, until a round infers nothing.
    pub fn shell(self, graph: &mut DistanceGraph, budget: &StepBudget) -> Result<ShellingReport, LassoError> {
        let report = match self {
            ShellingStrategy::Naive => naive(graph, budget)?,
            ShellingStrategy::Incremental => incremental(graph, budget)?,
        };
        log::debug!(
            "Shelling ({self}): {} inferred, {} ambiguous, {} rounds.",
            report.inferred,
            report.ambiguous,
            report.rounds
        );
        Ok(report)
    }
}

/// Scans all combinations of four taxa, and applies each inference immediately.
pub fn naive(graph: &mut DistanceGraph, budget: &StepBudget) -> Result<ShellingReport, LassoError> {
    let mut report = ShellingReport::default();
    let ids: Vec<TaxonId> = graph.ids().collect();

    loop {
        budget.check("naive shelling", report.rounds)?;
        report.rounds += 1;
        let mut added = 0;

        for quad in ids.iter().copied().combinations(4) {
            for (i, j) in (0..4).tuple_combinations() {
                let (u, w) = (quad[i], quad[j]);
                if graph.has_distance(u, w) {
                    continue;
                }
                let Some((x, y)) = quad.iter().copied().filter(|t| *t != u && *t != w).collect_tuple()
                else {
                    continue;
                };
                let diamond = Diamond::new(Pair::new(u, w), Pair::new(x, y));
                match infer_distance(graph, &diamond) {
                    Inference::Resolved(distance) => {
                        graph.set_distance(u, w, distance)?;
                        added += 1;
                    }
                    Inference::Ambiguous => {
                        log::debug!("Ambiguous diamond: {diamond:?}");
                        report.ambiguous += 1;
                    }
                    Inference::Incomplete => (),
                }
            }
        }

        report.inferred += added;
        if added == 0 {
            return Ok(report);
        }
    }
}

/// Only looks at diamonds around taxa whose distances changed in the previous round.
///
/// Each round collects, for every known edge touching the frontier, the pairs of common
/// neighbours of its ends whose distance is unknown. For each such missing pair, the first
/// diamond that resolves (in sorted order) sets the distance.
pub fn incremental(graph: &mut DistanceGraph, budget: &StepBudget) -> Result<ShellingReport, LassoError> {
    let mut report = ShellingReport::default();
    let mut frontier: BTreeSet<TaxonId> = graph.ids().collect();
    let mut cache: BTreeMap<TaxonId, BTreeSet<TaxonId>> =
        graph.ids().map(|v| (v, graph.neighbours(v))).collect();

    loop {
        budget.check("incremental shelling", report.rounds)?;
        report.rounds += 1;

        let edges: Vec<Pair> = graph
            .edges()
            .into_iter()
            .map(|(pair, _)| pair)
            .filter(|pair| frontier.contains(&pair.0) || frontier.contains(&pair.1))
            .collect();

        let found: Vec<Diamond> = edges
            .par_iter()
            .flat_map_iter(|chord| {
                let (Some(x), Some(y)) = (cache.get(&chord.0), cache.get(&chord.1)) else {
                    return Vec::new();
                };
                x.intersection(y)
                    .tuple_combinations()
                    .filter(|(u, w)| !cache.get(*u).is_some_and(|n| n.contains(*w)))
                    .map(|(u, w)| Diamond::new(Pair::new(*u, *w), *chord))
                    .collect::<Vec<_>>()
            })
            .collect();

        let mut candidates: BTreeMap<Pair, Vec<Diamond>> = BTreeMap::new();
        found.into_iter().for_each(|d| candidates.entry(d.missing).or_default().push(d));

        let mut next = BTreeSet::new();
        for (missing, diamonds) in candidates {
            for diamond in diamonds {
                match infer_distance(graph, &diamond) {
                    Inference::Resolved(distance) => {
                        graph.set_distance(missing.0, missing.1, distance)?;
                        cache.entry(missing.0).or_default().insert(missing.1);
                        cache.entry(missing.1).or_default().insert(missing.0);
                        next.extend([missing.0, missing.1]);
                        report.inferred += 1;
                        break;
                    }
                    Inference::Ambiguous => {
                        log::debug!("Ambiguous diamond: {diamond:?}");
                        report.ambiguous += 1;
                    }
                    Inference::Incomplete => (),
                }
            }
        }

        if next.is_empty() {
            return Ok(report);
        }
        frontier = next;
    }
}
