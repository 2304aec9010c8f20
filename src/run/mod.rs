//! Reconstruction pipelines, and the arguments that configure them.
//!
//! - [`reconstruct`]: chordal subgraph, triplet covers, shelling and quartets (unrooted).
//! - [`agglomerate_best`]: best of several randomized agglomeration runs (rooted).

#[cfg(test)]
mod tests;

use crate::agglomerate::{Agglomeration, Agglomerator, UpdaterStrategy};
use crate::clique::CliqueStrategy;
use crate::graph::{Pair, Traversal};
use crate::quartet::{self, Quartet};
use crate::shelling::{ShellingReport, ShellingStrategy, StepBudget};
use crate::{chordal, cover, DistanceGraph, LassoError};
#[cfg(feature = "cli")]
use clap::Parser;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

// ----------------------------------------------------------------------------
// LassoArgs
// ----------------------------------------------------------------------------

/// Algorithm options shared by every reconstruction.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
pub struct LassoArgs {
    /// Number of independent agglomeration runs, the run with the largest tree is kept.
    #[cfg_attr(feature = "cli", arg(short = 'r', long, default_value_t = LassoArgs::default().lasso_runs))]
    pub lasso_runs: usize,

    /// Number of random restarts of the heuristic clique finder.
    #[cfg_attr(feature = "cli", arg(long, default_value_t = LassoArgs::default().clique_attempts))]
    pub clique_attempts: usize,

    /// Clique finder used during agglomeration.
    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value_t = LassoArgs::default().clique_finder))]
    pub clique_finder: CliqueStrategy,

    /// Rule for the distances from a new cluster to the other vertices.
    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value_t = LassoArgs::default().distance_updater))]
    pub distance_updater: UpdaterStrategy,

    /// Traversal used to seed the chordal subgraph with a spanning tree.
    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value_t = LassoArgs::default().seed_tree))]
    pub seed_tree: Traversal,

    /// Weight quartets by the length of their internal edge.
    #[cfg_attr(feature = "cli", arg(short = 'w', long, default_value_t = LassoArgs::default().weighted))]
    pub weighted: bool,

    /// How missing distances are searched for.
    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value_t = LassoArgs::default().shelling))]
    pub shelling: ShellingStrategy,

    /// Seed of the random number generator, run `i` uses `seed + i`.
    #[cfg_attr(feature = "cli", arg(short = 's', long, default_value_t = LassoArgs::default().seed))]
    pub seed: u64,

    /// Stop shelling after this many rounds.
    #[cfg_attr(feature = "cli", arg(long))]
    pub max_rounds: Option<usize>,

    /// Number of CPU threads to use, 0 uses every available core.
    #[cfg_attr(feature = "cli", arg(short = 't', long, default_value_t = LassoArgs::default().threads))]
    #[serde(skip)]
    pub threads: usize,
}

impl Default for LassoArgs {
    fn default() -> Self {
        LassoArgs {
            lasso_runs: 10,
            clique_attempts: 100,
            clique_finder: CliqueStrategy::Exact,
            distance_updater: UpdaterStrategy::Modal,
            seed_tree: Traversal::Breadth,
            weighted: false,
            shelling: ShellingStrategy::Incremental,
            seed: 0,
            max_rounds: None,
            threads: 0,
        }
    }
}

impl LassoArgs {
    /// Returns the shelling budget of these arguments.
    pub fn budget(&self, cancel: Option<Arc<AtomicBool>>) -> StepBudget {
        StepBudget { max_rounds: self.max_rounds, cancel }
    }

    /// Reads [`LassoArgs`] from a JSON file.
    pub fn read<P>(path: &P) -> Result<LassoArgs, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let input = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read lasso arguments: {path:?}."))?;
        let args = serde_json::from_str(&input)
            .wrap_err_with(|| format!("Failed to deserialize lasso arguments: {input}"))?;
        Ok(args)
    }

    /// Writes [`LassoArgs`] to a JSON file.
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        let output = serde_json::to_string_pretty(self)
            .wrap_err(format!("Failed to serialize lasso arguments: {self:?}"))?;
        std::fs::write(path, output).wrap_err(format!("Failed to write lasso arguments: {path:?}"))?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Unrooted reconstruction
// ----------------------------------------------------------------------------

/// One triplet cover, completed by shelling.
#[derive(Clone, Debug)]
pub struct CompletedCover {
    /// The cover itself, a strong lasso of its taxa.
    pub lasso: DistanceGraph,
    /// The cover with every inferable distance filled in.
    pub metric: DistanceGraph,
    pub report: ShellingReport,
    pub quartets: Vec<Quartet>,
}

/// The result of [`reconstruct`].
#[derive(Clone, Debug)]
pub struct Reconstruction {
    pub chordal: DistanceGraph,
    pub covers: Vec<CompletedCover>,
}

impl Reconstruction {
    /// Returns the cover with the most taxa, the first one on ties.
    pub fn largest(&self) -> Option<&CompletedCover> {
        self.covers.iter().rev().max_by_key(|cover| cover.metric.len())
    }

    /// Returns the pairs of every cover, the distances the reconstruction relies on.
    pub fn lasso(&self) -> Vec<(Pair, f64)> {
        let mut lasso: Vec<(Pair, f64)> = self.covers.iter().flat_map(|c| c.lasso.edges()).collect();
        lasso.sort_by(|a, b| a.0.cmp(&b.0));
        lasso.dedup_by(|a, b| a.0 == b.0);
        lasso
    }
}

/// Builds the chordal subgraph of `graph`, splits it into triplet covers, and completes
/// every cover by shelling.
pub fn reconstruct(graph: &DistanceGraph, args: &LassoArgs) -> Result<Reconstruction, Report> {
    log::info!("Building the chordal subgraph from a {} spanning tree.", args.seed_tree);
    let chordal = chordal::build(graph, args.seed_tree)?;
    let lassos = cover::triplet_covers(&chordal);
    log::info!(
        "Chordal subgraph: {} of {} distances, {} triplet covers.",
        chordal.edge_count(),
        graph.edge_count(),
        lassos.len()
    );

    let budget = args.budget(None);
    let covers = lassos
        .into_iter()
        .enumerate()
        .map(|(i, lasso)| {
            let cover = complete(lasso, args, &budget)
                .wrap_err_with(|| format!("Failed to complete triplet cover {i}."))?;
            log::info!(
                "Cover {i}: {} taxa, {} distances inferred in {} rounds ({} ambiguous).",
                cover.metric.len(),
                cover.report.inferred,
                cover.report.rounds,
                cover.report.ambiguous
            );
            Ok(cover)
        })
        .collect::<Result<Vec<_>, Report>>()?;

    Ok(Reconstruction { chordal, covers })
}

/// Shells one triplet cover into a complete metric, and extracts its quartets.
///
/// A cover that is not a strong lasso of its taxa is an [`LassoError::IncompleteCover`] error.
pub fn complete(lasso: DistanceGraph, args: &LassoArgs, budget: &StepBudget) -> Result<CompletedCover, Report> {
    let mut metric = lasso.clone();
    let report = args.shelling.shell(&mut metric, budget)?;
    if !metric.is_complete() {
        let taxa = metric.len();
        let missing = taxa * taxa.saturating_sub(1) / 2 - metric.edge_count();
        Err(LassoError::IncompleteCover { missing, taxa })?
    }
    let quartets = quartet::extract(&metric, args.weighted);
    Ok(CompletedCover { lasso, metric, report, quartets })
}

// ----------------------------------------------------------------------------
// Rooted reconstruction
// ----------------------------------------------------------------------------

/// The winning run of [`agglomerate_best`].
#[derive(Clone, Debug)]
pub struct BestRun {
    /// Index of the run, its seed is `seed + run`.
    pub run: usize,
    pub agglomeration: Agglomeration,
    /// Number of runs that failed.
    pub failed: usize,
}

/// Runs `lasso_runs` independent agglomerations in parallel and keeps the run whose largest
/// tree has the most leaves.
pub fn agglomerate_best(graph: &DistanceGraph, args: &LassoArgs) -> Result<BestRun, Report> {
    let finder = args.clique_finder.finder(args.clique_attempts);
    let agglomerator = Agglomerator::new(finder, args.distance_updater.updater());
    let runs = args.lasso_runs.max(1);
    log::info!("Running {runs} agglomerations ({} clique finder).", args.clique_finder);

    let results: Vec<Result<Agglomeration, Report>> = (0..runs)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(args.seed.wrapping_add(i as u64));
            let copy = graph.clone();
            agglomerator.run(&copy, &mut rng).wrap_err_with(|| format!("Agglomeration run {i} failed."))
        })
        .collect();

    select_best(results)
}

/// Returns the successful run with the largest tree, the first run on ties, or the first
/// error if every run failed.
pub fn select_best(results: Vec<Result<Agglomeration, Report>>) -> Result<BestRun, Report> {
    let mut best: Option<(usize, Agglomeration, usize)> = None;
    let mut first_error = None;
    let mut failed = 0;

    for (run, result) in results.into_iter().enumerate() {
        match result {
            Ok(agglomeration) => {
                let leaves = agglomeration.largest()?.map(|t| t.leaves()).transpose()?.unwrap_or(0);
                if best.as_ref().map_or(true, |(_, _, n)| leaves > *n) {
                    best = Some((run, agglomeration, leaves));
                }
            }
            Err(e) => {
                log::warn!("{e}");
                failed += 1;
                first_error.get_or_insert(e);
            }
        }
    }

    match (best, first_error) {
        (Some((run, agglomeration, leaves)), _) => {
            log::info!("Run {run} built the largest tree, with {leaves} leaves ({failed} runs failed).");
            Ok(BestRun { run, agglomeration, failed })
        }
        (None, Some(e)) => Err(e),
        (None, None) => Err(eyre!("No agglomeration runs were requested.")),
    }
}
