//! [Command-line interface](Cli) (CLI) of the main binary.

pub mod run;

use crate::Verbosity;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// CLI Entry Point
// ----------------------------------------------------------------------------

/// The command-line interface (CLI).
///
/// Parsed from [`std::env::args`] in the main function, or from any list of strings:
///
/// ```rust
/// use clap::Parser;
/// use lasso::cli::{Cli, Command};
///
/// let input = ["lasso", "tree", "--input", "matrix.tsv", "--output-dir", "output", "--lasso-runs", "4"];
/// let args = Cli::parse_from(input);
/// match args.command {
///     Command::Tree(args) => assert_eq!(args.lasso.lasso_runs, 4),
///     Command::Quartets(_) => unreachable!(),
/// }
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Debug, Deserialize, Parser, Serialize)]
#[clap(name = "lasso", author, version)]
#[clap(about = "lasso reconstructs tree metrics from partial distance matrices, using strong lassos.")]
pub struct Cli {
    /// Pass CLI arguments to a particular [Command].
    #[clap(subcommand)]
    #[clap(help = "Set the command.")]
    pub command: Command,

    /// Set the output [Verbosity] level.
    #[clap(short = 'v', long)]
    #[clap(value_enum, default_value_t = Verbosity::default())]
    #[clap(hide_possible_values = false)]
    #[clap(global = true)]
    #[clap(help = "Set the output verbosity level.")]
    pub verbosity: Verbosity,
}

/// CLI [commands](#variants), one per reconstruction pipeline.
#[derive(Debug, Deserialize, Serialize, Subcommand)]
pub enum Command {
    /// Pass CLI arguments to the unrooted pipeline, [`run::quartets`].
    #[clap(about = "Complete the matrix through triplet covers, and extract its quartets.")]
    Quartets(run::Args),

    /// Pass CLI arguments to the agglomerative pipeline, [`run::tree`].
    #[clap(about = "Build rooted trees by agglomeration, keeping the best of several runs.")]
    Tree(run::Args),
}
