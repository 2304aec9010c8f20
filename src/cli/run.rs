use crate::export::{self, Summary};
use crate::run::{agglomerate_best, reconstruct};
use crate::{dataset, LassoArgs};
use clap::Parser;
use color_eyre::eyre::{Report, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI arguments shared by both reconstruction pipelines.
#[derive(Clone, Debug, Deserialize, Parser, Serialize)]
pub struct Args {
    /// Distance matrix (.tsv or .csv), with a `taxon` header column.
    #[clap(short = 'i', long, required = true)]
    pub input: PathBuf,

    /// Delimiter of the matrix, overriding the file extension.
    #[clap(short = 'd', long)]
    pub delim: Option<char>,

    /// Output directory, created if it does not exist.
    #[clap(short = 'o', long, required = true)]
    pub output_dir: PathBuf,

    /// Read the algorithm options from a JSON file, such as the `args` of a previous summary.
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Algorithm options.
    #[clap(flatten)]
    pub lasso: LassoArgs,
}

impl Args {
    /// Returns the algorithm options, from `config` if provided.
    ///
    /// The thread count always comes from the command line.
    pub fn lasso_args(&self) -> Result<LassoArgs, Report> {
        match &self.config {
            Some(config) => {
                log::info!("Reading algorithm options from: {config:?}");
                Ok(LassoArgs { threads: self.lasso.threads, ..LassoArgs::read(config)? })
            }
            None => Ok(self.lasso.clone()),
        }
    }
}

/// Completes the input matrix through triplet covers, and writes its quartets.
pub fn quartets(args: &Args) -> Result<Summary, Report> {
    let lasso = args.lasso_args()?;
    let graph = dataset::read_matrix(&args.input, args.delim)?;
    let reconstruction =
        reconstruct(&graph, &lasso).wrap_err_with(|| format!("Failed to reconstruct: {:?}", args.input))?;
    export::write_reconstruction(&graph, &reconstruction, &lasso, &args.output_dir)
}

/// Builds trees from the input matrix by agglomeration, and writes the best run.
pub fn tree(args: &Args) -> Result<Summary, Report> {
    let lasso = args.lasso_args()?;
    let graph = dataset::read_matrix(&args.input, args.delim)?;
    let best =
        agglomerate_best(&graph, &lasso).wrap_err_with(|| format!("Failed to agglomerate: {:?}", args.input))?;
    export::write_agglomeration(&graph, &best, &lasso, &args.output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chordal::tests::seven_taxa;
    use crate::LassoError;

    fn args(dir: &std::path::Path) -> Result<Args, Report> {
        let input = dir.join("matrix.tsv");
        export::matrix_table(&seven_taxa()?)?.write(&input, None)?;
        let output_dir = dir.join("output");
        Ok(Args { input, delim: None, output_dir, config: None, lasso: LassoArgs::default() })
    }

    #[test]
    fn quartets_from_file() -> Result<(), Report> {
        let dir = tempfile::tempdir()?;
        let summary = quartets(&args(dir.path())?)?;
        assert_eq!(summary.covers.len(), 1);
        assert_eq!(summary.covers[0].taxa, 7);
        assert!(dir.path().join("output").join("quartets_0.tsv").exists());
        Ok(())
    }

    #[test]
    fn tree_from_file() -> Result<(), Report> {
        let dir = tempfile::tempdir()?;
        let summary = tree(&args(dir.path())?)?;
        assert!(summary.agglomeration.is_some());
        assert!(dir.path().join("output").join("trees.nwk").exists());
        Ok(())
    }

    #[test]
    fn config_overrides_flags() -> Result<(), Report> {
        let dir = tempfile::tempdir()?;
        let config = dir.path().join("config.json");
        LassoArgs { max_rounds: Some(1), ..Default::default() }.write(&config)?;

        let mut args = args(dir.path())?;
        args.lasso.threads = 3;
        args.config = Some(config);
        let lasso = args.lasso_args()?;
        assert_eq!(lasso.max_rounds, Some(1));
        assert_eq!(lasso.threads, 3);

        let error = quartets(&args).unwrap_err();
        assert!(matches!(error.downcast_ref::<LassoError>(), Some(LassoError::Interrupted { .. })));
        Ok(())
    }
}
