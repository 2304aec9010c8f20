use clap::Parser;
use color_eyre::eyre::{Report, Result, WrapErr};
use lasso::cli::{self, Cli};

fn main() -> Result<(), Report> {
    // ------------------------------------------------------------------------
    // CLI Setup

    // Parse CLI parameters
    let args = Cli::parse();

    // initialize color_eyre crate for colorized logs
    color_eyre::install()?;

    // Set logging/verbosity level via RUST_LOG
    std::env::set_var("RUST_LOG", args.verbosity.to_string());

    // initialize env_logger crate for logging/verbosity level
    env_logger::init();

    // check which CLI command we're running (quartets, tree)
    let (cli::Command::Quartets(run_args) | cli::Command::Tree(run_args)) = &args.command;

    // cap the worker threads of rayon, 0 lets rayon decide
    rayon::ThreadPoolBuilder::new()
        .num_threads(run_args.lasso.threads)
        .build_global()
        .wrap_err("Failed to build the rayon thread pool.")?;

    match args.command {
        cli::Command::Quartets(args) => _ = cli::run::quartets(&args)?,
        cli::Command::Tree(args) => _ = cli::run::tree(&args)?,
    }

    Ok(())
}
