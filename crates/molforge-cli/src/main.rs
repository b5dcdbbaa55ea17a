mod cli;
mod commands;
mod config;
mod error;
mod io;
mod logging;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("MolForge CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    if let Some(num_threads) = cli.threads {
        info!(
            "Setting Rayon global thread pool to {} threads.",
            num_threads
        );
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| {
                CliError::Other(anyhow::anyhow!("Failed to build global thread pool: {}", e))
            })?;
    }

    let engine_config = config::build_engine_config(&cli.engine)?;

    let command_result = match cli.command {
        Commands::Validate(args) => {
            info!("Dispatching to 'validate' command.");
            commands::validate::run(args, &engine_config)
        }
        Commands::Complete(args) => {
            info!("Dispatching to 'complete' command.");
            commands::complete::run(args, &engine_config)
        }
        Commands::Pairs(args) => {
            info!("Dispatching to 'pairs' command.");
            commands::pairs::run(args, &engine_config)
        }
        Commands::Place(args) => {
            info!("Dispatching to 'place' command.");
            commands::place::run(args, &engine_config)
        }
        Commands::Formula(args) => {
            info!("Dispatching to 'formula' command.");
            commands::formula::run(args)
        }
    };

    match &command_result {
        Ok(()) => info!("Command completed successfully."),
        Err(e) => error!("Command failed: {}", e),
    }
    command_result
}
