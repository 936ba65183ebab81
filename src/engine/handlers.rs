//! Command handlers for the index and evaluate operations.

use anyhow::Result;

use crate::engine::arg_parser::{Cli, Commands};
use crate::evaluate::evaluate_replicas;
use crate::index::index_replicas;
use crate::utils::{load_settings, setup_logging};

/// Dispatch the parsed CLI: load settings, run the requested operation(s).
pub fn handle_run(cli: &Cli) -> Result<()> {
    let args = cli.command.args();
    setup_logging(args.verbose);
    let cfg = load_settings(&args.config)?;

    match &cli.command {
        Commands::Index(_) => {
            index_replicas(&cfg)?;
        }
        Commands::Evaluate(_) => {
            evaluate_replicas(&cfg)?;
        }
        Commands::Run(_) => {
            index_replicas(&cfg)?;
            evaluate_replicas(&cfg)?;
        }
    }
    Ok(())
}
