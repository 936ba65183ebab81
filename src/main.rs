//! Replidex CLI: index replica directories and evaluate their completeness.

use anyhow::Result;
use clap::Parser;
use replidex::engine::arg_parser::Cli;
use replidex::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
