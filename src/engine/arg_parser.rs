use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Replica directory indexer with privacy-partitioned fingerprint storage.
#[derive(Clone, Parser)]
#[command(name = "replidex")]
#[command(about = "Index replica directories and report contents missing from each replica.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Scan all configured replicas and rebuild both index projections.
    Index(CommandArgs),
    /// Evaluate replica completeness from the public index.
    Evaluate(CommandArgs),
    /// Index, then evaluate, in one invocation.
    Run(CommandArgs),
}

#[derive(Clone, Args)]
pub struct CommandArgs {
    /// Path to the settings file (TOML).
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: PathBuf,

    /// Verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Commands {
    pub fn args(&self) -> &CommandArgs {
        match self {
            Commands::Index(args) | Commands::Evaluate(args) | Commands::Run(args) => args,
        }
    }
}
