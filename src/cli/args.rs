use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the liskov binary.
#[derive(Parser, Debug)]
#[command(
    name = "liskov",
    version,
    about = "Check generic substitutability between declared types"
)]
pub struct CliArgs {
    /// Maximum nesting of recursive substitution checks.
    #[arg(long = "max-depth", global = true)]
    pub max_depth: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer a single query: can SOURCE stand wherever TARGET is expected?
    Check(CheckArgs),
    /// Evaluate every query listed in a universe file.
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Universe file declaring the types.
    #[arg(short = 'u', long)]
    pub universe: PathBuf,

    /// Source type expression, e.g. 'List<Dog>'.
    pub source: String,

    /// Target type expression, e.g. 'ICollection<Animal>' or 'ICollection<>'.
    pub target: String,

    /// Print the outcome as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Universe file declaring the types and queries.
    #[arg(short = 'u', long)]
    pub universe: PathBuf,

    /// Print the outcomes as JSON.
    #[arg(long)]
    pub json: bool,
}
