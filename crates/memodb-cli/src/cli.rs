use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use memodb_types::ObjectType;

#[derive(Parser)]
#[command(
    name = "memodb",
    about = "In-memory content-addressed object database",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with object database settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the object id of each file
    HashObject(HashObjectArgs),
    /// Load files and resolve an abbreviated object id among them
    Resolve(ResolveArgs),
    /// Load files and report what the object database holds
    Stats(StatsArgs),
}

#[derive(Args)]
pub struct HashObjectArgs {
    /// Object type to hash the files as
    #[arg(short = 't', long = "type", default_value = "blob")]
    pub kind: ObjectType,
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Hex prefix of the object id (up to 40 characters)
    pub prefix: String,
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    #[arg(short = 't', long = "type", default_value = "blob")]
    pub kind: ObjectType,
    /// Write the raw object content to stdout (not allowed with `--format json`)
    #[arg(short, long)]
    pub print: bool,
}

#[derive(Args)]
pub struct StatsArgs {
    #[arg(short = 't', long = "type", default_value = "blob")]
    pub kind: ObjectType,
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}
