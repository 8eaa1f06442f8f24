use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ent_store::SortStrategy;

#[derive(Parser)]
#[command(name = "ent", about = "Ent: bucket-scoped blob storage", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML config file; flags override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// FileSystem root directory
    #[arg(long = "fs-root", global = true)]
    pub fs_root: Option<PathBuf>,

    /// Provider directory with bucket policies
    #[arg(long = "provider-dir", global = true)]
    pub provider_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// List registered buckets
    Buckets,
    /// List files in a bucket
    Ls(LsArgs),
    /// Store a file under a key
    Put(PutArgs),
    /// Write a file's content to stdout
    Cat(KeyArgs),
    /// Delete a file
    Rm(KeyArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// HTTP listen address
    #[arg(long = "http-addr")]
    pub http_addr: Option<SocketAddr>,
}

#[derive(Args)]
pub struct LsArgs {
    pub bucket: String,
    /// Only keys starting with this prefix
    #[arg(long, default_value = "")]
    pub prefix: String,
    /// Maximum number of files
    #[arg(long)]
    pub limit: Option<u64>,
    /// Order: +key, -key, +lastModified or -lastModified
    #[arg(long, allow_hyphen_values = true)]
    pub sort: Option<SortStrategy>,
}

#[derive(Args)]
pub struct PutArgs {
    pub bucket: String,
    pub key: String,
    /// Read content from this file
    #[arg(long, conflicts_with = "stdin")]
    pub file: Option<PathBuf>,
    /// Read content from standard input
    #[arg(long)]
    pub stdin: bool,
}

#[derive(Args)]
pub struct KeyArgs {
    pub bucket: String,
    pub key: String,
}
