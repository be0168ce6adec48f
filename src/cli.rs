//! CLI argument definitions using clap with subcommand architecture

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::coordinator::DEFAULT_POOL_SIZE;
use crate::words::WordFilter;

/// Repository structure extractor
#[derive(Parser, Debug)]
#[command(name = "repodistill")]
#[command(about = "Condenses repository trees into structured JSON summaries")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands for repodistill
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract the condensed tree for one or more repository roots
    #[command(visible_alias = "x")]
    Extract(ExtractArgs),

    /// Flatten a repository into its cleaned words
    #[command(visible_alias = "w")]
    Words(WordsArgs),

    /// List the identifiers declared or called in a repository
    #[command(visible_alias = "i")]
    Idents(IdentsArgs),
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Repository roots to extract
    #[arg(value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Base directory holding sharded repositories
    #[arg(long, value_name = "DIR", requires = "id")]
    pub repo_base: Option<PathBuf>,

    /// Repository identifier under the base directory (repeatable)
    #[arg(long, value_name = "ID", requires = "repo_base")]
    pub id: Vec<String>,

    /// Number of worker threads
    #[arg(short, long, default_value_t = DEFAULT_POOL_SIZE)]
    pub jobs: usize,

    #[command(flatten)]
    pub cache: CacheArgs,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for the words command
#[derive(Args, Debug)]
pub struct WordsArgs {
    /// Repository root to flatten
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Which textual sources to include
    #[arg(short, long, value_enum, default_value_t = WordSource::All)]
    pub filter: WordSource,

    #[command(flatten)]
    pub cache: CacheArgs,
}

/// Arguments for the idents command
#[derive(Args, Debug)]
pub struct IdentsArgs {
    /// Repository root to scan
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    #[command(flatten)]
    pub cache: CacheArgs,
}

/// Cache behavior shared by every subcommand
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// Recompute even when a cached tree exists
    #[arg(long)]
    pub recompute: bool,

    /// Skip the on-disk cache entirely
    #[arg(long, conflicts_with = "recompute")]
    pub no_cache: bool,

    /// Cache directory override
    #[arg(long, value_name = "DIR", env = "REPODISTILL_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Word sources selectable on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordSource {
    All,
    Text,
    Code,
}

impl From<WordSource> for WordFilter {
    fn from(source: WordSource) -> Self {
        match source {
            WordSource::All => WordFilter::All,
            WordSource::Text => WordFilter::Text,
            WordSource::Code => WordFilter::Code,
        }
    }
}
