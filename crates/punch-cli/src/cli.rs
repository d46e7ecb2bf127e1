//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Reconstructs work sessions from a repository's commit history.
///
/// Commits that land close together form blocks of continuous work; the
/// time of a block's first commit is estimated from its diff size, and
/// manual clock-in/clock-out markers from the configuration pin down
/// session boundaries the history alone cannot show.
#[derive(Debug, Parser)]
#[command(name = "punch", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a config file (in addition to punch.toml in the repo).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the git repository.
    #[arg(short = 'C', long = "repo", global = true, default_value = ".")]
    pub path: PathBuf,

    /// Only count records from this author (email).
    #[arg(short, long, global = true)]
    pub author: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the per-day chart with block timelines (the default).
    Chart {
        /// Day headers and totals only, 30 columns wide.
        #[arg(long)]
        condensed: bool,

        /// Emit the blocks and day totals as JSON instead.
        #[arg(long)]
        json: bool,
    },

    /// List the estimated durations of block-leading commits.
    Estimates,
}
