use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "harvester")]
#[command(about = "Incremental press article harvester with resumable per-outlet cursors")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the newest article id of an outlet from its ranking page
    Locate {
        /// Outlet code (e.g. 1 for 001)
        #[arg(short, long)]
        outlet: u16,
    },

    /// Fetch and print a single article as JSON
    Article {
        /// Outlet code
        #[arg(short, long)]
        outlet: u16,

        /// Article id
        #[arg(short, long)]
        id: u64,
    },

    /// Crawl an outlet from its cursor up to the cutoff and store the results
    Crawl {
        /// Outlet code
        #[arg(short, long)]
        outlet: u16,

        /// Start from this article id instead of the stored cursor
        #[arg(short, long)]
        start: Option<u64>,

        /// Stop after the first article published later than this (yyyy-MM-dd HH:mm:ss, default now)
        #[arg(short, long)]
        cutoff: Option<String>,

        /// Print what would be stored without writing articles or the cursor
        #[arg(long)]
        dry_run: bool,
    },

    /// List stored outlet cursors
    Cursors,

    /// List the most recently stored articles of an outlet
    Recent {
        /// Outlet code
        #[arg(short, long)]
        outlet: u16,

        /// Maximum number of articles
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// Print a stored article as JSON
    Show {
        /// Stored article row id
        id: i64,
    },
}
