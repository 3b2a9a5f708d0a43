use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tradecycle", about = "Paper-trading decision cycles with signal accuracy tracking")]
pub struct Cli {
    /// Database path (overrides TC_DB)
    #[arg(long, global = true)]
    pub db: Option<String>,
    /// Debug logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one or more trading cycles
    Run {
        /// Instrument symbol (defaults to TC_INSTRUMENT)
        #[arg(long)]
        instrument: Option<String>,
        /// Number of consecutive cycles; the portfolio carries forward
        #[arg(long, default_value = "1")]
        cycles: usize,
        /// Start from a saved portfolio JSON instead of initial capital
        #[arg(long)]
        portfolio_in: Option<PathBuf>,
        /// Write the final portfolio JSON here
        #[arg(long)]
        portfolio_out: Option<PathBuf>,
        /// Read market/on-chain/sentiment/macro snapshots from this JSON file
        #[arg(long)]
        feed: Option<PathBuf>,
        /// Print the full cycle outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score pending signals against a current price
    Evaluate {
        instrument: String,
        price: f64,
    },
    /// Print the signal accuracy report
    Report {
        instrument: String,
    },
    /// List recent trades
    Trades {
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Only trades at or after this date (YYYY-MM-DD or RFC3339)
        #[arg(long)]
        since: Option<String>,
    },
    /// List recent reflections
    Reflections {
        /// 1 for per-cycle lessons, 2 for strategic reviews
        #[arg(long, default_value = "1")]
        level: u8,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Show database statistics
    Stats,
}
