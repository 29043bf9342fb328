use clap::{Parser, Subcommand};

pub mod formatters;

#[derive(Parser)]
#[command(name = "shareledger")]
#[command(
    version,
    about = "Share dealing account analyzer for broker CSV exports"
)]
#[command(
    long_about = "Normalize a broker's CSV transaction export into a canonical ledger and compute holdings, realized/unrealized gains and dividend income."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Path to an optional TOML config file
    #[arg(long = "config", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Full report: summary, holdings and dividends in one pass
    Report {
        /// Path to the broker CSV export
        file: String,

        /// Value holdings at average cost instead of fetching prices
        #[arg(long)]
        offline: bool,
    },

    /// Current holdings with P&L
    Holdings {
        /// Path to the broker CSV export
        file: String,

        /// Value holdings at average cost instead of fetching prices
        #[arg(long)]
        offline: bool,
    },

    /// Portfolio summary figures
    Summary {
        /// Path to the broker CSV export
        file: String,

        /// Value holdings at average cost instead of fetching prices
        #[arg(long)]
        offline: bool,
    },

    /// Dividend income and history
    Dividends {
        /// Path to the broker CSV export
        file: String,
    },

    /// Invested capital over time
    Performance {
        /// Path to the broker CSV export
        file: String,
    },

    /// Portfolio allocation by sector (requires price lookups)
    Sectors {
        /// Path to the broker CSV export
        file: String,
    },

    /// Preview the normalized ledger and its summary statistics
    Inspect {
        /// Path to the broker CSV export
        file: String,

        /// Show every transaction, not just the first rows
        #[arg(short, long)]
        full: bool,
    },
}
