//! CLI argument definitions for fibswing.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `snapshot` | Swing snapshot for one symbol |
//! | `batch` | Snapshots for many symbols in parallel |
//! | `levels` | Fibonacci ladder for an explicit low/high |
//! | `pivots` | Confirmed zigzag pivots in the lookback window |
//! | `config` | Print the effective configuration |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--config` | none | YAML config file |
//! | `--threshold` | `0.06` | Zigzag reversal threshold |
//! | `--lookback` | `126` | Lookback window in trading days |
//!
//! # Examples
//!
//! ```bash
//! fibswing snapshot SPY --data-dir ./prices --pretty
//! fibswing batch --data-dir ./prices --as-of 2024-06-28 SPY QQQ ^GSPC
//! fibswing levels --low 100 --high 200 --direction up --price 138.5
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fibswing_core::Direction;

/// Swing detection and Fibonacci level engine.
#[derive(Debug, Parser)]
#[command(
    name = "fibswing",
    author,
    version,
    about = "Swing detection and Fibonacci level snapshots over daily closes",
    long_about = "fibswing finds the most recent swing in a symbol's daily closing prices, \
derives Fibonacci retracement and extension levels from it, and flags whether the current \
price sits at a key level.\n\
\n\
Price history is read from <DATA_DIR>/<SYMBOL>.csv files with 'date' and 'close' columns.\n\
\n\
Use 'fibswing <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    ///
    /// - json: Single JSON object (default)
    /// - ndjson: Stream events, one JSON object per line
    /// - table: Human-readable, prices rounded to 4 decimals
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// YAML config file with engine parameters and tolerances.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Zigzag reversal threshold as a fraction (overrides the config file).
    #[arg(long, global = true)]
    pub threshold: Option<f64>,

    /// Lookback window in trading days (overrides the config file).
    #[arg(long, global = true)]
    pub lookback: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Ndjson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    Up,
    Down,
}

impl From<DirectionArg> for Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Up => Direction::Up,
            DirectionArg::Down => Direction::Down,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the swing snapshot for one symbol.
    ///
    /// # Examples
    ///
    ///   fibswing snapshot SPY --data-dir ./prices
    ///   fibswing snapshot ^GSPC --data-dir ./prices --as-of 2024-06-28
    Snapshot(SnapshotArgs),

    /// Build snapshots for many symbols in parallel.
    ///
    /// With no symbols, every *.csv file in the data directory is used.
    /// A failing symbol is reported in `errors` and never aborts the run.
    Batch(BatchArgs),

    /// Compute the Fibonacci ladder for an explicit swing.
    ///
    /// # Examples
    ///
    ///   fibswing levels --low 100 --high 200 --direction up
    ///   fibswing levels --low 4800 --high 5300 --direction up --price 5110 --symbol ^GSPC
    Levels(LevelsArgs),

    /// List confirmed zigzag pivots in the lookback window.
    Pivots(PivotsArgs),

    /// Print the effective configuration.
    Config,
}

#[derive(Debug, Clone, Args)]
pub struct SnapshotArgs {
    /// Ticker symbol.
    pub symbol: String,

    /// Directory holding <SYMBOL>.csv price files.
    #[arg(long, value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Snapshot date (YYYY-MM-DD). Defaults to the last date in the data.
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    /// Ticker symbols. Defaults to every *.csv file in the data directory.
    pub symbols: Vec<String>,

    /// Directory holding <SYMBOL>.csv price files.
    #[arg(long, value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Run date (YYYY-MM-DD). Defaults to the latest date across all files.
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct LevelsArgs {
    /// Swing low price.
    #[arg(long)]
    pub low: f64,

    /// Swing high price.
    #[arg(long)]
    pub high: f64,

    /// Swing direction: up when the low came first.
    #[arg(long, value_enum)]
    pub direction: DirectionArg,

    /// Current price; adds proximity flags and the nearest level.
    #[arg(long)]
    pub price: Option<f64>,

    /// Symbol whose tolerance profile to apply.
    #[arg(long)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct PivotsArgs {
    /// Ticker symbol.
    pub symbol: String,

    /// Directory holding <SYMBOL>.csv price files.
    #[arg(long, value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Evaluation date (YYYY-MM-DD). Defaults to the last date in the data.
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<String>,
}
