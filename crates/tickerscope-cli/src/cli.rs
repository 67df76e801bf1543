use clap::{Args, Parser, Subcommand, ValueEnum};

/// Stock snapshot and analytics terminal.
#[derive(Debug, Parser)]
#[command(name = "tickerscope", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Live fast quote for a symbol.
    Quote(QuoteArgs),
    /// Historical snapshot with derived statistics and indicators.
    Snapshot(SnapshotArgs),
    /// Canonical OHLCV rows for a period.
    History(HistoryArgs),
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Ticker symbol (e.g. AAPL, TATAMOTORS.NS).
    pub symbol: String,

    /// Bust the realtime cache entry before fetching.
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Ticker symbol.
    pub symbol: String,

    /// Lookback period: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, max.
    #[arg(long, default_value = "1y")]
    pub period: String,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Ticker symbol.
    pub symbol: String,

    /// Lookback period.
    #[arg(long, default_value = "6mo")]
    pub period: String,

    /// Emit every row as CSV instead of the recent-rows table.
    #[arg(long)]
    pub csv: bool,

    /// Number of recent rows in table mode.
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}
