mod history;
mod quote;
mod snapshot;

use std::sync::Arc;

use tickerscope_core::{SnapshotFetcher, YahooProvider};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let fetcher = SnapshotFetcher::new(Arc::new(YahooProvider::default()));

    match &cli.command {
        Command::Quote(args) => quote::run(args, &fetcher, cli.format).await,
        Command::Snapshot(args) => snapshot::run(args, &fetcher, cli.format).await,
        Command::History(args) => history::run(args, &fetcher, cli.format).await,
    }
}
