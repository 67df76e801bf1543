//! # Tickerscope Core
//!
//! Market-data retrieval and analytics core for the tickerscope toolkit.
//!
//! ## Overview
//!
//! Given a ticker symbol and a lookback period, this crate fetches a price
//! series and company metadata from a market-data provider, normalizes the
//! raw payload into a canonical OHLCV series, and derives descriptive
//! statistics and technical indicators on demand:
//!
//! - **Canonical domain models** for symbols, periods, bars, and snapshots
//! - **PriceSeries normalizer** turning raw provider tables into clean series
//! - **Analytics engine** of pure functions (returns, drawdown, Sharpe,
//!   moving averages, RSI, Bollinger Bands, volatility, support/resistance)
//! - **Snapshot fetcher** with typed soft/hard failure policy
//! - **Retrieval cache** with separate historical and realtime TTLs
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo Finance) |
//! | [`analytics`] | Pure derived-statistics functions |
//! | [`cache`] | TTL-keyed retrieval cache |
//! | [`domain`] | Domain models (Symbol, Period, Bar, StockSnapshot) |
//! | [`error`] | Core error types |
//! | [`fetch`] | Snapshot retrieval and failure policy |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalize`] | Raw table to canonical series |
//! | [`provider`] | Market-data provider contract |
//! | [`retry`] | Transport retry policy |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickerscope_core::{Period, SnapshotFetcher, YahooProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = SnapshotFetcher::new(Arc::new(YahooProvider::default()));
//!     let snapshot = fetcher.fetch("AAPL", Period::OneYear).await?;
//!
//!     if snapshot.is_valid() {
//!         let (change, pct) = snapshot.price_change();
//!         println!("AAPL {:+.2} ({:+.2}%)", change, pct);
//!     } else {
//!         println!("no data");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Policy
//!
//! Invalid symbols and unusable provider schemas are hard errors; an empty
//! upstream result, a metadata failure, or a transport failure degrades to
//! a well-formed empty snapshot (`is_valid() == false`) so presentation
//! layers can render a graceful "no data" state:
//!
//! ```rust
//! use tickerscope_core::FetchError;
//!
//! fn describe(error: &FetchError) -> &'static str {
//!     if error.is_soft() {
//!         "rendered as an empty snapshot, never surfaced"
//!     } else {
//!         "surfaced to the caller before any analytics run"
//!     }
//! }
//! ```

pub mod adapters;
pub mod analytics;
pub mod cache;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod http_client;
pub mod normalize;
pub mod provider;
pub mod retry;

// Re-export commonly used types at crate root for convenience

// Adapter implementations
pub use adapters::{YahooConfig, YahooProvider};

// Analytics engine
pub use analytics::{
    bollinger_bands, daily_returns, max_drawdown, moving_average, percent_change,
    performance_over_horizons, price_change, returns_analysis, rsi, sharpe_ratio,
    support_resistance, volatility, BollingerBand, HorizonPerformance, SupportResistance,
};

// Caching
pub use cache::RetrievalCache;

// Domain models
pub use domain::{
    Bar, Metadata, Period, PriceSeries, RawCells, RawColumn, RawTable, StockSnapshot, Symbol,
    UtcDateTime,
};

// Error types
pub use error::{CoreError, ValidationError};

// Snapshot retrieval
pub use fetch::{FetchConfig, FetchError, SnapshotFetcher};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

// Normalization
pub use normalize::{normalize, NormalizeError};

// Provider contract
pub use provider::{FastQuote, MarketDataProvider, ProviderError, ProviderErrorKind};

// Retry logic
pub use retry::{Backoff, RetryConfig};
