//! Snapshot retrieval: provider calls, normalization, soft-failure policy,
//! and cache population.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::cache::{RetrievalCache, HISTORICAL_TTL, REALTIME_TTL};
use crate::normalize::{normalize, NormalizeError};
use crate::provider::{MarketDataProvider, ProviderError};
use crate::{Bar, Metadata, Period, PriceSeries, StockSnapshot, Symbol, ValidationError};

/// Retrieval failure taxonomy.
///
/// Hard failures (`is_soft() == false`) surface to the caller, which must
/// not proceed to analytics. Soft failures are converted at the retrieval
/// boundary into a well-formed empty snapshot so presentation layers can
/// render a "no data" state; [`SnapshotFetcher::fetch`] never returns them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("invalid symbol: {source}")]
    InvalidSymbol {
        #[source]
        source: ValidationError,
    },

    #[error(transparent)]
    MissingColumns {
        #[from]
        source: NormalizeError,
    },

    #[error("no data for symbol '{symbol}'")]
    NoData { symbol: Symbol },

    #[error("metadata unavailable for '{symbol}': {source}")]
    MetadataUnavailable {
        symbol: Symbol,
        #[source]
        source: ProviderError,
    },

    #[error("upstream failure: {source}")]
    Upstream {
        #[source]
        source: ProviderError,
    },
}

impl FetchError {
    /// Soft failures degrade to an empty snapshot instead of propagating.
    pub const fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::NoData { .. } | Self::MetadataUnavailable { .. } | Self::Upstream { .. }
        )
    }
}

/// Cache TTLs for the fetcher's retrieval cache.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub historical_ttl: Duration,
    pub realtime_ttl: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            historical_ttl: HISTORICAL_TTL,
            realtime_ttl: REALTIME_TTL,
        }
    }
}

/// Retrieval wrapper around a market-data provider.
///
/// One fetcher is shared process-wide; each `fetch` is an independent
/// round trip and the cache is the only shared mutable state.
#[derive(Clone)]
pub struct SnapshotFetcher {
    provider: Arc<dyn MarketDataProvider>,
    cache: RetrievalCache,
}

impl SnapshotFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self::with_config(provider, FetchConfig::default())
    }

    pub fn with_config(provider: Arc<dyn MarketDataProvider>, config: FetchConfig) -> Self {
        Self {
            provider,
            cache: RetrievalCache::new(config.historical_ttl, config.realtime_ttl),
        }
    }

    pub fn cache(&self) -> &RetrievalCache {
        &self.cache
    }

    /// Fetch a snapshot for a symbol and period.
    ///
    /// # Errors
    ///
    /// [`FetchError::InvalidSymbol`] before any provider call, and
    /// [`FetchError::MissingColumns`] when the provider payload lacks the
    /// OHLC schema. Everything else degrades to an empty snapshot.
    pub async fn fetch(&self, symbol: &str, period: Period) -> Result<StockSnapshot, FetchError> {
        let symbol =
            Symbol::parse(symbol).map_err(|source| FetchError::InvalidSymbol { source })?;

        if let Some(cached) = self.cache.get_snapshot(&symbol, period).await {
            return Ok(cached);
        }

        let snapshot = match self.fetch_uncached(&symbol, period).await {
            Ok(snapshot) => snapshot,
            Err(error) if error.is_soft() => StockSnapshot::unavailable(symbol),
            Err(error) => return Err(error),
        };

        // Empty snapshots are not pinned for the full TTL; the next request
        // gets another chance at the upstream. Live snapshots go through the
        // short-lived realtime price cache instead.
        if !period.is_live() && !snapshot.series().is_empty() {
            self.cache.put_snapshot(period, snapshot.clone()).await;
        }

        Ok(snapshot)
    }

    async fn fetch_uncached(
        &self,
        symbol: &Symbol,
        period: Period,
    ) -> Result<StockSnapshot, FetchError> {
        if period.is_live() {
            return self.fetch_live(symbol).await;
        }

        let raw = self
            .provider
            .history(symbol, period)
            .await
            .map_err(|source| FetchError::Upstream { source })?;

        let series = normalize(&raw)?;
        if series.is_empty() {
            return Err(FetchError::NoData {
                symbol: symbol.clone(),
            });
        }

        let metadata = self.fetch_metadata(symbol).await.unwrap_or_default();
        let current_price = self.resolve_current_price(symbol, &series).await;

        Ok(StockSnapshot::new(
            symbol.clone(),
            series,
            metadata,
            current_price,
        ))
    }

    /// Live mode: a fast quote wrapped in a single-row synthetic series.
    async fn fetch_live(&self, symbol: &Symbol) -> Result<StockSnapshot, FetchError> {
        let quote = self
            .provider
            .fast_quote(symbol)
            .await
            .map_err(|source| FetchError::Upstream { source })?;

        // A quote the provider could not price cleanly reads as "unknown".
        let price = if quote.last_price.is_finite() && quote.last_price >= 0.0 {
            quote.last_price
        } else {
            0.0
        };

        let series = match Bar::new(quote.as_of, price, price, price, price, None) {
            Ok(bar) => PriceSeries::new(vec![bar]),
            Err(_) => PriceSeries::empty(),
        };

        if price > 0.0 {
            self.cache.put_price(symbol, price).await;
        }

        Ok(StockSnapshot::new(
            symbol.clone(),
            series,
            Metadata::new(),
            price,
        ))
    }

    async fn fetch_metadata(&self, symbol: &Symbol) -> Result<Metadata, FetchError> {
        self.provider
            .info(symbol)
            .await
            .map_err(|source| FetchError::MetadataUnavailable {
                symbol: symbol.clone(),
                source,
            })
    }

    /// Resolution order: cached realtime price, fast intraday quote, last
    /// historical close, 0.0.
    async fn resolve_current_price(&self, symbol: &Symbol, series: &PriceSeries) -> f64 {
        if let Some(price) = self.cache.get_price(symbol).await {
            return price;
        }

        match self.provider.fast_quote(symbol).await {
            Ok(quote) if quote.last_price > 0.0 && quote.last_price.is_finite() => {
                self.cache.put_price(symbol, quote.last_price).await;
                quote.last_price
            }
            _ => series.last_close().unwrap_or(0.0),
        }
    }

    /// Manual refresh: bust the realtime cache entry for the symbol, then
    /// re-fetch the fast quote. `None` on any failure; never raises.
    pub async fn refresh(&self, symbol: &str) -> Option<f64> {
        let symbol = Symbol::parse(symbol).ok()?;
        self.cache.invalidate_price(&symbol).await;

        match self.provider.fast_quote(&symbol).await {
            Ok(quote) if quote.last_price > 0.0 && quote.last_price.is_finite() => {
                self.cache.put_price(&symbol, quote.last_price).await;
                Some(quote.last_price)
            }
            _ => None,
        }
    }

    /// Probe whether the provider has any data for the symbol: a short
    /// lookback that must normalize to a non-empty series.
    pub async fn validate_symbol(&self, symbol: &str) -> bool {
        let Ok(symbol) = Symbol::parse(symbol) else {
            return false;
        };

        match self.provider.history(&symbol, Period::FiveDays).await {
            Ok(raw) => normalize(&raw).map_or(false, |series| !series.is_empty()),
            Err(_) => false,
        }
    }
}
