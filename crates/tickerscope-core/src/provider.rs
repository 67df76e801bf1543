//! Market-data provider contract.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{Metadata, Period, RawTable, Symbol, UtcDateTime};

/// Fast current-price probe result for live mode.
#[derive(Debug, Clone, PartialEq)]
pub struct FastQuote {
    pub symbol: Symbol,
    pub last_price: f64,
    pub as_of: UtcDateTime,
}

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Unavailable,
    RateLimited,
    Decode,
    InvalidRequest,
}

/// Structured provider error surfaced at the retrieval boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
    retryable: bool,
}

impl ProviderError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Decode,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::Unavailable => "provider.unavailable",
            ProviderErrorKind::RateLimited => "provider.rate_limited",
            ProviderErrorKind::Decode => "provider.decode",
            ProviderErrorKind::InvalidRequest => "provider.invalid_request",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

/// Upstream market-data capability consumed by the snapshot fetcher.
///
/// | Method | Description |
/// |--------|-------------|
/// | [`history`](MarketDataProvider::history) | Raw bar table for a period |
/// | [`info`](MarketDataProvider::info) | Company/market metadata, best-effort |
/// | [`fast_quote`](MarketDataProvider::fast_quote) | Fine-grained current price |
///
/// Implementations must be `Send + Sync`; the fetcher shares them across
/// concurrent sessions.
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the raw historical bar table for a symbol and period.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport or payload-decode failure.
    /// An empty table is not an error here; emptiness is judged after
    /// normalization.
    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        period: Period,
    ) -> Pin<Box<dyn Future<Output = Result<RawTable, ProviderError>> + Send + 'a>>;

    /// Fetch company/market metadata. Callers treat failure as soft and
    /// degrade to an empty mapping.
    fn info<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Metadata, ProviderError>> + Send + 'a>>;

    /// Fetch the most recent fine-grained price.
    fn fast_quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<FastQuote, ProviderError>> + Send + 'a>>;
}
