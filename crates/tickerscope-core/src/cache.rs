//! In-memory TTL caching for snapshot retrieval.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{Period, StockSnapshot, Symbol};

/// Historical snapshot entries live 5 minutes.
pub const HISTORICAL_TTL: Duration = Duration::from_secs(300);
/// Near-real-time price entries live 1 minute.
pub const REALTIME_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    expires_at: Instant,
}

impl<T: Clone> Entry<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn live_value(&self) -> Option<T> {
        if Instant::now() <= self.expires_at {
            Some(self.value.clone())
        } else {
            None
        }
    }
}

#[derive(Debug)]
struct CacheInner {
    snapshots: HashMap<(Symbol, Period), Entry<StockSnapshot>>,
    prices: HashMap<Symbol, Entry<f64>>,
    historical_ttl: Duration,
    realtime_ttl: Duration,
}

impl CacheInner {
    fn new(historical_ttl: Duration, realtime_ttl: Duration) -> Self {
        Self {
            snapshots: HashMap::new(),
            prices: HashMap::new(),
            historical_ttl,
            realtime_ttl,
        }
    }
}

/// Thread-safe, process-wide retrieval cache with two TTL classes:
/// full snapshots keyed by (symbol, period) and near-real-time prices
/// keyed by symbol alone.
///
/// Concurrent fetches for the same key may each populate it; last write
/// wins, which is acceptable since entries are interchangeable best-effort
/// reads of the same upstream state.
#[derive(Debug, Clone)]
pub struct RetrievalCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl Default for RetrievalCache {
    fn default() -> Self {
        Self::new(HISTORICAL_TTL, REALTIME_TTL)
    }
}

impl RetrievalCache {
    pub fn new(historical_ttl: Duration, realtime_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new(
                historical_ttl,
                realtime_ttl,
            ))),
        }
    }

    pub async fn get_snapshot(&self, symbol: &Symbol, period: Period) -> Option<StockSnapshot> {
        let store = self.inner.read().await;
        store
            .snapshots
            .get(&(symbol.clone(), period))
            .and_then(Entry::live_value)
    }

    pub async fn put_snapshot(&self, period: Period, snapshot: StockSnapshot) {
        let mut store = self.inner.write().await;
        let ttl = store.historical_ttl;
        store
            .snapshots
            .insert((snapshot.symbol().clone(), period), Entry::new(snapshot, ttl));
    }

    pub async fn get_price(&self, symbol: &Symbol) -> Option<f64> {
        let store = self.inner.read().await;
        store.prices.get(symbol).and_then(Entry::live_value)
    }

    pub async fn put_price(&self, symbol: &Symbol, price: f64) {
        let mut store = self.inner.write().await;
        let ttl = store.realtime_ttl;
        store.prices.insert(symbol.clone(), Entry::new(price, ttl));
    }

    /// Explicit cache-busting for a manual refresh: drops only the
    /// real-time price entry for the symbol. Snapshot entries keep their
    /// own TTL.
    pub async fn invalidate_price(&self, symbol: &Symbol) {
        let mut store = self.inner.write().await;
        store.prices.remove(symbol);
    }

    /// Remove expired entries from both classes.
    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        let now = Instant::now();
        store.snapshots.retain(|_, entry| entry.expires_at > now);
        store.prices.retain(|_, entry| entry.expires_at > now);
    }

    /// Clear all entries.
    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.snapshots.clear();
        store.prices.clear();
    }

    /// Entry counts (snapshots, prices), including expired entries.
    pub async fn len(&self) -> (usize, usize) {
        let store = self.inner.read().await;
        (store.snapshots.len(), store.prices.len())
    }

    pub async fn is_empty(&self) -> bool {
        let (snapshots, prices) = self.len().await;
        snapshots == 0 && prices == 0
    }
}
