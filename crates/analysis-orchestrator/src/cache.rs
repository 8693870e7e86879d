use analysis_core::{AnalysisError, FundamentalsSnapshot, MarketDataProvider, NewsProvider, Period, PriceSeries};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Time-boxed memoisation in front of a provider. Only successful fetches are cached.
pub struct CachedProvider<P> {
    inner: P,
    ttl_secs: i64,
    /// Cache bars per (symbol, period)
    bars_cache: DashMap<String, CacheEntry<PriceSeries>>,
    fundamentals_cache: DashMap<String, CacheEntry<FundamentalsSnapshot>>,
    headlines_cache: DashMap<String, CacheEntry<Vec<String>>>,
}

impl<P> CachedProvider<P> {
    pub fn new(inner: P, ttl_secs: i64) -> Self {
        Self {
            inner,
            ttl_secs,
            bars_cache: DashMap::new(),
            fundamentals_cache: DashMap::new(),
            headlines_cache: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.bars_cache.clear();
        self.fundamentals_cache.clear();
        self.headlines_cache.clear();
    }

    fn expired<T>(&self, entry: &CacheEntry<T>) -> bool {
        (Utc::now() - entry.cached_at).num_seconds() >= self.ttl_secs
    }

    /// Unexpired cached value for `key`; an expired entry is evicted on the way out
    fn fresh<T: Clone>(&self, cache: &DashMap<String, CacheEntry<T>>, key: &str) -> Option<T> {
        let hit = {
            let entry = cache.get(key)?;
            if self.expired(&entry) {
                None
            } else {
                tracing::debug!("Cache hit for {} (cached at {})", key, entry.cached_at);
                Some(entry.data.clone())
            }
        };
        // the read guard must be gone before touching the shard again
        if hit.is_none() {
            cache.remove_if(key, |_, entry| self.expired(entry));
        }
        hit
    }

    /// Insert, sweeping out whatever else in this map has expired
    fn store<T>(&self, cache: &DashMap<String, CacheEntry<T>>, key: String, data: T) {
        cache.retain(|_, entry| !self.expired(entry));
        cache.insert(key, CacheEntry {
            data,
            cached_at: Utc::now(),
        });
    }

    /// Number of entries currently held across all three maps
    pub fn len(&self) -> usize {
        self.bars_cache.len() + self.fundamentals_cache.len() + self.headlines_cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    async fn price_history(&self, symbol: &str, period: Period) -> Result<PriceSeries, AnalysisError> {
        let cache_key = format!("{}:{}", symbol.to_uppercase(), period);
        if let Some(series) = self.fresh(&self.bars_cache, &cache_key) {
            return Ok(series);
        }

        let series = self.inner.price_history(symbol, period).await?;
        self.store(&self.bars_cache, cache_key, series.clone());
        Ok(series)
    }

    async fn fundamentals(&self, symbol: &str) -> Result<FundamentalsSnapshot, AnalysisError> {
        let cache_key = symbol.to_uppercase();
        if let Some(snapshot) = self.fresh(&self.fundamentals_cache, &cache_key) {
            return Ok(snapshot);
        }

        let snapshot = self.inner.fundamentals(symbol).await?;
        self.store(&self.fundamentals_cache, cache_key, snapshot.clone());
        Ok(snapshot)
    }
}

#[async_trait]
impl<P: NewsProvider> NewsProvider for CachedProvider<P> {
    async fn headlines(&self, symbol: &str, limit: usize) -> Result<Vec<String>, AnalysisError> {
        let cache_key = format!("news:{}:{}", symbol.to_uppercase(), limit);
        if let Some(titles) = self.fresh(&self.headlines_cache, &cache_key) {
            return Ok(titles);
        }

        let titles = self.inner.headlines(symbol, limit).await?;
        self.store(&self.headlines_cache, cache_key, titles.clone());
        Ok(titles)
    }
}
