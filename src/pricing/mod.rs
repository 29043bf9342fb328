// Pricing module - pluggable market data sources with caching and retry

pub mod tickers;
pub mod yahoo;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::config::PricingConfig;
use tickers::TickerMap;

/// Swappable fetch backend behind [`CachedPriceSource`].
///
/// Implementations are fallible per symbol; the cached wrapper is what
/// turns failures into the zero-price / "Unknown"-sector contract.
#[allow(async_fn_in_trait)]
pub trait PriceSource {
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal>;
    async fn fetch_sector(&self, symbol: &str) -> Result<String>;
}

/// Live source backed by the Yahoo Finance chart API
#[derive(Debug, Clone, Default)]
pub struct YahooSource {
    tickers: TickerMap,
}

impl YahooSource {
    pub fn new(tickers: TickerMap) -> Self {
        Self { tickers }
    }
}

impl PriceSource for YahooSource {
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal> {
        let ticker = self.tickers.resolve(symbol);
        let data = yahoo::fetch_current_price(&ticker).await?;
        Ok(data.price)
    }

    async fn fetch_sector(&self, symbol: &str) -> Result<String> {
        let ticker = self.tickers.resolve(symbol);
        yahoo::fetch_sector(&ticker).await
    }
}

/// In-memory source for tests and offline runs
#[derive(Debug, Clone, Default)]
pub struct FixedPriceSource {
    prices: HashMap<String, Decimal>,
    sectors: HashMap<String, String>,
}

impl FixedPriceSource {
    pub fn new(prices: HashMap<String, Decimal>, sectors: HashMap<String, String>) -> Self {
        Self { prices, sectors }
    }
}

impl PriceSource for FixedPriceSource {
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| anyhow!("no price data for {}", symbol))
    }

    async fn fetch_sector(&self, symbol: &str) -> Result<String> {
        self.sectors
            .get(symbol)
            .cloned()
            .ok_or_else(|| anyhow!("no sector data for {}", symbol))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    price: Decimal,
    timestamp: DateTime<Utc>,
}

/// Price/sector source with a TTL cache and bounded retry.
///
/// This is the collaborator handed to the reporting layer: prices for
/// unavailable symbols come back as zero and sectors default to
/// "Unknown", never an error. Constructed by the caller and passed
/// explicitly; there is no process-global instance.
pub struct CachedPriceSource<S> {
    inner: S,
    price_cache: Arc<Mutex<HashMap<String, CacheEntry>>>,
    sector_cache: Arc<Mutex<HashMap<String, String>>>,
    cache_ttl: Duration,
    retries: u32,
    retry_delay: std::time::Duration,
}

impl<S: PriceSource> CachedPriceSource<S> {
    pub fn new(inner: S, config: &PricingConfig) -> Self {
        Self {
            inner,
            price_cache: Arc::new(Mutex::new(HashMap::new())),
            sector_cache: Arc::new(Mutex::new(HashMap::new())),
            cache_ttl: Duration::minutes(config.cache_ttl_minutes),
            retries: config.retries,
            retry_delay: std::time::Duration::from_secs(config.retry_delay_secs),
        }
    }

    /// Current prices for the given symbols.
    ///
    /// Symbols whose lookup fails after the configured retries map to
    /// zero; the reporting layer records them as skipped.
    pub async fn get_current_prices(&self, symbols: &[String]) -> HashMap<String, Decimal> {
        let mut prices = HashMap::new();
        let mut stale = Vec::new();

        {
            let cache = self.price_cache.lock().unwrap();
            for symbol in symbols {
                match cache.get(symbol) {
                    Some(entry)
                        if Utc::now().signed_duration_since(entry.timestamp) < self.cache_ttl =>
                    {
                        prices.insert(symbol.clone(), entry.price);
                    }
                    _ => stale.push(symbol.clone()),
                }
            }
        }

        if !prices.is_empty() {
            debug!("Using cached prices for {} symbols", prices.len());
        }

        for symbol in stale {
            let price = match self.fetch_price_with_retry(&symbol).await {
                Ok(price) => {
                    self.price_cache.lock().unwrap().insert(
                        symbol.clone(),
                        CacheEntry {
                            price,
                            timestamp: Utc::now(),
                        },
                    );
                    price
                }
                Err(e) => {
                    warn!("No price data found for {}: {}", symbol, e);
                    Decimal::ZERO
                }
            };
            prices.insert(symbol, price);
        }

        prices
    }

    /// Sector for one symbol, defaulting to "Unknown" on failure
    pub async fn get_stock_sector(&self, symbol: &str) -> String {
        if let Some(sector) = self.sector_cache.lock().unwrap().get(symbol) {
            return sector.clone();
        }

        let sector = match self.fetch_sector_with_retry(symbol).await {
            Ok(sector) => sector,
            Err(e) => {
                debug!("No sector data for {}: {}", symbol, e);
                "Unknown".to_string()
            }
        };

        self.sector_cache
            .lock()
            .unwrap()
            .insert(symbol.to_string(), sector.clone());
        sector
    }

    // Bounded retry with a fixed delay between attempts; no backoff.
    async fn fetch_price_with_retry(&self, symbol: &str) -> Result<Decimal> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch_price(symbol).await {
                Ok(price) => return Ok(price),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.retries {
                        return Err(e);
                    }
                    debug!("Price fetch attempt {} for {} failed: {}", attempt, symbol, e);
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    async fn fetch_sector_with_retry(&self, symbol: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch_sector(symbol).await {
                Ok(sector) => return Ok(sector),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.retries {
                        return Err(e);
                    }
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    /// Drop all cached prices and sectors
    pub fn clear_cache(&self) {
        self.price_cache.lock().unwrap().clear();
        self.sector_cache.lock().unwrap().clear();
        info!("Price cache cleared");
    }

    pub fn cache_size(&self) -> usize {
        self.price_cache.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Counts fetches so tests can observe cache hits
    struct CountingSource {
        calls: Arc<Mutex<usize>>,
        fail: bool,
    }

    impl PriceSource for CountingSource {
        async fn fetch_price(&self, _symbol: &str) -> Result<Decimal> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                Err(anyhow!("backend down"))
            } else {
                Ok(dec!(5.27))
            }
        }

        async fn fetch_sector(&self, _symbol: &str) -> Result<String> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                Err(anyhow!("backend down"))
            } else {
                Ok("Industrials".to_string())
            }
        }
    }

    fn fast_config(retries: u32) -> PricingConfig {
        PricingConfig {
            retries,
            retry_delay_secs: 0,
            cache_ttl_minutes: 5,
        }
    }

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let calls = Arc::new(Mutex::new(0));
        let source = CachedPriceSource::new(
            CountingSource {
                calls: calls.clone(),
                fail: false,
            },
            &fast_config(3),
        );

        let first = source.get_current_prices(&symbols(&["QAN"])).await;
        let second = source.get_current_prices(&symbols(&["QAN"])).await;

        assert_eq!(first.get("QAN"), Some(&dec!(5.27)));
        assert_eq!(first, second);
        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(source.cache_size(), 1);
    }

    #[tokio::test]
    async fn test_failed_lookup_maps_to_zero_after_retries() {
        let calls = Arc::new(Mutex::new(0));
        let source = CachedPriceSource::new(
            CountingSource {
                calls: calls.clone(),
                fail: true,
            },
            &fast_config(3),
        );

        let prices = source.get_current_prices(&symbols(&["QAN"])).await;
        assert_eq!(prices.get("QAN"), Some(&Decimal::ZERO));
        // All three attempts were made, fixed delay between them
        assert_eq!(*calls.lock().unwrap(), 3);
        // Failures are not cached
        assert_eq!(source.cache_size(), 0);
    }

    #[tokio::test]
    async fn test_sector_defaults_to_unknown_on_failure() {
        let source = CachedPriceSource::new(
            CountingSource {
                calls: Arc::new(Mutex::new(0)),
                fail: true,
            },
            &fast_config(1),
        );
        assert_eq!(source.get_stock_sector("QAN").await, "Unknown");
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let calls = Arc::new(Mutex::new(0));
        let source = CachedPriceSource::new(
            CountingSource {
                calls: calls.clone(),
                fail: false,
            },
            &fast_config(3),
        );

        source.get_current_prices(&symbols(&["QAN"])).await;
        source.clear_cache();
        assert_eq!(source.cache_size(), 0);
        source.get_current_prices(&symbols(&["QAN"])).await;
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fixed_source_serves_known_symbols_only() {
        let fixed = FixedPriceSource::new(
            HashMap::from([("QAN".to_string(), dec!(5.27))]),
            HashMap::new(),
        );
        assert_eq!(fixed.fetch_price("QAN").await.unwrap(), dec!(5.27));
        assert!(fixed.fetch_price("PNV").await.is_err());
    }
}
