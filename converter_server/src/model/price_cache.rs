//! Shared in-memory cache of listings and price quotes.
//!
//! Freshness policy: nothing expires. The listing is fetched once and then
//! served for the lifetime of the process, and so is every quote once its
//! `(asset, currency)` pair has been fetched. Prices shown to users can
//! therefore be as old as the process; `PriceQuote::fetched_at` records how old.
//!
//! Failed fetches are never stored, so the next request asks the provider
//! again. Concurrent misses on the same key may both reach the provider; the
//! last insert wins. The provider is always called without a lock held.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use converter_common::Result;
use converter_common::asset::{AssetListing, PriceQuote};
use converter_common::currency::TargetCurrency;
use log::{debug, info};

use crate::model::market_data::MarketDataProvider;

/// Listings and quotes shared by every session.
pub struct PriceCache {
    provider: Arc<dyn MarketDataProvider>,
    listings: RwLock<Option<Vec<AssetListing>>>,
    quotes: RwLock<HashMap<(String, TargetCurrency), PriceQuote>>,
}

impl PriceCache {
    /// Create an empty cache backed by `provider`.
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            listings: RwLock::new(None),
            quotes: RwLock::new(HashMap::new()),
        }
    }

    /// Selectable assets, fetched on first use.
    ///
    /// An empty listing is returned but not stored.
    pub fn listings(&self) -> Result<Vec<AssetListing>> {
        if let Some(cached) = self.listings.read()?.as_ref() {
            return Ok(cached.clone());
        }

        let fetched = self.provider.fetch_listings()?;
        if !fetched.is_empty() {
            info!("Caching {} listings", fetched.len());
            *self.listings.write()? = Some(fetched.clone());
        }
        Ok(fetched)
    }

    /// Whether `symbol` is one of the selectable assets.
    pub fn contains_listing(&self, symbol: &str) -> Result<bool> {
        Ok(self.listings()?.iter().any(|listing| listing.symbol == symbol))
    }

    /// Price of `asset` in `currency`, fetched on first use of the pair.
    pub fn quote(&self, asset: &str, currency: TargetCurrency) -> Result<PriceQuote> {
        let key = (asset.to_string(), currency);
        if let Some(cached) = self.quotes.read()?.get(&key) {
            debug!("Quote cache hit for {}/{}", asset, currency.code());
            return Ok(cached.clone());
        }

        let price = self.provider.fetch_quote(asset, currency)?;
        let quote = PriceQuote::new(asset, currency, price);
        self.quotes.write()?.insert(key, quote.clone());
        Ok(quote)
    }

    /// Number of memoized `(asset, currency)` pairs.
    pub fn cached_quote_count(&self) -> Result<usize> {
        Ok(self.quotes.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::FakeProvider;
    use converter_common::ConverterError;
    use rust_decimal_macros::dec;
    use std::sync::atomic::Ordering;
    use std::thread;

    fn cache_with(provider: &Arc<FakeProvider>) -> PriceCache {
        PriceCache::new(provider.clone())
    }

    #[test]
    fn listings_are_fetched_once() {
        let provider = Arc::new(FakeProvider::new());
        let cache = cache_with(&provider);
        let first = cache.listings().unwrap();
        let second = cache.listings().unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.listing_calls(), 1);
        assert!(cache.contains_listing("ETH").unwrap());
        assert!(!cache.contains_listing("USDT").unwrap());
        assert_eq!(provider.listing_calls(), 1);
    }

    #[test]
    fn failed_listings_are_not_cached() {
        let provider = Arc::new(FakeProvider::new());
        provider.fail_listings.store(true, Ordering::SeqCst);
        let cache = cache_with(&provider);

        let err = cache.listings().unwrap_err();
        assert!(matches!(err, ConverterError::ProviderUnavailable(_)));

        provider.fail_listings.store(false, Ordering::SeqCst);
        assert_eq!(cache.listings().unwrap().len(), 3);
        assert_eq!(provider.listing_calls(), 2);
    }

    #[test]
    fn quotes_are_memoized_per_pair() {
        let provider = Arc::new(
            FakeProvider::new()
                .with_price("BTC", TargetCurrency::Usd, dec!(60000.5))
                .with_price("BTC", TargetCurrency::Eur, dec!(55000.25)),
        );
        let cache = cache_with(&provider);

        let first = cache.quote("BTC", TargetCurrency::Usd).unwrap();
        let second = cache.quote("BTC", TargetCurrency::Usd).unwrap();
        assert_eq!(first.price, dec!(60000.5));
        assert_eq!(first, second);
        assert_eq!(provider.quote_calls(), 1);

        let eur = cache.quote("BTC", TargetCurrency::Eur).unwrap();
        assert_eq!(eur.price, dec!(55000.25));
        assert_eq!(provider.quote_calls(), 2);
        assert_eq!(cache.cached_quote_count().unwrap(), 2);
    }

    #[test]
    fn cached_quotes_do_not_follow_provider_changes() {
        let provider = Arc::new(FakeProvider::new().with_price("ETH", TargetCurrency::Rub, dec!(1)));
        let cache = cache_with(&provider);
        assert_eq!(cache.quote("ETH", TargetCurrency::Rub).unwrap().price, dec!(1));
        provider.set_price("ETH", TargetCurrency::Rub, dec!(2));
        assert_eq!(cache.quote("ETH", TargetCurrency::Rub).unwrap().price, dec!(1));
    }

    #[test]
    fn quote_errors_propagate_and_are_not_cached() {
        let provider = Arc::new(FakeProvider::new());
        let cache = cache_with(&provider);

        let err = cache.quote("DOGE", TargetCurrency::Usd).unwrap_err();
        assert!(matches!(err, ConverterError::AssetNotFound(_)));

        provider.fail_quotes.store(true, Ordering::SeqCst);
        let err = cache.quote("DOGE", TargetCurrency::Usd).unwrap_err();
        assert!(matches!(err, ConverterError::ProviderUnavailable(_)));

        provider.fail_quotes.store(false, Ordering::SeqCst);
        provider.set_price("DOGE", TargetCurrency::Usd, dec!(0.12));
        assert_eq!(cache.quote("DOGE", TargetCurrency::Usd).unwrap().price, dec!(0.12));
        assert_eq!(provider.quote_calls(), 3);
        assert_eq!(cache.cached_quote_count().unwrap(), 1);
    }

    #[test]
    fn concurrent_readers_see_consistent_prices() {
        let provider = Arc::new(FakeProvider::new().with_price("SOL", TargetCurrency::Usd, dec!(150)));
        let cache = Arc::new(cache_with(&provider));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.quote("SOL", TargetCurrency::Usd).unwrap().price)
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), dec!(150));
        }
        assert!(provider.quote_calls() >= 1);
        assert_eq!(cache.cached_quote_count().unwrap(), 1);
    }
}
