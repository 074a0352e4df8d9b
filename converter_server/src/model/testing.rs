//! In-memory provider used by the unit tests of the cache, sessions and receiver.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use converter_common::asset::AssetListing;
use converter_common::currency::TargetCurrency;
use converter_common::{ConverterError, Result};
use rust_decimal::Decimal;

use crate::model::market_data::MarketDataProvider;

/// Provider with canned answers that counts how often it is asked.
#[derive(Default)]
pub struct FakeProvider {
    listings: Vec<AssetListing>,
    prices: Mutex<HashMap<(String, TargetCurrency), Decimal>>,
    pub fail_listings: AtomicBool,
    pub fail_quotes: AtomicBool,
    pub listing_calls: AtomicUsize,
    pub quote_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        FakeProvider {
            listings: vec![
                AssetListing::new("BTC", "Bitcoin"),
                AssetListing::new("ETH", "Ethereum"),
                AssetListing::new("SOL", "Solana"),
            ],
            ..Default::default()
        }
    }

    pub fn with_price(self, asset: &str, currency: TargetCurrency, price: Decimal) -> Self {
        self.set_price(asset, currency, price);
        self
    }

    pub fn set_price(&self, asset: &str, currency: TargetCurrency, price: Decimal) {
        self.prices
            .lock()
            .unwrap()
            .insert((asset.to_string(), currency), price);
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }
}

impl MarketDataProvider for FakeProvider {
    fn fetch_listings(&self) -> Result<Vec<AssetListing>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listings.load(Ordering::SeqCst) {
            return Err(ConverterError::ProviderUnavailable("listings down".into()));
        }
        Ok(self.listings.clone())
    }

    fn fetch_quote(&self, asset: &str, currency: TargetCurrency) -> Result<Decimal> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_quotes.load(Ordering::SeqCst) {
            return Err(ConverterError::ProviderUnavailable("quotes down".into()));
        }
        self.prices
            .lock()
            .unwrap()
            .get(&(asset.to_string(), currency))
            .copied()
            .ok_or_else(|| ConverterError::AssetNotFound(format!("{}/{}", asset, currency.code())))
    }
}
