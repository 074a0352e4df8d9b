//! CoinMarketCap market-data client.
//!
//! All knowledge about the provider's URLs, headers and JSON nesting lives in
//! this module. Callers see two operations through [`MarketDataProvider`] and
//! three outcomes: a value, `AssetNotFound`, or `ProviderUnavailable`.
//!
//! Requests are blocking and carry the timeout given at construction. Nothing
//! here retries; one failed call is one failed user request.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use converter_common::asset::AssetListing;
use converter_common::currency::TargetCurrency;
use converter_common::{ConverterError, Result};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

/// Production base URL of the provider.
pub const DEFAULT_PROVIDER_URL: &str = "https://pro-api.coinmarketcap.com";
/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";
/// How many entries of the provider's ranking are considered.
pub const LISTING_LIMIT: usize = 10;
/// Stablecoins and pegged tokens that are never offered for conversion.
pub const EXCLUDED_NAMES: [&str; 3] = ["Tether USDt", "USD Coin", "TRON"];

const LISTINGS_PATH: &str = "/v1/cryptocurrency/listings/latest";
const QUOTES_PATH: &str = "/v1/cryptocurrency/quotes/latest";

/// Source of listings and prices used by the cache.
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the current top listing with the exclusion set removed.
    fn fetch_listings(&self) -> Result<Vec<AssetListing>>;

    /// Fetch the price of one unit of `asset` in `currency`.
    fn fetch_quote(&self, asset: &str, currency: TargetCurrency) -> Result<Decimal>;
}

/// Blocking HTTP client for the CoinMarketCap pro API.
pub struct CoinMarketCapClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl CoinMarketCapClient {
    /// Build a client for `base_url`; every request gives up after `timeout`.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConverterError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .header("Accepts", "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ConverterError::ProviderUnavailable(format!("request timeout: {}", e))
                } else if e.is_connect() {
                    ConverterError::ProviderUnavailable(format!("connection failed: {}", e))
                } else {
                    ConverterError::ProviderUnavailable(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| {
            ConverterError::ProviderUnavailable(format!("failed to read response: {}", e))
        })?;

        if !status.is_success() {
            let detail = provider_error_message(&body).unwrap_or_else(|| body.clone());
            warn!("Provider answered {} for {}: {}", status, path, detail);
            return Err(ConverterError::ProviderUnavailable(format!(
                "HTTP {}: {}",
                status, detail
            )));
        }
        Ok(body)
    }
}

impl MarketDataProvider for CoinMarketCapClient {
    fn fetch_listings(&self) -> Result<Vec<AssetListing>> {
        let body = self.get(LISTINGS_PATH, &[])?;
        let listings = parse_listings(&body)?;
        info!("Fetched {} listings from provider", listings.len());
        Ok(listings)
    }

    fn fetch_quote(&self, asset: &str, currency: TargetCurrency) -> Result<Decimal> {
        let query = [("symbol", asset.to_string()), ("convert", currency.code())];
        let body = self.get(QUOTES_PATH, &query)?;
        let price = parse_quote(&body, asset, currency)?;
        info!("Fetched quote {}/{} = {}", asset, currency.code(), price);
        Ok(price)
    }
}

#[derive(Debug, Deserialize)]
struct ListingsResponse {
    data: Vec<RawAsset>,
}

#[derive(Debug, Deserialize)]
struct RawAsset {
    name: String,
    symbol: String,
}

/// Turn a listings payload into menu entries.
///
/// The provider's first [`LISTING_LIMIT`] entries are taken first and the
/// exclusion set is removed afterwards, so fewer than ten entries may remain.
/// Repeated symbols keep their first occurrence.
pub fn parse_listings(body: &str) -> Result<Vec<AssetListing>> {
    let response: ListingsResponse = serde_json::from_str(body).map_err(|e| {
        ConverterError::ProviderUnavailable(format!("malformed listings payload: {}", e))
    })?;

    let mut seen = HashSet::new();
    let listings = response
        .data
        .into_iter()
        .take(LISTING_LIMIT)
        .map(|raw| AssetListing {
            excluded: EXCLUDED_NAMES.contains(&raw.name.as_str()),
            symbol: raw.symbol,
            display_name: raw.name,
        })
        .filter(|listing| {
            if listing.excluded {
                debug!("Excluding {} ({})", listing.display_name, listing.symbol);
            }
            !listing.excluded
        })
        .filter(|listing| seen.insert(listing.symbol.clone()))
        .collect();
    Ok(listings)
}

/// Extract `data[asset].quote[CODE].price` from a quotes payload.
pub fn parse_quote(body: &str, asset: &str, currency: TargetCurrency) -> Result<Decimal> {
    let code = currency.code();
    let root: Value = serde_json::from_str(body).map_err(|e| {
        ConverterError::ProviderUnavailable(format!("malformed quotes payload: {}", e))
    })?;

    let price = root
        .get("data")
        .and_then(|data| data.get(asset))
        .and_then(|entry| entry.get("quote"))
        .and_then(|quote| quote.get(&code))
        .and_then(|quote| quote.get("price"))
        .filter(|price| !price.is_null())
        .ok_or_else(|| ConverterError::AssetNotFound(format!("{}/{}", asset, code)))?;

    let text = match price {
        Value::Number(number) => number.to_string(),
        _ => {
            return Err(ConverterError::ProviderUnavailable(format!(
                "non-numeric price for {}/{}",
                asset, code
            )));
        }
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| {
            ConverterError::ProviderUnavailable(format!("unusable price {}: {}", text, e))
        })
}

fn provider_error_message(body: &str) -> Option<String> {
    let root: Value = serde_json::from_str(body).ok()?;
    root.get("status")?
        .get("error_message")?
        .as_str()
        .map(String::from)
}
