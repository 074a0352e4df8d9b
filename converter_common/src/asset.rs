//! Listing and price types produced by the market-data layer.
//!
//! An `AssetListing` is one selectable entry of the crypto menu. A `PriceQuote`
//! is the price of one asset in one target currency, stamped with the time it
//! was fetched. Both are immutable once created.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::currency::TargetCurrency;
use crate::error::ConverterError;

/// Number of decimal places a converted value is rounded to.
pub const RESULT_SCALE: u32 = 3;

/// A tradable asset offered in the crypto menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetListing {
    /// Ticker symbol (e.g. `BTC`), used as the menu selection value.
    pub symbol: String,
    /// Human readable name (e.g. `Bitcoin`), used as the menu label.
    pub display_name: String,
    /// Whether the asset belongs to the fixed exclusion set.
    pub excluded: bool,
}

impl AssetListing {
    /// Create a listing that is offered to users.
    pub fn new(symbol: &str, display_name: &str) -> Self {
        AssetListing {
            symbol: String::from(symbol),
            display_name: String::from(display_name),
            excluded: false,
        }
    }
}

/// Price of `asset` expressed in `target_currency`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    /// Ticker symbol of the priced asset.
    pub asset: String,
    /// Currency the price is expressed in.
    pub target_currency: TargetCurrency,
    /// Price of one unit of the asset.
    pub price: Decimal,
    /// When the provider answered.
    pub fetched_at: DateTime<Utc>,
}

impl PriceQuote {
    /// Create a quote stamped with the current time.
    pub fn new(asset: &str, target_currency: TargetCurrency, price: Decimal) -> Self {
        PriceQuote {
            asset: String::from(asset),
            target_currency,
            price,
            fetched_at: Utc::now(),
        }
    }

    /// Convert `amount` units of the asset, rounding half-up to
    /// [`RESULT_SCALE`] decimal places.
    pub fn convert(&self, amount: Decimal) -> Result<Decimal, ConverterError> {
        let raw = amount
            .checked_mul(self.price)
            .ok_or_else(|| ConverterError::AmountOutOfRange(amount.to_string()))?;
        Ok(raw.round_dp_with_strategy(RESULT_SCALE, RoundingStrategy::MidpointAwayFromZero))
    }
}
