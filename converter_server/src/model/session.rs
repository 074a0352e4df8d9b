//! Per-user conversion state machine.
//!
//! A session walks through three prompts: pick an asset, pick a currency, type
//! an amount. [`ConversionSession::handle`] is the single dispatch point keyed
//! by (current state, event); it returns the next reply or a typed error and
//! never leaves the session half-updated:
//!
//! - an invalid amount keeps the session waiting for an amount;
//! - a provider failure on the quote sends it back to the currency prompt with
//!   the asset still selected;
//! - a successful conversion or a restart returns to the asset prompt.
//!
//! Events that do not fit the current step re-prompt for that step.

use std::str::FromStr;

use converter_common::currency::TargetCurrency;
use converter_common::event::UserId;
use converter_common::{ConverterError, Event, Reply, Result};
use log::{debug, info};
use rust_decimal::Decimal;

use crate::model::price_cache::PriceCache;

/// Text returned for `/help`.
pub const HELP_TEXT: &str = "Welcome to the crypto converter!\n\
Here is what I can do:\n\
- Convert cryptocurrencies into USD, EUR or RUB at the latest market price.\n\
- /start: begin a new conversion.\n\
- /help: show this message.";

/// Where a session is in the conversation.
///
/// The selected asset lives inside the states that need it, so a session can
/// never wait for a currency without knowing which asset it converts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the user to pick an asset. Initial and post-result state.
    AwaitingAsset,
    /// Waiting for a target currency for `asset`.
    AwaitingCurrency {
        /// Selected asset symbol.
        asset: String,
    },
    /// Waiting for the amount of `asset` to convert into `currency`.
    AwaitingAmount {
        /// Selected asset symbol.
        asset: String,
        /// Chosen target currency.
        currency: TargetCurrency,
    },
}

/// One user's conversation.
#[derive(Debug)]
pub struct ConversionSession {
    session_id: UserId,
    state: SessionState,
}

impl ConversionSession {
    /// Create a session waiting for an asset.
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: String::from(session_id),
            state: SessionState::AwaitingAsset,
        }
    }

    /// Identifier of the user owning this session.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current step.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Asset picked in the first step, if any.
    pub fn selected_asset(&self) -> Option<&str> {
        match &self.state {
            SessionState::AwaitingAsset => None,
            SessionState::AwaitingCurrency { asset }
            | SessionState::AwaitingAmount { asset, .. } => Some(asset),
        }
    }

    /// Drop any selection and go back to the asset prompt.
    pub fn restart(&mut self) {
        self.state = SessionState::AwaitingAsset;
    }

    /// Apply `event` and return what to show next.
    pub fn handle(&mut self, event: Event, cache: &PriceCache) -> Result<Reply> {
        debug!("Session {} in {:?} got {:?}", self.session_id, self.state, event);

        match (self.state.clone(), event) {
            (_, Event::Start) | (_, Event::Restart) => {
                self.restart();
                asset_menu(cache)
            }
            (_, Event::Help) => Ok(Reply::Help {
                text: HELP_TEXT.to_string(),
            }),
            (SessionState::AwaitingAsset, Event::SelectAsset { symbol }) => {
                self.select_asset(symbol.trim(), cache)
            }
            (SessionState::AwaitingCurrency { asset }, Event::SelectCurrency { code }) => {
                Ok(self.select_currency(asset, &code))
            }
            (SessionState::AwaitingAmount { asset, currency }, Event::SubmitAmount { text }) => {
                self.submit_amount(asset, currency, &text, cache)
            }
            (state, _) => prompt_for(&state, cache),
        }
    }

    fn select_asset(&mut self, symbol: &str, cache: &PriceCache) -> Result<Reply> {
        if !cache.contains_listing(symbol)? {
            debug!("Session {} picked unknown asset {}", self.session_id, symbol);
            return asset_menu(cache);
        }
        self.state = SessionState::AwaitingCurrency {
            asset: symbol.to_string(),
        };
        Ok(currency_menu(symbol))
    }

    fn select_currency(&mut self, asset: String, code: &str) -> Reply {
        match TargetCurrency::parse_selection(code) {
            Some(currency) => {
                let reply = Reply::AmountPrompt {
                    asset: asset.clone(),
                    currency,
                };
                self.state = SessionState::AwaitingAmount { asset, currency };
                reply
            }
            None => {
                debug!("Session {} picked unsupported currency {}", self.session_id, code);
                currency_menu(&asset)
            }
        }
    }

    fn submit_amount(
        &mut self,
        asset: String,
        currency: TargetCurrency,
        text: &str,
        cache: &PriceCache,
    ) -> Result<Reply> {
        let amount = parse_amount(text)?;

        let quote = match cache.quote(&asset, currency) {
            Ok(quote) => quote,
            Err(e) => {
                self.state = SessionState::AwaitingCurrency { asset };
                return Err(e);
            }
        };
        let result = quote.convert(amount)?;

        info!(
            "Session {} converted {} {} to {} {}",
            self.session_id,
            amount,
            asset,
            result,
            currency.code()
        );
        self.restart();
        Ok(Reply::Conversion {
            amount,
            asset,
            currency,
            result,
        })
    }
}

/// Read user text as a non-negative decimal amount.
///
/// Plain (`10`, `0.25`) and scientific (`1e3`) notation are accepted. Amounts
/// are limited to what `Decimal` holds: at most 28 decimal places and below
/// `Decimal::MAX`. A non-negative number outside that range is reported as
/// `AmountOutOfRange` rather than as unreadable text.
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    let amount = match Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed)) {
        Ok(amount) => amount,
        Err(_) => {
            let is_number = trimmed
                .parse::<f64>()
                .is_ok_and(|value| value.is_finite() && value >= 0.0);
            return Err(if is_number {
                ConverterError::AmountOutOfRange(trimmed.to_string())
            } else {
                ConverterError::InvalidAmount(trimmed.to_string())
            });
        }
    };
    if amount < Decimal::ZERO {
        return Err(ConverterError::InvalidAmount(trimmed.to_string()));
    }
    Ok(amount)
}

fn asset_menu(cache: &PriceCache) -> Result<Reply> {
    Ok(Reply::AssetMenu {
        options: cache.listings()?,
    })
}

fn currency_menu(asset: &str) -> Reply {
    Reply::CurrencyMenu {
        asset: asset.to_string(),
        options: TargetCurrency::options(),
    }
}

fn prompt_for(state: &SessionState, cache: &PriceCache) -> Result<Reply> {
    match state {
        SessionState::AwaitingAsset => asset_menu(cache),
        SessionState::AwaitingCurrency { asset } => Ok(currency_menu(asset)),
        SessionState::AwaitingAmount { asset, currency } => Ok(Reply::AmountPrompt {
            asset: asset.clone(),
            currency: *currency,
        }),
    }
}
