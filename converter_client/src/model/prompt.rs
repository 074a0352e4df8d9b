//! Mapping typed lines to chat events.
//!
//! The terminal has no buttons, so the client remembers the last prompt the
//! server sent and interprets the next line against it: a menu accepts either
//! the option number or its value, the amount prompt forwards the text as is.
use converter_common::asset::AssetListing;
use converter_common::currency::TargetCurrency;
use converter_common::error::ErrorKind;
use converter_common::{Event, Reply};

/// The last prompt displayed to the user.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Prompt {
    /// Nothing shown yet.
    #[default]
    Idle,
    /// Crypto menu.
    Asset(Vec<AssetListing>),
    /// Currency menu.
    Currency(Vec<TargetCurrency>),
    /// Free-text amount of `asset`.
    Amount {
        /// Asset being converted.
        asset: String,
    },
    /// A result with the "convert again" button.
    Finished,
}

impl Prompt {
    /// Track the prompt carried by `reply`.
    ///
    /// Help replies and most errors leave the server on the same step. A failed
    /// price lookup sends the server back to the currency menu, so the prompt
    /// follows it and the menu to show is returned.
    pub fn update(&mut self, reply: &Reply) -> Option<Reply> {
        *self = match reply {
            Reply::AssetMenu { options } => Prompt::Asset(options.clone()),
            Reply::CurrencyMenu { options, .. } => Prompt::Currency(options.clone()),
            Reply::AmountPrompt { asset, .. } => Prompt::Amount {
                asset: asset.clone(),
            },
            Reply::Conversion { .. } => Prompt::Finished,
            Reply::Error {
                kind: ErrorKind::ProviderUnavailable | ErrorKind::AssetNotFound,
                ..
            } => {
                let Prompt::Amount { asset } = &*self else {
                    return None;
                };
                let menu = Reply::CurrencyMenu {
                    asset: asset.clone(),
                    options: TargetCurrency::options(),
                };
                *self = Prompt::Currency(TargetCurrency::options());
                return Some(menu);
            }
            Reply::Help { .. } | Reply::Error { .. } => return None,
        };
        None
    }

    /// Turn one typed line into an event, or `None` for a blank line outside
    /// of a result.
    pub fn event_for(&self, line: &str) -> Option<Event> {
        let input = line.trim();
        match input {
            "/start" => return Some(Event::Start),
            "/help" => return Some(Event::Help),
            "/restart" => return Some(Event::Restart),
            _ => {}
        }

        match self {
            Prompt::Finished => Some(Event::Restart),
            _ if input.is_empty() => None,
            Prompt::Idle => Some(Event::Start),
            Prompt::Asset(options) => {
                let symbol = pick(options, input)
                    .map(|listing| listing.symbol.clone())
                    .unwrap_or_else(|| input.to_uppercase());
                Some(Event::SelectAsset { symbol })
            }
            Prompt::Currency(options) => {
                let code = pick(options, input)
                    .map(|currency| currency.to_string())
                    .unwrap_or_else(|| input.to_lowercase());
                Some(Event::SelectCurrency { code })
            }
            Prompt::Amount { .. } => Some(Event::SubmitAmount {
                text: input.to_string(),
            }),
        }
    }
}

/// Resolve a 1-based option number.
fn pick<'a, T>(options: &'a [T], input: &str) -> Option<&'a T> {
    let index: usize = input.parse().ok()?;
    index.checked_sub(1).and_then(|i| options.get(i))
}
