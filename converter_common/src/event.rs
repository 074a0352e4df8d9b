//! Chat events and replies exchanged between the client and the server.
//!
//! Frames are JSON objects, one per line. The client sends an [`Envelope`]
//! carrying the user identifier and one [`Event`]; the server answers every
//! envelope with exactly one [`Reply`].
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::asset::AssetListing;
use crate::currency::TargetCurrency;
use crate::error::{ConverterError, ErrorKind};

/// Opaque user/chat identifier used to key sessions.
pub type UserId = String;

/// User input delivered to a conversion session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// `/start`: open a new conversion and show the crypto menu.
    Start,
    /// `/help`: describe what the bot can do.
    Help,
    /// A crypto menu button was pressed.
    SelectAsset {
        /// Ticker symbol carried by the button.
        symbol: String,
    },
    /// A currency menu button was pressed.
    SelectCurrency {
        /// Lowercase currency code carried by the button.
        code: String,
    },
    /// Free text typed while the amount is expected.
    SubmitAmount {
        /// Raw user text.
        text: String,
    },
    /// "Convert again" button.
    Restart,
}

/// An event tagged with the user that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Who sent the event.
    pub user_id: UserId,
    /// What was sent.
    pub event: Event,
}

impl Envelope {
    /// Creates a new envelope.
    pub fn new(user_id: &str, event: Event) -> Self {
        Envelope {
            user_id: String::from(user_id),
            event,
        }
    }
}

/// What the server wants the client to display next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// Prompt to pick a crypto asset.
    AssetMenu {
        /// Selectable assets in provider order.
        options: Vec<AssetListing>,
    },
    /// Prompt to pick a target currency for `asset`.
    CurrencyMenu {
        /// The asset chosen in the previous step.
        asset: String,
        /// Selectable currencies.
        options: Vec<TargetCurrency>,
    },
    /// Prompt to type the amount of `asset` to convert into `currency`.
    AmountPrompt {
        /// Selected asset.
        asset: String,
        /// Selected currency.
        currency: TargetCurrency,
    },
    /// Final result; the client offers a restart button next to it.
    Conversion {
        /// Amount the user typed.
        amount: Decimal,
        /// Converted asset.
        asset: String,
        /// Target currency.
        currency: TargetCurrency,
        /// `amount * price`, rounded to three decimal places.
        result: Decimal,
    },
    /// Static help text.
    Help {
        /// Text to display.
        text: String,
    },
    /// A failed request. The session stays usable.
    Error {
        /// Classification of the failure.
        kind: ErrorKind,
        /// User-facing message.
        message: String,
    },
}

impl From<&ConverterError> for Reply {
    fn from(err: &ConverterError) -> Self {
        Reply::Error {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

/// Encode a frame as a single JSON line terminated by `\n`.
pub fn to_json_line<T: Serialize>(frame: &T) -> Result<Vec<u8>, ConverterError> {
    let mut bytes = serde_json::to_vec(frame)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decode a frame from one line of text.
pub fn from_json_line<T: DeserializeOwned>(line: &str) -> Result<T, ConverterError> {
    Ok(serde_json::from_str(line.trim())?)
}
