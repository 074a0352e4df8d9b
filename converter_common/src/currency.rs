//! Target fiat currencies a crypto amount can be converted into.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Set of supported target currencies.
///
/// The lowercase form (`usd`) is what the chat menu offers and what the user
/// sends back; the provider expects the uppercase ISO code (see [`Self::code`]).
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Hash,
    Eq,
    PartialEq,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TargetCurrency {
    Usd,
    Eur,
    Rub,
}

impl TargetCurrency {
    /// Uppercase currency code used as the provider's `convert` parameter.
    pub fn code(&self) -> String {
        self.to_string().to_uppercase()
    }

    /// Menu options in display order.
    pub fn options() -> Vec<TargetCurrency> {
        TargetCurrency::iter().collect()
    }

    /// Parse a menu selection such as `usd` or ` EUR `. Anything outside the
    /// supported set yields `None`.
    pub fn parse_selection(raw: &str) -> Option<TargetCurrency> {
        raw.trim().parse::<TargetCurrency>().ok()
    }
}
