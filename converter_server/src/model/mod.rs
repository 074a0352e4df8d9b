//! Conversion core of the server.
//!
//! - `market_data` — provider client and the `MarketDataProvider` seam.
//! - `price_cache` — shared, never-expiring cache of listings and quotes.
//! - `session` — per-user conversion state machine.
//! - `registry` — user id to session map and event dispatch.

pub mod market_data;
pub mod price_cache;
pub mod registry;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
