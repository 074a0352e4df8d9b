//!
//! Common types and utilities shared by the conversion server and the chat client.
//!
//! This crate aggregates:
//! - `error` — unified error type `ConverterError` used across the workspace.
//! - `result` — handy `Result<T, ConverterError>` alias.
//! - `currency` — supported target fiat currencies.
//! - `asset` — crypto listings, price quotes and the conversion rounding rule.
//! - `event` — chat events and replies exchanged over the wire.
//! - `net` — networking constants and small helpers.
#![warn(missing_docs)]
pub mod asset;
pub mod currency;
pub mod error;
pub mod event;
pub mod net;
pub mod result;

pub use error::ConverterError;
pub use result::Result;
pub use event::{Envelope, Event, Reply};
