//! Conversion core hosted by the chat server.
//!
//! - `model` — provider client, price cache, sessions and the session registry.
//! - `receiver` — TCP front end that feeds chat events into the registry.
//! - `args` — command-line configuration of the server binary.
#![warn(missing_docs)]
pub mod args;
pub mod model;
pub mod receiver;
