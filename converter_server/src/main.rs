//! Crypto conversion chat server.
//!
//! This binary hosts the conversion core and exposes it to chat clients over TCP.
//! It wires together:
//!
//! - `CoinMarketCapClient` — blocking client for the provider's listings and quotes
//!   endpoints, with a request timeout taken from the command line.
//! - `PriceCache` — one shared instance holding the listing and every quote fetched
//!   so far. Entries never expire while the process runs.
//! - `SessionRegistry` — one `ConversionSession` per user id, each behind its own lock.
//! - `EventReceiver` — accepts TCP clients, decodes `Envelope` lines and writes back
//!   one `Reply` line per event.
//!
//! Provider failures are reported to the user who triggered them and never stop
//! the server.
#![warn(missing_docs)]
use clap::Parser;
use converter_common::ConverterError;
use converter_common::Result;
use converter_server::args::Args;
use converter_server::model::market_data::CoinMarketCapClient;
use converter_server::model::price_cache::PriceCache;
use converter_server::model::registry::SessionRegistry;
use converter_server::receiver::EventReceiver;
use log::{error, info};
use std::sync::Arc;

fn main() -> Result<(), ConverterError> {
    init_logger();
    let args = Args::parse();
    if let Err(e) = args.validate() {
        error!("{}", e);
        return Err(e);
    }

    let provider = Arc::new(CoinMarketCapClient::new(
        &args.provider_url,
        &args.api_key,
        args.timeout(),
    )?);
    info!(
        "Using provider {} with a {}s timeout",
        args.provider_url, args.timeout_secs
    );
    let cache = Arc::new(PriceCache::new(provider));
    let registry = Arc::new(SessionRegistry::new(cache));

    let receiver = EventReceiver::new(&args.bind_address())?;
    info!("Listening for chat clients on {}", receiver.local_addr()?);
    receiver.receive_loop(registry)
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
