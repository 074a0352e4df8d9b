//! Command-line arguments for the chat client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use converter_common::net::COMMAND_PORT;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Server IP address (IPv4 or IPv6) where the conversion server is running.
    #[clap(long, default_value = "127.0.0.1")]
    pub server_ip: String,

    /// TCP port of the conversion server.
    #[clap(long, default_value_t = COMMAND_PORT)]
    pub port: u16,

    /// Chat identifier sent with every event. Two clients with the same id share a session.
    #[clap(long, env = "CONVERTER_USER_ID", default_value = "console")]
    pub user_id: String,
}
