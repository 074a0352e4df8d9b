//! Command-line arguments for the conversion server.
use std::time::Duration;

use clap::Parser;
use converter_common::ConverterError;
use converter_common::net::{COMMAND_PORT, addr};

use crate::model::market_data::DEFAULT_PROVIDER_URL;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// CoinMarketCap pro API key.
    #[clap(long, env = "CMC_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// IP address to accept chat clients on.
    #[clap(long, default_value = "0.0.0.0")]
    pub bind_ip: String,

    /// TCP port to accept chat clients on.
    #[clap(long, default_value_t = COMMAND_PORT)]
    pub port: u16,

    /// Base URL of the market-data provider.
    #[clap(long, env = "CMC_PROVIDER_URL", default_value = DEFAULT_PROVIDER_URL)]
    pub provider_url: String,

    /// Seconds to wait for the provider before failing a request.
    #[clap(long, default_value_t = 10)]
    pub timeout_secs: u64,
}

impl Args {
    /// Reject values clap cannot check on its own.
    pub fn validate(&self) -> Result<(), ConverterError> {
        if self.api_key.trim().is_empty() {
            return Err(ConverterError::Config("API key is empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConverterError::Config("timeout must be at least one second".into()));
        }
        Ok(())
    }

    /// `ip:port` to bind the event receiver to.
    pub fn bind_address(&self) -> String {
        addr(self.bind_ip.trim(), self.port)
    }

    /// Provider request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let args = Args::try_parse_from(["converter_server", "--api-key", "k"]).unwrap();
        args.validate().unwrap();
        assert_eq!(args.bind_address(), format!("0.0.0.0:{}", COMMAND_PORT));
        assert_eq!(args.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn blank_key_and_zero_timeout_are_rejected() {
        let blank = Args::try_parse_from(["converter_server", "--api-key", "  "]).unwrap();
        assert!(matches!(blank.validate(), Err(ConverterError::Config(_))));

        let zero =
            Args::try_parse_from(["converter_server", "--api-key", "k", "--timeout-secs", "0"])
                .unwrap();
        assert!(matches!(zero.validate(), Err(ConverterError::Config(_))));
    }
}
