//! Error types shared between the conversion server and the chat client.
//!
//! `ConverterError` carries the three user-visible failures of a conversion
//! (`ProviderUnavailable`, `AssetNotFound`, `InvalidAmount`) next to the plumbing
//! failures for I/O, JSON, locks and configuration, so every crate propagates
//! a single error type.
use std::io;
use std::sync::PoisonError;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Unified error type shared by client and server.
#[derive(Error, Debug)]
pub enum ConverterError {
    /// The market-data provider could not be reached, answered with a non-2xx
    /// status, or returned a payload that could not be parsed.
    #[error("Market data provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider answered, but the requested asset/currency pair was absent.
    #[error("No price found for {0}")]
    AssetNotFound(String),

    /// User input could not be read as a non-negative decimal amount.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// User input is a non-negative number, but too large or too precise
    /// for a decimal amount.
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),

    /// A client frame exceeded the given length in bytes without a newline.
    #[error("Frame longer than {0} bytes")]
    FrameTooLong(u64),

    /// I/O error originating from sockets or stdin/stdout.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),

    /// Missing or invalid startup configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl<T> From<PoisonError<T>> for ConverterError {
    fn from(err: PoisonError<T>) -> Self {
        ConverterError::MutexLock(err.to_string())
    }
}

/// Coarse error classification sent to the client alongside the message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`ConverterError::ProviderUnavailable`].
    ProviderUnavailable,
    /// See [`ConverterError::AssetNotFound`].
    AssetNotFound,
    /// See [`ConverterError::InvalidAmount`].
    InvalidAmount,
    /// The client sent a frame the server could not decode.
    BadRequest,
    /// Anything else that went wrong on the server side.
    Internal,
}

impl ConverterError {
    /// Classify the error for the wire.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConverterError::ProviderUnavailable(_) => ErrorKind::ProviderUnavailable,
            ConverterError::AssetNotFound(_) => ErrorKind::AssetNotFound,
            ConverterError::InvalidAmount(_) | ConverterError::AmountOutOfRange(_) => {
                ErrorKind::InvalidAmount
            }
            ConverterError::SerdeJson(_) | ConverterError::FrameTooLong(_) => ErrorKind::BadRequest,
            ConverterError::Io(_) | ConverterError::MutexLock(_) | ConverterError::Config(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Message shown to the chat user. Each kind gets its own wording.
    pub fn user_message(&self) -> String {
        match self {
            ConverterError::ProviderUnavailable(detail) => {
                format!("Could not get data from the price provider: {}", detail)
            }
            ConverterError::AssetNotFound(what) => {
                format!("Could not find price information for {}.", what)
            }
            ConverterError::InvalidAmount(text) => {
                format!("'{}' is not a valid amount. Enter a non-negative number.", text)
            }
            ConverterError::AmountOutOfRange(text) => format!(
                "'{}' is out of range. Amounts can have at most 28 decimal places \
                 and must stay below 79228162514264337593543950335.",
                text
            ),
            ConverterError::SerdeJson(e) => format!("Malformed request: {}", e),
            ConverterError::FrameTooLong(limit) => {
                format!("Request is longer than {} bytes.", limit)
            }
            other => format!("Internal error: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn domain_errors_have_distinct_kinds_and_messages() {
        let errors = [
            ConverterError::ProviderUnavailable("timeout".into()),
            ConverterError::AssetNotFound("BTC/USD".into()),
            ConverterError::InvalidAmount("abc".into()),
        ];
        let kinds: Vec<ErrorKind> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::ProviderUnavailable,
                ErrorKind::AssetNotFound,
                ErrorKind::InvalidAmount
            ]
        );
        assert_ne!(errors[0].user_message(), errors[1].user_message());
        assert!(errors[2].user_message().contains("abc"));
    }

    #[test]
    fn out_of_range_amount_is_classified_as_invalid_with_its_own_message() {
        let out_of_range = ConverterError::AmountOutOfRange("1e-40".into());
        let invalid = ConverterError::InvalidAmount("1e-40".into());
        assert_eq!(out_of_range.kind(), ErrorKind::InvalidAmount);
        assert_ne!(out_of_range.user_message(), invalid.user_message());
        assert!(out_of_range.user_message().contains("28 decimal places"));
        assert_eq!(ConverterError::FrameTooLong(10).kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn poisoned_lock_converts_to_mutex_lock() {
        let lock = std::sync::Arc::new(Mutex::new(0));
        let cloned = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = cloned.lock().unwrap();
            panic!("poison");
        })
        .join();
        let err: ConverterError = lock.lock().unwrap_err().into();
        assert!(matches!(err, ConverterError::MutexLock(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn error_kind_display_is_snake_case() {
        assert_eq!(ErrorKind::ProviderUnavailable.to_string(), "provider_unavailable");
        assert_eq!("invalid_amount".parse::<ErrorKind>().unwrap(), ErrorKind::InvalidAmount);
    }
}
