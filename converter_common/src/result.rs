//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `ConverterError`, so functions can simply return `Result<T>`.
use crate::error::ConverterError;

/// Workspace-wide `Result` alias with `ConverterError` as the default error.
pub type Result<T, E = ConverterError> = std::result::Result<T, E>;
