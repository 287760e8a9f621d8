//! Error types for the shop.

use cartsync_runtime::StoreError;
use thiserror::Error;

/// Failure of a single remote call
///
/// The reducer treats every variant the same way; the distinction only
/// shows up in logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The request never produced a response
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// The response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The channel refused the call without contacting anything
    #[error("channel unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ChannelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Errors surfaced by [`ShopService`](crate::ShopService)
///
/// Channel failures never show up here; they are absorbed by the failure
/// policy and reported through [`Settlement`](crate::Settlement).
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The underlying store rejected or lost the operation
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Invalid configuration value
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable could not be parsed
    #[error("invalid value for {name}: {value:?}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Raw value as found
        value: String,
    },
}
