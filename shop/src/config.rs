//! Configuration for the shop.
//!
//! Loaded from environment variables, each with a default:
//!
//! | Variable | Default |
//! |---|---|
//! | `SHOP_API_BASE_URL` | `http://localhost:8080/api` |
//! | `SHOP_HTTP_TIMEOUT_SECS` | `10` |
//! | `SHOP_BROADCAST_CAPACITY` | `64` |
//! | `SHOP_SHUTDOWN_TIMEOUT_SECS` | `5` |

use crate::error::ConfigError;
use cartsync_runtime::StoreConfig;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BROADCAST_CAPACITY: usize = 64;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// Shop configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopConfig {
    /// Base url of the product and cart resources
    pub api_base_url: String,
    /// Per-request timeout of the HTTP channel
    pub http_timeout: Duration,
    /// Capacity of the settlement broadcast
    pub broadcast_capacity: usize,
    /// How long shutdown waits for in-flight calls
    pub shutdown_timeout: Duration,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        }
    }
}

impl ShopConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but unparsable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_base_url: lookup("SHOP_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            http_timeout: Duration::from_secs(parse(
                &lookup,
                "SHOP_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            broadcast_capacity: parse(
                &lookup,
                "SHOP_BROADCAST_CAPACITY",
                DEFAULT_BROADCAST_CAPACITY,
            )?,
            shutdown_timeout: Duration::from_secs(parse(
                &lookup,
                "SHOP_SHUTDOWN_TIMEOUT_SECS",
                DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            )?),
        })
    }

    /// Store settings derived from this configuration
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default()
            .with_broadcast_capacity(self.broadcast_capacity)
            .with_shutdown_timeout(self.shutdown_timeout)
    }
}

fn parse<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ShopConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ShopConfig::default());
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn reads_overrides() {
        let config = ShopConfig::from_lookup(lookup(&[
            ("SHOP_API_BASE_URL", "http://shop.test/api"),
            ("SHOP_HTTP_TIMEOUT_SECS", "3"),
            ("SHOP_BROADCAST_CAPACITY", " 128 "),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "http://shop.test/api");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.store_config().broadcast_capacity, 128);
    }

    #[test]
    fn rejects_garbage() {
        let err = ShopConfig::from_lookup(lookup(&[("SHOP_SHUTDOWN_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "SHOP_SHUTDOWN_TIMEOUT_SECS",
                value: "soon".to_string(),
            }
        );
    }
}
