//! Configuration for the `wrap` tool.
//!
//! Values are layered, later sources overriding earlier ones:
//! 1. [`Config::default`]
//! 2. `wrap.toml` in the working directory (or a path given explicitly)
//! 3. `WRAP_`-prefixed environment variables, e.g. `WRAP_RPC_URL`

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use alloy_primitives::Address;
use figment::{
    Figment, Provider,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

mod error;
pub use error::{ExtractConfigError, InvalidSetting};

// reexport so callers can merge their own providers
pub use figment;

/// Default config file name.
pub const FILE_NAME: &str = "wrap.toml";

/// Prefix of the environment variables read into the config.
pub const ENV_PREFIX: &str = "WRAP_";

/// Settings of the `wrap` tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON-RPC endpoint of the wallet provider.
    pub rpc_url: String,
    /// Blocks required before a wrap counts as confirmed.
    pub confirmations: u64,
    /// Seconds to wait for confirmation before reporting failure. `0` waits forever.
    pub confirmation_timeout: u64,
    /// Milliseconds between receipt polls.
    pub poll_interval_ms: u64,
    /// Connect the wallet as soon as the session starts.
    pub auto_connect: bool,
    /// Unlocked account to use instead of the first one the node reports.
    pub sender: Option<Address>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            confirmations: 1,
            confirmation_timeout: 120,
            poll_interval_ms: 1_000,
            auto_connect: true,
            sender: None,
        }
    }
}

impl Config {
    /// Loads the config from the default sources.
    pub fn load() -> Result<Self, ExtractConfigError> {
        Self::from_provider(Self::figment())
    }

    /// Loads the config using `path` instead of `./wrap.toml`.
    pub fn load_with_file(path: impl AsRef<Path>) -> Result<Self, ExtractConfigError> {
        Self::from_provider(Self::figment_with_file(path))
    }

    /// Extracts a config from any figment provider.
    ///
    /// # Example
    ///
    /// ```
    /// use wrap_config::{figment::providers::Serialized, Config};
    ///
    /// let config = Config::from_provider(
    ///     Config::figment().merge(Serialized::default("confirmations", 3)),
    /// )
    /// .unwrap();
    /// assert_eq!(config.confirmations, 3);
    /// ```
    pub fn from_provider<T: Provider>(provider: T) -> Result<Self, ExtractConfigError> {
        Figment::from(provider).extract().map_err(ExtractConfigError::new)
    }

    /// The default figment: defaults, `wrap.toml`, then the environment.
    pub fn figment() -> Figment {
        Self::figment_with_file(FILE_NAME)
    }

    pub fn figment_with_file(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// The confirmation timeout, `None` when disabled.
    pub fn confirmation_timeout(&self) -> Option<Duration> {
        (self.confirmation_timeout > 0).then(|| Duration::from_secs(self.confirmation_timeout))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
