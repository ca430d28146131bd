//! Wallet configuration.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Default identity network.
pub const DEFAULT_NETWORK: &str = "main";

/// Default source of demo user data.
pub const DEFAULT_DEMO_DATA_URL: &str = "https://randomuser.me/api/";

/// Default time a user-visible error stays on screen.
pub const DEFAULT_ERROR_TIMEOUT_MS: u64 = 3500;

/// Runtime settings for the wallet core.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Name of the identity network DIDs are published to.
    pub network: String,

    /// Optional permanode used to resolve historical DID documents.
    pub permanode_url: Option<String>,

    /// Endpoint returning `{results: [RandomUserData]}`.
    pub demo_data_url: String,

    /// Milliseconds before a user-visible error is cleared.
    pub error_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: DEFAULT_NETWORK.into(),
            permanode_url: None,
            demo_data_url: DEFAULT_DEMO_DATA_URL.into(),
            error_timeout_ms: DEFAULT_ERROR_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Build configuration from `WALLET_*` environment variables, falling back
    /// to defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL or number setting cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(network) = env::var("WALLET_NETWORK") {
            config.network = network;
        }
        if let Ok(permanode) = env::var("WALLET_PERMANODE_URL") {
            config.permanode_url = Some(permanode);
        }
        if let Ok(demo_url) = env::var("WALLET_DEMO_DATA_URL") {
            config.demo_data_url = demo_url;
        }
        if let Ok(timeout) = env::var("WALLET_ERROR_TIMEOUT_MS") {
            config.error_timeout_ms =
                timeout.parse().map_err(|_| ConfigError::InvalidNumber {
                    name: "WALLET_ERROR_TIMEOUT_MS".into(),
                    value: timeout.clone(),
                })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check URL settings parse.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_url("demoDataUrl", &self.demo_data_url)?;
        if let Some(permanode) = &self.permanode_url {
            parse_url("permanodeUrl", permanode)?;
        }
        Ok(())
    }

    /// How long a user-visible error stays set.
    #[must_use]
    pub const fn error_timeout(&self) -> Duration {
        Duration::from_millis(self.error_timeout_ms)
    }
}

fn parse_url(name: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        name: name.into(),
        message: e.to_string(),
    })
}
