//! Process configuration loaded from the environment.
//!
//! All settings are read once at startup; a missing or malformed
//! variable is fatal then, never at call time. Reads from:
//! - `WALLET_API_KEY` - Required static API key
//! - `WALLET_API_URL` - Required backend base URL (any version prefix included)
//! - `SIGNER_ADDRESS` - Required external signer address for new wallets
//! - `SIGNER_PRIVATE_KEY` - Required secp256k1 key for signature generation
//! - `TREASURY_WALLET_ADDRESS` - Required default transfer destination

use std::fmt;

use crate::chain::is_evm_address;

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "WALLET_API_KEY";
/// Environment variable holding the backend base URL.
pub const ENV_API_URL: &str = "WALLET_API_URL";
/// Environment variable holding the signer address.
pub const ENV_SIGNER_ADDRESS: &str = "SIGNER_ADDRESS";
/// Environment variable holding the signer private key.
pub const ENV_SIGNER_PRIVATE_KEY: &str = "SIGNER_PRIVATE_KEY";
/// Environment variable holding the treasury wallet address.
pub const ENV_TREASURY_ADDRESS: &str = "TREASURY_WALLET_ADDRESS";

/// Startup configuration failures.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    /// A variable is set but its value is unusable.
    #[error("invalid {var}: {reason}")]
    Invalid {
        /// Name of the offending variable.
        var: &'static str,
        /// What is wrong with the value.
        reason: String,
    },
}

/// Resolved process configuration.
///
/// Field values are held as plain strings; key material is validated
/// where it is used (the signer rejects malformed keys, the client
/// passes the API key through opaquely).
#[derive(Clone)]
pub struct Settings {
    /// Static API key sent as `x-api-key`.
    pub api_key: String,
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    /// External signer address bound to newly created wallets.
    pub signer_address: String,
    /// Private key controlling `signer_address`.
    pub signer_private_key: String,
    /// Default destination for treasury transfers.
    pub treasury_address: String,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] for unset or empty variables
    /// and [`ConfigError::Invalid`] for malformed addresses or URLs.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// The seam `from_env` goes through; tests exercise it with a map
    /// instead of mutating the process environment.
    ///
    /// # Errors
    ///
    /// Same contract as [`Settings::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
                _ => Err(ConfigError::MissingVar(name)),
            }
        };

        let api_key = require(ENV_API_KEY)?;
        let api_url = require(ENV_API_URL)?;
        let signer_address = require(ENV_SIGNER_ADDRESS)?;
        let signer_private_key = require(ENV_SIGNER_PRIVATE_KEY)?;
        let treasury_address = require(ENV_TREASURY_ADDRESS)?;

        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: ENV_API_URL,
                reason: format!("expected an http(s) URL, got '{api_url}'"),
            });
        }
        if !is_evm_address(&signer_address) {
            return Err(ConfigError::Invalid {
                var: ENV_SIGNER_ADDRESS,
                reason: "expected a 0x-prefixed 20-byte hex address".to_owned(),
            });
        }
        if !is_evm_address(&treasury_address) {
            return Err(ConfigError::Invalid {
                var: ENV_TREASURY_ADDRESS,
                reason: "expected a 0x-prefixed 20-byte hex address".to_owned(),
            });
        }

        Ok(Self {
            api_key,
            api_url: api_url.trim_end_matches('/').to_owned(),
            signer_address,
            signer_private_key,
            treasury_address,
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("signer_address", &self.signer_address)
            .field("signer_private_key", &"[REDACTED]")
            .field("treasury_address", &self.treasury_address)
            .finish()
    }
}
