//! HTTP client for the wallet API.
//!
//! [`WalletApiClient`] owns a pooled [`reqwest::Client`], the static
//! API key, and the backend base URL. Endpoint methods live in
//! [`wallets`] and [`transactions`]; everything the signing flow needs
//! from the network is abstracted behind the [`WalletService`] trait so
//! the orchestrator can run against a scripted service in tests.

pub mod mock;
pub mod transactions;
pub mod types;
pub mod wallets;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::chain::{Chain, WalletType};
use crate::error::{Error, Result};
use crate::token::USDC_DECIMALS;

use self::types::{ProvisionedWallet, TokenBalance, Transaction};

/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the wallet-as-a-service API.
///
/// Cheap to clone; the HTTP connection pool is shared.
///
/// # Example
///
/// ```rust,ignore
/// use koban::client::WalletApiClient;
///
/// let client = WalletApiClient::builder("sk-...", "https://wallets.example.com/api/v1")
///     .timeout_secs(10)
///     .build()?;
/// ```
#[derive(Clone)]
pub struct WalletApiClient {
    pub(crate) http_client: reqwest::Client,
    api_key: HeaderValue,
    pub(crate) base_url: Arc<str>,
}

impl std::fmt::Debug for WalletApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletApiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl WalletApiClient {
    /// Create a client with the default timeout.
    ///
    /// # Errors
    ///
    /// Same contract as [`WalletApiClientBuilder::build`].
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Self::builder(api_key, base_url).build()
    }

    /// Create a client builder.
    ///
    /// The API key and base URL are always required; the backend has no
    /// default public endpoint.
    #[must_use]
    pub fn builder(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> WalletApiClientBuilder {
        WalletApiClientBuilder {
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create a client from resolved [`Settings`].
    ///
    /// [`Settings`]: crate::config::Settings
    ///
    /// # Errors
    ///
    /// Same contract as [`WalletApiClientBuilder::build`].
    pub fn from_settings(settings: &crate::config::Settings) -> Result<Self> {
        Self::new(settings.api_key.clone(), settings.api_url.clone())
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers for authenticated requests.
    pub(crate) fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, self.api_key.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

/// Builder for [`WalletApiClient`].
#[derive(Debug)]
pub struct WalletApiClientBuilder {
    api_key: String,
    base_url: String,
    timeout_secs: u64,
}

impl WalletApiClientBuilder {
    /// Set the per-request timeout in seconds.
    #[must_use]
    pub const fn timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = timeout;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the API key contains
    /// characters not permitted in an HTTP header, and
    /// [`Error::Transport`] when the HTTP client cannot be constructed.
    pub fn build(self) -> Result<WalletApiClient> {
        let mut api_key = HeaderValue::from_str(&self.api_key).map_err(|_| {
            Error::validation("API key contains characters not permitted in an HTTP header")
        })?;
        api_key.set_sensitive(true);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(WalletApiClient {
            http_client,
            api_key,
            base_url: self.base_url.trim_end_matches('/').into(),
        })
    }
}

/// Decode a response body, or surface a non-2xx status as
/// [`Error::Backend`] with the message mined from the error body.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(Error::backend_response(status.as_u16(), &body));
    }
    Ok(serde_json::from_str(&body)?)
}

/// Check a response for success, discarding any body.
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::backend_response(status.as_u16(), &body));
    }
    Ok(())
}

/// The network primitives the signing flow consumes.
///
/// [`WalletApiClient`] is the production implementation;
/// [`mock::MockWalletService`] scripts responses for tests.
#[async_trait]
pub trait WalletService: Send + Sync {
    /// Provision a wallet bound to an external signer.
    async fn create_wallet(
        &self,
        wallet_type: WalletType,
        signer_address: &str,
    ) -> Result<ProvisionedWallet>;

    /// Create a templated pending transaction and obtain its operation
    /// hash.
    async fn create_transaction(&self, wallet_address: &str, chain: &Chain)
    -> Result<Transaction>;

    /// Create a pending USDC transfer from one wallet to another.
    async fn transfer_tokens(
        &self,
        from_wallet: &str,
        to_wallet: &str,
        amount: f64,
        chain: &Chain,
    ) -> Result<Transaction>;

    /// Submit a signature for a pending transaction.
    async fn submit_signature(
        &self,
        wallet_address: &str,
        chain: &Chain,
        transaction_id: &str,
        signer_id: &str,
        signature: &str,
    ) -> Result<Transaction>;

    /// Fetch the current state of a transaction.
    async fn get_transaction(
        &self,
        wallet_address: &str,
        chain: &Chain,
        transaction_id: &str,
    ) -> Result<Transaction>;

    /// List token balances held by a wallet.
    async fn token_balances(
        &self,
        wallet_address: &str,
        chain: &Chain,
    ) -> Result<Vec<TokenBalance>>;

    /// Request test USDC from the faucet.
    async fn request_faucet_funds(
        &self,
        wallet_address: &str,
        chain: &Chain,
        amount: f64,
    ) -> Result<()>;

    /// The wallet's USDC balance in human units.
    ///
    /// Picks the USDC entry from [`token_balances`]; when the listing
    /// has exactly one entry it is taken as the USDC balance, matching
    /// how the backend reports faucet-funded test wallets.
    ///
    /// [`token_balances`]: WalletService::token_balances
    async fn usdc_balance(&self, wallet_address: &str, chain: &Chain) -> Result<f64> {
        let balances = self.token_balances(wallet_address, chain).await?;

        let entry = balances
            .iter()
            .find(|b| {
                b.is_token("usdc")
                    || chain
                        .usdc_contract()
                        .is_some_and(|contract| b.is_token(contract))
            })
            .or_else(|| (balances.len() == 1).then(|| &balances[0]))
            .ok_or_else(|| {
                Error::post_condition(format!(
                    "no USDC balance entry for wallet {wallet_address} on {chain}"
                ))
            })?;

        entry.human_amount(USDC_DECIMALS)
    }
}

#[async_trait]
impl WalletService for WalletApiClient {
    async fn create_wallet(
        &self,
        wallet_type: WalletType,
        signer_address: &str,
    ) -> Result<ProvisionedWallet> {
        self.create_wallet(wallet_type, signer_address).await
    }

    async fn create_transaction(
        &self,
        wallet_address: &str,
        chain: &Chain,
    ) -> Result<Transaction> {
        self.create_transaction(wallet_address, chain).await
    }

    async fn transfer_tokens(
        &self,
        from_wallet: &str,
        to_wallet: &str,
        amount: f64,
        chain: &Chain,
    ) -> Result<Transaction> {
        self.transfer_tokens(from_wallet, to_wallet, amount, chain)
            .await
    }

    async fn submit_signature(
        &self,
        wallet_address: &str,
        chain: &Chain,
        transaction_id: &str,
        signer_id: &str,
        signature: &str,
    ) -> Result<Transaction> {
        self.submit_signature(wallet_address, chain, transaction_id, signer_id, signature)
            .await
    }

    async fn get_transaction(
        &self,
        wallet_address: &str,
        chain: &Chain,
        transaction_id: &str,
    ) -> Result<Transaction> {
        self.get_transaction(wallet_address, chain, transaction_id)
            .await
    }

    async fn token_balances(
        &self,
        wallet_address: &str,
        chain: &Chain,
    ) -> Result<Vec<TokenBalance>> {
        self.token_balances(wallet_address, chain).await
    }

    async fn request_faucet_funds(
        &self,
        wallet_address: &str,
        chain: &Chain,
        amount: f64,
    ) -> Result<()> {
        self.request_faucet_funds(wallet_address, chain, amount)
            .await
    }
}

/// Shared handle used by the tool layer.
pub type SharedWalletService = Arc<dyn WalletService>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_base_url() {
        let client = WalletApiClient::builder("test-key", "https://custom.api.com/v1")
            .timeout_secs(10)
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "https://custom.api.com/v1");
    }

    #[test]
    fn builder_trims_trailing_slash() {
        let client = WalletApiClient::new("test-key", "https://custom.api.com/v1/").unwrap();
        assert_eq!(client.base_url(), "https://custom.api.com/v1");
    }

    #[test]
    fn invalid_api_key_is_validation_error() {
        let err = WalletApiClient::new("bad\nkey", "https://api.example.com").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = WalletApiClient::new("super-secret", "https://api.example.com").unwrap();
        let dump = format!("{client:?}");
        assert!(dump.contains("[REDACTED]"));
        assert!(!dump.contains("super-secret"));
    }

    #[test]
    fn auth_headers_carry_key_and_content_type() {
        let client = WalletApiClient::new("test-key", "https://api.example.com").unwrap();
        let headers = client.auth_headers();
        assert_eq!(
            headers.get(API_KEY_HEADER).map(|v| v.to_str().unwrap()),
            Some("test-key")
        );
        assert_eq!(
            headers.get(CONTENT_TYPE).map(|v| v.to_str().unwrap()),
            Some("application/json")
        );
    }
}
