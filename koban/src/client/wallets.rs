//! Wallet provisioning, balance, and faucet endpoints.

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::chain::{Chain, WalletType, is_evm_address};
use crate::error::{Error, Result};

use super::types::{CreateWalletRequest, FaucetRequest, ProvisionedWallet, TokenBalance, Wallet};
use super::{WalletApiClient, ensure_success, read_json};

impl WalletApiClient {
    /// Provision a wallet bound to an external signer.
    ///
    /// The signer binding is chosen by the wallet kind
    /// (`evm-keypair` / `solana-keypair`). EVM signer addresses are
    /// validated locally; nothing is sent when validation fails.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for a malformed signer address.
    /// - [`Error::Transport`] / [`Error::Backend`] per the usual wire
    ///   contract.
    #[instrument(skip(self, wallet_type), fields(wallet_type = %wallet_type))]
    pub async fn create_wallet(
        &self,
        wallet_type: WalletType,
        signer_address: &str,
    ) -> Result<ProvisionedWallet> {
        if signer_address.trim().is_empty() {
            return Err(Error::validation("signer address must not be empty"));
        }
        if wallet_type.is_evm() && !is_evm_address(signer_address) {
            return Err(Error::validation(format!(
                "invalid signer address '{signer_address}': expected a 0x-prefixed 20-byte hex address"
            )));
        }

        let body = CreateWalletRequest::new(wallet_type, signer_address);
        let requested_at = Utc::now();

        debug!("Sending wallet creation request");
        let response = self
            .http_client
            .post(format!("{}/wallets", self.base_url))
            .headers(self.auth_headers())
            .json(&body)
            .send()
            .await?;

        let wallet: Wallet = read_json(response).await?;
        info!(address = %wallet.address, "wallet created");

        Ok(ProvisionedWallet {
            wallet,
            wallet_type,
            signer_address: signer_address.to_owned(),
            requested_at,
        })
    }

    /// List the token balances held by a wallet.
    ///
    /// Balance values come back hex-encoded in base units; scale them
    /// with [`TokenBalance::human_amount`].
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] / [`Error::Backend`] per the usual wire
    /// contract.
    #[instrument(skip(self, chain), fields(chain = %chain))]
    pub async fn token_balances(
        &self,
        wallet_address: &str,
        chain: &Chain,
    ) -> Result<Vec<TokenBalance>> {
        debug!("Fetching token balances");
        let response = self
            .http_client
            .get(format!(
                "{}/wallets/{}:{}/tokens",
                self.base_url,
                chain.name(),
                wallet_address
            ))
            .headers(self.auth_headers())
            .send()
            .await?;

        read_json(response).await
    }

    /// Request test USDC from the faucet.
    ///
    /// The faucet endpoint takes no API key and only serves test
    /// networks.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for a mainnet chain or a non-positive
    ///   amount.
    /// - [`Error::Transport`] / [`Error::Backend`] per the usual wire
    ///   contract.
    #[instrument(skip(self, chain), fields(chain = %chain))]
    pub async fn request_faucet_funds(
        &self,
        wallet_address: &str,
        chain: &Chain,
        amount: f64,
    ) -> Result<()> {
        if !chain.is_testnet() {
            return Err(Error::validation(format!(
                "faucet funds are only available on test networks, not {chain}"
            )));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::validation(format!(
                "faucet amount must be positive, got {amount}"
            )));
        }

        let body = FaucetRequest {
            wallet_address: wallet_address.to_owned(),
            chain: chain.name().to_owned(),
            amount,
        };

        debug!("Requesting faucet funds");
        let response = self
            .http_client
            .post(format!("{}/faucet/usdc", self.base_url))
            .json(&body)
            .send()
            .await?;

        ensure_success(response).await?;
        info!(amount, "faucet request accepted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    // Points at a reserved TLD; validation must reject before any
    // connection is attempted.
    fn offline_client() -> WalletApiClient {
        WalletApiClient::new("test-key", "https://wallet-api.invalid").unwrap()
    }

    #[tokio::test]
    async fn evm_wallet_rejects_malformed_signer_locally() {
        let err = offline_client()
            .create_wallet(WalletType::EvmSmartWallet, "0x1234")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn empty_signer_is_rejected_locally() {
        let err = offline_client()
            .create_wallet(WalletType::SolanaCustodialWallet, "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn faucet_rejects_mainnet() {
        let err = offline_client()
            .request_faucet_funds("0x11", &Chain::Base, 100.0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("test networks"));
    }

    #[tokio::test]
    async fn faucet_rejects_non_positive_amount() {
        let client = offline_client();
        for amount in [0.0, -5.0, f64::NAN] {
            let err = client
                .request_faucet_funds("0x11", &Chain::BaseSepolia, amount)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
    }
}
