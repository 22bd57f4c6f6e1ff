//! Transaction building, signature submission, and status endpoints.

use tracing::{debug, info, instrument};

use crate::chain::{Chain, is_evm_address};
use crate::error::{Error, Result};
use crate::token::{self, USDC_DECIMALS};

use super::types::{
    ContractCall, CreateTransactionRequest, SubmitSignaturesRequest, Transaction,
};
use super::{WalletApiClient, read_json};

impl WalletApiClient {
    /// Create a templated pending transaction.
    ///
    /// Issues a zero-value self-call with empty calldata, enough to get
    /// a pending operation whose hash the signer can work on.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] / [`Error::Backend`] per the usual wire
    /// contract.
    #[instrument(skip(self, chain), fields(chain = %chain))]
    pub async fn create_transaction(
        &self,
        wallet_address: &str,
        chain: &Chain,
    ) -> Result<Transaction> {
        let body = CreateTransactionRequest::single_call(ContractCall {
            to: wallet_address.to_owned(),
            value: "0".to_owned(),
            data: "0x".to_owned(),
        });

        self.post_transaction(wallet_address, chain, &body).await
    }

    /// Create a pending USDC transfer between two wallets.
    ///
    /// Encodes `transfer(to, amount)` against the chain's USDC contract
    /// and submits it as a single-call operation from `from_wallet`.
    /// `amount` is in human units.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for an unsupported chain, a malformed
    ///   address, or a non-scalable amount.
    /// - [`Error::Transport`] / [`Error::Backend`] per the usual wire
    ///   contract.
    #[instrument(skip(self, chain), fields(chain = %chain))]
    pub async fn transfer_tokens(
        &self,
        from_wallet: &str,
        to_wallet: &str,
        amount: f64,
        chain: &Chain,
    ) -> Result<Transaction> {
        let token_contract = chain.usdc_contract().ok_or_else(|| {
            Error::validation(format!("no known USDC contract on chain {chain}"))
        })?;
        if !is_evm_address(from_wallet) {
            return Err(Error::validation(format!(
                "invalid source wallet '{from_wallet}': expected a 0x-prefixed 20-byte hex address"
            )));
        }

        let units = token::to_base_units(amount, USDC_DECIMALS)?;
        let data = token::encode_transfer(to_wallet, units)?;

        let body = CreateTransactionRequest::single_call(ContractCall {
            to: token_contract.to_owned(),
            value: "0".to_owned(),
            data,
        });

        debug!(amount, to = %to_wallet, "building USDC transfer");
        self.post_transaction(from_wallet, chain, &body).await
    }

    /// Submit a signature for a pending transaction.
    ///
    /// Post-condition: the returned transaction's first signing record
    /// must be `completed`. A 2xx response that does not satisfy it
    /// fails with [`Error::PostCondition`].
    ///
    /// # Errors
    ///
    /// - [`Error::PostCondition`] when the signature was accepted but
    ///   not recorded as `completed`.
    /// - [`Error::Transport`] / [`Error::Backend`] per the usual wire
    ///   contract.
    #[instrument(skip(self, chain, signature), fields(chain = %chain))]
    pub async fn submit_signature(
        &self,
        wallet_address: &str,
        chain: &Chain,
        transaction_id: &str,
        signer_id: &str,
        signature: &str,
    ) -> Result<Transaction> {
        let body = SubmitSignaturesRequest::single(signer_id, signature);

        debug!("Submitting signature");
        let response = self
            .http_client
            .post(format!(
                "{}/wallets/{}/transactions/{}/{}/signatures",
                self.base_url,
                wallet_address,
                chain.name(),
                transaction_id
            ))
            .headers(self.auth_headers())
            .json(&body)
            .send()
            .await?;

        let transaction: Transaction = read_json(response).await?;

        if !transaction.signing_completed() {
            let found = transaction
                .first_signing_record()
                .map_or("no signing record", |record| record.status.as_str());
            return Err(Error::post_condition(format!(
                "signature for transaction {transaction_id} was not recorded: expected completed, found {found}"
            )));
        }

        info!(transaction_id = %transaction.id, "signature recorded");
        Ok(transaction)
    }

    /// Fetch the current state of a transaction.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] / [`Error::Backend`] per the usual wire
    /// contract.
    #[instrument(skip(self, chain), fields(chain = %chain))]
    pub async fn get_transaction(
        &self,
        wallet_address: &str,
        chain: &Chain,
        transaction_id: &str,
    ) -> Result<Transaction> {
        debug!("Fetching transaction");
        let response = self
            .http_client
            .get(format!(
                "{}/wallets/{}/transactions/{}/{}",
                self.base_url,
                wallet_address,
                chain.name(),
                transaction_id
            ))
            .headers(self.auth_headers())
            .send()
            .await?;

        read_json(response).await
    }

    async fn post_transaction(
        &self,
        wallet_address: &str,
        chain: &Chain,
        body: &CreateTransactionRequest,
    ) -> Result<Transaction> {
        debug!("Creating transaction");
        let response = self
            .http_client
            .post(format!(
                "{}/wallets/{}/transactions/{}",
                self.base_url,
                wallet_address,
                chain.name()
            ))
            .headers(self.auth_headers())
            .json(body)
            .send()
            .await?;

        let transaction: Transaction = read_json(response).await?;
        info!(transaction_id = %transaction.id, "transaction created");
        Ok(transaction)
    }
}
