//! Scripted wallet service for testing.
//!
//! [`MockWalletService`] returns pre-scripted responses per operation,
//! in order, and records every call it receives. Flow and tool tests
//! run against it instead of a live backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use koban::client::mock::{self, MockWalletService};
//!
//! let service = MockWalletService::new()
//!     .with_wallet(mock::provisioned_wallet("0x1111…", "0xf39F…"))
//!     .with_transaction(mock::pending_transaction("tx-1", "0xabc123"));
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use crate::chain::{Chain, WalletType};
use crate::error::{Error, Result};

use super::WalletService;
use super::types::{
    ProvisionedWallet, SigningRecord, SigningStatus, TokenBalance, Transaction, Wallet,
};

#[derive(Debug, Default)]
struct Script {
    wallets: VecDeque<Result<ProvisionedWallet>>,
    transactions: VecDeque<Result<Transaction>>,
    transfers: VecDeque<Result<Transaction>>,
    submissions: VecDeque<Result<Transaction>>,
    fetches: VecDeque<Result<Transaction>>,
    balances: VecDeque<Result<Vec<TokenBalance>>>,
    faucet: VecDeque<Result<()>>,
}

/// A wallet service that replays scripted responses.
///
/// Each operation consumes the next queued response for that
/// operation; an exhausted queue yields [`Error::Transport`] so an
/// over-eager caller fails loudly instead of hanging.
#[derive(Debug, Default)]
pub struct MockWalletService {
    script: Mutex<Script>,
    calls: Mutex<Vec<String>>,
}

impl MockWalletService {
    /// Create an empty mock with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn script_mut(&mut self) -> &mut Script {
        self.script.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a wallet-creation success.
    #[must_use]
    pub fn with_wallet(mut self, wallet: ProvisionedWallet) -> Self {
        self.script_mut().wallets.push_back(Ok(wallet));
        self
    }

    /// Queue a wallet-creation failure.
    #[must_use]
    pub fn with_wallet_error(mut self, error: Error) -> Self {
        self.script_mut().wallets.push_back(Err(error));
        self
    }

    /// Queue a transaction-creation success.
    #[must_use]
    pub fn with_transaction(mut self, transaction: Transaction) -> Self {
        self.script_mut().transactions.push_back(Ok(transaction));
        self
    }

    /// Queue a transaction-creation failure.
    #[must_use]
    pub fn with_transaction_error(mut self, error: Error) -> Self {
        self.script_mut().transactions.push_back(Err(error));
        self
    }

    /// Queue a transfer success.
    #[must_use]
    pub fn with_transfer(mut self, transaction: Transaction) -> Self {
        self.script_mut().transfers.push_back(Ok(transaction));
        self
    }

    /// Queue a transfer failure.
    #[must_use]
    pub fn with_transfer_error(mut self, error: Error) -> Self {
        self.script_mut().transfers.push_back(Err(error));
        self
    }

    /// Queue a signature-submission success.
    #[must_use]
    pub fn with_submission(mut self, transaction: Transaction) -> Self {
        self.script_mut().submissions.push_back(Ok(transaction));
        self
    }

    /// Queue a signature-submission failure.
    #[must_use]
    pub fn with_submission_error(mut self, error: Error) -> Self {
        self.script_mut().submissions.push_back(Err(error));
        self
    }

    /// Queue a transaction-fetch success.
    #[must_use]
    pub fn with_fetch(mut self, transaction: Transaction) -> Self {
        self.script_mut().fetches.push_back(Ok(transaction));
        self
    }

    /// Queue a transaction-fetch failure.
    #[must_use]
    pub fn with_fetch_error(mut self, error: Error) -> Self {
        self.script_mut().fetches.push_back(Err(error));
        self
    }

    /// Queue a balance listing.
    #[must_use]
    pub fn with_balances(mut self, balances: Vec<TokenBalance>) -> Self {
        self.script_mut().balances.push_back(Ok(balances));
        self
    }

    /// Queue a faucet grant.
    #[must_use]
    pub fn with_faucet_grant(mut self) -> Self {
        self.script_mut().faucet.push_back(Ok(()));
        self
    }

    /// Queue a faucet failure.
    #[must_use]
    pub fn with_faucet_error(mut self, error: Error) -> Self {
        self.script_mut().faucet.push_back(Err(error));
        self
    }

    /// Every call received so far, in order, as `"method arg…"` lines.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: String) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn pop<T>(queue: &mut VecDeque<Result<T>>, operation: &str) -> Result<T> {
        queue.pop_front().unwrap_or_else(|| {
            Err(Error::transport(format!(
                "mock service has no scripted response left for {operation}"
            )))
        })
    }
}

#[async_trait]
impl WalletService for MockWalletService {
    async fn create_wallet(
        &self,
        wallet_type: WalletType,
        signer_address: &str,
    ) -> Result<ProvisionedWallet> {
        self.record(format!("create_wallet {wallet_type} {signer_address}"));
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        Self::pop(&mut script.wallets, "create_wallet")
    }

    async fn create_transaction(
        &self,
        wallet_address: &str,
        chain: &Chain,
    ) -> Result<Transaction> {
        self.record(format!("create_transaction {wallet_address} {chain}"));
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        Self::pop(&mut script.transactions, "create_transaction")
    }

    async fn transfer_tokens(
        &self,
        from_wallet: &str,
        to_wallet: &str,
        amount: f64,
        chain: &Chain,
    ) -> Result<Transaction> {
        self.record(format!(
            "transfer_tokens {from_wallet} {to_wallet} {amount} {chain}"
        ));
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        Self::pop(&mut script.transfers, "transfer_tokens")
    }

    async fn submit_signature(
        &self,
        wallet_address: &str,
        chain: &Chain,
        transaction_id: &str,
        signer_id: &str,
        signature: &str,
    ) -> Result<Transaction> {
        self.record(format!(
            "submit_signature {wallet_address} {chain} {transaction_id} {signer_id} {signature}"
        ));
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        Self::pop(&mut script.submissions, "submit_signature")
    }

    async fn get_transaction(
        &self,
        wallet_address: &str,
        chain: &Chain,
        transaction_id: &str,
    ) -> Result<Transaction> {
        self.record(format!(
            "get_transaction {wallet_address} {chain} {transaction_id}"
        ));
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        Self::pop(&mut script.fetches, "get_transaction")
    }

    async fn token_balances(
        &self,
        wallet_address: &str,
        chain: &Chain,
    ) -> Result<Vec<TokenBalance>> {
        self.record(format!("token_balances {wallet_address} {chain}"));
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        Self::pop(&mut script.balances, "token_balances")
    }

    async fn request_faucet_funds(
        &self,
        wallet_address: &str,
        chain: &Chain,
        amount: f64,
    ) -> Result<()> {
        self.record(format!(
            "request_faucet_funds {wallet_address} {chain} {amount}"
        ));
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        Self::pop(&mut script.faucet, "request_faucet_funds")
    }
}

// ---------- Fixtures ----------

/// A provisioned EVM smart wallet at `address`, bound to
/// `signer_address`.
#[must_use]
pub fn provisioned_wallet(address: &str, signer_address: &str) -> ProvisionedWallet {
    ProvisionedWallet {
        wallet: Wallet {
            address: address.to_owned(),
            wallet_type: Some(WalletType::EvmSmartWallet.as_str().to_owned()),
            signer_address: Some(signer_address.to_owned()),
            config: None,
        },
        wallet_type: WalletType::EvmSmartWallet,
        signer_address: signer_address.to_owned(),
        requested_at: Utc::now(),
    }
}

/// A freshly built transaction with a pending signing record.
#[must_use]
pub fn pending_transaction(id: &str, operation_hash: &str) -> Transaction {
    Transaction {
        id: id.to_owned(),
        chain: Some(Chain::BaseSepolia.name().to_owned()),
        user_operation_hash: Some(operation_hash.to_owned()),
        signing_status: vec![SigningRecord {
            status: SigningStatus::Pending,
            signer_id: None,
            message: None,
        }],
        final_status: None,
    }
}

/// A built transaction whose operation hash never materialized.
#[must_use]
pub fn hashless_transaction(id: &str) -> Transaction {
    Transaction {
        id: id.to_owned(),
        chain: Some(Chain::BaseSepolia.name().to_owned()),
        user_operation_hash: None,
        signing_status: Vec::new(),
        final_status: None,
    }
}

/// A transaction whose first signing record is `completed`.
#[must_use]
pub fn submitted_transaction(id: &str) -> Transaction {
    Transaction {
        id: id.to_owned(),
        chain: Some(Chain::BaseSepolia.name().to_owned()),
        user_operation_hash: None,
        signing_status: vec![SigningRecord {
            status: SigningStatus::Completed,
            signer_id: None,
            message: None,
        }],
        final_status: None,
    }
}

/// A transaction that reached a terminal status.
#[must_use]
pub fn finalized_transaction(id: &str, final_status: &str) -> Transaction {
    Transaction {
        final_status: Some(json!(final_status)),
        ..submitted_transaction(id)
    }
}

/// A single USDC balance entry with the given hex value.
#[must_use]
pub fn usdc_balance_entry(balance_hex: &str) -> TokenBalance {
    TokenBalance {
        token: Some("usdc".to_owned()),
        contract_address: None,
        balance: balance_hex.to_owned(),
        decimals: None,
    }
}
