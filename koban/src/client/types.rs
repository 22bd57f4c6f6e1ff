//! Wire types for the wallet API.
//!
//! Field names are camelCase on the wire; structs here use snake_case
//! with serde renames. Response types deserialize leniently: fields the
//! flow does not depend on are optional, and unknown signing statuses
//! map to [`SigningStatus::Unknown`] instead of failing the response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::WalletType;
use crate::error::Error;
use crate::token;

// ---------- Wallet ----------

/// A provisioned wallet as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// Backend-assigned wallet address.
    pub address: String,
    /// Wallet kind echoed by the backend.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub wallet_type: Option<String>,
    /// Signer address when the backend reports it at the top level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_address: Option<String>,
    /// Nested signer binding echo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<WalletConfig>,
}

/// Nested `config` object of a wallet response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Signer binding, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<WalletSigner>,
}

/// Signer binding inside a wallet's `config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSigner {
    /// Signer kind, e.g. `evm-keypair`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub signer_type: Option<String>,
    /// Signer address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Wallet {
    /// The signer address, from the top-level field or the config echo.
    #[must_use]
    pub fn signer_address(&self) -> Option<&str> {
        self.signer_address
            .as_deref()
            .or_else(|| self.config.as_ref()?.signer.as_ref()?.address.as_deref())
    }
}

/// A wallet plus provisioning bookkeeping.
///
/// The backend response is kept verbatim in `wallet`; the requested
/// kind, signer, and timestamp are recorded alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionedWallet {
    /// Backend response, verbatim.
    pub wallet: Wallet,
    /// Wallet kind that was requested.
    pub wallet_type: WalletType,
    /// Signer address that was bound.
    pub signer_address: String,
    /// When the provisioning request was issued.
    pub requested_at: DateTime<Utc>,
}

impl ProvisionedWallet {
    /// The backend-assigned wallet address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.wallet.address
    }

    /// Adopt a wallet that already exists on the backend.
    ///
    /// Later flow stages can then run against a wallet provisioned in
    /// an earlier session without re-fetching it.
    #[must_use]
    pub fn existing(
        address: impl Into<String>,
        wallet_type: WalletType,
        signer_address: impl Into<String>,
    ) -> Self {
        let signer_address = signer_address.into();
        Self {
            wallet: Wallet {
                address: address.into(),
                wallet_type: Some(wallet_type.as_str().to_owned()),
                signer_address: Some(signer_address.clone()),
                config: None,
            },
            wallet_type,
            signer_address,
            requested_at: Utc::now(),
        }
    }
}

// ---------- Transaction ----------

/// Status of a single signing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningStatus {
    /// Awaiting a signature.
    Pending,
    /// Signature accepted.
    Completed,
    /// Signature rejected.
    Failed,
    /// Status string this client does not know.
    #[serde(other)]
    Unknown,
}

impl SigningStatus {
    /// The lowercase wire name of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SigningStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One per-signer entry of a transaction's `signingStatus` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningRecord {
    /// Signing state for this signer.
    pub status: SigningStatus,
    /// Signer the record belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_id: Option<String>,
    /// Backend-supplied detail, usually on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A pending or confirmed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Backend-assigned transaction id.
    pub id: String,
    /// Chain the transaction targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    /// Digest to sign; present once the operation is built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_operation_hash: Option<String>,
    /// Per-signer signing records.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signing_status: Vec<SigningRecord>,
    /// Terminal status; populated only after on-chain confirmation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_status: Option<Value>,
}

impl Transaction {
    /// The user operation hash, treating an empty string as absent.
    #[must_use]
    pub fn operation_hash(&self) -> Option<&str> {
        self.user_operation_hash
            .as_deref()
            .filter(|hash| !hash.is_empty())
    }

    /// The first signing record, the one submission is judged by.
    #[must_use]
    pub fn first_signing_record(&self) -> Option<&SigningRecord> {
        self.signing_status.first()
    }

    /// Whether the first signing record reached `completed`.
    #[must_use]
    pub fn signing_completed(&self) -> bool {
        self.first_signing_record()
            .is_some_and(|record| record.status == SigningStatus::Completed)
    }

    /// Whether the backend reported a terminal status.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.final_status.is_some()
    }
}

// ---------- Token balances ----------

/// One entry of the token-balance listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    /// Token symbol or identifier, e.g. `usdc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Token contract address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    /// Balance in base units, hex-encoded.
    pub balance: String,
    /// Token decimal count when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
}

impl TokenBalance {
    /// The balance scaled back to human units.
    ///
    /// `default_decimals` applies when the backend omits the decimal
    /// count (USDC listings commonly do).
    ///
    /// # Errors
    ///
    /// Returns [`Error::PostCondition`] when the balance value is not
    /// valid hex.
    pub fn human_amount(&self, default_decimals: u32) -> Result<f64, Error> {
        let units = token::parse_hex_balance(&self.balance)?;
        Ok(token::from_base_units(
            units,
            self.decimals.unwrap_or(default_decimals),
        ))
    }

    /// Whether this entry is the given token (case-insensitive symbol
    /// or contract address match).
    #[must_use]
    pub fn is_token(&self, needle: &str) -> bool {
        let matches = |value: &Option<String>| {
            value
                .as_deref()
                .is_some_and(|v| v.eq_ignore_ascii_case(needle))
        };
        matches(&self.token) || matches(&self.contract_address)
    }
}

// ---------- Requests ----------

/// Body of `POST /wallets`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateWalletRequest {
    /// Wallet kind to provision.
    #[serde(rename = "type")]
    pub wallet_type: WalletType,
    /// Signer binding for the new wallet.
    pub config: CreateWalletConfig,
}

/// `config` object of a wallet-creation request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateWalletConfig {
    /// Signer to authorize.
    pub signer: CreateWalletSigner,
}

/// `config.signer` object of a wallet-creation request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateWalletSigner {
    /// Keypair kind matching the wallet kind.
    #[serde(rename = "type")]
    pub signer_type: &'static str,
    /// External signer address.
    pub address: String,
}

impl CreateWalletRequest {
    /// Build the request for a wallet kind and signer address.
    #[must_use]
    pub fn new(wallet_type: WalletType, signer_address: impl Into<String>) -> Self {
        Self {
            wallet_type,
            config: CreateWalletConfig {
                signer: CreateWalletSigner {
                    signer_type: wallet_type.signer_type(),
                    address: signer_address.into(),
                },
            },
        }
    }
}

/// One call of a transaction-creation request.
#[derive(Debug, Clone, Serialize)]
pub struct ContractCall {
    /// Call target address.
    pub to: String,
    /// Native value in base units, decimal string.
    pub value: String,
    /// Calldata as `0x`-prefixed hex.
    pub data: String,
}

/// Body of `POST /wallets/{address}/transactions/{chain}`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTransactionRequest {
    /// Call batch parameters.
    pub params: TransactionParams,
}

/// `params` object of a transaction-creation request.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionParams {
    /// Calls the operation executes.
    pub calls: Vec<ContractCall>,
}

impl CreateTransactionRequest {
    /// Build a single-call request.
    #[must_use]
    pub fn single_call(call: ContractCall) -> Self {
        Self {
            params: TransactionParams { calls: vec![call] },
        }
    }
}

/// One entry of a signature-submission request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureEntry {
    /// Conventionally `<keypair type>-<signer address>`.
    pub signer_id: String,
    /// `0x`-prefixed hex signature.
    pub signature: String,
}

/// Body of `POST .../transactions/{chain}/{transactionId}/signatures`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitSignaturesRequest {
    /// Signatures to record; this client always submits one.
    pub signatures: Vec<SignatureEntry>,
}

impl SubmitSignaturesRequest {
    /// Build a single-signature request.
    #[must_use]
    pub fn single(signer_id: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            signatures: vec![SignatureEntry {
                signer_id: signer_id.into(),
                signature: signature.into(),
            }],
        }
    }
}

/// Body of `POST /faucet/usdc` (unauthenticated).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetRequest {
    /// Destination wallet.
    pub wallet_address: String,
    /// Chain to fund on.
    pub chain: String,
    /// Amount in human units.
    pub amount: f64,
}
