//! The multi-step smart-wallet signing flow.
//!
//! [`SigningFlow`] drives one transaction through the full pipeline:
//! provision a wallet, build a pending transaction, sign its operation
//! hash locally, submit the signature, and poll until the backend
//! reports a terminal status. Stages are strictly linear; the first
//! error short-circuits the run. Nothing retries and nothing rolls
//! back: the outcome is returned as a [`FlowReport`] value, never
//! raised past the stage boundary.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::chain::{Chain, WalletType};
use crate::client::WalletService;
use crate::client::types::ProvisionedWallet;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::registry::WalletRegistry;
use crate::signer;

/// Stages a run moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowStage {
    /// Wallet provisioned (or an existing wallet adopted).
    Created,
    /// Pending transaction built with a usable operation hash.
    TransactionBuilt,
    /// Operation hash signed locally.
    Signed,
    /// Signature accepted and recorded as `completed`.
    Submitted,
    /// Backend reported a terminal status.
    Verified,
}

impl FlowStage {
    /// The kebab-case name used in reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::TransactionBuilt => "transaction-built",
            Self::Signed => "signed",
            Self::Submitted => "submitted",
            Self::Verified => "verified",
        }
    }
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStatus {
    /// Every stage completed.
    Success,
    /// The flow stopped at the first failing stage.
    Error,
}

/// Bounded polling used by the verification stage.
///
/// One attempt is one status fetch; the flow sleeps `interval` between
/// attempts and gives up after `max_attempts`, reporting an explicit
/// timeout-exceeded failure instead of waiting forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause between status fetches.
    pub interval: Duration,
    /// Maximum number of status fetches.
    pub max_attempts: u32,
}

impl PollPolicy {
    /// Create a policy.
    #[must_use]
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 6)
    }
}

/// What the transaction-building stage creates.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOperation {
    /// Zero-value self-call, enough to exercise the signing pipeline.
    Templated,
    /// USDC transfer to another wallet, amount in human units.
    UsdcTransfer {
        /// Recipient wallet address.
        to: String,
        /// Amount in human units.
        amount: f64,
    },
}

/// Configuration of a signing flow run.
#[derive(Clone)]
pub struct FlowConfig {
    /// Wallet kind to provision.
    pub wallet_type: WalletType,
    /// External signer bound to the wallet.
    pub signer_address: String,
    /// Key controlling `signer_address`.
    pub signer_private_key: String,
    /// Chain to run on.
    pub chain: Chain,
    /// Verification polling policy.
    pub poll: PollPolicy,
    /// Transaction the flow builds.
    pub operation: FlowOperation,
}

impl FlowConfig {
    /// Configure a templated flow on the default chain.
    #[must_use]
    pub fn new(
        signer_address: impl Into<String>,
        signer_private_key: impl Into<String>,
    ) -> Self {
        Self {
            wallet_type: WalletType::EvmSmartWallet,
            signer_address: signer_address.into(),
            signer_private_key: signer_private_key.into(),
            chain: Chain::default(),
            poll: PollPolicy::default(),
            operation: FlowOperation::Templated,
        }
    }

    /// Configure from resolved [`Settings`].
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.signer_address.clone(),
            settings.signer_private_key.clone(),
        )
    }

    /// Set the chain.
    #[must_use]
    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.chain = chain;
        self
    }

    /// Set the polling policy.
    #[must_use]
    pub const fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Set the operation to build.
    #[must_use]
    pub fn with_operation(mut self, operation: FlowOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Set the wallet kind.
    #[must_use]
    pub const fn with_wallet_type(mut self, wallet_type: WalletType) -> Self {
        self.wallet_type = wallet_type;
        self
    }
}

impl fmt::Debug for FlowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowConfig")
            .field("wallet_type", &self.wallet_type)
            .field("signer_address", &self.signer_address)
            .field("signer_private_key", &"[REDACTED]")
            .field("chain", &self.chain)
            .field("poll", &self.poll)
            .field("operation", &self.operation)
            .finish()
    }
}

/// Artifacts collected while a run progresses.
///
/// Populated incrementally, so a failure report still carries
/// everything produced before the failing stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowData {
    /// Address of the wallet the flow operated on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    /// Id of the transaction the flow built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Operation hash that was signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_hash: Option<String>,
    /// Signature that was submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Terminal status reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_status: Option<Value>,
}

/// Error-as-value outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowReport {
    /// Overall outcome.
    pub status: FlowStatus,
    /// Human-readable summary; the error text on failure.
    pub message: String,
    /// When the run finished.
    pub timestamp: DateTime<Utc>,
    /// Deepest stage that completed; `None` when provisioning itself
    /// failed.
    pub stage_reached: Option<FlowStage>,
    /// Status fetches issued by the verification stage.
    pub poll_attempts: u32,
    /// Artifacts produced before the run ended.
    pub data: FlowData,
}

impl FlowReport {
    /// Whether the run completed every stage.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == FlowStatus::Success
    }
}

/// Orchestrator for the signing pipeline.
///
/// Generic over [`WalletService`] at the call site, so the same
/// pipeline runs against the live client and the scripted mock.
///
/// # Example
///
/// ```rust,ignore
/// use koban::flow::{FlowConfig, SigningFlow};
/// use koban::registry::WalletRegistry;
///
/// let flow = SigningFlow::new(FlowConfig::from_settings(&settings));
/// let mut registry = WalletRegistry::new();
/// let report = flow.run(&client, &mut registry).await;
/// assert!(report.is_success());
/// ```
#[derive(Debug, Clone)]
pub struct SigningFlow {
    config: FlowConfig,
}

struct Progress {
    stage: Option<FlowStage>,
    poll_attempts: u32,
    data: FlowData,
}

impl SigningFlow {
    /// Create a flow with the given configuration.
    #[must_use]
    pub const fn new(config: FlowConfig) -> Self {
        Self { config }
    }

    /// The flow's configuration.
    #[must_use]
    pub const fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Run the full pipeline, provisioning a fresh wallet first.
    ///
    /// The new wallet is recorded in `registry` as soon as the backend
    /// confirms it, whether or not later stages succeed.
    #[instrument(skip_all, fields(chain = %self.config.chain, wallet_type = %self.config.wallet_type))]
    pub async fn run<S>(&self, service: &S, registry: &mut WalletRegistry) -> FlowReport
    where
        S: WalletService + ?Sized,
    {
        let mut progress = Progress {
            stage: None,
            poll_attempts: 0,
            data: FlowData::default(),
        };

        let wallet = match service
            .create_wallet(self.config.wallet_type, &self.config.signer_address)
            .await
        {
            Ok(wallet) => wallet,
            Err(err) => return Self::report(&progress, Err(err)),
        };
        progress.stage = Some(FlowStage::Created);
        progress.data.wallet_address = Some(wallet.address().to_owned());
        info!(wallet = %wallet.address(), "wallet provisioned");
        registry.add(wallet.clone());

        let outcome = self.drive(service, &wallet, &mut progress).await;
        Self::report(&progress, outcome)
    }

    /// Run the pipeline against an already provisioned wallet.
    ///
    /// Skips the provisioning stage; the wallet counts as `created`.
    #[instrument(skip_all, fields(chain = %self.config.chain, wallet = %wallet.address()))]
    pub async fn run_for_wallet<S>(&self, service: &S, wallet: &ProvisionedWallet) -> FlowReport
    where
        S: WalletService + ?Sized,
    {
        let mut progress = Progress {
            stage: Some(FlowStage::Created),
            poll_attempts: 0,
            data: FlowData {
                wallet_address: Some(wallet.address().to_owned()),
                ..FlowData::default()
            },
        };

        let outcome = self.drive(service, wallet, &mut progress).await;
        Self::report(&progress, outcome)
    }

    /// Stages after provisioning: build, sign, submit, verify.
    async fn drive<S>(
        &self,
        service: &S,
        wallet: &ProvisionedWallet,
        progress: &mut Progress,
    ) -> Result<()>
    where
        S: WalletService + ?Sized,
    {
        let chain = &self.config.chain;
        let wallet_address = wallet.address();

        // Build a pending transaction.
        let transaction = match &self.config.operation {
            FlowOperation::Templated => {
                service.create_transaction(wallet_address, chain).await?
            }
            FlowOperation::UsdcTransfer { to, amount } => {
                service
                    .transfer_tokens(wallet_address, to, *amount, chain)
                    .await?
            }
        };
        progress.data.transaction_id = Some(transaction.id.clone());

        let Some(operation_hash) = transaction.operation_hash() else {
            return Err(Error::post_condition(format!(
                "transaction {} has no user operation hash to sign",
                transaction.id
            )));
        };
        progress.data.operation_hash = Some(operation_hash.to_owned());
        progress.stage = Some(FlowStage::TransactionBuilt);
        info!(transaction = %transaction.id, "transaction built");

        // Sign locally.
        let signature =
            signer::sign_operation_hash(&self.config.signer_private_key, operation_hash)?;
        progress.data.signature = Some(signature.clone());
        progress.stage = Some(FlowStage::Signed);
        debug!("operation hash signed");

        // Submit and require the signature to be recorded.
        let signer_id = self
            .config
            .wallet_type
            .signer_id(&self.config.signer_address);
        let submitted = service
            .submit_signature(
                wallet_address,
                chain,
                &transaction.id,
                &signer_id,
                &signature,
            )
            .await?;
        if !submitted.signing_completed() {
            let found = submitted
                .first_signing_record()
                .map_or("no signing record", |record| record.status.as_str());
            return Err(Error::post_condition(format!(
                "signature for transaction {} was not recorded: expected completed, found {found}",
                transaction.id
            )));
        }
        progress.stage = Some(FlowStage::Submitted);
        info!(transaction = %transaction.id, "signature recorded");

        // Verify with bounded polling.
        loop {
            progress.poll_attempts += 1;
            let current = service
                .get_transaction(wallet_address, chain, &transaction.id)
                .await?;

            if current.is_finalized() {
                progress.data.final_status = current.final_status;
                progress.stage = Some(FlowStage::Verified);
                info!(
                    transaction = %transaction.id,
                    attempts = progress.poll_attempts,
                    "transaction finalized"
                );
                return Ok(());
            }

            debug!(
                attempt = progress.poll_attempts,
                max = self.config.poll.max_attempts,
                "transaction not finalized yet"
            );
            if progress.poll_attempts >= self.config.poll.max_attempts {
                return Err(Error::post_condition(format!(
                    "transaction {} not finalized after {} polling attempts",
                    transaction.id, progress.poll_attempts
                )));
            }
            sleep(self.config.poll.interval).await;
        }
    }

    fn report(progress: &Progress, outcome: Result<()>) -> FlowReport {
        let (status, message) = match outcome {
            Ok(()) => (
                FlowStatus::Success,
                "signing flow completed".to_owned(),
            ),
            Err(err) => {
                warn!(error = %err, stage = ?progress.stage, "signing flow failed");
                (FlowStatus::Error, err.to_string())
            }
        };

        FlowReport {
            status,
            message,
            timestamp: Utc::now(),
            stage_reached: progress.stage,
            poll_attempts: progress.poll_attempts,
            data: progress.data.clone(),
        }
    }
}
