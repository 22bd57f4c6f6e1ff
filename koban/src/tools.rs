//! Agent-callable tool implementations for the wallet operations.
//!
//! Each tool wraps a shared [`ToolContext`] and exposes one wallet
//! capability through the [`Tool`](crate::tool::Tool) interface.
//! Arguments are deserialized into typed structs before any handler
//! runs; the operation names form the closed [`WalletOp`] set.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::RwLock;

use crate::chain::{Chain, WalletType};
use crate::client::SharedWalletService;
use crate::client::types::ProvisionedWallet;
use crate::config::Settings;
use crate::error::ToolError;
use crate::flow::{FlowConfig, FlowOperation, FlowReport, PollPolicy, SigningFlow};
use crate::registry::WalletRegistry;
use crate::tool::{BoxedTool, Tool, ToolBox, ToolResult};

/// Faucet amount used when the caller does not pass one.
pub const DEFAULT_FAUCET_AMOUNT: f64 = 100.0;

/// The closed set of operation names the dispatch layer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletOp {
    /// Provision a new smart wallet.
    CreateWallet,
    /// Read a wallet's USDC balance.
    GetBalance,
    /// Request test USDC from the faucet.
    RequestFaucetFunds,
    /// Transfer USDC through the full signing pipeline.
    TransferTokens,
    /// Fetch a transaction's current state.
    GetTransactionStatus,
    /// List the wallets provisioned this session.
    ListWallets,
}

impl WalletOp {
    /// Every operation, in dispatch-table order.
    pub const ALL: [Self; 6] = [
        Self::CreateWallet,
        Self::GetBalance,
        Self::RequestFaucetFunds,
        Self::TransferTokens,
        Self::GetTransactionStatus,
        Self::ListWallets,
    ];

    /// The tool name of this operation.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateWallet => "create_wallet",
            Self::GetBalance => "get_balance",
            Self::RequestFaucetFunds => "request_faucet_funds",
            Self::TransferTokens => "transfer_tokens",
            Self::GetTransactionStatus => "get_transaction_status",
            Self::ListWallets => "list_wallets",
        }
    }

    /// Parse an operation name. Unknown names are rejected, not
    /// guessed at.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for WalletOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared state behind every wallet tool.
///
/// The registry sits behind an async lock because handlers are async;
/// the flows in this crate never contend on it.
pub struct ToolContext {
    /// Backend the tools talk to.
    pub service: SharedWalletService,
    /// Wallets provisioned this session.
    pub registry: Arc<RwLock<WalletRegistry>>,
    /// Signer bound to new wallets.
    pub signer_address: String,
    /// Key used by the transfer pipeline.
    pub signer_private_key: String,
    /// Chain used when the caller does not name one.
    pub default_chain: Chain,
    /// Fallback transfer destination.
    pub treasury_address: Option<String>,
    /// Polling policy for flows the tools run.
    pub poll: PollPolicy,
}

impl ToolContext {
    /// Create a context with an empty registry on the default chain.
    #[must_use]
    pub fn new(
        service: SharedWalletService,
        signer_address: impl Into<String>,
        signer_private_key: impl Into<String>,
    ) -> Self {
        Self {
            service,
            registry: Arc::new(RwLock::new(WalletRegistry::new())),
            signer_address: signer_address.into(),
            signer_private_key: signer_private_key.into(),
            default_chain: Chain::default(),
            treasury_address: None,
            poll: PollPolicy::default(),
        }
    }

    /// Create a context from resolved [`Settings`].
    #[must_use]
    pub fn from_settings(service: SharedWalletService, settings: &Settings) -> Self {
        Self::new(
            service,
            settings.signer_address.clone(),
            settings.signer_private_key.clone(),
        )
        .with_treasury(settings.treasury_address.clone())
    }

    /// Set the default chain.
    #[must_use]
    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.default_chain = chain;
        self
    }

    /// Set the fallback transfer destination.
    #[must_use]
    pub fn with_treasury(mut self, treasury_address: impl Into<String>) -> Self {
        self.treasury_address = Some(treasury_address.into());
        self
    }

    /// Share a registry with other owners, the flow runner usually.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<RwLock<WalletRegistry>>) -> Self {
        self.registry = registry;
        self
    }

    /// Set the polling policy for flows the tools run.
    #[must_use]
    pub const fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Snapshot of the wallets provisioned this session.
    pub async fn wallets(&self) -> Vec<ProvisionedWallet> {
        self.registry.read().await.iter().cloned().collect()
    }

    /// The wallet an operation targets: the explicit argument when
    /// given, otherwise the most recently provisioned wallet.
    async fn resolve_wallet(&self, requested: Option<&str>) -> ToolResult<String> {
        if let Some(address) = requested {
            let address = address.trim();
            if !address.is_empty() {
                return Ok(address.to_owned());
            }
        }
        self.registry
            .read()
            .await
            .latest()
            .map(|wallet| wallet.address().to_owned())
            .ok_or_else(|| {
                ToolError::invalid_args("no wallet available; create one first")
            })
    }

    fn resolve_chain(&self, requested: Option<&str>) -> Chain {
        requested.map_or_else(|| self.default_chain.clone(), Chain::parse)
    }
}

impl fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext")
            .field("signer_address", &self.signer_address)
            .field("signer_private_key", &"[REDACTED]")
            .field("default_chain", &self.default_chain)
            .field("treasury_address", &self.treasury_address)
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

/// Create every wallet tool from a shared context.
#[must_use]
pub fn create_tools(context: &Arc<ToolContext>) -> Vec<BoxedTool> {
    vec![
        // Provisioning & registry
        Box::new(CreateWalletTool(Arc::clone(context))),
        Box::new(ListWalletsTool(Arc::clone(context))),
        // Funds
        Box::new(GetBalanceTool(Arc::clone(context))),
        Box::new(RequestFaucetFundsTool(Arc::clone(context))),
        Box::new(TransferTokensTool(Arc::clone(context))),
        // Transaction inspection
        Box::new(GetTransactionStatusTool(Arc::clone(context))),
    ]
}

/// A toolbox holding every wallet tool.
#[must_use]
pub fn toolbox(context: &Arc<ToolContext>) -> ToolBox {
    let mut tools = ToolBox::new();
    for tool in create_tools(context) {
        tools.add_boxed(tool);
    }
    tools
}

/// Provision a new smart wallet bound to the configured signer.
#[derive(Debug)]
struct CreateWalletTool(Arc<ToolContext>);

#[derive(Debug, Deserialize)]
struct CreateWalletArgs {
    #[serde(default)]
    wallet_type: Option<String>,
}

#[async_trait]
impl Tool for CreateWalletTool {
    const NAME: &'static str = WalletOp::CreateWallet.name();
    type Args = CreateWalletArgs;
    type Output = Value;
    type Error = ToolError;

    fn description(&self) -> String {
        format!(
            "Create a new smart wallet bound to signer {}. \
             Returns the backend-assigned wallet address.",
            self.0.signer_address,
        )
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "wallet_type": {
                    "type": "string",
                    "enum": ["evm-smart-wallet", "solana-custodial-wallet"],
                    "description": "Wallet kind to provision. Defaults to evm-smart-wallet."
                }
            },
            "required": [],
            "additionalProperties": false
        })
    }

    async fn call(&self, args: Self::Args) -> ToolResult<Value> {
        let wallet_type = match args.wallet_type.as_deref() {
            Some(raw) => WalletType::parse(raw)?,
            None => WalletType::EvmSmartWallet,
        };

        let wallet = self
            .0
            .service
            .create_wallet(wallet_type, &self.0.signer_address)
            .await?;
        self.0.registry.write().await.add(wallet.clone());

        Ok(json!({
            "status": "success",
            "timestamp": Utc::now(),
            "wallet": {
                "address": wallet.address(),
                "type": wallet.wallet_type.as_str(),
                "signerAddress": wallet.signer_address,
            }
        }))
    }
}

/// List the wallets provisioned this session.
#[derive(Debug)]
struct ListWalletsTool(Arc<ToolContext>);

#[derive(Debug, Default, Deserialize)]
struct ListWalletsArgs {}

#[async_trait]
impl Tool for ListWalletsTool {
    const NAME: &'static str = WalletOp::ListWallets.name();
    type Args = ListWalletsArgs;
    type Output = Value;
    type Error = ToolError;

    fn description(&self) -> String {
        "List the wallets created this session, newest last.".to_owned()
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": [],
            "additionalProperties": false
        })
    }

    async fn call(&self, _args: Self::Args) -> ToolResult<Value> {
        let registry = self.0.registry.read().await;
        let wallets: Vec<Value> = registry
            .iter()
            .map(|wallet| {
                json!({
                    "address": wallet.address(),
                    "type": wallet.wallet_type.as_str(),
                    "signerAddress": wallet.signer_address,
                    "requestedAt": wallet.requested_at,
                })
            })
            .collect();

        Ok(json!({
            "status": "success",
            "timestamp": Utc::now(),
            "count": wallets.len(),
            "wallets": wallets,
        }))
    }
}

/// Read a wallet's USDC balance in human units.
#[derive(Debug)]
struct GetBalanceTool(Arc<ToolContext>);

#[derive(Debug, Deserialize)]
struct GetBalanceArgs {
    #[serde(default)]
    wallet_address: Option<String>,
    #[serde(default)]
    chain: Option<String>,
}

#[async_trait]
impl Tool for GetBalanceTool {
    const NAME: &'static str = WalletOp::GetBalance.name();
    type Args = GetBalanceArgs;
    type Output = Value;
    type Error = ToolError;

    fn description(&self) -> String {
        format!(
            "Get a wallet's USDC balance on {} (human units, not base units). \
             Omit wallet_address to use the most recently created wallet.",
            self.0.default_chain,
        )
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "wallet_address": {
                    "type": "string",
                    "description": "Wallet to query. Omit for the most recently created wallet."
                },
                "chain": {
                    "type": "string",
                    "description": "Chain name, e.g. base-sepolia. Omit for the default chain."
                }
            },
            "required": [],
            "additionalProperties": false
        })
    }

    async fn call(&self, args: Self::Args) -> ToolResult<Value> {
        let address = self.0.resolve_wallet(args.wallet_address.as_deref()).await?;
        let chain = self.0.resolve_chain(args.chain.as_deref());
        let balance = self.0.service.usdc_balance(&address, &chain).await?;

        Ok(json!({
            "status": "success",
            "timestamp": Utc::now(),
            "walletAddress": address,
            "chain": chain.name(),
            "token": "USDC",
            "balance": balance,
        }))
    }
}

/// Request test USDC from the faucet.
#[derive(Debug)]
struct RequestFaucetFundsTool(Arc<ToolContext>);

#[derive(Debug, Deserialize)]
struct RequestFaucetFundsArgs {
    #[serde(default)]
    wallet_address: Option<String>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    chain: Option<String>,
}

#[async_trait]
impl Tool for RequestFaucetFundsTool {
    const NAME: &'static str = WalletOp::RequestFaucetFunds.name();
    type Args = RequestFaucetFundsArgs;
    type Output = Value;
    type Error = ToolError;

    fn description(&self) -> String {
        format!(
            "Request test USDC from the faucet for a wallet on {}. \
             Test networks only.",
            self.0.default_chain,
        )
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "wallet_address": {
                    "type": "string",
                    "description": "Wallet to fund. Omit for the most recently created wallet."
                },
                "amount": {
                    "type": "number",
                    "description": "USDC amount in human units. Defaults to 100."
                },
                "chain": {
                    "type": "string",
                    "description": "Chain name, e.g. base-sepolia. Omit for the default chain."
                }
            },
            "required": [],
            "additionalProperties": false
        })
    }

    async fn call(&self, args: Self::Args) -> ToolResult<Value> {
        let address = self.0.resolve_wallet(args.wallet_address.as_deref()).await?;
        let chain = self.0.resolve_chain(args.chain.as_deref());
        let amount = args.amount.unwrap_or(DEFAULT_FAUCET_AMOUNT);

        self.0
            .service
            .request_faucet_funds(&address, &chain, amount)
            .await?;

        Ok(json!({
            "status": "success",
            "timestamp": Utc::now(),
            "walletAddress": address,
            "chain": chain.name(),
            "amount": amount,
            "message": "faucet funds requested",
        }))
    }
}

/// Transfer USDC through the full build-sign-submit-verify pipeline.
#[derive(Debug)]
struct TransferTokensTool(Arc<ToolContext>);

#[derive(Debug, Deserialize)]
struct TransferTokensArgs {
    amount: f64,
    #[serde(default)]
    to_wallet: Option<String>,
    #[serde(default)]
    from_wallet: Option<String>,
    #[serde(default)]
    chain: Option<String>,
}

#[async_trait]
impl Tool for TransferTokensTool {
    const NAME: &'static str = WalletOp::TransferTokens.name();
    type Args = TransferTokensArgs;
    type Output = FlowReport;
    type Error = ToolError;

    fn description(&self) -> String {
        format!(
            "Transfer USDC from a registered wallet on {}. Builds the \
             transfer, signs its operation hash, submits the signature, \
             and waits for finalization. Returns the flow report.",
            self.0.default_chain,
        )
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "amount": {
                    "type": "number",
                    "description": "USDC amount in human units."
                },
                "to_wallet": {
                    "type": "string",
                    "description": "Recipient address. Omit to use the treasury wallet."
                },
                "from_wallet": {
                    "type": "string",
                    "description": "Source wallet; must be in the registry. Omit for the most recently created wallet."
                },
                "chain": {
                    "type": "string",
                    "description": "Chain name, e.g. base-sepolia. Omit for the default chain."
                }
            },
            "required": ["amount"],
            "additionalProperties": false
        })
    }

    async fn call(&self, args: Self::Args) -> ToolResult<FlowReport> {
        let from = self.0.resolve_wallet(args.from_wallet.as_deref()).await?;
        let to = args
            .to_wallet
            .or_else(|| self.0.treasury_address.clone())
            .ok_or_else(|| {
                ToolError::invalid_args(
                    "no recipient: pass to_wallet or configure a treasury address",
                )
            })?;

        let wallet = self
            .0
            .registry
            .read()
            .await
            .find(&from)
            .cloned()
            .ok_or_else(|| {
                ToolError::invalid_args(format!("wallet {from} is not in the registry"))
            })?;

        let chain = self.0.resolve_chain(args.chain.as_deref());
        let config = FlowConfig::new(
            self.0.signer_address.clone(),
            self.0.signer_private_key.clone(),
        )
        .with_chain(chain)
        .with_poll(self.0.poll)
        .with_operation(FlowOperation::UsdcTransfer {
            to,
            amount: args.amount,
        });

        let flow = SigningFlow::new(config);
        Ok(flow.run_for_wallet(self.0.service.as_ref(), &wallet).await)
    }
}

/// Fetch a transaction's current signing and finalization state.
#[derive(Debug)]
struct GetTransactionStatusTool(Arc<ToolContext>);

#[derive(Debug, Deserialize)]
struct GetTransactionStatusArgs {
    transaction_id: String,
    #[serde(default)]
    wallet_address: Option<String>,
    #[serde(default)]
    chain: Option<String>,
}

#[async_trait]
impl Tool for GetTransactionStatusTool {
    const NAME: &'static str = WalletOp::GetTransactionStatus.name();
    type Args = GetTransactionStatusArgs;
    type Output = Value;
    type Error = ToolError;

    fn description(&self) -> String {
        "Get a transaction's signing records and final status by id.".to_owned()
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "transaction_id": {
                    "type": "string",
                    "description": "Backend-assigned transaction id."
                },
                "wallet_address": {
                    "type": "string",
                    "description": "Wallet the transaction belongs to. Omit for the most recently created wallet."
                },
                "chain": {
                    "type": "string",
                    "description": "Chain name, e.g. base-sepolia. Omit for the default chain."
                }
            },
            "required": ["transaction_id"],
            "additionalProperties": false
        })
    }

    async fn call(&self, args: Self::Args) -> ToolResult<Value> {
        let address = self.0.resolve_wallet(args.wallet_address.as_deref()).await?;
        let chain = self.0.resolve_chain(args.chain.as_deref());
        let transaction = self
            .0
            .service
            .get_transaction(&address, &chain, &args.transaction_id)
            .await?;

        Ok(json!({
            "status": "success",
            "timestamp": Utc::now(),
            "transaction": transaction,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::client::mock::{
        MockWalletService, finalized_transaction, pending_transaction, provisioned_wallet,
        submitted_transaction, usdc_balance_entry,
    };
    use std::time::Duration;

    const SIGNER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const WALLET: &str = "0x1111111111111111111111111111111111111111";
    const TREASURY: &str = "0x3333333333333333333333333333333333333333";
    const HASH: &str = "0x7c9fb5b5cbcb2fd531a5bdae5b7ea03b6c4045b3a1f90cf979ab95a1052a925d";

    fn context_with(service: Arc<MockWalletService>) -> Arc<ToolContext> {
        let shared: SharedWalletService = service;
        Arc::new(
            ToolContext::new(shared, SIGNER, KEY)
                .with_poll(PollPolicy::new(Duration::ZERO, 6)),
        )
    }

    async fn seed_wallet(context: &Arc<ToolContext>) {
        context
            .registry
            .write()
            .await
            .add(provisioned_wallet(WALLET, SIGNER));
    }

    mod wallet_op {
        use super::*;

        #[test]
        fn parse_accepts_every_name() {
            for op in WalletOp::ALL {
                assert_eq!(WalletOp::parse(op.name()), Some(op));
            }
        }

        #[test]
        fn parse_is_case_insensitive_and_trims() {
            assert_eq!(
                WalletOp::parse("  Create_Wallet "),
                Some(WalletOp::CreateWallet)
            );
        }

        #[test]
        fn parse_rejects_unknown_names() {
            assert_eq!(WalletOp::parse("mint_nft"), None);
            assert_eq!(WalletOp::parse(""), None);
        }

        #[test]
        fn display_matches_name() {
            assert_eq!(WalletOp::GetBalance.to_string(), "get_balance");
        }
    }

    mod context {
        use super::*;

        #[test]
        fn debug_redacts_private_key() {
            let service = Arc::new(MockWalletService::new());
            let context = context_with(service);
            let dump = format!("{context:?}");
            assert!(dump.contains("[REDACTED]"));
            assert!(!dump.contains("ac0974bec"));
        }

        #[tokio::test]
        async fn wallets_snapshot_reflects_registry() {
            let service = Arc::new(MockWalletService::new());
            let context = context_with(service);
            assert!(context.wallets().await.is_empty());

            seed_wallet(&context).await;
            let wallets = context.wallets().await;
            assert_eq!(wallets.len(), 1);
            assert_eq!(wallets[0].address(), WALLET);
        }
    }

    mod factory {
        use super::*;

        #[test]
        fn create_tools_covers_every_operation() {
            let service = Arc::new(MockWalletService::new());
            let context = context_with(service);
            let tools = create_tools(&context);

            assert_eq!(tools.len(), WalletOp::ALL.len());
            for op in WalletOp::ALL {
                assert!(
                    tools.iter().any(|tool| tool.name() == op.name()),
                    "missing tool for {op}"
                );
            }
        }

        #[test]
        fn schemas_forbid_unknown_keys() {
            let service = Arc::new(MockWalletService::new());
            let context = context_with(service);
            for tool in create_tools(&context) {
                let def = tool.definition();
                assert_eq!(
                    def.parameters.get("additionalProperties"),
                    Some(&Value::Bool(false)),
                    "schema of {} admits unknown keys",
                    def.name,
                );
            }
        }

        #[test]
        fn toolbox_holds_every_tool() {
            let service = Arc::new(MockWalletService::new());
            let context = context_with(service);
            let tools = toolbox(&context);
            assert_eq!(tools.len(), WalletOp::ALL.len());
            assert!(tools.contains("create_wallet"));
        }
    }

    mod create_wallet {
        use super::*;

        #[tokio::test]
        async fn provisions_and_registers() {
            let service = Arc::new(
                MockWalletService::new().with_wallet(provisioned_wallet(WALLET, SIGNER)),
            );
            let context = context_with(Arc::clone(&service));
            let tool = CreateWalletTool(Arc::clone(&context));

            let out = Tool::call_json(&tool, json!({})).await.unwrap();

            assert_eq!(out["status"], "success");
            assert_eq!(out["wallet"]["address"], WALLET);
            assert_eq!(out["wallet"]["type"], "evm-smart-wallet");
            assert_eq!(context.registry.read().await.count(), 1);
        }

        #[tokio::test]
        async fn rejects_unknown_wallet_type_before_any_call() {
            let service = Arc::new(MockWalletService::new());
            let context = context_with(Arc::clone(&service));
            let tool = CreateWalletTool(context);

            let err = Tool::call_json(&tool, json!({"wallet_type": "bitcoin-wallet"}))
                .await
                .unwrap_err();

            assert!(matches!(err, ToolError::InvalidArguments(_)));
            assert!(service.calls().is_empty());
        }
    }

    mod get_balance {
        use super::*;

        #[tokio::test]
        async fn requires_a_wallet() {
            let service = Arc::new(MockWalletService::new());
            let context = context_with(service);
            let tool = GetBalanceTool(context);

            let err = Tool::call_json(&tool, json!({})).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments(_)));
            assert!(err.to_string().contains("create one first"));
        }

        #[tokio::test]
        async fn reads_the_latest_wallet_by_default() {
            // 0x5f5e100 = 100_000_000 base units = 100 USDC.
            let service = Arc::new(
                MockWalletService::new().with_balances(vec![usdc_balance_entry("0x5f5e100")]),
            );
            let context = context_with(Arc::clone(&service));
            seed_wallet(&context).await;
            let tool = GetBalanceTool(context);

            let out = Tool::call_json(&tool, json!({})).await.unwrap();

            assert_eq!(out["status"], "success");
            assert_eq!(out["walletAddress"], WALLET);
            assert_eq!(out["balance"], 100.0);
            assert!(service.calls()[0].starts_with("token_balances"));
        }
    }

    mod request_faucet_funds {
        use super::*;

        #[tokio::test]
        async fn defaults_to_one_hundred_usdc() {
            let service = Arc::new(MockWalletService::new().with_faucet_grant());
            let context = context_with(Arc::clone(&service));
            seed_wallet(&context).await;
            let tool = RequestFaucetFundsTool(context);

            let out = Tool::call_json(&tool, json!({})).await.unwrap();

            assert_eq!(out["status"], "success");
            assert_eq!(out["amount"], DEFAULT_FAUCET_AMOUNT);
            assert!(service.calls()[0].contains("100"));
        }

        #[tokio::test]
        async fn passes_explicit_amount_through() {
            let service = Arc::new(MockWalletService::new().with_faucet_grant());
            let context = context_with(Arc::clone(&service));
            seed_wallet(&context).await;
            let tool = RequestFaucetFundsTool(context);

            let out = Tool::call_json(&tool, json!({"amount": 25.0}))
                .await
                .unwrap();
            assert_eq!(out["amount"], 25.0);
        }
    }

    mod transfer_tokens {
        use super::*;

        #[tokio::test]
        async fn runs_the_full_pipeline() {
            let service = Arc::new(
                MockWalletService::new()
                    .with_transfer(pending_transaction("tx-7", HASH))
                    .with_submission(submitted_transaction("tx-7"))
                    .with_fetch(finalized_transaction("tx-7", "success")),
            );
            let context = context_with(Arc::clone(&service));
            seed_wallet(&context).await;
            let tool = TransferTokensTool(context);

            let out = Tool::call_json(&tool, json!({"amount": 50.0, "to_wallet": TREASURY}))
                .await
                .unwrap();

            assert_eq!(out["status"], "success");
            assert_eq!(out["data"]["transaction_id"], "tx-7");

            let calls = service.calls();
            assert!(calls[0].starts_with("transfer_tokens"));
            assert!(calls[0].contains(TREASURY));
            assert!(calls[0].contains("50"));
        }

        #[tokio::test]
        async fn falls_back_to_the_treasury_recipient() {
            let service = Arc::new(
                MockWalletService::new()
                    .with_transfer(pending_transaction("tx-8", HASH))
                    .with_submission(submitted_transaction("tx-8"))
                    .with_fetch(finalized_transaction("tx-8", "success")),
            );
            let shared: SharedWalletService = service.clone();
            let context = Arc::new(
                ToolContext::new(shared, SIGNER, KEY)
                    .with_treasury(TREASURY)
                    .with_poll(PollPolicy::new(Duration::ZERO, 6)),
            );
            seed_wallet(&context).await;
            let tool = TransferTokensTool(context);

            Tool::call_json(&tool, json!({"amount": 10.0})).await.unwrap();
            assert!(service.calls()[0].contains(TREASURY));
        }

        #[tokio::test]
        async fn rejects_when_no_recipient_is_known() {
            let service = Arc::new(MockWalletService::new());
            let context = context_with(service);
            seed_wallet(&context).await;
            let tool = TransferTokensTool(context);

            let err = Tool::call_json(&tool, json!({"amount": 10.0}))
                .await
                .unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments(_)));
            assert!(err.to_string().contains("treasury"));
        }

        #[tokio::test]
        async fn rejects_unregistered_source_wallets() {
            let service = Arc::new(MockWalletService::new());
            let context = context_with(service);
            seed_wallet(&context).await;
            let tool = TransferTokensTool(context);

            let err = Tool::call_json(
                &tool,
                json!({
                    "amount": 10.0,
                    "to_wallet": TREASURY,
                    "from_wallet": "0x9999999999999999999999999999999999999999"
                }),
            )
            .await
            .unwrap_err();

            assert!(err.to_string().contains("not in the registry"));
        }
    }

    mod get_transaction_status {
        use super::*;

        #[tokio::test]
        async fn returns_the_transaction_verbatim() {
            let service = Arc::new(
                MockWalletService::new().with_fetch(finalized_transaction("tx-4", "success")),
            );
            let context = context_with(Arc::clone(&service));
            seed_wallet(&context).await;
            let tool = GetTransactionStatusTool(context);

            let out = Tool::call_json(&tool, json!({"transaction_id": "tx-4"}))
                .await
                .unwrap();

            assert_eq!(out["status"], "success");
            assert_eq!(out["transaction"]["id"], "tx-4");
            assert_eq!(out["transaction"]["finalStatus"], "success");
        }

        #[tokio::test]
        async fn requires_a_transaction_id() {
            let service = Arc::new(MockWalletService::new());
            let context = context_with(service);
            seed_wallet(&context).await;
            let tool = GetTransactionStatusTool(context);

            let err = Tool::call_json(&tool, json!({})).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments(_)));
        }
    }

    mod list_wallets {
        use super::*;

        #[tokio::test]
        async fn empty_registry_lists_nothing() {
            let service = Arc::new(MockWalletService::new());
            let context = context_with(service);
            let tool = ListWalletsTool(context);

            let out = Tool::call_json(&tool, json!({})).await.unwrap();
            assert_eq!(out["count"], 0);
        }

        #[tokio::test]
        async fn lists_registered_wallets_in_order() {
            let service = Arc::new(MockWalletService::new());
            let context = context_with(service);
            seed_wallet(&context).await;
            context
                .registry
                .write()
                .await
                .add(provisioned_wallet(TREASURY, SIGNER));
            let tool = ListWalletsTool(context);

            let out = Tool::call_json(&tool, json!({})).await.unwrap();
            assert_eq!(out["count"], 2);
            assert_eq!(out["wallets"][0]["address"], WALLET);
            assert_eq!(out["wallets"][1]["address"], TREASURY);
        }
    }
}
