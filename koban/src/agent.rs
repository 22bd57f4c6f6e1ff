//! Dispatch front for the wallet tools.
//!
//! [`WalletAgent`] bundles a [`ToolContext`] with the toolbox built
//! from it and routes operation calls by name. The name is parsed into
//! the closed [`WalletOp`] set first, so nothing reaches a handler
//! unless the operation exists; argument validation then happens in
//! the tool's typed deserialization. The agent exposes the tool
//! definitions for function calling but wires no model client.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::client::SharedWalletService;
use crate::client::types::ProvisionedWallet;
use crate::config::Settings;
use crate::error::ToolError;
use crate::flow::{FlowConfig, FlowReport, SigningFlow};
use crate::tool::{ToolBox, ToolDefinition};
use crate::tools::{self, ToolContext, WalletOp};

/// Routes wallet operations to their tools over shared state.
pub struct WalletAgent {
    context: Arc<ToolContext>,
    tools: ToolBox,
}

impl WalletAgent {
    /// Create an agent over the given context.
    #[must_use]
    pub fn new(context: ToolContext) -> Self {
        let context = Arc::new(context);
        let tools = tools::toolbox(&context);
        Self { context, tools }
    }

    /// Create an agent from resolved [`Settings`].
    #[must_use]
    pub fn from_settings(service: SharedWalletService, settings: &Settings) -> Self {
        Self::new(ToolContext::from_settings(service, settings))
    }

    /// The shared context behind the tools.
    #[must_use]
    pub const fn context(&self) -> &Arc<ToolContext> {
        &self.context
    }

    /// Tool definitions in function-calling format.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.definitions()
    }

    /// The operations this agent dispatches.
    #[must_use]
    pub const fn operations(&self) -> &'static [WalletOp] {
        &WalletOp::ALL
    }

    /// Dispatch an operation by name with JSON arguments.
    ///
    /// Unknown names fail with [`ToolError::NotFound`] before any
    /// handler is consulted.
    pub async fn dispatch(&self, operation: &str, args: Value) -> Result<Value, ToolError> {
        let op = WalletOp::parse(operation).ok_or_else(|| ToolError::not_found(operation))?;
        self.tools.call(op.name(), args).await
    }

    /// Run the signing flow, recording the new wallet in the shared
    /// registry.
    pub async fn run_flow(&self, config: FlowConfig) -> FlowReport {
        let flow = SigningFlow::new(config);
        let mut registry = self.context.registry.write().await;
        flow.run(self.context.service.as_ref(), &mut registry)
            .await
    }

    /// Snapshot of the wallets provisioned this session.
    pub async fn wallets(&self) -> Vec<ProvisionedWallet> {
        self.context.wallets().await
    }
}

impl fmt::Debug for WalletAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletAgent")
            .field("context", &self.context)
            .field("tools", &self.tools)
            .finish()
    }
}
