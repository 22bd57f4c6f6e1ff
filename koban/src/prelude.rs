//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types and traits for easy access.
//!
//! # Usage
//!
//! ```rust,ignore
//! use koban::prelude::*;
//! ```

pub use crate::agent::WalletAgent;
pub use crate::chain::{Chain, WalletType, is_evm_address};
pub use crate::client::types::{
    ContractCall, ProvisionedWallet, SigningRecord, SigningStatus, TokenBalance, Transaction,
    Wallet,
};
pub use crate::client::{
    SharedWalletService, WalletApiClient, WalletApiClientBuilder, WalletService,
};
pub use crate::config::{ConfigError, Settings};
pub use crate::error::{Error, Result, SignerError, ToolError};
pub use crate::flow::{
    FlowConfig, FlowData, FlowOperation, FlowReport, FlowStage, FlowStatus, PollPolicy,
    SigningFlow,
};
pub use crate::registry::WalletRegistry;
pub use crate::signer::{sign_operation_hash, signer_address};
pub use crate::token::{
    NATIVE_DECIMALS, USDC_DECIMALS, encode_transfer, from_base_units, to_base_units,
};
pub use crate::tool::{BoxedTool, DynTool, Tool, ToolBox, ToolDefinition, ToolResult};
pub use crate::tools::{ToolContext, WalletOp, create_tools, toolbox};
