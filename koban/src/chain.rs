//! Chain and wallet-type identifiers used by the wallet API.
//!
//! The backend addresses networks by kebab-case name (`base-sepolia`) in
//! URL paths, and restricts wallet creation to a closed set of wallet
//! kinds. Both sets live here, together with the signer-id convention
//! that ties an external keypair to a smart wallet.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Networks the wallet API can operate on.
///
/// Unknown names produce [`Chain::Custom`] so that new backend-supported
/// networks do not require a client release, at the cost of token-contract
/// lookups failing for them.
///
/// # Examples
///
/// ```rust,ignore
/// use koban::chain::Chain;
///
/// let chain = Chain::parse("base-sepolia");
/// assert_eq!(chain.name(), "base-sepolia");
/// assert!(chain.is_testnet());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Chain {
    /// Base Sepolia testnet.
    BaseSepolia,
    /// Base mainnet.
    Base,
    /// Ethereum Sepolia testnet.
    EthereumSepolia,
    /// Chain known to the backend but not to this client.
    Custom(String),
}

impl Chain {
    /// The kebab-case name used in API paths.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::BaseSepolia => "base-sepolia",
            Self::Base => "base",
            Self::EthereumSepolia => "ethereum-sepolia",
            Self::Custom(name) => name,
        }
    }

    /// Parse a chain from its API name.
    ///
    /// Never fails: unrecognized names become [`Chain::Custom`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "base-sepolia" => Self::BaseSepolia,
            "base" => Self::Base,
            "ethereum-sepolia" => Self::EthereumSepolia,
            other => Self::Custom(other.to_owned()),
        }
    }

    /// Whether this is a test network (faucet-eligible).
    #[must_use]
    pub fn is_testnet(&self) -> bool {
        matches!(self, Self::BaseSepolia | Self::EthereumSepolia)
            || self.name().ends_with("-sepolia")
    }

    /// The USDC token contract address on this chain, if known.
    #[must_use]
    pub const fn usdc_contract(&self) -> Option<&'static str> {
        match self {
            Self::BaseSepolia => Some("0x036CbD53842c5426634e7929541eC2318f3dCF7e"),
            Self::Base => Some("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
            Self::EthereumSepolia => Some("0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"),
            Self::Custom(_) => None,
        }
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::BaseSepolia
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The closed set of wallet kinds the backend can provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalletType {
    /// EVM smart-contract wallet driven by an external signer.
    EvmSmartWallet,
    /// Custodial wallet on Solana.
    SolanaCustodialWallet,
}

impl WalletType {
    /// All supported wallet kinds, in declaration order.
    pub const ALL: [Self; 2] = [Self::EvmSmartWallet, Self::SolanaCustodialWallet];

    /// The API name of this wallet kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EvmSmartWallet => "evm-smart-wallet",
            Self::SolanaCustodialWallet => "solana-custodial-wallet",
        }
    }

    /// Parse a wallet kind from its API name.
    ///
    /// # Errors
    ///
    /// Returns a [`Error::Validation`] when the name is not one of the
    /// supported kinds. No network call has been made at that point.
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "evm-smart-wallet" => Ok(Self::EvmSmartWallet),
            "solana-custodial-wallet" => Ok(Self::SolanaCustodialWallet),
            other => Err(Error::validation(format!(
                "invalid wallet type '{other}', must be one of: evm-smart-wallet, solana-custodial-wallet"
            ))),
        }
    }

    /// The signer config type the backend expects for this wallet kind.
    #[must_use]
    pub const fn signer_type(&self) -> &'static str {
        match self {
            Self::EvmSmartWallet => "evm-keypair",
            Self::SolanaCustodialWallet => "solana-keypair",
        }
    }

    /// The signer identifier submitted alongside a signature,
    /// conventionally `<signer type>-<signer address>`.
    #[must_use]
    pub fn signer_id(&self, signer_address: &str) -> String {
        format!("{}-{signer_address}", self.signer_type())
    }

    /// Whether this wallet kind lives on an EVM chain.
    #[must_use]
    pub const fn is_evm(&self) -> bool {
        matches!(self, Self::EvmSmartWallet)
    }
}

impl fmt::Display for WalletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that a value looks like a `0x`-prefixed 20-byte EVM address.
#[must_use]
pub fn is_evm_address(value: &str) -> bool {
    let Some(hex) = value.strip_prefix("0x") else {
        return false;
    };
    hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit())
}
