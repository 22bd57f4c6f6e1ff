//! Explicit wallet repository.
//!
//! Provisioned wallets are tracked in a [`WalletRegistry`] owned by the
//! caller and passed to whatever needs it, instead of hiding in an
//! agent's instance state. The registry is plain synchronous data; the
//! tool layer wraps it in a lock where handlers run concurrently.

use crate::client::types::ProvisionedWallet;

/// Ordered collection of wallets provisioned during a run.
///
/// Entries append in provisioning order. Lookups resolve the most
/// recently added entry for an address, so re-provisioning a wallet
/// shadows the stale record.
#[derive(Debug, Clone, Default)]
pub struct WalletRegistry {
    wallets: Vec<ProvisionedWallet>,
}

impl WalletRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a provisioned wallet.
    pub fn add(&mut self, wallet: ProvisionedWallet) {
        self.wallets.push(wallet);
    }

    /// Look up a wallet by address, case-insensitively.
    ///
    /// EVM addresses are hex and differ only by checksum casing across
    /// sources, so matching ignores case.
    #[must_use]
    pub fn find(&self, address: &str) -> Option<&ProvisionedWallet> {
        self.wallets
            .iter()
            .rev()
            .find(|w| w.address().eq_ignore_ascii_case(address))
    }

    /// The most recently provisioned wallet.
    #[must_use]
    pub fn latest(&self) -> Option<&ProvisionedWallet> {
        self.wallets.last()
    }

    /// Number of recorded wallets.
    #[must_use]
    pub fn count(&self) -> usize {
        self.wallets.len()
    }

    /// Whether no wallet has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// Iterate over recorded wallets in provisioning order.
    pub fn iter(&self) -> impl Iterator<Item = &ProvisionedWallet> {
        self.wallets.iter()
    }
}

impl<'a> IntoIterator for &'a WalletRegistry {
    type Item = &'a ProvisionedWallet;
    type IntoIter = std::slice::Iter<'a, ProvisionedWallet>;

    fn into_iter(self) -> Self::IntoIter {
        self.wallets.iter()
    }
}
