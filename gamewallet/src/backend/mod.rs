//! Backend collaborators for chain, wallet and smart-wallet operations.
//!
//! Everything that touches the network lives behind [`WalletBackend`]: the
//! session, authentication flow and provisioner only ever sequence calls to
//! it and re-emit the results as events. The trait groups three capability
//! sets — chain client, personal wallet, smart wallet — that share opaque
//! handle types, since the personal wallet handle produced by authentication
//! feeds directly into smart-wallet derivation.
//!
//! Handles are `Clone` and cheap to copy (backends wrap shared state in
//! `Arc`), so components hand out read access without transferring
//! ownership.

use std::future::Future;

use crate::config::ChainId;
use crate::error::BackendResult;

mod local;

pub use local::{LocalBackend, LocalBackendBuilder, LocalClient, LocalSmartWallet, LocalWallet};

#[cfg(test)]
pub(crate) mod stub;

/// Result of submitting an OTP code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpOutcome {
    /// Resolved wallet address; present when the code was accepted.
    pub address: Option<String>,
    /// Whether the user may submit another code after a rejection.
    pub can_retry: bool,
}

impl OtpOutcome {
    /// Outcome for an accepted code.
    pub fn accepted(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            can_retry: true,
        }
    }

    /// Outcome for a rejected code.
    #[must_use]
    pub const fn rejected(can_retry: bool) -> Self {
        Self {
            address: None,
            can_retry,
        }
    }

    /// Whether the code was accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.address.is_some()
    }
}

/// Collaborator contract for all network-bound wallet operations.
///
/// Implement this to bind the session machinery to a real wallet service.
/// The crate ships [`LocalBackend`] for offline development and CI.
pub trait WalletBackend: Send + Sync {
    /// Opaque chain-client connection handle.
    type Client: Clone + Send + Sync;
    /// Opaque personal (in-app) wallet handle.
    type Wallet: Clone + Send + Sync;
    /// Opaque smart-wallet handle.
    type SmartWallet: Clone + Send + Sync;

    // --- chain client capability ---

    /// Construct the chain client from project credentials.
    fn create_client(
        &self,
        client_id: &str,
        bundle_id: &str,
    ) -> impl Future<Output = BackendResult<Self::Client>> + Send;

    // --- personal wallet capability ---

    /// Construct the personal wallet bound to an email address.
    fn create_wallet(
        &self,
        client: &Self::Client,
        email: &str,
    ) -> impl Future<Output = BackendResult<Self::Wallet>> + Send;

    /// Whether the wallet is already authenticated (returning user).
    fn is_connected(
        &self,
        wallet: &Self::Wallet,
    ) -> impl Future<Output = BackendResult<bool>> + Send;

    /// Dispatch an OTP challenge to the wallet's email address.
    fn send_otp(&self, wallet: &Self::Wallet) -> impl Future<Output = BackendResult<()>> + Send;

    /// Submit an OTP code.
    ///
    /// A wrong code is not an error: it is reported through
    /// [`OtpOutcome::rejected`] so the caller can decide whether to prompt
    /// again.
    fn submit_otp(
        &self,
        wallet: &Self::Wallet,
        code: &str,
    ) -> impl Future<Output = BackendResult<OtpOutcome>> + Send;

    /// The wallet's address.
    fn wallet_address(
        &self,
        wallet: &Self::Wallet,
    ) -> impl Future<Output = BackendResult<String>> + Send;

    // --- smart wallet capability ---

    /// Derive a smart-contract wallet from an authenticated personal wallet.
    fn create_smart_wallet(
        &self,
        personal: &Self::Wallet,
        factory_address: &str,
        gasless: bool,
        chain: ChainId,
    ) -> impl Future<Output = BackendResult<Self::SmartWallet>> + Send;

    /// The smart wallet's address.
    fn smart_wallet_address(
        &self,
        smart: &Self::SmartWallet,
    ) -> impl Future<Output = BackendResult<String>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_outcome_constructors() {
        let accepted = OtpOutcome::accepted("0xWALLET");
        assert!(accepted.is_accepted());
        assert_eq!(accepted.address.as_deref(), Some("0xWALLET"));

        let rejected = OtpOutcome::rejected(false);
        assert!(!rejected.is_accepted());
        assert!(!rejected.can_retry);
    }
}
