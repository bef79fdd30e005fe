//! Deterministic offline backend for development and CI.
//!
//! [`LocalBackend`] stands in for the hosted wallet service: it derives a
//! real secp256k1 signer per email (so addresses are stable across runs for
//! the same project credentials), accepts one configurable OTP code, and
//! computes smart-wallet addresses with a CREATE2-flavored hash. No network
//! is touched — everything resolves immediately.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use alloy::primitives::{Address, keccak256};
use alloy::signers::local::PrivateKeySigner;
use tracing::{debug, info};

use super::{OtpOutcome, WalletBackend};
use crate::config::ChainId;
use crate::error::{BackendError, BackendResult};

/// OTP code [`LocalBackend`] accepts unless overridden.
pub const DEFAULT_LOCAL_OTP: &str = "123456";

/// Chain-client handle minted by [`LocalBackend`].
///
/// Carries the project credentials; they salt the per-email key derivation
/// so two projects never see the same addresses.
#[derive(Debug, Clone)]
pub struct LocalClient {
    client_id: Arc<str>,
    bundle_id: Arc<str>,
}

/// Personal wallet handle minted by [`LocalBackend`].
#[derive(Clone)]
pub struct LocalWallet {
    email: Arc<str>,
    signer: PrivateKeySigner,
    connected: Arc<AtomicBool>,
}

impl LocalWallet {
    /// The email this wallet is bound to.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The wallet's checksummed address.
    #[must_use]
    pub fn address(&self) -> String {
        self.signer.address().to_checksum(None)
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("email", &self.email)
            .field("address", &self.signer.address())
            .finish_non_exhaustive()
    }
}

/// Smart wallet handle minted by [`LocalBackend`].
#[derive(Debug, Clone)]
pub struct LocalSmartWallet {
    address: Address,
}

impl LocalSmartWallet {
    /// The smart wallet's checksummed address.
    #[must_use]
    pub fn address(&self) -> String {
        self.address.to_checksum(None)
    }
}

/// Offline wallet backend with deterministic addresses.
#[derive(Debug)]
pub struct LocalBackend {
    otp: String,
    connected_emails: HashSet<String>,
}

impl LocalBackend {
    /// Create a backend with the default OTP and no pre-connected emails.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder.
    #[must_use]
    pub fn builder() -> LocalBackendBuilder {
        LocalBackendBuilder::default()
    }

    fn derive_signer(client: &LocalClient, email: &str) -> BackendResult<PrivateKeySigner> {
        let seed = keccak256(format!(
            "{}:{}:{}",
            client.client_id,
            client.bundle_id,
            email.to_ascii_lowercase()
        ));
        PrivateKeySigner::from_bytes(&seed)
            .map_err(|e| BackendError::WalletCreation(format!("key derivation failed: {e}")))
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletBackend for LocalBackend {
    type Client = LocalClient;
    type Wallet = LocalWallet;
    type SmartWallet = LocalSmartWallet;

    async fn create_client(&self, client_id: &str, bundle_id: &str) -> BackendResult<LocalClient> {
        if client_id.is_empty() || bundle_id.is_empty() {
            return Err(BackendError::ClientCreation(
                "client id and bundle id are required".into(),
            ));
        }
        debug!(client_id, bundle_id, "local chain client created");
        Ok(LocalClient {
            client_id: Arc::from(client_id),
            bundle_id: Arc::from(bundle_id),
        })
    }

    async fn create_wallet(&self, client: &LocalClient, email: &str) -> BackendResult<LocalWallet> {
        if email.is_empty() {
            return Err(BackendError::WalletCreation("email is required".into()));
        }
        let signer = Self::derive_signer(client, email)?;
        let connected = self.connected_emails.contains(&email.to_ascii_lowercase());
        info!(
            email,
            address = %signer.address(),
            connected,
            "local wallet derived",
        );
        Ok(LocalWallet {
            email: Arc::from(email),
            signer,
            connected: Arc::new(AtomicBool::new(connected)),
        })
    }

    async fn is_connected(&self, wallet: &LocalWallet) -> BackendResult<bool> {
        Ok(wallet.connected.load(Ordering::Acquire))
    }

    async fn send_otp(&self, wallet: &LocalWallet) -> BackendResult<()> {
        debug!(email = %wallet.email, "otp challenge dispatched (local)");
        Ok(())
    }

    async fn submit_otp(&self, wallet: &LocalWallet, code: &str) -> BackendResult<OtpOutcome> {
        if code == self.otp {
            wallet.connected.store(true, Ordering::Release);
            Ok(OtpOutcome::accepted(wallet.address()))
        } else {
            Ok(OtpOutcome::rejected(true))
        }
    }

    async fn wallet_address(&self, wallet: &LocalWallet) -> BackendResult<String> {
        Ok(wallet.address())
    }

    async fn create_smart_wallet(
        &self,
        personal: &LocalWallet,
        factory_address: &str,
        gasless: bool,
        chain: ChainId,
    ) -> BackendResult<LocalSmartWallet> {
        if factory_address.is_empty() {
            return Err(BackendError::SmartWalletCreation(
                "factory address is required".into(),
            ));
        }

        // CREATE2-flavored: ff ++ factory ++ owner ++ chain ++ gasless flag.
        let mut preimage = Vec::with_capacity(1 + factory_address.len() + 20 + 8 + 1);
        preimage.push(0xff);
        preimage.extend_from_slice(factory_address.as_bytes());
        preimage.extend_from_slice(personal.signer.address().as_slice());
        preimage.extend_from_slice(&chain.id().to_be_bytes());
        preimage.push(u8::from(gasless));

        let hash = keccak256(&preimage);
        let address = Address::from_slice(&hash[12..]);
        info!(
            owner = %personal.signer.address(),
            smart = %address,
            %chain,
            gasless,
            "local smart wallet derived",
        );
        Ok(LocalSmartWallet { address })
    }

    async fn smart_wallet_address(&self, smart: &LocalSmartWallet) -> BackendResult<String> {
        Ok(smart.address())
    }
}

/// Builder for [`LocalBackend`].
#[derive(Debug, Default, Clone)]
pub struct LocalBackendBuilder {
    otp: Option<String>,
    connected_emails: HashSet<String>,
}

impl LocalBackendBuilder {
    /// Override the accepted OTP code.
    #[must_use]
    pub fn otp(mut self, code: impl Into<String>) -> Self {
        self.otp = Some(code.into());
        self
    }

    /// Treat an email as already connected (returning-user flow).
    #[must_use]
    pub fn connected_email(mut self, email: impl Into<String>) -> Self {
        self.connected_emails
            .insert(email.into().to_ascii_lowercase());
        self
    }

    /// Build the backend.
    #[must_use]
    pub fn build(self) -> LocalBackend {
        LocalBackend {
            otp: self.otp.unwrap_or_else(|| DEFAULT_LOCAL_OTP.to_string()),
            connected_emails: self.connected_emails,
        }
    }
}
