//! Smart-wallet derivation from an authenticated personal wallet.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::auth::AuthFlow;
use crate::backend::WalletBackend;
use crate::error::{ProvisionError, ProvisionResult};
use crate::events::{EventBus, WalletEvent};
use crate::session::ClientSession;

/// Derives and caches the process's smart wallet.
///
/// Derivation requires the [`AuthFlow`] to be authenticated and uses the
/// session's factory address, gasless flag and chain. The first successful
/// derivation is cached for the process lifetime; later calls return the
/// cached handle without touching the backend.
pub struct WalletProvisioner<B: WalletBackend> {
    backend: Arc<B>,
    session: Arc<ClientSession<B>>,
    auth: Arc<AuthFlow<B>>,
    bus: EventBus,
    cache: Mutex<Option<Provisioned<B>>>,
}

struct Provisioned<B: WalletBackend> {
    smart: B::SmartWallet,
    address: String,
}

impl<B: WalletBackend> std::fmt::Debug for WalletProvisioner<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletProvisioner").finish_non_exhaustive()
    }
}

impl<B: WalletBackend> WalletProvisioner<B> {
    /// Create a provisioner with an empty cache.
    pub fn new(
        backend: Arc<B>,
        session: Arc<ClientSession<B>>,
        auth: Arc<AuthFlow<B>>,
        bus: EventBus,
    ) -> Self {
        Self {
            backend,
            session,
            auth,
            bus,
            cache: Mutex::new(None),
        }
    }

    /// Derive the smart wallet, or return the cached handle.
    ///
    /// Publishes [`WalletEvent::SmartWalletCreated`] on the first success and
    /// [`WalletEvent::SmartWalletCreationFailed`] on failure. Failures are
    /// surfaced to the caller without retry.
    ///
    /// # Errors
    ///
    /// - [`ProvisionError::NotAuthenticated`] when the authentication flow
    ///   has not produced a personal wallet.
    /// - [`ProvisionError::Timeout`] / [`ProvisionError::Backend`] when
    ///   derivation fails.
    pub async fn create_smart_wallet(&self) -> ProvisionResult<B::SmartWallet> {
        // Cache lock held across derivation so concurrent callers cannot
        // derive twice.
        let mut cache = self.cache.lock().await;
        if let Some(provisioned) = cache.as_ref() {
            debug!(address = %provisioned.address, "smart wallet already provisioned");
            return Ok(provisioned.smart.clone());
        }

        let wallet = self
            .auth
            .wallet()
            .await
            .map_err(|_| ProvisionError::NotAuthenticated)?;
        let config = self
            .session
            .config()
            .await
            .map_err(|_| ProvisionError::NotAuthenticated)?;

        info!(
            factory = %config.wallet_factory_address,
            chain = %config.chain,
            gasless = config.gasless,
            "creating smart wallet",
        );
        self.bus
            .publish(WalletEvent::log("creating smart wallet for account"));

        let derivation = self.backend.create_smart_wallet(
            &wallet,
            &config.wallet_factory_address,
            config.gasless,
            config.chain,
        );
        let smart = match timeout(config.op_timeout, derivation).await {
            Ok(Ok(smart)) => smart,
            Ok(Err(err)) => {
                warn!(error = %err, "smart wallet creation failed");
                self.bus.publish(WalletEvent::SmartWalletCreationFailed);
                return Err(err.into());
            }
            Err(_) => {
                warn!("smart wallet creation timed out");
                self.bus.publish(WalletEvent::SmartWalletCreationFailed);
                return Err(ProvisionError::Timeout(config.op_timeout));
            }
        };

        let address = match timeout(config.op_timeout, self.backend.smart_wallet_address(&smart))
            .await
        {
            Ok(Ok(address)) => address,
            Ok(Err(err)) => {
                self.bus.publish(WalletEvent::SmartWalletCreationFailed);
                return Err(err.into());
            }
            Err(_) => {
                self.bus.publish(WalletEvent::SmartWalletCreationFailed);
                return Err(ProvisionError::Timeout(config.op_timeout));
            }
        };

        info!(%address, "smart wallet created");
        *cache = Some(Provisioned {
            smart: smart.clone(),
            address: address.clone(),
        });
        drop(cache);

        self.bus.publish(WalletEvent::SmartWalletCreated { address });
        Ok(smart)
    }

    /// The cached smart wallet handle, if one has been derived.
    pub async fn smart_wallet(&self) -> Option<B::SmartWallet> {
        self.cache
            .lock()
            .await
            .as_ref()
            .map(|provisioned| provisioned.smart.clone())
    }

    /// The cached smart wallet address, if one has been derived.
    pub async fn address(&self) -> Option<String> {
        self.cache
            .lock()
            .await
            .as_ref()
            .map(|provisioned| provisioned.address.clone())
    }
}
