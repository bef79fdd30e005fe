//! Process-level wiring of the wallet components.
//!
//! [`WalletContext`] is the explicitly constructed replacement for global
//! singletons: the process entry point builds one, owns its lifecycle, and
//! passes it (or individual components) to whatever needs wallet access.
//! All components share one backend and one event bus.

use std::sync::Arc;

use crate::auth::{AuthFlow, AuthPhase};
use crate::backend::WalletBackend;
use crate::config::SessionConfig;
use crate::error::{AuthResult, ProvisionResult, SessionResult};
use crate::events::EventBus;
use crate::provision::WalletProvisioner;
use crate::session::ClientSession;

/// Dependency-injected container for session, auth and provisioning.
///
/// ```rust,ignore
/// let ctx = WalletContext::new(LocalBackend::new());
/// ctx.initialize(config).await?;
/// ctx.start_login("player@example.com").await?;
/// // ... user types the emailed code ...
/// ctx.submit_otp("123456").await?;
/// let smart = ctx.create_smart_wallet().await?;
/// ```
pub struct WalletContext<B: WalletBackend> {
    backend: Arc<B>,
    bus: EventBus,
    session: Arc<ClientSession<B>>,
    auth: Arc<AuthFlow<B>>,
    provisioner: WalletProvisioner<B>,
}

impl<B: WalletBackend> std::fmt::Debug for WalletContext<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletContext")
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl<B: WalletBackend> WalletContext<B> {
    /// Create a context with a fresh event bus.
    pub fn new(backend: B) -> Self {
        Self::builder(backend).build()
    }

    /// Create a builder.
    pub fn builder(backend: B) -> WalletContextBuilder<B> {
        WalletContextBuilder {
            backend,
            bus: None,
        }
    }

    /// The shared event bus.
    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The shared backend.
    #[must_use]
    pub const fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// The client session.
    #[must_use]
    pub const fn session(&self) -> &Arc<ClientSession<B>> {
        &self.session
    }

    /// The authentication flow.
    #[must_use]
    pub const fn auth(&self) -> &Arc<AuthFlow<B>> {
        &self.auth
    }

    /// The smart-wallet provisioner.
    #[must_use]
    pub const fn provisioner(&self) -> &WalletProvisioner<B> {
        &self.provisioner
    }

    /// Forward to [`ClientSession::initialize`].
    ///
    /// # Errors
    ///
    /// See [`ClientSession::initialize`].
    pub async fn initialize(&self, config: SessionConfig) -> SessionResult<()> {
        self.session.initialize(config).await
    }

    /// Forward to [`AuthFlow::start_login`].
    ///
    /// # Errors
    ///
    /// See [`AuthFlow::start_login`].
    pub async fn start_login(&self, email: &str) -> AuthResult<AuthPhase> {
        self.auth.start_login(email).await
    }

    /// Forward to [`AuthFlow::submit_otp`].
    ///
    /// # Errors
    ///
    /// See [`AuthFlow::submit_otp`].
    pub async fn submit_otp(&self, code: &str) -> AuthResult<bool> {
        self.auth.submit_otp(code).await
    }

    /// Forward to [`WalletProvisioner::create_smart_wallet`].
    ///
    /// # Errors
    ///
    /// See [`WalletProvisioner::create_smart_wallet`].
    pub async fn create_smart_wallet(&self) -> ProvisionResult<B::SmartWallet> {
        self.provisioner.create_smart_wallet().await
    }
}

/// Builder for [`WalletContext`].
pub struct WalletContextBuilder<B: WalletBackend> {
    backend: B,
    bus: Option<EventBus>,
}

impl<B: WalletBackend> std::fmt::Debug for WalletContextBuilder<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletContextBuilder").finish_non_exhaustive()
    }
}

impl<B: WalletBackend> WalletContextBuilder<B> {
    /// Use an existing bus (e.g. one the UI already observes).
    #[must_use]
    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Wire the components together.
    #[must_use]
    pub fn build(self) -> WalletContext<B> {
        let backend = Arc::new(self.backend);
        let bus = self.bus.unwrap_or_default();
        let session = Arc::new(ClientSession::new(Arc::clone(&backend), bus.clone()));
        let auth = Arc::new(AuthFlow::new(
            Arc::clone(&backend),
            Arc::clone(&session),
            bus.clone(),
        ));
        let provisioner = WalletProvisioner::new(
            Arc::clone(&backend),
            Arc::clone(&session),
            Arc::clone(&auth),
            bus.clone(),
        );
        WalletContext {
            backend,
            bus,
            session,
            auth,
            provisioner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::stub::{STUB_SMART_ADDRESS, STUB_WALLET_ADDRESS, StubBackend};
    use crate::config::ChainId;
    use crate::events::WalletEvent;
    use crate::events::test_support::Recorder;

    /// The full bootstrap sequence for a new user: initialize → login →
    /// OTP → smart wallet, with the lifecycle events in order.
    #[tokio::test]
    async fn end_to_end_bootstrap_for_a_new_user() {
        let ctx = WalletContext::new(StubBackend::new());
        let recorder = Recorder::attach(ctx.bus());

        let config = SessionConfig::builder()
            .chain(ChainId::try_from(84532).unwrap())
            .client_id("abc")
            .bundle_id("com.test")
            .wallet_factory_address("0xFEED")
            .gasless(true)
            .build()
            .unwrap();
        ctx.initialize(config).await.unwrap();

        let phase = ctx.start_login("a@b.com").await.unwrap();
        assert_eq!(phase, AuthPhase::AwaitingOtp);

        assert!(ctx.submit_otp("123456").await.unwrap());
        assert_eq!(ctx.auth().address().await.as_deref(), Some(STUB_WALLET_ADDRESS));

        let smart = ctx.create_smart_wallet().await.unwrap();
        let address = ctx
            .backend()
            .smart_wallet_address(&smart)
            .await
            .unwrap();
        assert_eq!(address, STUB_SMART_ADDRESS);

        let lifecycle: Vec<WalletEvent> = recorder
            .events()
            .into_iter()
            .filter(|event| !matches!(event, WalletEvent::Log { .. }))
            .collect();
        assert_eq!(
            lifecycle,
            vec![
                WalletEvent::SessionReady,
                WalletEvent::AwaitingOtp,
                WalletEvent::WalletAuthenticated {
                    address: STUB_WALLET_ADDRESS.to_string(),
                },
                WalletEvent::SmartWalletCreated {
                    address: STUB_SMART_ADDRESS.to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn shared_bus_is_honored() {
        let bus = EventBus::new();
        let recorder = Recorder::attach(&bus);
        let ctx = WalletContext::builder(StubBackend::new()).bus(bus).build();

        let config = SessionConfig::builder()
            .client_id("abc")
            .bundle_id("com.test")
            .build()
            .unwrap();
        ctx.initialize(config).await.unwrap();

        assert_eq!(recorder.count(|e| matches!(e, WalletEvent::SessionReady)), 1);
    }
}
