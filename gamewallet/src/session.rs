//! Client session owning the chain-client connection.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::backend::WalletBackend;
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::events::{EventBus, WalletEvent};

/// Owns the single chain-client handle for the process.
///
/// Initializes exactly once. A second [`initialize`](Self::initialize) call
/// is rejected with [`SessionError::AlreadyInitialized`] and logged; the
/// first client handle remains authoritative. There is no teardown — the
/// session lives as long as the process.
///
/// Construction of the client handle is fail-fast: no retry is attempted
/// here, callers own any retry policy.
pub struct ClientSession<B: WalletBackend> {
    backend: Arc<B>,
    bus: EventBus,
    state: RwLock<Option<Initialized<B>>>,
}

struct Initialized<B: WalletBackend> {
    config: SessionConfig,
    client: B::Client,
}

impl<B: WalletBackend> std::fmt::Debug for ClientSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession").finish_non_exhaustive()
    }
}

impl<B: WalletBackend> ClientSession<B> {
    /// Create an uninitialized session.
    pub fn new(backend: Arc<B>, bus: EventBus) -> Self {
        Self {
            backend,
            bus,
            state: RwLock::new(None),
        }
    }

    /// Validate the configuration and construct the chain client.
    ///
    /// Publishes [`WalletEvent::SessionReady`] on success.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidConfig`] when `client_id` or `bundle_id` is
    ///   empty; the session stays uninitialized and the backend is never
    ///   called, so the caller may retry with a corrected configuration.
    /// - [`SessionError::AlreadyInitialized`] on a second call.
    /// - [`SessionError::Timeout`] / [`SessionError::Backend`] when client
    ///   construction fails.
    pub async fn initialize(&self, config: SessionConfig) -> SessionResult<()> {
        config.validate()?;

        // Write lock held across construction so a racing second call sees
        // AlreadyInitialized rather than replacing the handle.
        let mut state = self.state.write().await;
        if state.is_some() {
            warn!("session already initialized; keeping the existing client");
            return Err(SessionError::AlreadyInitialized);
        }

        info!(
            client_id = %config.client_id,
            bundle_id = %config.bundle_id,
            chain = %config.chain,
            "starting chain client",
        );
        self.bus.publish(WalletEvent::log(format!(
            "starting client {} ({})",
            config.client_id, config.bundle_id
        )));

        let client = timeout(
            config.op_timeout,
            self.backend.create_client(&config.client_id, &config.bundle_id),
        )
        .await
        .map_err(|_| SessionError::Timeout(config.op_timeout))??;

        *state = Some(Initialized { config, client });
        drop(state);

        self.bus.publish(WalletEvent::SessionReady);
        Ok(())
    }

    /// A clone of the chain-client handle.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotInitialized`] before a successful
    /// [`initialize`](Self::initialize).
    pub async fn handle(&self) -> SessionResult<B::Client> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|init| init.client.clone())
            .ok_or(SessionError::NotInitialized)
    }

    /// A copy of the active configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotInitialized`] before a successful
    /// [`initialize`](Self::initialize).
    pub async fn config(&self) -> SessionResult<SessionConfig> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|init| init.config.clone())
            .ok_or(SessionError::NotInitialized)
    }

    /// Whether the session has been initialized.
    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::stub::StubBackend;
    use crate::events::test_support::Recorder;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn valid_config() -> SessionConfig {
        SessionConfig::builder()
            .client_id("abc")
            .bundle_id("com.test")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn empty_required_fields_fail_without_touching_the_backend() {
        let backend = Arc::new(StubBackend::new());
        let session = ClientSession::new(Arc::clone(&backend), EventBus::new());

        let config = SessionConfig {
            client_id: String::new(),
            ..valid_config()
        };
        let err = session.initialize(config).await;
        assert!(matches!(err, Err(SessionError::InvalidConfig(_))));
        assert!(!session.is_initialized().await);
        assert_eq!(backend.clients_created.load(Ordering::SeqCst), 0);

        let config = SessionConfig {
            bundle_id: String::new(),
            ..valid_config()
        };
        let err = session.initialize(config).await;
        assert!(matches!(err, Err(SessionError::InvalidConfig(_))));
        assert!(!session.is_initialized().await);
    }

    #[tokio::test]
    async fn second_initialize_is_rejected_and_first_handle_survives() {
        let backend = Arc::new(StubBackend::new());
        let bus = EventBus::new();
        let recorder = Recorder::attach(&bus);
        let session = ClientSession::new(Arc::clone(&backend), bus);

        session.initialize(valid_config()).await.unwrap();
        let err = session.initialize(valid_config()).await;

        assert!(matches!(err, Err(SessionError::AlreadyInitialized)));
        assert_eq!(backend.clients_created.load(Ordering::SeqCst), 1);
        assert!(session.handle().await.is_ok());
        assert_eq!(
            recorder.count(|e| matches!(e, WalletEvent::SessionReady)),
            1
        );
    }

    #[tokio::test]
    async fn handle_before_initialize_fails() {
        let backend = Arc::new(StubBackend::new());
        let session = ClientSession::new(backend, EventBus::new());

        assert!(matches!(
            session.handle().await,
            Err(SessionError::NotInitialized)
        ));
        assert!(matches!(
            session.config().await,
            Err(SessionError::NotInitialized)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_client_construction_times_out() {
        let backend = Arc::new(StubBackend::new());
        backend.set_delay(Duration::from_secs(120));
        let session = ClientSession::new(Arc::clone(&backend), EventBus::new());

        let err = session.initialize(valid_config()).await;
        assert!(matches!(err, Err(SessionError::Timeout(_))));
        assert!(!session.is_initialized().await);
    }
}
