//! Email + OTP authentication flow for the personal wallet.
//!
//! The flow is a small state machine:
//!
//! ```text
//! Idle ──start_login──▶ WalletCreated ──▶ AwaitingOtp ──submit_otp──▶ Authenticated
//!                            │                 │
//!                            └────────┬────────┘
//!                                     ▼
//!                                  Failed
//! ```
//!
//! A returning user whose wallet is already connected goes straight from
//! `WalletCreated` to `Authenticated` without an OTP challenge. `Failed` is
//! terminal for the attempt; calling [`AuthFlow::start_login`] again restarts
//! from scratch and discards any previous wallet handle.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::backend::WalletBackend;
use crate::error::{AuthError, AuthResult, BackendResult};
use crate::events::{EventBus, WalletEvent};
use crate::session::ClientSession;

/// Phase of the authentication flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthPhase {
    /// No login attempt in progress.
    Idle,
    /// The personal wallet has been constructed.
    WalletCreated,
    /// An OTP challenge was dispatched; waiting for the code.
    AwaitingOtp,
    /// The personal wallet is authenticated.
    Authenticated,
    /// The attempt failed; restart with a new login.
    Failed,
}

/// Drives email → OTP → wallet-address resolution.
///
/// One flow per process, matching the single [`ClientSession`]. All state
/// mutation happens behind one lock held across each operation's suspension
/// points, so operations run to completion in the order issued.
pub struct AuthFlow<B: WalletBackend> {
    backend: Arc<B>,
    session: Arc<ClientSession<B>>,
    bus: EventBus,
    inner: Mutex<Inner<B>>,
}

struct Inner<B: WalletBackend> {
    phase: AuthPhase,
    email: Option<String>,
    wallet: Option<B::Wallet>,
    address: Option<String>,
}

impl<B: WalletBackend> Inner<B> {
    fn reset(&mut self) {
        self.phase = AuthPhase::Idle;
        self.email = None;
        self.wallet = None;
        self.address = None;
    }
}

impl<B: WalletBackend> std::fmt::Debug for AuthFlow<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow").finish_non_exhaustive()
    }
}

impl<B: WalletBackend> AuthFlow<B> {
    /// Create an idle flow bound to a session.
    pub fn new(backend: Arc<B>, session: Arc<ClientSession<B>>, bus: EventBus) -> Self {
        Self {
            backend,
            session,
            bus,
            inner: Mutex::new(Inner {
                phase: AuthPhase::Idle,
                email: None,
                wallet: None,
                address: None,
            }),
        }
    }

    /// The flow's current phase.
    pub async fn phase(&self) -> AuthPhase {
        self.inner.lock().await.phase
    }

    /// Email of the current attempt, if any.
    pub async fn email(&self) -> Option<String> {
        self.inner.lock().await.email.clone()
    }

    /// Resolved personal wallet address once authenticated.
    pub async fn address(&self) -> Option<String> {
        self.inner.lock().await.address.clone()
    }

    /// A clone of the authenticated personal wallet handle.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] before the flow reaches
    /// [`AuthPhase::Authenticated`].
    pub async fn wallet(&self) -> AuthResult<B::Wallet> {
        let inner = self.inner.lock().await;
        if inner.phase == AuthPhase::Authenticated {
            inner.wallet.clone().ok_or(AuthError::NotAuthenticated)
        } else {
            Err(AuthError::NotAuthenticated)
        }
    }

    /// Start (or restart) a login attempt for `email`.
    ///
    /// Constructs the personal wallet, then either authenticates directly
    /// (returning user) or dispatches an OTP challenge. Publishes
    /// [`WalletEvent::WalletAuthenticated`] or [`WalletEvent::AwaitingOtp`]
    /// accordingly. Any previous attempt's wallet handle is discarded.
    ///
    /// # Errors
    ///
    /// - [`AuthError::SessionNotReady`] when the session is uninitialized;
    ///   the flow is left in [`AuthPhase::Idle`].
    /// - [`AuthError::Timeout`] / [`AuthError::Backend`] on collaborator
    ///   failure; the flow transitions to [`AuthPhase::Failed`]. No
    ///   automatic retry.
    pub async fn start_login(&self, email: &str) -> AuthResult<AuthPhase> {
        let config = self
            .session
            .config()
            .await
            .map_err(|_| AuthError::SessionNotReady)?;
        let client = self
            .session
            .handle()
            .await
            .map_err(|_| AuthError::SessionNotReady)?;

        let mut inner = self.inner.lock().await;
        if inner.phase != AuthPhase::Idle {
            debug!(previous = ?inner.phase, "restarting login flow");
        }
        inner.reset();
        inner.email = Some(email.to_string());

        info!(email, "starting login");
        self.bus
            .publish(WalletEvent::log(format!("starting login for {email}")));

        let wallet = match self
            .bounded(config.op_timeout, self.backend.create_wallet(&client, email))
            .await
        {
            Ok(wallet) => wallet,
            Err(err) => return Err(self.fail(&mut inner, err)),
        };
        inner.phase = AuthPhase::WalletCreated;

        let connected = match self
            .bounded(config.op_timeout, self.backend.is_connected(&wallet))
            .await
        {
            Ok(connected) => connected,
            Err(err) => return Err(self.fail(&mut inner, err)),
        };

        if connected {
            let address = match self
                .bounded(config.op_timeout, self.backend.wallet_address(&wallet))
                .await
            {
                Ok(address) => address,
                Err(err) => return Err(self.fail(&mut inner, err)),
            };
            info!(%address, "wallet already connected, logging in");
            inner.wallet = Some(wallet);
            inner.address = Some(address.clone());
            inner.phase = AuthPhase::Authenticated;
            self.bus.publish(WalletEvent::WalletAuthenticated { address });
        } else {
            if let Err(err) = self
                .bounded(config.op_timeout, self.backend.send_otp(&wallet))
                .await
            {
                return Err(self.fail(&mut inner, err));
            }
            info!(email, "otp challenge sent");
            inner.wallet = Some(wallet);
            inner.phase = AuthPhase::AwaitingOtp;
            self.bus.publish(WalletEvent::log(format!(
                "{email} sent OTP challenge for wallet access"
            )));
            self.bus.publish(WalletEvent::AwaitingOtp);
        }

        Ok(inner.phase)
    }

    /// Submit the OTP code for the pending challenge.
    ///
    /// Returns `Ok(true)` when the code was accepted (the flow is now
    /// [`AuthPhase::Authenticated`] and [`WalletEvent::WalletAuthenticated`]
    /// was published exactly once). Returns `Ok(false)` when the code was
    /// rejected: the flow stays in [`AuthPhase::AwaitingOtp`] if the
    /// collaborator allows a retry, otherwise it transitions to
    /// [`AuthPhase::Failed`]. The caller decides whether to prompt again —
    /// there is no automatic retry.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidState`] when the flow is not awaiting an OTP;
    ///   state is unchanged.
    /// - [`AuthError::Timeout`] / [`AuthError::Backend`] on transport
    ///   failure; the flow transitions to [`AuthPhase::Failed`].
    pub async fn submit_otp(&self, code: &str) -> AuthResult<bool> {
        let config = self
            .session
            .config()
            .await
            .map_err(|_| AuthError::SessionNotReady)?;

        let mut inner = self.inner.lock().await;
        if inner.phase != AuthPhase::AwaitingOtp {
            return Err(AuthError::InvalidState { phase: inner.phase });
        }
        let wallet = inner
            .wallet
            .clone()
            .ok_or(AuthError::InvalidState { phase: inner.phase })?;

        self.bus.publish(WalletEvent::log("submitting OTP"));

        let outcome = match self
            .bounded(config.op_timeout, self.backend.submit_otp(&wallet, code))
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.fail(&mut inner, err)),
        };

        if let Some(address) = outcome.address {
            info!(%address, "otp accepted");
            inner.address = Some(address.clone());
            inner.phase = AuthPhase::Authenticated;
            self.bus.publish(WalletEvent::WalletAuthenticated { address });
            Ok(true)
        } else if outcome.can_retry {
            warn!("otp rejected, caller may retry");
            self.bus.publish(WalletEvent::log("invalid OTP, try again"));
            Ok(false)
        } else {
            warn!("otp rejected with no retry allowed");
            inner.phase = AuthPhase::Failed;
            inner.wallet = None;
            self.bus.publish(WalletEvent::LoginFailed {
                reason: "OTP rejected".into(),
            });
            Ok(false)
        }
    }

    /// Bound a backend call with the configured timeout.
    async fn bounded<T>(
        &self,
        bound: Duration,
        fut: impl Future<Output = BackendResult<T>>,
    ) -> AuthResult<T> {
        match timeout(bound, fut).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_) => Err(AuthError::Timeout(bound)),
        }
    }

    /// Transition to `Failed`, discard the wallet handle and publish the
    /// failure. Returns the error for propagation.
    fn fail(&self, inner: &mut MutexGuard<'_, Inner<B>>, err: AuthError) -> AuthError {
        warn!(error = %err, "login attempt failed");
        inner.phase = AuthPhase::Failed;
        inner.wallet = None;
        self.bus.publish(WalletEvent::LoginFailed {
            reason: err.to_string(),
        });
        err
    }
}
