//! Unified error types for gamewallet.
//!
//! Every component surfaces typed failures to its immediate caller; nothing
//! is swallowed. Module-specific errors convert into the top-level
//! [`WalletError`] for callers that want a single error surface.

use std::time::Duration;

use crate::auth::AuthPhase;

/// The main error type for wallet session operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// Client session error.
    #[error("session: {0}")]
    Session(#[from] SessionError),

    /// Authentication flow error.
    #[error("auth: {0}")]
    Auth(#[from] AuthError),

    /// Smart-wallet provisioning error.
    #[error("provision: {0}")]
    Provision(#[from] ProvisionError),
}

/// Result alias using [`WalletError`].
pub type Result<T> = std::result::Result<T, WalletError>;

/// Errors from [`ClientSession`](crate::session::ClientSession).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A required configuration field is missing or empty.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// `initialize` was called on an already-initialized session. The
    /// existing client handle remains authoritative.
    #[error("session is already initialized")]
    AlreadyInitialized,

    /// The session has not been initialized yet.
    #[error("session is not initialized")]
    NotInitialized,

    /// Chain client construction did not complete within the configured bound.
    #[error("client creation timed out after {0:?}")]
    Timeout(Duration),

    /// The backend rejected client creation.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result alias using [`SessionError`].
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Errors from [`AuthFlow`](crate::auth::AuthFlow).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The client session must be initialized before logging in.
    #[error("client session is not ready")]
    SessionNotReady,

    /// The requested operation is not valid in the flow's current phase.
    #[error("operation not valid in phase {phase:?}")]
    InvalidState {
        /// Phase the flow was in when the call was rejected.
        phase: AuthPhase,
    },

    /// The flow has not reached `Authenticated`.
    #[error("no authenticated wallet")]
    NotAuthenticated,

    /// A network-bound step did not complete within the configured bound.
    #[error("authentication step timed out after {0:?}")]
    Timeout(Duration),

    /// A collaborator call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result alias using [`AuthError`].
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Errors from [`WalletProvisioner`](crate::provision::WalletProvisioner).
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// A smart wallet cannot be created before authentication completes.
    #[error("authentication flow has no authenticated wallet")]
    NotAuthenticated,

    /// Smart-wallet derivation did not complete within the configured bound.
    #[error("smart wallet derivation timed out after {0:?}")]
    Timeout(Duration),

    /// The backend failed to derive the smart wallet.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result alias using [`ProvisionError`].
pub type ProvisionResult<T> = std::result::Result<T, ProvisionError>;

/// Errors surfaced by [`WalletBackend`](crate::backend::WalletBackend)
/// collaborators.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Chain client construction was rejected (e.g. invalid credentials).
    #[error("client creation failed: {0}")]
    ClientCreation(String),

    /// Personal wallet construction failed.
    #[error("wallet creation failed: {0}")]
    WalletCreation(String),

    /// The OTP challenge could not be dispatched.
    #[error("otp delivery failed: {0}")]
    OtpDelivery(String),

    /// The OTP submission could not be processed (transport failure, not a
    /// wrong code — wrong codes are reported through
    /// [`OtpOutcome`](crate::backend::OtpOutcome)).
    #[error("otp verification failed: {0}")]
    OtpVerification(String),

    /// Smart-wallet derivation failed (relayer unreachable, bad factory, …).
    #[error("smart wallet creation failed: {0}")]
    SmartWalletCreation(String),

    /// Any other collaborator failure.
    #[error("{0}")]
    Other(String),
}

/// Result alias using [`BackendError`].
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Error for numeric chain ids outside the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown chain id: {0}")]
pub struct UnknownChainId(pub u64);
