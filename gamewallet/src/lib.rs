//! Embedded smart-wallet session bootstrap for game clients.
//!
//! gamewallet drives the wallet-provisioning sequence a game needs before it
//! can touch tokens or contracts: construct a chain client, authenticate a
//! player by email and one-time passcode, and derive a smart-contract wallet
//! from the resulting personal wallet.
//!
//! # Architecture
//!
//! ```text
//! WalletContext (owned by the process entry point)
//!   ├── ClientSession      → one chain-client handle, initialized once
//!   ├── AuthFlow           → Idle → WalletCreated → AwaitingOtp → Authenticated
//!   ├── WalletProvisioner  → smart wallet derived once, then cached
//!   └── EventBus           → synchronous log/lifecycle fan-out to the UI
//! ```
//!
//! Network I/O lives behind the [`backend::WalletBackend`] trait; the crate
//! ships [`backend::LocalBackend`] for offline development and CI. Each
//! network-bound step is bounded by the configured per-step timeout.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use gamewallet::prelude::*;
//!
//! let ctx = WalletContext::new(LocalBackend::new());
//! gamewallet::events::forward_to_tracing(ctx.bus());
//!
//! ctx.initialize(
//!     SessionConfig::builder()
//!         .chain(ChainId::BaseSepolia)
//!         .client_id("my-project")
//!         .bundle_id("com.example.game")
//!         .build()?,
//! )
//! .await?;
//!
//! if ctx.start_login("player@example.com").await? == AuthPhase::AwaitingOtp {
//!     // prompt the player for the emailed code, then:
//!     ctx.submit_otp(&code).await?;
//! }
//! let smart_wallet = ctx.create_smart_wallet().await?;
//! ```

pub mod auth;
pub mod backend;
pub mod capabilities;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod provision;
pub mod session;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::auth::{AuthFlow, AuthPhase};
    pub use crate::backend::{LocalBackend, OtpOutcome, WalletBackend};
    pub use crate::config::{ChainId, SessionConfig};
    pub use crate::context::WalletContext;
    pub use crate::error::{
        AuthError, BackendError, ProvisionError, Result, SessionError, WalletError,
    };
    pub use crate::events::{EventBus, SubscriptionId, WalletEvent};
    pub use crate::provision::WalletProvisioner;
    pub use crate::session::ClientSession;
}
