//! Wallet lifecycle events and the observer bus.
//!
//! The [`EventBus`] is the user-facing notification surface: UI panels and
//! tooling register observers and receive log and lifecycle events as the
//! session, authentication flow and provisioner advance. Delivery is
//! synchronous, in registration order, on the publisher's call stack — no
//! buffering, no back-pressure. A slow observer blocks the publisher.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{info, trace, warn};

/// Notification published on the [`EventBus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WalletEvent {
    /// Free-form log line intended for in-game consoles.
    Log {
        /// Human-readable message.
        message: String,
    },
    /// The chain client was constructed and the session is usable.
    SessionReady,
    /// An OTP challenge was dispatched; the flow is waiting for the code.
    AwaitingOtp,
    /// The personal wallet is authenticated.
    WalletAuthenticated {
        /// Resolved personal wallet address.
        address: String,
    },
    /// A login attempt failed and the flow is in its terminal state.
    LoginFailed {
        /// Why the attempt failed.
        reason: String,
    },
    /// The smart wallet was derived.
    SmartWalletCreated {
        /// Smart wallet address.
        address: String,
    },
    /// Smart-wallet derivation failed.
    SmartWalletCreationFailed,
}

impl WalletEvent {
    /// Convenience constructor for [`WalletEvent::Log`].
    pub fn log(message: impl Into<String>) -> Self {
        Self::Log {
            message: message.into(),
        }
    }
}

/// Handle identifying a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type BoxedObserver = Box<dyn Fn(&WalletEvent) + Send + Sync>;

/// Synchronous observer bus for wallet events.
///
/// Cloning is cheap; all clones share the same observer registry.
///
/// Observers must not subscribe or unsubscribe from inside a callback — the
/// registry lock is held for the duration of [`publish`](Self::publish).
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

#[derive(Default)]
struct BusInner {
    observers: RwLock<Vec<(SubscriptionId, BoxedObserver)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.read_observers().len())
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// Create a bus with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer; it receives every subsequently published event.
    ///
    /// Returns an id that can be passed to [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe(&self, observer: impl Fn(&WalletEvent) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.write_observers().push((id, Box::new(observer)));
        trace!(id = id.0, "observer registered");
        id
    }

    /// Remove a previously registered observer.
    ///
    /// Returns `false` when the id is unknown (already removed).
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.write_observers();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        before != observers.len()
    }

    /// Number of currently registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.read_observers().len()
    }

    /// Deliver an event to all observers, in registration order, on the
    /// caller's stack.
    pub fn publish(&self, event: WalletEvent) {
        trace!(?event, "publishing wallet event");
        for (_, observer) in self.read_observers().iter() {
            observer(&event);
        }
    }

    // A poisoned registry only means an observer panicked; delivery to the
    // remaining observers must keep working.
    fn read_observers(&self) -> RwLockReadGuard<'_, Vec<(SubscriptionId, BoxedObserver)>> {
        match self.inner.observers.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_observers(&self) -> RwLockWriteGuard<'_, Vec<(SubscriptionId, BoxedObserver)>> {
        match self.inner.observers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Forward every bus event to the `tracing` subscriber.
///
/// This is the headless counterpart of a UI log panel: lifecycle events are
/// logged at `info`, failures at `warn`.
pub fn forward_to_tracing(bus: &EventBus) -> SubscriptionId {
    bus.subscribe(|event| match event {
        WalletEvent::Log { message } => info!(target: "gamewallet::events", "{message}"),
        WalletEvent::LoginFailed { reason } => {
            warn!(target: "gamewallet::events", reason = %reason, "login failed");
        }
        WalletEvent::SmartWalletCreationFailed => {
            warn!(target: "gamewallet::events", "smart wallet creation failed");
        }
        other => info!(target: "gamewallet::events", event = ?other, "lifecycle"),
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn observers_receive_events_in_registration_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |_| seen.lock().unwrap().push(tag));
        }

        bus.publish(WalletEvent::SessionReady);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(0_u32));

        let counter = Arc::clone(&seen);
        let id = bus.subscribe(move |_| *counter.lock().unwrap() += 1);

        bus.publish(WalletEvent::AwaitingOtp);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(WalletEvent::AwaitingOtp);

        assert_eq!(*seen.lock().unwrap(), 1);
        assert_eq!(bus.observer_count(), 0);
    }

    #[test]
    fn clones_share_the_registry() {
        let bus = EventBus::new();
        let clone = bus.clone();
        let seen = Arc::new(Mutex::new(0_u32));

        let counter = Arc::clone(&seen);
        bus.subscribe(move |_| *counter.lock().unwrap() += 1);

        clone.publish(WalletEvent::log("hello"));
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
