//! Scripted backend stub for the state-machine tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{OtpOutcome, WalletBackend};
use crate::config::ChainId;
use crate::error::{BackendError, BackendResult};

/// Address the stub resolves personal wallets to.
pub(crate) const STUB_WALLET_ADDRESS: &str = "0xWALLET";
/// Address the stub resolves smart wallets to.
pub(crate) const STUB_SMART_ADDRESS: &str = "0xSMART";

#[derive(Debug, Clone)]
pub(crate) struct StubClient;

#[derive(Debug, Clone)]
pub(crate) struct StubWallet {
    connected: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct StubSmartWallet {
    address: String,
}

/// Backend double with per-call counters and scriptable OTP outcomes.
///
/// `submit_otp` pops scripted outcomes in order; once the script is
/// exhausted it accepts any code with [`STUB_WALLET_ADDRESS`].
#[derive(Debug, Default)]
pub(crate) struct StubBackend {
    connected_emails: Mutex<HashSet<String>>,
    otp_script: Mutex<VecDeque<BackendResult<OtpOutcome>>>,
    fail_wallet_creation: Mutex<Option<String>>,
    fail_smart_creation: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,

    pub(crate) clients_created: AtomicUsize,
    pub(crate) wallets_created: AtomicUsize,
    pub(crate) otps_sent: AtomicUsize,
    pub(crate) otps_submitted: AtomicUsize,
    pub(crate) smart_wallets_created: AtomicUsize,
}

impl StubBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Treat an email as already connected.
    pub(crate) fn mark_connected(&self, email: &str) {
        self.connected_emails
            .lock()
            .unwrap()
            .insert(email.to_string());
    }

    /// Queue the next `submit_otp` outcome.
    pub(crate) fn script_otp(&self, outcome: BackendResult<OtpOutcome>) {
        self.otp_script.lock().unwrap().push_back(outcome);
    }

    /// Make the next `create_wallet` call fail.
    pub(crate) fn fail_wallet_creation(&self, reason: &str) {
        *self.fail_wallet_creation.lock().unwrap() = Some(reason.to_string());
    }

    /// Make `create_smart_wallet` calls fail.
    pub(crate) fn fail_smart_creation(&self, reason: &str) {
        *self.fail_smart_creation.lock().unwrap() = Some(reason.to_string());
    }

    /// Delay every backend call (combine with a paused tokio clock to drive
    /// the timeout paths).
    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    async fn maybe_delay(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl WalletBackend for StubBackend {
    type Client = StubClient;
    type Wallet = StubWallet;
    type SmartWallet = StubSmartWallet;

    async fn create_client(&self, _client_id: &str, _bundle_id: &str) -> BackendResult<StubClient> {
        self.maybe_delay().await;
        self.clients_created.fetch_add(1, Ordering::SeqCst);
        Ok(StubClient)
    }

    async fn create_wallet(&self, _client: &StubClient, email: &str) -> BackendResult<StubWallet> {
        self.maybe_delay().await;
        if let Some(reason) = self.fail_wallet_creation.lock().unwrap().take() {
            return Err(BackendError::WalletCreation(reason));
        }
        self.wallets_created.fetch_add(1, Ordering::SeqCst);
        let connected = self.connected_emails.lock().unwrap().contains(email);
        Ok(StubWallet { connected })
    }

    async fn is_connected(&self, wallet: &StubWallet) -> BackendResult<bool> {
        Ok(wallet.connected)
    }

    async fn send_otp(&self, _wallet: &StubWallet) -> BackendResult<()> {
        self.maybe_delay().await;
        self.otps_sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn submit_otp(&self, _wallet: &StubWallet, _code: &str) -> BackendResult<OtpOutcome> {
        self.maybe_delay().await;
        self.otps_submitted.fetch_add(1, Ordering::SeqCst);
        self.otp_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(OtpOutcome::accepted(STUB_WALLET_ADDRESS)))
    }

    async fn wallet_address(&self, _wallet: &StubWallet) -> BackendResult<String> {
        Ok(STUB_WALLET_ADDRESS.to_string())
    }

    async fn create_smart_wallet(
        &self,
        _personal: &StubWallet,
        _factory_address: &str,
        _gasless: bool,
        _chain: ChainId,
    ) -> BackendResult<StubSmartWallet> {
        self.maybe_delay().await;
        if let Some(reason) = self.fail_smart_creation.lock().unwrap().clone() {
            return Err(BackendError::SmartWalletCreation(reason));
        }
        self.smart_wallets_created.fetch_add(1, Ordering::SeqCst);
        Ok(StubSmartWallet {
            address: STUB_SMART_ADDRESS.to_string(),
        })
    }

    async fn smart_wallet_address(&self, smart: &StubSmartWallet) -> BackendResult<String> {
        Ok(smart.address.clone())
    }
}
