//! Clonable in-memory fakes
//!
//! Each fake keeps its state behind an `Arc<Mutex<_>>` so a test can hand one
//! clone to the engine and inspect the other afterwards.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use disburser::{
    Clock, Confirmation, DisburserError, DisburserResult, EligibilitySource, LedgerKind, Notifier, RandomSource,
    StateStore, TokenAmount, TokenTransfer, TransferHandle,
};
use shared::{Address, AddressSet};

/// Ledgers kept in memory, with a log of every save
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    sent: AddressSet,
    pending: AddressSet,
    saves: Vec<(LedgerKind, AddressSet)>,
    fail_sent_saves: bool,
    pending_saves_allowed: Option<usize>,
    pending_saves: usize,
}

impl MemoryStore {
    pub fn with_ledgers(sent: AddressSet, pending: AddressSet) -> Self {
        let store = Self::default();
        {
            let mut state = store.inner.lock().unwrap();
            state.sent = sent;
            state.pending = pending;
        }
        store
    }

    /// Make every save of the sent ledger fail with an I/O error
    pub fn failing_sent_saves(self) -> Self {
        self.inner.lock().unwrap().fail_sent_saves = true;
        self
    }

    /// Let the first `allowed` pending saves through and fail the rest
    pub fn failing_pending_saves_after(self, allowed: usize) -> Self {
        self.inner.lock().unwrap().pending_saves_allowed = Some(allowed);
        self
    }

    pub fn sent(&self) -> AddressSet {
        self.inner.lock().unwrap().sent.clone()
    }

    pub fn pending(&self) -> AddressSet {
        self.inner.lock().unwrap().pending.clone()
    }

    pub fn saves(&self) -> Vec<(LedgerKind, AddressSet)> {
        self.inner.lock().unwrap().saves.clone()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self, ledger: LedgerKind) -> DisburserResult<AddressSet> {
        let state = self.inner.lock().unwrap();
        Ok(match ledger {
            LedgerKind::Sent => state.sent.clone(),
            LedgerKind::Pending => state.pending.clone(),
        })
    }

    async fn save(&self, ledger: LedgerKind, addresses: &AddressSet) -> DisburserResult<()> {
        let mut state = self.inner.lock().unwrap();
        let refused = match ledger {
            LedgerKind::Sent => state.fail_sent_saves,
            LedgerKind::Pending => {
                state.pending_saves += 1;
                state
                    .pending_saves_allowed
                    .is_some_and(|allowed| state.pending_saves > allowed)
            }
        };
        if refused {
            return Err(DisburserError::StateError {
                operation: "write".to_string(),
                ledger,
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only filesystem"),
            });
        }
        state.saves.push((ledger, addresses.clone()));
        match ledger {
            LedgerKind::Sent => state.sent = addresses.clone(),
            LedgerKind::Pending => state.pending = addresses.clone(),
        }
        Ok(())
    }
}

/// Allow-list that returns a fixed list or a fixed failure
#[derive(Clone)]
pub struct ScriptedEligibility {
    result: Result<Vec<Address>, String>,
}

impl ScriptedEligibility {
    pub fn list(addresses: Vec<Address>) -> Self {
        Self { result: Ok(addresses) }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl EligibilitySource for ScriptedEligibility {
    async fn fetch(&self) -> DisburserResult<Vec<Address>> {
        self.result.clone().map_err(DisburserError::eligibility)
    }
}

/// Chain double with per-recipient failure modes and a call log
#[derive(Clone)]
pub struct FakeChain {
    decimals: Result<u8, String>,
    rejected: AddressSet,
    reverted: AddressSet,
    stalled: AddressSet,
    calls: Arc<Mutex<Vec<(Address, TokenAmount)>>>,
}

impl FakeChain {
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals: Ok(decimals),
            rejected: AddressSet::new(),
            reverted: AddressSet::new(),
            stalled: AddressSet::new(),
            calls: Arc::default(),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            decimals: Err("connection refused".to_string()),
            ..Self::new(18)
        }
    }

    /// Submission fails for `address`
    pub fn rejecting(mut self, address: &Address) -> Self {
        self.rejected.insert(address.clone());
        self
    }

    /// Submission succeeds but the receipt reports failure for `address`
    pub fn reverting(mut self, address: &Address) -> Self {
        self.reverted.insert(address.clone());
        self
    }

    /// Confirmation for `address` never arrives
    pub fn stalling(mut self, address: &Address) -> Self {
        self.stalled.insert(address.clone());
        self
    }

    pub fn calls(&self) -> Vec<(Address, TokenAmount)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn recipients(&self) -> Vec<Address> {
        self.calls().into_iter().map(|(address, _)| address).collect()
    }
}

#[async_trait]
impl TokenTransfer for FakeChain {
    async fn decimals(&self) -> DisburserResult<u8> {
        self.decimals.clone().map_err(DisburserError::chain)
    }

    async fn transfer(&self, recipient: &Address, amount: TokenAmount) -> DisburserResult<TransferHandle> {
        self.calls.lock().unwrap().push((recipient.clone(), amount));
        if self.rejected.contains(recipient) {
            return Err(DisburserError::chain("insufficient funds for transfer"));
        }
        Ok(TransferHandle {
            recipient: recipient.clone(),
            tx_hash: format!("0xhash-{}", recipient),
        })
    }

    async fn await_confirmation(&self, handle: &TransferHandle, _confirmations: u64) -> DisburserResult<Confirmation> {
        if self.stalled.contains(&handle.recipient) {
            std::future::pending::<()>().await;
        }
        if self.reverted.contains(&handle.recipient) {
            return Err(DisburserError::TransferReverted {
                recipient: handle.recipient.clone(),
                tx_hash: handle.tx_hash.clone(),
            });
        }
        Ok(Confirmation {
            tx_hash: handle.tx_hash.clone(),
            block_number: Some(100),
        })
    }
}

/// Collects every notification in order
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|m| m.starts_with("*Error:*"))
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Replays queued draws clamped into the requested range, then returns `low`
#[derive(Clone, Default)]
pub struct ScriptedRandom {
    draws: Arc<Mutex<VecDeque<u64>>>,
    requests: Arc<Mutex<Vec<(u64, u64)>>>,
}

impl ScriptedRandom {
    pub fn new(draws: &[u64]) -> Self {
        Self {
            draws: Arc::new(Mutex::new(draws.iter().copied().collect())),
            requests: Arc::default(),
        }
    }

    /// Every `(low, high)` range requested so far
    pub fn requests(&self) -> Vec<(u64, u64)> {
        self.requests.lock().unwrap().clone()
    }
}

impl RandomSource for ScriptedRandom {
    fn gen_range(&self, low: u64, high: u64) -> u64 {
        self.requests.lock().unwrap().push((low, high));
        let next = self.draws.lock().unwrap().pop_front().unwrap_or(low);
        next.clamp(low, high)
    }
}

/// Fixed wall clock that records sleeps instead of sleeping
#[derive(Clone)]
pub struct RecordingClock {
    now: DateTime<Utc>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            sleeps: Arc::default(),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for RecordingClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
