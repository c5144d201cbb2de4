//! Trait definitions with mockall annotations for testing
//!
//! Every side effect of a run goes through one of these seams: the ledger
//! files, the allow-list fetch, the chain, notifications, randomness and time.
//! The engine and scheduler are generic over them so tests can substitute
//! mocks or fakes.

use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{Address, AddressSet};

use crate::error::DisburserResult;
use crate::types::{Confirmation, LedgerKind, TokenAmount, TransferHandle};

/// Durable storage for the sent and pending ledgers
#[mockall::automock]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load a ledger; a ledger that was never written is empty
    async fn load(&self, ledger: LedgerKind) -> DisburserResult<AddressSet>;

    /// Replace a ledger's contents with `addresses`
    async fn save(&self, ledger: LedgerKind, addresses: &AddressSet) -> DisburserResult<()>;
}

/// Source of the authoritative allow-list
#[mockall::automock]
#[async_trait]
pub trait EligibilitySource: Send + Sync {
    /// Fetch the allow-list in canonical form, duplicates removed
    async fn fetch(&self) -> DisburserResult<Vec<Address>>;
}

/// Token transfer capability on the chain
#[mockall::automock]
#[async_trait]
pub trait TokenTransfer: Send + Sync {
    /// Number of decimals the token uses
    async fn decimals(&self) -> DisburserResult<u8>;

    /// Submit a transfer and return as soon as it is accepted by the node
    async fn transfer(&self, recipient: &Address, amount: TokenAmount) -> DisburserResult<TransferHandle>;

    /// Wait until the transfer is `confirmations` blocks deep
    async fn await_confirmation(&self, handle: &TransferHandle, confirmations: u64) -> DisburserResult<Confirmation>;
}

/// Best-effort notification channel
///
/// Implementations must not block the caller and must swallow their own
/// delivery failures.
#[mockall::automock]
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Random integer source used for every randomized decision
#[mockall::automock]
pub trait RandomSource: Send + Sync {
    /// Uniform integer in `[low, high]`; callers guarantee `low <= high`
    fn gen_range(&self, low: u64, high: u64) -> u64;
}

/// Wall clock and sleeping
#[mockall::automock]
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}
