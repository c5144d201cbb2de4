//! Disburser-specific data types

use std::fmt;
use serde::{Deserialize, Serialize};
use shared::{Address, RunId};

use crate::error::{DisburserError, DisburserResult};

/// The two persisted ledgers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerKind {
    /// Addresses that have ever received a confirmed transfer
    Sent,
    /// Addresses whose attempt failed in the most recent run
    Pending,
}

impl LedgerKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            LedgerKind::Sent => "kyc_addresses_sent.txt",
            LedgerKind::Pending => "kyc_addresses_pending.txt",
        }
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerKind::Sent => write!(f, "sent"),
            LedgerKind::Pending => write!(f, "pending"),
        }
    }
}

/// Whole-token amount together with the token's decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub whole: u64,
    pub decimals: u8,
}

impl TokenAmount {
    pub fn new(whole: u64, decimals: u8) -> Self {
        Self { whole, decimals }
    }

    /// Amount in the token's smallest unit
    pub fn base_units(&self) -> DisburserResult<u128> {
        10u128
            .checked_pow(u32::from(self.decimals))
            .and_then(|scale| u128::from(self.whole).checked_mul(scale))
            .ok_or(DisburserError::AmountOverflow { whole: self.whole, decimals: self.decimals })
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.whole)
    }
}

/// Identifies a submitted transfer until it is confirmed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferHandle {
    pub recipient: Address,
    pub tx_hash: String,
}

/// A transfer that reached the required depth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

/// Outcome of the single attempt made for a recipient in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptOutcome {
    Success { tx_hash: String, block_number: Option<u64> },
    Failure { reason: String },
}

/// One recipient, one amount, one outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAttempt {
    pub recipient: Address,
    pub amount: TokenAmount,
    pub outcome: AttemptOutcome,
}

impl TransferAttempt {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success { .. })
    }

    /// Transaction hash, present only on success
    pub fn tx_hash(&self) -> Option<&str> {
        match &self.outcome {
            AttemptOutcome::Success { tx_hash, .. } => Some(tx_hash),
            AttemptOutcome::Failure { .. } => None,
        }
    }
}

/// Aggregate counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_attempts(attempts: &[TransferAttempt]) -> Self {
        let succeeded = attempts.iter().filter(|a| a.succeeded()).count();
        Self {
            attempted: attempts.len(),
            succeeded,
            failed: attempts.len() - succeeded,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attempted {}, succeeded {}, failed {}",
            self.attempted, self.succeeded, self.failed
        )
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// The batch was iterated to the end
    Completed,
    /// Eligibility list was empty or could not be fetched
    NoEligibleAddresses,
    /// Every eligible address has already been served
    NothingToDo,
}

/// Everything a finished run reports back to the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: RunId,
    pub status: RunStatus,
    pub summary: RunSummary,
    pub attempts: Vec<TransferAttempt>,
}

impl RunReport {
    pub fn skipped(run_id: RunId, status: RunStatus) -> Self {
        Self {
            run_id,
            status,
            summary: RunSummary::default(),
            attempts: Vec::new(),
        }
    }
}

/// Engine lifecycle within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Idle,
    Running,
    Completed,
}
