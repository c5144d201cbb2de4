//! Disburser error types

use std::time::Duration;
use thiserror::Error;
use shared::{Address, SharedError};

use crate::types::LedgerKind;

/// Result type for disburser operations
pub type DisburserResult<T> = Result<T, DisburserError>;

/// Disburser error types
#[derive(Error, Debug)]
pub enum DisburserError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("State file operation failed: {operation} on {ledger}: {source}")]
    StateError {
        operation: String,
        ledger: LedgerKind,
        #[source]
        source: std::io::Error,
    },

    #[error("Eligibility fetch failed: {message}")]
    EligibilityError { message: String },

    #[error("Chain RPC error: {message}")]
    ChainError { message: String },

    #[error("Transfer to {recipient} reverted in transaction {tx_hash}")]
    TransferReverted { recipient: Address, tx_hash: String },

    #[error("Confirmation of {tx_hash} timed out after {timeout:?}")]
    ConfirmationTimeout { tx_hash: String, timeout: Duration },

    #[error("Amount {whole} with {decimals} decimals overflows base units")]
    AmountOverflow { whole: u64, decimals: u8 },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),
}

impl DisburserError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError { message: message.into() }
    }

    pub fn chain(message: impl std::fmt::Display) -> Self {
        Self::ChainError { message: message.to_string() }
    }

    pub fn eligibility(message: impl std::fmt::Display) -> Self {
        Self::EligibilityError { message: message.to_string() }
    }
}
