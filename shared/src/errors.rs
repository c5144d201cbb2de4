//! Shared error types for the disbursement job

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Invalid address: {input:?}")]
    InvalidAddress { input: String },

    #[error("Invalid range for {field}: min {min} > max {max}")]
    InvalidRange { field: String, min: u64, max: u64 },
}

pub type SharedResult<T> = Result<T, SharedError>;
