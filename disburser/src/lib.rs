//! Daily token disbursement library
//!
//! Reconciles a remote allow-list with the local sent/pending ledgers, picks a
//! randomized batch of recipients, sends each a randomized ERC-20 amount with
//! randomized pacing, and records the outcome so the next day's run resumes
//! from disk.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

// Re-export main types
pub use config::{Args, DisbursementConfig};
pub use core::{next_run_delay, DisbursementEngine, Scheduler, Selection};
pub use error::{DisburserError, DisburserResult};
pub use traits::*;
pub use types::*;
