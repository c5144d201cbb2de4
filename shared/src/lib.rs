//! Shared types for the token disbursement job
//!
//! Contains the address model and set utilities the ledger files and the
//! batch selector are built on, the shared error type, and the logging
//! helpers every component uses.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
