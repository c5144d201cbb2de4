//! Core disbursement logic
//!
//! The selector is pure; the engine and scheduler only touch the outside
//! world through the injected service traits.

pub mod engine;
pub mod scheduler;
pub mod selector;

pub use engine::DisbursementEngine;
pub use scheduler::{next_run_delay, next_utc_midnight, Scheduler};
pub use selector::{candidates, select_batch, Selection};
