//! Service implementations
//!
//! Real implementations of the service traits. These are the production
//! implementations that perform file, network and chain I/O.

pub mod eligibility;
pub mod notifier;
pub mod runtime;
pub mod state_store;
pub mod token_client;

#[cfg(test)]
mod tests;

pub use eligibility::HttpEligibilitySource;
pub use notifier::TelegramNotifier;
pub use runtime::{SystemClock, ThreadRandom};
pub use state_store::FileStateStore;
pub use token_client::AlloyTokenClient;
