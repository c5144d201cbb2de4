//! Service-specific tests
//!
//! Each service has its own test file with dedicated fixtures and helpers.


// Common test utilities for services
pub mod common {
    use std::time::Duration;
    use shared::Address;

    /// Upper bound for waiting on fire-and-forget deliveries
    pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn addr(raw: &str) -> Address {
        Address::parse(raw).expect("valid test address")
    }
}
