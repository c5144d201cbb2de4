//! Test fixtures and builders for engine and scheduler tests

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use disburser::config::SigningKey;
use disburser::{DisbursementConfig, DisbursementEngine};
use shared::{Address, AddressSet, InclusiveRange};
use url::Url;

use super::fakes::{FakeChain, MemoryStore, RecordingClock, RecordingNotifier, ScriptedEligibility, ScriptedRandom};

pub type TestEngine =
    DisbursementEngine<MemoryStore, ScriptedEligibility, FakeChain, RecordingNotifier, ScriptedRandom, RecordingClock>;

/// Standard test data
pub struct TestFixtures;

impl TestFixtures {
    pub const ALICE: &'static str = "0x00000000000000000000000000000000000000a1";
    pub const BOB: &'static str = "0x00000000000000000000000000000000000000b2";
    pub const CAROL: &'static str = "0x00000000000000000000000000000000000000c3";
    pub const DAVE: &'static str = "0x00000000000000000000000000000000000000d4";

    pub fn address(raw: &str) -> Address {
        Address::parse(raw).unwrap()
    }

    pub fn addresses(raw: &[&str]) -> Vec<Address> {
        raw.iter().map(|s| Self::address(s)).collect()
    }

    pub fn set(raw: &[&str]) -> AddressSet {
        Self::addresses(raw).into_iter().collect()
    }

    /// Mid-afternoon, so the next midnight is 9.5 hours away
    pub fn afternoon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 14, 30, 0).unwrap()
    }

    /// Config with zero pacing and a fixed batch size
    pub fn config(min_tx: u64, max_tx: u64) -> DisbursementConfig {
        DisbursementConfig {
            signing_key: SigningKey::new("0xdeadbeef"),
            rpc_url: Url::parse("http://127.0.0.1:8545").unwrap(),
            token_address: "0x5fbdb2315678afecb367f032d93f642f64180aa3".to_string(),
            eligibility_url: Url::parse("http://127.0.0.1:9/list.txt").unwrap(),
            state_dir: PathBuf::from("."),
            token_amount: InclusiveRange::new("token amount", 10, 20).unwrap(),
            delay_ms: InclusiveRange::new("delay", 0, 0).unwrap(),
            tx_per_day: InclusiveRange::new("transactions per day", min_tx, max_tx).unwrap(),
            confirmations: DisbursementConfig::DEFAULT_CONFIRMATIONS,
            confirmation_timeout: Duration::from_secs(5),
            midnight_jitter: Duration::from_secs(DisbursementConfig::DEFAULT_JITTER_SECS),
            telegram: None,
        }
    }
}

/// Builds an engine from fakes while keeping clones for inspection
pub struct EngineBuilder {
    pub config: DisbursementConfig,
    pub store: MemoryStore,
    pub eligibility: ScriptedEligibility,
    pub chain: FakeChain,
    pub notifier: RecordingNotifier,
    pub random: ScriptedRandom,
    pub clock: RecordingClock,
}

impl EngineBuilder {
    pub fn new(eligible: &[&str]) -> Self {
        Self {
            config: TestFixtures::config(1, 10),
            store: MemoryStore::default(),
            eligibility: ScriptedEligibility::list(TestFixtures::addresses(eligible)),
            chain: FakeChain::new(18),
            notifier: RecordingNotifier::default(),
            random: ScriptedRandom::default(),
            clock: RecordingClock::at(TestFixtures::afternoon()),
        }
    }

    pub fn with_tx_per_day(mut self, min: u64, max: u64) -> Self {
        self.config.tx_per_day = InclusiveRange::new("transactions per day", min, max).unwrap();
        self
    }

    pub fn with_delay_ms(mut self, min: u64, max: u64) -> Self {
        self.config.delay_ms = InclusiveRange::new("delay", min, max).unwrap();
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.config.confirmation_timeout = timeout;
        self
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.config.midnight_jitter = jitter;
        self
    }

    pub fn with_ledgers(mut self, sent: &[&str], pending: &[&str]) -> Self {
        self.store = MemoryStore::with_ledgers(TestFixtures::set(sent), TestFixtures::set(pending));
        self
    }

    pub fn with_store(mut self, store: MemoryStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_eligibility(mut self, eligibility: ScriptedEligibility) -> Self {
        self.eligibility = eligibility;
        self
    }

    pub fn with_chain(mut self, chain: FakeChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_draws(mut self, draws: &[u64]) -> Self {
        self.random = ScriptedRandom::new(draws);
        self
    }

    pub fn build(&self) -> TestEngine {
        DisbursementEngine::new(
            self.config.clone(),
            self.store.clone(),
            self.eligibility.clone(),
            self.chain.clone(),
            self.notifier.clone(),
            self.random.clone(),
            self.clock.clone(),
        )
    }
}
