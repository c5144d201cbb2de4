//! Common test utilities and infrastructure
//!
//! In-memory fakes for every service seam plus standard fixtures, shared by
//! the engine and scheduler suites.

#![allow(dead_code)]

pub mod fakes;
pub mod fixtures;

// Re-export commonly used items for convenience
pub use fakes::{FakeChain, MemoryStore, RecordingClock, RecordingNotifier, ScriptedEligibility, ScriptedRandom};
pub use fixtures::{EngineBuilder, TestEngine, TestFixtures};
