//! Daily cadence
//!
//! Run, then sleep until the next UTC midnight plus a random jitter, forever.
//! A late start does not trigger catch-up runs; it only shifts the next run.

use std::time::Duration;
use chrono::{DateTime, Days, NaiveTime, Utc};

use shared::{component_error, component_info, Component};
use crate::core::engine::DisbursementEngine;
use crate::traits::{Clock, EligibilitySource, Notifier, RandomSource, StateStore, TokenTransfer};
use crate::types::RunReport;

/// Next UTC midnight strictly after `now`
pub fn next_utc_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap_or(now.date_naive());
    tomorrow.and_time(NaiveTime::MIN).and_utc()
}

/// Time to sleep from `now` until the next midnight plus `jitter`
pub fn next_run_delay(now: DateTime<Utc>, jitter: Duration) -> Duration {
    let until_midnight = (next_utc_midnight(now) - now).to_std().unwrap_or(Duration::ZERO);
    until_midnight + jitter
}

/// Drives the engine once per day
pub struct Scheduler<S, E, T, N, R, C>
where
    S: StateStore,
    E: EligibilitySource,
    T: TokenTransfer,
    N: Notifier,
    R: RandomSource,
    C: Clock,
{
    engine: DisbursementEngine<S, E, T, N, R, C>,
    cycles_completed: u64,
}

impl<S, E, T, N, R, C> Scheduler<S, E, T, N, R, C>
where
    S: StateStore,
    E: EligibilitySource,
    T: TokenTransfer,
    N: Notifier,
    R: RandomSource,
    C: Clock,
{
    pub fn new(engine: DisbursementEngine<S, E, T, N, R, C>) -> Self {
        Self {
            engine,
            cycles_completed: 0,
        }
    }

    pub fn engine(&self) -> &DisbursementEngine<S, E, T, N, R, C> {
        &self.engine
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Run the engine once; an error is reported and swallowed
    pub async fn run_once(&mut self) -> Option<RunReport> {
        let report = match self.engine.run().await {
            Ok(report) => Some(report),
            Err(e) => {
                component_error!(Component::Scheduler, "❌ Disbursement run failed: {}", e);
                self.engine.notifier().notify(&format!("*Error:* {e}"));
                None
            }
        };
        self.cycles_completed += 1;
        report
    }

    /// Sleep until the next scheduled run and return how long that was
    pub async fn wait_for_next_run(&self) -> Duration {
        let jitter_ms = u64::try_from(self.engine.config().midnight_jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = Duration::from_millis(self.engine.random().gen_range(0, jitter_ms));

        let now = self.engine.clock().now();
        let delay = next_run_delay(now, jitter);
        let next_midnight = next_utc_midnight(now);

        component_info!(Component::Scheduler, "⏳ Waiting until {} (+{}s jitter)", next_midnight.to_rfc3339(), jitter.as_secs());
        self.engine
            .notifier()
            .notify("Waiting until tomorrow for the next round of transfers...");

        self.engine.clock().sleep(delay).await;
        delay
    }

    /// Run `cycles` run-then-sleep iterations
    pub async fn run_cycles(&mut self, cycles: u64) -> Vec<Option<RunReport>> {
        let mut reports = Vec::new();
        for _ in 0..cycles {
            reports.push(self.run_once().await);
            self.wait_for_next_run().await;
        }
        reports
    }

    /// Run forever; termination is external
    pub async fn run_forever(&mut self) {
        loop {
            self.run_once().await;
            self.wait_for_next_run().await;
        }
    }
}
