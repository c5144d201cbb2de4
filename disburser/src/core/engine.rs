//! Disbursement engine
//!
//! One call to [`DisbursementEngine::run`] is one day's run: reconcile the
//! allow-list with the ledgers, pick the batch, then attempt each recipient
//! exactly once. The sent ledger is persisted after every confirmed transfer;
//! the pending ledger is cleared when the batch is chosen and rewritten with
//! this run's failures when the batch is done.
//!
//! Known gap: because pending is replaced wholesale, an address that failed
//! last run but is not picked this run drops out of pending. If it is also
//! in sent from an earlier run it will not be offered again.

use std::time::Duration;

use shared::{component_error, component_info, Address, AddressSet, Component, RunId};
use crate::config::DisbursementConfig;
use crate::core::selector::{select_batch, Selection};
use crate::error::{DisburserError, DisburserResult};
use crate::traits::{Clock, EligibilitySource, Notifier, RandomSource, StateStore, TokenTransfer};
use crate::types::{
    AttemptOutcome, Confirmation, EngineState, LedgerKind, RunReport, RunStatus, RunSummary, TokenAmount,
    TransferAttempt,
};

/// Runs a single day's disbursement against injected services
pub struct DisbursementEngine<S, E, T, N, R, C>
where
    S: StateStore,
    E: EligibilitySource,
    T: TokenTransfer,
    N: Notifier,
    R: RandomSource,
    C: Clock,
{
    config: DisbursementConfig,
    state: EngineState,

    // Injected dependencies (mockable for testing)
    store: S,
    eligibility: E,
    token: T,
    notifier: N,
    random: R,
    clock: C,
}

impl<S, E, T, N, R, C> DisbursementEngine<S, E, T, N, R, C>
where
    S: StateStore,
    E: EligibilitySource,
    T: TokenTransfer,
    N: Notifier,
    R: RandomSource,
    C: Clock,
{
    pub fn new(config: DisbursementConfig, store: S, eligibility: E, token: T, notifier: N, random: R, clock: C) -> Self {
        Self {
            config,
            state: EngineState::Idle,
            store,
            eligibility,
            token,
            notifier,
            random,
            clock,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &DisbursementConfig {
        &self.config
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn random(&self) -> &R {
        &self.random
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Execute one run to completion
    ///
    /// Errors returned here are the unclassified kind: chain unreachable when
    /// reading decimals, or ledger I/O failing outside the per-recipient loop.
    pub async fn run(&mut self) -> DisburserResult<RunReport> {
        self.state = EngineState::Running;
        let result = self.execute(RunId::new()).await;
        self.state = EngineState::Completed;
        result
    }

    async fn execute(&mut self, run_id: RunId) -> DisburserResult<RunReport> {
        component_info!(Component::Engine, run = %run_id, "🚀 Starting disbursement run");

        let decimals = self.token.decimals().await?;

        let eligibility = match self.eligibility.fetch().await {
            Ok(addresses) => addresses,
            Err(e) => {
                self.report_error(&format!("Failed to fetch eligibility list: {e}"));
                Vec::new()
            }
        };
        if eligibility.is_empty() {
            self.report_error("No eligible addresses available");
            return Ok(RunReport::skipped(run_id, RunStatus::NoEligibleAddresses));
        }

        let mut sent = self.store.load(LedgerKind::Sent).await?;
        let pending = self.store.load(LedgerKind::Pending).await?;

        let selection = select_batch(&eligibility, &sent, &pending, self.config.tx_per_day, &self.random);

        self.store.save(LedgerKind::Pending, &AddressSet::new()).await?;

        let recipients = match selection {
            Selection::NothingToDo => {
                component_info!(Component::Engine, run = %run_id, "All eligible addresses have already received tokens");
                return Ok(RunReport::skipped(run_id, RunStatus::NothingToDo));
            }
            Selection::Batch { recipients, candidate_count } => {
                component_info!(
                    Component::Engine,
                    run = %run_id,
                    "🎯 Sending {} transfers ({} candidates, {} eligible)",
                    recipients.len(),
                    candidate_count,
                    eligibility.len()
                );
                recipients
            }
        };

        let mut attempts = Vec::with_capacity(recipients.len());
        let mut failed = AddressSet::new();

        for (index, recipient) in recipients.into_iter().enumerate() {
            let amount = TokenAmount::new(
                self.random.gen_range(self.config.token_amount.min(), self.config.token_amount.max()),
                decimals,
            );
            component_info!(Component::Engine, run = %run_id, "🎁 Sending {} tokens to {}", amount, recipient);

            self.pace("before sending").await;

            match self.attempt(&recipient, amount).await {
                Ok(confirmation) => {
                    component_info!(
                        Component::Engine,
                        run = %run_id,
                        block = ?confirmation.block_number,
                        "{}. ✅ Transfer to {} confirmed: {}",
                        index + 1,
                        recipient,
                        confirmation.tx_hash
                    );

                    sent.insert(recipient.clone());
                    if let Err(e) = self.store.save(LedgerKind::Sent, &sent).await {
                        self.report_error(&format!("Failed to persist sent ledger after {recipient}: {e}"));
                    }

                    attempts.push(TransferAttempt {
                        recipient,
                        amount,
                        outcome: AttemptOutcome::Success {
                            tx_hash: confirmation.tx_hash,
                            block_number: confirmation.block_number,
                        },
                    });

                    self.pace("after sending").await;
                }
                Err(e) => {
                    self.report_error(&format!("{}. ❌ Transfer to {} failed: {}", index + 1, recipient, e));
                    failed.insert(recipient.clone());
                    attempts.push(TransferAttempt {
                        recipient,
                        amount,
                        outcome: AttemptOutcome::Failure { reason: e.to_string() },
                    });
                }
            }
        }

        self.store.save(LedgerKind::Pending, &failed).await?;

        let summary = RunSummary::from_attempts(&attempts);
        let message = format!("🎉 Done. Succeeded: {}, Failed: {}", summary.succeeded, summary.failed);
        component_info!(Component::Engine, run = %run_id, "{}", message);
        self.notifier.notify(&message);

        Ok(RunReport {
            run_id,
            status: RunStatus::Completed,
            summary,
            attempts,
        })
    }

    /// Submit and confirm one transfer; every failure mode becomes an error
    async fn attempt(&self, recipient: &Address, amount: TokenAmount) -> DisburserResult<Confirmation> {
        // Reject unrepresentable amounts before touching the chain
        amount.base_units()?;

        let handle = self.token.transfer(recipient, amount).await?;

        let timeout = self.config.confirmation_timeout;
        match tokio::time::timeout(timeout, self.token.await_confirmation(&handle, self.config.confirmations)).await {
            Ok(result) => result,
            Err(_) => Err(DisburserError::ConfirmationTimeout {
                tx_hash: handle.tx_hash.clone(),
                timeout,
            }),
        }
    }

    /// Sleep a random duration within the configured pacing bounds
    async fn pace(&self, when: &str) {
        let delay = Duration::from_millis(
            self.random.gen_range(self.config.delay_ms.min(), self.config.delay_ms.max()),
        );
        if delay.is_zero() {
            return;
        }
        let secs = delay.as_secs();
        component_info!(Component::Engine, "⏳ Waiting {}m {}s {}", secs / 60, secs % 60, when);
        self.clock.sleep(delay).await;
    }

    /// Log locally and forward to the notification channel
    fn report_error(&self, message: &str) {
        component_error!(Component::Engine, "{}", message);
        self.notifier.notify(&format!("*Error:* {message}"));
    }
}
