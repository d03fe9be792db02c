// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Stuck Verification Sweeper
//!
//! Background task that periodically resumes verification runs lost to a
//! crash or restart. A customer whose status has sat in `in_progress` past
//! the stuck threshold gets the check re-run and the terminal transition
//! applied through the same conditional write as a live workflow run; the
//! compare-and-swap guarantees that a sweep racing a still-running workflow
//! produces exactly one terminal transition.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::VerificationWorkflow;
use crate::ledger::IdentityLedger;

/// Default interval between sweeps.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Default age in seconds at which an in-progress verification counts as stuck.
const DEFAULT_STUCK_AFTER_SECS: i64 = 300;

/// Background reconciliation of stranded `in_progress` customers.
pub struct VerificationSweeper {
    identity: Arc<IdentityLedger>,
    workflow: VerificationWorkflow,
    sweep_interval: Duration,
    stuck_after: chrono::Duration,
}

impl VerificationSweeper {
    /// Create a sweeper with the default intervals.
    pub fn new(identity: Arc<IdentityLedger>, workflow: VerificationWorkflow) -> Self {
        Self {
            identity,
            workflow,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            stuck_after: chrono::Duration::seconds(DEFAULT_STUCK_AFTER_SECS),
        }
    }

    /// Override the sweep interval and stuck threshold.
    pub fn with_intervals(mut self, sweep_interval: Duration, stuck_after_secs: i64) -> Self {
        self.sweep_interval = sweep_interval;
        self.stuck_after = chrono::Duration::seconds(stuck_after_secs);
        self
    }

    /// Run the sweeper loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.sweep_interval.as_secs(),
            stuck_after_secs = self.stuck_after.num_seconds(),
            "Verification sweeper starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Verification sweeper shutting down");
                return;
            }

            self.sweep_step().await;

            tokio::select! {
                _ = tokio::time::sleep(self.sweep_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Verification sweeper shutting down");
                    return;
                }
            }
        }
    }

    /// Execute one sweep: find stuck customers and finish each run.
    async fn sweep_step(&self) {
        let stuck = match self.identity.stuck_in_progress(self.stuck_after) {
            Ok(stuck) => stuck,
            Err(err) => {
                warn!(error = %err, "Verification sweeper: failed to scan for stuck customers");
                return;
            }
        };

        if stuck.is_empty() {
            return;
        }

        info!(
            count = stuck.len(),
            "Verification sweeper: resuming stuck verifications"
        );

        for customer_id in stuck {
            info!(customer_id = %customer_id, "Verification sweeper: resuming run");
            // `finish` logs its own failures; one stuck customer must not
            // stop the rest of the sweep.
            self.workflow.finish(customer_id).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{KycStatus, NewCustomer};
    use crate::storage::LedgerDatabase;
    use crate::workflow::SimulatedCheck;

    fn test_sweeper() -> (VerificationSweeper, Arc<IdentityLedger>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(LedgerDatabase::open(&dir.path().join("test.redb")).unwrap());
        let identity = Arc::new(IdentityLedger::new(db));
        let workflow = VerificationWorkflow::new(
            identity.clone(),
            Arc::new(SimulatedCheck::new(Duration::ZERO)),
        );
        let sweeper = VerificationSweeper::new(identity.clone(), workflow)
            .with_intervals(Duration::from_millis(10), 0);
        (sweeper, identity, dir)
    }

    fn stranded_customer(identity: &IdentityLedger) -> uuid::Uuid {
        let customer = identity
            .create(NewCustomer {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@example.com".into(),
                residence_address: "12 Analytical Lane, London".into(),
                birth_date: "1990-12-10T00:00:00Z".parse().unwrap(),
            })
            .unwrap();
        identity
            .transition(customer.id, KycStatus::Pending, KycStatus::InProgress)
            .unwrap();
        customer.id
    }

    #[tokio::test]
    async fn sweep_completes_a_stranded_customer() {
        let (sweeper, identity, _dir) = test_sweeper();
        let customer_id = stranded_customer(&identity);

        sweeper.sweep_step().await;

        assert_eq!(
            identity.kyc_status(customer_id).unwrap(),
            KycStatus::Approved
        );
    }

    #[tokio::test]
    async fn sweep_ignores_pending_and_terminal_customers() {
        let (sweeper, identity, _dir) = test_sweeper();

        let pending = identity
            .create(NewCustomer {
                first_name: "Alan".into(),
                last_name: "Turing".into(),
                email: "alan@example.com".into(),
                residence_address: "2 Bombe Street, Bletchley".into(),
                birth_date: "1991-06-23T00:00:00Z".parse().unwrap(),
            })
            .unwrap();

        sweeper.sweep_step().await;

        assert_eq!(
            identity.kyc_status(pending.id).unwrap(),
            KycStatus::Pending
        );
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let (sweeper, identity, _dir) = test_sweeper();
        let customer_id = stranded_customer(&identity);

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(sweeper.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(
            identity.kyc_status(customer_id).unwrap(),
            KycStatus::Approved
        );
    }
}
