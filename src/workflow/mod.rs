// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Verification Workflow
//!
//! Drives a customer's KYC status from `pending` to a terminal state,
//! detached from the request that registered the customer.
//!
//! ## Lifecycle
//!
//! ```text
//! spawn → transition(pending → in_progress)
//!       → VerificationCheck (external, may take minutes)
//!       → transition(in_progress → approved | rejected)
//! ```
//!
//! The run is fire-and-forget: the registering request returns immediately
//! and never awaits it. Each conditional transition either wins or logs and
//! ends the run; a run that loses its race or crashes leaves the customer in
//! `in_progress`, which the [`sweeper`] picks up later.

pub mod check;
pub mod sweeper;

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::ledger::{IdentityLedger, KycStatus};
use check::{VerificationCheck, VerificationDecision};

pub use check::SimulatedCheck;
pub use sweeper::VerificationSweeper;

/// Asynchronous KYC verification driver.
#[derive(Clone)]
pub struct VerificationWorkflow {
    identity: Arc<IdentityLedger>,
    check: Arc<dyn VerificationCheck>,
}

impl VerificationWorkflow {
    pub fn new(identity: Arc<IdentityLedger>, check: Arc<dyn VerificationCheck>) -> Self {
        Self { identity, check }
    }

    /// Start a verification run for a freshly registered customer.
    ///
    /// Detached from the caller: the run outlives the HTTP response and is
    /// not awaited by anyone. The inner task gives the run its own panic
    /// boundary, so a crashing check is logged here instead of unwinding
    /// into unrelated work.
    pub fn spawn(&self, customer_id: Uuid) {
        let workflow = self.clone();
        tokio::spawn(async move {
            let run = tokio::spawn(async move { workflow.run(customer_id).await });
            if let Err(err) = run.await {
                if err.is_panic() {
                    error!(customer_id = %customer_id, "verification run panicked");
                }
            }
        });
    }

    /// Execute one full verification run.
    pub async fn run(&self, customer_id: Uuid) {
        if let Err(err) =
            self.identity
                .transition(customer_id, KycStatus::Pending, KycStatus::InProgress)
        {
            warn!(
                customer_id = %customer_id,
                error = %err,
                "failed to start verification"
            );
            return;
        }

        self.finish(customer_id).await;
    }

    /// Run the check and apply the terminal transition for a customer
    /// already `in_progress`. Also the resumption entry point used by the
    /// sweeper.
    pub async fn finish(&self, customer_id: Uuid) {
        let customer = match self.identity.get(customer_id) {
            Ok(customer) => customer,
            Err(err) => {
                warn!(
                    customer_id = %customer_id,
                    error = %err,
                    "failed to load customer for verification"
                );
                return;
            }
        };

        let next = match self.check.verify(&customer).await {
            VerificationDecision::Approved => KycStatus::Approved,
            VerificationDecision::Rejected => KycStatus::Rejected,
        };

        if let Err(err) = self
            .identity
            .transition(customer_id, KycStatus::InProgress, next)
        {
            warn!(
                customer_id = %customer_id,
                error = %err,
                "failed to record verification result"
            );
            return;
        }

        info!(customer_id = %customer_id, status = ?next, "verification complete");
    }
}
