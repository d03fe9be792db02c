// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The externally modeled identity verification check.
//!
//! Real deployments call out to a KYC provider here. The seam is a trait so
//! the workflow and its tests can run against local stand-ins.

use std::time::Duration;

use async_trait::async_trait;

use crate::ledger::Customer;

/// Terminal decision of a verification check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationDecision {
    Approved,
    Rejected,
}

/// An identity verification backend.
#[async_trait]
pub trait VerificationCheck: Send + Sync {
    async fn verify(&self, customer: &Customer) -> VerificationDecision;
}

/// Stand-in for a real KYC provider: waits out a configurable review delay,
/// then approves.
pub struct SimulatedCheck {
    delay: Duration,
}

impl SimulatedCheck {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl VerificationCheck for SimulatedCheck {
    async fn verify(&self, _customer: &Customer) -> VerificationDecision {
        tokio::time::sleep(self.delay).await;
        VerificationDecision::Approved
    }
}
