// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Idempotency records for balance mutations.
//!
//! Every deposit, withdrawal, and transfer writes a [`LedgerOperation`] in
//! the same transaction as its balance change. The record is keyed by the
//! caller-supplied idempotency key and is never mutated once committed:
//! retrying a key replays the recorded outcome instead of re-applying the
//! mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{LedgerError, LedgerResult};

/// The kind of balance mutation an operation record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Deposit,
    Withdraw,
    Transfer,
}

/// The durably recorded decision of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OperationOutcome {
    /// The mutation was applied. `balance_after` is the balance of the
    /// debited or credited account (the source, for transfers) at commit.
    Applied { balance_after: i64 },
    /// The business rule rejected the mutation; balances are untouched.
    InsufficientFunds,
}

/// A durable record of one balance mutation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerOperation {
    /// Caller-supplied retry token; the record's storage key.
    pub idempotency_key: String,
    /// Which mutation this record belongs to.
    pub kind: OperationKind,
    /// Affected account ids; `[account]` or `[source, dest]`.
    pub account_ids: Vec<Uuid>,
    /// Amount in minor currency units.
    pub amount: i64,
    /// The recorded decision.
    pub outcome: OperationOutcome,
    /// When the outcome was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl LedgerOperation {
    pub(crate) fn new(
        idempotency_key: &str,
        kind: OperationKind,
        account_ids: Vec<Uuid>,
        amount: i64,
        outcome: OperationOutcome,
    ) -> Self {
        Self {
            idempotency_key: idempotency_key.to_string(),
            kind,
            account_ids,
            amount,
            outcome,
            recorded_at: Utc::now(),
        }
    }

    /// Post-commit balance of the debited or credited account, when applied.
    pub fn balance_after(&self) -> Option<i64> {
        match self.outcome {
            OperationOutcome::Applied { balance_after } => Some(balance_after),
            OperationOutcome::InsufficientFunds => None,
        }
    }

    /// Reject replays that reuse a key with different arguments: the stored
    /// record is authoritative, and silently returning it would mask a
    /// confused client.
    pub(crate) fn ensure_matches(
        &self,
        kind: OperationKind,
        account_ids: &[Uuid],
        amount: i64,
    ) -> LedgerResult<()> {
        if self.kind != kind || self.account_ids != account_ids || self.amount != amount {
            return Err(LedgerError::InvalidArgument(format!(
                "idempotency key {:?} was already used with different arguments",
                self.idempotency_key
            )));
        }
        Ok(())
    }

    /// Convert a stored record into the result its original invocation
    /// produced.
    pub(crate) fn into_replay(self) -> LedgerResult<OperationReceipt> {
        match self.outcome {
            OperationOutcome::Applied { .. } => Ok(OperationReceipt {
                operation: self,
                replayed: true,
            }),
            OperationOutcome::InsufficientFunds => Err(LedgerError::InsufficientFunds),
        }
    }
}

/// Result of a successful (applied) mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationReceipt {
    /// The recorded operation, including `balance_after`.
    pub operation: LedgerOperation,
    /// True when the outcome came from an earlier invocation of the same
    /// idempotency key.
    pub replayed: bool,
}
