// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger error taxonomy.
//!
//! Business-rule failures (`InsufficientFunds`, `PreconditionFailed`) are
//! ordinary recorded outcomes, not storage faults. `Storage` wraps the
//! embedded database errors; an operation that fails with `Storage` before
//! commit leaves no idempotency record behind, so retrying it with the same
//! key is safe.

use crate::storage::DbError;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Malformed or inconsistent caller input (non-positive amount,
    /// same-account transfer, idempotency key reused with different
    /// arguments).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The referenced customer or account does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A guard condition failed (customer KYC not approved).
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// A withdrawal or transfer exceeds the available balance. This is a
    /// durably recorded outcome: replays of the same idempotency key return
    /// it again without re-checking the live balance.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// A conditional KYC transition lost its race: the stored status no
    /// longer matches the expected prior state, or the requested edge is not
    /// part of the state machine.
    #[error("concurrent modification: {0}")]
    ConcurrentModification(String),

    /// Transient storage failure. Nothing was recorded; retry with the same
    /// idempotency key.
    #[error("storage failure: {0}")]
    Storage(#[from] DbError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

// Ledger operations talk to redb directly inside their transactions; fold
// the crate's error ladder into `Storage` so `?` works at every call site.

impl From<redb::TransactionError> for LedgerError {
    fn from(err: redb::TransactionError) -> Self {
        LedgerError::Storage(err.into())
    }
}

impl From<redb::TableError> for LedgerError {
    fn from(err: redb::TableError) -> Self {
        LedgerError::Storage(err.into())
    }
}

impl From<redb::StorageError> for LedgerError {
    fn from(err: redb::StorageError) -> Self {
        LedgerError::Storage(err.into())
    }
}

impl From<redb::CommitError> for LedgerError {
    fn from(err: redb::CommitError) -> Self {
        LedgerError::Storage(err.into())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Storage(err.into())
    }
}
