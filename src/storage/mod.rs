// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Storage Module
//!
//! Persistent storage for the ledger, backed by an embedded ACID database
//! (redb). The database is consumed through the narrow [`LedgerDatabase`]
//! handle; the on-disk format belongs to the redb crate and is not part of
//! this system's design.
//!
//! ## Why an embedded single-writer store
//!
//! Every balance mutation must be atomic across the accounts it touches and
//! the idempotency record it leaves behind. redb write transactions are
//! serialized (single writer) and commit multi-table changes atomically,
//! which gives the ledger its per-account ordering guarantee without
//! explicit row locks: two concurrent deposits to the same account cannot
//! interleave, and opposing transfers between the same pair of accounts
//! cannot deadlock.

pub mod database;

pub use database::{DbError, DbResult, LedgerDatabase};
