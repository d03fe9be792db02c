// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded ledger database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `customers`: customer_id → serialized Customer
//! - `accounts`: account_id → serialized Account
//! - `account_numbers`: human-facing number → account_id
//! - `customer_accounts`: composite key (customer_id|!created_ts|account_id) → account_id
//! - `operations`: idempotency key → serialized LedgerOperation

use std::path::Path;

use redb::{Database, ReadTransaction, ReadableDatabase, TableDefinition, WriteTransaction};
use uuid::Uuid;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary customer table: customer_id → serialized Customer (JSON bytes).
pub(crate) const CUSTOMERS: TableDefinition<&str, &[u8]> = TableDefinition::new("customers");

/// Primary account table: account_id → serialized Account (JSON bytes).
pub(crate) const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

/// Map: human-facing account number → account_id.
pub(crate) const ACCOUNT_NUMBERS: TableDefinition<&str, &str> =
    TableDefinition::new("account_numbers");

/// Index: composite key → account_id.
/// Key format: `customer_id|!created_ts_be|account_id` for newest-first range scans.
pub(crate) const CUSTOMER_ACCOUNTS: TableDefinition<&[u8], &str> =
    TableDefinition::new("customer_accounts");

/// Idempotency records: idempotency key → serialized LedgerOperation (JSON bytes).
pub(crate) const OPERATIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("operations");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite key for the customer_accounts index.
///
/// Format: `customer_id | inverted_timestamp_be_bytes | account_id`
///
/// The inverted timestamp ensures newest-first ordering when scanning forward.
pub(crate) fn account_index_key(customer_id: &Uuid, created_ts: i64, account_id: &Uuid) -> Vec<u8> {
    let customer = customer_id.to_string();
    let account = account_id.to_string();
    let mut key = Vec::with_capacity(customer.len() + 1 + 8 + 1 + account.len());
    key.extend_from_slice(customer.as_bytes());
    key.push(b'|');
    // Invert timestamp for descending order (newest first)
    key.extend_from_slice(&(!created_ts as u64).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(account.as_bytes());
    key
}

/// Build a prefix key for range scanning all accounts of a customer.
pub(crate) fn customer_prefix(customer_id: &Uuid) -> Vec<u8> {
    let customer = customer_id.to_string();
    let mut prefix = Vec::with_capacity(customer.len() + 1);
    prefix.extend_from_slice(customer.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Build the upper bound for a range scan (prefix with all 0xFF bytes appended).
pub(crate) fn customer_prefix_end(customer_id: &Uuid) -> Vec<u8> {
    let customer = customer_id.to_string();
    let mut end = Vec::with_capacity(customer.len() + 1 + 20);
    end.extend_from_slice(customer.as_bytes());
    end.push(b'|');
    // Append enough 0xFF bytes to be past any valid key with this prefix
    end.extend_from_slice(&[0xFF; 20]);
    end
}

// =============================================================================
// LedgerDatabase
// =============================================================================

/// Embedded ACID ledger database.
///
/// Shared by [`IdentityLedger`](crate::ledger::IdentityLedger) and
/// [`AccountLedger`](crate::ledger::AccountLedger); each component owns its
/// own transactions but neither writes the other's tables.
pub struct LedgerDatabase {
    db: Database,
}

impl LedgerDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> DbResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CUSTOMERS)?;
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(ACCOUNT_NUMBERS)?;
            let _ = write_txn.open_table(CUSTOMER_ACCOUNTS)?;
            let _ = write_txn.open_table(OPERATIONS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Begin a read transaction against the authoritative store.
    pub(crate) fn begin_read(&self) -> DbResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    /// Begin a write transaction. redb serializes write transactions, so the
    /// returned transaction holds the single writer slot until commit or drop.
    pub(crate) fn begin_write(&self) -> DbResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Cheap availability check used by the readiness probe.
    pub fn ping(&self) -> DbResult<()> {
        self.db.begin_read()?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (LedgerDatabase, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = LedgerDatabase::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    #[test]
    fn open_precreates_tables() {
        let (db, _dir) = temp_db();
        // A read transaction can open every table immediately after create.
        let read_txn = db.begin_read().unwrap();
        read_txn.open_table(CUSTOMERS).unwrap();
        read_txn.open_table(ACCOUNTS).unwrap();
        read_txn.open_table(ACCOUNT_NUMBERS).unwrap();
        read_txn.open_table(CUSTOMER_ACCOUNTS).unwrap();
        read_txn.open_table(OPERATIONS).unwrap();
    }

    #[test]
    fn ping_succeeds_on_open_database() {
        let (db, _dir) = temp_db();
        db.ping().unwrap();
    }

    #[test]
    fn account_index_key_ordering() {
        // Newer timestamps should produce smaller composite keys (descending)
        let customer = Uuid::new_v4();
        let key_old = account_index_key(&customer, 1000, &Uuid::new_v4());
        let key_new = account_index_key(&customer, 2000, &Uuid::new_v4());
        assert!(key_new < key_old, "Newer timestamps should sort first");
    }

    #[test]
    fn prefix_bounds_cover_index_keys() {
        let customer = Uuid::new_v4();
        let other = Uuid::new_v4();
        let key = account_index_key(&customer, 1234, &Uuid::new_v4());
        let start = customer_prefix(&customer);
        let end = customer_prefix_end(&customer);

        assert!(start.as_slice() <= key.as_slice());
        assert!(key.as_slice() < end.as_slice());

        let foreign = account_index_key(&other, 1234, &Uuid::new_v4());
        assert!(foreign.as_slice() < start.as_slice() || foreign.as_slice() >= end.as_slice());
    }
}
