// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account ledger: balance storage and the deposit/withdraw/transfer engine.
//!
//! ## Atomicity
//!
//! Every mutation runs inside a single write transaction covering the
//! idempotency-record lookup, the balance read, the business-rule check,
//! the balance write, and the operation-record insert. The transaction
//! either commits all of it or none of it: a storage failure leaves no
//! record behind, so a client retry with the same idempotency key safely
//! re-attempts.
//!
//! ## Ordering
//!
//! redb serializes write transactions, so operations on the same account
//! never interleave into a lost update and opposing transfers between the
//! same pair of accounts cannot deadlock. Transfers still write the two
//! accounts in ascending-id order so the update order for any pair is
//! deterministic.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{LedgerError, LedgerResult};
use super::identity::{Customer, KycStatus};
use super::operation::{LedgerOperation, OperationKind, OperationOutcome, OperationReceipt};
use crate::storage::database::{
    account_index_key, customer_prefix, customer_prefix_end, ACCOUNTS, ACCOUNT_NUMBERS,
    CUSTOMERS, CUSTOMER_ACCOUNTS, OPERATIONS,
};
use crate::storage::{DbError, LedgerDatabase};

/// A customer account holding an integer balance in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier.
    pub id: Uuid,
    /// Owning customer. Many accounts per customer.
    pub customer_id: Uuid,
    /// Human-facing account number, unique and externally addressable.
    pub number: String,
    /// Balance in minor currency units. Never negative.
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

/// Ledger of accounts and the balance mutation engine.
///
/// Holds exclusive write responsibility for the `accounts`,
/// `account_numbers`, `customer_accounts`, and `operations` tables. Reads
/// (never writes) customer KYC status when gating account creation.
pub struct AccountLedger {
    db: Arc<LedgerDatabase>,
}

impl AccountLedger {
    pub fn new(db: Arc<LedgerDatabase>) -> Self {
        Self { db }
    }

    /// Open an account for a customer whose KYC status is `approved`.
    ///
    /// The status check and the insert happen in the same transaction.
    pub fn open_account(&self, customer_id: Uuid) -> LedgerResult<Account> {
        let txn = self.db.begin_write()?;
        let account;
        {
            let customers = txn.open_table(CUSTOMERS)?;
            let customer: Customer = {
                let guard = customers
                    .get(customer_id.to_string().as_str())?
                    .ok_or_else(|| LedgerError::NotFound(format!("customer {customer_id}")))?;
                serde_json::from_slice(guard.value())?
            };
            if customer.kyc_status != KycStatus::Approved {
                return Err(LedgerError::PreconditionFailed(
                    "customer not verified, try again later".into(),
                ));
            }

            account = Account {
                id: Uuid::new_v4(),
                customer_id,
                number: Uuid::new_v4().to_string(),
                balance: 0,
                created_at: Utc::now(),
            };

            let json = serde_json::to_vec(&account)?;
            let mut accounts = txn.open_table(ACCOUNTS)?;
            accounts.insert(account.id.to_string().as_str(), json.as_slice())?;

            let mut numbers = txn.open_table(ACCOUNT_NUMBERS)?;
            numbers.insert(account.number.as_str(), account.id.to_string().as_str())?;

            let mut index = txn.open_table(CUSTOMER_ACCOUNTS)?;
            let key = account_index_key(
                &customer_id,
                account.created_at.timestamp_millis(),
                &account.id,
            );
            index.insert(key.as_slice(), account.id.to_string().as_str())?;
        }
        txn.commit()?;

        Ok(account)
    }

    /// Look up an account by id.
    pub fn get(&self, account_id: Uuid) -> LedgerResult<Account> {
        let txn = self.db.begin_read()?;
        let accounts = txn.open_table(ACCOUNTS)?;
        Self::load_account(&accounts, account_id)
    }

    /// Resolve a human-facing account number to its account id.
    pub fn resolve_number(&self, number: &str) -> LedgerResult<Uuid> {
        let txn = self.db.begin_read()?;
        let numbers = txn.open_table(ACCOUNT_NUMBERS)?;
        let guard = numbers
            .get(number)?
            .ok_or_else(|| LedgerError::NotFound(format!("account {number}")))?;
        parse_account_id(guard.value())
    }

    /// List a customer's accounts, newest first.
    pub fn list_for_customer(&self, customer_id: Uuid) -> LedgerResult<Vec<Account>> {
        let txn = self.db.begin_read()?;

        let customers = txn.open_table(CUSTOMERS)?;
        if customers.get(customer_id.to_string().as_str())?.is_none() {
            return Err(LedgerError::NotFound(format!("customer {customer_id}")));
        }

        let index = txn.open_table(CUSTOMER_ACCOUNTS)?;
        let accounts = txn.open_table(ACCOUNTS)?;

        let start = customer_prefix(&customer_id);
        let end = customer_prefix_end(&customer_id);

        let mut result = Vec::new();
        for entry in index.range(start.as_slice()..end.as_slice())? {
            let (_, account_id) = entry?;
            let id = parse_account_id(account_id.value())?;
            result.push(Self::load_account(&accounts, id)?);
        }

        Ok(result)
    }

    /// Credit an account by `amount`.
    ///
    /// Idempotent under `idempotency_key`: a key with a recorded outcome
    /// replays that outcome without touching the balance.
    pub fn deposit(
        &self,
        account_id: Uuid,
        amount: i64,
        idempotency_key: &str,
    ) -> LedgerResult<OperationReceipt> {
        validate_amount(amount)?;
        validate_key(idempotency_key)?;

        let txn = self.db.begin_write()?;
        let operation;
        {
            let mut ops = txn.open_table(OPERATIONS)?;
            if let Some(recorded) = Self::recorded(&ops, idempotency_key)? {
                recorded.ensure_matches(OperationKind::Deposit, &[account_id], amount)?;
                return recorded.into_replay();
            }

            let mut accounts = txn.open_table(ACCOUNTS)?;
            let mut account = Self::load_account(&accounts, account_id)?;

            account.balance = account.balance.checked_add(amount).ok_or_else(|| {
                LedgerError::InvalidArgument("deposit overflows account balance".into())
            })?;

            let json = serde_json::to_vec(&account)?;
            accounts.insert(account.id.to_string().as_str(), json.as_slice())?;

            operation = LedgerOperation::new(
                idempotency_key,
                OperationKind::Deposit,
                vec![account_id],
                amount,
                OperationOutcome::Applied {
                    balance_after: account.balance,
                },
            );
            let json = serde_json::to_vec(&operation)?;
            ops.insert(idempotency_key, json.as_slice())?;
        }
        txn.commit()?;

        committed(operation)
    }

    /// Debit an account by `amount` if the balance covers it.
    ///
    /// An insufficient balance is itself a recorded, terminal outcome:
    /// replays of the same key return the same decision instead of
    /// re-checking the live balance.
    pub fn withdraw(
        &self,
        account_id: Uuid,
        amount: i64,
        idempotency_key: &str,
    ) -> LedgerResult<OperationReceipt> {
        validate_amount(amount)?;
        validate_key(idempotency_key)?;

        let txn = self.db.begin_write()?;
        let operation;
        {
            let mut ops = txn.open_table(OPERATIONS)?;
            if let Some(recorded) = Self::recorded(&ops, idempotency_key)? {
                recorded.ensure_matches(OperationKind::Withdraw, &[account_id], amount)?;
                return recorded.into_replay();
            }

            let mut accounts = txn.open_table(ACCOUNTS)?;
            let mut account = Self::load_account(&accounts, account_id)?;

            let outcome = if account.balance >= amount {
                account.balance -= amount;
                let json = serde_json::to_vec(&account)?;
                accounts.insert(account.id.to_string().as_str(), json.as_slice())?;
                OperationOutcome::Applied {
                    balance_after: account.balance,
                }
            } else {
                OperationOutcome::InsufficientFunds
            };

            operation = LedgerOperation::new(
                idempotency_key,
                OperationKind::Withdraw,
                vec![account_id],
                amount,
                outcome,
            );
            let json = serde_json::to_vec(&operation)?;
            ops.insert(idempotency_key, json.as_slice())?;
        }
        txn.commit()?;

        committed(operation)
    }

    /// Move `amount` from `source_id` to `dest_id` in one atomic unit.
    ///
    /// No state in which money has left the source but not reached the
    /// destination is ever observable: both balance writes and the operation
    /// record commit together or not at all.
    pub fn transfer(
        &self,
        source_id: Uuid,
        dest_id: Uuid,
        amount: i64,
        idempotency_key: &str,
    ) -> LedgerResult<OperationReceipt> {
        validate_amount(amount)?;
        validate_key(idempotency_key)?;
        if source_id == dest_id {
            return Err(LedgerError::InvalidArgument(
                "source and destination accounts must differ".into(),
            ));
        }

        let txn = self.db.begin_write()?;
        let operation;
        {
            let mut ops = txn.open_table(OPERATIONS)?;
            if let Some(recorded) = Self::recorded(&ops, idempotency_key)? {
                recorded.ensure_matches(OperationKind::Transfer, &[source_id, dest_id], amount)?;
                return recorded.into_replay();
            }

            let mut accounts = txn.open_table(ACCOUNTS)?;
            let mut source = Self::load_account(&accounts, source_id)?;
            let mut dest = Self::load_account(&accounts, dest_id)?;

            let outcome = if source.balance >= amount {
                source.balance -= amount;
                dest.balance = dest.balance.checked_add(amount).ok_or_else(|| {
                    LedgerError::InvalidArgument("transfer overflows destination balance".into())
                })?;

                // Deterministic update order for any account pair, regardless
                // of which side is the source.
                let mut pair = [&source, &dest];
                pair.sort_by_key(|account| account.id);
                for account in pair {
                    let json = serde_json::to_vec(account)?;
                    accounts.insert(account.id.to_string().as_str(), json.as_slice())?;
                }

                OperationOutcome::Applied {
                    balance_after: source.balance,
                }
            } else {
                OperationOutcome::InsufficientFunds
            };

            operation = LedgerOperation::new(
                idempotency_key,
                OperationKind::Transfer,
                vec![source_id, dest_id],
                amount,
                outcome,
            );
            let json = serde_json::to_vec(&operation)?;
            ops.insert(idempotency_key, json.as_slice())?;
        }
        txn.commit()?;

        committed(operation)
    }

    fn load_account<T>(accounts: &T, account_id: Uuid) -> LedgerResult<Account>
    where
        T: ReadableTable<&'static str, &'static [u8]>,
    {
        let guard = accounts
            .get(account_id.to_string().as_str())?
            .ok_or_else(|| LedgerError::NotFound(format!("account {account_id}")))?;
        Ok(serde_json::from_slice(guard.value())?)
    }

    fn recorded<T>(ops: &T, idempotency_key: &str) -> LedgerResult<Option<LedgerOperation>>
    where
        T: ReadableTable<&'static str, &'static [u8]>,
    {
        match ops.get(idempotency_key)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }
}

fn validate_amount(amount: i64) -> LedgerResult<()> {
    if amount <= 0 {
        return Err(LedgerError::InvalidArgument(
            "amount must be positive".into(),
        ));
    }
    Ok(())
}

fn validate_key(idempotency_key: &str) -> LedgerResult<()> {
    if idempotency_key.is_empty() {
        return Err(LedgerError::InvalidArgument(
            "idempotency_key must not be empty".into(),
        ));
    }
    Ok(())
}

fn parse_account_id(raw: &str) -> LedgerResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| DbError::Corrupt(format!("account id {raw}")).into())
}

/// Convert a freshly committed record into the operation's result.
fn committed(operation: LedgerOperation) -> LedgerResult<OperationReceipt> {
    match operation.outcome {
        OperationOutcome::Applied { .. } => Ok(OperationReceipt {
            operation,
            replayed: false,
        }),
        OperationOutcome::InsufficientFunds => Err(LedgerError::InsufficientFunds),
    }
}
