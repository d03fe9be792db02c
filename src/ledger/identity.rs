// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Customer identity ledger and the KYC state machine.
//!
//! ## State machine
//!
//! ```text
//! pending → in_progress → approved
//!                       → rejected
//! ```
//!
//! `approved` and `rejected` are terminal. The only component that mutates
//! KYC status is the verification workflow, through [`IdentityLedger::transition`];
//! everything else (account opening in particular) reads it.
//!
//! ## Concurrency control
//!
//! Transitions are conditional writes: the update applies only if the stored
//! status still equals the expected prior state. Two racing workflow runs
//! therefore resolve to exactly one winner; the loser observes
//! `ConcurrentModification` and stops.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::{LedgerError, LedgerResult};
use crate::storage::database::CUSTOMERS;
use crate::storage::LedgerDatabase;

/// KYC verification status of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    /// Initial status on registration.
    Pending,
    /// A verification run has picked the customer up.
    InProgress,
    /// Verification succeeded; the customer may open accounts.
    Approved,
    /// Verification failed. Terminal.
    Rejected,
}

impl KycStatus {
    /// Whether this status can never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, KycStatus::Approved | KycStatus::Rejected)
    }

    /// Whether `self → next` is an edge of the state machine.
    pub fn can_transition_to(self, next: KycStatus) -> bool {
        matches!(
            (self, next),
            (KycStatus::Pending, KycStatus::InProgress)
                | (KycStatus::InProgress, KycStatus::Approved)
                | (KycStatus::InProgress, KycStatus::Rejected)
        )
    }
}

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique customer identifier.
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub residence_address: String,
    pub birth_date: DateTime<Utc>,
    /// Current verification status. Mutated only through [`IdentityLedger::transition`].
    pub kyc_status: KycStatus,
    pub created_at: DateTime<Utc>,
    /// Advances on every KYC transition; drives stuck-verification detection.
    pub updated_at: DateTime<Utc>,
}

/// Attributes of a customer being registered.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub residence_address: String,
    pub birth_date: DateTime<Utc>,
}

/// Ledger of customers and their verification state.
///
/// Holds exclusive write responsibility for the `customers` table.
pub struct IdentityLedger {
    db: Arc<LedgerDatabase>,
}

impl IdentityLedger {
    pub fn new(db: Arc<LedgerDatabase>) -> Self {
        Self { db }
    }

    /// Register a customer with status `pending`.
    pub fn create(&self, new: NewCustomer) -> LedgerResult<Customer> {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4(),
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            residence_address: new.residence_address,
            birth_date: new.birth_date,
            kyc_status: KycStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_vec(&customer)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CUSTOMERS)?;
            table.insert(customer.id.to_string().as_str(), json.as_slice())?;
        }
        txn.commit()?;

        Ok(customer)
    }

    /// Look up a customer by id.
    pub fn get(&self, id: Uuid) -> LedgerResult<Customer> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CUSTOMERS)?;
        let guard = table
            .get(id.to_string().as_str())?
            .ok_or_else(|| LedgerError::NotFound(format!("customer {id}")))?;
        Ok(serde_json::from_slice(guard.value())?)
    }

    /// Current KYC status of a customer.
    pub fn kyc_status(&self, id: Uuid) -> LedgerResult<KycStatus> {
        Ok(self.get(id)?.kyc_status)
    }

    /// Conditionally move a customer from `expected` to `next`.
    ///
    /// The write applies only if the stored status still equals `expected`
    /// (compare-and-swap); a lost race fails with `ConcurrentModification`.
    /// Requesting an edge outside the state machine fails the same way: a
    /// terminal status can never be the observed prior state of a legal
    /// transition, so callers cannot tell the two apart.
    pub fn transition(&self, id: Uuid, expected: KycStatus, next: KycStatus) -> LedgerResult<()> {
        if !expected.can_transition_to(next) {
            return Err(LedgerError::ConcurrentModification(format!(
                "kyc status cannot move from {expected:?} to {next:?}"
            )));
        }

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CUSTOMERS)?;
            let key = id.to_string();

            let mut customer: Customer = {
                let guard = table
                    .get(key.as_str())?
                    .ok_or_else(|| LedgerError::NotFound(format!("customer {id}")))?;
                serde_json::from_slice(guard.value())?
            };

            if customer.kyc_status != expected {
                return Err(LedgerError::ConcurrentModification(format!(
                    "kyc status of customer {id} is {:?}, expected {expected:?}",
                    customer.kyc_status
                )));
            }

            customer.kyc_status = next;
            customer.updated_at = Utc::now();

            let json = serde_json::to_vec(&customer)?;
            table.insert(key.as_str(), json.as_slice())?;
        }
        txn.commit()?;

        Ok(())
    }

    /// Customers stranded in `in_progress` for longer than `older_than`.
    ///
    /// Used by the verification sweeper to resume runs lost to a crash.
    pub fn stuck_in_progress(&self, older_than: Duration) -> LedgerResult<Vec<Uuid>> {
        let cutoff = Utc::now() - older_than;
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CUSTOMERS)?;

        let mut stuck = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let customer: Customer = serde_json::from_slice(value.value())?;
            if customer.kyc_status == KycStatus::InProgress && customer.updated_at < cutoff {
                stuck.push(customer.id);
            }
        }

        Ok(stuck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ledger() -> (IdentityLedger, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(LedgerDatabase::open(&dir.path().join("test.redb")).unwrap());
        (IdentityLedger::new(db), dir)
    }

    fn sample_customer() -> NewCustomer {
        NewCustomer {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            residence_address: "12 Analytical Lane, London".into(),
            birth_date: "1990-12-10T00:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn state_machine_edges() {
        assert!(KycStatus::Pending.can_transition_to(KycStatus::InProgress));
        assert!(KycStatus::InProgress.can_transition_to(KycStatus::Approved));
        assert!(KycStatus::InProgress.can_transition_to(KycStatus::Rejected));

        assert!(!KycStatus::Pending.can_transition_to(KycStatus::Approved));
        assert!(!KycStatus::Approved.can_transition_to(KycStatus::InProgress));
        assert!(!KycStatus::Rejected.can_transition_to(KycStatus::Approved));

        assert!(!KycStatus::Pending.is_terminal());
        assert!(!KycStatus::InProgress.is_terminal());
        assert!(KycStatus::Approved.is_terminal());
        assert!(KycStatus::Rejected.is_terminal());
    }

    #[test]
    fn create_starts_pending() {
        let (ledger, _dir) = test_ledger();
        let customer = ledger.create(sample_customer()).unwrap();

        assert_eq!(customer.kyc_status, KycStatus::Pending);

        let loaded = ledger.get(customer.id).unwrap();
        assert_eq!(loaded, customer);
    }

    #[test]
    fn get_unknown_customer_is_not_found() {
        let (ledger, _dir) = test_ledger();
        assert!(matches!(
            ledger.get(Uuid::new_v4()),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn happy_path_transitions() {
        let (ledger, _dir) = test_ledger();
        let customer = ledger.create(sample_customer()).unwrap();

        ledger
            .transition(customer.id, KycStatus::Pending, KycStatus::InProgress)
            .unwrap();
        assert_eq!(ledger.kyc_status(customer.id).unwrap(), KycStatus::InProgress);

        ledger
            .transition(customer.id, KycStatus::InProgress, KycStatus::Approved)
            .unwrap();
        assert_eq!(ledger.kyc_status(customer.id).unwrap(), KycStatus::Approved);
    }

    #[test]
    fn lost_race_fails_with_concurrent_modification() {
        let (ledger, _dir) = test_ledger();
        let customer = ledger.create(sample_customer()).unwrap();

        // Two runs both observe `pending`; only the first conditional write wins.
        ledger
            .transition(customer.id, KycStatus::Pending, KycStatus::InProgress)
            .unwrap();
        assert!(matches!(
            ledger.transition(customer.id, KycStatus::Pending, KycStatus::InProgress),
            Err(LedgerError::ConcurrentModification(_))
        ));
    }

    #[test]
    fn terminal_status_cannot_move() {
        let (ledger, _dir) = test_ledger();
        let customer = ledger.create(sample_customer()).unwrap();
        ledger
            .transition(customer.id, KycStatus::Pending, KycStatus::InProgress)
            .unwrap();
        ledger
            .transition(customer.id, KycStatus::InProgress, KycStatus::Approved)
            .unwrap();

        assert!(matches!(
            ledger.transition(customer.id, KycStatus::Approved, KycStatus::InProgress),
            Err(LedgerError::ConcurrentModification(_))
        ));
        assert_eq!(ledger.kyc_status(customer.id).unwrap(), KycStatus::Approved);
    }

    #[test]
    fn skipping_a_state_is_rejected() {
        let (ledger, _dir) = test_ledger();
        let customer = ledger.create(sample_customer()).unwrap();

        assert!(matches!(
            ledger.transition(customer.id, KycStatus::Pending, KycStatus::Approved),
            Err(LedgerError::ConcurrentModification(_))
        ));
        assert_eq!(ledger.kyc_status(customer.id).unwrap(), KycStatus::Pending);
    }

    #[test]
    fn stuck_scan_finds_only_old_in_progress() {
        let (ledger, _dir) = test_ledger();

        let stuck = ledger.create(sample_customer()).unwrap();
        ledger
            .transition(stuck.id, KycStatus::Pending, KycStatus::InProgress)
            .unwrap();

        let fresh = ledger.create(sample_customer()).unwrap();
        assert_eq!(fresh.kyc_status, KycStatus::Pending);

        // Zero threshold: anything in_progress counts as stuck.
        let ids = ledger.stuck_in_progress(Duration::zero()).unwrap();
        assert_eq!(ids, vec![stuck.id]);

        // A generous threshold finds nothing.
        let ids = ledger.stuck_in_progress(Duration::hours(1)).unwrap();
        assert!(ids.is_empty());
    }
}
