// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Module
//!
//! The domain core: customers with their KYC state machine, accounts with
//! their balances, and the idempotent balance mutation engine.
//!
//! ## Ownership
//!
//! - [`IdentityLedger`] exclusively owns KYC status mutation.
//! - [`AccountLedger`] exclusively owns balance mutation and reads (never
//!   writes) customer KYC status.
//!
//! Both components receive the shared [`LedgerDatabase`](crate::storage::LedgerDatabase)
//! at construction; nothing reaches storage through ambient globals, so
//! tests can supply an isolated database per case.

pub mod account;
pub mod error;
pub mod identity;
pub mod operation;

pub use account::{Account, AccountLedger};
pub use error::{LedgerError, LedgerResult};
pub use identity::{Customer, IdentityLedger, KycStatus, NewCustomer};
pub use operation::{LedgerOperation, OperationKind, OperationOutcome, OperationReceipt};
