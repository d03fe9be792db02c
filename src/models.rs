// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response data structures used by the REST API. All types
//! derive `Serialize`/`Deserialize` and `ToSchema` for automatic JSON
//! handling and OpenAPI documentation.
//!
//! Amounts and balances are integers in minor currency units; the ledger
//! does no floating-point arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// =============================================================================
// Customer Models
// =============================================================================

/// Request to register a new customer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub residence_address: String,
    /// Date of birth (RFC 3339 timestamp).
    pub birth_date: DateTime<Utc>,
}

/// Response for a freshly registered customer.
///
/// Verification starts in the background; the customer's accounts can be
/// opened once KYC is approved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCustomerResponse {
    /// Unique customer identifier.
    pub id: Uuid,
}

// =============================================================================
// Account Models
// =============================================================================

/// Response for a freshly opened account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAccountResponse {
    /// Unique account identifier.
    pub id: Uuid,
    /// Human-facing account number used to address the account in payment
    /// routes.
    pub number: String,
}

/// One account in a customer's account listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccountSummary {
    /// Human-facing account number.
    pub number: String,
    /// Balance in minor currency units.
    pub balance: i64,
}

/// A customer's accounts, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListAccountsResponse {
    pub accounts: Vec<AccountSummary>,
}

// =============================================================================
// Payment Models
// =============================================================================

/// Body of a deposit or withdrawal request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MutationRequest {
    /// Amount in minor currency units. Must be positive.
    pub amount: i64,
    /// Caller-supplied retry token; resubmitting the same key replays the
    /// recorded outcome instead of applying the mutation again.
    pub idempotency_key: String,
}

/// Result of a deposit or withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MutationResponse {
    /// Account balance after the operation, in minor currency units.
    pub balance: i64,
    /// True when the outcome was replayed from an earlier invocation of the
    /// same idempotency key.
    pub replayed: bool,
}

/// Body of a transfer request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransferRequest {
    /// Account number to debit.
    pub source_number: String,
    /// Account number to credit.
    pub dest_number: String,
    /// Amount in minor currency units. Must be positive.
    pub amount: i64,
    /// Caller-supplied retry token.
    pub idempotency_key: String,
}

/// Result of a transfer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransferResponse {
    /// Source account balance after the transfer. The destination balance is
    /// not disclosed; it may belong to another customer.
    pub source_balance: i64,
    /// True when the outcome was replayed from an earlier invocation of the
    /// same idempotency key.
    pub replayed: bool,
}
