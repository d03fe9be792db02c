// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::ApiError,
    ledger::OperationReceipt,
    models::{MutationRequest, MutationResponse, TransferRequest, TransferResponse},
    state::AppState,
};

/// Credit an account.
#[utoipa::path(
    post,
    path = "/v1/accounts/{number}/deposit",
    request_body = MutationRequest,
    tag = "Payments",
    params(
        ("number" = String, Path, description = "Human-facing account number")
    ),
    responses(
        (status = 200, body = MutationResponse),
        (status = 400, description = "Non-positive amount or reused idempotency key"),
        (status = 401, description = "Missing or invalid request signature"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn deposit(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(request): Json<MutationRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let account_id = state.accounts.resolve_number(&number)?;
    let receipt = state
        .accounts
        .deposit(account_id, request.amount, &request.idempotency_key)?;

    Ok(Json(mutation_response(receipt)?))
}

/// Debit an account.
#[utoipa::path(
    post,
    path = "/v1/accounts/{number}/withdraw",
    request_body = MutationRequest,
    tag = "Payments",
    params(
        ("number" = String, Path, description = "Human-facing account number")
    ),
    responses(
        (status = 200, body = MutationResponse),
        (status = 400, description = "Non-positive amount or reused idempotency key"),
        (status = 401, description = "Missing or invalid request signature"),
        (status = 404, description = "Account not found"),
        (status = 422, description = "Insufficient funds (recorded outcome)")
    )
)]
pub async fn withdraw(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(request): Json<MutationRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let account_id = state.accounts.resolve_number(&number)?;
    let receipt = state
        .accounts
        .withdraw(account_id, request.amount, &request.idempotency_key)?;

    Ok(Json(mutation_response(receipt)?))
}

/// Move funds between two accounts in one atomic unit.
#[utoipa::path(
    post,
    path = "/v1/accounts/transfer",
    request_body = TransferRequest,
    tag = "Payments",
    responses(
        (status = 200, body = TransferResponse),
        (status = 400, description = "Non-positive amount, same-account transfer, or reused idempotency key"),
        (status = 401, description = "Missing or invalid request signature"),
        (status = 404, description = "Source or destination account not found"),
        (status = 422, description = "Insufficient funds (recorded outcome)")
    )
)]
pub async fn transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    let source_id = state.accounts.resolve_number(&request.source_number)?;
    let dest_id = state.accounts.resolve_number(&request.dest_number)?;

    let receipt = state.accounts.transfer(
        source_id,
        dest_id,
        request.amount,
        &request.idempotency_key,
    )?;

    let source_balance = receipt
        .operation
        .balance_after()
        .ok_or_else(|| ApiError::internal("applied operation without a balance"))?;

    Ok(Json(TransferResponse {
        source_balance,
        replayed: receipt.replayed,
    }))
}

fn mutation_response(receipt: OperationReceipt) -> Result<MutationResponse, ApiError> {
    let balance = receipt
        .operation
        .balance_after()
        .ok_or_else(|| ApiError::internal("applied operation without a balance"))?;

    Ok(MutationResponse {
        balance,
        replayed: receipt.replayed,
    })
}
