// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{AccountSummary, CreateAccountResponse, ListAccountsResponse},
    state::AppState,
};

/// Header identifying the acting customer.
pub const CUSTOMER_ID_HEADER: &str = "Customer-ID";

/// Open a new account for an approved customer.
#[utoipa::path(
    post,
    path = "/v1/accounts",
    tag = "Accounts",
    params(
        ("Customer-ID" = String, Header, description = "UUID of the acting customer")
    ),
    responses(
        (status = 201, body = CreateAccountResponse),
        (status = 400, description = "Missing/malformed customer id or KYC not approved"),
        (status = 401, description = "Missing or invalid request signature"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn create_account(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<CreateAccountResponse>), ApiError> {
    let customer_id = customer_id_from_headers(&headers)?;
    let account = state.accounts.open_account(customer_id)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateAccountResponse {
            id: account.id,
            number: account.number,
        }),
    ))
}

/// List the acting customer's accounts, newest first.
#[utoipa::path(
    get,
    path = "/v1/accounts",
    tag = "Accounts",
    params(
        ("Customer-ID" = String, Header, description = "UUID of the acting customer")
    ),
    responses(
        (status = 200, body = ListAccountsResponse),
        (status = 400, description = "Missing or malformed customer id"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ListAccountsResponse>, ApiError> {
    let customer_id = customer_id_from_headers(&headers)?;
    let accounts = state.accounts.list_for_customer(customer_id)?;

    Ok(Json(ListAccountsResponse {
        accounts: accounts
            .into_iter()
            .map(|account| AccountSummary {
                number: account.number,
                balance: account.balance,
            })
            .collect(),
    }))
}

fn customer_id_from_headers(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let raw = headers
        .get(CUSTOMER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("missing customer id"))?;

    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("malformed customer id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::auth::InMemoryCredentialStore;
    use crate::ledger::{KycStatus, NewCustomer};
    use crate::storage::LedgerDatabase;
    use crate::workflow::SimulatedCheck;

    fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(LedgerDatabase::open(&dir.path().join("test.redb")).unwrap());
        let state = AppState::new(
            db,
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(SimulatedCheck::new(Duration::ZERO)),
        );
        (state, dir)
    }

    fn register(state: &AppState) -> Uuid {
        state
            .identity
            .create(NewCustomer {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@example.com".into(),
                residence_address: "12 Analytical Lane, London".into(),
                birth_date: "1990-12-10T00:00:00Z".parse().unwrap(),
            })
            .unwrap()
            .id
    }

    fn approve(state: &AppState, customer_id: Uuid) {
        state
            .identity
            .transition(customer_id, KycStatus::Pending, KycStatus::InProgress)
            .unwrap();
        state
            .identity
            .transition(customer_id, KycStatus::InProgress, KycStatus::Approved)
            .unwrap();
    }

    fn customer_headers(customer_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CUSTOMER_ID_HEADER, customer_id.parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn create_account_requires_customer_header() {
        let (state, _dir) = test_state();

        let err = create_account(State(state.clone()), HeaderMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "missing customer id");

        let err = create_account(State(state), customer_headers("not-a-uuid"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "malformed customer id");
    }

    #[tokio::test]
    async fn create_account_gates_on_kyc() {
        let (state, _dir) = test_state();
        let customer_id = register(&state);

        // Still pending: rejected.
        let err = create_account(State(state.clone()), customer_headers(&customer_id.to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        approve(&state, customer_id);

        let (status, Json(response)) =
            create_account(State(state.clone()), customer_headers(&customer_id.to_string()))
                .await
                .expect("account creation succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            state.accounts.resolve_number(&response.number).unwrap(),
            response.id
        );
        assert_eq!(state.accounts.get(response.id).unwrap().balance, 0);
    }

    #[tokio::test]
    async fn create_account_unknown_customer() {
        let (state, _dir) = test_state();

        let err = create_account(
            State(state),
            customer_headers(&Uuid::new_v4().to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_accounts_returns_numbers_and_balances() {
        let (state, _dir) = test_state();
        let customer_id = register(&state);
        approve(&state, customer_id);

        let account = state.accounts.open_account(customer_id).unwrap();
        state.accounts.deposit(account.id, 125, "seed").unwrap();

        let Json(response) = list_accounts(
            State(state.clone()),
            customer_headers(&customer_id.to_string()),
        )
        .await
        .expect("listing succeeds");

        assert_eq!(
            response.accounts,
            vec![AccountSummary {
                number: account.number,
                balance: 125,
            }]
        );
    }

    #[tokio::test]
    async fn list_accounts_unknown_customer() {
        let (state, _dir) = test_state();

        let err = list_accounts(
            State(state),
            customer_headers(&Uuid::new_v4().to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
