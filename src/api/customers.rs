// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::{
    error::ApiError,
    ledger::NewCustomer,
    models::{CreateCustomerRequest, CreateCustomerResponse},
    state::AppState,
};

/// Register a customer and start KYC verification in the background.
///
/// The response does not wait for verification; poll account creation until
/// the customer is approved.
#[utoipa::path(
    post,
    path = "/v1/customers",
    request_body = CreateCustomerRequest,
    tag = "Customers",
    responses(
        (status = 201, body = CreateCustomerResponse),
        (status = 400, description = "Invalid customer attributes"),
        (status = 401, description = "Missing or invalid request signature")
    )
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CreateCustomerResponse>), ApiError> {
    validate_new_customer(&request)?;

    let customer = state.identity.create(NewCustomer {
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        residence_address: request.residence_address,
        birth_date: request.birth_date,
    })?;

    // Fire-and-forget; the verification run outlives this request.
    state.workflow.spawn(customer.id);

    Ok((
        StatusCode::CREATED,
        Json(CreateCustomerResponse { id: customer.id }),
    ))
}

fn validate_new_customer(request: &CreateCustomerRequest) -> Result<(), ApiError> {
    if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
        return Err(ApiError::bad_request(
            "first_name and last_name must not be empty",
        ));
    }

    if request.residence_address.trim().is_empty() {
        return Err(ApiError::bad_request("residence_address must not be empty"));
    }

    // A full mailbox check belongs to the verification provider; this only
    // catches obviously broken input.
    if !request.email.contains('@') {
        return Err(ApiError::bad_request("email is not a valid address"));
    }

    if request.birth_date >= Utc::now() {
        return Err(ApiError::bad_request("birth_date must be in the past"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::StatusCode;

    use crate::auth::InMemoryCredentialStore;
    use crate::ledger::KycStatus;
    use crate::storage::LedgerDatabase;
    use crate::workflow::SimulatedCheck;

    fn test_state(verification_delay: Duration) -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(LedgerDatabase::open(&dir.path().join("test.redb")).unwrap());
        let state = AppState::new(
            db,
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(SimulatedCheck::new(verification_delay)),
        );
        (state, dir)
    }

    fn sample_request() -> CreateCustomerRequest {
        CreateCustomerRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            residence_address: "12 Analytical Lane, London".into(),
            birth_date: "1990-12-10T00:00:00Z".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn create_customer_success() {
        // A long review delay keeps the workflow from reaching a terminal
        // status during the test.
        let (state, _dir) = test_state(Duration::from_secs(60));

        let (status, Json(response)) =
            create_customer(State(state.clone()), Json(sample_request()))
                .await
                .expect("customer creation succeeds");

        assert_eq!(status, StatusCode::CREATED);

        let customer = state.identity.get(response.id).unwrap();
        assert!(
            matches!(
                customer.kyc_status,
                KycStatus::Pending | KycStatus::InProgress
            ),
            "verification must not have finished yet: {:?}",
            customer.kyc_status
        );
    }

    #[tokio::test]
    async fn create_customer_rejects_bad_fields() {
        let (state, _dir) = test_state(Duration::ZERO);

        let mut request = sample_request();
        request.first_name = "  ".into();
        let err = create_customer(State(state.clone()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let mut request = sample_request();
        request.email = "not-an-address".into();
        let err = create_customer(State(state.clone()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let mut request = sample_request();
        request.birth_date = Utc::now() + chrono::Duration::days(1);
        let err = create_customer(State(state), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
