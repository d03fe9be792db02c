// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::require_signature,
    ledger::KycStatus,
    models::{
        AccountSummary, CreateAccountResponse, CreateCustomerRequest, CreateCustomerResponse,
        ListAccountsResponse, MutationRequest, MutationResponse, TransferRequest,
        TransferResponse,
    },
    state::AppState,
};

pub mod accounts;
pub mod customers;
pub mod health;
pub mod transactions;

pub fn router(state: AppState) -> Router {
    // Every mutating route sits behind the signature gate; reads and health
    // probes do not.
    let gate = middleware::from_fn_with_state(state.clone(), require_signature);

    let v1_routes = Router::new()
        .route(
            "/customers",
            post(customers::create_customer).route_layer(gate.clone()),
        )
        .route(
            "/accounts",
            post(accounts::create_account)
                .route_layer(gate.clone())
                .get(accounts::list_accounts),
        )
        .route(
            "/accounts/transfer",
            post(transactions::transfer).route_layer(gate.clone()),
        )
        .route(
            "/accounts/{number}/deposit",
            post(transactions::deposit).route_layer(gate.clone()),
        )
        .route(
            "/accounts/{number}/withdraw",
            post(transactions::withdraw).route_layer(gate),
        )
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        customers::create_customer,
        accounts::create_account,
        accounts::list_accounts,
        transactions::deposit,
        transactions::withdraw,
        transactions::transfer,
        health::health,
        health::readiness
    ),
    components(
        schemas(
            CreateCustomerRequest,
            CreateCustomerResponse,
            CreateAccountResponse,
            AccountSummary,
            ListAccountsResponse,
            MutationRequest,
            MutationResponse,
            TransferRequest,
            TransferResponse,
            KycStatus,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Customers", description = "Customer registration and KYC"),
        (name = "Accounts", description = "Account opening and listing"),
        (name = "Payments", description = "Deposits, withdrawals, and transfers"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
