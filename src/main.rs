// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use base64ct::{Base64, Encoding};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use custodial_wallet::api::router;
use custodial_wallet::auth::InMemoryCredentialStore;
use custodial_wallet::config::{
    DATA_DIR_ENV, DEFAULT_DATA_DIR, DEFAULT_LOG_FILTER, DEFAULT_VERIFICATION_DELAY_SECS, HOST_ENV,
    LEDGER_DB_FILE, LOG_FORMAT_ENV, PORT_ENV, SEED_HMAC_KEY_ID_ENV, SEED_HMAC_SECRET_ENV,
    STUCK_AFTER_ENV, SWEEP_INTERVAL_ENV, VERIFICATION_DELAY_ENV,
};
use custodial_wallet::state::AppState;
use custodial_wallet::storage::LedgerDatabase;
use custodial_wallet::workflow::{SimulatedCheck, VerificationSweeper};

#[tokio::main]
async fn main() {
    init_tracing();

    // Open the embedded ledger database
    let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    let db_path = PathBuf::from(&data_dir).join(LEDGER_DB_FILE);
    let db = Arc::new(LedgerDatabase::open(&db_path).expect("Failed to open ledger database"));
    info!(path = %db_path.display(), "Ledger database open");

    // Seed the credential store from the environment; secrets are exchanged
    // with clients out of band.
    let mut credentials = InMemoryCredentialStore::new();
    match (
        env::var(SEED_HMAC_KEY_ID_ENV),
        env::var(SEED_HMAC_SECRET_ENV),
    ) {
        (Ok(key_id), Ok(secret)) => match Base64::decode_vec(&secret) {
            Ok(secret) => {
                info!(key_id = %key_id, "Seeded HMAC credential");
                credentials.insert(key_id, secret);
            }
            Err(_) => warn!("SEED_HMAC_SECRET is not valid base64; no credential seeded"),
        },
        _ => warn!("No HMAC credential seeded; all mutating requests will be rejected"),
    }

    let verification_delay = Duration::from_secs(env_u64(
        VERIFICATION_DELAY_ENV,
        DEFAULT_VERIFICATION_DELAY_SECS,
    ));
    let check = Arc::new(SimulatedCheck::new(verification_delay));

    let state = AppState::new(db, Arc::new(credentials), check);

    // Background reconciliation of verification runs lost to a restart.
    let shutdown = CancellationToken::new();
    let mut sweeper = VerificationSweeper::new(state.identity.clone(), state.workflow.clone());
    if let (Ok(interval), Ok(stuck_after)) = (
        env::var(SWEEP_INTERVAL_ENV),
        env::var(STUCK_AFTER_ENV),
    ) {
        if let (Ok(interval), Ok(stuck_after)) = (interval.parse(), stuck_after.parse()) {
            sweeper = sweeper.with_intervals(Duration::from_secs(interval), stuck_after);
        }
    }
    tokio::spawn(sweeper.run(shutdown.clone()));

    // Parse bind address
    let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(PORT_ENV)
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    info!(%addr, "Custodial wallet server listening (docs at /docs)");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .expect("Server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let json = env::var(LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

async fn shutdown_signal(token: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("Failed to install shutdown signal handler");
        return;
    }
    info!("Shutdown signal received");
    token.cancel();
}
