// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Application state shared across request handlers.
//!
//! Every component is injected here at construction. Handlers and
//! middleware receive the state through axum's `State` extractor; nothing
//! reaches storage or credentials through ambient globals, so tests build
//! an isolated `AppState` per case.

use std::sync::Arc;

use crate::auth::CredentialStore;
use crate::ledger::{AccountLedger, IdentityLedger};
use crate::storage::LedgerDatabase;
use crate::workflow::check::VerificationCheck;
use crate::workflow::VerificationWorkflow;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<LedgerDatabase>,
    pub identity: Arc<IdentityLedger>,
    pub accounts: Arc<AccountLedger>,
    pub credentials: Arc<dyn CredentialStore>,
    pub workflow: VerificationWorkflow,
}

impl AppState {
    pub fn new(
        db: Arc<LedgerDatabase>,
        credentials: Arc<dyn CredentialStore>,
        check: Arc<dyn VerificationCheck>,
    ) -> Self {
        let identity = Arc::new(IdentityLedger::new(db.clone()));
        let accounts = Arc::new(AccountLedger::new(db.clone()));
        let workflow = VerificationWorkflow::new(identity.clone(), check);
        Self {
            db,
            identity,
            accounts,
            credentials,
            workflow,
        }
    }
}
