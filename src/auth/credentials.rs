// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared-secret credential lookup.
//!
//! Secrets are exchanged with clients out of band; issuance and rotation
//! live outside this service. The core only reads: a key identifier either
//! resolves to its secret bytes or it does not.

use std::collections::HashMap;

/// The credential backend could not be reached.
#[derive(Debug, thiserror::Error)]
#[error("credential store unavailable: {0}")]
pub struct CredentialStoreError(pub String);

/// Read-only lookup from key identifier to shared secret.
///
/// An unknown key id is `Ok(None)`; only backend failures are errors, so
/// the gate can distinguish "reject the caller" from "we are broken".
pub trait CredentialStore: Send + Sync {
    fn secret(&self, key_id: &str) -> Result<Option<Vec<u8>>, CredentialStoreError>;
}

/// Credential store seeded once at startup.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    secrets: HashMap<String, Vec<u8>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key id with its secret bytes.
    pub fn insert(&mut self, key_id: impl Into<String>, secret: impl Into<Vec<u8>>) {
        self.secrets.insert(key_id.into(), secret.into());
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn secret(&self, key_id: &str) -> Result<Option<Vec<u8>>, CredentialStoreError> {
        Ok(self.secrets.get(key_id).cloned())
    }
}
