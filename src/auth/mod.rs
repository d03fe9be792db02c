// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Shared-secret HMAC authentication for mutating API routes.
//!
//! ## Auth Flow
//!
//! 1. Client and server exchange a secret key out of band; the server knows
//!    it by a key id.
//! 2. The client signs each mutating request:
//!    - `message_to_sign = concat(request_body, secret_key)`
//!    - `checksum = hmac_sha256(message_to_sign, secret_key)`
//!    - `signature = base64_encode(checksum)`
//! 3. The client sends `Signature` and `Key-ID` headers.
//! 4. The [`middleware::require_signature`] gate recomputes the signature
//!    and compares in constant time before any handler runs.
//!
//! ## Security
//!
//! - Unknown key ids and mismatched signatures are indistinguishable 401s
//!   apart from their error codes.
//! - The signed message covers only the body and key; replay protection is
//!   explicitly out of scope of the current protocol (see
//!   [`middleware`] docs).

pub mod credentials;
pub mod error;
pub mod hmac;
pub mod middleware;

pub use credentials::{CredentialStore, CredentialStoreError, InMemoryCredentialStore};
pub use error::AuthError;
pub use middleware::{require_signature, KEY_ID_HEADER, SIGNATURE_HEADER};
