// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Signature verification error type.
///
/// Everything the caller can fix maps to 401; an unreachable credential
/// store is the server's fault and maps to 500.
#[derive(Debug)]
pub enum AuthError {
    /// No `Signature` header present
    MissingSignature,
    /// No `Key-ID` header present
    MissingKeyId,
    /// The claimed signature is not valid base64
    MalformedSignature,
    /// The key id is not registered
    UnknownKeyId,
    /// The recomputed signature does not match the claimed one
    SignatureMismatch,
    /// The signed body exceeds the verification buffer limit
    BodyTooLarge,
    /// The credential store could not be reached
    CredentialStore(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingSignature => "missing_signature",
            AuthError::MissingKeyId => "missing_key_id",
            AuthError::MalformedSignature => "malformed_signature",
            AuthError::UnknownKeyId => "unknown_key_id",
            AuthError::SignatureMismatch => "signature_mismatch",
            AuthError::BodyTooLarge => "body_too_large",
            AuthError::CredentialStore(_) => "credential_store_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingSignature
            | AuthError::MissingKeyId
            | AuthError::MalformedSignature
            | AuthError::UnknownKeyId
            | AuthError::SignatureMismatch => StatusCode::UNAUTHORIZED,
            AuthError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AuthError::CredentialStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingSignature => write!(f, "Signature header is required"),
            AuthError::MissingKeyId => write!(f, "Key-ID header is required"),
            AuthError::MalformedSignature => write!(f, "Signature is not valid base64"),
            AuthError::UnknownKeyId => write!(f, "Key id is not registered"),
            AuthError::SignatureMismatch => write!(f, "Signature does not match request body"),
            AuthError::BodyTooLarge => write!(f, "Request body exceeds the signable size limit"),
            AuthError::CredentialStore(msg) => {
                write!(f, "Failed to resolve signing key: {msg}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
