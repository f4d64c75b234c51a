// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request authentication entry points.
//!
//! Both entry points end up in [`TokenVerifier::verify`]; they only differ in
//! what the HTTP layer hands over.

use super::{claims::Claims, verifier::TokenVerifier};
use crate::error::AppError;

/// Credentials parsed from an `Authorization: <scheme> <credentials>` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerCredentials {
    pub scheme: String,
    pub credentials: String,
}

impl BearerCredentials {
    /// Parse a header value.
    ///
    /// Returns `None` unless the scheme is `Bearer` (any case) and the
    /// credentials part is non-empty. The value is split on the first space
    /// only; anything after it, extra spaces included, is the credential.
    pub fn from_header(value: &str) -> Option<Self> {
        let (scheme, credentials) = value.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        if credentials.is_empty() {
            return None;
        }
        Some(Self {
            scheme: scheme.to_string(),
            credentials: credentials.to_string(),
        })
    }
}

/// Authenticate a raw `Authorization` value (with or without `Bearer `).
pub fn authenticate(
    verifier: &TokenVerifier,
    authorization: Option<&str>,
) -> Result<Claims, AppError> {
    verifier.verify(authorization)
}

/// Authenticate credentials extracted by the HTTP layer.
pub fn authenticate_credentials(
    verifier: &TokenVerifier,
    credentials: Option<&BearerCredentials>,
) -> Result<Claims, AppError> {
    let credentials = credentials
        .ok_or_else(|| AppError::authentication("Missing authorization credentials"))?;
    verifier.verify(Some(&credentials.credentials))
}
