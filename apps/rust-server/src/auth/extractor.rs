// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user.claims holds the verified token payload
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{
    authenticator::{authenticate_credentials, BearerCredentials},
    verifier::{strip_bearer, TokenVerifier},
    AuthenticatedUser,
};
use crate::{error::AppError, state::AppState};

/// Extractor for authenticated users.
///
/// Reuses the user set by [`super::middleware::require_auth`] when present,
/// otherwise verifies the `Authorization` header itself. Rejects with a 401
/// `AUTHENTICATION_REQUIRED` envelope.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        authenticate_headers(&parts.headers, &state.verifier).map(Auth)
    }
}

/// Optional authentication extractor.
///
/// Yields `None` instead of rejecting when the request carries no valid
/// token.
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(user)) => Ok(OptionalAuth(Some(user))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}

/// Verify the bearer credentials carried by `headers`.
pub(crate) fn authenticate_headers(
    headers: &HeaderMap,
    verifier: &TokenVerifier,
) -> Result<AuthenticatedUser, AppError> {
    let credentials = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(BearerCredentials::from_header);

    let claims = authenticate_credentials(verifier, credentials.as_ref())?;
    let access_token = credentials
        .map(|c| strip_bearer(&c.credentials).to_string())
        .unwrap_or_default();

    Ok(AuthenticatedUser::new(claims, access_token))
}
