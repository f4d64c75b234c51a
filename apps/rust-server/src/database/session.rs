// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Binding a caller's access token to a store handle.
//!
//! Binding is best effort and happens in two ordered steps:
//!
//! 1. [`Session::set_session`], the supported mechanism. It reads the token's
//!    payload (no signature check; the server has already verified it) and
//!    refuses malformed tokens and expired tokens, since no refresh token is
//!    available to renew them.
//! 2. [`Session::attach`], a compatibility shim that stores the raw token
//!    as-is when step 1 refuses it.
//!
//! Neither step fails the caller. The outcome is kept as a
//! [`SessionBinding`] so it can be inspected and logged.

use chrono::Utc;
use serde::Deserialize;

/// Outcome of binding an identity token to a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBinding {
    /// Privileged handle; no identity to bind.
    NotApplicable,
    /// `set_session` accepted the token.
    Bound,
    /// `set_session` refused the token; it was attached directly.
    Attached,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("access token is malformed: {0}")]
    Malformed(String),

    #[error("access token has expired and no refresh token was supplied")]
    ExpiredWithoutRefresh,
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Session context attached to an identity-scoped handle.
#[derive(Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// `sub` of the token, when it could be read.
    pub user_id: Option<String>,
    pub expires_at: Option<i64>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Establish a session from an access/refresh token pair.
    pub fn set_session(access_token: &str, refresh_token: &str) -> Result<Self, SessionError> {
        let data = jsonwebtoken::dangerous::insecure_decode::<SessionClaims>(access_token)
            .map_err(|e| SessionError::Malformed(e.to_string()))?;

        let claims = data.claims;
        if let Some(exp) = claims.exp {
            if exp <= Utc::now().timestamp() && refresh_token.is_empty() {
                return Err(SessionError::ExpiredWithoutRefresh);
            }
        }

        Ok(Self {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            user_id: claims.sub,
            expires_at: claims.exp,
        })
    }

    /// Store the raw access token without inspecting it.
    pub fn attach(access_token: &str) -> Self {
        Self {
            access_token: access_token.to_string(),
            refresh_token: String::new(),
            user_id: None,
            expires_at: None,
        }
    }
}

/// Bind `access_token`, falling back to direct attachment.
pub fn bind_session(access_token: &str) -> (Session, SessionBinding) {
    match Session::set_session(access_token, "") {
        Ok(session) => (session, SessionBinding::Bound),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "set_session refused the access token, attaching it directly"
            );
            (Session::attach(access_token), SessionBinding::Attached)
        }
    }
}
