// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

/// Claims decoded from a Supabase access token.
///
/// The full payload is kept as-is: no field is required, and nothing is
/// filtered out. The accessors below cover the conventional Supabase claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Raw claim lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// `sub` claim (Supabase user id).
    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    /// `sub` parsed as a UUID, if it is one.
    pub fn user_id(&self) -> Option<Uuid> {
        self.subject().and_then(|s| Uuid::parse_str(s).ok())
    }

    pub fn email(&self) -> Option<&str> {
        self.get_str("email")
    }

    /// Postgres role the token was issued for (`authenticated`, `anon`, ...).
    pub fn role(&self) -> Option<&str> {
        self.get_str("role")
    }

    /// `exp` as a Unix timestamp.
    pub fn expires_at(&self) -> Option<i64> {
        self.get("exp").and_then(Value::as_i64)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}

/// Authenticated caller extracted from a request.
///
/// Carries the verified claims and the raw access token. The token is what
/// [`crate::database::ClientFactory::user_handle`] binds to scope a store
/// handle to the caller's row-level security context.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: Claims,
    /// Access token without the `Bearer ` prefix.
    pub access_token: String,
}

impl AuthenticatedUser {
    pub fn new(claims: Claims, access_token: impl Into<String>) -> Self {
        Self {
            claims,
            access_token: access_token.into(),
        }
    }
}
