// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Auth, AuthenticatedUser, Claims};

/// Response for `GET /api/users/me`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentUserResponse {
    pub success: bool,
    pub data: CurrentUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentUser {
    /// Supabase user id (`sub` claim)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Full verified token payload
    pub claims: Claims,
}

impl From<AuthenticatedUser> for CurrentUser {
    fn from(user: AuthenticatedUser) -> Self {
        let claims = user.claims;
        Self {
            user_id: claims.subject().map(str::to_string),
            email: claims.email().map(str::to_string),
            role: claims.role().map(str::to_string),
            claims,
        }
    }
}

/// Get the current authenticated user's information.
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = CurrentUserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token", body = crate::error::ErrorEnvelope),
    )
)]
pub async fn get_current_user(Auth(user): Auth) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        success: true,
        data: user.into(),
    })
}
