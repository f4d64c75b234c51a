// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, state::AppState};

/// Basic API information.
#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub status: String,
    /// Path of the interactive API docs.
    pub docs: String,
    /// Path of the health endpoint.
    pub health: String,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Meta",
    responses(
        (status = 200, description = "API information", body = RootResponse)
    )
)]
pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let config = &state.config;
    Json(RootResponse {
        message: config.app_name.clone(),
        version: config.app_version.clone(),
        status: "running".to_string(),
        docs: "/docs".to_string(),
        health: format!("{}/health", config.api_prefix),
    })
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::resource_not_found()
}
