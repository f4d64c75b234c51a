// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Health check endpoints. None of them require authentication.

use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Response for `GET /api/health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub data: HealthData,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthData {
    /// Always `healthy` while the process serves requests.
    pub status: String,
    pub version: String,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    pub application: ComponentCheck,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentCheck {
    /// `up` or `down`.
    pub status: String,
    pub last_check_at: String,
}

/// Response for the readiness and liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProbeResponse {
    pub success: bool,
    pub data: ProbeData,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProbeData {
    /// `ready` or `alive`.
    pub status: String,
    pub timestamp: String,
}

fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// System health check.
///
/// Returns application status and basic system information.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = utc_timestamp();

    Json(HealthResponse {
        success: true,
        data: HealthData {
            status: "healthy".to_string(),
            version: state.config.app_version.clone(),
            timestamp: now.clone(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            checks: HealthChecks {
                application: ComponentCheck {
                    status: "up".to_string(),
                    last_check_at: now,
                },
            },
        },
    })
}

/// Readiness probe handler.
#[utoipa::path(
    get,
    path = "/api/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ProbeResponse)
    )
)]
pub async fn readiness() -> Json<ProbeResponse> {
    probe("ready")
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/api/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = ProbeResponse)
    )
)]
pub async fn liveness() -> Json<ProbeResponse> {
    probe("alive")
}

fn probe(status: &str) -> Json<ProbeResponse> {
    Json(ProbeResponse {
        success: true,
        data: ProbeData {
            status: status.to_string(),
            timestamp: utc_timestamp(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn health_reports_application_up() {
        let mut config = Config::default();
        config.app_version = "9.9.9".to_string();
        let state = AppState::new(config).unwrap();

        let Json(response) = health(State(state)).await;
        assert!(response.success);
        assert_eq!(response.data.status, "healthy");
        assert_eq!(response.data.version, "9.9.9");
        assert_eq!(response.data.checks.application.status, "up");
        assert!(response.data.timestamp.ends_with('Z'));
    }

    #[tokio::test]
    async fn probes_report_their_status() {
        let Json(ready) = readiness().await;
        assert_eq!(ready.data.status, "ready");

        let Json(live) = liveness().await;
        assert_eq!(live.data.status, "alive");
        assert!(live.data.timestamp.ends_with('Z'));
    }
}
