// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Application Errors
//!
//! Every failure a handler can surface is an [`AppError`]. The set of kinds is
//! closed: each [`ErrorKind`] fixes its own HTTP status and machine-readable
//! code, callers only choose the message and optional details.
//!
//! | Kind | Status | Code |
//! |------|--------|------|
//! | `Validation` | 400 | `VALIDATION_ERROR` |
//! | `Authentication` | 401 | `AUTHENTICATION_REQUIRED` |
//! | `Authorization` | 403 | `ACCESS_DENIED` |
//! | `NotFound` | 404 | `RESOURCE_NOT_FOUND` |
//! | `Conflict` | 409 | `RESOURCE_CONFLICT` |
//! | `RateLimit` | 429 | `RATE_LIMITED` |
//! | `ExternalApi` | 503 | `API_UNAVAILABLE` |
//! | `Internal` | 500 | `INTERNAL_ERROR` |
//!
//! Rendered responses share one envelope:
//!
//! ```json
//! { "success": false, "error": { "code": "...", "message": "...", "details": {} } }
//! ```

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Default `retry_after_seconds` for rate limit errors.
pub const DEFAULT_RETRY_AFTER_SECONDS: u64 = 60;

pub type ApiResult<T> = Result<T, AppError>;

/// Closed set of error kinds.
///
/// `RateLimit` and `ExternalApi` carry the data that always ends up in the
/// rendered details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    RateLimit { retry_after_seconds: u64 },
    ExternalApi { platform: String },
    Internal,
}

impl ErrorKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::RateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::ExternalApi { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Authentication => "AUTHENTICATION_REQUIRED",
            ErrorKind::Authorization => "ACCESS_DENIED",
            ErrorKind::NotFound => "RESOURCE_NOT_FOUND",
            ErrorKind::Conflict => "RESOURCE_CONFLICT",
            ErrorKind::RateLimit { .. } => "RATE_LIMITED",
            ErrorKind::ExternalApi { .. } => "API_UNAVAILABLE",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Details every error of this kind carries, regardless of caller input.
    fn fixed_details(&self) -> Map<String, Value> {
        let mut details = Map::new();
        match self {
            ErrorKind::RateLimit {
                retry_after_seconds,
            } => {
                details.insert(
                    "retry_after_seconds".to_string(),
                    Value::from(*retry_after_seconds),
                );
            }
            ErrorKind::ExternalApi { platform } => {
                details.insert("platform".to_string(), Value::String(platform.clone()));
            }
            _ => {}
        }
        details
    }
}

/// A terminal request-handling failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    details: Map<String, Value>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let details = kind.fixed_details();
        Self {
            kind,
            message: message.into(),
            details,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn authentication_required() -> Self {
        Self::authentication("Authentication required")
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    pub fn access_denied() -> Self {
        Self::authorization("Access denied")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn resource_not_found() -> Self {
        Self::not_found("Resource not found")
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn resource_conflict() -> Self {
        Self::conflict("Resource conflict")
    }

    /// Rate limit error with the default message.
    pub fn rate_limited(retry_after_seconds: u64) -> Self {
        Self::rate_limited_with_message("Rate limit exceeded", retry_after_seconds)
    }

    pub fn rate_limited_with_message(message: impl Into<String>, retry_after_seconds: u64) -> Self {
        Self::new(
            ErrorKind::RateLimit {
                retry_after_seconds,
            },
            message,
        )
    }

    /// Failure of an upstream service; `platform` names the upstream.
    pub fn external_api(message: impl Into<String>, platform: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::ExternalApi {
                platform: platform.into(),
            },
            message,
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Merge caller-supplied details.
    ///
    /// Keys fixed by the kind (`retry_after_seconds`, `platform`) keep their
    /// kind-assigned values.
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details.extend(details);
        self.details.extend(self.kind.fixed_details());
        self
    }

    pub fn with_detail(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut details = Map::new();
        details.insert(key.into(), value.into());
        self.with_details(details)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }
}

impl Default for AppError {
    fn default() -> Self {
        Self::internal("Internal server error")
    }
}

/// Error envelope returned for every [`AppError`].
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Always `false`.
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Stable machine-readable code, e.g. `AUTHENTICATION_REQUIRED`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// Free-form structured details.
    #[schema(value_type = Object)]
    pub details: Map<String, Value>,
}

impl From<AppError> for ErrorEnvelope {
    fn from(err: AppError) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code: err.error_code().to_string(),
                message: err.message,
                details: err.details,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let retry_after = match self.kind {
            ErrorKind::RateLimit {
                retry_after_seconds,
            } => Some(HeaderValue::from(retry_after_seconds)),
            _ => None,
        };

        if status.is_server_error() {
            tracing::error!(code = self.error_code(), reason = %self.message, "Request failed");
        } else {
            tracing::debug!(code = self.error_code(), reason = %self.message, "Request rejected");
        }

        let mut response = (status, Json(ErrorEnvelope::from(self))).into_response();
        if let Some(value) = retry_after {
            response.headers_mut().insert(RETRY_AFTER, value);
        }
        response
    }
}
