// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Guards a whole router subtree: the request is authenticated before any
//! handler runs and the resulting [`AuthenticatedUser`] is stored in the
//! request extensions, where the [`super::Auth`] extractor picks it up.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/users/me", get(users::get_current_user))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::{extractor::authenticate_headers, AuthenticatedUser};
use crate::{error::AppError, state::AppState};

/// Reject unauthenticated requests with the 401 envelope.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user: AuthenticatedUser = authenticate_headers(request.headers(), &state.verifier)
        .inspect_err(|e| {
            tracing::debug!(path = %request.uri().path(), reason = %e, "Authentication failed");
        })?;

    tracing::debug!(sub = user.claims.subject().unwrap_or("-"), "Request authenticated");
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::{to_bytes, Body},
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Extension, Router,
    };
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SECRET: &str = "test-jwt-secret";

    fn guarded_app() -> Router {
        let mut config = Config::default();
        config.supabase.jwt_secret = SECRET.to_string();
        let state = AppState::new(config).unwrap();

        Router::new()
            .route(
                "/protected",
                get(|Extension(user): Extension<AuthenticatedUser>| async move {
                    user.claims.subject().unwrap_or_default().to_string()
                }),
            )
            .route_layer(from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
    }

    #[tokio::test]
    async fn rejects_request_without_token() {
        let response = guarded_app()
            .oneshot(HttpRequest::get("/protected").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "AUTHENTICATION_REQUIRED");
    }

    #[tokio::test]
    async fn passes_user_to_handler() {
        let token = encode(
            &Header::default(),
            &json!({ "sub": "user_123", "exp": Utc::now().timestamp() + 60 }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let response = guarded_app()
            .oneshot(
                HttpRequest::get("/protected")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"user_123");
    }
}
