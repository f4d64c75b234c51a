// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{require_auth, Claims},
    config::Config,
    error::{ErrorBody, ErrorEnvelope},
    state::AppState,
};

pub mod health;
pub mod root;
pub mod users;

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let protected = Router::new()
        .route("/users/me", get(users::get_current_user))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/health/live", get(health::liveness))
        .merge(protected);

    let app = Router::new().route("/", get(root::root));
    // axum refuses to nest at the root.
    let app = if config.api_prefix.is_empty() {
        app.merge(api_routes)
    } else {
        app.nest(&config.api_prefix, api_routes)
    };

    app.fallback(root::not_found)
        .with_state(state)
        .merge(
            SwaggerUi::new("/docs").url("/api-doc/openapi.json", api_doc(&config.api_prefix)),
        )
        .layer(cors_layer(&config))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Prefix the handler annotations document their paths under.
const DOCUMENTED_PREFIX: &str = "/api";

/// OpenAPI document with API paths moved under `prefix`.
pub fn api_doc(prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    if prefix == DOCUMENTED_PREFIX {
        return doc;
    }

    doc.paths.paths = std::mem::take(&mut doc.paths.paths)
        .into_iter()
        .map(|(path, item)| {
            let moved = path
                .strip_prefix(DOCUMENTED_PREFIX)
                .filter(|rest| rest.is_empty() || rest.starts_with('/'))
                .map(|rest| format!("{prefix}{rest}"));
            (moved.unwrap_or(path), item)
        })
        .collect();
    doc
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stream Aggregator API",
        description = "REST API for aggregating live streams from YouTube, Twitch, and other platforms"
    ),
    paths(
        root::root,
        health::health,
        health::readiness,
        health::liveness,
        users::get_current_user
    ),
    components(
        schemas(
            root::RootResponse,
            health::HealthResponse,
            health::HealthData,
            health::HealthChecks,
            health::ComponentCheck,
            health::ProbeResponse,
            health::ProbeData,
            users::CurrentUserResponse,
            users::CurrentUser,
            Claims,
            ErrorEnvelope,
            ErrorBody
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Meta", description = "Service information"),
        (name = "Health", description = "Health and readiness probes"),
        (name = "Users", description = "Authenticated user information")
    )
)]
struct ApiDoc;
