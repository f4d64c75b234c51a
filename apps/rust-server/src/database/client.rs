// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Supabase client handles and the factory that builds them.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::query::TableQuery;
use super::session::{bind_session, Session, SessionBinding};
use crate::config::SupabaseConfig;
use crate::error::AppError;

/// Platform name reported in `API_UNAVAILABLE` errors.
pub const PLATFORM: &str = "supabase";

const REST_PATH: &str = "rest/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Authorization mode of a handle, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Anon key plus the caller's access token; row-level security applies.
    Identity(String),
    /// Service-role key; row-level security is bypassed.
    Privileged,
}

/// Handle to the Supabase data store.
///
/// Building a handle never touches the network. Handles are meant to be
/// created per request and dropped with it.
#[derive(Clone)]
pub struct StoreClient {
    pub(super) http: Client,
    base_url: Option<Url>,
    api_key: String,
    mode: AuthMode,
    session: Option<Session>,
    binding: SessionBinding,
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("privileged", &self.is_privileged())
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

impl StoreClient {
    pub fn mode(&self) -> &AuthMode {
        &self.mode
    }

    pub fn is_privileged(&self) -> bool {
        self.mode == AuthMode::Privileged
    }

    /// How the identity token was bound, for identity-scoped handles.
    pub fn binding(&self) -> SessionBinding {
        self.binding
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Key sent in the `apikey` header.
    pub(super) fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Token sent as `Authorization: Bearer`: the session's access token, or
    /// the API key itself for privileged handles.
    pub(super) fn bearer_token(&self) -> &str {
        self.session
            .as_ref()
            .map(|s| s.access_token.as_str())
            .unwrap_or(self.api_key.as_str())
    }

    /// PostgREST URL for `table`.
    pub(super) fn rest_url(&self, table: &str) -> Result<Url, AppError> {
        let base = self
            .base_url
            .as_ref()
            .ok_or_else(|| AppError::external_api("Supabase URL is not configured", PLATFORM))?;

        let raw = format!(
            "{}/{}/{}",
            base.as_str().trim_end_matches('/'),
            REST_PATH,
            table
        );
        Url::parse(&raw).map_err(|e| {
            AppError::external_api(format!("Invalid Supabase table URL: {e}"), PLATFORM)
        })
    }

    /// Start a query against `table`.
    pub fn from(&self, table: impl Into<String>) -> TableQuery<'_> {
        TableQuery::new(self, table)
    }
}

/// Builds [`StoreClient`] handles from the process-wide Supabase settings.
#[derive(Debug, Clone)]
pub struct ClientFactory {
    settings: SupabaseConfig,
    http: Client,
}

impl ClientFactory {
    pub fn new(settings: SupabaseConfig) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::HttpClient(e.to_string()))?;

        Ok(Self { settings, http })
    }

    /// Identity-scoped handle when `identity_token` is non-empty, privileged
    /// handle otherwise.
    pub fn get_handle(&self, identity_token: Option<&str>) -> StoreClient {
        match identity_token.filter(|t| !t.is_empty()) {
            Some(token) => self.identity_handle(token),
            None => self.privileged_handle(),
        }
    }

    /// Service-role handle for system work (background jobs, admin tasks).
    pub fn admin_handle(&self) -> StoreClient {
        self.privileged_handle()
    }

    /// Identity-scoped handle for serving user data.
    ///
    /// Always identity-scoped: an empty token is bound as-is rather than
    /// falling back to the service role.
    pub fn user_handle(&self, access_token: &str) -> StoreClient {
        self.identity_handle(access_token)
    }

    fn identity_handle(&self, access_token: &str) -> StoreClient {
        let (session, binding) = bind_session(access_token);
        tracing::debug!(?binding, "Built identity-scoped Supabase handle");

        StoreClient {
            http: self.http.clone(),
            base_url: self.settings.url.clone(),
            api_key: self.settings.anon_key.clone(),
            mode: AuthMode::Identity(access_token.to_string()),
            session: Some(session),
            binding,
        }
    }

    fn privileged_handle(&self) -> StoreClient {
        StoreClient {
            http: self.http.clone(),
            base_url: self.settings.url.clone(),
            api_key: self.settings.service_role_key.clone(),
            mode: AuthMode::Privileged,
            session: None,
            binding: SessionBinding::NotApplicable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn test_settings() -> SupabaseConfig {
        SupabaseConfig {
            url: Some(Url::parse("https://test.supabase.co").unwrap()),
            anon_key: "test-anon-key".to_string(),
            service_role_key: "test-service-role-key".to_string(),
            jwt_secret: "test-jwt-secret".to_string(),
        }
    }

    fn user_token() -> String {
        encode(
            &Header::default(),
            &json!({ "sub": "user-uuid-123", "exp": Utc::now().timestamp() + 3600 }),
            &EncodingKey::from_secret(b"test-jwt-secret"),
        )
        .unwrap()
    }

    #[test]
    fn no_token_yields_privileged_handle() {
        let factory = ClientFactory::new(test_settings()).unwrap();

        for token in [None, Some("")] {
            let handle = factory.get_handle(token);
            assert!(handle.is_privileged());
            assert_eq!(handle.binding(), SessionBinding::NotApplicable);
            assert!(handle.session().is_none());
            assert_eq!(handle.api_key(), "test-service-role-key");
            assert_eq!(handle.bearer_token(), "test-service-role-key");
        }
    }

    #[test]
    fn token_yields_identity_handle() {
        let factory = ClientFactory::new(test_settings()).unwrap();
        let token = user_token();

        let handle = factory.get_handle(Some(&token));
        assert_eq!(handle.mode(), &AuthMode::Identity(token.clone()));
        assert_eq!(handle.binding(), SessionBinding::Bound);
        assert_eq!(handle.api_key(), "test-anon-key");
        assert_eq!(handle.bearer_token(), token);
        assert_eq!(
            handle.session().and_then(|s| s.user_id.as_deref()),
            Some("user-uuid-123")
        );
    }

    #[test]
    fn unbindable_token_still_yields_identity_handle() {
        let factory = ClientFactory::new(test_settings()).unwrap();

        let handle = factory.get_handle(Some("some-token"));
        assert!(!handle.is_privileged());
        assert_eq!(handle.binding(), SessionBinding::Attached);
        assert_eq!(handle.bearer_token(), "some-token");
    }

    #[test]
    fn convenience_handles() {
        let factory = ClientFactory::new(test_settings()).unwrap();

        assert!(factory.admin_handle().is_privileged());

        let user = factory.user_handle(&user_token());
        assert!(!user.is_privileged());

        let empty = factory.user_handle("");
        assert_eq!(empty.mode(), &AuthMode::Identity(String::new()));
        assert_eq!(empty.binding(), SessionBinding::Attached);
    }

    #[test]
    fn rest_url_joins_table() {
        let factory = ClientFactory::new(test_settings()).unwrap();
        let url = factory.admin_handle().rest_url("channels").unwrap();
        assert_eq!(url.as_str(), "https://test.supabase.co/rest/v1/channels");
    }

    #[test]
    fn rest_url_requires_configured_project() {
        let factory = ClientFactory::new(SupabaseConfig::default()).unwrap();
        let err = factory.admin_handle().rest_url("channels").unwrap_err();
        assert_eq!(err.error_code(), "API_UNAVAILABLE");
        assert_eq!(err.details()["platform"], "supabase");
    }
}
