// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Minimal PostgREST query builder.

use std::fmt::Display;

use reqwest::{header::ACCEPT, Request};
use serde_json::Value;

use super::client::{StoreClient, PLATFORM};
use crate::error::AppError;

/// A `GET` query against one table, bound to a handle's credentials.
#[derive(Debug)]
pub struct TableQuery<'a> {
    client: &'a StoreClient,
    table: String,
    params: Vec<(String, String)>,
}

impl<'a> TableQuery<'a> {
    pub(super) fn new(client: &'a StoreClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            params: Vec::new(),
        }
    }

    /// Columns to return (`*` for all).
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    /// Filter rows where `column` equals `value`.
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.params.push((column.to_string(), format!("eq.{value}")));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".to_string(), format!("{column}.{direction}")));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.params.push(("limit".to_string(), count.to_string()));
        self
    }

    /// Build the HTTP request without sending it.
    pub fn build(&self) -> Result<Request, AppError> {
        let url = self.client.rest_url(&self.table)?;

        self.client
            .http
            .get(url)
            .query(&self.params)
            .header("apikey", self.client.api_key())
            .bearer_auth(self.client.bearer_token())
            .header(ACCEPT, "application/json")
            .build()
            .map_err(|e| {
                AppError::external_api(format!("Failed to build Supabase request: {e}"), PLATFORM)
            })
    }

    /// Send the query and return the matching rows.
    pub async fn execute(self) -> Result<Vec<Value>, AppError> {
        let request = self.build()?;
        let response = self.client.http.execute(request).await.map_err(|e| {
            AppError::external_api(format!("Supabase request failed: {e}"), PLATFORM)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(table = %self.table, %status, "Supabase query failed");
            return Err(
                AppError::external_api(format!("Supabase returned {status}"), PLATFORM)
                    .with_detail("status", status.as_u16())
                    .with_detail("body", body),
            );
        }

        response.json::<Vec<Value>>().await.map_err(|e| {
            AppError::external_api(format!("Supabase response was invalid: {e}"), PLATFORM)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SupabaseConfig;
    use crate::database::ClientFactory;
    use url::Url;

    fn factory() -> ClientFactory {
        ClientFactory::new(SupabaseConfig {
            url: Some(Url::parse("https://test.supabase.co/").unwrap()),
            anon_key: "test-anon-key".to_string(),
            service_role_key: "test-service-role-key".to_string(),
            jwt_secret: "test-jwt-secret".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn builds_filtered_request() {
        let handle = factory().admin_handle();
        let request = handle
            .from("streams")
            .select("id,title")
            .eq("is_live", true)
            .order("started_at", false)
            .limit(20)
            .build()
            .unwrap();

        assert_eq!(request.method(), "GET");
        assert_eq!(
            request.url().as_str(),
            "https://test.supabase.co/rest/v1/streams?select=id%2Ctitle&is_live=eq.true&order=started_at.desc&limit=20"
        );
    }

    #[test]
    fn privileged_request_uses_service_role_key() {
        let handle = factory().get_handle(None);
        let request = handle.from("channels").select("*").build().unwrap();

        assert_eq!(request.headers()["apikey"], "test-service-role-key");
        assert_eq!(
            request.headers()["authorization"],
            "Bearer test-service-role-key"
        );
    }

    #[test]
    fn identity_request_uses_anon_key_and_user_token() {
        let handle = factory().get_handle(Some("user.jwt.token"));
        let request = handle.from("channels").select("*").build().unwrap();

        assert_eq!(request.headers()["apikey"], "test-anon-key");
        assert_eq!(request.headers()["authorization"], "Bearer user.jwt.token");
    }

    #[tokio::test]
    async fn execute_without_project_url_is_external_api_error() {
        let factory = ClientFactory::new(SupabaseConfig::default()).unwrap();
        let handle = factory.admin_handle();

        let err = handle.from("channels").execute().await.unwrap_err();
        assert_eq!(err.status_code().as_u16(), 503);
        assert_eq!(err.details()["platform"], "supabase");
    }
}
