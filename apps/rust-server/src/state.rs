// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Instant;

use crate::auth::TokenVerifier;
use crate::config::Config;
use crate::database::{ClientFactory, StoreError};

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub verifier: Arc<TokenVerifier>,
    /// Factory for Supabase store handles.
    pub clients: ClientFactory,
    /// Process start, for `uptime_seconds`.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, StoreError> {
        let verifier =
            TokenVerifier::with_leeway(&config.supabase.jwt_secret, config.jwt_leeway_seconds);
        let clients = ClientFactory::new(config.supabase.clone())?;

        Ok(Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            clients,
            started_at: Instant::now(),
        })
    }
}
