// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stream Aggregator API
//!
//! REST service shell for aggregating live streams from YouTube, Twitch and
//! other platforms, backed by Supabase for persistence and authentication.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Supabase JWT verification and request authentication
//! - `config` - Environment configuration
//! - `database` - Supabase client factory (RLS-scoped and service-role handles)
//! - `error` - Application error taxonomy and JSON error envelope

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod state;
