// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Supabase Data Access
//!
//! Handles to the Supabase data store come in two modes:
//!
//! - **Identity-scoped**: anon key plus the caller's access token. Row-level
//!   security policies apply, so the caller only sees their own rows. Use for
//!   endpoints serving user data.
//! - **Privileged**: service-role key. Row-level security is bypassed. Use
//!   for system operations, admin functions and background jobs.
//!
//! A handle never changes mode; build a new one instead.

pub mod client;
pub mod query;
pub mod session;

pub use client::{AuthMode, ClientFactory, StoreClient, StoreError, PLATFORM};
pub use query::TableQuery;
pub use session::{Session, SessionBinding};
