// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Supabase JWT authentication for the Stream Aggregator API.
//!
//! ## Auth Flow
//!
//! 1. The frontend signs the user in with Supabase Auth
//! 2. The frontend sends `Authorization: Bearer <access token>`
//! 3. The server:
//!    - Verifies the HS256 signature against `SUPABASE_JWT_SECRET`
//!    - Checks `exp` and `nbf` when present (audience is not checked)
//!    - Hands the full claim set to the handler
//!
//! Every failure is a 401 `AUTHENTICATION_REQUIRED` error whose message names
//! the cause (missing token, expired, invalid, verification failure).
//!
//! Health endpoints are never guarded.

pub mod authenticator;
pub mod claims;
pub mod extractor;
pub mod middleware;
pub mod verifier;

pub use authenticator::{authenticate, authenticate_credentials, BearerCredentials};
pub use claims::{AuthenticatedUser, Claims};
pub use extractor::{Auth, OptionalAuth};
pub use middleware::require_auth;
pub use verifier::TokenVerifier;
