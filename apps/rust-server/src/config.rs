// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded once from the environment at startup (a `.env`
//! file is honoured by `main`) and shared read-only through `AppState`.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `APP_NAME` | Service name reported by `/` | `Stream Aggregator API` |
//! | `APP_VERSION` | Version reported by `/` and `/health` | `1.0.0` |
//! | `DEBUG` | Debug mode | `false` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8000` |
//! | `ALLOWED_ORIGINS` | CORS origins, comma list or JSON array | `*` |
//! | `API_V1_STR` | Prefix for API routes | `/api` |
//! | `SUPABASE_URL` | Supabase project URL | Required for data access |
//! | `SUPABASE_ANON_KEY` | Public (anon) API key | Required for data access |
//! | `SUPABASE_SERVICE_ROLE_KEY` | Service-role API key (bypasses RLS) | Required for admin access |
//! | `SUPABASE_JWT_SECRET` | HS256 secret used to verify access tokens | Required for auth |
//! | `JWT_LEEWAY_SECONDS` | Clock skew tolerance for `exp` | `0` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;

use url::Url;

pub const APP_NAME_ENV: &str = "APP_NAME";
pub const APP_VERSION_ENV: &str = "APP_VERSION";
pub const DEBUG_ENV: &str = "DEBUG";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";
pub const API_PREFIX_ENV: &str = "API_V1_STR";
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const SUPABASE_SERVICE_ROLE_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";
pub const SUPABASE_JWT_SECRET_ENV: &str = "SUPABASE_JWT_SECRET";
pub const JWT_LEEWAY_ENV: &str = "JWT_LEEWAY_SECONDS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default `RUST_LOG` filter when none is set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const DEFAULT_APP_NAME: &str = "Stream Aggregator API";
const DEFAULT_APP_VERSION: &str = "1.0.0";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_API_PREFIX: &str = "/api";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl fmt::Display) -> Self {
        ConfigError::InvalidValue {
            name,
            reason: reason.to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Supabase project settings.
#[derive(Clone, Default)]
pub struct SupabaseConfig {
    /// Project URL (`None` when unset; data access then fails per request).
    pub url: Option<Url>,
    pub anon_key: String,
    pub service_role_key: String,
    pub jwt_secret: String,
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("anon_key", &redact(&self.anon_key))
            .field("service_role_key", &redact(&self.service_role_key))
            .field("jwt_secret", &redact(&self.jwt_secret))
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub app_version: String,
    pub debug: bool,
    pub host: String,
    pub port: u16,
    /// CORS origins; `*` allows any origin.
    pub allowed_origins: Vec<String>,
    /// Prefix the API routes are nested under (e.g. `/api`).
    pub api_prefix: String,
    pub supabase: SupabaseConfig,
    pub jwt_leeway_seconds: u64,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            app_version: DEFAULT_APP_VERSION.to_string(),
            debug: false,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: vec!["*".to_string()],
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            supabase: SupabaseConfig::default(),
            jwt_leeway_seconds: 0,
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns the raw value of a
    /// variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Config::default();

        let debug = match get(DEBUG_ENV) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::invalid(DEBUG_ENV, raw))?,
            None => defaults.debug,
        };

        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid(PORT_ENV, e))?,
            None => defaults.port,
        };

        let allowed_origins = match get(ALLOWED_ORIGINS_ENV) {
            Some(raw) => parse_origins(&raw)?,
            None => defaults.allowed_origins,
        };

        let url = get(SUPABASE_URL_ENV)
            .map(|raw| Url::parse(&raw).map_err(|e| ConfigError::invalid(SUPABASE_URL_ENV, e)))
            .transpose()?;

        let jwt_leeway_seconds = match get(JWT_LEEWAY_ENV) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid(JWT_LEEWAY_ENV, e))?,
            None => defaults.jwt_leeway_seconds,
        };

        let log_format = match get(LOG_FORMAT_ENV).map(|v| v.to_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            app_name: get(APP_NAME_ENV).unwrap_or(defaults.app_name),
            app_version: get(APP_VERSION_ENV).unwrap_or(defaults.app_version),
            debug,
            host: get(HOST_ENV).unwrap_or(defaults.host),
            port,
            allowed_origins,
            api_prefix: get(API_PREFIX_ENV)
                .map(|p| normalize_prefix(&p))
                .unwrap_or(defaults.api_prefix),
            supabase: SupabaseConfig {
                url,
                // Secrets are kept verbatim apart from surrounding whitespace.
                anon_key: get(SUPABASE_ANON_KEY_ENV).unwrap_or_default(),
                service_role_key: get(SUPABASE_SERVICE_ROLE_KEY_ENV).unwrap_or_default(),
                jwt_secret: get(SUPABASE_JWT_SECRET_ENV).unwrap_or_default(),
            },
            jwt_leeway_seconds,
            log_format,
        })
    }

    /// `host:port` string for binding the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether CORS should allow any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Accepts `a, b, c` or a JSON array `["a", "b"]`.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    if raw.starts_with('[') {
        return serde_json::from_str(raw).map_err(|e| ConfigError::invalid(ALLOWED_ORIGINS_ENV, e));
    }
    Ok(raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect())
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
