// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// # Behavior
/// - Fails fast if the variable is missing
/// - Produces a clear, human-readable error message
/// - Intended for startup-time configuration validation
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and parses it.
///
/// A missing variable yields the default. A variable that is set but does
/// not parse as `$ty` is a configuration error.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        match std::env::var($key) {
            Ok(raw) => raw.trim().parse::<$ty>().map_err(|e| {
                anyhow::anyhow!(concat!("Invalid value for ", $key, ": {:?} ({})"), raw, e)
            })?,
            Err(_) => $default,
        }
    };
}

/// Reads an optional string variable with a default.
macro_rules! optional_env {
    // ---
    ($key:literal, $default:expr) => {
        std::env::var($key).unwrap_or_else(|_| $default.to_string())
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub session: SessionConfig,
    pub webauthn: WebAuthnConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or invalid.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            server: ServerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            session: SessionConfig::from_env()?,
            webauthn: WebAuthnConfig::from_env()?,
        })
    }
}

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    /// Process-level settings: bind address and metrics backend.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Socket address to listen on. Defaults to `127.0.0.1:8080`.
        pub bind_addr: String,

        /// `prom` for Prometheus, anything else for no-op metrics.
        pub metrics_type: String,
    }

    impl ServerConfig {
        pub fn from_env() -> Result<Self> {
            // ---
            Ok(Self {
                bind_addr: optional_env!("EXPTR_BIND_ADDR", "127.0.0.1:8080"),
                metrics_type: optional_env!("EXPTR_METRICS_TYPE", "noop"),
            })
        }
    }
}
pub use server::ServerConfig;

// ============================================================
// Storage configuration
// ============================================================

mod storage {
    // ---
    use super::*;

    /// Database-related configuration derived from environment variables.
    #[derive(Debug, Clone)]
    pub struct DatabaseConfig {
        /// PostgreSQL connection string.
        pub database_url: String,

        /// Number of retry attempts when initializing the database connection. Defaults to 50.
        pub retry_count: u32,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 30 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of connections to keep in the pool, even when idle. Defaults to 2.
        pub min_connections: u32,

        /// Maximum number of connections open concurrently. Defaults to 15.
        pub max_connections: u32,
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = required_env!("DATABASE_URL");
            let retry_count = optional_env_parse!("EXPTR_DB_RETRY_COUNT", u32, 50);
            let acquire_timeout_secs = optional_env_parse!("EXPTR_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);
            let min_connections = optional_env_parse!("EXPTR_DB_MIN_CONNECTIONS", u32, 2);
            let max_connections = optional_env_parse!("EXPTR_DB_MAX_CONNECTIONS", u32, 15);

            Ok(Self {
                database_url,
                retry_count,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections,
                max_connections,
            })
        }
    }

    /// Redis holds WebAuthn challenges and passkey credentials.
    #[derive(Debug, Clone)]
    pub struct RedisConfig {
        /// Redis connection string.
        pub url: String,
    }

    impl RedisConfig {
        pub fn from_env() -> Result<Self> {
            // ---
            Ok(Self {
                url: required_env!("EXPTR_REDIS_URL"),
            })
        }
    }

    /// Which backends hold persistent and ephemeral state.
    #[derive(Debug, Clone)]
    pub enum StorageConfig {
        /// PostgreSQL for users/sessions/categories/operations, Redis for ceremonies.
        Postgres {
            database: DatabaseConfig,
            redis: RedisConfig,
        },
        /// Everything in process memory. Development and tests only.
        Memory,
    }

    impl StorageConfig {
        /// Reads `EXPTR_STORAGE_TYPE` (`postgres` by default, or `memory`).
        ///
        /// Database and Redis settings are only required for `postgres`.
        pub fn from_env() -> Result<Self> {
            // ---
            let storage_type = optional_env!("EXPTR_STORAGE_TYPE", "postgres");
            match storage_type.as_str() {
                "memory" => Ok(StorageConfig::Memory),
                "postgres" => Ok(StorageConfig::Postgres {
                    database: DatabaseConfig::from_env()?,
                    redis: RedisConfig::from_env()?,
                }),
                other => Err(anyhow::anyhow!("Unknown EXPTR_STORAGE_TYPE: {other}")),
            }
        }
    }
}
pub use storage::{DatabaseConfig, RedisConfig, StorageConfig};

// ============================================================
// Token / session configuration
// ============================================================

mod auth {
    // ---
    use super::*;

    /// Which token format the deployment issues.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TokenStrategy {
        /// `base64(header).base64(claims).base64(hmac)` custom scheme.
        Hmac,
        /// Standard HS256 JWT.
        Jwt,
    }

    /// Token issuance settings.
    #[derive(Debug, Clone)]
    pub struct AuthConfig {
        pub strategy: TokenStrategy,

        /// Shared signing secret. Required.
        pub secret: String,

        pub issuer: String,
        pub audience: String,

        /// Lifetime written into `exp`. Defaults to one hour.
        pub token_ttl: Duration,

        /// Reject HMAC tokens whose `exp` has passed. Defaults to `true`.
        pub enforce_expiry: bool,

        /// Clock skew tolerated by the JWT strategy. Defaults to 30 seconds.
        pub jwt_leeway: Duration,
    }

    impl AuthConfig {
        /// Builds an [`AuthConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if the secret is missing or the strategy unknown.
        pub fn from_env() -> Result<Self> {
            // ---
            let strategy = match optional_env!("EXPTR_TOKEN_STRATEGY", "hmac").as_str() {
                "hmac" => TokenStrategy::Hmac,
                "jwt" => TokenStrategy::Jwt,
                other => return Err(anyhow::anyhow!("Unknown EXPTR_TOKEN_STRATEGY: {other}")),
            };
            let secret = required_env!("EXPTR_TOKEN_SECRET");
            if secret.is_empty() {
                return Err(anyhow::anyhow!("EXPTR_TOKEN_SECRET must not be empty"));
            }

            Ok(Self {
                strategy,
                secret,
                issuer: optional_env!("EXPTR_TOKEN_ISSUER", "backend.exptr"),
                audience: optional_env!("EXPTR_TOKEN_AUDIENCE", "frontend.exptr"),
                token_ttl: Duration::from_secs(optional_env_parse!(
                    "EXPTR_TOKEN_TTL_SEC",
                    u64,
                    3600
                )),
                enforce_expiry: optional_env_parse!("EXPTR_TOKEN_ENFORCE_EXP", bool, true),
                jwt_leeway: Duration::from_secs(optional_env_parse!(
                    "EXPTR_JWT_LEEWAY_SEC",
                    u64,
                    30
                )),
            })
        }
    }

    /// Session lifetime and sweep schedule.
    #[derive(Debug, Clone)]
    pub struct SessionConfig {
        /// Sessions older than this are swept. Defaults to one hour.
        pub max_age: Duration,

        /// How often the sweep runs. Defaults to one hour.
        pub sweep_interval: Duration,
    }

    impl SessionConfig {
        pub fn from_env() -> Result<Self> {
            // ---
            let max_age = optional_env_parse!("EXPTR_SESSION_MAX_AGE_SEC", u64, 3600);
            let sweep_interval = optional_env_parse!("EXPTR_SESSION_SWEEP_INTERVAL_SEC", u64, 3600);

            Ok(Self {
                max_age: Duration::from_secs(max_age),
                sweep_interval: Duration::from_secs(sweep_interval.max(1)),
            })
        }
    }
}
pub use auth::{AuthConfig, SessionConfig, TokenStrategy};

// ============================================================
// WebAuthn configuration
// ============================================================

mod webauthn {
    // ---
    use super::*;

    /// WebAuthn / Passkeys configuration.
    ///
    /// These values define the relying party identity and security
    /// origins used during WebAuthn registration and authentication.
    #[derive(Debug, Clone)]
    pub struct WebAuthnConfig {
        /// Relying Party ID (typically a domain name).
        pub rp_id: String,

        /// Human-readable Relying Party name.
        pub rp_name: String,

        /// Fully-qualified origins (e.g. https://example.com). The first one
        /// is the primary origin; at least one is required.
        pub origins: Vec<String>,

        /// Time-to-live for in-flight ceremony challenges.
        pub challenge_ttl: Duration,
    }

    impl WebAuthnConfig {
        /// Builds a [`WebAuthnConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if the RP id or origins are missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let rp_id = required_env!("EXPTR_WEBAUTHN_RP_ID");
            let origins: Vec<String> = required_env!("EXPTR_WEBAUTHN_ORIGINS")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if origins.is_empty() {
                return Err(anyhow::anyhow!("EXPTR_WEBAUTHN_ORIGINS must list at least one origin"));
            }

            let rp_name = optional_env!("EXPTR_WEBAUTHN_RP_NAME", "ExptrTracker");
            let ttl_secs = optional_env_parse!("EXPTR_WEBAUTHN_CHALLENGE_TTL_SEC", u64, 300);

            Ok(Self {
                rp_id,
                rp_name,
                origins,
                challenge_ttl: Duration::from_secs(ttl_secs),
            })
        }
    }
}
pub use webauthn::WebAuthnConfig;

// ============================================================
// Tests
// ============================================================
