//! Process configuration from environment variables.

use std::net::SocketAddr;

use thiserror::Error;

use crate::cascade::DEFAULT_MAX_ATTEMPTS;

pub const DEV_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DEVELOPER_NAME: &str = "developer";
pub const DEFAULT_DEVELOPER_PASSWORD: &str = "developer";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set together with {1}")]
    Incomplete(&'static str, &'static str),
}

/// Login name and password of an account created at bootstrap.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAccount {
    pub name: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAccount")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub jwt_secret: String,
    /// `true` when `JWT_SECRET` was unset and the dev default is in use.
    pub jwt_secret_is_default: bool,
    pub bind_addr: SocketAddr,
    /// Postgres when set, in-memory otherwise.
    pub database_url: Option<String>,
    pub developer: BootstrapAccount,
    pub admin: Option<BootstrapAccount>,
    pub cascade_max_attempts: u32,
    /// Honour `X-Forwarded-For` for audit addresses. Only safe behind a proxy
    /// that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("jwt_secret_is_default", &self.jwt_secret_is_default)
            .field("bind_addr", &self.bind_addr)
            .field("database", &self.database_url.as_ref().map(|_| "postgres"))
            .field("developer", &self.developer)
            .field("admin", &self.admin)
            .field("cascade_max_attempts", &self.cascade_max_attempts)
            .field("trust_forwarded_for", &self.trust_forwarded_for)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let (jwt_secret, jwt_secret_is_default) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None => (DEV_JWT_SECRET.to_string(), true),
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let cascade_max_attempts = match get("CASCADE_MAX_ATTEMPTS") {
            None => DEFAULT_MAX_ATTEMPTS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n >= 1 => n,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        name: "CASCADE_MAX_ATTEMPTS",
                        value: raw,
                        reason: "must be at least 1".to_string(),
                    });
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: "CASCADE_MAX_ATTEMPTS",
                        value: raw,
                        reason: e.to_string(),
                    });
                }
            },
        };

        let trust_forwarded_for = match get("TRUST_FORWARDED_FOR") {
            None => false,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "TRUST_FORWARDED_FOR",
                        value: raw,
                        reason: "expected true or false".to_string(),
                    });
                }
            },
        };

        let developer = BootstrapAccount {
            name: get("BOOTSTRAP_DEVELOPER_NAME").unwrap_or_else(|| DEFAULT_DEVELOPER_NAME.to_string()),
            password: get("BOOTSTRAP_DEVELOPER_PASSWORD").unwrap_or_else(|| DEFAULT_DEVELOPER_PASSWORD.to_string()),
        };

        let admin = match (get("BOOTSTRAP_ADMIN_NAME"), get("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(name), Some(password)) => Some(BootstrapAccount { name, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Incomplete("BOOTSTRAP_ADMIN_NAME", "BOOTSTRAP_ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Incomplete("BOOTSTRAP_ADMIN_PASSWORD", "BOOTSTRAP_ADMIN_NAME")),
        };

        Ok(Self {
            jwt_secret,
            jwt_secret_is_default,
            bind_addr,
            database_url: get("DATABASE_URL"),
            developer,
            admin,
            cascade_max_attempts,
            trust_forwarded_for,
        })
    }
}
