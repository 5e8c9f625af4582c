// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::auth::AuthSettings;

use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://database/tasks.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

pub const DEFAULT_ADMIN_USERNAME: &str = "Admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin1@gmail.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "123admin";

/// Loads a `.env` file from the working directory, if there is one.
pub fn load_env_file() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }
}

/// Server settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    /// The single origin allowed by CORS.
    pub cors_origin: String,
    pub session_ttl_hours: i64,
    pub pbkdf2_iterations: u32,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: '{raw}'")),
        _ => Ok(default),
    }
}

fn string_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Unset or blank keys fall
    /// back to their defaults; set keys that fail to parse are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host_default: IpAddr = DEFAULT_HOST.parse().context("Invalid default host")?;
        let config = Self {
            database_url: string_or(&lookup, "DATABASE_URL", DEFAULT_DATABASE_URL),
            host: parse_or(&lookup, "HOST", host_default)?,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            cors_origin: string_or(&lookup, "CORS_ORIGIN", DEFAULT_CORS_ORIGIN),
            session_ttl_hours: parse_or(&lookup, "SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?,
            pbkdf2_iterations: parse_or(&lookup, "PBKDF2_ITERATIONS", DEFAULT_PBKDF2_ITERATIONS)?,
        };

        if config.session_ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }
        if config.pbkdf2_iterations == 0 {
            anyhow::bail!("PBKDF2_ITERATIONS must be positive");
        }
        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            session_ttl: chrono::Duration::hours(self.session_ttl_hours),
            pbkdf2_iterations: self.pbkdf2_iterations,
        }
    }
}

/// Account created by the `seed` binary.
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SeedAdmin {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            username: string_or(&lookup, "SEED_ADMIN_USERNAME", DEFAULT_ADMIN_USERNAME),
            email: string_or(&lookup, "SEED_ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
            password: string_or(&lookup, "SEED_ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD),
        }
    }
}
