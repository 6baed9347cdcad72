// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runtime configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::db::default_db_path;
use crate::error::ConfigError;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_USER: &str = "BUDGETBUDDY_USER";
pub const ENV_CACHE_TTL: &str = "BUDGETBUDDY_CACHE_TTL_SECS";
pub const ENV_CONNECT_TIMEOUT: &str = "BUDGETBUDDY_CONNECT_TIMEOUT_SECS";
pub const ENV_CURRENCY: &str = "BUDGETBUDDY_CURRENCY";

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CURRENCY: &str = "₹";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database: PathBuf,
    /// Explicit session user. When unset the ledger uses the id persisted
    /// in the `settings` table.
    pub user: Option<String>,
    pub cache_ttl: Duration,
    pub connect_timeout: Duration,
    pub currency: String,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    /// `database` wins over `DATABASE_URL` when given.
    pub fn from_env(database: Option<&str>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| match (key, database) {
            (ENV_DATABASE_URL, Some(db)) => Some(db.to_string()),
            _ => std::env::var(key).ok(),
        })
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup_or(lookup, default_db_path)
    }

    /// `default_database` runs only when the lookup names no database.
    pub fn from_lookup_or<F, D>(lookup: F, default_database: D) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
        D: FnOnce() -> Result<PathBuf, ConfigError>,
    {
        let database = match lookup(ENV_DATABASE_URL).filter(|v| !v.trim().is_empty()) {
            Some(url) => parse_database_url(&url),
            None => default_database()?,
        };
        let user = lookup(ENV_USER)
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        let cache_ttl = match lookup(ENV_CACHE_TTL) {
            Some(v) => parse_secs(ENV_CACHE_TTL, &v)?,
            None => DEFAULT_CACHE_TTL,
        };
        let connect_timeout = match lookup(ENV_CONNECT_TIMEOUT) {
            Some(v) => parse_secs(ENV_CONNECT_TIMEOUT, &v)?,
            None => DEFAULT_CONNECT_TIMEOUT,
        };
        let currency = lookup(ENV_CURRENCY).unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        Ok(Self {
            database,
            user,
            cache_ttl,
            connect_timeout,
            currency,
        })
    }

    /// Config for a database at `path` with every other setting defaulted.
    pub fn with_database(path: impl Into<PathBuf>) -> Self {
        Self {
            database: path.into(),
            user: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Accepts a bare path or a `sqlite://` / `sqlite:` URL.
pub fn parse_database_url(url: &str) -> PathBuf {
    let url = url.trim();
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    PathBuf::from(path)
}

fn parse_secs(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: e.to_string(),
        })
}
