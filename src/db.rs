// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::ConfigError;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "BudgetBuddy", "budgetbuddy"));

const SESSION_USER_KEY: &str = "session_user";

/// Default database location inside the platform data dir.
pub fn default_db_path() -> std::result::Result<PathBuf, ConfigError> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2).ok_or(ConfigError::NoDataDir)?;
    Ok(proj.data_dir().join("budgetbuddy.sqlite"))
}

/// Opens (creating if needed) the database at `path` and makes sure the
/// schema exists.
pub fn open_at(path: &Path, config: &Config) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data dir {}", dir.display()))?;
    }
    let mut conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    conn.busy_timeout(config.connect_timeout)?;
    probe(&conn)?;
    init_schema(&mut conn)?;
    Ok(conn)
}

/// Connection bootstrap. Failures are logged and reported as `None` so the
/// caller can run in a degraded, unavailable state and retry later.
pub fn connect(config: &Config) -> Option<Connection> {
    info!(path = %config.database.display(), "connecting to database");
    match open_at(&config.database, config) {
        Ok(conn) => {
            info!("database connection established");
            Some(conn)
        }
        Err(e) => {
            let reason = format!("{:#}", e);
            error!(error = %reason, "database connection failed");
            None
        }
    }
}

/// Round-trips a trivial query to prove the handle is live.
pub fn probe(conn: &Connection) -> Result<()> {
    let one: i64 = conn
        .query_row("SELECT 1", [], |r| r.get(0))
        .context("Connection test failed")?;
    if one != 1 {
        bail!("Connection test returned {}", one);
    }
    Ok(())
}

pub fn sqlite_version(conn: &Connection) -> Result<String> {
    let v: String = conn.query_row("SELECT sqlite_version()", [], |r| r.get(0))?;
    Ok(v)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('Income','Expense')),
        category TEXT NOT NULL,
        amount TEXT NOT NULL, -- decimal(10,2), always > 0
        description TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_user_id ON transactions(user_id);
    CREATE INDEX IF NOT EXISTS idx_transactions_created_at ON transactions(created_at);
    "#,
    )?;
    Ok(())
}

/// Returns the persisted session user, minting a new UUID the first time.
pub fn session_user(conn: &Connection) -> Result<String> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![SESSION_USER_KEY],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(user) = v {
        return Ok(user);
    }
    let user = Uuid::new_v4().to_string();
    set_session_user(conn, &user)?;
    info!(user_id = %user, "created new session user");
    Ok(user)
}

pub fn set_session_user(conn: &Connection, user: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![SESSION_USER_KEY, user],
    )?;
    Ok(())
}
