// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod doctor;
pub mod exporter;
pub mod insights;
pub mod reports;
pub mod shell;
pub mod transactions;

use anyhow::Result;
use tracing::warn;
use uuid::Uuid;

use crate::config::Config;
use crate::db;
use crate::ledger::Ledger;

/// Everything a command needs: configuration, the ledger, and the user all
/// reads and writes are scoped to.
pub struct Session {
    pub config: Config,
    pub ledger: Ledger,
    pub user: String,
}

impl Session {
    pub fn open(config: Config) -> Self {
        let ledger = Ledger::open(&config);
        let user = resolve_user(&config, &ledger);
        Self {
            config,
            ledger,
            user,
        }
    }

    pub fn new(config: Config, ledger: Ledger, user: impl Into<String>) -> Self {
        Self {
            config,
            ledger,
            user: user.into(),
        }
    }
}

/// Configured user first, then the id persisted in the database. Without a
/// database the session gets a throwaway id.
pub fn resolve_user(config: &Config, ledger: &Ledger) -> String {
    if let Some(user) = &config.user {
        return user.clone();
    }
    let persisted = ledger
        .conn()
        .map_err(anyhow::Error::from)
        .and_then(db::session_user);
    match persisted {
        Ok(user) => user,
        Err(e) => {
            let user = Uuid::new_v4().to_string();
            let reason = format!("{:#}", e);
            warn!(error = %reason, user_id = %user, "using an unpersisted session user");
            user
        }
    }
}

pub fn dispatch(session: &mut Session, matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("init", _)) => {
            session.ledger.conn()?;
            println!(
                "Database initialized at {}",
                session.config.database.display()
            );
            println!("Session user: {}", session.user);
        }
        Some(("tx", sub)) => transactions::handle(session, sub)?,
        Some(("report", sub)) => reports::handle(session, sub)?,
        Some(("insights", sub)) => insights::handle(session, sub)?,
        Some(("categories", sub)) => categories::handle(sub)?,
        Some(("export", sub)) => exporter::handle(session, sub)?,
        Some(("refresh", _)) => {
            session.ledger.refresh();
            println!("Data refreshed");
        }
        Some(("reconnect", _)) => {
            if session.ledger.reconnect(&session.config) {
                if session.config.user.is_none() {
                    session.user = resolve_user(&session.config, &session.ledger);
                }
                println!("Database connection available");
            } else {
                println!("Database connection failed; try again later");
            }
        }
        Some(("doctor", _)) => doctor::handle(session)?,
        Some(("shell", _)) => shell::run(session, std::io::stdin().lock())?,
        _ => {
            crate::cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
