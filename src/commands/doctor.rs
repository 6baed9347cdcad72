// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::Session;
use crate::db::{probe, sqlite_version};
use crate::store;
use crate::utils::{pretty_table, truncate};
use anyhow::Result;

const DB_ENV_KEYWORDS: &[&str] = &["DATABASE", "SQLITE", "BUDGETBUDDY", "DB"];

/// Environment variables that look database related, values shortened.
pub fn database_env_vars<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut out: Vec<(String, String)> = vars
        .into_iter()
        .filter(|(k, _)| {
            let upper = k.to_uppercase();
            DB_ENV_KEYWORDS.iter().any(|kw| upper.contains(kw))
        })
        .map(|(k, v)| (k, truncate(&v, 50)))
        .collect();
    out.sort();
    out
}

pub fn handle(session: &Session) -> Result<()> {
    let mut rows = Vec::new();
    let mut issues = 0;

    let env = database_env_vars(std::env::vars());
    if env.is_empty() {
        rows.push(vec!["env".into(), "no database-related environment variables".into()]);
    }
    for (k, v) in env {
        rows.push(vec![format!("env {}", k), v]);
    }
    rows.push(vec![
        "database".into(),
        session.config.database.display().to_string(),
    ]);
    rows.push(vec!["user".into(), session.user.clone()]);
    rows.push(vec![
        "cache ttl".into(),
        format!("{}s", session.config.cache_ttl.as_secs()),
    ]);

    match session.ledger.conn() {
        Ok(conn) => {
            match probe(conn) {
                Ok(()) => rows.push(vec!["connection".into(), "ok".into()]),
                Err(e) => {
                    issues += 1;
                    rows.push(vec!["connection".into(), format!("{:#}", e)]);
                }
            }
            match sqlite_version(conn) {
                Ok(v) => rows.push(vec!["sqlite".into(), v]),
                Err(e) => {
                    issues += 1;
                    rows.push(vec!["sqlite".into(), format!("{:#}", e)]);
                }
            }
            match store::count(conn, &session.user) {
                Ok(n) => rows.push(vec!["transactions".into(), n.to_string()]),
                Err(e) => {
                    issues += 1;
                    rows.push(vec!["transactions".into(), e.to_string()]);
                }
            }
        }
        Err(e) => {
            issues += 1;
            rows.push(vec!["connection".into(), e.to_string()]);
        }
    }

    println!("{}", pretty_table(&["Check", "Detail"], rows));
    if issues == 0 {
        println!("doctor: no issues found");
    } else {
        println!("doctor: {} issue(s) found", issues);
    }
    Ok(())
}
