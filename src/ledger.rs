// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The ledger service: a store handle, an aggregate cache in front of it,
//! and the single place where writes invalidate cached reads.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cache::{Accessor, Aggregate, AggregateCache};
use crate::config::Config;
use crate::db;
use crate::error::{LedgerError, Result};
use crate::models::{CategoryTotal, DailyTotal, NewTransaction, Summary, Transaction};
use crate::store;

pub struct Ledger {
    conn: Option<Connection>,
    unavailable_reason: Option<String>,
    cache: AggregateCache,
}

impl Ledger {
    /// Wraps an already open connection.
    pub fn new(conn: Connection, cache_ttl: Duration) -> Self {
        Self {
            conn: Some(conn),
            unavailable_reason: None,
            cache: AggregateCache::new(cache_ttl),
        }
    }

    /// A ledger with no store behind it. Every operation reports
    /// [`LedgerError::Unavailable`] until [`Ledger::reconnect`] succeeds.
    pub fn unavailable(reason: impl Into<String>, cache_ttl: Duration) -> Self {
        Self {
            conn: None,
            unavailable_reason: Some(reason.into()),
            cache: AggregateCache::new(cache_ttl),
        }
    }

    /// Runs connection bootstrap. A failed connection does not error here;
    /// it yields an unavailable ledger.
    pub fn open(config: &Config) -> Self {
        match db::connect(config) {
            Some(conn) => Self::new(conn, config.cache_ttl),
            None => Self::unavailable(unreachable_reason(config), config.cache_ttl),
        }
    }

    pub fn is_available(&self) -> bool {
        self.conn.is_some()
    }

    /// Re-runs bootstrap when the store is unavailable. Returns whether the
    /// ledger is available afterwards.
    pub fn reconnect(&mut self, config: &Config) -> bool {
        if self.conn.is_some() {
            return true;
        }
        match db::connect(config) {
            Some(conn) => {
                info!("ledger reconnected");
                self.conn = Some(conn);
                self.unavailable_reason = None;
                self.cache.clear();
                true
            }
            None => {
                warn!("reconnect failed");
                self.unavailable_reason = Some(unreachable_reason(config));
                false
            }
        }
    }

    /// The live store handle.
    pub fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or_else(|| {
            LedgerError::Unavailable(
                self.unavailable_reason
                    .clone()
                    .unwrap_or_else(|| "no database connection".to_string()),
            )
        })
    }

    pub fn cache(&self) -> &AggregateCache {
        &self.cache
    }

    /// Drops every cached aggregate so the next reads hit the store.
    pub fn refresh(&self) {
        self.cache.clear();
    }

    pub fn add(&self, user_id: &str, tx: NewTransaction) -> Result<i64> {
        let tx = tx.validate()?;
        let id = store::insert(self.conn()?, user_id, &tx)?;
        self.cache.invalidate(user_id);
        Ok(id)
    }

    pub fn delete(&self, id: i64, user_id: &str) -> Result<()> {
        store::delete(self.conn()?, id, user_id)?;
        self.cache.invalidate(user_id);
        Ok(())
    }

    pub fn clear_all(&self, user_id: &str) -> Result<usize> {
        let n = store::clear_all(self.conn()?, user_id)?;
        self.cache.invalidate(user_id);
        Ok(n)
    }

    pub fn transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let agg = self
            .cache
            .get_or_compute(Accessor::Transactions, user_id, || {
                store::list(self.conn()?, user_id).map(Aggregate::Transactions)
            })?;
        match agg {
            Aggregate::Transactions(rows) => Ok(rows),
            other => Err(mismatch(Accessor::Transactions, &other)),
        }
    }

    pub fn summary(&self, user_id: &str) -> Result<Summary> {
        let agg = self.cache.get_or_compute(Accessor::Summary, user_id, || {
            store::summary(self.conn()?, user_id).map(Aggregate::Summary)
        })?;
        match agg {
            Aggregate::Summary(s) => Ok(s),
            other => Err(mismatch(Accessor::Summary, &other)),
        }
    }

    pub fn category_summary(&self, user_id: &str) -> Result<Vec<CategoryTotal>> {
        let agg = self
            .cache
            .get_or_compute(Accessor::Categories, user_id, || {
                store::category_summary(self.conn()?, user_id).map(Aggregate::Categories)
            })?;
        match agg {
            Aggregate::Categories(items) => Ok(items),
            other => Err(mismatch(Accessor::Categories, &other)),
        }
    }

    /// Per-day totals for the 30 days before now.
    pub fn daily_summary(&self, user_id: &str) -> Result<Vec<DailyTotal>> {
        self.daily_summary_at(user_id, Utc::now())
    }

    /// Like [`Ledger::daily_summary`], with the window ending at `now`
    /// whenever the value has to be recomputed.
    pub fn daily_summary_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<DailyTotal>> {
        let agg = self.cache.get_or_compute(Accessor::Daily, user_id, || {
            store::daily_summary(self.conn()?, user_id, now).map(Aggregate::Daily)
        })?;
        match agg {
            Aggregate::Daily(items) => Ok(items),
            other => Err(mismatch(Accessor::Daily, &other)),
        }
    }
}

fn mismatch(expected: Accessor, got: &Aggregate) -> LedgerError {
    LedgerError::Corrupt(format!(
        "cache returned {:?} for {:?}",
        got.accessor(),
        expected
    ))
}

/// The cause itself is logged by [`db::connect`].
fn unreachable_reason(config: &Config) -> String {
    format!("could not open database at {}", config.database.display())
}
