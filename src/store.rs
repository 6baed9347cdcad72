// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! User-scoped reads and writes against the `transactions` table.
//!
//! Every function takes the owning `user_id` explicitly. Amounts are stored
//! as decimal text and summed in Rust so totals stay exact.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{LedgerError, Result};
use crate::models::{CategoryTotal, DailyTotal, Kind, Summary, Transaction, ValidTransaction};

/// Layout of `datetime('now')`, which fills `created_at`.
pub const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Trailing window covered by [`daily_summary`].
pub const DAILY_WINDOW_DAYS: i64 = 30;

/// Inserts one validated row, returning the id the store assigned.
pub fn insert(conn: &Connection, user_id: &str, tx: &ValidTransaction) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions(user_id, kind, category, amount, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user_id,
            tx.kind.as_str(),
            tx.category,
            tx.amount.to_string(),
            tx.description
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(user_id, id, kind = %tx.kind, category = %tx.category, amount = %tx.amount, "recorded transaction");
    Ok(id)
}

/// Deletes the row only when it belongs to `user_id`.
pub fn delete(conn: &Connection, id: i64, user_id: &str) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n == 0 {
        return Err(LedgerError::NotFound { id });
    }
    info!(user_id, id, "deleted transaction");
    Ok(())
}

/// Removes every row of `user_id` and reports how many were dropped.
pub fn clear_all(conn: &Connection, user_id: &str) -> Result<usize> {
    let n = conn.execute(
        "DELETE FROM transactions WHERE user_id=?1",
        params![user_id],
    )?;
    info!(user_id, removed = n, "cleared ledger");
    Ok(n)
}

/// All rows of `user_id`, newest first.
pub fn list(conn: &Connection, user_id: &str) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, kind, category, amount, description, created_at
         FROM transactions
         WHERE user_id=?1
         ORDER BY created_at DESC, id DESC",
    )?;
    let mut rows = stmt.query(params![user_id])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let user_id: String = r.get(1)?;
        let kind: String = r.get(2)?;
        let category: String = r.get(3)?;
        let amount: String = r.get(4)?;
        let description: Option<String> = r.get(5)?;
        let created_at: String = r.get(6)?;
        data.push(Transaction {
            id,
            user_id,
            kind: decode_kind(id, &kind)?,
            category,
            amount: decode_amount(id, &amount)?,
            description,
            created_at: decode_timestamp(id, &created_at)?,
        });
    }
    debug!(user_id, rows = data.len(), "listed transactions");
    Ok(data)
}

pub fn count(conn: &Connection, user_id: &str) -> Result<i64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE user_id=?1",
        params![user_id],
        |r| r.get(0),
    )?;
    Ok(n)
}

/// Income and expense totals; both zero for an empty ledger.
pub fn summary(conn: &Connection, user_id: &str) -> Result<Summary> {
    let mut stmt = conn.prepare("SELECT id, kind, amount FROM transactions WHERE user_id=?1")?;
    let mut rows = stmt.query(params![user_id])?;
    let mut out = Summary::default();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let kind: String = r.get(1)?;
        let amount: String = r.get(2)?;
        let amount = decode_amount(id, &amount)?;
        match decode_kind(id, &kind)? {
            Kind::Income => out.income += amount,
            Kind::Expense => out.expense += amount,
        }
    }
    Ok(out)
}

/// One total per `(category, kind)`, largest first.
pub fn category_summary(conn: &Connection, user_id: &str) -> Result<Vec<CategoryTotal>> {
    let mut stmt = conn.prepare(
        "SELECT id, category, kind, amount FROM transactions WHERE user_id=?1",
    )?;
    let mut rows = stmt.query(params![user_id])?;
    let mut agg: HashMap<(String, Kind), Decimal> = HashMap::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let category: String = r.get(1)?;
        let kind: String = r.get(2)?;
        let amount: String = r.get(3)?;
        let key = (category, decode_kind(id, &kind)?);
        *agg.entry(key).or_insert(Decimal::ZERO) += decode_amount(id, &amount)?;
    }
    let mut items: Vec<CategoryTotal> = agg
        .into_iter()
        .map(|((category, kind), total)| CategoryTotal {
            category,
            kind,
            total,
        })
        .collect();
    items.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.kind.cmp(&b.kind))
    });
    Ok(items)
}

/// Per-day totals for rows created within the trailing window ending at
/// `now`, newest day first.
pub fn daily_summary(
    conn: &Connection,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<DailyTotal>> {
    let since = (now - Duration::days(DAILY_WINDOW_DAYS))
        .format(TIMESTAMP_FMT)
        .to_string();
    let mut stmt = conn.prepare(
        "SELECT id, created_at, kind, amount
         FROM transactions
         WHERE user_id=?1 AND created_at >= ?2",
    )?;
    let mut rows = stmt.query(params![user_id, since])?;
    let mut agg: BTreeMap<(NaiveDate, Kind), Decimal> = BTreeMap::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let created_at: String = r.get(1)?;
        let kind: String = r.get(2)?;
        let amount: String = r.get(3)?;
        let date = decode_timestamp(id, &created_at)?.date_naive();
        let key = (date, decode_kind(id, &kind)?);
        *agg.entry(key).or_insert(Decimal::ZERO) += decode_amount(id, &amount)?;
    }
    let mut data: Vec<DailyTotal> = agg
        .into_iter()
        .map(|((date, kind), total)| DailyTotal { date, kind, total })
        .collect();
    data.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.kind.cmp(&b.kind)));
    Ok(data)
}

fn decode_kind(id: i64, s: &str) -> Result<Kind> {
    s.parse::<Kind>()
        .map_err(|_| LedgerError::Corrupt(format!("transaction {} has kind '{}'", id, s)))
}

fn decode_amount(id: i64, s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .map_err(|_| LedgerError::Corrupt(format!("transaction {} has amount '{}'", id, s)))
}

fn decode_timestamp(id: i64, s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FMT)
        .map(|dt| dt.and_utc())
        .map_err(|_| LedgerError::Corrupt(format!("transaction {} has created_at '{}'", id, s)))
}
