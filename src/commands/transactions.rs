// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::{DateRange, TransactionFilter};
use crate::commands::Session;
use crate::error::LedgerError;
use crate::models::{Kind, NewTransaction, Transaction};
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

pub fn handle(session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(session, sub)?,
        Some(("list", sub)) => list(session, sub)?,
        Some(("rm", sub)) => rm(session, sub)?,
        Some(("clear", sub)) => clear(session, sub)?,
        _ => {}
    }
    Ok(())
}

/// Builds the insert request from `tx add` arguments.
pub fn new_transaction(sub: &clap::ArgMatches) -> Result<NewTransaction> {
    let kind: Kind = sub
        .get_one::<String>("kind")
        .map(String::as_str)
        .unwrap_or_default()
        .parse()?;
    let category = sub.get_one::<String>("category").cloned().unwrap_or_default();
    let amount = parse_decimal(sub.get_one::<String>("amount").map(String::as_str).unwrap_or(""))?;
    let mut tx = NewTransaction::new(kind, category, amount);
    if let Some(desc) = sub.get_one::<String>("description") {
        tx = tx.with_description(desc.as_str());
    }
    Ok(tx)
}

fn add(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let tx = new_transaction(sub)?;
    let (kind, category) = (tx.kind, tx.category.trim().to_string());
    let amount = tx.amount;
    let id = session
        .ledger
        .add(&session.user, tx)
        .with_context(|| format!("Failed to add {}", kind.as_str().to_lowercase()))?;
    println!(
        "Added {} #{}: {} - {}",
        kind.as_str().to_lowercase(),
        id,
        category,
        fmt_money(&amount, &session.config.currency)
    );
    Ok(())
}

/// Reads the list filters from `tx list` arguments.
pub fn filter_from(sub: &clap::ArgMatches) -> Result<TransactionFilter> {
    let kind = match sub.get_one::<String>("kind") {
        Some(k) => Some(k.parse::<Kind>()?),
        None => None,
    };
    let range = match sub.get_one::<String>("range") {
        Some(r) => r.parse::<DateRange>()?,
        None => DateRange::All,
    };
    Ok(TransactionFilter {
        kind,
        category: sub.get_one::<String>("category").cloned(),
        range,
        limit: sub.get_one::<usize>("limit").copied(),
    })
}

pub fn query_rows(
    session: &Session,
    sub: &clap::ArgMatches,
    now: DateTime<Utc>,
) -> Result<Vec<Transaction>> {
    let filter = filter_from(sub)?;
    let rows = session
        .ledger
        .transactions(&session.user)
        .context("Failed to fetch transactions")?;
    Ok(filter.apply(&rows, now))
}

fn list(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(session, sub, Utc::now())?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        if data.is_empty() {
            println!("No transactions found.");
            return Ok(());
        }
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.created_at.format("%d %b %Y %H:%M").to_string(),
                    t.kind.to_string(),
                    t.category.clone(),
                    fmt_money(&t.amount, &session.config.currency),
                    t.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Type", "Category", "Amount", "Description"],
                rows,
            )
        );
        println!("{} transaction(s)", data.len());
    }
    Ok(())
}

fn rm(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("missing transaction id")?;
    match session.ledger.delete(id, &session.user) {
        Ok(()) => println!("Deleted transaction #{}", id),
        Err(e @ LedgerError::NotFound { .. }) => println!("{}", e),
        Err(e) => return Err(e).context("Failed to delete transaction"),
    }
    Ok(())
}

fn clear(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    if !sub.get_flag("yes") {
        println!("Refusing to clear all data without --yes");
        return Ok(());
    }
    let n = session
        .ledger
        .clear_all(&session.user)
        .context("Failed to clear data")?;
    println!("All data cleared ({} transaction(s) removed)", n);
    Ok(())
}
