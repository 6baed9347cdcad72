// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::{monthly_trend, stats};
use crate::commands::Session;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use serde_json::json;

pub fn handle(session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(session, sub)?,
        Some(("categories", sub)) => categories(session, sub)?,
        Some(("daily", sub)) => daily(session, sub)?,
        Some(("monthly", sub)) => monthly(session, sub)?,
        Some(("stats", sub)) => transaction_stats(session, sub)?,
        _ => {}
    }
    Ok(())
}

fn summary(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let s = session
        .ledger
        .summary(&session.user)
        .context("Failed to compute summary")?;
    let out = json!({
        "income": s.income,
        "expense": s.expense,
        "balance": s.balance(),
        "savings_rate": s.savings_rate().map(|r| r.round_dp(1)),
    });
    if !maybe_print_json(json_flag, jsonl_flag, &out)? {
        let ccy = &session.config.currency;
        let rows = vec![
            vec!["Total Income".into(), fmt_money(&s.income, ccy)],
            vec!["Total Expenses".into(), fmt_money(&s.expense, ccy)],
            vec!["Balance".into(), fmt_money(&s.balance(), ccy)],
        ];
        println!("{}", pretty_table(&["Metric", "Amount"], rows));
    }
    Ok(())
}

fn categories(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = session
        .ledger
        .category_summary(&session.user)
        .context("Failed to compute category summary")?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.category.clone(),
                    c.kind.to_string(),
                    fmt_money(&c.total, &session.config.currency),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Category", "Type", "Total"], rows));
    }
    Ok(())
}

fn daily(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = session
        .ledger
        .daily_summary(&session.user)
        .context("Failed to compute daily summary")?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|d| {
                vec![
                    d.date.to_string(),
                    d.kind.to_string(),
                    fmt_money(&d.total, &session.config.currency),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Date", "Type", "Total"], rows));
    }
    Ok(())
}

fn monthly(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let rows = session
        .ledger
        .transactions(&session.user)
        .context("Failed to fetch transactions")?;
    let data = monthly_trend(&rows);
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|m| {
                vec![
                    m.month.clone(),
                    m.kind.to_string(),
                    fmt_money(&m.total, &session.config.currency),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Month", "Type", "Total"], rows));
    }
    Ok(())
}

fn transaction_stats(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let rows = session
        .ledger
        .transactions(&session.user)
        .context("Failed to fetch transactions")?;
    let data = stats(&rows);
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let ccy = &session.config.currency;
        let average = data
            .average
            .map(|a| fmt_money(&a, ccy))
            .unwrap_or_else(|| "N/A".into());
        let largest = data
            .largest
            .as_ref()
            .map(|t| format!("{} ({}, {})", fmt_money(&t.amount, ccy), t.category, t.kind))
            .unwrap_or_else(|| "N/A".into());
        let rows = vec![
            vec!["Total Transactions".into(), data.count.to_string()],
            vec!["Average Transaction".into(), average],
            vec!["Largest Transaction".into(), largest],
        ];
        println!("{}", pretty_table(&["Statistic", "Value"], rows));
    }
    Ok(())
}
