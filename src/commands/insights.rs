// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::insights;
use crate::commands::Session;
use crate::models::{Insight, InsightLevel, Kind};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

pub fn compute(session: &Session, now: DateTime<Utc>) -> Result<Vec<Insight>> {
    let rows = session
        .ledger
        .transactions(&session.user)
        .context("Failed to fetch transactions")?;
    let summary = session
        .ledger
        .summary(&session.user)
        .context("Failed to compute summary")?;
    Ok(insights(&rows, &summary, now))
}

pub fn handle(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = compute(session, Utc::now())?;
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    if data.is_empty() {
        println!("Add more transactions to get personalized insights!");
    } else {
        let rows = data
            .iter()
            .map(|i| {
                let level = match i.level {
                    InsightLevel::Alert => "ALERT",
                    InsightLevel::Success => "GOOD",
                    InsightLevel::Info => "INFO",
                };
                vec![level.to_string(), i.title.clone(), i.message.clone()]
            })
            .collect();
        println!("{}", pretty_table(&["", "Insight", "Detail"], rows));
    }

    // Top five categories per kind, largest first.
    let categories = session
        .ledger
        .category_summary(&session.user)
        .context("Failed to compute category summary")?;
    for kind in [Kind::Expense, Kind::Income] {
        let rows: Vec<Vec<String>> = categories
            .iter()
            .filter(|c| c.kind == kind)
            .take(5)
            .enumerate()
            .map(|(i, c)| {
                vec![
                    (i + 1).to_string(),
                    c.category.clone(),
                    fmt_money(&c.total, &session.config.currency),
                ]
            })
            .collect();
        if !rows.is_empty() {
            println!("Top {} categories", kind.as_str().to_lowercase());
            println!("{}", pretty_table(&["#", "Category", "Total"], rows));
        }
    }
    Ok(())
}
