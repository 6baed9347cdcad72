// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::Session;
use crate::store::TIMESTAMP_FMT;
use anyhow::{Context, Result, bail};
use serde_json::json;

pub fn handle(session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(session, sub),
        _ => Ok(()),
    }
}

fn export_transactions(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "csv".into());
    let out = sub.get_one::<String>("out").context("missing --out")?;
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let rows = session
        .ledger
        .transactions(&session.user)
        .context("Failed to fetch transactions")?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Failed to create {}", out))?;
            wtr.write_record([
                "id",
                "kind",
                "category",
                "amount",
                "description",
                "created_at",
            ])?;
            for t in &rows {
                wtr.write_record([
                    t.id.to_string(),
                    t.kind.to_string(),
                    t.category.clone(),
                    t.amount.to_string(),
                    t.description.clone().unwrap_or_default(),
                    t.created_at.format(TIMESTAMP_FMT).to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = rows
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id,
                        "kind": t.kind,
                        "category": t.category,
                        "amount": t.amount.to_string(),
                        "description": t.description,
                        "created_at": t.created_at.format(TIMESTAMP_FMT).to_string(),
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("Failed to write {}", out))?;
        }
    }
    println!("Exported {} transaction(s) to {}", rows.len(), out);
    Ok(())
}
