// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use budgetbuddy::{cli, commands, config::Config};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("budgetbuddy=warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let db = matches.get_one::<String>("db").map(String::as_str);
    let mut config = Config::from_env(db)?;
    if let Some(user) = matches.get_one::<String>("user") {
        config.user = Some(user.clone());
    }

    let mut session = commands::Session::open(config);
    if !session.ledger.is_available() {
        eprintln!("Database connection failed. Run `budgetbuddy doctor` or retry later.");
    }
    commands::dispatch(&mut session, &matches)
}
