// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    ]
}

fn kind_arg() -> Arg {
    Arg::new("kind")
        .long("kind")
        .value_parser(["income", "expense"])
        .ignore_case(true)
}

pub fn build_cli() -> Command {
    Command::new("budgetbuddy")
        .about("Budget Buddy: track income and expenses with cached summaries")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("Database file (overrides DATABASE_URL)"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .help("Session user id (overrides BUDGETBUDDY_USER)"),
        )
        .subcommand(Command::new("init").about("Create the database and print its location"))
        .subcommand(
            Command::new("tx")
                .about("Record, list and delete transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record an income or expense")
                        .arg(kind_arg().required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .allow_negative_numbers(true),
                        )
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(
                    Command::new("list")
                        .about("List transactions, newest first")
                        .arg(kind_arg())
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("range")
                                .long("range")
                                .value_parser(["all", "7d", "30d", "month"])
                                .default_value("all"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        )
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("rm").about("Delete one transaction").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(
                    Command::new("clear")
                        .about("Delete every transaction of the session user")
                        .arg(
                            Arg::new("yes")
                                .long("yes")
                                .action(ArgAction::SetTrue)
                                .help("Confirm deletion"),
                        ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Aggregate views")
                .subcommand(Command::new("summary").about("Income, expense and balance").args(json_args()))
                .subcommand(Command::new("categories").about("Totals per category").args(json_args()))
                .subcommand(Command::new("daily").about("Daily totals over the last 30 days").args(json_args()))
                .subcommand(Command::new("monthly").about("Monthly income vs expense trend").args(json_args()))
                .subcommand(Command::new("stats").about("Count, average and largest transaction").args(json_args())),
        )
        .subcommand(
            Command::new("insights")
                .about("Spending alerts and savings observations")
                .args(json_args()),
        )
        .subcommand(
            Command::new("categories")
                .about("Suggested categories")
                .arg(kind_arg()),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .about("Write the session user's transactions to a file")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv|json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(Command::new("refresh").about("Drop cached summaries"))
        .subcommand(Command::new("reconnect").about("Retry the database connection"))
        .subcommand(Command::new("doctor").about("Check environment and database connectivity"))
        .subcommand(Command::new("shell").about("Interactive session sharing one cache"))
}
