// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Line-oriented session. One ledger (and so one aggregate cache) serves
//! every command typed until `exit`.

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::debug;

use crate::commands::{Session, dispatch};

/// Splits a command line on whitespace, keeping double-quoted runs together.
pub fn split_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut pending = false;
    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    args.push(std::mem::take(&mut cur));
                    pending = false;
                }
            }
            c => {
                cur.push(c);
                pending = true;
            }
        }
    }
    if pending {
        args.push(cur);
    }
    args
}

pub fn run<R: BufRead>(session: &mut Session, input: R) -> Result<()> {
    println!("Budget Buddy shell. Type 'help' for commands, 'exit' to leave.");
    prompt()?;
    for line in input.lines() {
        let line = line?;
        let args = split_args(&line);
        match args.first().map(String::as_str) {
            None => {}
            Some("exit") | Some("quit") => break,
            Some("shell") => println!("Already in a shell"),
            Some(_) => {
                debug!(command = %line.trim(), "shell command");
                let argv = std::iter::once("budgetbuddy".to_string()).chain(args);
                match crate::cli::build_cli().try_get_matches_from(argv) {
                    Ok(matches) => {
                        if let Some(flag) = session_override(&matches) {
                            println!("Error: {} cannot be changed inside the shell", flag);
                        } else if let Err(e) = dispatch(session, &matches) {
                            println!("Error: {:#}", e);
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
        }
        prompt()?;
    }
    println!();
    Ok(())
}

/// The first global flag that would rebind the session, if any was given.
/// The ledger and user are fixed for the life of the shell.
fn session_override(matches: &clap::ArgMatches) -> Option<&'static str> {
    let mut level = Some(matches);
    while let Some(m) = level {
        for (id, flag) in [("user", "--user"), ("db", "--db")] {
            if m.try_get_one::<String>(id).ok().flatten().is_some() {
                return Some(flag);
            }
        }
        level = m.subcommand().map(|(_, sub)| sub);
    }
    None
}

fn prompt() -> Result<()> {
    print!("budgetbuddy> ");
    std::io::stdout().flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_group_words() {
        assert_eq!(
            split_args(r#"tx add --kind expense --category "Eating Out" --amount 12"#),
            vec!["tx", "add", "--kind", "expense", "--category", "Eating Out", "--amount", "12"]
        );
    }

    #[test]
    fn global_flags_are_detected_at_any_level() {
        let cli = crate::cli::build_cli();
        let m = cli
            .clone()
            .try_get_matches_from(["budgetbuddy", "tx", "clear", "--yes", "--user", "bob"])
            .unwrap();
        assert_eq!(session_override(&m), Some("--user"));
        let m = cli
            .clone()
            .try_get_matches_from(["budgetbuddy", "--db", "other.sqlite", "report", "summary"])
            .unwrap();
        assert_eq!(session_override(&m), Some("--db"));
        let m = cli
            .try_get_matches_from(["budgetbuddy", "tx", "clear", "--yes"])
            .unwrap();
        assert_eq!(session_override(&m), None);
    }

    #[test]
    fn empty_quotes_are_an_argument() {
        assert_eq!(split_args(r#"a "" b"#), vec!["a", "", "b"]);
        assert!(split_args("   ").is_empty());
    }
}
