// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetbuddy::{
    Ledger,
    cache::Accessor,
    db,
    models::{Kind, NewTransaction},
};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use std::time::Duration;

fn ledger(ttl: Duration) -> Ledger {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    Ledger::new(conn, ttl)
}

/// Writes a row behind the ledger's back, like a second session would.
fn external_insert(l: &Ledger, user: &str, kind: &str, category: &str, amount: &str) {
    l.conn()
        .unwrap()
        .execute(
            "INSERT INTO transactions(user_id, kind, category, amount) VALUES (?1, ?2, ?3, ?4)",
            params![user, kind, category, amount],
        )
        .unwrap();
}

fn warm(l: &Ledger, user: &str) {
    l.transactions(user).unwrap();
    l.summary(user).unwrap();
    l.category_summary(user).unwrap();
    l.daily_summary(user).unwrap();
}

#[test]
fn reads_are_cached_until_a_write() {
    let l = ledger(Duration::from_secs(3600));
    l.add("u", NewTransaction::new(Kind::Income, "Salary", Decimal::new(100, 0)))
        .unwrap();
    warm(&l, "u");

    external_insert(&l, "u", "Expense", "Food", "40");
    assert_eq!(l.transactions("u").unwrap().len(), 1);
    assert_eq!(l.summary("u").unwrap().expense, Decimal::ZERO);

    // A write through the ledger makes both changes visible at once.
    l.add("u", NewTransaction::new(Kind::Expense, "Fuel", Decimal::new(10, 0)))
        .unwrap();
    assert_eq!(l.transactions("u").unwrap().len(), 3);
    assert_eq!(l.summary("u").unwrap().expense, Decimal::new(50, 0));
    assert_eq!(l.category_summary("u").unwrap().len(), 3);
    let daily_expense: Decimal = l
        .daily_summary("u")
        .unwrap()
        .iter()
        .filter(|d| d.kind == Kind::Expense)
        .map(|d| d.total)
        .sum();
    assert_eq!(daily_expense, Decimal::new(50, 0));
}

#[test]
fn every_mutation_evicts_all_accessors() {
    let l = ledger(Duration::from_secs(3600));
    let id = l
        .add("u", NewTransaction::new(Kind::Expense, "Food", Decimal::new(5, 0)))
        .unwrap();

    warm(&l, "u");
    for accessor in Accessor::ALL {
        assert!(l.cache().contains(accessor, "u"));
    }
    l.delete(id, "u").unwrap();
    for accessor in Accessor::ALL {
        assert!(!l.cache().contains(accessor, "u"));
    }

    warm(&l, "u");
    l.clear_all("u").unwrap();
    for accessor in Accessor::ALL {
        assert!(!l.cache().contains(accessor, "u"));
    }
}

#[test]
fn failed_mutations_keep_the_cache() {
    let l = ledger(Duration::from_secs(3600));
    warm(&l, "u");
    assert!(l.delete(999, "u").is_err());
    assert!(
        l.add("u", NewTransaction::new(Kind::Expense, "Food", Decimal::ZERO))
            .is_err()
    );
    assert!(l.cache().contains(Accessor::Summary, "u"));
}

#[test]
fn writes_for_one_user_keep_other_users_cached() {
    let l = ledger(Duration::from_secs(3600));
    warm(&l, "alice");
    warm(&l, "bob");
    l.add("alice", NewTransaction::new(Kind::Income, "Salary", Decimal::ONE))
        .unwrap();
    assert!(!l.cache().contains(Accessor::Summary, "alice"));
    assert!(l.cache().contains(Accessor::Summary, "bob"));
}

#[test]
fn expired_entries_pick_up_external_changes() {
    let l = ledger(Duration::ZERO);
    warm(&l, "u");
    external_insert(&l, "u", "Income", "Salary", "75");
    assert_eq!(l.summary("u").unwrap().income, Decimal::new(75, 0));
    assert_eq!(l.transactions("u").unwrap().len(), 1);
}

#[test]
fn entries_expire_after_their_ttl() {
    let l = ledger(Duration::from_secs(1));
    warm(&l, "u");
    external_insert(&l, "u", "Expense", "Food", "40");
    assert_eq!(l.summary("u").unwrap().expense, Decimal::ZERO);
    assert!(l.transactions("u").unwrap().is_empty());

    std::thread::sleep(Duration::from_millis(1100));
    assert_eq!(l.summary("u").unwrap().expense, Decimal::new(40, 0));
    assert_eq!(l.transactions("u").unwrap().len(), 1);
    assert_eq!(l.category_summary("u").unwrap().len(), 1);
    assert_eq!(l.daily_summary("u").unwrap().len(), 1);
}

#[test]
fn refresh_forces_recompute() {
    let l = ledger(Duration::from_secs(3600));
    warm(&l, "u");
    external_insert(&l, "u", "Income", "Salary", "75");
    assert_eq!(l.summary("u").unwrap().income, Decimal::ZERO);
    l.refresh();
    assert_eq!(l.summary("u").unwrap().income, Decimal::new(75, 0));
}
