// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetbuddy::{
    Ledger, LedgerError, db,
    models::{Kind, NewTransaction, Summary},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::time::Duration;

fn ledger() -> Ledger {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    Ledger::new(conn, Duration::from_secs(3600))
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn add(l: &Ledger, user: &str, kind: Kind, category: &str, amount: &str) -> i64 {
    l.add(user, NewTransaction::new(kind, category, dec(amount)))
        .unwrap()
}

#[test]
fn salary_and_food_scenario() {
    let l = ledger();
    add(&l, "alice", Kind::Income, "Salary", "50000");
    add(&l, "alice", Kind::Expense, "Food", "1200");
    add(&l, "alice", Kind::Expense, "Food", "300");
    add(&l, "alice", Kind::Expense, "Fuel", "900");

    let s = l.summary("alice").unwrap();
    assert_eq!(s.income, dec("50000"));
    assert_eq!(s.expense, dec("2400"));

    let cats = l.category_summary("alice").unwrap();
    let expenses: Vec<_> = cats.iter().filter(|c| c.kind == Kind::Expense).collect();
    assert_eq!(expenses[0].category, "Food");
    assert_eq!(expenses[0].total, dec("1500"));
    assert_eq!(expenses[1].category, "Fuel");
    assert_eq!(
        cats.iter()
            .filter(|c| c.category == "Food" && c.kind == Kind::Expense)
            .count(),
        1
    );
}

#[test]
fn balance_matches_manual_sum() {
    let l = ledger();
    let inserts = [
        (Kind::Income, "Salary", "1000.50"),
        (Kind::Expense, "Rent", "400.25"),
        (Kind::Expense, "Food", "12.10"),
        (Kind::Income, "Bonus", "99.99"),
        (Kind::Expense, "Food", "0.01"),
    ];
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    for (kind, cat, amt) in inserts {
        add(&l, "u", kind, cat, amt);
        match kind {
            Kind::Income => income += dec(amt),
            Kind::Expense => expense += dec(amt),
        }
        let s = l.summary("u").unwrap();
        assert_eq!(s.balance(), income - expense);
    }
}

#[test]
fn categories_are_sorted_descending() {
    let l = ledger();
    add(&l, "u", Kind::Expense, "Rent", "10");
    add(&l, "u", Kind::Income, "Salary", "70");
    add(&l, "u", Kind::Expense, "Food", "30");
    add(&l, "u", Kind::Expense, "Rent", "25");
    let cats = l.category_summary("u").unwrap();
    assert_eq!(cats.len(), 3);
    for pair in cats.windows(2) {
        assert!(pair[0].total >= pair[1].total);
    }
    assert_eq!(cats[0].category, "Salary");
    assert_eq!(cats[1].category, "Rent");
    assert_eq!(cats[1].total, dec("35"));
}

#[test]
fn insert_then_delete_leaves_nothing() {
    let l = ledger();
    let id = add(&l, "u", Kind::Expense, "Food", "42");
    assert_eq!(l.transactions("u").unwrap().len(), 1);
    l.delete(id, "u").unwrap();
    assert!(l.transactions("u").unwrap().is_empty());
    assert_eq!(l.summary("u").unwrap(), Summary::default());
    assert!(l.category_summary("u").unwrap().is_empty());
    assert!(l.daily_summary("u").unwrap().is_empty());
}

#[test]
fn clear_all_empties_ledger_and_is_idempotent() {
    let l = ledger();
    add(&l, "u", Kind::Income, "Salary", "10");
    add(&l, "u", Kind::Expense, "Food", "5");
    add(&l, "other", Kind::Expense, "Food", "5");
    assert_eq!(l.transactions("u").unwrap().len(), 2);
    assert_eq!(l.clear_all("u").unwrap(), 2);
    assert!(l.transactions("u").unwrap().is_empty());
    assert_eq!(l.clear_all("u").unwrap(), 0);
    assert_eq!(l.transactions("other").unwrap().len(), 1);
}

#[test]
fn non_positive_amounts_are_rejected() {
    let l = ledger();
    for amt in ["0", "-5", "0.001"] {
        let err = l
            .add("u", NewTransaction::new(Kind::Expense, "Food", dec(amt)))
            .unwrap_err();
        assert!(err.is_validation(), "{} should fail validation", amt);
    }
    let err = l
        .add("u", NewTransaction::new(Kind::Expense, "   ", dec("5")))
        .unwrap_err();
    assert!(err.is_validation());
    let n: i64 = l
        .conn()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}

#[test]
fn foreign_delete_is_not_found() {
    let l = ledger();
    let id = add(&l, "alice", Kind::Expense, "Food", "8");
    let err = l.delete(id, "bob").unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { id: missing } if missing == id));
    assert_eq!(l.transactions("alice").unwrap().len(), 1);

    l.delete(id, "alice").unwrap();
    assert!(l.delete(id, "alice").unwrap_err().is_not_found());
}

#[test]
fn list_is_newest_first_and_keeps_fields() {
    let l = ledger();
    let first = add(&l, "u", Kind::Income, "Salary", "100");
    let second = l
        .add(
            "u",
            NewTransaction::new(Kind::Expense, " Food ", dec("12.345"))
                .with_description("lunch"),
        )
        .unwrap();
    let rows = l.transactions("u").unwrap();
    assert_eq!(rows.iter().map(|t| t.id).collect::<Vec<_>>(), vec![second, first]);
    assert_eq!(rows[0].category, "Food");
    assert_eq!(rows[0].amount, dec("12.35"));
    assert_eq!(rows[0].description.as_deref(), Some("lunch"));
    assert_eq!(rows[0].user_id, "u");
    assert_eq!(rows[1].description, None);
}

#[test]
fn users_are_isolated() {
    let l = ledger();
    add(&l, "alice", Kind::Income, "Salary", "100");
    add(&l, "bob", Kind::Expense, "Food", "7");
    assert_eq!(l.summary("alice").unwrap().expense, Decimal::ZERO);
    assert_eq!(l.summary("bob").unwrap().income, Decimal::ZERO);
    assert_eq!(l.transactions("bob").unwrap().len(), 1);
}

#[test]
fn empty_ledger_reads_are_defaults() {
    let l = ledger();
    assert!(l.transactions("nobody").unwrap().is_empty());
    assert_eq!(l.summary("nobody").unwrap(), Summary::default());
    assert!(l.category_summary("nobody").unwrap().is_empty());
}
