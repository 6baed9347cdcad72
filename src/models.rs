// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

pub const INCOME_CATEGORIES: &[&str] = &[
    "Salary",
    "Freelance",
    "Business",
    "Investment",
    "Rental",
    "Bonus",
    "Commission",
    "Dividend",
    "Interest",
    "Other",
];

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Transportation",
    "Utilities",
    "Healthcare",
    "Education",
    "Entertainment",
    "Shopping",
    "Rent",
    "Insurance",
    "Groceries",
    "Fuel",
    "Bills",
    "Travel",
    "Subscription",
    "Other",
];

/// Largest amount a `decimal(10,2)` column can hold.
pub fn max_amount() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    Income,
    Expense,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Income => "Income",
            Kind::Expense => "Expense",
        }
    }

    pub fn suggested_categories(&self) -> &'static [&'static str] {
        match self {
            Kind::Income => INCOME_CATEGORIES,
            Kind::Expense => EXPENSE_CATEGORIES,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Kind::Income),
            "expense" => Ok(Kind::Expense),
            "" => Err(LedgerError::Validation("kind must not be empty".into())),
            other => Err(LedgerError::Validation(format!(
                "unknown kind '{}', expected income|expense",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub kind: Kind,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for a ledger insert. Checked by [`NewTransaction::validate`]
/// before it reaches the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: Kind,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
}

impl NewTransaction {
    pub fn new(kind: Kind, category: impl Into<String>, amount: Decimal) -> Self {
        Self {
            kind,
            category: category.into(),
            amount,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Trims text fields, rounds the amount to cents and rejects anything the
    /// `transactions` table could not hold.
    pub fn validate(self) -> Result<ValidTransaction, LedgerError> {
        let category = self.category.trim().to_string();
        if category.is_empty() {
            return Err(LedgerError::Validation("category must not be empty".into()));
        }
        let amount = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        if amount > max_amount() {
            return Err(LedgerError::Validation(format!(
                "amount {} exceeds the maximum of {}",
                self.amount,
                max_amount()
            )));
        }
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok(ValidTransaction(Self {
            kind: self.kind,
            category,
            amount,
            description,
        }))
    }
}

/// A [`NewTransaction`] that passed validation. Only
/// [`NewTransaction::validate`] builds one, so the store takes it as is.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTransaction(NewTransaction);

impl Deref for ValidTransaction {
    type Target = NewTransaction;

    fn deref(&self) -> &NewTransaction {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub income: Decimal,
    pub expense: Decimal,
}

impl Summary {
    pub fn balance(&self) -> Decimal {
        self.income - self.expense
    }

    /// Share of income not spent, in percent. `None` without income.
    pub fn savings_rate(&self) -> Option<Decimal> {
        if self.income <= Decimal::ZERO {
            return None;
        }
        Some(self.balance() / self.income * Decimal::ONE_HUNDRED)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub kind: Kind,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub kind: Kind,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: String, // YYYY-MM
    pub kind: Kind,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub count: usize,
    pub average: Option<Decimal>,
    pub largest: Option<Transaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightLevel {
    Alert,
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub level: InsightLevel,
    pub title: String,
    pub message: String,
}
