// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Views derived in memory from a user's (cached) transaction list.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::models::{Insight, InsightLevel, Kind, MonthlyTotal, Stats, Summary, Transaction};

const SPENDING_CHANGE_PCT: i64 = 20;
const TOP_CATEGORY_SHARE_PCT: i64 = 40;
const HIGH_SAVINGS_PCT: i64 = 20;
const LOW_SAVINGS_PCT: i64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    Last7Days,
    Last30Days,
    ThisMonth,
}

impl DateRange {
    /// Earliest `created_at` kept by this range, evaluated at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateRange::All => None,
            DateRange::Last7Days => Some(now - Duration::days(7)),
            DateRange::Last30Days => Some(now - Duration::days(30)),
            DateRange::ThisMonth => Some(month_start(now.date_naive())),
        }
    }
}

impl FromStr for DateRange {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(DateRange::All),
            "7d" => Ok(DateRange::Last7Days),
            "30d" => Ok(DateRange::Last30Days),
            "month" => Ok(DateRange::ThisMonth),
            other => Err(LedgerError::Validation(format!(
                "unknown range '{}', expected all|7d|30d|month",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub kind: Option<Kind>,
    pub category: Option<String>,
    pub range: DateRange,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    /// Keeps the input order (newest first) and truncates to `limit`.
    pub fn apply(&self, rows: &[Transaction], now: DateTime<Utc>) -> Vec<Transaction> {
        let cutoff = self.range.cutoff(now);
        let matched = rows
            .iter()
            .filter(|t| self.kind.is_none_or(|k| t.kind == k))
            .filter(|t| self.category.as_deref().is_none_or(|c| t.category == c))
            .filter(|t| cutoff.is_none_or(|c| t.created_at >= c))
            .cloned();
        match self.limit {
            Some(n) => matched.take(n).collect(),
            None => matched.collect(),
        }
    }
}

/// Distinct categories present in `rows`, sorted.
pub fn categories_in(rows: &[Transaction]) -> Vec<String> {
    let mut out: Vec<String> = rows.iter().map(|t| t.category.clone()).collect();
    out.sort();
    out.dedup();
    out
}

/// Totals per `(YYYY-MM, kind)`, oldest month first.
pub fn monthly_trend(rows: &[Transaction]) -> Vec<MonthlyTotal> {
    let mut map: BTreeMap<(String, Kind), Decimal> = BTreeMap::new();
    for t in rows {
        let month = t.created_at.format("%Y-%m").to_string();
        *map.entry((month, t.kind)).or_insert(Decimal::ZERO) += t.amount;
    }
    map.into_iter()
        .map(|((month, kind), total)| MonthlyTotal { month, kind, total })
        .collect()
}

pub fn stats(rows: &[Transaction]) -> Stats {
    let count = rows.len();
    let average = if count == 0 {
        None
    } else {
        let sum: Decimal = rows.iter().map(|t| t.amount).sum();
        Some(sum / Decimal::from(count))
    };
    let mut largest: Option<&Transaction> = None;
    for t in rows {
        if largest.is_none_or(|l| t.amount > l.amount) {
            largest = Some(t);
        }
    }
    Stats {
        count,
        average,
        largest: largest.cloned(),
    }
}

/// Rule-based observations about spending, evaluated at `now`.
pub fn insights(rows: &[Transaction], summary: &Summary, now: DateTime<Utc>) -> Vec<Insight> {
    let mut out = Vec::new();
    if rows.is_empty() {
        return out;
    }

    let this_month = month_start(now.date_naive());
    let last_month = month_start(this_month.date_naive() - Duration::days(1));
    let expenses = || rows.iter().filter(|t| t.kind == Kind::Expense);
    let current: Decimal = expenses()
        .filter(|t| t.created_at >= this_month)
        .map(|t| t.amount)
        .sum();
    let previous: Decimal = expenses()
        .filter(|t| t.created_at >= last_month && t.created_at < this_month)
        .map(|t| t.amount)
        .sum();
    if previous > Decimal::ZERO {
        let change = (current - previous) / previous * Decimal::ONE_HUNDRED;
        if change > Decimal::from(SPENDING_CHANGE_PCT) {
            out.push(Insight {
                level: InsightLevel::Alert,
                title: "High Spending Alert".into(),
                message: format!(
                    "Your spending increased by {:.1}% this month compared to last month.",
                    change
                ),
            });
        } else if change < -Decimal::from(SPENDING_CHANGE_PCT) {
            out.push(Insight {
                level: InsightLevel::Success,
                title: "Great Savings".into(),
                message: format!(
                    "You reduced spending by {:.1}% this month. Keep it up!",
                    change.abs()
                ),
            });
        }
    }

    let mut by_category: HashMap<&str, Decimal> = HashMap::new();
    for t in expenses() {
        *by_category.entry(t.category.as_str()).or_insert(Decimal::ZERO) += t.amount;
    }
    let total_expense: Decimal = by_category.values().copied().sum();
    let top = by_category
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)));
    if let Some((category, amount)) = top {
        if total_expense > Decimal::ZERO {
            let share = amount / total_expense * Decimal::ONE_HUNDRED;
            if share > Decimal::from(TOP_CATEGORY_SHARE_PCT) {
                out.push(Insight {
                    level: InsightLevel::Info,
                    title: format!("Top Spending: {}", category),
                    message: format!(
                        "{:.1}% of your expenses go to {}. Consider budgeting for this category.",
                        share, category
                    ),
                });
            }
        }
    }

    if let Some(rate) = summary.savings_rate() {
        if rate > Decimal::from(HIGH_SAVINGS_PCT) {
            out.push(Insight {
                level: InsightLevel::Success,
                title: "Excellent Savings Rate".into(),
                message: format!(
                    "You're saving {:.1}% of your income. Financial experts recommend 20%+.",
                    rate
                ),
            });
        } else if rate < Decimal::from(LOW_SAVINGS_PCT) {
            out.push(Insight {
                level: InsightLevel::Alert,
                title: "Low Savings Rate".into(),
                message: format!(
                    "Your savings rate is {:.1}%. Try to aim for at least 20% of your income.",
                    rate
                ),
            });
        }
    }
    out
}

fn month_start(day: NaiveDate) -> DateTime<Utc> {
    day.with_day(1)
        .unwrap_or(day)
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx(id: i64, kind: Kind, category: &str, amount: i64, at: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            user_id: "u".into(),
            kind,
            category: category.into(),
            amount: Decimal::new(amount, 0),
            description: None,
            created_at: at,
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn filter_combines_kind_category_and_range() {
        let now = at(2025, 3, 20);
        let rows = vec![
            tx(4, Kind::Expense, "Food", 10, at(2025, 3, 19)),
            tx(3, Kind::Income, "Salary", 100, at(2025, 3, 18)),
            tx(2, Kind::Expense, "Food", 20, at(2025, 3, 1)),
            tx(1, Kind::Expense, "Food", 30, at(2025, 2, 1)),
        ];
        let f = TransactionFilter {
            kind: Some(Kind::Expense),
            category: Some("Food".into()),
            range: DateRange::ThisMonth,
            limit: None,
        };
        let ids: Vec<i64> = f.apply(&rows, now).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 2]);

        let week = TransactionFilter {
            range: DateRange::Last7Days,
            limit: Some(1),
            ..Default::default()
        };
        let ids: Vec<i64> = week.apply(&rows, now).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn range_parses_short_names() {
        assert_eq!("30d".parse::<DateRange>().unwrap(), DateRange::Last30Days);
        assert_eq!("Month".parse::<DateRange>().unwrap(), DateRange::ThisMonth);
        assert!("year".parse::<DateRange>().is_err());
    }

    #[test]
    fn monthly_trend_is_oldest_first() {
        let rows = vec![
            tx(3, Kind::Expense, "Food", 5, at(2025, 2, 3)),
            tx(2, Kind::Expense, "Rent", 7, at(2025, 2, 1)),
            tx(1, Kind::Income, "Salary", 50, at(2025, 1, 31)),
        ];
        let trend = monthly_trend(&rows);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].month, "2025-01");
        assert_eq!(trend[0].kind, Kind::Income);
        assert_eq!(trend[1].month, "2025-02");
        assert_eq!(trend[1].total, Decimal::new(12, 0));
    }

    #[test]
    fn stats_report_mean_and_largest() {
        assert_eq!(stats(&[]).average, None);
        let rows = vec![
            tx(2, Kind::Expense, "Food", 10, at(2025, 1, 2)),
            tx(1, Kind::Income, "Salary", 50, at(2025, 1, 1)),
        ];
        let s = stats(&rows);
        assert_eq!(s.count, 2);
        assert_eq!(s.average, Some(Decimal::new(30, 0)));
        assert_eq!(s.largest.map(|t| t.id), Some(1));
    }

    #[test]
    fn insights_flag_spending_jump_and_low_savings() {
        let now = at(2025, 3, 15);
        let rows = vec![
            tx(3, Kind::Expense, "Food", 300, at(2025, 3, 10)),
            tx(2, Kind::Expense, "Rent", 100, at(2025, 2, 10)),
            tx(1, Kind::Income, "Salary", 420, at(2025, 2, 1)),
        ];
        let summary = Summary {
            income: Decimal::new(420, 0),
            expense: Decimal::new(400, 0),
        };
        let found = insights(&rows, &summary, now);
        let titles: Vec<&str> = found.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["High Spending Alert", "Top Spending: Food", "Low Savings Rate"]
        );
        assert!(found[0].message.contains("200.0%"));
        assert_eq!(found[2].level, InsightLevel::Alert);
    }

    #[test]
    fn insights_praise_savings() {
        let now = at(2025, 3, 15);
        let rows = vec![
            tx(4, Kind::Expense, "Food", 20, at(2025, 3, 10)),
            tx(3, Kind::Expense, "Rent", 20, at(2025, 3, 9)),
            tx(2, Kind::Expense, "Fuel", 20, at(2025, 3, 8)),
            tx(1, Kind::Expense, "Food", 100, at(2025, 2, 10)),
        ];
        let summary = Summary {
            income: Decimal::new(1000, 0),
            expense: Decimal::new(160, 0),
        };
        let found = insights(&rows, &summary, now);
        let titles: Vec<&str> = found.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Great Savings", "Top Spending: Food", "Excellent Savings Rate"]
        );
    }

    #[test]
    fn no_rows_no_insights() {
        assert!(insights(&[], &Summary::default(), at(2025, 1, 1)).is_empty());
    }
}
