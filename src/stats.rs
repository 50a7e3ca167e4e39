// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dashboard figures, recomputed from stored transactions on every call.

use crate::errors::{Result, TabunganError};
use crate::ledger::{TxFilter, list_transactions};
use crate::models::{Category, CategoryKind, FamilyMember, Transaction, TxType};
use crate::registry::{categories, members};
use crate::settings;
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

/// Inclusive date range; an open end is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Period {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Period {
    pub fn all() -> Self {
        Period::default()
    }

    pub fn between(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(TabunganError::validation(format!(
                    "period starts after it ends ({} > {})",
                    f, t
                )));
            }
        }
        Ok(Period { from, to })
    }

    /// First to last day of a `YYYY-MM` month.
    pub fn month(month: &str) -> Result<Self> {
        let bad = || TabunganError::validation(format!("invalid month '{}', expected YYYY-MM", month));
        let first = NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
            .map_err(|_| bad())?;
        let next = if first.month() == 12 {
            NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
        }
        .ok_or_else(bad)?;
        Ok(Period {
            from: Some(first),
            to: next.pred_opt(),
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|f| date >= f) && self.to.is_none_or(|t| date <= t)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub savings: Decimal,
    /// income - expenses - savings
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category_id: i64,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub amount: Decimal,
    /// Savings target or expense budget limit.
    pub target: Option<Decimal>,
}

impl CategoryTotal {
    /// Share of the target reached, in percent.
    pub fn progress(&self) -> Option<Decimal> {
        self.target
            .filter(|t| !t.is_zero())
            .map(|t| (self.amount * Decimal::ONE_HUNDRED / t).round_dp(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberTotal {
    pub member_id: i64,
    pub name: String,
    pub role: String,
    pub income: Decimal,
    pub savings: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub period: Period,
    pub totals: Totals,
    pub savings_by_category: Vec<CategoryTotal>,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub by_member: Vec<MemberTotal>,
    pub recent: Vec<Transaction>,
    pub count: usize,
}

impl Statistics {
    /// Drops categories with nothing recorded in the period.
    pub fn non_zero(mut self) -> Self {
        self.savings_by_category.retain(|c| !c.amount.is_zero());
        self.expenses_by_category.retain(|c| !c.amount.is_zero());
        self
    }
}

fn sum_where(txs: &[Transaction], pred: impl Fn(&Transaction) -> bool) -> Decimal {
    txs.iter().filter(|t| pred(t)).map(|t| t.amount).sum()
}

fn category_totals(txs: &[Transaction], categories: &[Category], kind: CategoryKind) -> Vec<CategoryTotal> {
    categories
        .iter()
        .filter(|c| c.kind == kind)
        .map(|c| {
            let amount = match kind {
                CategoryKind::Savings => sum_where(txs, |t| {
                    t.tx_type == TxType::Savings && t.savings_category_id == Some(c.id)
                }),
                CategoryKind::Expense => sum_where(txs, |t| {
                    t.tx_type == TxType::Expense && t.expense_category_id == Some(c.id)
                }),
            };
            CategoryTotal {
                category_id: c.id,
                name: c.name.clone(),
                color: c.color.clone(),
                icon: c.icon.clone(),
                amount,
                target: c.target,
            }
        })
        .collect()
}

/// Aggregates `txs` (already restricted to `period`). Every category and
/// member appears, with zero when nothing matched. Transfers only count
/// toward `count`.
pub fn aggregate(
    period: Period,
    txs: &[Transaction],
    categories: &[Category],
    members: &[FamilyMember],
    recent_limit: usize,
) -> Statistics {
    let income = sum_where(txs, |t| t.tx_type == TxType::Income);
    let expenses = sum_where(txs, |t| t.tx_type == TxType::Expense);
    let savings = sum_where(txs, |t| t.tx_type == TxType::Savings);

    let by_member = members
        .iter()
        .map(|m| MemberTotal {
            member_id: m.id,
            name: m.name.clone(),
            role: m.role.clone(),
            income: sum_where(txs, |t| {
                t.tx_type == TxType::Income && t.family_member_id == Some(m.id)
            }),
            savings: sum_where(txs, |t| {
                t.tx_type == TxType::Savings && t.family_member_id == Some(m.id)
            }),
        })
        .collect();

    let mut recent = txs.to_vec();
    recent.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    recent.truncate(recent_limit);

    Statistics {
        period,
        totals: Totals {
            income,
            expenses,
            savings,
            net: income - expenses - savings,
        },
        savings_by_category: category_totals(txs, categories, CategoryKind::Savings),
        expenses_by_category: category_totals(txs, categories, CategoryKind::Expense),
        by_member,
        recent,
        count: txs.len(),
    }
}

pub fn statistics(conn: &Connection, period: Period) -> Result<Statistics> {
    let txs = list_transactions(
        conn,
        &TxFilter {
            from: period.from,
            to: period.to,
            ..Default::default()
        },
    )?;
    let cats = categories::list(conn, None)?;
    let members = members::list(conn)?;
    let recent_limit = settings::recent_limit(conn)?;
    Ok(aggregate(period, &txs, &cats, &members, recent_limit))
}

/// Like [`statistics`] but logs failures and returns empty figures.
pub fn statistics_or_empty(conn: &Connection, period: Period) -> Statistics {
    statistics(conn, period).unwrap_or_else(|err| {
        tracing::error!(error = %err, "computing statistics failed");
        Statistics {
            period,
            ..Default::default()
        }
    })
}

/// Money moved in and out of one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub total_in: Decimal,
    pub total_out: Decimal,
    pub count: usize,
}

pub fn account_activity(txs: &[Transaction], account_id: i64) -> Activity {
    let mut a = Activity::default();
    for t in txs.iter().filter(|t| t.touches(account_id)) {
        a.count += 1;
        let incoming = t.to_account_id == Some(account_id)
            && matches!(t.tx_type, TxType::Income | TxType::Transfer);
        let outgoing = t.from_account_id == Some(account_id)
            && matches!(t.tx_type, TxType::Expense | TxType::Savings | TxType::Transfer);
        if incoming {
            a.total_in += t.amount;
        }
        if outgoing {
            a.total_out += t.amount;
        }
    }
    a
}
