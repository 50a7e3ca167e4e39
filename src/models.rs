// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::TabunganError;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use rusqlite::types::Type;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Income,
    Expense,
    Savings,
    Transfer,
}

impl TxType {
    pub const ALL: [TxType; 4] = [
        TxType::Income,
        TxType::Expense,
        TxType::Savings,
        TxType::Transfer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TxType::Income => "income",
            TxType::Expense => "expense",
            TxType::Savings => "savings",
            TxType::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = TabunganError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TxType::Income),
            "expense" => Ok(TxType::Expense),
            "savings" => Ok(TxType::Savings),
            "transfer" => Ok(TxType::Transfer),
            other => Err(TabunganError::validation(format!(
                "unknown transaction type '{}' (income|expense|savings|transfer)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Savings,
    Expense,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Savings => "savings",
            CategoryKind::Expense => "expense",
        }
    }

    pub fn entity(self) -> &'static str {
        match self {
            CategoryKind::Savings => "savings category",
            CategoryKind::Expense => "expense category",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryKind {
    type Err = TabunganError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "savings" => Ok(CategoryKind::Savings),
            "expense" => Ok(CategoryKind::Expense),
            other => Err(TabunganError::validation(format!(
                "unknown category kind '{}' (savings|expense)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageAccount {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub account_number: Option<String>,
    pub balance: Decimal,
    pub is_gold: bool,
    pub gold_weight: Option<Decimal>, // grams
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StorageAccount {
    pub const COLUMNS: &'static str = "id, name, description, icon, color, account_number, balance, is_gold, gold_weight, created_at, updated_at";

    pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(StorageAccount {
            id: r.get(0)?,
            name: r.get(1)?,
            description: r.get(2)?,
            icon: r.get(3)?,
            color: r.get(4)?,
            account_number: r.get(5)?,
            balance: decimal_at(r, 6)?,
            is_gold: r.get(7)?,
            gold_weight: opt_decimal_at(r, 8)?,
            created_at: r.get(9)?,
            updated_at: r.get(10)?,
        })
    }

    /// Money value of the account. Gold accounts are valued by weight at
    /// `gold_price` per gram and never by `balance`.
    pub fn valuation(&self, gold_price: Decimal) -> Decimal {
        if self.is_gold {
            self.gold_weight.unwrap_or(Decimal::ZERO) * gold_price
        } else {
            self.balance
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub kind: CategoryKind,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    /// Savings target, or budget limit for expense categories.
    pub target: Option<Decimal>,
    pub storage_account_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub const COLUMNS: &'static str = "id, kind, name, description, icon, color, target, storage_account_id, created_at, updated_at";

    pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        let kind: String = r.get(1)?;
        Ok(Category {
            id: r.get(0)?,
            kind: kind.parse().map_err(|e| conversion_error(1, e))?,
            name: r.get(2)?,
            description: r.get(3)?,
            icon: r.get(4)?,
            color: r.get(5)?,
            target: opt_decimal_at(r, 6)?,
            storage_account_id: r.get(7)?,
            created_at: r.get(8)?,
            updated_at: r.get(9)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FamilyMember {
    pub const COLUMNS: &'static str = "id, name, role, avatar, created_at, updated_at";

    pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(FamilyMember {
            id: r.get(0)?,
            name: r.get(1)?,
            role: r.get(2)?,
            avatar: r.get(3)?,
            created_at: r.get(4)?,
            updated_at: r.get(5)?,
        })
    }
}

/// A persisted transaction row. Columns that carry no meaning for the
/// row's type are `None`; rows written by other tools may also lack the
/// legs their type requires, which reconciliation treats as "no effect".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub family_member_id: Option<i64>,
    pub savings_category_id: Option<i64>,
    pub expense_category_id: Option<i64>,
    pub from_account_id: Option<i64>,
    pub to_account_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub const COLUMNS: &'static str = "id, type, amount, description, date, family_member_id, savings_category_id, expense_category_id, from_account_id, to_account_id, created_at, updated_at";

    pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        let tx_type: String = r.get(1)?;
        Ok(Transaction {
            id: r.get(0)?,
            tx_type: tx_type.parse().map_err(|e| conversion_error(1, e))?,
            amount: decimal_at(r, 2)?,
            description: r.get(3)?,
            date: r.get(4)?,
            family_member_id: r.get(5)?,
            savings_category_id: r.get(6)?,
            expense_category_id: r.get(7)?,
            from_account_id: r.get(8)?,
            to_account_id: r.get(9)?,
            created_at: r.get(10)?,
            updated_at: r.get(11)?,
        })
    }

    /// True when `account_id` is either leg of this transaction.
    pub fn touches(&self, account_id: i64) -> bool {
        self.from_account_id == Some(account_id) || self.to_account_id == Some(account_id)
    }
}

fn conversion_error(idx: usize, err: TabunganError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn decimal_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.trim().parse::<Decimal>().map_err(|e| {
        conversion_error(
            idx,
            TabunganError::InvalidData(format!("invalid decimal '{}': {}", s, e)),
        )
    })
}

pub(crate) fn opt_decimal_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let s: Option<String> = r.get(idx)?;
    match s {
        Some(s) if !s.trim().is_empty() => s.trim().parse::<Decimal>().map(Some).map_err(|e| {
            conversion_error(
                idx,
                TabunganError::InvalidData(format!("invalid decimal '{}': {}", s, e)),
            )
        }),
        _ => Ok(None),
    }
}
