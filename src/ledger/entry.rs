// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Validated shape of a transaction before it is written.
//!
//! Callers describe a transaction with the flat [`NewTransaction`] (the same
//! optional fields the stored row has) and [`Draft::validate`] turns it into
//! an [`Entry`], which can only hold the legs its type allows.

use crate::errors::{Result, TabunganError};
use crate::models::{Transaction, TxType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Type-specific legs and category of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    Income { to: i64 },
    Expense { from: i64, category: Option<i64> },
    Savings { from: i64, category: Option<i64> },
    Transfer { from: i64, to: i64 },
}

impl Entry {
    pub fn tx_type(&self) -> TxType {
        match self {
            Entry::Income { .. } => TxType::Income,
            Entry::Expense { .. } => TxType::Expense,
            Entry::Savings { .. } => TxType::Savings,
            Entry::Transfer { .. } => TxType::Transfer,
        }
    }

    pub fn from_account(&self) -> Option<i64> {
        match *self {
            Entry::Expense { from, .. } | Entry::Savings { from, .. } | Entry::Transfer { from, .. } => {
                Some(from)
            }
            Entry::Income { .. } => None,
        }
    }

    pub fn to_account(&self) -> Option<i64> {
        match *self {
            Entry::Income { to } | Entry::Transfer { to, .. } => Some(to),
            _ => None,
        }
    }

    pub fn savings_category(&self) -> Option<i64> {
        match *self {
            Entry::Savings { category, .. } => category,
            _ => None,
        }
    }

    pub fn expense_category(&self) -> Option<i64> {
        match *self {
            Entry::Expense { category, .. } => category,
            _ => None,
        }
    }

    /// Accounts this entry moves money through, source first.
    pub fn accounts(&self) -> Vec<i64> {
        self.from_account().into_iter().chain(self.to_account()).collect()
    }

    /// Builds the entry for `tx_type`, ignoring fields the type does not use.
    pub fn from_parts(
        tx_type: TxType,
        from: Option<i64>,
        to: Option<i64>,
        savings_category: Option<i64>,
        expense_category: Option<i64>,
    ) -> Result<Entry> {
        let need = |leg: Option<i64>, what: &str| {
            leg.ok_or_else(|| {
                TabunganError::validation(format!("{} transaction requires {}", tx_type, what))
            })
        };
        match tx_type {
            TxType::Income => Ok(Entry::Income {
                to: need(to, "a destination account")?,
            }),
            TxType::Expense => Ok(Entry::Expense {
                from: need(from, "a source account")?,
                category: expense_category,
            }),
            TxType::Savings => Ok(Entry::Savings {
                from: need(from, "a source account")?,
                category: savings_category,
            }),
            TxType::Transfer => {
                let from = need(from, "a source account")?;
                let to = need(to, "a destination account")?;
                if from == to {
                    return Err(TabunganError::validation(
                        "transfer source and destination must differ",
                    ));
                }
                Ok(Entry::Transfer { from, to })
            }
        }
    }
}

/// Fields accepted when creating a transaction; also the shape an update
/// merges into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTransaction {
    pub tx_type: Option<TxType>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    /// Defaults to today when absent.
    pub date: Option<NaiveDate>,
    pub family_member_id: Option<i64>,
    pub savings_category_id: Option<i64>,
    pub expense_category_id: Option<i64>,
    pub from_account_id: Option<i64>,
    pub to_account_id: Option<i64>,
}

impl NewTransaction {
    pub fn new(tx_type: TxType, amount: Decimal) -> Self {
        NewTransaction {
            tx_type: Some(tx_type),
            amount: Some(amount),
            ..Default::default()
        }
    }

    pub fn income(amount: Decimal, to: i64) -> Self {
        NewTransaction {
            to_account_id: Some(to),
            ..Self::new(TxType::Income, amount)
        }
    }

    pub fn expense(amount: Decimal, from: i64) -> Self {
        NewTransaction {
            from_account_id: Some(from),
            ..Self::new(TxType::Expense, amount)
        }
    }

    pub fn savings(amount: Decimal, from: i64) -> Self {
        NewTransaction {
            from_account_id: Some(from),
            ..Self::new(TxType::Savings, amount)
        }
    }

    pub fn transfer(amount: Decimal, from: i64, to: i64) -> Self {
        NewTransaction {
            from_account_id: Some(from),
            to_account_id: Some(to),
            ..Self::new(TxType::Transfer, amount)
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Overlays `self` (the supplied fields of an update) on an existing
    /// row. Fields left `None` keep their stored value.
    pub fn merged_over(&self, old: &Transaction) -> NewTransaction {
        NewTransaction {
            tx_type: self.tx_type.or(Some(old.tx_type)),
            amount: self.amount.or(Some(old.amount)),
            description: self.description.clone().or_else(|| old.description.clone()),
            date: self.date.or(Some(old.date)),
            family_member_id: self.family_member_id.or(old.family_member_id),
            savings_category_id: self.savings_category_id.or(old.savings_category_id),
            expense_category_id: self.expense_category_id.or(old.expense_category_id),
            from_account_id: self.from_account_id.or(old.from_account_id),
            to_account_id: self.to_account_id.or(old.to_account_id),
        }
    }
}

/// A transaction that passed shape validation and is ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub entry: Entry,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub family_member_id: Option<i64>,
}

impl Draft {
    pub fn validate(input: &NewTransaction, today: NaiveDate) -> Result<Draft> {
        let tx_type = input
            .tx_type
            .ok_or_else(|| TabunganError::validation("transaction type is required"))?;
        let amount = input
            .amount
            .ok_or_else(|| TabunganError::validation("amount is required"))?;
        if amount <= Decimal::ZERO {
            return Err(TabunganError::validation(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        let entry = Entry::from_parts(
            tx_type,
            input.from_account_id,
            input.to_account_id,
            input.savings_category_id,
            input.expense_category_id,
        )?;
        let description = input
            .description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Ok(Draft {
            entry,
            amount,
            description,
            date: input.date.unwrap_or(today),
            family_member_id: input.family_member_id,
        })
    }
}
