// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::clean;
use crate::errors::{Result, TabunganError};
use crate::models::StorageAccount;
use crate::settings::{self, BalanceFloor};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

/// Editable fields of a storage account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountInput {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub account_number: Option<String>,
    pub balance: Decimal,
    pub is_gold: bool,
    pub gold_weight: Option<Decimal>,
}

impl AccountInput {
    pub fn named(name: &str) -> Self {
        AccountInput {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    pub fn gold(mut self, grams: Decimal) -> Self {
        self.is_gold = true;
        self.gold_weight = Some(grams);
        self
    }

    /// `allow_negative` admits a balance below zero, for accounts the
    /// ledger has already taken there.
    fn normalized(&self, allow_negative: bool) -> Result<AccountInput> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(TabunganError::validation("account name must not be empty"));
        }
        if self.balance < Decimal::ZERO && !allow_negative {
            return Err(TabunganError::validation("balance must not be negative"));
        }
        if let Some(w) = self.gold_weight {
            if self.is_gold && w < Decimal::ZERO {
                return Err(TabunganError::validation("gold weight must not be negative"));
            }
        }
        Ok(AccountInput {
            name: name.to_string(),
            description: clean(self.description.as_deref()),
            icon: clean(self.icon.as_deref()),
            color: clean(self.color.as_deref()),
            account_number: clean(self.account_number.as_deref()),
            balance: self.balance,
            is_gold: self.is_gold,
            // weight means nothing on a money account
            gold_weight: if self.is_gold { self.gold_weight } else { None },
        })
    }
}

pub fn add(conn: &Connection, input: &AccountInput) -> Result<StorageAccount> {
    let a = input.normalized(false)?;
    let now = Utc::now();
    conn.execute(
        "INSERT INTO storage_accounts(name, description, icon, color, account_number,
             balance, is_gold, gold_weight, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            a.name,
            a.description,
            a.icon,
            a.color,
            a.account_number,
            a.balance.to_string(),
            a.is_gold,
            a.gold_weight.map(|w| w.to_string()),
            now,
        ],
    )?;
    get(conn, conn.last_insert_rowid())
}

/// Overwrites every editable field, balance included. A negative balance is
/// accepted when it is the stored one, or when balances have no floor.
pub fn edit(conn: &Connection, id: i64, input: &AccountInput) -> Result<StorageAccount> {
    let existing = get(conn, id)?;
    let allow_negative = input.balance == existing.balance
        || settings::balance_floor(conn)? == BalanceFloor::None;
    let a = input.normalized(allow_negative)?;
    let n = conn.execute(
        "UPDATE storage_accounts SET name=?1, description=?2, icon=?3, color=?4,
             account_number=?5, balance=?6, is_gold=?7, gold_weight=?8, updated_at=?9
         WHERE id=?10",
        params![
            a.name,
            a.description,
            a.icon,
            a.color,
            a.account_number,
            a.balance.to_string(),
            a.is_gold,
            a.gold_weight.map(|w| w.to_string()),
            Utc::now(),
            id,
        ],
    )?;
    if n == 0 {
        return Err(TabunganError::not_found("storage account", id));
    }
    get(conn, id)
}

pub fn remove(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM storage_accounts WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(TabunganError::not_found("storage account", id));
    }
    Ok(())
}

pub fn get(conn: &Connection, id: i64) -> Result<StorageAccount> {
    let sql = format!("SELECT {} FROM storage_accounts WHERE id=?1", StorageAccount::COLUMNS);
    conn.query_row(&sql, params![id], StorageAccount::from_row)
        .optional()?
        .ok_or_else(|| TabunganError::not_found("storage account", id))
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<StorageAccount>> {
    let sql = format!("SELECT {} FROM storage_accounts WHERE name=?1", StorageAccount::COLUMNS);
    Ok(conn
        .query_row(&sql, params![name.trim()], StorageAccount::from_row)
        .optional()?)
}

pub fn list(conn: &Connection) -> Result<Vec<StorageAccount>> {
    let sql = format!("SELECT {} FROM storage_accounts ORDER BY name", StorageAccount::COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], StorageAccount::from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
