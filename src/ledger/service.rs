// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction lifecycle. Every mutating call is one immediate SQLite
//! transaction: balance legs and the row write commit together or not at
//! all, and the write lock is held from the first balance read.

use super::effect::EffectSet;
use super::entry::{Draft, NewTransaction};
use super::reconcile::{self, BalanceChange, Missing};
use crate::errors::{Result, TabunganError};
use crate::models::{CategoryKind, Transaction, TxType};
use crate::settings;
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde::Serialize;

/// A written transaction together with the balances it moved.
#[derive(Debug, Clone, Serialize)]
pub struct Recorded {
    pub transaction: Transaction,
    pub changes: Vec<BalanceChange>,
}

impl Recorded {
    pub fn clamped(&self) -> bool {
        self.changes.iter().any(|c| c.clamped)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TxFilter {
    pub tx_type: Option<TxType>,
    pub family_member_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Matches either leg.
    pub storage_account_id: Option<i64>,
    pub limit: Option<usize>,
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    let sql = format!("SELECT {} FROM transactions WHERE id=?1", Transaction::COLUMNS);
    conn.query_row(&sql, params![id], Transaction::from_row)
        .optional()?
        .ok_or_else(|| TabunganError::not_found("transaction", id))
}

/// Transactions matching `filter`, newest date first, later-created first on
/// equal dates.
pub fn list_transactions(conn: &Connection, filter: &TxFilter) -> Result<Vec<Transaction>> {
    let mut sql = format!("SELECT {} FROM transactions WHERE 1=1", Transaction::COLUMNS);
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(t) = filter.tx_type {
        sql.push_str(" AND type=?");
        params_vec.push(Box::new(t.as_str()));
    }
    if let Some(m) = filter.family_member_id {
        sql.push_str(" AND family_member_id=?");
        params_vec.push(Box::new(m));
    }
    if let Some(d) = filter.from {
        sql.push_str(" AND date>=?");
        params_vec.push(Box::new(d.to_string()));
    }
    if let Some(d) = filter.to {
        sql.push_str(" AND date<=?");
        params_vec.push(Box::new(d.to_string()));
    }
    if let Some(a) = filter.storage_account_id {
        sql.push_str(" AND (from_account_id=? OR to_account_id=?)");
        params_vec.push(Box::new(a));
        params_vec.push(Box::new(a));
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(Box::new(limit as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(params_vec.iter().map(|p| p.as_ref())),
        Transaction::from_row,
    )?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Listing for display paths: failures are logged and yield no rows.
pub fn list_transactions_or_empty(conn: &Connection, filter: &TxFilter) -> Vec<Transaction> {
    list_transactions(conn, filter).unwrap_or_else(|err| {
        tracing::error!(error = %err, "listing transactions failed");
        Vec::new()
    })
}

pub fn create_transaction(conn: &mut Connection, input: &NewTransaction) -> Result<Recorded> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let input = with_category_default(&tx, input)?;
    let draft = Draft::validate(&input, Utc::now().date_naive())?;
    check_references(&tx, &draft)?;

    let floor = settings::balance_floor(&tx)?;
    let changes = reconcile::apply(
        &tx,
        &EffectSet::for_entry(&draft.entry, draft.amount),
        floor,
        Missing::Reject,
    )?;

    let now = Utc::now();
    tx.execute(
        "INSERT INTO transactions(type, amount, description, date, family_member_id,
             savings_category_id, expense_category_id, from_account_id, to_account_id,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            draft.entry.tx_type().as_str(),
            draft.amount.to_string(),
            draft.description,
            draft.date.to_string(),
            draft.family_member_id,
            draft.entry.savings_category(),
            draft.entry.expense_category(),
            draft.entry.from_account(),
            draft.entry.to_account(),
            now,
        ],
    )?;
    let id = tx.last_insert_rowid();
    let transaction = get_transaction(&tx, id)?;
    tx.commit()?;

    tracing::info!(id, kind = %transaction.tx_type, amount = %transaction.amount, "transaction recorded");
    Ok(Recorded {
        transaction,
        changes,
    })
}

/// Reverses the stored effect, applies the merged one, then rewrites the
/// row. Fields absent from `patch` keep their stored values.
pub fn update_transaction(
    conn: &mut Connection,
    id: i64,
    patch: &NewTransaction,
) -> Result<Recorded> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let old = get_transaction(&tx, id)?;
    let merged = with_category_default(&tx, &patch.merged_over(&old))?;
    let draft = Draft::validate(&merged, old.date)?;
    check_references(&tx, &draft)?;

    let floor = settings::balance_floor(&tx)?;
    let mut changes = reconcile::reverse_effect(&tx, &old, floor)?;
    changes.extend(reconcile::apply(
        &tx,
        &EffectSet::for_entry(&draft.entry, draft.amount),
        floor,
        Missing::Reject,
    )?);

    tx.execute(
        "UPDATE transactions SET type=?1, amount=?2, description=?3, date=?4,
             family_member_id=?5, savings_category_id=?6, expense_category_id=?7,
             from_account_id=?8, to_account_id=?9, updated_at=?10
         WHERE id=?11",
        params![
            draft.entry.tx_type().as_str(),
            draft.amount.to_string(),
            draft.description,
            draft.date.to_string(),
            draft.family_member_id,
            draft.entry.savings_category(),
            draft.entry.expense_category(),
            draft.entry.from_account(),
            draft.entry.to_account(),
            Utc::now(),
            id,
        ],
    )?;
    let transaction = get_transaction(&tx, id)?;
    tx.commit()?;

    tracing::info!(id, kind = %transaction.tx_type, amount = %transaction.amount, "transaction updated");
    Ok(Recorded {
        transaction,
        changes,
    })
}

/// Reverses the stored effect and removes the row. Returns the removed row.
pub fn delete_transaction(conn: &mut Connection, id: i64) -> Result<Recorded> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let old = get_transaction(&tx, id)?;
    let floor = settings::balance_floor(&tx)?;
    let changes = reconcile::reverse_effect(&tx, &old, floor)?;
    tx.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    tx.commit()?;

    tracing::info!(id, kind = %old.tx_type, amount = %old.amount, "transaction deleted");
    Ok(Recorded {
        transaction: old,
        changes,
    })
}

/// Expense and savings without a source account draw from the category's
/// linked storage account, when it has one.
fn with_category_default(conn: &Connection, input: &NewTransaction) -> Result<NewTransaction> {
    let category = match input.tx_type {
        Some(TxType::Expense) => input.expense_category_id,
        Some(TxType::Savings) => input.savings_category_id,
        _ => None,
    };
    let mut out = input.clone();
    if let (None, Some(cat)) = (input.from_account_id, category) {
        let linked: Option<Option<i64>> = conn
            .query_row(
                "SELECT storage_account_id FROM categories WHERE id=?1",
                params![cat],
                |r| r.get(0),
            )
            .optional()?;
        if let Some(Some(account_id)) = linked {
            tracing::debug!(category_id = cat, account_id, "using category default account");
            out.from_account_id = Some(account_id);
        }
    }
    Ok(out)
}

fn exists(conn: &Connection, sql: &str, id: i64) -> Result<bool> {
    Ok(conn
        .query_row(sql, params![id], |_| Ok(()))
        .optional()?
        .is_some())
}

/// Every id the draft names must resolve before any balance is touched.
fn check_references(conn: &Connection, draft: &Draft) -> Result<()> {
    for account_id in draft.entry.accounts() {
        let is_gold: Option<bool> = conn
            .query_row(
                "SELECT is_gold FROM storage_accounts WHERE id=?1",
                params![account_id],
                |r| r.get(0),
            )
            .optional()?;
        match is_gold {
            None => return Err(TabunganError::not_found("storage account", account_id)),
            Some(true) => {
                return Err(TabunganError::validation(format!(
                    "storage account {} holds gold and cannot take part in transactions",
                    account_id
                )));
            }
            Some(false) => {}
        }
    }
    let categories = [
        (draft.entry.savings_category(), CategoryKind::Savings),
        (draft.entry.expense_category(), CategoryKind::Expense),
    ];
    for (id, kind) in categories {
        if let Some(id) = id {
            let found: Option<String> = conn
                .query_row(
                    "SELECT kind FROM categories WHERE id=?1",
                    params![id],
                    |r| r.get(0),
                )
                .optional()?;
            if found.as_deref() != Some(kind.as_str()) {
                return Err(TabunganError::not_found(kind.entity(), id));
            }
        }
    }
    if let Some(member) = draft.family_member_id {
        if !exists(conn, "SELECT 1 FROM family_members WHERE id=?1", member)? {
            return Err(TabunganError::not_found("family member", member));
        }
    }
    Ok(())
}
