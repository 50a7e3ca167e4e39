// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{Entry, TxFilter, list_transactions};
use crate::registry::{accounts, categories, members};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = diagnose(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// One `[issue, detail]` row per problem found.
pub fn diagnose(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let all_accounts = accounts::list(conn)?;
    let gold: HashSet<i64> = all_accounts.iter().filter(|a| a.is_gold).map(|a| a.id).collect();
    let account_ids: HashSet<i64> = all_accounts.iter().map(|a| a.id).collect();
    let category_kinds: HashMap<i64, _> = categories::list(conn, None)?
        .into_iter()
        .map(|c| (c.id, c.kind))
        .collect();
    let member_ids: HashSet<i64> = members::list(conn)?.into_iter().map(|m| m.id).collect();

    // 1) Accounts
    for a in &all_accounts {
        if a.is_gold && a.gold_weight.is_none() {
            rows.push(vec!["gold_account_no_weight".into(), a.name.clone()]);
        }
        if a.balance < Decimal::ZERO {
            rows.push(vec!["negative_balance".into(), format!("{} {}", a.name, a.balance)]);
        }
    }

    // 2) Categories linked to accounts that are gone
    for c in categories::list(conn, None)? {
        if let Some(id) = c.storage_account_id.filter(|id| !account_ids.contains(id)) {
            rows.push(vec![
                "category_missing_account".into(),
                format!("{} -> account {}", c.name, id),
            ]);
        }
    }

    // 3) Transactions
    for t in list_transactions(conn, &TxFilter::default())? {
        if let Err(e) = Entry::from_parts(
            t.tx_type,
            t.from_account_id,
            t.to_account_id,
            t.savings_category_id,
            t.expense_category_id,
        ) {
            rows.push(vec!["bad_shape".into(), format!("tx {}: {}", t.id, e)]);
        }
        for id in t.from_account_id.into_iter().chain(t.to_account_id) {
            if !account_ids.contains(&id) {
                rows.push(vec!["missing_account".into(), format!("tx {} -> account {}", t.id, id)]);
            } else if gold.contains(&id) {
                rows.push(vec!["gold_leg".into(), format!("tx {} -> account {}", t.id, id)]);
            }
        }
        for (id, kind) in t
            .savings_category_id
            .map(|id| (id, crate::models::CategoryKind::Savings))
            .into_iter()
            .chain(t.expense_category_id.map(|id| (id, crate::models::CategoryKind::Expense)))
        {
            if category_kinds.get(&id) != Some(&kind) {
                rows.push(vec![
                    "missing_category".into(),
                    format!("tx {} -> {} {}", t.id, kind.entity(), id),
                ]);
            }
        }
        if let Some(id) = t.family_member_id.filter(|id| !member_ids.contains(id)) {
            rows.push(vec!["missing_member".into(), format!("tx {} -> member {}", t.id, id)]);
        }
    }
    Ok(rows)
}
