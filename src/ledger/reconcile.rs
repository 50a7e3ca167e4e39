// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Writes effect sets to storage account balances.
//!
//! Callers run these inside one SQLite transaction together with the
//! transaction-row write, so a failing leg rolls back every earlier leg.

use super::effect::EffectSet;
use crate::errors::{Result, TabunganError};
use crate::models::{Transaction, decimal_at};
use crate::settings::BalanceFloor;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;

/// How to treat legs whose account is gone or holds gold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// New effects: the account must exist and must not be gold.
    Reject,
    /// Reversing stored rows: skip the leg and keep going.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceChange {
    pub account_id: i64,
    pub before: Decimal,
    pub after: Decimal,
    /// The floor absorbed part of the decrement.
    pub clamped: bool,
}

/// Result of a single leg under `floor`.
pub fn next_balance(before: Decimal, delta: Decimal, floor: BalanceFloor) -> (Decimal, bool) {
    let raw = before + delta;
    match floor {
        BalanceFloor::Zero if delta < Decimal::ZERO && raw < Decimal::ZERO => (Decimal::ZERO, true),
        _ => (raw, false),
    }
}

fn load_balance(conn: &Connection, account_id: i64) -> Result<Option<(Decimal, bool)>> {
    let row = conn
        .query_row(
            "SELECT balance, is_gold FROM storage_accounts WHERE id=?1",
            params![account_id],
            |r| Ok((decimal_at(r, 0)?, r.get::<_, bool>(1)?)),
        )
        .optional()?;
    Ok(row)
}

/// Applies `set` leg by leg and reports every balance written.
pub fn apply(
    conn: &Connection,
    set: &EffectSet,
    floor: BalanceFloor,
    missing: Missing,
) -> Result<Vec<BalanceChange>> {
    set.validate()?;
    let mut changes = Vec::with_capacity(set.legs().len());
    for leg in set.legs() {
        let (before, is_gold) = match load_balance(conn, leg.account_id)? {
            Some(found) => found,
            None if missing == Missing::Skip => {
                tracing::warn!(account_id = leg.account_id, "storage account not found, leg skipped");
                continue;
            }
            None => return Err(TabunganError::not_found("storage account", leg.account_id)),
        };
        if is_gold {
            if missing == Missing::Skip {
                tracing::warn!(account_id = leg.account_id, "gold account in money flow, leg skipped");
                continue;
            }
            return Err(TabunganError::validation(format!(
                "storage account {} holds gold and cannot take part in transactions",
                leg.account_id
            )));
        }
        let (after, clamped) = next_balance(before, leg.delta, floor);
        if clamped {
            tracing::warn!(
                account_id = leg.account_id,
                %before,
                delta = %leg.delta,
                "balance floored at zero"
            );
        }
        conn.execute(
            "UPDATE storage_accounts SET balance=?1, updated_at=?2 WHERE id=?3",
            params![after.to_string(), Utc::now(), leg.account_id],
        )?;
        tracing::debug!(account_id = leg.account_id, %before, %after, "balance updated");
        changes.push(BalanceChange {
            account_id: leg.account_id,
            before,
            after,
            clamped,
        });
    }
    Ok(changes)
}

/// Undoes a stored row's effect with its stored amount and accounts. Legs
/// on accounts deleted since, or turned into gold holdings, are skipped.
pub fn reverse_effect(
    conn: &Connection,
    tx: &Transaction,
    floor: BalanceFloor,
) -> Result<Vec<BalanceChange>> {
    apply(conn, &EffectSet::reverse_of(tx), floor, Missing::Skip)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn zero_floor_clamps_only_decrements() {
        assert_eq!(next_balance(d(500), d(-700), BalanceFloor::Zero), (d(0), true));
        assert_eq!(next_balance(d(500), d(-500), BalanceFloor::Zero), (d(0), false));
        assert_eq!(next_balance(d(-50), d(20), BalanceFloor::Zero), (d(-30), false));
        assert_eq!(next_balance(d(500), d(700), BalanceFloor::Zero), (d(1200), false));
    }

    #[test]
    fn no_floor_goes_negative() {
        assert_eq!(next_balance(d(500), d(-700), BalanceFloor::None), (d(-200), false));
    }
}
