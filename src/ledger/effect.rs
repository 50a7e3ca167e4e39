// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::entry::Entry;
use crate::errors::{Result, TabunganError};
use crate::models::{Transaction, TxType};
use rust_decimal::Decimal;
use serde::Serialize;

/// One signed balance movement on one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Leg {
    pub account_id: i64,
    pub delta: Decimal,
}

/// Ordered legs of one apply or reverse step. Legs are written in order
/// because the balance floor makes the result order-dependent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EffectSet {
    legs: Vec<Leg>,
}

fn legs_for(tx_type: TxType, from: Option<i64>, to: Option<i64>, amount: Decimal) -> Vec<Leg> {
    let debit = |id: Option<i64>| id.map(|account_id| Leg { account_id, delta: -amount });
    let credit = |id: Option<i64>| id.map(|account_id| Leg { account_id, delta: amount });
    match tx_type {
        TxType::Income => credit(to).into_iter().collect(),
        TxType::Expense | TxType::Savings => debit(from).into_iter().collect(),
        TxType::Transfer => debit(from).into_iter().chain(credit(to)).collect(),
    }
}

impl EffectSet {
    /// Effect of a stored row. A missing leg contributes nothing.
    pub fn apply_of(tx: &Transaction) -> EffectSet {
        EffectSet {
            legs: legs_for(tx.tx_type, tx.from_account_id, tx.to_account_id, tx.amount),
        }
    }

    /// Inverse of [`EffectSet::apply_of`], using the row's stored amount and
    /// accounts.
    pub fn reverse_of(tx: &Transaction) -> EffectSet {
        EffectSet::apply_of(tx).inverted()
    }

    pub fn for_entry(entry: &Entry, amount: Decimal) -> EffectSet {
        EffectSet {
            legs: legs_for(entry.tx_type(), entry.from_account(), entry.to_account(), amount),
        }
    }

    pub fn inverted(&self) -> EffectSet {
        EffectSet {
            legs: self
                .legs
                .iter()
                .map(|l| Leg {
                    account_id: l.account_id,
                    delta: -l.delta,
                })
                .collect(),
        }
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Net movement per account, in first-touched order.
    pub fn net(&self) -> Vec<Leg> {
        let mut out: Vec<Leg> = Vec::with_capacity(self.legs.len());
        for leg in &self.legs {
            match out.iter_mut().find(|l| l.account_id == leg.account_id) {
                Some(l) => l.delta += leg.delta,
                None => out.push(*leg),
            }
        }
        out
    }

    /// Rejects zero legs and any account touched twice in the same step.
    pub fn validate(&self) -> Result<()> {
        for (i, leg) in self.legs.iter().enumerate() {
            if leg.delta.is_zero() {
                return Err(TabunganError::validation(format!(
                    "zero movement on account {}",
                    leg.account_id
                )));
            }
            if self.legs[..i].iter().any(|l| l.account_id == leg.account_id) {
                return Err(TabunganError::validation(format!(
                    "account {} appears in more than one leg",
                    leg.account_id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn row(tx_type: TxType, from: Option<i64>, to: Option<i64>) -> Transaction {
        Transaction {
            id: 1,
            tx_type,
            amount: Decimal::from(100),
            description: None,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            family_member_id: None,
            savings_category_id: None,
            expense_category_id: None,
            from_account_id: from,
            to_account_id: to,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn leg(account_id: i64, delta: i64) -> Leg {
        Leg {
            account_id,
            delta: Decimal::from(delta),
        }
    }

    #[test]
    fn legs_follow_transaction_type() {
        assert_eq!(
            EffectSet::apply_of(&row(TxType::Income, Some(1), Some(2))).legs(),
            &[leg(2, 100)]
        );
        assert_eq!(
            EffectSet::apply_of(&row(TxType::Expense, Some(1), Some(2))).legs(),
            &[leg(1, -100)]
        );
        assert_eq!(
            EffectSet::apply_of(&row(TxType::Savings, Some(1), None)).legs(),
            &[leg(1, -100)]
        );
        assert_eq!(
            EffectSet::apply_of(&row(TxType::Transfer, Some(1), Some(2))).legs(),
            &[leg(1, -100), leg(2, 100)]
        );
    }

    #[test]
    fn missing_legs_have_no_effect() {
        assert!(EffectSet::apply_of(&row(TxType::Income, Some(1), None)).is_empty());
        assert!(EffectSet::apply_of(&row(TxType::Expense, None, Some(2))).is_empty());
        assert_eq!(
            EffectSet::apply_of(&row(TxType::Transfer, None, Some(2))).legs(),
            &[leg(2, 100)]
        );
    }

    #[test]
    fn reverse_mirrors_apply() {
        let tx = row(TxType::Transfer, Some(1), Some(2));
        assert_eq!(EffectSet::reverse_of(&tx).legs(), &[leg(1, 100), leg(2, -100)]);
        let net = EffectSet {
            legs: [EffectSet::apply_of(&tx).legs(), EffectSet::reverse_of(&tx).legs()].concat(),
        }
        .net();
        assert!(net.iter().all(|l| l.delta.is_zero()));
    }

    #[test]
    fn validate_rejects_repeated_account() {
        let same = row(TxType::Transfer, Some(4), Some(4));
        assert!(EffectSet::apply_of(&same).validate().is_err());
        assert!(EffectSet::apply_of(&row(TxType::Transfer, Some(4), Some(5)))
            .validate()
            .is_ok());
    }
}
