// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction ledger and balance reconciliation.

pub mod effect;
pub mod entry;
pub mod reconcile;
pub mod service;

pub use effect::{EffectSet, Leg};
pub use entry::{Draft, Entry, NewTransaction};
pub use reconcile::{BalanceChange, Missing};
pub use service::{
    Recorded, TxFilter, create_transaction, delete_transaction, get_transaction,
    list_transactions, list_transactions_or_empty, update_transaction,
};
