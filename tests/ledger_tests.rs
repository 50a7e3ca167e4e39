// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use tabungan::db;
use tabungan::errors::TabunganError;
use tabungan::ledger::{
    NewTransaction, TxFilter, create_transaction, delete_transaction, get_transaction,
    list_transactions, list_transactions_or_empty, update_transaction,
};
use tabungan::models::{CategoryKind, TxType};
use tabungan::registry::accounts::{self, AccountInput};
use tabungan::registry::categories::{self, CategoryInput};
use tabungan::registry::members;
use tabungan::settings;

fn dec(v: i64) -> Decimal {
    Decimal::from(v)
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

fn account(conn: &Connection, name: &str, balance: i64) -> i64 {
    accounts::add(conn, &AccountInput::named(name).with_balance(dec(balance)))
        .unwrap()
        .id
}

fn balance(conn: &Connection, id: i64) -> Decimal {
    accounts::get(conn, id).unwrap().balance
}

fn tx_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn transfer_conserves_total_money() {
    let mut conn = db::open_in_memory().unwrap();
    let a = account(&conn, "Cash", 1_000);
    let b = account(&conn, "BCA", 250);

    let rec = create_transaction(&mut conn, &NewTransaction::transfer(dec(300), a, b)).unwrap();
    assert_eq!(rec.changes.len(), 2);
    assert_eq!(balance(&conn, a), dec(700));
    assert_eq!(balance(&conn, b), dec(550));
    assert_eq!(balance(&conn, a) + balance(&conn, b), dec(1_250));
}

#[test]
fn overdrawn_expense_is_held_at_zero_and_delete_restores_more() {
    let mut conn = db::open_in_memory().unwrap();
    let a = account(&conn, "Dompet", 0);

    create_transaction(&mut conn, &NewTransaction::income(dec(500_000), a)).unwrap();
    assert_eq!(balance(&conn, a), dec(500_000));

    let rec = create_transaction(&mut conn, &NewTransaction::expense(dec(700_000), a)).unwrap();
    assert!(rec.clamped());
    assert_eq!(balance(&conn, a), Decimal::ZERO);

    delete_transaction(&mut conn, rec.transaction.id).unwrap();
    assert_eq!(balance(&conn, a), dec(700_000));
}

#[test]
fn without_floor_delete_is_an_exact_inverse() {
    let mut conn = db::open_in_memory().unwrap();
    settings::set(&conn, settings::BALANCE_FLOOR, "none").unwrap();
    let a = account(&conn, "Dompet", 500);

    let rec = create_transaction(&mut conn, &NewTransaction::expense(dec(700), a)).unwrap();
    assert!(!rec.clamped());
    assert_eq!(balance(&conn, a), dec(-200));

    delete_transaction(&mut conn, rec.transaction.id).unwrap();
    assert_eq!(balance(&conn, a), dec(500));
}

#[test]
fn create_then_delete_restores_balances() {
    let mut conn = db::open_in_memory().unwrap();
    let a = account(&conn, "Cash", 1_000);
    let b = account(&conn, "BCA", 0);

    let inputs = [
        NewTransaction::income(dec(120), a),
        NewTransaction::expense(dec(80), a),
        NewTransaction::savings(dec(50), a),
        NewTransaction::transfer(dec(300), a, b),
    ];
    for input in inputs {
        let rec = create_transaction(&mut conn, &input).unwrap();
        delete_transaction(&mut conn, rec.transaction.id).unwrap();
        assert_eq!(balance(&conn, a), dec(1_000));
        assert_eq!(balance(&conn, b), Decimal::ZERO);
    }
    assert_eq!(tx_count(&conn), 0);
}

#[test]
fn update_moves_the_effect_and_delete_undoes_it() {
    let mut conn = db::open_in_memory().unwrap();
    let a = account(&conn, "Cash", 0);
    let b = account(&conn, "BCA", 0);

    let rec = create_transaction(&mut conn, &NewTransaction::income(dec(100), a)).unwrap();
    let id = rec.transaction.id;
    assert_eq!(balance(&conn, a), dec(100));

    let patch = NewTransaction {
        amount: Some(dec(250)),
        to_account_id: Some(b),
        ..Default::default()
    };
    let updated = update_transaction(&mut conn, id, &patch).unwrap();
    assert_eq!(updated.transaction.amount, dec(250));
    assert_eq!(updated.transaction.to_account_id, Some(b));
    assert_eq!(balance(&conn, a), Decimal::ZERO);
    assert_eq!(balance(&conn, b), dec(250));

    delete_transaction(&mut conn, id).unwrap();
    assert_eq!(balance(&conn, a), Decimal::ZERO);
    assert_eq!(balance(&conn, b), Decimal::ZERO);
}

#[test]
fn update_can_change_type() {
    let mut conn = db::open_in_memory().unwrap();
    let a = account(&conn, "Cash", 1_000);

    let rec = create_transaction(&mut conn, &NewTransaction::income(dec(100), a)).unwrap();
    assert_eq!(balance(&conn, a), dec(1_100));

    let patch = NewTransaction {
        tx_type: Some(TxType::Expense),
        from_account_id: Some(a),
        ..Default::default()
    };
    let updated = update_transaction(&mut conn, rec.transaction.id, &patch).unwrap();
    assert_eq!(updated.transaction.tx_type, TxType::Expense);
    assert_eq!(updated.transaction.to_account_id, None);
    assert_eq!(balance(&conn, a), dec(900));
}

#[test]
fn failing_leg_rolls_back_the_whole_transfer() {
    let mut conn = db::open_in_memory().unwrap();
    let a = account(&conn, "Cash", 1_000);
    let b = account(&conn, "BCA", 0);
    conn.execute(
        "UPDATE storage_accounts SET balance='not-a-number' WHERE id=?1",
        params![b],
    )
    .unwrap();

    let res = create_transaction(&mut conn, &NewTransaction::transfer(dec(300), a, b));
    assert!(res.is_err());
    assert_eq!(balance(&conn, a), dec(1_000));
    assert_eq!(tx_count(&conn), 0);
}

#[test]
fn rejects_bad_shapes_before_writing() {
    let mut conn = db::open_in_memory().unwrap();
    let a = account(&conn, "Cash", 1_000);

    let zero = create_transaction(&mut conn, &NewTransaction::income(Decimal::ZERO, a));
    assert!(matches!(zero, Err(TabunganError::Validation(_))));

    let same = create_transaction(&mut conn, &NewTransaction::transfer(dec(10), a, a));
    assert!(matches!(same, Err(TabunganError::Validation(_))));

    let no_source = create_transaction(&mut conn, &NewTransaction::new(TxType::Expense, dec(10)));
    assert!(matches!(no_source, Err(TabunganError::Validation(_))));

    assert_eq!(balance(&conn, a), dec(1_000));
    assert_eq!(tx_count(&conn), 0);
}

#[test]
fn unknown_references_are_not_found() {
    let mut conn = db::open_in_memory().unwrap();
    let a = account(&conn, "Cash", 1_000);

    let res = create_transaction(&mut conn, &NewTransaction::income(dec(10), 999));
    assert!(matches!(
        res,
        Err(TabunganError::NotFound { entity: "storage account", id: 999 })
    ));

    let savings = categories::add(&conn, &CategoryInput::new(CategoryKind::Savings, "Haji")).unwrap();
    let mut wrong_kind = NewTransaction::expense(dec(10), a);
    wrong_kind.expense_category_id = Some(savings.id);
    let res = create_transaction(&mut conn, &wrong_kind);
    assert!(matches!(res, Err(TabunganError::NotFound { entity: "expense category", .. })));

    let mut ghost_member = NewTransaction::income(dec(10), a);
    ghost_member.family_member_id = Some(42);
    let res = create_transaction(&mut conn, &ghost_member);
    assert!(matches!(res, Err(TabunganError::NotFound { entity: "family member", id: 42 })));

    assert!(matches!(
        get_transaction(&conn, 7),
        Err(TabunganError::NotFound { entity: "transaction", id: 7 })
    ));
    assert!(delete_transaction(&mut conn, 7).is_err());
    assert_eq!(balance(&conn, a), dec(1_000));
}

#[test]
fn gold_accounts_cannot_take_part() {
    let mut conn = db::open_in_memory().unwrap();
    let g = accounts::add(&conn, &AccountInput::named("Antam").gold(dec(10)))
        .unwrap()
        .id;
    let res = create_transaction(&mut conn, &NewTransaction::income(dec(10), g));
    assert!(matches!(res, Err(TabunganError::Validation(_))));
}

#[test]
fn expense_draws_from_category_default_account() {
    let mut conn = db::open_in_memory().unwrap();
    let a = account(&conn, "Belanja", 1_000);
    let mut input = CategoryInput::new(CategoryKind::Expense, "Groceries");
    input.storage_account_id = Some(a);
    let groceries = categories::add(&conn, &input).unwrap();

    let mut tx = NewTransaction::new(TxType::Expense, dec(150));
    tx.expense_category_id = Some(groceries.id);
    let rec = create_transaction(&mut conn, &tx).unwrap();
    assert_eq!(rec.transaction.from_account_id, Some(a));
    assert_eq!(balance(&conn, a), dec(850));
}

#[test]
fn deleting_after_account_removal_skips_the_missing_leg() {
    let mut conn = db::open_in_memory().unwrap();
    let a = account(&conn, "Cash", 1_000);
    let b = account(&conn, "BCA", 0);
    let rec = create_transaction(&mut conn, &NewTransaction::transfer(dec(400), a, b)).unwrap();

    accounts::remove(&conn, b).unwrap();
    let removed = delete_transaction(&mut conn, rec.transaction.id).unwrap();
    assert_eq!(removed.changes.len(), 1);
    assert_eq!(balance(&conn, a), dec(1_000));
    assert_eq!(tx_count(&conn), 0);
}

#[test]
fn listing_is_newest_first_and_filterable() {
    let mut conn = db::open_in_memory().unwrap();
    let a = account(&conn, "Cash", 10_000);
    let b = account(&conn, "BCA", 0);
    let ayah = members::add(&conn, "Ayah", "father", None).unwrap();

    let mut salary = NewTransaction::income(dec(5_000), a).on(day(1));
    salary.family_member_id = Some(ayah.id);
    let first = create_transaction(&mut conn, &salary).unwrap().transaction.id;
    let second = create_transaction(&mut conn, &NewTransaction::expense(dec(100), a).on(day(5)))
        .unwrap()
        .transaction
        .id;
    let third = create_transaction(&mut conn, &NewTransaction::transfer(dec(200), a, b).on(day(5)))
        .unwrap()
        .transaction
        .id;

    let all: Vec<i64> = list_transactions(&conn, &TxFilter::default())
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(all, vec![third, second, first]);

    let income = list_transactions(
        &conn,
        &TxFilter {
            tx_type: Some(TxType::Income),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].family_member_id, Some(ayah.id));

    let on_b = list_transactions(
        &conn,
        &TxFilter {
            storage_account_id: Some(b),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(on_b.iter().map(|t| t.id).collect::<Vec<_>>(), vec![third]);

    let early = list_transactions(
        &conn,
        &TxFilter {
            to: Some(day(2)),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(early.len(), 1);

    let limited = list_transactions(
        &conn,
        &TxFilter {
            limit: Some(2),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, third);
}

#[test]
fn amount_only_update_matches_a_single_transaction_of_the_new_amount() {
    let mut conn = db::open_in_memory().unwrap();
    let a = account(&conn, "Cash", 1_000);
    let b = account(&conn, "BCA", 0);

    let id = create_transaction(&mut conn, &NewTransaction::transfer(dec(100), a, b))
        .unwrap()
        .transaction
        .id;
    let patch = NewTransaction {
        amount: Some(dec(250)),
        ..Default::default()
    };
    update_transaction(&mut conn, id, &patch).unwrap();
    assert_eq!(balance(&conn, a), dec(750));
    assert_eq!(balance(&conn, b), dec(250));

    delete_transaction(&mut conn, id).unwrap();
    assert_eq!(balance(&conn, a), dec(1_000));
    assert_eq!(balance(&conn, b), Decimal::ZERO);
}

#[test]
fn failing_update_keeps_old_balances_and_row() {
    let mut conn = db::open_in_memory().unwrap();
    let a = account(&conn, "Cash", 1_000);
    let b = account(&conn, "BCA", 0);
    let broken = account(&conn, "Mandiri", 0);

    let before = create_transaction(&mut conn, &NewTransaction::transfer(dec(300), a, b))
        .unwrap()
        .transaction;
    conn.execute(
        "UPDATE storage_accounts SET balance='not-a-number' WHERE id=?1",
        params![broken],
    )
    .unwrap();

    let patch = NewTransaction {
        to_account_id: Some(broken),
        ..Default::default()
    };
    assert!(update_transaction(&mut conn, before.id, &patch).is_err());

    assert_eq!(balance(&conn, a), dec(700));
    assert_eq!(balance(&conn, b), dec(300));
    assert_eq!(get_transaction(&conn, before.id).unwrap(), before);
}

#[test]
fn negative_balance_account_can_still_be_renamed() {
    let mut conn = db::open_in_memory().unwrap();
    settings::set(&conn, settings::BALANCE_FLOOR, "none").unwrap();
    let a = account(&conn, "Cash", 10);
    create_transaction(&mut conn, &NewTransaction::expense(dec(50), a)).unwrap();

    let current = accounts::get(&conn, a).unwrap();
    let mut input = AccountInput::named("Dompet").with_balance(current.balance);
    input.account_number = Some("0012".into());
    let renamed = accounts::edit(&conn, a, &input).unwrap();
    assert_eq!(renamed.name, "Dompet");
    assert_eq!(renamed.balance, dec(-40));
}

#[test]
fn unreadable_rows_degrade_listing_to_empty() {
    let mut conn = db::open_in_memory().unwrap();
    let a = account(&conn, "Cash", 0);
    let id = create_transaction(&mut conn, &NewTransaction::income(dec(10), a))
        .unwrap()
        .transaction
        .id;
    conn.execute(
        "UPDATE transactions SET amount='sepuluh' WHERE id=?1",
        params![id],
    )
    .unwrap();

    assert!(list_transactions(&conn, &TxFilter::default()).is_err());
    assert!(list_transactions_or_empty(&conn, &TxFilter::default()).is_empty());
}
