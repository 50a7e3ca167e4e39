// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{TxFilter, list_transactions_or_empty};
use crate::models::StorageAccount;
use crate::registry::accounts::{self, AccountInput};
use crate::registry::clean;
use crate::settings;
use crate::stats::account_activity;
use crate::utils::{account_ref, fmt_money, maybe_print_json, opt_text, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = overlay(AccountInput::default(), sub)?;
            let a = accounts::add(conn, &input)?;
            println!("Added account '{}' (id {})", a.name, a.id);
        }
        Some(("edit", sub)) => {
            let id = account_ref(conn, sub.get_one::<String>("ACCOUNT").unwrap())?;
            let current = accounts::get(conn, id)?;
            let input = overlay(input_from(&current), sub)?;
            let a = accounts::edit(conn, id, &input)?;
            println!("Updated account '{}' (id {})", a.name, a.id);
        }
        Some(("rm", sub)) => {
            let id = account_ref(conn, sub.get_one::<String>("ACCOUNT").unwrap())?;
            accounts::remove(conn, id)?;
            println!("Removed account {}", id);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn input_from(a: &StorageAccount) -> AccountInput {
    AccountInput {
        name: a.name.clone(),
        description: a.description.clone(),
        icon: a.icon.clone(),
        color: a.color.clone(),
        account_number: a.account_number.clone(),
        balance: a.balance,
        is_gold: a.is_gold,
        gold_weight: a.gold_weight,
    }
}

/// Applies the options given on the command line over `base`.
fn overlay(mut base: AccountInput, sub: &clap::ArgMatches) -> Result<AccountInput> {
    if let Some(name) = sub.get_one::<String>("name") {
        base.name = name.trim().to_string();
    }
    if let Some(b) = sub.get_one::<String>("balance") {
        base.balance = parse_decimal(b)?;
    }
    if let Some(v) = sub.get_one::<String>("description") {
        base.description = clean(Some(v));
    }
    if let Some(v) = sub.get_one::<String>("icon") {
        base.icon = clean(Some(v));
    }
    if let Some(v) = sub.get_one::<String>("color") {
        base.color = clean(Some(v));
    }
    if let Some(v) = sub.get_one::<String>("number") {
        base.account_number = clean(Some(v));
    }
    if let Some(g) = sub.get_one::<bool>("gold") {
        base.is_gold = *g;
    }
    if let Some(w) = sub.get_one::<String>("weight") {
        base.gold_weight = Some(parse_decimal(w)?);
    }
    Ok(base)
}

#[derive(Serialize)]
pub struct AccountRow {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub balance: Decimal,
    pub gold_weight: Option<Decimal>,
    pub value: Option<Decimal>,
}

/// Accounts with their money value. Gold accounts are only valued when
/// `gold_price` is given.
pub fn account_rows(list: &[StorageAccount], gold_price: Option<Decimal>) -> Vec<AccountRow> {
    list.iter()
        .map(|a| AccountRow {
            id: a.id,
            name: a.name.clone(),
            kind: if a.is_gold { "gold" } else { "money" }.to_string(),
            balance: a.balance,
            gold_weight: a.gold_weight,
            value: match (a.is_gold, gold_price) {
                (false, _) => Some(a.balance),
                (true, Some(p)) => Some(a.valuation(p)),
                (true, None) => None,
            },
        })
        .collect()
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let all = accounts::list(conn)?;
    let ccy = settings::currency(conn)?;
    let gold_price = if sub.get_flag("value") && all.iter().any(|a| a.is_gold) {
        Some(gold_price_in(conn, &ccy))
    } else {
        None
    };
    let rows = account_rows(&all, gold_price);
    if maybe_print_json(sub.get_flag("json"), &rows)? {
        return Ok(());
    }
    let total: Decimal = rows.iter().filter_map(|r| r.value).sum();
    let mut data: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.name.clone(),
                r.kind.clone(),
                format!("{:.2}", r.balance),
                r.gold_weight.map(|w| format!("{} g", w)).unwrap_or_default(),
                r.value.map(|v| fmt_money(&v, &ccy)).unwrap_or_default(),
            ]
        })
        .collect();
    data.push(vec![
        String::new(),
        "Total".into(),
        String::new(),
        String::new(),
        String::new(),
        fmt_money(&total, &ccy),
    ]);
    println!(
        "{}",
        pretty_table(&["ID", "Name", "Kind", "Balance", "Gold", "Value"], data)
    );
    Ok(())
}

/// Current gold price per gram. Warns when the oracle fell back to a price
/// in another currency than `ccy`.
fn gold_price_in(conn: &Connection, ccy: &str) -> Decimal {
    let report = super::gold::current_price(conn);
    if !report.currency.eq_ignore_ascii_case(ccy) {
        eprintln!(
            "Warning: gold price is in {} ({}), not {}",
            report.currency,
            report.note.as_deref().unwrap_or("fallback"),
            ccy
        );
    }
    report.price_per_gram
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = account_ref(conn, sub.get_one::<String>("ACCOUNT").unwrap())?;
    let account = accounts::get(conn, id)?;
    let txs = list_transactions_or_empty(
        conn,
        &TxFilter {
            storage_account_id: Some(id),
            ..Default::default()
        },
    );
    let activity = account_activity(&txs, id);
    let value = if account.is_gold {
        account.valuation(gold_price_in(conn, &settings::currency(conn)?))
    } else {
        account.balance
    };

    #[derive(Serialize)]
    struct Detail<'a> {
        account: &'a StorageAccount,
        value: Decimal,
        total_in: Decimal,
        total_out: Decimal,
        transactions: usize,
    }
    let detail = Detail {
        account: &account,
        value,
        total_in: activity.total_in,
        total_out: activity.total_out,
        transactions: activity.count,
    };
    if maybe_print_json(sub.get_flag("json"), &detail)? {
        return Ok(());
    }
    let ccy = settings::currency(conn)?;
    let mut rows = vec![
        vec!["Name".to_string(), account.name.clone()],
        vec!["Description".to_string(), opt_text(&account.description)],
        vec!["Account number".to_string(), opt_text(&account.account_number)],
    ];
    if account.is_gold {
        rows.push(vec![
            "Gold weight".to_string(),
            account.gold_weight.map(|w| format!("{} g", w)).unwrap_or_default(),
        ]);
    } else {
        rows.push(vec!["Balance".to_string(), fmt_money(&account.balance, &ccy)]);
    }
    rows.push(vec!["Value".to_string(), fmt_money(&value, &ccy)]);
    rows.push(vec!["Total in".to_string(), fmt_money(&activity.total_in, &ccy)]);
    rows.push(vec!["Total out".to_string(), fmt_money(&activity.total_out, &ccy)]);
    rows.push(vec!["Transactions".to_string(), activity.count.to_string()]);
    println!("{}", pretty_table(&["Account", ""], rows));
    Ok(())
}
