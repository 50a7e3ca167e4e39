// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{
    self, NewTransaction, Recorded, TxFilter, get_transaction, list_transactions_or_empty,
};
use crate::models::{CategoryKind, Transaction, TxType};
use crate::registry::{accounts, categories, members};
use crate::settings;
use crate::utils::{
    account_ref, category_ref, fmt_money, maybe_print_json, member_ref, opt_ref, opt_text,
    parse_amount, parse_date, pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = read_fields(conn, sub, None)?;
            let rec = ledger::create_transaction(conn, &input)?;
            report(conn, "Recorded", &rec, sub.get_flag("json"))?;
        }
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("ID").unwrap();
            let stored = get_transaction(conn, id)?;
            let patch = read_fields(conn, sub, Some(stored.tx_type))?;
            let rec = ledger::update_transaction(conn, id, &patch)?;
            report(conn, "Updated", &rec, sub.get_flag("json"))?;
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("ID").unwrap();
            let rec = ledger::delete_transaction(conn, id)?;
            report(conn, "Deleted", &rec, false)?;
        }
        Some(("show", sub)) => {
            let id = *sub.get_one::<i64>("ID").unwrap();
            let t = get_transaction(conn, id)?;
            if maybe_print_json(sub.get_flag("json"), &t)? {
                return Ok(());
            }
            let names = Names::load(conn)?;
            let ccy = settings::currency(conn)?;
            let rows = vec![
                vec!["Id".to_string(), t.id.to_string()],
                vec!["Type".to_string(), t.tx_type.to_string()],
                vec!["Date".to_string(), t.date.to_string()],
                vec!["Amount".to_string(), fmt_money(&t.amount, &ccy)],
                vec!["From".to_string(), names.account(t.from_account_id)],
                vec!["To".to_string(), names.account(t.to_account_id)],
                vec!["Category".to_string(), names.category_of(&t)],
                vec!["Member".to_string(), names.member(t.family_member_id)],
                vec!["Description".to_string(), opt_text(&t.description)],
            ];
            println!("{}", pretty_table(&["Transaction", ""], rows));
        }
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Builds the fields given on the command line. `stored` is the type of the
/// row being edited and picks the category kind when --type is absent.
fn read_fields(
    conn: &Connection,
    sub: &clap::ArgMatches,
    stored: Option<TxType>,
) -> Result<NewTransaction> {
    let tx_type = sub
        .get_one::<String>("type")
        .map(|s| s.parse::<TxType>())
        .transpose()?;
    let amount = sub
        .get_one::<String>("amount")
        .map(|s| parse_amount(s))
        .transpose()?;
    let date = sub
        .get_one::<String>("date")
        .map(|s| parse_date(s))
        .transpose()?;

    let mut input = NewTransaction {
        tx_type,
        amount,
        date,
        description: sub.get_one::<String>("description").cloned(),
        family_member_id: opt_ref(sub, "member", |s| member_ref(conn, s))?,
        from_account_id: opt_ref(sub, "from", |s| account_ref(conn, s))?,
        to_account_id: opt_ref(sub, "to", |s| account_ref(conn, s))?,
        ..Default::default()
    };
    match tx_type.or(stored) {
        Some(TxType::Savings) => {
            input.savings_category_id =
                opt_ref(sub, "category", |s| category_ref(conn, CategoryKind::Savings, s))?;
        }
        Some(TxType::Expense) => {
            input.expense_category_id =
                opt_ref(sub, "category", |s| category_ref(conn, CategoryKind::Expense, s))?;
        }
        _ => {
            if sub.get_one::<String>("category").is_some() {
                tracing::warn!("--category ignored for this transaction type");
            }
        }
    }
    Ok(input)
}

fn report(conn: &Connection, verb: &str, rec: &Recorded, json: bool) -> Result<()> {
    if maybe_print_json(json, rec)? {
        return Ok(());
    }
    let t = &rec.transaction;
    let ccy = settings::currency(conn)?;
    println!(
        "{} {} #{} of {} on {}",
        verb,
        t.tx_type,
        t.id,
        fmt_money(&t.amount, &ccy),
        t.date
    );
    let names = Names::load(conn)?;
    for c in &rec.changes {
        println!(
            "  {}: {} -> {}",
            names.account(Some(c.account_id)),
            fmt_money(&c.before, &ccy),
            fmt_money(&c.after, &ccy)
        );
    }
    if rec.clamped() {
        eprintln!("Warning: a balance was held at zero; this change will not fully reverse");
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let filter = TxFilter {
        tx_type: sub
            .get_one::<String>("type")
            .map(|s| s.parse::<TxType>())
            .transpose()?,
        family_member_id: opt_ref(sub, "member", |s| member_ref(conn, s))?,
        from: sub.get_one::<String>("since").map(|s| parse_date(s)).transpose()?,
        to: sub.get_one::<String>("until").map(|s| parse_date(s)).transpose()?,
        storage_account_id: opt_ref(sub, "account", |s| account_ref(conn, s))?,
        limit: sub.get_one::<usize>("limit").copied(),
    };
    let txs = list_transactions_or_empty(conn, &filter);
    let names = Names::load(conn)?;
    let data: Vec<TransactionRow> = txs.iter().map(|t| TransactionRow::new(t, &names)).collect();
    if maybe_print_json(sub.get_flag("json"), &data)? {
        return Ok(());
    }
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.date.clone(),
                r.tx_type.clone(),
                format!("{:.2}", r.amount),
                r.from_account.clone(),
                r.to_account.clone(),
                r.category.clone(),
                r.member.clone(),
                r.description.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Type", "Amount", "From", "To", "Category", "Member", "Description"],
            rows,
        )
    );
    Ok(())
}

/// A transaction with its references resolved to names.
#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub amount: rust_decimal::Decimal,
    pub from_account: String,
    pub to_account: String,
    pub category: String,
    pub member: String,
    pub description: String,
}

impl TransactionRow {
    pub fn new(t: &Transaction, names: &Names) -> Self {
        TransactionRow {
            id: t.id,
            date: t.date.to_string(),
            tx_type: t.tx_type.to_string(),
            amount: t.amount,
            from_account: names.account(t.from_account_id),
            to_account: names.account(t.to_account_id),
            category: names.category_of(t),
            member: names.member(t.family_member_id),
            description: opt_text(&t.description),
        }
    }
}

/// Id to name lookups. Ids that no longer resolve show as `#id`.
#[derive(Debug, Default)]
pub struct Names {
    accounts: HashMap<i64, String>,
    categories: HashMap<i64, String>,
    members: HashMap<i64, String>,
}

impl Names {
    pub fn load(conn: &Connection) -> Result<Names> {
        Ok(Names {
            accounts: accounts::list(conn)?.into_iter().map(|a| (a.id, a.name)).collect(),
            categories: categories::list(conn, None)?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect(),
            members: members::list(conn)?.into_iter().map(|m| (m.id, m.name)).collect(),
        })
    }

    fn lookup(map: &HashMap<i64, String>, id: Option<i64>) -> String {
        match id {
            Some(id) => map.get(&id).cloned().unwrap_or_else(|| format!("#{}", id)),
            None => String::new(),
        }
    }

    pub fn account(&self, id: Option<i64>) -> String {
        Self::lookup(&self.accounts, id)
    }

    pub fn member(&self, id: Option<i64>) -> String {
        Self::lookup(&self.members, id)
    }

    pub fn category_of(&self, t: &Transaction) -> String {
        Self::lookup(&self.categories, t.savings_category_id.or(t.expense_category_id))
    }
}
