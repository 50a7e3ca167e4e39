// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::settings;
use crate::stats::{CategoryTotal, Period, statistics_or_empty};
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let period = match m.get_one::<String>("month") {
        Some(month) => Period::month(month)?,
        None => Period::between(
            m.get_one::<String>("since").map(|s| parse_date(s)).transpose()?,
            m.get_one::<String>("until").map(|s| parse_date(s)).transpose()?,
        )?,
    };
    let mut stats = statistics_or_empty(conn, period);
    if m.get_flag("nonzero") {
        stats = stats.non_zero();
    }
    if maybe_print_json(m.get_flag("json"), &stats)? {
        return Ok(());
    }

    let ccy = settings::currency(conn)?;
    let t = &stats.totals;
    println!(
        "{}",
        pretty_table(
            &["Income", "Expenses", "Savings", "Net", "Transactions"],
            vec![vec![
                fmt_money(&t.income, &ccy),
                fmt_money(&t.expenses, &ccy),
                fmt_money(&t.savings, &ccy),
                fmt_money(&t.net, &ccy),
                stats.count.to_string(),
            ]],
        )
    );
    if !stats.savings_by_category.is_empty() {
        println!("Savings by category");
        println!("{}", category_table(&stats.savings_by_category, &ccy, "Target"));
    }
    if !stats.expenses_by_category.is_empty() {
        println!("Expenses by category");
        println!("{}", category_table(&stats.expenses_by_category, &ccy, "Budget"));
    }
    if !stats.by_member.is_empty() {
        let rows = stats
            .by_member
            .iter()
            .map(|mt| {
                vec![
                    mt.name.clone(),
                    mt.role.clone(),
                    fmt_money(&mt.income, &ccy),
                    fmt_money(&mt.savings, &ccy),
                ]
            })
            .collect();
        println!("By member");
        println!("{}", pretty_table(&["Member", "Role", "Income", "Savings"], rows));
    }
    if !stats.recent.is_empty() {
        let rows = stats
            .recent
            .iter()
            .map(|tx| {
                vec![
                    tx.id.to_string(),
                    tx.date.to_string(),
                    tx.tx_type.to_string(),
                    fmt_money(&tx.amount, &ccy),
                    tx.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!("Recent");
        println!("{}", pretty_table(&["ID", "Date", "Type", "Amount", "Description"], rows));
    }
    Ok(())
}

fn category_table(list: &[CategoryTotal], ccy: &str, target_header: &str) -> comfy_table::Table {
    let rows = list
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                fmt_money(&c.amount, ccy),
                c.target.map(|t| fmt_money(&t, ccy)).unwrap_or_default(),
                c.progress().map(|p| format!("{}%", p)).unwrap_or_default(),
            ]
        })
        .collect();
    pretty_table(&["Category", "Amount", target_header, "Progress"], rows)
}
