// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, CategoryKind};
use crate::registry::categories::{self, CategoryInput};
use crate::registry::clean;
use crate::settings;
use crate::utils::{account_ref, category_ref, fmt_money, maybe_print_json, opt_text, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

fn kind_arg(sub: &clap::ArgMatches) -> Option<CategoryKind> {
    sub.get_one::<String>("kind").and_then(|s| s.parse().ok())
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let kind = kind_arg(sub).unwrap_or(CategoryKind::Expense);
            let name = sub.get_one::<String>("name").unwrap();
            let input = overlay(conn, CategoryInput::new(kind, name), sub)?;
            let c = categories::add(conn, &input)?;
            println!("Added {} '{}' (id {})", kind.entity(), c.name, c.id);
        }
        Some(("edit", sub)) => {
            let kind = kind_arg(sub).unwrap_or(CategoryKind::Expense);
            let id = category_ref(conn, kind, sub.get_one::<String>("CATEGORY").unwrap())?;
            let current = categories::get(conn, id)?;
            let input = overlay(conn, input_from(&current, kind), sub)?;
            let c = categories::edit(conn, id, &input)?;
            println!("Updated {} '{}' (id {})", kind.entity(), c.name, c.id);
        }
        Some(("rm", sub)) => {
            let kind = kind_arg(sub).unwrap_or(CategoryKind::Expense);
            let id = category_ref(conn, kind, sub.get_one::<String>("CATEGORY").unwrap())?;
            categories::remove(conn, kind, id)?;
            println!("Removed {} {}", kind.entity(), id);
        }
        Some(("list", sub)) => {
            let list = categories::list(conn, kind_arg(sub))?;
            if maybe_print_json(sub.get_flag("json"), &list)? {
                return Ok(());
            }
            let ccy = settings::currency(conn)?;
            let data = list
                .iter()
                .map(|c| {
                    vec![
                        c.id.to_string(),
                        c.kind.as_str().to_string(),
                        c.name.clone(),
                        c.target.map(|t| fmt_money(&t, &ccy)).unwrap_or_default(),
                        c.storage_account_id.map(|a| a.to_string()).unwrap_or_default(),
                        opt_text(&c.description),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["ID", "Kind", "Name", "Target", "Account", "Description"], data)
            );
        }
        _ => {}
    }
    Ok(())
}

// --kind is kept as given so an id of the other kind is rejected on edit.
fn input_from(c: &Category, kind: CategoryKind) -> CategoryInput {
    CategoryInput {
        kind,
        name: c.name.clone(),
        description: c.description.clone(),
        icon: c.icon.clone(),
        color: c.color.clone(),
        target: c.target,
        storage_account_id: c.storage_account_id,
    }
}

fn overlay(conn: &Connection, mut base: CategoryInput, sub: &clap::ArgMatches) -> Result<CategoryInput> {
    if let Some(name) = sub.get_one::<String>("name") {
        base.name = name.trim().to_string();
    }
    if let Some(t) = sub.get_one::<String>("target") {
        base.target = Some(parse_decimal(t)?);
    }
    if let Some(a) = sub.get_one::<String>("account") {
        base.storage_account_id = match a.trim() {
            "" | "none" => None,
            s => Some(account_ref(conn, s)?),
        };
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
    Ok(base)
}
