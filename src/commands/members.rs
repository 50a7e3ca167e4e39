// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::registry::members;
use crate::utils::{maybe_print_json, member_ref, opt_text, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let role = sub.get_one::<String>("role").map(String::as_str).unwrap_or("");
            let avatar = sub.get_one::<String>("avatar").map(String::as_str);
            let member = members::add(conn, name, role, avatar)?;
            println!("Added family member '{}' (id {})", member.name, member.id);
        }
        Some(("edit", sub)) => {
            let id = member_ref(conn, sub.get_one::<String>("MEMBER").unwrap())?;
            let current = members::get(conn, id)?;
            let name = sub.get_one::<String>("name").unwrap_or(&current.name);
            let role = sub.get_one::<String>("role").unwrap_or(&current.role);
            let avatar = sub
                .get_one::<String>("avatar")
                .or(current.avatar.as_ref())
                .map(String::as_str);
            let member = members::edit(conn, id, name, role, avatar)?;
            println!("Updated family member '{}' (id {})", member.name, member.id);
        }
        Some(("rm", sub)) => {
            let id = member_ref(conn, sub.get_one::<String>("MEMBER").unwrap())?;
            members::remove(conn, id)?;
            println!("Removed family member {}", id);
        }
        Some(("list", sub)) => {
            let list = members::list(conn)?;
            if maybe_print_json(sub.get_flag("json"), &list)? {
                return Ok(());
            }
            let data = list
                .iter()
                .map(|m| {
                    vec![
                        m.id.to_string(),
                        m.name.clone(),
                        m.role.clone(),
                        opt_text(&m.avatar),
                    ]
                })
                .collect();
            println!("{}", pretty_table(&["ID", "Name", "Role", "Avatar"], data));
        }
        _ => {}
    }
    Ok(())
}
