// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::settings;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let rows = settings::effective(conn)?
                .into_iter()
                .map(|(k, v)| vec![k, v])
                .collect();
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("KEY").unwrap();
            let value = sub.get_one::<String>("VALUE").unwrap();
            settings::set(conn, key, value)?;
            println!("{} = {}", key, settings::get(conn, key)?);
        }
        _ => {}
    }
    Ok(())
}
