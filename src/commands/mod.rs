// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod categories;
pub mod config;
pub mod doctor;
pub mod exporter;
pub mod gold;
pub mod members;
pub mod stats;
pub mod transactions;

use anyhow::Result;
use rusqlite::Connection;

/// Routes parsed top-level matches to their handler.
pub fn dispatch(conn: &mut Connection, matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", crate::db::db_path()?.display());
        }
        Some(("account", sub)) => accounts::handle(conn, sub)?,
        Some(("category", sub)) => categories::handle(conn, sub)?,
        Some(("member", sub)) => members::handle(conn, sub)?,
        Some(("tx", sub)) => transactions::handle(conn, sub)?,
        Some(("stats", sub)) => stats::handle(conn, sub)?,
        Some(("gold", sub)) => gold::handle(conn, sub)?,
        Some(("config", sub)) => config::handle(conn, sub)?,
        Some(("export", sub)) => exporter::handle(conn, sub)?,
        Some(("doctor", _)) => doctor::handle(conn)?,
        _ => {
            crate::cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
