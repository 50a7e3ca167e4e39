// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::transactions::{Names, TransactionRow};
use crate::ledger::{TxFilter, list_transactions};
use anyhow::{Result, bail};
use rusqlite::Connection;
use std::path::Path;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
            let out = sub.get_one::<String>("out").unwrap();
            let n = export_transactions(conn, &fmt, Path::new(out))?;
            println!("Exported {} transactions to {}", n, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Writes every transaction, oldest first, with names resolved. Returns the
/// number of rows written.
pub fn export_transactions(conn: &Connection, fmt: &str, out: &Path) -> Result<usize> {
    let mut txs = list_transactions(conn, &TxFilter::default())?;
    txs.reverse();
    let names = Names::load(conn)?;
    let rows: Vec<TransactionRow> = txs.iter().map(|t| TransactionRow::new(t, &names)).collect();

    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    tracing::info!(rows = rows.len(), path = %out.display(), "exported transactions");
    Ok(rows.len())
}
