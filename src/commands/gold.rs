// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::gold::{GoldOracle, HttpQuoteSource, PriceReport, QuoteCache, SqliteQuoteCache, default_ttl};
use crate::settings;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("price", sub)) => {
            let report = current_price(conn);
            if !maybe_print_json(sub.get_flag("json"), &report)? {
                print_report(&report);
            }
        }
        Some(("clear-cache", _)) => {
            SqliteQuoteCache::new(conn, default_ttl()).clear()?;
            println!("Gold price cache cleared");
        }
        _ => {}
    }
    Ok(())
}

/// Builds the oracle from settings and asks it for a price. Unreadable
/// settings fall back to their defaults; this never fails.
pub fn current_price(conn: &Connection) -> PriceReport {
    let currency = settings::currency(conn).unwrap_or_else(|_| "IDR".to_string());
    let ttl = settings::gold_cache_ttl(conn).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "unusable gold cache ttl, using default");
        default_ttl()
    });
    let synthetic = settings::gold_synthetic(conn).unwrap_or(true);

    let oracle = GoldOracle::new(
        HttpQuoteSource::new(),
        SqliteQuoteCache::new(conn, ttl),
        currency,
    );
    let mut oracle = if synthetic {
        oracle
    } else {
        oracle.without_synthetic()
    };
    oracle.price_per_gram(Utc::now())
}

fn print_report(r: &PriceReport) {
    let mut rows = vec![
        vec!["Price per gram".to_string(), fmt_money(&r.price_per_gram, &r.currency)],
        vec!["Source".to_string(), format!("{:?}", r.tier).to_lowercase()],
        vec!["Cached".to_string(), r.cached.to_string()],
        vec!["Last updated".to_string(), r.last_updated.to_rfc3339()],
    ];
    if let Some(note) = &r.note {
        rows.push(vec!["Note".to_string(), note.clone()]);
    }
    if let Some(err) = &r.error {
        rows.push(vec!["Error".to_string(), err.clone()]);
    }
    println!("{}", pretty_table(&["Gold", ""], rows));
}
