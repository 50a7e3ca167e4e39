// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::CategoryKind;
use crate::registry::{accounts, categories, members};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::Connection;
use rust_decimal::Decimal;

const UA: &str = concat!("tabungan/", env!("CARGO_PKG_VERSION"));

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Commas and underscores are read as thousands separators and dropped;
/// the decimal mark is always `.`.
pub fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned: String = s.trim().chars().filter(|c| *c != '_' && *c != ',').collect();
    cleaned
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d <= Decimal::ZERO {
        return Err(anyhow!("Amount must be positive, got '{}'", s));
    }
    Ok(d)
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {}", ccy, d.round_dp(2))
}

pub fn opt_text(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}

/// Resolves an account given as numeric id or exact name.
pub fn account_ref(conn: &Connection, s: &str) -> Result<i64> {
    let s = s.trim();
    if let Ok(id) = s.parse::<i64>() {
        return Ok(id);
    }
    accounts::find_by_name(conn, s)?
        .map(|a| a.id)
        .with_context(|| format!("Storage account '{}' not found", s))
}

pub fn category_ref(conn: &Connection, kind: CategoryKind, s: &str) -> Result<i64> {
    let s = s.trim();
    if let Ok(id) = s.parse::<i64>() {
        return Ok(id);
    }
    categories::find_by_name(conn, kind, s)?
        .map(|c| c.id)
        .with_context(|| format!("{} '{}' not found", kind.entity(), s))
}

pub fn member_ref(conn: &Connection, s: &str) -> Result<i64> {
    let s = s.trim();
    if let Ok(id) = s.parse::<i64>() {
        return Ok(id);
    }
    members::find_by_name(conn, s)?
        .map(|m| m.id)
        .with_context(|| format!("Family member '{}' not found", s))
}

/// Reads an optional string argument and resolves it with `f`.
pub fn opt_ref<F>(m: &clap::ArgMatches, id: &str, f: F) -> Result<Option<i64>>
where
    F: FnOnce(&str) -> Result<i64>,
{
    match m.get_one::<String>(id).map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(s) => Ok(Some(f(s)?)),
        None => Ok(None),
    }
}
