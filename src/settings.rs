// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::{Result, TabunganError};
use rusqlite::{Connection, OptionalExtension, params};
use std::str::FromStr;

pub const CURRENCY: &str = "currency";
pub const BALANCE_FLOOR: &str = "balance_floor";
pub const GOLD_CACHE_TTL_SECS: &str = "gold_cache_ttl_secs";
pub const GOLD_SYNTHETIC: &str = "gold_synthetic";
pub const RECENT_LIMIT: &str = "recent_limit";

/// Longest accepted gold cache lifetime: 30 days.
pub const MAX_GOLD_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Known keys with their defaults, in display order.
pub const DEFAULTS: &[(&str, &str)] = &[
    (CURRENCY, "IDR"),
    (BALANCE_FLOOR, "zero"),
    (GOLD_CACHE_TTL_SECS, "300"),
    (GOLD_SYNTHETIC, "on"),
    (RECENT_LIMIT, "10"),
];

/// How far a decrement may take an account balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceFloor {
    /// Decrements stop at zero. Clamped legs are not reversible.
    Zero,
    /// Balances may go negative; every effect reverses exactly.
    None,
}

impl FromStr for BalanceFloor {
    type Err = TabunganError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(BalanceFloor::Zero),
            "none" => Ok(BalanceFloor::None),
            other => Err(TabunganError::validation(format!(
                "balance_floor must be 'zero' or 'none', got '{}'",
                other
            ))),
        }
    }
}

fn default_for(key: &str) -> Option<&'static str> {
    DEFAULTS.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

pub fn get_raw(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn get(conn: &Connection, key: &str) -> Result<String> {
    match get_raw(conn, key)? {
        Some(v) => Ok(v),
        None => default_for(key)
            .map(str::to_string)
            .ok_or_else(|| TabunganError::validation(format!("unknown setting '{}'", key))),
    }
}

/// Validates and stores a setting. Unknown keys are rejected.
pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let value = value.trim();
    match key {
        CURRENCY => {
            if value.is_empty() {
                return Err(TabunganError::validation("currency must not be empty"));
            }
        }
        BALANCE_FLOOR => {
            value.parse::<BalanceFloor>()?;
        }
        GOLD_CACHE_TTL_SECS | RECENT_LIMIT => {
            let n = value.parse::<u64>().map_err(|_| {
                TabunganError::validation(format!("{} must be a whole number", key))
            })?;
            if key == GOLD_CACHE_TTL_SECS && n > MAX_GOLD_CACHE_TTL_SECS {
                return Err(TabunganError::validation(format!(
                    "{} must be at most {}",
                    key, MAX_GOLD_CACHE_TTL_SECS
                )));
            }
        }
        GOLD_SYNTHETIC => {
            parse_switch(value)?;
        }
        _ => {
            return Err(TabunganError::validation(format!("unknown setting '{}'", key)));
        }
    }
    let value = if key == CURRENCY {
        value.to_uppercase()
    } else {
        value.to_string()
    };
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn parse_switch(v: &str) -> Result<bool> {
    match v.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(TabunganError::validation(format!(
            "expected on/off, got '{}'",
            other
        ))),
    }
}

pub fn currency(conn: &Connection) -> Result<String> {
    get(conn, CURRENCY)
}

pub fn balance_floor(conn: &Connection) -> Result<BalanceFloor> {
    get(conn, BALANCE_FLOOR)?.parse()
}

pub fn gold_cache_ttl(conn: &Connection) -> Result<chrono::Duration> {
    let raw = get(conn, GOLD_CACHE_TTL_SECS)?;
    let secs = raw
        .parse::<i64>()
        .map_err(|e| TabunganError::InvalidData(format!("{}: {}", GOLD_CACHE_TTL_SECS, e)))?;
    chrono::Duration::try_seconds(secs).ok_or_else(|| {
        TabunganError::InvalidData(format!("{}: '{}' is out of range", GOLD_CACHE_TTL_SECS, raw))
    })
}

pub fn gold_synthetic(conn: &Connection) -> Result<bool> {
    parse_switch(&get(conn, GOLD_SYNTHETIC)?)
}

pub fn recent_limit(conn: &Connection) -> Result<usize> {
    get(conn, RECENT_LIMIT)?
        .parse::<usize>()
        .map_err(|e| TabunganError::InvalidData(format!("{}: {}", RECENT_LIMIT, e)))
}

/// Every known key with its effective value.
pub fn effective(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut out = Vec::with_capacity(DEFAULTS.len());
    for (key, _) in DEFAULTS {
        out.push((key.to_string(), get(conn, key)?));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE settings(key TEXT PRIMARY KEY, value TEXT NOT NULL);")
            .unwrap();
        conn
    }

    #[test]
    fn defaults_apply_until_set() {
        let conn = conn();
        assert_eq!(currency(&conn).unwrap(), "IDR");
        assert_eq!(balance_floor(&conn).unwrap(), BalanceFloor::Zero);
        assert_eq!(gold_cache_ttl(&conn).unwrap(), chrono::Duration::minutes(5));

        set(&conn, BALANCE_FLOOR, " none ").unwrap();
        set(&conn, CURRENCY, "usd").unwrap();
        assert_eq!(balance_floor(&conn).unwrap(), BalanceFloor::None);
        assert_eq!(currency(&conn).unwrap(), "USD");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        let conn = conn();
        assert!(matches!(
            set(&conn, "colour", "red"),
            Err(TabunganError::Validation(_))
        ));
        assert!(set(&conn, BALANCE_FLOOR, "negative").is_err());
        assert!(set(&conn, RECENT_LIMIT, "-3").is_err());
        assert!(set(&conn, GOLD_SYNTHETIC, "maybe").is_err());
        assert_eq!(get_raw(&conn, BALANCE_FLOOR).unwrap(), None);
    }

    #[test]
    fn oversized_gold_ttl_is_an_error_not_a_panic() {
        let conn = conn();
        assert!(matches!(
            set(&conn, GOLD_CACHE_TTL_SECS, "99999999999999999"),
            Err(TabunganError::Validation(_))
        ));
        set(&conn, GOLD_CACHE_TTL_SECS, &MAX_GOLD_CACHE_TTL_SECS.to_string()).unwrap();
        assert_eq!(
            gold_cache_ttl(&conn).unwrap(),
            chrono::Duration::days(30)
        );

        // a value written behind set's back
        conn.execute(
            "INSERT INTO settings(key, value) VALUES(?1, '99999999999999999')
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![GOLD_CACHE_TTL_SECS],
        )
        .unwrap();
        assert!(matches!(
            gold_cache_ttl(&conn),
            Err(TabunganError::InvalidData(_))
        ));
    }
}
