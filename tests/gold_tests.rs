// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tabungan::db;
use tabungan::errors::{Result, TabunganError};
use tabungan::gold::{GoldOracle, GoldQuote, QuoteCache, QuoteSource, SqliteQuoteCache, Tier};
use tabungan::models::StorageAccount;
use tabungan::registry::accounts::{self, AccountInput};

struct Offline;

impl QuoteSource for Offline {
    fn spot_usd_per_ounce(&self) -> Result<Decimal> {
        Err(TabunganError::ExternalService("offline".into()))
    }

    fn usd_rate(&self, _currency: &str) -> Result<Decimal> {
        Err(TabunganError::ExternalService("offline".into()))
    }
}

struct Fixed;

impl QuoteSource for Fixed {
    fn spot_usd_per_ounce(&self) -> Result<Decimal> {
        Ok(Decimal::from(2_000))
    }

    fn usd_rate(&self, _currency: &str) -> Result<Decimal> {
        Ok(Decimal::from(16_000))
    }
}

#[test]
fn sqlite_cache_is_shared_between_oracles() {
    let conn = db::open_in_memory().unwrap();
    let now = Utc::now();

    let mut first = GoldOracle::new(Fixed, SqliteQuoteCache::new(&conn, Duration::minutes(5)), "IDR");
    let live = first.price_per_gram(now);
    assert_eq!(live.tier, Tier::Live);
    assert!(!live.cached);

    let mut second =
        GoldOracle::new(Offline, SqliteQuoteCache::new(&conn, Duration::minutes(5)), "IDR");
    let cached = second.price_per_gram(now + Duration::minutes(1));
    assert_eq!(cached.tier, Tier::Cache);
    assert!(cached.cached);
    assert_eq!(cached.price_per_gram, live.price_per_gram);

    let later = second
        .without_synthetic()
        .price_per_gram(now + Duration::minutes(10));
    assert_eq!(later.tier, Tier::Default);
    assert_eq!(later.price_per_gram, Decimal::from(1_150_000));
}

#[test]
fn clearing_the_cache_forces_a_refresh() {
    let conn = db::open_in_memory().unwrap();
    let mut cache = SqliteQuoteCache::new(&conn, Duration::minutes(5));
    let mut oracle = GoldOracle::new(Offline, SqliteQuoteCache::new(&conn, Duration::minutes(5)), "IDR")
        .with_jitter(|| 3_000);
    let now = Utc::now();
    let first = oracle.price_per_gram(now);
    assert_eq!(first.tier, Tier::Synthetic);
    assert_eq!(first.price_per_gram, Decimal::from(1_153_000));

    cache.clear().unwrap();
    assert!(cache.last().is_none());
}

#[test]
fn gold_account_valued_by_weight() {
    let conn = db::open_in_memory().unwrap();
    let a: StorageAccount = accounts::add(
        &conn,
        &AccountInput::named("Antam").gold(Decimal::new(25, 1)),
    )
    .unwrap();
    assert_eq!(a.valuation(Decimal::from(1_000_000)), Decimal::from(2_500_000));
}

#[test]
fn out_of_range_ttl_in_database_still_yields_a_price() {
    let conn = db::open_in_memory().unwrap();
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('gold_cache_ttl_secs', '99999999999999999')",
        [],
    )
    .unwrap();
    let mut cache = SqliteQuoteCache::new(&conn, Duration::minutes(5));
    cache
        .put(GoldQuote {
            price_per_gram: Decimal::from(1_200_000),
            currency: "IDR".into(),
            fetched_at: Utc::now(),
        })
        .unwrap();

    let report = tabungan::commands::gold::current_price(&conn);
    assert_eq!(report.tier, Tier::Cache);
    assert_eq!(report.price_per_gram, Decimal::from(1_200_000));
}

#[test]
fn offline_oracle_for_usd_labels_fallback_as_idr() {
    let conn = db::open_in_memory().unwrap();
    let mut oracle =
        GoldOracle::new(Offline, SqliteQuoteCache::new(&conn, Duration::minutes(5)), "USD")
            .without_synthetic();
    let report = oracle.price_per_gram(Utc::now());
    assert_eq!(report.tier, Tier::Default);
    assert_eq!(report.currency, "IDR");
    assert!(report.note.unwrap().contains("IDR"));

    let cached = SqliteQuoteCache::new(&conn, Duration::minutes(5)).last().unwrap();
    assert_eq!(cached.currency, "IDR");
}
