// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Gold price per gram in the display currency.
//!
//! [`GoldOracle::price_per_gram`] never fails. It walks down the tiers
//! fresh cache, live spot quote, synthetic estimate and fixed default, and
//! on an unexpected error serves the last cached quote of any age.

use crate::errors::{Result, TabunganError};
use crate::models::decimal_at;
use crate::utils::http_client;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

pub const SPOT_URL: &str = "https://api.gold-api.com/price/XAU";
pub const USD_RATES_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

/// Synthetic estimates wander this far either side of the base price.
pub const JITTER_RANGE: i64 = 10_000;
pub const BASE_PRICE_IDR: i64 = 1_150_000;
pub const DEFAULT_PRICE_IDR: i64 = 1_150_000;
/// Currency of the synthetic and default prices, whatever the oracle targets.
pub const FALLBACK_CURRENCY: &str = "IDR";
/// Used when the exchange-rate response has no IDR entry.
pub const FALLBACK_USD_IDR: i64 = 15_500;

pub fn troy_ounce_grams() -> Decimal {
    Decimal::new(311_035, 4)
}

pub fn default_ttl() -> Duration {
    Duration::minutes(5)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldQuote {
    pub price_per_gram: Decimal,
    pub currency: String,
    pub fetched_at: DateTime<Utc>,
}

/// Which fallback step produced a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Cache,
    Live,
    Synthetic,
    Default,
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceReport {
    pub price_per_gram: Decimal,
    pub currency: String,
    pub cached: bool,
    pub last_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub tier: Tier,
}

pub trait QuoteCache {
    /// The cached quote if it is younger than the TTL at `now`.
    fn get(&self, now: DateTime<Utc>) -> Option<GoldQuote>;
    /// The cached quote regardless of age.
    fn last(&self) -> Option<GoldQuote>;
    fn put(&mut self, quote: GoldQuote) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

fn is_fresh(quote: &GoldQuote, now: DateTime<Utc>, ttl: Duration) -> bool {
    now.signed_duration_since(quote.fetched_at) < ttl
}

/// Process-local cache; gone when the process exits.
#[derive(Debug, Clone)]
pub struct MemoryQuoteCache {
    ttl: Duration,
    quote: Option<GoldQuote>,
}

impl MemoryQuoteCache {
    pub fn new(ttl: Duration) -> Self {
        MemoryQuoteCache { ttl, quote: None }
    }
}

impl Default for MemoryQuoteCache {
    fn default() -> Self {
        MemoryQuoteCache::new(default_ttl())
    }
}

impl QuoteCache for MemoryQuoteCache {
    fn get(&self, now: DateTime<Utc>) -> Option<GoldQuote> {
        self.quote
            .as_ref()
            .filter(|q| is_fresh(q, now, self.ttl))
            .cloned()
    }

    fn last(&self) -> Option<GoldQuote> {
        self.quote.clone()
    }

    fn put(&mut self, quote: GoldQuote) -> Result<()> {
        self.quote = Some(quote);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.quote = None;
        Ok(())
    }
}

/// Keeps the last quote in `gold_quotes` so separate CLI runs share it.
pub struct SqliteQuoteCache<'c> {
    conn: &'c Connection,
    ttl: Duration,
}

impl<'c> SqliteQuoteCache<'c> {
    pub fn new(conn: &'c Connection, ttl: Duration) -> Self {
        SqliteQuoteCache { conn, ttl }
    }

    fn load(&self) -> Result<Option<GoldQuote>> {
        let q = self
            .conn
            .query_row(
                "SELECT price, currency, fetched_at FROM gold_quotes WHERE id=1",
                [],
                |r| {
                    Ok(GoldQuote {
                        price_per_gram: decimal_at(r, 0)?,
                        currency: r.get(1)?,
                        fetched_at: r.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(q)
    }
}

impl QuoteCache for SqliteQuoteCache<'_> {
    fn get(&self, now: DateTime<Utc>) -> Option<GoldQuote> {
        self.last().filter(|q| is_fresh(q, now, self.ttl))
    }

    fn last(&self) -> Option<GoldQuote> {
        self.load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "reading cached gold quote failed");
            None
        })
    }

    fn put(&mut self, quote: GoldQuote) -> Result<()> {
        self.conn.execute(
            "INSERT INTO gold_quotes(id, price, currency, fetched_at) VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET price=excluded.price, currency=excluded.currency,
                 fetched_at=excluded.fetched_at",
            params![quote.price_per_gram.to_string(), quote.currency, quote.fetched_at],
        )?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM gold_quotes", [])?;
        Ok(())
    }
}

/// Upstream market data.
pub trait QuoteSource {
    /// International spot price, USD per troy ounce.
    fn spot_usd_per_ounce(&self) -> Result<Decimal>;
    /// Units of `currency` per USD.
    fn usd_rate(&self, currency: &str) -> Result<Decimal>;
}

#[derive(Debug, Deserialize)]
struct SpotResponse {
    price: f64,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: std::collections::HashMap<String, f64>,
}

pub struct HttpQuoteSource {
    client: Option<reqwest::blocking::Client>,
}

impl HttpQuoteSource {
    /// A source whose client failed to build reports every lookup as an
    /// external failure.
    pub fn new() -> Self {
        let client = http_client()
            .inspect_err(|err| tracing::warn!(error = %err, "http client unavailable"))
            .ok();
        HttpQuoteSource { client }
    }

    fn client(&self) -> Result<&reqwest::blocking::Client> {
        self.client
            .as_ref()
            .ok_or_else(|| TabunganError::ExternalService("http client unavailable".into()))
    }
}

impl Default for HttpQuoteSource {
    fn default() -> Self {
        HttpQuoteSource::new()
    }
}

fn positive(v: f64, what: &str) -> Result<Decimal> {
    Decimal::from_f64(v)
        .filter(|d| *d > Decimal::ZERO)
        .ok_or_else(|| TabunganError::ExternalService(format!("unusable {} '{}'", what, v)))
}

impl QuoteSource for HttpQuoteSource {
    fn spot_usd_per_ounce(&self) -> Result<Decimal> {
        let resp = self.client()?.get(SPOT_URL).send()?.error_for_status()?;
        let body: SpotResponse = resp.json()?;
        positive(body.price, "spot price")
    }

    fn usd_rate(&self, currency: &str) -> Result<Decimal> {
        if currency.eq_ignore_ascii_case("USD") {
            return Ok(Decimal::ONE);
        }
        let resp = self.client()?.get(USD_RATES_URL).send()?.error_for_status()?;
        let body: RatesResponse = resp.json()?;
        match body.rates.get(&currency.to_uppercase()) {
            Some(rate) => positive(*rate, "exchange rate"),
            None if currency.eq_ignore_ascii_case("IDR") => Ok(Decimal::from(FALLBACK_USD_IDR)),
            None => Err(TabunganError::ExternalService(format!(
                "no USD/{} rate available",
                currency
            ))),
        }
    }
}

type Jitter = Box<dyn FnMut() -> i64>;

fn random_jitter() -> i64 {
    rand::thread_rng().gen_range(-JITTER_RANGE..=JITTER_RANGE)
}

pub struct GoldOracle<S, C> {
    source: S,
    cache: C,
    currency: String,
    jitter: Option<Jitter>,
}

impl<S: QuoteSource, C: QuoteCache> GoldOracle<S, C> {
    pub fn new(source: S, cache: C, currency: impl Into<String>) -> Self {
        GoldOracle {
            source,
            cache,
            currency: currency.into().to_uppercase(),
            jitter: Some(Box::new(random_jitter)),
        }
    }

    /// Replaces the random offset used by synthetic estimates. Values are
    /// clamped to the jitter range.
    pub fn with_jitter(mut self, jitter: impl FnMut() -> i64 + 'static) -> Self {
        self.jitter = Some(Box::new(jitter));
        self
    }

    /// Skips the synthetic tier, going straight to the fixed default.
    pub fn without_synthetic(mut self) -> Self {
        self.jitter = None;
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn price_per_gram(&mut self, now: DateTime<Utc>) -> PriceReport {
        match self.resolve(now) {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!(error = %err, "gold price lookup failed, serving fallback");
                self.stale(now)
            }
        }
    }

    fn resolve(&mut self, now: DateTime<Utc>) -> Result<PriceReport> {
        if let Some(q) = self.cache.get(now).filter(|q| q.currency == self.currency) {
            return Ok(PriceReport {
                price_per_gram: q.price_per_gram,
                currency: q.currency,
                cached: true,
                last_updated: q.fetched_at,
                note: None,
                error: None,
                tier: Tier::Cache,
            });
        }

        let (price, tier) = match self.live() {
            Ok(p) => (p, Tier::Live),
            Err(err) => {
                tracing::warn!(error = %err, "live gold quote unavailable");
                match self.synthetic() {
                    Some(p) => (p, Tier::Synthetic),
                    None => {
                        tracing::warn!("synthetic gold estimate disabled, using default price");
                        (Decimal::from(DEFAULT_PRICE_IDR), Tier::Default)
                    }
                }
            }
        };

        let currency = match tier {
            Tier::Live => self.currency.clone(),
            _ => FALLBACK_CURRENCY.to_string(),
        };
        self.cache.put(GoldQuote {
            price_per_gram: price,
            currency: currency.clone(),
            fetched_at: now,
        })?;

        let note = match tier {
            Tier::Live => "estimate from international spot price",
            Tier::Synthetic => "synthetic estimate around the typical IDR price",
            _ => "fixed default price in IDR",
        };
        Ok(PriceReport {
            price_per_gram: price,
            currency,
            cached: false,
            last_updated: now,
            note: Some(note.to_string()),
            error: None,
            tier,
        })
    }

    fn live(&self) -> Result<Decimal> {
        let spot = self.source.spot_usd_per_ounce()?;
        let rate = self.source.usd_rate(&self.currency)?;
        Ok((spot * rate / troy_ounce_grams()).round_dp(2))
    }

    fn synthetic(&mut self) -> Option<Decimal> {
        let jitter = self.jitter.as_mut()?;
        let offset = jitter().clamp(-JITTER_RANGE, JITTER_RANGE);
        Some(Decimal::from(BASE_PRICE_IDR + offset))
    }

    fn stale(&self, now: DateTime<Utc>) -> PriceReport {
        let error = Some("using fallback price".to_string());
        match self.cache.last() {
            Some(q) => PriceReport {
                price_per_gram: q.price_per_gram,
                currency: q.currency,
                cached: true,
                last_updated: q.fetched_at,
                note: None,
                error,
                tier: Tier::Stale,
            },
            None => PriceReport {
                price_per_gram: Decimal::from(DEFAULT_PRICE_IDR),
                currency: FALLBACK_CURRENCY.to_string(),
                cached: true,
                last_updated: now,
                note: None,
                error,
                tier: Tier::Default,
            },
        }
    }
}
