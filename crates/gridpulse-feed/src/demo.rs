//! Demo feed — deterministic stand-in for the real market-data backend.
//!
//! Serves a fixed universe of instruments per dataset, re-jittered on every
//! fetch so a force refresh visibly changes the grid. Seedable so tests get
//! reproducible collections.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use gridpulse_core::prelude::*;
use gridpulse_core::{format_dollar, format_signed_pct, DatasetId, Record, RowSet};

use crate::service::DataService;
use crate::simulate::{apply_tick, TickProfile};

const TICKERS: &[(&str, &str)] = &[
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corp."),
    ("GOOGL", "Alphabet Inc."),
    ("AMZN", "Amazon.com Inc."),
    ("TSLA", "Tesla Inc."),
    ("NVDA", "NVIDIA Corp."),
    ("META", "Meta Platforms Inc."),
    ("JPM", "JPMorgan Chase & Co."),
    ("GS", "Goldman Sachs Group"),
    ("BAC", "Bank of America Corp."),
    ("XOM", "Exxon Mobil Corp."),
    ("CVX", "Chevron Corp."),
];

const CURRENCY_PAIRS: &[&str] = &[
    "EUR/USD", "USD/JPY", "GBP/USD", "USD/CHF", "AUD/USD", "USD/CAD", "NZD/USD", "EUR/GBP",
];

/// Seedable demo implementation of [`DataService`].
pub struct DemoFeed {
    base: HashMap<DatasetId, RowSet>,
    rng: Mutex<StdRng>,
    /// Simulated network latency per fetch (0 in tests).
    latency: Duration,
}

impl DemoFeed {
    pub fn new() -> Self {
        Self::seeded(rand::random())
    }

    pub fn seeded(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut base = HashMap::new();
        base.insert(DatasetId::new("market_data"), market_data_rows(&mut rng));
        base.insert(DatasetId::new("fx_data"), fx_rows(&mut rng));
        base.insert(DatasetId::new("positions"), position_rows(&mut rng));
        base.insert(DatasetId::new("pnl_change"), pnl_change_rows(&mut rng));
        base.insert(DatasetId::new("risk_measures"), risk_rows(&mut rng));
        Self {
            base,
            rng: Mutex::new(rng),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn datasets(&self) -> impl Iterator<Item = &DatasetId> {
        self.base.keys()
    }
}

impl Default for DemoFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl DataService for DemoFeed {
    async fn fetch_all(&self, dataset: &DatasetId) -> Result<RowSet> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let rows = self
            .base
            .get(dataset)
            .ok_or_else(|| Error::unknown_dataset(dataset.as_str()))?;

        // Shake the base universe so repeated fetches return fresh values.
        let profile = TickProfile::default()
            .with_value_fields(["notional", "pnl_1d", "pnl_ytd"])
            .with_pct_fields(["chg_pct"])
            .with_numeric_fields(["last_price", "volume", "delta", "gamma", "vega", "rate"])
            .with_max_rows(rows.len().max(1));
        let mut rng = self.rng.lock().expect("demo feed rng poisoned");
        let refreshed = apply_tick(rows, &profile, &mut *rng);

        debug!(dataset = %dataset, rows = refreshed.len(), "demo feed fetch");
        Ok(refreshed)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Base row generators
// ─────────────────────────────────────────────────────────────────────────────

fn market_data_rows(rng: &mut StdRng) -> RowSet {
    TICKERS
        .iter()
        .map(|(ticker, description)| {
            let price = rng.gen_range(40.0..900.0);
            Arc::new(Record::from_pairs([
                ("ticker", json!(ticker)),
                ("description", json!(description)),
                ("last_price", json!(round2(price))),
                ("chg_pct", json!(format_signed_pct(rng.gen_range(-3.0..3.0)))),
                ("volume", json!(rng.gen_range(100_000..8_000_000))),
            ]))
        })
        .collect()
}

fn fx_rows(rng: &mut StdRng) -> RowSet {
    CURRENCY_PAIRS
        .iter()
        .map(|pair| {
            Arc::new(Record::from_pairs([
                ("ticker", json!(pair)),
                ("rate", json!(round4(rng.gen_range(0.5..160.0)))),
                ("chg_pct", json!(format_signed_pct(rng.gen_range(-1.0..1.0)))),
            ]))
        })
        .collect()
}

fn position_rows(rng: &mut StdRng) -> RowSet {
    TICKERS
        .iter()
        .map(|(ticker, description)| {
            let qty: i64 = rng.gen_range(-20_000..20_000);
            let notional = qty as f64 * rng.gen_range(20.0..400.0);
            Arc::new(Record::from_pairs([
                ("ticker", json!(ticker)),
                ("description", json!(description)),
                ("quantity", json!(qty)),
                ("notional", json!(format_dollar(round2(notional)))),
            ]))
        })
        .collect()
}

fn pnl_change_rows(rng: &mut StdRng) -> RowSet {
    TICKERS
        .iter()
        .map(|(ticker, _)| {
            Arc::new(Record::from_pairs([
                ("ticker", json!(ticker)),
                ("pnl_1d", json!(format_dollar(round2(rng.gen_range(-50_000.0..50_000.0))))),
                ("pnl_ytd", json!(format_dollar(round2(rng.gen_range(-500_000.0..500_000.0))))),
                ("chg_pct", json!(format_signed_pct(rng.gen_range(-5.0..5.0)))),
            ]))
        })
        .collect()
}

fn risk_rows(rng: &mut StdRng) -> RowSet {
    TICKERS
        .iter()
        .map(|(ticker, _)| {
            Arc::new(Record::from_pairs([
                ("ticker", json!(ticker)),
                ("delta", json!(round4(rng.gen_range(-1.0..1.0)))),
                ("gamma", json!(round4(rng.gen_range(0.0..0.2)))),
                ("vega", json!(round4(rng.gen_range(0.0..50.0)))),
            ]))
        })
        .collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
