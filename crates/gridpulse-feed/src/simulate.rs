//! Demo data fluctuation logic.
//!
//! Simulates live feed ticks against a row collection. Every tick produces a
//! **new** `Vec` with **new** `Arc<Record>` objects for the mutated rows only;
//! unchanged rows keep their pointer identity. The rendering surface relies on
//! that inequality to decide what to flash, so in-place mutation of a shared
//! row must never happen here.

use std::sync::Arc;

use rand::Rng;
use serde_json::Value;

use gridpulse_core::{format_dollar, format_signed_pct, parse_decorated, Record, RowSet};

/// Which fields a tick touches and how hard it shakes them.
#[derive(Debug, Clone)]
pub struct TickProfile {
    /// Dollar-formatted fields (`"$1,234.56"`, `"($456.00)"`).
    pub value_fields: Vec<String>,
    /// Signed percent fields (`"+1.5%"`).
    pub pct_fields: Vec<String>,
    /// Raw numeric fields (risk greeks, volumes).
    pub numeric_fields: Vec<String>,
    /// Upper bound on rows mutated per tick.
    pub max_rows: usize,
    /// (min, max) multiplier for dollar values.
    pub value_jitter: (f64, f64),
    /// (min, max) multiplier for percents.
    pub pct_jitter: (f64, f64),
    /// (min, max) multiplier for raw numerics.
    pub numeric_jitter: (f64, f64),
}

impl Default for TickProfile {
    fn default() -> Self {
        Self {
            value_fields: Vec::new(),
            pct_fields: Vec::new(),
            numeric_fields: Vec::new(),
            max_rows: 3,
            value_jitter: (0.95, 1.05),
            pct_jitter: (0.9, 1.1),
            numeric_jitter: (0.98, 1.02),
        }
    }
}

impl TickProfile {
    pub fn with_value_fields<I: IntoIterator<Item = S>, S: Into<String>>(mut self, f: I) -> Self {
        self.value_fields = f.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pct_fields<I: IntoIterator<Item = S>, S: Into<String>>(mut self, f: I) -> Self {
        self.pct_fields = f.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_numeric_fields<I: IntoIterator<Item = S>, S: Into<String>>(mut self, f: I) -> Self {
        self.numeric_fields = f.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_rows(mut self, n: usize) -> Self {
        self.max_rows = n;
        self
    }
}

/// Apply one simulated tick to a collection.
///
/// Mutates 1..=`max_rows` randomly chosen rows (bounded by collection size)
/// and returns the replacement collection. An empty input comes back empty.
pub fn apply_tick(rows: &[Arc<Record>], profile: &TickProfile, rng: &mut impl Rng) -> RowSet {
    let mut new_list: RowSet = rows.to_vec();
    if new_list.is_empty() {
        return new_list;
    }

    let count = rng.gen_range(1..=profile.max_rows.max(1).min(new_list.len()));
    for _ in 0..count {
        let idx = rng.gen_range(0..new_list.len());
        let mut new_row = Record::clone(&new_list[idx]);

        for field in &profile.value_fields {
            jitter_dollar(&mut new_row, field, profile.value_jitter, rng);
        }
        for field in &profile.pct_fields {
            jitter_pct(&mut new_row, field, profile.pct_jitter, rng);
        }
        for field in &profile.numeric_fields {
            jitter_numeric(&mut new_row, field, profile.numeric_jitter, rng);
        }

        new_list[idx] = Arc::new(new_row);
    }

    new_list
}

fn jitter_dollar(row: &mut Record, field: &str, jitter: (f64, f64), rng: &mut impl Rng) {
    let Some(Value::String(raw)) = row.get(field) else {
        return;
    };
    let Some(val) = parse_decorated(raw) else {
        return;
    };
    let new_val = round2(val * rng.gen_range(jitter.0..=jitter.1));
    row.set(field, Value::String(format_dollar(new_val)));
}

fn jitter_pct(row: &mut Record, field: &str, jitter: (f64, f64), rng: &mut impl Rng) {
    let Some(Value::String(raw)) = row.get(field) else {
        return;
    };
    let Some(val) = parse_decorated(raw) else {
        return;
    };
    let new_val = round2(val * rng.gen_range(jitter.0..=jitter.1));
    row.set(field, Value::String(format_signed_pct(new_val)));
}

fn jitter_numeric(row: &mut Record, field: &str, jitter: (f64, f64), rng: &mut impl Rng) {
    let Some(val) = row.get(field).and_then(Value::as_f64) else {
        return;
    };
    let new_val = round4(val * rng.gen_range(jitter.0..=jitter.1));
    if let Some(num) = serde_json::Number::from_f64(new_val) {
        row.set(field, Value::Number(num));
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
