//! Records, row sets, and dataset wiring.
//!
//! A [`Record`] is an opaque field → value mapping; one field per dataset is
//! designated the identity key (`ticker`, `underlying`, `currency`, `id`, ...)
//! and must stay unique within the dataset's current collection.
//!
//! Rows are shared as `Arc<Record>` and collections as [`RowSet`]. Mutation
//! passes replace the whole `Vec` and allocate new `Arc`s only for rows that
//! actually changed; unchanged rows keep their pointer identity so the
//! rendering surface can flash exactly the changed rows. This copy-on-write
//! contract is mandatory, not an optimization.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::value::display_text;

/// A shared, immutable collection of rows for one dataset.
pub type RowSet = Vec<Arc<Record>>;

// ─────────────────────────────────────────────────────────────────────────────
// Record
// ─────────────────────────────────────────────────────────────────────────────

/// One grid row: an ordered mapping of field name → value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from (field, value) pairs.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut fields = Map::new();
        for (k, v) in pairs {
            fields.insert(k.into(), v);
        }
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field value coerced to display text ("" when absent or null).
    pub fn get_text(&self, field: &str) -> String {
        self.get(field).map(display_text).unwrap_or_default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// The identity key value under `key_field`, if present and non-empty.
    pub fn row_key(&self, key_field: &str) -> Option<String> {
        let key = self.get_text(key_field);
        (!key.is_empty()).then_some(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Case-insensitive substring match against every field's display text.
    pub fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        self.fields
            .values()
            .any(|v| display_text(v).to_lowercase().contains(&query))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dataset wiring
// ─────────────────────────────────────────────────────────────────────────────

/// Identifies one dataset (one grid's backing collection).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Static wiring for one dataset: which grid renders it, where that grid
/// lives in the module/subtab hierarchy, and which field identifies rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSpec {
    pub id: DatasetId,
    pub grid_id: String,
    pub module: String,
    pub subtab: String,
    pub row_key_field: String,
}

impl DatasetSpec {
    pub fn new(
        id: impl Into<String>,
        grid_id: impl Into<String>,
        module: impl Into<String>,
        subtab: impl Into<String>,
        row_key_field: impl Into<String>,
    ) -> Self {
        Self {
            id: DatasetId::new(id),
            grid_id: grid_id.into(),
            module: module.into(),
            subtab: subtab.into(),
            row_key_field: row_key_field.into(),
        }
    }
}
