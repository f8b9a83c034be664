//! Module/subtab → URL path mapping.
//!
//! NavigationRouter encodes routes into the cross-page handoff, so the
//! mapping must be deterministic and stable: lowercase the name, collapse
//! every run of non-alphanumeric characters to a single hyphen.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

fn non_alnum() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap())
}

/// Lowercase-hyphenate a module or subtab name.
///
/// `"Market Data"` → `"market-data"`, `"Trade Summary (War/Bond)"` →
/// `"trade-summary-war-bond"`.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let slug = non_alnum().replace_all(&lowered, "-");
    slug.trim_matches('-').to_string()
}

/// A resolved route path, e.g. `/market-data/fx-data`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(String);

impl Route {
    /// Route for a module/subtab pair.
    pub fn for_target(module: &str, subtab: &str) -> Route {
        Route(format!("/{}/{}", slugify(module), slugify(subtab)))
    }

    pub fn from_path(path: impl Into<String>) -> Route {
        Route(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Route {
    fn default() -> Self {
        Route("/".to_string())
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
