//! Notification records and the ingestion payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::route::Route;

/// Notification severity/category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Alert,
    #[default]
    Info,
    Warning,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Alert => write!(f, "alert"),
            NotificationKind::Info => write!(f, "info"),
            NotificationKind::Warning => write!(f, "warning"),
        }
    }
}

/// A stored notification.
///
/// `id` is unique and monotonically assigned by the store. The navigation
/// metadata (`module`, `subtab`, `grid_id`, `row_key`) is enough to route to
/// the owning page and locate the target row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub header: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,

    // Navigation metadata
    pub module: String,
    pub subtab: String,
    pub grid_id: String,
    pub row_key: String,
    /// Field matched against `row_key` when identity lookup misses.
    /// None defers to the target grid's configured key field.
    pub row_key_field: Option<String>,
}

impl Notification {
    /// Route of the page that renders this notification's target grid.
    pub fn target_route(&self) -> Route {
        Route::for_target(&self.module, &self.subtab)
    }
}

/// Ingestion payload for one notification.
///
/// `id` is optional; the store assigns the next monotonic id when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    #[serde(default)]
    pub id: Option<u64>,
    pub header: String,
    pub message: String,
    #[serde(default)]
    pub kind: NotificationKind,
    pub module: String,
    pub subtab: String,
    pub grid_id: String,
    pub row_key: String,
    #[serde(default)]
    pub row_key_field: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_route_from_metadata() {
        let n = Notification {
            id: 1,
            header: "Price Alert".into(),
            message: "AAPL crossed $190".into(),
            kind: NotificationKind::Alert,
            read: false,
            created_at: Utc::now(),
            module: "Market Data".into(),
            subtab: "Market Data".into(),
            grid_id: "market_data_grid".into(),
            row_key: "AAPL".into(),
            row_key_field: Some("ticker".into()),
        };
        assert_eq!(n.target_route().as_str(), "/market-data/market-data");
    }

    #[test]
    fn test_draft_deserializes_without_optional_fields() {
        let draft: NotificationDraft = serde_json::from_str(
            r#"{
                "header": "Volume Spike",
                "message": "Unusual volume in TSLA",
                "module": "Market Data",
                "subtab": "Market Data",
                "grid_id": "market_data_grid",
                "row_key": "TSLA"
            }"#,
        )
        .unwrap();
        assert_eq!(draft.id, None);
        assert_eq!(draft.kind, NotificationKind::Info);
        assert_eq!(draft.row_key_field, None);
    }
}
