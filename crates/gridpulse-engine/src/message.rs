//! Message types for the engine's single-owner update loop.
//!
//! Spawned tasks (auto-refresh loops, force-refresh fetches) never touch
//! state directly; they send messages here and the owner applies them in
//! `Engine::update`.

use gridpulse_core::{DatasetId, NotificationDraft, Route, RowSet};

/// All messages consumed by the engine's update loop.
#[derive(Debug, Clone)]
pub enum Message {
    /// Periodic housekeeping tick (drives persistent-highlight re-application)
    Tick,

    // ─────────────────────────────────────────────────────────
    // Refresh Messages
    // ─────────────────────────────────────────────────────────
    /// An auto-refresh loop fired for a dataset
    RefreshTick { dataset: DatasetId },

    /// A force refresh began (loading indicator may be shown)
    RefreshStarted { dataset: DatasetId },

    /// A force refresh fetched a replacement collection
    RefreshCompleted { dataset: DatasetId, rows: RowSet },

    /// A force refresh failed; the last known good collection is kept
    RefreshFailed { dataset: DatasetId, error: String },

    // ─────────────────────────────────────────────────────────
    // Notification Messages
    // ─────────────────────────────────────────────────────────
    /// New notifications arrived for ingestion
    IngestNotifications { drafts: Vec<NotificationDraft> },

    /// User asked to jump to a notification's target row
    NavigateToNotification { id: u64 },

    // ─────────────────────────────────────────────────────────
    // Shell Messages
    // ─────────────────────────────────────────────────────────
    /// The shell finished a route change
    RouteChanged { route: Route },

    /// A grid finished mounting and can execute a pending highlight
    GridReady { grid_id: String },

    /// Clear any persistent row highlight
    ClearHighlight,

    /// Tear down auto-refresh loops
    Shutdown,
}
