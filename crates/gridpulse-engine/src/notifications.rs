//! Notification store: ingestion, read/unread state, kind filtering, and
//! pagination over the filtered list.

use chrono::Utc;
use gridpulse_core::prelude::*;
use gridpulse_core::{Notification, NotificationDraft, NotificationKind};

pub const DEFAULT_NOTIFICATION_PAGE_SIZE: usize = 5;

/// Kind filter for the notification list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationFilter {
    #[default]
    All,
    Kind(NotificationKind),
}

/// Owns every notification and its read/dismissed lifecycle.
///
/// Single-threaded state owner; ids are unique and monotonically assigned.
#[derive(Debug)]
pub struct NotificationStore {
    items: Vec<Notification>,
    next_id: u64,
    filter: NotificationFilter,
    page: usize,
    page_size: usize,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_PAGE_SIZE)
    }
}

impl NotificationStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            filter: NotificationFilter::All,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Ingestion & lifecycle
    // ─────────────────────────────────────────────────────────────

    /// Append drafts, assigning monotonically increasing ids where absent.
    ///
    /// An explicit draft id bumps the allocator past it so later implicit
    /// ids stay unique.
    pub fn ingest(&mut self, drafts: Vec<NotificationDraft>) {
        for draft in drafts {
            let id = draft.id.unwrap_or(self.next_id);
            self.next_id = self.next_id.max(id + 1);
            self.items.push(Notification {
                id,
                header: draft.header,
                message: draft.message,
                kind: draft.kind,
                read: false,
                created_at: Utc::now(),
                module: draft.module,
                subtab: draft.subtab,
                grid_id: draft.grid_id,
                row_key: draft.row_key,
                row_key_field: draft.row_key_field,
            });
        }
        debug!(total = self.items.len(), "notifications ingested");
    }

    /// Remove a notification. Idempotent: a second dismiss is a no-op.
    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|n| n.id != id);
    }

    /// Mark one notification read. No-op when absent.
    pub fn mark_read(&mut self, id: u64) {
        if let Some(n) = self.items.iter_mut().find(|n| n.id == id) {
            n.read = true;
        }
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.items {
            n.read = true;
        }
    }

    pub fn clear_all(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, id: u64) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    // ─────────────────────────────────────────────────────────────
    // Derivations
    // ─────────────────────────────────────────────────────────────

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Notifications passing the active kind filter, in ingestion order.
    pub fn filtered(&self) -> Vec<&Notification> {
        self.items
            .iter()
            .filter(|n| match self.filter {
                NotificationFilter::All => true,
                NotificationFilter::Kind(kind) => n.kind == kind,
            })
            .collect()
    }

    // ─────────────────────────────────────────────────────────────
    // Filtering & pagination
    // ─────────────────────────────────────────────────────────────

    /// Change the kind filter and reset to the first page.
    pub fn set_filter(&mut self, filter: NotificationFilter) {
        self.filter = filter;
        self.page = 1;
    }

    pub fn filter(&self) -> NotificationFilter {
        self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.filtered().len().div_ceil(self.page_size).max(1)
    }

    pub fn next_page(&mut self) {
        if self.page < self.total_pages() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// Current page of the filtered list.
    pub fn paginated(&self) -> Vec<&Notification> {
        let filtered = self.filtered();
        let page = self.page.clamp(1, self.total_pages());
        let start = (page - 1) * self.page_size;
        filtered
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect()
    }
}
