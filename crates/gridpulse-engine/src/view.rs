//! Per-dataset table view state: search, sort, and pagination over a
//! backing row collection, with lazily cached derivations.
//!
//! Each grid owns exactly one `TableView`; there is no ambient registry.
//! The backing collection is only ever *replaced* (copy-on-write contract,
//! see `gridpulse_core::record`), never mutated in place.

use std::sync::Arc;

use gridpulse_core::{Record, RowSet, SortKey};

/// Sort direction for the active sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Filter/sort/pagination state and derived projections for one dataset.
#[derive(Debug)]
pub struct TableView {
    rows: RowSet,
    search: String,
    sort_column: Option<String>,
    sort_direction: SortDirection,
    page: usize,
    page_size: usize,
    /// Filtered + sorted projection, invalidated on every mutation.
    projection: Option<RowSet>,
}

pub const DEFAULT_PAGE_SIZE: usize = 20;

impl Default for TableView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl TableView {
    pub fn new(page_size: usize) -> Self {
        Self {
            rows: Vec::new(),
            search: String::new(),
            sort_column: None,
            sort_direction: SortDirection::Asc,
            page: 1,
            page_size: page_size.max(1),
            projection: None,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────

    /// Replace the backing collection. Input must follow the copy-on-write
    /// contract; the view never mutates rows it holds.
    pub fn set_rows(&mut self, rows: RowSet) {
        self.rows = rows;
        self.projection = None;
        self.clamp_page();
    }

    /// Replace the search string and reset to the first page.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.projection = None;
        self.page = 1;
    }

    /// Toggle sorting: same column flips direction, a new column starts
    /// ascending.
    pub fn toggle_sort(&mut self, column: &str) {
        if self.sort_column.as_deref() == Some(column) {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_column = Some(column.to_string());
            self.sort_direction = SortDirection::Asc;
        }
        self.projection = None;
    }

    /// Replace the page size and reset to the first page. Zero is ignored.
    pub fn set_page_size(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.page_size = n;
        self.page = 1;
    }

    /// Jump to a page, clamped into valid bounds.
    pub fn set_page(&mut self, n: usize) {
        self.page = n;
        self.clamp_page();
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

    // ─────────────────────────────────────────────────────────────
    // Accessors & derivations
    // ─────────────────────────────────────────────────────────────

    pub fn rows(&self) -> &RowSet {
        &self.rows
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort_column(&self) -> Option<&str> {
        self.sort_column.as_deref()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Filtered + sorted projection. Cached until the next mutation.
    pub fn sorted(&mut self) -> &[Arc<Record>] {
        if self.projection.is_none() {
            self.projection = Some(self.compute_projection());
        }
        self.projection.as_deref().unwrap_or(&[])
    }

    /// Number of rows surviving the search filter.
    pub fn filtered_len(&mut self) -> usize {
        self.sorted().len()
    }

    /// Total page count; at least 1 even for an empty collection.
    pub fn total_pages(&mut self) -> usize {
        let len = self.filtered_len();
        len.div_ceil(self.page_size).max(1)
    }

    /// The current page's window of the sorted projection.
    pub fn paginated(&mut self) -> Vec<Arc<Record>> {
        self.clamp_page();
        let start = (self.page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.filtered_len());
        if start >= end {
            return Vec::new();
        }
        self.sorted()[start..end].to_vec()
    }

    fn clamp_page(&mut self) {
        let total = self.total_pages();
        self.page = self.page.clamp(1, total);
    }

    fn compute_projection(&self) -> RowSet {
        let mut data: RowSet = self
            .rows
            .iter()
            .filter(|r| r.matches_search(&self.search))
            .cloned()
            .collect();

        if let Some(column) = &self.sort_column {
            let desc = self.sort_direction == SortDirection::Desc;
            data.sort_by(|a, b| {
                let ka = sort_key(a, column);
                let kb = sort_key(b, column);
                if desc {
                    kb.cmp(&ka)
                } else {
                    ka.cmp(&kb)
                }
            });
        }
        data
    }
}

fn sort_key(record: &Record, column: &str) -> SortKey {
    record
        .get(column)
        .map(SortKey::from_value)
        .unwrap_or_else(|| SortKey::Text(String::new()))
}
