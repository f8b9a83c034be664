//! The rendering-surface command protocol and a headless implementation.
//!
//! The original system located and decorated rows by injecting scripts into
//! the browser; here that contract is an explicit command/result trait so the
//! navigation and highlight logic is testable against any rendering
//! technology. Commands report back only what the engine needs: whether a
//! grid is mounted, whether a row was found, and whether a marker landed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use gridpulse_core::Record;

/// Commands the engine issues against the rendering surface.
///
/// `find_row` resolves a row by identity key; `find_row_by_field` is the
/// linear-scan fallback over the rows the surface currently knows about
/// (visible or virtualized). Both return the surface's row id for use in
/// subsequent commands.
#[cfg_attr(test, mockall::automock)]
pub trait RenderingSurface {
    fn has_grid(&self, grid_id: &str) -> bool;

    /// True when any grid at all is mounted (lenient same-page fallback).
    fn has_any_grid(&self) -> bool;

    /// Replace a mounted grid's rows after a projection change.
    fn render_rows(&mut self, grid_id: &str, key_field: &str, rows: &[Arc<Record>]);

    fn find_row(&self, grid_id: &str, row_key: &str) -> Option<String>;

    fn find_row_by_field(&self, grid_id: &str, field: &str, value: &str) -> Option<String>;

    fn ensure_visible(&mut self, grid_id: &str, row_id: &str);

    fn flash(&mut self, grid_id: &str, row_id: &str);

    /// Apply the persistent highlight marker. Returns false when the row is
    /// no longer present (filtered out, or re-mount churn), in which case the
    /// caller retries on a later tick.
    fn apply_marker(&mut self, grid_id: &str, row_id: &str) -> bool;

    fn clear_marker(&mut self, grid_id: &str);
}

// ─────────────────────────────────────────────────────────────────────────────
// HeadlessSurface
// ─────────────────────────────────────────────────────────────────────────────

/// One mounted grid in the headless surface.
#[derive(Debug, Default)]
struct HeadlessGrid {
    /// (row id, row) pairs in render order.
    rows: Vec<(String, Arc<Record>)>,
    key_field: String,
    markers: HashSet<String>,
    flash_count: usize,
    scrolled_to: Option<String>,
}

/// In-memory rendering surface for the demo binary and integration tests.
///
/// Re-rendering a grid drops its markers, mimicking the re-mount churn of a
/// virtualized grid; the highlighter's tick-driven re-application is what
/// keeps a highlight visible.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    grids: HashMap<String, HeadlessGrid>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a grid with its row collection (a page navigation landed here).
    pub fn mount_grid(&mut self, grid_id: &str, key_field: &str, rows: &[Arc<Record>]) {
        let mut grid = HeadlessGrid {
            key_field: key_field.to_string(),
            ..HeadlessGrid::default()
        };
        grid.rows = index_rows(key_field, rows);
        self.grids.insert(grid_id.to_string(), grid);
    }

    /// Unmount every grid (the shell navigated away).
    pub fn unmount_all(&mut self) {
        self.grids.clear();
    }

    pub fn marker_applied(&self, grid_id: &str, row_id: &str) -> bool {
        self.grids
            .get(grid_id)
            .is_some_and(|g| g.markers.contains(row_id))
    }

    pub fn flash_count(&self, grid_id: &str) -> usize {
        self.grids.get(grid_id).map_or(0, |g| g.flash_count)
    }

    pub fn scrolled_to(&self, grid_id: &str) -> Option<&str> {
        self.grids
            .get(grid_id)
            .and_then(|g| g.scrolled_to.as_deref())
    }
}

fn index_rows(key_field: &str, rows: &[Arc<Record>]) -> Vec<(String, Arc<Record>)> {
    rows.iter()
        .enumerate()
        .map(|(i, r)| {
            let id = r.row_key(key_field).unwrap_or_else(|| i.to_string());
            (id, r.clone())
        })
        .collect()
}

impl RenderingSurface for HeadlessSurface {
    fn has_grid(&self, grid_id: &str) -> bool {
        self.grids.contains_key(grid_id)
    }

    fn has_any_grid(&self) -> bool {
        !self.grids.is_empty()
    }

    fn render_rows(&mut self, grid_id: &str, key_field: &str, rows: &[Arc<Record>]) {
        let Some(grid) = self.grids.get_mut(grid_id) else {
            return;
        };
        // Rows are recreated on render; markers do not survive (virtualized
        // re-mount semantics). The highlighter re-applies on tick.
        grid.key_field = key_field.to_string();
        grid.rows = index_rows(key_field, rows);
        grid.markers.clear();
    }

    fn find_row(&self, grid_id: &str, row_key: &str) -> Option<String> {
        let grid = self.grids.get(grid_id)?;
        grid.rows
            .iter()
            .find(|(id, _)| id == row_key)
            .map(|(id, _)| id.clone())
    }

    fn find_row_by_field(&self, grid_id: &str, field: &str, value: &str) -> Option<String> {
        let grid = self.grids.get(grid_id)?;
        grid.rows
            .iter()
            .find(|(_, r)| r.get_text(field) == value)
            .map(|(id, _)| id.clone())
    }

    fn ensure_visible(&mut self, grid_id: &str, row_id: &str) {
        if let Some(grid) = self.grids.get_mut(grid_id) {
            grid.scrolled_to = Some(row_id.to_string());
        }
    }

    fn flash(&mut self, grid_id: &str, row_id: &str) {
        if let Some(grid) = self.grids.get_mut(grid_id) {
            if grid.rows.iter().any(|(id, _)| id == row_id) {
                grid.flash_count += 1;
            }
        }
    }

    fn apply_marker(&mut self, grid_id: &str, row_id: &str) -> bool {
        let Some(grid) = self.grids.get_mut(grid_id) else {
            return false;
        };
        if grid.rows.iter().any(|(id, _)| id == row_id) {
            grid.markers.insert(row_id.to_string());
            true
        } else {
            false
        }
    }

    fn clear_marker(&mut self, grid_id: &str) {
        if let Some(grid) = self.grids.get_mut(grid_id) {
            grid.markers.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Arc<Record>> {
        ["AAPL", "MSFT", "TSLA"]
            .iter()
            .map(|t| {
                Arc::new(Record::from_pairs([
                    ("ticker", json!(t)),
                    ("last_price", json!(100.0)),
                ]))
            })
            .collect()
    }

    #[test]
    fn test_find_row_by_identity() {
        let mut surface = HeadlessSurface::new();
        surface.mount_grid("market_data_grid", "ticker", &rows());
        assert_eq!(
            surface.find_row("market_data_grid", "MSFT"),
            Some("MSFT".to_string())
        );
        assert_eq!(surface.find_row("market_data_grid", "NVDA"), None);
    }

    #[test]
    fn test_find_row_by_field_scan() {
        let mut surface = HeadlessSurface::new();
        surface.mount_grid("market_data_grid", "ticker", &rows());
        assert_eq!(
            surface.find_row_by_field("market_data_grid", "ticker", "TSLA"),
            Some("TSLA".to_string())
        );
    }

    #[test]
    fn test_render_rows_drops_markers() {
        let mut surface = HeadlessSurface::new();
        surface.mount_grid("g", "ticker", &rows());
        assert!(surface.apply_marker("g", "AAPL"));
        assert!(surface.marker_applied("g", "AAPL"));
        surface.render_rows("g", "ticker", &rows());
        assert!(!surface.marker_applied("g", "AAPL"));
    }

    #[test]
    fn test_apply_marker_reports_missing_row() {
        let mut surface = HeadlessSurface::new();
        surface.mount_grid("g", "ticker", &rows());
        assert!(!surface.apply_marker("g", "NVDA"));
    }

    #[test]
    fn test_unmounted_grid_commands_are_noops() {
        let mut surface = HeadlessSurface::new();
        assert!(!surface.has_any_grid());
        assert!(!surface.apply_marker("g", "AAPL"));
        assert_eq!(surface.find_row("g", "AAPL"), None);
        surface.flash("g", "AAPL");
        assert_eq!(surface.flash_count("g"), 0);
    }
}
